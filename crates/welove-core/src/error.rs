//! Error types for `welove-core`.

use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum Error {
  #[error("quote not found: {0}")]
  QuoteNotFound(Uuid),

  #[error("message not found: {0}")]
  MessageNotFound(Uuid),

  #[error("source not found: {0}")]
  SourceNotFound(Uuid),

  #[error("profile not found: {0}")]
  ProfileNotFound(Uuid),

  #[error("a quote with this text already exists: {0:?}")]
  DuplicateQuote(String),

  #[error("a profile already exists for user {0}")]
  DuplicateProfile(Uuid),

  #[error("username is already taken: {0:?}")]
  DuplicateUsername(String),

  #[error("text must not be empty")]
  EmptyText,

  /// The storage backend could not read or durably apply a change.
  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
  /// Wrap a backend error. Used as `.map_err(Error::store)`.
  pub fn store<E>(err: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    Self::Store(Box::new(err))
  }

  /// `true` for the "record does not exist" family of errors.
  pub fn is_not_found(&self) -> bool {
    matches!(
      self,
      Self::QuoteNotFound(_)
        | Self::MessageNotFound(_)
        | Self::SourceNotFound(_)
        | Self::ProfileNotFound(_)
    )
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
