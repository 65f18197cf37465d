//! The `QuoteStore` trait and the flagged collections it exposes.
//!
//! The trait is implemented by storage backends (e.g. `welove-store-sqlite`).
//! Higher layers (`welove-api`, `welove-server`) depend on this abstraction,
//! not on any concrete backend.

use std::future::Future;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
  message::{Message, NewMessage},
  profile::{NewProfile, Profile},
  quote::{NewQuote, NewSource, Quote, Source},
};

// ─── Flagged collections ─────────────────────────────────────────────────────

/// A collection whose records carry a single-selection boolean flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Collection {
  /// Quotes; the flag is `is_active` (the quote of the day).
  Quotes,
  /// Site messages; the flag is `is_displayed`.
  Messages,
}

impl Collection {
  /// The "missing record" error for this collection.
  pub fn not_found(self, id: Uuid) -> crate::Error {
    match self {
      Self::Quotes => crate::Error::QuoteNotFound(id),
      Self::Messages => crate::Error::MessageNotFound(id),
    }
  }
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over a welove storage backend.
///
/// The store is deliberately dumb: it persists what it is told and never
/// applies the single-selection rule on its own. That rule lives in
/// [`crate::selection`] and is invoked explicitly.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes (e.g. tokio with `axum`).
pub trait QuoteStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Sources ───────────────────────────────────────────────────────────

  fn add_source(
    &self,
    input: NewSource,
  ) -> impl Future<Output = Result<Source, Self::Error>> + Send + '_;

  /// Retrieve a source by id. Returns `None` if not found.
  fn get_source(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Source>, Self::Error>> + Send + '_;

  fn list_sources(
    &self,
  ) -> impl Future<Output = Result<Vec<Source>, Self::Error>> + Send + '_;

  /// Delete a source together with all of its quotes, atomically.
  /// Returns `false` if the source did not exist.
  fn delete_source(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  // ── Quotes ────────────────────────────────────────────────────────────

  /// Persist a new, inactive quote with zero popularity.
  fn add_quote(
    &self,
    input: NewQuote,
  ) -> impl Future<Output = Result<Quote, Self::Error>> + Send + '_;

  fn get_quote(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Quote>, Self::Error>> + Send + '_;

  /// Exact-match lookup used to keep quote texts unique.
  fn find_quote_by_text<'a>(
    &'a self,
    text: &'a str,
  ) -> impl Future<Output = Result<Option<Quote>, Self::Error>> + Send + 'a;

  /// All quotes in insertion order.
  fn list_quotes(
    &self,
  ) -> impl Future<Output = Result<Vec<Quote>, Self::Error>> + Send + '_;

  /// Delete a quote; profiles pointing at it lose their favourite.
  /// Returns `false` if the quote did not exist.
  fn delete_quote(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  /// Add one vote, saturating at `i32::MAX`. Returns the new popularity, or
  /// `None` if the quote does not exist.
  fn increment_popularity(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<i32>, Self::Error>> + Send + '_;

  /// Overwrite many popularity counters in one batch. Ids that no longer
  /// exist are skipped.
  fn set_popularities(
    &self,
    updates: Vec<(Uuid, i32)>,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  // ── Selection flags ───────────────────────────────────────────────────

  /// Ids of the records in `collection` whose flag is currently set.
  fn flagged(
    &self,
    collection: Collection,
  ) -> impl Future<Output = Result<Vec<Uuid>, Self::Error>> + Send + '_;

  /// Whether a record with `id` exists in `collection`.
  fn contains(
    &self,
    collection: Collection,
    id: Uuid,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  /// Set or clear the flag of one record.
  fn set_flag(
    &self,
    collection: Collection,
    id: Uuid,
    value: bool,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  // ── Messages ──────────────────────────────────────────────────────────

  /// Persist a new, hidden message.
  fn add_message(
    &self,
    input: NewMessage,
  ) -> impl Future<Output = Result<Message, Self::Error>> + Send + '_;

  fn get_message(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Message>, Self::Error>> + Send + '_;

  fn list_messages(
    &self,
  ) -> impl Future<Output = Result<Vec<Message>, Self::Error>> + Send + '_;

  fn delete_message(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  // ── Profiles ──────────────────────────────────────────────────────────

  /// Persist a new, unsubscribed profile.
  fn add_profile(
    &self,
    input: NewProfile,
  ) -> impl Future<Output = Result<Profile, Self::Error>> + Send + '_;

  fn get_profile(
    &self,
    user_id: Uuid,
  ) -> impl Future<Output = Result<Option<Profile>, Self::Error>> + Send + '_;

  /// Exact-match lookup used to keep usernames unique.
  fn find_profile_by_username<'a>(
    &'a self,
    username: &'a str,
  ) -> impl Future<Output = Result<Option<Profile>, Self::Error>> + Send + 'a;

  /// List profiles, optionally only those subscribed to the daily email.
  fn list_profiles(
    &self,
    subscribed_only: bool,
  ) -> impl Future<Output = Result<Vec<Profile>, Self::Error>> + Send + '_;

  /// Overwrite the mutable fields of an existing profile.
  fn update_profile(
    &self,
    profile: Profile,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;
}
