//! Quotes and the sources they are taken from.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ─── Source ──────────────────────────────────────────────────────────────────

/// Where a quote comes from, e.g. a song title with a link to its lyrics.
///
/// Deleting a source deletes every quote that references it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Source {
  pub source_id:  Uuid,
  pub name:       String,
  pub link:       String,
  pub created_at: DateTime<Utc>,
}

/// Input to [`crate::store::QuoteStore::add_source`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewSource {
  pub name: String,
  #[serde(default)]
  pub link: String,
}

// ─── Quote ───────────────────────────────────────────────────────────────────

/// A single quote.
///
/// `is_active` marks the quote of the day; at most one quote carries it.
/// `popularity` counts poll votes and is halved across the board when any
/// counter approaches the `i32` ceiling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quote {
  pub quote_id:   Uuid,
  pub text:       String,
  pub source_id:  Option<Uuid>,
  pub is_active:  bool,
  pub popularity: i32,
  /// Server-assigned timestamp; never changes after creation.
  pub created_at: DateTime<Utc>,
}

/// Input to [`crate::store::QuoteStore::add_quote`].
/// New quotes always start inactive with zero popularity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewQuote {
  pub text:      String,
  #[serde(default)]
  pub source_id: Option<Uuid>,
}

impl NewQuote {
  pub fn new(text: impl Into<String>) -> Self {
    Self { text: text.into(), source_id: None }
  }

  pub fn with_source(mut self, source_id: Uuid) -> Self {
    self.source_id = Some(source_id);
    self
  }
}
