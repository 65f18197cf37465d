//! Encoding and decoding helpers between the welove domain types and the
//! plain-text representations stored in SQLite columns.
//!
//! Timestamps are stored as RFC 3339 strings and UUIDs as hyphenated
//! lowercase strings. Flags are stored as `0`/`1` integers.

use chrono::{DateTime, Utc};
use rusqlite::Row;
use uuid::Uuid;
use welove_core::{
  message::Message,
  profile::Profile,
  quote::{Quote, Source},
};

use crate::{Error, Result};

// ─── Uuid ────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

fn decode_opt_uuid(s: Option<String>) -> Result<Option<Uuid>> {
  s.as_deref().map(decode_uuid).transpose()
}

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── Row types ───────────────────────────────────────────────────────────────

pub const SOURCE_COLUMNS: &str = "source_id, name, link, created_at";

/// Raw values read directly from a `sources` row.
pub struct RawSource {
  pub source_id:  String,
  pub name:       String,
  pub link:       String,
  pub created_at: String,
}

impl RawSource {
  pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      source_id:  row.get(0)?,
      name:       row.get(1)?,
      link:       row.get(2)?,
      created_at: row.get(3)?,
    })
  }

  pub fn into_source(self) -> Result<Source> {
    Ok(Source {
      source_id:  decode_uuid(&self.source_id)?,
      name:       self.name,
      link:       self.link,
      created_at: decode_dt(&self.created_at)?,
    })
  }
}

pub const QUOTE_COLUMNS: &str =
  "quote_id, text, source_id, is_active, popularity, created_at";

/// Raw values read directly from a `quotes` row.
pub struct RawQuote {
  pub quote_id:   String,
  pub text:       String,
  pub source_id:  Option<String>,
  pub is_active:  bool,
  pub popularity: i32,
  pub created_at: String,
}

impl RawQuote {
  pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      quote_id:   row.get(0)?,
      text:       row.get(1)?,
      source_id:  row.get(2)?,
      is_active:  row.get(3)?,
      popularity: row.get(4)?,
      created_at: row.get(5)?,
    })
  }

  pub fn into_quote(self) -> Result<Quote> {
    Ok(Quote {
      quote_id:   decode_uuid(&self.quote_id)?,
      text:       self.text,
      source_id:  decode_opt_uuid(self.source_id)?,
      is_active:  self.is_active,
      popularity: self.popularity,
      created_at: decode_dt(&self.created_at)?,
    })
  }
}

pub const MESSAGE_COLUMNS: &str = "message_id, text, is_displayed, created_at";

/// Raw values read directly from a `messages` row.
pub struct RawMessage {
  pub message_id:   String,
  pub text:         String,
  pub is_displayed: bool,
  pub created_at:   String,
}

impl RawMessage {
  pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      message_id:   row.get(0)?,
      text:         row.get(1)?,
      is_displayed: row.get(2)?,
      created_at:   row.get(3)?,
    })
  }

  pub fn into_message(self) -> Result<Message> {
    Ok(Message {
      message_id:   decode_uuid(&self.message_id)?,
      text:         self.text,
      is_displayed: self.is_displayed,
      created_at:   decode_dt(&self.created_at)?,
    })
  }
}

pub const PROFILE_COLUMNS: &str =
  "user_id, username, email, first_name, subscribed, favourite_quote_id, created_at";

/// Raw values read directly from a `profiles` row.
pub struct RawProfile {
  pub user_id:            String,
  pub username:           String,
  pub email:              String,
  pub first_name:         Option<String>,
  pub subscribed:         bool,
  pub favourite_quote_id: Option<String>,
  pub created_at:         String,
}

impl RawProfile {
  pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      user_id:            row.get(0)?,
      username:           row.get(1)?,
      email:              row.get(2)?,
      first_name:         row.get(3)?,
      subscribed:         row.get(4)?,
      favourite_quote_id: row.get(5)?,
      created_at:         row.get(6)?,
    })
  }

  pub fn into_profile(self) -> Result<Profile> {
    Ok(Profile {
      user_id:            decode_uuid(&self.user_id)?,
      username:           self.username,
      email:              self.email,
      first_name:         self.first_name,
      subscribed:         self.subscribed,
      favourite_quote_id: decode_opt_uuid(self.favourite_quote_id)?,
      created_at:         decode_dt(&self.created_at)?,
    })
  }
}
