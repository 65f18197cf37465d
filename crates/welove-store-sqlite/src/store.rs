//! [`SqliteStore`]: the SQLite implementation of [`QuoteStore`].

use std::path::Path;

use chrono::Utc;
use rusqlite::OptionalExtension as _;
use tracing::debug;
use uuid::Uuid;

use welove_core::{
  message::{Message, NewMessage},
  profile::{NewProfile, Profile},
  quote::{NewQuote, NewSource, Quote, Source},
  store::{Collection, QuoteStore},
};

use crate::{
  Error, Result,
  encode::{
    MESSAGE_COLUMNS, PROFILE_COLUMNS, QUOTE_COLUMNS, RawMessage, RawProfile,
    RawQuote, RawSource, SOURCE_COLUMNS, decode_uuid, encode_dt, encode_uuid,
  },
  schema::SCHEMA,
};

/// `(table, id column, flag column)` backing a flagged collection.
fn flag_columns(collection: Collection) -> (&'static str, &'static str, &'static str) {
  match collection {
    Collection::Quotes => ("quotes", "quote_id", "is_active"),
    Collection::Messages => ("messages", "message_id", "is_displayed"),
  }
}

// ─── Store ───────────────────────────────────────────────────────────────────

/// A welove store backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let path = path.as_ref();
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    debug!(path = %path.display(), "sqlite store opened");
    Ok(store)
  }

  /// Open an in-memory store, useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Run a `DELETE` with one id parameter; returns whether a row went away.
  async fn delete_by_id(&self, sql: &'static str, id: Uuid) -> Result<bool> {
    let id_str = encode_uuid(id);
    let changed = self
      .conn
      .call(move |conn| Ok(conn.execute(sql, rusqlite::params![id_str])?))
      .await?;
    Ok(changed > 0)
  }
}

// ─── QuoteStore impl ─────────────────────────────────────────────────────────

impl QuoteStore for SqliteStore {
  type Error = Error;

  // ── Sources ───────────────────────────────────────────────────────────────

  async fn add_source(&self, input: NewSource) -> Result<Source> {
    let source = Source {
      source_id:  Uuid::new_v4(),
      name:       input.name,
      link:       input.link,
      created_at: Utc::now(),
    };

    let id_str = encode_uuid(source.source_id);
    let at_str = encode_dt(source.created_at);
    let name   = source.name.clone();
    let link   = source.link.clone();

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO sources (source_id, name, link, created_at)
           VALUES (?1, ?2, ?3, ?4)",
          rusqlite::params![id_str, name, link, at_str],
        )?;
        Ok(())
      })
      .await?;

    Ok(source)
  }

  async fn get_source(&self, id: Uuid) -> Result<Option<Source>> {
    let id_str = encode_uuid(id);

    let raw: Option<RawSource> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {SOURCE_COLUMNS} FROM sources WHERE source_id = ?1"),
              rusqlite::params![id_str],
              RawSource::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawSource::into_source).transpose()
  }

  async fn list_sources(&self) -> Result<Vec<Source>> {
    let raws: Vec<RawSource> = self
      .conn
      .call(|conn| {
        let mut stmt =
          conn.prepare(&format!("SELECT {SOURCE_COLUMNS} FROM sources ORDER BY rowid"))?;
        let rows = stmt
          .query_map([], RawSource::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawSource::into_source).collect()
  }

  async fn delete_source(&self, id: Uuid) -> Result<bool> {
    // Quotes follow through ON DELETE CASCADE; favourites through SET NULL.
    self
      .delete_by_id("DELETE FROM sources WHERE source_id = ?1", id)
      .await
  }

  // ── Quotes ────────────────────────────────────────────────────────────────

  async fn add_quote(&self, input: NewQuote) -> Result<Quote> {
    let quote = Quote {
      quote_id:   Uuid::new_v4(),
      text:       input.text,
      source_id:  input.source_id,
      is_active:  false,
      popularity: 0,
      created_at: Utc::now(),
    };

    let id_str     = encode_uuid(quote.quote_id);
    let text       = quote.text.clone();
    let source_str = quote.source_id.map(encode_uuid);
    let at_str     = encode_dt(quote.created_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO quotes (quote_id, text, source_id, is_active, popularity, created_at)
           VALUES (?1, ?2, ?3, 0, 0, ?4)",
          rusqlite::params![id_str, text, source_str, at_str],
        )?;
        Ok(())
      })
      .await?;

    Ok(quote)
  }

  async fn get_quote(&self, id: Uuid) -> Result<Option<Quote>> {
    let id_str = encode_uuid(id);

    let raw: Option<RawQuote> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {QUOTE_COLUMNS} FROM quotes WHERE quote_id = ?1"),
              rusqlite::params![id_str],
              RawQuote::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawQuote::into_quote).transpose()
  }

  async fn find_quote_by_text<'a>(&'a self, text: &'a str) -> Result<Option<Quote>> {
    let text = text.to_owned();

    let raw: Option<RawQuote> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {QUOTE_COLUMNS} FROM quotes WHERE text = ?1"),
              rusqlite::params![text],
              RawQuote::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawQuote::into_quote).transpose()
  }

  async fn list_quotes(&self) -> Result<Vec<Quote>> {
    let raws: Vec<RawQuote> = self
      .conn
      .call(|conn| {
        let mut stmt =
          conn.prepare(&format!("SELECT {QUOTE_COLUMNS} FROM quotes ORDER BY rowid"))?;
        let rows = stmt
          .query_map([], RawQuote::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawQuote::into_quote).collect()
  }

  async fn delete_quote(&self, id: Uuid) -> Result<bool> {
    self
      .delete_by_id("DELETE FROM quotes WHERE quote_id = ?1", id)
      .await
  }

  async fn increment_popularity(&self, id: Uuid) -> Result<Option<i32>> {
    let id_str = encode_uuid(id);

    let popularity = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "UPDATE quotes SET popularity = MIN(popularity + 1, 2147483647)
               WHERE quote_id = ?1
               RETURNING popularity",
              rusqlite::params![id_str],
              |row| row.get::<_, i32>(0),
            )
            .optional()?,
        )
      })
      .await?;

    Ok(popularity)
  }

  async fn set_popularities(&self, updates: Vec<(Uuid, i32)>) -> Result<()> {
    let encoded: Vec<(String, i32)> = updates
      .into_iter()
      .map(|(id, popularity)| (encode_uuid(id), popularity))
      .collect();

    self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        {
          let mut stmt =
            tx.prepare("UPDATE quotes SET popularity = ?2 WHERE quote_id = ?1")?;
          for (id, popularity) in &encoded {
            stmt.execute(rusqlite::params![id, popularity])?;
          }
        }
        tx.commit()?;
        Ok(())
      })
      .await?;

    Ok(())
  }

  // ── Selection flags ───────────────────────────────────────────────────────

  async fn flagged(&self, collection: Collection) -> Result<Vec<Uuid>> {
    let (table, id_col, flag_col) = flag_columns(collection);

    let ids: Vec<String> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {id_col} FROM {table} WHERE {flag_col} = 1 ORDER BY rowid"
        ))?;
        let rows = stmt
          .query_map([], |row| row.get(0))?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    ids.iter().map(|s| decode_uuid(s)).collect()
  }

  async fn contains(&self, collection: Collection, id: Uuid) -> Result<bool> {
    let (table, id_col, _) = flag_columns(collection);
    let id_str = encode_uuid(id);

    let exists = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT 1 FROM {table} WHERE {id_col} = ?1"),
              rusqlite::params![id_str],
              |_| Ok(true),
            )
            .optional()?
            .unwrap_or(false),
        )
      })
      .await?;

    Ok(exists)
  }

  async fn set_flag(&self, collection: Collection, id: Uuid, value: bool) -> Result<()> {
    let (table, id_col, flag_col) = flag_columns(collection);
    let id_str = encode_uuid(id);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          &format!("UPDATE {table} SET {flag_col} = ?2 WHERE {id_col} = ?1"),
          rusqlite::params![id_str, value],
        )?;
        Ok(())
      })
      .await?;

    Ok(())
  }

  // ── Messages ──────────────────────────────────────────────────────────────

  async fn add_message(&self, input: NewMessage) -> Result<Message> {
    let message = Message {
      message_id:   Uuid::new_v4(),
      text:         input.text,
      is_displayed: false,
      created_at:   Utc::now(),
    };

    let id_str = encode_uuid(message.message_id);
    let text   = message.text.clone();
    let at_str = encode_dt(message.created_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO messages (message_id, text, is_displayed, created_at)
           VALUES (?1, ?2, 0, ?3)",
          rusqlite::params![id_str, text, at_str],
        )?;
        Ok(())
      })
      .await?;

    Ok(message)
  }

  async fn get_message(&self, id: Uuid) -> Result<Option<Message>> {
    let id_str = encode_uuid(id);

    let raw: Option<RawMessage> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {MESSAGE_COLUMNS} FROM messages WHERE message_id = ?1"),
              rusqlite::params![id_str],
              RawMessage::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawMessage::into_message).transpose()
  }

  async fn list_messages(&self) -> Result<Vec<Message>> {
    let raws: Vec<RawMessage> = self
      .conn
      .call(|conn| {
        let mut stmt = conn
          .prepare(&format!("SELECT {MESSAGE_COLUMNS} FROM messages ORDER BY rowid"))?;
        let rows = stmt
          .query_map([], RawMessage::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawMessage::into_message).collect()
  }

  async fn delete_message(&self, id: Uuid) -> Result<bool> {
    self
      .delete_by_id("DELETE FROM messages WHERE message_id = ?1", id)
      .await
  }

  // ── Profiles ──────────────────────────────────────────────────────────────

  async fn add_profile(&self, input: NewProfile) -> Result<Profile> {
    let profile = Profile {
      user_id:            input.user_id,
      username:           input.username,
      email:              input.email,
      first_name:         input.first_name,
      subscribed:         false,
      favourite_quote_id: None,
      created_at:         Utc::now(),
    };

    let id_str     = encode_uuid(profile.user_id);
    let username   = profile.username.clone();
    let email      = profile.email.clone();
    let first_name = profile.first_name.clone();
    let at_str     = encode_dt(profile.created_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO profiles (user_id, username, email, first_name, subscribed, created_at)
           VALUES (?1, ?2, ?3, ?4, 0, ?5)",
          rusqlite::params![id_str, username, email, first_name, at_str],
        )?;
        Ok(())
      })
      .await?;

    Ok(profile)
  }

  async fn get_profile(&self, user_id: Uuid) -> Result<Option<Profile>> {
    let id_str = encode_uuid(user_id);

    let raw: Option<RawProfile> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {PROFILE_COLUMNS} FROM profiles WHERE user_id = ?1"),
              rusqlite::params![id_str],
              RawProfile::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawProfile::into_profile).transpose()
  }

  async fn find_profile_by_username<'a>(&'a self, username: &'a str) -> Result<Option<Profile>> {
    let username = username.to_owned();

    let raw: Option<RawProfile> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {PROFILE_COLUMNS} FROM profiles WHERE username = ?1"),
              rusqlite::params![username],
              RawProfile::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawProfile::into_profile).transpose()
  }

  async fn list_profiles(&self, subscribed_only: bool) -> Result<Vec<Profile>> {
    let raws: Vec<RawProfile> = self
      .conn
      .call(move |conn| {
        let filter = if subscribed_only { "WHERE subscribed = 1" } else { "" };
        let mut stmt = conn.prepare(&format!(
          "SELECT {PROFILE_COLUMNS} FROM profiles {filter} ORDER BY rowid"
        ))?;
        let rows = stmt
          .query_map([], RawProfile::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawProfile::into_profile).collect()
  }

  async fn update_profile(&self, profile: Profile) -> Result<()> {
    let id_str        = encode_uuid(profile.user_id);
    let favourite_str = profile.favourite_quote_id.map(encode_uuid);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "UPDATE profiles
           SET first_name = ?2, subscribed = ?3, favourite_quote_id = ?4
           WHERE user_id = ?1",
          rusqlite::params![id_str, profile.first_name, profile.subscribed, favourite_str],
        )?;
        Ok(())
      })
      .await?;

    Ok(())
  }
}
