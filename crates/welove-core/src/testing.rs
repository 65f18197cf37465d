//! In-memory [`QuoteStore`] and a recording [`Transport`] for unit tests.

use std::sync::{
  Mutex, MutexGuard,
  atomic::{AtomicBool, Ordering},
};

use chrono::Utc;
use uuid::Uuid;

use crate::{
  mail::Mail,
  message::{Message, NewMessage},
  notify::Transport,
  profile::{NewProfile, Profile},
  quote::{NewQuote, NewSource, Quote, Source},
  store::{Collection, QuoteStore},
};

// ─── Store ───────────────────────────────────────────────────────────────────

#[derive(Default)]
struct Tables {
  sources:  Vec<Source>,
  quotes:   Vec<Quote>,
  messages: Vec<Message>,
  profiles: Vec<Profile>,
}

#[derive(Debug, thiserror::Error)]
pub enum MemoryError {
  #[error("store unavailable")]
  Unavailable,
  #[error("UNIQUE constraint failed: {0}")]
  Unique(&'static str),
}

/// Mirrors the SQLite backend's uniqueness constraints so both behave alike
/// under the service.
#[derive(Default)]
pub struct MemoryStore {
  tables:         Mutex<Tables>,
  failing_flags:  AtomicBool,
}

impl MemoryStore {
  fn tables(&self) -> MutexGuard<'_, Tables> { self.tables.lock().unwrap() }

  /// While enabled, setting a flag fails. Clearing flags still works, so a
  /// rotation breaks between its clear and set steps.
  pub fn fail_flag_sets(&self, fail: bool) {
    self.failing_flags.store(fail, Ordering::SeqCst);
  }
}

impl QuoteStore for MemoryStore {
  type Error = MemoryError;

  async fn add_source(&self, input: NewSource) -> Result<Source, MemoryError> {
    let source = Source {
      source_id:  Uuid::new_v4(),
      name:       input.name,
      link:       input.link,
      created_at: Utc::now(),
    };
    self.tables().sources.push(source.clone());
    Ok(source)
  }

  async fn get_source(&self, id: Uuid) -> Result<Option<Source>, MemoryError> {
    Ok(self.tables().sources.iter().find(|s| s.source_id == id).cloned())
  }

  async fn list_sources(&self) -> Result<Vec<Source>, MemoryError> {
    Ok(self.tables().sources.clone())
  }

  async fn delete_source(&self, id: Uuid) -> Result<bool, MemoryError> {
    let mut t = self.tables();
    let before = t.sources.len();
    t.sources.retain(|s| s.source_id != id);
    let removed: Vec<Uuid> = t
      .quotes
      .iter()
      .filter(|q| q.source_id == Some(id))
      .map(|q| q.quote_id)
      .collect();
    t.quotes.retain(|q| q.source_id != Some(id));
    for p in &mut t.profiles {
      if p.favourite_quote_id.is_some_and(|f| removed.contains(&f)) {
        p.favourite_quote_id = None;
      }
    }
    Ok(t.sources.len() != before)
  }

  async fn add_quote(&self, input: NewQuote) -> Result<Quote, MemoryError> {
    if self.tables().quotes.iter().any(|q| q.text == input.text) {
      return Err(MemoryError::Unique("quotes.text"));
    }
    let quote = Quote {
      quote_id:   Uuid::new_v4(),
      text:       input.text,
      source_id:  input.source_id,
      is_active:  false,
      popularity: 0,
      created_at: Utc::now(),
    };
    self.tables().quotes.push(quote.clone());
    Ok(quote)
  }

  async fn get_quote(&self, id: Uuid) -> Result<Option<Quote>, MemoryError> {
    Ok(self.tables().quotes.iter().find(|q| q.quote_id == id).cloned())
  }

  async fn find_quote_by_text<'a>(
    &'a self,
    text: &'a str,
  ) -> Result<Option<Quote>, MemoryError> {
    Ok(self.tables().quotes.iter().find(|q| q.text == text).cloned())
  }

  async fn list_quotes(&self) -> Result<Vec<Quote>, MemoryError> {
    Ok(self.tables().quotes.clone())
  }

  async fn delete_quote(&self, id: Uuid) -> Result<bool, MemoryError> {
    let mut t = self.tables();
    let before = t.quotes.len();
    t.quotes.retain(|q| q.quote_id != id);
    for p in &mut t.profiles {
      if p.favourite_quote_id == Some(id) {
        p.favourite_quote_id = None;
      }
    }
    Ok(t.quotes.len() != before)
  }

  async fn increment_popularity(&self, id: Uuid) -> Result<Option<i32>, MemoryError> {
    let mut t = self.tables();
    Ok(t.quotes.iter_mut().find(|q| q.quote_id == id).map(|q| {
      q.popularity = q.popularity.saturating_add(1);
      q.popularity
    }))
  }

  async fn set_popularities(&self, updates: Vec<(Uuid, i32)>) -> Result<(), MemoryError> {
    let mut t = self.tables();
    for (id, popularity) in updates {
      if let Some(q) = t.quotes.iter_mut().find(|q| q.quote_id == id) {
        q.popularity = popularity;
      }
    }
    Ok(())
  }

  async fn flagged(&self, collection: Collection) -> Result<Vec<Uuid>, MemoryError> {
    let t = self.tables();
    Ok(match collection {
      Collection::Quotes => {
        t.quotes.iter().filter(|q| q.is_active).map(|q| q.quote_id).collect()
      }
      Collection::Messages => t
        .messages
        .iter()
        .filter(|m| m.is_displayed)
        .map(|m| m.message_id)
        .collect(),
    })
  }

  async fn contains(&self, collection: Collection, id: Uuid) -> Result<bool, MemoryError> {
    let t = self.tables();
    Ok(match collection {
      Collection::Quotes => t.quotes.iter().any(|q| q.quote_id == id),
      Collection::Messages => t.messages.iter().any(|m| m.message_id == id),
    })
  }

  async fn set_flag(
    &self,
    collection: Collection,
    id: Uuid,
    value: bool,
  ) -> Result<(), MemoryError> {
    if value && self.failing_flags.load(Ordering::SeqCst) {
      return Err(MemoryError::Unavailable);
    }
    let mut t = self.tables();
    match collection {
      Collection::Quotes => {
        if let Some(q) = t.quotes.iter_mut().find(|q| q.quote_id == id) {
          q.is_active = value;
        }
      }
      Collection::Messages => {
        if let Some(m) = t.messages.iter_mut().find(|m| m.message_id == id) {
          m.is_displayed = value;
        }
      }
    }
    Ok(())
  }

  async fn add_message(&self, input: NewMessage) -> Result<Message, MemoryError> {
    let message = Message {
      message_id:   Uuid::new_v4(),
      text:         input.text,
      is_displayed: false,
      created_at:   Utc::now(),
    };
    self.tables().messages.push(message.clone());
    Ok(message)
  }

  async fn get_message(&self, id: Uuid) -> Result<Option<Message>, MemoryError> {
    Ok(self.tables().messages.iter().find(|m| m.message_id == id).cloned())
  }

  async fn list_messages(&self) -> Result<Vec<Message>, MemoryError> {
    Ok(self.tables().messages.clone())
  }

  async fn delete_message(&self, id: Uuid) -> Result<bool, MemoryError> {
    let mut t = self.tables();
    let before = t.messages.len();
    t.messages.retain(|m| m.message_id != id);
    Ok(t.messages.len() != before)
  }

  async fn add_profile(&self, input: NewProfile) -> Result<Profile, MemoryError> {
    {
      let t = self.tables();
      if t.profiles.iter().any(|p| p.user_id == input.user_id) {
        return Err(MemoryError::Unique("profiles.user_id"));
      }
      if t.profiles.iter().any(|p| p.username == input.username) {
        return Err(MemoryError::Unique("profiles.username"));
      }
    }
    let profile = Profile {
      user_id:            input.user_id,
      username:           input.username,
      email:              input.email,
      first_name:         input.first_name,
      subscribed:         false,
      favourite_quote_id: None,
      created_at:         Utc::now(),
    };
    self.tables().profiles.push(profile.clone());
    Ok(profile)
  }

  async fn get_profile(&self, user_id: Uuid) -> Result<Option<Profile>, MemoryError> {
    Ok(self.tables().profiles.iter().find(|p| p.user_id == user_id).cloned())
  }

  async fn find_profile_by_username<'a>(
    &'a self,
    username: &'a str,
  ) -> Result<Option<Profile>, MemoryError> {
    Ok(self.tables().profiles.iter().find(|p| p.username == username).cloned())
  }

  async fn list_profiles(&self, subscribed_only: bool) -> Result<Vec<Profile>, MemoryError> {
    Ok(
      self
        .tables()
        .profiles
        .iter()
        .filter(|p| !subscribed_only || p.subscribed)
        .cloned()
        .collect(),
    )
  }

  async fn update_profile(&self, profile: Profile) -> Result<(), MemoryError> {
    let mut t = self.tables();
    if let Some(p) = t.profiles.iter_mut().find(|p| p.user_id == profile.user_id) {
      *p = profile;
    }
    Ok(())
  }
}

// ─── Transport ───────────────────────────────────────────────────────────────

#[derive(Debug, thiserror::Error)]
#[error("recipient rejected: {0}")]
pub struct Rejected(pub String);

/// Records every accepted mail; rejects the configured addresses.
#[derive(Default)]
pub struct RecordingTransport {
  sent:   Mutex<Vec<Mail>>,
  reject: Vec<String>,
}

impl RecordingTransport {
  pub fn failing_for(addresses: &[&str]) -> Self {
    Self {
      sent:   Mutex::default(),
      reject: addresses.iter().map(|a| (*a).to_owned()).collect(),
    }
  }

  pub fn sent(&self) -> Vec<Mail> { self.sent.lock().unwrap().clone() }
}

impl Transport for RecordingTransport {
  type Error = Rejected;

  async fn send<'a>(&'a self, mail: &'a Mail) -> Result<(), Rejected> {
    if self.reject.contains(&mail.to) {
      return Err(Rejected(mail.to.clone()));
    }
    self.sent.lock().unwrap().push(mail.clone());
    Ok(())
  }
}
