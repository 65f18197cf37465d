//! Subscriber profiles.
//!
//! The user account itself lives in an external identity system; a profile
//! carries the handful of identity fields this service needs (who to greet,
//! where to send mail) plus the subscription preferences it owns.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
  /// Identifier assigned by the identity system.
  pub user_id:            Uuid,
  pub username:           String,
  pub email:              String,
  pub first_name:         Option<String>,
  /// Opt-in flag for the daily quote email.
  pub subscribed:         bool,
  /// Cleared automatically when the referenced quote is deleted.
  pub favourite_quote_id: Option<Uuid>,
  pub created_at:         DateTime<Utc>,
}

impl Profile {
  /// The name used in greetings: the first name if set, otherwise the
  /// username, with its first letter capitalised.
  pub fn display_name(&self) -> String {
    let name = self
      .first_name
      .as_deref()
      .filter(|n| !n.trim().is_empty())
      .unwrap_or(&self.username);
    capitalize(name)
  }
}

fn capitalize(s: &str) -> String {
  let mut chars = s.chars();
  match chars.next() {
    Some(first) => first.to_uppercase().chain(chars).collect(),
    None => String::new(),
  }
}

/// Input to [`crate::store::QuoteStore::add_profile`].
/// New profiles start unsubscribed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewProfile {
  pub user_id:    Uuid,
  pub username:   String,
  pub email:      String,
  #[serde(default)]
  pub first_name: Option<String>,
}

/// A partial update; `None` fields are left as they are.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProfileUpdate {
  /// An empty string clears the first name.
  pub first_name:         Option<String>,
  pub subscribed:         Option<bool>,
  pub favourite_quote_id: Option<Uuid>,
  #[serde(default)]
  pub clear_favourite:    bool,
}

impl ProfileUpdate {
  /// Apply this update to `profile` in place.
  pub fn apply(self, profile: &mut Profile) {
    if let Some(first_name) = self.first_name {
      let trimmed = first_name.trim();
      profile.first_name = (!trimmed.is_empty()).then(|| trimmed.to_owned());
    }
    if let Some(subscribed) = self.subscribed {
      profile.subscribed = subscribed;
    }
    if self.clear_favourite {
      profile.favourite_quote_id = None;
    } else if let Some(id) = self.favourite_quote_id {
      profile.favourite_quote_id = Some(id);
    }
  }
}
