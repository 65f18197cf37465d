//! Site-wide banner messages.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A banner shown at the top of every page while `is_displayed` is set.
/// At most one message is displayed at a time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
  pub message_id:   Uuid,
  pub text:         String,
  pub is_displayed: bool,
  pub created_at:   DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewMessage {
  pub text: String,
}
