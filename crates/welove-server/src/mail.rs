//! Mail transports used by the server.
//!
//! With `mail_relay_url` configured, every mail is POSTed as JSON to that
//! relay. Without it the mail is written to the log, which is enough for
//! local development.

use reqwest::StatusCode;
use serde::Serialize;
use thiserror::Error;
use tracing::info;
use welove_core::{mail::Mail, notify::Transport};

#[derive(Debug, Error)]
pub enum MailError {
  #[error("mail relay request failed: {0}")]
  Http(#[from] reqwest::Error),

  #[error("mail relay answered {0}")]
  Rejected(StatusCode),
}

// ─── Relay ───────────────────────────────────────────────────────────────────

/// JSON body sent to the relay.
#[derive(Debug, Serialize)]
struct RelayMessage<'a> {
  from:    &'a str,
  to:      &'a str,
  subject: &'a str,
  text:    &'a str,
}

/// Delivers through an HTTP mail relay.
#[derive(Clone)]
pub struct RelayTransport {
  client: reqwest::Client,
  url:    String,
  from:   String,
}

impl RelayTransport {
  pub fn new(url: impl Into<String>, from: impl Into<String>) -> Self {
    Self {
      client: reqwest::Client::new(),
      url:    url.into(),
      from:   from.into(),
    }
  }

  async fn post(&self, mail: &Mail) -> Result<(), MailError> {
    let body = RelayMessage {
      from:    &self.from,
      to:      &mail.to,
      subject: &mail.title,
      text:    &mail.body,
    };
    let resp = self.client.post(&self.url).json(&body).send().await?;
    if resp.status().is_success() {
      Ok(())
    } else {
      Err(MailError::Rejected(resp.status()))
    }
  }
}

// ─── Transport ───────────────────────────────────────────────────────────────

/// The transport picked at startup.
#[derive(Clone)]
pub enum MailTransport {
  Relay(RelayTransport),
  /// Writes each mail to the log and reports success.
  Log,
}

impl Transport for MailTransport {
  type Error = MailError;

  async fn send<'a>(&'a self, mail: &'a Mail) -> Result<(), MailError> {
    match self {
      MailTransport::Relay(relay) => relay.post(mail).await,
      MailTransport::Log => {
        info!(to = %mail.to, title = %mail.title, body = %mail.body, "mail (log transport)");
        Ok(())
      }
    }
  }
}

#[cfg(test)]
mod tests {
  use std::sync::{Arc, Mutex};

  use axum::{Json, Router, extract::State, http::StatusCode, routing::post};
  use serde_json::Value;
  use tokio::net::TcpListener;

  use super::*;

  fn mail() -> Mail {
    Mail {
      title: "Your daily quote from City Of Sound".into(),
      body:  "Today's quote".into(),
      to:    "pal@email.com".into(),
    }
  }

  /// Start a relay on an ephemeral port that answers with `status` and keeps
  /// every body it receives.
  async fn fake_relay(status: StatusCode) -> (String, Arc<Mutex<Vec<Value>>>) {
    let received = Arc::new(Mutex::new(Vec::new()));
    let app = Router::new()
      .route(
        "/send",
        post(
          move |State(seen): State<Arc<Mutex<Vec<Value>>>>, Json(body): Json<Value>| async move {
            seen.lock().unwrap().push(body);
            status
          },
        ),
      )
      .with_state(received.clone());

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move { axum::serve(listener, app).await.unwrap() });
    (format!("http://{addr}/send"), received)
  }

  #[tokio::test]
  async fn log_transport_accepts_everything() {
    assert!(MailTransport::Log.send(&mail()).await.is_ok());
  }

  #[tokio::test]
  async fn relay_receives_json_message() {
    let (url, received) = fake_relay(StatusCode::ACCEPTED).await;
    let transport = MailTransport::Relay(RelayTransport::new(url, "noreply@welove"));

    transport.send(&mail()).await.unwrap();

    let received = received.lock().unwrap();
    assert_eq!(received.len(), 1);
    assert_eq!(received[0]["from"], "noreply@welove");
    assert_eq!(received[0]["to"], "pal@email.com");
    assert_eq!(received[0]["subject"], "Your daily quote from City Of Sound");
    assert_eq!(received[0]["text"], "Today's quote");
  }

  #[tokio::test]
  async fn relay_error_status_is_an_error() {
    let (url, _) = fake_relay(StatusCode::SERVICE_UNAVAILABLE).await;
    let transport = MailTransport::Relay(RelayTransport::new(url, "noreply@welove"));

    let err = transport.send(&mail()).await.unwrap_err();
    assert!(matches!(err, MailError::Rejected(s) if s == StatusCode::SERVICE_UNAVAILABLE));
  }
}
