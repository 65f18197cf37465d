//! The welove web server.
//!
//! Serves the visitor pages, mounts the JSON API under `/api` behind HTTP
//! Basic auth, and runs the rotation and popularity jobs.

pub mod auth;
pub mod error;
pub mod mail;
pub mod pages;
pub mod scheduler;

pub use error::Error;

use std::{path::PathBuf, sync::Arc, time::Duration};

use axum::{Router, middleware, routing::get};
use serde::Deserialize;
use tower_http::trace::TraceLayer;
use welove_core::{
  QuoteService, mail::SiteInfo, notify::Transport,
  popularity::DEFAULT_POPULARITY_THRESHOLD, store::QuoteStore,
};

use auth::AuthConfig;

// ─── Configuration ───────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` and
/// `WELOVE_*` environment variables. Every key has a default.
#[derive(Deserialize, Clone, Debug)]
#[serde(default)]
pub struct ServerConfig {
  pub host:                     String,
  pub port:                     u16,
  pub store_path:               PathBuf,
  pub auth_username:            String,
  pub auth_password_hash:       String,
  pub site_domain:              String,
  pub common_origin:            String,
  pub type_of_source:           String,
  pub operator_email:           String,
  /// Email preference page linked from the daily mail.
  pub preferences_url:          Option<String>,
  /// Mail is only logged when unset.
  pub mail_relay_url:           Option<String>,
  pub mail_from:                String,
  pub rotation_interval_secs:   u64,
  pub popularity_interval_secs: u64,
  pub popularity_threshold:     i32,
}

impl Default for ServerConfig {
  fn default() -> Self {
    let site = SiteInfo::default();
    Self {
      host:                     "127.0.0.1".into(),
      port:                     8000,
      store_path:               PathBuf::from("welove.sqlite3"),
      auth_username:            "admin".into(),
      auth_password_hash:       String::new(),
      site_domain:              site.domain,
      common_origin:            site.common_origin,
      type_of_source:           site.type_of_source,
      operator_email:           site.operator_email,
      preferences_url:          site.preferences_url,
      mail_relay_url:           None,
      mail_from:                "noreply@localhost".into(),
      rotation_interval_secs:   24 * 60 * 60,
      popularity_interval_secs: 24 * 60 * 60,
      popularity_threshold:     DEFAULT_POPULARITY_THRESHOLD,
    }
  }
}

impl ServerConfig {
  pub fn site_info(&self) -> SiteInfo {
    SiteInfo {
      domain:          self.site_domain.clone(),
      common_origin:   self.common_origin.clone(),
      type_of_source:  self.type_of_source.clone(),
      operator_email:  self.operator_email.clone(),
      preferences_url: self.preferences_url.clone(),
    }
  }

  pub fn auth_config(&self) -> AuthConfig {
    AuthConfig {
      username:      self.auth_username.clone(),
      password_hash: self.auth_password_hash.clone(),
    }
  }

  pub fn rotation_interval(&self) -> Duration {
    Duration::from_secs(self.rotation_interval_secs.max(1))
  }

  pub fn popularity_interval(&self) -> Duration {
    Duration::from_secs(self.popularity_interval_secs.max(1))
  }
}

// ─── Application state ───────────────────────────────────────────────────────

/// Shared state threaded through the page handlers.
pub struct AppState<S, T> {
  pub service: Arc<QuoteService<S, T>>,
  pub auth:    Arc<AuthConfig>,
}

impl<S, T> Clone for AppState<S, T> {
  fn clone(&self) -> Self {
    Self {
      service: self.service.clone(),
      auth:    self.auth.clone(),
    }
  }
}

// ─── Router ──────────────────────────────────────────────────────────────────

/// Build the full application router.
pub fn router<S, T>(state: AppState<S, T>) -> Router
where
  S: QuoteStore + 'static,
  T: Transport + 'static,
{
  let api = welove_api::api_router(state.service.clone()).layer(
    middleware::from_fn_with_state(state.auth.clone(), auth::require_auth),
  );

  Router::new()
    .route("/",       get(pages::index::<S, T>))
    .route("/daily",  get(pages::daily::<S, T>))
    .route("/random", get(pages::random::<S, T>))
    .route("/poll",   get(pages::poll::<S, T>).post(pages::vote::<S, T>))
    .with_state(state)
    .nest("/api", api)
    .layer(TraceLayer::new_for_http())
}
