//! Async HTTP client wrapping the welove JSON API.

use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::{Serialize, de::DeserializeOwned};
use serde_json::{Value, json};
use tracing::debug;
use uuid::Uuid;
use welove_core::{
  message::{Message, NewMessage},
  poll::PollChoice,
  popularity::RescaleOutcome,
  profile::{NewProfile, Profile, ProfileUpdate},
  quote::{NewQuote, NewSource, Quote, Source},
  service::RotationSummary,
};

/// Connection settings for the welove API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
  pub base_url: String,
  pub username: String,
  pub password: String,
}

/// Async HTTP client for the welove JSON REST API.
///
/// Cheap to clone; the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Clone)]
pub struct ApiClient {
  client: Client,
  config: ApiConfig,
}

impl ApiClient {
  pub fn new(config: ApiConfig) -> Result<Self> {
    let client = Client::builder()
      .timeout(Duration::from_secs(30))
      .build()
      .context("failed to build HTTP client")?;
    Ok(Self { client, config })
  }

  fn url(&self, path: &str) -> String {
    format!("{}/api{}", self.config.base_url.trim_end_matches('/'), path)
  }

  fn request(&self, method: Method, path: &str) -> RequestBuilder {
    debug!(%method, path, "api request");
    let req = self.client.request(method, self.url(path));
    if self.config.username.is_empty() {
      req
    } else {
      req.basic_auth(&self.config.username, Some(&self.config.password))
    }
  }

  /// Send `req` and fail with the server's `{"error": ...}` text on a
  /// non-success status.
  async fn send(&self, req: RequestBuilder, what: &str) -> Result<Response> {
    let resp = req.send().await.with_context(|| format!("{what} failed"))?;
    let status = resp.status();
    if status.is_success() {
      return Ok(resp);
    }
    let detail = resp
      .json::<Value>()
      .await
      .ok()
      .and_then(|v| v.get("error").and_then(Value::as_str).map(str::to_owned))
      .unwrap_or_default();
    Err(anyhow!("{what} → {status} {detail}"))
  }

  async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
    let what = format!("GET {path}");
    let resp = self.send(self.request(Method::GET, path), &what).await?;
    resp.json().await.with_context(|| format!("deserialising {path}"))
  }

  async fn post<B, T>(&self, path: &str, body: &B) -> Result<T>
  where
    B: Serialize + ?Sized,
    T: DeserializeOwned,
  {
    let what = format!("POST {path}");
    let resp = self
      .send(self.request(Method::POST, path).json(body), &what)
      .await?;
    resp.json().await.with_context(|| format!("deserialising {path}"))
  }

  /// A request whose response carries no body of interest.
  async fn call(&self, method: Method, path: &str) -> Result<()> {
    let what = format!("{method} {path}");
    self.send(self.request(method, path), &what).await?;
    Ok(())
  }

  // ── Quote of the day ──────────────────────────────────────────────────────

  /// `GET /api/daily`
  pub async fn daily(&self) -> Result<Option<Quote>> {
    let quotes: Vec<Quote> = self.get("/daily").await?;
    Ok(quotes.into_iter().next())
  }

  /// `GET /api/quotes/random`
  pub async fn random(&self) -> Result<Quote> { self.get("/quotes/random").await }

  // ── Sources ───────────────────────────────────────────────────────────────

  pub async fn list_sources(&self) -> Result<Vec<Source>> { self.get("/sources").await }

  pub async fn add_source(&self, input: &NewSource) -> Result<Source> {
    self.post("/sources", input).await
  }

  pub async fn delete_source(&self, id: Uuid) -> Result<()> {
    self.call(Method::DELETE, &format!("/sources/{id}")).await
  }

  // ── Quotes ────────────────────────────────────────────────────────────────

  pub async fn list_quotes(&self) -> Result<Vec<Quote>> { self.get("/quotes").await }

  pub async fn get_quote(&self, id: Uuid) -> Result<Quote> {
    self.get(&format!("/quotes/{id}")).await
  }

  pub async fn add_quote(&self, input: &NewQuote) -> Result<Quote> {
    self.post("/quotes", input).await
  }

  pub async fn delete_quote(&self, id: Uuid) -> Result<()> {
    self.call(Method::DELETE, &format!("/quotes/{id}")).await
  }

  pub async fn activate_quote(&self, id: Uuid) -> Result<Quote> {
    self.post(&format!("/quotes/{id}/activate"), &json!({})).await
  }

  pub async fn deactivate_quotes(&self) -> Result<()> {
    self.call(Method::POST, "/quotes/deactivate").await
  }

  // ── Messages ──────────────────────────────────────────────────────────────

  pub async fn list_messages(&self) -> Result<Vec<Message>> { self.get("/messages").await }

  pub async fn add_message(&self, input: &NewMessage) -> Result<Message> {
    self.post("/messages", input).await
  }

  pub async fn delete_message(&self, id: Uuid) -> Result<()> {
    self.call(Method::DELETE, &format!("/messages/{id}")).await
  }

  pub async fn display_message(&self, id: Uuid) -> Result<Message> {
    self.post(&format!("/messages/{id}/display"), &json!({})).await
  }

  pub async fn hide_messages(&self) -> Result<()> {
    self.call(Method::POST, "/messages/hide").await
  }

  // ── Poll ──────────────────────────────────────────────────────────────────

  pub async fn poll(&self) -> Result<Vec<PollChoice>> { self.get("/poll").await }

  pub async fn vote(&self, quote_id: Uuid) -> Result<Quote> {
    self.post("/poll", &json!({ "quote_id": quote_id })).await
  }

  // ── Profiles ──────────────────────────────────────────────────────────────

  pub async fn list_profiles(&self, subscribed_only: bool) -> Result<Vec<Profile>> {
    self
      .get(&format!("/profiles?subscribed={subscribed_only}"))
      .await
  }

  pub async fn get_profile(&self, user_id: Uuid) -> Result<Profile> {
    self.get(&format!("/profiles/{user_id}")).await
  }

  pub async fn register_profile(&self, input: &NewProfile) -> Result<Profile> {
    self.post("/profiles", input).await
  }

  pub async fn update_profile(&self, user_id: Uuid, update: &ProfileUpdate) -> Result<Profile> {
    let path = format!("/profiles/{user_id}");
    let what = format!("PATCH {path}");
    let resp = self
      .send(self.request(Method::PATCH, &path).json(update), &what)
      .await?;
    resp.json().await.context("deserialising profile")
  }

  // ── Jobs ──────────────────────────────────────────────────────────────────

  pub async fn rotate(&self) -> Result<RotationSummary> {
    self.post("/jobs/rotate", &json!({})).await
  }

  pub async fn rescale(&self) -> Result<RescaleOutcome> {
    self.post("/jobs/popularity", &json!({})).await
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn client(base_url: &str) -> ApiClient {
    ApiClient::new(ApiConfig {
      base_url: base_url.into(),
      username: String::new(),
      password: String::new(),
    })
    .unwrap()
  }

  #[test]
  fn url_joins_api_prefix_without_double_slash() {
    assert_eq!(client("http://localhost:8000/").url("/quotes"), "http://localhost:8000/api/quotes");
    assert_eq!(client("http://localhost:8000").url("/daily"), "http://localhost:8000/api/daily");
  }
}
