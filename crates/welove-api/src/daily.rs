//! `GET /daily`: the active quote as a list of zero or one entries.
//!
//! Responses carry a strong `ETag` derived from the active quote's id and
//! text, so clients polling once a minute get `304 Not Modified` until the
//! next rotation.

use std::sync::Arc;

use axum::{
  Json,
  extract::State,
  http::{HeaderMap, HeaderValue, StatusCode, header},
  response::{IntoResponse, Response},
};
use sha2::{Digest, Sha256};
use welove_core::{QuoteService, notify::Transport, quote::Quote, store::QuoteStore};

use crate::error::ApiError;

/// Compute an ETag for a list of quotes.
///
/// Only identity and text take part; a vote does not change the tag.
pub fn compute_etag(quotes: &[Quote]) -> String {
  let mut hasher = Sha256::new();
  for q in quotes {
    hasher.update(q.quote_id.as_bytes());
    hasher.update(q.text.as_bytes());
    hasher.update([0u8]);
  }
  format!("\"{}\"", hex::encode(hasher.finalize()))
}

fn matches_if_none_match(headers: &HeaderMap, etag: &str) -> bool {
  headers
    .get(header::IF_NONE_MATCH)
    .and_then(|v| v.to_str().ok())
    .is_some_and(|v| v.split(',').any(|t| t.trim() == etag || t.trim() == "*"))
}

/// `GET /daily`
pub async fn handler<S, T>(
  State(svc): State<Arc<QuoteService<S, T>>>,
  headers: HeaderMap,
) -> Result<Response, ApiError>
where
  S: QuoteStore,
  T: Transport,
{
  let active: Vec<Quote> = svc.active_quote().await?.into_iter().collect();
  let etag = compute_etag(&active);

  let mut res = if matches_if_none_match(&headers, &etag) {
    StatusCode::NOT_MODIFIED.into_response()
  } else {
    Json(active).into_response()
  };
  if let Ok(value) = HeaderValue::from_str(&etag) {
    res.headers_mut().insert(header::ETAG, value);
  }
  Ok(res)
}

#[cfg(test)]
mod tests {
  use chrono::Utc;
  use uuid::Uuid;

  use super::*;

  fn quote(text: &str) -> Quote {
    Quote {
      quote_id:   Uuid::new_v4(),
      text:       text.into(),
      source_id:  None,
      is_active:  true,
      popularity: 0,
      created_at: Utc::now(),
    }
  }

  #[test]
  fn popularity_does_not_change_etag() {
    let mut q = quote("a");
    let before = compute_etag(std::slice::from_ref(&q));
    q.popularity += 10;
    assert_eq!(before, compute_etag(&[q]));
  }

  #[test]
  fn different_quote_changes_etag() {
    assert_ne!(compute_etag(&[quote("a")]), compute_etag(&[quote("a")]));
    assert_ne!(compute_etag(&[]), compute_etag(&[quote("a")]));
  }

  #[test]
  fn if_none_match_accepts_lists_and_wildcard() {
    let mut headers = HeaderMap::new();
    headers.insert(header::IF_NONE_MATCH, HeaderValue::from_static("\"x\", \"y\""));
    assert!(matches_if_none_match(&headers, "\"y\""));
    assert!(!matches_if_none_match(&headers, "\"z\""));

    headers.insert(header::IF_NONE_MATCH, HeaderValue::from_static("*"));
    assert!(matches_if_none_match(&headers, "\"z\""));
  }
}
