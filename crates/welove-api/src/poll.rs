//! Handlers for `/poll`.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/poll` | Four choices; placeholders carry `"quote_id": null` |
//! | `POST` | `/poll` | Body: `{"quote_id":"..."}`; returns the quote with its new popularity |

use std::sync::Arc;

use axum::{Json, extract::State};
use serde::Deserialize;
use uuid::Uuid;
use welove_core::{
  QuoteService,
  notify::Transport,
  poll::PollChoice,
  quote::Quote,
  store::QuoteStore,
};

use crate::error::ApiError;

/// `GET /poll`
pub async fn choices<S, T>(
  State(svc): State<Arc<QuoteService<S, T>>>,
) -> Result<Json<Vec<PollChoice>>, ApiError>
where
  S: QuoteStore,
  T: Transport,
{
  Ok(Json(svc.poll().await?))
}

#[derive(Debug, Deserialize)]
pub struct VoteBody {
  /// `None` is what a placeholder choice carries.
  pub quote_id: Option<Uuid>,
}

/// `POST /poll`
pub async fn vote<S, T>(
  State(svc): State<Arc<QuoteService<S, T>>>,
  Json(body): Json<VoteBody>,
) -> Result<Json<Quote>, ApiError>
where
  S: QuoteStore,
  T: Transport,
{
  let quote_id = body
    .quote_id
    .ok_or_else(|| ApiError::BadRequest("placeholder choices cannot be voted for".into()))?;
  Ok(Json(svc.vote(quote_id).await?))
}
