//! Handlers for `/quotes` endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/quotes` | |
//! | `POST`   | `/quotes` | Body: `{"text":"...","source_id":null}`; 409 on duplicate text |
//! | `GET`    | `/quotes/random` | 404 when there are no quotes |
//! | `POST`   | `/quotes/deactivate` | No quote of the day until the next rotation |
//! | `GET`    | `/quotes/:id` | |
//! | `DELETE` | `/quotes/:id` | |
//! | `POST`   | `/quotes/:id/activate` | Makes `:id` the quote of the day |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use tracing::info;
use uuid::Uuid;
use welove_core::{
  QuoteService,
  notify::Transport,
  quote::{NewQuote, Quote},
  store::QuoteStore,
};

use crate::error::ApiError;

/// `GET /quotes`
pub async fn list<S, T>(
  State(svc): State<Arc<QuoteService<S, T>>>,
) -> Result<Json<Vec<Quote>>, ApiError>
where
  S: QuoteStore,
  T: Transport,
{
  Ok(Json(svc.list_quotes().await?))
}

/// `POST /quotes`
pub async fn create<S, T>(
  State(svc): State<Arc<QuoteService<S, T>>>,
  Json(body): Json<NewQuote>,
) -> Result<impl IntoResponse, ApiError>
where
  S: QuoteStore,
  T: Transport,
{
  let quote = svc.add_quote(body).await?;
  Ok((StatusCode::CREATED, Json(quote)))
}

/// `GET /quotes/:id`
pub async fn get_one<S, T>(
  State(svc): State<Arc<QuoteService<S, T>>>,
  Path(id): Path<Uuid>,
) -> Result<Json<Quote>, ApiError>
where
  S: QuoteStore,
  T: Transport,
{
  Ok(Json(svc.get_quote(id).await?))
}

/// `DELETE /quotes/:id`
pub async fn delete_one<S, T>(
  State(svc): State<Arc<QuoteService<S, T>>>,
  Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError>
where
  S: QuoteStore,
  T: Transport,
{
  svc.delete_quote(id).await?;
  Ok(StatusCode::NO_CONTENT)
}

/// `GET /quotes/random`
pub async fn random<S, T>(
  State(svc): State<Arc<QuoteService<S, T>>>,
) -> Result<Json<Quote>, ApiError>
where
  S: QuoteStore,
  T: Transport,
{
  svc
    .random_quote()
    .await?
    .map(Json)
    .ok_or_else(|| ApiError::NotFound("there are no quotes".into()))
}

/// `POST /quotes/:id/activate`
pub async fn activate<S, T>(
  State(svc): State<Arc<QuoteService<S, T>>>,
  Path(id): Path<Uuid>,
) -> Result<Json<Quote>, ApiError>
where
  S: QuoteStore,
  T: Transport,
{
  Ok(Json(svc.activate_quote(id).await?))
}

/// `POST /quotes/deactivate`
pub async fn deactivate<S, T>(
  State(svc): State<Arc<QuoteService<S, T>>>,
) -> Result<StatusCode, ApiError>
where
  S: QuoteStore,
  T: Transport,
{
  svc.deactivate_quotes().await?;
  info!("quote of the day cleared");
  Ok(StatusCode::NO_CONTENT)
}
