//! Handlers for `/sources` endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/sources` | |
//! | `POST`   | `/sources` | Body: `{"name":"Contrast","link":"https://..."}` |
//! | `GET`    | `/sources/:id` | 404 if not found |
//! | `DELETE` | `/sources/:id` | Deletes the source's quotes too |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use uuid::Uuid;
use welove_core::{
  QuoteService,
  notify::Transport,
  quote::{NewSource, Source},
  store::QuoteStore,
};

use crate::error::ApiError;

/// `GET /sources`
pub async fn list<S, T>(
  State(svc): State<Arc<QuoteService<S, T>>>,
) -> Result<Json<Vec<Source>>, ApiError>
where
  S: QuoteStore,
  T: Transport,
{
  Ok(Json(svc.list_sources().await?))
}

/// `POST /sources`
pub async fn create<S, T>(
  State(svc): State<Arc<QuoteService<S, T>>>,
  Json(body): Json<NewSource>,
) -> Result<impl IntoResponse, ApiError>
where
  S: QuoteStore,
  T: Transport,
{
  let source = svc.add_source(body).await?;
  Ok((StatusCode::CREATED, Json(source)))
}

/// `GET /sources/:id`
pub async fn get_one<S, T>(
  State(svc): State<Arc<QuoteService<S, T>>>,
  Path(id): Path<Uuid>,
) -> Result<Json<Source>, ApiError>
where
  S: QuoteStore,
  T: Transport,
{
  Ok(Json(svc.get_source(id).await?))
}

/// `DELETE /sources/:id`
pub async fn delete_one<S, T>(
  State(svc): State<Arc<QuoteService<S, T>>>,
  Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError>
where
  S: QuoteStore,
  T: Transport,
{
  svc.delete_source(id).await?;
  Ok(StatusCode::NO_CONTENT)
}
