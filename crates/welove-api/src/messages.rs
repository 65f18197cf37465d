//! Handlers for the site message banner.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/message` | The displayed message, or `null` |
//! | `GET`    | `/messages` | |
//! | `POST`   | `/messages` | Body: `{"text":"..."}` |
//! | `POST`   | `/messages/hide` | Hides the banner |
//! | `GET`    | `/messages/:id` | |
//! | `DELETE` | `/messages/:id` | |
//! | `POST`   | `/messages/:id/display` | Shows `:id` and hides any other |

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
  message::{Message, NewMessage},
  notify::Transport,
  store::QuoteStore,
};

use crate::error::ApiError;

/// `GET /message`
pub async fn displayed<S, T>(
  State(svc): State<Arc<QuoteService<S, T>>>,
) -> Result<Json<Option<Message>>, ApiError>
where
  S: QuoteStore,
  T: Transport,
{
  Ok(Json(svc.displayed_message().await?))
}

/// `GET /messages`
pub async fn list<S, T>(
  State(svc): State<Arc<QuoteService<S, T>>>,
) -> Result<Json<Vec<Message>>, ApiError>
where
  S: QuoteStore,
  T: Transport,
{
  Ok(Json(svc.list_messages().await?))
}

/// `POST /messages`
pub async fn create<S, T>(
  State(svc): State<Arc<QuoteService<S, T>>>,
  Json(body): Json<NewMessage>,
) -> Result<impl IntoResponse, ApiError>
where
  S: QuoteStore,
  T: Transport,
{
  let message = svc.add_message(body).await?;
  Ok((StatusCode::CREATED, Json(message)))
}

/// `GET /messages/:id`
pub async fn get_one<S, T>(
  State(svc): State<Arc<QuoteService<S, T>>>,
  Path(id): Path<Uuid>,
) -> Result<Json<Message>, ApiError>
where
  S: QuoteStore,
  T: Transport,
{
  Ok(Json(svc.get_message(id).await?))
}

/// `DELETE /messages/:id`
pub async fn delete_one<S, T>(
  State(svc): State<Arc<QuoteService<S, T>>>,
  Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError>
where
  S: QuoteStore,
  T: Transport,
{
  svc.delete_message(id).await?;
  Ok(StatusCode::NO_CONTENT)
}

/// `POST /messages/:id/display`
pub async fn display<S, T>(
  State(svc): State<Arc<QuoteService<S, T>>>,
  Path(id): Path<Uuid>,
) -> Result<Json<Message>, ApiError>
where
  S: QuoteStore,
  T: Transport,
{
  Ok(Json(svc.display_message(id).await?))
}

/// `POST /messages/hide`
pub async fn hide<S, T>(
  State(svc): State<Arc<QuoteService<S, T>>>,
) -> Result<StatusCode, ApiError>
where
  S: QuoteStore,
  T: Transport,
{
  svc.hide_messages().await?;
  Ok(StatusCode::NO_CONTENT)
}
