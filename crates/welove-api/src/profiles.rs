//! Handlers for `/profiles` endpoints.
//!
//! | Method  | Path | Notes |
//! |---------|------|-------|
//! | `GET`   | `/profiles` | Optional `?subscribed=true` |
//! | `POST`  | `/profiles` | Registers a profile and sends the welcome mail |
//! | `GET`   | `/profiles/:user_id` | |
//! | `PATCH` | `/profiles/:user_id` | Body: any of `first_name`, `subscribed`, `favourite_quote_id`, `clear_favourite` |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use serde::Deserialize;
use uuid::Uuid;
use welove_core::{
  QuoteService,
  notify::Transport,
  profile::{NewProfile, Profile, ProfileUpdate},
  store::QuoteStore,
};

use crate::error::ApiError;

#[derive(Debug, Deserialize)]
pub struct ListParams {
  #[serde(default)]
  pub subscribed: bool,
}

/// `GET /profiles[?subscribed=true]`
pub async fn list<S, T>(
  State(svc): State<Arc<QuoteService<S, T>>>,
  Query(params): Query<ListParams>,
) -> Result<Json<Vec<Profile>>, ApiError>
where
  S: QuoteStore,
  T: Transport,
{
  Ok(Json(svc.list_profiles(params.subscribed).await?))
}

/// `POST /profiles`
pub async fn register<S, T>(
  State(svc): State<Arc<QuoteService<S, T>>>,
  Json(body): Json<NewProfile>,
) -> Result<impl IntoResponse, ApiError>
where
  S: QuoteStore,
  T: Transport,
{
  let profile = svc.register_profile(body).await?;
  Ok((StatusCode::CREATED, Json(profile)))
}

/// `GET /profiles/:user_id`
pub async fn get_one<S, T>(
  State(svc): State<Arc<QuoteService<S, T>>>,
  Path(user_id): Path<Uuid>,
) -> Result<Json<Profile>, ApiError>
where
  S: QuoteStore,
  T: Transport,
{
  Ok(Json(svc.get_profile(user_id).await?))
}

/// `PATCH /profiles/:user_id`
pub async fn update<S, T>(
  State(svc): State<Arc<QuoteService<S, T>>>,
  Path(user_id): Path<Uuid>,
  Json(body): Json<ProfileUpdate>,
) -> Result<Json<Profile>, ApiError>
where
  S: QuoteStore,
  T: Transport,
{
  Ok(Json(svc.update_profile(user_id, body).await?))
}
