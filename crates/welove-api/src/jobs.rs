//! On-demand runs of the scheduled jobs.

use std::sync::Arc;

use axum::{Json, extract::State};
use welove_core::{
  QuoteService,
  notify::Transport,
  popularity::RescaleOutcome,
  service::RotationSummary,
  store::QuoteStore,
};

use crate::error::ApiError;

/// `POST /jobs/rotate`: rotate and mail subscribers, waiting for the fan-out.
pub async fn rotate<S, T>(
  State(svc): State<Arc<QuoteService<S, T>>>,
) -> Result<Json<RotationSummary>, ApiError>
where
  S: QuoteStore,
  T: Transport,
{
  Ok(Json(svc.run_daily_rotation().await?))
}

/// `POST /jobs/popularity`
pub async fn popularity<S, T>(
  State(svc): State<Arc<QuoteService<S, T>>>,
) -> Result<Json<RescaleOutcome>, ApiError>
where
  S: QuoteStore,
  T: Transport,
{
  Ok(Json(svc.guard_popularity().await?))
}
