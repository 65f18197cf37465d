//! JSON REST API for welove.
//!
//! Exposes an axum [`Router`] backed by a [`QuoteService`] over any
//! [`QuoteStore`] and mail [`Transport`]. Auth, TLS and transport concerns
//! are the caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", welove_api::api_router(service.clone()))
//! ```

pub mod daily;
pub mod error;
pub mod jobs;
pub mod messages;
pub mod poll;
pub mod profiles;
pub mod quotes;
pub mod sources;

use std::sync::Arc;

use axum::{
  Router,
  routing::{get, post},
};
use welove_core::{QuoteService, notify::Transport, store::QuoteStore};

pub use error::ApiError;

/// Build the API router for `service`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S, T>(service: Arc<QuoteService<S, T>>) -> Router<()>
where
  S: QuoteStore + 'static,
  T: Transport + 'static,
{
  Router::new()
    // Quote of the day
    .route("/daily", get(daily::handler::<S, T>))
    // Sources
    .route("/sources", get(sources::list::<S, T>).post(sources::create::<S, T>))
    .route(
      "/sources/{id}",
      get(sources::get_one::<S, T>).delete(sources::delete_one::<S, T>),
    )
    // Quotes
    .route("/quotes", get(quotes::list::<S, T>).post(quotes::create::<S, T>))
    .route("/quotes/random", get(quotes::random::<S, T>))
    .route("/quotes/deactivate", post(quotes::deactivate::<S, T>))
    .route(
      "/quotes/{id}",
      get(quotes::get_one::<S, T>).delete(quotes::delete_one::<S, T>),
    )
    .route("/quotes/{id}/activate", post(quotes::activate::<S, T>))
    // Messages
    .route("/message", get(messages::displayed::<S, T>))
    .route("/messages", get(messages::list::<S, T>).post(messages::create::<S, T>))
    .route("/messages/hide", post(messages::hide::<S, T>))
    .route(
      "/messages/{id}",
      get(messages::get_one::<S, T>).delete(messages::delete_one::<S, T>),
    )
    .route("/messages/{id}/display", post(messages::display::<S, T>))
    // Poll
    .route("/poll", get(poll::choices::<S, T>).post(poll::vote::<S, T>))
    // Profiles
    .route("/profiles", get(profiles::list::<S, T>).post(profiles::register::<S, T>))
    .route(
      "/profiles/{user_id}",
      get(profiles::get_one::<S, T>).patch(profiles::update::<S, T>),
    )
    // Jobs
    .route("/jobs/rotate", post(jobs::rotate::<S, T>))
    .route("/jobs/popularity", post(jobs::popularity::<S, T>))
    .with_state(service)
}
