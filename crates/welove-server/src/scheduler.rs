//! Interval jobs: the daily rotation and the popularity guard.
//!
//! Each job runs on its own tokio task. A failed run is logged and the job
//! tries again at the next tick; nothing here ever stops the server.

use std::{sync::Arc, time::Duration};

use tokio::{
  task::JoinHandle,
  time::{Instant, MissedTickBehavior, interval_at},
};
use tracing::{error, info};
use welove_core::{
  QuoteService, notify::Transport, popularity::RescaleOutcome, store::QuoteStore,
};

/// Start both jobs.
pub fn spawn<S, T>(
  service: Arc<QuoteService<S, T>>,
  rotation_every: Duration,
  popularity_every: Duration,
) -> (JoinHandle<()>, JoinHandle<()>)
where
  S: QuoteStore + 'static,
  T: Transport + 'static,
{
  let rotation = tokio::spawn(rotation_loop(service.clone(), rotation_every));
  let popularity = tokio::spawn(popularity_loop(service, popularity_every));
  (rotation, popularity)
}

async fn rotation_loop<S, T>(service: Arc<QuoteService<S, T>>, period: Duration)
where
  S: QuoteStore + 'static,
  T: Transport + 'static,
{
  // A restart must not skip a day, nor replace a quote already chosen today.
  match service.active_quote().await {
    Ok(Some(_)) => {}
    Ok(None) => {
      rotation_tick(&service).await;
    }
    Err(e) => error!(error = %e, "could not read the active quote at startup"),
  }

  let mut ticker = interval_at(Instant::now() + period, period);
  ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
  loop {
    ticker.tick().await;
    rotation_tick(&service).await;
  }
}

async fn popularity_loop<S, T>(service: Arc<QuoteService<S, T>>, period: Duration)
where
  S: QuoteStore + 'static,
  T: Transport + 'static,
{
  let mut ticker = interval_at(Instant::now() + period, period);
  ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
  loop {
    ticker.tick().await;
    popularity_tick(&service).await;
  }
}

/// One rotation. The subscriber fan-out runs on a separate task, whose
/// handle is returned.
pub async fn rotation_tick<S, T>(service: &Arc<QuoteService<S, T>>) -> Option<JoinHandle<()>>
where
  S: QuoteStore + 'static,
  T: Transport + 'static,
{
  let quote = match service.rotate().await {
    Ok(Some(quote)) => quote,
    Ok(None) => {
      info!("no quotes to rotate");
      return None;
    }
    Err(e) => {
      error!(error = %e, "daily rotation failed; retrying at next tick");
      return None;
    }
  };
  info!(quote_id = %quote.quote_id, "new quote of the day");

  let service = service.clone();
  Some(tokio::spawn(async move {
    if let Err(e) = service.dispatch(&quote).await {
      error!(quote_id = %quote.quote_id, error = %e, "daily quote dispatch failed");
    }
  }))
}

/// One popularity guard run.
pub async fn popularity_tick<S, T>(service: &QuoteService<S, T>)
where
  S: QuoteStore,
  T: Transport,
{
  match service.guard_popularity().await {
    Ok(RescaleOutcome::Unchanged { max }) => {
      info!(max, "popularity counters within bounds");
    }
    Ok(RescaleOutcome::Rescaled { .. }) => {}
    Err(e) => error!(error = %e, "popularity guard failed; retrying at next tick"),
  }
}
