//! Keeps popularity counters below the `i32` ceiling.
//!
//! When any counter reaches the threshold, every counter is halved. Relative
//! order survives (up to ties created by truncation) and the operator is
//! told about it.

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::{
  Error, Result,
  mail::SiteInfo,
  notify::{Transport, warn_operator},
  store::QuoteStore,
};

/// Leaves ~147 million votes of headroom below `i32::MAX` for votes that
/// land between the check and the rescale.
pub const DEFAULT_POPULARITY_THRESHOLD: i32 = 2_000_000_000;

/// Text of the operator warning sent after a rescale.
pub const RESCALE_WARNING: &str =
  "WARNING: All quote popularities are now being divided by half";

/// What a guard run did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum RescaleOutcome {
  /// The highest counter (0 for an empty collection) was below the
  /// threshold.
  Unchanged { max: i32 },
  /// Every counter was halved.
  Rescaled {
    previous_max: i32,
    quotes:       usize,
    /// Whether the operator warning was accepted by the transport.
    warned:       bool,
  },
}

/// Halve every popularity counter if the largest one is at or above
/// `threshold`, then warn the operator.
///
/// The rescale is persisted before the warning is sent; a failed warning is
/// logged and reported in the outcome, not returned as an error.
pub async fn check_and_rescale<S, T>(
  store: &S,
  threshold: i32,
  transport: &T,
  site: &SiteInfo,
) -> Result<RescaleOutcome>
where
  S: QuoteStore,
  T: Transport,
{
  let quotes = store.list_quotes().await.map_err(Error::store)?;
  let max = quotes.iter().map(|q| q.popularity).max().unwrap_or(0);

  if max < threshold {
    return Ok(RescaleOutcome::Unchanged { max });
  }

  let updates: Vec<_> = quotes
    .iter()
    .map(|q| (q.quote_id, q.popularity / 2))
    .collect();
  let count = updates.len();
  store.set_popularities(updates).await.map_err(Error::store)?;
  info!(previous_max = max, quotes = count, "halved all quote popularities");

  let warned = match warn_operator(transport, site, RESCALE_WARNING).await {
    Ok(()) => true,
    Err(e) => {
      warn!(error = %e, "could not mail the rescale warning to the operator");
      false
    }
  };

  Ok(RescaleOutcome::Rescaled { previous_max: max, quotes: count, warned })
}
