//! The daily rotation: retire the current quote of the day and pick a new
//! one at random.

use rand::Rng;
use tracing::info;

use crate::{
  Error, Result,
  quote::Quote,
  random::pick_random,
  selection::{activate_one, deactivate_all},
  store::{Collection, QuoteStore},
};

/// Clear the active quote, then activate a uniformly random one.
///
/// Returns the newly active quote, or `None` if there are no quotes (in
/// which case nothing is active afterwards). If a write fails part-way the
/// error is returned and no quote may be active; the next run repairs that.
pub async fn rotate_daily_quote<S, R>(store: &S, rng: &mut R) -> Result<Option<Quote>>
where
  S: QuoteStore,
  R: Rng + Send + ?Sized,
{
  deactivate_all(store, Collection::Quotes).await?;

  let quotes = store.list_quotes().await.map_err(Error::store)?;
  let Some(picked) = pick_random(&quotes, rng).cloned() else {
    info!("no quotes available, daily quote left unset");
    return Ok(None);
  };

  activate_one(store, Collection::Quotes, picked.quote_id).await?;
  info!(quote_id = %picked.quote_id, "new daily quote selected");

  Ok(Some(Quote { is_active: true, ..picked }))
}
