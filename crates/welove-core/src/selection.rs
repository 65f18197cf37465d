//! The single-selection rule: within a [`Collection`], at most one record has
//! its flag set.
//!
//! Callers that may run concurrently must serialise these operations per
//! collection (see [`crate::QuoteService`]); the clear-then-set sequence is
//! not atomic on its own.

use tracing::debug;
use uuid::Uuid;

use crate::{
  Error, Result,
  store::{Collection, QuoteStore},
};

/// Clear the flag on every record in `collection` that currently holds it.
///
/// A no-op when nothing is flagged. Returns how many records were cleared.
pub async fn deactivate_all<S: QuoteStore>(
  store: &S,
  collection: Collection,
) -> Result<usize> {
  let flagged = store.flagged(collection).await.map_err(Error::store)?;
  for id in &flagged {
    store
      .set_flag(collection, *id, false)
      .await
      .map_err(Error::store)?;
  }
  if !flagged.is_empty() {
    debug!(?collection, cleared = flagged.len(), "cleared selection flag");
  }
  Ok(flagged.len())
}

/// Set the flag on `id` without touching other records.
///
/// Fails with the collection's not-found error if `id` does not exist.
pub async fn activate_one<S: QuoteStore>(
  store: &S,
  collection: Collection,
  id: Uuid,
) -> Result<()> {
  ensure_exists(store, collection, id).await?;
  store
    .set_flag(collection, id, true)
    .await
    .map_err(Error::store)
}

/// Make `target` the only flagged record in `collection`, or clear the
/// collection when `target` is `None`.
///
/// A missing target is reported before anything is modified.
pub async fn set_active_flag<S: QuoteStore>(
  store: &S,
  collection: Collection,
  target: Option<Uuid>,
) -> Result<()> {
  if let Some(id) = target {
    ensure_exists(store, collection, id).await?;
  }
  deactivate_all(store, collection).await?;
  if let Some(id) = target {
    store
      .set_flag(collection, id, true)
      .await
      .map_err(Error::store)?;
  }
  Ok(())
}

async fn ensure_exists<S: QuoteStore>(
  store: &S,
  collection: Collection,
  id: Uuid,
) -> Result<()> {
  if store.contains(collection, id).await.map_err(Error::store)? {
    Ok(())
  } else {
    Err(collection.not_found(id))
  }
}
