//! Uniform random selection over a collection.
//!
//! The generator is always passed in, so callers decide between entropy-
//! seeded generators in production and seeded ones in tests.

use rand::{Rng, seq::SliceRandom};

/// Pick one item uniformly at random. `None` when `items` is empty.
pub fn pick_random<'a, T, R>(items: &'a [T], rng: &mut R) -> Option<&'a T>
where
  R: Rng + ?Sized,
{
  items.choose(rng)
}

/// Pick one item uniformly among those whose key is not in `exclude`.
///
/// Candidates are drawn without replacement, so at most `items.len()`
/// attempts are made before giving up with `None`.
pub fn pick_excluding<'a, T, K, R>(
  items: &'a [T],
  exclude: &[&str],
  key: K,
  rng: &mut R,
) -> Option<&'a T>
where
  K: Fn(&T) -> &str,
  R: Rng + ?Sized,
{
  let mut order: Vec<usize> = (0..items.len()).collect();
  order.shuffle(rng);
  order
    .into_iter()
    .map(|i| &items[i])
    .find(|item| !exclude.contains(&key(*item)))
}
