//! Poll choice generation.
//!
//! A poll offers [`POLL_SIZE`] distinct quotes. When the collection cannot
//! supply that many distinct texts, the poll degrades to a fixed set of
//! placeholder choices instead of retrying forever.

use rand::Rng;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{quote::Quote, random::pick_excluding};

/// Number of choices offered by every poll.
pub const POLL_SIZE: usize = 4;

/// Shown when there are not enough quotes to build a real poll.
pub const PLACEHOLDER_CHOICES: [&str; POLL_SIZE] = [
  "There are no available quotes for this poll right now.",
  "There seems to be a problem with the poll.",
  "Please come back and try again later.",
  "Sorry for the inconvenience.",
];

/// One entry of a poll. Placeholders have no `quote_id` and cannot be voted
/// for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PollChoice {
  pub quote_id: Option<Uuid>,
  pub text:     String,
}

impl PollChoice {
  pub fn is_placeholder(&self) -> bool { self.quote_id.is_none() }
}

/// The fixed fallback poll.
pub fn placeholder_choices() -> Vec<PollChoice> {
  PLACEHOLDER_CHOICES
    .iter()
    .map(|text| PollChoice { quote_id: None, text: (*text).to_owned() })
    .collect()
}

/// Draw [`POLL_SIZE`] quotes with pairwise distinct texts, or fall back to
/// [`placeholder_choices`].
pub fn poll_choices<R>(quotes: &[Quote], rng: &mut R) -> Vec<PollChoice>
where
  R: Rng + ?Sized,
{
  let mut taken: Vec<&str> = Vec::with_capacity(POLL_SIZE);
  let mut choices = Vec::with_capacity(POLL_SIZE);

  for _ in 0..POLL_SIZE {
    let Some(quote) =
      pick_excluding(quotes, &taken, |q: &Quote| q.text.as_str(), rng)
    else {
      return placeholder_choices();
    };
    taken.push(quote.text.as_str());
    choices.push(PollChoice {
      quote_id: Some(quote.quote_id),
      text:     quote.text.clone(),
    });
  }

  choices
}

#[cfg(test)]
mod tests {
  use std::collections::HashSet;

  use chrono::Utc;
  use rand::{SeedableRng, rngs::StdRng};

  use super::*;

  fn quote(text: &str) -> Quote {
    Quote {
      quote_id:   Uuid::new_v4(),
      text:       text.into(),
      source_id:  None,
      is_active:  false,
      popularity: 0,
      created_at: Utc::now(),
    }
  }

  #[test]
  fn four_quotes_yield_all_four() {
    let texts = ["COS rocks", "Jordan rocks", "Lacey rocks", "Andrew rocks"];
    let quotes: Vec<Quote> = texts.iter().map(|t| quote(t)).collect();

    for seed in 0..25 {
      let mut rng = StdRng::seed_from_u64(seed);
      let choices = poll_choices(&quotes, &mut rng);

      assert_eq!(choices.len(), POLL_SIZE);
      let got: HashSet<&str> = choices.iter().map(|c| c.text.as_str()).collect();
      assert_eq!(got, texts.iter().copied().collect::<HashSet<_>>());
      assert!(choices.iter().all(|c| !c.is_placeholder()));
    }
  }

  #[test]
  fn two_quotes_fall_back_to_placeholders() {
    let quotes = vec![quote("one"), quote("two")];
    let mut rng = StdRng::seed_from_u64(9);
    assert_eq!(poll_choices(&quotes, &mut rng), placeholder_choices());
  }

  #[test]
  fn duplicate_texts_count_once() {
    let quotes = vec![quote("same"), quote("same"), quote("b"), quote("c")];
    let mut rng = StdRng::seed_from_u64(5);
    assert_eq!(poll_choices(&quotes, &mut rng), placeholder_choices());
  }

  #[test]
  fn large_collection_gives_distinct_choices() {
    let quotes: Vec<Quote> = (0..30).map(|i| quote(&format!("q{i}"))).collect();
    let mut rng = StdRng::seed_from_u64(11);
    let choices = poll_choices(&quotes, &mut rng);
    let distinct: HashSet<_> = choices.iter().map(|c| &c.text).collect();
    assert_eq!(distinct.len(), POLL_SIZE);
  }
}
