//! Plain-text rendering of API results for the terminal.

use welove_core::{
  message::Message,
  poll::PollChoice,
  popularity::RescaleOutcome,
  profile::Profile,
  quote::{Quote, Source},
  service::RotationSummary,
};

pub fn quote_line(q: &Quote) -> String {
  let marker = if q.is_active { '*' } else { ' ' };
  format!("{} {marker} {:>10}  {}", q.quote_id, q.popularity, q.text)
}

pub fn source_line(s: &Source) -> String {
  if s.link.is_empty() {
    format!("{}  {}", s.source_id, s.name)
  } else {
    format!("{}  {}  <{}>", s.source_id, s.name, s.link)
  }
}

pub fn message_line(m: &Message) -> String {
  let marker = if m.is_displayed { '*' } else { ' ' };
  format!("{} {marker} {}", m.message_id, m.text)
}

pub fn profile_line(p: &Profile) -> String {
  let subscribed = if p.subscribed { "subscribed" } else { "-" };
  format!("{}  {:<20} {:<30} {subscribed}", p.user_id, p.username, p.email)
}

pub fn poll_lines(choices: &[PollChoice]) -> Vec<String> {
  choices
    .iter()
    .enumerate()
    .map(|(i, c)| match c.quote_id {
      Some(id) => format!("{}. {}  ({id})", i + 1, c.text),
      None => format!("{}. {}", i + 1, c.text),
    })
    .collect()
}

pub fn rotation_summary(summary: &RotationSummary) -> String {
  match (&summary.quote, &summary.dispatch) {
    (Some(q), Some(report)) => format!(
      "new quote of the day: {}\nmailed {}/{} subscribers ({} failed)",
      q.text,
      report.delivered,
      report.offered,
      report.failures.len(),
    ),
    (Some(q), None) => format!("new quote of the day: {}", q.text),
    (None, _) => "there are no quotes to rotate".to_string(),
  }
}

pub fn rescale_outcome(outcome: &RescaleOutcome) -> String {
  match outcome {
    RescaleOutcome::Unchanged { max } => {
      format!("popularities unchanged (highest is {max})")
    }
    RescaleOutcome::Rescaled { previous_max, quotes, warned } => format!(
      "halved {quotes} popularities (highest was {previous_max}); operator {}",
      if *warned { "warned" } else { "could not be warned" },
    ),
  }
}
