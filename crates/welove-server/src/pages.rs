//! Server-rendered HTML pages for visitors.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/` | A random quote and links |
//! | `GET`  | `/daily` | Quote of the day, or a random one while none is selected |
//! | `GET`  | `/random` | A random quote |
//! | `GET`  | `/poll` | Four choices |
//! | `POST` | `/poll` | Form field `quote_choice`; answers with a new poll |

use std::fmt::Write as _;

use axum::{
  Form,
  extract::State,
  response::Html,
};
use serde::Deserialize;
use tracing::warn;
use uuid::Uuid;
use welove_core::{
  QuoteService,
  mail::SiteInfo,
  message::Message,
  notify::Transport,
  poll::PollChoice,
  quote::{Quote, Source},
  store::QuoteStore,
};

use crate::{AppState, error::Error};

pub const NO_DAILY_QUOTE: &str = "There is no daily quote available";
pub const NO_RANDOM_QUOTE: &str = "There is no random quote available";
pub const VOTE_STORED: &str =
  "Thank you answering the previous poll. Here is another one!";
pub const VOTE_REJECTED: &str =
  "Your previous answer could not be stored. Try this one.";

// ─── Rendering ───────────────────────────────────────────────────────────────

/// Escape text for use in HTML element content and attribute values.
pub fn escape(text: &str) -> String {
  let mut out = String::with_capacity(text.len());
  for c in text.chars() {
    match c {
      '&' => out.push_str("&amp;"),
      '<' => out.push_str("&lt;"),
      '>' => out.push_str("&gt;"),
      '"' => out.push_str("&quot;"),
      '\'' => out.push_str("&#39;"),
      c => out.push(c),
    }
  }
  out
}

fn layout(site: &SiteInfo, banner: Option<&Message>, title: &str, content: &str) -> Html<String> {
  let banner = banner
    .map(|m| format!("<div class=\"banner\">{}</div>\n", escape(&m.text)))
    .unwrap_or_default();
  Html(format!(
    "<!DOCTYPE html>\n<html>\n<head><meta charset=\"utf-8\"><title>{title} | We love {origin}</title></head>\n\
     <body>\n{banner}<h1>We love {origin}</h1>\n\
     <nav><a href=\"/\">Home</a> <a href=\"/daily\">Daily quote</a> \
     <a href=\"/random\">Random quote</a> <a href=\"/poll\">Poll</a></nav>\n\
     <main>\n{content}</main>\n</body>\n</html>\n",
    title = escape(title),
    origin = escape(&site.common_origin),
  ))
}

fn quote_block(site: &SiteInfo, quote: &Quote, source: Option<&Source>) -> String {
  let attribution = match source {
    Some(s) if !s.link.is_empty() => format!(
      "from the {} <a href=\"{}\">{}</a>",
      escape(&site.type_of_source),
      escape(&s.link),
      escape(&s.name),
    ),
    Some(s) => format!("from the {} {}", escape(&site.type_of_source), escape(&s.name)),
    None => format!("from {}", escape(&site.common_origin)),
  };
  format!(
    "<blockquote>\"{}\"</blockquote>\n<p class=\"source\">{attribution}</p>\n",
    escape(&quote.text),
  )
}

fn poll_form(choices: &[PollChoice]) -> String {
  let mut form = String::from("<form method=\"post\" action=\"/poll\">\n");
  for (i, choice) in choices.iter().enumerate() {
    let value = choice.quote_id.map(|id| id.to_string()).unwrap_or_default();
    let _ = writeln!(
      form,
      "<label><input type=\"radio\" name=\"quote_choice\" id=\"choice{i}\" value=\"{value}\"> {}</label><br>",
      escape(&choice.text),
    );
  }
  form.push_str("<button type=\"submit\">Vote</button>\n</form>\n");
  form
}

// ─── Handlers ────────────────────────────────────────────────────────────────

/// `GET /`
pub async fn index<S, T>(State(state): State<AppState<S, T>>) -> Result<Html<String>, Error>
where
  S: QuoteStore,
  T: Transport,
{
  let svc = &state.service;
  let site = svc.site();
  let banner = svc.displayed_message().await?;
  let quote = svc.random_quote().await?;
  let mut content = match &quote {
    Some(_) => format!("<p>A random quote from {} is:</p>\n", escape(&site.common_origin)),
    None => String::new(),
  };
  content.push_str(&quote_page(svc, quote.as_ref(), NO_RANDOM_QUOTE).await?);
  let _ = write!(
    content,
    "<ul>\n<li><a href=\"/daily\">Quote of the day</a></li>\n\
     <li><a href=\"/random\">Another random quote</a></li>\n\
     <li><a href=\"/poll\">Vote for your favourite {kind}</a></li>\n</ul>\n",
    kind = escape(&site.type_of_source),
  );
  Ok(layout(site, banner.as_ref(), "Home", &content))
}

/// `GET /daily`
pub async fn daily<S, T>(State(state): State<AppState<S, T>>) -> Result<Html<String>, Error>
where
  S: QuoteStore,
  T: Transport,
{
  let svc = &state.service;
  let banner = svc.displayed_message().await?;
  let quote = svc.daily_quote().await?;
  let content = quote_page(svc, quote.as_ref(), NO_DAILY_QUOTE).await?;
  Ok(layout(svc.site(), banner.as_ref(), "Daily quote", &content))
}

/// `GET /random`
pub async fn random<S, T>(State(state): State<AppState<S, T>>) -> Result<Html<String>, Error>
where
  S: QuoteStore,
  T: Transport,
{
  let svc = &state.service;
  let banner = svc.displayed_message().await?;
  let quote = svc.random_quote().await?;
  let content = quote_page(svc, quote.as_ref(), NO_RANDOM_QUOTE).await?;
  Ok(layout(svc.site(), banner.as_ref(), "Random quote", &content))
}

async fn quote_page<S, T>(
  svc: &QuoteService<S, T>,
  quote: Option<&Quote>,
  fallback: &str,
) -> Result<String, Error>
where
  S: QuoteStore,
  T: Transport,
{
  match quote {
    Some(q) => {
      let source = svc.source_of(q).await?;
      Ok(quote_block(svc.site(), q, source.as_ref()))
    }
    None => Ok(format!("<p>{}</p>\n", escape(fallback))),
  }
}

/// `GET /poll`
pub async fn poll<S, T>(State(state): State<AppState<S, T>>) -> Result<Html<String>, Error>
where
  S: QuoteStore,
  T: Transport,
{
  render_poll(&state.service, None).await
}

#[derive(Debug, Deserialize)]
pub struct PollForm {
  #[serde(default)]
  pub quote_choice: String,
}

/// `POST /poll`
pub async fn vote<S, T>(
  State(state): State<AppState<S, T>>,
  Form(form): Form<PollForm>,
) -> Result<Html<String>, Error>
where
  S: QuoteStore,
  T: Transport,
{
  let svc = &state.service;
  let notice = match Uuid::parse_str(form.quote_choice.trim()) {
    Ok(id) => match svc.vote(id).await {
      Ok(_) => VOTE_STORED,
      Err(e) => {
        warn!(quote_id = %id, error = %e, "poll vote not stored");
        VOTE_REJECTED
      }
    },
    Err(_) => VOTE_REJECTED,
  };
  render_poll(svc, Some(notice)).await
}

async fn render_poll<S, T>(
  svc: &QuoteService<S, T>,
  notice: Option<&str>,
) -> Result<Html<String>, Error>
where
  S: QuoteStore,
  T: Transport,
{
  let banner = svc.displayed_message().await?;
  let choices = svc.poll().await?;
  let mut content = String::new();
  if let Some(notice) = notice {
    let _ = writeln!(content, "<p class=\"notice\">{}</p>", escape(notice));
  }
  let _ = writeln!(
    content,
    "<p>Which {} quote do you like best?</p>",
    escape(&svc.site().type_of_source),
  );
  content.push_str(&poll_form(&choices));
  Ok(layout(svc.site(), banner.as_ref(), "Poll", &content))
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn escape_covers_markup_characters() {
    assert_eq!(
      escape(r#"<a href="x">Tom & 'Jerry'</a>"#),
      "&lt;a href=&quot;x&quot;&gt;Tom &amp; &#39;Jerry&#39;&lt;/a&gt;"
    );
  }

  #[test]
  fn placeholder_choices_submit_empty_values() {
    let form = poll_form(&welove_core::poll::placeholder_choices());
    assert_eq!(form.matches("value=\"\"").count(), 4);
    assert!(form.contains("Sorry for the inconvenience."));
  }
}
