//! [`QuoteService`] is the entry point used by the HTTP layers and the
//! scheduler.
//!
//! The selection rule and the popularity guard are read-modify-write
//! sequences over a whole collection. The service serialises them with one
//! async mutex per collection, so a rotation can never interleave with an
//! administrative override, a vote or a rescale.

use std::sync::Arc;

use rand::{SeedableRng, rngs::StdRng};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{info, warn};
use uuid::Uuid;

use crate::{
  Error, Result,
  mail::{SiteInfo, welcome_mail},
  message::{Message, NewMessage},
  notify::{DispatchReport, Transport, notify_subscribers},
  poll::{PollChoice, poll_choices},
  popularity::{DEFAULT_POPULARITY_THRESHOLD, RescaleOutcome, check_and_rescale},
  profile::{NewProfile, Profile, ProfileUpdate},
  quote::{NewQuote, NewSource, Quote, Source},
  random::pick_random,
  rotation::rotate_daily_quote,
  selection::set_active_flag,
  store::{Collection, QuoteStore},
};

/// Result of a rotation followed by the subscriber fan-out.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RotationSummary {
  /// The new quote of the day; `None` when there are no quotes.
  pub quote:    Option<Quote>,
  /// `None` when no quote was selected, so nothing was sent.
  pub dispatch: Option<DispatchReport>,
}

pub struct QuoteService<S, T> {
  store:                Arc<S>,
  transport:            Arc<T>,
  site:                 SiteInfo,
  popularity_threshold: i32,
  quotes_lock:          Mutex<()>,
  messages_lock:        Mutex<()>,
  profiles_lock:        Mutex<()>,
}

impl<S, T> QuoteService<S, T>
where
  S: QuoteStore,
  T: Transport,
{
  pub fn new(store: Arc<S>, transport: Arc<T>, site: SiteInfo) -> Self {
    Self {
      store,
      transport,
      site,
      popularity_threshold: DEFAULT_POPULARITY_THRESHOLD,
      quotes_lock: Mutex::new(()),
      messages_lock: Mutex::new(()),
      profiles_lock: Mutex::new(()),
    }
  }

  pub fn with_popularity_threshold(mut self, threshold: i32) -> Self {
    self.popularity_threshold = threshold;
    self
  }

  pub fn site(&self) -> &SiteInfo { &self.site }

  pub fn store(&self) -> &S { &self.store }

  pub fn transport(&self) -> &T { &self.transport }

  // ── Sources ───────────────────────────────────────────────────────────

  pub async fn add_source(&self, input: NewSource) -> Result<Source> {
    if input.name.trim().is_empty() {
      return Err(Error::EmptyText);
    }
    self.store.add_source(input).await.map_err(Error::store)
  }

  pub async fn get_source(&self, id: Uuid) -> Result<Source> {
    self
      .store
      .get_source(id)
      .await
      .map_err(Error::store)?
      .ok_or(Error::SourceNotFound(id))
  }

  pub async fn list_sources(&self) -> Result<Vec<Source>> {
    self.store.list_sources().await.map_err(Error::store)
  }

  /// Delete a source and, with it, all of its quotes.
  pub async fn delete_source(&self, id: Uuid) -> Result<()> {
    let _guard = self.quotes_lock.lock().await;
    if self.store.delete_source(id).await.map_err(Error::store)? {
      info!(source_id = %id, "source deleted with its quotes");
      Ok(())
    } else {
      Err(Error::SourceNotFound(id))
    }
  }

  /// The source of `quote`, if it has one that still exists.
  pub async fn source_of(&self, quote: &Quote) -> Result<Option<Source>> {
    match quote.source_id {
      Some(id) => self.store.get_source(id).await.map_err(Error::store),
      None => Ok(None),
    }
  }

  // ── Quotes ────────────────────────────────────────────────────────────

  /// Add a quote. The text is trimmed, must be non-empty and must not
  /// already exist; a given source must exist.
  pub async fn add_quote(&self, input: NewQuote) -> Result<Quote> {
    let text = input.text.trim().to_owned();
    if text.is_empty() {
      return Err(Error::EmptyText);
    }
    if let Some(source_id) = input.source_id {
      self.get_source(source_id).await?;
    }
    if self
      .store
      .find_quote_by_text(&text)
      .await
      .map_err(Error::store)?
      .is_some()
    {
      return Err(Error::DuplicateQuote(text));
    }
    self
      .store
      .add_quote(NewQuote { text, source_id: input.source_id })
      .await
      .map_err(Error::store)
  }

  pub async fn get_quote(&self, id: Uuid) -> Result<Quote> {
    self
      .store
      .get_quote(id)
      .await
      .map_err(Error::store)?
      .ok_or(Error::QuoteNotFound(id))
  }

  pub async fn list_quotes(&self) -> Result<Vec<Quote>> {
    self.store.list_quotes().await.map_err(Error::store)
  }

  pub async fn delete_quote(&self, id: Uuid) -> Result<()> {
    let _guard = self.quotes_lock.lock().await;
    if self.store.delete_quote(id).await.map_err(Error::store)? {
      Ok(())
    } else {
      Err(Error::QuoteNotFound(id))
    }
  }

  /// The quote of the day, if one is selected.
  pub async fn active_quote(&self) -> Result<Option<Quote>> {
    let flagged = self
      .store
      .flagged(Collection::Quotes)
      .await
      .map_err(Error::store)?;
    match flagged.first() {
      Some(id) => self.store.get_quote(*id).await.map_err(Error::store),
      None => Ok(None),
    }
  }

  /// A uniformly random quote, or `None` if there are none.
  pub async fn random_quote(&self) -> Result<Option<Quote>> {
    let quotes = self.list_quotes().await?;
    let mut rng = StdRng::from_entropy();
    Ok(pick_random(&quotes, &mut rng).cloned())
  }

  /// What visitors see as the daily quote: the active quote, or a random one
  /// while none is selected.
  pub async fn daily_quote(&self) -> Result<Option<Quote>> {
    match self.active_quote().await? {
      Some(q) => Ok(Some(q)),
      None => self.random_quote().await,
    }
  }

  /// Administrative override of the quote of the day.
  pub async fn activate_quote(&self, id: Uuid) -> Result<Quote> {
    let _guard = self.quotes_lock.lock().await;
    set_active_flag(self.store.as_ref(), Collection::Quotes, Some(id)).await?;
    info!(quote_id = %id, "quote of the day set manually");
    self.get_quote(id).await
  }

  pub async fn deactivate_quotes(&self) -> Result<()> {
    let _guard = self.quotes_lock.lock().await;
    set_active_flag(self.store.as_ref(), Collection::Quotes, None).await
  }

  // ── Messages ──────────────────────────────────────────────────────────

  pub async fn add_message(&self, input: NewMessage) -> Result<Message> {
    let text = input.text.trim().to_owned();
    if text.is_empty() {
      return Err(Error::EmptyText);
    }
    self
      .store
      .add_message(NewMessage { text })
      .await
      .map_err(Error::store)
  }

  pub async fn get_message(&self, id: Uuid) -> Result<Message> {
    self
      .store
      .get_message(id)
      .await
      .map_err(Error::store)?
      .ok_or(Error::MessageNotFound(id))
  }

  pub async fn list_messages(&self) -> Result<Vec<Message>> {
    self.store.list_messages().await.map_err(Error::store)
  }

  pub async fn delete_message(&self, id: Uuid) -> Result<()> {
    let _guard = self.messages_lock.lock().await;
    if self.store.delete_message(id).await.map_err(Error::store)? {
      Ok(())
    } else {
      Err(Error::MessageNotFound(id))
    }
  }

  /// The banner currently on display, if any.
  pub async fn displayed_message(&self) -> Result<Option<Message>> {
    let flagged = self
      .store
      .flagged(Collection::Messages)
      .await
      .map_err(Error::store)?;
    match flagged.first() {
      Some(id) => self.store.get_message(*id).await.map_err(Error::store),
      None => Ok(None),
    }
  }

  /// Make `id` the only displayed message.
  pub async fn display_message(&self, id: Uuid) -> Result<Message> {
    let _guard = self.messages_lock.lock().await;
    set_active_flag(self.store.as_ref(), Collection::Messages, Some(id)).await?;
    self.get_message(id).await
  }

  pub async fn hide_messages(&self) -> Result<()> {
    let _guard = self.messages_lock.lock().await;
    set_active_flag(self.store.as_ref(), Collection::Messages, None).await
  }

  // ── Poll ──────────────────────────────────────────────────────────────

  pub async fn poll(&self) -> Result<Vec<PollChoice>> {
    let quotes = self.list_quotes().await?;
    let mut rng = StdRng::from_entropy();
    Ok(poll_choices(&quotes, &mut rng))
  }

  /// Count a poll vote for `quote_id`. Returns the quote with its new
  /// popularity.
  pub async fn vote(&self, quote_id: Uuid) -> Result<Quote> {
    let _guard = self.quotes_lock.lock().await;
    let popularity = self
      .store
      .increment_popularity(quote_id)
      .await
      .map_err(Error::store)?
      .ok_or(Error::QuoteNotFound(quote_id))?;
    let mut quote = self.get_quote(quote_id).await?;
    quote.popularity = popularity;
    Ok(quote)
  }

  // ── Profiles ──────────────────────────────────────────────────────────

  /// Create a profile and send the welcome mail. A failed welcome mail is
  /// logged; the profile is kept.
  pub async fn register_profile(&self, input: NewProfile) -> Result<Profile> {
    if input.username.trim().is_empty() || input.email.trim().is_empty() {
      return Err(Error::EmptyText);
    }
    let guard = self.profiles_lock.lock().await;
    if self
      .store
      .get_profile(input.user_id)
      .await
      .map_err(Error::store)?
      .is_some()
    {
      return Err(Error::DuplicateProfile(input.user_id));
    }
    if self
      .store
      .find_profile_by_username(&input.username)
      .await
      .map_err(Error::store)?
      .is_some()
    {
      return Err(Error::DuplicateUsername(input.username));
    }

    let profile = self.store.add_profile(input).await.map_err(Error::store)?;
    drop(guard);
    info!(user_id = %profile.user_id, "profile registered");

    let mail = welcome_mail(&self.site, &profile);
    if let Err(e) = self.transport.send(&mail).await {
      warn!(user_id = %profile.user_id, error = %e, "welcome mail failed");
    }
    Ok(profile)
  }

  pub async fn get_profile(&self, user_id: Uuid) -> Result<Profile> {
    self
      .store
      .get_profile(user_id)
      .await
      .map_err(Error::store)?
      .ok_or(Error::ProfileNotFound(user_id))
  }

  pub async fn list_profiles(&self, subscribed_only: bool) -> Result<Vec<Profile>> {
    self
      .store
      .list_profiles(subscribed_only)
      .await
      .map_err(Error::store)
  }

  pub async fn update_profile(
    &self,
    user_id: Uuid,
    update: ProfileUpdate,
  ) -> Result<Profile> {
    if let (Some(id), false) = (update.favourite_quote_id, update.clear_favourite) {
      self.get_quote(id).await?;
    }
    let mut profile = self.get_profile(user_id).await?;
    update.apply(&mut profile);
    self
      .store
      .update_profile(profile.clone())
      .await
      .map_err(Error::store)?;
    Ok(profile)
  }

  // ── Jobs ──────────────────────────────────────────────────────────────

  /// Pick a new quote of the day. Does not send any mail; see
  /// [`Self::dispatch`] and [`Self::run_daily_rotation`].
  pub async fn rotate(&self) -> Result<Option<Quote>> {
    let _guard = self.quotes_lock.lock().await;
    let mut rng = StdRng::from_entropy();
    rotate_daily_quote(self.store.as_ref(), &mut rng).await
  }

  /// Send `quote` to every subscribed profile.
  pub async fn dispatch(&self, quote: &Quote) -> Result<DispatchReport> {
    let source = self.source_of(quote).await?;
    let profiles = self.list_profiles(true).await?;
    Ok(
      notify_subscribers(
        quote,
        source.as_ref(),
        &profiles,
        self.transport.as_ref(),
        &self.site,
      )
      .await,
    )
  }

  /// Rotate, then mail the new quote to subscribers.
  pub async fn run_daily_rotation(&self) -> Result<RotationSummary> {
    let Some(quote) = self.rotate().await? else {
      return Ok(RotationSummary { quote: None, dispatch: None });
    };
    let report = self.dispatch(&quote).await?;
    Ok(RotationSummary { quote: Some(quote), dispatch: Some(report) })
  }

  /// Run the popularity guard with the configured threshold.
  pub async fn guard_popularity(&self) -> Result<RescaleOutcome> {
    let _guard = self.quotes_lock.lock().await;
    check_and_rescale(
      self.store.as_ref(),
      self.popularity_threshold,
      self.transport.as_ref(),
      &self.site,
    )
    .await
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::testing::{MemoryStore, RecordingTransport};

  fn service() -> QuoteService<MemoryStore, RecordingTransport> {
    QuoteService::new(
      Arc::new(MemoryStore::default()),
      Arc::new(RecordingTransport::default()),
      SiteInfo::default(),
    )
  }

  fn new_profile(name: &str) -> NewProfile {
    NewProfile {
      user_id:    Uuid::new_v4(),
      username:   name.into(),
      email:      format!("{name}@email.com"),
      first_name: None,
    }
  }

  #[tokio::test]
  async fn empty_rotation_sends_nothing() {
    let svc = service();
    let summary = svc.run_daily_rotation().await.unwrap();
    assert!(summary.quote.is_none());
    assert!(summary.dispatch.is_none());
    assert!(svc.transport.sent().is_empty());
  }

  #[tokio::test]
  async fn rotation_mails_subscribers_once() {
    let svc = service();
    let source = svc
      .add_source(NewSource { name: "Contrast".into(), link: String::new() })
      .await
      .unwrap();
    svc
      .add_quote(NewQuote::new("This band rocks").with_source(source.source_id))
      .await
      .unwrap();
    let pal = svc.register_profile(new_profile("subscribedpal")).await.unwrap();
    svc
      .update_profile(pal.user_id, ProfileUpdate {
        subscribed: Some(true),
        ..Default::default()
      })
      .await
      .unwrap();
    svc.register_profile(new_profile("uninterestedpal")).await.unwrap();

    let summary = svc.run_daily_rotation().await.unwrap();

    let report = summary.dispatch.unwrap();
    assert_eq!(report.offered, 1);
    let daily: Vec<_> = svc
      .transport
      .sent()
      .into_iter()
      .filter(|m| m.title.starts_with("Your daily quote"))
      .collect();
    assert_eq!(daily.len(), 1);
    assert_eq!(daily[0].to, "subscribedpal@email.com");
    assert!(daily[0].body.contains("from the song Contrast."));
  }

  #[tokio::test]
  async fn daily_quote_falls_back_to_random() {
    let svc = service();
    assert!(svc.daily_quote().await.unwrap().is_none());

    let q = svc.add_quote(NewQuote::new("only one")).await.unwrap();
    assert!(svc.active_quote().await.unwrap().is_none());
    assert_eq!(svc.daily_quote().await.unwrap().unwrap().quote_id, q.quote_id);
  }

  #[tokio::test]
  async fn duplicate_and_empty_quotes_are_rejected() {
    let svc = service();
    svc.add_quote(NewQuote::new("COS rocks")).await.unwrap();

    let dup = svc.add_quote(NewQuote::new("  COS rocks ")).await.unwrap_err();
    assert!(matches!(dup, Error::DuplicateQuote(ref t) if t == "COS rocks"));

    let empty = svc.add_quote(NewQuote::new("   ")).await.unwrap_err();
    assert!(matches!(empty, Error::EmptyText));
  }

  #[tokio::test]
  async fn quote_with_unknown_source_is_rejected() {
    let svc = service();
    let missing = Uuid::new_v4();
    let err = svc
      .add_quote(NewQuote::new("orphan").with_source(missing))
      .await
      .unwrap_err();
    assert!(matches!(err, Error::SourceNotFound(id) if id == missing));
  }

  #[tokio::test]
  async fn vote_increments_popularity() {
    let svc = service();
    let q = svc.add_quote(NewQuote::new("COS rocks")).await.unwrap();
    assert_eq!(svc.vote(q.quote_id).await.unwrap().popularity, 1);
    assert_eq!(svc.vote(q.quote_id).await.unwrap().popularity, 2);
    assert!(matches!(
      svc.vote(Uuid::new_v4()).await.unwrap_err(),
      Error::QuoteNotFound(_)
    ));
  }

  #[tokio::test]
  async fn displayed_message_follows_overrides() {
    let svc = service();
    let a = svc.add_message(NewMessage { text: "first".into() }).await.unwrap();
    let b = svc.add_message(NewMessage { text: "second".into() }).await.unwrap();

    svc.display_message(a.message_id).await.unwrap();
    svc.display_message(b.message_id).await.unwrap();
    assert_eq!(svc.displayed_message().await.unwrap().unwrap().message_id, b.message_id);

    svc.hide_messages().await.unwrap();
    assert!(svc.displayed_message().await.unwrap().is_none());
  }

  #[tokio::test]
  async fn registration_sends_welcome_and_rejects_duplicates() {
    let svc = service();
    let input = new_profile("awesomeuser");
    let profile = svc.register_profile(input.clone()).await.unwrap();
    assert!(!profile.subscribed);

    let sent = svc.transport.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].title, "Welcome, Awesomeuser!");

    let err = svc.register_profile(input).await.unwrap_err();
    assert!(matches!(err, Error::DuplicateProfile(_)));
  }

  #[tokio::test]
  async fn taken_username_is_a_conflict_not_a_store_error() {
    let svc = service();
    svc.register_profile(new_profile("pal")).await.unwrap();

    let err = svc.register_profile(new_profile("pal")).await.unwrap_err();

    assert!(matches!(err, Error::DuplicateUsername(ref name) if name == "pal"));
    assert_eq!(svc.list_profiles(false).await.unwrap().len(), 1);
    assert_eq!(svc.transport.sent().len(), 1);
  }

  #[tokio::test]
  async fn welcome_mail_greets_by_first_name() {
    let svc = service();
    let input = NewProfile { first_name: Some("jonny".into()), ..new_profile("jg") };
    svc.register_profile(input).await.unwrap();
    assert_eq!(svc.transport.sent()[0].title, "Welcome, Jonny!");
  }

  #[tokio::test]
  async fn failed_rotation_sends_nothing_and_next_run_recovers() {
    let svc = service();
    let q = svc.add_quote(NewQuote::new("only")).await.unwrap();
    let pal = svc.register_profile(new_profile("pal")).await.unwrap();
    svc
      .update_profile(pal.user_id, ProfileUpdate { subscribed: Some(true), ..Default::default() })
      .await
      .unwrap();
    svc.activate_quote(q.quote_id).await.unwrap();

    svc.store.fail_flag_sets(true);
    let err = svc.run_daily_rotation().await.unwrap_err();
    assert!(matches!(err, Error::Store(_)));
    assert!(svc.active_quote().await.unwrap().is_none());
    assert_eq!(svc.transport.sent().len(), 1);

    svc.store.fail_flag_sets(false);
    let summary = svc.run_daily_rotation().await.unwrap();
    assert_eq!(summary.quote.unwrap().quote_id, q.quote_id);
    assert_eq!(summary.dispatch.unwrap().offered, 1);
  }

  #[tokio::test]
  async fn deleting_favourite_clears_it() {
    let svc = service();
    let q = svc.add_quote(NewQuote::new("fav")).await.unwrap();
    let p = svc.register_profile(new_profile("fan")).await.unwrap();
    svc
      .update_profile(p.user_id, ProfileUpdate {
        favourite_quote_id: Some(q.quote_id),
        ..Default::default()
      })
      .await
      .unwrap();

    svc.delete_quote(q.quote_id).await.unwrap();

    assert_eq!(svc.get_profile(p.user_id).await.unwrap().favourite_quote_id, None);
  }

  #[tokio::test]
  async fn guard_uses_configured_threshold() {
    let svc = service().with_popularity_threshold(2);
    let q = svc.add_quote(NewQuote::new("hot")).await.unwrap();
    svc.vote(q.quote_id).await.unwrap();
    svc.vote(q.quote_id).await.unwrap();
    svc.vote(q.quote_id).await.unwrap();

    let outcome = svc.guard_popularity().await.unwrap();

    assert!(matches!(outcome, RescaleOutcome::Rescaled { previous_max: 3, .. }));
    assert_eq!(svc.get_quote(q.quote_id).await.unwrap().popularity, 1);
  }
}
