//! Delivery of mail through an external [`Transport`], and the fan-out of
//! the daily quote to subscribers.

use std::future::Future;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use crate::{
  mail::{Mail, SiteInfo, daily_quote_mail, operator_warning_mail},
  profile::Profile,
  quote::{Quote, Source},
};

// ─── Transport ───────────────────────────────────────────────────────────────

/// Hands a [`Mail`] to whatever actually delivers it (SMTP relay, HTTP mail
/// API, a log file). Retries and bounces are the transport's business.
pub trait Transport: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  fn send<'a>(
    &'a self,
    mail: &'a Mail,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;
}

// ─── Dispatch ────────────────────────────────────────────────────────────────

/// A recipient the transport could not reach.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispatchFailure {
  pub user_id: Uuid,
  pub address: String,
  pub reason:  String,
}

/// Outcome of one fan-out. Every subscribed profile is offered exactly one
/// message; `failures` lists the ones the transport rejected.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispatchReport {
  pub offered:   usize,
  pub delivered: usize,
  pub failures:  Vec<DispatchFailure>,
}

/// Send `quote` to every subscribed profile in `profiles`.
///
/// Unsubscribed profiles are skipped even if present. A failed send is
/// recorded and the fan-out continues with the next recipient.
pub async fn notify_subscribers<T: Transport>(
  quote: &Quote,
  source: Option<&Source>,
  profiles: &[Profile],
  transport: &T,
  site: &SiteInfo,
) -> DispatchReport {
  let mut report = DispatchReport::default();

  for profile in profiles.iter().filter(|p| p.subscribed) {
    report.offered += 1;
    let mail = daily_quote_mail(site, quote, source, &profile.email);
    match transport.send(&mail).await {
      Ok(()) => report.delivered += 1,
      Err(e) => {
        warn!(user_id = %profile.user_id, error = %e, "daily quote mail failed");
        report.failures.push(DispatchFailure {
          user_id: profile.user_id,
          address: profile.email.clone(),
          reason:  e.to_string(),
        });
      }
    }
  }

  info!(
    quote_id = %quote.quote_id,
    offered = report.offered,
    delivered = report.delivered,
    "daily quote dispatched"
  );
  report
}

/// Log `warning` and mail it to the operator.
pub async fn warn_operator<T: Transport>(
  transport: &T,
  site: &SiteInfo,
  warning: &str,
) -> Result<(), T::Error> {
  warn!("{warning}");
  transport.send(&operator_warning_mail(site, warning)).await
}
