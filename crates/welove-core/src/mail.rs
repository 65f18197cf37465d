//! Outgoing mail: the [`Mail`] envelope, the site identity used in every
//! message, and the three message formats the service sends.

use serde::{Deserialize, Serialize};

use crate::{
  profile::Profile,
  quote::{Quote, Source},
};

// ─── Site identity ───────────────────────────────────────────────────────────

/// How the site presents itself in pages and mail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiteInfo {
  /// Public host name, without scheme, e.g. `welove.example.com`.
  pub domain:          String,
  /// The artist or work every quote is taken from.
  pub common_origin:   String,
  /// What a source is, e.g. `song`.
  pub type_of_source:  String,
  /// Receives operator warnings; also the contact address in welcome mail.
  pub operator_email:  String,
  /// Where subscribers manage their email preferences. Profiles are edited
  /// in the external identity system, so this usually points there.
  /// Defaults to `https://{domain}/profile`.
  #[serde(default)]
  pub preferences_url: Option<String>,
}

impl Default for SiteInfo {
  fn default() -> Self {
    Self {
      domain:          "localhost:8000".into(),
      common_origin:   "City Of Sound".into(),
      type_of_source:  "song".into(),
      operator_email:  "admin@localhost".into(),
      preferences_url: None,
    }
  }
}

impl SiteInfo {
  pub fn preferences_url(&self) -> String {
    match &self.preferences_url {
      Some(url) => url.clone(),
      None => format!("https://{}/profile", self.domain),
    }
  }
}

// ─── Envelope ────────────────────────────────────────────────────────────────

/// A single outgoing message: one title, one body, one recipient.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mail {
  pub title: String,
  pub body:  String,
  pub to:    String,
}

// ─── Formats ─────────────────────────────────────────────────────────────────

/// The daily quote email.
pub fn daily_quote_mail(
  site: &SiteInfo,
  quote: &Quote,
  source: Option<&Source>,
  to: &str,
) -> Mail {
  let attribution = match source {
    Some(s) => format!("from the {} {}.", site.type_of_source, s.name),
    None => format!("from {}.", site.common_origin),
  };
  let body = format!(
    "Today's quote from {origin} is:\n\n\"{text}\"\n\n{attribution}\
     \n\nVisit {url} to change your email preferences.",
    origin = site.common_origin,
    text = quote.text,
    url = site.preferences_url(),
  );
  Mail {
    title: format!("Your daily quote from {}", site.common_origin),
    body,
    to: to.to_owned(),
  }
}

/// A warning for the site operator.
pub fn operator_warning_mail(site: &SiteInfo, warning: &str) -> Mail {
  let body = format!(
    "A new warning was detected in {domain}.\n\
     This is its content:\n\"{warning}\"\n\
     Warnings often do not need you to take extra actions.",
    domain = site.domain,
  );
  Mail {
    title: format!("New Warning in {}", site.domain),
    body,
    to: site.operator_email.clone(),
  }
}

/// Sent once when a profile is registered.
pub fn welcome_mail(site: &SiteInfo, profile: &Profile) -> Mail {
  let body = format!(
    "Welcome to https://{domain}!\nWe are glad to have you onboard.\n\
     If you did not just create a user with us, please let us know at \
     {operator} so we can remove your email from our database.",
    domain = site.domain,
    operator = site.operator_email,
  );
  Mail {
    title: format!("Welcome, {}!", profile.display_name()),
    body,
    to: profile.email.clone(),
  }
}

#[cfg(test)]
mod tests {
  use chrono::Utc;
  use uuid::Uuid;

  use super::*;

  fn site() -> SiteInfo {
    SiteInfo {
      domain: "welove.example.com".into(),
      operator_email: "ops@welove.example.com".into(),
      ..SiteInfo::default()
    }
  }

  fn quote(text: &str) -> Quote {
    Quote {
      quote_id:   Uuid::new_v4(),
      text:       text.into(),
      source_id:  None,
      is_active:  true,
      popularity: 0,
      created_at: Utc::now(),
    }
  }

  #[test]
  fn daily_mail_names_the_source() {
    let source = Source {
      source_id:  Uuid::new_v4(),
      name:       "Contrast".into(),
      link:       String::new(),
      created_at: Utc::now(),
    };
    let mail = daily_quote_mail(
      &site(),
      &quote("Selected quote"),
      Some(&source),
      "pal@email.com",
    );

    assert_eq!(mail.title, "Your daily quote from City Of Sound");
    assert_eq!(
      mail.body,
      "Today's quote from City Of Sound is:\n\n\"Selected quote\"\n\n\
       from the song Contrast.\n\n\
       Visit https://welove.example.com/profile to change your email preferences."
    );
    assert_eq!(mail.to, "pal@email.com");
  }

  #[test]
  fn daily_mail_links_configured_preferences_page() {
    let site = SiteInfo {
      preferences_url: Some("https://id.example.com/settings".into()),
      ..site()
    };
    let mail = daily_quote_mail(&site, &quote("q"), None, "a@b.c");
    assert!(
      mail
        .body
        .ends_with("Visit https://id.example.com/settings to change your email preferences."),
      "{}",
      mail.body
    );
  }

  #[test]
  fn daily_mail_without_source_credits_origin() {
    let mail = daily_quote_mail(&site(), &quote("q"), None, "a@b.c");
    assert!(mail.body.contains("\n\nfrom City Of Sound.\n\n"), "{}", mail.body);
  }

  #[test]
  fn warning_goes_to_operator() {
    let mail = operator_warning_mail(&site(), "Hey! You should take a look here");
    assert_eq!(mail.title, "New Warning in welove.example.com");
    assert_eq!(mail.to, "ops@welove.example.com");
    assert_eq!(
      mail.body,
      "A new warning was detected in welove.example.com.\n\
       This is its content:\n\"Hey! You should take a look here\"\n\
       Warnings often do not need you to take extra actions."
    );
  }

  #[test]
  fn welcome_mentions_operator_contact() {
    let profile = Profile {
      user_id:            Uuid::new_v4(),
      username:           "awesomeuser".into(),
      email:              "awesome@email.com".into(),
      first_name:         None,
      subscribed:         false,
      favourite_quote_id: None,
      created_at:         Utc::now(),
    };
    let mail = welcome_mail(&site(), &profile);
    assert_eq!(mail.title, "Welcome, Awesomeuser!");
    assert_eq!(mail.to, "awesome@email.com");
    assert!(mail.body.starts_with("Welcome to https://welove.example.com!\n"));
    assert!(mail.body.contains("let us know at ops@welove.example.com so we"));
  }
}
