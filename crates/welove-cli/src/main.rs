//! `welove`: administration client for the welove quote server.
//!
//! # Usage
//!
//! ```
//! welove --url http://localhost:8000 --user admin --password secret quotes list
//! welove --config ~/.config/welove/config.toml rotate
//! ```

mod client;
mod output;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use client::{ApiClient, ApiConfig};
use serde::Deserialize;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;
use welove_core::{
  message::NewMessage,
  profile::{NewProfile, ProfileUpdate},
  quote::{NewQuote, NewSource},
};

// ─── CLI args ────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "welove", about = "Administration client for the welove quote server")]
struct Args {
  /// Path to a TOML config file (url, username, password).
  #[arg(short, long, value_name = "FILE")]
  config: Option<PathBuf>,

  /// Base URL of the welove server (default: http://localhost:8000).
  #[arg(long, env = "WELOVE_URL")]
  url: Option<String>,

  /// API username.
  #[arg(long, env = "WELOVE_USER")]
  user: Option<String>,

  /// API password (plaintext).
  #[arg(long, env = "WELOVE_PASSWORD")]
  password: Option<String>,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
  /// Show the quote of the day.
  Daily,
  /// Show a random quote.
  Random,
  /// Run the daily rotation now and mail subscribers.
  Rotate,
  /// Run the popularity guard now.
  Rescale,
  /// Show a poll, or vote in one.
  Poll {
    /// Quote to vote for.
    #[arg(long)]
    vote: Option<Uuid>,
  },
  #[command(subcommand)]
  Quotes(QuoteCommand),
  #[command(subcommand)]
  Sources(SourceCommand),
  #[command(subcommand)]
  Messages(MessageCommand),
  #[command(subcommand)]
  Profiles(ProfileCommand),
}

#[derive(Subcommand, Debug)]
enum QuoteCommand {
  List,
  Show { id: Uuid },
  Add {
    text:   String,
    #[arg(long)]
    source: Option<Uuid>,
  },
  Delete { id: Uuid },
  /// Make this quote the quote of the day.
  Activate { id: Uuid },
  /// Clear the quote of the day.
  Deactivate,
}

#[derive(Subcommand, Debug)]
enum SourceCommand {
  List,
  Add {
    name: String,
    #[arg(long, default_value = "")]
    link: String,
  },
  /// Delete a source together with its quotes.
  Delete { id: Uuid },
}

#[derive(Subcommand, Debug)]
enum MessageCommand {
  List,
  Add { text: String },
  Delete { id: Uuid },
  /// Show this message as the site banner.
  Display { id: Uuid },
  /// Hide the site banner.
  Hide,
}

#[derive(Subcommand, Debug)]
enum ProfileCommand {
  List {
    #[arg(long)]
    subscribed: bool,
  },
  Show { user_id: Uuid },
  Add {
    #[arg(long)]
    user_id:    Uuid,
    #[arg(long)]
    username:   String,
    #[arg(long)]
    email:      String,
    #[arg(long)]
    first_name: Option<String>,
  },
  Subscribe { user_id: Uuid },
  Unsubscribe { user_id: Uuid },
  /// Set (or with no quote, clear) the favourite quote.
  Favourite {
    user_id:  Uuid,
    quote_id: Option<Uuid>,
  },
}

// ─── Config file ─────────────────────────────────────────────────────────────

/// Shape of the optional TOML config file.
#[derive(Deserialize, Default, Debug)]
struct ConfigFile {
  #[serde(default)]
  url:      String,
  #[serde(default)]
  username: String,
  #[serde(default)]
  password: String,
}

/// CLI flags (and their env vars) override the config file, which overrides
/// defaults.
fn resolve_config(args: &Args, file_cfg: &ConfigFile) -> ApiConfig {
  fn pick(flag: &Option<String>, file: &str) -> Option<String> {
    flag.clone().or_else(|| (!file.is_empty()).then(|| file.to_owned()))
  }
  ApiConfig {
    base_url: pick(&args.url, &file_cfg.url)
      .unwrap_or_else(|| "http://localhost:8000".to_string()),
    username: pick(&args.user, &file_cfg.username).unwrap_or_default(),
    password: pick(&args.password, &file_cfg.password).unwrap_or_default(),
  }
}

// ─── Entry point ─────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
  tracing_subscriber::fmt()
    .with_writer(std::io::stderr)
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::WARN.into())
        .from_env_lossy(),
    )
    .init();

  let args = Args::parse();

  let file_cfg: ConfigFile = if let Some(path) = &args.config {
    let raw = std::fs::read_to_string(path)
      .with_context(|| format!("reading config file {}", path.display()))?;
    toml::from_str(&raw).context("parsing config file")?
  } else {
    ConfigFile::default()
  };

  let client = ApiClient::new(resolve_config(&args, &file_cfg))?;
  run(&client, args.command).await
}

async fn run(client: &ApiClient, command: Command) -> Result<()> {
  match command {
    Command::Daily => match client.daily().await? {
      Some(q) => println!("{}", q.text),
      None => println!("There is no daily quote available"),
    },
    Command::Random => println!("{}", client.random().await?.text),
    Command::Rotate => println!("{}", output::rotation_summary(&client.rotate().await?)),
    Command::Rescale => println!("{}", output::rescale_outcome(&client.rescale().await?)),
    Command::Poll { vote: Some(id) } => {
      let q = client.vote(id).await?;
      println!("voted; {} now has {} votes", q.text, q.popularity);
    }
    Command::Poll { vote: None } => {
      for line in output::poll_lines(&client.poll().await?) {
        println!("{line}");
      }
    }
    Command::Quotes(cmd) => quotes(client, cmd).await?,
    Command::Sources(cmd) => sources(client, cmd).await?,
    Command::Messages(cmd) => messages(client, cmd).await?,
    Command::Profiles(cmd) => profiles(client, cmd).await?,
  }
  Ok(())
}

async fn quotes(client: &ApiClient, cmd: QuoteCommand) -> Result<()> {
  match cmd {
    QuoteCommand::List => {
      for q in client.list_quotes().await? {
        println!("{}", output::quote_line(&q));
      }
    }
    QuoteCommand::Show { id } => println!("{}", output::quote_line(&client.get_quote(id).await?)),
    QuoteCommand::Add { text, source } => {
      let input = NewQuote { text, source_id: source };
      println!("{}", output::quote_line(&client.add_quote(&input).await?));
    }
    QuoteCommand::Delete { id } => client.delete_quote(id).await?,
    QuoteCommand::Activate { id } => {
      println!("{}", output::quote_line(&client.activate_quote(id).await?));
    }
    QuoteCommand::Deactivate => client.deactivate_quotes().await?,
  }
  Ok(())
}

async fn sources(client: &ApiClient, cmd: SourceCommand) -> Result<()> {
  match cmd {
    SourceCommand::List => {
      for s in client.list_sources().await? {
        println!("{}", output::source_line(&s));
      }
    }
    SourceCommand::Add { name, link } => {
      let source = client.add_source(&NewSource { name, link }).await?;
      println!("{}", output::source_line(&source));
    }
    SourceCommand::Delete { id } => client.delete_source(id).await?,
  }
  Ok(())
}

async fn messages(client: &ApiClient, cmd: MessageCommand) -> Result<()> {
  match cmd {
    MessageCommand::List => {
      for m in client.list_messages().await? {
        println!("{}", output::message_line(&m));
      }
    }
    MessageCommand::Add { text } => {
      let message = client.add_message(&NewMessage { text }).await?;
      println!("{}", output::message_line(&message));
    }
    MessageCommand::Delete { id } => client.delete_message(id).await?,
    MessageCommand::Display { id } => {
      println!("{}", output::message_line(&client.display_message(id).await?));
    }
    MessageCommand::Hide => client.hide_messages().await?,
  }
  Ok(())
}

async fn profiles(client: &ApiClient, cmd: ProfileCommand) -> Result<()> {
  let update = |user_id: Uuid, change: ProfileUpdate| async move {
    let profile = client.update_profile(user_id, &change).await?;
    println!("{}", output::profile_line(&profile));
    Ok::<_, anyhow::Error>(())
  };

  match cmd {
    ProfileCommand::List { subscribed } => {
      for p in client.list_profiles(subscribed).await? {
        println!("{}", output::profile_line(&p));
      }
    }
    ProfileCommand::Show { user_id } => {
      println!("{}", output::profile_line(&client.get_profile(user_id).await?));
    }
    ProfileCommand::Add { user_id, username, email, first_name } => {
      let input = NewProfile { user_id, username, email, first_name };
      println!("{}", output::profile_line(&client.register_profile(&input).await?));
    }
    ProfileCommand::Subscribe { user_id } => {
      update(user_id, ProfileUpdate { subscribed: Some(true), ..Default::default() }).await?;
    }
    ProfileCommand::Unsubscribe { user_id } => {
      update(user_id, ProfileUpdate { subscribed: Some(false), ..Default::default() }).await?;
    }
    ProfileCommand::Favourite { user_id, quote_id } => {
      let change = ProfileUpdate {
        favourite_quote_id: quote_id,
        clear_favourite: quote_id.is_none(),
        ..Default::default()
      };
      update(user_id, change).await?;
    }
  }
  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;

  fn args(extra: &[&str]) -> Args {
    let mut argv = vec!["welove"];
    argv.extend_from_slice(extra);
    argv.push("daily");
    Args::try_parse_from(argv).unwrap()
  }

  #[test]
  fn flags_override_config_file() {
    let file_cfg = ConfigFile {
      url:      "http://file:1".into(),
      username: "file-user".into(),
      password: "file-pass".into(),
    };
    let cfg = resolve_config(&args(&["--url", "http://flag:2"]), &file_cfg);
    assert_eq!(cfg.base_url, "http://flag:2");
    assert_eq!(cfg.username, "file-user");
    assert_eq!(cfg.password, "file-pass");
  }

  #[test]
  fn defaults_apply_without_file_or_flags() {
    let parsed = Args::try_parse_from(["welove", "--url", "http://localhost:8000", "rotate"])
      .unwrap();
    assert!(matches!(parsed.command, Command::Rotate));

    let cfg = resolve_config(
      &Args { url: None, user: None, password: None, ..parsed },
      &ConfigFile::default(),
    );
    assert_eq!(cfg.base_url, "http://localhost:8000");
    assert!(cfg.username.is_empty());
  }

  #[test]
  fn config_file_parses_partial_toml() {
    let cfg: ConfigFile = toml::from_str("url = \"https://welove.example.com\"").unwrap();
    assert_eq!(cfg.url, "https://welove.example.com");
    assert!(cfg.password.is_empty());
  }

  #[test]
  fn quote_add_accepts_source_flag() {
    let id = Uuid::new_v4().to_string();
    let parsed =
      Args::try_parse_from(["welove", "quotes", "add", "COS rocks", "--source", &id]).unwrap();
    match parsed.command {
      Command::Quotes(QuoteCommand::Add { text, source }) => {
        assert_eq!(text, "COS rocks");
        assert_eq!(source.map(|s| s.to_string()), Some(id));
      }
      other => panic!("unexpected command {other:?}"),
    }
  }
}
