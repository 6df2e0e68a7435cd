//! `sophia`, the command-line client for the Sophia argument store.
//!
//! # Usage
//!
//! ```text
//! sophia save --conclusion "Socrates is mortal" \
//!   --premise "Socrates is a man" --premise "All men are mortal"
//! sophia get 1 --version 1
//! sophia list "Socrates is mortal"
//! sophia --config ~/.config/sophia/config.toml delete 1
//! ```

mod client;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use client::{ApiClient, ApiConfig};
use serde::Deserialize;
use sophia_core::{Argument, ArgumentId, VersionNumber};
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

const DEFAULT_URL: &str = "http://localhost:8001";

// ─── CLI args ─────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "sophia", about = "Client for the Sophia argument store")]
struct Args {
  /// Path to a TOML config file (url, username, password).
  #[arg(short, long, value_name = "FILE")]
  config: Option<PathBuf>,

  /// Base URL of the sophia server (default: http://localhost:8001).
  #[arg(long, env = "SOPHIA_URL")]
  url: Option<String>,

  /// API username.
  #[arg(long, env = "SOPHIA_USER")]
  user: Option<String>,

  /// API password (plaintext).
  #[arg(long, env = "SOPHIA_PASSWORD")]
  password: Option<String>,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
  /// Print an argument, live or at a given version.
  Get {
    id:      ArgumentId,
    #[arg(long)]
    version: Option<VersionNumber>,
  },
  /// Print every argument whose live version has this conclusion.
  List { conclusion: String },
  /// Save a new argument.
  Save {
    #[arg(long)]
    conclusion: String,
    /// Repeat once per premise, in order.
    #[arg(long = "premise", required = true)]
    premises:   Vec<String>,
  },
  /// Replace an argument's premises, creating a new version.
  Update {
    id:       ArgumentId,
    #[arg(long = "premise", required = true)]
    premises: Vec<String>,
  },
  /// Delete an argument and its whole history.
  Delete { id: ArgumentId },
}

// ─── Config file ──────────────────────────────────────────────────────────────

/// Shape of the optional TOML config file.
#[derive(Deserialize, Default)]
struct ConfigFile {
  #[serde(default)]
  url:      String,
  #[serde(default)]
  username: String,
  #[serde(default)]
  password: String,
}

/// CLI flags override the config file, which overrides defaults.
fn resolve_config(args: &Args, file_cfg: ConfigFile) -> ApiConfig {
  ApiConfig {
    base_url: args
      .url
      .clone()
      .filter(|s| !s.is_empty())
      .or_else(|| Some(file_cfg.url).filter(|s| !s.is_empty()))
      .unwrap_or_else(|| DEFAULT_URL.to_string()),
    username: args.user.clone().unwrap_or(file_cfg.username),
    password: args.password.clone().unwrap_or(file_cfg.password),
  }
}

// ─── Entry point ──────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::WARN.into())
        .from_env_lossy(),
    )
    .with_writer(std::io::stderr)
    .init();

  let args = Args::parse();

  let file_cfg: ConfigFile = if let Some(path) = &args.config {
    let raw = std::fs::read_to_string(path)
      .with_context(|| format!("reading config file {}", path.display()))?;
    toml::from_str(&raw).context("parsing config file")?
  } else {
    ConfigFile::default()
  };

  let api_config = resolve_config(&args, file_cfg);
  tracing::debug!(url = %api_config.base_url, "using server");
  let client = ApiClient::new(api_config)?;

  match args.command {
    Command::Get { id, version } => match client.get_one(id, version).await? {
      Some(found) => println!("{}", serde_json::to_string_pretty(&found)?),
      None => match version {
        Some(v) => println!("argument {id} has no version {v}"),
        None => println!("argument {id} not found"),
      },
    },
    Command::List { conclusion } => {
      let found = client.get_all(&conclusion).await?;
      println!("{}", serde_json::to_string_pretty(&found)?);
    }
    Command::Save { conclusion, premises } => {
      let location = client.save(&Argument { conclusion, premises }).await?;
      println!("{location}");
    }
    Command::Update { id, premises } => {
      let location = client.update(id, &premises).await?;
      println!("{location}");
    }
    Command::Delete { id } => {
      client.delete(id).await?;
      println!("deleted argument {id}");
    }
  }

  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;

  fn parse(argv: &[&str]) -> Args {
    Args::try_parse_from(argv).unwrap()
  }

  #[test]
  fn save_collects_repeated_premises_in_order() {
    let args = parse(&[
      "sophia", "save", "--conclusion", "c", "--premise", "b", "--premise", "a",
    ]);
    match args.command {
      Command::Save { conclusion, premises } => {
        assert_eq!(conclusion, "c");
        assert_eq!(premises, ["b", "a"]);
      }
      other => panic!("unexpected command {other:?}"),
    }
  }

  #[test]
  fn flags_override_config_file() {
    let args = parse(&["sophia", "--url", "http://flag", "delete", "1"]);
    let file = ConfigFile {
      url:      "http://file".into(),
      username: "alice".into(),
      password: "pw".into(),
    };
    let cfg = resolve_config(&args, file);
    assert_eq!(cfg.base_url, "http://flag");
    assert_eq!(cfg.username, "alice");
  }

  #[test]
  fn default_url_applies_when_nothing_is_set() {
    let args = parse(&["sophia", "list", "x"]);
    let cfg = resolve_config(&args, ConfigFile::default());
    assert_eq!(cfg.base_url, DEFAULT_URL);
  }
}
