pub mod account;
pub mod chat;
pub mod config;

use std::path::Path;

use anyhow::Context;
use clap::{Parser, Subcommand};
use pl_domain::config::Config;

/// Parley: a two-party terminal chat client.
#[derive(Debug, Parser)]
#[command(name = "parley", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Start the interactive chat (default when no subcommand is given).
    Chat {
        /// Log in as this user before the prompt appears.
        #[arg(long)]
        user: Option<String>,
    },
    /// Create an account.  Does not log in.
    Register {
        /// Username to register.
        name: String,
    },
    /// List the users currently online.
    Online,
    /// Configuration utilities.
    #[command(subcommand)]
    Config(ConfigCommand),
    /// Print version information.
    Version,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Parse the config file and report any errors.
    Validate,
    /// Dump the resolved configuration (with defaults) as TOML.
    Show,
}

// ── Config loading helper ─────────────────────────────────────────────

/// Load the configuration from the path in `PARLEY_CONFIG` (or
/// `parley.toml` by default).  Returns the parsed [`Config`] and the path
/// that was used.
pub fn load_config() -> anyhow::Result<(Config, String)> {
    let config_path = std::env::var("PARLEY_CONFIG").unwrap_or_else(|_| "parley.toml".into());
    let config = load_config_from(Path::new(&config_path))?;
    Ok((config, config_path))
}

/// Parse `path`, falling back to defaults when it does not exist.
pub fn load_config_from(path: &Path) -> anyhow::Result<Config> {
    if !path.exists() {
        return Ok(Config::default());
    }
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    toml::from_str(&raw).with_context(|| format!("parsing {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_means_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = load_config_from(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(cfg.service.base_url, "http://localhost:8000");
        assert_eq!(cfg.session.idle_timeout_secs, 600);
    }

    #[test]
    fn file_overrides_are_merged_with_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("parley.toml");
        std::fs::write(
            &path,
            "[service]\nbase_url = \"https://chat.example.com\"\n\n[presence]\nwatch = true\n",
        )
        .unwrap();

        let cfg = load_config_from(&path).unwrap();
        assert_eq!(cfg.service.base_url, "https://chat.example.com");
        assert_eq!(cfg.service.ws_url, "ws://localhost:8000");
        assert!(cfg.presence.watch);
        assert_eq!(cfg.presence.path, "/notifications");
    }

    #[test]
    fn parse_errors_name_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.toml");
        std::fs::write(&path, "[service\nbase_url = 1").unwrap();

        let err = load_config_from(&path).unwrap_err();
        assert!(format!("{err:#}").contains("broken.toml"));
    }

    #[test]
    fn cli_defaults_to_no_subcommand() {
        let cli = Cli::parse_from(["parley"]);
        assert!(cli.command.is_none());

        let cli = Cli::parse_from(["parley", "chat", "--user", "alice"]);
        match cli.command {
            Some(Command::Chat { user }) => assert_eq!(user.as_deref(), Some("alice")),
            other => panic!("unexpected {other:?}"),
        }
    }
}
