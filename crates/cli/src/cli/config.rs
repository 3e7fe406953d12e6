//! `parley config validate|show`.

use std::fmt::Write as _;

use pl_domain::config::{Config, ConfigError, ConfigSeverity};

/// Issues found in one config file, errors and warnings kept apart so
/// errors are always listed first.
#[derive(Debug)]
pub struct ValidationReport {
    pub errors: Vec<ConfigError>,
    pub warnings: Vec<ConfigError>,
}

impl ValidationReport {
    pub fn of(config: &Config) -> Self {
        let (errors, warnings) = config
            .validate()
            .into_iter()
            .partition(|issue| issue.severity == ConfigSeverity::Error);
        Self { errors, warnings }
    }

    /// A config with only warnings is still usable.
    pub fn is_usable(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn render(&self, config_path: &str) -> String {
        if self.errors.is_empty() && self.warnings.is_empty() {
            return format!("{config_path}: OK\n");
        }

        let mut out = String::new();
        for issue in self.errors.iter().chain(&self.warnings) {
            let _ = writeln!(out, "  {issue}");
        }
        let verdict = if self.is_usable() { "usable" } else { "rejected" };
        let _ = writeln!(
            out,
            "{config_path}: {verdict} with {} error(s), {} warning(s)",
            self.errors.len(),
            self.warnings.len()
        );
        out
    }
}

/// Print the report for `config`.  Returns `false` when the client would
/// refuse to start with it.
pub fn validate(config: &Config, config_path: &str) -> bool {
    let report = ValidationReport::of(config);
    print!("{}", report.render(config_path));
    report.is_usable()
}

/// Print the resolved config as TOML, headed by the endpoints it produces.
pub fn show(config: &Config, config_path: &str) -> anyhow::Result<()> {
    print!("{}", endpoint_summary(config, config_path));
    print!("{}", toml::to_string_pretty(config)?);
    Ok(())
}

/// Comment block naming the URLs the client will actually contact.
fn endpoint_summary(config: &Config, config_path: &str) -> String {
    let ws = config.service.ws_url.trim_end_matches('/');
    let presence = if config.presence.watch {
        format!("{ws}{}", config.presence.path)
    } else {
        "off (polled on connect)".to_owned()
    };
    format!(
        "# resolved from {config_path}\n\
         # accounts: {}\n\
         # chat:     {ws}/chat/{{local}}/{{partner}}\n\
         # presence: {presence}\n\n",
        config.service.base_url.trim_end_matches('/'),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_ok() {
        let report = ValidationReport::of(&Config::default());
        assert!(report.is_usable());
        assert_eq!(report.render("parley.toml"), "parley.toml: OK\n");
    }

    #[test]
    fn errors_are_listed_before_warnings() {
        let mut cfg = Config::default();
        cfg.session.idle_timeout_secs = 30;
        cfg.service.ws_url = "http://localhost:8000".into();

        let report = ValidationReport::of(&cfg);
        assert!(!report.is_usable());
        let text = report.render("parley.toml");
        let err_at = text.find("service.ws_url").unwrap();
        let warn_at = text.find("session.idle_timeout_secs").unwrap();
        assert!(err_at < warn_at, "{text}");
        assert!(text.ends_with("parley.toml: rejected with 1 error(s), 1 warning(s)\n"));
    }

    #[test]
    fn warnings_alone_leave_the_config_usable() {
        let mut cfg = Config::default();
        cfg.session.idle_timeout_secs = 30;
        assert!(validate(&cfg, "parley.toml"));
    }

    #[test]
    fn summary_names_the_chat_and_presence_urls() {
        let mut cfg = Config::default();
        cfg.service.ws_url = "wss://chat.example.com/".into();
        let text = endpoint_summary(&cfg, "parley.toml");
        assert!(text.contains("# chat:     wss://chat.example.com/chat/{local}/{partner}"));
        assert!(text.contains("# presence: off"));

        cfg.presence.watch = true;
        let text = endpoint_summary(&cfg, "parley.toml");
        assert!(text.contains("# presence: wss://chat.example.com/notifications"));
    }
}
