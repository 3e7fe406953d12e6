use pl_domain::config::{Config, ConfigSeverity};

#[test]
fn default_endpoints_are_localhost() {
    let config = Config::default();
    assert_eq!(config.service.base_url, "http://localhost:8000");
    assert_eq!(config.service.ws_url, "ws://localhost:8000");
}

#[test]
fn default_session_lasts_ten_minutes() {
    let config = Config::default();
    assert_eq!(config.session.idle_timeout_secs, 600);
    assert_eq!(config.session.idle_timeout().as_secs(), 600);
}

#[test]
fn empty_file_yields_defaults() {
    let config: Config = toml::from_str("").unwrap();
    assert_eq!(config.session.idle_timeout_secs, 600);
    assert_eq!(config.channel.max_inbound_bytes, 64 * 1024);
    assert!(!config.presence.watch);
    assert_eq!(config.presence.path, "/notifications");
}

#[test]
fn partial_sections_keep_other_defaults() {
    let toml_str = r#"
[service]
base_url = "https://chat.example.com"

[session]
idle_timeout_secs = 120
"#;
    let config: Config = toml::from_str(toml_str).unwrap();
    assert_eq!(config.service.base_url, "https://chat.example.com");
    assert_eq!(config.service.ws_url, "ws://localhost:8000");
    assert_eq!(config.service.max_retries, 2);
    assert_eq!(config.session.idle_timeout_secs, 120);
}

#[test]
fn default_config_validates_clean() {
    assert!(Config::default().validate().is_empty());
}

#[test]
fn validate_flags_bad_urls_and_zero_timeout() {
    let toml_str = r#"
[service]
base_url = "localhost:8000"
ws_url = "http://localhost:8000"

[session]
idle_timeout_secs = 0
"#;
    let config: Config = toml::from_str(toml_str).unwrap();
    let issues = config.validate();
    let fields: Vec<&str> = issues.iter().map(|i| i.field.as_str()).collect();
    assert!(fields.contains(&"service.base_url"));
    assert!(fields.contains(&"service.ws_url"));
    assert!(fields.contains(&"session.idle_timeout_secs"));
    assert!(issues.iter().all(|i| i.severity == ConfigSeverity::Error));
}

#[test]
fn short_session_is_only_a_warning() {
    let config: Config = toml::from_str("[session]\nidle_timeout_secs = 30\n").unwrap();
    let issues = config.validate();
    assert_eq!(issues.len(), 1);
    assert_eq!(issues[0].severity, ConfigSeverity::Warning);
}

#[test]
fn zero_handshake_timeout_and_reconnect_delay_are_errors() {
    let toml_str = r#"
[channel]
connect_timeout_ms = 0

[presence]
reconnect_initial_ms = 0
"#;
    let config: Config = toml::from_str(toml_str).unwrap();
    let issues = config.validate();
    let fields: Vec<&str> = issues.iter().map(|i| i.field.as_str()).collect();
    assert_eq!(
        fields,
        ["channel.connect_timeout_ms", "presence.reconnect_initial_ms"]
    );
    assert!(issues.iter().all(|i| i.severity == ConfigSeverity::Error));
}
