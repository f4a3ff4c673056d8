use rc_domain::config::{Config, FramingMode};

#[test]
fn default_backend_is_local_semantic_similarity() {
    let config = Config::default();
    assert_eq!(config.backend.base_url, "http://localhost:8000");
    assert_eq!(config.backend.strategy, "semantic-similarity");
}

#[test]
fn empty_file_parses_to_defaults() {
    let config: Config = toml::from_str("").unwrap();
    assert_eq!(config.chat.framing, FramingMode::Sniff);
    assert!(!config.observability.json_logs);
}

#[test]
fn full_file_parses() {
    let toml_str = r#"
[backend]
base_url = "http://10.0.0.5:8000"
strategy = "basic-rag"
connect_timeout_ms = 2500

[chat]
system_prompt = "Cite with []."
framing = "delimited"
show_context_inline = true
history_file = "/tmp/ragchat_history.txt"

[observability]
json_logs = true
"#;
    let config: Config = toml::from_str(toml_str).unwrap();
    assert_eq!(config.backend.strategy_url(), "http://10.0.0.5:8000/api/strategies/basic-rag");
    assert_eq!(config.backend.connect_timeout_ms, 2500);
    assert_eq!(config.chat.framing, FramingMode::Delimited);
    assert!(config.chat.show_context_inline);
    assert!(config.observability.json_logs);
}

#[test]
fn shown_config_round_trips_through_toml() {
    let shown = toml::to_string_pretty(&Config::default()).unwrap();
    let parsed: Config = toml::from_str(&shown).unwrap();
    assert_eq!(parsed.backend.base_url, Config::default().backend.base_url);
    assert_eq!(parsed.chat.system_prompt, Config::default().chat.system_prompt);
}
