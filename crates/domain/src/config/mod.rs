mod backend;
mod chat;
mod observability;

pub use backend::*;
pub use chat::*;
pub use observability::*;

use serde::{Deserialize, Serialize};
use std::fmt;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Top-level config
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub backend: BackendConfig,
    #[serde(default)]
    pub chat: ChatConfig,
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Config validation
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Severity level for a configuration issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigSeverity {
    Error,
    Warning,
}

/// A single configuration validation issue.
#[derive(Debug, Clone)]
pub struct ConfigError {
    pub severity: ConfigSeverity,
    pub field: String,
    pub message: String,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self.severity {
            ConfigSeverity::Error => "ERROR",
            ConfigSeverity::Warning => "WARN",
        };
        write!(f, "[{tag}] {}: {}", self.field, self.message)
    }
}

impl Config {
    /// Validate the configuration and return a list of issues.
    ///
    /// Returns an empty vec when everything looks good.
    pub fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();

        if self.backend.base_url.trim().is_empty() {
            errors.push(ConfigError {
                severity: ConfigSeverity::Error,
                field: "backend.base_url".into(),
                message: "base_url must not be empty".into(),
            });
        } else if !self.backend.base_url.starts_with("http://")
            && !self.backend.base_url.starts_with("https://")
        {
            errors.push(ConfigError {
                severity: ConfigSeverity::Error,
                field: "backend.base_url".into(),
                message: "base_url must start with http:// or https://".into(),
            });
        }

        if self.backend.strategy.trim().is_empty() {
            errors.push(ConfigError {
                severity: ConfigSeverity::Error,
                field: "backend.strategy".into(),
                message: "strategy must not be empty".into(),
            });
        } else if !KNOWN_STRATEGIES.contains(&self.backend.strategy.as_str()) {
            errors.push(ConfigError {
                severity: ConfigSeverity::Warning,
                field: "backend.strategy".into(),
                message: format!(
                    "unknown strategy \"{}\" (known: {})",
                    self.backend.strategy,
                    KNOWN_STRATEGIES.join(", ")
                ),
            });
        }

        // A request timeout cuts long answers off mid-stream.
        if self.backend.request_timeout_ms > 0 && self.backend.request_timeout_ms < 5_000 {
            errors.push(ConfigError {
                severity: ConfigSeverity::Warning,
                field: "backend.request_timeout_ms".into(),
                message: "timeouts under 5s will truncate most streamed answers".into(),
            });
        }

        if !self.chat.system_prompt.contains("[]") {
            errors.push(ConfigError {
                severity: ConfigSeverity::Warning,
                field: "chat.system_prompt".into(),
                message: "prompt never mentions the [] citation placeholder".into(),
            });
        }

        errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_clean() {
        let issues = Config::default().validate();
        assert!(issues.is_empty(), "unexpected issues: {issues:?}");
    }

    #[test]
    fn empty_base_url_is_an_error() {
        let mut config = Config::default();
        config.backend.base_url = "  ".into();
        let issues = config.validate();
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].severity, ConfigSeverity::Error);
        assert_eq!(issues[0].field, "backend.base_url");
    }

    #[test]
    fn unknown_strategy_only_warns() {
        let mut config = Config::default();
        config.backend.strategy = "graph-rag".into();
        let issues = config.validate();
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].severity, ConfigSeverity::Warning);
    }

    #[test]
    fn display_tags_severity() {
        let e = ConfigError {
            severity: ConfigSeverity::Warning,
            field: "chat.system_prompt".into(),
            message: "x".into(),
        };
        assert_eq!(e.to_string(), "[WARN] chat.system_prompt: x");
    }
}
