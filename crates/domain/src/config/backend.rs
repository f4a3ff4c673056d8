use serde::{Deserialize, Serialize};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// QA backend
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Retrieval strategies served by the reference backend.
pub const KNOWN_STRATEGIES: &[&str] = &[
    "basic-rag",
    "semantic-similarity",
    "hybrid-search",
    "multi-hop",
];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    /// Scheme + host of the QA backend, without a trailing path.
    #[serde(default = "d_base_url")]
    pub base_url: String,
    /// Strategy path segment: endpoints live under
    /// `{base_url}/api/strategies/{strategy}`.
    #[serde(default = "d_strategy")]
    pub strategy: String,
    /// Whole-request timeout.  `0` disables it; answers stream for as long
    /// as the generator keeps talking.
    #[serde(default)]
    pub request_timeout_ms: u64,
    #[serde(default = "d_10000")]
    pub connect_timeout_ms: u64,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: d_base_url(),
            strategy: d_strategy(),
            request_timeout_ms: 0,
            connect_timeout_ms: 10_000,
        }
    }
}

impl BackendConfig {
    /// Root URL of the selected strategy's endpoints.
    pub fn strategy_url(&self) -> String {
        format!(
            "{}/api/strategies/{}",
            self.base_url.trim_end_matches('/'),
            self.strategy.trim_matches('/')
        )
    }
}

fn d_base_url() -> String {
    "http://localhost:8000".into()
}

fn d_strategy() -> String {
    "semantic-similarity".into()
}

fn d_10000() -> u64 {
    10_000
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strategy_url_joins_segments() {
        let cfg = BackendConfig::default();
        assert_eq!(
            cfg.strategy_url(),
            "http://localhost:8000/api/strategies/semantic-similarity"
        );
    }

    #[test]
    fn strategy_url_tolerates_trailing_slash() {
        let cfg = BackendConfig {
            base_url: "http://qa.internal:9000/".into(),
            strategy: "basic-rag".into(),
            ..BackendConfig::default()
        };
        assert_eq!(cfg.strategy_url(), "http://qa.internal:9000/api/strategies/basic-rag");
    }

    #[test]
    fn deserialize_empty_uses_defaults() {
        let cfg: BackendConfig = toml::from_str("").unwrap();
        assert_eq!(cfg.base_url, "http://localhost:8000");
        assert_eq!(cfg.request_timeout_ms, 0);
        assert_eq!(cfg.connect_timeout_ms, 10_000);
    }
}
