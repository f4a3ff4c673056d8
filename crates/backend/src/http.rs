//! reqwest implementation of [`QaBackend`].

use std::time::Duration;

use futures_util::StreamExt;
use rc_domain::config::BackendConfig;
use rc_domain::error::{Error, Result};
use rc_domain::stream::ByteStream;

use crate::traits::{KnowledgeBaseList, QaBackend, QaRequest};
use crate::util::{error_message, from_reqwest};

/// Talks to one retrieval strategy of the QA backend over HTTP.
///
/// Endpoints (relative to [`BackendConfig::strategy_url`]):
/// - `GET  /knowledge-bases` → `{"knowledge_bases": [...]}`
/// - `POST /qa` → streamed answer body
pub struct HttpBackend {
    id: String,
    base_url: String,
    client: reqwest::Client,
}

impl HttpBackend {
    pub fn new(cfg: &BackendConfig) -> Result<Self> {
        let mut builder = reqwest::Client::builder()
            .connect_timeout(Duration::from_millis(cfg.connect_timeout_ms));
        if cfg.request_timeout_ms > 0 {
            builder = builder.timeout(Duration::from_millis(cfg.request_timeout_ms));
        }
        let client = builder.build().map_err(from_reqwest)?;

        Ok(Self {
            id: cfg.strategy.clone(),
            base_url: cfg.strategy_url(),
            client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    async fn check_status(resp: reqwest::Response) -> Result<reqwest::Response> {
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }
        let body = resp.text().await.map_err(from_reqwest)?;
        Err(Error::Backend {
            status: status.as_u16(),
            message: error_message(&body),
        })
    }
}

#[async_trait::async_trait]
impl QaBackend for HttpBackend {
    async fn knowledge_bases(&self) -> Result<Vec<String>> {
        let resp = self
            .client
            .get(self.url("knowledge-bases"))
            .send()
            .await
            .map_err(from_reqwest)?;
        let resp = Self::check_status(resp).await?;

        let text = resp.text().await.map_err(from_reqwest)?;
        let list: KnowledgeBaseList = serde_json::from_str(&text)?;
        tracing::debug!(
            backend = %self.id,
            count = list.knowledge_bases.len(),
            "knowledge bases listed"
        );
        Ok(list.knowledge_bases)
    }

    async fn ask(&self, req: &QaRequest) -> Result<ByteStream> {
        tracing::debug!(
            backend = %self.id,
            knowledge_base = %req.knowledge_base_name,
            turns = req.messages.len(),
            "submitting query"
        );

        let resp = self
            .client
            .post(self.url("qa"))
            .json(req)
            .send()
            .await
            .map_err(from_reqwest)?;
        let resp = Self::check_status(resp).await?;

        if resp.status() == reqwest::StatusCode::NO_CONTENT || resp.content_length() == Some(0) {
            tracing::warn!(backend = %self.id, status = %resp.status(), "answer has no body");
            return Err(Error::StreamUnavailable);
        }

        let body = resp
            .bytes_stream()
            .map(|chunk| chunk.map(|bytes| bytes.to_vec()).map_err(from_reqwest));
        Ok(Box::pin(body))
    }

    fn backend_id(&self) -> &str {
        &self.id
    }
}
