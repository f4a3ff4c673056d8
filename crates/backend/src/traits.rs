use rc_domain::error::Result;
use rc_domain::stream::ByteStream;
use rc_domain::Turn;
use serde::{Deserialize, Deserializer, Serialize};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Request / Response types
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Body of a query submission.
#[derive(Debug, Clone, Serialize)]
pub struct QaRequest {
    /// The whole transcript so far, ending with the new user turn.
    pub messages: Vec<Turn>,
    /// Knowledge base to retrieve from.
    pub knowledge_base_name: String,
}

/// Response of the knowledge-base directory endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct KnowledgeBaseList {
    /// A missing or `null` field means no knowledge bases.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub knowledge_bases: Vec<String>,
}

fn null_as_empty<'de, D>(deserializer: D) -> std::result::Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<String>>::deserialize(deserializer)?.unwrap_or_default())
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Backend trait
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// A question-answering service that streams its answers.
#[async_trait::async_trait]
pub trait QaBackend: Send + Sync {
    /// Names of the knowledge bases that can be queried.
    async fn knowledge_bases(&self) -> Result<Vec<String>>;

    /// Submit a query and return the raw answer body.
    ///
    /// Fails with [`Error::StreamUnavailable`](rc_domain::Error) when the
    /// response has no body to read.
    async fn ask(&self, req: &QaRequest) -> Result<ByteStream>;

    /// A short identifier used in logs.
    fn backend_id(&self) -> &str;
}
