use serde::{Deserialize, Serialize};

/// Who authored a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::System => "system",
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One message in the conversation transcript.
///
/// Fields are private: once constructed a turn cannot be edited, so the
/// content and the context snapshot seen at append time are final.
/// Serializes to the backend's wire shape (`role` + `content`); the
/// context chunks stay client-side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    role: Role,
    content: String,
    #[serde(skip)]
    context_chunks: Option<Vec<String>>,
}

impl Turn {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
            context_chunks: None,
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
            context_chunks: None,
        }
    }

    /// An assistant turn.  An empty chunk list is stored as "no context"
    /// so only turns that actually retrieved material carry chunks.
    pub fn assistant(content: impl Into<String>, context_chunks: Vec<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
            context_chunks: if context_chunks.is_empty() {
                None
            } else {
                Some(context_chunks)
            },
        }
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    /// Retrieved chunks captured with this turn, if any.
    pub fn context_chunks(&self) -> Option<&[String]> {
        self.context_chunks.as_deref()
    }

    pub fn has_context(&self) -> bool {
        self.context_chunks.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn assistant_with_empty_chunks_has_no_context() {
        let turn = Turn::assistant("answer", Vec::new());
        assert!(turn.context_chunks().is_none());
        assert!(!turn.has_context());
    }

    #[test]
    fn assistant_keeps_chunk_order() {
        let turn = Turn::assistant("a", vec!["X".into(), "Y".into()]);
        assert_eq!(turn.context_chunks().unwrap(), ["X", "Y"]);
    }

    #[test]
    fn wire_shape_omits_context() {
        let turn = Turn::assistant("答案[]", vec!["段落A".into()]);
        let json = serde_json::to_value(&turn).unwrap();
        assert_eq!(json, serde_json::json!({ "role": "assistant", "content": "答案[]" }));
    }

    #[test]
    fn user_turn_role_is_lowercase_on_wire() {
        let json = serde_json::to_string(&Turn::user("q")).unwrap();
        assert_eq!(json, r#"{"role":"user","content":"q"}"#);
    }
}
