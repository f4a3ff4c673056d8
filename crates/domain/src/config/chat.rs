use serde::{Deserialize, Serialize};
use std::path::PathBuf;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Chat session
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// How control frames are told apart from narrative text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum FramingMode {
    /// Try every decoded fragment as a control frame; anything that does
    /// not parse is text.  Matches what the reference backend emits today.
    #[default]
    Sniff,
    /// Only `data: ` at stream or line start opens a control frame, which
    /// runs to the next blank line.  Frames split across reads are
    /// reassembled and plain text is never JSON-parsed.
    Delimited,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatConfig {
    /// Seeded as the first (system) turn of every session.
    #[serde(default = "d_system_prompt")]
    pub system_prompt: String,
    #[serde(default)]
    pub framing: FramingMode,
    /// Print retrieved chunks under each answer instead of on demand.
    #[serde(default)]
    pub show_context_inline: bool,
    /// Line-editor history for the interactive REPL.
    #[serde(default)]
    pub history_file: Option<PathBuf>,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            system_prompt: d_system_prompt(),
            framing: FramingMode::Sniff,
            show_context_inline: false,
            history_file: None,
        }
    }
}

pub const DEFAULT_SYSTEM_PROMPT: &str = "\
Answer the user's question and cite the reference material you rely on.

Citation rules:
- Put a citation directly after every sentence that uses a reference result.
- Write each citation as an empty pair of square brackets, for example: \
\"Ice is less dense than water[].\" The client numbers them in order.
- One bracket pair per cited result; never group several in one pair.
- No space between the last word and the citation.
- Cite at most three results per sentence, choosing the most relevant.
- Do not add a reference list or bibliography at the end of the answer.
- If the material is empty or unhelpful, answer from general knowledge.";

fn d_system_prompt() -> String {
    DEFAULT_SYSTEM_PROMPT.into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn framing_defaults_to_sniff() {
        let cfg: ChatConfig = toml::from_str("").unwrap();
        assert_eq!(cfg.framing, FramingMode::Sniff);
        assert!(cfg.history_file.is_none());
    }

    #[test]
    fn framing_parses_snake_case() {
        let cfg: ChatConfig = toml::from_str("framing = \"delimited\"").unwrap();
        assert_eq!(cfg.framing, FramingMode::Delimited);
    }

    #[test]
    fn default_prompt_mentions_placeholder() {
        assert!(ChatConfig::default().system_prompt.contains("[]"));
    }
}
