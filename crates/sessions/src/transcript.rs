//! Append-only session transcript.
//!
//! Turns are only ever pushed to the end; there is no update or delete.
//! Each turn is stamped with the time it was appended.

use chrono::{DateTime, Utc};
use rc_domain::trace::TraceEvent;
use rc_domain::{Role, Turn};

/// The ordered turns of one chat session.
#[derive(Debug, Default)]
pub struct Transcript {
    turns: Vec<Turn>,
    appended_at: Vec<DateTime<Utc>>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a transcript with a seeded system turn.
    pub fn with_system_prompt(prompt: &str) -> Self {
        let mut transcript = Self::new();
        if !prompt.trim().is_empty() {
            transcript.append(Turn::system(prompt));
        }
        transcript
    }

    /// Append a turn and return a reference to it.
    pub fn append(&mut self, turn: Turn) -> &Turn {
        TraceEvent::TranscriptAppend {
            role: turn.role().to_string(),
            turns: self.turns.len() + 1,
        }
        .emit();

        self.turns.push(turn);
        self.appended_at.push(Utc::now());
        &self.turns[self.turns.len() - 1]
    }

    /// All turns in conversational order.
    pub fn all(&self) -> &[Turn] {
        &self.turns
    }

    pub fn get(&self, index: usize) -> Option<&Turn> {
        self.turns.get(index)
    }

    pub fn last(&self) -> Option<&Turn> {
        self.turns.last()
    }

    /// When the turn at `index` was appended.
    pub fn appended_at(&self, index: usize) -> Option<DateTime<Utc>> {
        self.appended_at.get(index).copied()
    }

    /// Index of the most recent assistant turn.
    pub fn last_assistant(&self) -> Option<usize> {
        self.turns.iter().rposition(|t| t.role() == Role::Assistant)
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rc_domain::Role;

    #[test]
    fn append_preserves_order() {
        let mut t = Transcript::new();
        t.append(Turn::user("q1"));
        t.append(Turn::assistant("a1", Vec::new()));
        t.append(Turn::user("q2"));
        let roles: Vec<Role> = t.all().iter().map(Turn::role).collect();
        assert_eq!(roles, vec![Role::User, Role::Assistant, Role::User]);
        assert_eq!(t.all()[2].content(), "q2");
    }

    #[test]
    fn append_returns_the_stored_turn() {
        let mut t = Transcript::new();
        let stored = t.append(Turn::assistant("a", vec!["c".into()]));
        assert_eq!(stored.context_chunks().unwrap(), ["c"]);
    }

    #[test]
    fn system_prompt_is_seeded() {
        let t = Transcript::with_system_prompt("rules");
        assert_eq!(t.len(), 1);
        assert_eq!(t.all()[0].role(), Role::System);
    }

    #[test]
    fn blank_system_prompt_is_not_seeded() {
        assert!(Transcript::with_system_prompt("   ").is_empty());
    }

    #[test]
    fn timestamps_follow_turns() {
        let mut t = Transcript::new();
        t.append(Turn::user("a"));
        t.append(Turn::user("b"));
        let first = t.appended_at(0).unwrap();
        let second = t.appended_at(1).unwrap();
        assert!(first <= second);
        assert!(t.appended_at(2).is_none());
    }

    #[test]
    fn last_assistant_skips_user_turns() {
        let mut t = Transcript::new();
        t.append(Turn::assistant("a", vec!["x".into()]));
        t.append(Turn::assistant("b", Vec::new()));
        t.append(Turn::user("c"));
        assert_eq!(t.last_assistant(), Some(1));
    }
}
