//! The per-session conversation transcript
//!
//! Append-only: turns are pushed in arrival order and never edited or
//! removed for the lifetime of the session.

use std::io::{self, Write};

/// Greeting seeded into every fresh transcript.
pub const GREETING: &str =
    "Hi! I'm connected to the Chinook database. Ask me anything about sales, customers, or tracks!";

/// Who produced a turn
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    fn label(self) -> &'static str {
        match self {
            Role::User => "you",
            Role::Assistant => "assistant",
        }
    }
}

/// One message in the conversation
#[derive(Debug, Clone)]
pub struct Turn {
    pub role: Role,
    pub content: String,
}

/// Ordered list of turns for one session
pub struct Transcript {
    turns: Vec<Turn>,
}

impl Transcript {
    /// A fresh transcript containing only the assistant greeting.
    pub fn new() -> Self {
        Self {
            turns: vec![Turn {
                role: Role::Assistant,
                content: GREETING.to_string(),
            }],
        }
    }

    /// Append a user turn.
    pub fn push_user(&mut self, content: impl Into<String>) {
        self.turns.push(Turn {
            role: Role::User,
            content: content.into(),
        });
    }

    /// Append an assistant turn.
    pub fn push_assistant(&mut self, content: impl Into<String>) {
        self.turns.push(Turn {
            role: Role::Assistant,
            content: content.into(),
        });
    }

    /// All turns in conversation order.
    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    /// The most recently appended turn.
    pub fn last(&self) -> Option<&Turn> {
        self.turns.last()
    }

    /// Render the full transcript, role-tagged, in order.
    pub fn render(&self, w: &mut impl Write) -> io::Result<()> {
        for turn in &self.turns {
            render_turn(turn, w)?;
        }
        Ok(())
    }
}

impl Default for Transcript {
    fn default() -> Self {
        Self::new()
    }
}

/// Render one turn with its role tag.
pub fn render_turn(turn: &Turn, w: &mut impl Write) -> io::Result<()> {
    writeln!(w, "[{}] {}", turn.role.label(), turn.content)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seed_state() {
        let t = Transcript::new();
        assert_eq!(t.len(), 1);
        assert_eq!(t.turns()[0].role, Role::Assistant);
        assert_eq!(t.turns()[0].content, GREETING);
    }

    #[test]
    fn test_successful_exchange_adds_two_turns() {
        let mut t = Transcript::new();
        t.push_user("How many customers are there?");
        t.push_assistant("There are 59 customers.");

        assert_eq!(t.len(), 3);
        assert_eq!(t.turns()[1].role, Role::User);
        assert_eq!(t.turns()[1].content, "How many customers are there?");
        assert_eq!(t.turns()[2].role, Role::Assistant);
        assert_eq!(t.turns()[2].content, "There are 59 customers.");
    }

    #[test]
    fn test_failed_query_adds_only_user_turn() {
        // A failed agent call appends nothing: the caller appends the
        // user turn before invoking and skips the assistant turn on
        // error, leaving the question unanswered in the transcript.
        let mut t = Transcript::new();
        t.push_user("first question");
        // (agent fails; no assistant turn)
        t.push_user("second question");
        t.push_assistant("second answer");

        assert_eq!(t.len(), 4);
        assert_eq!(t.turns()[1].role, Role::User);
        assert_eq!(t.turns()[2].role, Role::User);
        assert_eq!(t.turns()[3].role, Role::Assistant);
    }

    #[test]
    fn test_length_accounting() {
        // 1 seed + N user turns + S successes.
        let mut t = Transcript::new();
        let queries = 5;
        let successes = 3;
        for i in 0..queries {
            t.push_user(format!("q{i}"));
            if i < successes {
                t.push_assistant(format!("a{i}"));
            }
        }
        assert_eq!(t.len(), 1 + queries + successes);
    }

    #[test]
    fn test_assistant_follows_user() {
        let mut t = Transcript::new();
        t.push_user("q1");
        t.push_assistant("a1");
        t.push_user("q2");
        t.push_user("q3");
        t.push_assistant("a3");

        // After the seed, every assistant turn is preceded by a user
        // turn.
        let turns = t.turns();
        for i in 1..turns.len() {
            if turns[i].role == Role::Assistant {
                assert_eq!(turns[i - 1].role, Role::User);
            }
        }
    }

    #[test]
    fn test_render_full_transcript_in_order() {
        let mut t = Transcript::new();
        t.push_user("How many customers are there?");
        t.push_assistant("There are 59 customers.");

        let mut buf = Vec::new();
        t.render(&mut buf).unwrap();
        let rendered = String::from_utf8(buf).unwrap();

        let lines: Vec<&str> = rendered.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("[assistant] Hi!"));
        assert_eq!(lines[1], "[you] How many customers are there?");
        assert_eq!(lines[2], "[assistant] There are 59 customers.");
    }
}
