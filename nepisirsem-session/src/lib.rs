//! # nepisirsem-session
//!
//! In-memory conversation record for one interactive run of the assistant.
//!
//! A [`Session`] keeps the ordered user and assistant turns so they can be
//! shown back to the user. The history is display-only: questions are
//! answered independently of it.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Who produced a turn.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::User => f.write_str("Sen"),
            Role::Assistant => f.write_str("Asistan"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ConversationTurn {
    pub role: Role,
    pub text: String,
    pub timestamp: DateTime<Utc>,
}

/// An ordered, append-only conversation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    id: String,
    created_at: DateTime<Utc>,
    turns: Vec<ConversationTurn>,
}

impl Session {
    pub fn new() -> Self {
        Self { id: Uuid::new_v4().to_string(), created_at: Utc::now(), turns: Vec::new() }
    }

    /// A session that opens with an assistant greeting.
    pub fn with_greeting(greeting: impl Into<String>) -> Self {
        let mut session = Self::new();
        session.append(Role::Assistant, greeting);
        session
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn append(&mut self, role: Role, text: impl Into<String>) {
        self.turns.push(ConversationTurn { role, text: text.into(), timestamp: Utc::now() });
    }

    /// Turns in the order they were appended.
    pub fn history(&self) -> &[ConversationTurn] {
        &self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    pub fn last(&self) -> Option<&ConversationTurn> {
        self.turns.last()
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sessions_get_distinct_ids() {
        let a = Session::new();
        let b = Session::new();
        assert_ne!(a.id(), b.id());
        assert!(Uuid::parse_str(a.id()).is_ok());
        assert!(a.is_empty());
    }

    #[test]
    fn greeting_is_first_assistant_turn() {
        let session = Session::with_greeting("Merhaba!");
        assert_eq!(session.len(), 1);
        assert_eq!(session.history()[0].role, Role::Assistant);
        assert_eq!(session.history()[0].text, "Merhaba!");
    }

    #[test]
    fn turns_keep_append_order() {
        let mut session = Session::new();
        session.append(Role::User, "Elimde yumurta var");
        session.append(Role::Assistant, "Menemen yapabilirsin");
        session.append(Role::User, "teşekkürler");

        let roles: Vec<Role> = session.history().iter().map(|t| t.role).collect();
        assert_eq!(roles, [Role::User, Role::Assistant, Role::User]);
        assert_eq!(session.last().map(|t| t.text.as_str()), Some("teşekkürler"));
        assert!(session.history().windows(2).all(|w| w[0].timestamp <= w[1].timestamp));
    }

    #[test]
    fn turns_serialize_with_lowercase_roles() {
        let mut session = Session::new();
        session.append(Role::User, "Pilav");
        let json = serde_json::to_value(&session).unwrap();
        assert_eq!(json["turns"][0]["role"], "user");
        assert_eq!(json["turns"][0]["text"], "Pilav");
    }
}
