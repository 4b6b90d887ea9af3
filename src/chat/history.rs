//! Per-session conversation history.

use serde::{Deserialize, Serialize};

/// A single exchange: the user's query and the answer given.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub user: String,
    pub bot: String,
}

/// Ordered, append-only list of turns. One instance per session.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConversationHistory {
    turns: Vec<ConversationTurn>,
}

impl ConversationHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a turn.
    pub fn add_turn(&mut self, user: impl Into<String>, bot: impl Into<String>) {
        self.turns.push(ConversationTurn {
            user: user.into(),
            bot: bot.into(),
        });
    }

    /// The last `turns` exchanges as `User: ...` / `Bot: ...` lines.
    pub fn recent_context(&self, turns: usize) -> String {
        let start = self.turns.len().saturating_sub(turns);
        self.turns[start..]
            .iter()
            .map(|t| format!("User: {}\nBot: {}\n", t.user, t.bot))
            .collect()
    }

    pub fn clear(&mut self) {
        self.turns.clear();
    }

    pub fn turns(&self) -> &[ConversationTurn] {
        &self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }
}
