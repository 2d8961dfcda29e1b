//! Append-only log of the turns in the current session

use crate::events::Turn;

/// Ordered, in-memory chat log.
///
/// Turns are only ever appended; nothing is removed, reordered or merged.
#[derive(Debug, Clone)]
pub struct MessageStore {
    turns: Vec<Turn>,
}

impl MessageStore {
    /// Create a log seeded with the greeting turn
    pub fn new(greeting: impl Into<String>) -> Self {
        Self {
            turns: vec![Turn::greeting(greeting)],
        }
    }

    pub fn append(&mut self, turn: Turn) {
        self.turns.push(turn);
    }

    /// All turns in insertion order
    pub fn all(&self) -> &[Turn] {
        &self.turns
    }

    pub fn snapshot(&self) -> Vec<Turn> {
        self.turns.clone()
    }

    pub fn last(&self) -> Option<&Turn> {
        self.turns.last()
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
    use crate::events::{Sender, GREETING, GREETING_ID};

    #[test]
    fn starts_with_single_greeting() {
        let store = MessageStore::new(GREETING);

        assert_eq!(store.len(), 1);
        let greeting = &store.all()[0];
        assert_eq!(greeting.sender, Sender::Bot);
        assert_eq!(greeting.text, GREETING);
        assert_eq!(greeting.id.as_str(), GREETING_ID);
    }

    #[test]
    fn append_keeps_insertion_order() {
        let mut store = MessageStore::new(GREETING);
        store.append(Turn::user("first"));
        store.append(Turn::bot("second"));
        store.append(Turn::user("first"));

        let texts: Vec<&str> = store.all().iter().map(|t| t.text.as_str()).collect();
        assert_eq!(texts, vec![GREETING, "first", "second", "first"]);
        assert_eq!(store.last().map(|t| t.sender), Some(Sender::User));
    }
}
