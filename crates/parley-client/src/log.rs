//! Ordered message log.
//!
//! The log mirrors the server's view of the conversation: insertion order is
//! arrival order, history replays replace it wholesale, and reaction
//! broadcasts replace single entries in place. Entries are never deleted
//! client-side.

use parley_proto::ChatMessage;

/// Ordered sequence of chat messages.
#[derive(Debug, Clone, Default)]
pub struct MessageLog {
    entries: Vec<ChatMessage>,
}

impl MessageLog {
    /// Create an empty log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// All entries in arrival order.
    #[must_use]
    pub fn entries(&self) -> &[ChatMessage] {
        &self.entries
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the log is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Replace the whole log with a replayed history.
    ///
    /// Replaying the same sequence twice leaves the log equal to that
    /// sequence, not duplicated.
    pub fn replace_all(&mut self, history: Vec<ChatMessage>) {
        self.entries = history;
    }

    /// Append one message at the end.
    ///
    /// No deduplication: a repeated delivery produces a duplicate visible
    /// entry. The server contract owns at-most-once delivery.
    pub fn append(&mut self, message: ChatMessage) {
        self.entries.push(message);
    }

    /// Replace the entry whose id matches the update's id.
    ///
    /// The entry is replaced entirely (not merged), at its existing
    /// position. Returns `false` when the update carries no id or no entry
    /// matches; the log is left unchanged in that case.
    pub fn apply_update(&mut self, update: ChatMessage) -> bool {
        let Some(id) = update.id.as_deref() else {
            return false;
        };

        match self.position_of(id) {
            Some(index) => {
                self.entries[index] = update;
                true
            },
            None => false,
        }
    }

    /// Entry with the given id, if any.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&ChatMessage> {
        self.position_of(id).map(|index| &self.entries[index])
    }

    fn position_of(&self, id: &str) -> Option<usize> {
        self.entries.iter().position(|entry| entry.id.as_deref() == Some(id))
    }
}

/// Convenience for tests and the simulated server.
impl FromIterator<ChatMessage> for MessageLog {
    fn from_iter<I: IntoIterator<Item = ChatMessage>>(iter: I) -> Self {
        Self { entries: iter.into_iter().collect() }
    }
}
