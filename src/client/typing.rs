//! Who is typing right now, with entries that expire on their own.

use crate::types::ConnectionId;
use std::collections::HashMap;
use std::time::Duration;
use tokio::time::Instant;

/// How long a typing notice stays visible
pub const TYPING_WINDOW: Duration = Duration::from_millis(1500);

#[derive(Debug, Clone)]
struct TypingEntry {
    name: String,
    expires_at: Instant,
}

/// Expiring map of connection id to display name.
///
/// A repeated notice from the same connection pushes its expiry forward. Expired
/// entries are purged whenever a notice is recorded or the board is read, so the map
/// never outgrows the set of recently active typists.
#[derive(Debug, Clone)]
pub struct TypingBoard {
    entries: HashMap<ConnectionId, TypingEntry>,
    window: Duration,
}

impl Default for TypingBoard {
    fn default() -> Self {
        Self::new(TYPING_WINDOW)
    }
}

impl TypingBoard {
    pub fn new(window: Duration) -> Self {
        Self {
            entries: HashMap::new(),
            window,
        }
    }

    pub fn note_at(&mut self, id: ConnectionId, name: String, now: Instant) {
        self.sweep_at(now);
        self.entries.insert(
            id,
            TypingEntry {
                name,
                expires_at: now + self.window,
            },
        );
    }

    /// Names still inside their window, sorted for stable display
    pub fn active_at(&mut self, now: Instant) -> Vec<String> {
        self.sweep_at(now);
        let mut names: Vec<String> = self.entries.values().map(|e| e.name.clone()).collect();
        names.sort();
        names
    }

    /// Drop expired entries, returning how many were removed
    pub fn sweep_at(&mut self, now: Instant) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, entry| entry.expires_at > now);
        before - self.entries.len()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
