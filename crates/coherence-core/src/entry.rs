use serde::{Deserialize, Serialize};

/// One journal entry.
///
/// Entries are immutable once written. `id` is unique and strictly
/// increasing across a journal (it doubles as the creation time in epoch ms),
/// so a snapshot sorted by `id` is oldest-first.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    pub id: i64,
    pub text: String,
    /// Creation time, epoch milliseconds.
    pub timestamp: i64,
}

impl Entry {
    pub fn new(id: i64, text: impl Into<String>, timestamp: i64) -> Self {
        Self {
            id,
            text: text.into(),
            timestamp,
        }
    }
}
