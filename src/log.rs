//! Append-only action log.

use crate::types::{init_action, ActionId, INIT_ACTION_ID};
use serde_json::Value;
use std::collections::BTreeMap;

/// Append-only store of `(id, action)` pairs with a monotonic id counter.
///
/// Entries are never mutated in place; they are appended, cleared back to the
/// init entry, or wholesale replaced during an import.
#[derive(Clone, Debug)]
pub struct ActionLog {
    entries: BTreeMap<ActionId, Value>,
    next_id: u64,
}

impl ActionLog {
    /// A log holding only the init action at id 0.
    pub fn seeded() -> Self {
        let mut entries = BTreeMap::new();
        entries.insert(INIT_ACTION_ID, init_action());
        Self { entries, next_id: 1 }
    }

    /// Adopt imported entries. The id counter resumes after the highest
    /// imported id so later appends can never collide.
    pub fn from_parts(entries: BTreeMap<ActionId, Value>, next_id: u64) -> Self {
        let high_water = entries.keys().next_back().map(|id| id.0 + 1).unwrap_or(0);
        Self {
            entries,
            next_id: next_id.max(high_water),
        }
    }

    /// Append an action, assigning the next monotonic id.
    pub fn append(&mut self, action: Value) -> ActionId {
        let id = ActionId(self.next_id);
        self.next_id += 1;
        self.entries.insert(id, action);
        id
    }

    pub fn get(&self, id: ActionId) -> Option<&Value> {
        self.entries.get(&id)
    }

    /// Discard everything but the init entry and restart the counter.
    pub fn reset(&mut self) {
        self.entries.clear();
        self.entries.insert(INIT_ACTION_ID, init_action());
        self.next_id = 1;
    }

    pub fn entries(&self) -> &BTreeMap<ActionId, Value> {
        &self.entries
    }

    pub fn next_id(&self) -> u64 {
        self.next_id
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
