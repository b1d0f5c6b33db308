//! Stage and skip bookkeeping for the replay fold.

use crate::types::{ActionId, INIT_ACTION_ID};
use std::collections::BTreeSet;

/// Ordered sequence of staged action ids plus the set of skipped ids.
///
/// Skipping excludes an id from the replay fold without removing it from the
/// sequence, so positions stay addressable for toggling back. `sweep`
/// physically drops skipped ids and is the only operation that shortens the
/// sequence.
#[derive(Clone, Debug)]
pub struct StageIndex {
    staged: Vec<ActionId>,
    skipped: BTreeSet<ActionId>,
}

impl StageIndex {
    /// An index staging only the init action.
    pub fn seeded() -> Self {
        Self {
            staged: vec![INIT_ACTION_ID],
            skipped: BTreeSet::new(),
        }
    }

    pub fn from_parts(staged: Vec<ActionId>, skipped: impl IntoIterator<Item = ActionId>) -> Self {
        Self {
            staged,
            skipped: skipped.into_iter().collect(),
        }
    }

    /// Stage a freshly appended id at the end of the sequence.
    pub fn stage(&mut self, id: ActionId) {
        self.staged.push(id);
    }

    /// Flip skip membership. Returns true when the id is now skipped.
    pub fn toggle(&mut self, id: ActionId) -> bool {
        if self.skipped.remove(&id) {
            false
        } else {
            self.skipped.insert(id);
            true
        }
    }

    pub fn is_skipped(&self, id: ActionId) -> bool {
        self.skipped.contains(&id)
    }

    /// Position of an id in the staged sequence, if present.
    pub fn position_of(&self, id: ActionId) -> Option<usize> {
        self.staged.iter().position(|&staged| staged == id)
    }

    /// Drop all skipped ids from the sequence, preserving relative order of
    /// the rest, and clear the skip set. Returns the number of ids removed.
    pub fn sweep(&mut self) -> usize {
        let before = self.staged.len();
        let skipped = std::mem::take(&mut self.skipped);
        self.staged.retain(|id| !skipped.contains(id));
        before - self.staged.len()
    }

    /// Back to just the init action, nothing skipped.
    pub fn reset(&mut self) {
        self.staged.clear();
        self.staged.push(INIT_ACTION_ID);
        self.skipped.clear();
    }

    pub fn staged(&self) -> &[ActionId] {
        &self.staged
    }

    pub fn skipped_ids(&self) -> Vec<ActionId> {
        self.skipped.iter().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.staged.len()
    }

    pub fn is_empty(&self) -> bool {
        self.staged.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(raw: &[u64]) -> Vec<ActionId> {
        raw.iter().map(|&n| ActionId(n)).collect()
    }

    #[test]
    fn test_toggle_flips_membership_without_reordering() {
        let mut stage = StageIndex::seeded();
        for n in 1..=3 {
            stage.stage(ActionId(n));
        }

        assert!(stage.toggle(ActionId(2)));
        assert!(stage.is_skipped(ActionId(2)));
        assert_eq!(stage.staged(), ids(&[0, 1, 2, 3]).as_slice());

        assert!(!stage.toggle(ActionId(2)));
        assert!(!stage.is_skipped(ActionId(2)));
    }

    #[test]
    fn test_sweep_drops_skipped_keeps_order() {
        let mut stage = StageIndex::seeded();
        for n in 1..=4 {
            stage.stage(ActionId(n));
        }
        stage.toggle(ActionId(1));
        stage.toggle(ActionId(3));

        assert_eq!(stage.sweep(), 2);
        assert_eq!(stage.staged(), ids(&[0, 2, 4]).as_slice());
        assert!(stage.skipped_ids().is_empty());
    }

    #[test]
    fn test_position_of() {
        let mut stage = StageIndex::seeded();
        stage.stage(ActionId(5));
        stage.stage(ActionId(9));
        assert_eq!(stage.position_of(ActionId(9)), Some(2));
        assert_eq!(stage.position_of(ActionId(4)), None);
    }

    #[test]
    fn test_reset() {
        let mut stage = StageIndex::seeded();
        stage.stage(ActionId(1));
        stage.toggle(ActionId(1));
        stage.reset();
        assert_eq!(stage.staged(), ids(&[0]).as_slice());
        assert!(stage.skipped_ids().is_empty());
    }
}
