//! Lifted state: the engine's full bookkeeping structure, as distinct from
//! the plain application state it derives.

use crate::log::ActionLog;
use crate::stage::StageIndex;
use crate::types::{ActionId, ComputedState};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// History bookkeeping: committed baseline, action log, stage/skip index,
/// computed-state cache, and the current position pointer.
///
/// Cache invariant: `computed_states[i]` holds the state produced by
/// replaying `committed_state` through the non-skipped prefix
/// `staged[0..=i]` under the current reducer. Transitions that break the
/// invariant return the smallest invalidated position so the engine can
/// recompute only the affected suffix.
#[derive(Debug)]
pub struct LiftedState {
    pub committed_state: Option<Value>,
    pub log: ActionLog,
    pub stage: StageIndex,
    pub computed_states: Vec<ComputedState>,
    pub current_state_index: usize,
}

impl LiftedState {
    /// Fresh history around an already-computed init slot.
    pub fn seeded(committed_state: Option<Value>, init_slot: ComputedState) -> Self {
        Self {
            committed_state,
            log: ActionLog::seeded(),
            stage: StageIndex::seeded(),
            computed_states: vec![init_slot],
            current_state_index: 0,
        }
    }

    /// Append and stage a new application action. Returns the invalidation
    /// position (always the new tail).
    pub fn perform(&mut self, action: Value) -> usize {
        // The pointer follows the tip only if it was already there; after a
        // jump backwards, new appends leave the visible state in place. The
        // sequence can be empty after sweeping a skipped init entry.
        if self.current_state_index + 1 == self.stage.len() {
            self.current_state_index += 1;
        }
        let id = self.log.append(action);
        self.stage.stage(id);
        self.stage.len() - 1
    }

    /// Clear history back to the given baseline (the original one for
    /// reset, the current computed state for commit, the unchanged one for
    /// rollback). Returns the invalidation position.
    pub fn truncate_to_baseline(&mut self, committed_state: Option<Value>) -> usize {
        self.committed_state = committed_state;
        self.log.reset();
        self.stage.reset();
        self.current_state_index = 0;
        0
    }

    /// Flip skip membership of an id. Returns its staged position as the
    /// invalidation point, or `None` if the id is not staged at all.
    pub fn toggle(&mut self, id: ActionId) -> Option<usize> {
        let position = self.stage.position_of(id)?;
        self.stage.toggle(id);
        Some(position)
    }

    /// Physically drop skipped ids and clamp the pointer to the shortened
    /// sequence, which is empty when the init entry itself was skipped.
    /// Returns the invalidation position (conservatively 0).
    pub fn sweep(&mut self) -> usize {
        self.stage.sweep();
        self.current_state_index = self
            .current_state_index
            .min(self.stage.len().saturating_sub(1));
        0
    }

    /// Move the pointer to a staged position. Out-of-range indices are
    /// clamped rather than replayed; the cache already covers every staged
    /// position.
    pub fn jump_to_state(&mut self, index: usize) {
        self.current_state_index = index.min(self.stage.len().saturating_sub(1));
    }

    /// Move the pointer to the position of a staged action id, if present.
    pub fn jump_to_action(&mut self, id: ActionId) {
        if let Some(position) = self.stage.position_of(id) {
            self.current_state_index = position;
        }
    }

    /// Serializable snapshot of the full history.
    pub fn snapshot(&self) -> LiftedStateSnapshot {
        LiftedStateSnapshot {
            actions_by_id: self.log.entries().clone(),
            next_action_id: self.log.next_id(),
            staged_action_ids: self.stage.staged().to_vec(),
            skipped_action_ids: self.stage.skipped_ids(),
            committed_state: self.committed_state.clone(),
            current_state_index: self.current_state_index,
            computed_states: self.computed_states.clone(),
        }
    }

    /// Adopt an imported snapshot wholesale. The computed cache is carried
    /// over only as a placeholder; the engine recomputes every position
    /// under its own reducer immediately after.
    pub fn from_snapshot(snapshot: LiftedStateSnapshot) -> Self {
        Self {
            committed_state: snapshot.committed_state,
            log: ActionLog::from_parts(snapshot.actions_by_id, snapshot.next_action_id),
            stage: StageIndex::from_parts(
                snapshot.staged_action_ids,
                snapshot.skipped_action_ids,
            ),
            computed_states: snapshot.computed_states,
            current_state_index: snapshot.current_state_index,
        }
    }
}

/// Portable, serializable form of [`LiftedState`].
///
/// Field names follow the conventional camelCase wire shape so exported
/// histories can be moved between hosts.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LiftedStateSnapshot {
    pub actions_by_id: BTreeMap<ActionId, Value>,
    pub next_action_id: u64,
    pub staged_action_ids: Vec<ActionId>,
    pub skipped_action_ids: Vec<ActionId>,
    pub committed_state: Option<Value>,
    pub current_state_index: usize,
    pub computed_states: Vec<ComputedState>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn seeded() -> LiftedState {
        LiftedState::seeded(None, ComputedState::ok(Some(json!(0))))
    }

    #[test]
    fn test_perform_advances_pointer_only_at_tip() {
        let mut lifted = seeded();
        assert_eq!(lifted.perform(json!({ "type": "A" })), 1);
        assert_eq!(lifted.current_state_index, 1);

        lifted.jump_to_state(0);
        assert_eq!(lifted.perform(json!({ "type": "B" })), 2);
        assert_eq!(lifted.current_state_index, 0);
    }

    #[test]
    fn test_truncate_to_baseline_clears_history() {
        let mut lifted = seeded();
        lifted.perform(json!({ "type": "A" }));
        lifted.toggle(ActionId(1));

        let at = lifted.truncate_to_baseline(Some(json!(5)));
        assert_eq!(at, 0);
        assert_eq!(lifted.committed_state, Some(json!(5)));
        assert_eq!(lifted.stage.staged(), &[ActionId(0)]);
        assert_eq!(lifted.log.len(), 1);
        assert_eq!(lifted.current_state_index, 0);
    }

    #[test]
    fn test_toggle_unstaged_id_is_noop() {
        let mut lifted = seeded();
        assert_eq!(lifted.toggle(ActionId(9)), None);
    }

    #[test]
    fn test_sweep_can_empty_the_sequence() {
        let mut lifted = seeded();
        lifted.toggle(ActionId(0));
        assert_eq!(lifted.sweep(), 0);
        assert!(lifted.stage.is_empty());
        assert_eq!(lifted.current_state_index, 0);

        // History keeps working with the init entry gone.
        assert_eq!(lifted.perform(json!({ "type": "A" })), 0);
        assert_eq!(lifted.current_state_index, 0);
        assert_eq!(lifted.stage.staged(), &[ActionId(1)]);
    }

    #[test]
    fn test_jump_clamps_out_of_range_index() {
        let mut lifted = seeded();
        lifted.perform(json!({ "type": "A" }));
        lifted.jump_to_state(10);
        assert_eq!(lifted.current_state_index, 1);
    }

    #[test]
    fn test_snapshot_round_trips_through_serde() {
        let mut lifted = seeded();
        lifted.perform(json!({ "type": "A" }));
        lifted.computed_states.push(ComputedState::ok(Some(json!(1))));
        lifted.toggle(ActionId(1));

        let snapshot = lifted.snapshot();
        let encoded = serde_json::to_string(&snapshot).unwrap();
        let decoded: LiftedStateSnapshot = serde_json::from_str(&encoded).unwrap();
        assert_eq!(decoded, snapshot);

        let adopted = LiftedState::from_snapshot(decoded);
        assert_eq!(adopted.snapshot(), snapshot);
    }
}
