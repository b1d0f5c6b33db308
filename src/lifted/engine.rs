//! Recompute engine: replays the staged sequence against the reducer,
//! touching only the invalidated suffix of the computed-state cache.

use crate::error::Result;
use crate::lifted::{LiftedState, LiftedStateSnapshot};
use crate::monitor::MonitorAction;
use crate::types::{init_action, validate_action, ComputedState, Reducer};
use serde_json::Value;

/// Error recorded at every position downstream of a reducer failure. The
/// reducer is not invoked for these positions; the last good value is
/// carried forward so the visible state stays defined.
pub const INTERRUPTED_BY_ERROR: &str = "Interrupted by an error up the chain";

/// Owns the reducer and the lifted state, and keeps the computed-state
/// cache consistent under every time-travel operation.
pub(crate) struct Engine {
    reducer: Reducer,
    /// Baseline restored by a reset; fixed at construction.
    initial_state: Option<Value>,
    lifted: LiftedState,
}

impl Engine {
    /// Build around an already-computed init slot so instrumented
    /// construction costs exactly one reducer call (the plain store's seed).
    pub fn adopt(reducer: Reducer, initial_state: Option<Value>, init_slot: ComputedState) -> Self {
        Self {
            reducer,
            initial_state: initial_state.clone(),
            lifted: LiftedState::seeded(initial_state, init_slot),
        }
    }

    /// Apply a time-travel operation: mutate the lifted state, then
    /// recompute from the smallest invalidated position.
    pub fn apply(&mut self, action: MonitorAction) -> Result<()> {
        match action {
            MonitorAction::PerformAction { action } => {
                validate_action(&action)?;
                let at = self.lifted.perform(action);
                self.recompute(at, false);
            }
            MonitorAction::Reset => {
                let baseline = self.initial_state.clone();
                self.lifted.truncate_to_baseline(baseline);
                self.recompute(0, true);
            }
            MonitorAction::Commit => {
                let baseline = self
                    .lifted
                    .computed_states
                    .get(self.lifted.current_state_index)
                    .and_then(|slot| slot.state.clone());
                self.lifted.truncate_to_baseline(baseline);
                self.recompute(0, true);
            }
            MonitorAction::Rollback => {
                let baseline = self.lifted.committed_state.clone();
                self.lifted.truncate_to_baseline(baseline);
                self.recompute(0, true);
            }
            MonitorAction::ToggleAction { id } => {
                if let Some(at) = self.lifted.toggle(id) {
                    self.recompute(at, true);
                }
            }
            MonitorAction::Sweep => {
                let at = self.lifted.sweep();
                self.recompute(at, true);
            }
            MonitorAction::JumpToState { index } => {
                // Cache already covers every staged position; no replay.
                self.lifted.jump_to_state(index);
            }
            MonitorAction::JumpToAction { action_id } => {
                self.lifted.jump_to_action(action_id);
            }
            MonitorAction::ImportState { next_lifted_state } => {
                self.lifted = LiftedState::from_snapshot(next_lifted_state);
                self.recompute(0, true);
            }
        }
        Ok(())
    }

    /// Swap the reducer and re-derive the entire history under it.
    pub fn replace_reducer(&mut self, reducer: Reducer) {
        self.reducer = reducer;
        self.recompute(0, true);
    }

    /// Recompute cache slots from `from` to the end of the staged sequence.
    /// Positions below `from` are never touched.
    fn recompute(&mut self, from: usize, replaying: bool) {
        let lifted = &mut self.lifted;
        let from = from.min(lifted.computed_states.len());
        lifted.computed_states.truncate(from);

        for position in from..lifted.stage.len() {
            let id = lifted.stage.staged()[position];
            let (prev_state, prev_error) = if position == 0 {
                (lifted.committed_state.clone(), None)
            } else {
                let prev = &lifted.computed_states[position - 1];
                (prev.state.clone(), prev.error.clone())
            };

            let slot = if lifted.stage.is_skipped(id) {
                // Skipped: state passes through opaquely, errors included.
                ComputedState {
                    state: prev_state,
                    error: prev_error,
                }
            } else if prev_error.is_some() {
                ComputedState {
                    state: prev_state,
                    error: Some(INTERRUPTED_BY_ERROR.to_string()),
                }
            } else {
                let action = lifted.log.get(id).cloned().unwrap_or_else(init_action);
                match (self.reducer)(prev_state.clone(), &action, replaying) {
                    Ok(state) => ComputedState { state, error: None },
                    Err(err) => {
                        tracing::error!(action_id = %id, error = %err, "reducer failed during replay");
                        ComputedState {
                            state: prev_state,
                            error: Some(err.to_string()),
                        }
                    }
                }
            };
            lifted.computed_states.push(slot);
        }

        if lifted.current_state_index >= lifted.computed_states.len() {
            lifted.current_state_index = lifted.computed_states.len().saturating_sub(1);
        }
    }

    /// Externally visible application state: the cached value at the
    /// current position, or the nearest earlier defined value, falling back
    /// to the committed baseline.
    pub fn visible_state(&self) -> Option<Value> {
        let lifted = &self.lifted;
        if lifted.computed_states.is_empty() {
            return lifted.committed_state.clone();
        }
        let top = lifted
            .current_state_index
            .min(lifted.computed_states.len() - 1);
        for slot in lifted.computed_states[..=top].iter().rev() {
            if slot.state.is_some() {
                return slot.state.clone();
            }
        }
        lifted.committed_state.clone()
    }

    pub fn snapshot(&self) -> LiftedStateSnapshot {
        self.lifted.snapshot()
    }

    #[cfg(test)]
    pub fn lifted(&self) -> &LiftedState {
        &self.lifted
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ReducerError;
    use crate::types::ActionId;
    use serde_json::json;

    fn counter() -> Reducer {
        Box::new(|state, action, _replaying| {
            let n = state.as_ref().and_then(Value::as_i64).unwrap_or(0);
            let next = match action["type"].as_str() {
                Some("INCREMENT") => n + 1,
                Some("DECREMENT") => n - 1,
                _ => n,
            };
            Ok(Some(json!(next)))
        })
    }

    fn engine_with(reducer: Reducer) -> Engine {
        // Mirror construction: the seed slot is reduce(None, @@INIT).
        Engine::adopt(reducer, None, ComputedState::ok(Some(json!(0))))
    }

    fn dispatch(engine: &mut Engine, kind: &str) {
        engine
            .apply(MonitorAction::perform(json!({ "type": kind })))
            .unwrap();
    }

    #[test]
    fn test_forward_dispatch_extends_cache_by_one() {
        let mut engine = engine_with(counter());
        dispatch(&mut engine, "INCREMENT");
        dispatch(&mut engine, "INCREMENT");
        assert_eq!(engine.visible_state(), Some(json!(2)));
        assert_eq!(engine.lifted().computed_states.len(), 3);
    }

    #[test]
    fn test_toggle_recomputes_suffix_only() {
        let mut engine = engine_with(counter());
        dispatch(&mut engine, "INCREMENT");
        dispatch(&mut engine, "DECREMENT");
        dispatch(&mut engine, "INCREMENT");
        assert_eq!(engine.visible_state(), Some(json!(1)));

        engine
            .apply(MonitorAction::ToggleAction { id: ActionId(2) })
            .unwrap();
        assert_eq!(engine.visible_state(), Some(json!(2)));

        engine
            .apply(MonitorAction::ToggleAction { id: ActionId(2) })
            .unwrap();
        assert_eq!(engine.visible_state(), Some(json!(1)));
    }

    #[test]
    fn test_reducer_failure_interrupts_downstream() {
        let mut engine = engine_with(Box::new(|state, action, _| {
            let n = state.as_ref().and_then(Value::as_i64).unwrap_or(0);
            match action["type"].as_str() {
                Some("INCREMENT") => Ok(Some(json!(n + 1))),
                Some("DECREMENT") => Err(ReducerError::new("mistake is not defined")),
                _ => Ok(Some(json!(n))),
            }
        }));
        dispatch(&mut engine, "INCREMENT");
        dispatch(&mut engine, "DECREMENT");
        dispatch(&mut engine, "INCREMENT");

        let computed = &engine.lifted().computed_states;
        assert_eq!(computed[2].error.as_deref(), Some("mistake is not defined"));
        assert_eq!(computed[2].state, Some(json!(1)));
        assert_eq!(computed[3].error.as_deref(), Some(INTERRUPTED_BY_ERROR));
        assert_eq!(engine.visible_state(), Some(json!(1)));

        // Toggling off the offending action clears the whole suffix.
        engine
            .apply(MonitorAction::ToggleAction { id: ActionId(2) })
            .unwrap();
        assert_eq!(engine.visible_state(), Some(json!(2)));
        assert!(engine.lifted().computed_states[3].error.is_none());
    }

    #[test]
    fn test_undefined_state_passes_through_visibly() {
        let mut engine = engine_with(Box::new(|state, action, _| {
            let n = state.as_ref().and_then(Value::as_i64).unwrap_or(0);
            match action["type"].as_str() {
                Some("INCREMENT") => Ok(Some(json!(n + 1))),
                Some("SET_UNDEFINED") => Ok(None),
                _ => Ok(Some(json!(n))),
            }
        }));
        dispatch(&mut engine, "INCREMENT");
        dispatch(&mut engine, "SET_UNDEFINED");
        assert_eq!(engine.visible_state(), Some(json!(1)));
    }

    #[test]
    fn test_commit_re_seeds_history_from_current_state() {
        let mut engine = engine_with(counter());
        dispatch(&mut engine, "INCREMENT");
        dispatch(&mut engine, "INCREMENT");

        engine.apply(MonitorAction::Commit).unwrap();
        assert_eq!(engine.visible_state(), Some(json!(2)));
        let snapshot = engine.snapshot();
        assert_eq!(snapshot.committed_state, Some(json!(2)));
        assert_eq!(snapshot.staged_action_ids.len(), 1);
    }
}
