//! Monitor-action vocabulary recognized by the lifted store.

use crate::error::{Result, StoreError};
use crate::lifted::LiftedStateSnapshot;
use crate::types::{validate_action, ActionId};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Time-travel operations addressed to the lifted store.
///
/// On the wire these are JSON objects tagged by `"type"`; any other action
/// shape is opaque application input.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MonitorAction {
    PerformAction { action: Value },
    Reset,
    Commit,
    Rollback,
    ToggleAction { id: ActionId },
    Sweep,
    JumpToState {
        index: usize,
    },
    JumpToAction {
        #[serde(rename = "actionId")]
        action_id: ActionId,
    },
    ImportState {
        #[serde(rename = "nextLiftedState")]
        next_lifted_state: LiftedStateSnapshot,
    },
}

/// Tags of the recognized monitor actions. Anything else dispatched to the
/// lifted store is accepted but mutates nothing.
const MONITOR_TYPES: [&str; 9] = [
    "PERFORM_ACTION",
    "RESET",
    "COMMIT",
    "ROLLBACK",
    "TOGGLE_ACTION",
    "SWEEP",
    "JUMP_TO_STATE",
    "JUMP_TO_ACTION",
    "IMPORT_STATE",
];

impl MonitorAction {
    pub fn perform(action: Value) -> Self {
        MonitorAction::PerformAction { action }
    }

    pub fn toggle_action(id: u64) -> Self {
        MonitorAction::ToggleAction { id: ActionId(id) }
    }

    pub fn jump_to_state(index: usize) -> Self {
        MonitorAction::JumpToState { index }
    }

    pub fn jump_to_action(id: u64) -> Self {
        MonitorAction::JumpToAction {
            action_id: ActionId(id),
        }
    }

    pub fn import_state(snapshot: LiftedStateSnapshot) -> Self {
        MonitorAction::ImportState {
            next_lifted_state: snapshot,
        }
    }

    /// Parse a raw dispatched value. `Ok(None)` means the action carries a
    /// defined but unrecognized type and must be treated as a no-op;
    /// a missing or null type is rejected outright.
    pub fn from_value(raw: &Value) -> Result<Option<Self>> {
        validate_action(raw)?;
        match raw.get("type").and_then(Value::as_str) {
            Some(kind) if MONITOR_TYPES.contains(&kind) => {
                let action = serde_json::from_value(raw.clone())
                    .map_err(|e| StoreError::Deserialization(e.to_string()))?;
                Ok(Some(action))
            }
            _ => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_wire_tags() {
        assert_eq!(
            serde_json::to_value(MonitorAction::Commit).unwrap(),
            json!({ "type": "COMMIT" })
        );
        assert_eq!(
            serde_json::to_value(MonitorAction::toggle_action(3)).unwrap(),
            json!({ "type": "TOGGLE_ACTION", "id": 3 })
        );
        assert_eq!(
            serde_json::to_value(MonitorAction::perform(json!({ "type": "INCREMENT" }))).unwrap(),
            json!({ "type": "PERFORM_ACTION", "action": { "type": "INCREMENT" } })
        );
    }

    #[test]
    fn test_from_value_recognizes_monitor_types() {
        let parsed = MonitorAction::from_value(&json!({ "type": "JUMP_TO_STATE", "index": 2 }))
            .unwrap()
            .unwrap();
        assert_eq!(parsed, MonitorAction::jump_to_state(2));
    }

    #[test]
    fn test_from_value_passes_unknown_types_through() {
        assert_eq!(
            MonitorAction::from_value(&json!({ "type": "lol" })).unwrap(),
            None
        );
    }

    #[test]
    fn test_from_value_rejects_undefined_type() {
        assert!(matches!(
            MonitorAction::from_value(&json!({ "type": null })),
            Err(StoreError::UndefinedActionType)
        ));
    }

    #[test]
    fn test_from_value_rejects_malformed_monitor_action() {
        assert!(matches!(
            MonitorAction::from_value(&json!({ "type": "TOGGLE_ACTION" })),
            Err(StoreError::Deserialization(_))
        ));
    }
}
