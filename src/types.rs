//! Core types for the instrumented store.

use crate::error::{ReducerError, Result, StoreError};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::fmt;

/// Unique identifier for a logged action.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ActionId(pub u64);

impl fmt::Debug for ActionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ActionId({})", self.0)
    }
}

impl fmt::Display for ActionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Id reserved for the init action seeded at store construction.
pub const INIT_ACTION_ID: ActionId = ActionId(0);

/// Discriminant of the init action.
pub const INIT_ACTION_TYPE: &str = "@@INIT";

/// The action dispatched once at construction and replayed as the first
/// staged position of every history.
pub fn init_action() -> Value {
    json!({ "type": INIT_ACTION_TYPE })
}

/// Check that a value is a well-formed action: a JSON object whose `"type"`
/// field is present and not null. Rejected actions never reach the log.
pub fn validate_action(action: &Value) -> Result<()> {
    match action.get("type") {
        Some(kind) if !kind.is_null() => Ok(()),
        _ => Err(StoreError::UndefinedActionType),
    }
}

/// A pure fold step over application state.
///
/// `state` is the previous application state (`None` before the first fold
/// and whenever a reducer legitimately produced no value), `action` is the
/// stored action, and `replaying` distinguishes a live forward dispatch
/// (`false`) from an invocation performed during a recompute sweep (`true`).
pub type Reducer = Box<
    dyn FnMut(Option<Value>, &Value, bool) -> std::result::Result<Option<Value>, ReducerError>
        + Send,
>;

/// One slot of the computed-state cache, parallel to the staged sequence.
///
/// `state` is the application state after replaying the staged prefix up to
/// this position; `error` records a reducer failure at this position or the
/// fixed interrupted marker for positions downstream of one.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComputedState {
    pub state: Option<Value>,
    pub error: Option<String>,
}

impl ComputedState {
    pub fn ok(state: Option<Value>) -> Self {
        Self { state, error: None }
    }
}
