//! # Rewind
//!
//! Time-travel instrumentation for stores driven by a pure reducer
//! `(state, action) -> state`.
//!
//! ## Core Concepts
//!
//! - **Store**: deterministic state container with dispatch and subscribe
//! - **Lifted state**: the recorded history — action log, stage/skip index,
//!   computed-state cache, position pointer
//! - **Monitor actions**: reset, commit, rollback, toggle, sweep, jump,
//!   import — each a minimal invalidation over the cache
//! - **Replay flag**: reducers can tell a live dispatch from a replay
//!
//! ## Example
//!
//! ```ignore
//! use rewind::{instrument, Store};
//! use serde_json::json;
//!
//! let store = Store::new(Box::new(|state, action, _replaying| {
//!     let n = state.as_ref().and_then(|v| v.as_i64()).unwrap_or(0);
//!     Ok(Some(match action["type"].as_str() {
//!         Some("INCREMENT") => json!(n + 1),
//!         _ => json!(n),
//!     }))
//! }))?;
//! let devtools = instrument(&store)?;
//!
//! store.dispatch(json!({ "type": "INCREMENT" }))?;
//! devtools.commit()?;
//! devtools.rollback()?;
//! ```

pub mod error;
pub mod instrument;
pub mod lifted;
pub mod log;
pub mod monitor;
pub mod stage;
pub mod store;
pub mod subscriptions;
pub mod types;

// Re-exports
pub use error::{ReducerError, Result, StoreError};
pub use instrument::{instrument, LiftedStore};
pub use lifted::{LiftedState, LiftedStateSnapshot, INTERRUPTED_BY_ERROR};
pub use log::ActionLog;
pub use monitor::MonitorAction;
pub use stage::StageIndex;
pub use store::Store;
pub use subscriptions::{
    DropReason, StoreEvent, SubscriptionHandle, SubscriptionId, SubscriptionManager,
};
pub use types::{
    init_action, validate_action, ActionId, ComputedState, Reducer, INIT_ACTION_ID,
    INIT_ACTION_TYPE,
};
