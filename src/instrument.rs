//! Attaching the time-travel engine to a store.

use crate::error::{Result, StoreError};
use crate::lifted::{Engine, LiftedStateSnapshot};
use crate::monitor::MonitorAction;
use crate::store::{Driver, Store, StoreShared};
use crate::types::ComputedState;
use serde_json::Value;
use std::sync::atomic::Ordering;
use std::sync::Arc;

/// Attach the lifted-state engine to a store.
///
/// The store's dispatch and reducer-replacement paths are rerouted through
/// the engine; the existing [`Store`] handle keeps serving the application
/// state, which from now on is the top of the computed-state cache.
///
/// The engine adopts the store's seed state as the computed init position,
/// so instrumented construction costs exactly one reducer call. Attaching
/// twice, or attaching after real actions have been dispatched, is refused.
pub fn instrument(store: &Store) -> Result<LiftedStore> {
    let shared = Arc::clone(&store.shared);
    let mut driver = shared.driver.lock();

    if shared.instrumented.load(Ordering::SeqCst) {
        return Err(StoreError::AlreadyInstrumented);
    }
    if shared.dispatched.load(Ordering::SeqCst) > 0 {
        return Err(StoreError::InvalidOperation(
            "cannot instrument a store that has already dispatched actions".to_string(),
        ));
    }

    match std::mem::take(&mut *driver) {
        Driver::Plain { reducer, state } => {
            *driver = Driver::Lifted(Engine::adopt(
                reducer,
                shared.initial_state.clone(),
                ComputedState::ok(state),
            ));
            shared.instrumented.store(true, Ordering::SeqCst);
        }
        lifted @ Driver::Lifted(_) => {
            *driver = lifted;
            return Err(StoreError::AlreadyInstrumented);
        }
    }
    drop(driver);

    Ok(LiftedStore { shared })
}

/// Handle onto the instrumented history: dispatches monitor actions and
/// exposes the lifted state for export.
#[derive(Clone)]
pub struct LiftedStore {
    pub(crate) shared: Arc<StoreShared>,
}

impl LiftedStore {
    /// Apply a time-travel operation and notify subscribers.
    pub fn dispatch(&self, action: MonitorAction) -> Result<()> {
        let state = {
            let mut driver = self.shared.driver.lock();
            match &mut *driver {
                Driver::Lifted(engine) => {
                    engine.apply(action)?;
                    engine.visible_state()
                }
                Driver::Plain { .. } => return Err(StoreError::NotInstrumented),
            }
        };
        self.shared.subscriptions.broadcast_state(state);
        Ok(())
    }

    /// Dispatch a raw JSON action addressed to the lifted store. Actions
    /// carrying an unrecognized `"type"` are accepted and do nothing: no
    /// state mutation, no reducer calls.
    pub fn dispatch_raw(&self, raw: Value) -> Result<()> {
        match MonitorAction::from_value(&raw)? {
            Some(action) => self.dispatch(action),
            None => Ok(()),
        }
    }

    /// The full lifted state, in exportable form.
    pub fn lifted_state(&self) -> Result<LiftedStateSnapshot> {
        let driver = self.shared.driver.lock();
        match &*driver {
            Driver::Lifted(engine) => Ok(engine.snapshot()),
            Driver::Plain { .. } => Err(StoreError::NotInstrumented),
        }
    }

    // Convenience constructors for the monitor vocabulary.

    pub fn reset(&self) -> Result<()> {
        self.dispatch(MonitorAction::Reset)
    }

    pub fn commit(&self) -> Result<()> {
        self.dispatch(MonitorAction::Commit)
    }

    pub fn rollback(&self) -> Result<()> {
        self.dispatch(MonitorAction::Rollback)
    }

    pub fn toggle_action(&self, id: u64) -> Result<()> {
        self.dispatch(MonitorAction::toggle_action(id))
    }

    pub fn sweep(&self) -> Result<()> {
        self.dispatch(MonitorAction::Sweep)
    }

    pub fn jump_to_state(&self, index: usize) -> Result<()> {
        self.dispatch(MonitorAction::jump_to_state(index))
    }

    pub fn jump_to_action(&self, id: u64) -> Result<()> {
        self.dispatch(MonitorAction::jump_to_action(id))
    }

    /// Replace the whole history with an exported snapshot; every position
    /// is recomputed under the current reducer with the replay flag forced.
    pub fn import_state(&self, snapshot: LiftedStateSnapshot) -> Result<()> {
        self.dispatch(MonitorAction::import_state(snapshot))
    }
}
