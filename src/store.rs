//! The deterministic state container and its dispatch surface.

use crate::error::Result;
use crate::lifted::Engine;
use crate::monitor::MonitorAction;
use crate::subscriptions::{SubscriptionHandle, SubscriptionId, SubscriptionManager};
use crate::types::{init_action, validate_action, Reducer};
use parking_lot::Mutex;
use serde_json::Value;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

/// How dispatches are executed: directly against the reducer, or routed
/// through the lifted-state engine once instrumentation is attached.
pub(crate) enum Driver {
    Plain {
        reducer: Reducer,
        state: Option<Value>,
    },
    Lifted(Engine),
}

impl Default for Driver {
    fn default() -> Self {
        Driver::Plain {
            reducer: Box::new(|state, _action, _replaying| Ok(state)),
            state: None,
        }
    }
}

/// State shared between every handle onto one store.
pub(crate) struct StoreShared {
    pub(crate) driver: Mutex<Driver>,
    pub(crate) subscriptions: SubscriptionManager,
    /// Marker set when instrumentation attaches; refuses a second attach.
    pub(crate) instrumented: AtomicBool,
    /// Application dispatches executed in plain mode.
    pub(crate) dispatched: AtomicU64,
    /// Baseline the store was created with; restored by a reset.
    pub(crate) initial_state: Option<Value>,
}

/// A store driven by a pure reducer `(state, action) -> state`.
///
/// Handles are cheap clones over shared internals, so the application-facing
/// handle keeps working unchanged after [`crate::instrument`] swaps the
/// dispatch path to the lifted engine.
#[derive(Clone)]
pub struct Store {
    pub(crate) shared: Arc<StoreShared>,
}

impl Store {
    /// Create a store, seeding it with one fold of the init action.
    pub fn new(reducer: Reducer) -> Result<Self> {
        Self::with_state(reducer, None)
    }

    /// Create a store around a preloaded baseline state.
    pub fn with_state(mut reducer: Reducer, initial_state: Option<Value>) -> Result<Self> {
        let seed = reducer(initial_state.clone(), &init_action(), false)?;
        Ok(Self {
            shared: Arc::new(StoreShared {
                driver: Mutex::new(Driver::Plain {
                    reducer,
                    state: seed,
                }),
                subscriptions: SubscriptionManager::new(),
                instrumented: AtomicBool::new(false),
                dispatched: AtomicU64::new(0),
                initial_state,
            }),
        })
    }

    /// Dispatch an application action. Fails fast, before the action is
    /// recorded anywhere, if its `"type"` field is missing or null.
    pub fn dispatch(&self, action: Value) -> Result<()> {
        validate_action(&action)?;
        let state = {
            let mut driver = self.shared.driver.lock();
            match &mut *driver {
                Driver::Plain { reducer, state } => {
                    let next = reducer(state.clone(), &action, false)?;
                    *state = next;
                    self.shared.dispatched.fetch_add(1, Ordering::SeqCst);
                    state.clone()
                }
                Driver::Lifted(engine) => {
                    engine.apply(MonitorAction::perform(action))?;
                    engine.visible_state()
                }
            }
        };
        self.shared.subscriptions.broadcast_state(state);
        Ok(())
    }

    /// The externally visible application state.
    pub fn get_state(&self) -> Option<Value> {
        let driver = self.shared.driver.lock();
        match &*driver {
            Driver::Plain { state, .. } => state.clone(),
            Driver::Lifted(engine) => engine.visible_state(),
        }
    }

    /// Swap the reducer. Under instrumentation the entire history is
    /// re-derived under the new reducer; a plain store keeps its state.
    pub fn replace_reducer(&self, next: Reducer) {
        let state = {
            let mut driver = self.shared.driver.lock();
            match &mut *driver {
                Driver::Plain { reducer, state } => {
                    *reducer = next;
                    state.clone()
                }
                Driver::Lifted(engine) => {
                    engine.replace_reducer(next);
                    engine.visible_state()
                }
            }
        };
        self.shared.subscriptions.broadcast_state(state);
    }

    /// Subscribe to state-change events.
    pub fn subscribe(&self) -> SubscriptionHandle {
        self.shared.subscriptions.subscribe()
    }

    pub fn subscribe_with_buffer(&self, buffer_size: usize) -> SubscriptionHandle {
        self.shared.subscriptions.subscribe_with_buffer(buffer_size)
    }

    pub fn unsubscribe(&self, id: SubscriptionId) {
        self.shared.subscriptions.unsubscribe(id);
    }

    /// Whether the time-travel engine is attached.
    pub fn is_instrumented(&self) -> bool {
        self.shared.instrumented.load(Ordering::SeqCst)
    }
}
