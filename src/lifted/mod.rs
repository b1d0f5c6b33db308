//! The lifted-state engine: history bookkeeping and selective recompute.

mod engine;
mod state;

pub(crate) use engine::Engine;
pub use engine::INTERRUPTED_BY_ERROR;
pub use state::{LiftedState, LiftedStateSnapshot};
