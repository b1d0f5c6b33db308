//! Subscriptions for store-change notifications.

mod manager;
mod types;

pub use manager::SubscriptionManager;
pub use types::{DropReason, StoreEvent, SubscriptionHandle, SubscriptionId};
