//! Differencing: the engine, its change notifications and subscribers

mod change;
mod engine;
mod observer;

pub use change::{Change, ChangeKind, ChangeSet};
pub use engine::{DiffEngine, UpdateStats};
pub use observer::{SubscriptionId, Subscribers};
