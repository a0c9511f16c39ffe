//! Use-case configuration
//!
//! Options are a loosely-typed key/value bundle underneath, with typed
//! accessors at the use case's boundary and an in-memory store providing
//! lock-free snapshots and change notifications.

pub mod options;
pub mod store;

pub use options::{AspectRatio, OptionBundle, OptionKey, OptionValue};
pub use store::{ConfigChange, ConfigStore};
