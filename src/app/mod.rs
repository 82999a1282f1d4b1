//! Application host: owns the store and executes its effects.

mod host;

pub use host::{App, AppPorts, MAX_MESSAGES_PER_PUMP};
