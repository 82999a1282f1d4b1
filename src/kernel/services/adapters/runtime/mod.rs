//! Async runtime adapter: executes IO effects and sends messages back to the host.

mod async_runtime;
mod message;

pub use async_runtime::{AsyncRuntime, SharedDialog, SharedStorage};
pub use message::AppMessage;

#[cfg(test)]
#[path = "../../../../../tests/unit/kernel/services/adapters/runtime.rs"]
mod tests;
