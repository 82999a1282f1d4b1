//! klartext - structured text editor core
//!
//! Module layout:
//! - kernel: headless state machine (tabs, conversion, outline, editor bridge)
//! - kernel::services: ports and their OS/async adapters
//! - app: host that runs kernel effects
//! - logging: file logging setup

pub mod app;
pub mod kernel;
pub mod logging;

pub use app::{App, AppPorts};
pub use kernel::{Action, AppState, DocumentLanguage, Effect, Store};
