//! Headless application core (state/action/effect).

pub mod action;
pub mod bridge;
pub mod convert;
pub mod effect;
pub mod language;
pub mod outline;
pub mod services;
pub mod session;
pub mod state;
pub mod store;

pub use action::Action;
pub use bridge::{EditorBridge, Readiness, SurfaceCommand, SurfaceEvent, SurfaceOperation};
pub use convert::ConversionError;
pub use effect::Effect;
pub use language::DocumentLanguage;
pub use outline::OutlineNode;
pub use state::{AppState, Tab, TabId};
pub use store::{DispatchResult, Store};
