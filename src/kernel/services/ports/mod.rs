//! Service ports: traits + data contracts.

pub mod file;
pub mod settings;
pub mod storage;
pub mod surface;

pub use file::{FileDialog, FileError, OpenedDocument, Result as FileResult};
pub use settings::{Favorites, FormatKind, Settings, UiLanguage};
pub use storage::{KeyValueStore, Result as StorageResult, StorageError};
pub use surface::{NullSurface, SurfaceSink};
