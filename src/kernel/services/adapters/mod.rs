//! Service adapters: OS/runtime specific implementations (IO/async).

pub mod file;
pub mod paths;
pub mod runtime;
pub mod settings;
pub mod storage;

pub use file::{read_document, suggested_file_name, with_language_extension, write_document};
pub use paths::{
    ensure_log_dir, ensure_session_dir, get_app_data_dir, get_log_dir, get_session_dir,
    get_settings_path,
};
pub use runtime::{AppMessage, AsyncRuntime, SharedDialog, SharedStorage};
pub use settings::{load_settings, load_settings_from, save_settings, save_settings_to, SettingsError};
pub use storage::{FileKeyValueStore, MemoryKeyValueStore};
