use std::path::PathBuf;

use crate::kernel::action::Action;
use crate::kernel::services::ports::FileError;
use crate::kernel::state::TabId;

/// Completion of background IO, drained by the control thread.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppMessage {
    FileOpened {
        path: PathBuf,
        content: String,
    },
    FileSaved {
        tab: TabId,
        path: PathBuf,
        revision: u64,
    },
    FileOpFailed(FileError),
}

impl From<AppMessage> for Action {
    fn from(message: AppMessage) -> Self {
        match message {
            AppMessage::FileOpened { path, content } => Action::FileOpened { path, content },
            AppMessage::FileSaved {
                tab,
                path,
                revision,
            } => Action::FileSaved {
                tab,
                path,
                revision,
            },
            AppMessage::FileOpFailed(error) => Action::FileOpFailed(error),
        }
    }
}
