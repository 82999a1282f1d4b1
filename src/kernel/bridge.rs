//! Editor bridge: keeps the live text surface in step with the store.
//!
//! The surface may finish loading long after the store started mutating. Until
//! it signals readiness, every content-affecting update collapses into a single
//! pending full initialization of the latest state.
//!
//! Every `Init` carries an epoch that the surface echoes on its content
//! reports. A report from an older epoch describes a tab that is no longer
//! shown and is dropped.

use serde::{Deserialize, Serialize};

use crate::kernel::convert;
use crate::kernel::language::DocumentLanguage;
use crate::kernel::state::TabId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SurfaceOperation {
    JsonToYaml,
    YamlToJson,
    FormatYaml,
    MinifyYaml,
}

impl SurfaceOperation {
    pub fn name(self) -> &'static str {
        match self {
            Self::JsonToYaml => "jsonToYaml",
            Self::YamlToJson => "yamlToJson",
            Self::FormatYaml => "formatYaml",
            Self::MinifyYaml => "minifyYaml",
        }
    }

    /// Language of the text this operation produces.
    pub fn output_language(self) -> DocumentLanguage {
        match self {
            Self::YamlToJson => DocumentLanguage::Json,
            Self::JsonToYaml | Self::FormatYaml | Self::MinifyYaml => DocumentLanguage::Yaml,
        }
    }

    pub fn run_native(self, text: &str) -> convert::Result<String> {
        match self {
            Self::JsonToYaml => convert::json_to_yaml(text),
            Self::YamlToJson => convert::yaml_to_json(text),
            Self::FormatYaml => convert::format_yaml(text),
            Self::MinifyYaml => convert::minify_yaml(text),
        }
    }
}

/// Host to surface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum SurfaceCommand {
    Init {
        epoch: u64,
        content: String,
        language: DocumentLanguage,
        font_size: u16,
    },
    SetValue {
        content: String,
    },
    SetLanguage {
        language: DocumentLanguage,
    },
    SetContentAndLanguage {
        content: String,
        language: DocumentLanguage,
    },
    SetFontSize {
        font_size: u16,
    },
    RevealLine {
        line: u32,
    },
    Search {
        query: String,
    },
    SearchNext,
    SearchPrev,
    ReplaceAll {
        search: String,
        replacement: String,
    },
    RunOperation {
        operation: SurfaceOperation,
        content: String,
    },
}

impl SurfaceCommand {
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

/// Surface to host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum SurfaceEvent {
    Ready,
    /// `epoch` is the one of the `Init` the surface was showing when the user typed.
    ContentChanged {
        epoch: u64,
        text: String,
    },
    OperationResult {
        operation: SurfaceOperation,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        result: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        error: Option<String>,
    },
}

impl SurfaceEvent {
    /// Decodes a raw surface message. Malformed messages are logged and dropped.
    pub fn from_json(raw: &str) -> Option<Self> {
        match serde_json::from_str(raw) {
            Ok(event) => Some(event),
            Err(e) => {
                tracing::warn!(error = %e, "dropping malformed surface message");
                None
            }
        }
    }
}

/// Exactly one of `result` and `error` must be present.
pub fn operation_outcome(
    result: Option<String>,
    error: Option<String>,
) -> Option<Result<String, String>> {
    match (result, error) {
        (Some(text), None) => Some(Ok(text)),
        (None, Some(message)) => Some(Err(message)),
        (result, error) => {
            tracing::warn!(
                has_result = result.is_some(),
                has_error = error.is_some(),
                "operation result must carry exactly one of result or error"
            );
            None
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Readiness {
    #[default]
    NotReady,
    Ready,
}

#[derive(Debug, Clone, Default)]
pub struct EditorBridge {
    readiness: Readiness,
    pending: Option<SurfaceCommand>,
    last_tab: Option<TabId>,
    last_language: DocumentLanguage,
    last_font_size: u16,
    mirror: String,
    epoch: u64,
}

impl EditorBridge {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn readiness(&self) -> Readiness {
        self.readiness
    }

    pub fn is_ready(&self) -> bool {
        self.readiness == Readiness::Ready
    }

    pub fn pending(&self) -> Option<&SurfaceCommand> {
        self.pending.as_ref()
    }

    pub fn last_tab(&self) -> Option<TabId> {
        self.last_tab
    }

    /// Epoch of the most recent init, sent or pending.
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// Content the surface is believed to hold.
    pub fn mirror(&self) -> &str {
        &self.mirror
    }

    fn init_command(&self) -> SurfaceCommand {
        SurfaceCommand::Init {
            epoch: self.epoch,
            content: self.mirror.clone(),
            language: self.last_language,
            font_size: self.last_font_size,
        }
    }

    fn emit(&mut self, command: SurfaceCommand) -> Option<SurfaceCommand> {
        match self.readiness {
            Readiness::Ready => Some(command),
            Readiness::NotReady => {
                if self.pending.is_some() {
                    tracing::debug!("superseding pending surface init");
                }
                self.pending = Some(self.init_command());
                None
            }
        }
    }

    /// Points the surface at `tab`. A different tab than last time is a full reinit.
    pub fn show_tab(
        &mut self,
        tab: TabId,
        content: &str,
        language: DocumentLanguage,
        font_size: u16,
    ) -> Option<SurfaceCommand> {
        if self.last_tab == Some(tab) {
            return None;
        }
        self.last_tab = Some(tab);
        self.epoch = self.epoch.wrapping_add(1);
        self.last_language = language;
        self.last_font_size = font_size;
        self.mirror = content.to_string();
        let command = self.init_command();
        self.emit(command)
    }

    /// Same-tab replacement of content and language without a reinit.
    pub fn set_content_and_language(
        &mut self,
        content: &str,
        language: DocumentLanguage,
    ) -> Option<SurfaceCommand> {
        self.mirror = content.to_string();
        self.last_language = language;
        self.emit(SurfaceCommand::SetContentAndLanguage {
            content: content.to_string(),
            language,
        })
    }

    pub fn set_value(&mut self, content: &str) -> Option<SurfaceCommand> {
        if self.mirror == content {
            return None;
        }
        self.mirror = content.to_string();
        self.emit(SurfaceCommand::SetValue {
            content: content.to_string(),
        })
    }

    pub fn set_language(&mut self, language: DocumentLanguage) -> Option<SurfaceCommand> {
        if self.last_language == language {
            return None;
        }
        self.last_language = language;
        self.emit(SurfaceCommand::SetLanguage { language })
    }

    pub fn set_font_size(&mut self, font_size: u16) -> Option<SurfaceCommand> {
        if self.last_font_size == font_size {
            return None;
        }
        self.last_font_size = font_size;
        self.emit(SurfaceCommand::SetFontSize { font_size })
    }

    /// Records a keystroke report from the surface; nothing is echoed back.
    /// Returns false when the report belongs to an earlier epoch.
    pub fn content_changed(&mut self, epoch: u64, text: &str) -> bool {
        if epoch != self.epoch {
            tracing::debug!(
                epoch,
                current = self.epoch,
                "dropping content report from a previous tab"
            );
            return false;
        }
        self.mirror = text.to_string();
        true
    }

    /// Non-content commands are meaningless before the surface can act on them.
    pub fn forward(&mut self, command: SurfaceCommand) -> Option<SurfaceCommand> {
        if self.is_ready() {
            Some(command)
        } else {
            tracing::debug!(?command, "surface not ready, dropping command");
            None
        }
    }

    /// Marks the surface ready and releases the pending init, if any.
    pub fn mark_ready(&mut self) -> Option<SurfaceCommand> {
        self.readiness = Readiness::Ready;
        self.pending.take()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/kernel/bridge.rs"]
mod tests;
