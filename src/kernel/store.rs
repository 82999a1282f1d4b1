use std::path::PathBuf;
use std::time::Instant;

use super::bridge::{operation_outcome, SurfaceCommand, SurfaceEvent, SurfaceOperation};
use super::convert::{self, ConversionError};
use super::language::{self, DocumentLanguage};
use super::services::ports::{FileError, FormatKind};
use super::session::PersistedSession;
use super::state::{
    file_title, DiffState, PendingOperation, Tab, TabId, TransientError, AUTOSAVE_DEBOUNCE,
    ERROR_TTL, PERSIST_DEBOUNCE,
};
use super::{Action, AppState, Effect};

pub struct DispatchResult {
    pub effects: Vec<Effect>,
    pub state_changed: bool,
}

impl DispatchResult {
    fn unchanged() -> Self {
        Self {
            effects: Vec::new(),
            state_changed: false,
        }
    }

    fn changed(effects: Vec<Effect>) -> Self {
        Self {
            effects,
            state_changed: true,
        }
    }
}

/// The single writer of [`AppState`].
pub struct Store {
    state: AppState,
}

impl Store {
    pub fn new(state: AppState) -> Self {
        let mut store = Self { state };
        // Not ready yet: this only primes the pending init.
        let _ = store.show_active();
        store
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn session_snapshot(&self) -> PersistedSession {
        PersistedSession::capture(&self.state)
    }

    pub fn dispatch(&mut self, action: Action) -> DispatchResult {
        self.dispatch_at(action, Instant::now())
    }

    pub fn dispatch_at(&mut self, action: Action, now: Instant) -> DispatchResult {
        match action {
            Action::Tick => self.tick(now),

            Action::AddTab => {
                let tab = Tab::untitled(self.state.untitled_title());
                let id = tab.id;
                self.state.tabs.push(tab);
                self.activate(id, now)
            }
            Action::CloseTab(id) => self.close_tab(id, now),
            Action::SetActiveTab(id) => {
                if id == self.state.active || self.state.tab_index(id).is_none() {
                    return DispatchResult::unchanged();
                }
                self.activate(id, now)
            }
            Action::RenameTab { id, title } => {
                let title = title.trim();
                let Some(tab) = self.state.tab_mut(id) else {
                    return DispatchResult::unchanged();
                };
                if title.is_empty() || tab.title == title {
                    return DispatchResult::unchanged();
                }
                tab.title = title.to_string();
                self.schedule_persist(now);
                DispatchResult::changed(Vec::new())
            }
            Action::SetActiveContent(text) => self.set_active_content(text, now),
            Action::UpdateActiveLanguage(language) => {
                let tab = self.state.active_tab_mut();
                if tab.language == language {
                    return DispatchResult::unchanged();
                }
                tab.language = language;
                let effects = self.state.bridge.set_language(language);
                self.schedule_persist(now);
                DispatchResult::changed(surface(effects))
            }

            Action::Format(kind) => self.format(kind, now),
            Action::Minify => self.minify(now),
            Action::ClearContent => {
                let effects =
                    self.apply_formatted_content(String::new(), DocumentLanguage::Plaintext, now);
                self.state.active_tab_mut().dirty = false;
                DispatchResult::changed(effects)
            }
            Action::PasteFormatted(text) => {
                let (content, language) = formatted_paste(text);
                let effects = self.apply_formatted_content(content, language, now);
                DispatchResult::changed(effects)
            }
            Action::PasteAsNewTab(text) => {
                let (content, language) = formatted_paste(text);
                let mut tab = Tab::untitled(self.state.untitled_title());
                tab.content = content;
                tab.language = language;
                tab.touch();
                let id = tab.id;
                self.state.tabs.push(tab);
                self.activate(id, now)
            }
            Action::ReplaceAll {
                search,
                replacement,
            } => self.replace_all(&search, &replacement, now),

            Action::Surface(event) => self.surface_event(event, now),
            Action::Search(query) => self.forward(SurfaceCommand::Search { query }),
            Action::SearchNext => self.forward(SurfaceCommand::SearchNext),
            Action::SearchPrev => self.forward(SurfaceCommand::SearchPrev),
            Action::RevealLine(line) => self.forward(SurfaceCommand::RevealLine { line }),

            Action::OpenFile => DispatchResult {
                effects: vec![Effect::PickAndOpenFile],
                state_changed: false,
            },
            Action::FileOpened { path, content } => self.file_opened(path, content, now),
            Action::FilesDropped(paths) => self.files_dropped(paths, now),
            Action::SaveActive => self.save_active(false),
            Action::SaveActiveAs => self.save_active(true),
            Action::FileSaved {
                tab,
                path,
                revision,
            } => self.file_saved(tab, path, revision, now),
            Action::FileOpFailed(error) => {
                if error.is_cancelled() {
                    tracing::debug!("file dialog cancelled");
                    return DispatchResult::unchanged();
                }
                tracing::warn!(error = %error, "file operation failed");
                let message = error.user_message(self.state.settings.ui_language);
                self.set_error(message, now);
                DispatchResult::changed(Vec::new())
            }

            Action::StartDiff => {
                let tab = self.state.active_tab();
                self.state.diff = Some(DiffState {
                    tab: tab.id,
                    original: tab.content.clone(),
                });
                DispatchResult::changed(Vec::new())
            }
            Action::CloseDiff => {
                if self.state.diff.take().is_none() {
                    return DispatchResult::unchanged();
                }
                DispatchResult::changed(Vec::new())
            }

            Action::SetFontSize(size) => {
                if !self.state.settings.set_font_size(size) {
                    return DispatchResult::unchanged();
                }
                let font_size = self.state.settings.font_size;
                let mut effects = surface(self.state.bridge.set_font_size(font_size));
                effects.push(Effect::SaveSettings(self.state.settings.clone()));
                DispatchResult::changed(effects)
            }
            Action::ToggleAutoSave => {
                if !self.state.settings.toggle_auto_save() {
                    self.state.timers.autosave.clear();
                }
                DispatchResult::changed(vec![Effect::SaveSettings(self.state.settings.clone())])
            }
            Action::ToggleFavorite(kind) => {
                self.state.settings.toggle_favorite(kind);
                DispatchResult::changed(vec![Effect::SaveSettings(self.state.settings.clone())])
            }
            Action::SetUiLanguage(language) => {
                if !self.state.settings.set_ui_language(language) {
                    return DispatchResult::unchanged();
                }
                DispatchResult::changed(vec![Effect::SaveSettings(self.state.settings.clone())])
            }
            Action::DismissError => {
                if self.state.error.take().is_none() {
                    return DispatchResult::unchanged();
                }
                DispatchResult::changed(Vec::new())
            }
        }
    }

    fn tick(&mut self, now: Instant) -> DispatchResult {
        let mut state_changed = false;
        let mut effects = Vec::new();

        if self.state.error.as_ref().is_some_and(|e| e.expires_at <= now) {
            self.state.error = None;
            state_changed = true;
        }

        if self.state.timers.persist_at.is_some_and(|at| at <= now) {
            self.state.timers.persist_at = None;
            effects.push(Effect::PersistSession(self.session_snapshot()));
        }

        let (due, waiting): (Vec<_>, Vec<_>) = self
            .state
            .timers
            .autosave
            .drain(..)
            .partition(|(_, at)| *at <= now);
        self.state.timers.autosave = waiting;
        for (id, _) in due {
            let Some(tab) = self.state.tab(id) else {
                continue;
            };
            if let (Some(path), true) = (&tab.file_path, tab.dirty) {
                tracing::debug!(tab = %id, path = %path.display(), "autosave");
                effects.push(Effect::AutoSave {
                    tab: id,
                    path: path.clone(),
                    content: tab.content.clone(),
                    revision: tab.revision,
                });
            }
        }

        DispatchResult {
            effects,
            state_changed,
        }
    }

    fn show_active(&mut self) -> Option<Effect> {
        let state = &mut self.state;
        let index = state.active_index();
        let tab = &state.tabs[index];
        state
            .bridge
            .show_tab(tab.id, &tab.content, tab.language, state.settings.font_size)
            .map(Effect::Surface)
    }

    fn activate(&mut self, id: TabId, now: Instant) -> DispatchResult {
        self.state.active = id;
        self.state.error = None;
        self.schedule_persist(now);
        DispatchResult::changed(self.show_active().into_iter().collect())
    }

    fn close_tab(&mut self, id: TabId, now: Instant) -> DispatchResult {
        let Some(index) = self.state.tab_index(id) else {
            return DispatchResult::unchanged();
        };
        let was_active = self.state.active == id;
        self.state.tabs.remove(index);
        self.state.timers.autosave.retain(|(tab, _)| *tab != id);
        if self.state.diff.as_ref().is_some_and(|d| d.tab == id) {
            self.state.diff = None;
        }
        if self.state.pending_operation.is_some_and(|p| p.tab == id) {
            self.state.pending_operation = None;
        }

        let next = if self.state.tabs.is_empty() {
            let tab = Tab::untitled(self.state.untitled_title());
            let id = tab.id;
            self.state.tabs.push(tab);
            id
        } else if was_active {
            self.state.tabs[index.saturating_sub(1)].id
        } else {
            self.state.active
        };
        self.activate(next, now)
    }

    fn schedule_persist(&mut self, now: Instant) {
        self.state.timers.persist_at = Some(now + PERSIST_DEBOUNCE);
    }

    /// Autosave never creates files: tabs without a path are not scheduled.
    fn schedule_autosave(&mut self, id: TabId, now: Instant) {
        let timers = &mut self.state.timers;
        timers.autosave.retain(|(tab, _)| *tab != id);
        let has_path = self.state.tab(id).is_some_and(|t| t.file_path.is_some());
        if self.state.settings.auto_save && has_path {
            self.state.timers.autosave.push((id, now + AUTOSAVE_DEBOUNCE));
        }
    }

    fn content_mutated(&mut self, id: TabId, now: Instant) {
        self.schedule_persist(now);
        self.schedule_autosave(id, now);
    }

    fn set_error(&mut self, message: String, now: Instant) {
        self.state.error = Some(TransientError {
            message,
            expires_at: now + ERROR_TTL,
        });
    }

    fn conversion_failed(&mut self, error: ConversionError, now: Instant) -> DispatchResult {
        tracing::info!(error = %error, "conversion failed");
        let message = error.user_message(self.state.settings.ui_language);
        self.set_error(message, now);
        DispatchResult::changed(Vec::new())
    }

    /// The one mutation path for format, convert, minify, clear and paste.
    fn apply_formatted_content(
        &mut self,
        text: String,
        language: DocumentLanguage,
        now: Instant,
    ) -> Vec<Effect> {
        let state = &mut self.state;
        let index = state.active_index();
        let tab = &mut state.tabs[index];
        tab.content = text;
        tab.language = language;
        tab.touch();
        let id = tab.id;
        let command = state.bridge.set_content_and_language(&tab.content, language);
        self.content_mutated(id, now);
        surface(command)
    }

    fn set_active_content(&mut self, text: String, now: Instant) -> DispatchResult {
        let state = &mut self.state;
        let index = state.active_index();
        let tab = &mut state.tabs[index];
        if tab.content == text {
            return DispatchResult::unchanged();
        }
        tab.content = text;
        tab.touch();
        let id = tab.id;
        let command = state.bridge.set_value(&tab.content);
        self.content_mutated(id, now);
        DispatchResult::changed(surface(command))
    }

    fn replace_all(&mut self, search: &str, replacement: &str, now: Instant) -> DispatchResult {
        if search.is_empty() || !self.state.active_tab().content.contains(search) {
            return DispatchResult::unchanged();
        }
        let replaced = self.state.active_tab().content.replace(search, replacement);
        self.set_active_content(replaced, now)
    }

    fn forward(&mut self, command: SurfaceCommand) -> DispatchResult {
        DispatchResult {
            effects: surface(self.state.bridge.forward(command)),
            state_changed: false,
        }
    }

    fn surface_operation_for(
        &self,
        source: DocumentLanguage,
        target: DocumentLanguage,
    ) -> Option<SurfaceOperation> {
        use DocumentLanguage::*;

        if !self.state.settings.yaml_on_surface {
            return None;
        }
        match (source, target) {
            (Json, Yaml) => Some(SurfaceOperation::JsonToYaml),
            (Yaml, Json) => Some(SurfaceOperation::YamlToJson),
            (Yaml | Plaintext, Yaml) => Some(SurfaceOperation::FormatYaml),
            _ => None,
        }
    }

    /// Hands an operation to the surface. `None` when the surface cannot take it.
    fn request_operation(
        &mut self,
        operation: SurfaceOperation,
        content: &str,
    ) -> Option<DispatchResult> {
        let command = self.state.bridge.forward(SurfaceCommand::RunOperation {
            operation,
            content: content.to_string(),
        })?;
        let pending = PendingOperation {
            tab: self.state.active,
            operation,
        };
        if let Some(previous) = self.state.pending_operation.replace(pending) {
            tracing::debug!(
                operation = previous.operation.name(),
                "superseding outstanding surface operation"
            );
        }
        Some(DispatchResult::changed(vec![Effect::Surface(command)]))
    }

    fn format(&mut self, kind: FormatKind, now: Instant) -> DispatchResult {
        let tab = self.state.active_tab();
        if tab.content.trim().is_empty() {
            return DispatchResult::unchanged();
        }
        let text = tab.content.clone();
        let target = kind.language();
        let source = match language::detect(&text) {
            DocumentLanguage::Plaintext => tab.language,
            detected => detected,
        };

        if let Some(operation) = self.surface_operation_for(source, target) {
            if let Some(result) = self.request_operation(operation, &text) {
                return result;
            }
        }

        match convert::convert(&text, source, target) {
            Ok(out) => DispatchResult::changed(self.apply_formatted_content(out, target, now)),
            Err(e) => self.conversion_failed(e, now),
        }
    }

    fn minify(&mut self, now: Instant) -> DispatchResult {
        let tab = self.state.active_tab();
        let text = tab.content.clone();

        if tab.language == DocumentLanguage::Yaml {
            if text.trim().is_empty() {
                return DispatchResult::unchanged();
            }
            if self.state.settings.yaml_on_surface {
                if let Some(result) = self.request_operation(SurfaceOperation::MinifyYaml, &text) {
                    return result;
                }
            }
            return match convert::minify_yaml(&text) {
                Ok(out) => DispatchResult::changed(self.apply_formatted_content(
                    out,
                    DocumentLanguage::Yaml,
                    now,
                )),
                Err(e) => self.conversion_failed(e, now),
            };
        }

        match convert::minify(&text) {
            Ok(None) => DispatchResult::unchanged(),
            Ok(Some((out, language))) => {
                DispatchResult::changed(self.apply_formatted_content(out, language, now))
            }
            Err(e) => self.conversion_failed(e, now),
        }
    }

    fn surface_event(&mut self, event: SurfaceEvent, now: Instant) -> DispatchResult {
        match event {
            SurfaceEvent::Ready => {
                let command = self.state.bridge.mark_ready();
                tracing::debug!(flushed = command.is_some(), "surface ready");
                DispatchResult::changed(surface(command))
            }
            SurfaceEvent::ContentChanged { epoch, text } => {
                self.surface_content_changed(epoch, text, now)
            }
            SurfaceEvent::OperationResult {
                operation,
                result,
                error,
            } => self.operation_result(operation, result, error, now),
        }
    }

    fn surface_content_changed(
        &mut self,
        epoch: u64,
        text: String,
        now: Instant,
    ) -> DispatchResult {
        let state = &mut self.state;
        if !state.bridge.content_changed(epoch, &text) {
            return DispatchResult::unchanged();
        }
        let index = state.active_index();
        let tab = &mut state.tabs[index];
        if tab.content == text {
            return DispatchResult::unchanged();
        }

        let reclassified = language::should_reclassify(&tab.content, &text, tab.language);
        tab.content = text;
        tab.touch();
        let id = tab.id;

        let mut effects = Vec::new();
        if let Some(language) = reclassified {
            tracing::debug!(from = %tab.language, to = %language, "reclassified edited content");
            tab.language = language;
            effects.extend(surface(state.bridge.set_language(language)));
        }
        self.content_mutated(id, now);
        DispatchResult::changed(effects)
    }

    fn operation_result(
        &mut self,
        operation: SurfaceOperation,
        result: Option<String>,
        error: Option<String>,
        now: Instant,
    ) -> DispatchResult {
        let Some(outcome) = operation_outcome(result, error) else {
            return DispatchResult::unchanged();
        };
        let Some(pending) = self.state.pending_operation else {
            tracing::debug!(operation = operation.name(), "unsolicited operation result");
            return DispatchResult::unchanged();
        };
        if pending.operation != operation {
            tracing::debug!(operation = operation.name(), "stale operation result");
            return DispatchResult::unchanged();
        }
        self.state.pending_operation = None;
        if pending.tab != self.state.active {
            tracing::debug!(
                operation = operation.name(),
                "requesting tab is no longer active, dropping result"
            );
            return DispatchResult::changed(Vec::new());
        }

        match outcome {
            Ok(text) => DispatchResult::changed(self.apply_formatted_content(
                text,
                operation.output_language(),
                now,
            )),
            Err(message) => self.conversion_failed(ConversionError::ParseError(message), now),
        }
    }

    fn file_opened(&mut self, path: PathBuf, content: String, now: Instant) -> DispatchResult {
        let existing = self
            .state
            .tabs
            .iter()
            .find(|t| t.file_path.as_deref() == Some(path.as_path()))
            .map(|t| t.id);
        if let Some(id) = existing {
            tracing::debug!(path = %path.display(), "file already open, activating");
            return self.activate(id, now);
        }

        tracing::info!(path = %path.display(), bytes = content.len(), "file opened");
        let tab = Tab::from_file(path, content);
        let id = tab.id;
        let index = self.state.active_index();
        if self.state.tabs[index].is_blank() {
            self.state.tabs[index] = tab;
        } else {
            self.state.tabs.push(tab);
        }
        self.activate(id, now)
    }

    fn files_dropped(&mut self, paths: Vec<PathBuf>, now: Instant) -> DispatchResult {
        let (accepted, rejected): (Vec<_>, Vec<_>) = paths
            .into_iter()
            .partition(|p| language::is_allowed_extension(p));

        let mut result = DispatchResult::unchanged();
        if let Some(first) = rejected.first() {
            tracing::info!(count = rejected.len(), "ignoring dropped files with unsupported type");
            let error = FileError::UnsupportedExtension(file_title(first));
            let message = error.user_message(self.state.settings.ui_language);
            self.set_error(message, now);
            result.state_changed = true;
        }
        if !accepted.is_empty() {
            result.effects.push(Effect::ReadFiles(accepted));
        }
        result
    }

    fn save_active(&mut self, choose_path: bool) -> DispatchResult {
        let tab = self.state.active_tab();
        let path = if choose_path {
            None
        } else {
            tab.file_path.clone()
        };
        DispatchResult {
            effects: vec![Effect::SaveFile {
                tab: tab.id,
                path,
                content: tab.content.clone(),
                title: tab.title.clone(),
                language: tab.language,
                revision: tab.revision,
            }],
            state_changed: false,
        }
    }

    fn file_saved(
        &mut self,
        id: TabId,
        path: PathBuf,
        revision: u64,
        now: Instant,
    ) -> DispatchResult {
        // Background autosaves of other tabs leave the banner alone.
        let cleared = id == self.state.active && self.state.error.take().is_some();
        let Some(tab) = self.state.tab_mut(id) else {
            return if cleared {
                DispatchResult::changed(Vec::new())
            } else {
                DispatchResult::unchanged()
            };
        };
        if tab.file_path.as_deref() != Some(path.as_path()) {
            tab.title = file_title(&path);
            tab.file_path = Some(path);
        }
        // Edits made while the write was in flight keep the tab dirty.
        if tab.revision == revision {
            tab.dirty = false;
        }
        self.schedule_persist(now);
        DispatchResult::changed(Vec::new())
    }
}

fn surface(command: Option<SurfaceCommand>) -> Vec<Effect> {
    command.into_iter().map(Effect::Surface).collect()
}

fn formatted_paste(text: String) -> (String, DocumentLanguage) {
    match convert::try_format_pasted(&text) {
        Some(formatted) => formatted,
        None => {
            let language = language::detect(&text);
            (text, language)
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/kernel/store.rs"]
mod tests;
