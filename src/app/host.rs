use std::io;
use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::sync::{Arc, Mutex};
use std::time::Instant;

use crate::kernel::services::adapters::{
    load_settings_from, save_settings_to, AppMessage, AsyncRuntime, SharedDialog, SharedStorage,
};
use crate::kernel::services::ports::{FileDialog, KeyValueStore, Settings, SurfaceSink};
use crate::kernel::services::{surface_bus, SurfaceEventReceiver, SurfaceEventSender};
use crate::kernel::session;
use crate::kernel::{Action, AppState, Effect, Store};

/// Upper bound of background completions handled per `pump`.
pub const MAX_MESSAGES_PER_PUMP: usize = 64;

/// Platform pieces the host is wired to.
pub struct AppPorts {
    pub storage: Box<dyn KeyValueStore>,
    pub dialog: Box<dyn FileDialog>,
    pub surface: Box<dyn SurfaceSink>,
    /// `None` keeps settings in memory only.
    pub settings_path: Option<PathBuf>,
}

pub struct App {
    store: Store,
    runtime: AsyncRuntime,
    messages: Receiver<AppMessage>,
    surface_tx: SurfaceEventSender,
    surface_rx: SurfaceEventReceiver,
    surface: Box<dyn SurfaceSink>,
    storage: SharedStorage,
    dialog: SharedDialog,
    settings_path: Option<PathBuf>,
}

impl App {
    pub fn new(ports: AppPorts) -> io::Result<Self> {
        let settings = match &ports.settings_path {
            Some(path) => load_settings_from(path).unwrap_or_else(|e| {
                tracing::warn!(
                    error = %e,
                    path = %path.display(),
                    "failed to load settings, using defaults"
                );
                Settings::default()
            }),
            None => Settings::default(),
        };
        let state = session::restore(ports.storage.as_ref(), settings);

        let (tx, messages) = mpsc::channel();
        let runtime = AsyncRuntime::new(tx)?;
        let (surface_tx, surface_rx) = surface_bus();

        Ok(Self {
            store: Store::new(state),
            runtime,
            messages,
            surface_tx,
            surface_rx,
            surface: ports.surface,
            storage: Arc::new(Mutex::new(ports.storage)),
            dialog: Arc::new(Mutex::new(ports.dialog)),
            settings_path: ports.settings_path,
        })
    }

    pub fn state(&self) -> &AppState {
        self.store.state()
    }

    /// Handle for the surface runtime to report events on.
    pub fn surface_events(&self) -> SurfaceEventSender {
        self.surface_tx.clone()
    }

    pub fn dispatch(&mut self, action: Action) -> bool {
        let result = self.store.dispatch(action);
        for effect in result.effects {
            self.run_effect(effect);
        }
        result.state_changed
    }

    /// Drains surface events and finished IO, then advances timers.
    pub fn pump(&mut self) -> bool {
        let mut changed = false;

        while let Ok(event) = self.surface_rx.try_recv() {
            changed |= self.dispatch(Action::Surface(event));
        }

        for _ in 0..MAX_MESSAGES_PER_PUMP {
            match self.messages.try_recv() {
                Ok(message) => changed |= self.dispatch(message.into()),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    tracing::error!("runtime message channel closed");
                    break;
                }
            }
        }

        changed |= self.dispatch(Action::Tick);
        changed
    }

    /// When the host loop should call `pump` again at the latest.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.store.state().next_deadline()
    }

    /// Writes the session synchronously; called once before exit.
    pub fn shutdown(&mut self) {
        let snapshot = self.store.session_snapshot();
        self.runtime.supersede_persists();
        match self.storage.lock() {
            Ok(mut storage) => {
                if let Err(e) = snapshot.save(storage.as_mut()) {
                    tracing::error!(error = %e, "failed to persist session on shutdown");
                }
            }
            Err(_) => tracing::error!("session storage lock poisoned"),
        }
        tracing::info!(tabs = snapshot.tabs.len(), "shutdown");
    }

    fn run_effect(&mut self, effect: Effect) {
        match effect {
            Effect::Surface(command) => self.surface.send(&command),
            Effect::PersistSession(session) => {
                self.runtime
                    .persist_session(Arc::clone(&self.storage), session);
            }
            Effect::PickAndOpenFile => self.runtime.pick_and_open(Arc::clone(&self.dialog)),
            Effect::ReadFiles(paths) => self.runtime.read_files(paths),
            Effect::SaveFile {
                tab,
                path,
                content,
                title,
                language,
                revision,
            } => self.runtime.save_file(
                Arc::clone(&self.dialog),
                tab,
                path,
                content,
                title,
                language,
                revision,
            ),
            Effect::AutoSave {
                tab,
                path,
                content,
                revision,
            } => self.runtime.autosave(tab, path, content, revision),
            Effect::SaveSettings(settings) => {
                let Some(path) = &self.settings_path else {
                    return;
                };
                if let Err(e) = save_settings_to(path, &settings) {
                    tracing::error!(error = %e, path = %path.display(), "failed to save settings");
                }
            }
        }
    }
}
