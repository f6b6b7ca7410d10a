use std::cell::RefCell;
use std::path::Path;
use std::rc::Rc;

use tracing::{debug, info, warn};

use super::controllers::editor::{EditorController, EventOutcome};
use super::controllers::windows::WindowRegistry;
use super::domain::{Document, EditorEvent, SettingsSnapshot, Theme, ThemeKind, WindowId};
use super::infrastructure::error::{AppError, Result};
use super::infrastructure::file_io::FileIo;
use super::infrastructure::host::WindowHost;
use super::infrastructure::persistence::SettingsBackend;
use super::services::settings_store::SettingsStore;

/// Builds the presentation side of a freshly opened window.
pub type HostFactory = Box<dyn FnMut(WindowId) -> Box<dyn WindowHost>>;

/// Owns every open window and routes events to them.
///
/// Controllers are held here strongly; the registry only has weak handles.
/// A controller is never borrowed while settings are broadcast.
pub struct Workspace {
    windows: Vec<Rc<RefCell<EditorController>>>,
    registry: WindowRegistry,
    settings: Rc<RefCell<SettingsStore>>,
    file_io: Rc<dyn FileIo>,
    host_factory: HostFactory,
    next_id: u64,
}

impl Workspace {
    pub fn new(
        backend: Box<dyn SettingsBackend>,
        file_io: Rc<dyn FileIo>,
        host_factory: impl FnMut(WindowId) -> Box<dyn WindowHost> + 'static,
    ) -> Self {
        let settings = SettingsStore::load(backend);
        Self {
            windows: Vec::new(),
            registry: WindowRegistry::new(),
            settings: Rc::new(RefCell::new(settings)),
            file_io,
            host_factory: Box::new(host_factory),
            next_id: 1,
        }
    }

    /// Why the stored settings could not be used at startup, if they couldn't.
    pub fn take_startup_warning(&mut self) -> Option<AppError> {
        self.settings.borrow_mut().take_startup_warning()
    }

    pub fn settings(&self) -> SettingsSnapshot {
        self.settings.borrow().snapshot()
    }

    /// The theme a kind stands for; `Custom` carries the saved palette.
    pub fn theme_for(&self, kind: ThemeKind) -> Theme {
        self.settings.borrow().theme_for(kind)
    }

    // --- Windows ---

    pub fn open_window(&mut self) -> WindowId {
        self.open_document(Document::new_untitled())
    }

    /// Open a window on an existing file. Nothing is opened if it can't be read.
    pub fn open_window_with_file(&mut self, path: &Path) -> Result<WindowId> {
        let content = self.file_io.load(path)?;
        Ok(self.open_document(Document::new_from_file(path, content)))
    }

    fn open_document(&mut self, document: Document) -> WindowId {
        let id = WindowId(self.next_id);
        self.next_id += 1;

        let host = (self.host_factory)(id);
        let controller = Rc::new(RefCell::new(EditorController::new(
            id,
            document,
            self.settings.clone(),
            host,
            self.file_io.clone(),
        )));
        self.registry.register(id, &controller);
        self.windows.push(controller);

        info!(window = %id, open = self.windows.len(), "window opened");
        id
    }

    /// Close one window, asking first if its document has unsaved changes.
    /// Returns false if the user kept it open.
    pub fn close_window(&mut self, id: WindowId) -> Result<bool> {
        let window = self.window(id)?;
        if !window.borrow_mut().confirm_discard()? {
            debug!(window = %id, "close cancelled");
            return Ok(false);
        }
        drop(window);

        self.settings.borrow_mut().cancel_preview(id);
        self.registry.unregister(id);
        self.windows.retain(|w| w.borrow().id() != id);
        info!(window = %id, open = self.windows.len(), "window closed");
        if self.windows.is_empty() {
            info!("last window closed");
        }
        Ok(true)
    }

    /// Close every window in order. Stops at the first one the user keeps open.
    pub fn close_all(&mut self) -> Result<bool> {
        for id in self.window_ids() {
            if !self.close_window(id)? {
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// The application quits once this is true.
    pub fn is_empty(&self) -> bool {
        self.windows.is_empty()
    }

    pub fn len(&self) -> usize {
        self.windows.len()
    }

    pub fn window_ids(&self) -> Vec<WindowId> {
        self.windows.iter().map(|w| w.borrow().id()).collect()
    }

    pub fn contains(&self, id: WindowId) -> bool {
        self.windows.iter().any(|w| w.borrow().id() == id)
    }

    /// Read-only access to one window's controller.
    pub fn with_window<R>(&self, id: WindowId, f: impl FnOnce(&EditorController) -> R) -> Result<R> {
        let window = self.window(id)?;
        let controller = window.borrow();
        Ok(f(&controller))
    }

    fn window(&self, id: WindowId) -> Result<Rc<RefCell<EditorController>>> {
        self.windows
            .iter()
            .find(|w| w.borrow().id() == id)
            .cloned()
            .ok_or(AppError::UnknownWindow(id))
    }

    // --- Events ---

    /// Route one event to its window. A committed settings change has reached
    /// every open window by the time this returns.
    pub fn dispatch(&mut self, id: WindowId, event: EditorEvent) -> Result<()> {
        let window = self.window(id)?;
        let outcome = window.borrow_mut().handle(event)?;
        drop(window);

        match outcome {
            EventOutcome::Handled => {}
            EventOutcome::Broadcast(snapshot) => {
                let delivered = self.registry.broadcast(&snapshot);
                if delivered != self.windows.len() {
                    warn!(delivered, open = self.windows.len(), "settings did not reach every window");
                }
            }
            EventOutcome::OpenNewWindow => {
                self.open_window();
            }
            EventOutcome::CloseRequested => {
                self.close_window(id)?;
            }
        }
        Ok(())
    }
}
