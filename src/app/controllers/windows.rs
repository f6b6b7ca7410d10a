use std::cell::RefCell;
use std::rc::{Rc, Weak};

use tracing::{debug, warn};

use crate::app::domain::{SettingsSnapshot, WindowId};

/// Anything that re-renders when the shared settings change.
pub trait SettingsListener {
    fn on_settings_changed(&mut self, snapshot: &SettingsSnapshot);
}

struct Entry {
    id: WindowId,
    listener: Weak<RefCell<dyn SettingsListener>>,
}

/// The open windows, in the order they were registered.
///
/// Entries are weak: the registry only finds live windows, it never keeps
/// one alive. A window that has been dropped is skipped and forgotten.
#[derive(Default)]
pub struct WindowRegistry {
    entries: Vec<Entry>,
}

impl WindowRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a window. Registering an id again replaces its listener in place.
    pub fn register<L: SettingsListener + 'static>(&mut self, id: WindowId, listener: &Rc<RefCell<L>>) {
        let listener: Weak<RefCell<L>> = Rc::downgrade(listener);
        let listener: Weak<RefCell<dyn SettingsListener>> = listener;
        match self.entries.iter_mut().find(|e| e.id == id) {
            Some(entry) => entry.listener = listener,
            None => self.entries.push(Entry { id, listener }),
        }
        debug!(window = %id, open = self.entries.len(), "window registered");
    }

    /// Remove a window. Returns false if it was not registered.
    pub fn unregister(&mut self, id: WindowId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| e.id != id);
        let removed = self.entries.len() != before;
        if removed {
            debug!(window = %id, open = self.entries.len(), "window unregistered");
        }
        removed
    }

    /// Deliver `snapshot` to every live window in registration order.
    /// Returns how many windows received it.
    pub fn broadcast(&mut self, snapshot: &SettingsSnapshot) -> usize {
        let mut delivered = 0;
        for entry in &self.entries {
            let Some(listener) = entry.listener.upgrade() else {
                continue;
            };
            match listener.try_borrow_mut() {
                Ok(mut listener) => {
                    listener.on_settings_changed(snapshot);
                    delivered += 1;
                }
                Err(_) => warn!(window = %entry.id, "window busy, settings not delivered"),
            }
        }

        self.entries.retain(|e| e.listener.strong_count() > 0);
        debug!(delivered, "settings broadcast");
        delivered
    }

    pub fn contains(&self, id: WindowId) -> bool {
        self.entries.iter().any(|e| e.id == id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn ids(&self) -> Vec<WindowId> {
        self.entries.iter().map(|e| e.id).collect()
    }
}
