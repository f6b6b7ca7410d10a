use std::fmt;
use std::path::PathBuf;

use super::document::EditKind;
use super::settings::{ColorSet, Theme};
use crate::app::services::find::Direction;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WindowId(pub u64);

impl fmt::Display for WindowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Discrete user input a window host delivers to its editor.
/// Each menu item, key binding or dialog button maps to one of these.
#[derive(Debug, Clone, PartialEq)]
pub enum EditorEvent {
    // Typing and cursor
    Insert(String),
    DeleteBackward,
    DeleteForward,
    MoveCursor(usize),
    Select { start: usize, end: usize },
    Edit {
        kind: EditKind,
        position: usize,
        old: String,
        new: String,
    },

    // Action menu
    Undo,
    Redo,
    Find { query: String, direction: Direction },
    FindAll(String),
    ClearHighlights,

    // File
    FileNew,
    FileOpen(PathBuf),
    FileSave,
    FileSaveAs(PathBuf),

    // Settings dialogs
    PreviewTheme(Theme),
    PreviewFontSize(u32),
    CancelPreview,
    ApplyTheme(Theme),
    ApplyFontSize(u32),
    SaveCustomColors(ColorSet),

    // Window
    OpenNewWindow,
    WindowClose,
}
