//! Domain layer - core data structures and types.
//!
//! This module contains the fundamental domain models:
//! - Document, its edit records and undo history
//! - Presentation settings (themes, colours, font size)
//! - Window ids and input events

pub mod document;
pub mod messages;
pub mod settings;

pub use document::{Document, EditKind, EditRecord};
pub use messages::{EditorEvent, WindowId};
pub use settings::{Color, ColorSet, FontSize, SettingsSnapshot, Theme, ThemeKind};
