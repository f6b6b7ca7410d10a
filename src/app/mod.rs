//! Application layer - organized by Clean Architecture principles.
//!
//! # Structure
//!
//! - `domain/` - Core data structures (Document, Settings, Events)
//! - `controllers/` - Orchestration (EditorController, WindowRegistry)
//! - `services/` - Business operations (settings store, find, text_ops)
//! - `infrastructure/` - External integrations (persistence, file I/O, hosts, logging, error)
//! - `state.rs` - Workspace coordinating all open windows

pub mod controllers;
pub mod domain;
pub mod infrastructure;
pub mod services;
pub mod state;

// Re-exports for convenient external access
pub use controllers::editor::{EditorController, EventOutcome};
pub use controllers::windows::{SettingsListener, WindowRegistry};
pub use domain::{Color, ColorSet, Document, EditKind, EditRecord, EditorEvent, FontSize, SettingsSnapshot, Theme, ThemeKind, WindowId};
pub use infrastructure::error::{AppError, Result};
pub use services::find::Direction;
pub use services::settings_store::SettingsStore;
pub use state::Workspace;
