//! Controllers layer - orchestration and coordination.
//!
//! This module contains controllers that coordinate between
//! domain models, services, and the window hosts:
//! - Per-window editing
//! - The registry of open windows and settings broadcast

pub mod editor;
pub mod windows;
