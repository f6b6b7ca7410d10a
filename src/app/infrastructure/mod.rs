//! Infrastructure layer - external integrations and utilities.
//!
//! This module contains code that interfaces with external systems:
//! - Settings persistence backends
//! - File I/O
//! - The window host seam (plus a headless host)
//! - Logging setup
//! - Error types

pub mod error;
pub mod file_io;
pub mod host;
pub mod logging;
pub mod persistence;
