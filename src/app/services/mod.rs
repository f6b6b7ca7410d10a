//! Services layer - business operations and utilities.
//!
//! This module contains business logic and operations:
//! - The shared settings store
//! - Find
//! - Text operations

pub mod find;
pub mod settings_store;
pub mod text_ops;
