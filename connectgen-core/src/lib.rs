//! Core utilities and types for connectgen.
//!
//! This crate provides the file-writing primitives and naming helpers
//! shared by the generator crates.

mod file;
mod naming;

// File operations
pub use file::{File, FileRules, GeneratedFile, Overwrite, WriteResult};
// Naming helpers
pub use naming::{lower_first, to_import_path};
