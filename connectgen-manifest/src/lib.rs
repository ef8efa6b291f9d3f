//! Parsing and validation of connectgen.toml.

// Miette's derive macro generates code that triggers these warnings
#![allow(unused_assignments)]

mod error;
mod manifest;

pub use error::{Error, Result};
pub use manifest::{
    DEFAULT_MANIFEST, GenerateSection, GenerationConfig, Invalid, MANIFEST_FILE, Manifest,
    Toolchain, WatchSection,
};
