//! Generated TypeScript files.

mod clients_ts;

pub use clients_ts::{CLIENTS_FILE, ClientsTs};

/// First line of every file written by connectgen.
pub const GENERATED_HEADER: &str = "// Code generated by connectgen. DO NOT EDIT.";
