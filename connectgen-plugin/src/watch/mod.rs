//! Debounced regeneration on schema changes.

mod filter;
mod orchestrator;
mod reload;
mod source;

pub use filter::{ChangeFilter, ChangeKind, SCHEMA_SUFFIX, WatchEvent};
pub use orchestrator::{Orchestrator, Regenerate, State};
pub use reload::{Reload, ReloadSink};
pub use source::{SchemaWatcher, watch_schemas};
