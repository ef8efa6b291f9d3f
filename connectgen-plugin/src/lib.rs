//! Dev-server integration for connectgen.
//!
//! A [`Plugin`] owns one project's configuration. Its
//! [`config_resolved`](Plugin::config_resolved) hook runs the first
//! generation cycle, and [`watch`](Plugin::watch) turns `.proto` changes into
//! debounced regenerations followed by a [`Reload`] signal.

mod generate;
mod plugin;

pub mod watch;

pub use generate::{Generation, Generator, clean_out_dir};
pub use plugin::{Lifecycle, Plugin};
pub use watch::{ChangeFilter, ChangeKind, Reload, ReloadSink, WatchEvent};
