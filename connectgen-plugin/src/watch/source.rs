use std::path::Path;

use eyre::{Result, WrapErr};
use notify::{
    Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher,
    event::ModifyKind,
};
use tokio::sync::mpsc;
use tracing::warn;

use super::{ChangeKind, WatchEvent};

const CHANNEL_CAPACITY: usize = 256;

/// Keeps the filesystem watch alive. Dropping it closes the event channel.
pub struct SchemaWatcher {
    _watcher: RecommendedWatcher,
}

/// Watch `proto_dir` recursively, delivering one [`WatchEvent`] per changed path.
pub fn watch_schemas(proto_dir: &Path) -> Result<(SchemaWatcher, mpsc::Receiver<WatchEvent>)> {
    let (tx, rx) = mpsc::channel(CHANNEL_CAPACITY);

    let mut watcher = notify::recommended_watcher(move |res: notify::Result<Event>| match res {
        Ok(event) => {
            for event in to_watch_events(event) {
                if tx.blocking_send(event).is_err() {
                    return;
                }
            }
        }
        Err(err) => warn!("Watch error: {err}"),
    })
    .wrap_err("Failed to create file watcher")?;

    watcher
        .watch(proto_dir, RecursiveMode::Recursive)
        .wrap_err_with(|| format!("Failed to watch {}", proto_dir.display()))?;

    Ok((SchemaWatcher { _watcher: watcher }, rx))
}

fn change_kind(kind: &EventKind) -> ChangeKind {
    match kind {
        EventKind::Create(_) => ChangeKind::Created,
        EventKind::Modify(ModifyKind::Metadata(_)) => ChangeKind::Other,
        EventKind::Modify(_) => ChangeKind::Modified,
        EventKind::Remove(_) => ChangeKind::Removed,
        _ => ChangeKind::Other,
    }
}

fn to_watch_events(event: Event) -> impl Iterator<Item = WatchEvent> {
    let kind = change_kind(&event.kind);
    event
        .paths
        .into_iter()
        .map(move |path| WatchEvent { kind, path })
}
