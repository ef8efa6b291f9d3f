use serde::{Deserialize, Serialize};
use tokio::sync::{broadcast, mpsc};
use tracing::debug;

/// Signal sent to connected dev-server clients after a successful cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum Reload {
    FullReload,
}

impl Reload {
    /// Wire form, e.g. `{"type":"full-reload"}`.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

/// Where reload signals go. Delivery is best-effort.
pub trait ReloadSink: Send + 'static {
    fn send_reload(&self, reload: Reload);
}

impl ReloadSink for broadcast::Sender<Reload> {
    fn send_reload(&self, reload: Reload) {
        if self.send(reload).is_err() {
            debug!("No reload subscribers");
        }
    }
}

impl ReloadSink for mpsc::UnboundedSender<Reload> {
    fn send_reload(&self, reload: Reload) {
        if self.send(reload).is_err() {
            debug!("Reload receiver closed");
        }
    }
}
