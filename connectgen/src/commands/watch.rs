use std::path::PathBuf;

use clap::Args;
use connectgen_plugin::{Plugin, Reload, watch::watch_schemas};
use eyre::{Result, WrapErr};
use tokio::sync::broadcast;
use tracing::{info, warn};

use super::{Project, ProjectArgs};

#[derive(Args)]
pub struct WatchCommand {
    #[command(flatten)]
    pub project: ProjectArgs,

    /// Quiet period in milliseconds before regenerating
    #[arg(long)]
    pub debounce_ms: Option<u64>,
}

impl WatchCommand {
    pub fn run(&self) -> Result<()> {
        let project = self.project.load_with(|manifest| {
            if let Some(debounce_ms) = self.debounce_ms {
                manifest.watch.debounce_ms = debounce_ms;
            }
        })?;

        tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .wrap_err("Failed to start runtime")?
            .block_on(watch(project))
    }
}

async fn watch(project: Project) -> Result<()> {
    let proto_dir: PathBuf = project.root.join(&project.manifest.generate.proto_path);
    let (_watcher, events) = watch_schemas(&proto_dir)?;
    let plugin = Plugin::new(&project.root, &project.manifest);

    // One JSON line per reload on stdout, for the dev server to pick up.
    let (reload_tx, mut reload_rx) = broadcast::channel::<Reload>(16);
    tokio::spawn(async move {
        loop {
            match reload_rx.recv().await {
                Ok(reload) => match reload.to_json() {
                    Ok(line) => println!("{line}"),
                    Err(err) => warn!("Failed to encode reload: {err}"),
                },
                Err(broadcast::error::RecvError::Lagged(_)) => continue,
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    });

    info!("Watching {}", proto_dir.display());
    tokio::select! {
        result = plugin.watch(events, reload_tx) => result,
        signal = tokio::signal::ctrl_c() => {
            signal.wrap_err("Failed to listen for ctrl-c")?;
            info!("Stopped watching");
            Ok(())
        }
    }
}
