//! The plugin value and its dev-server hooks.

use std::{path::PathBuf, time::Duration};

use connectgen_manifest::{GenerationConfig, Manifest, Toolchain};
use eyre::{Result, WrapErr, eyre};
use tokio::sync::mpsc;

use crate::{
    generate::{Generation, Generator},
    watch::{ChangeFilter, Orchestrator, ReloadSink, WatchEvent},
};

/// Whether the initial generation has run for this plugin.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Lifecycle {
    #[default]
    NotStarted,
    Ready,
}

/// One project's generator together with its lifecycle state.
#[derive(Debug, Clone)]
pub struct Plugin {
    generator: Generator,
    debounce: Duration,
    lifecycle: Lifecycle,
}

impl Plugin {
    pub fn new(root: impl Into<PathBuf>, manifest: &Manifest) -> Self {
        Self::with_config(
            root,
            manifest.generation_config(),
            &manifest.toolchain(),
            manifest.debounce(),
        )
    }

    pub fn with_config(
        root: impl Into<PathBuf>,
        config: GenerationConfig,
        toolchain: &Toolchain,
        debounce: Duration,
    ) -> Self {
        Self {
            generator: Generator::new(root, config, toolchain),
            debounce,
            lifecycle: Lifecycle::NotStarted,
        }
    }

    pub fn lifecycle(&self) -> Lifecycle {
        self.lifecycle
    }

    pub fn generator(&self) -> &Generator {
        &self.generator
    }

    /// Pre-build hook. Runs the first generation cycle; later calls do nothing
    /// and return `None`.
    ///
    /// The plugin is `Ready` after the first call even if that cycle failed.
    pub fn config_resolved(&mut self) -> Result<Option<Generation>> {
        if self.lifecycle == Lifecycle::Ready {
            return Ok(None);
        }
        self.lifecycle = Lifecycle::Ready;
        self.generator.generate().map(Some)
    }

    /// File-change hook. Regenerates on accepted `events` and signals `sink`
    /// until the event stream ends.
    ///
    /// Runs [`config_resolved`](Self::config_resolved) first if it has not
    /// run yet; its failure is returned before any event is read.
    pub async fn watch<S: ReloadSink>(
        mut self,
        events: mpsc::Receiver<WatchEvent>,
        sink: S,
    ) -> Result<()> {
        if self.lifecycle == Lifecycle::NotStarted {
            let (plugin, initial) = tokio::task::spawn_blocking(move || {
                let initial = self.config_resolved();
                (self, initial)
            })
            .await
            .wrap_err("Initial generation panicked")?;
            self = plugin;
            initial?;
        }

        let config = self.generator.config();
        let filter = ChangeFilter::new(self.generator.root(), &config.out_dir);
        Orchestrator::new(self.generator, filter, sink, self.debounce)
            .run(events)
            .await
            .ok_or_else(|| eyre!("Regeneration task panicked"))?;
        Ok(())
    }
}
