//! One generation cycle: clean, compile, extract, synthesize, format.

use std::path::{Path, PathBuf};

use connectgen_buf::{CompiledFile, Runner, TemplateSource};
use connectgen_core::GeneratedFile;
use connectgen_manifest::{GenerationConfig, Toolchain};
use connectgen_typescript::{
    ClientsTs, Formatter, RegistryModule, ServiceDescriptor, SkippedFile, extract_services,
};
use eyre::{Result, WrapErr, eyre};
use tracing::info;

use crate::watch::Regenerate;

/// What a successful cycle produced.
#[derive(Debug, Clone)]
pub struct Generation {
    pub template: TemplateSource,
    pub services: Vec<ServiceDescriptor>,
    pub skipped: Vec<SkippedFile>,
    /// Path of the written clients.ts
    pub clients: PathBuf,
}

/// Runs generation cycles for one project root.
#[derive(Debug, Clone)]
pub struct Generator {
    config: GenerationConfig,
    runner: Runner,
    formatter: Option<Formatter>,
}

impl Generator {
    pub fn new(root: impl Into<PathBuf>, config: GenerationConfig, toolchain: &Toolchain) -> Self {
        Self {
            config,
            runner: Runner::new(root).with_compiler(toolchain.compiler.clone()),
            formatter: toolchain.formatter.as_deref().and_then(Formatter::parse),
        }
    }

    pub fn config(&self) -> &GenerationConfig {
        &self.config
    }

    pub fn root(&self) -> &Path {
        self.runner.root()
    }

    /// The output directory resolved against the project root.
    pub fn out_dir(&self) -> PathBuf {
        self.root().join(&self.config.out_dir)
    }

    /// Run one cycle. Only a compiler or filesystem failure is an error;
    /// files without services are reported in [`Generation::skipped`].
    pub fn generate(&self) -> Result<Generation> {
        let out_dir = self.out_dir();
        if self.config.clean {
            self.config.validate().map_err(|invalid| {
                eyre!("Refusing to clean {}: {}", out_dir.display(), invalid.message)
            })?;
            clean_out_dir(&out_dir)?;
        }

        let run = self.runner.run(
            &self.config.proto_path,
            &self.config.out_dir,
            &self.config.extra_flags,
        )?;

        let files: Vec<PathBuf> = run.files.into_iter().map(CompiledFile::into_path).collect();
        let extraction = extract_services(&out_dir, &files);

        let clients = ClientsTs::new(RegistryModule::new(&extraction.services));
        clients.write(&out_dir)?;
        let clients_path = clients.path(&out_dir);

        if let Some(formatter) = &self.formatter {
            formatter.format(self.root(), &clients_path);
        }

        info!(
            "Generated {} with {} service(s)",
            clients_path.display(),
            extraction.services.len()
        );

        Ok(Generation {
            template: run.template,
            services: extraction.services,
            skipped: extraction.skipped,
            clients: clients_path,
        })
    }
}

impl Regenerate for Generator {
    fn regenerate(&mut self) -> Result<()> {
        self.generate().map(|_| ())
    }
}

/// Remove the output directory and everything in it. Missing is fine.
pub fn clean_out_dir(out_dir: &Path) -> Result<bool> {
    if !out_dir.exists() {
        return Ok(false);
    }
    std::fs::remove_dir_all(out_dir)
        .wrap_err_with(|| format!("Failed to clean {}", out_dir.display()))?;
    Ok(true)
}
