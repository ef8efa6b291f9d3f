mod clean;
mod completions;
mod generate;
mod init;
mod watch;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use clean::CleanCommand;
use completions::CompletionsCommand;
use connectgen_manifest::{MANIFEST_FILE, Manifest};
use eyre::{Result, WrapErr, eyre};
use generate::GenerateCommand;
use init::InitCommand;
use watch::WatchCommand;

/// Extension trait for exiting on manifest errors with pretty formatting
pub(crate) trait UnwrapOrExit<T> {
    fn unwrap_or_exit(self) -> T;
}

impl<T> UnwrapOrExit<T> for connectgen_manifest::Result<T> {
    fn unwrap_or_exit(self) -> T {
        match self {
            Ok(v) => v,
            Err(e) => {
                eprintln!("{:?}", miette::Report::new(*e));
                std::process::exit(1);
            }
        }
    }
}

#[derive(Parser)]
#[command(name = "connectgen")]
#[command(version)]
#[command(about = "Generate a Connect RPC client registry from .proto files")]
pub(crate) struct Cli {
    /// Log at debug level (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

impl Cli {
    pub fn run(&self) -> Result<()> {
        match &self.command {
            Commands::Init(cmd) => cmd.run(),
            Commands::Generate(cmd) => cmd.run(),
            Commands::Watch(cmd) => cmd.run(),
            Commands::Clean(cmd) => cmd.run(),
            Commands::Completions(cmd) => cmd.run(),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Create a connectgen.toml with default settings
    Init(InitCommand),

    /// Run buf and write clients.ts once
    Generate(GenerateCommand),

    /// Generate, then regenerate whenever a .proto file changes
    Watch(WatchCommand),

    /// Remove the output directory
    Clean(CleanCommand),

    /// Generate shell completions
    Completions(CompletionsCommand),
}

/// Project location and the connectgen.toml overrides shared by several commands.
#[derive(Args)]
pub(crate) struct ProjectArgs {
    /// Path to connectgen.toml (defaults are used when it does not exist)
    #[arg(short, long, default_value = MANIFEST_FILE)]
    pub config: PathBuf,

    /// Directory of .proto files
    #[arg(long)]
    pub proto_path: Option<PathBuf>,

    /// Directory for generated clients
    #[arg(long)]
    pub out_dir: Option<PathBuf>,

    /// Extra flags appended verbatim to `buf generate`
    #[arg(long, allow_hyphen_values = true)]
    pub flags: Option<String>,

    /// Keep existing files in the output directory
    #[arg(long)]
    pub no_clean: bool,
}

/// A project root and its effective manifest.
pub(crate) struct Project {
    pub root: PathBuf,
    pub manifest: Manifest,
}

impl ProjectArgs {
    /// Read connectgen.toml, then apply command-line overrides.
    pub fn load(&self) -> Result<Project> {
        self.load_with(|_| {})
    }

    pub fn load_with(&self, customize: impl FnOnce(&mut Manifest)) -> Result<Project> {
        let root = std::env::current_dir().wrap_err("Failed to get current directory")?;
        let mut manifest = Manifest::from_file_or_default(root.join(&self.config)).unwrap_or_exit();

        let generate = &mut manifest.generate;
        if let Some(proto_path) = &self.proto_path {
            generate.proto_path = proto_path.clone();
        }
        if let Some(out_dir) = &self.out_dir {
            generate.out_dir = out_dir.clone();
        }
        if let Some(flags) = &self.flags {
            generate.extra_flags = flags.clone();
        }
        if self.no_clean {
            generate.clean = false;
        }
        customize(&mut manifest);

        manifest
            .validate()
            .map_err(|invalid| eyre!("Invalid {}: {}", invalid.key, invalid.message))?;

        Ok(Project { root, manifest })
    }
}
