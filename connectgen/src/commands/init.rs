use std::path::PathBuf;

use clap::Args;
use connectgen_core::{File, WriteResult};
use connectgen_manifest::{DEFAULT_MANIFEST, MANIFEST_FILE};
use eyre::Result;

#[derive(Args)]
pub struct InitCommand {
    /// Directory to create connectgen.toml in
    #[arg(default_value = ".")]
    pub dir: PathBuf,
}

impl InitCommand {
    pub fn run(&self) -> Result<()> {
        let path = self.dir.join(MANIFEST_FILE);
        match File::new(path.clone(), DEFAULT_MANIFEST).if_missing().write()? {
            WriteResult::Written => {
                println!("Created {}", path.display());
                println!();
                println!("Next steps:");
                println!("  connectgen generate");
            }
            WriteResult::Skipped => println!("{} already exists", path.display()),
        }
        Ok(())
    }
}
