use clap::Args;
use connectgen_plugin::clean_out_dir;
use eyre::Result;

use super::ProjectArgs;
use crate::reports::{CleanReport, Report, TerminalOutput};

#[derive(Args)]
pub struct CleanCommand {
    #[command(flatten)]
    pub project: ProjectArgs,
}

impl CleanCommand {
    pub fn run(&self) -> Result<()> {
        let project = self.project.load()?;
        let out_dir = &project.manifest.generate.out_dir;
        let removed = clean_out_dir(&project.root.join(out_dir))?;

        CleanReport {
            out_dir: out_dir.display().to_string(),
            removed,
        }
        .render(&mut TerminalOutput::new());
        Ok(())
    }
}
