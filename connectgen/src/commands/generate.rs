use clap::Args;
use connectgen_plugin::Generator;
use eyre::Result;

use super::ProjectArgs;
use crate::reports::{GenerateReport, Report, TerminalOutput};

#[derive(Args)]
pub struct GenerateCommand {
    #[command(flatten)]
    pub project: ProjectArgs,
}

impl GenerateCommand {
    pub fn run(&self) -> Result<()> {
        let project = self.project.load()?;
        let manifest = &project.manifest;

        let generator = Generator::new(
            &project.root,
            manifest.generation_config(),
            &manifest.toolchain(),
        );
        let generation = generator.generate()?;

        GenerateReport::new(&project.root, generation).render(&mut TerminalOutput::new());
        Ok(())
    }
}
