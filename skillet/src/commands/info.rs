use std::path::PathBuf;

use clap::Args;
use eyre::Result;
use skillet_config::SkilletToml;

use super::UnwrapOrExit;
use crate::{
    ops,
    reports::{Report, TerminalOutput},
};

#[derive(Args)]
pub struct InfoCommand {
    /// Path to skillet.toml (defaults to ./skillet.toml)
    #[arg(short, long, default_value = "skillet.toml")]
    pub config: PathBuf,

    /// Working directory that config paths resolve against
    #[arg(long, default_value = ".")]
    pub work_dir: PathBuf,
}

impl InfoCommand {
    pub fn run(&self) -> Result<()> {
        let skillet_toml = SkilletToml::open(&self.config).unwrap_or_exit();
        let config = skillet_toml.config();

        let report = ops::info(config, &self.config, &self.work_dir);
        report.render(&mut TerminalOutput::new());
        Ok(())
    }
}
