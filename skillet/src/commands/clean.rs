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
pub struct CleanCommand {
    /// Path to skillet.toml (defaults to ./skillet.toml)
    #[arg(short, long, default_value = "skillet.toml")]
    pub config: PathBuf,

    /// Working directory that config paths resolve against
    #[arg(long, default_value = ".")]
    pub work_dir: PathBuf,

    /// Preview what would be deleted without actually deleting
    #[arg(long)]
    pub dry_run: bool,
}

impl CleanCommand {
    pub fn run(&self) -> Result<()> {
        let skillet_toml = SkilletToml::open(&self.config).unwrap_or_exit();
        let config = skillet_toml.config();

        let report = ops::clean(config, &self.work_dir, self.dry_run)?;
        report.render(&mut TerminalOutput::new());
        Ok(())
    }
}
