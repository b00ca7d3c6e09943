use std::path::PathBuf;

use clap::Args;
use eyre::Result;

use crate::{
    ops,
    reports::{Report, TerminalOutput},
};

#[derive(Args)]
pub struct CheckCommand {
    /// Path to a skillet.toml (repeatable)
    #[arg(short, long = "config", default_value = "skillet.toml")]
    pub configs: Vec<PathBuf>,
}

impl CheckCommand {
    pub fn run(&self) -> Result<()> {
        let report = ops::check(&self.configs);
        report.render(&mut TerminalOutput::new());

        if !report.is_valid() {
            std::process::exit(1);
        }
        Ok(())
    }
}
