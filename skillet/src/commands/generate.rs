use std::path::PathBuf;
use std::time::Duration;

use clap::Args;
use eyre::Result;
use skillet_config::{JdbcOverrides, SkilletToml, ensure_distinct_output_dirs};

use super::UnwrapOrExit;
use crate::{
    ops,
    reports::{Report, TerminalOutput},
};

#[derive(Args)]
pub struct GenerateCommand {
    /// Path to a skillet.toml (repeatable for multiple tasks)
    #[arg(short, long = "config", default_value = "skillet.toml")]
    pub configs: Vec<PathBuf>,

    /// Working directory that config paths resolve against
    #[arg(long, default_value = ".")]
    pub work_dir: PathBuf,

    /// Regenerate even when outputs are up to date
    #[arg(long)]
    pub force: bool,

    /// Kill the engine after this many seconds
    #[arg(long)]
    pub timeout: Option<u64>,

    /// Override the database JDBC url
    #[arg(long)]
    pub url: Option<String>,

    /// Override the database user
    #[arg(long)]
    pub user: Option<String>,

    /// Override the password environment variable name
    #[arg(long)]
    pub password_env: Option<String>,
}

impl GenerateCommand {
    pub fn run(&self) -> Result<()> {
        let mut configs = Vec::new();
        for path in &self.configs {
            let skillet_toml = SkilletToml::open(path).unwrap_or_exit();
            configs.push((path.clone(), skillet_toml.into_config()));
        }

        let parsed: Vec<_> = configs.iter().map(|(_, c)| c.clone()).collect();
        ensure_distinct_output_dirs(&parsed).unwrap_or_exit();

        let overrides = JdbcOverrides {
            url: self.url.clone(),
            user: self.user.clone(),
            password_env: self.password_env.clone(),
        };

        let report = ops::generate(
            configs,
            ops::generate::GenerateOptions {
                work_dir: &self.work_dir,
                force: self.force,
                timeout: self.timeout.map(Duration::from_secs),
                overrides,
            },
        );

        report.render(&mut TerminalOutput::new());

        let failed = report.failed_count();
        if failed > 0 {
            eyre::bail!("{failed} of {} generation tasks failed", report.tasks.len());
        }
        Ok(())
    }
}
