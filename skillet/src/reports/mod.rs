//! Report data structures for commands.
//!
//! Commands build reports, then render them to an Output target, keeping
//! data collection separate from terminal formatting.

mod check;
mod clean;
mod generate;
mod info;
mod output;

pub use check::{CheckReport, CheckedFile};
pub use clean::CleanReport;
pub use generate::{GenerateReport, TaskResult, TaskStatus};
pub use info::{InfoReport, ManifestInfo};
pub use output::{Output, Report, TerminalOutput};
