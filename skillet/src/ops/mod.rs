//! Operations behind the CLI commands.
//!
//! Commands parse arguments, ops do the work and build reports, reports
//! render to an output target.

mod check;
mod clean;
pub mod generate;
mod info;

pub use check::check;
pub use clean::clean;
pub use generate::generate;
pub use info::info;
