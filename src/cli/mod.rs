//! Command-line layer: argument parsing, command dispatch and output.

mod args;
mod commands;
mod exit_status;
mod report;
mod run;

pub use args::{Arguments, Command, CommonArgs};
pub use exit_status::ExitStatus;
pub use run::run_cli;
