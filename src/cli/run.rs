use std::process::ExitCode;

use anyhow::Result;

use super::{
    args::{Arguments, Command},
    commands::{extract::extract, init::init, manifest::manifest, project_root},
    exit_status::ExitStatus,
};
use crate::logging;

/// Dispatch the parsed arguments to their command.
///
/// Errors are returned for fatal problems (bad config, unreadable root); a
/// command that completes with problems returns [`ExitStatus::Failure`].
pub fn run_cli(args: Arguments) -> Result<ExitCode> {
    let Some(args) = args.with_command_or_help() else {
        return Ok(ExitStatus::Success.into());
    };

    if let Some(common) = args.common() {
        logging::init(&project_root(common)?, common.verbose)?;
    }

    let status = match args.command {
        Some(Command::Extract(cmd)) => extract(cmd)?,
        Some(Command::Manifest(cmd)) => manifest(cmd)?,
        Some(Command::Init(cmd)) => init(cmd)?,
        None => ExitStatus::Success,
    };
    Ok(status.into())
}
