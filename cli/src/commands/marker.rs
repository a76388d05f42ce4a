//! `qabox marker` — inspect run markers.

use std::process::ExitCode;

use clap::Subcommand;

use crate::app::AppContext;
use crate::infra::marker::RunMarker;

#[derive(Subcommand)]
pub enum MarkerCommand {
    /// Exit 0 if a marker exists for PID, 1 otherwise
    Check {
        /// Process id of the run
        pid: u32,
    },
}

/// Run `qabox marker`.
#[must_use]
pub fn run(app: &AppContext, cmd: &MarkerCommand) -> ExitCode {
    match cmd {
        MarkerCommand::Check { pid } => {
            let marker = RunMarker::with_pid(&app.config.work_dir, *pid);
            if marker.is_file_exists() {
                app.output.success(&format!("{}", marker.path().display()));
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            }
        }
    }
}
