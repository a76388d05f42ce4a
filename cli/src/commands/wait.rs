//! `qabox wait <ip>` — run the readiness gate against an existing host.

use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Args;

use crate::app::AppContext;
use crate::application::services::readiness::{ReadinessOutcome, wait_ready};

#[derive(Args)]
pub struct WaitArgs {
    /// Public IP or hostname of the instance
    pub ip: String,
}

/// Run `qabox wait`.
///
/// # Errors
///
/// Returns an error if the SSH port never opens.
pub async fn run(app: &AppContext, args: &WaitArgs) -> Result<ExitCode> {
    let ctx = &app.output;
    let config = &app.config;
    std::fs::create_dir_all(&config.work_dir)
        .with_context(|| format!("creating directory {}", config.work_dir.display()))?;

    ctx.info(&format!("Waiting for {}...", args.ip));
    let outcome = wait_ready(
        &app.probe(),
        &app.remote(),
        &args.ip,
        &config.login_user,
        &config.readiness,
    )
    .await?;

    match outcome {
        ReadinessOutcome::Ready => {
            ctx.success(&format!("{} is ready.", args.ip));
            Ok(ExitCode::SUCCESS)
        }
        ReadinessOutcome::ShellUnresponsive { host, attempts } => {
            ctx.error(&format!(
                "Port is open but the shell on {host} did not answer after {attempts} attempts."
            ));
            Ok(ExitCode::FAILURE)
        }
    }
}
