//! Command implementations

pub mod boxes;
pub mod image;
pub mod marker;
pub mod version;
pub mod wait;

use std::process::ExitCode;

use crate::application::services::pipeline::StepFailure;
use crate::output::OutputContext;

/// Summarize failed pipeline steps; any failure makes the run exit non-zero.
fn finish(ctx: &OutputContext, failed_steps: &[StepFailure]) -> ExitCode {
    if failed_steps.is_empty() {
        return ExitCode::SUCCESS;
    }
    ctx.error(&format!("{} step(s) failed:", failed_steps.len()));
    for failure in failed_steps {
        ctx.error(&format!("  {}", failure.step));
    }
    ExitCode::FAILURE
}
