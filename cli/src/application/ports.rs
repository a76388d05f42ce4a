//! Port trait definitions for the Application layer.
//!
//! Ports are the interfaces (contracts) that infrastructure must fulfill.
//! This file imports only from `crate::domain` — never from `crate::infra`,
//! `crate::commands`, or `crate::output`.

use std::process::{ExitStatus, Output};
use std::time::Duration;

use anyhow::Result;

use crate::domain::{Endpoint, ImageDeletion, InstanceDescriptor};

// ── Value Types ───────────────────────────────────────────────────────────────

/// Exit status plus captured text (stdout followed by stderr).
///
/// Callers decide success by inspecting both; a non-zero status is not an
/// error at this layer.
#[derive(Debug, Clone)]
pub struct CommandOutput {
    pub status: ExitStatus,
    pub text: String,
}

impl CommandOutput {
    #[must_use]
    pub fn success(&self) -> bool {
        self.status.success()
    }
}

impl From<&Output> for CommandOutput {
    fn from(output: &Output) -> Self {
        let mut text = String::from_utf8_lossy(&output.stdout).into_owned();
        text.push_str(&String::from_utf8_lossy(&output.stderr));
        Self {
            status: output.status,
            text,
        }
    }
}

impl From<Output> for CommandOutput {
    fn from(output: Output) -> Self {
        Self::from(&output)
    }
}

/// Decode a command's stdout as JSON.
///
/// Unparseable output is logged and degraded to an empty object. Callers
/// must read an empty object as "unknown", not as a verified empty answer.
#[must_use]
pub fn decode_json_or_empty(output: &Output) -> serde_json::Value {
    match serde_json::from_slice(&output.stdout) {
        Ok(value) => value,
        Err(e) => {
            tracing::warn!(
                error = %e,
                raw = %CommandOutput::from(output).text,
                "command output is not valid JSON"
            );
            serde_json::Value::Object(serde_json::Map::new())
        }
    }
}

// ── Command Runner Port ───────────────────────────────────────────────────────

/// Abstracts process execution so infrastructure can be swapped or mocked.
///
/// Commands are argument vectors passed to the program untouched; no local
/// shell sees them. A literal shell line is run as `sh -c <line>`, and lines
/// meant for an instance go through [`RemoteShell::run_remote`], where the
/// remote login shell interprets them.
#[allow(async_fn_in_trait)]
pub trait CommandRunner {
    /// Run a program and capture its output.
    ///
    /// Implementations should delegate to `run_with_timeout` using the
    /// instance's configured default timeout.
    async fn run(&self, program: &str, args: &[&str]) -> Result<Output>;
    /// Run a program with a custom timeout override.
    ///
    /// # Errors
    ///
    /// Returns an error if the process cannot be spawned or exceeds `timeout`.
    /// On timeout, the child process must be killed (not left orphaned).
    async fn run_with_timeout(
        &self,
        program: &str,
        args: &[&str],
        timeout: Duration,
    ) -> Result<Output>;
    /// Run a program and decode its stdout as JSON, see [`decode_json_or_empty`].
    ///
    /// # Errors
    ///
    /// Returns an error only if the process cannot be run at all.
    async fn run_json(&self, program: &str, args: &[&str]) -> Result<serde_json::Value> {
        let output = self.run(program, args).await?;
        Ok(decode_json_or_empty(&output))
    }
}

impl<T: CommandRunner> CommandRunner for &T {
    async fn run(&self, program: &str, args: &[&str]) -> Result<Output> {
        (**self).run(program, args).await
    }

    async fn run_with_timeout(
        &self,
        program: &str,
        args: &[&str],
        timeout: Duration,
    ) -> Result<Output> {
        (**self).run_with_timeout(program, args, timeout).await
    }

    async fn run_json(&self, program: &str, args: &[&str]) -> Result<serde_json::Value> {
        (**self).run_json(program, args).await
    }
}

// ── Remote Access Port ────────────────────────────────────────────────────────

/// Remote command execution and file copy over the secure shell transport.
#[allow(async_fn_in_trait)]
pub trait RemoteShell {
    /// Run `command` on `host` (`user@address`). A non-zero remote exit
    /// status is returned, not raised.
    async fn run_remote(&self, host: &str, command: &str) -> Result<CommandOutput>;
    /// Recursive copy. At most one side is remote in practice.
    async fn copy(&self, source: &Endpoint, dest: &Endpoint) -> Result<CommandOutput>;
}

// ── Cloud Control Port ────────────────────────────────────────────────────────

/// Control-plane operations. All calls block until the provider answers.
#[allow(async_fn_in_trait)]
pub trait CloudControl {
    /// Deregister the first image named `name` and delete its first snapshot.
    async fn delete_image(&self, name: &str) -> Result<ImageDeletion>;
    /// Look up the id of the image named `name`.
    ///
    /// # Errors
    ///
    /// Returns `CloudError::ImageNotFound` when no image matches.
    async fn resolve_image_id(&self, name: &str) -> Result<String>;
    /// Launch and tag one instance, then wait for its public IP.
    async fn launch_instance(&self, image_id: &str, display_name: &str)
    -> Result<InstanceDescriptor>;
    /// Request termination without waiting for it.
    async fn terminate_instance(&self, instance_id: &str) -> Result<()>;
    /// Request image creation without waiting for it to leave `pending`.
    async fn create_image(&self, instance_id: &str, name: &str) -> Result<()>;
    /// Ids of pending or running instances carrying the box type tag.
    async fn list_box_instances(&self) -> Result<Vec<String>>;
}

// ── Network Probe Port ────────────────────────────────────────────────────────

/// Abstracts network connectivity checks so application services can be tested
/// without real network access.
#[allow(async_fn_in_trait)]
pub trait NetworkProbe {
    /// Check TCP connectivity to the given host and port.
    async fn check_tcp_connectivity(&self, host: &str, port: u16) -> Result<bool>;
}

// ── Progress Reporting Port ───────────────────────────────────────────────────

/// Abstracts progress reporting so services can emit events without
/// depending on the Presentation layer. Sync trait — no async needed.
pub trait ProgressReporter {
    /// Emit an in-progress step message.
    fn step(&self, message: &str);
    /// Emit a success message.
    fn success(&self, message: &str);
    /// Emit a warning message.
    fn warn(&self, message: &str);
}
