//! Infrastructure implementation of the `RemoteShell` port over OpenSSH.
//!
//! Host-key checking is disabled and keys are recorded in a private
//! `known_hosts` under the work directory. That trust-on-first-use posture is
//! only acceptable for the disposable test hosts this tool creates.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};

use crate::application::ports::{CommandOutput, CommandRunner, RemoteShell};
use crate::domain::Endpoint;
use crate::domain::config::SSH_CONNECT_TIMEOUT;

/// Runs `ssh` and `scp` through a `CommandRunner` with fixed connection options.
pub struct SshTransport<R: CommandRunner> {
    runner: R,
    known_hosts: PathBuf,
    timeout: Duration,
}

impl<R: CommandRunner> SshTransport<R> {
    pub fn new(runner: R, known_hosts: PathBuf, timeout: Duration) -> Self {
        Self {
            runner,
            known_hosts,
            timeout,
        }
    }

    /// Options shared by `ssh` and `scp`.
    fn connection_options(&self) -> Vec<String> {
        vec![
            "-o".to_owned(),
            "StrictHostKeyChecking=no".to_owned(),
            "-o".to_owned(),
            format!("UserKnownHostsFile={}", self.known_hosts.display()),
            "-o".to_owned(),
            "BatchMode=yes".to_owned(),
            "-o".to_owned(),
            format!("ConnectTimeout={}", SSH_CONNECT_TIMEOUT.as_secs()),
        ]
    }
}

impl<R: CommandRunner> RemoteShell for SshTransport<R> {
    async fn run_remote(&self, host: &str, command: &str) -> Result<CommandOutput> {
        let mut args = self.connection_options();
        args.push(host.to_owned());
        args.push(command.to_owned());
        let arg_refs: Vec<&str> = args.iter().map(String::as_str).collect();
        let output = self
            .runner
            .run_with_timeout("ssh", &arg_refs, self.timeout)
            .await
            .with_context(|| format!("ssh {host}"))?;
        Ok(CommandOutput::from(output))
    }

    async fn copy(&self, source: &Endpoint, dest: &Endpoint) -> Result<CommandOutput> {
        let mut args = vec!["-r".to_owned()];
        args.extend(self.connection_options());
        args.push(source.to_string());
        args.push(dest.to_string());
        let arg_refs: Vec<&str> = args.iter().map(String::as_str).collect();
        let output = self
            .runner
            .run_with_timeout("scp", &arg_refs, self.timeout)
            .await
            .with_context(|| format!("scp {source} {dest}"))?;
        let captured = CommandOutput::from(output);
        if !captured.success() {
            tracing::warn!(%source, %dest, output = %captured.text.trim(), "copy failed");
        }
        Ok(captured)
    }
}
