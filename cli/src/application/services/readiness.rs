//! Two-phase readiness gate for freshly launched instances.
//!
//! The port phase proves a network path exists; the functional phase proves
//! the remote shell daemon actually answers. The former can succeed while
//! sshd is still initializing.

use anyhow::Result;

use crate::application::ports::{NetworkProbe, RemoteShell};
use crate::application::retry::{RetryOutcome, retry};
use crate::domain::{ReadinessError, ReadinessPolicy};

/// Outcome of the functional phase. Exhaustion is reported, not raised.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FunctionalOutcome {
    Ready { attempts: u32 },
    Exhausted { attempts: u32 },
}

/// Outcome of the composite gate once the port is known to be open.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadinessOutcome {
    Ready,
    ShellUnresponsive { host: String, attempts: u32 },
}

impl ReadinessOutcome {
    /// Treat an unresponsive shell as terminal.
    ///
    /// # Errors
    ///
    /// Returns `ReadinessError::ShellUnresponsive` for that outcome.
    pub fn require_ready(self) -> Result<()> {
        match self {
            Self::Ready => Ok(()),
            Self::ShellUnresponsive { host, attempts } => {
                Err(ReadinessError::ShellUnresponsive { host, attempts }.into())
            }
        }
    }
}

/// Poll until a TCP connection to the SSH port succeeds.
///
/// Returns the attempt number that succeeded.
///
/// # Errors
///
/// Returns `ReadinessError::PortClosed` once the budget is exhausted.
pub async fn wait_port(probe: &impl NetworkProbe, ip: &str, policy: &ReadinessPolicy) -> Result<u32> {
    let port = policy.ssh_port;
    let outcome = retry(policy.port, |attempt| async move {
        match probe.check_tcp_connectivity(ip, port).await {
            Ok(true) => Some(()),
            Ok(false) => {
                tracing::info!(%ip, port, attempt, "port not ready");
                None
            }
            Err(e) => {
                tracing::info!(%ip, port, attempt, error = %e, "port not ready");
                None
            }
        }
    })
    .await;

    match outcome {
        RetryOutcome::Succeeded { attempts, .. } => {
            tracing::info!(%ip, port, attempts, "port is open");
            Ok(attempts)
        }
        RetryOutcome::Exhausted { attempts } => Err(ReadinessError::PortClosed {
            host: ip.to_owned(),
            port,
            attempts,
        }
        .into()),
    }
}

/// Poll until the probe command's output contains the expected marker.
pub async fn wait_functional(
    remote: &impl RemoteShell,
    login: &str,
    policy: &ReadinessPolicy,
) -> FunctionalOutcome {
    let command = policy.probe_command.as_str();
    let marker = policy.probe_marker.as_str();
    let outcome = retry(policy.functional, |attempt| async move {
        match remote.run_remote(login, command).await {
            Ok(out) if out.text.contains(marker) => Some(()),
            Ok(_) => {
                tracing::info!(%login, attempt, "ssh doesn't work yet");
                None
            }
            Err(e) => {
                tracing::info!(%login, attempt, error = %e, "ssh doesn't work yet");
                None
            }
        }
    })
    .await;

    match outcome {
        RetryOutcome::Succeeded { attempts, .. } => FunctionalOutcome::Ready { attempts },
        RetryOutcome::Exhausted { attempts } => FunctionalOutcome::Exhausted { attempts },
    }
}

/// Port phase, then functional phase, strictly in sequence.
///
/// # Errors
///
/// Returns an error only if the port phase exhausts its budget; functional
/// exhaustion is surfaced as [`ReadinessOutcome::ShellUnresponsive`].
pub async fn wait_ready(
    probe: &impl NetworkProbe,
    remote: &impl RemoteShell,
    ip: &str,
    login_user: &str,
    policy: &ReadinessPolicy,
) -> Result<ReadinessOutcome> {
    wait_port(probe, ip, policy).await?;
    let login = format!("{login_user}@{ip}");
    Ok(match wait_functional(remote, &login, policy).await {
        FunctionalOutcome::Ready { .. } => ReadinessOutcome::Ready,
        FunctionalOutcome::Exhausted { attempts } => ReadinessOutcome::ShellUnresponsive {
            host: login,
            attempts,
        },
    })
}
