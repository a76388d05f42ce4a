//! Domain types for provisioning configuration.
//!
//! Pure data only. Loading from the environment and disk lives in
//! `crate::infra::config`.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::domain::retry::RetryPolicy;

// ── Constants ────────────────────────────────────────────────────────────────

/// Prefix of the environment variables holding [`Ec2Settings`].
pub const EC2_ENV_PREFIX: &str = "W3TCQA_EC2_";

/// User the base image accepts logins for before the host fix runs.
pub const DEFAULT_LOGIN_USER: &str = "ubuntu";

/// Hard bound on a single remote shell or copy call.
pub const REMOTE_COMMAND_TIMEOUT: Duration = Duration::from_secs(600);

/// Bound on the secure shell handshake, so an unreachable host fails fast.
pub const SSH_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Bound on a single control-plane CLI call.
pub const CLOUD_COMMAND_TIMEOUT: Duration = Duration::from_secs(120);

// ── Launch profile ───────────────────────────────────────────────────────────

/// Instance launch settings, read from `W3TCQA_EC2_*` at launch time.
///
/// No defaults: every field is required.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct Ec2Settings {
    /// Too small instance types cause random failures (MySQL connection
    /// errors, HTTP 500) during box initialization.
    pub instance_type: String,
    pub key_name: String,
    /// Must not be the default group.
    pub security_group_id: String,
}

// ── Readiness ────────────────────────────────────────────────────────────────

/// Budgets for the two-phase readiness gate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadinessPolicy {
    pub ssh_port: u16,
    pub connect_timeout: Duration,
    pub port: RetryPolicy,
    pub functional: RetryPolicy,
    /// Command run remotely during the functional phase.
    pub probe_command: String,
    /// Literal the probe output must contain.
    pub probe_marker: String,
}

impl Default for ReadinessPolicy {
    fn default() -> Self {
        Self {
            ssh_port: 22,
            connect_timeout: Duration::from_secs(1),
            port: RetryPolicy::new(50, Duration::from_secs(5)),
            functional: RetryPolicy::new(50, Duration::from_secs(5)),
            probe_command: r#"echo "working""#.to_owned(),
            probe_marker: "working".to_owned(),
        }
    }
}

/// Default budget for waiting on a public IP after launch.
#[must_use]
pub fn default_ip_poll() -> RetryPolicy {
    RetryPolicy::new(50, Duration::from_secs(2))
}

// ── Provision configuration ──────────────────────────────────────────────────

/// Everything a run needs, built once at startup and passed by reference.
#[derive(Debug, Clone)]
pub struct ProvisionConfig {
    /// Holds `scripts/`, `images/<name>/`, and `boxes/<name>/`.
    pub env_dir: PathBuf,
    /// Transient state: run markers and the private `known_hosts`.
    pub work_dir: PathBuf,
    pub login_user: String,
    pub public_key_path: PathBuf,
    pub readiness: ReadinessPolicy,
    pub ip_poll: RetryPolicy,
    pub remote_timeout: Duration,
}

impl ProvisionConfig {
    /// Configuration with default budgets rooted at `env_dir`.
    #[must_use]
    pub fn new(env_dir: PathBuf, work_dir: PathBuf, public_key_path: PathBuf) -> Self {
        Self {
            env_dir,
            work_dir,
            login_user: DEFAULT_LOGIN_USER.to_owned(),
            public_key_path,
            readiness: ReadinessPolicy::default(),
            ip_poll: default_ip_poll(),
            remote_timeout: REMOTE_COMMAND_TIMEOUT,
        }
    }

    #[must_use]
    pub fn scripts_dir(&self) -> PathBuf {
        self.env_dir.join("scripts")
    }

    #[must_use]
    pub fn image_dir(&self, name: &str) -> PathBuf {
        self.env_dir.join("images").join(name)
    }

    #[must_use]
    pub fn box_dir(&self, name: &str) -> PathBuf {
        self.env_dir.join("boxes").join(name)
    }

    #[must_use]
    pub fn known_hosts_path(&self) -> PathBuf {
        self.work_dir.join("known_hosts")
    }

    /// `vars.yml` inside an image or box directory.
    #[must_use]
    pub fn vars_file(dir: &Path) -> PathBuf {
        dir.join("vars.yml")
    }
}
