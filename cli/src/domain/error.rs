//! Typed domain error enums.
//!
//! All error types implement `thiserror::Error` and convert to `anyhow::Error`
//! via the `?` operator.

use thiserror::Error;

// ── Config errors ─────────────────────────────────────────────────────────────

/// Errors raised while reading configuration bundles and launch settings.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing key '{key}' in {source_name}")]
    MissingKey { key: String, source_name: String },

    #[error("Key '{key}' in {source_name} must be a scalar value (bundles are flat)")]
    NotFlat { key: String, source_name: String },

    #[error("Invalid name '{0}': must match ^[a-z0-9][a-z0-9-]{{0,62}}$")]
    InvalidName(String),

    #[error(
        "EC2 launch settings are not configured. Set W3TCQA_EC2_INSTANCE_TYPE, \
         W3TCQA_EC2_KEY_NAME and W3TCQA_EC2_SECURITY_GROUP_ID."
    )]
    MissingLaunchProfile,
}

// ── Cloud errors ──────────────────────────────────────────────────────────────

/// Unrecoverable control-plane conditions.
#[derive(Debug, Error)]
pub enum CloudError {
    #[error("Image '{0}' not found")]
    ImageNotFound(String),

    #[error("Instance {instance_id} has no public IP after {attempts} attempts")]
    IpNotAssigned { instance_id: String, attempts: u32 },

    #[error("Unexpected response from {operation}: {detail}")]
    MalformedResponse {
        operation: &'static str,
        detail: String,
    },
}

// ── Readiness errors ──────────────────────────────────────────────────────────

/// Readiness budgets exhausted.
#[derive(Debug, Error)]
pub enum ReadinessError {
    #[error("Port {port} on {host} is still not open after {attempts} attempts")]
    PortClosed { host: String, port: u16, attempts: u32 },

    #[error("Remote shell on {host} did not answer after {attempts} attempts")]
    ShellUnresponsive { host: String, attempts: u32 },
}
