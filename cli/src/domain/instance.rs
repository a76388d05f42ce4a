//! Instance, image, and copy-endpoint value types.

use std::fmt;

/// A launched instance. Created by the cloud adapter, never mutated; the
/// remote instance itself outlives this value and is managed out-of-band.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstanceDescriptor {
    pub instance_id: String,
    /// Public IPv4 address. Always set once `launch_instance` returns.
    pub public_ip: String,
}

impl InstanceDescriptor {
    /// `user@ip` login target for the remote shell.
    #[must_use]
    pub fn login(&self, user: &str) -> String {
        format!("{user}@{}", self.public_ip)
    }
}

/// Result of `delete_image`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageDeletion {
    /// The lookup answered and no image with that name exists.
    NotFound,
    /// The first matching image was deregistered and its first snapshot deleted.
    Deleted {
        image_id: String,
        snapshot_id: Option<String>,
    },
}

/// One side of a copy: a local path or `host:path` on a remote machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    pub host: Option<String>,
    pub path: String,
}

impl Endpoint {
    #[must_use]
    pub fn local(path: impl Into<String>) -> Self {
        Self {
            host: None,
            path: path.into(),
        }
    }

    #[must_use]
    pub fn remote(host: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            host: Some(host.into()),
            path: path.into(),
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.host {
            Some(host) => write!(f, "{host}:{}", self.path),
            None => f.write_str(&self.path),
        }
    }
}
