//! Domain layer — pure business logic, types, and validation.
//!
//! This module has zero imports from `crate::infra`, `crate::commands`,
//! `crate::application`, `tokio`, `std::fs`, `std::process`, or `std::net`.
//! All functions are synchronous and take data in, returning data out.

pub mod bundle;
pub mod config;
pub mod error;
pub mod instance;
pub mod manifest;
pub mod naming;
pub mod retry;

pub use bundle::ConfigBundle;
pub use config::{Ec2Settings, ProvisionConfig, ReadinessPolicy};
pub use error::{CloudError, ConfigError, ReadinessError};
pub use instance::{Endpoint, ImageDeletion, InstanceDescriptor};
pub use manifest::{BOX_INIT, IMAGE_INIT, ScriptManifest};
pub use retry::RetryPolicy;
