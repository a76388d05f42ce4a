//! Configuration loading: launch settings from the environment, bundles and
//! the public key from disk.

use std::path::Path;

use anyhow::{Context, Result};

use crate::domain::config::EC2_ENV_PREFIX;
use crate::domain::{ConfigBundle, ConfigError, Ec2Settings, ProvisionConfig};

/// Read `W3TCQA_EC2_INSTANCE_TYPE`, `W3TCQA_EC2_KEY_NAME`, and
/// `W3TCQA_EC2_SECURITY_GROUP_ID`.
///
/// # Errors
///
/// Returns `ConfigError::MissingLaunchProfile` (with the missing field as
/// cause) if any variable is unset.
pub fn load_ec2_settings() -> Result<Ec2Settings> {
    envy::prefixed(EC2_ENV_PREFIX)
        .from_env::<Ec2Settings>()
        .context(ConfigError::MissingLaunchProfile)
}

/// Parse `<dir>/vars.yml` into a flat bundle.
///
/// # Errors
///
/// Returns an error if the file is missing, unreadable, or not a flat mapping.
pub fn load_bundle(dir: &Path) -> Result<ConfigBundle> {
    let path = ProvisionConfig::vars_file(dir);
    let content = std::fs::read_to_string(&path)
        .with_context(|| format!("cannot read {}", path.display()))?;
    ConfigBundle::from_yaml(&path.display().to_string(), &content)
}

/// Read the local public key that gets authorized for `root` on instances.
///
/// # Errors
///
/// Returns an error if the file cannot be read or is empty.
pub fn read_public_key(path: &Path) -> Result<String> {
    let key = std::fs::read_to_string(path)
        .with_context(|| format!("cannot read public key {}", path.display()))?;
    let key = key.trim();
    anyhow::ensure!(!key.is_empty(), "public key {} is empty", path.display());
    Ok(key.to_owned())
}
