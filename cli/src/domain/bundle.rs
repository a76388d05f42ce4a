//! Flat key/value configuration bundles read from `vars.yml`.
//!
//! Pure functions only. No I/O, no async, no filesystem access.

use std::collections::BTreeMap;

use anyhow::{Context, Result};

use crate::domain::error::ConfigError;

/// Key holding the base image id an image is built from.
pub const KEY_BASE_IMAGE: &str = "W3D_AWS_AMI";

/// Key holding the short name of the image a box is launched from.
pub const KEY_BOX_IMAGE: &str = "W3D_IMAGE";

/// A flat string→string mapping, consumed once per run and never mutated.
///
/// Keys are kept sorted so the rendered environment file is stable.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigBundle {
    source_name: String,
    values: BTreeMap<String, String>,
}

impl ConfigBundle {
    /// Build a bundle from an already-flat map.
    #[must_use]
    pub fn new(source_name: impl Into<String>, values: BTreeMap<String, String>) -> Self {
        Self {
            source_name: source_name.into(),
            values,
        }
    }

    /// Parse a YAML mapping. Scalars are stringified, `null` becomes an empty
    /// string, nested sequences or mappings are rejected.
    ///
    /// # Errors
    ///
    /// Returns an error if the document is not a mapping or holds a nested value.
    pub fn from_yaml(source_name: &str, content: &str) -> Result<Self> {
        let raw: BTreeMap<String, serde_yaml::Value> = if content.trim().is_empty() {
            BTreeMap::new()
        } else {
            serde_yaml::from_str(content).with_context(|| format!("cannot parse {source_name}"))?
        };

        let mut values = BTreeMap::new();
        for (key, value) in raw {
            let flat = match value {
                serde_yaml::Value::String(s) => s,
                serde_yaml::Value::Number(n) => n.to_string(),
                serde_yaml::Value::Bool(b) => b.to_string(),
                serde_yaml::Value::Null => String::new(),
                _ => {
                    return Err(ConfigError::NotFlat {
                        key,
                        source_name: source_name.to_owned(),
                    }
                    .into());
                }
            };
            values.insert(key, flat);
        }
        Ok(Self::new(source_name, values))
    }

    /// Where the bundle was read from, used in error messages.
    #[must_use]
    pub fn source_name(&self) -> &str {
        &self.source_name
    }

    /// Look up a required key.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::MissingKey` if the key is absent.
    pub fn get(&self, key: &str) -> Result<&str, ConfigError> {
        self.values
            .get(key)
            .map(String::as_str)
            .ok_or_else(|| ConfigError::MissingKey {
                key: key.to_owned(),
                source_name: self.source_name.clone(),
            })
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Render the bundle as a sourceable shell file of `export` lines.
    #[must_use]
    pub fn render_env_file(&self) -> String {
        let mut out = String::new();
        for (key, value) in &self.values {
            out.push_str("export ");
            out.push_str(key);
            out.push('=');
            out.push_str(&shell_quote(value));
            out.push('\n');
        }
        out
    }
}

/// Single-quote `value` for POSIX shells.
#[must_use]
pub fn shell_quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', r"'\''"))
}
