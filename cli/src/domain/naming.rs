//! Naming rules for images and instances.
//!
//! The human-readable image name is the logical key of an image; the
//! provider-assigned id is looked up from it.

use std::sync::LazyLock;

use regex::Regex;

use crate::domain::error::ConfigError;

/// Prefix shared by every image and instance this tool creates.
pub const NAME_PREFIX: &str = "w3tcqa-";

/// Value of the `Type` tag put on every launched instance.
pub const INSTANCE_TYPE_TAG: &str = "w3tcqa-box";

static SHORT_NAME_RE: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^[a-z0-9][a-z0-9-]{0,62}$").ok());

/// Validates an image or box short name.
///
/// # Errors
///
/// Returns `ConfigError::InvalidName` if the name is empty, too long, or
/// contains characters outside `[a-z0-9-]`.
pub fn validate_short_name(name: &str) -> Result<(), ConfigError> {
    let valid = SHORT_NAME_RE
        .as_ref()
        .is_some_and(|re| re.is_match(name));
    if valid {
        Ok(())
    } else {
        Err(ConfigError::InvalidName(name.to_owned()))
    }
}

/// `foo` → `w3tcqa-foo`.
#[must_use]
pub fn image_name(short: &str) -> String {
    format!("{NAME_PREFIX}{short}")
}

/// Display name of the temporary instance an image is captured from.
#[must_use]
pub fn seed_instance_name(short: &str) -> String {
    format!("{NAME_PREFIX}amisource-{short}")
}

#[must_use]
pub fn box_instance_name(short: &str) -> String {
    format!("{NAME_PREFIX}box-{short}")
}
