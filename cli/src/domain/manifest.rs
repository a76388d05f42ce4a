//! Declarative, ordered initialization-script manifests.
//!
//! Step order and membership are data so they can be inspected in tests.
//! Steps run strictly in order, are not idempotent, and are never retried.

/// Remote directory every pushed file lands under.
pub const REMOTE_SHARE_DIR: &str = "/share";

/// Remote destination of the local `scripts/` directory.
pub const REMOTE_SCRIPTS_DIR: &str = "/share/scripts";

/// Remote destination of the rendered environment file.
pub const REMOTE_ENV_FILE: &str = "/share/env.sh";

/// Remote destination of a box's artifact bundle.
pub const REMOTE_ARTIFACTS_DIR: &str = "/share/artifacts";

/// An ordered list of scripts, relative to [`REMOTE_SCRIPTS_DIR`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScriptManifest {
    pub name: &'static str,
    pub steps: &'static [&'static str],
}

impl ScriptManifest {
    /// Absolute remote paths in execution order.
    #[must_use]
    pub fn remote_paths(&self) -> Vec<String> {
        self.steps
            .iter()
            .map(|step| format!("{REMOTE_SCRIPTS_DIR}/{step}"))
            .collect()
    }
}

/// Software stack baked into an image.
pub const IMAGE_INIT: ScriptManifest = ScriptManifest {
    name: "init-image",
    steps: &[
        "init-image/010-system.sh",
        "init-image/020-webservers.sh",
        "init-image/030-php.sh",
        "init-image/040-mysql.sh",
        "init-image/050-cache-engines.sh",
        "init-image/060-wp-cli.sh",
    ],
};

/// Per-box site setup on top of a built image.
pub const BOX_INIT: ScriptManifest = ScriptManifest {
    name: "init-box",
    steps: &[
        "init-box/010-env.sh",
        "init-box/020-wordpress.sh",
        "init-box/030-w3tc.sh",
        "init-box/040-qa-plugins.sh",
        "init-box/050-finalize.sh",
    ],
};

/// Remote command line that executes one script.
#[must_use]
pub fn script_command(remote_path: &str) -> String {
    format!("bash {remote_path}")
}
