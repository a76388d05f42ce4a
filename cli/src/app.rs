//! Application context — unified state passed to every command handler.
//!
//! Built once in `Cli::run()`. Adapters are constructed on demand so that
//! commands which never launch an instance do not require launch settings.

use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::domain::ProvisionConfig;
use crate::infra::aws::AwsCli;
use crate::infra::command_runner::TokioCommandRunner;
use crate::infra::config::load_ec2_settings;
use crate::infra::marker::RunMarker;
use crate::infra::network::TokioNetworkProbe;
use crate::infra::ssh::SshTransport;
use crate::output::{OutputContext, TerminalReporter};

/// Flags passed from the top-level CLI to `AppContext::new`.
pub struct AppFlags {
    /// Disable ANSI color output.
    pub no_color: bool,
    /// Suppress non-error output.
    pub quiet: bool,
    pub env_dir: PathBuf,
    /// Defaults to `<env_dir>/working`.
    pub work_dir: Option<PathBuf>,
    /// Defaults to `~/.ssh/id_rsa.pub`.
    pub public_key: Option<PathBuf>,
}

/// Unified application context passed to every command handler.
pub struct AppContext {
    /// Terminal output context (colors, quiet mode).
    pub output: OutputContext,
    pub config: ProvisionConfig,
}

impl AppContext {
    /// Construct an `AppContext` from top-level CLI flags.
    ///
    /// # Errors
    ///
    /// Returns an error if no public key path was given and the home
    /// directory cannot be determined.
    pub fn new(flags: AppFlags) -> Result<Self> {
        let public_key = match flags.public_key {
            Some(path) => path,
            None => dirs::home_dir()
                .context("Cannot determine home directory; pass --public-key")?
                .join(".ssh")
                .join("id_rsa.pub"),
        };
        let work_dir = flags
            .work_dir
            .unwrap_or_else(|| flags.env_dir.join("working"));

        Ok(Self {
            output: OutputContext::new(flags.no_color, flags.quiet),
            config: ProvisionConfig::new(flags.env_dir, work_dir, public_key),
        })
    }

    #[must_use]
    pub fn reporter(&self) -> TerminalReporter<'_> {
        TerminalReporter::new(&self.output)
    }

    /// Control-plane adapter for calls that never launch instances.
    #[must_use]
    pub fn cloud(&self) -> AwsCli<TokioCommandRunner> {
        AwsCli::default_runner(self.config.ip_poll)
    }

    /// Control-plane adapter carrying the `W3TCQA_EC2_*` launch profile.
    ///
    /// # Errors
    ///
    /// Returns an error if any launch setting is missing from the environment.
    pub fn launching_cloud(&self) -> Result<AwsCli<TokioCommandRunner>> {
        Ok(self.cloud().with_launch_profile(load_ec2_settings()?))
    }

    #[must_use]
    pub fn remote(&self) -> SshTransport<TokioCommandRunner> {
        let timeout = self.config.remote_timeout;
        SshTransport::new(
            TokioCommandRunner::new(timeout),
            self.config.known_hosts_path(),
            timeout,
        )
    }

    #[must_use]
    pub fn probe(&self) -> TokioNetworkProbe {
        TokioNetworkProbe::new(self.config.readiness.connect_timeout)
    }

    /// Record this process in the work directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the marker cannot be written.
    pub fn start_run(&self) -> Result<RunMarker> {
        let marker = RunMarker::current(&self.config.work_dir);
        marker.create_file()?;
        tracing::info!(pid = marker.pid(), path = %marker.path().display(), "run started");
        Ok(marker)
    }
}
