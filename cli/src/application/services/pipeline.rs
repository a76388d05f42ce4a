//! Pipeline steps shared by the image builder and the box provisioner.
//!
//! Every step runs unconditionally. A failing step (non-zero remote exit
//! status, transport error, or timeout) is reported as a warning and
//! recorded; the pipeline carries on with the next step.

use std::io::Write as _;
use std::path::Path;

use anyhow::{Context, Result};

use crate::application::ports::{
    CommandOutput, NetworkProbe, ProgressReporter, RemoteShell,
};
use crate::application::services::readiness::wait_ready;
use crate::domain::bundle::shell_quote;
use crate::domain::manifest::{
    REMOTE_ENV_FILE, REMOTE_SCRIPTS_DIR, REMOTE_SHARE_DIR, ScriptManifest, script_command,
};
use crate::domain::{ConfigBundle, Endpoint, InstanceDescriptor, ReadinessPolicy};

/// User the pipeline switches to once the host fix has authorized our key.
pub const ROOT_USER: &str = "root";

/// Inputs shared by both orchestration flows.
pub struct PipelineOptions<'a, R: ProgressReporter> {
    pub reporter: &'a R,
    /// Local directory pushed verbatim to `/share/scripts`.
    pub scripts_dir: &'a Path,
    /// Public key line authorized for `root` on the instance.
    pub public_key: &'a str,
    /// User the base image accepts before the host fix.
    pub login_user: &'a str,
    pub readiness: &'a ReadinessPolicy,
}

/// A step whose remote command or copy did not succeed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepFailure {
    pub step: String,
    pub detail: String,
}

/// Collects step failures for the final report.
#[derive(Debug, Default)]
pub struct StepLog {
    failures: Vec<StepFailure>,
}

impl StepLog {
    fn record(
        &mut self,
        step: &str,
        result: Result<CommandOutput>,
        reporter: &impl ProgressReporter,
    ) {
        let detail = match result {
            Ok(out) if out.success() => return,
            Ok(out) => format!("{}: {}", out.status, out.text.trim()),
            Err(e) => format!("{e:#}"),
        };
        reporter.warn(&format!("{step} failed: {detail}"));
        self.failures.push(StepFailure {
            step: step.to_owned(),
            detail,
        });
    }

    #[must_use]
    pub fn into_failures(self) -> Vec<StepFailure> {
        self.failures
    }
}

/// Run one remote command as a named step.
pub async fn run_step(
    remote: &impl RemoteShell,
    host: &str,
    step: &str,
    command: &str,
    reporter: &impl ProgressReporter,
    log: &mut StepLog,
) {
    reporter.step(step);
    let result = remote.run_remote(host, command).await;
    log.record(step, result, reporter);
}

/// Copy one file or directory as a named step.
pub async fn copy_step(
    remote: &impl RemoteShell,
    source: &Endpoint,
    dest: &Endpoint,
    step: &str,
    reporter: &impl ProgressReporter,
    log: &mut StepLog,
) {
    reporter.step(step);
    let result = remote.copy(source, dest).await;
    log.record(step, result, reporter);
}

/// Make the hostname resolve locally, authorize our key for `root`, and
/// create the share directory. Runs as the login user.
pub async fn prepare_host(
    remote: &impl RemoteShell,
    login: &str,
    public_key: &str,
    reporter: &impl ProgressReporter,
    log: &mut StepLog,
) {
    run_step(
        remote,
        login,
        "fixing hostname resolution",
        r#"sudo sed -i "s/^127\.0\.0\.1.*/127.0.0.1 localhost $(hostname)/" /etc/hosts"#,
        reporter,
        log,
    )
    .await;

    let authorize = format!(
        "sudo mkdir -p /root/.ssh && echo {} | sudo tee -a /root/.ssh/authorized_keys > /dev/null",
        shell_quote(public_key.trim())
    );
    run_step(remote, login, "authorizing key for root", &authorize, reporter, log).await;

    run_step(
        remote,
        login,
        "creating share directory",
        &format!("sudo mkdir -p {REMOTE_SHARE_DIR}"),
        reporter,
        log,
    )
    .await;
}

/// Render `bundle` to a temporary env file and copy it to `/share/env.sh`.
///
/// # Errors
///
/// Returns an error if the local temporary file cannot be written.
pub async fn push_env_file(
    remote: &impl RemoteShell,
    host: &str,
    bundle: &ConfigBundle,
    reporter: &impl ProgressReporter,
    log: &mut StepLog,
) -> Result<()> {
    let mut file = tempfile::Builder::new()
        .prefix("qabox-env-")
        .suffix(".sh")
        .tempfile()
        .context("creating temp env file")?;
    file.write_all(bundle.render_env_file().as_bytes())
        .context("writing temp env file")?;
    file.flush().context("flushing temp env file")?;

    let source = Endpoint::local(file.path().to_string_lossy());
    let dest = Endpoint::remote(host, REMOTE_ENV_FILE);
    copy_step(
        remote,
        &source,
        &dest,
        &format!("pushing environment from {}", bundle.source_name()),
        reporter,
        log,
    )
    .await;
    Ok(())
}

/// Replace `/share/scripts` with the local scripts directory.
///
/// A host launched from an image already has the directory, and `scp -r`
/// into an existing directory nests the copy one level down, so the old
/// tree is removed first.
pub async fn push_scripts(
    remote: &impl RemoteShell,
    host: &str,
    scripts_dir: &Path,
    reporter: &impl ProgressReporter,
    log: &mut StepLog,
) {
    run_step(
        remote,
        host,
        "clearing previous scripts",
        &format!("rm -rf {REMOTE_SCRIPTS_DIR}"),
        reporter,
        log,
    )
    .await;
    let source = Endpoint::local(scripts_dir.to_string_lossy());
    let dest = Endpoint::remote(host, REMOTE_SCRIPTS_DIR);
    copy_step(remote, &source, &dest, "pushing scripts", reporter, log).await;
}

/// Execute every manifest entry in order.
pub async fn run_manifest(
    remote: &impl RemoteShell,
    host: &str,
    manifest: &ScriptManifest,
    reporter: &impl ProgressReporter,
    log: &mut StepLog,
) {
    for path in manifest.remote_paths() {
        run_step(remote, host, &path, &script_command(&path), reporter, log).await;
    }
}

/// The common template after launch: wait-ready, host fix, push the env
/// file and scripts, run any extra pushes, then the manifest.
///
/// `extra_pushes` are `(local dir, remote dir, step label)` copies made
/// after the scripts bundle.
///
/// # Errors
///
/// Returns an error if the instance never becomes reachable or the env file
/// cannot be staged locally.
pub async fn configure_instance(
    remote: &impl RemoteShell,
    probe: &impl NetworkProbe,
    opts: &PipelineOptions<'_, impl ProgressReporter>,
    instance: &InstanceDescriptor,
    bundle: &ConfigBundle,
    extra_pushes: &[(&Path, &str, &str)],
    manifest: &ScriptManifest,
) -> Result<Vec<StepFailure>> {
    let reporter = opts.reporter;
    let mut log = StepLog::default();

    reporter.step(&format!("waiting for {} to become reachable...", instance.public_ip));
    wait_ready(
        probe,
        remote,
        &instance.public_ip,
        opts.login_user,
        opts.readiness,
    )
    .await?
    .require_ready()?;
    reporter.success("instance reachable");

    prepare_host(
        remote,
        &instance.login(opts.login_user),
        opts.public_key,
        reporter,
        &mut log,
    )
    .await;

    let root = instance.login(ROOT_USER);
    push_env_file(remote, &root, bundle, reporter, &mut log).await?;
    push_scripts(remote, &root, opts.scripts_dir, reporter, &mut log).await;
    for (local, remote_dir, step) in extra_pushes {
        let source = Endpoint::local(local.to_string_lossy());
        let dest = Endpoint::remote(root.as_str(), *remote_dir);
        copy_step(remote, &source, &dest, step, reporter, &mut log).await;
    }

    reporter.step(&format!("running {} scripts...", manifest.name));
    run_manifest(remote, &root, manifest, reporter, &mut log).await;

    Ok(log.into_failures())
}
