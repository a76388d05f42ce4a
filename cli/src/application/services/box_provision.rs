//! Application service — box provisioning use-case.
//!
//! Imports only from `crate::domain` and `crate::application::ports`.

use std::path::Path;

use anyhow::{Context, Result};

use crate::application::ports::{CloudControl, NetworkProbe, ProgressReporter, RemoteShell};
use crate::application::services::pipeline::{PipelineOptions, StepFailure, configure_instance};
use crate::domain::bundle::KEY_BOX_IMAGE;
use crate::domain::manifest::REMOTE_ARTIFACTS_DIR;
use crate::domain::naming::{box_instance_name, image_name, validate_short_name};
use crate::domain::{BOX_INIT, ConfigBundle, InstanceDescriptor};

/// Result of provisioning one box.
#[derive(Debug)]
pub struct BoxReport {
    pub image_id: String,
    pub instance: InstanceDescriptor,
    pub failed_steps: Vec<StepFailure>,
}

/// Launch box `w3tcqa-box-<name>` from the image named by `W3D_IMAGE` and run
/// the box initialization scripts on it.
///
/// `artifacts_dir`, when given, is copied to `/share/artifacts` after the
/// scripts bundle.
///
/// # Errors
///
/// Returns an error on an invalid name, a missing `W3D_IMAGE` key, an image
/// that does not exist, a launch failure, or an unreachable instance.
pub async fn provision_box(
    cloud: &impl CloudControl,
    remote: &impl RemoteShell,
    probe: &impl NetworkProbe,
    opts: &PipelineOptions<'_, impl ProgressReporter>,
    name: &str,
    bundle: &ConfigBundle,
    artifacts_dir: Option<&Path>,
) -> Result<BoxReport> {
    let reporter = opts.reporter;
    validate_short_name(name)?;
    let image_short = bundle.get(KEY_BOX_IMAGE)?;
    validate_short_name(image_short)?;
    let image = image_name(image_short);

    reporter.step(&format!("resolving image {image}..."));
    let image_id = cloud.resolve_image_id(&image).await?;

    reporter.step(&format!("launching box from {image_id}..."));
    let instance = cloud
        .launch_instance(&image_id, &box_instance_name(name))
        .await
        .context("launching box instance")?;
    reporter.success(&format!(
        "box instance {} at {}",
        instance.instance_id, instance.public_ip
    ));

    let extra: Vec<(&Path, &str, &str)> = artifacts_dir
        .map(|dir| (dir, REMOTE_ARTIFACTS_DIR, "pushing artifacts"))
        .into_iter()
        .collect();
    let failed_steps =
        configure_instance(remote, probe, opts, &instance, bundle, &extra, &BOX_INIT).await?;

    Ok(BoxReport {
        image_id,
        instance,
        failed_steps,
    })
}
