//! Application service — image build use-case.
//!
//! Imports only from `crate::domain` and `crate::application::ports`.
//! All I/O is routed through injected port traits.

use anyhow::{Context, Result};

use crate::application::ports::{CloudControl, NetworkProbe, ProgressReporter, RemoteShell};
use crate::application::services::pipeline::{PipelineOptions, StepFailure, configure_instance};
use crate::domain::bundle::KEY_BASE_IMAGE;
use crate::domain::naming::{image_name, seed_instance_name, validate_short_name};
use crate::domain::{ConfigBundle, IMAGE_INIT, ImageDeletion, InstanceDescriptor};

/// Result of a build. The seed instance is left running for inspection.
#[derive(Debug)]
pub struct ImageBuildReport {
    pub image_name: String,
    pub seed: InstanceDescriptor,
    pub failed_steps: Vec<StepFailure>,
}

/// Build image `w3tcqa-<name>` from the base image named in `bundle`.
///
/// Deletes any image with the same name first (the provider does not allow
/// overwrite), launches a seed instance, configures it, and requests the
/// snapshot without waiting for it to become available.
///
/// # Errors
///
/// Returns an error on an invalid name, a missing `W3D_AWS_AMI` key, a launch
/// failure, or an instance that never becomes reachable.
pub async fn build_image(
    cloud: &impl CloudControl,
    remote: &impl RemoteShell,
    probe: &impl NetworkProbe,
    opts: &PipelineOptions<'_, impl ProgressReporter>,
    name: &str,
    bundle: &ConfigBundle,
) -> Result<ImageBuildReport> {
    let reporter = opts.reporter;
    validate_short_name(name)?;
    let image = image_name(name);
    let base_image = bundle.get(KEY_BASE_IMAGE)?;

    reporter.step(&format!("removing previous image {image}..."));
    match cloud.delete_image(&image).await.context("deleting previous image")? {
        ImageDeletion::NotFound => reporter.step(&format!("existing image {image} not found")),
        ImageDeletion::Deleted { image_id, .. } => {
            reporter.success(&format!("deleted {image_id}"));
        }
    }

    reporter.step(&format!("launching seed instance from {base_image}..."));
    let seed = cloud
        .launch_instance(base_image, &seed_instance_name(name))
        .await
        .context("launching seed instance")?;
    reporter.success(&format!(
        "seed instance {} at {}",
        seed.instance_id, seed.public_ip
    ));

    let failed_steps =
        configure_instance(remote, probe, opts, &seed, bundle, &[], &IMAGE_INIT).await?;

    reporter.step(&format!("capturing {image}..."));
    cloud
        .create_image(&seed.instance_id, &image)
        .await
        .context("requesting image creation")?;
    reporter.success(&format!("image {image} requested"));

    Ok(ImageBuildReport {
        image_name: image,
        seed,
        failed_steps,
    })
}
