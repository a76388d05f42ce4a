//! `qabox image` — build and delete machine images.

use std::process::ExitCode;

use anyhow::Result;
use clap::Subcommand;

use crate::app::AppContext;
use crate::application::ports::CloudControl;
use crate::application::services::image_build::build_image;
use crate::application::services::pipeline::PipelineOptions;
use crate::domain::ImageDeletion;
use crate::domain::naming::{image_name, validate_short_name};
use crate::infra::config::{load_bundle, read_public_key};

#[derive(Subcommand)]
pub enum ImageCommand {
    /// Build image w3tcqa-<NAME> from images/<NAME>/vars.yml
    Build {
        /// Short image name
        name: String,
    },
    /// Delete image w3tcqa-<NAME> and its snapshot
    Delete {
        /// Short image name
        name: String,
    },
}

/// Run `qabox image`.
///
/// # Errors
///
/// Returns an error on configuration problems or terminal cloud failures.
pub async fn run(app: &AppContext, cmd: ImageCommand) -> Result<ExitCode> {
    match cmd {
        ImageCommand::Build { name } => build(app, &name).await,
        ImageCommand::Delete { name } => delete(app, &name).await,
    }
}

async fn build(app: &AppContext, name: &str) -> Result<ExitCode> {
    let ctx = &app.output;
    let config = &app.config;
    validate_short_name(name)?;
    let cloud = app.launching_cloud()?;
    let bundle = load_bundle(&config.image_dir(name))?;
    let public_key = read_public_key(&config.public_key_path)?;
    app.start_run()?;

    let reporter = app.reporter();
    let scripts_dir = config.scripts_dir();
    let opts = PipelineOptions {
        reporter: &reporter,
        scripts_dir: &scripts_dir,
        public_key: &public_key,
        login_user: &config.login_user,
        readiness: &config.readiness,
    };
    let report = build_image(&cloud, &app.remote(), &app.probe(), &opts, name, &bundle).await?;

    ctx.kv("image", &report.image_name);
    ctx.kv("seed", &report.seed.instance_id);
    ctx.kv("ip", &report.seed.public_ip);
    Ok(super::finish(ctx, &report.failed_steps))
}

async fn delete(app: &AppContext, name: &str) -> Result<ExitCode> {
    let ctx = &app.output;
    validate_short_name(name)?;
    let image = image_name(name);
    match app.cloud().delete_image(&image).await? {
        ImageDeletion::NotFound => ctx.info(&format!("Image {image} not found.")),
        ImageDeletion::Deleted {
            image_id,
            snapshot_id,
        } => {
            ctx.success(&format!("Deregistered {image} ({image_id})."));
            if let Some(snapshot) = snapshot_id {
                ctx.success(&format!("Deleted snapshot {snapshot}."));
            }
        }
    }
    Ok(ExitCode::SUCCESS)
}
