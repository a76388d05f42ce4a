//! `qabox box` — launch, list, and terminate boxes.

use std::process::ExitCode;

use anyhow::Result;
use clap::Subcommand;

use crate::app::AppContext;
use crate::application::ports::CloudControl;
use crate::application::services::box_provision::provision_box;
use crate::application::services::pipeline::PipelineOptions;
use crate::domain::naming::validate_short_name;
use crate::infra::config::{load_bundle, read_public_key};

#[derive(Subcommand)]
pub enum BoxCommand {
    /// Launch and initialize box w3tcqa-box-<NAME> from boxes/<NAME>/vars.yml
    Up {
        /// Short box name
        name: String,
    },
    /// List pending and running boxes
    List,
    /// Terminate an instance
    Terminate {
        /// EC2 instance id
        instance_id: String,
    },
}

/// Run `qabox box`.
///
/// # Errors
///
/// Returns an error on configuration problems or terminal cloud failures.
pub async fn run(app: &AppContext, cmd: BoxCommand) -> Result<ExitCode> {
    match cmd {
        BoxCommand::Up { name } => up(app, &name).await,
        BoxCommand::List => {
            for id in app.cloud().list_box_instances().await? {
                println!("{id}");
            }
            Ok(ExitCode::SUCCESS)
        }
        BoxCommand::Terminate { instance_id } => {
            app.cloud().terminate_instance(&instance_id).await?;
            app.output.success(&format!("Terminating {instance_id}."));
            Ok(ExitCode::SUCCESS)
        }
    }
}

async fn up(app: &AppContext, name: &str) -> Result<ExitCode> {
    let ctx = &app.output;
    let config = &app.config;
    validate_short_name(name)?;
    let cloud = app.launching_cloud()?;
    let box_dir = config.box_dir(name);
    let bundle = load_bundle(&box_dir)?;
    let public_key = read_public_key(&config.public_key_path)?;
    app.start_run()?;

    let artifacts = box_dir.join("artifacts");
    let artifacts_dir = artifacts.is_dir().then_some(artifacts.as_path());

    let reporter = app.reporter();
    let scripts_dir = config.scripts_dir();
    let opts = PipelineOptions {
        reporter: &reporter,
        scripts_dir: &scripts_dir,
        public_key: &public_key,
        login_user: &config.login_user,
        readiness: &config.readiness,
    };
    let report = provision_box(
        &cloud,
        &app.remote(),
        &app.probe(),
        &opts,
        name,
        &bundle,
        artifacts_dir,
    )
    .await?;

    ctx.kv("instance", &report.instance.instance_id);
    ctx.kv("ip", &report.instance.public_ip);
    Ok(super::finish(ctx, &report.failed_steps))
}
