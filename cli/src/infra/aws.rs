//! Infrastructure implementation of the `CloudControl` port.
//!
//! `AwsCli<R>` routes every control-plane call through the `aws` command line
//! tool via a `CommandRunner`. Its JSON output is the wire contract; only the
//! fields read below are relied on.

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::application::ports::{CloudControl, CommandOutput, CommandRunner};
use crate::application::retry::{RetryOutcome, retry};
use crate::domain::config::CLOUD_COMMAND_TIMEOUT;
use crate::domain::naming::INSTANCE_TYPE_TAG;
use crate::domain::{
    CloudError, ConfigError, Ec2Settings, ImageDeletion, InstanceDescriptor, RetryPolicy,
};
use crate::infra::command_runner::TokioCommandRunner;

const AWS: &str = "aws";

// ── Wire types ────────────────────────────────────────────────────────────────

/// `Images` is required: a failed or unreadable lookup degrades to `{}`, and
/// that must not read as "no such image".
#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct DescribeImages {
    images: Vec<ImageRecord>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ImageRecord {
    image_id: String,
    #[serde(default)]
    block_device_mappings: Vec<BlockDeviceMapping>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct BlockDeviceMapping {
    ebs: Option<Ebs>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct Ebs {
    snapshot_id: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct RunInstances {
    #[serde(default)]
    instances: Vec<InstanceRecord>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct InstanceRecord {
    instance_id: String,
}

// ── Adapter ───────────────────────────────────────────────────────────────────

/// Infrastructure adapter that routes all `aws ec2` calls through a `CommandRunner`.
///
/// Generic over `R: CommandRunner` so that tests can inject a mock runner
/// without spawning real processes.
pub struct AwsCli<R: CommandRunner> {
    runner: R,
    launch: Option<Ec2Settings>,
    ip_poll: RetryPolicy,
}

impl<R: CommandRunner> AwsCli<R> {
    /// Create an adapter without launch settings; `launch_instance` fails
    /// until [`Self::with_launch_profile`] is applied.
    pub fn new(runner: R, ip_poll: RetryPolicy) -> Self {
        Self {
            runner,
            launch: None,
            ip_poll,
        }
    }

    #[must_use]
    pub fn with_launch_profile(mut self, settings: Ec2Settings) -> Self {
        self.launch = Some(settings);
        self
    }

    async fn describe_images(&self, name: &str) -> Result<DescribeImages> {
        let filter = format!("Name=name,Values={name}");
        let value = self
            .runner
            .run_json(
                AWS,
                &["ec2", "describe-images", "--owners", "self", "--filters", &filter],
            )
            .await
            .context("aws ec2 describe-images")?;
        serde_json::from_value(value).map_err(|e| {
            CloudError::MalformedResponse {
                operation: "describe-images",
                detail: e.to_string(),
            }
            .into()
        })
    }

    /// Run a mutating call whose output is only logged.
    async fn mutate(&self, operation: &'static str, args: &[&str]) -> Result<()> {
        let output = self
            .runner
            .run(AWS, args)
            .await
            .with_context(|| format!("aws ec2 {operation}"))?;
        let captured = CommandOutput::from(&output);
        anyhow::ensure!(
            captured.success(),
            "aws ec2 {operation} failed: {}",
            captured.text.trim()
        );
        Ok(())
    }

    async fn public_ip(&self, instance_id: &str) -> Option<String> {
        let filter = format!("Name=instance-id,Values={instance_id}");
        let value = self
            .runner
            .run_json(
                AWS,
                &[
                    "ec2",
                    "describe-instances",
                    "--filters",
                    &filter,
                    "--query",
                    "Reservations[].Instances[].PublicIpAddress",
                ],
            )
            .await
            .ok()?;
        value
            .get(0)
            .and_then(serde_json::Value::as_str)
            .filter(|ip| !ip.is_empty())
            .map(str::to_owned)
    }
}

impl AwsCli<TokioCommandRunner> {
    /// Convenience constructor for production use.
    #[must_use]
    pub fn default_runner(ip_poll: RetryPolicy) -> Self {
        Self::new(TokioCommandRunner::new(CLOUD_COMMAND_TIMEOUT), ip_poll)
    }
}

impl<R: CommandRunner> CloudControl for AwsCli<R> {
    async fn delete_image(&self, name: &str) -> Result<ImageDeletion> {
        let described = self.describe_images(name).await?;
        let Some(image) = described.images.into_iter().next() else {
            tracing::info!(%name, "existing image not found");
            return Ok(ImageDeletion::NotFound);
        };

        let snapshot_id = image
            .block_device_mappings
            .into_iter()
            .next()
            .and_then(|m| m.ebs)
            .and_then(|ebs| ebs.snapshot_id);
        tracing::info!(%name, image_id = %image.image_id, ?snapshot_id, "deleting image");

        self.mutate(
            "deregister-image",
            &["ec2", "deregister-image", "--image-id", &image.image_id],
        )
        .await?;
        if let Some(snapshot) = &snapshot_id {
            self.mutate(
                "delete-snapshot",
                &["ec2", "delete-snapshot", "--snapshot-id", snapshot],
            )
            .await?;
        }

        Ok(ImageDeletion::Deleted {
            image_id: image.image_id,
            snapshot_id,
        })
    }

    async fn resolve_image_id(&self, name: &str) -> Result<String> {
        self.describe_images(name)
            .await?
            .images
            .into_iter()
            .next()
            .map(|image| image.image_id)
            .ok_or_else(|| CloudError::ImageNotFound(name.to_owned()).into())
    }

    async fn launch_instance(
        &self,
        image_id: &str,
        display_name: &str,
    ) -> Result<InstanceDescriptor> {
        let settings = self
            .launch
            .as_ref()
            .ok_or(ConfigError::MissingLaunchProfile)?;

        tracing::info!(%display_name, %image_id, "starting instance");
        let value = self
            .runner
            .run_json(
                AWS,
                &[
                    "ec2",
                    "run-instances",
                    "--count",
                    "1",
                    "--instance-type",
                    &settings.instance_type,
                    "--image-id",
                    image_id,
                    "--key-name",
                    &settings.key_name,
                    "--security-group-ids",
                    &settings.security_group_id,
                ],
            )
            .await
            .context("aws ec2 run-instances")?;
        let launched: RunInstances =
            serde_json::from_value(value).map_err(|e| CloudError::MalformedResponse {
                operation: "run-instances",
                detail: e.to_string(),
            })?;
        let instance_id = launched
            .instances
            .into_iter()
            .next()
            .map(|i| i.instance_id)
            .ok_or(CloudError::MalformedResponse {
                operation: "run-instances",
                detail: "no instance in response".to_owned(),
            })?;

        let type_tag = format!("Key=Type,Value={INSTANCE_TYPE_TAG}");
        self.mutate(
            "create-tags",
            &["ec2", "create-tags", "--resources", &instance_id, "--tags", &type_tag],
        )
        .await?;
        let name_tag = format!("Key=Name,Value={display_name}");
        self.mutate(
            "create-tags",
            &["ec2", "create-tags", "--resources", &instance_id, "--tags", &name_tag],
        )
        .await?;

        let id = instance_id.as_str();
        let outcome = retry(self.ip_poll, |attempt| async move {
            let ip = self.public_ip(id).await;
            if ip.is_none() {
                tracing::info!(instance_id = %id, attempt, "ip is not available yet");
            }
            ip
        })
        .await;

        match outcome {
            RetryOutcome::Succeeded { value: ip, .. } => {
                tracing::info!(%instance_id, %ip, "ip is available");
                Ok(InstanceDescriptor {
                    instance_id,
                    public_ip: ip,
                })
            }
            RetryOutcome::Exhausted { attempts } => Err(CloudError::IpNotAssigned {
                instance_id,
                attempts,
            }
            .into()),
        }
    }

    async fn terminate_instance(&self, instance_id: &str) -> Result<()> {
        self.mutate(
            "terminate-instances",
            &["ec2", "terminate-instances", "--instance-ids", instance_id],
        )
        .await
    }

    async fn create_image(&self, instance_id: &str, name: &str) -> Result<()> {
        self.mutate(
            "create-image",
            &[
                "ec2",
                "create-image",
                "--instance-id",
                instance_id,
                "--name",
                name,
            ],
        )
        .await
    }

    async fn list_box_instances(&self) -> Result<Vec<String>> {
        let type_filter = format!("Name=tag:Type,Values={INSTANCE_TYPE_TAG}");
        let value = self
            .runner
            .run_json(
                AWS,
                &[
                    "ec2",
                    "describe-instances",
                    "--filters",
                    &type_filter,
                    "Name=instance-state-code,Values=0,16",
                    "--query",
                    "Reservations[].Instances[].InstanceId",
                ],
            )
            .await
            .context("aws ec2 describe-instances")?;
        if value.as_object().is_some_and(serde_json::Map::is_empty) {
            // Unparseable answer; nothing verified.
            return Ok(Vec::new());
        }
        serde_json::from_value(value).map_err(|e| {
            CloudError::MalformedResponse {
                operation: "describe-instances",
                detail: e.to_string(),
            }
            .into()
        })
    }
}
