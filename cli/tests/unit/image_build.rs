//! Unit tests for the image build flow.

#![allow(clippy::expect_used)]

use std::path::Path;

use qabox_cli::application::services::image_build::build_image;
use qabox_cli::application::services::pipeline::PipelineOptions;
use qabox_cli::domain::{CloudError, ConfigError, IMAGE_INIT, ReadinessPolicy};

use crate::helpers::{NoopReporter, WarnCollector, bundle, fast_readiness};
use crate::mocks::FakeWorld;

const KEY: &str = "ssh-ed25519 AAAAC3Nz qa@host";

fn options<'a, R: qabox_cli::application::ports::ProgressReporter>(
    reporter: &'a R,
    readiness: &'a ReadinessPolicy,
) -> PipelineOptions<'a, R> {
    PipelineOptions {
        reporter,
        scripts_dir: Path::new("/qa/env/scripts"),
        public_key: KEY,
        login_user: "ubuntu",
        readiness,
    }
}

#[tokio::test]
async fn build_runs_every_stage_in_order() {
    let world = FakeWorld::default();
    let readiness = fast_readiness(3, 3);
    let vars = bundle(&[("W3D_AWS_AMI", "ami-123"), ("W3D_PHP", "8.2")]);

    let report = build_image(
        &world,
        &world,
        &world,
        &options(&NoopReporter, &readiness),
        "foo",
        &vars,
    )
    .await
    .expect("build");

    assert_eq!(report.image_name, "w3tcqa-foo");
    assert_eq!(report.seed.instance_id, "i-0abc");
    assert!(report.failed_steps.is_empty());

    let events = world.events();
    assert_eq!(events[0], "delete_image w3tcqa-foo");
    assert_eq!(events[1], "launch ami-123 w3tcqa-amisource-foo");
    assert_eq!(events[2], "probe 203.0.113.7:22");
    assert_eq!(events[3], "run ubuntu@203.0.113.7 echo \"working\"");
    assert_eq!(
        events.last().map(String::as_str),
        Some("create_image i-0abc w3tcqa-foo")
    );

    // Host fix runs as the login user before anything is pushed.
    let host_fix: Vec<&String> = events
        .iter()
        .filter(|e| e.starts_with("run ubuntu@") && !e.contains("working"))
        .collect();
    assert_eq!(host_fix.len(), 3);
    assert!(host_fix[0].contains("/etc/hosts"));
    assert!(host_fix[1].contains(KEY));
    assert!(host_fix[1].contains("/root/.ssh/authorized_keys"));
    assert!(host_fix[2].contains("mkdir -p /share"));

    let env = world.position("copy env -> root@203.0.113.7:/share/env.sh").expect("env copy");
    let scripts = world
        .position("copy /qa/env/scripts -> root@203.0.113.7:/share/scripts")
        .expect("scripts copy");
    assert!(env < scripts);
    assert_eq!(world.count("copy "), 2);

    let runs: Vec<usize> = IMAGE_INIT
        .remote_paths()
        .iter()
        .map(|path| {
            world
                .position(&format!("run root@203.0.113.7 bash {path}"))
                .expect("script ran")
        })
        .collect();
    assert_eq!(runs.len(), 6);
    assert!(runs[0] > scripts);
    assert!(runs.windows(2).all(|w| w[0] < w[1]), "scripts out of order");
}

#[tokio::test]
async fn env_file_exports_every_bundle_key() {
    let world = FakeWorld::default();
    let readiness = fast_readiness(1, 1);
    let vars = bundle(&[("W3D_AWS_AMI", "ami-123"), ("W3D_DB_PASS", "it's")]);

    build_image(
        &world,
        &world,
        &world,
        &options(&NoopReporter, &readiness),
        "foo",
        &vars,
    )
    .await
    .expect("build");

    let env = world.pushed_env.borrow().clone().expect("env pushed");
    assert_eq!(
        env,
        "export W3D_AWS_AMI='ami-123'\nexport W3D_DB_PASS='it'\\''s'\n"
    );
}

#[tokio::test]
async fn previous_image_is_replaced() {
    let world = FakeWorld::default().with_image("w3tcqa-foo", "ami-old");
    let readiness = fast_readiness(1, 1);
    build_image(
        &world,
        &world,
        &world,
        &options(&NoopReporter, &readiness),
        "foo",
        &bundle(&[("W3D_AWS_AMI", "ami-123")]),
    )
    .await
    .expect("build");
    assert!(world.images.borrow().get("w3tcqa-foo").is_none());
}

#[tokio::test]
async fn unreadable_image_lookup_aborts_before_launch() {
    let world = FakeWorld {
        lookup_fails: true,
        ..FakeWorld::default()
    };
    let readiness = fast_readiness(1, 1);
    let err = build_image(
        &world,
        &world,
        &world,
        &options(&NoopReporter, &readiness),
        "foo",
        &bundle(&[("W3D_AWS_AMI", "ami-123")]),
    )
    .await
    .expect_err("lookup failure is fatal");

    assert!(matches!(
        err.downcast_ref::<CloudError>(),
        Some(CloudError::MalformedResponse { .. })
    ));
    assert_eq!(world.events(), ["delete_image w3tcqa-foo"]);
}

#[tokio::test]
async fn failing_script_is_reported_and_later_steps_still_run() {
    let world = FakeWorld {
        failing: vec!["030-php.sh".to_owned()],
        ..FakeWorld::default()
    };
    let readiness = fast_readiness(1, 1);
    let reporter = WarnCollector::default();

    let report = build_image(
        &world,
        &world,
        &world,
        &options(&reporter, &readiness),
        "foo",
        &bundle(&[("W3D_AWS_AMI", "ami-123")]),
    )
    .await
    .expect("build completes");

    assert_eq!(report.failed_steps.len(), 1);
    assert_eq!(
        report.failed_steps[0].step,
        "/share/scripts/init-image/030-php.sh"
    );
    assert_eq!(reporter.warnings.borrow().len(), 1);
    assert!(world.position("run root@203.0.113.7 bash /share/scripts/init-image/060-wp-cli.sh").is_some());
    assert_eq!(world.count("create_image "), 1);
}

#[tokio::test]
async fn missing_base_image_key_fails_before_cloud_calls() {
    let world = FakeWorld::default();
    let readiness = fast_readiness(1, 1);
    let err = build_image(
        &world,
        &world,
        &world,
        &options(&NoopReporter, &readiness),
        "foo",
        &bundle(&[("W3D_PHP", "8.2")]),
    )
    .await
    .expect_err("missing key");

    assert!(matches!(
        err.downcast_ref::<ConfigError>(),
        Some(ConfigError::MissingKey { key, .. }) if key == "W3D_AWS_AMI"
    ));
    assert!(world.events().is_empty());
}

#[tokio::test]
async fn unresponsive_seed_aborts_before_image_creation() {
    let world = FakeWorld {
        shell_answers: false,
        ..FakeWorld::default()
    };
    let readiness = fast_readiness(1, 2);
    let result = build_image(
        &world,
        &world,
        &world,
        &options(&NoopReporter, &readiness),
        "foo",
        &bundle(&[("W3D_AWS_AMI", "ami-123")]),
    )
    .await;

    assert!(result.is_err());
    assert_eq!(world.count("create_image "), 0);
    assert_eq!(world.count("copy "), 0);
}

#[tokio::test]
async fn invalid_name_is_rejected() {
    let world = FakeWorld::default();
    let readiness = fast_readiness(1, 1);
    let err = build_image(
        &world,
        &world,
        &world,
        &options(&NoopReporter, &readiness),
        "Foo Bar",
        &bundle(&[("W3D_AWS_AMI", "ami-123")]),
    )
    .await
    .expect_err("invalid name");
    assert!(matches!(
        err.downcast_ref::<ConfigError>(),
        Some(ConfigError::InvalidName(_))
    ));
    assert!(world.events().is_empty());
}
