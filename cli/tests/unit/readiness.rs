//! Unit tests for the two-phase readiness gate.

#![allow(clippy::expect_used)]

use qabox_cli::application::services::readiness::{
    FunctionalOutcome, ReadinessOutcome, wait_functional, wait_ready,
};
use qabox_cli::domain::ReadinessError;

use crate::helpers::fast_readiness;
use crate::mocks::FakeWorld;

const IP: &str = "203.0.113.7";

#[tokio::test]
async fn shell_is_not_tried_before_port_opens() {
    let world = FakeWorld::default();
    world.port_closed_for.set(2);

    let outcome = wait_ready(&world, &world, IP, "ubuntu", &fast_readiness(5, 5))
        .await
        .expect("ready");

    assert_eq!(outcome, ReadinessOutcome::Ready);
    assert_eq!(
        world.events(),
        [
            "probe 203.0.113.7:22",
            "probe 203.0.113.7:22",
            "probe 203.0.113.7:22",
            "run ubuntu@203.0.113.7 echo \"working\"",
        ]
    );
}

#[tokio::test]
async fn port_exhaustion_is_terminal_and_skips_shell() {
    let world = FakeWorld::default();
    world.port_closed_for.set(u32::MAX);

    let err = wait_ready(&world, &world, IP, "ubuntu", &fast_readiness(4, 5))
        .await
        .expect_err("port never opens");

    match err.downcast_ref::<ReadinessError>() {
        Some(ReadinessError::PortClosed {
            host,
            port,
            attempts,
        }) => {
            assert_eq!(host, IP);
            assert_eq!(*port, 22);
            assert_eq!(*attempts, 4);
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(world.count("probe "), 4);
    assert_eq!(world.count("run "), 0);
}

#[tokio::test]
async fn unresponsive_shell_uses_full_budget_and_is_reported() {
    let world = FakeWorld {
        shell_answers: false,
        ..FakeWorld::default()
    };

    let outcome = wait_ready(&world, &world, IP, "ubuntu", &fast_readiness(3, 6))
        .await
        .expect("port opened");

    assert_eq!(
        outcome,
        ReadinessOutcome::ShellUnresponsive {
            host: "ubuntu@203.0.113.7".to_owned(),
            attempts: 6,
        }
    );
    assert_eq!(world.count("run "), 6);
    assert!(outcome.require_ready().is_err());
}

#[tokio::test]
async fn functional_phase_reports_attempts_on_success() {
    let world = FakeWorld::default();
    let outcome = wait_functional(&world, "ubuntu@203.0.113.7", &fast_readiness(1, 3)).await;
    assert_eq!(outcome, FunctionalOutcome::Ready { attempts: 1 });
}
