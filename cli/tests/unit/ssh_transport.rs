//! Unit tests for `SshTransport` argument construction.

#![allow(clippy::expect_used)]

use std::path::PathBuf;
use std::time::Duration;

use qabox_cli::application::ports::RemoteShell;
use qabox_cli::domain::Endpoint;
use qabox_cli::domain::config::SSH_CONNECT_TIMEOUT;
use qabox_cli::infra::ssh::SshTransport;

use crate::helpers::err_output;
use crate::mocks::ScriptedRunner;

fn transport(runner: &ScriptedRunner) -> SshTransport<&ScriptedRunner> {
    SshTransport::new(
        runner,
        PathBuf::from("/qa/env/working/known_hosts"),
        Duration::from_secs(600),
    )
}

#[tokio::test]
async fn run_remote_passes_host_and_command_last() {
    let runner = ScriptedRunner::default();
    transport(&runner)
        .run_remote("root@203.0.113.7", "bash /share/scripts/init-box/010-env.sh")
        .await
        .expect("run");

    let call = &runner.calls_for("ssh")[0];
    assert_eq!(call[0], "ssh");
    assert!(call.contains(&"StrictHostKeyChecking=no".to_owned()));
    assert!(call.contains(&"UserKnownHostsFile=/qa/env/working/known_hosts".to_owned()));
    assert!(call.contains(&"BatchMode=yes".to_owned()));
    assert_eq!(
        &call[call.len() - 2..],
        ["root@203.0.113.7", "bash /share/scripts/init-box/010-env.sh"]
    );
    assert_eq!(*runner.timeouts.borrow(), [Duration::from_secs(600)]);
}

#[tokio::test]
async fn run_remote_returns_non_zero_status_without_error() {
    let runner = ScriptedRunner::default().respond("ssh", err_output(2, b"no such file\n"));
    let out = transport(&runner)
        .run_remote("root@203.0.113.7", "bash /missing.sh")
        .await
        .expect("status is data");
    assert!(!out.success());
    assert_eq!(out.text, "no such file\n");
}

#[tokio::test]
async fn copy_is_recursive_with_remote_destination() {
    let runner = ScriptedRunner::default();
    transport(&runner)
        .copy(
            &Endpoint::local("/qa/env/scripts"),
            &Endpoint::remote("root@203.0.113.7", "/share/scripts"),
        )
        .await
        .expect("copy");

    let call = &runner.calls_for("scp")[0];
    assert_eq!(call[1], "-r");
    assert_eq!(
        &call[call.len() - 2..],
        ["/qa/env/scripts", "root@203.0.113.7:/share/scripts"]
    );
}

#[tokio::test]
async fn ssh_and_scp_bound_the_connection_handshake() {
    let runner = ScriptedRunner::default();
    let ssh = transport(&runner);
    ssh.run_remote("ubuntu@203.0.113.7", "echo \"working\"")
        .await
        .expect("run");
    ssh.copy(
        &Endpoint::local("/qa/env/image/vars.yml"),
        &Endpoint::remote("root@203.0.113.7", "/share/vars.yml"),
    )
    .await
    .expect("copy");

    let expected = format!("ConnectTimeout={}", SSH_CONNECT_TIMEOUT.as_secs());
    for program in ["ssh", "scp"] {
        let call = &runner.calls_for(program)[0];
        let at = call
            .iter()
            .position(|arg| *arg == expected)
            .unwrap_or_else(|| panic!("{program} lacks {expected}: {call:?}"));
        assert_eq!(call[at - 1], "-o");
    }
}
