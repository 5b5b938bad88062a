//! PTY host driven through the bridge against a real `sh`.

#![cfg(unix)]

use frameterm::config::ShellConfig;
use frameterm::host::{
    bridge, event_channel, HostClient, HostError, HostEvent, HostEventReceiver, PtyHost,
    ShellCommand,
};
use frameterm::GridSize;
use std::time::Duration;
use tokio::time::timeout;

const EVENT_TIMEOUT: Duration = Duration::from_secs(10);

fn start_sh() -> (HostClient, HostEventReceiver) {
    let config = ShellConfig {
        program: Some("sh".to_string()),
        ..ShellConfig::default()
    };
    let shell = ShellCommand::resolve_with(&config, None);
    let (event_sender, events) = event_channel();
    let (client, commands) = bridge();
    let host = PtyHost::open(shell, GridSize::new(24, 80), event_sender).expect("open pty");
    host.start(commands).expect("start host thread");
    (client, events)
}

/// Collect output until `marker` shows up, failing on exit or timeout.
async fn read_until(events: &mut HostEventReceiver, marker: &str) -> String {
    let mut output = String::new();
    while !output.contains(marker) {
        match timeout(EVENT_TIMEOUT, events.recv()).await {
            Ok(Some(HostEvent::Data(chunk))) => output.push_str(&chunk),
            Ok(Some(HostEvent::Error(message))) => panic!("host error: {}", message),
            Ok(Some(HostEvent::Exited { code })) => {
                panic!("shell exited with {} before {:?}; got {:?}", code, marker, output)
            }
            Ok(None) => panic!("event stream closed; got {:?}", output),
            Err(_) => panic!("timed out waiting for {:?}; got {:?}", marker, output),
        }
    }
    output
}

async fn wait_for_exit(events: &mut HostEventReceiver) -> u32 {
    loop {
        match timeout(EVENT_TIMEOUT, events.recv()).await {
            Ok(Some(HostEvent::Exited { code })) => return code,
            Ok(Some(_)) => continue,
            Ok(None) => panic!("event stream closed before exit"),
            Err(_) => panic!("timed out waiting for exit"),
        }
    }
}

#[tokio::test]
async fn shell_output_comes_back_as_data_events() {
    let (client, mut events) = start_sh();
    client.spawn().await.expect("spawn");
    client.resize(GridSize::new(30, 100)).await.expect("resize");

    // The echoed command line contains the unexpanded form, so only the
    // shell's own output matches.
    client
        .send_input("echo frame$((6*7))term\n".to_string())
        .await
        .expect("send input");
    read_until(&mut events, "frame42term").await;

    client.send_input("exit 3\n".to_string()).await.expect("send exit");
    assert_eq!(wait_for_exit(&mut events).await, 3);
}

#[tokio::test]
async fn resize_is_visible_to_the_shell() {
    let (client, mut events) = start_sh();
    client.spawn().await.expect("spawn");
    client.resize(GridSize::new(40, 120)).await.expect("resize");

    client
        .send_input("echo size:$(stty size | tr ' ' x):end\n".to_string())
        .await
        .expect("send input");
    read_until(&mut events, "size:40x120:end").await;

    client.send_input("exit\n".to_string()).await.expect("send exit");
    assert_eq!(wait_for_exit(&mut events).await, 0);
}

#[tokio::test]
async fn input_before_spawn_is_rejected() {
    let (client, _events) = start_sh();
    let err = client
        .send_input("echo hi\n".to_string())
        .await
        .expect_err("nothing spawned yet");
    assert!(matches!(err, HostError::NotSpawned));
}

#[tokio::test]
async fn second_spawn_is_rejected() {
    let (client, mut events) = start_sh();
    client.spawn().await.expect("first spawn");
    let err = client.spawn().await.expect_err("second spawn");
    assert!(matches!(err, HostError::AlreadySpawned));

    client.send_input("exit\n".to_string()).await.expect("send exit");
    wait_for_exit(&mut events).await;
}

#[tokio::test]
async fn missing_program_fails_to_spawn() {
    let config = ShellConfig {
        program: Some("/nonexistent/frameterm-shell".to_string()),
        ..ShellConfig::default()
    };
    let (event_sender, _events) = event_channel();
    let (client, commands) = bridge();
    let host = PtyHost::open(
        ShellCommand::resolve_with(&config, None),
        GridSize::default(),
        event_sender,
    )
    .expect("open pty");
    host.start(commands).expect("start host thread");

    let err = client.spawn().await.expect_err("spawn should fail");
    assert!(matches!(err, HostError::Spawn { .. }));
}

#[tokio::test]
async fn failed_spawn_leaves_host_retryable() {
    let config = ShellConfig {
        program: Some("/nonexistent/frameterm-shell".to_string()),
        ..ShellConfig::default()
    };
    let (event_sender, mut events) = event_channel();
    let (client, commands) = bridge();
    let host = PtyHost::open(
        ShellCommand::resolve_with(&config, None),
        GridSize::default(),
        event_sender,
    )
    .expect("open pty");
    host.start(commands).expect("start host thread");

    let first = client.spawn().await.expect_err("first spawn should fail");
    assert!(matches!(first, HostError::Spawn { .. }));
    let second = client.spawn().await.expect_err("retry should fail the same way");
    assert!(matches!(second, HostError::Spawn { .. }));

    let err = client
        .send_input("echo hi\n".to_string())
        .await
        .expect_err("no shell is running");
    assert!(matches!(err, HostError::NotSpawned));

    // No watcher was attached, so nothing reports output or an exit.
    assert!(events.try_recv().is_err());
}
