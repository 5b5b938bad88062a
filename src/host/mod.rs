//! Bridge to the PTY host.
//!
//! The front-end never touches the pseudo-terminal directly. It issues
//! [`HostCommand`]s through a [`HostClient`] and consumes [`HostEvent`]s from an
//! unbounded stream. Commands travel over one ordered channel, so calls reach
//! the host in the order they were issued even when their replies are awaited
//! on separate tasks.

mod pty;
mod shell;
mod utf8;

pub use pty::PtyHost;
pub use shell::ShellCommand;
pub use utf8::Utf8StreamDecoder;

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use thiserror::Error;
use tokio::sync::{mpsc, oneshot};

use crate::grid::GridSize;

/// Errors reported by the host or by the bridge itself.
#[derive(Debug, Error)]
pub enum HostError {
    /// The host side of the bridge is gone.
    #[error("host bridge disconnected")]
    Disconnected,

    #[error("a process is already running in this session")]
    AlreadySpawned,

    #[error("no process has been spawned yet")]
    NotSpawned,

    #[error("failed to open pseudo-terminal: {0}")]
    OpenPty(String),

    #[error("failed to spawn '{command}': {reason}")]
    Spawn { command: String, reason: String },

    #[error("failed to resize pseudo-terminal: {0}")]
    Resize(String),

    /// Other pseudo-terminal failures (cloning the reader, taking the writer).
    #[error("pseudo-terminal error: {0}")]
    Pty(String),

    #[error("pseudo-terminal I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type HostResult = Result<(), HostError>;

/// Reply slot carried by every command.
pub type Reply = oneshot::Sender<HostResult>;

#[derive(Debug)]
pub enum HostCommand {
    /// Start the shell on the pseudo-terminal.
    Spawn { respond_to: Reply },
    /// Resize the pseudo-terminal grid.
    Resize { size: GridSize, respond_to: Reply },
    /// Write user input to the shell.
    SendInput { data: String, respond_to: Reply },
}

/// Events pushed by the host, independent of any command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostEvent {
    /// A chunk of terminal output. Chunk boundaries carry no meaning.
    Data(String),
    /// Out-of-band failure notice. Diagnostic only.
    Error(String),
    /// The shell exited.
    Exited { code: u32 },
}

pub type HostCommandReceiver = mpsc::UnboundedReceiver<HostCommand>;
pub type HostEventSender = mpsc::UnboundedSender<HostEvent>;
pub type HostEventReceiver = mpsc::UnboundedReceiver<HostEvent>;

/// Create the command side of the bridge.
pub fn bridge() -> (HostClient, HostCommandReceiver) {
    let (sender, receiver) = mpsc::unbounded_channel();
    (HostClient::new(sender), receiver)
}

/// Create the event side of the bridge.
pub fn event_channel() -> (HostEventSender, HostEventReceiver) {
    mpsc::unbounded_channel()
}

#[derive(Debug, Clone)]
pub struct HostClient {
    sender: mpsc::UnboundedSender<HostCommand>,
}

impl HostClient {
    pub fn new(sender: mpsc::UnboundedSender<HostCommand>) -> Self {
        Self { sender }
    }

    pub fn spawn(&self) -> HostReply {
        self.request(|respond_to| HostCommand::Spawn { respond_to })
    }

    pub fn resize(&self, size: GridSize) -> HostReply {
        self.request(|respond_to| HostCommand::Resize { size, respond_to })
    }

    pub fn send_input(&self, data: String) -> HostReply {
        self.request(|respond_to| HostCommand::SendInput { data, respond_to })
    }

    /// Queue the command now; the returned future only waits for the reply.
    fn request(&self, build: impl FnOnce(Reply) -> HostCommand) -> HostReply {
        let (respond_to, receiver) = oneshot::channel();
        match self.sender.send(build(respond_to)) {
            Ok(()) => HostReply::waiting(receiver),
            Err(_) => HostReply::rejected(HostError::Disconnected),
        }
    }
}

/// Outcome of a host command.
///
/// The command is already queued when this value exists; awaiting it is only
/// needed to observe the result.
#[derive(Debug)]
#[must_use = "host replies carry the command's outcome"]
pub struct HostReply {
    state: ReplyState,
}

#[derive(Debug)]
enum ReplyState {
    Waiting(oneshot::Receiver<HostResult>),
    Rejected(Option<HostError>),
}

impl HostReply {
    fn waiting(receiver: oneshot::Receiver<HostResult>) -> Self {
        Self {
            state: ReplyState::Waiting(receiver),
        }
    }

    fn rejected(error: HostError) -> Self {
        Self {
            state: ReplyState::Rejected(Some(error)),
        }
    }
}

impl Future for HostReply {
    type Output = HostResult;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        match &mut self.get_mut().state {
            ReplyState::Waiting(receiver) => Pin::new(receiver)
                .poll(cx)
                .map(|reply| reply.unwrap_or(Err(HostError::Disconnected))),
            ReplyState::Rejected(error) => {
                Poll::Ready(Err(error.take().unwrap_or(HostError::Disconnected)))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn commands_arrive_in_issue_order() {
        let (client, mut commands) = bridge();
        let _first = client.send_input("a".to_string());
        let _resize = client.resize(GridSize::new(10, 20));
        let _second = client.send_input("b".to_string());

        match commands.recv().await {
            Some(HostCommand::SendInput { data, .. }) => assert_eq!(data, "a"),
            other => panic!("Expected SendInput, got {:?}", other),
        }
        match commands.recv().await {
            Some(HostCommand::Resize { size, .. }) => assert_eq!(size, GridSize::new(10, 20)),
            other => panic!("Expected Resize, got {:?}", other),
        }
        match commands.recv().await {
            Some(HostCommand::SendInput { data, .. }) => assert_eq!(data, "b"),
            other => panic!("Expected SendInput, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn reply_carries_host_result() {
        let (client, mut commands) = bridge();
        let reply = client.spawn();
        match commands.recv().await {
            Some(HostCommand::Spawn { respond_to }) => {
                respond_to
                    .send(Err(HostError::AlreadySpawned))
                    .expect("reply receiver alive");
            }
            other => panic!("Expected Spawn, got {:?}", other),
        }
        assert!(matches!(reply.await, Err(HostError::AlreadySpawned)));
    }

    #[tokio::test]
    async fn closed_host_rejects_commands() {
        let (client, commands) = bridge();
        drop(commands);
        assert!(matches!(client.spawn().await, Err(HostError::Disconnected)));
    }

    #[tokio::test]
    async fn dropped_reply_slot_reports_disconnect() {
        let (client, mut commands) = bridge();
        let reply = client.send_input("x".to_string());
        drop(commands.recv().await);
        assert!(matches!(reply.await, Err(HostError::Disconnected)));
    }
}
