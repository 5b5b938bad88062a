use std::fmt;

use crate::grid::GridSize;
use crate::host::{HostClient, HostError, HostReply};
use crate::render::Renderer;

/// Host operations whose outcomes go through the diagnostic sink.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostOp {
    Spawn,
    Resize,
    SendInput,
}

impl fmt::Display for HostOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            HostOp::Spawn => "spawn",
            HostOp::Resize => "resize",
            HostOp::SendInput => "send-input",
        };
        f.write_str(name)
    }
}

/// Bridges user-facing events to host commands.
///
/// Every call is fire-and-forget: the command is queued before the method
/// returns and its reply is logged from a detached task. Nothing here touches
/// output delivery.
#[derive(Debug, Clone)]
pub struct SessionController {
    host: HostClient,
}

impl SessionController {
    pub fn new(host: HostClient) -> Self {
        Self { host }
    }

    /// Ask the host to start the shell. Failure is logged, never retried.
    pub fn init_session(&self) {
        report(HostOp::Spawn, self.host.spawn());
    }

    /// Measure the renderer and send exactly one resize.
    pub fn on_viewport_change<R: Renderer + ?Sized>(&self, renderer: &R) -> GridSize {
        let size = renderer.measure();
        tracing::debug!(%size, "viewport changed");
        report(HostOp::Resize, self.host.resize(size));
        size
    }

    /// Forward keystroke bytes to the shell unchanged.
    pub fn on_user_input(&self, data: String) {
        report(HostOp::SendInput, self.host.send_input(data));
    }

    pub fn on_host_error(&self, message: &str) {
        tracing::error!("host error: {}", message);
    }
}

fn report(op: HostOp, reply: HostReply) {
    tokio::spawn(log_outcome(op, reply));
}

async fn log_outcome(op: HostOp, reply: HostReply) {
    match reply.await {
        Ok(()) => tracing::debug!(%op, "host call succeeded"),
        // Without a shell the session shows nothing; everything else is transient.
        Err(err) if op == HostOp::Spawn => tracing::error!(%op, "host call failed: {}", err),
        Err(HostError::Disconnected) => tracing::warn!(%op, "host call dropped: bridge disconnected"),
        Err(err) => tracing::warn!(%op, "host call failed: {}", err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::{bridge, HostCommand};
    use crate::render::WriteCompletion;

    struct FixedSize(GridSize);

    impl Renderer for FixedSize {
        fn write(&mut self, _chunk: String) -> WriteCompletion {
            WriteCompletion::completed()
        }

        fn measure(&self) -> GridSize {
            self.0
        }
    }

    #[tokio::test]
    async fn init_session_requests_spawn() {
        let (client, mut commands) = bridge();
        SessionController::new(client).init_session();

        match commands.recv().await {
            Some(HostCommand::Spawn { respond_to }) => {
                let _ = respond_to.send(Ok(()));
            }
            other => panic!("Expected Spawn, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn viewport_change_sends_measured_size_once() {
        let (client, mut commands) = bridge();
        let controller = SessionController::new(client);

        let size = controller.on_viewport_change(&FixedSize(GridSize::new(40, 120)));
        assert_eq!(size, GridSize::new(40, 120));

        match commands.recv().await {
            Some(HostCommand::Resize { size, .. }) => assert_eq!(size, GridSize::new(40, 120)),
            other => panic!("Expected Resize, got {:?}", other),
        }
        assert!(commands.try_recv().is_err());
    }

    #[tokio::test]
    async fn user_input_is_forwarded_verbatim() {
        let (client, mut commands) = bridge();
        let controller = SessionController::new(client);
        controller.on_user_input("ls\r".to_string());
        controller.on_user_input("\x1b[A".to_string());

        for expected in ["ls\r", "\x1b[A"] {
            match commands.recv().await {
                Some(HostCommand::SendInput { data, .. }) => assert_eq!(data, expected),
                other => panic!("Expected SendInput, got {:?}", other),
            }
        }
    }

    #[tokio::test]
    async fn failures_are_logged_not_raised() {
        let (client, commands) = bridge();
        drop(commands);
        let controller = SessionController::new(client);
        controller.init_session();
        controller.on_user_input("x".to_string());
        controller.on_host_error("boom");
        tokio::task::yield_now().await;
    }

    #[test]
    fn op_names() {
        assert_eq!(HostOp::Spawn.to_string(), "spawn");
        assert_eq!(HostOp::SendInput.to_string(), "send-input");
    }
}
