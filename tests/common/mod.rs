//! Shared test utilities: a renderer that records writes and lets the test
//! decide when each one completes.

#![allow(dead_code)]

use frameterm::host::{bridge, HostCommand, HostCommandReceiver};
use frameterm::output::FrameClock;
use frameterm::render::{Renderer, WriteCompletion, WriteNotifier};
use frameterm::session::{Session, SessionController};
use frameterm::GridSize;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;

#[derive(Default)]
struct Recorded {
    writes: Vec<String>,
    outstanding: VecDeque<WriteNotifier>,
    max_outstanding: usize,
    size: GridSize,
}

/// Renderer half handed to the session.
pub struct RecordingRenderer {
    state: Arc<Mutex<Recorded>>,
}

/// Test half: inspects writes and completes them.
#[derive(Clone)]
pub struct RendererProbe {
    state: Arc<Mutex<Recorded>>,
}

pub fn recording_renderer(size: GridSize) -> (RecordingRenderer, RendererProbe) {
    let state = Arc::new(Mutex::new(Recorded {
        size,
        ..Recorded::default()
    }));
    (
        RecordingRenderer {
            state: Arc::clone(&state),
        },
        RendererProbe { state },
    )
}

impl Renderer for RecordingRenderer {
    fn write(&mut self, chunk: String) -> WriteCompletion {
        let (notifier, completion) = WriteCompletion::channel();
        let mut state = self.state.lock();
        state.writes.push(chunk);
        state.outstanding.push_back(notifier);
        state.max_outstanding = state.max_outstanding.max(state.outstanding.len());
        completion
    }

    fn measure(&self) -> GridSize {
        self.state.lock().size
    }
}

impl RendererProbe {
    pub fn writes(&self) -> Vec<String> {
        self.state.lock().writes.clone()
    }

    pub fn outstanding(&self) -> usize {
        self.state.lock().outstanding.len()
    }

    /// Highest number of writes that were outstanding at the same time.
    pub fn max_outstanding(&self) -> usize {
        self.state.lock().max_outstanding
    }

    /// Complete the oldest outstanding write. Returns false if there was none.
    pub fn complete_next(&self) -> bool {
        let notifier = self.state.lock().outstanding.pop_front();
        match notifier {
            Some(notifier) => {
                notifier.complete();
                true
            }
            None => false,
        }
    }

    /// Drop the oldest outstanding write without completing it.
    pub fn abort_next(&self) -> bool {
        self.state.lock().outstanding.pop_front().is_some()
    }

    pub fn set_size(&self, size: GridSize) {
        self.state.lock().size = size;
    }
}

/// A session over a recording renderer, with the host side of the bridge
/// kept for inspection.
pub fn recording_session(
    size: GridSize,
) -> (Session<RecordingRenderer>, RendererProbe, HostCommandReceiver) {
    let (renderer, probe) = recording_renderer(size);
    let (client, commands) = bridge();
    let session = Session::new(renderer, SessionController::new(client), FrameClock::new(60));
    (session, probe, commands)
}

/// Drain queued host commands, answering each with success.
pub fn drain_commands(commands: &mut HostCommandReceiver) -> Vec<String> {
    let mut seen = Vec::new();
    while let Ok(command) = commands.try_recv() {
        let (label, respond_to) = match command {
            HostCommand::Spawn { respond_to } => ("spawn".to_string(), respond_to),
            HostCommand::Resize { size, respond_to } => (format!("resize {}", size), respond_to),
            HostCommand::SendInput { data, respond_to } => (format!("input {:?}", data), respond_to),
        };
        let _ = respond_to.send(Ok(()));
        seen.push(label);
    }
    seen
}
