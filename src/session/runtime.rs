use std::future;
use std::ops::ControlFlow;

use anyhow::Context;
use crossterm::event::{Event, EventStream, KeyEvent};
use futures_util::StreamExt;
use ratatui::backend::Backend;
use ratatui::layout::Rect;
use tokio::signal;

use super::controller::SessionController;
use crate::config::Config;
use crate::grid::GridSize;
use crate::host::{self, HostEvent, HostEventReceiver, PtyHost, ShellCommand};
use crate::output::{FlushAction, FrameClock, OutputCoordinator};
use crate::render::input::{is_quit_hotkey, key_event_to_bytes, paste_to_bytes};
use crate::render::terminal_guard::setup_terminal;
use crate::render::{Renderer, TerminalView, WriteAborted, WriteCompletion};

/// What woke the session besides host and terminal events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Wake {
    Frame,
    WriteDone(Result<(), WriteAborted>),
}

/// One terminal session: output delivery plus host control.
///
/// All state is owned here and mutated only between await points, so a
/// single-threaded runtime needs no locking.
pub struct Session<R: Renderer> {
    output: OutputCoordinator,
    renderer: R,
    frames: FrameClock,
    controller: SessionController,
    in_flight: Option<WriteCompletion>,
}

impl<R: Renderer> Session<R> {
    pub fn new(renderer: R, controller: SessionController, frames: FrameClock) -> Self {
        Self {
            output: OutputCoordinator::new(),
            renderer,
            frames,
            controller,
            in_flight: None,
        }
    }

    /// Ask the host to spawn the shell.
    pub fn start(&self) {
        self.controller.init_session();
    }

    pub fn on_viewport_change(&self) -> GridSize {
        self.controller.on_viewport_change(&self.renderer)
    }

    /// Route one host event. Breaks with the process exit code once the shell
    /// has exited.
    pub fn on_host_event(&mut self, event: HostEvent) -> ControlFlow<i32> {
        match event {
            HostEvent::Data(chunk) => {
                let action = self.output.enqueue(&chunk);
                self.apply(action);
            }
            HostEvent::Error(message) => self.controller.on_host_error(&message),
            HostEvent::Exited { code } => {
                // Output still queued on the reader thread may be dropped here.
                return ControlFlow::Break(i32::try_from(code).unwrap_or(1));
            }
        }
        ControlFlow::Continue(())
    }

    pub fn on_frame(&mut self) {
        let action = self.output.on_frame();
        self.apply(action);
    }

    /// Feed a finished write back to the coordinator. An aborted write still
    /// counts as finished so delivery can continue.
    pub fn on_write_done(&mut self, result: Result<(), WriteAborted>) {
        self.in_flight = None;
        if let Err(err) = result {
            tracing::error!("renderer write failed: {}", err);
        }
        let action = self.output.write_completed();
        self.apply(action);
    }

    pub fn on_user_input(&self, data: String) {
        self.controller.on_user_input(data);
    }

    /// Wait for the armed frame or the outstanding write. Never resolves when
    /// neither is pending.
    pub async fn wake(&mut self) -> Wake {
        let frames = &mut self.frames;
        let in_flight = &mut self.in_flight;
        tokio::select! {
            () = frames.wait(), if frames.is_armed() => Wake::Frame,
            result = wait_write(in_flight), if in_flight.is_some() => Wake::WriteDone(result),
            else => future::pending().await,
        }
    }

    pub fn on_wake(&mut self, wake: Wake) {
        match wake {
            Wake::Frame => self.on_frame(),
            Wake::WriteDone(result) => self.on_write_done(result),
        }
    }

    pub fn output(&self) -> &OutputCoordinator {
        &self.output
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn frames(&self) -> &FrameClock {
        &self.frames
    }

    fn apply(&mut self, action: FlushAction) {
        match action {
            FlushAction::Idle => {}
            FlushAction::RequestFrame => self.frames.request(),
            FlushAction::Write(chunk) => {
                debug_assert!(self.in_flight.is_none(), "overlapping renderer writes");
                self.in_flight = Some(self.renderer.write(chunk));
            }
        }
    }
}

impl<B: Backend> Session<TerminalView<B>> {
    pub fn on_terminal_event(&mut self, event: Event) -> ControlFlow<i32> {
        match event {
            Event::Key(key) => return self.on_key(key),
            Event::Paste(text) => self.on_paste(&text),
            Event::Resize(cols, rows) => self.on_resize(cols, rows),
            _ => {}
        }
        ControlFlow::Continue(())
    }

    pub fn on_key(&mut self, key: KeyEvent) -> ControlFlow<i32> {
        if is_quit_hotkey(&key) {
            tracing::info!("quit requested");
            return ControlFlow::Break(0);
        }
        if let Some(data) = key_event_to_bytes(key, self.renderer.input_modes()) {
            self.on_user_input(data);
        }
        ControlFlow::Continue(())
    }

    pub fn on_paste(&mut self, text: &str) {
        let bracketed = self.renderer.input_modes().bracketed_paste;
        self.on_user_input(paste_to_bytes(text, bracketed));
    }

    pub fn on_resize(&mut self, cols: u16, rows: u16) {
        self.renderer.fit(Rect::new(0, 0, cols, rows));
        self.on_viewport_change();
        if let Err(err) = self.renderer.draw() {
            tracing::error!("draw after resize failed: {}", err);
        }
    }
}

async fn wait_write(in_flight: &mut Option<WriteCompletion>) -> Result<(), WriteAborted> {
    match in_flight {
        Some(completion) => completion.await,
        None => future::pending().await,
    }
}

/// Run one session on the current terminal until the shell exits, the user
/// quits, or a termination signal arrives. Returns the process exit code.
pub async fn run(config: Config) -> anyhow::Result<i32> {
    let shell = ShellCommand::resolve(&config.shell);
    let initial = GridSize::new(config.terminal.initial_rows, config.terminal.initial_cols);
    tracing::info!(program = shell.program(), %initial, fps = config.terminal.frame_rate, "starting session");

    let (terminal, _guard) = setup_terminal().context("failed to set up the screen")?;

    let (event_sender, events) = host::event_channel();
    let (client, commands) = host::bridge();
    let pty = PtyHost::open(shell, initial, event_sender).context("failed to open the host")?;
    pty.start(commands).context("failed to start the host thread")?;

    let view = TerminalView::new(terminal, initial, config.terminal.scrollback_lines);
    let frames = FrameClock::new(config.terminal.frame_rate);
    let mut session = Session::new(view, SessionController::new(client), frames);

    session.start();
    session.renderer.fit_to_screen().context("failed to measure the screen")?;
    session.on_viewport_change();
    session.renderer.draw().context("failed to draw the screen")?;

    let code = event_loop(&mut session, events).await;
    let stats = session.output().stats();
    tracing::info!(
        code,
        bytes = stats.bytes_enqueued,
        writes = stats.writes_issued,
        frames = stats.frames_requested,
        "session ended"
    );
    Ok(code)
}

async fn event_loop<B: Backend>(
    session: &mut Session<TerminalView<B>>,
    mut events: HostEventReceiver,
) -> i32 {
    let mut input = EventStream::new();
    let terminate = shutdown_signal();
    tokio::pin!(terminate);

    loop {
        let step = tokio::select! {
            event = events.recv() => match event {
                Some(event) => session.on_host_event(event),
                None => {
                    tracing::error!("host event stream closed");
                    ControlFlow::Break(1)
                }
            },
            wake = session.wake() => {
                session.on_wake(wake);
                ControlFlow::Continue(())
            }
            event = input.next() => match event {
                Some(Ok(event)) => session.on_terminal_event(event),
                Some(Err(err)) => {
                    tracing::error!("terminal input failed: {}", err);
                    ControlFlow::Break(1)
                }
                None => ControlFlow::Break(0),
            },
            () = &mut terminate => {
                tracing::info!("termination signal received");
                ControlFlow::Break(0)
            }
        };

        if let ControlFlow::Break(code) = step {
            return code;
        }
    }
}

async fn shutdown_signal() {
    #[cfg(unix)]
    {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    () = ctrl_c() => {},
                    _ = sigterm.recv() => {},
                }
            }
            Err(err) => {
                tracing::warn!("SIGTERM handler unavailable: {}", err);
                ctrl_c().await;
            }
        }
    }

    #[cfg(not(unix))]
    ctrl_c().await;
}

async fn ctrl_c() {
    if let Err(err) = signal::ctrl_c().await {
        tracing::warn!("Ctrl-C handler unavailable: {}", err);
        future::pending::<()>().await;
    }
}
