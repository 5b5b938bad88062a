use portable_pty::{native_pty_system, Child, MasterPty, SlavePty};
use std::io::{self, Read, Write};
use std::thread;
use tokio::sync::oneshot;

use crate::grid::GridSize;
use crate::host::shell::ShellCommand;
use crate::host::utf8::Utf8StreamDecoder;
use crate::host::{
    HostCommand, HostCommandReceiver, HostError, HostEvent, HostEventSender, HostResult, Reply,
};

const READ_BUFFER: usize = 8192;

/// Host side of the bridge: owns the pseudo-terminal and the shell process.
///
/// Commands are served on a dedicated thread. Output is read on a second
/// thread and pushed as [`HostEvent::Data`]; a third thread waits for the
/// child and reports [`HostEvent::Exited`]. A failed spawn leaves no child
/// behind and can be retried.
pub struct PtyHost {
    shell: ShellCommand,
    master: Box<dyn MasterPty + Send>,
    slave: Option<Box<dyn SlavePty + Send>>,
    writer: Option<Box<dyn Write + Send>>,
    events: HostEventSender,
}

impl PtyHost {
    /// Open a pseudo-terminal at `size`. The shell is not started until a
    /// [`HostCommand::Spawn`] arrives.
    pub fn open(
        shell: ShellCommand,
        size: GridSize,
        events: HostEventSender,
    ) -> Result<Self, HostError> {
        let pair = native_pty_system()
            .openpty(size.into())
            .map_err(|err| HostError::OpenPty(err.to_string()))?;

        Ok(Self {
            shell,
            master: pair.master,
            slave: Some(pair.slave),
            writer: None,
            events,
        })
    }

    /// Serve commands on a new `pty-host` thread.
    pub fn start(self, commands: HostCommandReceiver) -> io::Result<thread::JoinHandle<()>> {
        thread::Builder::new()
            .name("pty-host".to_string())
            .spawn(move || self.serve(commands))
    }

    /// Blocking command loop. Returns once every [`crate::host::HostClient`]
    /// is dropped.
    pub fn serve(mut self, mut commands: HostCommandReceiver) {
        while let Some(command) = commands.blocking_recv() {
            match command {
                HostCommand::Spawn { respond_to } => {
                    let result = self.spawn();
                    respond(respond_to, result, "spawn");
                }
                HostCommand::Resize { size, respond_to } => {
                    let result = self.resize(size);
                    respond(respond_to, result, "resize");
                }
                HostCommand::SendInput { data, respond_to } => {
                    let result = self.send_input(&data);
                    respond(respond_to, result, "send-input");
                }
            }
        }
        tracing::debug!("host command channel closed");
    }

    fn spawn(&mut self) -> HostResult {
        let slave = self.slave.as_ref().ok_or(HostError::AlreadySpawned)?;
        let reader = self
            .master
            .try_clone_reader()
            .map_err(|err| HostError::Pty(err.to_string()))?;
        if self.writer.is_none() {
            let writer = self
                .master
                .take_writer()
                .map_err(|err| HostError::Pty(err.to_string()))?;
            self.writer = Some(writer);
        }
        let watchers = Watchers::launch(&self.events)?;

        let child = slave
            .spawn_command(self.shell.to_command_builder())
            .map_err(|err| HostError::Spawn {
                command: self.shell.program().to_string(),
                reason: err.to_string(),
            })?;
        watchers.attach(reader, child)?;
        // The child holds its own handle; ours would keep the pty open after exit.
        self.slave = None;

        tracing::info!(program = self.shell.program(), "shell spawned");
        Ok(())
    }

    fn resize(&mut self, size: GridSize) -> HostResult {
        self.master
            .resize(size.into())
            .map_err(|err| HostError::Resize(err.to_string()))?;
        tracing::debug!(%size, "pty resized");
        Ok(())
    }

    fn send_input(&mut self, data: &str) -> HostResult {
        if self.slave.is_some() {
            return Err(HostError::NotSpawned);
        }
        let writer = self.writer.as_mut().ok_or(HostError::NotSpawned)?;
        writer.write_all(data.as_bytes())?;
        writer.flush()?;
        Ok(())
    }
}

type ChildProcess = Box<dyn Child + Send + Sync>;

/// Output and exit watcher threads.
///
/// They are started before the shell and block until handed their resource,
/// so a running child always has both. Dropping an unattached set lets the
/// threads exit.
struct Watchers {
    reader: oneshot::Sender<Box<dyn Read + Send>>,
    child: oneshot::Sender<ChildProcess>,
}

impl Watchers {
    fn launch(events: &HostEventSender) -> io::Result<Self> {
        let (reader, reader_slot) = oneshot::channel::<Box<dyn Read + Send>>();
        let output_events = events.clone();
        thread::Builder::new()
            .name("pty-reader".to_string())
            .spawn(move || {
                if let Ok(reader) = reader_slot.blocking_recv() {
                    read_output(reader, output_events);
                }
            })?;

        let (child, child_slot) = oneshot::channel::<ChildProcess>();
        let exit_events = events.clone();
        thread::Builder::new()
            .name("pty-child".to_string())
            .spawn(move || {
                if let Ok(child) = child_slot.blocking_recv() {
                    wait_for_exit(child, exit_events);
                }
            })?;

        Ok(Self { reader, child })
    }

    /// Hand the reader and the child to their threads. If either thread is
    /// gone the child is killed and reaped before the error is returned.
    fn attach(self, reader: Box<dyn Read + Send>, child: ChildProcess) -> HostResult {
        if self.reader.send(reader).is_err() {
            return Err(discard(child, "output watcher"));
        }
        if let Err(child) = self.child.send(child) {
            return Err(discard(child, "exit watcher"));
        }
        Ok(())
    }
}

fn discard(mut child: ChildProcess, watcher: &str) -> HostError {
    if let Err(err) = child.kill() {
        tracing::warn!("failed to kill unwatched shell: {}", err);
    }
    if let Err(err) = child.wait() {
        tracing::warn!("failed to reap unwatched shell: {}", err);
    }
    HostError::Pty(format!("{} thread is gone", watcher))
}

fn respond(respond_to: Reply, result: HostResult, op: &str) {
    if respond_to.send(result).is_err() {
        tracing::trace!("host: {} reply dropped (receiver gone)", op);
    }
}

fn read_output(mut reader: Box<dyn Read + Send>, events: HostEventSender) {
    let mut decoder = Utf8StreamDecoder::new();
    let mut buffer = [0u8; READ_BUFFER];

    loop {
        let count = match reader.read(&mut buffer) {
            Ok(0) => break,
            Ok(count) => count,
            Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
            Err(err) if is_hangup(&err) => break,
            Err(err) => {
                let _ = events.send(HostEvent::Error(format!("pty read error: {}", err)));
                break;
            }
        };
        let text = decoder.push(&buffer[..count]);
        if !text.is_empty() && events.send(HostEvent::Data(text)).is_err() {
            return;
        }
    }

    let tail = decoder.finish();
    if !tail.is_empty() {
        let _ = events.send(HostEvent::Data(tail));
    }
    tracing::debug!("pty reader finished");
}

/// Linux reports EIO on the master once the last slave handle is closed.
fn is_hangup(err: &io::Error) -> bool {
    cfg!(target_os = "linux") && err.raw_os_error() == Some(5)
}

fn wait_for_exit(mut child: ChildProcess, events: HostEventSender) {
    let code = match child.wait() {
        Ok(status) => status.exit_code(),
        Err(err) => {
            let _ = events.send(HostEvent::Error(format!("failed to wait for shell: {}", err)));
            1
        }
    };
    tracing::info!(code, "shell exited");
    let _ = events.send(HostEvent::Exited { code });
}
