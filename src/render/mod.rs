//! Renderer contract and the terminal view that implements it.
//!
//! The output coordinator only needs two things from a renderer: accept a
//! chunk and signal when it has been consumed, and report the grid size. The
//! production renderer is [`TerminalView`], an `alacritty_terminal` grid drawn
//! with ratatui.

pub mod emulator;
pub mod input;
pub mod layout;
pub mod terminal_guard;
mod view;
mod widget;

pub use view::TerminalView;
pub use widget::TerminalBody;

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use thiserror::Error;
use tokio::sync::oneshot;

use crate::grid::GridSize;

pub trait Renderer {
    /// Start consuming `chunk`. The returned completion must resolve exactly
    /// once, after the chunk has been consumed.
    fn write(&mut self, chunk: String) -> WriteCompletion;

    /// Current grid size in cells.
    fn measure(&self) -> GridSize;
}

/// The renderer dropped its [`WriteNotifier`] without completing the write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("renderer dropped a write without completing it")]
pub struct WriteAborted;

/// Renderer-side half of a write completion.
#[derive(Debug)]
pub struct WriteNotifier {
    sender: oneshot::Sender<()>,
}

impl WriteNotifier {
    pub fn complete(self) {
        if self.sender.send(()).is_err() {
            tracing::trace!("write completion dropped (receiver gone)");
        }
    }
}

/// Coordinator-side half of a write completion.
#[derive(Debug)]
#[must_use = "a write is outstanding until its completion resolves"]
pub struct WriteCompletion {
    receiver: oneshot::Receiver<()>,
}

impl WriteCompletion {
    pub fn channel() -> (WriteNotifier, WriteCompletion) {
        let (sender, receiver) = oneshot::channel();
        (WriteNotifier { sender }, WriteCompletion { receiver })
    }

    /// A completion that has already resolved.
    pub fn completed() -> WriteCompletion {
        let (notifier, completion) = Self::channel();
        notifier.complete();
        completion
    }
}

impl Future for WriteCompletion {
    type Output = Result<(), WriteAborted>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.get_mut().receiver)
            .poll(cx)
            .map(|result| result.map_err(|_| WriteAborted))
    }
}
