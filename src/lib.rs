//! Frame-paced terminal front-end.
//!
//! A PTY host streams shell output over an async bridge. The
//! [`output::OutputCoordinator`] batches that stream so the renderer is
//! written at most once per display frame, never concurrently, and without
//! losing or reordering bytes. The [`session`] layer wires keystrokes and
//! viewport changes back to the host.

pub mod cli;
pub mod config;
pub mod grid;
pub mod host;
pub mod logging;
pub mod output;
pub mod render;
pub mod session;

pub use grid::GridSize;
