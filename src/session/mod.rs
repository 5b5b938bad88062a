//! The terminal session: host control plus the event loop that drives output
//! delivery.

mod controller;
mod runtime;

pub use controller::{HostOp, SessionController};
pub use runtime::{run, Session, Wake};
