//! Host output delivery: the coordinator state machine and the frame clock
//! that paces it.

mod coordinator;
mod frame;

pub use coordinator::{CoordinatorPhase, CoordinatorStats, FlushAction, OutputCoordinator};
pub use frame::FrameClock;
