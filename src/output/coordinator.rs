//! Output coordinator: coalesces host output into frame-aligned renderer writes.
//!
//! The coordinator is a small state machine over three pieces of private state:
//! the pending buffer, the "frame scheduled" flag and the "write in flight"
//! flag. It performs no I/O. Every operation returns a [`FlushAction`] telling
//! the caller what to do next: arm a frame callback, hand a chunk to the
//! renderer, or nothing.
//!
//! ```text
//!            enqueue                 frame tick
//!   Idle ───────────────→ Scheduled ───────────→ Flushing
//!    ↑                                            │   ↑
//!    │ write completed, buffer empty     enqueue  ↓   │ frame tick (no-op)
//!    └──────────────────────────── FlushingPendingMore
//!                      write completed, buffer non-empty → Scheduled
//! ```

use std::mem;

/// Observable state of the coordinator.
///
/// A frame request may coexist with a write in flight (bytes arrived while the
/// renderer was busy); [`OutputCoordinator::is_frame_scheduled`] reports that
/// independently of the phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoordinatorPhase {
    /// Nothing pending, no frame requested, renderer idle.
    Idle,
    /// A frame callback is armed and the renderer is idle.
    Scheduled,
    /// A write is outstanding and nothing new has arrived.
    Flushing,
    /// A write is outstanding and more output is waiting behind it.
    FlushingPendingMore,
}

/// Effect the caller must carry out after a coordinator operation.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use]
pub enum FlushAction {
    /// Nothing to do.
    Idle,
    /// Arm a one-shot callback for the next frame tick and call
    /// [`OutputCoordinator::on_frame`] when it fires.
    RequestFrame,
    /// Hand the chunk to the renderer and call
    /// [`OutputCoordinator::write_completed`] once it reports completion.
    Write(String),
}

/// Running totals, emitted in trace logs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CoordinatorStats {
    pub bytes_enqueued: u64,
    pub writes_issued: u64,
    pub frames_requested: u64,
}

#[derive(Debug, Default)]
pub struct OutputCoordinator {
    pending: String,
    frame_scheduled: bool,
    write_in_flight: bool,
    stats: CoordinatorStats,
}

impl OutputCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a chunk of host output.
    ///
    /// Empty chunks are ignored. Otherwise the chunk is concatenated to the
    /// pending buffer and a flush is scheduled.
    pub fn enqueue(&mut self, chunk: &str) -> FlushAction {
        if chunk.is_empty() {
            return FlushAction::Idle;
        }
        self.pending.push_str(chunk);
        self.stats.bytes_enqueued += chunk.len() as u64;
        self.schedule_flush()
    }

    /// Request a frame callback unless one is already outstanding.
    pub fn schedule_flush(&mut self) -> FlushAction {
        if self.frame_scheduled {
            return FlushAction::Idle;
        }
        self.frame_scheduled = true;
        self.stats.frames_requested += 1;
        FlushAction::RequestFrame
    }

    /// Frame callback. Clears the schedule flag, then flushes.
    pub fn on_frame(&mut self) -> FlushAction {
        self.frame_scheduled = false;
        self.flush()
    }

    /// Take the whole pending buffer as one write.
    ///
    /// Returns [`FlushAction::Idle`] while a write is outstanding; the
    /// completion path re-checks the buffer. Output arriving after this call
    /// accumulates in a fresh buffer and never joins the chunk being written.
    pub fn flush(&mut self) -> FlushAction {
        if self.write_in_flight || self.pending.is_empty() {
            return FlushAction::Idle;
        }
        self.write_in_flight = true;
        self.stats.writes_issued += 1;
        let chunk = mem::take(&mut self.pending);
        tracing::trace!(
            bytes = chunk.len(),
            writes = self.stats.writes_issued,
            enqueued = self.stats.bytes_enqueued,
            "flushing pending output"
        );
        FlushAction::Write(chunk)
    }

    /// Renderer finished the outstanding write.
    ///
    /// Anything that arrived meanwhile is scheduled for the next frame rather
    /// than flushed immediately.
    pub fn write_completed(&mut self) -> FlushAction {
        if !self.write_in_flight {
            tracing::warn!("write completion received with no write in flight");
            return FlushAction::Idle;
        }
        self.write_in_flight = false;
        if self.pending.is_empty() {
            return FlushAction::Idle;
        }
        self.schedule_flush()
    }

    pub fn phase(&self) -> CoordinatorPhase {
        match (self.write_in_flight, self.pending.is_empty()) {
            (true, true) => CoordinatorPhase::Flushing,
            (true, false) => CoordinatorPhase::FlushingPendingMore,
            (false, _) if self.frame_scheduled => CoordinatorPhase::Scheduled,
            (false, _) => CoordinatorPhase::Idle,
        }
    }

    pub fn is_frame_scheduled(&self) -> bool {
        self.frame_scheduled
    }

    pub fn is_write_in_flight(&self) -> bool {
        self.write_in_flight
    }

    /// Number of bytes waiting for the next flush.
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    pub fn stats(&self) -> CoordinatorStats {
        self.stats
    }
}
