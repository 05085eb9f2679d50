//! Frame-gated sampling window.
//!
//! A window captures `(frame, counter)` when armed and reports itself due
//! once `period_frames` frames have elapsed. What happens on firing (and
//! whether it re-arms immediately or on the next tick) is up to the owner.

use n64z_common::time::{CycleCount, FrameTick};

/// Arm/measure/fire state for one periodic measurement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SamplingWindow {
    armed: bool,
    start_frame: FrameTick,
    start_cycles: CycleCount,
    period_frames: u64,
}

impl SamplingWindow {
    /// Create a disarmed window with the given period.
    #[must_use]
    pub const fn new(period_frames: u64) -> Self {
        Self {
            armed: false,
            start_frame: FrameTick::ZERO,
            start_cycles: CycleCount(0),
            period_frames,
        }
    }

    /// Capture the start of a new window.
    pub fn arm(&mut self, frame: FrameTick, cycles: CycleCount) {
        self.armed = true;
        self.start_frame = frame;
        self.start_cycles = cycles;
    }

    /// Drop the current window; the next arm starts a fresh one.
    pub fn disarm(&mut self) {
        self.armed = false;
    }

    /// Whether a window is in progress.
    #[must_use]
    pub fn is_armed(&self) -> bool {
        self.armed
    }

    /// Frames per window.
    #[must_use]
    pub fn period_frames(&self) -> u64 {
        self.period_frames
    }

    /// Frame captured at arm time.
    #[must_use]
    pub fn start_frame(&self) -> FrameTick {
        self.start_frame
    }

    /// Frames elapsed since the window was armed.
    #[must_use]
    pub fn frames_elapsed(&self, now: FrameTick) -> u64 {
        now.frames_since(self.start_frame)
    }

    /// Counter delta since the window was armed, wraparound-safe.
    #[must_use]
    pub fn cycles_elapsed(&self, now: CycleCount) -> u32 {
        now.wrapping_delta(self.start_cycles)
    }

    /// Armed and at least one full period old.
    #[must_use]
    pub fn is_due(&self, now: FrameTick) -> bool {
        self.armed && self.frames_elapsed(now) >= self.period_frames
    }
}
