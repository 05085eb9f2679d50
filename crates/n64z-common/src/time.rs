//! Cycle-counter and frame-tick primitives.
//!
//! The processor's free-running COUNT register increments at half the true
//! clock and wraps at 2^32. Every elapsed-time computation in the engine goes
//! through [`CycleCount::wrapping_delta`], which is correct for any pair of
//! samples taken less than one full wrap apart.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The COUNT register advances once every two processor cycles.
pub const COUNT_RATE_DIVISOR: u64 = 2;

/// Raw value of the 32-bit hardware cycle counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct CycleCount(pub u32);

impl CycleCount {
    /// Counts elapsed since `earlier`, using unsigned wraparound subtraction.
    #[must_use]
    pub const fn wrapping_delta(self, earlier: CycleCount) -> u32 {
        self.0.wrapping_sub(earlier.0)
    }

    /// Counter value `counts` after this one, wrapping at 2^32.
    #[must_use]
    pub const fn wrapping_add(self, counts: u32) -> CycleCount {
        CycleCount(self.0.wrapping_add(counts))
    }
}

impl fmt::Display for CycleCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#010x}", self.0)
    }
}

/// Convert a counter delta into true processor cycles.
///
/// Widened to 64 bits so deltas above 2^31 do not overflow.
#[must_use]
pub const fn true_cycles(count_delta: u32) -> u64 {
    count_delta as u64 * COUNT_RATE_DIVISOR
}

/// Cumulative frame counter owned by the measurement engine.
///
/// Starts at zero and is incremented once per engine tick; never reset
/// during a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub struct FrameTick(pub u64);

impl FrameTick {
    /// The frame counter before the first tick.
    pub const ZERO: FrameTick = FrameTick(0);

    /// The following frame.
    #[must_use]
    pub const fn next(self) -> FrameTick {
        FrameTick(self.0 + 1)
    }

    /// Frames elapsed since `earlier` (zero if `earlier` is in the future).
    #[must_use]
    pub const fn frames_since(self, earlier: FrameTick) -> u64 {
        self.0.saturating_sub(earlier.0)
    }

    /// Whether this frame number is a non-zero multiple of `period`.
    #[must_use]
    pub const fn is_multiple_of(self, period: u64) -> bool {
        period != 0 && self.0 != 0 && self.0 % period == 0
    }
}

impl fmt::Display for FrameTick {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
