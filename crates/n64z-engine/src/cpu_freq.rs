//! CPU-frequency window.
//!
//! Counts true processor cycles across a 5-frame window and scales by the
//! nominal refresh rate:
//!
//! ```text
//! freq_mhz = (true_cycles / frames_elapsed) * refresh_hz / 1_000_000
//! ```
//!
//! The window arms on one tick, fires at least five frames later, then
//! disarms so the following tick starts a fresh window.

use crate::window::SamplingWindow;
use n64z_common::metrics::DerivedMetrics;
use n64z_common::time::{true_cycles, CycleCount, FrameTick};
use tracing::debug;

/// Frames per CPU-frequency window.
pub const CPU_FREQ_PERIOD_FRAMES: u64 = 5;

/// One published CPU-frequency estimate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CpuFrequencySample {
    /// Estimated clock in MHz.
    pub mhz: f64,
    /// True cycles counted over the window.
    pub true_cycles: u64,
    /// Frames the window spanned.
    pub frames: u64,
    /// Integer cycles per frame.
    pub cycles_per_frame: u64,
}

/// Convert true cycles over `frames` frames into MHz at `refresh_hz`.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn estimate_mhz(true_cycles: u64, frames: u64, refresh_hz: f64) -> f64 {
    (true_cycles as f64 / frames as f64) * refresh_hz / 1_000_000.0
}

/// Running CPU-frequency estimator.
#[derive(Debug, Clone)]
pub struct CpuFrequencyWindow {
    window: SamplingWindow,
}

impl Default for CpuFrequencyWindow {
    fn default() -> Self {
        Self::new()
    }
}

impl CpuFrequencyWindow {
    /// Create a disarmed window.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            window: SamplingWindow::new(CPU_FREQ_PERIOD_FRAMES),
        }
    }

    /// Underlying window state.
    #[must_use]
    pub fn window(&self) -> &SamplingWindow {
        &self.window
    }

    /// Advance the window with the counter value read on this tick.
    ///
    /// Returns the published sample when the window fires. A disarmed window
    /// only arms and publishes nothing.
    pub fn update(
        &mut self,
        frame: FrameTick,
        now: CycleCount,
        refresh_hz: f64,
        metrics: &mut DerivedMetrics,
    ) -> Option<CpuFrequencySample> {
        if !self.window.is_armed() {
            self.window.arm(frame, now);
            return None;
        }

        if !self.window.is_due(frame) {
            return None;
        }

        let frames = self.window.frames_elapsed(frame);
        let cycles = true_cycles(self.window.cycles_elapsed(now));
        let mhz = estimate_mhz(cycles, frames, refresh_hz);
        let cycles_per_frame = cycles / frames;

        metrics.record_cpu_frequency(mhz, cycles_per_frame);
        self.window.disarm();

        debug!(
            frame = frame.0,
            frames,
            true_cycles = cycles,
            mhz,
            "CPU frequency window fired"
        );

        Some(CpuFrequencySample {
            mhz,
            true_cycles: cycles,
            frames,
            cycles_per_frame,
        })
    }
}
