//! FPS window.
//!
//! Measures the achieved frame rate over 60-frame windows, timed with the
//! cycle counter and the current CPU-frequency estimate rather than the
//! nominal refresh rate. The first window only arms once the cumulative
//! frame counter has reached 60, so start-up frames are never measured.

use crate::window::SamplingWindow;
use n64z_common::metrics::DerivedMetrics;
use n64z_common::time::{true_cycles, CycleCount, FrameTick};
use tracing::debug;

/// Frames per FPS window, and the start-up delay before the first one.
pub const FPS_PERIOD_FRAMES: u64 = 60;

/// Frames per second for `frames` frames spanning `true_cycles` at `cpu_mhz`.
///
/// `None` when the frequency is unset or the interval is degenerate.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn frames_per_second(frames: u64, true_cycles: u64, cpu_mhz: f64) -> Option<f64> {
    if cpu_mhz <= 0.0 || frames == 0 {
        return None;
    }
    let seconds = true_cycles as f64 / (cpu_mhz * 1_000_000.0);
    let fps = frames as f64 / seconds;
    fps.is_finite().then_some(fps)
}

/// Achieved-frame-rate estimator.
#[derive(Debug, Clone)]
pub struct FpsWindow {
    first_sample: bool,
    window: SamplingWindow,
}

impl Default for FpsWindow {
    fn default() -> Self {
        Self::new()
    }
}

impl FpsWindow {
    /// Create a window awaiting its start-up arm.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            first_sample: true,
            window: SamplingWindow::new(FPS_PERIOD_FRAMES),
        }
    }

    /// Underlying window state.
    #[must_use]
    pub fn window(&self) -> &SamplingWindow {
        &self.window
    }

    /// Advance the window.
    ///
    /// `now` is the counter read for this invocation; `cpu_mhz` is the
    /// freshest CPU-frequency estimate. Returns the published FPS when the
    /// window fires with a usable frequency. A firing window always re-arms,
    /// even when the result is skipped.
    pub fn update(
        &mut self,
        frame: FrameTick,
        now: CycleCount,
        cpu_mhz: f64,
        metrics: &mut DerivedMetrics,
    ) -> Option<f64> {
        if self.first_sample {
            if frame.0 >= FPS_PERIOD_FRAMES {
                self.window.arm(frame, now);
                self.first_sample = false;
                debug!(frame = frame.0, "FPS window armed");
            }
            return None;
        }

        if !self.window.is_due(frame) {
            return None;
        }

        let frames = self.window.frames_elapsed(frame);
        let cycles = true_cycles(self.window.cycles_elapsed(now));
        self.window.arm(frame, now);

        match frames_per_second(frames, cycles, cpu_mhz) {
            Some(fps) => {
                metrics.actual_fps = fps;
                debug!(frame = frame.0, frames, true_cycles = cycles, fps, "FPS window fired");
                Some(fps)
            }
            None => {
                debug!(
                    frame = frame.0,
                    cpu_mhz, "FPS window skipped, no usable CPU frequency"
                );
                None
            }
        }
    }
}
