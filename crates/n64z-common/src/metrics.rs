//! Derived-metrics store.
//!
//! [`DerivedMetrics`] is the single record the measurement engine writes and
//! every consumer reads. It is plain `Copy` data: consumers take a snapshot
//! once per displayed frame, after the engine's update for that frame has
//! returned.

use crate::config::EngineConfig;
use serde::Serialize;

/// Current best estimates of the platform's live operating parameters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct DerivedMetrics {
    /// Most recent CPU-frequency estimate in MHz (0.0 until first estimate).
    pub cpu_freq_mhz: f64,
    /// Lowest CPU-frequency estimate seen in MHz (0.0 = unset).
    pub cpu_freq_min_mhz: f64,
    /// Highest CPU-frequency estimate seen in MHz (0.0 = unset).
    pub cpu_freq_max_mhz: f64,
    /// True processor cycles per frame from the last CPU window.
    pub cycles_per_frame: u64,
    /// Uncached RDRAM copy throughput in MB/s.
    pub bandwidth_mbps: u32,
    /// Video beam line at the last tick.
    pub current_scanline: u32,
    /// Achieved frames per second over the last FPS window.
    pub actual_fps: f64,
    /// Frames counted since the engine started.
    pub total_frames: u64,
}

impl DerivedMetrics {
    /// Create an empty record with every estimate unset.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a record carrying the configured start-up estimates.
    #[must_use]
    pub fn seeded(config: &EngineConfig, refresh_hz: f64) -> Self {
        let mut metrics = Self::new();
        if let Some(mhz) = config.initial_cpu_mhz {
            metrics.cpu_freq_mhz = mhz;
            metrics.cpu_freq_min_mhz = mhz;
            metrics.cpu_freq_max_mhz = mhz;
        }
        if let Some(bandwidth) = config.initial_bandwidth_mbps {
            metrics.bandwidth_mbps = bandwidth;
        }
        if config.seed_fps_from_refresh {
            metrics.actual_fps = refresh_hz;
        }
        metrics
    }

    /// Publish a CPU-frequency estimate and fold it into the running bounds.
    ///
    /// The minimum moves only when unset or strictly undercut; the maximum
    /// only when strictly exceeded. The first estimate seeds both.
    pub fn record_cpu_frequency(&mut self, mhz: f64, cycles_per_frame: u64) {
        self.cpu_freq_mhz = mhz;
        self.cycles_per_frame = cycles_per_frame;

        if self.cpu_freq_min_mhz == 0.0 || mhz < self.cpu_freq_min_mhz {
            self.cpu_freq_min_mhz = mhz;
        }
        if mhz > self.cpu_freq_max_mhz {
            self.cpu_freq_max_mhz = mhz;
        }
    }

    /// Whether a non-zero CPU-frequency estimate is available for the
    /// windows that depend on it.
    #[must_use]
    pub fn has_cpu_frequency(&self) -> bool {
        self.cpu_freq_mhz > 0.0
    }

    /// Spread between the highest and lowest estimate, once both are set.
    #[must_use]
    pub fn cpu_freq_spread_mhz(&self) -> Option<f64> {
        if self.cpu_freq_min_mhz > 0.0 && self.cpu_freq_max_mhz > 0.0 {
            Some(self.cpu_freq_max_mhz - self.cpu_freq_min_mhz)
        } else {
            None
        }
    }
}
