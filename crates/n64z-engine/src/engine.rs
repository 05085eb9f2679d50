//! Per-frame measurement engine.
//!
//! The engine owns the derived-metrics record and every window's state. It is
//! advanced exactly once per rendered frame; each tick runs, in order:
//!
//! 1. Increment the cumulative frame counter
//! 2. CPU-frequency window (every tick, self-gates at 5 frames)
//! 3. Scanline sample (every tick)
//! 4. FPS window (when the frame counter is a multiple of 60)
//! 5. Bandwidth window (when the frame counter is a multiple of 30)
//!
//! The CPU window runs first because the FPS and bandwidth windows consume
//! its freshest estimate in the same tick.

use crate::bandwidth::{BandwidthSample, BandwidthWindow, BANDWIDTH_PERIOD_FRAMES};
use crate::cpu_freq::{CpuFrequencySample, CpuFrequencyWindow};
use crate::fps::{FpsWindow, FPS_PERIOD_FRAMES};
use crate::platform::Platform;
use crate::scanline::sample_scanline;
use n64z_common::config::EngineConfig;
use n64z_common::hardware::SystemInfo;
use n64z_common::metrics::DerivedMetrics;
use n64z_common::time::FrameTick;
use tracing::{debug, info, trace};

/// What happened during one tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickReport {
    /// Frame counter after the increment.
    pub frame: FrameTick,
    /// CPU-frequency estimate published this tick.
    pub cpu: Option<CpuFrequencySample>,
    /// Scanline sampled this tick.
    pub scanline: u32,
    /// FPS published this tick.
    pub fps: Option<f64>,
    /// Bandwidth published this tick.
    pub bandwidth: Option<BandwidthSample>,
}

impl TickReport {
    /// Whether any windowed measurement published a value.
    #[must_use]
    pub fn fired_any(&self) -> bool {
        self.cpu.is_some() || self.fps.is_some() || self.bandwidth.is_some()
    }
}

/// Continuous measurement engine.
///
/// Single writer of [`DerivedMetrics`]; consumers read it through
/// [`MeasurementEngine::metrics`] or [`MeasurementEngine::snapshot`] between
/// updates.
pub struct MeasurementEngine<P: Platform> {
    platform: P,
    metrics: DerivedMetrics,
    frame: FrameTick,
    last_vsync: Option<u64>,
    refresh_hz: f64,
    system_info: SystemInfo,
    cpu: CpuFrequencyWindow,
    fps: FpsWindow,
    bandwidth: BandwidthWindow,
    frequency_locked: bool,
}

impl<P: Platform> MeasurementEngine<P> {
    /// Create an engine over `platform`, seeding metrics from `config`.
    pub fn new(platform: P, config: &EngineConfig) -> Self {
        let refresh_hz = platform.refresh_hz();
        let system_info = platform.system_info();
        let metrics = DerivedMetrics::seeded(config, refresh_hz);

        info!(
            tv = %system_info.tv_standard,
            refresh_hz,
            cpu = %system_info.cpu_revision(),
            memory_mb = system_info.memory_mb(),
            seeded_mhz = metrics.cpu_freq_mhz,
            "Measurement engine initialized"
        );

        Self {
            platform,
            metrics,
            frame: FrameTick::ZERO,
            last_vsync: None,
            refresh_hz,
            system_info,
            cpu: CpuFrequencyWindow::new(),
            fps: FpsWindow::new(),
            bandwidth: BandwidthWindow::new(),
            frequency_locked: false,
        }
    }

    /// Create an engine with every metric unset.
    pub fn with_defaults(platform: P) -> Self {
        Self::new(platform, &EngineConfig::default())
    }

    /// Current derived metrics.
    pub fn metrics(&self) -> &DerivedMetrics {
        &self.metrics
    }

    /// Copy of the current derived metrics.
    pub fn snapshot(&self) -> DerivedMetrics {
        self.metrics
    }

    /// Frames counted so far.
    pub fn frame(&self) -> FrameTick {
        self.frame
    }

    /// The platform the engine measures.
    pub fn platform(&self) -> &P {
        &self.platform
    }

    /// Identity captured at construction.
    pub fn system_info(&self) -> &SystemInfo {
        &self.system_info
    }

    /// Nominal refresh rate used for calibration.
    pub fn refresh_hz(&self) -> f64 {
        self.refresh_hz
    }

    /// Frame-signal entry point.
    ///
    /// Ticks once if `vsync` differs from the last value seen. Repeated
    /// calls for the same vsync return `None` and change nothing.
    pub fn update(&mut self, vsync: u64) -> Option<TickReport> {
        if self.last_vsync == Some(vsync) {
            trace!(vsync, "Duplicate vsync ignored");
            return None;
        }
        self.last_vsync = Some(vsync);
        Some(self.tick())
    }

    /// Advance exactly one frame and run every due measurement.
    pub fn tick(&mut self) -> TickReport {
        self.frame = self.frame.next();
        let frame = self.frame;
        self.metrics.total_frames = frame.0;

        let now = self.platform.read_count();
        let cpu = self
            .cpu
            .update(frame, now, self.refresh_hz, &mut self.metrics);
        if !self.frequency_locked && cpu.is_some_and(|sample| sample.mhz > 0.0) {
            self.frequency_locked = true;
            info!(
                frame = frame.0,
                mhz = self.metrics.cpu_freq_mhz,
                "First CPU frequency estimate"
            );
        }

        let scanline = sample_scanline(self.platform.read_raster(), &mut self.metrics);

        let fps = if frame.is_multiple_of(FPS_PERIOD_FRAMES) {
            let now = self.platform.read_count();
            self.fps
                .update(frame, now, self.metrics.cpu_freq_mhz, &mut self.metrics)
        } else {
            None
        };

        let bandwidth = if frame.is_multiple_of(BANDWIDTH_PERIOD_FRAMES) {
            self.bandwidth.update(
                frame,
                self.metrics.cpu_freq_mhz,
                &self.platform,
                &mut self.metrics,
            )
        } else {
            None
        };

        let report = TickReport {
            frame,
            cpu,
            scanline,
            fps,
            bandwidth,
        };

        if report.fired_any() {
            debug!(
                frame = frame.0,
                cpu_mhz = self.metrics.cpu_freq_mhz,
                fps = self.metrics.actual_fps,
                bandwidth_mbps = self.metrics.bandwidth_mbps,
                "Metrics updated"
            );
        } else {
            trace!(frame = frame.0, scanline, "Tick");
        }

        report
    }
}
