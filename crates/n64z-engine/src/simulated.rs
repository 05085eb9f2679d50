//! Deterministic simulated platform.
//!
//! The counter sits on a fixed per-frame grid: at vsync `n` it reads
//! `initial + n * counts_per_frame` (mod 2^32). Each read within a frame
//! advances it by `counts_per_read`, so code that reads the counter twice
//! around a piece of work sees that work take time, while the first read
//! after every vsync lands exactly on the grid.
//!
//! All state lives in [`Cell`]s so the platform can be shared by reference
//! with the engine and still be driven from a test.

use crate::platform::{
    CacheMaintenance, CycleSource, FrameClock, RasterSource, SystemProbe, VideoTiming,
};
use n64z_common::config::{PlatformConfig, NOMINAL_CPU_CLOCK_HZ};
use n64z_common::hardware::{SystemInfo, TvStandard};
use n64z_common::time::{CycleCount, COUNT_RATE_DIVISOR};
use std::cell::Cell;

/// Counter increments per frame for a clock and refresh rate.
#[must_use]
#[allow(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]
pub fn counts_per_frame(cpu_clock_hz: u64, refresh_hz: f64) -> u32 {
    ((cpu_clock_hz / COUNT_RATE_DIVISOR) as f64 / refresh_hz).round() as u32
}

/// Virtual console driven frame by frame.
#[derive(Debug)]
pub struct SimulatedPlatform {
    frame_base: Cell<u32>,
    count: Cell<u32>,
    vsync: Cell<u64>,
    counts_per_frame: Cell<u32>,
    counts_per_read: u32,
    raster_override: Cell<Option<u32>>,
    flushes: Cell<u64>,
    system_info: SystemInfo,
}

impl Default for SimulatedPlatform {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl SimulatedPlatform {
    /// Start building a simulated platform (stock NTSC console).
    #[must_use]
    pub fn builder() -> SimulatedPlatformBuilder {
        SimulatedPlatformBuilder::default()
    }

    /// Build from the `[platform]` configuration section.
    #[must_use]
    pub fn from_config(config: &PlatformConfig) -> Self {
        Self::builder()
            .tv_standard(config.tv_standard)
            .cpu_clock_hz(config.cpu_clock_hz)
            .memory_bytes(config.memory_size_bytes)
            .prid(config.prid)
            .rcp_version(config.rcp_version)
            .initial_count(config.initial_count)
            .counts_per_read(config.counts_per_read)
            .build()
    }

    /// Move to the next vsync; the counter jumps to the next grid point.
    pub fn advance_frame(&self) -> u64 {
        let base = self.frame_base.get().wrapping_add(self.counts_per_frame.get());
        self.frame_base.set(base);
        self.count.set(base);
        let vsync = self.vsync.get() + 1;
        self.vsync.set(vsync);
        vsync
    }

    /// Advance `frames` vsyncs.
    pub fn advance_frames(&self, frames: u64) -> u64 {
        for _ in 0..frames {
            self.advance_frame();
        }
        self.vsync.get()
    }

    /// Re-base the counter grid at `count`.
    pub fn set_count(&self, count: u32) {
        self.frame_base.set(count);
        self.count.set(count);
    }

    /// Change the frame length, e.g. to model a clock change or slow frames.
    pub fn set_counts_per_frame(&self, counts: u32) {
        self.counts_per_frame.set(counts);
    }

    /// Current frame length in counter increments.
    #[must_use]
    pub fn counts_per_frame(&self) -> u32 {
        self.counts_per_frame.get()
    }

    /// Pin the raw raster register, or `None` to derive it from frame phase.
    pub fn set_raster(&self, raw: Option<u32>) {
        self.raster_override.set(raw);
    }

    /// Number of cache flushes requested so far.
    #[must_use]
    pub fn flush_count(&self) -> u64 {
        self.flushes.get()
    }
}

impl CycleSource for SimulatedPlatform {
    fn read_count(&self) -> CycleCount {
        let now = self.count.get();
        self.count.set(now.wrapping_add(self.counts_per_read));
        CycleCount(now)
    }
}

impl RasterSource for SimulatedPlatform {
    #[allow(clippy::cast_possible_truncation)]
    fn read_raster(&self) -> u32 {
        if let Some(raw) = self.raster_override.get() {
            return raw;
        }
        let per_frame = u64::from(self.counts_per_frame.get().max(1));
        let phase = u64::from(self.count.get().wrapping_sub(self.frame_base.get()));
        let lines = u64::from(self.system_info.tv_standard.scan_lines());
        let line = (phase * lines / per_frame) % lines;
        (line as u32) << 1
    }
}

impl VideoTiming for SimulatedPlatform {
    fn tv_standard(&self) -> TvStandard {
        self.system_info.tv_standard
    }
}

impl FrameClock for SimulatedPlatform {
    fn vsync_count(&self) -> u64 {
        self.vsync.get()
    }

    fn wait_for_vsync(&self) -> u64 {
        self.advance_frame()
    }
}

// SAFETY: host memory has no uncached segment; the identity alias is the
// same allocation.
#[allow(unsafe_code)]
unsafe impl CacheMaintenance for SimulatedPlatform {
    fn flush_invalidate(&self, _addr: usize, _len: usize) {
        self.flushes.set(self.flushes.get() + 1);
    }

    fn uncached_alias(&self, addr: usize) -> usize {
        addr
    }
}

impl SystemProbe for SimulatedPlatform {
    fn system_info(&self) -> SystemInfo {
        self.system_info
    }
}

/// Builder for [`SimulatedPlatform`].
#[derive(Debug, Clone)]
pub struct SimulatedPlatformBuilder {
    tv_standard: TvStandard,
    cpu_clock_hz: u64,
    counts_per_frame: Option<u32>,
    counts_per_read: u32,
    initial_count: u32,
    memory_bytes: u32,
    prid: u32,
    rcp_version: u32,
}

impl Default for SimulatedPlatformBuilder {
    fn default() -> Self {
        let defaults = PlatformConfig::default();
        Self {
            tv_standard: defaults.tv_standard,
            cpu_clock_hz: NOMINAL_CPU_CLOCK_HZ,
            counts_per_frame: None,
            counts_per_read: 0,
            initial_count: 0,
            memory_bytes: defaults.memory_size_bytes,
            prid: defaults.prid,
            rcp_version: defaults.rcp_version,
        }
    }
}

impl SimulatedPlatformBuilder {
    /// Set the video standard.
    #[must_use]
    pub fn tv_standard(mut self, tv: TvStandard) -> Self {
        self.tv_standard = tv;
        self
    }

    /// Set the modelled true clock; frame length follows from it.
    #[must_use]
    pub fn cpu_clock_hz(mut self, hz: u64) -> Self {
        self.cpu_clock_hz = hz;
        self
    }

    /// Set the frame length directly, overriding the clock.
    #[must_use]
    pub fn counts_per_frame(mut self, counts: u32) -> Self {
        self.counts_per_frame = Some(counts);
        self
    }

    /// Set how far each counter read advances the counter.
    #[must_use]
    pub fn counts_per_read(mut self, counts: u32) -> Self {
        self.counts_per_read = counts;
        self
    }

    /// Set the counter value at vsync 0.
    #[must_use]
    pub fn initial_count(mut self, count: u32) -> Self {
        self.initial_count = count;
        self
    }

    /// Set installed RDRAM.
    #[must_use]
    pub fn memory_bytes(mut self, bytes: u32) -> Self {
        self.memory_bytes = bytes;
        self
    }

    /// Set the processor-ID register.
    #[must_use]
    pub fn prid(mut self, prid: u32) -> Self {
        self.prid = prid;
        self
    }

    /// Set the MI_VERSION register.
    #[must_use]
    pub fn rcp_version(mut self, version: u32) -> Self {
        self.rcp_version = version;
        self
    }

    /// Build the platform.
    #[must_use]
    pub fn build(self) -> SimulatedPlatform {
        let per_frame = self
            .counts_per_frame
            .unwrap_or_else(|| counts_per_frame(self.cpu_clock_hz, self.tv_standard.refresh_hz()));
        SimulatedPlatform {
            frame_base: Cell::new(self.initial_count),
            count: Cell::new(self.initial_count),
            vsync: Cell::new(0),
            counts_per_frame: Cell::new(per_frame),
            counts_per_read: self.counts_per_read,
            raster_override: Cell::new(None),
            flushes: Cell::new(0),
            system_info: SystemInfo {
                prid: self.prid,
                memory_bytes: self.memory_bytes,
                rcp_version: self.rcp_version,
                tv_standard: self.tv_standard,
            },
        }
    }
}
