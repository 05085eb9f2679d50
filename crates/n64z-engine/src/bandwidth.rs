//! Memory-bandwidth window.
//!
//! Every 30 frames, times a word-by-word copy of 4 KiB between two buffers
//! accessed through their uncached aliases, so the copy measures the memory
//! controller rather than the data cache. Elapsed cycles are converted to
//! seconds with the current CPU-frequency estimate:
//!
//! ```text
//! bandwidth_mbps = (4096 / (true_cycles / (cpu_mhz * 1e6))) / 1_048_576
//! ```
//!
//! The benchmark blocks the caller for its whole duration (1024 word copies).

use crate::platform::{CacheMaintenance, CycleSource};
use n64z_common::metrics::DerivedMetrics;
use n64z_common::time::{true_cycles, FrameTick};
use std::ptr;
use tracing::debug;

/// Frames between bandwidth benchmarks.
pub const BANDWIDTH_PERIOD_FRAMES: u64 = 30;

/// Bytes copied per benchmark.
pub const BENCHMARK_BYTES: usize = 4096;

const BENCHMARK_WORDS: usize = BENCHMARK_BYTES / std::mem::size_of::<u32>();

/// One published bandwidth estimate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BandwidthSample {
    /// Throughput in MB/s (truncated).
    pub mbps: u32,
    /// True cycles the timed copy took.
    pub true_cycles: u64,
}

/// Throughput in MB/s for one benchmark copy.
///
/// `None` when the frequency is unset or no cycles elapsed.
#[must_use]
#[allow(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]
pub fn bandwidth_mbps(true_cycles: u64, cpu_mhz: f64) -> Option<u32> {
    if cpu_mhz <= 0.0 || true_cycles == 0 {
        return None;
    }
    let seconds = true_cycles as f64 / (cpu_mhz * 1_000_000.0);
    let mbps = (BENCHMARK_BYTES as f64 / seconds) / 1_048_576.0;
    mbps.is_finite().then_some(mbps as u32)
}

#[repr(C, align(16))]
struct AlignedWords([u32; BENCHMARK_WORDS]);

/// Source and destination buffers for the copy benchmark.
pub struct BenchmarkBuffers {
    src: Box<AlignedWords>,
    dst: Box<AlignedWords>,
}

impl std::fmt::Debug for BenchmarkBuffers {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BenchmarkBuffers")
            .field("bytes", &BENCHMARK_BYTES)
            .finish_non_exhaustive()
    }
}

impl Default for BenchmarkBuffers {
    fn default() -> Self {
        Self::new()
    }
}

impl BenchmarkBuffers {
    /// Allocate zeroed, 16-byte aligned buffers.
    #[must_use]
    pub fn new() -> Self {
        Self {
            src: Box::new(AlignedWords([0; BENCHMARK_WORDS])),
            dst: Box::new(AlignedWords([0; BENCHMARK_WORDS])),
        }
    }

    /// Fill the source with a counting pattern, flush both buffers, then
    /// time the uncached copy. Returns the raw counter delta.
    ///
    /// The pattern is written through the cached view so the flush writes it
    /// back together with any lines still dirty from allocation.
    #[allow(unsafe_code, clippy::cast_possible_truncation)]
    pub fn timed_copy<P>(&mut self, platform: &P) -> u32
    where
        P: CycleSource + CacheMaintenance + ?Sized,
    {
        for (i, word) in self.src.0.iter_mut().enumerate() {
            *word = i as u32;
        }

        let src_addr = self.src.0.as_mut_ptr() as usize;
        let dst_addr = self.dst.0.as_mut_ptr() as usize;
        platform.flush_invalidate(src_addr, BENCHMARK_BYTES);
        platform.flush_invalidate(dst_addr, BENCHMARK_BYTES);

        let src = platform.uncached_alias(src_addr) as *const u32;
        let dst = platform.uncached_alias(dst_addr) as *mut u32;

        let start = platform.read_count();
        for i in 0..BENCHMARK_WORDS {
            // SAFETY: both aliases cover live, exclusively borrowed buffers of
            // BENCHMARK_WORDS words (CacheMaintenance contract) that never
            // overlap.
            unsafe {
                let word = ptr::read_volatile(src.add(i));
                ptr::write_volatile(dst.add(i), word);
            }
        }
        let end = platform.read_count();

        end.wrapping_delta(start)
    }

    /// Destination contents after the last copy.
    #[must_use]
    pub fn destination(&self) -> &[u32] {
        &self.dst.0
    }
}

/// Periodic bandwidth benchmark.
#[derive(Debug, Default)]
pub struct BandwidthWindow {
    last_fire_frame: FrameTick,
    buffers: Option<BenchmarkBuffers>,
}

impl BandwidthWindow {
    /// Create a window that first fires at frame 30.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Frame of the last benchmark attempt.
    #[must_use]
    pub fn last_fire_frame(&self) -> FrameTick {
        self.last_fire_frame
    }

    /// Buffers used by the benchmark, once allocated.
    #[must_use]
    pub fn buffers(&self) -> Option<&BenchmarkBuffers> {
        self.buffers.as_ref()
    }

    /// Run the benchmark if 30 frames have passed since the last attempt.
    ///
    /// With no usable CPU-frequency estimate the attempt is consumed but the
    /// copy is not run and the previous bandwidth is kept.
    pub fn update<P>(
        &mut self,
        frame: FrameTick,
        cpu_mhz: f64,
        platform: &P,
        metrics: &mut DerivedMetrics,
    ) -> Option<BandwidthSample>
    where
        P: CycleSource + CacheMaintenance + ?Sized,
    {
        if frame.frames_since(self.last_fire_frame) < BANDWIDTH_PERIOD_FRAMES {
            return None;
        }
        self.last_fire_frame = frame;

        if cpu_mhz <= 0.0 {
            debug!(frame = frame.0, "Bandwidth benchmark skipped, no CPU frequency yet");
            return None;
        }

        let delta = self
            .buffers
            .get_or_insert_with(BenchmarkBuffers::new)
            .timed_copy(platform);
        let cycles = true_cycles(delta);

        if let Some(mbps) = bandwidth_mbps(cycles, cpu_mhz) {
            metrics.bandwidth_mbps = mbps;
            debug!(frame = frame.0, true_cycles = cycles, mbps, "Bandwidth window fired");
            Some(BandwidthSample {
                mbps,
                true_cycles: cycles,
            })
        } else {
            debug!(frame = frame.0, "Bandwidth benchmark observed no elapsed cycles");
            None
        }
    }
}
