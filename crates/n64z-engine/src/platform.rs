//! Platform collaborator traits.
//!
//! The measurement logic never touches hardware directly. Each external
//! interface it consumes is a narrow trait so the same windows run against
//! real registers, the host clock, or a deterministic simulation:
//!
//! - [`CycleSource`] - the free-running COUNT register
//! - [`RasterSource`] - the raw video-beam position register
//! - [`VideoTiming`] - the regional refresh rate used for calibration
//! - [`FrameClock`] - the once-per-frame vsync signal
//! - [`CacheMaintenance`] - cache writeback and uncached aliasing
//! - [`SystemProbe`] - static identity read at start-up

use n64z_common::hardware::{SystemInfo, TvStandard};
use n64z_common::time::CycleCount;

/// Read-only access to the free-running cycle counter.
pub trait CycleSource {
    /// Current counter value. Must not have side effects on the hardware.
    fn read_count(&self) -> CycleCount;
}

/// Read-only access to the video interface's current-line register.
pub trait RasterSource {
    /// Raw register value; decode with [`crate::scanline::decode_scanline`].
    fn read_raster(&self) -> u32;
}

/// Regional video timing.
pub trait VideoTiming {
    /// Active video standard.
    fn tv_standard(&self) -> TvStandard;

    /// Nominal refresh rate in Hz.
    fn refresh_hz(&self) -> f64 {
        self.tv_standard().refresh_hz()
    }
}

/// The external once-per-frame signal.
pub trait FrameClock {
    /// Number of vertical syncs observed so far.
    fn vsync_count(&self) -> u64;

    /// Block until the next vertical sync and return the new count.
    ///
    /// Backends without a real vsync return the current count immediately.
    fn wait_for_vsync(&self) -> u64 {
        self.vsync_count()
    }
}

/// Cache maintenance for the uncached bandwidth benchmark.
///
/// # Safety
///
/// Implementors guarantee that for any address `addr` inside a live
/// allocation, `uncached_alias(addr)` is a valid, suitably aligned address
/// for the same physical memory, so reads and writes through it are
/// equivalent to reads and writes through `addr` once the range has been
/// flushed.
#[allow(unsafe_code)]
pub unsafe trait CacheMaintenance {
    /// Write back and invalidate every cache line backing `addr..addr + len`.
    fn flush_invalidate(&self, addr: usize, len: usize);

    /// Map a cached address to its uncached equivalent.
    fn uncached_alias(&self, addr: usize) -> usize;
}

/// Static platform identity.
pub trait SystemProbe {
    /// Processor ID, memory size, RCP version and video standard.
    fn system_info(&self) -> SystemInfo;
}

/// Everything the measurement engine needs from a platform.
pub trait Platform:
    CycleSource + RasterSource + VideoTiming + FrameClock + CacheMaintenance + SystemProbe
{
}

impl<T> Platform for T where
    T: CycleSource + RasterSource + VideoTiming + FrameClock + CacheMaintenance + SystemProbe
{
}
