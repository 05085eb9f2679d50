//! Host-clock platform.
//!
//! Runs the engine on a workstation. The cycle counter is derived from the
//! monotonic clock at the configured count rate (half the modelled CPU
//! clock) and wraps at 2^32 like the real register. Vsync is a fixed
//! wall-clock frame grid at the video standard's refresh rate.

use crate::platform::{
    CacheMaintenance, CycleSource, FrameClock, RasterSource, SystemProbe, VideoTiming,
};
use n64z_common::config::PlatformConfig;
use n64z_common::error::{MonitorError, MonitorResult};
use n64z_common::hardware::{SystemInfo, TvStandard};
use n64z_common::time::CycleCount;
use std::time::{Duration, Instant};
use tracing::debug;

/// Platform backed by [`Instant`].
#[derive(Debug, Clone)]
pub struct HostPlatform {
    epoch: Instant,
    count_rate_hz: u64,
    initial_count: u32,
    frame_period: Duration,
    pace_frames: bool,
    system_info: SystemInfo,
}

impl HostPlatform {
    /// Build from the `[platform]` configuration section.
    ///
    /// # Errors
    ///
    /// Returns [`MonitorError::Platform`] if the count rate or refresh rate
    /// is zero.
    pub fn from_config(config: &PlatformConfig) -> MonitorResult<Self> {
        let count_rate_hz = config.count_rate_hz();
        if count_rate_hz == 0 {
            return Err(MonitorError::Platform(format!(
                "cpu_clock_hz {} gives a zero count rate",
                config.cpu_clock_hz
            )));
        }

        let refresh_hz = config.tv_standard.refresh_hz();
        if refresh_hz <= 0.0 {
            return Err(MonitorError::Platform(format!(
                "{} has no refresh rate",
                config.tv_standard
            )));
        }
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let frame_period = Duration::from_nanos((1e9 / refresh_hz).round() as u64);

        debug!(
            count_rate_hz,
            frame_period_us = frame_period.as_micros(),
            tv = %config.tv_standard,
            "Host platform configured"
        );

        Ok(Self {
            epoch: Instant::now(),
            count_rate_hz,
            initial_count: config.initial_count,
            frame_period,
            pace_frames: config.pace_frames,
            system_info: SystemInfo {
                prid: config.prid,
                memory_bytes: config.memory_size_bytes,
                rcp_version: config.rcp_version,
                tv_standard: config.tv_standard,
            },
        })
    }

    /// Wall-clock length of one frame.
    #[must_use]
    pub fn frame_period(&self) -> Duration {
        self.frame_period
    }

    /// Counter value `elapsed` after start-up.
    #[allow(clippy::cast_possible_truncation)]
    fn count_at(&self, elapsed: Duration) -> u32 {
        let counts = elapsed.as_nanos() * u128::from(self.count_rate_hz) / 1_000_000_000;
        self.initial_count.wrapping_add(counts as u32)
    }

    #[allow(clippy::cast_possible_truncation)]
    fn frame_phase(&self) -> (u64, Duration) {
        let elapsed = self.epoch.elapsed();
        let period = self.frame_period.as_nanos().max(1);
        let frames = elapsed.as_nanos() / period;
        let into_frame = elapsed.as_nanos() % period;
        (frames as u64, Duration::from_nanos(into_frame as u64))
    }
}

impl CycleSource for HostPlatform {
    fn read_count(&self) -> CycleCount {
        CycleCount(self.count_at(self.epoch.elapsed()))
    }
}

impl RasterSource for HostPlatform {
    #[allow(clippy::cast_possible_truncation)]
    fn read_raster(&self) -> u32 {
        let (_, into_frame) = self.frame_phase();
        let lines = u128::from(self.system_info.tv_standard.scan_lines());
        let line = into_frame.as_nanos() * lines / self.frame_period.as_nanos().max(1);
        (line as u32) << 1
    }
}

impl VideoTiming for HostPlatform {
    fn tv_standard(&self) -> TvStandard {
        self.system_info.tv_standard
    }
}

impl FrameClock for HostPlatform {
    fn vsync_count(&self) -> u64 {
        self.frame_phase().0
    }

    fn wait_for_vsync(&self) -> u64 {
        if !self.pace_frames {
            return self.vsync_count();
        }
        let (frames, into_frame) = self.frame_phase();
        sleep_for(self.frame_period.saturating_sub(into_frame));
        frames + 1
    }
}

// SAFETY: host memory has no uncached segment; the identity alias is the
// same allocation and there is nothing to flush.
#[allow(unsafe_code)]
unsafe impl CacheMaintenance for HostPlatform {
    fn flush_invalidate(&self, _addr: usize, _len: usize) {}

    fn uncached_alias(&self, addr: usize) -> usize {
        addr
    }
}

impl SystemProbe for HostPlatform {
    fn system_info(&self) -> SystemInfo {
        self.system_info
    }
}

/// Sleep for `duration` on the monotonic clock.
#[cfg(target_os = "linux")]
#[allow(unsafe_code, clippy::cast_possible_wrap)]
fn sleep_for(duration: Duration) {
    if duration.is_zero() {
        return;
    }

    let ts = libc::timespec {
        tv_sec: duration.as_secs() as libc::time_t,
        tv_nsec: duration.subsec_nanos() as libc::c_long,
    };

    // SAFETY: `ts` is a valid timespec and the remainder pointer may be null.
    unsafe {
        libc::clock_nanosleep(libc::CLOCK_MONOTONIC, 0, &ts, std::ptr::null_mut());
    }
}

#[cfg(not(target_os = "linux"))]
fn sleep_for(duration: Duration) {
    std::thread::sleep(duration);
}
