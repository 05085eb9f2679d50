//! Long-running stability tests.
//!
//! Runs the engine for many frames over a counter that wraps repeatedly and
//! checks that every published estimate stays on the stock values.
//!
//! # Acceptance Criteria
//!
//! - Every CPU estimate within 1e-9 MHz of 93.75
//! - Every FPS estimate within 1e-6 of the refresh rate
//! - Every bandwidth estimate identical to the first
//! - Window counts exactly match their schedules

use super::common::{engine, NOMINAL_MHZ, NTSC_COUNTS_PER_FRAME};
use n64z_engine::platform::FrameClock;
use n64z_engine::simulated::SimulatedPlatform;

/// Configuration for soak tests.
pub struct SoakConfig {
    /// Frames to run.
    pub frames: u64,
    /// Counter value at start; near `u32::MAX` to wrap early.
    pub initial_count: u32,
    /// How often to log progress (frames).
    pub log_interval_frames: u64,
}

impl Default for SoakConfig {
    fn default() -> Self {
        Self {
            frames: 36_000, // 10 minutes of NTSC frames
            initial_count: u32::MAX - NTSC_COUNTS_PER_FRAME,
            log_interval_frames: 0,
        }
    }
}

impl SoakConfig {
    /// Ten simulated minutes.
    pub fn short() -> Self {
        Self::default()
    }

    /// Twenty-four simulated hours.
    pub fn long() -> Self {
        Self {
            frames: 24 * 3600 * 60,
            log_interval_frames: 3600 * 60,
            ..Self::default()
        }
    }
}

/// Observations collected during a soak run.
#[derive(Debug, Clone, Default)]
pub struct SoakResult {
    /// Frames the engine counted.
    pub total_frames: u64,
    /// CPU windows that fired.
    pub cpu_fires: u64,
    /// FPS windows that fired.
    pub fps_fires: u64,
    /// Bandwidth benchmarks that published.
    pub bandwidth_fires: u64,
    /// Largest CPU estimate error in MHz.
    pub max_cpu_error_mhz: f64,
    /// Largest FPS estimate error.
    pub max_fps_error: f64,
    /// Distinct bandwidth values seen.
    pub bandwidth_values: Vec<u32>,
    /// Counter wraps observed.
    pub counter_wraps: u64,
}

/// Run a soak test with the given configuration.
pub fn run_soak_test(config: &SoakConfig) -> SoakResult {
    let platform = SimulatedPlatform::builder()
        .initial_count(config.initial_count)
        .counts_per_read(1_300)
        .build();
    let mut engine = engine(platform);
    let mut result = SoakResult::default();
    let mut last_count = config.initial_count;

    for _ in 0..config.frames {
        let vsync = engine.platform().wait_for_vsync();
        let Some(report) = engine.update(vsync) else {
            continue;
        };

        if let Some(sample) = report.cpu {
            result.cpu_fires += 1;
            result.max_cpu_error_mhz = result.max_cpu_error_mhz.max((sample.mhz - NOMINAL_MHZ).abs());
        }
        if let Some(fps) = report.fps {
            result.fps_fires += 1;
            result.max_fps_error = result.max_fps_error.max((fps - 60.0).abs());
        }
        if let Some(sample) = report.bandwidth {
            result.bandwidth_fires += 1;
            if !result.bandwidth_values.contains(&sample.mbps) {
                result.bandwidth_values.push(sample.mbps);
            }
        }

        let frame_base = config
            .initial_count
            .wrapping_add((vsync as u32).wrapping_mul(NTSC_COUNTS_PER_FRAME));
        if frame_base < last_count {
            result.counter_wraps += 1;
        }
        last_count = frame_base;

        if config.log_interval_frames > 0 && report.frame.0 % config.log_interval_frames == 0 {
            println!(
                "  frame={} cpu={:.4}MHz fps={:.3} bw={}MB/s wraps={}",
                report.frame.0,
                engine.metrics().cpu_freq_mhz,
                engine.metrics().actual_fps,
                engine.metrics().bandwidth_mbps,
                result.counter_wraps
            );
        }
    }

    result.total_frames = engine.frame().0;
    result
}

fn check(config: &SoakConfig, result: &SoakResult) {
    let frames = config.frames;
    assert_eq!(result.total_frames, frames);
    assert_eq!(result.cpu_fires, frames / 6);
    assert_eq!(result.bandwidth_fires, frames / 30);
    assert_eq!(result.fps_fires, (frames / 60).saturating_sub(1));
    assert!(result.max_cpu_error_mhz < 1e-9, "{result:?}");
    assert!(result.max_fps_error < 1e-6, "{result:?}");
    assert_eq!(result.bandwidth_values.len(), 1, "{result:?}");
    assert!(result.counter_wraps > 0);
}

/// Short soak test (ten simulated minutes).
#[test]
fn test_soak_short() {
    let config = SoakConfig::short();
    let result = run_soak_test(&config);
    check(&config, &result);
}

/// Long soak test (twenty-four simulated hours).
#[test]
#[ignore = "Soak test - 5.2 million frames"]
fn test_soak_long() {
    let config = SoakConfig::long();
    let result = run_soak_test(&config);
    check(&config, &result);
}
