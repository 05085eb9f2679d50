//! Common utilities for acceptance tests.
//!
//! Provides helpers for:
//! - Building engines over the simulated platform
//! - Driving them frame by frame through the vsync entry point
//! - Computing expected values straight from the measurement formulas

#![allow(dead_code)]

use n64z_engine::engine::{MeasurementEngine, TickReport};
use n64z_engine::platform::FrameClock;
use n64z_engine::simulated::SimulatedPlatform;

/// Counter increments per frame for a 93.75 MHz clock at 60 Hz.
pub const NTSC_COUNTS_PER_FRAME: u32 = 781_250;

/// Counter increments per frame for a 93.75 MHz clock at 50 Hz.
pub const PAL_COUNTS_PER_FRAME: u32 = 937_500;

/// Stock VR4300 clock in MHz.
pub const NOMINAL_MHZ: f64 = 93.75;

/// Engine over the simulated platform.
pub type SimEngine = MeasurementEngine<SimulatedPlatform>;

/// Unseeded engine over `platform`.
pub fn engine(platform: SimulatedPlatform) -> SimEngine {
    MeasurementEngine::with_defaults(platform)
}

/// Unseeded engine over a stock NTSC console.
pub fn stock_engine() -> SimEngine {
    engine(SimulatedPlatform::default())
}

/// Wait for `frames` vsyncs, updating the engine after each.
pub fn run_frames(engine: &mut SimEngine, frames: u64) -> Vec<TickReport> {
    (0..frames)
        .map(|_| {
            let vsync = engine.platform().wait_for_vsync();
            engine
                .update(vsync)
                .expect("every new vsync advances the engine")
        })
        .collect()
}

/// Frame numbers of the reports matching `pred`.
pub fn frames_where(reports: &[TickReport], pred: impl Fn(&TickReport) -> bool) -> Vec<u64> {
    reports
        .iter()
        .filter(|r| pred(r))
        .map(|r| r.frame.0)
        .collect()
}

/// CPU-frequency formula applied to a raw counter delta.
pub fn expected_mhz(count_delta: u32, frames: u64, refresh_hz: f64) -> f64 {
    (f64::from(count_delta) * 2.0 / frames as f64) * refresh_hz / 1_000_000.0
}

/// Bandwidth formula applied to a raw counter delta.
pub fn expected_bandwidth(count_delta: u32, cpu_mhz: f64) -> u32 {
    let seconds = (f64::from(count_delta) * 2.0) / (cpu_mhz * 1_000_000.0);
    ((4096.0 / seconds) / 1_048_576.0) as u32
}

/// Assert two floats are within `tolerance`.
pub fn assert_close(actual: f64, expected: f64, tolerance: f64) {
    assert!(
        (actual - expected).abs() <= tolerance,
        "expected {expected} +/- {tolerance}, got {actual}"
    );
}
