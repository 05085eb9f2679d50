//! Window-scheduling acceptance tests.
//!
//! # Acceptance Criteria
//!
//! - No estimate is published before its first window completes
//! - CPU windows fire every sixth frame, forever, without drift
//! - Bandwidth runs on every 30th frame, FPS on every 60th from frame 120
//! - A zero CPU frequency skips the dependent windows and keeps old values

use super::common::{
    assert_close, engine, expected_bandwidth, frames_where, run_frames, stock_engine,
};
use n64z_common::config::EngineConfig;
use n64z_engine::engine::MeasurementEngine;
use n64z_engine::simulated::SimulatedPlatform;

#[test]
fn test_startup_suppression() {
    let mut engine = engine(SimulatedPlatform::builder().counts_per_read(1_300).build());

    run_frames(&mut engine, 5);
    assert_eq!(engine.metrics().cpu_freq_mhz, 0.0);
    assert_eq!(engine.metrics().cpu_freq_min_mhz, 0.0);

    run_frames(&mut engine, 24);
    assert!(engine.metrics().has_cpu_frequency());
    assert_eq!(engine.metrics().bandwidth_mbps, 0);

    run_frames(&mut engine, 90);
    assert_eq!(engine.frame().0, 119);
    assert_eq!(engine.metrics().actual_fps, 0.0);

    run_frames(&mut engine, 1);
    assert_close(engine.metrics().actual_fps, 60.0, 1e-6);
}

#[test]
fn test_cpu_windows_do_not_drift() {
    let mut engine = stock_engine();
    let reports = run_frames(&mut engine, 6_000);

    let fired = frames_where(&reports, |r| r.cpu.is_some());
    assert_eq!(fired.len(), 1_000);
    assert!(fired.iter().all(|f| f % 6 == 0));
    assert!(reports.iter().filter_map(|r| r.cpu).all(|s| s.frames == 5));
}

#[test]
fn test_bandwidth_every_thirty_frames() {
    let mut engine = engine(SimulatedPlatform::builder().counts_per_read(1_300).build());
    let reports = run_frames(&mut engine, 300);

    let fired = frames_where(&reports, |r| r.bandwidth.is_some());
    assert_eq!(fired, (1..=10).map(|n| n * 30).collect::<Vec<_>>());

    let expected = expected_bandwidth(1_300, 93.75);
    assert!(expected > 0);
    for sample in reports.iter().filter_map(|r| r.bandwidth) {
        assert_eq!(sample.mbps, expected);
        assert_eq!(sample.true_cycles, 2_600);
    }
    assert_eq!(engine.metrics().bandwidth_mbps, expected);
    assert_eq!(engine.platform().flush_count(), 20);
}

#[test]
fn test_fps_every_sixty_frames_after_first_arm() {
    let mut engine = stock_engine();
    let reports = run_frames(&mut engine, 600);

    let fired = frames_where(&reports, |r| r.fps.is_some());
    assert_eq!(fired, (2..=10).map(|n| n * 60).collect::<Vec<_>>());
    for fps in reports.iter().filter_map(|r| r.fps) {
        assert_close(fps, 60.0, 1e-6);
    }
}

#[test]
fn test_zero_frequency_keeps_seeded_values() {
    let config = EngineConfig {
        initial_cpu_mhz: Some(93.75),
        initial_bandwidth_mbps: Some(500),
        seed_fps_from_refresh: true,
    };
    let platform = SimulatedPlatform::builder()
        .counts_per_frame(0)
        .counts_per_read(0)
        .build();
    let mut engine = MeasurementEngine::new(platform, &config);

    let reports = run_frames(&mut engine, 240);

    // The counter never moves, so every CPU window publishes 0 MHz.
    assert_eq!(engine.metrics().cpu_freq_mhz, 0.0);
    assert!(reports.iter().all(|r| r.bandwidth.is_none() && r.fps.is_none()));
    assert_eq!(engine.metrics().bandwidth_mbps, 500);
    assert_eq!(engine.metrics().actual_fps, 60.0);
    assert_eq!(engine.platform().flush_count(), 0);
}

#[test]
fn test_degenerate_benchmark_keeps_previous_value() {
    let config = EngineConfig {
        initial_bandwidth_mbps: Some(500),
        ..EngineConfig::default()
    };
    let platform = SimulatedPlatform::builder().counts_per_read(0).build();
    let mut engine = MeasurementEngine::new(platform, &config);

    let reports = run_frames(&mut engine, 90);

    assert!(engine.metrics().has_cpu_frequency());
    assert!(reports.iter().all(|r| r.bandwidth.is_none()));
    assert_eq!(engine.metrics().bandwidth_mbps, 500);
}
