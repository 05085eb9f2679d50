//! Engine-level acceptance tests.
//!
//! # Acceptance Criteria
//!
//! - Repeating the update for the same vsync changes nothing
//! - The scanline is refreshed on every frame
//! - Configuration seeds and platform identity reach the engine

use super::common::{run_frames, stock_engine};
use n64z_common::config::{MonitorConfig, PlatformBackend};
use n64z_common::hardware::{CpuRevision, TvStandard};
use n64z_engine::engine::MeasurementEngine;
use n64z_engine::platform::FrameClock;
use n64z_engine::simulated::SimulatedPlatform;

#[test]
fn test_update_is_idempotent_per_vsync() {
    let mut engine = stock_engine();
    run_frames(&mut engine, 119);

    let vsync = engine.platform().vsync_count();
    let before = engine.snapshot();
    for _ in 0..10 {
        assert!(engine.update(vsync).is_none());
    }

    assert_eq!(engine.snapshot(), before);
    assert_eq!(engine.frame().0, 119);

    // The next real vsync still completes the FPS window on schedule.
    let next = engine.platform().wait_for_vsync();
    let report = engine.update(next).unwrap();
    assert_eq!(report.frame.0, 120);
    assert!(report.fps.is_some());
}

#[test]
fn test_missed_vsyncs_count_as_one_frame() {
    let mut engine = stock_engine();
    let vsync = engine.platform().advance_frames(4);

    let report = engine.update(vsync).unwrap();
    assert_eq!(report.frame.0, 1);
    assert_eq!(engine.metrics().total_frames, 1);
}

#[test]
fn test_scanline_fresh_every_frame() {
    let mut engine = stock_engine();
    let raws = [0x000_u32, 0x001, 0x0F2, 0x20B, 0x7FE, 0xFFFF_FFFF];

    for raw in raws {
        engine.platform().set_raster(Some(raw));
        let vsync = engine.platform().wait_for_vsync();
        let report = engine.update(vsync).unwrap();

        assert_eq!(report.scanline, (raw >> 1) & 0x3FF);
        assert_eq!(engine.metrics().current_scanline, report.scanline);
    }
}

#[test]
fn test_scanline_follows_frame_phase() {
    let platform = SimulatedPlatform::builder().counts_per_read(50_000).build();
    let mut engine = MeasurementEngine::with_defaults(platform);

    for report in run_frames(&mut engine, 30) {
        assert!(report.scanline < 263);
    }
}

#[test]
fn test_engine_from_toml_config() {
    let config = MonitorConfig::from_toml(
        r#"
        [platform]
        backend = "simulated"
        tv_standard = "pal"
        memory_size_bytes = 8388608
        prid = 0x0B22

        [engine]
        initial_cpu_mhz = 93.75
        initial_bandwidth_mbps = 500
        seed_fps_from_refresh = true
        "#,
    )
    .unwrap();
    config.validate().unwrap();
    assert_eq!(config.platform.backend, PlatformBackend::Simulated);

    let platform = SimulatedPlatform::from_config(&config.platform);
    let engine = MeasurementEngine::new(platform, &config.engine);

    let metrics = engine.snapshot();
    assert_eq!(metrics.cpu_freq_mhz, 93.75);
    assert_eq!(metrics.bandwidth_mbps, 500);
    assert_eq!(metrics.actual_fps, 50.0);

    let info = engine.system_info();
    assert_eq!(info.tv_standard, TvStandard::Pal);
    assert!(info.has_expansion_pak());
    assert_eq!(info.cpu_revision(), CpuRevision::Unknown);
}

#[test]
fn test_revision_decoding_ignores_high_bits() {
    let platform = SimulatedPlatform::builder().prid(0x0000_0B01).build();
    let engine = MeasurementEngine::with_defaults(platform);
    assert_eq!(engine.system_info().cpu_revision(), CpuRevision::Rev2_0);
    assert_eq!(engine.system_info().memory_mb(), 4);
    assert!(!engine.system_info().has_expansion_pak());
}
