//! CPU-frequency acceptance tests.
//!
//! # Acceptance Criteria
//!
//! - Identical counter sequences give bit-identical estimates
//! - The estimate is calibrated by the regional refresh rate
//! - Counter wraparound is invisible to the estimate
//! - Min/max bounds do not depend on the order estimates arrive in

use super::common::{
    assert_close, engine, expected_mhz, run_frames, stock_engine, NOMINAL_MHZ,
    NTSC_COUNTS_PER_FRAME, PAL_COUNTS_PER_FRAME,
};
use n64z_common::hardware::TvStandard;
use n64z_engine::simulated::SimulatedPlatform;

#[test]
fn test_estimate_matches_formula() {
    let mut engine = engine(SimulatedPlatform::builder().counts_per_frame(780_000).build());
    let reports = run_frames(&mut engine, 6);

    let sample = reports[5].cpu.expect("window fires on frame 6");
    assert_eq!(sample.mhz, expected_mhz(5 * 780_000, 5, 60.0));
    assert_eq!(sample.cycles_per_frame, 1_560_000);
    assert_eq!(engine.metrics().cpu_freq_mhz, sample.mhz);
}

#[test]
fn test_identical_runs_are_bit_identical() {
    let build = || {
        SimulatedPlatform::builder()
            .counts_per_frame(781_111)
            .counts_per_read(977)
            .initial_count(0x8000_0000)
            .build()
    };
    let mut first = engine(build());
    let mut second = engine(build());

    let a = run_frames(&mut first, 600);
    let b = run_frames(&mut second, 600);

    assert_eq!(a, b);
    assert_eq!(first.snapshot(), second.snapshot());
}

#[test]
fn test_ntsc_stock_clock() {
    let mut engine = stock_engine();
    run_frames(&mut engine, 60);

    assert_close(engine.metrics().cpu_freq_mhz, NOMINAL_MHZ, 1e-9);
    assert_eq!(
        engine.metrics().cycles_per_frame,
        u64::from(NTSC_COUNTS_PER_FRAME) * 2
    );
}

#[test]
fn test_pal_calibration() {
    let platform = SimulatedPlatform::builder()
        .tv_standard(TvStandard::Pal)
        .build();
    assert_eq!(platform.counts_per_frame(), PAL_COUNTS_PER_FRAME);

    let mut engine = engine(platform);
    run_frames(&mut engine, 60);

    assert_eq!(engine.refresh_hz(), 50.0);
    assert_close(engine.metrics().cpu_freq_mhz, NOMINAL_MHZ, 1e-9);
}

#[test]
fn test_counter_wraparound_is_transparent() {
    let platform = SimulatedPlatform::builder()
        .initial_count(u32::MAX - 3 * NTSC_COUNTS_PER_FRAME)
        .build();
    let mut engine = engine(platform);
    let reports = run_frames(&mut engine, 60);

    let samples: Vec<f64> = reports.iter().filter_map(|r| r.cpu).map(|s| s.mhz).collect();
    assert_eq!(samples.len(), 10);
    for mhz in samples {
        assert_close(mhz, NOMINAL_MHZ, 1e-9);
    }
}

#[test]
fn test_bounds_independent_of_order() {
    let orders: [[u32; 3]; 6] = [
        [780_000, 781_250, 782_500],
        [780_000, 782_500, 781_250],
        [781_250, 780_000, 782_500],
        [781_250, 782_500, 780_000],
        [782_500, 780_000, 781_250],
        [782_500, 781_250, 780_000],
    ];

    let low = expected_mhz(5 * 780_000, 5, 60.0);
    let high = expected_mhz(5 * 782_500, 5, 60.0);

    for order in orders {
        let mut engine = stock_engine();
        for counts in order {
            engine.platform().set_counts_per_frame(counts);
            run_frames(&mut engine, 6);
        }

        let metrics = engine.snapshot();
        assert_eq!(metrics.cpu_freq_min_mhz, low, "order {order:?}");
        assert_eq!(metrics.cpu_freq_max_mhz, high, "order {order:?}");
        assert_eq!(metrics.cpu_freq_mhz, expected_mhz(5 * order[2], 5, 60.0));
    }
}
