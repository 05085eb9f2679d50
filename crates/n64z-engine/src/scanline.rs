//! Scanline sampler.
//!
//! VI_CURRENT holds the current half-line; bits 10:1 are the line number.
//! Sampled unconditionally every tick with no smoothing.

use n64z_common::metrics::DerivedMetrics;

/// Mask applied after dropping the field bit.
pub const SCANLINE_MASK: u32 = 0x3FF;

/// Decode the line number from a raw VI_CURRENT value.
#[must_use]
pub const fn decode_scanline(raw: u32) -> u32 {
    (raw >> 1) & SCANLINE_MASK
}

/// Publish the line number from this tick's raw register read.
pub fn sample_scanline(raw: u32, metrics: &mut DerivedMetrics) -> u32 {
    let line = decode_scanline(raw);
    metrics.current_scanline = line;
    line
}
