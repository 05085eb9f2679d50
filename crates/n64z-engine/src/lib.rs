#![doc = "Continuous measurement engine for n64z."]
//!
//! The engine derives live CPU frequency, memory bandwidth, achieved frame
//! rate and the current scanline from a free-running cycle counter sampled
//! once per frame. Hardware access goes through the traits in [`platform`],
//! with three backends: [`simulated`], [`host`] and [`mmio`].

pub mod bandwidth;
pub mod cpu_freq;
pub mod engine;
pub mod fps;
pub mod host;
pub mod mmio;
pub mod platform;
pub mod scanline;
pub mod simulated;
pub mod window;

pub use bandwidth::*;
pub use cpu_freq::*;
pub use engine::*;
pub use fps::*;
pub use host::HostPlatform;
pub use mmio::{BareMetalPlatform, FirmwareHooks, MmioRegister};
pub use platform::*;
pub use scanline::*;
pub use simulated::{SimulatedPlatform, SimulatedPlatformBuilder};
pub use window::*;
