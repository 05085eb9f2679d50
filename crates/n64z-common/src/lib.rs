#![doc = "Common types shared across the n64z workspace."]

pub mod config;
pub mod error;
pub mod hardware;
pub mod metrics;
pub mod time;

pub use config::*;
pub use error::*;
pub use hardware::*;
pub use metrics::*;
pub use time::*;
