//! Configuration structures for the monitor.
//!
//! Supports TOML deserialization with defaults matching a stock NTSC console
//! (93.75 MHz VR4300, 4 MiB RDRAM).

use crate::error::{MonitorError, MonitorResult};
use crate::hardware::TvStandard;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use tracing::debug;

/// Nominal VR4300 clock in Hz.
pub const NOMINAL_CPU_CLOCK_HZ: u64 = 93_750_000;

/// Top-level monitor configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    /// Platform backend and the hardware it models.
    pub platform: PlatformConfig,

    /// Measurement engine start-up values.
    pub engine: EngineConfig,

    /// Status logging and final report.
    pub report: ReportConfig,
}

/// Which platform backend drives the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PlatformBackend {
    /// Counter derived from the host monotonic clock; frames paced in real time.
    #[default]
    Host,
    /// Deterministic virtual clock.
    Simulated,
}

/// Platform configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlatformConfig {
    /// Backend selection.
    pub backend: PlatformBackend,

    /// Regional video standard (sets the frame rate).
    pub tv_standard: TvStandard,

    /// True processor clock being modelled, in Hz.
    pub cpu_clock_hz: u64,

    /// Installed RDRAM in bytes.
    pub memory_size_bytes: u32,

    /// Processor-ID register value reported at start-up.
    pub prid: u32,

    /// MI_VERSION register value reported at start-up.
    pub rcp_version: u32,

    /// Counter value at start-up. Set close to `u32::MAX` to exercise wraparound early.
    pub initial_count: u32,

    /// Simulated backend only: counts consumed by each counter read.
    pub counts_per_read: u32,

    /// Host backend only: sleep until the next frame boundary each loop.
    pub pace_frames: bool,
}

impl Default for PlatformConfig {
    fn default() -> Self {
        Self {
            backend: PlatformBackend::Host,
            tv_standard: TvStandard::Ntsc,
            cpu_clock_hz: NOMINAL_CPU_CLOCK_HZ,
            memory_size_bytes: 4 * 1024 * 1024,
            prid: 0x0000_0B00,
            rcp_version: 0x0202_0102,
            initial_count: 0,
            counts_per_read: 1_300,
            pace_frames: true,
        }
    }
}

impl PlatformConfig {
    /// Counter increments per second (half the true clock).
    #[must_use]
    pub fn count_rate_hz(&self) -> u64 {
        self.cpu_clock_hz / crate::time::COUNT_RATE_DIVISOR
    }
}

/// Start-up values for the derived metrics.
///
/// Everything defaults to unset, so the bandwidth and FPS windows stay idle
/// until the first CPU-frequency estimate is published.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Seed for the CPU-frequency estimate and both of its bounds, in MHz.
    pub initial_cpu_mhz: Option<f64>,

    /// Seed for the bandwidth estimate, in MB/s.
    pub initial_bandwidth_mbps: Option<u32>,

    /// Seed the FPS estimate with the nominal refresh rate.
    pub seed_fps_from_refresh: bool,
}

/// Output format of the final report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    /// Aligned label/value lines.
    #[default]
    Text,
    /// A single JSON document.
    Json,
}

/// Reporting configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    /// Wall-clock interval between status log lines.
    #[serde(with = "humantime_serde")]
    pub status_interval: Duration,

    /// Final report format.
    pub format: ReportFormat,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            status_interval: Duration::from_secs(5),
            format: ReportFormat::Text,
        }
    }
}

impl MonitorConfig {
    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &std::path::Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        debug!(path = %path.display(), bytes = content.len(), "Read config file");
        Self::from_toml(&content)
    }

    /// Parse configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML is invalid.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(ConfigError::Parse)
    }

    /// Serialize configuration to TOML string.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(ConfigError::Serialize)
    }

    /// Check value ranges that the type system cannot express.
    ///
    /// # Errors
    ///
    /// Returns [`MonitorError::InvalidValue`] naming the first bad key.
    pub fn validate(&self) -> MonitorResult<()> {
        if self.platform.cpu_clock_hz < crate::time::COUNT_RATE_DIVISOR {
            return Err(invalid("platform.cpu_clock_hz", "must be at least 2 Hz"));
        }
        if self.platform.memory_size_bytes == 0 {
            return Err(invalid("platform.memory_size_bytes", "must be non-zero"));
        }
        if let Some(mhz) = self.engine.initial_cpu_mhz {
            if !mhz.is_finite() || mhz <= 0.0 {
                return Err(invalid(
                    "engine.initial_cpu_mhz",
                    "must be a positive finite number",
                ));
            }
        }
        if self.report.status_interval.is_zero() {
            return Err(invalid("report.status_interval", "must be non-zero"));
        }
        Ok(())
    }
}

fn invalid(field: &str, reason: &str) -> MonitorError {
    MonitorError::InvalidValue {
        field: field.to_string(),
        reason: reason.to_string(),
    }
}

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File I/O error.
    #[error("failed to read config file {path}: {source}")]
    Io {
        /// Path to the configuration file.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// TOML parsing error.
    #[error("failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    /// TOML serialization error.
    #[error("failed to serialize TOML: {0}")]
    Serialize(#[from] toml::ser::Error),
}

/// Serde helper module for `Duration` using humantime format.
mod humantime_serde {
    use serde::{self, Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let s = humantime::format_duration(*duration).to_string();
        serializer.serialize_str(&s)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        humantime::parse_duration(&s).map_err(serde::de::Error::custom)
    }
}
