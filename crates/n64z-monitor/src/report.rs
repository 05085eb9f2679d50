//! Final report printed when the monitor exits.
//!
//! Combines the static system identity with the last derived-metrics
//! snapshot. Rendered either as aligned label/value text or as one JSON
//! document.

use n64z_common::config::{PlatformBackend, ReportFormat};
use n64z_common::hardware::{CpuRevision, SystemInfo, TvStandard};
use n64z_common::metrics::DerivedMetrics;
use serde::{Serialize, Serializer};
use std::fmt::Write as _;
use std::time::Duration;

/// Static platform identity as shown in the report.
#[derive(Debug, Clone, Serialize)]
pub struct SystemSection {
    /// Decoded processor revision.
    #[serde(serialize_with = "display")]
    pub cpu_revision: CpuRevision,
    /// Raw processor-ID register.
    #[serde(serialize_with = "hex32")]
    pub prid: u32,
    /// Installed RDRAM.
    pub memory_mb: u32,
    /// 8 MB of RDRAM present.
    pub expansion_pak: bool,
    /// Raw MI_VERSION register.
    #[serde(serialize_with = "hex32")]
    pub rcp_version: u32,
    /// Regional video standard.
    pub tv_standard: TvStandard,
    /// Nominal refresh rate.
    pub refresh_hz: f64,
}

impl From<&SystemInfo> for SystemSection {
    fn from(info: &SystemInfo) -> Self {
        Self {
            cpu_revision: info.cpu_revision(),
            prid: info.prid,
            memory_mb: info.memory_mb(),
            expansion_pak: info.has_expansion_pak(),
            rcp_version: info.rcp_version,
            tv_standard: info.tv_standard,
            refresh_hz: info.tv_standard.refresh_hz(),
        }
    }
}

/// Everything printed at exit.
#[derive(Debug, Clone, Serialize)]
pub struct MonitorReport {
    /// Monitor version.
    pub version: &'static str,
    /// Backend that drove the engine.
    pub backend: PlatformBackend,
    /// Wall-clock run time.
    #[serde(serialize_with = "humantime_duration")]
    pub uptime: Duration,
    /// Static identity.
    pub system: SystemSection,
    /// Last metrics snapshot.
    pub metrics: DerivedMetrics,
}

impl MonitorReport {
    /// Assemble a report.
    pub fn new(
        backend: PlatformBackend,
        info: &SystemInfo,
        metrics: DerivedMetrics,
        uptime: Duration,
    ) -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION"),
            backend,
            uptime,
            system: SystemSection::from(info),
            metrics,
        }
    }

    /// Render in the requested format.
    pub fn render(&self, format: ReportFormat) -> serde_json::Result<String> {
        match format {
            ReportFormat::Text => Ok(self.to_text()),
            ReportFormat::Json => serde_json::to_string_pretty(self),
        }
    }

    /// Aligned `label : value` lines.
    pub fn to_text(&self) -> String {
        let system = &self.system;
        let metrics = &self.metrics;
        let mut out = String::new();

        let mut line = |label: &str, value: String| {
            let _ = writeln!(out, "{label:<20} : {value}");
        };

        line("CPU", system.cpu_revision.to_string());
        line("PRId", format!("{:#010X}", system.prid));
        line("Memory", format!("{} MB", system.memory_mb));
        line(
            "Expansion Pak",
            if system.expansion_pak { "yes" } else { "no" }.to_string(),
        );
        line("RCP version", format!("{:#010X}", system.rcp_version));
        line(
            "TV standard",
            format!("{} ({} Hz)", system.tv_standard, system.refresh_hz),
        );

        if metrics.has_cpu_frequency() {
            line(
                "CPU frequency",
                format!(
                    "{:.2} MHz (min {:.2}, max {:.2})",
                    metrics.cpu_freq_mhz, metrics.cpu_freq_min_mhz, metrics.cpu_freq_max_mhz
                ),
            );
        } else {
            line("CPU frequency", "n/a".to_string());
        }
        if let Some(spread) = metrics.cpu_freq_spread_mhz() {
            line("CPU spread", format!("{spread:.2} MHz"));
        }
        line("Cycles/frame", metrics.cycles_per_frame.to_string());
        line("Bandwidth", format!("{} MB/s", metrics.bandwidth_mbps));
        line("FPS", format!("{:.2}", metrics.actual_fps));
        line("Scanline", metrics.current_scanline.to_string());
        line("Frames", metrics.total_frames.to_string());
        line("Backend", format!("{:?}", self.backend).to_lowercase());
        line(
            "Uptime",
            humantime::format_duration(truncate_to_millis(self.uptime)).to_string(),
        );

        out
    }
}

fn truncate_to_millis(duration: Duration) -> Duration {
    Duration::from_millis(u64::try_from(duration.as_millis()).unwrap_or(u64::MAX))
}

fn hex32<S: Serializer>(value: &u32, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&format!("{value:#010X}"))
}

fn display<T: std::fmt::Display, S: Serializer>(value: &T, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(value)
}

fn humantime_duration<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(&humantime::format_duration(truncate_to_millis(*value)))
}
