//! Static hardware descriptors.
//!
//! Values here are read once at start-up (processor ID, memory size, RCP
//! version) or selected by the regional video standard; none of them change
//! during a run.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Regional video standard driving the frame clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TvStandard {
    /// 50 Hz, 625-line.
    Pal,
    /// 60 Hz, 525-line.
    #[default]
    Ntsc,
    /// Brazilian 60 Hz variant.
    Mpal,
    /// Unrecognized standard; timed as 60 Hz.
    Unknown,
}

impl TvStandard {
    /// Decode the boot-time TV type code (0 = PAL, 1 = NTSC, 2 = MPAL).
    #[must_use]
    pub fn from_code(code: u32) -> Self {
        match code {
            0 => Self::Pal,
            1 => Self::Ntsc,
            2 => Self::Mpal,
            _ => Self::Unknown,
        }
    }

    /// Nominal refresh rate in Hz, the calibration reference for the
    /// CPU-frequency window.
    #[must_use]
    pub fn refresh_hz(&self) -> f64 {
        match self {
            Self::Pal => 50.0,
            Self::Ntsc | Self::Mpal | Self::Unknown => 60.0,
        }
    }

    /// Scan lines per field, including blanking.
    #[must_use]
    pub fn scan_lines(&self) -> u32 {
        match self {
            Self::Pal => 313,
            Self::Ntsc | Self::Mpal | Self::Unknown => 263,
        }
    }
}

impl fmt::Display for TvStandard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pal => write!(f, "PAL"),
            Self::Ntsc => write!(f, "NTSC"),
            Self::Mpal => write!(f, "MPAL"),
            Self::Unknown => write!(f, "Unknown"),
        }
    }
}

/// VR4300 silicon revision, decoded from the processor-ID register.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum CpuRevision {
    /// Implementation revision 0x00.
    Rev1_0,
    /// Implementation revision 0x01.
    Rev2_0,
    /// Implementation revision 0x02.
    Rev3_0,
    /// Any other revision byte.
    Unknown,
}

impl CpuRevision {
    /// Decode from a raw PRId value. Only the low byte is significant.
    #[must_use]
    pub fn from_prid(prid: u32) -> Self {
        match prid & 0xFF {
            0x00 => Self::Rev1_0,
            0x01 => Self::Rev2_0,
            0x02 => Self::Rev3_0,
            _ => Self::Unknown,
        }
    }
}

impl fmt::Display for CpuRevision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Rev1_0 => write!(f, "VR4300 Rev 1.0"),
            Self::Rev2_0 => write!(f, "VR4300 Rev 2.0"),
            Self::Rev3_0 => write!(f, "VR4300 Rev 3.0"),
            Self::Unknown => write!(f, "VR4300 Unknown"),
        }
    }
}

/// Memory size reported when the Expansion Pak is installed.
pub const EXPANSION_PAK_MB: u32 = 8;

/// Platform identity read once at start-up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SystemInfo {
    /// Raw processor-ID register.
    pub prid: u32,
    /// Installed RDRAM in bytes.
    pub memory_bytes: u32,
    /// Raw MI_VERSION register.
    pub rcp_version: u32,
    /// Regional video standard.
    pub tv_standard: TvStandard,
}

impl SystemInfo {
    /// Installed RDRAM in whole megabytes.
    #[must_use]
    pub fn memory_mb(&self) -> u32 {
        self.memory_bytes / (1024 * 1024)
    }

    /// True when exactly 8 MB of RDRAM is present.
    #[must_use]
    pub fn has_expansion_pak(&self) -> bool {
        self.memory_mb() == EXPANSION_PAK_MB
    }

    /// Decoded processor revision.
    #[must_use]
    pub fn cpu_revision(&self) -> CpuRevision {
        CpuRevision::from_prid(self.prid)
    }
}
