//! Bare-metal platform for the console itself.
//!
//! Memory-mapped registers are read with volatile loads through their KSEG1
//! (uncached) addresses. Coprocessor-0 reads, cache instructions and the
//! vsync interrupt need target assembly or the boot firmware, so those are
//! supplied as plain function hooks by the firmware that links this crate.

use crate::platform::{
    CacheMaintenance, CycleSource, FrameClock, RasterSource, SystemProbe, VideoTiming,
};
use n64z_common::hardware::{SystemInfo, TvStandard};
use n64z_common::time::CycleCount;
use std::ptr;

/// MIPS interface version register (RCP revision).
pub const MI_VERSION_REG: usize = 0xA430_0004;
/// Video interface current half-line register.
pub const VI_CURRENT_REG: usize = 0xA440_0004;

/// Bit that selects the KSEG1 (uncached) mirror of a KSEG0 address.
pub const KSEG1_ALIAS_BIT: usize = 0x2000_0000;

/// Uncached alias of a cached KSEG0 address.
#[must_use]
pub const fn kseg1_alias(addr: usize) -> usize {
    addr | KSEG1_ALIAS_BIT
}

/// A read-only 32-bit memory-mapped register.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MmioRegister {
    addr: usize,
}

impl MmioRegister {
    /// Wrap a register address.
    ///
    /// # Safety
    ///
    /// `addr` must be a 4-byte aligned address that stays readable for the
    /// lifetime of the value, and reading it must have no side effects.
    #[must_use]
    #[allow(unsafe_code)]
    pub const unsafe fn new(addr: usize) -> Self {
        Self { addr }
    }

    /// Register address.
    #[must_use]
    pub const fn address(&self) -> usize {
        self.addr
    }

    /// Volatile 32-bit load.
    #[must_use]
    #[allow(unsafe_code)]
    pub fn read(&self) -> u32 {
        // SAFETY: guaranteed by the contract of `new`.
        unsafe { ptr::read_volatile(self.addr as *const u32) }
    }
}

/// Firmware-provided primitives that cannot be expressed as MMIO loads.
#[derive(Debug, Clone, Copy)]
pub struct FirmwareHooks {
    /// `mfc0 $9` (COUNT).
    pub read_count: fn() -> u32,
    /// `mfc0 $15` (PRId).
    pub read_prid: fn() -> u32,
    /// Data-cache writeback and invalidate over `addr..addr + len`.
    pub writeback_invalidate: fn(usize, usize),
    /// Vertical retrace interrupts taken so far.
    pub vsync_count: fn() -> u64,
    /// Block until the next retrace interrupt; returns the new count.
    pub wait_for_vsync: fn() -> u64,
    /// Boot-time TV type code.
    pub tv_type: u32,
    /// Installed RDRAM in bytes, as detected by the boot code.
    pub memory_size: u32,
}

/// Platform running on the real console.
#[derive(Debug, Clone, Copy)]
pub struct BareMetalPlatform {
    hooks: FirmwareHooks,
    vi_current: MmioRegister,
    mi_version: MmioRegister,
}

impl BareMetalPlatform {
    /// Bind to the console's fixed register addresses.
    ///
    /// # Safety
    ///
    /// Must only be called when running on the console (or an accurate
    /// emulator) where the RCP registers are mapped, and `hooks` must
    /// implement the operations their fields describe.
    #[must_use]
    #[allow(unsafe_code)]
    pub unsafe fn new(hooks: FirmwareHooks) -> Self {
        Self::with_registers(
            hooks,
            MmioRegister::new(VI_CURRENT_REG),
            MmioRegister::new(MI_VERSION_REG),
        )
    }

    /// Bind to explicit register locations.
    ///
    /// # Safety
    ///
    /// Same contract as [`BareMetalPlatform::new`]: the registers must be
    /// valid and `hooks` must implement the operations they describe.
    #[must_use]
    #[allow(unsafe_code)]
    pub const unsafe fn with_registers(
        hooks: FirmwareHooks,
        vi_current: MmioRegister,
        mi_version: MmioRegister,
    ) -> Self {
        Self {
            hooks,
            vi_current,
            mi_version,
        }
    }
}

impl CycleSource for BareMetalPlatform {
    fn read_count(&self) -> CycleCount {
        CycleCount((self.hooks.read_count)())
    }
}

impl RasterSource for BareMetalPlatform {
    fn read_raster(&self) -> u32 {
        self.vi_current.read()
    }
}

impl VideoTiming for BareMetalPlatform {
    fn tv_standard(&self) -> TvStandard {
        TvStandard::from_code(self.hooks.tv_type)
    }
}

impl FrameClock for BareMetalPlatform {
    fn vsync_count(&self) -> u64 {
        (self.hooks.vsync_count)()
    }

    fn wait_for_vsync(&self) -> u64 {
        (self.hooks.wait_for_vsync)()
    }
}

// SAFETY: KSEG0 and KSEG1 mirror the same physical RDRAM; the writeback
// hook makes the two views coherent before the benchmark touches them.
#[allow(unsafe_code)]
unsafe impl CacheMaintenance for BareMetalPlatform {
    fn flush_invalidate(&self, addr: usize, len: usize) {
        (self.hooks.writeback_invalidate)(addr, len);
    }

    fn uncached_alias(&self, addr: usize) -> usize {
        kseg1_alias(addr)
    }
}

impl SystemProbe for BareMetalPlatform {
    fn system_info(&self) -> SystemInfo {
        SystemInfo {
            prid: (self.hooks.read_prid)(),
            memory_bytes: self.hooks.memory_size,
            rcp_version: self.mi_version.read(),
            tv_standard: self.tv_standard(),
        }
    }
}
