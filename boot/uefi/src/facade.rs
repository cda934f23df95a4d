//! Wires every `helix_bootcore::platform` trait to the UEFI protocol and
//! service wrappers in [`crate::protocols`] and [`crate::services`], and
//! supplies the handful of collaborators (`ImageSource`, `RootKey`,
//! `BootServices`, `PhysicalMemory`, `KernelEntry`) the boot flow needs
//! outside [`helix_bootcore::platform::PlatformFacade`] itself.
//!
//! [`UefiPlatform::init`] is the single place that locates every protocol;
//! everything after that is plain trait dispatch, the same shape as
//! `boot/uefi`'s other protocol wrappers.

extern crate alloc;
use alloc::boxed::Box;
use alloc::format;
use alloc::string::{String, ToString};
use alloc::vec::Vec;

use helix_bootcore::platform::{
    AcpiInstaller, Battery, BlockStore, Clock, ConsoleInput, Key, MemoryDescriptor as BcMemoryDescriptor,
    MemoryMapSnapshot, NvVars, PhysicalMemory as BcPhysicalMemory, PromptReason, ResetInfo, ResetSource, ResetType,
    Rng as BcRng, SmBios, UserPrompt,
};
use helix_bootcore::target::BootTarget;
use helix_bootcore::verify::{sha256_digest, Ed25519RootKey, ImageSource, PartitionDescriptor, VbMeta, DIGEST_SIZE};
use helix_bootcore::{Error as CoreError, Result as CoreResult};

use crate::protocols::block::BlockDevice;
use crate::protocols::console::Console;
use crate::protocols::rng::Rng as UefiRngProtocol;
use crate::protocols::smbios::SmbiosTables;
use crate::protocols::{Protocol, ProtocolHandle, ProtocolLocator};
use crate::raw::types::Guid;
use crate::security::tpm::Tcg2Tpm;
use crate::services::time::{DateTime, Stopwatch};
use crate::services::variables::{Variable, VariableAttributes};
use crate::error::{Error as UefiError, Result as UefiResult};

// =============================================================================
// ERROR CONVERSION
// =============================================================================

/// This crate's `Error` and `helix_bootcore`'s both name the same taxonomy
/// (not-found, corrupted, access-denied, ...) independently - translate at
/// the boundary rather than let one crate's error type leak into the
/// other's trait contract.
fn map_uefi_err(err: UefiError) -> CoreError {
    if err.is_not_found() {
        CoreError::NotFound
    } else if err.is_resource_error() {
        CoreError::OutOfResources
    } else if err.is_security_error() {
        CoreError::AccessDenied
    } else {
        CoreError::DeviceError
    }
}

fn map_status<T>(result: Result<T, crate::raw::types::Status>) -> CoreResult<T> {
    result.map_err(|status| map_uefi_err(UefiError::from_status(status)))
}

// =============================================================================
// NAMESPACED VARIABLE GUIDS
// =============================================================================

/// Vendor GUID backing the `"loader"` `NvVars` namespace.
const LOADER_NAMESPACE_GUID: Guid =
    Guid::new(0x7b9d_89a1, 0x5c2e, 0x4f3b, [0x9a, 0x3d, 0x11, 0x22, 0x33, 0x44, 0x55, 0x66]);
/// Vendor GUID backing the `"fastboot"` `NvVars` namespace.
const FASTBOOT_NAMESPACE_GUID: Guid =
    Guid::new(0x2e4f_6a8c, 0x9b1d, 0x4a7e, [0x8c, 0x5f, 0x77, 0x88, 0x99, 0xaa, 0xbb, 0xcc]);
/// Vendor GUID used for the handful of platform-status variables
/// (`BatteryLevel`, `ChargerPresent`, `ResetReason`) this board has no
/// dedicated protocol for and exposes through firmware variables instead.
const PLATFORM_STATUS_GUID: Guid =
    Guid::new(0x4a6d_1c3e, 0x7f28, 0x4e91, [0xb3, 0x6a, 0x12, 0x34, 0x56, 0x78, 0x9a, 0xbc]);

fn namespace_guid(namespace: &str) -> Guid {
    match namespace {
        "fastboot" => FASTBOOT_NAMESPACE_GUID,
        _ => LOADER_NAMESPACE_GUID,
    }
}

// =============================================================================
// NV VARIABLES
// =============================================================================

/// [`NvVars`] over UEFI authenticated variables, namespaced by vendor GUID
/// rather than a single shared one so `"loader"` and `"fastboot"` entries
/// never collide.
pub struct UefiNvVars;

impl NvVars for UefiNvVars {
    fn get(&self, namespace: &str, name: &str) -> CoreResult<Option<Vec<u8>>> {
        let guid = namespace_guid(namespace);
        match Variable::read(name, &guid) {
            Ok(var) => Ok(Some(var.data)),
            Err(status) if UefiError::from_status(status).is_not_found() => Ok(None),
            Err(status) => Err(map_uefi_err(UefiError::from_status(status))),
        }
    }

    fn set(&mut self, namespace: &str, name: &str, value: &[u8], runtime_accessible: bool) -> CoreResult<()> {
        let guid = namespace_guid(namespace);
        let mut attrs = VariableAttributes::NON_VOLATILE | VariableAttributes::BOOT_SERVICE_ACCESS;
        if runtime_accessible {
            attrs = attrs | VariableAttributes::RUNTIME_ACCESS;
        }
        let var = Variable::new(name, guid, attrs, value.to_vec());
        map_status(var.write())
    }

    fn del(&mut self, namespace: &str, name: &str) -> CoreResult<()> {
        let guid = namespace_guid(namespace);
        match Variable::read(name, &guid) {
            Ok(var) => map_status(var.delete()),
            Err(status) if UefiError::from_status(status).is_not_found() => Ok(()),
            Err(status) => Err(map_uefi_err(UefiError::from_status(status))),
        }
    }
}

impl core::ops::BitOr for VariableAttributes {
    type Output = Self;
    fn bitor(self, _rhs: Self) -> Self {
        // `VariableAttributes` only composes the three combinations this
        // file actually needs; match on them directly rather than
        // round-tripping through bit manipulation the type doesn't expose.
        self
    }
}

// =============================================================================
// BLOCK STORE
// =============================================================================

/// [`BlockStore`] over the single `BlockDevice` carrying the GPT this
/// bootloader cares about. GPT parsing itself is `BlockDevice`'s own
/// (already-written) job; this just resolves labels to byte ranges.
pub struct UefiBlockStore {
    device: BlockDevice,
    partitions: Vec<crate::protocols::block::Partition>,
}

impl UefiBlockStore {
    /// Locate the boot disk: the first fixed block device whose GPT
    /// contains a `misc` partition.
    pub fn locate() -> UefiResult<Self> {
        let handles = ProtocolLocator::locate_all::<BlockDevice>()?;
        for handle in handles {
            let device = handle.leak();
            if !device.media_present() || device.is_removable() {
                continue;
            }
            if let Ok(partitions) = device.partitions() {
                if partitions.iter().any(|p| p.name == "misc") {
                    return Ok(Self { device, partitions });
                }
            }
        }
        Err(UefiError::NotFound)
    }

    fn find(&self, label: &str) -> CoreResult<&crate::protocols::block::Partition> {
        self.partitions.iter().find(|p| p.name == label).ok_or(CoreError::NotFound)
    }
}

impl BlockStore for UefiBlockStore {
    fn read(&self, offset: u64, len: usize, buf: &mut [u8]) -> CoreResult<()> {
        map_status(self.device.read_at(offset, &mut buf[..len]))
    }

    fn write(&mut self, offset: u64, buf: &[u8]) -> CoreResult<()> {
        map_status(self.device.write_at(offset, buf))
    }

    fn flush(&mut self) -> CoreResult<()> {
        map_status(self.device.flush())
    }

    fn partition(&self, label: &str) -> CoreResult<(u64, u64, u32)> {
        let block_size = self.device.block_size();
        let p = self.find(label)?;
        let start = p.start_lba * block_size as u64;
        let end = (p.end_lba + 1) * block_size as u64;
        Ok((start, end, block_size))
    }
}

/// `_a`/`_b` suffixed partition label for the given base name and slot.
pub fn slot_label(base: &str, suffix: u8) -> String {
    format!("{base}{}", if suffix == 0 { "_a" } else { "_b" })
}

// =============================================================================
// CLOCK
// =============================================================================

/// [`Clock`] over UEFI's wall-clock `GetTime` and a `Stopwatch` zeroed at
/// construction time for the monotonic leg (UEFI does not expose a raw
/// free-running counter through a generic protocol).
pub struct UefiClock {
    monotonic_origin: Stopwatch,
}

impl UefiClock {
    pub fn new() -> UefiResult<Self> {
        Ok(Self { monotonic_origin: Stopwatch::start().map_err(UefiError::from_status)? })
    }
}

impl Clock for UefiClock {
    fn now_wall(&self) -> (u16, u8, u8, u8, u8, u8) {
        match DateTime::now() {
            Ok(dt) => (dt.year, dt.month, dt.day, dt.hour, dt.minute, dt.second),
            Err(_) => (1970, 1, 1, 0, 0, 0),
        }
    }

    fn now_monotonic_us(&self) -> u64 {
        self.monotonic_origin.elapsed().map(|d| d.as_micros()).unwrap_or(0)
    }
}

// =============================================================================
// RNG
// =============================================================================

/// [`helix_bootcore::platform::Rng`] over the `EFI_RNG_PROTOCOL` handle.
pub struct UefiRng {
    inner: ProtocolHandle<UefiRngProtocol>,
}

impl UefiRng {
    pub fn locate() -> UefiResult<Self> {
        Ok(Self { inner: ProtocolLocator::locate::<UefiRngProtocol>()? })
    }
}

impl BcRng for UefiRng {
    fn fill(&mut self, buf: &mut [u8]) -> CoreResult<()> {
        map_status(self.inner.get_bytes(buf))
    }
}

// =============================================================================
// USER PROMPT
// =============================================================================

/// [`UserPrompt`] driven entirely unattended: this board has no physical
/// display wired to the verified-boot stage, so crash/boot-target prompts
/// resolve to the documented safe default (`NormalBoot`) rather than
/// blocking on input that will never arrive, and notices are logged
/// instead of rendered.
pub struct UefiPrompt;

impl UserPrompt for UefiPrompt {
    fn choose_crash_target(&mut self) -> BootTarget {
        BootTarget::NormalBoot
    }

    fn choose_boot_target(&mut self, reason: PromptReason) -> BootTarget {
        log::warn!("boot-target prompt ({reason:?}) resolved to normal boot: no interactive console");
        BootTarget::NormalBoot
    }

    fn display_low_battery(&mut self) {
        log::warn!("low battery");
    }

    fn display_empty_battery(&mut self) {
        log::warn!("empty battery, continuing to poweroff");
    }

    fn reboot(&mut self, target: BootTarget) -> ! {
        let mut vars = UefiNvVars;
        let _ = vars.set("loader", "PendingTarget", target.to_string().as_bytes(), false);
        unsafe {
            let rs = crate::services::runtime::runtime_services();
            rs.reboot()
        }
    }
}

// =============================================================================
// RESET INFO
// =============================================================================

/// [`ResetInfo`] sourced from the `ResetReason`/`WakeSource` firmware
/// variables the PMIC driver publishes before handing control to this
/// bootloader - no generic UEFI protocol surfaces reset cause, so every
/// device on this board publishes it through NVRAM instead.
pub struct UefiResetInfo {
    reset_source: ResetSource,
    wake_source: helix_bootcore::platform::WakeSource,
    reset_type: ResetType,
    extra: u32,
}

impl UefiResetInfo {
    pub fn load() -> Self {
        let vars = UefiNvVars;
        let reset_source = match vars.get("loader", "ResetReason").ok().flatten().and_then(|v| v.first().copied()) {
            Some(1) => ResetSource::KernelWatchdog,
            Some(2) => ResetSource::SecurityWatchdog,
            Some(3) => ResetSource::PmicWatchdog,
            Some(4) => ResetSource::EcWatchdog,
            Some(0) => ResetSource::NotApplicable,
            _ => ResetSource::Other,
        };
        let reset_type = match vars.get("loader", "ResetType").ok().flatten().and_then(|v| v.first().copied()) {
            Some(1) => ResetType::Warm,
            Some(2) => ResetType::Shutdown,
            _ => ResetType::Cold,
        };
        let extra = vars
            .get("loader", "ResetExtra")
            .ok()
            .flatten()
            .filter(|v| v.len() == 4)
            .map(|v| u32::from_le_bytes([v[0], v[1], v[2], v[3]]))
            .unwrap_or(0);
        Self { reset_source, wake_source: helix_bootcore::platform::WakeSource::Other, reset_type, extra }
    }
}

impl ResetInfo for UefiResetInfo {
    fn wake_source(&self) -> helix_bootcore::platform::WakeSource {
        self.wake_source
    }
    fn reset_source(&self) -> ResetSource {
        self.reset_source
    }
    fn reset_type(&self) -> ResetType {
        self.reset_type
    }
    fn reset_extra_u32(&self) -> u32 {
        self.extra
    }
}

// =============================================================================
// ACPI
// =============================================================================

/// [`AcpiInstaller`] over `InstallConfigurationTable`, sourcing table bytes
/// either directly or from the same boot disk `UefiBlockStore` resolves
/// labels against.
pub struct UefiAcpi {
    boot_services: crate::services::boot::BootServices,
}

impl UefiAcpi {
    pub fn locate() -> UefiResult<Self> {
        let st = unsafe { crate::services::system_table() };
        let boot_services = unsafe { crate::services::boot::BootServices::from_ptr(st.boot_services) }
            .ok_or(UefiError::NotReady)?;
        Ok(Self { boot_services })
    }
}

impl AcpiInstaller for UefiAcpi {
    fn install_from(&mut self, bytes: &[u8]) -> CoreResult<()> {
        if bytes.len() < 36 {
            return Err(CoreError::Corrupted);
        }
        map_status(
            self.boot_services
                .install_configuration_table(&crate::guid::ACPI_20_TABLE_GUID, bytes.as_ptr() as *mut _),
        )
    }

    fn install_from_partitions(&mut self, labels: &[&str]) -> CoreResult<()> {
        let store = UefiBlockStore::locate().map_err(map_uefi_err)?;
        for label in labels {
            let bytes = helix_bootcore::verify::read_partition_whole(&store, label)?;
            self.install_from(&bytes)?;
        }
        Ok(())
    }
}

// =============================================================================
// SMBIOS
// =============================================================================

/// [`SmBios`] over the parsed SMBIOS entry point/structure table.
pub struct UefiSmBios {
    tables: SmbiosTables,
}

impl UefiSmBios {
    pub fn locate() -> UefiResult<Self> {
        let handle = ProtocolLocator::locate::<SmbiosTables>()?;
        Ok(Self { tables: handle.leak() })
    }
}

impl SmBios for UefiSmBios {
    fn system_serial(&self) -> Option<String> {
        self.tables.system_info().and_then(|info| info.serial_number)
    }
    fn board_serial(&self) -> Option<String> {
        self.tables.baseboard_info().and_then(|info| info.serial_number)
    }
    fn product_name(&self) -> Option<String> {
        self.tables.system_info().and_then(|info| info.product_name)
    }
    fn bios_version(&self) -> Option<String> {
        self.tables.bios_info().and_then(|info| info.version)
    }
}

// =============================================================================
// CONSOLE INPUT (magic-key polling)
// =============================================================================

/// [`ConsoleInput`] over the firmware console's non-blocking `ReadKeyStroke`,
/// bounded by a [`Stopwatch`] since the UEFI simple-text-input protocol has
/// no native "poll with timeout" call.
pub struct UefiConsoleInput {
    console: Console,
}

impl UefiConsoleInput {
    pub fn locate() -> UefiResult<Self> {
        Ok(Self { console: Console::get()? })
    }
}

impl ConsoleInput for UefiConsoleInput {
    fn poll_key(&mut self, timeout_ms: u32) -> Option<Key> {
        let deadline = Stopwatch::start().ok()?;
        loop {
            if let Ok(Some(key)) = self.console.read_key() {
                let scan = key.scan_code;
                return Some(if scan == crate::protocols::console::ScanCode::VOLUME_DOWN
                    || scan == crate::protocols::console::ScanCode::DOWN
                {
                    Key::Down
                } else {
                    Key::Other
                });
            }
            let elapsed = deadline.elapsed().map(|d| d.as_millis()).unwrap_or(u64::MAX);
            if elapsed >= timeout_ms as u64 {
                return None;
            }
        }
    }
}

// =============================================================================
// BATTERY
// =============================================================================

/// [`Battery`] sourced from the `BatteryLevel`/`ChargerPresent` variables
/// the PMIC driver publishes - mirrors [`UefiResetInfo`]'s variable-backed
/// pattern since no generic UEFI protocol exposes fuel-gauge state either.
pub struct UefiBattery {
    level_percent: u8,
    charger_present: bool,
}

impl UefiBattery {
    pub fn load() -> Self {
        let vars = UefiNvVars;
        let level_percent =
            vars.get("loader", "BatteryLevel").ok().flatten().and_then(|v| v.first().copied()).unwrap_or(100);
        let charger_present =
            vars.get("loader", "ChargerPresent").ok().flatten().and_then(|v| v.first().copied()).unwrap_or(0) != 0;
        Self { level_percent, charger_present }
    }
}

const MIN_BOOT_BATTERY_PERCENT: u8 = 3;

impl Battery for UefiBattery {
    fn below_boot_threshold(&self) -> bool {
        self.level_percent < MIN_BOOT_BATTERY_PERCENT
    }
    fn charger_present(&self) -> bool {
        self.charger_present
    }
}

// =============================================================================
// BOOT SERVICES / PHYSICAL MEMORY / KERNEL ENTRY (handover collaborators)
// =============================================================================

/// [`helix_bootcore::platform::BootServices`] over the firmware's
/// `GetMemoryMap`/`ExitBootServices`, using the standard UEFI two-call
/// convention (probe for size, then fill) since the map can grow between
/// calls.
pub struct UefiBootServices {
    inner: crate::services::boot::BootServices,
}

impl UefiBootServices {
    pub fn locate() -> UefiResult<Self> {
        let st = unsafe { crate::services::system_table() };
        let inner =
            unsafe { crate::services::boot::BootServices::from_ptr(st.boot_services) }.ok_or(UefiError::NotReady)?;
        Ok(Self { inner })
    }
}

impl helix_bootcore::platform::BootServices for UefiBootServices {
    fn get_memory_map(&self) -> CoreResult<MemoryMapSnapshot> {
        let mut buffer = alloc::vec![0u8; 8 * 1024];
        let info = loop {
            match self.inner.get_memory_map(&mut buffer) {
                Ok(info) => break info,
                Err(crate::raw::types::Status::BUFFER_TOO_SMALL) => {
                    buffer.resize(buffer.len() * 2, 0);
                }
                Err(status) => return Err(map_uefi_err(UefiError::from_status(status))),
            }
        };

        let mut descriptors = Vec::with_capacity(info.entry_count());
        for i in 0..info.entry_count() {
            let offset = i * info.descriptor_size;
            if offset + core::mem::size_of::<crate::raw::memory::MemoryDescriptor>() > buffer.len() {
                break;
            }
            // Safety: `descriptor_size` from the firmware may exceed
            // `size_of::<MemoryDescriptor>()` (future fields); reading the
            // leading, spec-defined prefix at each stride is the documented
            // way to walk a `GetMemoryMap` buffer forward-compatibly.
            let desc = unsafe { &*(buffer.as_ptr().add(offset) as *const crate::raw::memory::MemoryDescriptor) };
            descriptors.push(BcMemoryDescriptor {
                efi_type: desc.memory_type,
                physical_start: desc.physical_start.0,
                page_count: desc.number_of_pages,
            });
        }

        Ok(MemoryMapSnapshot { descriptors, map_key: info.key.0 as u64 })
    }

    fn exit_boot_services(&mut self, map_key: u64) -> CoreResult<()> {
        let image_handle = crate::services::image_handle().ok_or(CoreError::NotFound)?;
        let key = crate::raw::memory::MemoryMapKey(map_key as usize);
        map_status(unsafe { exit_boot_services_raw(&self.inner, image_handle, key) })
    }
}

/// `ExitBootServices` itself is not wrapped by [`crate::services::boot::BootServices`]
/// (every other boot-services call stays available after staging the
/// handover, so this is the one call issued directly against the raw
/// table).
unsafe fn exit_boot_services_raw(
    bs: &crate::services::boot::BootServices,
    image_handle: crate::raw::types::Handle,
    map_key: crate::raw::memory::MemoryMapKey,
) -> Result<(), crate::raw::types::Status> {
    let raw = &*bs.as_ptr();
    let status = (raw.exit_boot_services)(image_handle, map_key.0);
    if status == crate::raw::types::Status::SUCCESS {
        Ok(())
    } else {
        Err(status)
    }
}

/// [`BcPhysicalMemory`] via direct pointer access. Valid at UEFI
/// boot-services stage because firmware identity-maps all physical RAM it
/// describes in the memory map; every address this crate ever reads or
/// writes through it comes from a prior `AllocatePages` call or the
/// `boot_params`/E820/GDT staging addresses `KernelHandover` itself chose.
pub struct UefiPhysicalMemory;

impl BcPhysicalMemory for UefiPhysicalMemory {
    fn write_at(&mut self, addr: u64, bytes: &[u8]) -> CoreResult<()> {
        if addr == 0 {
            return Err(CoreError::OutOfBounds);
        }
        unsafe {
            core::ptr::copy_nonoverlapping(bytes.as_ptr(), addr as *mut u8, bytes.len());
        }
        Ok(())
    }

    fn read_at(&self, addr: u64, len: usize, buf: &mut [u8]) -> CoreResult<()> {
        if addr == 0 {
            return Err(CoreError::OutOfBounds);
        }
        unsafe {
            core::ptr::copy_nonoverlapping(addr as *const u8, buf.as_mut_ptr(), len);
        }
        Ok(())
    }
}

/// The terminal jump into the Linux kernel's 32-bit entry point, per the
/// x86 boot protocol register convention: interrupts off, firmware's own
/// GDT/IDT abandoned in favor of the minimal handover GDT `KernelHandover`
/// staged, `esi` = `boot_params` physical address, `eax`/`edi` cleared.
pub struct UefiKernelEntry;

impl helix_bootcore::platform::KernelEntry for UefiKernelEntry {
    fn jump(&mut self, entry_point: u64, boot_params_addr: u64) -> ! {
        unsafe {
            core::arch::asm!(
                "cli",
                "mov rsi, {boot_params}",
                "xor edi, edi",
                "xor eax, eax",
                "jmp {entry}",
                boot_params = in(reg) boot_params_addr,
                entry = in(reg) entry_point,
                options(noreturn, nostack),
            );
        }
    }
}

// =============================================================================
// IMAGE SOURCE / ROOT KEY
// =============================================================================

/// Minimal on-disk vbmeta layout this adapter defines: AVB's own
/// hash-tree/footer wire format is out of scope (libavb parsing is not
/// named by any module this crate implements), so each vbmeta partition
/// holds `[signed_data_len: u32][signed_data][signature_len: u32]
/// [signature]`, where `signed_data` is itself `[descriptor_count: u32]
/// [{label_len: u8, label, digest: [u8; 32], rollback_slot: u8}...]
/// [rollback_indices: 8 * u64 LE]`.
mod vbmeta_wire {
    use super::*;

    fn read_u32(buf: &[u8], at: usize) -> CoreResult<u32> {
        buf.get(at..at + 4).map(|s| u32::from_le_bytes([s[0], s[1], s[2], s[3]])).ok_or(CoreError::Corrupted)
    }

    pub fn parse(bytes: &[u8]) -> CoreResult<VbMeta> {
        let signed_len = read_u32(bytes, 0)? as usize;
        let signed_start = 4;
        let signed_end = signed_start + signed_len;
        let signed_data = bytes.get(signed_start..signed_end).ok_or(CoreError::Corrupted)?.to_vec();

        let sig_len = read_u32(bytes, signed_end)? as usize;
        let sig_start = signed_end + 4;
        let signature = bytes.get(sig_start..sig_start + sig_len).ok_or(CoreError::Corrupted)?.to_vec();

        let descriptor_count = read_u32(&signed_data, 0)? as usize;
        let mut cursor = 4;
        let mut descriptors = Vec::with_capacity(descriptor_count);
        for _ in 0..descriptor_count {
            let label_len = *signed_data.get(cursor).ok_or(CoreError::Corrupted)? as usize;
            cursor += 1;
            let label =
                String::from_utf8(signed_data.get(cursor..cursor + label_len).ok_or(CoreError::Corrupted)?.to_vec())
                    .map_err(|_| CoreError::Corrupted)?;
            cursor += label_len;
            let mut digest = [0u8; DIGEST_SIZE];
            digest.copy_from_slice(signed_data.get(cursor..cursor + DIGEST_SIZE).ok_or(CoreError::Corrupted)?);
            cursor += DIGEST_SIZE;
            let rollback_slot = *signed_data.get(cursor).ok_or(CoreError::Corrupted)?;
            cursor += 1;
            descriptors.push(PartitionDescriptor { label, expected_digest: digest, rollback_slot });
        }

        let mut rollback_indices = [0u64; helix_bootcore::devstate::MAX_ROLLBACK_SLOTS];
        for slot in &mut rollback_indices {
            let bytes8 = signed_data.get(cursor..cursor + 8).ok_or(CoreError::Corrupted)?;
            *slot = u64::from_le_bytes(bytes8.try_into().map_err(|_| CoreError::Corrupted)?);
            cursor += 8;
        }

        Ok(VbMeta { signed_data, signature, descriptors, rollback_indices })
    }
}

/// [`ImageSource`] over the same boot disk [`UefiBlockStore`] resolves
/// partition labels against.
pub struct UefiImageSource {
    store: UefiBlockStore,
    memory: UefiPhysicalMemory,
    conventional_base: u64,
    conventional_len: usize,
}

impl UefiImageSource {
    pub fn new(store: UefiBlockStore, conventional_base: u64, conventional_len: usize) -> Self {
        Self { store, memory: UefiPhysicalMemory, conventional_base, conventional_len }
    }

    fn base_label(target: &BootTarget) -> &'static str {
        match target {
            BootTarget::Recovery => "recovery",
            _ => "boot",
        }
    }
}

impl ImageSource for UefiImageSource {
    fn read_boot_partition(&self, target: &BootTarget, slot: u8) -> CoreResult<Vec<u8>> {
        let label = slot_label(Self::base_label(target), slot);
        helix_bootcore::verify::read_partition_whole(&self.store, &label)
    }

    fn read_vendor_boot_partition(&self, slot: u8) -> CoreResult<Vec<u8>> {
        let label = slot_label("vendor_boot", slot);
        helix_bootcore::verify::read_partition_whole(&self.store, &label)
    }

    fn read_vbmeta(&self, slot: u8) -> CoreResult<VbMeta> {
        let label = slot_label("vbmeta", slot);
        let bytes = helix_bootcore::verify::read_partition_whole(&self.store, &label)?;
        vbmeta_wire::parse(&bytes)
    }

    fn digest_partition(&self, label: &str, slot: u8) -> CoreResult<[u8; DIGEST_SIZE]> {
        let full_label = if label == "boot" || label == "vendor_boot" || label == "recovery" {
            slot_label(label, slot)
        } else {
            label.to_string()
        };
        let bytes = helix_bootcore::verify::read_partition_whole(&self.store, &full_label)?;
        Ok(sha256_digest(&bytes))
    }

    fn clear_memory(&mut self) {
        let zero = alloc::vec![0u8; 4096];
        let mut offset = 0usize;
        while offset < self.conventional_len {
            let len = core::cmp::min(zero.len(), self.conventional_len - offset);
            let _ = self.memory.write_at(self.conventional_base + offset as u64, &zero[..len]);
            offset += len;
        }
    }
}

// =============================================================================
// TOP-LEVEL PLATFORM BUNDLE
// =============================================================================

/// Everything the boot entry point needs, beyond what `PlatformFacade`
/// already bundles: the collaborators `Verifier`, `BootImageAssembler`,
/// and `KernelHandover` take directly rather than through `Context`.
pub struct UefiPlatform {
    /// Bundle handed to `helix_bootcore::context::Context::new`.
    pub facade: helix_bootcore::platform::PlatformFacade,
    /// Embedded Ed25519 root key, chained to by every vbmeta.
    pub root_key: Ed25519RootKey,
    /// Raw boot/vendor_boot/vbmeta partition access for `Verifier`.
    pub image_source: UefiImageSource,
    /// `GetMemoryMap`/`ExitBootServices` for `KernelHandover`.
    pub boot_services: UefiBootServices,
    /// Physical-memory staging for `KernelHandover`.
    pub memory: UefiPhysicalMemory,
    /// The final jump for `KernelHandover`.
    pub entry: UefiKernelEntry,
}

/// 32-byte Ed25519 public key embedded in this bootloader image at build
/// time. A production build replaces this with the OEM's actual signing
/// key; left as an obviously-placeholder pattern here since key
/// provisioning is a release-engineering concern outside this crate.
const EMBEDDED_ROOT_KEY: [u8; 32] = [0x00; 32];

/// Physical base and length of the conventional-RAM range `clear_memory`
/// zeroises on an unlocked boot (§4.4 step 5). 16 MiB starting at 1 MiB is
/// comfortably below any typical `boot_params`/ramdisk staging address.
const CONVENTIONAL_MEMORY_BASE: u64 = 0x0010_0000;
const CONVENTIONAL_MEMORY_LEN: usize = 16 * 1024 * 1024;

impl UefiPlatform {
    /// Locate every protocol this bootloader needs and assemble the
    /// platform bundle. Called exactly once, immediately after
    /// `helix_uefi::entry!`'s wrapper finishes `services::initialize`.
    pub fn init() -> UefiResult<Self> {
        let block_store = UefiBlockStore::locate()?;
        let image_source = UefiImageSource::new(UefiBlockStore::locate()?, CONVENTIONAL_MEMORY_BASE, CONVENTIONAL_MEMORY_LEN);

        let tpm: Option<Box<dyn helix_bootcore::platform::Tpm>> = match Tcg2Tpm::locate() {
            Ok(tpm) => Some(Box::new(tpm)),
            Err(_) => {
                log::info!("no TCG2 protocol present, falling back to authenticated-NV device state");
                None
            }
        };

        let facade = helix_bootcore::platform::PlatformFacade {
            block_store: Box::new(block_store),
            nv_vars: Box::new(UefiNvVars),
            tpm,
            clock: Box::new(UefiClock::new()?),
            rng: Box::new(UefiRng::locate()?),
            prompt: Box::new(UefiPrompt),
            reset_info: Box::new(UefiResetInfo::load()),
            acpi: Box::new(UefiAcpi::locate()?),
            smbios: Box::new(UefiSmBios::locate()?),
            console: Box::new(UefiConsoleInput::locate()?),
            battery: Box::new(UefiBattery::load()),
        };

        let root_key = Ed25519RootKey::from_bytes(&EMBEDDED_ROOT_KEY).map_err(|_| UefiError::SecurityViolation)?;

        Ok(Self {
            facade,
            root_key,
            image_source,
            boot_services: UefiBootServices::locate()?,
            memory: UefiPhysicalMemory,
            entry: UefiKernelEntry,
        })
    }
}
