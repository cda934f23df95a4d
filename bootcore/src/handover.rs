//! Memory-map snapshot, E820 translation, Linux boot-protocol header
//! population, GDT install, and the final architecture-specific jump into
//! the kernel. Grounded on `boot/uefi/src/handoff/memory_map.rs`'s
//! `MemoryType` classification (generalized here to the E820 type space)
//! and on the `hal` crate's x86_64 GDT descriptor layout (generalized from
//! a 5-descriptor kernel GDT down to the 4-descriptor handover GDT the
//! Linux boot protocol expects).

extern crate alloc;
use alloc::vec::Vec;

use log::{debug, info, warn};

use crate::error::{Error, Result};
use crate::platform::{BootServices, KernelEntry, MemoryMapSnapshot, PhysicalMemory};

/// Linux E820 memory types (`include/uapi/asm-generic/e820.h` on the
/// original; re-derived here since the platform never shares an `e820`
/// crate with this core).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum E820Type {
    /// Usable RAM.
    Ram = 1,
    /// Reserved, not usable.
    Reserved = 2,
    /// ACPI reclaimable tables.
    Acpi = 3,
    /// ACPI non-volatile storage.
    Nvs = 4,
    /// Reported bad by firmware.
    Unusable = 5,
}

/// One coalesced E820 entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct E820Entry {
    /// Physical start address.
    pub addr: u64,
    /// Size in bytes.
    pub size: u64,
    /// E820 type.
    pub entry_type: E820Type,
}

/// UEFI `EfiMemoryType` values relevant to the handover classification
/// (§4.6 step 1). Mirrors `boot/uefi/src/raw` constants; this core only
/// needs the handful the Linux mapping names.
mod efi_memory_type {
    pub const RESERVED: u32 = 0;
    pub const LOADER_CODE: u32 = 1;
    pub const LOADER_DATA: u32 = 2;
    pub const BOOT_SERVICES_CODE: u32 = 3;
    pub const BOOT_SERVICES_DATA: u32 = 4;
    pub const CONVENTIONAL_MEMORY: u32 = 7;
    pub const UNUSABLE_MEMORY: u32 = 8;
    pub const ACPI_RECLAIM_MEMORY: u32 = 9;
    pub const ACPI_MEMORY_NVS: u32 = 10;
}

fn classify(efi_type: u32) -> E820Type {
    use efi_memory_type::*;
    match efi_type {
        LOADER_CODE | LOADER_DATA | BOOT_SERVICES_CODE | BOOT_SERVICES_DATA | CONVENTIONAL_MEMORY => E820Type::Ram,
        ACPI_RECLAIM_MEMORY => E820Type::Acpi,
        ACPI_MEMORY_NVS => E820Type::Nvs,
        UNUSABLE_MEMORY => E820Type::Unusable,
        RESERVED => E820Type::Reserved,
        _ => E820Type::Reserved,
    }
}

/// Build a coalesced E820 table from a firmware memory-map snapshot.
/// Adjacent descriptors of equal E820 type merge into a single entry,
/// matching `MemoryMap::coalesce`'s strategy in the teacher.
pub fn build_e820_table(snapshot: &MemoryMapSnapshot) -> Vec<E820Entry> {
    let mut entries: Vec<E820Entry> = Vec::with_capacity(snapshot.descriptors.len());
    for desc in &snapshot.descriptors {
        let entry = E820Entry {
            addr: desc.physical_start,
            size: desc.page_count * 4096,
            entry_type: classify(desc.efi_type),
        };
        match entries.last_mut() {
            Some(prev) if prev.entry_type == entry.entry_type && prev.addr + prev.size == entry.addr => {
                prev.size += entry.size;
            }
            _ => entries.push(entry),
        }
    }
    entries
}

/// Screen info, copied from the graphics output protocol when present
/// (type tag `0x70` in the Linux `screen_info` struct).
#[derive(Debug, Clone, Copy, Default)]
pub struct ScreenInfo {
    /// Linear framebuffer physical base.
    pub lfb_base: u64,
    /// Framebuffer width in pixels.
    pub lfb_width: u32,
    /// Framebuffer height in pixels.
    pub lfb_height: u32,
    /// Bytes per scanline.
    pub lfb_line_length: u32,
    /// Bits per pixel.
    pub lfb_depth: u8,
}

/// Everything `KernelHandover` needs to populate the Linux `setup_header`
/// and hand execution off (§4.6 steps 2-4).
#[derive(Debug, Clone, Copy, Default)]
pub struct HandoverParams {
    /// Physical address of the assembled kernel command line.
    pub cmdline_addr: u64,
    /// Physical address of the assembled ramdisk.
    pub ramdisk_addr: u64,
    /// Ramdisk length in bytes.
    pub ramdisk_len: u32,
    /// Kernel 32-bit protected-mode entry address.
    pub code32_start: u32,
    /// Kernel 64-bit entry address (`code32_start` equivalent for the
    /// 64-bit jump; `None` if this kernel has no 64-bit entry point).
    pub kernel_entry_64: Option<u64>,
    /// Physical address the `boot_params` page is staged at.
    pub boot_params_addr: u64,
    /// Screen info, if a GOP framebuffer was found.
    pub screen_info: Option<ScreenInfo>,
}

/// Fixed loader-id byte this crate identifies itself with in
/// `setup_header.type_of_loader` (§4.6 step 2).
pub const LOADER_ID: u8 = 0xFF;

const SCREEN_INFO_TYPE_TAG: u8 = 0x70;

/// `boot_params` field offsets this crate writes, taken from the Linux x86
/// boot protocol (`Documentation/x86/boot.rst`). Only the handful of
/// fields §4.6 names are touched; everything else in the page is left as
/// the caller initialized it (normally zeroed).
mod setup_header_offset {
    /// `hdr.type_of_loader`.
    pub const TYPE_OF_LOADER: u64 = 0x210;
    /// `hdr.ramdisk_image`.
    pub const RAMDISK_IMAGE: u64 = 0x218;
    /// `hdr.ramdisk_size`.
    pub const RAMDISK_SIZE: u64 = 0x21c;
    /// `hdr.cmd_line_ptr`.
    pub const CMD_LINE_PTR: u64 = 0x228;
    /// `hdr.code32_start`.
    pub const CODE32_START: u64 = 0x214;
    /// `screen_info` (offset 0 in `boot_params`).
    pub const SCREEN_INFO: u64 = 0x000;
}

/// Writes `HandoverParams` into the `boot_params` page at
/// `params.boot_params_addr`, per §4.6 step 2.
fn write_setup_header(mem: &mut dyn PhysicalMemory, params: &HandoverParams) -> Result<()> {
    use setup_header_offset::*;
    let base = params.boot_params_addr;

    mem.write_at(base + TYPE_OF_LOADER, &[LOADER_ID])?;
    mem.write_at(base + RAMDISK_IMAGE, &(params.ramdisk_addr as u32).to_le_bytes())?;
    mem.write_at(base + RAMDISK_SIZE, &params.ramdisk_len.to_le_bytes())?;
    mem.write_at(base + CMD_LINE_PTR, &(params.cmdline_addr as u32).to_le_bytes())?;
    mem.write_at(base + CODE32_START, &params.code32_start.to_le_bytes())?;

    if let Some(screen) = params.screen_info {
        let mut buf = [0u8; 16];
        buf[0] = SCREEN_INFO_TYPE_TAG;
        buf[4..8].copy_from_slice(&(screen.lfb_width).to_le_bytes());
        buf[8..12].copy_from_slice(&(screen.lfb_height).to_le_bytes());
        buf[12..16].copy_from_slice(&(screen.lfb_line_length).to_le_bytes());
        mem.write_at(base + SCREEN_INFO, &buf)?;
        mem.write_at(base + SCREEN_INFO + 16, &screen.lfb_base.to_le_bytes())?;
        mem.write_at(base + SCREEN_INFO + 24, &[screen.lfb_depth])?;
    }

    Ok(())
}

/// Minimal handover GDT: null, 32-bit code, 32-bit data, 16-bit task
/// (§4.6 step 3). Field layout mirrors `helix_hal::arch::x86_64::gdt`'s
/// `GdtEntry`, generalized from that crate's 5-descriptor kernel GDT down
/// to the 4 descriptors the Linux handover convention needs.
#[derive(Clone, Copy)]
#[repr(C, packed)]
struct GdtEntry {
    limit_low: u16,
    base_low: u16,
    base_middle: u8,
    access: u8,
    flags_limit_high: u8,
    base_high: u8,
}

impl GdtEntry {
    const fn null() -> Self {
        Self { limit_low: 0, base_low: 0, base_middle: 0, access: 0, flags_limit_high: 0, base_high: 0 }
    }

    /// 32-bit code, base 0, limit 4 GiB, type = code | exec-read.
    const fn code32() -> Self {
        Self {
            limit_low: 0xFFFF,
            base_low: 0,
            base_middle: 0,
            access: 0b1001_1010,
            flags_limit_high: 0b1100_1111,
            base_high: 0,
        }
    }

    /// 32-bit data, base 0, limit 4 GiB, type = data | read-write.
    const fn data32() -> Self {
        Self {
            limit_low: 0xFFFF,
            base_low: 0,
            base_middle: 0,
            access: 0b1001_0010,
            flags_limit_high: 0b1100_1111,
            base_high: 0,
        }
    }

    /// 16-bit task descriptor, limit 0. Only present for compatibility
    /// with real-mode-adjacent handover expectations; never populated
    /// with a live TSS.
    const fn task16() -> Self {
        Self { limit_low: 0, base_low: 0, base_middle: 0, access: 0b1000_1001, flags_limit_high: 0, base_high: 0 }
    }
}

/// The four-descriptor handover GDT, laid out contiguously so a single
/// `write_at` stages it in one call.
#[repr(C, align(16))]
struct HandoverGdt {
    entries: [GdtEntry; 4],
}

impl HandoverGdt {
    const fn new() -> Self {
        Self { entries: [GdtEntry::null(), GdtEntry::code32(), GdtEntry::data32(), GdtEntry::task16()] }
    }

    fn as_bytes(&self) -> &[u8] {
        let ptr = self as *const Self as *const u8;
        // Safety: `HandoverGdt` is `#[repr(C)]` over four `#[repr(C, packed)]`
        // 8-byte entries with no padding; the byte view is exactly
        // `size_of::<Self>()` bytes of plain data.
        unsafe { core::slice::from_raw_parts(ptr, core::mem::size_of::<Self>()) }
    }
}

const EXIT_BOOT_SERVICES_MAX_RETRIES: u32 = 10;

/// Drives the firmware handoff: snapshots the memory map, stages the GDT
/// and `boot_params`, calls `ExitBootServices` with the stale-key retry
/// loop, then jumps to the kernel. Consumes its `BootServices`,
/// `PhysicalMemory`, and `KernelEntry` collaborators by mutable reference
/// since each is used at most once per boot.
pub struct KernelHandover<'a> {
    boot_services: &'a mut dyn BootServices,
    memory: &'a mut dyn PhysicalMemory,
    entry: &'a mut dyn KernelEntry,
    /// Whether the target kernel is 64-bit; gates the `+512` entry-offset
    /// adjustment in step 4.
    is_64_bit: bool,
}

impl<'a> KernelHandover<'a> {
    /// Wrap the firmware/memory/entry collaborators for a single handover
    /// attempt.
    pub fn new(
        boot_services: &'a mut dyn BootServices,
        memory: &'a mut dyn PhysicalMemory,
        entry: &'a mut dyn KernelEntry,
        is_64_bit: bool,
    ) -> Self {
        Self { boot_services, memory, entry, is_64_bit }
    }

    /// Snapshot and classify the firmware memory map into E820 entries
    /// (§4.6 step 1), without exiting boot services yet.
    pub fn snapshot_e820(&self) -> Result<Vec<E820Entry>> {
        let snapshot = self.boot_services.get_memory_map()?;
        Ok(build_e820_table(&snapshot))
    }

    /// Runs the full handover: populate `boot_params`, install the GDT,
    /// retry `ExitBootServices` until it accepts a fresh map key, then
    /// jump. Never returns on success; any reachable return path
    /// (`entry.jump` returning, or exhausting the retry budget) is
    /// treated as fatal and this function halts instead of returning.
    pub fn run(mut self, params: HandoverParams) -> ! {
        if let Err(e) = write_setup_header(self.memory, &params) {
            fatal_halt(&alloc::format!("failed to populate setup_header: {e}"));
        }

        let gdt = HandoverGdt::new();
        let gdt_addr = params.boot_params_addr.saturating_add(4096);
        if let Err(e) = self.memory.write_at(gdt_addr, gdt.as_bytes()) {
            fatal_halt(&alloc::format!("failed to stage handover GDT: {e}"));
        }

        let mut attempt = 0u32;
        loop {
            let snapshot = match self.boot_services.get_memory_map() {
                Ok(s) => s,
                Err(e) => fatal_halt(&alloc::format!("get_memory_map failed during exit: {e}")),
            };
            match self.boot_services.exit_boot_services(snapshot.map_key) {
                Ok(()) => break,
                Err(e) if attempt < EXIT_BOOT_SERVICES_MAX_RETRIES => {
                    attempt += 1;
                    warn!("exit_boot_services rejected stale map key ({e}), retry {attempt}/{EXIT_BOOT_SERVICES_MAX_RETRIES}");
                }
                Err(e) => fatal_halt(&alloc::format!("exit_boot_services exhausted retries: {e}")),
            }
        }
        info!("boot services exited after {attempt} retries");

        let entry_point = if self.is_64_bit {
            params.kernel_entry_64.unwrap_or(params.code32_start as u64).saturating_add(512)
        } else {
            params.code32_start as u64
        };
        debug!("jumping to kernel entry 0x{entry_point:x} with boot_params at 0x{:x}", params.boot_params_addr);

        self.entry.jump(entry_point, params.boot_params_addr);
    }
}

fn fatal_halt(message: &str) -> ! {
    log::error!("fatal handover failure, halting: {message}");
    loop {
        core::hint::spin_loop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::MemoryDescriptor;
    use alloc::vec;

    #[test]
    fn e820_classifies_and_coalesces_ram() {
        let snapshot = MemoryMapSnapshot {
            descriptors: vec![
                MemoryDescriptor { efi_type: efi_memory_type::CONVENTIONAL_MEMORY, physical_start: 0, page_count: 1 },
                MemoryDescriptor {
                    efi_type: efi_memory_type::LOADER_CODE,
                    physical_start: 4096,
                    page_count: 1,
                },
                MemoryDescriptor {
                    efi_type: efi_memory_type::ACPI_MEMORY_NVS,
                    physical_start: 8192,
                    page_count: 1,
                },
            ],
            map_key: 0,
        };
        let table = build_e820_table(&snapshot);
        assert_eq!(table.len(), 2);
        assert_eq!(table[0].entry_type, E820Type::Ram);
        assert_eq!(table[0].addr, 0);
        assert_eq!(table[0].size, 8192);
        assert_eq!(table[1].entry_type, E820Type::Nvs);
    }

    #[test]
    fn e820_maps_unusable_and_reserved() {
        let snapshot = MemoryMapSnapshot {
            descriptors: vec![
                MemoryDescriptor { efi_type: efi_memory_type::UNUSABLE_MEMORY, physical_start: 0, page_count: 1 },
                MemoryDescriptor { efi_type: efi_memory_type::RESERVED, physical_start: 4096, page_count: 1 },
                MemoryDescriptor { efi_type: 0xDEAD, physical_start: 8192, page_count: 1 },
            ],
            map_key: 0,
        };
        let table = build_e820_table(&snapshot);
        assert_eq!(table[0].entry_type, E820Type::Unusable);
        assert_eq!(table[1].entry_type, E820Type::Reserved);
        assert_eq!(table[2].entry_type, E820Type::Reserved);
    }

    struct FakeBootServices {
        calls: core::cell::RefCell<u32>,
        fail_until: u32,
    }

    impl BootServices for FakeBootServices {
        fn get_memory_map(&self) -> Result<MemoryMapSnapshot> {
            Ok(MemoryMapSnapshot { descriptors: vec![], map_key: *self.calls.borrow() as u64 })
        }
        fn exit_boot_services(&mut self, _map_key: u64) -> Result<()> {
            let mut calls = self.calls.borrow_mut();
            *calls += 1;
            if *calls > self.fail_until {
                Ok(())
            } else {
                Err(Error::Timeout)
            }
        }
    }

    struct FakeMemory {
        writes: alloc::collections::BTreeMap<u64, Vec<u8>>,
    }

    impl PhysicalMemory for FakeMemory {
        fn write_at(&mut self, addr: u64, bytes: &[u8]) -> Result<()> {
            self.writes.insert(addr, bytes.to_vec());
            Ok(())
        }
        fn read_at(&self, _addr: u64, len: usize, buf: &mut [u8]) -> Result<()> {
            buf[..len].fill(0);
            Ok(())
        }
    }

    struct FakeEntry {
        jumped_to: core::cell::RefCell<Option<(u64, u64)>>,
    }

    impl KernelEntry for FakeEntry {
        fn jump(&mut self, entry_point: u64, boot_params_addr: u64) -> ! {
            *self.jumped_to.borrow_mut() = Some((entry_point, boot_params_addr));
            loop {
                core::hint::spin_loop();
            }
        }
    }

    #[test]
    fn snapshot_e820_reads_through_boot_services() {
        let mut bs = FakeBootServices { calls: core::cell::RefCell::new(0), fail_until: 3 };
        let mut mem = FakeMemory { writes: alloc::collections::BTreeMap::new() };
        let mut entry = FakeEntry { jumped_to: core::cell::RefCell::new(None) };
        let handover = KernelHandover::new(&mut bs, &mut mem, &mut entry, true);

        let snapshot_entries = handover.snapshot_e820().unwrap();
        assert!(snapshot_entries.is_empty());
    }

    #[test]
    fn write_setup_header_populates_expected_offsets() {
        let mut mem = FakeMemory { writes: alloc::collections::BTreeMap::new() };
        let params = HandoverParams {
            cmdline_addr: 0x1000,
            ramdisk_addr: 0x2000,
            ramdisk_len: 0x500,
            code32_start: 0x100000,
            kernel_entry_64: Some(0x100000),
            boot_params_addr: 0x90000,
            screen_info: None,
        };
        write_setup_header(&mut mem, &params).unwrap();
        let base = params.boot_params_addr;
        assert_eq!(mem.writes[&(base + setup_header_offset::TYPE_OF_LOADER)], alloc::vec![LOADER_ID]);
        assert_eq!(
            mem.writes[&(base + setup_header_offset::CMD_LINE_PTR)],
            (params.cmdline_addr as u32).to_le_bytes().to_vec()
        );
    }
}
