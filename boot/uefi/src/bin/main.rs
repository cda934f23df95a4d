//! Helix verified-boot entry point.
//!
//! Locates every firmware collaborator, decides the boot target (§4.1),
//! runs AVB-style verification and A/B slot bookkeeping (§4.4), assembles
//! the final ramdisk and kernel command line (§4.5), then stages and
//! jumps to the Linux kernel (§4.6). Everything past locating the
//! collaborators is a thin driver over `helix_bootcore`; this file owns
//! no boot policy of its own.

#![no_std]
#![no_main]

extern crate alloc;

use alloc::string::{String, ToString};
use alloc::vec;

use helix_uefi::debug::{self, LogLevel};
use helix_uefi::prelude::*;
use helix_uefi::protocols::filesystem::FileSystem;
use helix_uefi::protocols::EnumerableProtocol;
use helix_uefi::raw::memory::MemoryType;
use helix_uefi::raw::protocols::loaded_image::EfiLoadedImageProtocol;
use helix_uefi::raw::types::{AllocateType, PhysicalAddress};
use helix_uefi::services;
use helix_uefi::services::boot::BootServices as RawBootServices;
use helix_uefi::string::ucs2_to_utf8;

use helix_bootcore::assemble::CmdlineContext;
use helix_bootcore::devstate::{NvDeviceState, TpmDeviceState};
use helix_bootcore::error::Error as CoreError;
use helix_bootcore::handover::HandoverParams;
use helix_bootcore::slots::SlotManager;

entry!(main);

/// Path this loader checks on the ESP for a one-shot fastboot override.
const FASTBOOT_SENTINEL_PATH: &str = "\\force_fastboot";

/// `androidboot.bootloader` value. No build-stamping pipeline wires this
/// binary's actual release identifier in yet; the crate version is a
/// reasonable stand-in.
const BOOTLOADER_VERSION: &str = concat!("helix-uefi-", env!("CARGO_PKG_VERSION"));

/// `androidboot.boot_devices` value. Resolving the real controller's PCI
/// device path needs the `pci`/device-path plumbing this bootloader
/// doesn't yet drive end to end; left as a fixed placeholder.
const BOOT_DEVICES: &str = "unknown";

/// `androidboot.boottime` profile label.
const BOOTTIME_PROFILE: &str = "fast";

/// Conventional physical load address for the protected-mode kernel image
/// (bzImage's `LOAD_HIGH` convention).
const KERNEL_LOAD_ADDR: u64 = 0x0010_0000;

/// Offset of `setup_sects` in the Linux x86 boot protocol header.
const SETUP_SECTS_OFFSET: usize = 0x1f1;
const DEFAULT_SETUP_SECTS: u8 = 4;
const PAGE_SIZE: usize = 4096;

fn main() -> Result<()> {
    debug::install(LogLevel::Info);
    log::info!("helix verified-boot stage starting");

    let platform = UefiPlatform::init()?;
    let UefiPlatform { facade, root_key, mut image_source, mut boot_services, mut memory, mut entry } = platform;

    // TODO: wire the actual build-variant stamp once release tooling
    // produces one; every target this binary ships to today is a
    // production (`User`) build.
    let variant = BuildVariant::User;
    let mut ctx = Context::new(facade, variant);
    ctx.init_device_state().map_err(map_core_err)?;

    let image_cmdline = read_image_cmdline();
    let fastboot_sentinel_present = check_fastboot_sentinel();

    let target = ctx.decide_target(&image_cmdline, fastboot_sentinel_present);
    log::info!("boot target decided: {target:?}");

    if !matches!(target, BootTarget::NormalBoot | BootTarget::Recovery) {
        log::info!("handing target {target:?} off to the platform");
        ctx.hand_off(target);
    }

    let lock_state = ctx.lock_state();
    let mut verifier = Verifier::new(&mut image_source, &root_key, lock_state);

    // Built directly over `ctx.platform`'s fields rather than through
    // `Context::slot_manager`/`Context::device_state`: both of those take
    // `&mut Context` and `verify_and_advance` needs a `SlotManager` and a
    // `DeviceStateStore` borrowed at the same time.
    let mut slots = SlotManager::init(ctx.platform.block_store.as_mut()).map_err(map_core_err)?;
    let mut devstate: alloc::boxed::Box<dyn DeviceStateStore> = match ctx.platform.tpm.as_mut() {
        Some(tpm) => alloc::boxed::Box::new(TpmDeviceState::new(tpm.as_mut())),
        None => alloc::boxed::Box::new(NvDeviceState::new(ctx.platform.nv_vars.as_mut())),
    };

    let verification = match verifier.verify_and_advance(&target, &mut slots, devstate.as_mut()) {
        Ok(v) => v,
        Err(err) => {
            log::error!("verification failed on both slots: {err}");
            drop(slots);
            drop(devstate);
            ctx.hand_off(BootTarget::CrashMode);
        }
    };
    drop(slots);
    drop(devstate);
    log::info!("verification complete: boot_state={:?} slot={}", verification.boot_state, verification.slot_suffix);

    let cmdline_ctx = CmdlineContext {
        config: &ctx.config,
        smbios: ctx.platform.smbios.as_ref(),
        reset_info: ctx.platform.reset_info.as_ref(),
        bootloader_version: BOOTLOADER_VERSION,
        boot_devices: BOOT_DEVICES,
        resume_partuuid: None,
        boottime_profile: BOOTTIME_PROFILE,
    };
    let assembled = BootImageAssembler::build(&verification, &cmdline_ctx).map_err(map_core_err)?;

    let st = unsafe { services::system_table() };
    let raw_bs = unsafe { RawBootServices::from_ptr(st.boot_services) }.ok_or(Error::BootServicesUnavailable)?;

    let kernel = &verification.boot_image.kernel;
    let setup_sects = kernel.get(SETUP_SECTS_OFFSET).copied().unwrap_or(0);
    let setup_sects = if setup_sects == 0 { DEFAULT_SETUP_SECTS } else { setup_sects };
    let setup_size = ((setup_sects as usize + 1) * 512).min(kernel.len());
    let protected_mode = &kernel[setup_size..];

    // `boot_params` plus the handover GDT staged right after it (§4.6
    // step 3) need two contiguous pages.
    let mut boot_params_phys = PhysicalAddress(0);
    raw_bs
        .allocate_pages(AllocateType::AllocateAnyPages, MemoryType::LoaderData, 2, &mut boot_params_phys)
        .map_err(Error::from_status)?;
    let boot_params_addr = boot_params_phys.0;
    memory.write_at(boot_params_addr, &vec![0u8; 2 * PAGE_SIZE]).map_err(map_core_err)?;
    memory.write_at(boot_params_addr, &kernel[..setup_size]).map_err(map_core_err)?;

    let kernel_pages = protected_mode.len().div_ceil(PAGE_SIZE).max(1);
    let mut kernel_phys = PhysicalAddress(KERNEL_LOAD_ADDR);
    raw_bs
        .allocate_pages(AllocateType::AllocateAddress, MemoryType::LoaderCode, kernel_pages, &mut kernel_phys)
        .map_err(Error::from_status)?;
    memory.write_at(kernel_phys.0, protected_mode).map_err(map_core_err)?;

    let ramdisk_pages = assembled.ramdisk.len().div_ceil(PAGE_SIZE).max(1);
    let mut ramdisk_phys = PhysicalAddress(0);
    raw_bs
        .allocate_pages(AllocateType::AllocateAnyPages, MemoryType::LoaderData, ramdisk_pages, &mut ramdisk_phys)
        .map_err(Error::from_status)?;
    memory.write_at(ramdisk_phys.0, &assembled.ramdisk).map_err(map_core_err)?;

    let mut cmdline_bytes = assembled.cmdline.into_bytes();
    cmdline_bytes.push(0);
    let cmdline_pages = cmdline_bytes.len().div_ceil(PAGE_SIZE).max(1);
    let mut cmdline_phys = PhysicalAddress(0);
    raw_bs
        .allocate_pages(AllocateType::AllocateAnyPages, MemoryType::LoaderData, cmdline_pages, &mut cmdline_phys)
        .map_err(Error::from_status)?;
    memory.write_at(cmdline_phys.0, &cmdline_bytes).map_err(map_core_err)?;

    let params = HandoverParams {
        cmdline_addr: cmdline_phys.0,
        ramdisk_addr: ramdisk_phys.0,
        ramdisk_len: assembled.ramdisk.len() as u32,
        code32_start: kernel_phys.0 as u32,
        kernel_entry_64: None,
        boot_params_addr,
        screen_info: None,
    };

    log::info!("staged kernel at 0x{:x}, ramdisk at 0x{:x}, handing off", kernel_phys.0, ramdisk_phys.0);
    let handover = KernelHandover::new(&mut boot_services, &mut memory, &mut entry, true);
    handover.run(params);
}

/// `helix_bootcore` and this crate name the same error taxonomy
/// independently (see `facade::map_uefi_err`'s counterpart); convert at
/// the boundary rather than let either error type leak into the other.
fn map_core_err(err: CoreError) -> Error {
    match err {
        CoreError::NotFound => Error::NotFound,
        CoreError::Corrupted => Error::VolumeCorrupted,
        CoreError::AccessDenied => Error::AccessDenied,
        CoreError::IntegrityFailed | CoreError::PolicyViolation => Error::SecurityViolation,
        CoreError::OutOfResources => Error::OutOfResources,
        CoreError::Timeout => Error::Timeout,
        CoreError::OutOfBounds => Error::InvalidParameter,
        CoreError::DeviceError => Error::DeviceError,
    }
}

/// The cmdline the loader itself was invoked with, read from the loaded
/// image's `LoadOptions` (distinct from the Android kernel cmdline
/// `BootImageAssembler` builds). Missing or unreadable degrades to an
/// empty string, the same as no override being present.
fn read_image_cmdline() -> String {
    let Some(handle) = services::image_handle() else {
        return String::new();
    };
    let st = unsafe { services::system_table() };
    let Some(bs) = (unsafe { RawBootServices::from_ptr(st.boot_services) }) else {
        return String::new();
    };

    let ptr = match bs.handle_protocol::<EfiLoadedImageProtocol>(handle, &EfiLoadedImageProtocol::GUID) {
        Ok(ptr) if !ptr.is_null() => ptr,
        _ => return String::new(),
    };
    let loaded_image = unsafe { &*ptr };
    let Some(utf16) = (unsafe { loaded_image.load_options_utf16() }) else {
        return String::new();
    };

    let mut buf = [0u8; 1024];
    let len = ucs2_to_utf8(utf16, &mut buf);
    core::str::from_utf8(&buf[..len]).unwrap_or("").to_string()
}

/// Whether `\force_fastboot` exists on the ESP. Filesystem access is
/// deliberately outside `helix_bootcore`'s scope; this is the one place
/// this binary resolves it before handing the result to `BootPolicy`.
fn check_fastboot_sentinel() -> bool {
    match FileSystem::first() {
        Ok(mut fs) => fs.exists(FASTBOOT_SENTINEL_PATH),
        Err(_) => false,
    }
}
