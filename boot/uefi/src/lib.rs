//! # Helix UEFI Boot Platform
//!
//! The UEFI-side platform adapter for the Helix verified-boot stage: raw
//! firmware bindings, safe service/protocol wrappers, and the
//! [`facade::UefiPlatform`] that wires them into `helix_bootcore`'s
//! [`helix_bootcore::platform::PlatformFacade`].
//!
//! ## Architecture
//!
//! - **Layer 0 ([`raw`])**: raw UEFI bindings matching the UEFI specification
//! - **Layer 1 ([`services`])**: safe wrappers around Boot/Runtime services
//! - **Layer 2 ([`protocols`])**: high-level protocol abstractions (console,
//!   block I/O, RNG, ACPI, SMBIOS, ...)
//! - **Layer 4 ([`security`])**: TPM 2.0 command layer and the hashing it
//!   needs
//!
//! `helix_bootcore` owns the boot policy, AVB verification, slot bookkeeping,
//! and the handover sequence itself; this crate only supplies the
//! `PlatformFacade` trait implementations those routines call through.

#![no_std]
#![allow(unsafe_op_in_unsafe_fn)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::too_many_lines)]

extern crate alloc;

// =============================================================================
// MODULES
// =============================================================================

/// Raw UEFI bindings (Layer 0): direct mappings to UEFI specification
/// structures and functions, `#[repr(C)]` and ABI-matched.
pub mod raw;

/// Safe service wrappers (Layer 1) around Boot Services and Runtime
/// Services.
pub mod services;

/// Protocol abstractions (Layer 2): console, block I/O, RNG, PCI, ACPI,
/// SMBIOS, graphics, filesystem, serial.
pub mod protocols;

/// TPM 2.0 command layer and the hashing it needs (Layer 4).
pub mod security;

/// Architecture-specific code (CPUID, control registers, port I/O).
pub mod arch;

/// Debug output and logging (serial port backend for the `log` facade).
pub mod debug;

/// Bump/bitmap page allocators backing the global allocator.
pub mod mem_alloc;

/// UCS-2 string handling and UTF-8 conversion.
pub mod string;

/// GUID parsing and well-known UEFI GUIDs.
pub mod guid;

/// UEFI event system and synchronization primitives.
pub mod event;

/// PCI configuration space access and device enumeration.
pub mod pci;

/// Device path parsing and construction.
pub mod device_path;

/// Error types shared across this crate.
pub mod error;

/// [`helix_bootcore::platform`] trait implementations wired to the modules
/// above.
pub mod facade;

// =============================================================================
// GLOBAL ALLOCATOR
// =============================================================================

#[global_allocator]
static ALLOCATOR: mem_alloc::BootAllocator = mem_alloc::BootAllocator::new();

#[alloc_error_handler]
fn alloc_error(_layout: core::alloc::Layout) -> ! {
    loop {
        core::hint::spin_loop();
    }
}

// =============================================================================
// RE-EXPORTS
// =============================================================================

pub use error::{Error, Result};
pub use raw::types::{Guid, Handle, PhysicalAddress, Status, VirtualAddress};
pub use raw::system_table::{EfiSystemTable, SystemTablePtr};

/// Alias for [`EfiSystemTable`] for convenience.
pub type SystemTable = EfiSystemTable;

/// Common imports for the boot entry point.
pub mod prelude {
    pub use crate::facade::UefiPlatform;
    pub use crate::{entry, Error, Guid, Handle, Result, Status, SystemTable};
    pub use helix_bootcore::prelude::*;
}

// =============================================================================
// ENTRY POINT MACRO
// =============================================================================

/// Generates the `efiapi` entry point UEFI firmware expects and forwards
/// to the user's fallible entry function with the raw image handle and
/// system table pointer already captured in [`services`]'s globals.
#[macro_export]
macro_rules! entry {
    ($entry:ident) => {
        #[no_mangle]
        pub extern "efiapi" fn efi_main(
            image_handle: $crate::Handle,
            system_table: *const $crate::raw::system_table::EfiSystemTable,
        ) -> $crate::Status {
            unsafe {
                if let Err(e) = $crate::services::initialize(image_handle, system_table as *mut _) {
                    return e.into();
                }
            }

            match $entry() {
                Ok(()) => $crate::Status::SUCCESS,
                Err(e) => e.into(),
            }
        }
    };
}

// =============================================================================
// PANIC HANDLER
// =============================================================================

#[cfg(not(test))]
#[panic_handler]
fn panic(info: &core::panic::PanicInfo) -> ! {
    if services::is_initialized() {
        if let Ok(console) = protocols::console::Console::get() {
            let _ = console.write("\r\n\r\n*** PANIC ***\r\n");
            if let Some(location) = info.location() {
                let _ = console.write(location.file());
                let _ = console.write("\r\n");
            }
        }
    }

    loop {
        unsafe { core::arch::asm!("cli; hlt", options(nomem, nostack, noreturn)) };
    }
}
