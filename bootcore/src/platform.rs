//! External collaborator traits.
//!
//! Everything this crate needs from the running platform is named here.
//! Production wiring (the sibling `boot/uefi` crate) implements these
//! against real firmware services; tests implement them against in-memory
//! fakes. The core never reaches past these traits to touch hardware
//! directly.

extern crate alloc;
use alloc::boxed::Box;
use alloc::string::String;
use alloc::vec::Vec;

use crate::error::Result;
use crate::target::BootTarget;

/// Raw, offset-addressed access to a boot-relevant block device (the
/// `misc` partition, `boot`/`vendor_boot`/`recovery` partitions, ...).
///
/// GPT parsing and partition flashing are out of scope for this crate;
/// `partition()` is the only lookup operation it needs, resolving a
/// partition label to an absolute byte range and the device's block size.
pub trait BlockStore {
    /// Read `len` bytes at `offset` into `buf`. `buf.len() >= len`.
    fn read(&self, offset: u64, len: usize, buf: &mut [u8]) -> Result<()>;
    /// Write `buf` at `offset`. Must be all-or-nothing: a partial write is
    /// never observable on a subsequent read.
    fn write(&mut self, offset: u64, buf: &[u8]) -> Result<()>;
    /// Flush any buffered writes to stable storage.
    fn flush(&mut self) -> Result<()>;
    /// Resolve a partition label to `(start_offset, end_offset,
    /// block_size)`.
    fn partition(&self, label: &str) -> Result<(u64, u64, u32)>;
}

/// Non-volatile firmware variable storage, namespaced the way UEFI
/// variables are namespaced by GUID - here by a string namespace
/// (`"loader"`, `"fastboot"`) for readability.
pub trait NvVars {
    /// Read a variable's raw value, or `Ok(None)` if it does not exist.
    fn get(&self, namespace: &str, name: &str) -> Result<Option<Vec<u8>>>;
    /// Set a variable. `runtime_accessible` controls whether the
    /// `RUNTIME_ACCESS` attribute is set; device-state-carrying variables
    /// must always pass `false` per §6.1's authenticated-NV backing.
    fn set(&mut self, namespace: &str, name: &str, value: &[u8], runtime_accessible: bool) -> Result<()>;
    /// Delete a variable. Deleting an absent variable is not an error.
    fn del(&mut self, namespace: &str, name: &str) -> Result<()>;
}

/// TPM NV-index attributes relevant to this crate. Mirrors the shape of a
/// UEFI variable-attributes bitset: a thin wrapper over a raw bitfield
/// rather than a full `bitflags!` type, since only a handful of
/// combinations are ever constructed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(transparent)]
pub struct NvAttributes(u32);

impl NvAttributes {
    /// Write requires owner or NV-index auth.
    pub const OWNER_WRITE: Self = Self(1 << 0);
    /// Write requires platform auth.
    pub const PLATFORM_WRITE: Self = Self(1 << 1);
    /// Reads are allowed without auth once unlocked.
    pub const AUTH_READ: Self = Self(1 << 2);
    /// Index supports write-lock (`TPM2_NV_WriteLock`).
    pub const WRITE_LOCKABLE: Self = Self(1 << 3);
    /// Index supports read-lock (`TPM2_NV_ReadLock`).
    pub const READ_LOCKABLE: Self = Self(1 << 4);
    /// No attributes.
    pub const NONE: Self = Self(0);

    /// Combine two attribute sets.
    pub const fn or(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    /// Test membership.
    pub fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }
}

/// Minimal TPM 2.0 command surface this crate needs. Command framing
/// (session handling, HMAC, marshaling) is the implementer's problem; this
/// trait speaks in terms of the operations `DeviceStateStore` actually
/// issues.
pub trait Tpm {
    /// Query whether the TPM reports platform secure boot enabled. The
    /// `bootloader`/`trusty_seed` indices must not be created unless this
    /// is `true` (§4.3).
    fn platform_secure_boot_enabled(&self) -> Result<bool>;
    /// Define (create) an NV index with the given attributes and size.
    /// Idempotent: defining an index that already exists with the same
    /// size is not an error.
    fn nv_define(&mut self, index: u32, attrs: NvAttributes, size: u16) -> Result<()>;
    /// Read `len` bytes at `offset` from NV index `index`.
    fn nv_read(&self, index: u32, offset: u16, len: u16) -> Result<Vec<u8>>;
    /// Write `bytes` at `offset` into NV index `index`.
    fn nv_write(&mut self, index: u32, offset: u16, bytes: &[u8]) -> Result<()>;
    /// Read-lock an NV index until the next TPM reset.
    fn nv_read_lock(&mut self, index: u32) -> Result<()>;
    /// Write-lock an NV index until the next TPM reset.
    fn nv_write_lock(&mut self, index: u32) -> Result<()>;
    /// Fill `buf` with TPM-sourced random bytes.
    fn get_random(&mut self, buf: &mut [u8]) -> Result<()>;
}

/// Wall-clock and monotonic time source.
pub trait Clock {
    /// Wall-clock time as `(year, month, day, hour, minute, second)`.
    fn now_wall(&self) -> (u16, u8, u8, u8, u8, u8);
    /// Monotonic microsecond counter, for bounded polling loops.
    fn now_monotonic_us(&self) -> u64;
}

/// Fills a buffer with random bytes (not necessarily TPM-backed - may be
/// an RDRAND/RDSEED source or a firmware RNG protocol).
pub trait Rng {
    /// Fill `buf` with random bytes.
    fn fill(&mut self, buf: &mut [u8]) -> Result<()>;
}

/// Classification of why a crash-event/boot-target prompt is being shown,
/// passed through to `UserPrompt::choose_boot_target`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptReason {
    /// Watchdog reset-storm counter exceeded its threshold.
    WatchdogStorm,
    /// Verification produced `BootState::Red` on a locked device.
    VerificationFailedLocked,
    /// Every slot is exhausted (`SlotManager::active_slot()` is `None`).
    AllSlotsExhausted,
}

/// The UI layer, reduced to the handful of operations the core needs to
/// call out to: present a crash/boot-target choice, or show a fixed
/// battery notice. Splash rendering, menus, and input handling live
/// entirely on the other side of this trait.
pub trait UserPrompt {
    /// Ask the user (or an unattended policy on the other side of this
    /// trait) to pick a target out of the crash-event menu. Implementers
    /// must return either `Fastboot` or `NormalBoot`.
    fn choose_crash_target(&mut self) -> BootTarget;
    /// Ask for a boot-target decision for the given reason.
    fn choose_boot_target(&mut self, reason: PromptReason) -> BootTarget;
    /// Display a low-battery notice (boot continues to `Charger`).
    fn display_low_battery(&mut self);
    /// Display an empty-battery notice (boot continues to `PowerOff`).
    fn display_empty_battery(&mut self);
    /// Request a cold reset into `target`. Never returns on success.
    fn reboot(&mut self, target: BootTarget) -> !;
}

/// Why the platform woke up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WakeSource {
    /// A battery was just inserted.
    BatteryInserted,
    /// A USB charger was plugged in.
    UsbCharger,
    /// An AC/DC charger was plugged in.
    AcDcCharger,
    /// The power button was pressed.
    PowerButton,
    /// An RTC timer fired.
    RtcTimer,
    /// Some other, platform-specific wake source.
    Other,
}

/// Why the platform last reset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResetSource {
    /// Not applicable (cold power-on).
    NotApplicable,
    /// The kernel's own watchdog fired.
    KernelWatchdog,
    /// A security coprocessor watchdog fired.
    SecurityWatchdog,
    /// The PMIC's watchdog fired.
    PmicWatchdog,
    /// The embedded controller's watchdog fired.
    EcWatchdog,
    /// Some other, platform-specific reset source.
    Other,
}

impl ResetSource {
    /// Whether this source is one of the watchdog family the design
    /// notes' watchdog-storm policy reacts to.
    pub fn is_watchdog(self) -> bool {
        matches!(
            self,
            Self::KernelWatchdog | Self::SecurityWatchdog | Self::PmicWatchdog | Self::EcWatchdog
        )
    }
}

/// How the reset was triggered (warm/cold/shutdown), independent of the
/// *source*.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResetType {
    /// Cold boot.
    Cold,
    /// Warm reset (power stayed up).
    Warm,
    /// Shutdown, not yet a boot.
    Shutdown,
}

/// Reset/wake-source collaborator.
pub trait ResetInfo {
    /// Why the platform woke up.
    fn wake_source(&self) -> WakeSource;
    /// Why the platform last reset.
    fn reset_source(&self) -> ResetSource;
    /// How the reset was triggered.
    fn reset_type(&self) -> ResetType;
    /// Platform-specific extra reset detail, opaque to this crate except
    /// where the policy needs to compare it against a saved value.
    fn reset_extra_u32(&self) -> u32;
}

/// Installs ACPI/ACPIO tables. Table construction and installation
/// mechanics are out of scope; the core only decides *whether* and
/// *which* tables to ask for.
pub trait AcpiInstaller {
    /// Install ACPI/ACPIO tables embedded in the given boot-image view
    /// (the `acpi`/`recovery_acpio` sections of a parsed `BootImage`).
    fn install_from(&mut self, bytes: &[u8]) -> Result<()>;
    /// Install ACPI/ACPIO tables sourced from the named partitions.
    fn install_from_partitions(&mut self, labels: &[&str]) -> Result<()>;
}

/// SMBIOS/DMI-sourced device identity strings, pre-sanitisation.
pub trait SmBios {
    /// System serial number (SMBIOS type 1).
    fn system_serial(&self) -> Option<String>;
    /// Baseboard serial number (SMBIOS type 2).
    fn board_serial(&self) -> Option<String>;
    /// Product name (SMBIOS type 1).
    fn product_name(&self) -> Option<String>;
    /// BIOS/firmware version string (SMBIOS type 0).
    fn bios_version(&self) -> Option<String>;
}

/// Battery presence/level, consulted by the low-battery and
/// charger-threshold steps of the boot-target policy (§4.1 steps 8-9).
/// Charge-curve modelling and fuel-gauge access are the platform
/// adapter's problem.
pub trait Battery {
    /// Whether the charge level is below the minimum needed to boot the
    /// OS.
    fn below_boot_threshold(&self) -> bool;
    /// Whether any charger (USB or AC/DC) is currently plugged in.
    fn charger_present(&self) -> bool;
}

/// A single polled key event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    /// The volume-down / magic key used to request fastboot.
    Down,
    /// Any other key.
    Other,
}

/// Console input polling, used only by the bounded magic-key wait.
pub trait ConsoleInput {
    /// Poll for a key for up to `timeout_ms`. Returns `None` on timeout.
    fn poll_key(&mut self, timeout_ms: u32) -> Option<Key>;
}

/// One firmware memory-map descriptor, in the shape `GetMemoryMap()`
/// returns it: a UEFI memory type, not yet translated to an E820 type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemoryDescriptor {
    /// Raw UEFI memory type (`EfiConventionalMemory`, ...).
    pub efi_type: u32,
    /// Physical start address.
    pub physical_start: u64,
    /// Number of 4 KiB pages.
    pub page_count: u64,
}

/// A point-in-time memory map snapshot plus the opaque key
/// `ExitBootServices` must be called with. The key changes if any
/// allocation happens between the snapshot and the call, which is exactly
/// why `ExitBootServices` can fail and needs a retry loop.
#[derive(Debug, Clone, Default)]
pub struct MemoryMapSnapshot {
    /// Every descriptor in the map.
    pub descriptors: Vec<MemoryDescriptor>,
    /// Key to pass to `exit_boot_services`.
    pub map_key: u64,
}

/// Firmware boot-services surface needed to hand execution to the kernel.
/// Everything else UEFI's boot services offer (protocol location, timers,
/// events) is out of scope.
pub trait BootServices {
    /// Take a fresh memory-map snapshot.
    fn get_memory_map(&self) -> Result<MemoryMapSnapshot>;
    /// Attempt to exit boot services with the given map key. Firmware may
    /// legitimately reject this (the map changed since the snapshot); the
    /// caller retries with a fresh snapshot.
    fn exit_boot_services(&mut self, map_key: u64) -> Result<()>;
}

/// Raw physical-memory access used to stage the Linux `boot_params` page,
/// the E820 table, and the handover GDT before jumping to the kernel.
pub trait PhysicalMemory {
    /// Write `bytes` at physical address `addr`.
    fn write_at(&mut self, addr: u64, bytes: &[u8]) -> Result<()>;
    /// Read `len` bytes from physical address `addr` into `buf`.
    fn read_at(&self, addr: u64, len: usize, buf: &mut [u8]) -> Result<()>;
}

/// The final, architecture-specific jump into the kernel. Never returns on
/// success; a return at all is a handover failure the caller treats as
/// fatal.
pub trait KernelEntry {
    /// Transfer control to `entry_point` with `boot_params_addr` set up per
    /// the Linux x86 boot protocol register convention (`rsi` = boot_params,
    /// `rdi` = 0, `rax` = 0).
    fn jump(&mut self, entry_point: u64, boot_params_addr: u64) -> !;
}

/// Value the shared-memory reply slot holds while the hypervisor peer has
/// not yet produced a response to a `TeeChannel` request (§4.3's Remote
/// TEE backing, §9 design notes' `tee_tpm` busy-wait).
pub const TEE_NOT_READY_SENTINEL: u32 = 0x12AB_CDEF;

/// Shared-memory request/reply channel to a hypervisor peer, backing the
/// Remote TEE variant of `DeviceStateStore` (§4.3). Each logical
/// `DeviceStateStore` call becomes exactly one `submit`/`poll` pair: the
/// request is marshaled into the shared region, the peer is signalled,
/// and the caller polls until the not-ready sentinel clears.
pub trait TeeChannel {
    /// Write `request` into the shared-memory region and signal the peer
    /// that a new request is pending. Overwrites any prior, already-
    /// consumed reply.
    fn submit(&mut self, request: &[u8]) -> Result<()>;
    /// Poll the shared-memory region once. `Ok(None)` means the not-ready
    /// sentinel is still present; `Ok(Some(bytes))` is the peer's reply.
    fn poll(&mut self) -> Result<Option<Vec<u8>>>;
}

/// Bundles every §6 collaborator the core needs from the running host
/// behind owned trait objects, the way `boot/uefi`'s `protocols` module
/// bundles concrete UEFI protocol handles behind its service wrappers.
/// `Context` owns one of these; production wiring constructs it once at
/// entry, test harnesses construct it over in-memory fakes.
///
/// `PlatformFacade`'s only policy responsibility (§4.7) is failure
/// conversion and logging - it never decides a boot target itself.
pub struct PlatformFacade {
    /// Access to `misc`/`boot`/`vendor_boot`/recovery partitions.
    pub block_store: Box<dyn BlockStore>,
    /// `loader`/`fastboot` namespaced firmware variables.
    pub nv_vars: Box<dyn NvVars>,
    /// TPM 2.0 command surface, absent on TPM-less devices (the
    /// authenticated-NV `DeviceStateStore` backing is used instead).
    pub tpm: Option<Box<dyn Tpm>>,
    /// Wall-clock/monotonic time source.
    pub clock: Box<dyn Clock>,
    /// Random byte source for slot/seed provisioning.
    pub rng: Box<dyn Rng>,
    /// The UI layer's crash/boot-target prompt and battery notices.
    pub prompt: Box<dyn UserPrompt>,
    /// Why the platform woke/reset.
    pub reset_info: Box<dyn ResetInfo>,
    /// ACPI/ACPIO table installation.
    pub acpi: Box<dyn AcpiInstaller>,
    /// SMBIOS/DMI device identity.
    pub smbios: Box<dyn SmBios>,
    /// Magic-key polling.
    pub console: Box<dyn ConsoleInput>,
    /// Battery presence/level.
    pub battery: Box<dyn Battery>,
}

impl PlatformFacade {
    /// Turn a fallible device-state read into the boot-state demotion
    /// §4.3/§4.4 call for: log the failure at `warn!` and hand the caller
    /// back the build variant's documented fallback, never an error.
    pub fn lock_state_or_fallback(
        &self,
        result: Result<crate::target::LockState>,
        variant: crate::config::BuildVariant,
    ) -> crate::target::LockState {
        match result {
            Ok(state) => state,
            Err(err) => {
                log::warn!("lock-state read failed ({err}), falling back per build variant");
                variant.read_failure_lock_state()
            }
        }
    }
}
