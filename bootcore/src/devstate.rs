//! Lock state and rollback-index storage: a TPM 2.0 NV-index backing when a
//! TPM is present, falling back to authenticated firmware variables when it
//! is not. See §4.3 / §6.1 / §6.3 of the design notes for the persisted
//! layouts this module implements against.

extern crate alloc;
use alloc::format;
use alloc::vec;
use alloc::vec::Vec;

use log::warn;

use crate::error::{Error, Result};
use crate::platform::{Clock, NvAttributes, NvVars, TeeChannel, Tpm};
use crate::target::LockState;

/// Number of rollback-index slots tracked (`0..MAX_ROLLBACK_SLOTS`).
pub const MAX_ROLLBACK_SLOTS: usize = 8;

/// TPM NV index holding the `bootloader` struct (lock state + rollback
/// indices).
pub const BOOTLOADER_NV_INDEX: u32 = 0x0150_0082;
/// TPM NV index holding the 32-byte trusty seed.
pub const TRUSTY_SEED_NV_INDEX: u32 = 0x0150_0080;
/// Size of the `bootloader` NV index.
pub const BOOTLOADER_NV_SIZE: u16 = 512;
/// Size of the `trusty_seed` NV index.
pub const TRUSTY_SEED_NV_SIZE: u16 = 32;

const LOCK_STATE_OFFSET: u16 = 1;
const ROLLBACK_BASE_OFFSET: u16 = 8;

/// Persists lock state and rollback indices across reboots, on whichever
/// backing the platform provides.
pub trait DeviceStateStore {
    /// Provision backing storage. Idempotent; safe to call every boot.
    fn init(&mut self) -> Result<()>;
    /// Read the persisted lock state. Callers apply the build-variant
    /// failure fallback (see [`crate::config::BuildVariant::read_failure_lock_state`])
    /// on `Err`, this trait only reports what actually happened.
    fn read_lock_state(&mut self) -> Result<LockState>;
    /// Persist a new lock state. Only reachable from the fastboot path;
    /// the core itself never calls this.
    fn write_lock_state(&mut self, state: LockState) -> Result<()>;
    /// Read the rollback index for `slot` (`0..MAX_ROLLBACK_SLOTS`).
    fn read_rollback_index(&mut self, slot: u8) -> Result<u64>;
    /// Persist a new rollback index for `slot`. Refuses decreases with
    /// `PolicyViolation`.
    fn write_rollback_index(&mut self, slot: u8, value: u64) -> Result<()>;
    /// Read the trusty seed. At most once per boot; a second call in the
    /// same boot returns `AccessDenied`.
    fn read_trusty_seed(&mut self) -> Result<[u8; 32]>;
    /// Leave the backing storage locked for the remainder of this boot.
    /// Must be called strictly after every rollback-index write.
    fn seal(&mut self) -> Result<()>;
}

fn check_slot(slot: u8) -> Result<()> {
    if (slot as usize) < MAX_ROLLBACK_SLOTS {
        Ok(())
    } else {
        Err(Error::NotFound)
    }
}

/// TPM 2.0 backing: `bootloader` struct at [`BOOTLOADER_NV_INDEX`], trusty
/// seed at [`TRUSTY_SEED_NV_INDEX`].
pub struct TpmDeviceState<'a> {
    tpm: &'a mut dyn Tpm,
    seed_read_this_boot: bool,
}

impl<'a> TpmDeviceState<'a> {
    /// Wrap a `Tpm` collaborator.
    pub fn new(tpm: &'a mut dyn Tpm) -> Self {
        Self { tpm, seed_read_this_boot: false }
    }

    fn define_attrs() -> NvAttributes {
        NvAttributes::OWNER_WRITE.or(NvAttributes::AUTH_READ)
    }
}

impl<'a> DeviceStateStore for TpmDeviceState<'a> {
    fn init(&mut self) -> Result<()> {
        if !self.tpm.platform_secure_boot_enabled()? {
            warn!("platform secure boot disabled, refusing to provision device-state NV indices");
            return Ok(());
        }
        self.tpm.nv_define(BOOTLOADER_NV_INDEX, Self::define_attrs(), BOOTLOADER_NV_SIZE)?;
        self.tpm.nv_define(
            TRUSTY_SEED_NV_INDEX,
            Self::define_attrs().or(NvAttributes::WRITE_LOCKABLE).or(NvAttributes::READ_LOCKABLE),
            TRUSTY_SEED_NV_SIZE,
        )?;
        Ok(())
    }

    fn read_lock_state(&mut self) -> Result<LockState> {
        let bytes = self.tpm.nv_read(BOOTLOADER_NV_INDEX, LOCK_STATE_OFFSET, 1)?;
        let byte = bytes.first().copied().ok_or(Error::Corrupted)?;
        LockState::from_byte(byte).ok_or(Error::Corrupted)
    }

    fn write_lock_state(&mut self, state: LockState) -> Result<()> {
        self.tpm.nv_write(BOOTLOADER_NV_INDEX, LOCK_STATE_OFFSET, &[state.to_byte()])
    }

    fn read_rollback_index(&mut self, slot: u8) -> Result<u64> {
        check_slot(slot)?;
        let offset = ROLLBACK_BASE_OFFSET + (slot as u16) * 8;
        let bytes = self.tpm.nv_read(BOOTLOADER_NV_INDEX, offset, 8)?;
        if bytes.len() < 8 {
            return Err(Error::Corrupted);
        }
        Ok(u64::from_le_bytes(bytes[0..8].try_into().unwrap_or([0; 8])))
    }

    fn write_rollback_index(&mut self, slot: u8, value: u64) -> Result<()> {
        check_slot(slot)?;
        let current = self.read_rollback_index(slot).unwrap_or(0);
        if value < current {
            return Err(Error::PolicyViolation);
        }
        let offset = ROLLBACK_BASE_OFFSET + (slot as u16) * 8;
        self.tpm.nv_write(BOOTLOADER_NV_INDEX, offset, &value.to_le_bytes())
    }

    fn read_trusty_seed(&mut self) -> Result<[u8; 32]> {
        if self.seed_read_this_boot {
            return Err(Error::AccessDenied);
        }
        let bytes = self.tpm.nv_read(TRUSTY_SEED_NV_INDEX, 0, TRUSTY_SEED_NV_SIZE)?;
        if bytes.len() < 32 {
            return Err(Error::Corrupted);
        }
        self.seed_read_this_boot = true;
        self.tpm.nv_read_lock(TRUSTY_SEED_NV_INDEX)?;
        let mut seed = [0u8; 32];
        seed.copy_from_slice(&bytes[0..32]);
        Ok(seed)
    }

    fn seal(&mut self) -> Result<()> {
        self.tpm.nv_read_lock(BOOTLOADER_NV_INDEX)?;
        self.tpm.nv_read_lock(TRUSTY_SEED_NV_INDEX)?;
        self.tpm.nv_write_lock(TRUSTY_SEED_NV_INDEX)?;
        Ok(())
    }
}

const OEM_LOCK_NS: &str = "fastboot";
const OEM_LOCK_NAME: &str = "OEMLock";

/// Authenticated-NV backing, used when no TPM is present. The same
/// logical record, but spread across a single `OEMLock` variable and
/// per-slot `RollbackIndex_%04x` variables. No trusty-seed binding exists
/// on this backing; `read_trusty_seed` always fails with `NotFound`.
pub struct NvDeviceState<'a> {
    vars: &'a mut dyn NvVars,
}

impl<'a> NvDeviceState<'a> {
    /// Wrap an `NvVars` collaborator.
    pub fn new(vars: &'a mut dyn NvVars) -> Self {
        Self { vars }
    }

    fn rollback_name(slot: u8) -> alloc::string::String {
        format!("RollbackIndex_{:04x}", slot)
    }
}

impl<'a> DeviceStateStore for NvDeviceState<'a> {
    fn init(&mut self) -> Result<()> {
        if self.vars.get(OEM_LOCK_NS, OEM_LOCK_NAME)?.is_none() {
            self.vars.set(OEM_LOCK_NS, OEM_LOCK_NAME, &[LockState::Locked.to_byte()], false)?;
        }
        Ok(())
    }

    fn read_lock_state(&mut self) -> Result<LockState> {
        let bytes = self.vars.get(OEM_LOCK_NS, OEM_LOCK_NAME)?.ok_or(Error::NotFound)?;
        let byte = bytes.first().copied().ok_or(Error::Corrupted)?;
        LockState::from_byte(byte).ok_or(Error::Corrupted)
    }

    fn write_lock_state(&mut self, state: LockState) -> Result<()> {
        self.vars.set(OEM_LOCK_NS, OEM_LOCK_NAME, &[state.to_byte()], false)
    }

    fn read_rollback_index(&mut self, slot: u8) -> Result<u64> {
        check_slot(slot)?;
        let name = Self::rollback_name(slot);
        match self.vars.get(OEM_LOCK_NS, &name)? {
            Some(bytes) if bytes.len() >= 8 => Ok(u64::from_le_bytes(bytes[0..8].try_into().unwrap_or([0; 8]))),
            Some(_) => Err(Error::Corrupted),
            None => Ok(0),
        }
    }

    fn write_rollback_index(&mut self, slot: u8, value: u64) -> Result<()> {
        check_slot(slot)?;
        let current = self.read_rollback_index(slot).unwrap_or(0);
        if value < current {
            return Err(Error::PolicyViolation);
        }
        let name = Self::rollback_name(slot);
        self.vars.set(OEM_LOCK_NS, &name, &value.to_le_bytes(), false)
    }

    fn read_trusty_seed(&mut self) -> Result<[u8; 32]> {
        Err(Error::NotFound)
    }

    fn seal(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Upper bound on the `tee_tpm` busy-wait, resolving the open question in
/// the design notes (the source polls with no timeout at all). Chosen
/// generously relative to a realistic hypervisor round-trip so a healthy
/// peer never trips it, while a wedged one fails the boot instead of
/// hanging it forever; see DESIGN.md.
pub const TEE_POLL_TIMEOUT_US: u64 = 2_000_000;

mod tee_opcode {
    pub const INIT: u8 = 0x01;
    pub const READ_LOCK_STATE: u8 = 0x02;
    pub const WRITE_LOCK_STATE: u8 = 0x03;
    pub const READ_ROLLBACK_INDEX: u8 = 0x04;
    pub const WRITE_ROLLBACK_INDEX: u8 = 0x05;
    pub const READ_TRUSTY_SEED: u8 = 0x06;
    pub const SEAL: u8 = 0x07;
}

fn tee_status_to_error(status: u8) -> Option<Error> {
    match status {
        0 => None,
        1 => Some(Error::NotFound),
        2 => Some(Error::Corrupted),
        3 => Some(Error::AccessDenied),
        4 => Some(Error::PolicyViolation),
        _ => Some(Error::DeviceError),
    }
}

/// Remote TEE backing (§4.3): every `DeviceStateStore` operation is
/// forwarded as a single request/reply pair across a shared-memory
/// `TeeChannel` to a hypervisor peer, rather than talking to a local TPM
/// or NV-variable store directly. Identical record shape and semantics to
/// [`TpmDeviceState`]; only the transport differs.
pub struct TeeDeviceState<'a> {
    channel: &'a mut dyn TeeChannel,
    clock: &'a dyn Clock,
    seed_read_this_boot: bool,
}

impl<'a> TeeDeviceState<'a> {
    /// Wrap a `TeeChannel` collaborator. `clock` bounds the not-ready poll
    /// at [`TEE_POLL_TIMEOUT_US`].
    pub fn new(channel: &'a mut dyn TeeChannel, clock: &'a dyn Clock) -> Self {
        Self { channel, clock, seed_read_this_boot: false }
    }

    /// Submit `request` and busy-wait for a reply, polling the
    /// not-ready sentinel until [`TEE_POLL_TIMEOUT_US`] elapses.
    fn call(&mut self, request: &[u8]) -> Result<Vec<u8>> {
        self.channel.submit(request)?;
        let deadline = self.clock.now_monotonic_us().saturating_add(TEE_POLL_TIMEOUT_US);
        loop {
            if let Some(reply) = self.channel.poll()? {
                let status = reply.first().copied().ok_or(Error::Corrupted)?;
                return match tee_status_to_error(status) {
                    Some(err) => Err(err),
                    None => Ok(reply[1..].to_vec()),
                };
            }
            if self.clock.now_monotonic_us() >= deadline {
                return Err(Error::Timeout);
            }
        }
    }
}

impl<'a> DeviceStateStore for TeeDeviceState<'a> {
    fn init(&mut self) -> Result<()> {
        self.call(&[tee_opcode::INIT]).map(|_| ())
    }

    fn read_lock_state(&mut self) -> Result<LockState> {
        let reply = self.call(&[tee_opcode::READ_LOCK_STATE])?;
        let byte = reply.first().copied().ok_or(Error::Corrupted)?;
        LockState::from_byte(byte).ok_or(Error::Corrupted)
    }

    fn write_lock_state(&mut self, state: LockState) -> Result<()> {
        self.call(&[tee_opcode::WRITE_LOCK_STATE, state.to_byte()]).map(|_| ())
    }

    fn read_rollback_index(&mut self, slot: u8) -> Result<u64> {
        check_slot(slot)?;
        let reply = self.call(&[tee_opcode::READ_ROLLBACK_INDEX, slot])?;
        if reply.len() < 8 {
            return Err(Error::Corrupted);
        }
        Ok(u64::from_le_bytes(reply[0..8].try_into().unwrap_or([0; 8])))
    }

    fn write_rollback_index(&mut self, slot: u8, value: u64) -> Result<()> {
        check_slot(slot)?;
        let current = self.read_rollback_index(slot).unwrap_or(0);
        if value < current {
            return Err(Error::PolicyViolation);
        }
        let mut request = Vec::with_capacity(10);
        request.push(tee_opcode::WRITE_ROLLBACK_INDEX);
        request.push(slot);
        request.extend_from_slice(&value.to_le_bytes());
        self.call(&request).map(|_| ())
    }

    fn read_trusty_seed(&mut self) -> Result<[u8; 32]> {
        if self.seed_read_this_boot {
            return Err(Error::AccessDenied);
        }
        let reply = self.call(&[tee_opcode::READ_TRUSTY_SEED])?;
        if reply.len() < 32 {
            return Err(Error::Corrupted);
        }
        self.seed_read_this_boot = true;
        let mut seed = [0u8; 32];
        seed.copy_from_slice(&reply[0..32]);
        Ok(seed)
    }

    fn seal(&mut self) -> Result<()> {
        self.call(&[tee_opcode::SEAL]).map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::Tpm;
    use alloc::collections::BTreeMap;
    use alloc::vec;
    use alloc::vec::Vec;

    struct FakeTpm {
        secure_boot: bool,
        indices: BTreeMap<u32, Vec<u8>>,
        read_locked: BTreeMap<u32, bool>,
    }

    impl FakeTpm {
        fn new() -> Self {
            Self { secure_boot: true, indices: BTreeMap::new(), read_locked: BTreeMap::new() }
        }
    }

    impl Tpm for FakeTpm {
        fn platform_secure_boot_enabled(&self) -> Result<bool> {
            Ok(self.secure_boot)
        }
        fn nv_define(&mut self, index: u32, _attrs: NvAttributes, size: u16) -> Result<()> {
            self.indices.entry(index).or_insert_with(|| vec![0u8; size as usize]);
            Ok(())
        }
        fn nv_read(&self, index: u32, offset: u16, len: u16) -> Result<Vec<u8>> {
            if *self.read_locked.get(&index).unwrap_or(&false) {
                return Err(Error::AccessDenied);
            }
            let data = self.indices.get(&index).ok_or(Error::NotFound)?;
            let start = offset as usize;
            let end = start + len as usize;
            data.get(start..end).map(|s| s.to_vec()).ok_or(Error::OutOfBounds)
        }
        fn nv_write(&mut self, index: u32, offset: u16, bytes: &[u8]) -> Result<()> {
            let data = self.indices.get_mut(&index).ok_or(Error::NotFound)?;
            let start = offset as usize;
            data[start..start + bytes.len()].copy_from_slice(bytes);
            Ok(())
        }
        fn nv_read_lock(&mut self, index: u32) -> Result<()> {
            self.read_locked.insert(index, true);
            Ok(())
        }
        fn nv_write_lock(&mut self, _index: u32) -> Result<()> {
            Ok(())
        }
        fn get_random(&mut self, buf: &mut [u8]) -> Result<()> {
            buf.fill(0x42);
            Ok(())
        }
    }

    #[test]
    fn test_tpm_rollback_refuses_decrease() {
        let mut tpm = FakeTpm::new();
        let mut store = TpmDeviceState::new(&mut tpm);
        store.init().unwrap();
        store.write_rollback_index(0, 5).unwrap();
        assert_eq!(store.write_rollback_index(0, 3), Err(Error::PolicyViolation));
        assert_eq!(store.read_rollback_index(0).unwrap(), 5);
    }

    #[test]
    fn test_trusty_seed_one_shot_per_boot() {
        let mut tpm = FakeTpm::new();
        let mut store = TpmDeviceState::new(&mut tpm);
        store.init().unwrap();
        assert!(store.read_trusty_seed().is_ok());
        assert_eq!(store.read_trusty_seed(), Err(Error::AccessDenied));
    }

    #[test]
    fn test_secure_boot_disabled_skips_provisioning() {
        let mut tpm = FakeTpm::new();
        tpm.secure_boot = false;
        let mut store = TpmDeviceState::new(&mut tpm);
        store.init().unwrap();
        assert_eq!(store.read_lock_state(), Err(Error::NotFound));
    }

    #[test]
    fn test_seal_locks_trusty_seed_even_if_unread() {
        let mut tpm = FakeTpm::new();
        let mut store = TpmDeviceState::new(&mut tpm);
        store.init().unwrap();
        store.seal().unwrap();
        assert_eq!(store.read_trusty_seed(), Err(Error::AccessDenied));
    }

    struct FakeNvVars {
        vars: BTreeMap<(alloc::string::String, alloc::string::String), Vec<u8>>,
    }

    impl FakeNvVars {
        fn new() -> Self {
            Self { vars: BTreeMap::new() }
        }
    }

    impl NvVars for FakeNvVars {
        fn get(&self, namespace: &str, name: &str) -> Result<Option<Vec<u8>>> {
            Ok(self.vars.get(&(namespace.into(), name.into())).cloned())
        }
        fn set(&mut self, namespace: &str, name: &str, value: &[u8], _runtime_accessible: bool) -> Result<()> {
            self.vars.insert((namespace.into(), name.into()), value.to_vec());
            Ok(())
        }
        fn del(&mut self, namespace: &str, name: &str) -> Result<()> {
            self.vars.remove(&(namespace.into(), name.into()));
            Ok(())
        }
    }

    #[test]
    fn test_nv_backing_rollback_defaults_to_zero() {
        let mut vars = FakeNvVars::new();
        let store = NvDeviceState::new(&mut vars);
        assert_eq!(store.read_rollback_index(3).unwrap(), 0);
    }

    #[test]
    fn test_nv_backing_has_no_trusty_seed() {
        let mut vars = FakeNvVars::new();
        let mut store = NvDeviceState::new(&mut vars);
        assert_eq!(store.read_trusty_seed(), Err(Error::NotFound));
    }

    #[test]
    fn test_nv_backing_init_defaults_to_locked() {
        let mut vars = FakeNvVars::new();
        let mut store = NvDeviceState::new(&mut vars);
        store.init().unwrap();
        assert_eq!(store.read_lock_state().unwrap(), LockState::Locked);
    }
}
