//! Explicit boot context, replacing the global singletons the design
//! notes call out (`current lock state`, `active disk`, `active GPT`
//! module-level variables in the source): [`Context`] owns the
//! collaborator bundle and the caching fields every entry point threads
//! through instead.
//!
//! `Context` deliberately does not hold live [`crate::slots::SlotManager`]
//! or [`DeviceStateStore`] fields: both borrow from collaborators
//! [`PlatformFacade`] already owns (`block_store`, `tpm`/`nv_vars`), and
//! storing both the owner and a live borrow of it in the same struct would
//! be self-referential. Instead `Context` builds each on demand in the
//! method that needs it - the same short-lived-view-over-a-long-lived-
//! handle pattern the teacher's `boot/uefi` protocol services use rather
//! than caching a live protocol pointer.

extern crate alloc;
use alloc::boxed::Box;

use log::warn;

use crate::config::{BuildVariant, Config};
use crate::devstate::{DeviceStateStore, NvDeviceState, TpmDeviceState};
use crate::error::Result;
use crate::platform::PlatformFacade;
use crate::policy::BootPolicy;
use crate::slots::SlotManager;
use crate::target::{BootTarget, LockState};

/// Owns the platform collaborator bundle, loaded configuration, and the
/// handful of values worth caching for the lifetime of one boot attempt.
pub struct Context {
    /// Collaborator bundle (§6 traits, boxed).
    pub platform: PlatformFacade,
    /// Loaded tunables.
    pub config: Config,
    /// Build variant; gates debug overrides and the read-failure lock
    /// state fallback.
    pub variant: BuildVariant,

    cached_lock_state: Option<LockState>,
}

impl Context {
    /// Construct a context, loading `Config` from `platform.nv_vars`.
    /// Does not yet provision device-state storage; call
    /// [`Context::init_device_state`] once before relying on lock-state
    /// reads.
    pub fn new(platform: PlatformFacade, variant: BuildVariant) -> Self {
        let config = Config::load(variant, platform.nv_vars.as_ref());
        Self { platform, config, variant, cached_lock_state: None }
    }

    /// Build a [`DeviceStateStore`] over whichever backing the platform
    /// provides this boot: TPM NV-index backed if a TPM collaborator is
    /// present, authenticated-NV backed otherwise (§4.3).
    pub fn device_state(&mut self) -> Box<dyn DeviceStateStore + '_> {
        match self.platform.tpm.as_mut() {
            Some(tpm) => Box::new(TpmDeviceState::new(tpm.as_mut())),
            None => Box::new(NvDeviceState::new(self.platform.nv_vars.as_mut())),
        }
    }

    /// Provision the device-state backing. Safe to call every boot.
    pub fn init_device_state(&mut self) -> Result<()> {
        self.device_state().init()
    }

    /// The device's current lock state, cached for the remainder of this
    /// boot after the first (possibly fallible) read. A read failure
    /// degrades to the build variant's documented fallback rather than
    /// propagating (§4.3 failure semantics), and the fallback is itself
    /// cached so a transiently-failing backing is not retried every call.
    pub fn lock_state(&mut self) -> LockState {
        if let Some(cached) = self.cached_lock_state {
            return cached;
        }
        let variant = self.variant;
        let result = self.device_state().read_lock_state();
        let resolved = self.platform.lock_state_or_fallback(result, variant);
        self.cached_lock_state = Some(resolved);
        resolved
    }

    /// Invalidate the cached lock state after a fastboot-path write, so
    /// the next [`Context::lock_state`] call observes the change.
    pub fn invalidate_lock_state_cache(&mut self) {
        self.cached_lock_state = None;
    }

    /// Build a [`SlotManager`] over the owned block store. Short-lived by
    /// design: callers use it for one slot operation and let it drop,
    /// since it re-reads the metadata record from disk on every
    /// construction (`SlotManager::init`'s own corruption-tolerant
    /// reload).
    pub fn slot_manager(&mut self) -> Result<SlotManager<'_>> {
        SlotManager::init(self.platform.block_store.as_mut())
    }

    /// Run the boot-target policy (§4.1) against this context's
    /// collaborators and configuration.
    ///
    /// `image_cmdline` is the cmdline the loader itself was invoked with;
    /// `fastboot_sentinel_present` reports whether `\force_fastboot`
    /// exists on the ESP (filesystem access is out of this crate's
    /// scope, so the caller resolves this before calling in).
    pub fn decide_target(&mut self, image_cmdline: &str, fastboot_sentinel_present: bool) -> BootTarget {
        let decision = BootPolicy::decide(
            &self.config,
            image_cmdline,
            fastboot_sentinel_present,
            self.platform.console.as_mut(),
            self.platform.reset_info.as_ref(),
            self.platform.clock.as_ref(),
            self.platform.nv_vars.as_mut(),
            self.platform.block_store.as_mut(),
            self.platform.battery.as_ref(),
            self.platform.prompt.as_mut(),
        );

        if decision.mark_active_slot_verity_corrupted {
            match self.slot_manager() {
                Ok(mut slots) => {
                    if let Some(active) = slots.active_slot() {
                        if let Err(err) = slots.set_verity_corrupted(active, true) {
                            warn!("failed to persist verity-corrupted flag on slot {active}: {err}");
                        }
                    }
                }
                Err(err) => warn!("could not open slot metadata to mark verity-corrupted: {err}"),
            }
        }

        decision.target
    }

    /// Present `target` through [`crate::platform::UserPrompt::reboot`]
    /// and never return - the standard way every terminal,
    /// non-`NormalBoot`/`Recovery` target this crate does not itself
    /// execute (ESP chain-loads, Dnx, ExitShell, Memory, PowerOff) is
    /// handed back to the platform.
    pub fn hand_off(&mut self, target: BootTarget) -> ! {
        self.platform.prompt.reboot(target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::platform::{
        AcpiInstaller, Battery, BlockStore, Clock, ConsoleInput, Key, NvVars, PromptReason, ResetInfo, ResetSource,
        ResetType, Rng, SmBios, UserPrompt, WakeSource,
    };
    use alloc::collections::BTreeMap;
    use alloc::string::{String, ToString};
    use alloc::vec;
    use alloc::vec::Vec;

    struct FakeBlockStore {
        data: Vec<u8>,
    }

    impl BlockStore for FakeBlockStore {
        fn read(&self, offset: u64, len: usize, buf: &mut [u8]) -> Result<()> {
            let start = offset as usize;
            buf[..len].copy_from_slice(&self.data[start..start + len]);
            Ok(())
        }
        fn write(&mut self, offset: u64, bytes: &[u8]) -> Result<()> {
            let start = offset as usize;
            self.data[start..start + bytes.len()].copy_from_slice(bytes);
            Ok(())
        }
        fn flush(&mut self) -> Result<()> {
            Ok(())
        }
        fn partition(&self, label: &str) -> Result<(u64, u64, u32)> {
            if label == "misc" {
                Ok((0, self.data.len() as u64, 512))
            } else {
                Err(Error::NotFound)
            }
        }
    }

    struct FakeNvVars {
        map: BTreeMap<(String, String), Vec<u8>>,
    }

    impl NvVars for FakeNvVars {
        fn get(&self, namespace: &str, name: &str) -> Result<Option<Vec<u8>>> {
            Ok(self.map.get(&(namespace.to_string(), name.to_string())).cloned())
        }
        fn set(&mut self, namespace: &str, name: &str, value: &[u8], _runtime_accessible: bool) -> Result<()> {
            self.map.insert((namespace.to_string(), name.to_string()), value.to_vec());
            Ok(())
        }
        fn del(&mut self, namespace: &str, name: &str) -> Result<()> {
            self.map.remove(&(namespace.to_string(), name.to_string()));
            Ok(())
        }
    }

    struct FakeClock;
    impl Clock for FakeClock {
        fn now_wall(&self) -> (u16, u8, u8, u8, u8, u8) {
            (2026, 1, 1, 0, 0, 0)
        }
        fn now_monotonic_us(&self) -> u64 {
            0
        }
    }

    struct FakeRng;
    impl Rng for FakeRng {
        fn fill(&mut self, buf: &mut [u8]) -> Result<()> {
            buf.fill(0x11);
            Ok(())
        }
    }

    struct FakePrompt;
    impl UserPrompt for FakePrompt {
        fn choose_crash_target(&mut self) -> BootTarget {
            BootTarget::NormalBoot
        }
        fn choose_boot_target(&mut self, _reason: PromptReason) -> BootTarget {
            BootTarget::NormalBoot
        }
        fn display_low_battery(&mut self) {}
        fn display_empty_battery(&mut self) {}
        fn reboot(&mut self, _target: BootTarget) -> ! {
            loop {
                core::hint::spin_loop();
            }
        }
    }

    struct FakeResetInfo;
    impl ResetInfo for FakeResetInfo {
        fn wake_source(&self) -> WakeSource {
            WakeSource::Other
        }
        fn reset_source(&self) -> ResetSource {
            ResetSource::NotApplicable
        }
        fn reset_type(&self) -> ResetType {
            ResetType::Cold
        }
        fn reset_extra_u32(&self) -> u32 {
            0
        }
    }

    struct FakeAcpi;
    impl AcpiInstaller for FakeAcpi {
        fn install_from(&mut self, _bytes: &[u8]) -> Result<()> {
            Ok(())
        }
        fn install_from_partitions(&mut self, _labels: &[&str]) -> Result<()> {
            Ok(())
        }
    }

    struct FakeSmBios;
    impl SmBios for FakeSmBios {
        fn system_serial(&self) -> Option<String> {
            None
        }
        fn board_serial(&self) -> Option<String> {
            None
        }
        fn product_name(&self) -> Option<String> {
            None
        }
        fn bios_version(&self) -> Option<String> {
            None
        }
    }

    struct FakeConsole;
    impl ConsoleInput for FakeConsole {
        fn poll_key(&mut self, _timeout_ms: u32) -> Option<Key> {
            None
        }
    }

    struct FakeBattery;
    impl Battery for FakeBattery {
        fn below_boot_threshold(&self) -> bool {
            false
        }
        fn charger_present(&self) -> bool {
            false
        }
    }

    fn fixture_context() -> Context {
        let platform = PlatformFacade {
            block_store: Box::new(FakeBlockStore { data: vec![0u8; 4096] }),
            nv_vars: Box::new(FakeNvVars { map: BTreeMap::new() }),
            tpm: None,
            clock: Box::new(FakeClock),
            rng: Box::new(FakeRng),
            prompt: Box::new(FakePrompt),
            reset_info: Box::new(FakeResetInfo),
            acpi: Box::new(FakeAcpi),
            smbios: Box::new(FakeSmBios),
            console: Box::new(FakeConsole),
            battery: Box::new(FakeBattery),
        };
        Context::new(platform, BuildVariant::User)
    }

    #[test]
    fn lock_state_caches_after_first_read() {
        let mut ctx = fixture_context();
        ctx.init_device_state().unwrap();
        let first = ctx.lock_state();
        assert_eq!(first, LockState::Locked);
        let second = ctx.lock_state();
        assert_eq!(second, LockState::Locked);
    }

    #[test]
    fn decide_target_defaults_to_normal_boot() {
        let mut ctx = fixture_context();
        let target = ctx.decide_target("", false);
        assert_eq!(target, BootTarget::NormalBoot);
    }

    #[test]
    fn slot_manager_builds_over_owned_block_store() {
        let mut ctx = fixture_context();
        let slots = ctx.slot_manager().unwrap();
        assert_eq!(slots.slots().len(), 2);
    }

    #[test]
    fn no_tpm_falls_back_to_nv_device_state() {
        let mut ctx = fixture_context();
        assert!(ctx.platform.tpm.is_none());
        ctx.init_device_state().unwrap();
        assert_eq!(ctx.lock_state(), LockState::Locked);
    }
}
