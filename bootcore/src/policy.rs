//! Boot-target decision policy.
//!
//! `BootPolicy::decide` walks the ten signal sources in a fixed order and
//! returns the first non-default result, falling back to `NormalBoot` if
//! none of them fire. No step may propagate an error upward: a failure to
//! read a signal is logged and treated as if that signal were absent, so a
//! corrupted NV variable or a wedged block device degrades boot behaviour
//! rather than bricking the device.

extern crate alloc;
use alloc::string::{String, ToString};
use alloc::vec::Vec;

use crate::config::{Config, FASTBOOT_HOLD_DELAY_MS, WATCHDOG_DELAY_SECS};
use crate::error::Result;
use crate::platform::{Battery, BlockStore, ConsoleInput, Key, NvVars, PromptReason, ResetInfo, UserPrompt};
use crate::target::BootTarget;

const COMMAND_LEN: usize = 32;
const STATUS_LEN: usize = 32;

const FASTBOOT_NS: &str = "fastboot";
const WATCHDOG_COUNTER_VAR: &str = "WatchdogCounter";
const WATCHDOG_TIME_REF_VAR: &str = "WatchdogTimeReferenceUs";

/// Outcome of a policy decision: the target to boot, plus any side effect
/// the caller must apply once the evaluation that produced it is no longer
/// borrowing the same storage the side effect needs.
///
/// `mark_active_slot_verity_corrupted` exists because `LoaderEntryOneShot ==
/// "dm-verity device corrupted"` must flag the active A/B slot, but
/// `SlotManager` and this policy's BCB/NV-variable reads both need
/// exclusive access to the same `misc` partition block store at different
/// points in one boot - they are never live at once, so the flag is handed
/// back rather than threaded through as a second live borrow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PolicyDecision {
    /// The decided boot target.
    pub target: BootTarget,
    /// Whether the caller should call
    /// `SlotManager::set_verity_corrupted(active_slot, true)` before
    /// proceeding.
    pub mark_active_slot_verity_corrupted: bool,
}

impl PolicyDecision {
    fn target(target: BootTarget) -> Self {
        Self { target, mark_active_slot_verity_corrupted: false }
    }
}

/// Flags parsed out of the image loader's own command line (distinct from
/// the `androidboot.*` cmdline `BootImageAssembler` builds for the kernel).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct CmdlineFlags {
    force_fastboot: bool,
    crash_mode: bool,
    reset_reason: Option<String>,
    fw_boot_mode: Option<u32>,
}

/// Parses the handful of tokens this policy cares about out of a raw
/// cmdline string. Unrecognised tokens are ignored, not rejected - this is
/// not a strict grammar, it is a set of optional hints.
fn parse_cmdline_flags(cmdline: &str) -> CmdlineFlags {
    let mut flags = CmdlineFlags::default();
    for token in cmdline.split_whitespace() {
        if token == "-f" || token == "fastboot" {
            flags.force_fastboot = true;
        } else if token == "boot_target=CRASHMODE" || token == "crashmode" {
            flags.crash_mode = true;
        } else if let Some(reason) = token.strip_prefix("reset=") {
            flags.reset_reason = Some(reason.to_string());
        } else if let Some(raw) = token.strip_prefix("fw.boot=") {
            let parsed = if let Some(hex) = raw.strip_prefix("0x") {
                u32::from_str_radix(hex, 16).ok()
            } else {
                raw.parse::<u32>().ok()
            };
            flags.fw_boot_mode = parsed;
        }
    }
    flags
}

/// Decodes the low 5 bits of the `fw.boot=` bitfield into a target. Values
/// outside the known set (platform-specific, undocumented upstream) return
/// `None`, leaving evaluation to fall through to the next step.
fn decode_fw_boot_mode(bits: u32) -> Option<BootTarget> {
    match bits & 0x1f {
        0 => None, // normal, no override
        1 => Some(BootTarget::Fastboot),
        2 => Some(BootTarget::Recovery),
        3 => Some(BootTarget::Charger),
        4 => Some(BootTarget::PowerOff),
        5 => Some(BootTarget::Dnx),
        _ => None,
    }
}

fn read_nul_terminated(buf: &[u8]) -> String {
    let end = buf.iter().position(|&b| b == 0).unwrap_or(buf.len());
    String::from_utf8_lossy(&buf[..end]).to_string()
}

/// Maps a BCB/`LoaderEntryOneShot` target-name token to a `BootTarget`.
/// `"fastboot"` canonicalises to `Recovery`, matching the shared
/// recovery/fastbootd image.
fn target_from_name(name: &str) -> Option<BootTarget> {
    match name {
        "recovery" => Some(BootTarget::Recovery),
        "fastboot" => Some(BootTarget::Recovery),
        "charger" => Some(BootTarget::Charger),
        "poweroff" => Some(BootTarget::PowerOff),
        "dnx" => Some(BootTarget::Dnx),
        _ => {
            if name.ends_with(".efi") {
                Some(BootTarget::EspEfiBinary { path: name.to_string() })
            } else if name.ends_with(".img") {
                Some(BootTarget::EspBootImage { path: name.to_string() })
            } else {
                None
            }
        }
    }
}

/// View over the `misc` partition's bootloader control block: a 32-byte
/// command, a 32-byte status the bootloader clears on every read, and a
/// recovery-args region this policy never needs to touch.
struct Bcb<'a> {
    store: &'a mut dyn BlockStore,
    base: u64,
}

impl<'a> Bcb<'a> {
    fn open(store: &'a mut dyn BlockStore) -> Result<Self> {
        let (base, _end, _block_size) = store.partition("misc")?;
        Ok(Self { store, base })
    }

    fn read_command(&self) -> Result<String> {
        let mut buf = [0u8; COMMAND_LEN];
        self.store.read(self.base, COMMAND_LEN, &mut buf)?;
        Ok(read_nul_terminated(&buf))
    }

    fn clear_command(&mut self) -> Result<()> {
        self.store.write(self.base, &[0u8; COMMAND_LEN])?;
        self.store.flush()
    }

    /// Status is owned entirely by the bootloader and is cleared on every
    /// read, regardless of its content.
    fn clear_status(&mut self) -> Result<()> {
        self.store.write(self.base + COMMAND_LEN as u64, &[0u8; STATUS_LEN])?;
        self.store.flush()
    }
}

/// Evaluates the boot-target policy against the platform's current state.
pub struct BootPolicy;

impl BootPolicy {
    /// Decides the boot target for this boot.
    ///
    /// `image_cmdline` is the cmdline the image loader itself was invoked
    /// with (e.g. a UEFI boot option's `LoadOptions`), not the kernel
    /// cmdline `BootImageAssembler` builds. `fastboot_sentinel_present`
    /// reports whether a `\force_fastboot` marker file exists on the ESP;
    /// filesystem access is out of this crate's scope; the caller resolves
    /// the sentinel's presence before calling in.
    #[allow(clippy::too_many_arguments)]
    pub fn decide(
        config: &Config,
        image_cmdline: &str,
        fastboot_sentinel_present: bool,
        console: &mut dyn ConsoleInput,
        reset_info: &dyn ResetInfo,
        clock: &dyn crate::platform::Clock,
        vars: &mut dyn NvVars,
        misc_store: &mut dyn BlockStore,
        battery: &dyn Battery,
        prompt: &mut dyn UserPrompt,
    ) -> PolicyDecision {
        let flags = parse_cmdline_flags(image_cmdline);

        // Step 1: command-line flags.
        if flags.force_fastboot {
            return PolicyDecision::target(BootTarget::Fastboot);
        }
        if let Some(bits) = flags.fw_boot_mode {
            if let Some(target) = decode_fw_boot_mode(bits) {
                return PolicyDecision::target(target);
            }
        }
        if flags.crash_mode {
            return PolicyDecision::target(prompt.choose_crash_target());
        }

        // Step 2: fastboot sentinel file on the ESP.
        if fastboot_sentinel_present {
            return PolicyDecision::target(BootTarget::Fastboot);
        }

        // Step 3: magic key poll.
        if matches!(console.poll_key(config.reset_wait_ms), Some(Key::Down)) {
            let held = console.poll_key(FASTBOOT_HOLD_DELAY_MS);
            let target =
                if matches!(held, Some(Key::Down)) { BootTarget::Fastboot } else { BootTarget::NormalBoot };
            return PolicyDecision::target(target);
        }

        // Step 4: watchdog reset-storm policy.
        let watchdog_reset = reset_info.reset_source().is_watchdog()
            || matches!(flags.reset_reason.as_deref(), Some("kernel_panic") | Some("watchdog"));
        if watchdog_reset && !config.disable_watchdog {
            let counter = vars.get(FASTBOOT_NS, WATCHDOG_COUNTER_VAR).ok().flatten();
            let prior_count = counter.as_deref().and_then(|b| b.first().copied()).unwrap_or(0);
            let prior_ref_us = vars
                .get(FASTBOOT_NS, WATCHDOG_TIME_REF_VAR)
                .ok()
                .flatten()
                .and_then(|b| decode_u64(&b))
                .unwrap_or(0);

            let now_us = clock.now_monotonic_us();
            let elapsed_secs = now_us.saturating_sub(prior_ref_us) / 1_000_000;
            let new_count =
                if elapsed_secs > WATCHDOG_DELAY_SECS { 1 } else { prior_count.saturating_add(1) };

            let _ = vars.set(FASTBOOT_NS, WATCHDOG_COUNTER_VAR, &[new_count], false);
            let _ =
                vars.set(FASTBOOT_NS, WATCHDOG_TIME_REF_VAR, &now_us.to_le_bytes(), false);

            if new_count > config.watchdog_counter_max {
                return PolicyDecision::target(prompt.choose_crash_target());
            }
            return PolicyDecision::target(BootTarget::NormalBoot);
        }

        // Step 5: battery-inserted wake.
        if reset_info.wake_source() == crate::platform::WakeSource::BatteryInserted
            && !config.off_mode_charge
        {
            return PolicyDecision::target(BootTarget::PowerOff);
        }

        // Step 6: bootloader control block in the `misc` partition.
        if let Ok(mut bcb) = Bcb::open(misc_store) {
            let _ = bcb.clear_status();
            if let Ok(command) = bcb.read_command() {
                if let Some(name) = command.strip_prefix("boot-") {
                    if let Some(target) = target_from_name(name) {
                        return PolicyDecision::target(target);
                    }
                } else if let Some(name) = command.strip_prefix("bootonce-") {
                    let _ = bcb.clear_command();
                    if let Some(target) = target_from_name(name) {
                        return PolicyDecision::target(target);
                    }
                } else if !command.is_empty() {
                    if let Some(target) = target_from_name(&command) {
                        return PolicyDecision::target(target);
                    }
                }
            }
        }

        // Step 7: LoaderEntryOneShot NV variable.
        if let Some(one_shot) = config.loader_entry_one_shot.as_deref() {
            let _ = vars.del("loader", "LoaderEntryOneShot");
            if one_shot == "dm-verity device corrupted" {
                return PolicyDecision {
                    target: BootTarget::NormalBoot,
                    mark_active_slot_verity_corrupted: true,
                };
            }
            if let Some(mut target) = target_from_name(one_shot) {
                if matches!(target, BootTarget::Charger) && !config.off_mode_charge {
                    target = BootTarget::PowerOff;
                }
                return PolicyDecision::target(target);
            }
        }

        // Step 8: battery below the boot threshold.
        if battery.below_boot_threshold() {
            if battery.charger_present() {
                prompt.display_low_battery();
                return PolicyDecision::target(BootTarget::Charger);
            }
            prompt.display_empty_battery();
            return PolicyDecision::target(BootTarget::PowerOff);
        }

        // Step 9: wake source is a charger, independent of battery level.
        let wake = reset_info.wake_source();
        if matches!(wake, crate::platform::WakeSource::UsbCharger | crate::platform::WakeSource::AcDcCharger)
        {
            return PolicyDecision::target(BootTarget::Charger);
        }

        // Step 10: no signal fired. Boot normally.
        PolicyDecision::target(BootTarget::NormalBoot)
    }
}

fn decode_u64(bytes: &[u8]) -> Option<u64> {
    if bytes.len() < 8 {
        return None;
    }
    let mut arr = [0u8; 8];
    arr.copy_from_slice(&bytes[..8]);
    Some(u64::from_le_bytes(arr))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BuildVariant;
    use crate::platform::{ResetSource, ResetType, WakeSource};
    use alloc::collections::BTreeMap;
    use alloc::vec;

    struct FakeConsole {
        events: Vec<Option<Key>>,
    }

    impl ConsoleInput for FakeConsole {
        fn poll_key(&mut self, _timeout_ms: u32) -> Option<Key> {
            if self.events.is_empty() {
                None
            } else {
                self.events.remove(0)
            }
        }
    }

    struct FakeReset {
        wake: WakeSource,
        reset: ResetSource,
    }

    impl ResetInfo for FakeReset {
        fn wake_source(&self) -> WakeSource {
            self.wake
        }
        fn reset_source(&self) -> ResetSource {
            self.reset
        }
        fn reset_type(&self) -> ResetType {
            ResetType::Cold
        }
        fn reset_extra_u32(&self) -> u32 {
            0
        }
    }

    struct FakeClock {
        us: u64,
    }

    impl crate::platform::Clock for FakeClock {
        fn now_wall(&self) -> (u16, u8, u8, u8, u8, u8) {
            (2026, 1, 1, 0, 0, 0)
        }
        fn now_monotonic_us(&self) -> u64 {
            self.us
        }
    }

    struct FakeVars {
        map: BTreeMap<(String, String), Vec<u8>>,
    }

    impl FakeVars {
        fn new() -> Self {
            Self { map: BTreeMap::new() }
        }
    }

    impl NvVars for FakeVars {
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

    struct FakeStore {
        misc: Vec<u8>,
    }

    impl FakeStore {
        fn new() -> Self {
            Self { misc: vec![0u8; 4096] }
        }
    }

    impl BlockStore for FakeStore {
        fn read(&self, offset: u64, len: usize, buf: &mut [u8]) -> Result<()> {
            let start = offset as usize;
            buf[..len].copy_from_slice(&self.misc[start..start + len]);
            Ok(())
        }
        fn write(&mut self, offset: u64, data: &[u8]) -> Result<()> {
            let start = offset as usize;
            self.misc[start..start + data.len()].copy_from_slice(data);
            Ok(())
        }
        fn flush(&mut self) -> Result<()> {
            Ok(())
        }
        fn partition(&self, label: &str) -> Result<(u64, u64, u32)> {
            if label == "misc" {
                Ok((0, self.misc.len() as u64, 512))
            } else {
                Err(crate::error::Error::NotFound)
            }
        }
    }

    struct FakeBattery {
        low: bool,
        charger: bool,
    }

    impl Battery for FakeBattery {
        fn below_boot_threshold(&self) -> bool {
            self.low
        }
        fn charger_present(&self) -> bool {
            self.charger
        }
    }

    struct FakePrompt {
        crash_choice: BootTarget,
    }

    impl UserPrompt for FakePrompt {
        fn choose_crash_target(&mut self) -> BootTarget {
            self.crash_choice.clone()
        }
        fn choose_boot_target(&mut self, _reason: PromptReason) -> BootTarget {
            BootTarget::NormalBoot
        }
        fn display_low_battery(&mut self) {}
        fn display_empty_battery(&mut self) {}
        fn reboot(&mut self, _target: BootTarget) -> ! {
            panic!("reboot called in test")
        }
    }

    fn no_signal_fixture() -> (FakeConsole, FakeReset, FakeClock, FakeVars, FakeStore, FakeBattery, FakePrompt)
    {
        (
            FakeConsole { events: vec![] },
            FakeReset { wake: WakeSource::Other, reset: ResetSource::NotApplicable },
            FakeClock { us: 10_000_000 },
            FakeVars::new(),
            FakeStore::new(),
            FakeBattery { low: false, charger: false },
            FakePrompt { crash_choice: BootTarget::NormalBoot },
        )
    }

    #[test]
    fn test_default_decision_is_normal_boot() {
        let config = Config::defaults(BuildVariant::User);
        let (mut console, reset, clock, mut vars, mut store, battery, mut prompt) = no_signal_fixture();
        let decision = BootPolicy::decide(
            &config, "", false, &mut console, &reset, &clock, &mut vars, &mut store, &battery, &mut prompt,
        );
        assert_eq!(decision.target, BootTarget::NormalBoot);
        assert!(!decision.mark_active_slot_verity_corrupted);
    }

    #[test]
    fn test_fastboot_sentinel_wins() {
        let config = Config::defaults(BuildVariant::User);
        let (mut console, reset, clock, mut vars, mut store, battery, mut prompt) = no_signal_fixture();
        let decision = BootPolicy::decide(
            &config, "", true, &mut console, &reset, &clock, &mut vars, &mut store, &battery, &mut prompt,
        );
        assert_eq!(decision.target, BootTarget::Fastboot);
    }

    #[test]
    fn test_magic_key_held_for_full_window_selects_fastboot() {
        let config = Config::defaults(BuildVariant::User);
        let (mut console, reset, clock, mut vars, mut store, battery, mut prompt) = no_signal_fixture();
        console.events = vec![Some(Key::Down), Some(Key::Down)];
        let decision = BootPolicy::decide(
            &config, "", false, &mut console, &reset, &clock, &mut vars, &mut store, &battery, &mut prompt,
        );
        assert_eq!(decision.target, BootTarget::Fastboot);
    }

    #[test]
    fn test_magic_key_released_early_selects_normal_boot_directly() {
        let config = Config::defaults(BuildVariant::User);
        let (mut console, reset, clock, mut vars, mut store, battery, mut prompt) = no_signal_fixture();
        console.events = vec![Some(Key::Down), None];
        let decision = BootPolicy::decide(
            &config, "", false, &mut console, &reset, &clock, &mut vars, &mut store, &battery, &mut prompt,
        );
        assert_eq!(decision.target, BootTarget::NormalBoot);
    }

    #[test]
    fn test_watchdog_storm_escalates_past_threshold() {
        let mut config = Config::defaults(BuildVariant::User);
        config.watchdog_counter_max = 1;
        let (mut console, reset, clock, mut vars, mut store, battery, mut prompt) = no_signal_fixture();
        let reset = FakeReset { wake: reset.wake, reset: ResetSource::KernelWatchdog };
        prompt.crash_choice = BootTarget::Fastboot;

        vars.map.insert(
            (FASTBOOT_NS.to_string(), WATCHDOG_COUNTER_VAR.to_string()),
            alloc::vec![1u8],
        );
        vars.map.insert(
            (FASTBOOT_NS.to_string(), WATCHDOG_TIME_REF_VAR.to_string()),
            clock.us.to_le_bytes().to_vec(),
        );

        let decision = BootPolicy::decide(
            &config, "", false, &mut console, &reset, &clock, &mut vars, &mut store, &battery, &mut prompt,
        );
        assert_eq!(decision.target, BootTarget::Fastboot);
    }

    #[test]
    fn test_watchdog_storm_resets_after_delay_window() {
        let mut config = Config::defaults(BuildVariant::User);
        config.watchdog_counter_max = 1;
        let (mut console, reset, _clock, mut vars, mut store, battery, mut prompt) = no_signal_fixture();
        let reset = FakeReset { wake: reset.wake, reset: ResetSource::KernelWatchdog };
        let clock = FakeClock { us: 900_000_000 };

        vars.map.insert(
            (FASTBOOT_NS.to_string(), WATCHDOG_COUNTER_VAR.to_string()),
            alloc::vec![5u8],
        );
        vars.map.insert((FASTBOOT_NS.to_string(), WATCHDOG_TIME_REF_VAR.to_string()), 0u64.to_le_bytes().to_vec());

        let decision = BootPolicy::decide(
            &config, "", false, &mut console, &reset, &clock, &mut vars, &mut store, &battery, &mut prompt,
        );
        assert_eq!(decision.target, BootTarget::NormalBoot);
    }

    #[test]
    fn test_bcb_persistent_command_selects_recovery() {
        let config = Config::defaults(BuildVariant::User);
        let (mut console, reset, clock, mut vars, mut store, battery, mut prompt) = no_signal_fixture();
        store.misc[0..13].copy_from_slice(b"boot-recovery");

        let decision = BootPolicy::decide(
            &config, "", false, &mut console, &reset, &clock, &mut vars, &mut store, &battery, &mut prompt,
        );
        assert_eq!(decision.target, BootTarget::Recovery);
    }

    #[test]
    fn test_bcb_one_shot_command_is_cleared_after_read() {
        let config = Config::defaults(BuildVariant::User);
        let (mut console, reset, clock, mut vars, mut store, battery, mut prompt) = no_signal_fixture();
        let cmd = b"bootonce-fastboot";
        store.misc[0..cmd.len()].copy_from_slice(cmd);

        let decision = BootPolicy::decide(
            &config, "", false, &mut console, &reset, &clock, &mut vars, &mut store, &battery, &mut prompt,
        );
        assert_eq!(decision.target, BootTarget::Recovery);
        assert!(store.misc[0..COMMAND_LEN].iter().all(|&b| b == 0));
    }

    #[test]
    fn test_loader_entry_one_shot_dm_verity_corrupted_marks_slot_and_boots_normally() {
        let mut config = Config::defaults(BuildVariant::User);
        config.loader_entry_one_shot = Some("dm-verity device corrupted".to_string());
        let (mut console, reset, clock, mut vars, mut store, battery, mut prompt) = no_signal_fixture();
        vars.map.insert(
            ("loader".to_string(), "LoaderEntryOneShot".to_string()),
            b"dm-verity device corrupted".to_vec(),
        );

        let decision = BootPolicy::decide(
            &config, "", false, &mut console, &reset, &clock, &mut vars, &mut store, &battery, &mut prompt,
        );
        assert_eq!(decision.target, BootTarget::NormalBoot);
        assert!(decision.mark_active_slot_verity_corrupted);
        assert!(vars.get("loader", "LoaderEntryOneShot").unwrap().is_none());
    }

    #[test]
    fn test_loader_entry_one_shot_selects_target_and_is_cleared() {
        let mut config = Config::defaults(BuildVariant::User);
        config.loader_entry_one_shot = Some("fastboot".to_string());
        let (mut console, reset, clock, mut vars, mut store, battery, mut prompt) = no_signal_fixture();
        vars.map.insert(("loader".to_string(), "LoaderEntryOneShot".to_string()), b"fastboot".to_vec());

        let decision = BootPolicy::decide(
            &config, "", false, &mut console, &reset, &clock, &mut vars, &mut store, &battery, &mut prompt,
        );
        assert_eq!(decision.target, BootTarget::Recovery);
        assert!(vars
            .get("loader", "LoaderEntryOneShot")
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_low_battery_without_charger_powers_off() {
        let config = Config::defaults(BuildVariant::User);
        let (mut console, reset, clock, mut vars, mut store, mut battery, mut prompt) = no_signal_fixture();
        battery.low = true;
        battery.charger = false;

        let decision = BootPolicy::decide(
            &config, "", false, &mut console, &reset, &clock, &mut vars, &mut store, &battery, &mut prompt,
        );
        assert_eq!(decision.target, BootTarget::PowerOff);
    }

    #[test]
    fn test_low_battery_with_charger_enters_charger_mode() {
        let config = Config::defaults(BuildVariant::User);
        let (mut console, reset, clock, mut vars, mut store, mut battery, mut prompt) = no_signal_fixture();
        battery.low = true;
        battery.charger = true;

        let decision = BootPolicy::decide(
            &config, "", false, &mut console, &reset, &clock, &mut vars, &mut store, &battery, &mut prompt,
        );
        assert_eq!(decision.target, BootTarget::Charger);
    }

    #[test]
    fn test_usb_charger_wake_enters_charger_mode_regardless_of_off_mode_charge() {
        let mut config = Config::defaults(BuildVariant::User);
        config.off_mode_charge = false;
        let (mut console, reset, clock, mut vars, mut store, battery, mut prompt) = no_signal_fixture();
        let reset = FakeReset { wake: WakeSource::UsbCharger, reset: reset.reset };

        let decision = BootPolicy::decide(
            &config, "", false, &mut console, &reset, &clock, &mut vars, &mut store, &battery, &mut prompt,
        );
        assert_eq!(decision.target, BootTarget::Charger);
    }

    #[test]
    fn test_cmdline_force_fastboot_flag() {
        let config = Config::defaults(BuildVariant::User);
        let (mut console, reset, clock, mut vars, mut store, battery, mut prompt) = no_signal_fixture();

        let decision = BootPolicy::decide(
            &config, "-f", false, &mut console, &reset, &clock, &mut vars, &mut store, &battery, &mut prompt,
        );
        assert_eq!(decision.target, BootTarget::Fastboot);
    }
}
