//! Tunables loaded from the `loader` and `fastboot` NV-variable namespaces.
//!
//! Defaults match the constants named in the design notes. Userdebug-only
//! fields are gated by [`BuildVariant`] so a user build can never observe
//! them even if an attacker manages to set the backing variable.

extern crate alloc;
use alloc::string::String;

use crate::platform::NvVars;

/// Which build variant is running. Several NV variables (`DisableWatchdog`,
/// `SlotFallback`, `CmdlineReplace`/`Append`/`Prepend`) are honoured only
/// on `Userdebug`/`Eng`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildVariant {
    /// Production build. Device-state read failures assume `Locked`.
    User,
    /// Engineering build with debug affordances enabled. Device-state read
    /// failures assume `Unlocked`.
    Userdebug,
    /// Full engineering build, equivalent to `Userdebug` for this crate's
    /// purposes.
    Eng,
}

impl BuildVariant {
    /// Whether userdebug-gated NV variables and cmdline overrides apply.
    pub fn allows_debug_overrides(self) -> bool {
        matches!(self, Self::Userdebug | Self::Eng)
    }

    /// The `DeviceStateStore` read-failure fallback lock state for this
    /// variant (see design notes §4.3 failure semantics).
    pub fn read_failure_lock_state(self) -> crate::target::LockState {
        match self {
            Self::User => crate::target::LockState::Locked,
            Self::Userdebug | Self::Eng => crate::target::LockState::Unlocked,
        }
    }
}

/// Runtime configuration, loaded once at `Context` construction from NV
/// variables and never mutated except by the one-shot clearing rules
/// documented on individual fields.
#[derive(Debug, Clone)]
pub struct Config {
    /// Build variant; gates userdebug-only overrides.
    pub variant: BuildVariant,

    // ---- loader namespace ----
    /// Magic-key poll window in milliseconds. Clamped to `<= 1000`.
    pub reset_wait_ms: u32,
    /// Console/UART identifier, validated against the serial regex.
    pub serial_port: Option<String>,
    /// Userdebug-only: wholesale cmdline replacement.
    pub cmdline_replace: Option<String>,
    /// Userdebug-only: cmdline suffix.
    pub cmdline_append: Option<String>,
    /// Userdebug-only: cmdline prefix.
    pub cmdline_prepend: Option<String>,
    /// One-shot EFI variable mapping to a boot target; cleared after read.
    pub loader_entry_one_shot: Option<String>,
    /// Overrides the `bootreason` when the computed reason is
    /// `os_initiated`; ignored otherwise.
    pub loader_entry_reboot_reason: Option<String>,
    /// Whether to paint the UI splash (purely cosmetic; no effect on
    /// policy decisions).
    pub ui_display_splash: bool,

    // ---- fastboot namespace ----
    /// Off-mode-charging enabled: `Charger`/`PowerOff` collapse logic.
    pub off_mode_charge: bool,
    /// Crash-event menu enabled.
    pub crash_event_menu: bool,
    /// Watchdog reset-storm counter threshold before escalating to the
    /// crash-event menu. Default `WATCHDOG_COUNTER_MAX = 2`.
    pub watchdog_counter_max: u8,
    /// Userdebug-only: disables watchdog-storm escalation entirely.
    pub disable_watchdog: bool,
    /// Userdebug-only: allow falling back across slots even when the
    /// active slot's rollback index looks satisfiable.
    pub slot_fallback: bool,
}

/// `WATCHDOG_DELAY` from the design notes: a watchdog reset more than this
/// many seconds after the last one resets the storm counter instead of
/// incrementing it.
pub const WATCHDOG_DELAY_SECS: u64 = 600;

/// `FASTBOOT_HOLD_DELAY_MS` from the design notes: how long the magic key
/// must stay held, after being first sensed, before fastboot is selected.
pub const FASTBOOT_HOLD_DELAY_MS: u32 = 2000;

/// `MAX_DELAY_ITERATIONS` from the design notes: TPM command issue poll
/// bound.
pub const MAX_DELAY_ITERATIONS: u32 = 5000;

/// Hard ceiling on `reset_wait_ms`, regardless of what the NV variable
/// says.
pub const RESET_WAIT_MS_MAX: u32 = 1000;

/// Default magic-key poll window.
pub const RESET_WAIT_MS_DEFAULT: u32 = 200;

const LOADER_NS: &str = "loader";
const FASTBOOT_NS: &str = "fastboot";

impl Config {
    /// Build a default configuration for the given variant, with every
    /// tunable at its spec-mandated default.
    pub fn defaults(variant: BuildVariant) -> Self {
        Self {
            variant,
            reset_wait_ms: RESET_WAIT_MS_DEFAULT,
            serial_port: None,
            cmdline_replace: None,
            cmdline_append: None,
            cmdline_prepend: None,
            loader_entry_one_shot: None,
            loader_entry_reboot_reason: None,
            ui_display_splash: true,
            off_mode_charge: false,
            crash_event_menu: true,
            watchdog_counter_max: 2,
            disable_watchdog: false,
            slot_fallback: false,
        }
    }

    /// Load configuration from NV variables, falling back to defaults on
    /// any read miss. This never propagates an error - a corrupted or
    /// absent variable store degrades to the documented defaults.
    pub fn load(variant: BuildVariant, vars: &dyn NvVars) -> Self {
        let mut cfg = Self::defaults(variant);

        if let Ok(Some(bytes)) = vars.get(LOADER_NS, "MagicKeyTimeout") {
            if let Some(v) = decode_u32(&bytes) {
                cfg.reset_wait_ms = v.min(RESET_WAIT_MS_MAX);
            }
        }
        cfg.serial_port = get_string(vars, LOADER_NS, "SerialPort");
        cfg.loader_entry_one_shot = get_string(vars, LOADER_NS, "LoaderEntryOneShot");
        cfg.loader_entry_reboot_reason = get_string(vars, LOADER_NS, "LoaderEntryRebootReason");
        if let Ok(Some(bytes)) = vars.get(LOADER_NS, "UIDisplaySplash") {
            cfg.ui_display_splash = decode_bool(&bytes);
        }

        if variant.allows_debug_overrides() {
            cfg.cmdline_replace = get_string(vars, LOADER_NS, "CmdlineReplace");
            cfg.cmdline_append = get_string(vars, LOADER_NS, "CmdlineAppend");
            cfg.cmdline_prepend = get_string(vars, LOADER_NS, "CmdlinePrepend");
        }

        if let Ok(Some(bytes)) = vars.get(FASTBOOT_NS, "off-mode-charge") {
            cfg.off_mode_charge = decode_bool(&bytes);
        }
        if let Ok(Some(bytes)) = vars.get(FASTBOOT_NS, "CrashEventMenu") {
            cfg.crash_event_menu = decode_bool(&bytes);
        }
        if let Ok(Some(bytes)) = vars.get(FASTBOOT_NS, "WatchdogCounterMax") {
            if let Some(&b) = bytes.first() {
                cfg.watchdog_counter_max = b;
            }
        }
        if variant.allows_debug_overrides() {
            if let Ok(Some(bytes)) = vars.get(FASTBOOT_NS, "DisableWatchdog") {
                cfg.disable_watchdog = decode_bool(&bytes);
            }
            if let Ok(Some(bytes)) = vars.get(FASTBOOT_NS, "SlotFallback") {
                cfg.slot_fallback = decode_bool(&bytes);
            }
        }

        cfg
    }
}

fn get_string(vars: &dyn NvVars, ns: &str, name: &str) -> Option<String> {
    let bytes = vars.get(ns, name).ok().flatten()?;
    core::str::from_utf8(&bytes).ok().map(String::from)
}

fn decode_bool(bytes: &[u8]) -> bool {
    bytes.first().copied().unwrap_or(0) != 0
}

fn decode_u32(bytes: &[u8]) -> Option<u32> {
    if bytes.len() < 4 {
        return None;
    }
    Some(u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_variant_hides_debug_overrides() {
        assert!(!BuildVariant::User.allows_debug_overrides());
        assert!(BuildVariant::Userdebug.allows_debug_overrides());
        assert!(BuildVariant::Eng.allows_debug_overrides());
    }

    #[test]
    fn test_read_failure_lock_state_per_variant() {
        assert_eq!(
            BuildVariant::User.read_failure_lock_state(),
            crate::target::LockState::Locked
        );
        assert_eq!(
            BuildVariant::Userdebug.read_failure_lock_state(),
            crate::target::LockState::Unlocked
        );
    }

    #[test]
    fn test_reset_wait_clamped() {
        let cfg = Config::defaults(BuildVariant::User);
        assert!(cfg.reset_wait_ms <= RESET_WAIT_MS_MAX);
    }
}
