//! Boot target, lock state, and boot state - the three small enums every
//! other module in this crate communicates through.

use core::fmt;

extern crate alloc;
use alloc::string::String;

/// The decision `BootPolicy` produces: exactly one of these is emitted per
/// boot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BootTarget {
    /// Boot the active A/B slot normally.
    NormalBoot,
    /// Boot into the recovery ramdisk (also where fastbootd lives).
    Recovery,
    /// Enter fastboot service mode.
    Fastboot,
    /// Enter charger/charging-only mode.
    Charger,
    /// Power the device off.
    PowerOff,
    /// Chain-load a standalone EFI binary from the ESP.
    EspEfiBinary {
        /// Path on the EFI system partition.
        path: String,
    },
    /// Boot an Android boot image staged on the ESP.
    EspBootImage {
        /// Path on the EFI system partition.
        path: String,
    },
    /// Enter the crash-event menu.
    CrashMode,
    /// Device-internal download/flash mode (DNX).
    Dnx,
    /// Exit the UEFI shell (used by test/dev builds only).
    ExitShell,
    /// Boot directly from a staged memory image (fastboot `boot` command).
    Memory,
}

impl BootTarget {
    /// Ordinal used for the monotonicity property in the design notes:
    /// `NormalBoot < Charger < Recovery < Fastboot < CrashMode < PowerOff`.
    /// Targets outside that chain (ESP chain-loads, Dnx, ExitShell, Memory)
    /// are not part of the escalation ordering and return `None`.
    pub fn escalation_rank(&self) -> Option<u8> {
        match self {
            Self::NormalBoot => Some(0),
            Self::Charger => Some(1),
            Self::Recovery => Some(2),
            Self::Fastboot => Some(3),
            Self::CrashMode => Some(4),
            Self::PowerOff => Some(5),
            _ => None,
        }
    }
}

impl fmt::Display for BootTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NormalBoot => write!(f, "normal"),
            Self::Recovery => write!(f, "recovery"),
            Self::Fastboot => write!(f, "fastboot"),
            Self::Charger => write!(f, "charger"),
            Self::PowerOff => write!(f, "poweroff"),
            Self::EspEfiBinary { path } => write!(f, "esp-efi:{path}"),
            Self::EspBootImage { path } => write!(f, "esp-bootimage:{path}"),
            Self::CrashMode => write!(f, "crashmode"),
            Self::Dnx => write!(f, "dnx"),
            Self::ExitShell => write!(f, "exit-shell"),
            Self::Memory => write!(f, "memory"),
        }
    }
}

/// Device lock state. `Provisioning` only exists transiently, when the
/// device-state record is absent and the hardware life-cycle signal does
/// not yet say "end-user".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockState {
    /// Verification failures are fatal; only the embedded key is trusted.
    Locked,
    /// Verification is advisory; failures degrade the boot state but do
    /// not block booting.
    Unlocked,
    /// Transient: no device-state record yet and the life-cycle signal is
    /// not "end-user".
    Provisioning,
}

impl LockState {
    /// Byte encoding used in the persisted `RollbackStore.lock_state`
    /// field (§6.1 / §6.3 `OEMLock`).
    pub fn to_byte(self) -> u8 {
        match self {
            Self::Locked => 0,
            Self::Unlocked => 1,
            Self::Provisioning => 2,
        }
    }

    /// Decode from the persisted byte representation. Unknown values are
    /// treated as `Corrupted` by the caller, not silently mapped here.
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            0 => Some(Self::Locked),
            1 => Some(Self::Unlocked),
            2 => Some(Self::Provisioning),
            _ => None,
        }
    }
}

impl fmt::Display for LockState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Locked => write!(f, "locked"),
            Self::Unlocked => write!(f, "unlocked"),
            Self::Provisioning => write!(f, "provisioning"),
        }
    }
}

/// Boot state: the strength of the chain of trust established this boot.
/// Surfaced both on the splash (as a color) and in the kernel command line
/// as `androidboot.verifiedbootstate`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum BootState {
    /// Fully verified against the embedded root key.
    Green,
    /// Verified against a user-installed key.
    Yellow,
    /// Device is unlocked; verification was skipped.
    Orange,
    /// Verification failed.
    Red,
}

impl BootState {
    /// The literal string this boot state contributes to
    /// `androidboot.verifiedbootstate=<...>`.
    pub fn as_cmdline_str(&self) -> &'static str {
        match self {
            Self::Green => "green",
            Self::Yellow => "yellow",
            Self::Orange => "orange",
            Self::Red => "red",
        }
    }
}

impl fmt::Display for BootState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_cmdline_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lock_state_roundtrip() {
        for state in [LockState::Locked, LockState::Unlocked, LockState::Provisioning] {
            assert_eq!(LockState::from_byte(state.to_byte()), Some(state));
        }
        assert_eq!(LockState::from_byte(0xFF), None);
    }

    #[test]
    fn test_boot_state_cmdline_strings() {
        assert_eq!(BootState::Green.as_cmdline_str(), "green");
        assert_eq!(BootState::Red.as_cmdline_str(), "red");
    }

    #[test]
    fn test_escalation_ordering() {
        assert!(BootTarget::NormalBoot.escalation_rank() < BootTarget::Charger.escalation_rank());
        assert!(BootTarget::Charger.escalation_rank() < BootTarget::Recovery.escalation_rank());
        assert!(BootTarget::Recovery.escalation_rank() < BootTarget::Fastboot.escalation_rank());
        assert!(BootTarget::Fastboot.escalation_rank() < BootTarget::CrashMode.escalation_rank());
        assert!(BootTarget::CrashMode.escalation_rank() < BootTarget::PowerOff.escalation_rank());
    }
}
