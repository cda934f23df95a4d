//! Crate-wide error type for the verified-boot core.
//!
//! Mirrors the error taxonomy from the design notes: `NotFound`,
//! `Corrupted`, `AccessDenied`, `IntegrityFailed`, `OutOfResources`,
//! `Timeout`, and `PolicyViolation`. Component modules may define narrower
//! local error enums, but they all convert into this one at the boundary.

use core::fmt;

/// Result type for verified-boot core operations.
pub type Result<T> = core::result::Result<T, Error>;

/// Crate-wide error type.
///
/// Kinds, not names: each variant is one of the taxonomy categories from
/// the design notes, carrying just enough context to decide how the
/// caller should degrade.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// An NV record, partition, or variable is absent.
    NotFound,
    /// Magic, CRC, or size mismatch on a persisted record.
    Corrupted,
    /// TPM attribute mismatch or unauthenticated NV write.
    AccessDenied,
    /// vbmeta signature or rollback check failed.
    IntegrityFailed,
    /// Allocation or TPM command buffer exhaustion.
    OutOfResources,
    /// TPM or memory-map retries exhausted.
    Timeout,
    /// Caller attempted an operation policy forbids (e.g. rollback
    /// decrease, TPM ownership during provisioning).
    PolicyViolation,
    /// An offset computation would exceed the declared size of a buffer.
    OutOfBounds,
    /// The underlying block/NV/TPM collaborator reported a hardware or
    /// transport-level fault not covered by the categories above.
    DeviceError,
}

impl Error {
    /// Stable, upper-snake-case name for logging and diagnostics.
    pub fn name(&self) -> &'static str {
        match self {
            Self::NotFound => "NOT_FOUND",
            Self::Corrupted => "CORRUPTED",
            Self::AccessDenied => "ACCESS_DENIED",
            Self::IntegrityFailed => "INTEGRITY_FAILED",
            Self::OutOfResources => "OUT_OF_RESOURCES",
            Self::Timeout => "TIMEOUT",
            Self::PolicyViolation => "POLICY_VIOLATION",
            Self::OutOfBounds => "OUT_OF_BOUNDS",
            Self::DeviceError => "DEVICE_ERROR",
        }
    }

    /// True for errors that a policy-layer read should silently degrade
    /// on rather than propagate (see the design notes' propagation rules).
    pub fn is_recoverable_by_default(&self) -> bool {
        matches!(self, Self::NotFound | Self::Corrupted | Self::Timeout)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "bootcore error: {}", self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_names() {
        assert_eq!(Error::NotFound.name(), "NOT_FOUND");
        assert_eq!(Error::PolicyViolation.name(), "POLICY_VIOLATION");
    }

    #[test]
    fn test_recoverable_classification() {
        assert!(Error::NotFound.is_recoverable_by_default());
        assert!(Error::Corrupted.is_recoverable_by_default());
        assert!(!Error::IntegrityFailed.is_recoverable_by_default());
        assert!(!Error::AccessDenied.is_recoverable_by_default());
    }
}
