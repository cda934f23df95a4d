//! # Helix Verified Boot Core
//!
//! The security-critical heart of the Helix verified-boot stage: boot-target
//! decision policy, AVB-style image verification, TPM/NV-backed device
//! state, A/B slot management, and Linux boot-parameter assembly.
//!
//! This crate has no firmware dependency of its own. Everything it needs
//! from the running platform - block storage, a TPM, NV variables, a
//! clock, an RNG, a console, a user-facing prompt - is expressed as a
//! trait in [`platform`]. A concrete UEFI wiring of those traits lives in
//! the sibling `boot/uefi` crate; tests in this crate use in-memory fakes
//! instead.
//!
//! ## Layout
//!
//! - [`error`] - crate-wide error type and the taxonomy from the design doc
//! - [`config`] - tunables loaded from the `loader`/`fastboot` NV namespaces
//! - [`platform`] - external collaborator traits (`BlockStore`, `Tpm`, ...)
//! - [`target`] - `BootTarget`, `LockState`, `BootState`
//! - [`bootimage`] - `BootImage`/`VendorBootImage` parsing
//! - [`slots`] - `SlotManager` and the AVB-AB metadata record
//! - [`devstate`] - `DeviceStateStore` (TPM or authenticated-NV backed)
//! - [`verify`] - `Verifier`
//! - [`assemble`] - `BootImageAssembler`
//! - [`policy`] - `BootPolicy`
//! - [`handover`] - `KernelHandover`
//! - [`context`] - `Context`, the single owner threaded through entry points

#![cfg_attr(not(test), no_std)]
#![allow(clippy::module_name_repetitions)]

extern crate alloc;

pub mod assemble;
pub mod bootimage;
pub mod config;
pub mod context;
pub mod devstate;
pub mod error;
pub mod handover;
pub mod platform;
pub mod policy;
pub mod slots;
pub mod target;
pub mod verify;

pub use error::{Error, Result};
pub use target::{BootState, BootTarget, LockState};

/// Common imports for consumers wiring up a [`context::Context`].
pub mod prelude {
    pub use crate::assemble::BootImageAssembler;
    pub use crate::config::{BuildVariant, Config};
    pub use crate::context::Context;
    pub use crate::devstate::DeviceStateStore;
    pub use crate::error::{Error, Result};
    pub use crate::handover::KernelHandover;
    pub use crate::platform::*;
    pub use crate::policy::BootPolicy;
    pub use crate::slots::SlotManager;
    pub use crate::target::{BootState, BootTarget, LockState};
    pub use crate::verify::{sha256_digest, Ed25519RootKey, ImageSource, RootKey, VerificationResult, Verifier, DIGEST_SIZE};
}
