//! TPM 2.0 command layer and the hashing it needs.
//!
//! Chain-of-trust verification itself (signature checks, vbmeta parsing,
//! rollback comparison) lives in `helix_bootcore::verify::Verifier`; this
//! module only supplies the TPM collaborator `facade::UefiPlatform` wires
//! into it.

pub mod tpm;
pub mod hash;
