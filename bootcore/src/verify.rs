//! AVB-style verification: load a boot image for a given slot, check it
//! against the embedded root key and the stored rollback indices, and
//! classify the resulting boot state.

extern crate alloc;
use alloc::string::String;
use alloc::vec::Vec;

use log::{info, warn};

use crate::bootimage::{BootImage, VendorBootImage};
use crate::devstate::DeviceStateStore;
use crate::error::{Error, Result};
use crate::platform::BlockStore;
use crate::slots::SlotManager;
use crate::target::{BootState, BootTarget, LockState};

/// Digest size used throughout AVB: SHA-256.
pub const DIGEST_SIZE: usize = 32;

/// Root public key embedded in the bootloader image, trusted without
/// further chaining.
pub trait RootKey {
    /// Verify `signature` over `message` was produced by this key.
    fn verify(&self, message: &[u8], signature: &[u8]) -> bool;
    /// SHA-256 digest of the key itself, surfaced in the vbmeta commitment.
    fn key_hash(&self) -> [u8; DIGEST_SIZE];
}

/// One partition descriptor inside a vbmeta structure: an expected hash
/// for a named partition and the rollback-index slot it is chained to.
#[derive(Debug, Clone)]
pub struct PartitionDescriptor {
    /// Partition label this descriptor covers (`"boot"`, `"vendor_boot"`, ...).
    pub label: String,
    /// Expected SHA-256 digest of the partition's verified range.
    pub expected_digest: [u8; DIGEST_SIZE],
    /// Which `rollback_indices` slot this descriptor is chained to.
    pub rollback_slot: u8,
}

/// A parsed vbmeta structure: signed metadata rooted at the embedded key.
#[derive(Debug, Clone)]
pub struct VbMeta {
    /// Raw bytes that were signed (everything but the signature field).
    pub signed_data: Vec<u8>,
    /// Signature over `signed_data`.
    pub signature: Vec<u8>,
    /// Partition descriptors this vbmeta chains to.
    pub descriptors: Vec<PartitionDescriptor>,
    /// Per-slot rollback indices this vbmeta asserts.
    pub rollback_indices: [u64; crate::devstate::MAX_ROLLBACK_SLOTS],
}

impl VbMeta {
    fn digest(&self) -> [u8; DIGEST_SIZE] {
        sha256_digest(&self.signed_data)
    }
}

/// Source of the parsed boot/vendor_boot images and their vbmeta, and of
/// digest computation over partition ranges. Splits I/O from the pure
/// verification algorithm so the latter is trivially testable.
pub trait ImageSource {
    /// Read the raw `boot`/`recovery` partition contents for `slot`.
    fn read_boot_partition(&self, target: &BootTarget, slot: u8) -> Result<Vec<u8>>;
    /// Read the raw `vendor_boot` partition contents for `slot`, if the
    /// parsed boot image's header version requires one.
    fn read_vendor_boot_partition(&self, slot: u8) -> Result<Vec<u8>>;
    /// Read and parse the vbmeta structure chained from the embedded key
    /// for `slot`.
    fn read_vbmeta(&self, slot: u8) -> Result<VbMeta>;
    /// Compute the SHA-256 digest of `partition` for `slot`, over the
    /// full partition range covered by its descriptor.
    fn digest_partition(&self, label: &str, slot: u8) -> Result<[u8; DIGEST_SIZE]>;
    /// Zeroise conventional RAM before continuing on an unlocked,
    /// unverified boot. Required by §4.4 step 5.
    fn clear_memory(&mut self);
}

pub fn sha256_digest(data: &[u8]) -> [u8; DIGEST_SIZE] {
    sha256::digest(data)
}

/// The embedded-key [`RootKey`] every production boot path uses: an
/// Ed25519 public key baked into the bootloader image, verified with
/// `ed25519-dalek`'s `u64` backend so the check runs without SIMD or an
/// OS RNG at UEFI boot-services stage.
pub struct Ed25519RootKey {
    key: ed25519_dalek::PublicKey,
}

impl Ed25519RootKey {
    /// Parse a 32-byte Ed25519 public key embedded in the loader image.
    /// Fails closed: a malformed key can never be constructed, so a
    /// caller that gets `Ok` has a key `verify` can actually use.
    pub fn from_bytes(bytes: &[u8; 32]) -> Result<Self> {
        ed25519_dalek::PublicKey::from_bytes(bytes)
            .map(|key| Self { key })
            .map_err(|_| Error::Corrupted)
    }
}

impl RootKey for Ed25519RootKey {
    fn verify(&self, message: &[u8], signature: &[u8]) -> bool {
        let Ok(sig) = ed25519_dalek::Signature::from_bytes(signature) else {
            return false;
        };
        use ed25519_dalek::Verifier as _;
        self.key.verify(message, &sig).is_ok()
    }

    fn key_hash(&self) -> [u8; DIGEST_SIZE] {
        sha256_digest(self.key.as_bytes())
    }
}

/// SHA-256 (FIPS 180-4), self-contained so this crate stays at its two
/// dependencies (`log`, `crc`) rather than pulling in a crypto crate for a
/// single digest function.
mod sha256 {
    const K: [u32; 64] = [
        0x428a2f98, 0x71374491, 0xb5c0fbcf, 0xe9b5dba5, 0x3956c25b, 0x59f111f1, 0x923f82a4, 0xab1c5ed5,
        0xd807aa98, 0x12835b01, 0x243185be, 0x550c7dc3, 0x72be5d74, 0x80deb1fe, 0x9bdc06a7, 0xc19bf174,
        0xe49b69c1, 0xefbe4786, 0x0fc19dc6, 0x240ca1cc, 0x2de92c6f, 0x4a7484aa, 0x5cb0a9dc, 0x76f988da,
        0x983e5152, 0xa831c66d, 0xb00327c8, 0xbf597fc7, 0xc6e00bf3, 0xd5a79147, 0x06ca6351, 0x14292967,
        0x27b70a85, 0x2e1b2138, 0x4d2c6dfc, 0x53380d13, 0x650a7354, 0x766a0abb, 0x81c2c92e, 0x92722c85,
        0xa2bfe8a1, 0xa81a664b, 0xc24b8b70, 0xc76c51a3, 0xd192e819, 0xd6990624, 0xf40e3585, 0x106aa070,
        0x19a4c116, 0x1e376c08, 0x2748774c, 0x34b0bcb5, 0x391c0cb3, 0x4ed8aa4a, 0x5b9cca4f, 0x682e6ff3,
        0x748f82ee, 0x78a5636f, 0x84c87814, 0x8cc70208, 0x90befffa, 0xa4506ceb, 0xbef9a3f7, 0xc67178f2,
    ];

    const INITIAL_STATE: [u32; 8] =
        [0x6a09e667, 0xbb67ae85, 0x3c6ef372, 0xa54ff53a, 0x510e527f, 0x9b05688c, 0x1f83d9ab, 0x5be0cd19];

    pub fn digest(data: &[u8]) -> [u8; 32] {
        let mut state = INITIAL_STATE;

        let bit_len = (data.len() as u64).wrapping_mul(8);
        let mut padded = alloc::vec::Vec::with_capacity(data.len() + 72);
        padded.extend_from_slice(data);
        padded.push(0x80);
        while padded.len() % 64 != 56 {
            padded.push(0);
        }
        padded.extend_from_slice(&bit_len.to_be_bytes());

        for block in padded.chunks_exact(64) {
            compress(&mut state, block);
        }

        let mut out = [0u8; 32];
        for (i, word) in state.iter().enumerate() {
            out[i * 4..i * 4 + 4].copy_from_slice(&word.to_be_bytes());
        }
        out
    }

    fn compress(state: &mut [u32; 8], block: &[u8]) {
        let mut w = [0u32; 64];
        for (i, chunk) in block.chunks_exact(4).enumerate() {
            w[i] = u32::from_be_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
        }
        for i in 16..64 {
            let s0 = w[i - 15].rotate_right(7) ^ w[i - 15].rotate_right(18) ^ (w[i - 15] >> 3);
            let s1 = w[i - 2].rotate_right(17) ^ w[i - 2].rotate_right(19) ^ (w[i - 2] >> 10);
            w[i] = w[i - 16].wrapping_add(s0).wrapping_add(w[i - 7]).wrapping_add(s1);
        }

        let [mut a, mut b, mut c, mut d, mut e, mut f, mut g, mut h] = *state;
        for i in 0..64 {
            let s1 = e.rotate_right(6) ^ e.rotate_right(11) ^ e.rotate_right(25);
            let ch = (e & f) ^ (!e & g);
            let temp1 = h.wrapping_add(s1).wrapping_add(ch).wrapping_add(K[i]).wrapping_add(w[i]);
            let s0 = a.rotate_right(2) ^ a.rotate_right(13) ^ a.rotate_right(22);
            let maj = (a & b) ^ (a & c) ^ (b & c);
            let temp2 = s0.wrapping_add(maj);

            h = g;
            g = f;
            f = e;
            e = d.wrapping_add(temp1);
            d = c;
            c = b;
            b = a;
            a = temp1.wrapping_add(temp2);
        }

        state[0] = state[0].wrapping_add(a);
        state[1] = state[1].wrapping_add(b);
        state[2] = state[2].wrapping_add(c);
        state[3] = state[3].wrapping_add(d);
        state[4] = state[4].wrapping_add(e);
        state[5] = state[5].wrapping_add(f);
        state[6] = state[6].wrapping_add(g);
        state[7] = state[7].wrapping_add(h);
    }

    #[cfg(test)]
    mod tests {
        use super::digest;

        #[test]
        fn empty_string() {
            assert_eq!(
                digest(b""),
                [
                    0xe3, 0xb0, 0xc4, 0x42, 0x98, 0xfc, 0x1c, 0x14, 0x9a, 0xfb, 0xf4, 0xc8, 0x99, 0x6f,
                    0xb9, 0x24, 0x27, 0xae, 0x41, 0xe4, 0x64, 0x9b, 0x93, 0x4c, 0xa4, 0x95, 0x99, 0x1b,
                    0x78, 0x52, 0xb8, 0x55,
                ]
            );
        }

        #[test]
        fn abc() {
            assert_eq!(
                digest(b"abc"),
                [
                    0xba, 0x78, 0x16, 0xbf, 0x8f, 0x01, 0xcf, 0xea, 0x41, 0x41, 0x40, 0xde, 0x5d, 0xae,
                    0x22, 0x23, 0xb0, 0x03, 0x61, 0xa3, 0x96, 0x17, 0x7a, 0x9c, 0xb4, 0x10, 0xff, 0x61,
                    0xf2, 0x00, 0x15, 0xad,
                ]
            );
        }
    }
}

/// Outcome of verifying one slot.
#[derive(Debug, Clone)]
pub struct VerificationResult {
    /// Strength of the chain of trust established this boot.
    pub boot_state: BootState,
    /// Digest of the verified vbmeta structure.
    pub vbmeta_digest: [u8; DIGEST_SIZE],
    /// Commitment string to append to the kernel command line.
    pub vbmeta_cmdline: String,
    /// Slot this result applies to.
    pub slot_suffix: u8,
    /// Rollback indices asserted by the verified vbmeta.
    pub rollback_indices: [u64; crate::devstate::MAX_ROLLBACK_SLOTS],
    /// The parsed boot image.
    pub boot_image: BootImage,
    /// The parsed vendor boot image, present for header_version >= 3.
    pub vendor_boot_image: Option<VendorBootImage>,
}

/// Drives the verification algorithm of §4.4, retrying across slots on
/// failure.
pub struct Verifier<'a> {
    source: &'a mut dyn ImageSource,
    key: &'a dyn RootKey,
    locked: bool,
}

impl<'a> Verifier<'a> {
    /// Construct a verifier bound to an image source and the embedded
    /// root key. `locked` reflects the device's current `LockState` as
    /// `Locked` (verify) vs not (`Unlocked`/`Provisioning`, skip
    /// signature checks but still parse).
    pub fn new(source: &'a mut dyn ImageSource, key: &'a dyn RootKey, lock_state: LockState) -> Self {
        Self { source, key, locked: matches!(lock_state, LockState::Locked) }
    }

    /// Run the full algorithm for `target`, consulting `slots` for the
    /// active slot and retrying once across a fallback slot on failure.
    /// On success, schedules (and performs) a rollback-index write only
    /// when `boot_state == Green`.
    pub fn verify_and_advance(
        &mut self,
        target: &BootTarget,
        slots: &mut SlotManager<'_>,
        devstate: &mut dyn DeviceStateStore,
    ) -> Result<VerificationResult> {
        let first_slot = slots.active_slot().ok_or(Error::NotFound)?;
        match self.attempt(target, first_slot, slots, devstate) {
            Ok(result) => Ok(result),
            Err(err) if is_retryable(&err) => {
                let tries_remaining = slots
                    .slots()
                    .iter()
                    .find(|s| s.suffix == first_slot)
                    .map(|s| s.tries_remaining)
                    .unwrap_or(0);
                if tries_remaining > 0 {
                    warn!("verification failed on slot {first_slot}, {tries_remaining} tries remaining, retrying later");
                    return Err(err);
                }
                warn!("verification failed on slot {first_slot}, tries exhausted, falling back");
                slots.mark_boot_failed(first_slot)?;
                let fallback_slot = slots.active_slot().ok_or(Error::IntegrityFailed)?;
                self.attempt(target, fallback_slot, slots, devstate)
            }
            Err(err) => Err(err),
        }
    }

    fn attempt(
        &mut self,
        target: &BootTarget,
        slot: u8,
        slots: &mut SlotManager<'_>,
        devstate: &mut dyn DeviceStateStore,
    ) -> Result<VerificationResult> {
        slots.mark_boot_attempt(slot)?;

        let raw_boot = self.source.read_boot_partition(target, slot)?;
        let boot_image = BootImage::parse(&raw_boot)?;

        let vendor_boot_image = if boot_image.header_version >= 3 {
            let raw_vendor = self.source.read_vendor_boot_partition(slot)?;
            Some(VendorBootImage::parse(&raw_vendor)?)
        } else {
            None
        };

        if !self.locked {
            self.source.clear_memory();
            let vbmeta_cmdline = build_commitment(false, BootState::Orange, &self.key.key_hash(), &[0; DIGEST_SIZE]);
            return Ok(VerificationResult {
                boot_state: BootState::Orange,
                vbmeta_digest: [0; DIGEST_SIZE],
                vbmeta_cmdline,
                slot_suffix: slot,
                rollback_indices: [0; crate::devstate::MAX_ROLLBACK_SLOTS],
                boot_image,
                vendor_boot_image,
            });
        }

        let vbmeta = self.source.read_vbmeta(slot)?;
        if !self.key.verify(&vbmeta.signed_data, &vbmeta.signature) {
            return Err(Error::IntegrityFailed);
        }

        for descriptor in &vbmeta.descriptors {
            let actual = self.source.digest_partition(&descriptor.label, slot)?;
            if actual != descriptor.expected_digest {
                return Err(Error::IntegrityFailed);
            }
        }

        let mut boot_state = BootState::Green;
        let mut pending_writes: Vec<(u8, u64)> = Vec::new();
        for slot_idx in 0..crate::devstate::MAX_ROLLBACK_SLOTS as u8 {
            let stored = devstate.read_rollback_index(slot_idx).unwrap_or(0);
            let image_idx = vbmeta.rollback_indices[slot_idx as usize];
            if stored > image_idx {
                boot_state = BootState::Red;
            } else if image_idx > stored {
                pending_writes.push((slot_idx, image_idx));
            }
        }

        if boot_state == BootState::Red {
            return Err(Error::IntegrityFailed);
        }

        for (slot_idx, value) in pending_writes {
            devstate.write_rollback_index(slot_idx, value)?;
        }

        let digest = vbmeta.digest();
        let vbmeta_cmdline = build_commitment(true, boot_state, &self.key.key_hash(), &digest);

        info!("slot {slot} verified, boot state {boot_state}");

        Ok(VerificationResult {
            boot_state,
            vbmeta_digest: digest,
            vbmeta_cmdline,
            slot_suffix: slot,
            rollback_indices: vbmeta.rollback_indices,
            boot_image,
            vendor_boot_image,
        })
    }
}

fn is_retryable(err: &Error) -> bool {
    matches!(err, Error::IntegrityFailed | Error::Corrupted | Error::NotFound | Error::OutOfBounds)
}

/// Build the vbmeta commitment string appended to the kernel command line:
/// device-locked flag, boot state, key hash, vbmeta digest. A pure
/// function so the cmdline format is independently testable.
pub fn build_commitment(locked: bool, state: BootState, key_hash: &[u8; DIGEST_SIZE], digest: &[u8; DIGEST_SIZE]) -> String {
    use core::fmt::Write;
    let mut out = String::new();
    let _ = write!(
        out,
        "androidboot.vbmeta.device_state={} androidboot.vbmeta.state={} androidboot.vbmeta.hash_alg=sha256 androidboot.vbmeta.digest=",
        if locked { "locked" } else { "unlocked" },
        state.as_cmdline_str(),
    );
    for byte in digest {
        let _ = write!(out, "{:02x}", byte);
    }
    let _ = write!(out, " androidboot.vbmeta.public_key_digest=");
    for byte in key_hash {
        let _ = write!(out, "{:02x}", byte);
    }
    out
}

/// Satisfies the [`BlockStore`] bound for adapters that only need offset
/// plumbing out of `ImageSource::read_boot_partition`; kept as a small
/// helper rather than duplicated across platform adapters.
pub fn read_partition_whole(store: &dyn BlockStore, label: &str) -> Result<Vec<u8>> {
    let (start, end, _block_size) = store.partition(label)?;
    let len = (end - start) as usize;
    let mut buf = alloc::vec![0u8; len];
    store.read(start, len, &mut buf)?;
    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::devstate::MAX_ROLLBACK_SLOTS;
    use alloc::collections::BTreeMap;
    use alloc::vec;

    struct FakeKey {
        valid: bool,
    }

    impl RootKey for FakeKey {
        fn verify(&self, _message: &[u8], _signature: &[u8]) -> bool {
            self.valid
        }
        fn key_hash(&self) -> [u8; DIGEST_SIZE] {
            [0xAB; DIGEST_SIZE]
        }
    }

    fn build_v0_image(kernel: &[u8], ramdisk: &[u8]) -> Vec<u8> {
        let page_size = 4096u32;
        let mut hdr = vec![0u8; page_size as usize];
        hdr[0..8].copy_from_slice(crate::bootimage::BOOT_MAGIC.as_slice());
        hdr[8..12].copy_from_slice(&(kernel.len() as u32).to_le_bytes());
        hdr[12..16].copy_from_slice(&0u32.to_le_bytes());
        hdr[16..20].copy_from_slice(&(ramdisk.len() as u32).to_le_bytes());
        hdr[20..24].copy_from_slice(&0u32.to_le_bytes());
        hdr[24..28].copy_from_slice(&0u32.to_le_bytes());
        hdr[28..32].copy_from_slice(&0u32.to_le_bytes());
        hdr[32..36].copy_from_slice(&0u32.to_le_bytes());
        hdr[36..40].copy_from_slice(&page_size.to_le_bytes());
        hdr[40..48].copy_from_slice(&0u64.to_le_bytes());
        let mut buf = hdr;
        buf.extend_from_slice(kernel);
        while buf.len() % page_size as usize != 0 {
            buf.push(0);
        }
        buf.extend_from_slice(ramdisk);
        while buf.len() % page_size as usize != 0 {
            buf.push(0);
        }
        buf
    }

    struct FakeSource {
        boot_images: BTreeMap<u8, Vec<u8>>,
        vbmetas: BTreeMap<u8, VbMeta>,
        digests: BTreeMap<(alloc::string::String, u8), [u8; DIGEST_SIZE]>,
        cleared: bool,
    }

    impl ImageSource for FakeSource {
        fn read_boot_partition(&self, _target: &BootTarget, slot: u8) -> Result<Vec<u8>> {
            self.boot_images.get(&slot).cloned().ok_or(Error::NotFound)
        }
        fn read_vendor_boot_partition(&self, _slot: u8) -> Result<Vec<u8>> {
            Err(Error::NotFound)
        }
        fn read_vbmeta(&self, slot: u8) -> Result<VbMeta> {
            self.vbmetas.get(&slot).cloned().ok_or(Error::NotFound)
        }
        fn digest_partition(&self, label: &str, slot: u8) -> Result<[u8; DIGEST_SIZE]> {
            self.digests.get(&(label.into(), slot)).copied().ok_or(Error::NotFound)
        }
        fn clear_memory(&mut self) {
            self.cleared = true;
        }
    }

    struct FakeStore {
        data: Vec<u8>,
    }

    impl FakeStore {
        fn new() -> Self {
            Self { data: vec![0u8; 4096] }
        }
    }

    impl BlockStore for FakeStore {
        fn read(&self, offset: u64, len: usize, buf: &mut [u8]) -> Result<()> {
            let start = offset as usize;
            buf[..len].copy_from_slice(&self.data[start..start + len]);
            Ok(())
        }
        fn write(&mut self, offset: u64, buf: &[u8]) -> Result<()> {
            let start = offset as usize;
            self.data[start..start + buf.len()].copy_from_slice(buf);
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

    struct FakeDevState {
        indices: [u64; MAX_ROLLBACK_SLOTS],
    }

    impl DeviceStateStore for FakeDevState {
        fn init(&mut self) -> Result<()> {
            Ok(())
        }
        fn read_lock_state(&mut self) -> Result<LockState> {
            Ok(LockState::Locked)
        }
        fn write_lock_state(&mut self, _state: LockState) -> Result<()> {
            Ok(())
        }
        fn read_rollback_index(&mut self, slot: u8) -> Result<u64> {
            Ok(self.indices[slot as usize])
        }
        fn write_rollback_index(&mut self, slot: u8, value: u64) -> Result<()> {
            if value < self.indices[slot as usize] {
                return Err(Error::PolicyViolation);
            }
            self.indices[slot as usize] = value;
            Ok(())
        }
        fn read_trusty_seed(&mut self) -> Result<[u8; 32]> {
            Err(Error::NotFound)
        }
        fn seal(&mut self) -> Result<()> {
            Ok(())
        }
    }

    fn descriptor_for(label: &str, digest: [u8; DIGEST_SIZE]) -> PartitionDescriptor {
        PartitionDescriptor { label: label.into(), expected_digest: digest, rollback_slot: 0 }
    }

    #[test]
    fn test_green_boot_on_matching_digests() {
        let boot_bytes = build_v0_image(b"kernel", b"ramdisk");
        let digest = sha256_digest(&boot_bytes);
        let mut vbmeta = VbMeta {
            signed_data: vec![1, 2, 3],
            signature: vec![9, 9, 9],
            descriptors: vec![descriptor_for("boot", digest)],
            rollback_indices: [0; MAX_ROLLBACK_SLOTS],
        };
        vbmeta.rollback_indices[0] = 0;

        let mut boot_images = BTreeMap::new();
        boot_images.insert(0u8, boot_bytes);
        let mut digests = BTreeMap::new();
        digests.insert(("boot".into(), 0u8), digest);
        let mut vbmetas = BTreeMap::new();
        vbmetas.insert(0u8, vbmeta);

        let mut source = FakeSource { boot_images, vbmetas, digests, cleared: false };
        let key = FakeKey { valid: true };
        let mut devstate = FakeDevState { indices: [0; MAX_ROLLBACK_SLOTS] };

        let mut store = FakeStore::new();
        let mut slots = SlotManager::init(&mut store).unwrap();
        slots.set_active(0).unwrap();

        let mut verifier = Verifier::new(&mut source, &key, LockState::Locked);
        let result = verifier.verify_and_advance(&BootTarget::NormalBoot, &mut slots, &mut devstate).unwrap();
        assert_eq!(result.boot_state, BootState::Green);
    }

    #[test]
    fn test_rollback_violation_yields_red() {
        let boot_bytes = build_v0_image(b"kernel", b"ramdisk");
        let digest = sha256_digest(&boot_bytes);
        let mut vbmeta = VbMeta {
            signed_data: vec![1, 2, 3],
            signature: vec![9, 9, 9],
            descriptors: vec![descriptor_for("boot", digest)],
            rollback_indices: [0; MAX_ROLLBACK_SLOTS],
        };
        vbmeta.rollback_indices[0] = 3;

        let mut boot_images = BTreeMap::new();
        boot_images.insert(0u8, boot_bytes);
        let mut digests = BTreeMap::new();
        digests.insert(("boot".into(), 0u8), digest);
        let mut vbmetas = BTreeMap::new();
        vbmetas.insert(0u8, vbmeta);

        let mut source = FakeSource { boot_images, vbmetas, digests, cleared: false };
        let key = FakeKey { valid: true };
        let mut devstate = FakeDevState { indices: [5, 0, 0, 0, 0, 0, 0, 0] };

        let mut store = FakeStore::new();
        let mut slots = SlotManager::init(&mut store).unwrap();
        slots.set_active(0).unwrap();
        slots.mark_boot_failed(1).unwrap();

        let mut verifier = Verifier::new(&mut source, &key, LockState::Locked);
        let result = verifier.verify_and_advance(&BootTarget::NormalBoot, &mut slots, &mut devstate);
        assert!(result.is_err());
    }

    #[test]
    fn ed25519_root_key_rejects_malformed_signature() {
        let key_bytes = [0x42u8; 32];
        // ed25519-dalek validates the point encoding, not arbitrary bytes;
        // a key built from all-0x42 bytes may or may not decode, so only
        // assert on the cases that matter for the trait's fail-closed
        // contract: a garbage signature is never accepted.
        if let Ok(key) = Ed25519RootKey::from_bytes(&key_bytes) {
            assert!(!key.verify(b"message", &[0u8; 64]));
        }
    }

    #[test]
    fn test_unlocked_device_skips_verification() {
        let boot_bytes = build_v0_image(b"kernel", b"ramdisk");
        let mut boot_images = BTreeMap::new();
        boot_images.insert(0u8, boot_bytes);
        let mut source = FakeSource { boot_images, vbmetas: BTreeMap::new(), digests: BTreeMap::new(), cleared: false };
        let key = FakeKey { valid: false };
        let mut devstate = FakeDevState { indices: [0; MAX_ROLLBACK_SLOTS] };

        let mut store = FakeStore::new();
        let mut slots = SlotManager::init(&mut store).unwrap();
        slots.set_active(0).unwrap();

        let mut verifier = Verifier::new(&mut source, &key, LockState::Unlocked);
        let result = verifier.verify_and_advance(&BootTarget::NormalBoot, &mut slots, &mut devstate).unwrap();
        assert_eq!(result.boot_state, BootState::Orange);
        drop(verifier);
        assert!(source.cleared);
    }
}
