//! A/B slot manager: owns the AVB-AB-shaped metadata record embedded in
//! the `misc` partition's BCB (offset 2048, 32 bytes, big-endian; see the
//! design notes §6.1) and computes the active slot.

extern crate alloc;
use alloc::vec::Vec;

use crc::{Crc, CRC_32_ISO_HDLC};
use log::{info, warn};

use crate::error::{Error, Result};
use crate::platform::BlockStore;

/// Maximum number of slots this crate supports. The wire format's
/// slot-metadata array has room for more, but every device in scope here
/// is a 2-slot A/B device.
pub const MAX_SLOTS: usize = 2;

/// Byte offset of the AVB-AB metadata record within the `misc` partition.
pub const METADATA_OFFSET: u64 = 2048;
/// Total size of the metadata record.
pub const METADATA_SIZE: usize = 32;

const MAGIC: [u8; 4] = *b"\0AB0";
const CRC: Crc<u32> = Crc::<u32>::new(&CRC_32_ISO_HDLC);

/// One slot's bookkeeping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotRecord {
    /// Slot suffix index: `0` is `_a`, `1` is `_b`.
    pub suffix: u8,
    /// `0` disables the slot permanently. `1..=15` otherwise.
    pub priority: u8,
    /// Remaining boot attempts, `0..=7`.
    pub tries_remaining: u8,
    /// Set by the next-stage OS, never by this bootloader.
    pub successful: bool,
    /// Set when a `dm-verity` corruption was reported against this slot.
    pub verity_corrupted: bool,
}

impl SlotRecord {
    fn default_for(suffix: u8) -> Self {
        Self {
            suffix,
            priority: 7,
            tries_remaining: 7,
            successful: false,
            verity_corrupted: false,
        }
    }

    /// Whether this slot is eligible to be the active one: `priority > 0`
    /// and either already `successful` or still has tries left.
    pub fn is_bootable(&self) -> bool {
        self.priority > 0 && (self.successful || self.tries_remaining > 0)
    }

    fn pack(&self) -> u8 {
        debug_assert!(self.priority <= 0x0F);
        debug_assert!(self.tries_remaining <= 0x07);
        (self.priority & 0x0F) | ((self.tries_remaining & 0x07) << 4) | ((self.successful as u8) << 7)
    }

    fn unpack(suffix: u8, byte: u8, verity_corrupted: bool) -> Self {
        Self {
            suffix,
            priority: byte & 0x0F,
            tries_remaining: (byte >> 4) & 0x07,
            successful: byte & 0x80 != 0,
            verity_corrupted,
        }
    }

    fn suffix_str(&self) -> &'static str {
        if self.suffix == 0 { "_a" } else { "_b" }
    }
}

/// The full persisted metadata record.
#[derive(Debug, Clone)]
struct Metadata {
    slots: [SlotRecord; MAX_SLOTS],
    recovery_tries_remaining: u8,
}

impl Metadata {
    fn default_record() -> Self {
        Self {
            slots: [SlotRecord::default_for(0), SlotRecord::default_for(1)],
            recovery_tries_remaining: 7,
        }
    }

    /// Encode to the 32-byte, big-endian wire record. The two reserved
    /// bytes at offset 6 are used, by this implementation's convention,
    /// to carry `recovery_tries_remaining` (byte 0) and a per-slot
    /// verity-corrupted bitmask (byte 1) - fields the distilled wire
    /// table doesn't name a home for explicitly (see DESIGN.md).
    fn encode(&self) -> [u8; METADATA_SIZE] {
        let mut buf = [0u8; METADATA_SIZE];
        buf[0..4].copy_from_slice(&MAGIC);
        buf[4] = 1; // version_major
        buf[5] = 0; // version_minor
        buf[6] = self.recovery_tries_remaining;
        let mut verity_mask = 0u8;
        for (i, s) in self.slots.iter().enumerate() {
            if s.verity_corrupted {
                verity_mask |= 1 << i;
            }
        }
        buf[7] = verity_mask;
        buf[8..12].copy_from_slice(&(MAX_SLOTS as u32).to_be_bytes());
        for (i, s) in self.slots.iter().enumerate() {
            buf[12 + i] = s.pack();
        }
        let crc = CRC.checksum(&buf[0..28]);
        buf[28..32].copy_from_slice(&crc.to_be_bytes());
        buf
    }

    /// Decode the 32-byte wire record, validating magic and CRC.
    fn decode(buf: &[u8; METADATA_SIZE]) -> Result<Self> {
        if buf[0..4] != MAGIC {
            return Err(Error::Corrupted);
        }
        let stored_crc = u32::from_be_bytes([buf[28], buf[29], buf[30], buf[31]]);
        let computed = CRC.checksum(&buf[0..28]);
        if stored_crc != computed {
            return Err(Error::Corrupted);
        }
        let recovery_tries_remaining = buf[6];
        let verity_mask = buf[7];
        let mut slots = [SlotRecord::default_for(0), SlotRecord::default_for(1)];
        for (i, slot) in slots.iter_mut().enumerate() {
            *slot = SlotRecord::unpack(i as u8, buf[12 + i], verity_mask & (1 << i) != 0);
        }
        Ok(Self { slots, recovery_tries_remaining })
    }
}

/// A/B slot manager.
pub struct SlotManager<'a> {
    store: &'a mut dyn BlockStore,
    metadata: Metadata,
}

impl<'a> SlotManager<'a> {
    /// Load the slot-metadata record from the `misc` partition, resetting
    /// it to the well-known default (both slots priority 7, tries 7, not
    /// successful) if its magic or CRC is wrong.
    pub fn init(store: &'a mut dyn BlockStore) -> Result<Self> {
        let (misc_start, _misc_end, _block_size) = store.partition("misc")?;
        let mut raw = [0u8; METADATA_SIZE];
        let offset = misc_start + METADATA_OFFSET;
        let read_ok = store.read(offset, METADATA_SIZE, &mut raw).is_ok();

        let metadata = if read_ok {
            match Metadata::decode(&raw) {
                Ok(m) => m,
                Err(_) => {
                    warn!("slot metadata corrupted, resetting to default");
                    Metadata::default_record()
                }
            }
        } else {
            warn!("slot metadata unreadable, resetting to default");
            Metadata::default_record()
        };

        let mut mgr = Self { store, metadata };
        mgr.persist()?;
        Ok(mgr)
    }

    fn persist(&mut self) -> Result<()> {
        let (misc_start, _misc_end, _block_size) = self.store.partition("misc")?;
        let encoded = self.metadata.encode();
        self.store.write(misc_start + METADATA_OFFSET, &encoded)?;
        self.store.flush()
    }

    /// Read-only view of both slots, ordered by suffix index.
    pub fn slots(&self) -> &[SlotRecord] {
        &self.metadata.slots
    }

    /// The slot satisfying the active-slot invariant (highest priority
    /// among bootable slots, ties broken by suffix order), or `None` if
    /// every slot is exhausted.
    pub fn active_slot(&self) -> Option<u8> {
        self.metadata
            .slots
            .iter()
            .filter(|s| s.is_bootable())
            .max_by_key(|s| (s.priority, core::cmp::Reverse(s.suffix)))
            .map(|s| s.suffix)
    }

    fn slot_mut(&mut self, suffix: u8) -> Result<&mut SlotRecord> {
        self.metadata
            .slots
            .iter_mut()
            .find(|s| s.suffix == suffix)
            .ok_or(Error::NotFound)
    }

    /// Decrement `tries_remaining` (saturating at 0) if the slot is not
    /// yet `successful`, and persist.
    pub fn mark_boot_attempt(&mut self, suffix: u8) -> Result<()> {
        let slot = self.slot_mut(suffix)?;
        if !slot.successful {
            slot.tries_remaining = slot.tries_remaining.saturating_sub(1);
        }
        self.persist()
    }

    /// Disable a slot permanently after exhausting its retries:
    /// `priority = 0`, `tries_remaining = 0`.
    pub fn mark_boot_failed(&mut self, suffix: u8) -> Result<()> {
        let slot = self.slot_mut(suffix)?;
        slot.priority = 0;
        slot.tries_remaining = 0;
        info!("slot {} marked permanently unbootable", slot.suffix_str());
        self.persist()
    }

    /// Toggle the verity-corrupted flag without otherwise altering
    /// priority.
    pub fn set_verity_corrupted(&mut self, suffix: u8, corrupted: bool) -> Result<()> {
        let slot = self.slot_mut(suffix)?;
        slot.verity_corrupted = corrupted;
        self.persist()
    }

    /// Promote `suffix` to the active slot: its priority becomes the
    /// maximum, the other slot's priority becomes one less, the winner's
    /// `tries_remaining` resets to 7, and its `successful` flag clears.
    pub fn set_active(&mut self, suffix: u8) -> Result<()> {
        const MAX_PRIORITY: u8 = 15;
        for s in &mut self.metadata.slots {
            if s.suffix == suffix {
                s.priority = MAX_PRIORITY;
                s.tries_remaining = 7;
                s.successful = false;
            } else {
                s.priority = MAX_PRIORITY - 1;
            }
        }
        self.persist()
    }

    /// `recovery_tries_remaining` counter, used by the recovery-specific
    /// BCB one-shot path.
    pub fn recovery_tries_remaining(&self) -> u8 {
        self.metadata.recovery_tries_remaining
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FakeStore {
        data: Vec<u8>,
    }

    impl FakeStore {
        fn new() -> Self {
            Self { data: alloc::vec![0u8; 4096] }
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

    #[test]
    fn test_default_record_roundtrip() {
        let encoded = Metadata::default_record().encode();
        let decoded = Metadata::decode(&encoded).unwrap();
        assert_eq!(decoded.slots, Metadata::default_record().slots);
    }

    #[test]
    fn test_init_resets_corrupted_metadata() {
        let mut store = FakeStore::new();
        // leave the record all-zero: bad magic.
        {
            let mgr = SlotManager::init(&mut store).unwrap();
            assert!(mgr.active_slot().is_some());
        }
    }

    #[test]
    fn test_active_slot_tie_break_by_suffix() {
        let mut store = FakeStore::new();
        let mgr = SlotManager::init(&mut store).unwrap();
        // both slots default to priority 7, tries 7: suffix 0 (_a) wins ties.
        assert_eq!(mgr.active_slot(), Some(0));
    }

    #[test]
    fn test_failed_slot_fallback_scenario() {
        // Scenario 2 from the design notes: A priority 15 tries 0, B
        // priority 14 tries 7; A fails verification and all retries are
        // exhausted, B becomes active, A stays disabled on the next boot.
        let mut store = FakeStore::new();
        let mut mgr = SlotManager::init(&mut store).unwrap();
        mgr.set_active(0).unwrap(); // A is now priority 15, tries 7
        for _ in 0..7 {
            mgr.mark_boot_attempt(0).unwrap();
        }
        assert_eq!(mgr.slots()[0].tries_remaining, 0);
        mgr.mark_boot_failed(0).unwrap();
        assert_eq!(mgr.active_slot(), Some(1));

        drop(mgr);
        let mgr2 = SlotManager::init(&mut store).unwrap();
        assert_eq!(mgr2.slots()[0].priority, 0);
    }

    #[test]
    fn test_mark_boot_attempt_never_decrements_successful_slot() {
        let mut store = FakeStore::new();
        let mut mgr = SlotManager::init(&mut store).unwrap();
        mgr.set_active(0).unwrap();
        mgr.slot_mut(0).unwrap().successful = true;
        mgr.mark_boot_attempt(0).unwrap();
        assert_eq!(mgr.slots()[0].tries_remaining, 7);
    }
}
