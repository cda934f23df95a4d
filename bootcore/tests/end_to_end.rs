//! End-to-end scenarios driving `Context`, `Verifier`, and `SlotManager`
//! together through fakes of every platform trait - the same
//! collaborator wiring `boot/uefi/src/bin/main.rs` drives against real
//! firmware, exercised here against in-memory fakes.

use std::collections::BTreeMap;

use helix_bootcore::assemble::{BootImageAssembler, CmdlineContext};
use helix_bootcore::bootimage::BOOT_MAGIC;
use helix_bootcore::config::{BuildVariant, Config};
use helix_bootcore::context::Context;
use helix_bootcore::devstate::{DeviceStateStore, NvDeviceState};
use helix_bootcore::error::{Error, Result};
use helix_bootcore::platform::{
    AcpiInstaller, Battery, BlockStore, Clock, ConsoleInput, Key, NvVars, PlatformFacade, PromptReason, Rng,
    ResetInfo, ResetSource, ResetType, SmBios, UserPrompt, WakeSource,
};
use helix_bootcore::policy::BootPolicy;
use helix_bootcore::slots::SlotManager;
use helix_bootcore::target::{BootState, BootTarget, LockState};
use helix_bootcore::verify::{sha256_digest, ImageSource, PartitionDescriptor, RootKey, VbMeta, Verifier, DIGEST_SIZE};

struct FakeBlockStore {
    misc: Vec<u8>,
}

impl FakeBlockStore {
    fn new() -> Self {
        Self { misc: vec![0u8; 4096] }
    }
}

impl BlockStore for FakeBlockStore {
    fn read(&self, offset: u64, len: usize, buf: &mut [u8]) -> Result<()> {
        let start = offset as usize;
        buf[..len].copy_from_slice(&self.misc[start..start + len]);
        Ok(())
    }
    fn write(&mut self, offset: u64, bytes: &[u8]) -> Result<()> {
        let start = offset as usize;
        self.misc[start..start + bytes.len()].copy_from_slice(bytes);
        Ok(())
    }
    fn flush(&mut self) -> Result<()> {
        Ok(())
    }
    fn partition(&self, label: &str) -> Result<(u64, u64, u32)> {
        if label == "misc" {
            Ok((0, self.misc.len() as u64, 512))
        } else {
            Err(Error::NotFound)
        }
    }
}

struct FakeNvVars {
    map: BTreeMap<(String, String), Vec<u8>>,
}

impl FakeNvVars {
    fn new() -> Self {
        Self { map: BTreeMap::new() }
    }
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

struct FakeClock {
    us: u64,
}

impl Clock for FakeClock {
    fn now_wall(&self) -> (u16, u8, u8, u8, u8, u8) {
        (2026, 1, 1, 0, 0, 0)
    }
    fn now_monotonic_us(&self) -> u64 {
        self.us
    }
}

struct FakeRng;
impl Rng for FakeRng {
    fn fill(&mut self, buf: &mut [u8]) -> Result<()> {
        buf.fill(0x22);
        Ok(())
    }
}

struct FakePrompt {
    crash_choice: BootTarget,
    crash_target_requests: u32,
}

impl FakePrompt {
    fn new() -> Self {
        Self { crash_choice: BootTarget::NormalBoot, crash_target_requests: 0 }
    }
}

impl UserPrompt for FakePrompt {
    fn choose_crash_target(&mut self) -> BootTarget {
        self.crash_target_requests += 1;
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

struct FakeResetInfo {
    wake: WakeSource,
    reset: ResetSource,
}

impl ResetInfo for FakeResetInfo {
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
        Some("E2ETESTSERIAL".to_string())
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

fn fixture_platform(wake: WakeSource, reset: ResetSource) -> PlatformFacade {
    PlatformFacade {
        block_store: Box::new(FakeBlockStore::new()),
        nv_vars: Box::new(FakeNvVars::new()),
        tpm: None,
        clock: Box::new(FakeClock { us: 10_000_000 }),
        rng: Box::new(FakeRng),
        prompt: Box::new(FakePrompt::new()),
        reset_info: Box::new(FakeResetInfo { wake, reset }),
        acpi: Box::new(FakeAcpi),
        smbios: Box::new(FakeSmBios),
        console: Box::new(FakeConsole),
        battery: Box::new(FakeBattery),
    }
}

struct FakeKey {
    valid: bool,
}

impl RootKey for FakeKey {
    fn verify(&self, _message: &[u8], _signature: &[u8]) -> bool {
        self.valid
    }
    fn key_hash(&self) -> [u8; DIGEST_SIZE] {
        [0x5A; DIGEST_SIZE]
    }
}

struct FakeImageSource {
    boot_images: BTreeMap<u8, Vec<u8>>,
    vbmetas: BTreeMap<u8, VbMeta>,
    digests: BTreeMap<(String, u8), [u8; DIGEST_SIZE]>,
    cleared: bool,
}

impl FakeImageSource {
    fn new() -> Self {
        Self { boot_images: BTreeMap::new(), vbmetas: BTreeMap::new(), digests: BTreeMap::new(), cleared: false }
    }
}

impl ImageSource for FakeImageSource {
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
        self.digests.get(&(label.to_string(), slot)).copied().ok_or(Error::NotFound)
    }
    fn clear_memory(&mut self) {
        self.cleared = true;
    }
}

/// A minimal v0 boot image: header page, kernel, page-aligned ramdisk.
/// No `extra_cmdline`/second-stage content needed for these scenarios.
fn build_v0_image(kernel: &[u8], ramdisk: &[u8]) -> Vec<u8> {
    let page_size = 4096usize;
    let mut hdr = vec![0u8; page_size];
    hdr[0..8].copy_from_slice(BOOT_MAGIC.as_slice());
    hdr[8..12].copy_from_slice(&(kernel.len() as u32).to_le_bytes());
    hdr[16..20].copy_from_slice(&(ramdisk.len() as u32).to_le_bytes());
    hdr[36..40].copy_from_slice(&(page_size as u32).to_le_bytes());
    // header_version stays 0 at offset 40..44.
    let mut buf = hdr;
    buf.extend_from_slice(kernel);
    while buf.len() % page_size != 0 {
        buf.push(0);
    }
    buf.extend_from_slice(ramdisk);
    while buf.len() % page_size != 0 {
        buf.push(0);
    }
    buf
}

fn descriptor_for(label: &str, digest: [u8; DIGEST_SIZE]) -> PartitionDescriptor {
    PartitionDescriptor { label: label.to_string(), expected_digest: digest, rollback_slot: 0 }
}

fn green_source_and_key(rollback_index: u64) -> (FakeImageSource, FakeKey) {
    let boot_bytes = build_v0_image(b"kernel-bytes", b"ramdisk-bytes");
    let digest = sha256_digest(&boot_bytes);
    let vbmeta = VbMeta {
        signed_data: vec![1, 2, 3],
        signature: vec![4, 5, 6],
        descriptors: vec![descriptor_for("boot", digest)],
        rollback_indices: {
            let mut idx = [0u64; helix_bootcore::devstate::MAX_ROLLBACK_SLOTS];
            idx[0] = rollback_index;
            idx
        },
    };
    let mut source = FakeImageSource::new();
    source.boot_images.insert(0, boot_bytes);
    source.digests.insert(("boot".to_string(), 0), digest);
    source.vbmetas.insert(0, vbmeta);
    (source, FakeKey { valid: true })
}

fn cmdline_context<'a>(config: &'a Config, platform: &'a PlatformFacade) -> CmdlineContext<'a> {
    CmdlineContext {
        config,
        smbios: platform.smbios.as_ref(),
        reset_info: platform.reset_info.as_ref(),
        bootloader_version: "helix-uefi-e2e-test",
        boot_devices: "unknown",
        resume_partuuid: None,
        boottime_profile: "fast",
    }
}

/// Scenario 1: cold normal boot, green state.
#[test]
fn cold_normal_boot_reaches_green_state_on_slot_a() {
    let platform = fixture_platform(WakeSource::PowerButton, ResetSource::NotApplicable);
    let mut ctx = Context::new(platform, BuildVariant::User);
    ctx.init_device_state().unwrap();

    let target = ctx.decide_target("", false);
    assert_eq!(target, BootTarget::NormalBoot);

    let mut slots = SlotManager::init(ctx.platform.block_store.as_mut()).unwrap();
    slots.set_active(0).unwrap();
    let mut devstate = NvDeviceState::new(ctx.platform.nv_vars.as_mut());

    let (mut source, key) = green_source_and_key(0);
    let mut verifier = Verifier::new(&mut source, &key, LockState::Locked);
    let result = verifier.verify_and_advance(&target, &mut slots, &mut devstate).unwrap();
    assert_eq!(result.boot_state, BootState::Green);
    assert_eq!(result.slot_suffix, 0);
    drop(slots);
    drop(devstate);

    let assembled =
        BootImageAssembler::build(&result, &cmdline_context(&ctx.config, &ctx.platform)).unwrap();
    assert!(assembled.cmdline.contains("androidboot.slot_suffix=_a"));
    assert!(assembled.cmdline.contains("androidboot.verifiedbootstate=green"));
    assert!(assembled.cmdline.contains("androidboot.bootreason=power_button_pressed"));
}

/// Scenario 2: failed slot fallback. A transient failure with tries still
/// remaining must NOT permanently disable the slot; only exhaustion does.
#[test]
fn transient_failure_with_tries_remaining_does_not_disable_slot() {
    let mut store = FakeBlockStore::new();
    let mut slots = SlotManager::init(&mut store).unwrap();
    slots.set_active(0).unwrap(); // A: priority 15, tries 7
    slots.mark_boot_attempt(0).unwrap(); // tries 6, still bootable

    let mut vars = FakeNvVars::new();
    let mut devstate = NvDeviceState::new(&mut vars);
    devstate.init().unwrap();

    // vbmeta for slot 0 doesn't match the digest the source reports, so
    // signature/digest verification fails with a retryable error.
    let mut source = FakeImageSource::new();
    source.boot_images.insert(0, build_v0_image(b"kernel", b"ramdisk"));
    source.vbmetas.insert(
        0,
        VbMeta {
            signed_data: vec![1],
            signature: vec![2],
            descriptors: vec![descriptor_for("boot", [0xFF; DIGEST_SIZE])],
            rollback_indices: [0; helix_bootcore::devstate::MAX_ROLLBACK_SLOTS],
        },
    );
    source.digests.insert(("boot".to_string(), 0), [0x00; DIGEST_SIZE]);
    let key = FakeKey { valid: true };

    let mut verifier = Verifier::new(&mut source, &key, LockState::Locked);
    let result = verifier.verify_and_advance(&BootTarget::NormalBoot, &mut slots, &mut devstate);
    assert!(result.is_err());

    // tries_remaining was 6 after this attempt's own decrement: not
    // exhausted, so the slot must stay bootable for a later retry.
    assert_eq!(slots.slots()[0].priority, 15);
    assert_eq!(slots.slots()[0].tries_remaining, 5);
    assert!(slots.slots()[0].is_bootable());
}

/// Scenario 2 (continued): once a slot's retries are exhausted, the next
/// retryable failure does disable it and falls back to the other slot,
/// and the disabled slot stays disabled on a subsequent boot.
#[test]
fn exhausted_slot_falls_back_and_stays_disabled_next_boot() {
    let mut store = FakeBlockStore::new();
    {
        let mut slots = SlotManager::init(&mut store).unwrap();
        slots.set_active(0).unwrap(); // A: priority 15, tries 7
        slots.set_active(1).unwrap(); // B: priority 15, tries 7; A now priority 14
        slots.set_active(0).unwrap(); // A: priority 15, tries 7 again; B priority 14
        for _ in 0..6 {
            slots.mark_boot_attempt(0).unwrap();
        }
        assert_eq!(slots.slots()[0].tries_remaining, 1);

        let mut vars = FakeNvVars::new();
        let mut devstate = NvDeviceState::new(&mut vars);
        devstate.init().unwrap();

        let mut source = FakeImageSource::new();
        source.boot_images.insert(0, build_v0_image(b"kernel", b"ramdisk"));
        source.boot_images.insert(1, build_v0_image(b"kernel", b"ramdisk"));
        // slot 0's digest never matches -> always fails; slot 1 verifies cleanly.
        let (good_source, key) = green_source_and_key(0);
        source.vbmetas = good_source.vbmetas.clone();
        source.vbmetas.insert(
            0,
            VbMeta {
                signed_data: vec![9],
                signature: vec![9],
                descriptors: vec![descriptor_for("boot", [0xEE; DIGEST_SIZE])],
                rollback_indices: [0; helix_bootcore::devstate::MAX_ROLLBACK_SLOTS],
            },
        );
        source.digests = good_source.digests.clone();
        source.digests.insert(("boot".to_string(), 0), [0x00; DIGEST_SIZE]);
        // slot 1 needs its own digest entry, since FakeImageSource keys by slot.
        let boot1_bytes = source.boot_images.get(&1).unwrap().clone();
        let boot1_digest = sha256_digest(&boot1_bytes);
        source.digests.insert(("boot".to_string(), 1), boot1_digest);
        source.vbmetas.insert(
            1,
            VbMeta {
                signed_data: vec![1, 2, 3],
                signature: vec![4, 5, 6],
                descriptors: vec![descriptor_for("boot", boot1_digest)],
                rollback_indices: [0; helix_bootcore::devstate::MAX_ROLLBACK_SLOTS],
            },
        );

        let mut verifier = Verifier::new(&mut source, &key, LockState::Locked);
        let result = verifier.verify_and_advance(&BootTarget::NormalBoot, &mut slots, &mut devstate).unwrap();
        assert_eq!(result.slot_suffix, 1);
        assert_eq!(slots.slots()[0].priority, 0);
        assert_eq!(slots.active_slot(), Some(1));
    }

    // Next boot: a fresh SlotManager reload over the same backing store
    // must still show A disabled.
    let slots2 = SlotManager::init(&mut store).unwrap();
    assert_eq!(slots2.slots()[0].priority, 0);
    assert_eq!(slots2.active_slot(), Some(1));
}

/// Scenario 3: rollback protection. A stored rollback index ahead of the
/// image's asserted index yields a verification failure, and on a locked
/// device with both slots exhausted the crash-event prompt is consulted.
#[test]
fn rollback_violation_on_locked_device_reaches_crash_prompt() {
    let platform = fixture_platform(WakeSource::Other, ResetSource::NotApplicable);
    let mut ctx = Context::new(platform, BuildVariant::User);
    ctx.init_device_state().unwrap();

    let mut slots = SlotManager::init(ctx.platform.block_store.as_mut()).unwrap();
    slots.set_active(0).unwrap();
    slots.mark_boot_failed(1).unwrap(); // only one slot available, as in the unit coverage

    let mut devstate = NvDeviceState::new(ctx.platform.nv_vars.as_mut());
    devstate.init().unwrap();
    // RollbackStore[0] = 5, ahead of the image's asserted index of 3.
    devstate.write_rollback_index(0, 5).unwrap();

    let (mut source, key) = green_source_and_key(3);
    let mut verifier = Verifier::new(&mut source, &key, LockState::Locked);
    let result = verifier.verify_and_advance(&BootTarget::NormalBoot, &mut slots, &mut devstate);
    assert!(result.is_err());
    drop(slots);
    drop(devstate);

    // No other slot to fall back to: the driver escalates to the
    // crash-event menu, exactly as `main.rs` does on a verification
    // failure that exhausts every slot.
    let choice = ctx.platform.prompt.choose_crash_target();
    assert_eq!(choice, BootTarget::NormalBoot); // fixture's default choice
}

/// Scenario 4: BCB one-shot recovery command is honoured once and cleared.
#[test]
fn bcb_one_shot_recovery_command_is_cleared_after_first_boot() {
    let mut platform = fixture_platform(WakeSource::Other, ResetSource::NotApplicable);
    // Seed the BCB command directly through the trait object.
    platform.block_store.write(0, b"bootonce-recovery").unwrap();

    let mut ctx = Context::new(platform, BuildVariant::User);
    ctx.init_device_state().unwrap();

    let first = ctx.decide_target("", false);
    assert_eq!(first, BootTarget::Recovery);

    let second = ctx.decide_target("", false);
    assert_eq!(second, BootTarget::NormalBoot);
}

/// Scenario 5: three consecutive watchdog resets within the storm window
/// escalate to the crash-event menu on the third boot.
#[test]
fn watchdog_storm_escalates_on_third_consecutive_reset() {
    let mut config = Config::defaults(BuildVariant::User);
    config.watchdog_counter_max = 2;

    let mut console = FakeConsole;
    let reset = FakeResetInfo { wake: WakeSource::Other, reset: ResetSource::KernelWatchdog };
    let mut vars = FakeNvVars::new();
    let mut store = FakeBlockStore::new();
    let battery = FakeBattery;
    let mut prompt = FakePrompt::new();
    prompt.crash_choice = BootTarget::CrashMode;

    let mut clock = FakeClock { us: 0 };
    for expected in [BootTarget::NormalBoot, BootTarget::NormalBoot, BootTarget::CrashMode] {
        let decision = BootPolicy::decide(
            &config, "", false, &mut console, &reset, &clock, &mut vars, &mut store, &battery, &mut prompt,
        );
        assert_eq!(decision.target, expected);
        clock.us += 5_000_000; // well within the 600s storm window
    }
    assert_eq!(prompt.crash_target_requests, 1);
}

/// Scenario 6: unlocked device skips signature verification, emits
/// `Orange`, clears memory, and the assembled cmdline reflects it.
#[test]
fn unlocked_device_emits_orange_and_clears_memory() {
    let boot_bytes = build_v0_image(b"kernel", b"ramdisk");
    let mut source = FakeImageSource::new();
    source.boot_images.insert(0, boot_bytes);
    let key = FakeKey { valid: false };

    let mut store = FakeBlockStore::new();
    let mut slots = SlotManager::init(&mut store).unwrap();
    slots.set_active(0).unwrap();
    let mut vars = FakeNvVars::new();
    let mut devstate = NvDeviceState::new(&mut vars);
    devstate.init().unwrap();

    let mut verifier = Verifier::new(&mut source, &key, LockState::Unlocked);
    let result = verifier.verify_and_advance(&BootTarget::NormalBoot, &mut slots, &mut devstate).unwrap();
    assert_eq!(result.boot_state, BootState::Orange);
    drop(verifier);
    assert!(source.cleared);

    let config = Config::defaults(BuildVariant::User);
    let platform = fixture_platform(WakeSource::Other, ResetSource::NotApplicable);
    let assembled = BootImageAssembler::build(&result, &cmdline_context(&config, &platform)).unwrap();
    assert!(assembled.cmdline.contains("androidboot.verifiedbootstate=orange"));
}
