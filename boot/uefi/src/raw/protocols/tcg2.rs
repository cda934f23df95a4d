//! TCG2 (TPM 2.0) Protocol
//!
//! Raw binding for `EFI_TCG2_PROTOCOL`. The command submission path
//! (`submit_command`) is the only operation the security layer actually
//! drives; `get_capability` is used once at startup to size PCR banks.

use crate::raw::types::*;
use core::fmt;

/// `EFI_TCG2_BOOT_SERVICE_CAPABILITY` (the fixed-size prefix; the variable
/// trailing `TPMS_PCR_SELECTION` list is read separately by callers that
/// need it).
#[derive(Debug, Clone, Copy, Default)]
#[repr(C)]
pub struct EfiTcg2BootServiceCapability {
    pub size: u8,
    pub structure_version_major: u8,
    pub structure_version_minor: u8,
    pub protocol_version_major: u8,
    pub protocol_version_minor: u8,
    pub hash_algorithm_bitmap: u32,
    pub supported_event_logs: u32,
    pub tpm_present_flag: u8,
    pub max_command_size: u16,
    pub max_response_size: u16,
    pub manufacturer_id: u32,
    pub number_of_pcr_banks: u32,
    pub active_pcr_banks: u32,
}

/// `EFI_TCG2_PROTOCOL`. Field order and signatures match the TCG EFI
/// Protocol Specification for TPM Family 2.0, section 6.
#[repr(C)]
pub struct EfiTcg2Protocol {
    pub get_capability: unsafe extern "efiapi" fn(
        this: *mut Self,
        protocol_capability: *mut EfiTcg2BootServiceCapability,
    ) -> Status,

    pub get_event_log: unsafe extern "efiapi" fn(
        this: *mut Self,
        event_log_format: u32,
        event_log_location: *mut PhysicalAddress,
        event_log_last_entry: *mut PhysicalAddress,
        event_log_truncated: *mut u8,
    ) -> Status,

    pub hash_log_extend_event: unsafe extern "efiapi" fn(
        this: *mut Self,
        flags: u64,
        data_to_hash: PhysicalAddress,
        data_to_hash_len: u64,
        event: *const core::ffi::c_void,
    ) -> Status,

    /// Send a raw TPM2 command block and receive the raw response block.
    /// `output_parameter_block_size` is in/out: callers pass the buffer
    /// capacity and read back the actual response length.
    pub submit_command: unsafe extern "efiapi" fn(
        this: *mut Self,
        input_parameter_block_size: u32,
        input_parameter_block: *const u8,
        output_parameter_block_size: u32,
        output_parameter_block: *mut u8,
    ) -> Status,

    pub get_active_pcr_banks: unsafe extern "efiapi" fn(
        this: *mut Self,
        active_pcr_banks: *mut u32,
    ) -> Status,

    pub set_active_pcr_banks: unsafe extern "efiapi" fn(
        this: *mut Self,
        active_pcr_banks: u32,
    ) -> Status,

    pub get_result_of_set_active_pcr_banks: unsafe extern "efiapi" fn(
        this: *mut Self,
        operation_present: *mut u32,
        response: *mut u32,
    ) -> Status,
}

impl EfiTcg2Protocol {
    pub const GUID: Guid = guids::TCG2_PROTOCOL;

    /// # Safety
    /// The protocol pointer must be valid.
    pub unsafe fn capability(&self) -> Result<EfiTcg2BootServiceCapability, Status> {
        let mut cap = EfiTcg2BootServiceCapability {
            size: core::mem::size_of::<EfiTcg2BootServiceCapability>() as u8,
            ..Default::default()
        };
        let status = (self.get_capability)(self as *const _ as *mut _, &mut cap);
        status.to_status_result_with(cap)
    }

    /// Submit a raw TPM2 command and copy the response into `response_buf`,
    /// returning the number of response bytes written.
    ///
    /// # Safety
    /// The protocol pointer must be valid and `command` must be a
    /// well-formed TPM2 command block.
    pub unsafe fn submit(&self, command: &[u8], response_buf: &mut [u8]) -> Result<usize, Status> {
        let mut out_size = response_buf.len() as u32;
        let status = (self.submit_command)(
            self as *const _ as *mut _,
            command.len() as u32,
            command.as_ptr(),
            out_size,
            response_buf.as_mut_ptr(),
        );
        if status != Status::SUCCESS {
            return Err(status);
        }
        if (out_size as usize) > response_buf.len() {
            out_size = response_buf.len() as u32;
        }
        Ok(out_size as usize)
    }
}

impl fmt::Debug for EfiTcg2Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EfiTcg2Protocol").finish()
    }
}
