// Part of cifx-rs. Copyright 2025 by the authors.
// This work is dual-licensed under Apache 2.0 and MIT terms.

//! Symbolic names and descriptions for driver status codes.

use crate::{binding::Binding, ffi, util};
use std::fmt;

/// Name reported for codes outside the catalog.
pub const UNKNOWN_ERROR: &str = "UnknownError";

pub const NO_ERROR_NAME: &str = "CIFX_NO_ERROR";
pub const NO_ERROR_DESCRIPTION: &str = "No error";

macro_rules! catalog {
    ($($code:ident => $text:expr,)*) => {
        /// Symbolic name of a status code, or [`UNKNOWN_ERROR`].
        pub fn error_name(code: u32) -> &'static str {
            match code {
                ffi::CIFX_NO_ERROR => NO_ERROR_NAME,
                $(ffi::$code => stringify!($code),)*
                _ => UNKNOWN_ERROR,
            }
        }

        /// Message text the driver headers document for a status code.
        pub fn error_text(code: u32) -> Option<&'static str> {
            match code {
                ffi::CIFX_NO_ERROR => Some(NO_ERROR_DESCRIPTION),
                $(ffi::$code => Some($text),)*
                _ => None,
            }
        }
    };
}

catalog! {
    CIFX_INVALID_POINTER => "Invalid pointer (NULL passed to driver)",
    CIFX_INVALID_BOARD => "No board with the given name / index available",
    CIFX_INVALID_CHANNEL => "No channel with the given index available",
    CIFX_INVALID_HANDLE => "Invalid handle passed to driver",
    CIFX_INVALID_PARAMETER => "Invalid parameter",
    CIFX_INVALID_COMMAND => "Invalid command",
    CIFX_INVALID_BUFFERSIZE => "Invalid buffer size",
    CIFX_INVALID_ACCESS_SIZE => "Invalid access size",
    CIFX_FUNCTION_FAILED => "Function failed",
    CIFX_FILE_OPEN_FAILED => "File could not be opened",
    CIFX_FILE_SIZE_ZERO => "File size is zero",
    CIFX_FILE_LOAD_INSUFF_MEM => "Insufficient memory to load file",
    CIFX_FILE_CHECKSUM_ERROR => "File checksum compare failed",
    CIFX_FILE_READ_ERROR => "Error reading from file",
    CIFX_FILE_TYPE_INVALID => "Invalid file type",
    CIFX_FILE_NAME_INVALID => "Invalid file name",
    CIFX_FUNCTION_NOT_AVAILABLE => "Driver function not available",
    CIFX_BUFFER_TOO_SHORT => "Given buffer is too short",
    CIFX_MEMORY_MAPPING_FAILED => "Failed to map the memory",
    CIFX_NO_MORE_ENTRIES => "No more entries available",
    CIFX_DRV_NOT_INITIALIZED => "Driver not initialized",
    CIFX_DRV_INIT_STATE_ERROR => "Driver init state error",
    CIFX_DRV_READ_STATE_ERROR => "Driver read state error",
    CIFX_DRV_CMD_ACTIVE => "Command is active on device",
    CIFX_DRV_DOWNLOAD_FAILED => "General error during download",
    CIFX_DRV_WRONG_DRIVER_VERSION => "Wrong driver version",
    CIFX_DRV_DRIVER_NOT_LOADED => "CIFx driver is not running",
    CIFX_DRV_INIT_ERROR => "Failed to initialize the device",
    CIFX_DRV_CHANNEL_NOT_INITIALIZED => "Channel not initialized (xOpenChannel not called)",
    CIFX_DRV_IO_CONTROL_FAILED => "IOControl call failed",
    CIFX_DRV_NOT_OPENED => "Driver was not opened",
    CIFX_DEV_DPM_ACCESS_ERROR => "Dual port memory not accessable (board not found)",
    CIFX_DEV_NOT_READY => "Device not ready (ready flag failed)",
    CIFX_DEV_NOT_RUNNING => "Device not running (running flag failed)",
    CIFX_DEV_WATCHDOG_FAILED => "Watchdog test failed",
    CIFX_DEV_SYSERR => "Error in handshake flags",
    CIFX_DEV_MAILBOX_FULL => "Send mailbox is full",
    CIFX_DEV_PUT_TIMEOUT => "Send packet timeout",
    CIFX_DEV_GET_TIMEOUT => "Receive packet timeout",
    CIFX_DEV_GET_NO_PACKET => "No packet available",
    CIFX_DEV_MAILBOX_TOO_SHORT => "Mailbox too short",
    CIFX_DEV_RESET_TIMEOUT => "Reset command timeout",
    CIFX_DEV_NO_COM_FLAG => "COM-flag not set",
    CIFX_DEV_EXCHANGE_FAILED => "I/O data exchange failed",
    CIFX_DEV_EXCHANGE_TIMEOUT => "I/O data exchange timeout",
    CIFX_DEV_COM_MODE_UNKNOWN => "Unknown I/O exchange mode",
    CIFX_DEV_FUNCTION_FAILED => "Device function failed",
    CIFX_DEV_DPMSIZE_MISMATCH => "DPM size differs from configuration",
    CIFX_DEV_STATE_MODE_UNKNOWN => "Unknown state mode",
    CIFX_DEV_HW_PORT_IS_USED => "Output port already in use",
    CIFX_DEV_CONFIG_LOCK_TIMEOUT => "Configuration locking timeout",
    CIFX_DEV_CONFIG_UNLOCK_TIMEOUT => "Configuration unlocking timeout",
    CIFX_DEV_HOST_STATE_SET_TIMEOUT => "Set HOST state timeout",
    CIFX_DEV_HOST_STATE_CLEAR_TIMEOUT => "Clear HOST state timeout",
    CIFX_DEV_INITIALIZATION_TIMEOUT => "Timeout during channel initialization",
    CIFX_DEV_BUS_STATE_ON_TIMEOUT => "Set Bus ON Timeout",
    CIFX_DEV_BUS_STATE_OFF_TIMEOUT => "Set Bus OFF Timeout",
}

/// Ask the driver for the description of `code`.
///
/// Falls back to the catalog text, then to the symbolic name, when the
/// driver cannot describe the code.
pub fn describe<B: Binding + ?Sized>(binding: &B, code: u32) -> String {
    if code == ffi::CIFX_NO_ERROR {
        return NO_ERROR_DESCRIPTION.to_owned();
    }
    let mut buf = vec![0u8; ffi::CIFX_ERROR_DESCRIPTION_LENGTH];
    let ret = binding.error_description(code as i32, &mut buf);
    let text = util::text_buffer(&buf);
    if ret as u32 == ffi::CIFX_NO_ERROR && !text.is_empty() {
        text
    } else {
        error_text(code).unwrap_or_else(|| error_name(code)).to_owned()
    }
}

/// A resolved driver status: raw code, symbolic name and description.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Status {
    pub code: u32,
    pub name: &'static str,
    pub description: String,
}

impl Status {
    pub fn ok() -> Self {
        Status {
            code: ffi::CIFX_NO_ERROR,
            name: NO_ERROR_NAME,
            description: NO_ERROR_DESCRIPTION.to_owned(),
        }
    }

    pub fn resolve<B: Binding + ?Sized>(binding: &B, code: u32) -> Self {
        Status {
            code,
            name: error_name(code),
            description: describe(binding, code),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.code == ffi::CIFX_NO_ERROR
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} (0x{:08X}): {}", self.name, self.code, self.description)
    }
}
