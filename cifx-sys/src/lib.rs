// Part of cifx-rs. Copyright 2025 by the authors.
// This work is dual-licensed under Apache 2.0 and MIT terms.

//! Fixed-layout records, constants and entry point signatures of the cifX
//! device driver API (`cifXUser.h` / `cifXErrors.h`).
//!
//! The driver library is loaded at runtime, so this crate only declares the
//! signatures as function pointer types together with their symbol names.

#![allow(non_upper_case_globals)]
#![allow(non_camel_case_types)]
#![allow(non_snake_case)]

use libc::{c_char, c_void};

pub type CIFXHANDLE = *mut c_void;

pub const CIFX_MAX_INFO_NAME_LENTH: usize = 16;
pub const CIFX_MAX_FW_NAME_LENGTH: usize = 63;
pub const CIFX_DRIVER_VERSION_LENGTH: usize = 32;
pub const CIFX_ERROR_DESCRIPTION_LENGTH: usize = 1024;

#[repr(C, packed)]
#[derive(Clone, Copy)]
pub struct DRIVER_INFORMATION {
    pub abDriverVersion: [c_char; CIFX_DRIVER_VERSION_LENGTH],
    pub ulBoardCnt: u32,
}

#[repr(C, packed)]
#[derive(Clone, Copy)]
pub struct SYSTEM_INFORMATION_BLOCK {
    pub abCookie: [u8; 4],
    pub ulDpmTotalSize: u32,
    pub ulDeviceNumber: u32,
    pub ulSerialNumber: u32,
    pub ausHwOptions: [u16; 4],
    pub usManufacturer: u16,
    pub usProductionDate: u16,
    pub ulLicenseFlags1: u32,
    pub ulLicenseFlags2: u32,
    pub usNetxLicenseID: u16,
    pub usNetxLicenseFlags: u16,
    pub usDeviceClass: u16,
    pub bHwRevision: u8,
    pub bHwCompatibility: u8,
    pub bDevIdNumber: u8,
    pub bReserved: u8,
    pub usReserved: u16,
}

#[repr(C, packed)]
#[derive(Clone, Copy)]
pub struct BOARD_INFORMATION {
    pub lBoardError: i32,
    pub abBoardName: [c_char; CIFX_MAX_INFO_NAME_LENTH],
    pub abBoardAlias: [c_char; CIFX_MAX_INFO_NAME_LENTH],
    pub ulBoardID: u32,
    pub ulSystemError: u32,
    pub ulPhysicalAddress: u32,
    pub ulIrqNumber: u32,
    pub bIrqEnabled: u8,
    pub ulChannelCnt: u32,
    pub ulDpmTotalSize: u32,
    pub tSystemInfo: SYSTEM_INFORMATION_BLOCK,
}

#[repr(C, packed)]
#[derive(Clone, Copy)]
pub struct CHANNEL_INFORMATION {
    pub abBoardName: [c_char; CIFX_MAX_INFO_NAME_LENTH],
    pub abBoardAlias: [c_char; CIFX_MAX_INFO_NAME_LENTH],
    pub ulDeviceNumber: u32,
    pub ulSerialNumber: u32,

    pub usFWMajor: u16,
    pub usFWMinor: u16,
    pub usFWBuild: u16,
    pub usFWRevision: u16,
    pub bFWNameLength: u8,
    pub abFWName: [c_char; CIFX_MAX_FW_NAME_LENGTH],
    pub usFWYear: u16,
    pub bFWMonth: u8,
    pub bFWDay: u8,

    pub ulChannelError: u32,
    pub ulOpenCnt: u32,
    pub ulPutPacketCnt: u32,
    pub ulGetPacketCnt: u32,
    pub ulMailboxSize: u32,
    pub ulIOInAreaCnt: u32,
    pub ulIOOutAreaCnt: u32,
    pub ulHskSize: u32,
    pub ulNetxFlags: u32,
    pub ulHostFlags: u32,
    pub ulHostCOSFlags: u32,
    pub ulDeviceCOSFlags: u32,
}

// The records are plain old data; an all-zero pattern is a valid value.
macro_rules! zeroed_default {
    ($($t:ty),*) => {$(
        impl Default for $t {
            fn default() -> Self {
                unsafe { std::mem::zeroed() }
            }
        }
    )*}
}

zeroed_default!(DRIVER_INFORMATION, SYSTEM_INFORMATION_BLOCK, BOARD_INFORMATION, CHANNEL_INFORMATION);

// Host state commands (xChannelHostState)
pub const CIFX_HOST_STATE_NOT_READY: u32 = 0;
pub const CIFX_HOST_STATE_READY: u32 = 1;
pub const CIFX_HOST_STATE_READ: u32 = 2;

// Bus state commands (xChannelBusState)
pub const CIFX_BUS_STATE_OFF: u32 = 0;
pub const CIFX_BUS_STATE_ON: u32 = 1;
pub const CIFX_BUS_STATE_GETSTATE: u32 = 2;

// Configuration lock commands (xChannelConfigLock)
pub const CIFX_CONFIGURATION_UNLOCK: u32 = 0;
pub const CIFX_CONFIGURATION_LOCK: u32 = 1;
pub const CIFX_CONFIGURATION_GETLOCKSTATE: u32 = 2;

// Reset modes (xChannelReset)
pub const CIFX_SYSTEMSTART: u32 = 1;
pub const CIFX_CHANNELINIT: u32 = 2;
pub const CIFX_BOOTSTART: u32 = 3;

// Default timeouts in milliseconds
pub const CIFX_UPDATE_STATE_WAIT_TIMEOUT: u32 = 5000;
pub const CIFX_IO_WAIT_TIMEOUT: u32 = 10;
pub const CIFX_RESET_WAIT_TIMEOUT: u32 = 0;

pub const CIFX_NO_ERROR: u32 = 0x0000_0000;

// Generic errors
pub const CIFX_INVALID_POINTER: u32 = 0x800A_0001;
pub const CIFX_INVALID_BOARD: u32 = 0x800A_0002;
pub const CIFX_INVALID_CHANNEL: u32 = 0x800A_0003;
pub const CIFX_INVALID_HANDLE: u32 = 0x800A_0004;
pub const CIFX_INVALID_PARAMETER: u32 = 0x800A_0005;
pub const CIFX_INVALID_COMMAND: u32 = 0x800A_0006;
pub const CIFX_INVALID_BUFFERSIZE: u32 = 0x800A_0007;
pub const CIFX_INVALID_ACCESS_SIZE: u32 = 0x800A_0008;
pub const CIFX_FUNCTION_FAILED: u32 = 0x800A_0009;
pub const CIFX_FILE_OPEN_FAILED: u32 = 0x800A_000A;
pub const CIFX_FILE_SIZE_ZERO: u32 = 0x800A_000B;
pub const CIFX_FILE_LOAD_INSUFF_MEM: u32 = 0x800A_000C;
pub const CIFX_FILE_CHECKSUM_ERROR: u32 = 0x800A_000D;
pub const CIFX_FILE_READ_ERROR: u32 = 0x800A_000E;
pub const CIFX_FILE_TYPE_INVALID: u32 = 0x800A_000F;
pub const CIFX_FILE_NAME_INVALID: u32 = 0x800A_0010;
pub const CIFX_FUNCTION_NOT_AVAILABLE: u32 = 0x800A_0011;
pub const CIFX_BUFFER_TOO_SHORT: u32 = 0x800A_0012;
pub const CIFX_MEMORY_MAPPING_FAILED: u32 = 0x800A_0013;
pub const CIFX_NO_MORE_ENTRIES: u32 = 0x800A_0014;

// Driver errors
pub const CIFX_DRV_NOT_INITIALIZED: u32 = 0x800B_0001;
pub const CIFX_DRV_INIT_STATE_ERROR: u32 = 0x800B_0002;
pub const CIFX_DRV_READ_STATE_ERROR: u32 = 0x800B_0003;
pub const CIFX_DRV_CMD_ACTIVE: u32 = 0x800B_0004;
pub const CIFX_DRV_DOWNLOAD_FAILED: u32 = 0x800B_0005;
pub const CIFX_DRV_WRONG_DRIVER_VERSION: u32 = 0x800B_0006;
pub const CIFX_DRV_DRIVER_NOT_LOADED: u32 = 0x800B_0030;
pub const CIFX_DRV_INIT_ERROR: u32 = 0x800B_0031;
pub const CIFX_DRV_CHANNEL_NOT_INITIALIZED: u32 = 0x800B_0032;
pub const CIFX_DRV_IO_CONTROL_FAILED: u32 = 0x800B_0033;
pub const CIFX_DRV_NOT_OPENED: u32 = 0x800B_0034;

// Device errors
pub const CIFX_DEV_DPM_ACCESS_ERROR: u32 = 0x800C_0010;
pub const CIFX_DEV_NOT_READY: u32 = 0x800C_0011;
pub const CIFX_DEV_NOT_RUNNING: u32 = 0x800C_0012;
pub const CIFX_DEV_WATCHDOG_FAILED: u32 = 0x800C_0013;
pub const CIFX_DEV_SYSERR: u32 = 0x800C_0015;
pub const CIFX_DEV_MAILBOX_FULL: u32 = 0x800C_0016;
pub const CIFX_DEV_PUT_TIMEOUT: u32 = 0x800C_0017;
pub const CIFX_DEV_GET_TIMEOUT: u32 = 0x800C_0018;
pub const CIFX_DEV_GET_NO_PACKET: u32 = 0x800C_0019;
pub const CIFX_DEV_MAILBOX_TOO_SHORT: u32 = 0x800C_001A;
pub const CIFX_DEV_RESET_TIMEOUT: u32 = 0x800C_0020;
pub const CIFX_DEV_NO_COM_FLAG: u32 = 0x800C_0021;
pub const CIFX_DEV_EXCHANGE_FAILED: u32 = 0x800C_0022;
pub const CIFX_DEV_EXCHANGE_TIMEOUT: u32 = 0x800C_0023;
pub const CIFX_DEV_COM_MODE_UNKNOWN: u32 = 0x800C_0024;
pub const CIFX_DEV_FUNCTION_FAILED: u32 = 0x800C_0025;
pub const CIFX_DEV_DPMSIZE_MISMATCH: u32 = 0x800C_0026;
pub const CIFX_DEV_STATE_MODE_UNKNOWN: u32 = 0x800C_0027;
pub const CIFX_DEV_HW_PORT_IS_USED: u32 = 0x800C_0028;
pub const CIFX_DEV_CONFIG_LOCK_TIMEOUT: u32 = 0x800C_0029;
pub const CIFX_DEV_CONFIG_UNLOCK_TIMEOUT: u32 = 0x800C_002A;
pub const CIFX_DEV_HOST_STATE_SET_TIMEOUT: u32 = 0x800C_002B;
pub const CIFX_DEV_HOST_STATE_CLEAR_TIMEOUT: u32 = 0x800C_002C;
pub const CIFX_DEV_INITIALIZATION_TIMEOUT: u32 = 0x800C_002D;
pub const CIFX_DEV_BUS_STATE_ON_TIMEOUT: u32 = 0x800C_002E;
pub const CIFX_DEV_BUS_STATE_OFF_TIMEOUT: u32 = 0x800C_002F;

/// Entry point signatures and their exported symbol names.
///
/// `cifXDriverInit`, `cifXDriverDeinit` and `cifXGetDriverVersion` only exist
/// in the Linux user space library.
#[rustfmt::skip]
pub mod func {
    use super::*;

    pub type xDriverOpen               = unsafe extern "C" fn(phDriver: *mut CIFXHANDLE) -> i32;
    pub type xDriverClose              = unsafe extern "C" fn(hDriver: CIFXHANDLE) -> i32;
    pub type xDriverGetInformation     = unsafe extern "C" fn(hDriver: CIFXHANDLE, ulSize: u32, pvDriverInfo: *mut c_void) -> i32;
    pub type xDriverGetErrorDescription = unsafe extern "C" fn(lError: i32, szBuffer: *mut c_char, ulBufferLen: u32) -> i32;
    pub type xDriverEnumBoards         = unsafe extern "C" fn(hDriver: CIFXHANDLE, ulBoard: u32, ulSize: u32, pvBoardInfo: *mut c_void) -> i32;
    pub type xDriverEnumChannels       = unsafe extern "C" fn(hDriver: CIFXHANDLE, ulBoard: u32, ulChannel: u32, ulSize: u32, pvChannelInfo: *mut c_void) -> i32;
    pub type xChannelOpen              = unsafe extern "C" fn(hDriver: CIFXHANDLE, szBoard: *const c_char, ulChannel: u32, phChannel: *mut CIFXHANDLE) -> i32;
    pub type xChannelClose             = unsafe extern "C" fn(hChannel: CIFXHANDLE) -> i32;
    pub type xChannelIOWrite           = unsafe extern "C" fn(hChannel: CIFXHANDLE, ulAreaNumber: u32, ulOffset: u32, ulDataLen: u32, pvSendData: *const c_void, ulTimeout: u32) -> i32;
    pub type xChannelIORead            = unsafe extern "C" fn(hChannel: CIFXHANDLE, ulAreaNumber: u32, ulOffset: u32, ulDataLen: u32, pvData: *mut c_void, ulTimeout: u32) -> i32;
    pub type xChannelHostState         = unsafe extern "C" fn(hChannel: CIFXHANDLE, ulCmd: u32, pulState: *mut u32, ulTimeout: u32) -> i32;
    pub type xChannelBusState          = unsafe extern "C" fn(hChannel: CIFXHANDLE, ulCmd: u32, pulState: *mut u32, ulTimeout: u32) -> i32;
    pub type xChannelReset             = unsafe extern "C" fn(hChannel: CIFXHANDLE, ulResetMode: u32, ulTimeout: u32) -> i32;
    pub type xChannelConfigLock        = unsafe extern "C" fn(hChannel: CIFXHANDLE, ulCmd: u32, pulState: *mut u32, ulTimeout: u32) -> i32;

    pub type cifXDriverInit            = unsafe extern "C" fn(init_params: *const c_void) -> i32;
    pub type cifXDriverDeinit          = unsafe extern "C" fn();
    pub type cifXGetDriverVersion      = unsafe extern "C" fn(ulSize: u32, szVersion: *mut c_char) -> i32;

    pub const XDRIVEROPEN:               &[u8] = b"xDriverOpen\0";
    pub const XDRIVERCLOSE:              &[u8] = b"xDriverClose\0";
    pub const XDRIVERGETINFORMATION:     &[u8] = b"xDriverGetInformation\0";
    pub const XDRIVERGETERRORDESCRIPTION: &[u8] = b"xDriverGetErrorDescription\0";
    pub const XDRIVERENUMBOARDS:         &[u8] = b"xDriverEnumBoards\0";
    pub const XDRIVERENUMCHANNELS:       &[u8] = b"xDriverEnumChannels\0";
    pub const XCHANNELOPEN:              &[u8] = b"xChannelOpen\0";
    pub const XCHANNELCLOSE:             &[u8] = b"xChannelClose\0";
    pub const XCHANNELIOWRITE:           &[u8] = b"xChannelIOWrite\0";
    pub const XCHANNELIOREAD:            &[u8] = b"xChannelIORead\0";
    pub const XCHANNELHOSTSTATE:         &[u8] = b"xChannelHostState\0";
    pub const XCHANNELBUSSTATE:          &[u8] = b"xChannelBusState\0";
    pub const XCHANNELRESET:             &[u8] = b"xChannelReset\0";
    pub const XCHANNELCONFIGLOCK:        &[u8] = b"xChannelConfigLock\0";
    pub const CIFXDRIVERINIT:            &[u8] = b"cifXDriverInit\0";
    pub const CIFXDRIVERDEINIT:          &[u8] = b"cifXDriverDeinit\0";
    pub const CIFXGETDRIVERVERSION:      &[u8] = b"cifXGetDriverVersion\0";
}
