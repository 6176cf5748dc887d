// Part of cifx-rs. Copyright 2025 by the authors.
// This work is dual-licensed under Apache 2.0 and MIT terms.

use crate::{ffi, util};
use derive_new::new;
use std::{fmt, time::Duration};

pub type BoardIdx = u32;
pub type ChannelIdx = u32;

/// Driver-wide information, fetched once per session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DriverInfo {
    pub version: String,
    pub board_count: u32,
}

impl From<&ffi::DRIVER_INFORMATION> for DriverInfo {
    fn from(info: &ffi::DRIVER_INFORMATION) -> Self {
        DriverInfo {
            version: util::fixed_str(&info.abDriverVersion),
            board_count: info.ulBoardCnt,
        }
    }
}

/// Hardware identity of a board as stored in its system information block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SystemInfo {
    pub dpm_size: u32,
    pub device_number: u32,
    pub serial_number: u32,
    pub hw_options: [u16; 4],
    pub manufacturer: u16,
    pub production_date: u16,
    pub device_class: u16,
    pub hw_revision: u8,
    pub hw_compatibility: u8,
}

impl From<&ffi::SYSTEM_INFORMATION_BLOCK> for SystemInfo {
    fn from(info: &ffi::SYSTEM_INFORMATION_BLOCK) -> Self {
        SystemInfo {
            dpm_size: info.ulDpmTotalSize,
            device_number: info.ulDeviceNumber,
            serial_number: info.ulSerialNumber,
            hw_options: info.ausHwOptions,
            manufacturer: info.usManufacturer,
            production_date: info.usProductionDate,
            device_class: info.usDeviceClass,
            hw_revision: info.bHwRevision,
            hw_compatibility: info.bHwCompatibility,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardInfo {
    pub index: BoardIdx,
    /// Name as reported by the driver; may be empty.
    pub name: String,
    pub alias: String,
    pub id: u32,
    pub system_error: u32,
    pub channel_count: u32,
    pub dpm_size: u32,
    pub system: SystemInfo,
}

impl BoardInfo {
    pub(crate) fn from_raw(index: BoardIdx, info: &ffi::BOARD_INFORMATION) -> Self {
        BoardInfo {
            index,
            name: util::fixed_str(&info.abBoardName),
            alias: util::fixed_str(&info.abBoardAlias),
            id: info.ulBoardID,
            system_error: info.ulSystemError,
            channel_count: info.ulChannelCnt,
            dpm_size: info.ulDpmTotalSize,
            system: SystemInfo::from(&info.tSystemInfo),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, new)]
pub struct FirmwareVersion {
    pub major: u16,
    pub minor: u16,
    pub build: u16,
    pub revision: u16,
}

impl fmt::Display for FirmwareVersion {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}.{}.{}.{}", self.major, self.minor, self.build, self.revision)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, new)]
pub struct FirmwareDate {
    pub year: u16,
    pub month: u8,
    pub day: u8,
}

impl fmt::Display for FirmwareDate {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{:04}-{:02}-{:02}", self.year, self.month, self.day)
    }
}

/// Static identity of a channel, captured when it is enumerated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelInfo {
    pub index: ChannelIdx,
    pub board_name: String,
    pub board_alias: String,
    pub device_number: u32,
    pub serial_number: u32,
    /// Firmware name cut to the length the driver reports.
    pub firmware_name: String,
    pub firmware_version: FirmwareVersion,
    pub firmware_date: FirmwareDate,
    pub channel_error: u32,
    pub open_count: u32,
    pub mailbox_size: u32,
    pub io_in_areas: u32,
    pub io_out_areas: u32,
    pub netx_flags: u32,
    pub host_flags: u32,
}

impl ChannelInfo {
    pub(crate) fn from_raw(index: ChannelIdx, info: &ffi::CHANNEL_INFORMATION) -> Self {
        ChannelInfo {
            index,
            board_name: util::fixed_str(&info.abBoardName),
            board_alias: util::fixed_str(&info.abBoardAlias),
            device_number: info.ulDeviceNumber,
            serial_number: info.ulSerialNumber,
            firmware_name: util::fixed_str_len(&info.abFWName, info.bFWNameLength as usize),
            firmware_version: FirmwareVersion::new(
                info.usFWMajor,
                info.usFWMinor,
                info.usFWBuild,
                info.usFWRevision,
            ),
            firmware_date: FirmwareDate::new(info.usFWYear, info.bFWMonth, info.bFWDay),
            channel_error: info.ulChannelError,
            open_count: info.ulOpenCnt,
            mailbox_size: info.ulMailboxSize,
            io_in_areas: info.ulIOInAreaCnt,
            io_out_areas: info.ulIOOutAreaCnt,
            netx_flags: info.ulNetxFlags,
            host_flags: info.ulHostFlags,
        }
    }
}

/// The three channel state axes the driver tracks, polled together.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ChannelState {
    pub host_ready: bool,
    pub bus_open: bool,
    pub config_locked: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResetMode {
    /// Full restart of the device firmware.
    SystemStart,
    /// Reinitialize this channel only.
    ChannelInit,
    /// Restart into the bootloader.
    BootStart,
}

impl ResetMode {
    pub(crate) fn raw(self) -> u32 {
        match self {
            ResetMode::SystemStart => ffi::CIFX_SYSTEMSTART,
            ResetMode::ChannelInit => ffi::CIFX_CHANNELINIT,
            ResetMode::BootStart => ffi::CIFX_BOOTSTART,
        }
    }
}

/// How long blocking driver calls may wait.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeouts {
    /// Host state, bus state and configuration lock changes.
    pub state_change: Duration,
    /// Cyclic I/O when no explicit timeout is given.
    pub io: Duration,
    pub reset: Duration,
}

impl Default for Timeouts {
    fn default() -> Self {
        Timeouts {
            state_change: Duration::from_millis(ffi::CIFX_UPDATE_STATE_WAIT_TIMEOUT.into()),
            io: Duration::from_millis(ffi::CIFX_IO_WAIT_TIMEOUT.into()),
            reset: Duration::from_millis(ffi::CIFX_RESET_WAIT_TIMEOUT.into()),
        }
    }
}
