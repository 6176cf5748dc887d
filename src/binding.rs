// Part of cifx-rs. Copyright 2025 by the authors.
// This work is dual-licensed under Apache 2.0 and MIT terms.

//! The boundary between the safe layer and the native driver.

use crate::ffi;
use std::{ffi::CStr, ptr::NonNull, sync::atomic::AtomicBool};

/// Native status as returned by every driver entry point; zero is success.
pub type RawStatus = i32;

/// The capabilities of the driver library on the running platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    /// Linux user space library: explicit process-level init/deinit and a
    /// direct version query.
    Linux,
    /// Windows DLL: self-initializing, version only via driver information.
    Windows,
}

impl Platform {
    pub fn current() -> Self {
        if cfg!(windows) {
            Platform::Windows
        } else {
            Platform::Linux
        }
    }

    pub fn requires_init(self) -> bool {
        self == Platform::Linux
    }

    pub fn has_version_query(self) -> bool {
        self == Platform::Linux
    }
}

/// An open driver session. Owning this value means owning the native
/// resource: it is neither `Clone` nor `Copy`.
#[derive(Debug, PartialEq, Eq)]
pub struct DriverHandle(NonNull<libc::c_void>);

/// An open communication channel, owned the same way as [`DriverHandle`].
#[derive(Debug, PartialEq, Eq)]
pub struct ChannelHandle(NonNull<libc::c_void>);

macro_rules! raw_handle {
    ($t:ident) => {
        impl $t {
            /// Take ownership of a handle returned by the driver.
            /// Returns `None` for a null handle.
            ///
            /// # Safety
            ///
            /// `raw` must be a handle the driver produced that nobody else
            /// owns or will release.
            pub unsafe fn from_raw(raw: ffi::CIFXHANDLE) -> Option<Self> {
                NonNull::new(raw).map($t)
            }

            pub fn as_raw(&self) -> ffi::CIFXHANDLE {
                self.0.as_ptr()
            }
        }
    };
}

raw_handle!(DriverHandle);
raw_handle!(ChannelHandle);

/// The fixed set of driver entry points the safe layer is built on.
///
/// Methods mirror the C API one to one and report the raw status; turning
/// non-zero statuses into errors is the caller's job. Entry points that the
/// [`Platform`] does not provide are only called when the profile says so.
pub trait Binding {
    fn platform(&self) -> Platform;

    /// Activation flag of the driver behind this binding. Every binding to
    /// the same driver returns the same flag, so activation is shared by
    /// the whole process.
    fn activation(&self) -> &AtomicBool;

    fn driver_init(&self) -> RawStatus;
    fn driver_deinit(&self) -> RawStatus;
    fn driver_version(&self, buf: &mut [u8]) -> RawStatus;

    /// The handle may be present even on failure, in which case the caller
    /// still owns it.
    fn driver_open(&self) -> (RawStatus, Option<DriverHandle>);
    /// Consumes the handle whatever the outcome.
    fn driver_close(&self, driver: DriverHandle) -> RawStatus;
    fn driver_information(
        &self,
        driver: &DriverHandle,
        info: &mut ffi::DRIVER_INFORMATION,
    ) -> RawStatus;
    fn enum_board(
        &self,
        driver: &DriverHandle,
        board: u32,
        info: &mut ffi::BOARD_INFORMATION,
    ) -> RawStatus;
    fn enum_channel(
        &self,
        driver: &DriverHandle,
        board: u32,
        channel: u32,
        info: &mut ffi::CHANNEL_INFORMATION,
    ) -> RawStatus;
    fn error_description(&self, code: RawStatus, buf: &mut [u8]) -> RawStatus;

    /// Like [`Binding::driver_open`], a handle may accompany a failure.
    fn channel_open(
        &self,
        driver: &DriverHandle,
        board: &CStr,
        channel: u32,
    ) -> (RawStatus, Option<ChannelHandle>);
    /// Borrows the handle: on failure it stays with the caller.
    fn channel_close(&self, channel: &ChannelHandle) -> RawStatus;
    fn io_write(
        &self,
        channel: &ChannelHandle,
        area: u32,
        offset: u32,
        data: &[u8],
        timeout: u32,
    ) -> RawStatus;
    fn io_read(
        &self,
        channel: &ChannelHandle,
        area: u32,
        offset: u32,
        data: &mut [u8],
        timeout: u32,
    ) -> RawStatus;
    fn host_state(&self, channel: &ChannelHandle, cmd: u32, state: &mut u32, timeout: u32)
        -> RawStatus;
    fn bus_state(&self, channel: &ChannelHandle, cmd: u32, state: &mut u32, timeout: u32)
        -> RawStatus;
    fn reset(&self, channel: &ChannelHandle, mode: u32, timeout: u32) -> RawStatus;
    fn config_lock(
        &self,
        channel: &ChannelHandle,
        cmd: u32,
        state: &mut u32,
        timeout: u32,
    ) -> RawStatus;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_linux_needs_init_and_has_version_query() {
        assert!(Platform::Linux.requires_init());
        assert!(Platform::Linux.has_version_query());
        assert!(!Platform::Windows.requires_init());
        assert!(!Platform::Windows.has_version_query());
    }

    #[test]
    fn null_handles_are_rejected() {
        assert!(unsafe { DriverHandle::from_raw(std::ptr::null_mut()) }.is_none());
        let raw = 0x10 as ffi::CIFXHANDLE;
        let handle = unsafe { ChannelHandle::from_raw(raw) }.unwrap();
        assert_eq!(handle.as_raw(), raw);
    }
}
