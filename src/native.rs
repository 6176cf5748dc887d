// Part of cifx-rs. Copyright 2025 by the authors.
// This work is dual-licensed under Apache 2.0 and MIT terms.

//! [`Binding`] on top of the vendor driver library, loaded at runtime.

use crate::{
    binding::{Binding, ChannelHandle, DriverHandle, Platform, RawStatus},
    ffi::{self, func},
};
use libc::{c_char, c_void};
use libloading::Library;
use log::info;
use std::{
    convert::TryFrom,
    env,
    ffi::{CStr, OsString},
    mem, ptr,
    sync::atomic::AtomicBool,
};

/// Environment variable overriding the library location.
pub const LIBRARY_ENV: &str = "CIFX_LIBRARY";

pub fn default_library_path(platform: Platform) -> &'static str {
    match platform {
        Platform::Linux => "/usr/local/lib/libcifx.so",
        Platform::Windows => "cifX32dll.dll",
    }
}

/// `CIFX_LIBRARY` if set, the platform default otherwise.
pub fn library_path(platform: Platform) -> OsString {
    env::var_os(LIBRARY_ENV).unwrap_or_else(|| default_library_path(platform).into())
}

// The driver is activated once per process, whichever library value did it.
static ACTIVATION: AtomicBool = AtomicBool::new(false);

/// Entry points only the Linux library exports.
struct LinuxExtras {
    init: func::cifXDriverInit,
    deinit: func::cifXDriverDeinit,
    version: func::cifXGetDriverVersion,
}

struct Functions {
    driver_open: func::xDriverOpen,
    driver_close: func::xDriverClose,
    driver_information: func::xDriverGetInformation,
    error_description: func::xDriverGetErrorDescription,
    enum_boards: func::xDriverEnumBoards,
    enum_channels: func::xDriverEnumChannels,
    channel_open: func::xChannelOpen,
    channel_close: func::xChannelClose,
    io_write: func::xChannelIOWrite,
    io_read: func::xChannelIORead,
    host_state: func::xChannelHostState,
    bus_state: func::xChannelBusState,
    reset: func::xChannelReset,
    config_lock: func::xChannelConfigLock,
    linux: Option<LinuxExtras>,
}

unsafe fn symbol<T: Copy>(lib: &Library, name: &[u8]) -> Result<T, libloading::Error> {
    Ok(*lib.get::<T>(name)?)
}

/// The driver library and its resolved entry points.
pub struct NativeLibrary {
    fns: Functions,
    platform: Platform,
    // keeps the function pointers above valid
    _lib: Library,
}

impl NativeLibrary {
    /// Load the library for the running platform from [`library_path`].
    pub fn load() -> Result<Self, libloading::Error> {
        let platform = Platform::current();
        Self::open(library_path(platform), platform)
    }

    pub fn open(path: impl Into<OsString>, platform: Platform) -> Result<Self, libloading::Error> {
        let path = path.into();
        unsafe {
            let lib = Library::new(&path)?;
            let linux = if platform.requires_init() {
                Some(LinuxExtras {
                    init: symbol(&lib, func::CIFXDRIVERINIT)?,
                    deinit: symbol(&lib, func::CIFXDRIVERDEINIT)?,
                    version: symbol(&lib, func::CIFXGETDRIVERVERSION)?,
                })
            } else {
                None
            };
            let fns = Functions {
                driver_open: symbol(&lib, func::XDRIVEROPEN)?,
                driver_close: symbol(&lib, func::XDRIVERCLOSE)?,
                driver_information: symbol(&lib, func::XDRIVERGETINFORMATION)?,
                error_description: symbol(&lib, func::XDRIVERGETERRORDESCRIPTION)?,
                enum_boards: symbol(&lib, func::XDRIVERENUMBOARDS)?,
                enum_channels: symbol(&lib, func::XDRIVERENUMCHANNELS)?,
                channel_open: symbol(&lib, func::XCHANNELOPEN)?,
                channel_close: symbol(&lib, func::XCHANNELCLOSE)?,
                io_write: symbol(&lib, func::XCHANNELIOWRITE)?,
                io_read: symbol(&lib, func::XCHANNELIOREAD)?,
                host_state: symbol(&lib, func::XCHANNELHOSTSTATE)?,
                bus_state: symbol(&lib, func::XCHANNELBUSSTATE)?,
                reset: symbol(&lib, func::XCHANNELRESET)?,
                config_lock: symbol(&lib, func::XCHANNELCONFIGLOCK)?,
                linux,
            };
            info!("loaded cifX driver library {:?} ({:?})", path, platform);
            Ok(NativeLibrary {
                fns,
                platform,
                _lib: lib,
            })
        }
    }
}

// I/O lengths are bounded by `Channel` before they get here; the other
// buffers are small fixed arrays.
fn len(buf: &[u8]) -> u32 {
    u32::try_from(buf.len()).unwrap_or(u32::MAX)
}

fn size_of<T>() -> u32 {
    mem::size_of::<T>() as u32
}

const NOT_AVAILABLE: RawStatus = ffi::CIFX_FUNCTION_NOT_AVAILABLE as RawStatus;

impl Binding for NativeLibrary {
    fn platform(&self) -> Platform {
        self.platform
    }

    fn activation(&self) -> &AtomicBool {
        &ACTIVATION
    }

    fn driver_init(&self) -> RawStatus {
        match &self.fns.linux {
            // no init parameters: the library falls back to its configuration files
            Some(linux) => unsafe { (linux.init)(ptr::null()) },
            None => NOT_AVAILABLE,
        }
    }

    fn driver_deinit(&self) -> RawStatus {
        match &self.fns.linux {
            Some(linux) => {
                unsafe { (linux.deinit)() };
                ffi::CIFX_NO_ERROR as RawStatus
            }
            None => NOT_AVAILABLE,
        }
    }

    fn driver_version(&self, buf: &mut [u8]) -> RawStatus {
        match &self.fns.linux {
            Some(linux) => unsafe { (linux.version)(len(buf), buf.as_mut_ptr() as *mut c_char) },
            None => NOT_AVAILABLE,
        }
    }

    fn driver_open(&self) -> (RawStatus, Option<DriverHandle>) {
        let mut raw: ffi::CIFXHANDLE = ptr::null_mut();
        unsafe {
            let ret = (self.fns.driver_open)(&mut raw);
            (ret, DriverHandle::from_raw(raw))
        }
    }

    fn driver_close(&self, driver: DriverHandle) -> RawStatus {
        unsafe { (self.fns.driver_close)(driver.as_raw()) }
    }

    fn driver_information(
        &self,
        driver: &DriverHandle,
        info: &mut ffi::DRIVER_INFORMATION,
    ) -> RawStatus {
        unsafe {
            (self.fns.driver_information)(
                driver.as_raw(),
                size_of::<ffi::DRIVER_INFORMATION>(),
                info as *mut _ as *mut c_void,
            )
        }
    }

    fn enum_board(
        &self,
        driver: &DriverHandle,
        board: u32,
        info: &mut ffi::BOARD_INFORMATION,
    ) -> RawStatus {
        unsafe {
            (self.fns.enum_boards)(
                driver.as_raw(),
                board,
                size_of::<ffi::BOARD_INFORMATION>(),
                info as *mut _ as *mut c_void,
            )
        }
    }

    fn enum_channel(
        &self,
        driver: &DriverHandle,
        board: u32,
        channel: u32,
        info: &mut ffi::CHANNEL_INFORMATION,
    ) -> RawStatus {
        unsafe {
            (self.fns.enum_channels)(
                driver.as_raw(),
                board,
                channel,
                size_of::<ffi::CHANNEL_INFORMATION>(),
                info as *mut _ as *mut c_void,
            )
        }
    }

    fn error_description(&self, code: RawStatus, buf: &mut [u8]) -> RawStatus {
        unsafe { (self.fns.error_description)(code, buf.as_mut_ptr() as *mut c_char, len(buf)) }
    }

    fn channel_open(
        &self,
        driver: &DriverHandle,
        board: &CStr,
        channel: u32,
    ) -> (RawStatus, Option<ChannelHandle>) {
        let mut raw: ffi::CIFXHANDLE = ptr::null_mut();
        unsafe {
            let ret = (self.fns.channel_open)(driver.as_raw(), board.as_ptr(), channel, &mut raw);
            (ret, ChannelHandle::from_raw(raw))
        }
    }

    fn channel_close(&self, channel: &ChannelHandle) -> RawStatus {
        unsafe { (self.fns.channel_close)(channel.as_raw()) }
    }

    fn io_write(
        &self,
        channel: &ChannelHandle,
        area: u32,
        offset: u32,
        data: &[u8],
        timeout: u32,
    ) -> RawStatus {
        unsafe {
            (self.fns.io_write)(
                channel.as_raw(),
                area,
                offset,
                len(data),
                data.as_ptr() as *const c_void,
                timeout,
            )
        }
    }

    fn io_read(
        &self,
        channel: &ChannelHandle,
        area: u32,
        offset: u32,
        data: &mut [u8],
        timeout: u32,
    ) -> RawStatus {
        unsafe {
            (self.fns.io_read)(
                channel.as_raw(),
                area,
                offset,
                len(data),
                data.as_mut_ptr() as *mut c_void,
                timeout,
            )
        }
    }

    fn host_state(&self, channel: &ChannelHandle, cmd: u32, state: &mut u32, timeout: u32)
        -> RawStatus {
        unsafe { (self.fns.host_state)(channel.as_raw(), cmd, state, timeout) }
    }

    fn bus_state(&self, channel: &ChannelHandle, cmd: u32, state: &mut u32, timeout: u32)
        -> RawStatus {
        unsafe { (self.fns.bus_state)(channel.as_raw(), cmd, state, timeout) }
    }

    fn reset(&self, channel: &ChannelHandle, mode: u32, timeout: u32) -> RawStatus {
        unsafe { (self.fns.reset)(channel.as_raw(), mode, timeout) }
    }

    fn config_lock(
        &self,
        channel: &ChannelHandle,
        cmd: u32,
        state: &mut u32,
        timeout: u32,
    ) -> RawStatus {
        unsafe { (self.fns.config_lock)(channel.as_raw(), cmd, state, timeout) }
    }
}
