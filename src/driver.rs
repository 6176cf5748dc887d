// Part of cifx-rs. Copyright 2025 by the authors.
// This work is dual-licensed under Apache 2.0 and MIT terms.

use crate::{
    binding::{Binding, DriverHandle, Platform},
    board::Board,
    error::{Error, ErrorKind, Result},
    ffi,
    native::{self, NativeLibrary},
    types::*,
    util,
};
use log::{debug, info, warn};
use once_cell::unsync::OnceCell;
use std::{
    ffi::OsString,
    iter::FusedIterator,
    sync::atomic::Ordering,
    time::Duration,
};

/// Configures and loads a [`Cifx`].
#[derive(Debug, Default)]
pub struct CifxBuilder {
    library: Option<OsString>,
    timeouts: Timeouts,
}

impl CifxBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Driver library to load instead of [`native::library_path`].
    pub fn library(mut self, path: impl Into<OsString>) -> Self {
        self.library = Some(path.into());
        self
    }

    pub fn state_timeout(mut self, timeout: Duration) -> Self {
        self.timeouts.state_change = timeout;
        self
    }

    pub fn io_timeout(mut self, timeout: Duration) -> Self {
        self.timeouts.io = timeout;
        self
    }

    pub fn reset_timeout(mut self, timeout: Duration) -> Self {
        self.timeouts.reset = timeout;
        self
    }

    pub fn load(self) -> Result<Cifx<NativeLibrary>> {
        let platform = Platform::current();
        let path = self
            .library
            .clone()
            .unwrap_or_else(|| native::library_path(platform));
        let lib = NativeLibrary::open(path, platform)?;
        Ok(self.with_binding(lib))
    }

    pub fn with_binding<B: Binding>(self, binding: B) -> Cifx<B> {
        Cifx {
            binding,
            timeouts: self.timeouts,
            initialized: false,
        }
    }
}

/// The loaded driver library together with its activation state.
pub struct Cifx<B: Binding = NativeLibrary> {
    binding: B,
    timeouts: Timeouts,
    // whether this value holds the process-wide activation
    initialized: bool,
}

impl Cifx<NativeLibrary> {
    /// Load the driver library with default settings.
    pub fn load() -> Result<Self> {
        CifxBuilder::new().load()
    }
}

impl<B: Binding> Cifx<B> {
    pub fn with_binding(binding: B) -> Self {
        CifxBuilder::new().with_binding(binding)
    }

    /// Activate the driver for the whole process. Calling this twice
    /// without [`Cifx::deinit`] in between is an error, also when the two
    /// calls go through different `Cifx` values.
    ///
    /// Only the value that activated the driver can open sessions and
    /// deinitialize it.
    pub fn init(&mut self) -> Result<()> {
        let activation = self.binding.activation();
        if self.initialized
            || activation
                .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
                .is_err()
        {
            return Err(Error::usage(
                ErrorKind::AlreadyInitialized,
                "CifX is already initialized.",
            ));
        }
        if self.platform().requires_init() {
            if let Err(e) = native!(
                &self.binding,
                ErrorKind::InitializationFailed,
                "CifX initialization failed",
                self.binding.driver_init()
            ) {
                activation.store(false, Ordering::Release);
                return Err(e);
            }
        }
        self.initialized = true;
        debug!("cifX driver initialized");
        Ok(())
    }

    /// Deactivate the driver. On failure the driver stays active and this
    /// value keeps the activation.
    pub fn deinit(&mut self) -> Result<()> {
        if !self.initialized {
            return Err(Error::usage(ErrorKind::NotInitialized, "CifX not initialized."));
        }
        if self.platform().requires_init() {
            native!(
                &self.binding,
                ErrorKind::DeinitializationFailed,
                "CifX deinitialization failed",
                self.binding.driver_deinit()
            )?;
        }
        self.initialized = false;
        self.binding.activation().store(false, Ordering::Release);
        debug!("cifX driver deinitialized");
        Ok(())
    }

    /// Whether this value holds the activation.
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub fn platform(&self) -> Platform {
        self.binding.platform()
    }

    pub fn timeouts(&self) -> Timeouts {
        self.timeouts
    }

    pub fn binding(&self) -> &B {
        &self.binding
    }

    pub fn open_driver(&self) -> Result<Driver<'_, B>> {
        if !self.initialized {
            return Err(Error::usage(
                ErrorKind::NotInitialized,
                "CifX not initialized. Call Cifx::init() first.",
            ));
        }
        let (ret, handle) = self.binding.driver_open();
        if let Err(e) = native!(
            &self.binding,
            ErrorKind::DriverOpenFailed,
            "CifX driver open failed",
            ret
        ) {
            if let Some(partial) = handle {
                let ret = self.binding.driver_close(partial);
                if ret != 0 {
                    warn!("could not release partially opened driver: 0x{:08X}", ret as u32);
                }
            }
            return Err(e);
        }
        let handle = handle.ok_or_else(|| {
            Error::native(
                &self.binding,
                ErrorKind::DriverOpenFailed,
                "CifX driver open failed",
                ffi::CIFX_INVALID_HANDLE as i32,
            )
        })?;
        info!("cifX driver opened");
        Ok(Driver {
            cifx: self,
            handle: Some(handle),
            info: OnceCell::new(),
        })
    }
}

impl<B: Binding> Drop for Cifx<B> {
    fn drop(&mut self) {
        if self.initialized {
            if let Err(e) = self.deinit() {
                warn!("{}", e);
            }
        }
    }
}

/// An open driver session.
pub struct Driver<'c, B: Binding> {
    cifx: &'c Cifx<B>,
    // only `None` once closing has started
    handle: Option<DriverHandle>,
    info: OnceCell<DriverInfo>,
}

impl<'c, B: Binding> Driver<'c, B> {
    pub(crate) fn handle(&self) -> &DriverHandle {
        match &self.handle {
            Some(handle) => handle,
            None => unreachable!("driver handle used after close"),
        }
    }

    pub fn binding(&self) -> &B {
        &self.cifx.binding
    }

    pub fn timeouts(&self) -> Timeouts {
        self.cifx.timeouts
    }

    /// Release the session. The handle is given up even if the driver
    /// reports a failure.
    pub fn close(mut self) -> Result<()> {
        match self.handle.take() {
            Some(handle) => {
                native!(
                    self.binding(),
                    ErrorKind::DriverCloseFailed,
                    "CifX driver close failed",
                    self.binding().driver_close(handle)
                )?;
                info!("cifX driver closed");
                Ok(())
            }
            None => Ok(()),
        }
    }

    /// Driver information, queried on first use and kept for the lifetime
    /// of the session.
    pub fn info(&self) -> Result<&DriverInfo> {
        self.info.get_or_try_init(|| {
            let mut raw = ffi::DRIVER_INFORMATION::default();
            native!(
                self.binding(),
                ErrorKind::DriverInfoFailed,
                "CifX get driver information failed",
                self.binding().driver_information(self.handle(), &mut raw)
            )?;
            let info = DriverInfo::from(&raw);
            debug!("driver information: {:?}", info);
            Ok(info)
        })
    }

    pub fn version(&self) -> Result<String> {
        if self.binding().platform().has_version_query() {
            let mut buf = [0u8; ffi::CIFX_DRIVER_VERSION_LENGTH];
            native!(
                self.binding(),
                ErrorKind::VersionQueryFailed,
                "CifX get version failed",
                self.binding().driver_version(&mut buf)
            )?;
            Ok(util::text_buffer(&buf))
        } else {
            self.info()
                .map(|info| info.version.clone())
                .map_err(|e| e.with_kind(ErrorKind::VersionQueryFailed))
        }
    }

    pub fn board_count(&self) -> Result<u32> {
        self.info().map(|info| info.board_count)
    }

    /// Query the board at `index`. Every call asks the driver anew.
    pub fn get_board(&self, index: BoardIdx) -> Result<Board<'_, B>> {
        if index >= self.board_count()? {
            return Err(Error::usage(
                ErrorKind::InvalidBoardIndex,
                format!("Invalid board index: {}", index),
            ));
        }
        let mut raw = ffi::BOARD_INFORMATION::default();
        native!(
            self.binding(),
            ErrorKind::BoardQueryFailed,
            "CifX get board failed",
            self.binding().enum_board(self.handle(), index, &mut raw)
        )?;
        Ok(Board::new(self, BoardInfo::from_raw(index, &raw)))
    }

    /// Lazily yields every board. Call again to start over.
    pub fn enumerate_boards(&self) -> Result<Boards<'_, B>> {
        Ok(Boards {
            driver: self,
            next: 0,
            count: self.board_count()?,
        })
    }

    /// Log the identity of every board and channel.
    pub fn log_system_info(&self) -> Result<()> {
        info!("cifX driver {}", self.version()?);
        for board in self.enumerate_boards()? {
            let board = board?;
            for channel in board.enumerate_channels() {
                let channel = channel?;
                info!(
                    "Board {} ({}), Channel {}: firmware {} {} ({})",
                    board.index(),
                    board.name(),
                    channel.index(),
                    channel.firmware(),
                    channel.info().firmware_version,
                    channel.info().firmware_date,
                );
            }
        }
        Ok(())
    }
}

impl<'c, B: Binding> Drop for Driver<'c, B> {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            let ret = self.cifx.binding.driver_close(handle);
            if ret != 0 {
                warn!("could not close cifX driver: 0x{:08X}", ret as u32);
            }
        }
    }
}

/// Iterator returned by [`Driver::enumerate_boards`].
pub struct Boards<'d, B: Binding> {
    driver: &'d Driver<'d, B>,
    next: BoardIdx,
    count: u32,
}

impl<'d, B: Binding> Iterator for Boards<'d, B> {
    type Item = Result<Board<'d, B>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.next >= self.count {
            return None;
        }
        let index = self.next;
        self.next += 1;
        Some(self.driver.get_board(index))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let left = self.count.saturating_sub(self.next) as usize;
        (left, Some(left))
    }
}

impl<'d, B: Binding> ExactSizeIterator for Boards<'d, B> {}
impl<'d, B: Binding> FusedIterator for Boards<'d, B> {}
