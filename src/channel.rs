// Part of cifx-rs. Copyright 2025 by the authors.
// This work is dual-licensed under Apache 2.0 and MIT terms.

//! The channel state machine.
//!
//! Host state, bus state and configuration lock live in the driver and may
//! change under our feet (e.g. a watchdog dropping the bus), so they are
//! polled on every check instead of being tracked here. Only the channel
//! handle is local state.

use crate::{
    binding::{Binding, ChannelHandle},
    board::Board,
    error::{Error, ErrorKind, Result},
    ffi,
    types::*,
    util,
};
use log::{debug, info, warn};
use std::{convert::TryFrom, ffi::CString, time::Duration};

/// Poll calls never block.
const POLL: u32 = 0;

fn not_opened() -> Error {
    Error::usage(ErrorKind::NotOpened, "CifX channel not opened.")
}

/// A communication channel of a [`Board`].
pub struct Channel<'b, B: Binding> {
    board: &'b Board<'b, B>,
    info: ChannelInfo,
    handle: Option<ChannelHandle>,
    timeouts: Timeouts,
}

impl<'b, B: Binding> Channel<'b, B> {
    pub(crate) fn new(board: &'b Board<'b, B>, info: ChannelInfo) -> Self {
        Channel {
            board,
            info,
            handle: None,
            timeouts: board.driver().timeouts(),
        }
    }

    fn binding(&self) -> &'b B {
        self.board.driver().binding()
    }

    fn handle(&self) -> Result<&ChannelHandle> {
        self.handle.as_ref().ok_or_else(not_opened)
    }

    pub fn board(&self) -> &'b Board<'b, B> {
        self.board
    }

    pub fn index(&self) -> ChannelIdx {
        self.info.index
    }

    pub fn info(&self) -> &ChannelInfo {
        &self.info
    }

    /// Firmware name, or `"Unknown"` if the driver reports none.
    pub fn firmware(&self) -> &str {
        if self.info.firmware_name.is_empty() {
            "Unknown"
        } else {
            &self.info.firmware_name
        }
    }

    pub fn timeouts(&self) -> Timeouts {
        self.timeouts
    }

    pub fn set_timeouts(&mut self, timeouts: Timeouts) {
        self.timeouts = timeouts;
    }

    pub fn is_open(&self) -> bool {
        self.handle.is_some()
    }

    /// Open the channel. If the driver fails but still hands out a handle,
    /// that handle is closed again before the failure is returned.
    pub fn open(&mut self) -> Result<()> {
        if self.is_open() {
            return Err(Error::usage(
                ErrorKind::AlreadyOpened,
                "CifX channel already opened.",
            ));
        }
        let name = CString::new(self.board.name()).map_err(|_| {
            Error::usage(
                ErrorKind::InvalidBoardName,
                format!("Invalid board name: {:?}", self.board.name()),
            )
        })?;
        let binding = self.binding();
        let (ret, handle) =
            binding.channel_open(self.board.driver().handle(), &name, self.index());
        self.handle = handle;
        if let Err(e) = native!(binding, ErrorKind::OpenFailed, "CifX channel open failed", ret) {
            if self.is_open() {
                if let Err(close_err) = self.close() {
                    warn!("cleanup after failed open: {}", close_err);
                }
                // given up even if the driver refused to close it
                self.handle = None;
            }
            return Err(e);
        }
        if !self.is_open() {
            return Err(Error::native(
                binding,
                ErrorKind::OpenFailed,
                "CifX channel open failed",
                ffi::CIFX_INVALID_HANDLE as i32,
            ));
        }
        info!("opened channel {} of board {}", self.index(), self.board.name());
        Ok(())
    }

    /// Close the channel. On failure the handle is kept, so closing can be
    /// retried.
    pub fn close(&mut self) -> Result<()> {
        let handle = self.handle()?;
        native!(
            self.binding(),
            ErrorKind::CloseFailed,
            "CifX channel close failed",
            self.binding().channel_close(handle)
        )?;
        self.handle = None;
        info!("closed channel {} of board {}", self.index(), self.board.name());
        Ok(())
    }

    pub fn reset(&self, mode: ResetMode) -> Result<()> {
        let handle = self.handle()?;
        native!(
            self.binding(),
            ErrorKind::ResetFailed,
            "CifX reset failed",
            self.binding()
                .reset(handle, mode.raw(), util::millis(self.timeouts.reset))
        )?;
        debug!("channel {}: reset ({:?})", self.index(), mode);
        Ok(())
    }

    pub fn host_ready(&self) -> Result<bool> {
        let handle = self.handle()?;
        let mut state = 0;
        native!(
            self.binding(),
            ErrorKind::HostStateFailed,
            "CifX get host state failed",
            self.binding()
                .host_state(handle, ffi::CIFX_HOST_STATE_READ, &mut state, POLL)
        )?;
        Ok(state == ffi::CIFX_HOST_STATE_READY)
    }

    pub fn bus_open(&self) -> Result<bool> {
        let handle = self.handle()?;
        let mut state = 0;
        native!(
            self.binding(),
            ErrorKind::BusStateFailed,
            "CifX get bus state failed",
            self.binding()
                .bus_state(handle, ffi::CIFX_BUS_STATE_GETSTATE, &mut state, POLL)
        )?;
        Ok(state == ffi::CIFX_BUS_STATE_ON)
    }

    pub fn config_locked(&self) -> Result<bool> {
        let handle = self.handle()?;
        let mut state = 0;
        native!(
            self.binding(),
            ErrorKind::LockStateFailed,
            "CifX get config lock state failed",
            self.binding().config_lock(
                handle,
                ffi::CIFX_CONFIGURATION_GETLOCKSTATE,
                &mut state,
                POLL
            )
        )?;
        Ok(state == ffi::CIFX_CONFIGURATION_LOCK)
    }

    /// Poll all three state axes.
    pub fn state(&self) -> Result<ChannelState> {
        Ok(ChannelState {
            host_ready: self.host_ready()?,
            bus_open: self.bus_open()?,
            config_locked: self.config_locked()?,
        })
    }

    pub fn start_host(&self) -> Result<()> {
        let handle = self.handle()?;
        if self.host_ready()? {
            return Err(Error::usage(ErrorKind::AlreadyReady, "CifX host already ready."));
        }
        let mut state = 0;
        native!(
            self.binding(),
            ErrorKind::HostStartFailed,
            "CifX start host failed",
            self.binding().host_state(
                handle,
                ffi::CIFX_HOST_STATE_READY,
                &mut state,
                util::millis(self.timeouts.state_change)
            )
        )?;
        debug!("channel {}: host ready", self.index());
        Ok(())
    }

    pub fn stop_host(&self) -> Result<()> {
        let handle = self.handle()?;
        if !self.host_ready()? {
            return Err(Error::usage(ErrorKind::NotReady, "CifX host not ready."));
        }
        let mut state = 0;
        native!(
            self.binding(),
            ErrorKind::HostStopFailed,
            "CifX stop host failed",
            self.binding().host_state(
                handle,
                ffi::CIFX_HOST_STATE_NOT_READY,
                &mut state,
                util::millis(self.timeouts.state_change)
            )
        )?;
        debug!("channel {}: host not ready", self.index());
        Ok(())
    }

    pub fn lock_config(&self) -> Result<()> {
        let handle = self.handle()?;
        if self.config_locked()? {
            return Err(Error::usage(ErrorKind::AlreadyLocked, "CifX config is locked."));
        }
        let mut state = 0;
        native!(
            self.binding(),
            ErrorKind::LockFailed,
            "CifX lock config failed",
            self.binding().config_lock(
                handle,
                ffi::CIFX_CONFIGURATION_LOCK,
                &mut state,
                util::millis(self.timeouts.state_change)
            )
        )?;
        debug!("channel {}: configuration locked", self.index());
        Ok(())
    }

    pub fn unlock_config(&self) -> Result<()> {
        let handle = self.handle()?;
        if !self.config_locked()? {
            return Err(Error::usage(ErrorKind::NotLocked, "CifX config is not locked."));
        }
        let mut state = 0;
        native!(
            self.binding(),
            ErrorKind::UnlockFailed,
            "CifX unlock config failed",
            self.binding().config_lock(
                handle,
                ffi::CIFX_CONFIGURATION_UNLOCK,
                &mut state,
                util::millis(self.timeouts.state_change)
            )
        )?;
        debug!("channel {}: configuration unlocked", self.index());
        Ok(())
    }

    /// Switch the bus on. The host must have signalled readiness first; on a
    /// closed channel it never has.
    pub fn open_bus(&self) -> Result<()> {
        let handle = self
            .handle
            .as_ref()
            .ok_or_else(|| Error::usage(ErrorKind::HostNotReady, "CifX host not ready."))?;
        if self.bus_open()? {
            return Err(Error::usage(ErrorKind::AlreadyBusOpen, "CifX bus already open."));
        }
        if !self.host_ready()? {
            return Err(Error::usage(ErrorKind::HostNotReady, "CifX host not ready."));
        }
        let mut state = 0;
        native!(
            self.binding(),
            ErrorKind::BusOpenFailed,
            "CifX bus open failed",
            self.binding().bus_state(
                handle,
                ffi::CIFX_BUS_STATE_ON,
                &mut state,
                util::millis(self.timeouts.state_change)
            )
        )?;
        debug!("channel {}: bus on", self.index());
        Ok(())
    }

    pub fn close_bus(&self) -> Result<()> {
        let handle = self.handle()?;
        if !self.bus_open()? {
            return Err(Error::usage(ErrorKind::BusNotOpen, "CifX bus not open."));
        }
        if !self.host_ready()? {
            return Err(Error::usage(ErrorKind::HostNotReady, "CifX host not ready."));
        }
        let mut state = 0;
        native!(
            self.binding(),
            ErrorKind::BusCloseFailed,
            "CifX bus close failed",
            self.binding().bus_state(
                handle,
                ffi::CIFX_BUS_STATE_OFF,
                &mut state,
                util::millis(self.timeouts.state_change)
            )
        )?;
        debug!("channel {}: bus off", self.index());
        Ok(())
    }

    // Preconditions shared by reads and writes. The payload checks come
    // before the bus poll so that rejected arguments never reach the driver.
    fn io_handle(&self, len: usize) -> Result<&ChannelHandle> {
        let handle = self.handle.as_ref().ok_or_else(|| {
            Error::usage(ErrorKind::IoNotOpen, "CifX channel not opened for io.")
        })?;
        if len == 0 {
            return Err(Error::usage(
                ErrorKind::EmptyPayload,
                "CifX io data cannot be empty.",
            ));
        }
        // the driver takes lengths as u32
        if u32::try_from(len).is_err() {
            return Err(Error::usage(
                ErrorKind::PayloadTooLarge,
                format!("CifX io data too large: {} bytes", len),
            ));
        }
        if !self.bus_open()? {
            return Err(Error::usage(ErrorKind::BusNotOpen, "CifX bus not open."));
        }
        Ok(handle)
    }

    /// Write `data` to exchange area `area` at `offset`, waiting at most the
    /// configured I/O timeout.
    pub fn io_write(&self, area: u32, offset: u32, data: &[u8]) -> Result<()> {
        self.io_write_timeout(area, offset, data, self.timeouts.io)
    }

    /// A timeout expiring is reported as a driver status
    /// (`CIFX_DEV_EXCHANGE_TIMEOUT`), check [`Error::code`].
    pub fn io_write_timeout(
        &self,
        area: u32,
        offset: u32,
        data: &[u8],
        timeout: Duration,
    ) -> Result<()> {
        let handle = self.io_handle(data.len())?;
        native!(
            self.binding(),
            ErrorKind::IoWriteFailed,
            "CifX io write failed",
            self.binding()
                .io_write(handle, area, offset, data, util::millis(timeout))
        )
    }

    /// Read `len` bytes from exchange area `area` at `offset`.
    pub fn io_read(&self, area: u32, offset: u32, len: usize) -> Result<Vec<u8>> {
        self.io_read_timeout(area, offset, len, self.timeouts.io)
    }

    pub fn io_read_timeout(
        &self,
        area: u32,
        offset: u32,
        len: usize,
        timeout: Duration,
    ) -> Result<Vec<u8>> {
        let handle = self.io_handle(len)?;
        let mut data = vec![0; len];
        native!(
            self.binding(),
            ErrorKind::IoReadFailed,
            "CifX io read failed",
            self.binding()
                .io_read(handle, area, offset, &mut data, util::millis(timeout))
        )?;
        Ok(data)
    }
}

impl<'b, B: Binding> Drop for Channel<'b, B> {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            let ret = self.binding().channel_close(&handle);
            if ret != 0 {
                warn!(
                    "could not close channel {} of board {}: 0x{:08X}",
                    self.index(),
                    self.board.name(),
                    ret as u32
                );
            }
        }
    }
}
