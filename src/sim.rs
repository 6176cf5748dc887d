// Part of cifx-rs. Copyright 2025 by the authors.
// This work is dual-licensed under Apache 2.0 and MIT terms.

//! An in-memory cifX card for tests.

use crate::{
    binding::{Binding, ChannelHandle, DriverHandle, Platform, RawStatus},
    ffi, status,
};
use std::{
    cell::{Cell, RefCell},
    collections::HashMap,
    ffi::CStr,
    rc::Rc,
    sync::atomic::AtomicBool,
};

pub const AREA_SIZE: usize = 64;
pub const AREA_COUNT: usize = 2;

const OK: RawStatus = ffi::CIFX_NO_ERROR as RawStatus;

thread_local! {
    // Stands in for the process: every card simulated on a test thread
    // shares one driver activation.
    static ACTIVATION: Rc<AtomicBool> = Rc::new(AtomicBool::new(false));
}

fn err(code: u32) -> RawStatus {
    code as RawStatus
}

fn copy_str(dst: &mut [libc::c_char], s: &str) {
    for (d, b) in dst.iter_mut().zip(s.bytes()) {
        *d = b as libc::c_char;
    }
}

#[derive(Debug, Clone)]
pub struct SimChannel {
    pub firmware: String,
    pub host_ready: bool,
    pub bus_open: bool,
    pub config_locked: bool,
    pub areas: Vec<Vec<u8>>,
}

impl SimChannel {
    pub fn new(firmware: &str) -> Self {
        SimChannel {
            firmware: firmware.to_owned(),
            host_ready: false,
            bus_open: false,
            config_locked: false,
            areas: vec![vec![0; AREA_SIZE]; AREA_COUNT],
        }
    }

    fn reset(&mut self) {
        self.host_ready = false;
        self.bus_open = false;
        self.config_locked = false;
    }
}

fn host_axis(ch: &mut SimChannel) -> &mut bool {
    &mut ch.host_ready
}

fn bus_axis(ch: &mut SimChannel) -> &mut bool {
    &mut ch.bus_open
}

fn lock_axis(ch: &mut SimChannel) -> &mut bool {
    &mut ch.config_locked
}

#[derive(Debug, Clone)]
pub struct SimBoard {
    pub name: String,
    pub alias: String,
    pub channels: Vec<SimChannel>,
}

impl SimBoard {
    pub fn new(name: &str, channels: Vec<SimChannel>) -> Self {
        SimBoard {
            name: name.to_owned(),
            alias: String::new(),
            channels,
        }
    }

    fn matches(&self, index: usize, name: &str) -> bool {
        if self.name.is_empty() {
            name == format!("CIFx{}", index)
        } else {
            name == self.name
        }
    }
}

#[derive(Default)]
struct State {
    initialized: bool,
    next_handle: usize,
    open_drivers: usize,
    channels: HashMap<usize, (usize, usize)>,
    // entry point -> status returned by its next call
    failures: HashMap<&'static str, u32>,
    // (entry point, command) -> status returned by its next call with that command
    cmd_failures: HashMap<(&'static str, u32), u32>,
    // entry point -> timeout of its last call
    timeouts: HashMap<&'static str, u32>,
}

pub struct SimBinding {
    platform: Platform,
    activation: Rc<AtomicBool>,
    version: String,
    partial_handles: Cell<bool>,
    boards: RefCell<Vec<SimBoard>>,
    state: RefCell<State>,
    calls: RefCell<HashMap<&'static str, usize>>,
}

impl SimBinding {
    /// One board `cifX0` with an EtherCAT and a PROFINET channel.
    pub fn new() -> Self {
        Self::with_boards(vec![SimBoard::new(
            "cifX0",
            vec![SimChannel::new("EtherCAT Slave"), SimChannel::new("PROFINET IO-Device")],
        )])
    }

    pub fn empty() -> Self {
        Self::with_boards(vec![])
    }

    pub fn with_boards(boards: Vec<SimBoard>) -> Self {
        SimBinding {
            platform: Platform::Linux,
            activation: ACTIVATION.with(Rc::clone),
            version: "cifX Driver V3.0.0.0".to_owned(),
            partial_handles: Cell::new(false),
            boards: RefCell::new(boards),
            state: RefCell::new(State {
                next_handle: 0x1000,
                ..State::default()
            }),
            calls: RefCell::new(HashMap::new()),
        }
    }

    pub fn with_platform(mut self, platform: Platform) -> Self {
        self.platform = platform;
        self
    }

    /// Make failing opens still return a handle.
    pub fn partial_handles(self) -> Self {
        self.partial_handles.set(true);
        self
    }

    /// The next call to `entry` returns `code`.
    pub fn fail(&self, entry: &'static str, code: u32) {
        self.state.borrow_mut().failures.insert(entry, code);
    }

    /// The next call to the state entry point `entry` issuing `cmd` returns
    /// `code`. Polls and other commands go through.
    pub fn fail_cmd(&self, entry: &'static str, cmd: u32, code: u32) {
        self.state
            .borrow_mut()
            .cmd_failures
            .insert((entry, cmd), code);
    }

    pub fn calls(&self, entry: &str) -> usize {
        self.calls.borrow().get(entry).copied().unwrap_or(0)
    }

    pub fn total_calls(&self) -> usize {
        self.calls.borrow().values().sum()
    }

    pub fn reset_calls(&self) {
        self.calls.borrow_mut().clear();
    }

    pub fn last_timeout(&self, entry: &str) -> Option<u32> {
        self.state.borrow().timeouts.get(entry).copied()
    }

    pub fn open_drivers(&self) -> usize {
        self.state.borrow().open_drivers
    }

    pub fn open_channels(&self) -> usize {
        self.state.borrow().channels.len()
    }

    pub fn is_initialized(&self) -> bool {
        self.state.borrow().initialized
    }

    /// Change channel state behind the host's back, like the firmware would.
    pub fn with_channel<R>(&self, board: usize, channel: usize, f: impl FnOnce(&mut SimChannel) -> R) -> R {
        f(&mut self.boards.borrow_mut()[board].channels[channel])
    }

    fn enter(&self, entry: &'static str) -> Option<RawStatus> {
        *self.calls.borrow_mut().entry(entry).or_insert(0) += 1;
        self.state.borrow_mut().failures.remove(entry).map(err)
    }

    fn new_handle(&self) -> usize {
        let mut state = self.state.borrow_mut();
        state.next_handle += 0x10;
        state.next_handle
    }

    fn channel_of(&self, handle: &ChannelHandle) -> Option<(usize, usize)> {
        self.state
            .borrow()
            .channels
            .get(&(handle.as_raw() as usize))
            .copied()
    }

    fn state_cmd(
        &self,
        entry: &'static str,
        handle: &ChannelHandle,
        cmd: u32,
        state: &mut u32,
        timeout: u32,
        axis: fn(&mut SimChannel) -> &mut bool,
    ) -> RawStatus {
        if let Some(ret) = self.enter(entry) {
            return ret;
        }
        let mut sim = self.state.borrow_mut();
        sim.timeouts.insert(entry, timeout);
        if let Some(code) = sim.cmd_failures.remove(&(entry, cmd)) {
            return err(code);
        }
        drop(sim);
        let (b, c) = match self.channel_of(handle) {
            Some(bc) => bc,
            None => return err(ffi::CIFX_INVALID_HANDLE),
        };
        self.with_channel(b, c, |ch| {
            let flag = axis(ch);
            match cmd {
                0 => *flag = false,
                1 => *flag = true,
                2 => {}
                _ => return err(ffi::CIFX_INVALID_COMMAND),
            }
            *state = *flag as u32;
            OK
        })
    }

    fn area<'a>(
        ch: &'a mut SimChannel,
        area: u32,
        offset: u32,
        len: usize,
    ) -> Result<&'a mut [u8], RawStatus> {
        let area = ch
            .areas
            .get_mut(area as usize)
            .ok_or_else(|| err(ffi::CIFX_INVALID_PARAMETER))?;
        let start = offset as usize;
        area.get_mut(start..start + len)
            .ok_or_else(|| err(ffi::CIFX_INVALID_ACCESS_SIZE))
    }
}

impl Binding for SimBinding {
    fn platform(&self) -> Platform {
        self.platform
    }

    fn activation(&self) -> &AtomicBool {
        &self.activation
    }

    fn driver_init(&self) -> RawStatus {
        if let Some(ret) = self.enter("driver_init") {
            return ret;
        }
        let mut state = self.state.borrow_mut();
        if state.initialized {
            return err(ffi::CIFX_DRV_INIT_STATE_ERROR);
        }
        state.initialized = true;
        OK
    }

    fn driver_deinit(&self) -> RawStatus {
        if let Some(ret) = self.enter("driver_deinit") {
            return ret;
        }
        self.state.borrow_mut().initialized = false;
        OK
    }

    fn driver_version(&self, buf: &mut [u8]) -> RawStatus {
        if let Some(ret) = self.enter("driver_version") {
            return ret;
        }
        let bytes = self.version.as_bytes();
        if bytes.len() >= buf.len() {
            return err(ffi::CIFX_BUFFER_TOO_SHORT);
        }
        buf[..bytes.len()].copy_from_slice(bytes);
        OK
    }

    fn driver_open(&self) -> (RawStatus, Option<DriverHandle>) {
        let failure = self.enter("driver_open");
        if self.platform.requires_init() && !self.is_initialized() {
            return (err(ffi::CIFX_DRV_NOT_INITIALIZED), None);
        }
        let handle = self.new_handle();
        self.state.borrow_mut().open_drivers += 1;
        let handle = unsafe { DriverHandle::from_raw(handle as ffi::CIFXHANDLE) };
        match failure {
            Some(ret) if self.partial_handles.get() => (ret, handle),
            Some(ret) => {
                self.state.borrow_mut().open_drivers -= 1;
                (ret, None)
            }
            None => (OK, handle),
        }
    }

    fn driver_close(&self, _driver: DriverHandle) -> RawStatus {
        let mut state = self.state.borrow_mut();
        state.open_drivers = state.open_drivers.saturating_sub(1);
        drop(state);
        self.enter("driver_close").unwrap_or(OK)
    }

    fn driver_information(
        &self,
        _driver: &DriverHandle,
        info: &mut ffi::DRIVER_INFORMATION,
    ) -> RawStatus {
        if let Some(ret) = self.enter("driver_information") {
            return ret;
        }
        copy_str(&mut info.abDriverVersion, &self.version);
        info.ulBoardCnt = self.boards.borrow().len() as u32;
        OK
    }

    fn enum_board(
        &self,
        _driver: &DriverHandle,
        board: u32,
        info: &mut ffi::BOARD_INFORMATION,
    ) -> RawStatus {
        if let Some(ret) = self.enter("enum_board") {
            return ret;
        }
        let boards = self.boards.borrow();
        let b = match boards.get(board as usize) {
            Some(b) => b,
            None => return err(ffi::CIFX_INVALID_BOARD),
        };
        copy_str(&mut info.abBoardName, &b.name);
        copy_str(&mut info.abBoardAlias, &b.alias);
        info.ulBoardID = board;
        info.ulChannelCnt = b.channels.len() as u32;
        info.ulDpmTotalSize = 0x10000;
        info.tSystemInfo.ulDeviceNumber = 1_250_100;
        info.tSystemInfo.ulSerialNumber = 20_000 + board;
        OK
    }

    fn enum_channel(
        &self,
        _driver: &DriverHandle,
        board: u32,
        channel: u32,
        info: &mut ffi::CHANNEL_INFORMATION,
    ) -> RawStatus {
        if let Some(ret) = self.enter("enum_channel") {
            return ret;
        }
        let boards = self.boards.borrow();
        let b = match boards.get(board as usize) {
            Some(b) => b,
            None => return err(ffi::CIFX_INVALID_BOARD),
        };
        let ch = match b.channels.get(channel as usize) {
            Some(ch) => ch,
            None => return err(ffi::CIFX_INVALID_CHANNEL),
        };
        copy_str(&mut info.abBoardName, &b.name);
        copy_str(&mut info.abFWName, &ch.firmware);
        info.bFWNameLength = ch.firmware.len() as u8;
        info.usFWMajor = 4;
        info.usFWMinor = 8;
        info.usFWYear = 2024;
        info.bFWMonth = 5;
        info.bFWDay = 17;
        info.ulIOInAreaCnt = 1;
        info.ulIOOutAreaCnt = 1;
        OK
    }

    fn error_description(&self, code: RawStatus, buf: &mut [u8]) -> RawStatus {
        if let Some(ret) = self.enter("error_description") {
            return ret;
        }
        match status::error_text(code as u32) {
            Some(text) => {
                let text = format!("sim: {}", text);
                let n = text.len().min(buf.len());
                buf[..n].copy_from_slice(&text.as_bytes()[..n]);
                OK
            }
            None => err(ffi::CIFX_INVALID_PARAMETER),
        }
    }

    fn channel_open(
        &self,
        _driver: &DriverHandle,
        board: &CStr,
        channel: u32,
    ) -> (RawStatus, Option<ChannelHandle>) {
        let failure = self.enter("channel_open");
        let name = board.to_string_lossy();
        let found = self
            .boards
            .borrow()
            .iter()
            .enumerate()
            .find(|(i, b)| b.matches(*i, &name))
            .map(|(i, b)| (i, (channel as usize) < b.channels.len()));
        let b = match found {
            Some((b, true)) => b,
            Some((_, false)) => return (err(ffi::CIFX_INVALID_CHANNEL), None),
            None => return (err(ffi::CIFX_INVALID_BOARD), None),
        };
        if let (Some(ret), false) = (failure, self.partial_handles.get()) {
            return (ret, None);
        }
        let raw = self.new_handle();
        self.state
            .borrow_mut()
            .channels
            .insert(raw, (b, channel as usize));
        let handle = unsafe { ChannelHandle::from_raw(raw as ffi::CIFXHANDLE) };
        (failure.unwrap_or(OK), handle)
    }

    fn channel_close(&self, channel: &ChannelHandle) -> RawStatus {
        if let Some(ret) = self.enter("channel_close") {
            return ret;
        }
        let key = channel.as_raw() as usize;
        let removed = self.state.borrow_mut().channels.remove(&key);
        match removed {
            Some((b, c)) => {
                self.with_channel(b, c, SimChannel::reset);
                OK
            }
            None => err(ffi::CIFX_INVALID_HANDLE),
        }
    }

    fn io_write(
        &self,
        channel: &ChannelHandle,
        area: u32,
        offset: u32,
        data: &[u8],
        timeout: u32,
    ) -> RawStatus {
        if let Some(ret) = self.enter("io_write") {
            return ret;
        }
        self.state.borrow_mut().timeouts.insert("io_write", timeout);
        let (b, c) = match self.channel_of(channel) {
            Some(bc) => bc,
            None => return err(ffi::CIFX_INVALID_HANDLE),
        };
        self.with_channel(b, c, |ch| match Self::area(ch, area, offset, data.len()) {
            Ok(dst) => {
                dst.copy_from_slice(data);
                OK
            }
            Err(ret) => ret,
        })
    }

    fn io_read(
        &self,
        channel: &ChannelHandle,
        area: u32,
        offset: u32,
        data: &mut [u8],
        timeout: u32,
    ) -> RawStatus {
        if let Some(ret) = self.enter("io_read") {
            return ret;
        }
        self.state.borrow_mut().timeouts.insert("io_read", timeout);
        let (b, c) = match self.channel_of(channel) {
            Some(bc) => bc,
            None => return err(ffi::CIFX_INVALID_HANDLE),
        };
        self.with_channel(b, c, |ch| match Self::area(ch, area, offset, data.len()) {
            Ok(src) => {
                data.copy_from_slice(src);
                OK
            }
            Err(ret) => ret,
        })
    }

    fn host_state(&self, channel: &ChannelHandle, cmd: u32, state: &mut u32, timeout: u32)
        -> RawStatus {
        self.state_cmd("host_state", channel, cmd, state, timeout, host_axis)
    }

    fn bus_state(&self, channel: &ChannelHandle, cmd: u32, state: &mut u32, timeout: u32)
        -> RawStatus {
        self.state_cmd("bus_state", channel, cmd, state, timeout, bus_axis)
    }

    fn reset(&self, channel: &ChannelHandle, _mode: u32, timeout: u32) -> RawStatus {
        if let Some(ret) = self.enter("reset") {
            return ret;
        }
        self.state.borrow_mut().timeouts.insert("reset", timeout);
        match self.channel_of(channel) {
            Some((b, c)) => {
                self.with_channel(b, c, SimChannel::reset);
                OK
            }
            None => err(ffi::CIFX_INVALID_HANDLE),
        }
    }

    fn config_lock(
        &self,
        channel: &ChannelHandle,
        cmd: u32,
        state: &mut u32,
        timeout: u32,
    ) -> RawStatus {
        self.state_cmd("config_lock", channel, cmd, state, timeout, lock_axis)
    }
}
