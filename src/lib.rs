// Part of cifx-rs. Copyright 2025 by the authors.
// This work is dual-licensed under Apache 2.0 and MIT terms.

//! Host side control of Hilscher cifX/netX communication controllers.
//!
//! The entry point is [`Cifx`], which owns the loaded driver library. From it
//! a [`Driver`] session is opened, which enumerates [`Board`]s, which in turn
//! hand out [`Channel`]s. A channel is driven through configuration lock,
//! host ready and bus on before cyclic I/O is exchanged:
//!
//! ```no_run
//! # fn main() -> cifx::Result<()> {
//! let mut cifx = cifx::Cifx::load()?;
//! cifx.init()?;
//! let driver = cifx.open_driver()?;
//! let board = driver.get_board(0)?;
//! let mut channel = board.get_channel(0)?;
//! channel.open()?;
//! channel.start_host()?;
//! channel.open_bus()?;
//! channel.io_write(0, 0, &[1, 2, 3, 4])?;
//! let input = channel.io_read(0, 0, 4)?;
//! # Ok(())
//! # }
//! ```
//!
//! Borrows tie the hierarchy together: a driver cannot be closed while a
//! board or channel taken from it is alive, and the library cannot be
//! deinitialized while a driver is open.

pub use cifx_sys as ffi;

// Turns the raw status of a driver call into a `Result`.
macro_rules! native {
    ($binding:expr, $kind:expr, $msg:expr, $call:expr) => {{
        let ret: $crate::binding::RawStatus = $call;
        if ret as u32 == $crate::ffi::CIFX_NO_ERROR {
            Ok(())
        } else {
            log::debug!("{}: status 0x{:08X}", $msg, ret as u32);
            Err($crate::error::Error::native($binding, $kind, $msg, ret))
        }
    }};
}

mod binding;
mod board;
mod channel;
mod driver;
mod error;
mod native;
mod status;
mod types;
mod util;

#[cfg(test)]
mod sim;

pub use self::{
    binding::{Binding, ChannelHandle, DriverHandle, Platform, RawStatus},
    board::{Board, Channels},
    channel::Channel,
    driver::{Boards, Cifx, CifxBuilder, Driver},
    error::{Error, ErrorClass, ErrorKind, Result},
    native::{default_library_path, library_path, NativeLibrary, LIBRARY_ENV},
    status::{describe, error_name, error_text, Status, UNKNOWN_ERROR},
    types::*,
};
