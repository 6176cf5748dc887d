// Part of cifx-rs. Copyright 2025 by the authors.
// This work is dual-licensed under Apache 2.0 and MIT terms.

use crate::{
    binding::{Binding, RawStatus},
    status::{self, Status},
};
use std::{borrow::Cow, fmt, io};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Where a failure originates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// An operation was called in a state that does not allow it.
    Lifecycle,
    /// The driver returned a non-zero status.
    Native,
    /// An argument was rejected before reaching the driver.
    Argument,
}

/// What went wrong.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    AlreadyInitialized,
    NotInitialized,
    InitializationFailed,
    DeinitializationFailed,
    DriverOpenFailed,
    DriverCloseFailed,
    DriverInfoFailed,
    VersionQueryFailed,
    InvalidBoardIndex,
    BoardQueryFailed,
    InvalidChannelIndex,
    ChannelQueryFailed,
    InvalidBoardName,
    AlreadyOpened,
    NotOpened,
    OpenFailed,
    CloseFailed,
    ResetFailed,
    AlreadyReady,
    NotReady,
    HostNotReady,
    HostStartFailed,
    HostStopFailed,
    HostStateFailed,
    AlreadyLocked,
    NotLocked,
    LockFailed,
    UnlockFailed,
    LockStateFailed,
    AlreadyBusOpen,
    BusNotOpen,
    BusOpenFailed,
    BusCloseFailed,
    BusStateFailed,
    EmptyPayload,
    /// More data than a single driver call can carry.
    PayloadTooLarge,
    IoNotOpen,
    IoWriteFailed,
    IoReadFailed,
}

impl ErrorKind {
    pub fn class(self) -> ErrorClass {
        use ErrorKind::*;
        match self {
            AlreadyInitialized | NotInitialized | AlreadyOpened | NotOpened | AlreadyReady
            | NotReady | HostNotReady | AlreadyLocked | NotLocked | AlreadyBusOpen
            | BusNotOpen | IoNotOpen => ErrorClass::Lifecycle,
            InvalidBoardIndex | InvalidChannelIndex | InvalidBoardName | EmptyPayload
            | PayloadTooLarge => ErrorClass::Argument,
            _ => ErrorClass::Native,
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

#[derive(Debug, Error)]
pub enum Error {
    /// Lifecycle-ordering or argument error, detected without the driver.
    #[error("{message}")]
    Usage {
        kind: ErrorKind,
        message: Cow<'static, str>,
    },
    /// The driver reported a failure.
    #[error("{message}: {status}")]
    Native {
        kind: ErrorKind,
        message: Cow<'static, str>,
        status: Status,
    },
    #[error("Cannot load driver library: {0}")]
    Library(#[from] libloading::Error),
}

impl Error {
    pub(crate) fn usage(kind: ErrorKind, message: impl Into<Cow<'static, str>>) -> Self {
        Error::Usage {
            kind,
            message: message.into(),
        }
    }

    /// Resolves name and description of `code` right away, while the
    /// binding is at hand.
    pub(crate) fn native<B: Binding + ?Sized>(
        binding: &B,
        kind: ErrorKind,
        message: impl Into<Cow<'static, str>>,
        code: RawStatus,
    ) -> Self {
        Error::Native {
            kind,
            message: message.into(),
            status: Status::resolve(binding, code as u32),
        }
    }

    /// Report the same failure under another kind.
    pub(crate) fn with_kind(self, new: ErrorKind) -> Self {
        match self {
            Error::Usage { message, .. } => Error::Usage { kind: new, message },
            Error::Native {
                message, status, ..
            } => Error::Native {
                kind: new,
                message,
                status,
            },
            other => other,
        }
    }

    /// `None` for library loading errors, which happen before any
    /// operation exists.
    pub fn kind(&self) -> Option<ErrorKind> {
        match self {
            Error::Usage { kind, .. } | Error::Native { kind, .. } => Some(*kind),
            Error::Library(_) => None,
        }
    }

    pub fn class(&self) -> Option<ErrorClass> {
        self.kind().map(ErrorKind::class)
    }

    pub fn message(&self) -> Cow<'_, str> {
        match self {
            Error::Usage { message, .. } | Error::Native { message, .. } => {
                Cow::Borrowed(message.as_ref())
            }
            Error::Library(e) => Cow::Owned(e.to_string()),
        }
    }

    /// Raw driver status; zero for errors not reported by the driver.
    pub fn code(&self) -> u32 {
        match self {
            Error::Native { status, .. } => status.code,
            _ => 0,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Error::Native { status, .. } => status.name,
            _ => status::NO_ERROR_NAME,
        }
    }

    pub fn description(&self) -> &str {
        match self {
            Error::Native { status, .. } => &status.description,
            _ => status::NO_ERROR_DESCRIPTION,
        }
    }
}

impl From<Error> for io::Error {
    fn from(e: Error) -> Self {
        io::Error::new(io::ErrorKind::Other, e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ffi, sim::SimBinding};

    #[test]
    fn usage_error_carries_no_error_triad() {
        let e = Error::usage(ErrorKind::NotOpened, "CifX channel not opened.");
        assert_eq!(e.kind(), Some(ErrorKind::NotOpened));
        assert_eq!(e.class(), Some(ErrorClass::Lifecycle));
        assert_eq!(e.code(), 0);
        assert_eq!(e.name(), "CIFX_NO_ERROR");
        assert_eq!(e.description(), "No error");
        assert_eq!(e.to_string(), "CifX channel not opened.");
    }

    #[test]
    fn native_error_resolves_status() {
        let sim = SimBinding::new();
        let e = Error::native(
            &sim,
            ErrorKind::IoReadFailed,
            "CifX io read failed",
            ffi::CIFX_DEV_EXCHANGE_TIMEOUT as i32,
        );
        assert_eq!(e.class(), Some(ErrorClass::Native));
        assert_eq!(e.code(), 0x800C_0023);
        assert_eq!(e.name(), "CIFX_DEV_EXCHANGE_TIMEOUT");
        assert_eq!(e.description(), "sim: I/O data exchange timeout");
        assert_eq!(e.message(), "CifX io read failed");
        assert_eq!(
            e.to_string(),
            "CifX io read failed: CIFX_DEV_EXCHANGE_TIMEOUT (0x800C0023): \
             sim: I/O data exchange timeout"
        );
    }

    #[test]
    fn native_error_with_unknown_code_is_usable() {
        let sim = SimBinding::new();
        let e = Error::native(&sim, ErrorKind::ResetFailed, "CifX reset failed", 0xDEAD_BEEFu32 as i32);
        assert_eq!(e.name(), "UnknownError");
        assert_eq!(e.code(), 0xDEAD_BEEF);
    }

    #[test]
    fn native_error_with_code_zero() {
        let sim = SimBinding::new();
        let e = Error::native(&sim, ErrorKind::OpenFailed, "CifX channel open failed", 0);
        assert_eq!(e.name(), "CIFX_NO_ERROR");
        assert_eq!(e.description(), "No error");
    }

    #[test]
    fn classes() {
        assert_eq!(ErrorKind::EmptyPayload.class(), ErrorClass::Argument);
        assert_eq!(ErrorKind::PayloadTooLarge.class(), ErrorClass::Argument);
        assert_eq!(ErrorKind::IoNotOpen.class(), ErrorClass::Lifecycle);
        assert_eq!(ErrorKind::InvalidBoardIndex.class(), ErrorClass::Argument);
        assert_eq!(ErrorKind::HostNotReady.class(), ErrorClass::Lifecycle);
        assert_eq!(ErrorKind::BusOpenFailed.class(), ErrorClass::Native);
    }

    #[test]
    fn converts_into_io_error() {
        let e: io::Error = Error::usage(ErrorKind::NotInitialized, "CifX not initialized.").into();
        assert_eq!(e.kind(), io::ErrorKind::Other);
        assert_eq!(e.to_string(), "CifX not initialized.");
    }
}
