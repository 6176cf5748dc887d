// Part of cifx-rs. Copyright 2025 by the authors.
// This work is dual-licensed under Apache 2.0 and MIT terms.

use libc::c_char;
use std::{convert::TryFrom, time::Duration};

/// Decode a fixed-size, NUL-padded native character field.
///
/// Everything from the first NUL on is padding.
pub fn fixed_str(field: &[c_char]) -> String {
    let bytes: Vec<u8> = field
        .iter()
        .map(|&c| c as u8)
        .take_while(|&b| b != 0)
        .collect();
    String::from_utf8_lossy(&bytes).into_owned()
}

/// Like [`fixed_str`], but only the first `len` characters are significant.
pub fn fixed_str_len(field: &[c_char], len: usize) -> String {
    fixed_str(&field[..len.min(field.len())])
}

/// Decode a native text buffer up to its terminating NUL, without trailing
/// whitespace.
pub fn text_buffer(buf: &[u8]) -> String {
    let end = buf.iter().position(|&b| b == 0).unwrap_or(buf.len());
    String::from_utf8_lossy(&buf[..end]).trim_end().to_owned()
}

/// Native timeouts are whole milliseconds in a `u32`.
pub fn millis(timeout: Duration) -> u32 {
    u32::try_from(timeout.as_millis()).unwrap_or(u32::MAX)
}
