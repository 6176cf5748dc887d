// Part of cifx-rs. Copyright 2025 by the authors.
// This work is dual-licensed under Apache 2.0 and MIT terms.

use crate::{
    binding::Binding,
    channel::Channel,
    driver::Driver,
    error::{Error, ErrorKind, Result},
    ffi,
    types::*,
};
use std::iter::FusedIterator;

/// A snapshot of one board taken during enumeration.
///
/// Holds no native resource of its own; it borrows the [`Driver`] it came
/// from to hand out channels.
pub struct Board<'d, B: Binding> {
    driver: &'d Driver<'d, B>,
    info: BoardInfo,
    name: String,
}

impl<'d, B: Binding> Board<'d, B> {
    pub(crate) fn new(driver: &'d Driver<'d, B>, info: BoardInfo) -> Self {
        let name = if info.name.is_empty() {
            format!("CIFx{}", info.index)
        } else {
            info.name.clone()
        };
        Board { driver, info, name }
    }

    pub fn driver(&self) -> &'d Driver<'d, B> {
        self.driver
    }

    pub fn index(&self) -> BoardIdx {
        self.info.index
    }

    /// Name used to open channels; synthesized when the driver reports none.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn alias(&self) -> &str {
        &self.info.alias
    }

    pub fn channel_count(&self) -> u32 {
        self.info.channel_count
    }

    pub fn info(&self) -> &BoardInfo {
        &self.info
    }

    /// Query the channel at `index`. Every call asks the driver anew.
    pub fn get_channel(&self, index: ChannelIdx) -> Result<Channel<'_, B>> {
        if index >= self.channel_count() {
            return Err(Error::usage(
                ErrorKind::InvalidChannelIndex,
                format!("Invalid channel index: {}", index),
            ));
        }
        let binding = self.driver.binding();
        let mut raw = ffi::CHANNEL_INFORMATION::default();
        native!(
            binding,
            ErrorKind::ChannelQueryFailed,
            "CifX get channel failed",
            binding.enum_channel(self.driver.handle(), self.index(), index, &mut raw)
        )?;
        Ok(Channel::new(self, ChannelInfo::from_raw(index, &raw)))
    }

    /// Lazily yields every channel of this board. Call again to start over.
    pub fn enumerate_channels(&self) -> Channels<'_, B> {
        Channels {
            board: self,
            next: 0,
            count: self.channel_count(),
        }
    }
}

/// Iterator returned by [`Board::enumerate_channels`].
pub struct Channels<'b, B: Binding> {
    board: &'b Board<'b, B>,
    next: ChannelIdx,
    count: u32,
}

impl<'b, B: Binding> Iterator for Channels<'b, B> {
    type Item = Result<Channel<'b, B>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.next >= self.count {
            return None;
        }
        let index = self.next;
        self.next += 1;
        Some(self.board.get_channel(index))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let left = self.count.saturating_sub(self.next) as usize;
        (left, Some(left))
    }
}

impl<'b, B: Binding> ExactSizeIterator for Channels<'b, B> {}
impl<'b, B: Binding> FusedIterator for Channels<'b, B> {}
