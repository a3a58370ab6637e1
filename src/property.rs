//! One property block inside an object's property table.
//!
//! A block is a 1- or 2-byte header followed by 1-64 data bytes. The header
//! encodes both the property number and the data length, so a table can be
//! walked one block at a time with no global index:
//!
//! - v1-3: single header byte; number in bits 0-4, length = top 3 bits + 1.
//! - v4+:  number in the low 6 bits of the first byte. If bit 7 is set a
//!   second byte's low 6 bits give the length (0 decodes as 64); otherwise
//!   bit 6 selects a length of 1 or 2.

use crate::story::StoryImage;

/// Decoded view of a single property block. Holds only addresses and sizes;
/// the data itself stays in story memory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PropertyBlock {
    pub id: u8,
    pub base_addr: usize,
    pub header_size: usize,
    pub data_len: usize,
}

impl PropertyBlock {
    /// Decode the block starting at `base_addr`. A block with id 0 is the
    /// table terminator; callers stop walking there.
    pub fn decode(story: &StoryImage, base_addr: usize) -> Result<PropertyBlock, String> {
        let size_byte = story.read_byte(base_addr)?;

        let (id, header_size, data_len) = if story.layout.version <= 3 {
            let id = size_byte & 0x1F;
            let data_len = ((size_byte >> 5) & 0x07) as usize + 1;
            (id, 1, data_len)
        } else if size_byte & 0x80 != 0 {
            // two-byte header; a stored length of 0 means 64
            let id = size_byte & 0x3F;
            let len = (story.read_byte(base_addr + 1)? & 0x3F) as usize;
            (id, 2, if len == 0 { 64 } else { len })
        } else {
            let id = size_byte & 0x3F;
            let data_len = if size_byte & 0x40 != 0 { 2 } else { 1 };
            (id, 1, data_len)
        };

        Ok(PropertyBlock {
            id,
            base_addr,
            header_size,
            data_len,
        })
    }

    pub fn data_addr(&self) -> usize {
        self.base_addr + self.header_size
    }

    /// Header plus data; the stride to the next block in the table
    pub fn total_len(&self) -> usize {
        self.header_size + self.data_len
    }

    /// The data bytes as a window into story memory, no copy
    pub fn data<'a>(&self, story: &'a StoryImage) -> Result<&'a [u8], String> {
        story.slice(self.data_addr(), self.data_len)
    }

    /// Mutable window into the data bytes; writes are visible through every
    /// other view of the image with no write-back step
    pub fn data_mut<'a>(&self, story: &'a mut StoryImage) -> Result<&'a mut [u8], String> {
        story.slice_mut(self.data_addr(), self.data_len)
    }

    /// Leading value: 1-byte data widened, anything longer read as its first word
    pub fn value_word(&self, story: &StoryImage) -> Result<u16, String> {
        if self.data_len == 1 {
            Ok(story.read_byte(self.data_addr())? as u16)
        } else {
            story.read_word(self.data_addr())
        }
    }
}
