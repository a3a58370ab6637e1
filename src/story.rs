use crate::header::HeaderFields;
use log::debug;
use std::fmt;

/// Size of the fixed header block at the front of every story file
pub const HEADER_SIZE: usize = 64;

/// Layout facts that differ between format versions, resolved once at load.
///
/// Hot-path decoding reads these fields instead of branching on the version
/// byte at every access.
#[derive(Debug, Clone, Copy)]
pub struct Layout {
    pub version: u8,
    /// Packed address and file length multiplier (2, 4 or 8)
    pub packed_multiplier: usize,
    /// Object entry size in bytes (9 for v1-3, 14 for v4+)
    pub object_entry_size: usize,
    /// Width of a parent/sibling/child link in bytes (1 or 2)
    pub link_width: usize,
    pub parent_offset: usize,
    pub sibling_offset: usize,
    pub child_offset: usize,
    pub property_ptr_offset: usize,
    /// Attribute field size in bytes (4 or 6)
    pub attribute_bytes: usize,
    /// Highest valid attribute number (31 or 47)
    pub max_attribute: u16,
    /// Number of entries in the property defaults table (31 or 63)
    pub max_properties: u16,
    /// Packed text words at the front of a dictionary entry (2 or 3)
    pub dictionary_text_words: usize,
    /// Characters a dictionary lookup key is truncated to (6 or 9)
    pub dictionary_key_chars: usize,
}

impl Layout {
    pub fn for_version(version: u8) -> Result<Layout, String> {
        if !(1..=8).contains(&version) {
            return Err(format!("Unsupported story file version: {version}"));
        }
        let small = version <= 3;
        Ok(Layout {
            version,
            packed_multiplier: match version {
                1..=3 => 2,
                4 | 5 => 4,
                _ => 8,
            },
            object_entry_size: if small { 9 } else { 14 },
            link_width: if small { 1 } else { 2 },
            parent_offset: if small { 4 } else { 6 },
            sibling_offset: if small { 5 } else { 8 },
            child_offset: if small { 6 } else { 10 },
            property_ptr_offset: if small { 7 } else { 12 },
            attribute_bytes: if small { 4 } else { 6 },
            max_attribute: if small { 31 } else { 47 },
            max_properties: if small { 31 } else { 63 },
            dictionary_text_words: if version <= 2 { 2 } else { 3 },
            dictionary_key_chars: if version <= 2 { 6 } else { 9 },
        })
    }
}

/// A loaded story file: the single owner of all mutable state.
///
/// Every other type in this crate is an address-plus-buffer view into this
/// memory; nothing is deep-copied. The version byte is read once here and the
/// resolved [`Layout`] is used for all later width/offset decisions.
#[derive(Debug)]
pub struct StoryImage {
    pub memory: Vec<u8>,
    pub layout: Layout,
}

impl StoryImage {
    pub fn from_bytes(memory: Vec<u8>) -> Result<StoryImage, String> {
        if memory.len() < HEADER_SIZE {
            return Err("Story file too small for header".to_string());
        }
        let layout = Layout::for_version(memory[0])?;
        debug!(
            "Loaded story image: version {}, {} bytes",
            layout.version,
            memory.len()
        );
        Ok(StoryImage { memory, layout })
    }

    pub fn version(&self) -> u8 {
        self.layout.version
    }

    pub fn len(&self) -> usize {
        self.memory.len()
    }

    pub fn is_empty(&self) -> bool {
        self.memory.is_empty()
    }

    /// Read a byte, failing fast on an out-of-range address
    pub fn read_byte(&self, addr: usize) -> Result<u8, String> {
        self.memory.get(addr).copied().ok_or_else(|| {
            format!(
                "Read past end of story image: {addr:#06x} (size {:#06x})",
                self.memory.len()
            )
        })
    }

    /// Read a word (2 bytes, big-endian)
    pub fn read_word(&self, addr: usize) -> Result<u16, String> {
        let high = self.read_byte(addr)? as u16;
        let low = self.read_byte(addr + 1)? as u16;
        Ok((high << 8) | low)
    }

    pub fn write_byte(&mut self, addr: usize, value: u8) -> Result<(), String> {
        if addr >= self.memory.len() {
            return Err(format!(
                "Write past end of story image: {addr:#06x} (size {:#06x})",
                self.memory.len()
            ));
        }
        self.memory[addr] = value;
        Ok(())
    }

    /// Write a word (2 bytes, big-endian)
    pub fn write_word(&mut self, addr: usize, value: u16) -> Result<(), String> {
        self.write_byte(addr, (value >> 8) as u8)?;
        self.write_byte(addr + 1, (value & 0xFF) as u8)
    }

    /// Borrow a window of the image without copying
    pub fn slice(&self, addr: usize, len: usize) -> Result<&[u8], String> {
        self.memory.get(addr..addr + len).ok_or_else(|| {
            format!(
                "Slice {addr:#06x}+{len} past end of story image (size {:#06x})",
                self.memory.len()
            )
        })
    }

    /// Mutably borrow a window of the image; writes land directly in story memory
    pub fn slice_mut(&mut self, addr: usize, len: usize) -> Result<&mut [u8], String> {
        let size = self.memory.len();
        self.memory
            .get_mut(addr..addr + len)
            .ok_or_else(|| format!("Slice {addr:#06x}+{len} past end of story image (size {size:#06x})"))
    }
}

impl fmt::Display for StoryImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "
Z-code version:           {}
Release number:           {}
Size of resident memory:  {:#06x}
Start PC:                 {:#06x}
Dictionary address:       {:#06x}
Object table address:     {:#06x}
Global variables address: {:#06x}
Size of dynamic memory:   {:#06x}
Serial number:            {}
Abbreviations address:    {:#06x}
File size:                {:#06x}
Checksum:                 {:#06x}
",
            self.version(),
            self.release_number(),
            self.high_memory_base(),
            self.initial_pc(),
            self.dictionary_addr(),
            self.object_table_addr(),
            self.global_variables_addr(),
            self.static_memory_base(),
            self.serial_code(),
            self.abbrev_table_addr(),
            self.file_length(),
            self.checksum(),
        )
    }
}
