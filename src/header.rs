use crate::story::StoryImage;

// Header field offsets from the Z-Machine standard, section 11.1. The
// constructor guarantees at least 64 bytes, so accessors index directly.
const OFF_FLAGS1: usize = 0x01;
const OFF_RELEASE: usize = 0x02;
const OFF_HIGH_MEMORY: usize = 0x04;
const OFF_INITIAL_PC: usize = 0x06;
const OFF_DICTIONARY: usize = 0x08;
const OFF_OBJECT_TABLE: usize = 0x0A;
const OFF_GLOBALS: usize = 0x0C;
const OFF_STATIC_MEMORY: usize = 0x0E;
const OFF_FLAGS2: usize = 0x10;
const OFF_SERIAL: usize = 0x12;
const OFF_ABBREV_TABLE: usize = 0x18;
const OFF_FILE_LENGTH: usize = 0x1A;
const OFF_CHECKSUM: usize = 0x1C;
const OFF_INTERPRETER_NUMBER: usize = 0x1E;
const OFF_INTERPRETER_VERSION: usize = 0x1F;
const OFF_SCREEN_HEIGHT_LINES: usize = 0x20;
const OFF_SCREEN_WIDTH_CHARS: usize = 0x21;
const OFF_SCREEN_WIDTH_UNITS: usize = 0x22;
const OFF_SCREEN_HEIGHT_UNITS: usize = 0x24;
const OFF_STANDARD_REVISION: usize = 0x32;

/// Fixed-offset header fields, read and written directly in story memory.
///
/// Everything is read-only except the four screen-dimension fields, which the
/// host sets to describe its display. The version byte itself lives on
/// [`StoryImage::version`]; it is resolved once at load and never re-read.
pub trait HeaderFields {
    fn flags1(&self) -> u8;
    fn release_number(&self) -> u16;
    fn high_memory_base(&self) -> u16;
    fn initial_pc(&self) -> u16;
    fn dictionary_addr(&self) -> u16;
    fn object_table_addr(&self) -> u16;
    fn global_variables_addr(&self) -> u16;
    fn static_memory_base(&self) -> u16;
    fn flags2(&self) -> u16;
    /// Six raw bytes at 0x12, conventionally a YYMMDD release date
    fn serial_code(&self) -> String;
    fn abbrev_table_addr(&self) -> u16;
    /// Stored raw length scaled by the version multiplier (2/4/8)
    fn file_length(&self) -> usize;
    fn checksum(&self) -> u16;
    fn interpreter_number(&self) -> u8;
    fn interpreter_version(&self) -> u8;
    fn standard_revision_number(&self) -> u16;

    fn screen_height_lines(&self) -> u8;
    fn set_screen_height_lines(&mut self, lines: u8);
    fn screen_width_chars(&self) -> u8;
    fn set_screen_width_chars(&mut self, chars: u8);
    fn screen_width_units(&self) -> u16;
    fn set_screen_width_units(&mut self, units: u16);
    fn screen_height_units(&self) -> u16;
    fn set_screen_height_units(&mut self, units: u16);
}

fn header_word(memory: &[u8], offset: usize) -> u16 {
    ((memory[offset] as u16) << 8) | memory[offset + 1] as u16
}

fn set_header_word(memory: &mut [u8], offset: usize, value: u16) {
    memory[offset] = (value >> 8) as u8;
    memory[offset + 1] = (value & 0xFF) as u8;
}

impl HeaderFields for StoryImage {
    fn flags1(&self) -> u8 {
        self.memory[OFF_FLAGS1]
    }

    fn release_number(&self) -> u16 {
        header_word(&self.memory, OFF_RELEASE)
    }

    fn high_memory_base(&self) -> u16 {
        header_word(&self.memory, OFF_HIGH_MEMORY)
    }

    fn initial_pc(&self) -> u16 {
        header_word(&self.memory, OFF_INITIAL_PC)
    }

    fn dictionary_addr(&self) -> u16 {
        header_word(&self.memory, OFF_DICTIONARY)
    }

    fn object_table_addr(&self) -> u16 {
        header_word(&self.memory, OFF_OBJECT_TABLE)
    }

    fn global_variables_addr(&self) -> u16 {
        header_word(&self.memory, OFF_GLOBALS)
    }

    fn static_memory_base(&self) -> u16 {
        header_word(&self.memory, OFF_STATIC_MEMORY)
    }

    fn flags2(&self) -> u16 {
        header_word(&self.memory, OFF_FLAGS2)
    }

    fn serial_code(&self) -> String {
        self.memory[OFF_SERIAL..OFF_SERIAL + 6]
            .iter()
            .map(|&b| b as char)
            .collect()
    }

    fn abbrev_table_addr(&self) -> u16 {
        header_word(&self.memory, OFF_ABBREV_TABLE)
    }

    fn file_length(&self) -> usize {
        header_word(&self.memory, OFF_FILE_LENGTH) as usize * self.layout.packed_multiplier
    }

    fn checksum(&self) -> u16 {
        header_word(&self.memory, OFF_CHECKSUM)
    }

    fn interpreter_number(&self) -> u8 {
        self.memory[OFF_INTERPRETER_NUMBER]
    }

    fn interpreter_version(&self) -> u8 {
        self.memory[OFF_INTERPRETER_VERSION]
    }

    fn standard_revision_number(&self) -> u16 {
        header_word(&self.memory, OFF_STANDARD_REVISION)
    }

    fn screen_height_lines(&self) -> u8 {
        self.memory[OFF_SCREEN_HEIGHT_LINES]
    }

    fn set_screen_height_lines(&mut self, lines: u8) {
        self.memory[OFF_SCREEN_HEIGHT_LINES] = lines;
    }

    fn screen_width_chars(&self) -> u8 {
        self.memory[OFF_SCREEN_WIDTH_CHARS]
    }

    fn set_screen_width_chars(&mut self, chars: u8) {
        self.memory[OFF_SCREEN_WIDTH_CHARS] = chars;
    }

    fn screen_width_units(&self) -> u16 {
        header_word(&self.memory, OFF_SCREEN_WIDTH_UNITS)
    }

    fn set_screen_width_units(&mut self, units: u16) {
        set_header_word(&mut self.memory, OFF_SCREEN_WIDTH_UNITS, units);
    }

    fn screen_height_units(&self) -> u16 {
        header_word(&self.memory, OFF_SCREEN_HEIGHT_UNITS)
    }

    fn set_screen_height_units(&mut self, units: u16) {
        set_header_word(&mut self.memory, OFF_SCREEN_HEIGHT_UNITS, units);
    }
}
