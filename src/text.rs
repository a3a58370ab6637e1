//! Z-string codec: packed 16-bit word sequences to and from display strings.
//!
//! Each word carries three 5-bit Z-characters; bit 15 marks the final word of
//! a string. Characters 1-3 reference the abbreviation tables, 4-5 shift the
//! alphabet for the next character, and 6+ index the current alphabet.

use bitreader::BitReader;
use log::{debug, trace};

pub const ALPHABET_A0: &[u8] = b"abcdefghijklmnopqrstuvwxyz";
const ALPHABET_A1: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ";
// index 0 is the ZSCII escape, handled before table lookup
const ALPHABET_A2: &[u8] = b" \n0123456789.,!?_#'\"/\\-:()";

/// Z-characters 4 and 5 shift to A1/A2 for the following character
const SHIFT_A1: u8 = 4;
const SHIFT_A2: u8 = 5;

/// Decode a Z-string from memory starting at the given byte address.
/// Returns the decoded string and the number of bytes consumed.
pub fn decode_string(
    memory: &[u8],
    addr: usize,
    abbrev_table_addr: usize,
) -> Result<(String, usize), String> {
    decode_string_at_depth(memory, addr, abbrev_table_addr, 0)
}

fn decode_string_at_depth(
    memory: &[u8],
    addr: usize,
    abbrev_table_addr: usize,
    depth: u8,
) -> Result<(String, usize), String> {
    if depth > 3 {
        debug!("Abbreviation recursion depth {depth} exceeded at addr {addr:04x}");
        return Err("Abbreviation recursion too deep".to_string());
    }

    // Collect all Z-characters up to the end-bit word first
    let mut zchars = Vec::new();
    let mut offset = addr;
    loop {
        if offset + 1 >= memory.len() {
            return Err(format!(
                "Z-string at {addr:#06x} runs past end of memory (size {:#06x})",
                memory.len()
            ));
        }
        let mut reader = BitReader::new(&memory[offset..offset + 2]);
        let is_end = reader.read_u8(1).map_err(|e| e.to_string())? == 1;
        for _ in 0..3 {
            zchars.push(reader.read_u8(5).map_err(|e| e.to_string())?);
        }
        offset += 2;
        trace!("Z-word at {:04x}, is_end={}", offset - 2, is_end);
        if is_end {
            break;
        }
    }

    // Interpret them
    let mut result = String::new();
    let mut alphabet = 0usize;
    let mut i = 0;
    while i < zchars.len() {
        let zc = zchars[i];
        i += 1;
        match zc {
            0 => result.push(' '),
            1..=3 => {
                // abbreviation: this char picks the table, the next the slot
                if i >= zchars.len() {
                    break; // abbreviation cut off by end of string
                }
                let slot = zchars[i];
                i += 1;
                let entry_addr = abbrev_table_addr + ((zc as usize - 1) * 32 + slot as usize) * 2;
                if entry_addr + 1 >= memory.len() {
                    return Err(format!(
                        "Abbreviation entry {entry_addr:#06x} past end of memory"
                    ));
                }
                // the table stores word addresses
                let word_addr =
                    (((memory[entry_addr] as usize) << 8) | memory[entry_addr + 1] as usize) * 2;
                let (expansion, _) =
                    decode_string_at_depth(memory, word_addr, abbrev_table_addr, depth + 1)?;
                result.push_str(&expansion);
                alphabet = 0;
            }
            SHIFT_A1 => alphabet = 1,
            SHIFT_A2 => alphabet = 2,
            6 if alphabet == 2 => {
                // 10-bit ZSCII escape: next two chars hold the code
                if i + 1 >= zchars.len() {
                    break;
                }
                let code = ((zchars[i] as u32) << 5) | zchars[i + 1] as u32;
                i += 2;
                if let Some(ch) = char::from_u32(code) {
                    result.push(ch);
                }
                alphabet = 0;
            }
            _ => {
                let table = match alphabet {
                    0 => ALPHABET_A0,
                    1 => ALPHABET_A1,
                    _ => ALPHABET_A2,
                };
                result.push(table[(zc - 6) as usize] as char);
                alphabet = 0;
            }
        }
    }

    Ok((result, offset - addr))
}

/// Encode a word into packed dictionary key words.
///
/// `key_chars` is the dictionary truncation length (6 for v1-2, 9 for v3+);
/// the result is always `key_chars / 3` words with the end bit set on the
/// last. Characters outside a-z encode as the pad character, so two long
/// words sharing a truncated prefix produce identical keys.
pub fn encode_word(word: &str, key_chars: usize) -> Vec<u16> {
    let mut zchars = Vec::with_capacity(key_chars);
    for ch in word.chars().take(key_chars) {
        let ch = ch.to_ascii_lowercase();
        let code = match ch {
            'a'..='z' => ch as u8 - b'a' + 6,
            _ => SHIFT_A2, // pad for unencodable characters
        };
        zchars.push(code);
    }
    while zchars.len() < key_chars {
        zchars.push(SHIFT_A2); // pad
    }

    let mut words: Vec<u16> = zchars
        .chunks(3)
        .map(|c| ((c[0] as u16) << 10) | ((c[1] as u16) << 5) | c[2] as u16)
        .collect();
    if let Some(last) = words.last_mut() {
        *last |= 0x8000;
    }
    words
}
