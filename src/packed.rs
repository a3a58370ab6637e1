//! Packed address expansion.
//!
//! Routine and string references in a story file are stored as 16-bit packed
//! addresses; the byte address is the packed value scaled by a version
//! multiplier. The v6/7 routine/string offset words are not modeled here;
//! those versions expand with the plain multiplier.

/// Packed address multiplier for a story file version (2, 4 or 8).
///
/// Also scales the raw stored file length. Passing a version outside 1-8 is a
/// caller contract violation; it resolves as the v6+ multiplier.
pub fn multiplier(version: u8) -> usize {
    match version {
        1..=3 => 2,
        4 | 5 => 4,
        _ => 8,
    }
}

/// Expand a packed 16-bit reference into a byte address
pub fn unpack(bits: u16, version: u8) -> usize {
    bits as usize * multiplier(version)
}
