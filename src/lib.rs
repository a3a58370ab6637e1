//! Story memory model for the Z-Machine story file format.
//!
//! A loaded story file is a single mutable byte buffer. Everything else in
//! this crate - header fields, the object tree, property tables, the
//! dictionary - is a view computed from addresses and object numbers inside
//! that buffer. Writes through any view land in the same buffer, so a
//! mutation is immediately visible through every other view.
//!
//! Layout details that differ between format versions (v1-3 vs v4+) are
//! resolved once at load time into a [`story::Layout`] table; field accessors
//! never re-derive them.

pub mod dictionary;
pub mod header;
pub mod output;
pub mod packed;
pub mod property;
pub mod story;
pub mod text;
pub mod zobject;

#[cfg(test)]
mod object_tests;
