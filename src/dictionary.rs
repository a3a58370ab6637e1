//! The story dictionary: separators plus a fixed-stride table of encoded
//! words, decoded once at load.
//!
//! Block layout: `[separator count][separator chars][entry length]
//! [entry count: 2 bytes][entries...]`. Each entry starts with 2 (v1-2) or 3
//! (v3+) packed text words; the rest of the entry is parser data this layer
//! does not interpret. Word order matches the file, which is what makes the
//! index-to-address arithmetic valid.

use crate::header::HeaderFields;
use crate::story::StoryImage;
use crate::text;
use log::debug;
use std::fmt;

pub struct Dictionary {
    separators: Vec<char>,
    words: Vec<String>,
    entry_length: usize,
    entry_count: usize,
    entry_base_addr: usize,
    /// Lookup keys are truncated to this many characters (6 or 9)
    key_chars: usize,
}

impl Dictionary {
    /// Read the dictionary block the header points at and decode every entry
    pub fn load(story: &StoryImage) -> Result<Dictionary, String> {
        let mut addr = story.dictionary_addr() as usize;

        let separator_count = story.read_byte(addr)? as usize;
        addr += 1;
        let separators = story
            .slice(addr, separator_count)?
            .iter()
            .map(|&b| b as char)
            .collect();
        addr += separator_count;

        let entry_length = story.read_byte(addr)? as usize;
        addr += 1;
        let entry_count = story.read_word(addr)? as usize;
        addr += 2;
        let entry_base_addr = addr;

        let text_words = story.layout.dictionary_text_words;
        if entry_length < text_words * 2 {
            return Err(format!(
                "Dictionary entry length {entry_length} too small for {text_words} text words"
            ));
        }
        // fail fast if the table overruns the image
        story.slice(entry_base_addr, entry_count * entry_length)?;

        let mut words = Vec::with_capacity(entry_count);
        for n in 0..entry_count {
            let entry_addr = entry_base_addr + n * entry_length;
            let (word, _) = text::decode_string(&story.memory, entry_addr, 0)?;
            words.push(word);
        }

        debug!(
            "Loaded dictionary: {} entries of {} bytes, {} separators",
            entry_count, entry_length, separator_count
        );

        Ok(Dictionary {
            separators,
            words,
            entry_length,
            entry_count,
            entry_base_addr,
            key_chars: story.layout.dictionary_key_chars,
        })
    }

    /// Word-break characters for the tokenizer
    pub fn separators(&self) -> &[char] {
        &self.separators
    }

    /// Decoded entries in on-disk order
    pub fn words(&self) -> &[String] {
        &self.words
    }

    pub fn entry_length(&self) -> usize {
        self.entry_length
    }

    pub fn entry_count(&self) -> usize {
        self.entry_count
    }

    pub fn entry_base_addr(&self) -> usize {
        self.entry_base_addr
    }

    /// Index of a word after truncation to the version's key length.
    ///
    /// Two long words sharing a truncated prefix are indistinguishable; that
    /// matches the format's own lookup semantics.
    pub fn index_of(&self, word: &str) -> Option<usize> {
        let key: String = word.chars().take(self.key_chars).collect();
        self.words.iter().position(|w| *w == key)
    }

    /// Byte address of a word's entry. A miss is an explicit error; the
    /// arithmetic on a not-found index would produce a plausible-looking but
    /// bogus address.
    pub fn address_of(&self, word: &str) -> Result<usize, String> {
        match self.index_of(word) {
            Some(index) => Ok(index * self.entry_length + self.entry_base_addr),
            None => Err(format!("Word '{word}' is not in the dictionary")),
        }
    }
}

impl fmt::Display for Dictionary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Dictionary: {} entries of {} bytes at {:#06x}",
            self.entry_count, self.entry_length, self.entry_base_addr
        )?;
        writeln!(
            f,
            "Separators: {:?}",
            self.separators.iter().collect::<String>()
        )?;
        for (n, word) in self.words.iter().enumerate() {
            writeln!(f, "[{}] \"{}\"", n + 1, word)?;
        }
        Ok(())
    }
}
