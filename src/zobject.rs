//! The object tree: a forest encoded as small integer IDs in story memory.
//!
//! Objects are fixed-size entries (9 bytes in v1-3, 14 in v4+) packed after
//! the property defaults table. Parent/sibling/child links are raw object
//! numbers, 0 meaning none; an object's children are the chain reached by
//! following its child link and then sibling links until 0. Nothing here
//! validates tree shape - the insert/remove opcodes own that invariant.

use crate::header::HeaderFields;
use crate::property::PropertyBlock;
use crate::story::StoryImage;
use crate::text;
use log::debug;

/// Object number 0 is the null-link sentinel, never a real object
pub const INVALID_OBJECT: u16 = 0;

/// Displayed for objects whose short name has zero length
pub const UNNAMED_OBJECT: &str = "<unnamed>";

/// Map an attribute number to its byte offset and bit mask within the entry.
///
/// Attribute 0 is the most significant bit of the stored field, so the stored
/// bit position is (max bit - attribute). Treating the field as a big-endian
/// byte vector reproduces that mapping exactly for both the 32-bit (v1-3) and
/// 48-bit (v4+) widths.
fn attribute_slot(attr: u16) -> (usize, u8) {
    ((attr / 8) as usize, 1 << (7 - (attr % 8)))
}

pub trait ObjectSystem {
    /// Base address of an object entry; errors on object 0 or past the table
    fn object_addr(&self, obj: u16) -> Result<usize, String>;
    /// Number of objects, derived from where the first property table begins
    fn object_count(&self) -> Result<u16, String>;
    /// Every valid object number, for enumeration
    fn object_ids(&self) -> Result<std::ops::RangeInclusive<u16>, String>;

    fn parent(&self, obj: u16) -> Result<u16, String>;
    fn set_parent(&mut self, obj: u16, parent: u16) -> Result<(), String>;
    fn sibling(&self, obj: u16) -> Result<u16, String>;
    fn set_sibling(&mut self, obj: u16, sibling: u16) -> Result<(), String>;
    fn child(&self, obj: u16) -> Result<u16, String>;
    fn set_child(&mut self, obj: u16, child: u16) -> Result<(), String>;

    fn test_attribute(&self, obj: u16, attr: u16) -> Result<bool, String>;
    fn set_attribute(&mut self, obj: u16, attr: u16) -> Result<(), String>;
    fn clear_attribute(&mut self, obj: u16, attr: u16) -> Result<(), String>;
    /// Set or clear in one call
    fn put_attribute(&mut self, obj: u16, attr: u16, on: bool) -> Result<(), String>;

    /// 1- or 2-byte property value, falling back to the defaults table.
    /// A found property with any other length is an error; read such
    /// properties through [`PropertyBlock::data`] instead.
    fn property_value(&self, obj: u16, prop: u16) -> Result<u16, String>;
    /// Write an existing 1- or 2-byte property in place. Properties are never
    /// created here; the table layout is fixed at load.
    fn set_property_value(&mut self, obj: u16, prop: u16, value: u16) -> Result<(), String>;
    /// Entry from the property defaults table at the head of the object table
    fn default_property(&self, prop: u16) -> Result<u16, String>;

    fn property_table_addr(&self, obj: u16) -> Result<usize, String>;
    /// All custom property blocks, in on-disk (descending id) order
    fn properties(&self, obj: u16) -> Result<Vec<PropertyBlock>, String>;
    /// Find one custom property block, or None if the object omits it
    fn property_block(&self, obj: u16, prop: u16) -> Result<Option<PropertyBlock>, String>;

    /// Decoded short name, or the unnamed placeholder for a zero-length name
    fn short_name(&self, obj: u16) -> Result<String, String>;
}

fn read_link(story: &StoryImage, addr: usize) -> Result<u16, String> {
    if story.layout.link_width == 1 {
        Ok(story.read_byte(addr)? as u16)
    } else {
        story.read_word(addr)
    }
}

fn write_link(story: &mut StoryImage, addr: usize, value: u16) -> Result<(), String> {
    if story.layout.link_width == 1 {
        if value > 0xFF {
            return Err(format!(
                "Object number {value} too large for a 1-byte link"
            ));
        }
        story.write_byte(addr, value as u8)
    } else {
        story.write_word(addr, value)
    }
}

/// Address of the first property block: past the name-length byte and the name
fn first_property_addr(story: &StoryImage, obj: u16) -> Result<usize, String> {
    let table = story.property_table_addr(obj)?;
    let name_words = story.read_byte(table)? as usize;
    Ok(table + 1 + name_words * 2)
}

impl ObjectSystem for StoryImage {
    fn object_addr(&self, obj: u16) -> Result<usize, String> {
        if obj == INVALID_OBJECT {
            return Err("Object 0 is the null object".to_string());
        }
        let count = self.object_count()?;
        if obj > count {
            return Err(format!(
                "Invalid object number: {obj} (table has {count} objects)"
            ));
        }
        let tree_base =
            self.object_table_addr() as usize + self.layout.max_properties as usize * 2;
        Ok(tree_base + (obj - 1) as usize * self.layout.object_entry_size)
    }

    fn object_count(&self) -> Result<u16, String> {
        // The entries run up to the lowest property table, which in practice
        // is the first object's. The tree is implicit, so there is no stored
        // count to read instead.
        let tree_base =
            self.object_table_addr() as usize + self.layout.max_properties as usize * 2;
        let first_props = self.read_word(tree_base + self.layout.property_ptr_offset)? as usize;
        if first_props <= tree_base {
            return Err(format!(
                "Malformed object table: first property table at {first_props:#06x} precedes entries at {tree_base:#06x}"
            ));
        }
        Ok(((first_props - tree_base) / self.layout.object_entry_size) as u16)
    }

    fn object_ids(&self) -> Result<std::ops::RangeInclusive<u16>, String> {
        Ok(1..=self.object_count()?)
    }

    fn parent(&self, obj: u16) -> Result<u16, String> {
        let addr = self.object_addr(obj)? + self.layout.parent_offset;
        read_link(self, addr)
    }

    fn set_parent(&mut self, obj: u16, parent: u16) -> Result<(), String> {
        let addr = self.object_addr(obj)? + self.layout.parent_offset;
        write_link(self, addr, parent)
    }

    fn sibling(&self, obj: u16) -> Result<u16, String> {
        let addr = self.object_addr(obj)? + self.layout.sibling_offset;
        read_link(self, addr)
    }

    fn set_sibling(&mut self, obj: u16, sibling: u16) -> Result<(), String> {
        let addr = self.object_addr(obj)? + self.layout.sibling_offset;
        write_link(self, addr, sibling)
    }

    fn child(&self, obj: u16) -> Result<u16, String> {
        let addr = self.object_addr(obj)? + self.layout.child_offset;
        read_link(self, addr)
    }

    fn set_child(&mut self, obj: u16, child: u16) -> Result<(), String> {
        let addr = self.object_addr(obj)? + self.layout.child_offset;
        write_link(self, addr, child)
    }

    fn test_attribute(&self, obj: u16, attr: u16) -> Result<bool, String> {
        if attr > self.layout.max_attribute {
            return Err(format!(
                "Attribute {attr} out of range (max: {})",
                self.layout.max_attribute
            ));
        }
        let (byte_offset, mask) = attribute_slot(attr);
        let attr_byte = self.read_byte(self.object_addr(obj)? + byte_offset)?;
        Ok(attr_byte & mask != 0)
    }

    fn set_attribute(&mut self, obj: u16, attr: u16) -> Result<(), String> {
        if attr > self.layout.max_attribute {
            return Err(format!(
                "Attribute {attr} out of range (max: {})",
                self.layout.max_attribute
            ));
        }
        let (byte_offset, mask) = attribute_slot(attr);
        let addr = self.object_addr(obj)? + byte_offset;
        let byte = self.read_byte(addr)?;
        self.write_byte(addr, byte | mask)
    }

    fn clear_attribute(&mut self, obj: u16, attr: u16) -> Result<(), String> {
        if attr > self.layout.max_attribute {
            return Err(format!(
                "Attribute {attr} out of range (max: {})",
                self.layout.max_attribute
            ));
        }
        let (byte_offset, mask) = attribute_slot(attr);
        let addr = self.object_addr(obj)? + byte_offset;
        let byte = self.read_byte(addr)?;
        self.write_byte(addr, byte & !mask)
    }

    fn put_attribute(&mut self, obj: u16, attr: u16, on: bool) -> Result<(), String> {
        if on {
            self.set_attribute(obj, attr)
        } else {
            self.clear_attribute(obj, attr)
        }
    }

    fn property_value(&self, obj: u16, prop: u16) -> Result<u16, String> {
        if prop == 0 {
            return Err("Property number 0 is invalid".to_string());
        }
        match self.property_block(obj, prop)? {
            Some(block) => match block.data_len {
                1 => Ok(self.read_byte(block.data_addr())? as u16),
                2 => self.read_word(block.data_addr()),
                n => Err(format!(
                    "Cannot read property {prop} of object {obj} as a value: it has {n} bytes"
                )),
            },
            None => {
                let value = self.default_property(prop)?;
                debug!("Default property used for prop {prop}. Value = {value}");
                Ok(value)
            }
        }
    }

    fn set_property_value(&mut self, obj: u16, prop: u16, value: u16) -> Result<(), String> {
        if prop == 0 {
            return Err("Property number 0 is invalid".to_string());
        }
        let block = self
            .property_block(obj, prop)?
            .ok_or_else(|| format!("Object {obj} does not have property {prop}"))?;
        match block.data_len {
            1 => {
                if value > 0xFF {
                    return Err(format!("Value {value} too large for 1-byte property {prop}"));
                }
                self.write_byte(block.data_addr(), value as u8)
            }
            2 => self.write_word(block.data_addr(), value),
            n => Err(format!(
                "Cannot set property {prop} of object {obj} as a value: it has {n} bytes"
            )),
        }
    }

    fn default_property(&self, prop: u16) -> Result<u16, String> {
        if prop == 0 || prop > self.layout.max_properties {
            return Err(format!(
                "Property number {prop} out of range for defaults table (max: {})",
                self.layout.max_properties
            ));
        }
        self.read_word(self.object_table_addr() as usize + (prop - 1) as usize * 2)
    }

    fn property_table_addr(&self, obj: u16) -> Result<usize, String> {
        let addr = self.object_addr(obj)? + self.layout.property_ptr_offset;
        Ok(self.read_word(addr)? as usize)
    }

    fn properties(&self, obj: u16) -> Result<Vec<PropertyBlock>, String> {
        let mut addr = first_property_addr(self, obj)?;
        let mut blocks = Vec::new();
        loop {
            let block = PropertyBlock::decode(self, addr)?;
            if block.id == 0 {
                return Ok(blocks);
            }
            addr += block.total_len();
            blocks.push(block);
        }
    }

    fn property_block(&self, obj: u16, prop: u16) -> Result<Option<PropertyBlock>, String> {
        let mut addr = first_property_addr(self, obj)?;
        loop {
            let block = PropertyBlock::decode(self, addr)?;
            if block.id == 0 || (block.id as u16) < prop {
                // blocks are stored in descending id order
                return Ok(None);
            }
            if block.id as u16 == prop {
                return Ok(Some(block));
            }
            addr += block.total_len();
        }
    }

    fn short_name(&self, obj: u16) -> Result<String, String> {
        let table = self.property_table_addr(obj)?;
        let name_words = self.read_byte(table)? as usize;
        if name_words == 0 {
            return Ok(UNNAMED_OBJECT.to_string());
        }
        let (name, _) =
            text::decode_string(&self.memory, table + 1, self.abbrev_table_addr() as usize)?;
        Ok(name)
    }
}

/// Infodump-style description of one object, for the inspector
pub fn format_object(story: &StoryImage, obj: u16) -> Result<String, String> {
    use std::fmt::Write;

    let mut out = String::new();
    let mut attrs = Vec::new();
    for attr in 0..=story.layout.max_attribute {
        if story.test_attribute(obj, attr)? {
            attrs.push(attr.to_string());
        }
    }
    writeln!(out, "{obj}. Attributes: {}", attrs.join(", ")).unwrap();
    writeln!(
        out,
        "   Parent object: {:3}  Sibling object: {:3}  Child object: {:3}",
        story.parent(obj)?,
        story.sibling(obj)?,
        story.child(obj)?
    )
    .unwrap();
    writeln!(
        out,
        "   Property address: {:04x}",
        story.property_table_addr(obj)?
    )
    .unwrap();
    writeln!(out, "       Description: \"{}\"", story.short_name(obj)?).unwrap();
    writeln!(out, "        Properties:").unwrap();
    for block in story.properties(obj)? {
        write!(out, "            [{:2}] ", block.id).unwrap();
        for byte in block.data(story)? {
            write!(out, "{byte:02x} ").unwrap();
        }
        writeln!(out).unwrap();
    }
    Ok(out)
}
