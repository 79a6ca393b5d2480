//! Side channel for bytes the decoders could not account for.
//!
//! Firmware variants set flags nobody has mapped yet. Decoders never fail on
//! them; they record the offset and raw byte here instead.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnparsedByte {
    /// Offset from the start of the frame (sync byte is offset 0)
    pub offset: usize,
    pub raw: u8,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UndocumentedBits {
    records: Vec<UnparsedByte>,
}

impl UndocumentedBits {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, offset: usize, raw: u8) {
        tracing::trace!(offset, raw, "Undocumented bits");
        self.records.push(UnparsedByte { offset, raw });
    }

    /// Record `raw` only when it has bits set outside `known_mask`.
    pub fn record_unknown_bits(&mut self, offset: usize, raw: u8, known_mask: u8) {
        if raw & !known_mask != 0 {
            self.record(offset, raw);
        }
    }

    pub fn get(&self, offset: usize) -> Option<u8> {
        self.records.iter().find(|r| r.offset == offset).map(|r| r.raw)
    }

    pub fn records(&self) -> &[UnparsedByte] {
        &self.records
    }

    pub fn iter(&self) -> impl Iterator<Item = &UnparsedByte> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl fmt::Display for UndocumentedBits {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, record) in self.records.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "[{}]=0x{:02x}", record.offset, record.raw)?;
        }
        Ok(())
    }
}
