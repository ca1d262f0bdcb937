//! Stream header encoding.

use bitbuf::{BitReader, BitWriter};

use crate::error::{WireError, WireResult};

/// Largest entity id representable in the 4-bit header field.
pub const MAX_ENTITY_ID: u8 = 0x0F;

/// Header bit marking a full snapshot (as opposed to a delta).
pub const SNAPSHOT_FLAG: u8 = 0x80;

/// Header size in bytes.
pub const HEADER_SIZE: usize = 1;

/// The one-byte stream envelope.
///
/// Layout: bit 7 = snapshot flag, bits 6-4 reserved (written as zero,
/// ignored on decode), bits 3-0 = entity id. Entity ids above
/// [`MAX_ENTITY_ID`] are rejected at encode time; decode masks the low
/// nibble and performs no further validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Header {
    /// Identifies which schema the stream was produced with (0-15).
    pub entity_id: u8,
    /// `true` for a full snapshot, `false` for a delta.
    pub snapshot: bool,
}

impl Header {
    /// Creates a snapshot header.
    #[must_use]
    pub const fn snapshot(entity_id: u8) -> Self {
        Self {
            entity_id,
            snapshot: true,
        }
    }

    /// Creates a delta header.
    #[must_use]
    pub const fn delta(entity_id: u8) -> Self {
        Self {
            entity_id,
            snapshot: false,
        }
    }

    /// Encodes the header as a single byte.
    ///
    /// # Errors
    ///
    /// Returns [`WireError::EntityIdOutOfRange`] before writing anything if
    /// the entity id does not fit in 4 bits.
    pub fn encode(&self, writer: &mut BitWriter) -> WireResult<()> {
        if self.entity_id > MAX_ENTITY_ID {
            return Err(WireError::EntityIdOutOfRange {
                entity_id: self.entity_id,
            });
        }
        let byte = self.entity_id | if self.snapshot { SNAPSHOT_FLAG } else { 0 };
        writer.write_byte(byte)?;
        Ok(())
    }

    /// Decodes a header from the next byte of the reader.
    ///
    /// Reserved bits 6-4 are ignored; the entity id is the masked low
    /// nibble and is always in range.
    pub fn decode(reader: &mut BitReader<'_>) -> WireResult<Self> {
        let byte = reader.read_byte()?;
        Ok(Self {
            entity_id: byte & MAX_ENTITY_ID,
            snapshot: byte & SNAPSHOT_FLAG != 0,
        })
    }
}
