//! Bit-level reader with bounded operations.

use crate::error::{BitError, BitResult};

/// A saved read position that can be restored on the reader it came from.
///
/// Bookmarks enable non-destructive lookahead: take a bookmark, read ahead,
/// then call [`BitReader::restore`]. A bookmark is a plain value and must not
/// be applied to a reader over a different buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bookmark {
    byte_pos: usize,
    bit_pos: u8,
}

/// A bit-level reader for decoding packed binary data.
///
/// All read operations are bounds-checked and return errors on malformed or
/// truncated input; the reader never panics. Bits are addressed MSB-first,
/// mirroring [`BitWriter`](crate::BitWriter).
#[derive(Debug)]
pub struct BitReader<'a> {
    data: &'a [u8],
    /// Index of the byte currently being read.
    byte_pos: usize,
    /// Number of bits already consumed from `data[byte_pos]` (0-7).
    bit_pos: u8,
}

impl<'a> BitReader<'a> {
    /// Creates a reader over a byte slice.
    #[must_use]
    pub const fn new(data: &'a [u8]) -> Self {
        Self {
            data,
            byte_pos: 0,
            bit_pos: 0,
        }
    }

    /// Returns the number of bits remaining to read.
    #[must_use]
    pub const fn bits_remaining(&self) -> usize {
        self.data.len() * 8 - (self.byte_pos * 8 + self.bit_pos as usize)
    }

    /// Returns `true` if there are no more bits to read.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.bits_remaining() == 0
    }

    /// Returns the number of bytes touched so far, counting a partially
    /// consumed byte as one.
    #[must_use]
    pub const fn bytes_read(&self) -> usize {
        self.byte_pos + (self.bit_pos > 0) as usize
    }

    /// Saves the current read position.
    #[must_use]
    pub const fn bookmark(&self) -> Bookmark {
        Bookmark {
            byte_pos: self.byte_pos,
            bit_pos: self.bit_pos,
        }
    }

    /// Restores a position previously saved with [`bookmark`](Self::bookmark).
    pub fn restore(&mut self, mark: Bookmark) {
        self.byte_pos = mark.byte_pos;
        self.bit_pos = mark.bit_pos;
    }

    /// Reads a single bit.
    ///
    /// # Errors
    ///
    /// Returns [`BitError::CapacityExceeded`] at the end of the buffer.
    pub fn read_bit(&mut self) -> BitResult<bool> {
        if self.byte_pos >= self.data.len() {
            return Err(BitError::CapacityExceeded {
                requested_bits: 1,
                available_bits: 0,
            });
        }
        let bit = (self.data[self.byte_pos] >> (7 - self.bit_pos)) & 1;
        self.bit_pos += 1;
        if self.bit_pos == 8 {
            self.bit_pos = 0;
            self.byte_pos += 1;
        }
        Ok(bit == 1)
    }

    /// Reads one byte at the current bit position.
    ///
    /// When the position is unaligned the byte is reassembled from the tail
    /// of the current byte and the head of the next one.
    ///
    /// # Errors
    ///
    /// Returns [`BitError::CapacityExceeded`] if fewer than 8 bits remain.
    pub fn read_byte(&mut self) -> BitResult<u8> {
        self.ensure(8)?;
        let value = if self.bit_pos == 0 {
            self.data[self.byte_pos]
        } else {
            (self.data[self.byte_pos] << self.bit_pos)
                | (self.data[self.byte_pos + 1] >> (8 - self.bit_pos))
        };
        self.byte_pos += 1;
        Ok(value)
    }

    /// Reads `count` bytes at the current bit position.
    ///
    /// # Errors
    ///
    /// Returns [`BitError::CapacityExceeded`] if fewer than `count * 8` bits
    /// remain; no bits are consumed in that case.
    pub fn read_bytes(&mut self, count: usize) -> BitResult<Vec<u8>> {
        self.ensure(count * 8)?;
        if self.bit_pos == 0 {
            let out = self.data[self.byte_pos..self.byte_pos + count].to_vec();
            self.byte_pos += count;
            return Ok(out);
        }
        let mut out = Vec::with_capacity(count);
        for _ in 0..count {
            let value = (self.data[self.byte_pos] << self.bit_pos)
                | (self.data[self.byte_pos + 1] >> (8 - self.bit_pos));
            out.push(value);
            self.byte_pos += 1;
        }
        Ok(out)
    }

    /// Reads `N` bytes into a fixed-size array.
    ///
    /// # Errors
    ///
    /// Returns [`BitError::CapacityExceeded`] if fewer than `N * 8` bits
    /// remain.
    pub fn read_array<const N: usize>(&mut self) -> BitResult<[u8; N]> {
        self.ensure(N * 8)?;
        let mut out = [0u8; N];
        if self.bit_pos == 0 {
            out.copy_from_slice(&self.data[self.byte_pos..self.byte_pos + N]);
            self.byte_pos += N;
        } else {
            for slot in &mut out {
                *slot = (self.data[self.byte_pos] << self.bit_pos)
                    | (self.data[self.byte_pos + 1] >> (8 - self.bit_pos));
                self.byte_pos += 1;
            }
        }
        Ok(out)
    }

    fn ensure(&self, bits: usize) -> BitResult<()> {
        let available = self.bits_remaining();
        if bits > available {
            return Err(BitError::CapacityExceeded {
                requested_bits: bits,
                available_bits: available,
            });
        }
        Ok(())
    }
}
