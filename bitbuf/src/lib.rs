//! Fixed-capacity bit-addressable buffers for the tickdelta codec.
//!
//! This crate provides [`BitWriter`] and [`BitReader`] for bit-level encoding
//! and decoding over byte arrays, plus [`Bookmark`] for non-destructive
//! read lookahead. It is designed for bounded, panic-free operation with
//! explicit error handling.
//!
//! # Design Principles
//!
//! - **No unsafe code** - Safety is paramount.
//! - **Fixed capacity** - Buffers never grow; overruns are explicit errors.
//! - **No domain knowledge** - This crate knows nothing about schemas,
//!   entities, or field layouts.
//! - **MSB-first** - Bit 0 of every byte is its most significant bit.
//!
//! # Example
//!
//! ```
//! use bitbuf::{BitReader, BitWriter};
//!
//! let mut writer = BitWriter::new(16);
//! writer.write_bit(true).unwrap();
//! writer.write_byte(0x42).unwrap();
//!
//! let bytes = writer.finish();
//!
//! let mut reader = BitReader::new(&bytes);
//! assert!(reader.read_bit().unwrap());
//! assert_eq!(reader.read_byte().unwrap(), 0x42);
//! ```

mod error;
mod reader;
mod writer;

pub use error::{BitError, BitResult};
pub use reader::{BitReader, Bookmark};
pub use writer::BitWriter;
