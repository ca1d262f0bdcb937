//! Schema-driven snapshot and delta encoding/decoding.
//!
//! This is the main codec crate: it ties together `bitbuf` and `wire` to
//! convert typed entities into compact, bit-packed byte streams and back,
//! in full-snapshot or differential form. Deltas carry only the fields that
//! changed between two versions of an entity, which keeps high-frequency
//! update streams (market-data ticks and the like) small when most fields
//! repeat.
//!
//! # Building a schema
//!
//! Schemas are registered declaratively, never derived by reflection. Each
//! field binds a name, a codec, and a getter/setter pair:
//!
//! ```
//! use codec::{Schema, U8Codec, F64Codec};
//!
//! #[derive(Debug, Default, Clone, PartialEq)]
//! struct Quote {
//!     instrument: u8,
//!     bid: f64,
//!     ask: f64,
//! }
//!
//! let schema = Schema::<Quote>::builder(1)
//!     .key("instrument", U8Codec, |q: &Quote| q.instrument, |q, v| q.instrument = v)
//!     .field("bid", F64Codec, |q: &Quote| q.bid, |q, v| q.bid = v)
//!     .field("ask", F64Codec, |q: &Quote| q.ask, |q, v| q.ask = v)
//!     .build()
//!     .unwrap();
//!
//! let previous = Quote { instrument: 3, bid: 101.25, ask: 101.50 };
//! let current = Quote { instrument: 3, bid: 101.25, ask: 101.75 };
//!
//! let snapshot = schema.encode_snapshot(&current).unwrap();
//! assert_eq!(schema.decode_snapshot(&snapshot).unwrap(), current);
//!
//! // Only the ask moved, so the delta is strictly smaller.
//! let delta = schema.encode_delta(&current, &previous).unwrap();
//! assert!(delta.len() < snapshot.len());
//!
//! let mut replica = previous.clone();
//! schema.apply_delta(&delta, &mut replica).unwrap();
//! assert_eq!(replica, current);
//! ```
//!
//! # Design Principles
//!
//! - **Correctness first** - Invariants are documented and tested; malformed
//!   input fails with structured errors, never panics.
//! - **Schemas are plans, not state** - A [`Schema`] is immutable after
//!   `build()` and safe to share; every call owns its buffer.
//! - **Closed item set** - Exactly three field shapes exist: scalar, nested,
//!   and collection.

mod decimal;
mod enums;
mod error;
mod item;
mod limits;
mod list;
mod nested;
mod registry;
mod schema;
mod text;
mod time;
mod value;

pub use decimal::DecimalCodec;
pub use enums::{ByteEnumCodec, IntEnumCodec};
pub use error::{CodecError, CodecResult};
pub use limits::{DEFAULT_BUFFER_BYTES, MAX_LIST_ELEMENTS, MAX_STRING_BYTES};
pub use registry::CodecRegistry;
pub use schema::{Schema, SchemaBuilder};
pub use text::StringCodec;
pub use time::{DateCodec, DateTimeCodec};
pub use value::{
    BoolCodec, F32Codec, F64Codec, I16Codec, I32Codec, I64Codec, I8Codec, Nullable, U16Codec,
    U32Codec, U64Codec, U8Codec, ValueCodec,
};

pub use bitbuf::{BitReader, BitWriter, Bookmark};
pub use wire::Header;

/// Reads the one-byte stream header without decoding the entity.
pub fn read_header(bytes: &[u8]) -> CodecResult<Header> {
    let mut reader = BitReader::new(bytes);
    Ok(Header::decode(&mut reader)?)
}
