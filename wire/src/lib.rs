//! Stream envelope encoding for the tickdelta codec.
//!
//! This crate handles the binary envelope: the one-byte header carrying the
//! entity id and the snapshot/delta flag. It does not know about entity
//! types — only the structure of the envelope.
//!
//! # Design Principles
//!
//! - **Stable wire format** - The layout is documented in `WIRE_FORMAT.md`
//!   and changes are breaking.
//! - **Fail fast on encode** - Out-of-range entity ids never reach the wire.
//! - **Lenient on decode** - Reserved bits are masked, not rejected.

mod error;
mod header;

pub use error::{WireError, WireResult};
pub use header::{Header, HEADER_SIZE, MAX_ENTITY_ID, SNAPSHOT_FLAG};
