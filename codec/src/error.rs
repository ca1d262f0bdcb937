//! Error types for schema encoding/decoding.

use std::fmt;

/// Result type for codec operations.
pub type CodecResult<T> = Result<T, CodecError>;

/// Errors that can occur during snapshot/delta encoding/decoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    /// Bit buffer failure (capacity exceeded on read or write).
    Bit(bitbuf::BitError),

    /// Envelope failure.
    Wire(wire::WireError),

    /// Decoded header names a different entity than the schema expects.
    EntityIdMismatch { expected: u8, found: u8 },

    /// Key field differs between the current/previous pair of a delta, or a
    /// decoded key differs from the merge target's key.
    KeyMismatch {
        /// Name of the offending key field.
        field: String,
    },

    /// Requested key name is not among the schema's key items.
    KeyUndefined { name: String },

    /// Requested key exists but was extracted as the wrong type.
    KeyTypeMismatch { name: String },

    /// Two schema items share a name.
    DuplicateField { name: String },

    /// Encoded string exceeds the 16-bit length prefix.
    InvalidStringLength { len: usize, max: usize },

    /// Decoded string bytes are not valid UTF-8.
    InvalidUtf8 {
        /// Number of valid bytes before the first invalid sequence.
        valid_up_to: usize,
    },

    /// Collection length exceeds the decode limit.
    ListTooLong { len: usize, max: usize },

    /// No codec is registered for a member type.
    UnsupportedType { type_name: &'static str },

    /// Decoded discriminant does not name an enum member.
    InvalidEnumValue { raw: i64 },

    /// Decoded millisecond offset is outside the representable range.
    InvalidTimestamp { millis: i64 },

    /// Decoded day offset is outside the representable range.
    InvalidDate { days: i32 },

    /// Decoded decimal has an invalid scale.
    InvalidDecimal { scale: u32 },
}

impl fmt::Display for CodecError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bit(e) => write!(f, "bit buffer error: {e}"),
            Self::Wire(e) => write!(f, "wire error: {e}"),
            Self::EntityIdMismatch { expected, found } => {
                write!(f, "entity id mismatch: expected {expected}, found {found}")
            }
            Self::KeyMismatch { field } => {
                write!(f, "key field '{field}' differs between entity versions")
            }
            Self::KeyUndefined { name } => {
                write!(f, "no key field named '{name}' in schema")
            }
            Self::KeyTypeMismatch { name } => {
                write!(f, "key field '{name}' has a different type than requested")
            }
            Self::DuplicateField { name } => {
                write!(f, "duplicate field name '{name}' in schema")
            }
            Self::InvalidStringLength { len, max } => {
                write!(f, "string of {len} bytes exceeds the {max}-byte limit")
            }
            Self::InvalidUtf8 { valid_up_to } => {
                write!(f, "string bytes are not valid UTF-8 after {valid_up_to} bytes")
            }
            Self::ListTooLong { len, max } => {
                write!(f, "collection of {len} elements exceeds the {max}-element limit")
            }
            Self::UnsupportedType { type_name } => {
                write!(f, "no codec registered for type {type_name}")
            }
            Self::InvalidEnumValue { raw } => {
                write!(f, "value {raw} does not name an enum member")
            }
            Self::InvalidTimestamp { millis } => {
                write!(f, "millisecond offset {millis} is out of range")
            }
            Self::InvalidDate { days } => {
                write!(f, "day offset {days} is out of range")
            }
            Self::InvalidDecimal { scale } => {
                write!(f, "decimal scale {scale} exceeds the maximum of 28")
            }
        }
    }
}

impl std::error::Error for CodecError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Bit(e) => Some(e),
            Self::Wire(e) => Some(e),
            _ => None,
        }
    }
}

impl From<bitbuf::BitError> for CodecError {
    fn from(err: bitbuf::BitError) -> Self {
        Self::Bit(err)
    }
}

impl From<wire::WireError> for CodecError {
    fn from(err: wire::WireError) -> Self {
        Self::Wire(err)
    }
}
