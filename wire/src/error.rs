//! Error types for envelope encoding/decoding.

use std::fmt;

/// Result type for wire operations.
pub type WireResult<T> = Result<T, WireError>;

/// Errors that can occur while encoding or decoding the stream envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WireError {
    /// Entity id does not fit in the 4-bit header field.
    EntityIdOutOfRange {
        /// The rejected entity id.
        entity_id: u8,
    },

    /// Underlying bit buffer failure.
    Bit(bitbuf::BitError),
}

impl fmt::Display for WireError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EntityIdOutOfRange { entity_id } => {
                write!(
                    f,
                    "entity id {entity_id} exceeds the 4-bit header range (0-15)"
                )
            }
            Self::Bit(e) => write!(f, "bit buffer error: {e}"),
        }
    }
}

impl std::error::Error for WireError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Bit(e) => Some(e),
            Self::EntityIdOutOfRange { .. } => None,
        }
    }
}

impl From<bitbuf::BitError> for WireError {
    fn from(err: bitbuf::BitError) -> Self {
        Self::Bit(err)
    }
}
