//! Error types for bit buffer operations.

use std::fmt;

/// Result type for bit buffer operations.
pub type BitResult<T> = Result<T, BitError>;

/// Errors that can occur during bit-level encoding/decoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BitError {
    /// An operation would touch bits past the end of the buffer.
    ///
    /// Buffers never grow; a writer or reader that returns this error must
    /// not be reused.
    CapacityExceeded {
        /// Number of bits the operation needed.
        requested_bits: usize,
        /// Number of bits left in the buffer.
        available_bits: usize,
    },
}

impl fmt::Display for BitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CapacityExceeded {
                requested_bits,
                available_bits,
            } => {
                write!(
                    f,
                    "buffer capacity exceeded: needed {requested_bits} bits, {available_bits} bits available"
                )
            }
        }
    }
}

impl std::error::Error for BitError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_capacity_exceeded() {
        let err = BitError::CapacityExceeded {
            requested_bits: 8,
            available_bits: 3,
        };
        let msg = err.to_string();
        assert!(msg.contains("8 bits"), "should mention requested bits");
        assert!(msg.contains("3 bits"), "should mention available bits");
    }

    #[test]
    fn error_equality() {
        let err1 = BitError::CapacityExceeded {
            requested_bits: 8,
            available_bits: 3,
        };
        let err2 = BitError::CapacityExceeded {
            requested_bits: 8,
            available_bits: 3,
        };
        let err3 = BitError::CapacityExceeded {
            requested_bits: 8,
            available_bits: 4,
        };
        assert_eq!(err1, err2);
        assert_ne!(err1, err3);
    }

    #[test]
    fn error_is_std_error() {
        fn assert_error<E: std::error::Error>() {}
        assert_error::<BitError>();
    }
}
