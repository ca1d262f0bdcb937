//! Field value codecs.
//!
//! A [`ValueCodec`] owns the wire representation of one field value type:
//! how it is encoded, decoded, and compared for change detection. Fixed-width
//! numeric codecs write raw little-endian bytes and carry no flags of their
//! own; presence flags are added by wrapping codecs such as [`Nullable`].

use bitbuf::{BitReader, BitWriter};

use crate::error::CodecResult;

/// Encodes, decodes, and compares values of one field type.
///
/// Implementations must be stateless with respect to any single value;
/// a codec is shared across every serialize/deserialize call of a schema.
pub trait ValueCodec<V>: Send + Sync {
    /// Encodes a value at the writer's current bit position.
    fn encode(&self, writer: &mut BitWriter, value: &V) -> CodecResult<()>;

    /// Decodes a value from the reader's current bit position.
    fn decode(&self, reader: &mut BitReader<'_>) -> CodecResult<V>;

    /// Returns `true` if the two values would encode identically.
    ///
    /// Used for change detection during differential encoding.
    fn value_eq(&self, a: &V, b: &V) -> bool;

    /// Worst-case encoded size in bits, or `None` when unbounded.
    fn max_bits(&self) -> Option<usize>;
}

macro_rules! int_codec {
    ($(#[$meta:meta])* $name:ident, $ty:ty) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
        pub struct $name;

        impl ValueCodec<$ty> for $name {
            fn encode(&self, writer: &mut BitWriter, value: &$ty) -> CodecResult<()> {
                writer.write_bytes(&value.to_le_bytes())?;
                Ok(())
            }

            fn decode(&self, reader: &mut BitReader<'_>) -> CodecResult<$ty> {
                Ok(<$ty>::from_le_bytes(reader.read_array()?))
            }

            fn value_eq(&self, a: &$ty, b: &$ty) -> bool {
                a == b
            }

            fn max_bits(&self) -> Option<usize> {
                Some(std::mem::size_of::<$ty>() * 8)
            }
        }
    };
}

macro_rules! float_codec {
    ($(#[$meta:meta])* $name:ident, $ty:ty) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
        pub struct $name;

        impl ValueCodec<$ty> for $name {
            fn encode(&self, writer: &mut BitWriter, value: &$ty) -> CodecResult<()> {
                writer.write_bytes(&value.to_le_bytes())?;
                Ok(())
            }

            fn decode(&self, reader: &mut BitReader<'_>) -> CodecResult<$ty> {
                Ok(<$ty>::from_le_bytes(reader.read_array()?))
            }

            fn value_eq(&self, a: &$ty, b: &$ty) -> bool {
                // Bitwise, so a NaN-valued field does not resend every delta.
                a.to_bits() == b.to_bits()
            }

            fn max_bits(&self) -> Option<usize> {
                Some(std::mem::size_of::<$ty>() * 8)
            }
        }
    };
}

int_codec!(
    /// Codec for `u8`: one raw byte.
    U8Codec, u8
);
int_codec!(
    /// Codec for `i8`: one raw byte.
    I8Codec, i8
);
int_codec!(
    /// Codec for `u16`: two little-endian bytes.
    U16Codec, u16
);
int_codec!(
    /// Codec for `i16`: two little-endian bytes.
    I16Codec, i16
);
int_codec!(
    /// Codec for `u32`: four little-endian bytes.
    U32Codec, u32
);
int_codec!(
    /// Codec for `i32`: four little-endian bytes.
    I32Codec, i32
);
int_codec!(
    /// Codec for `u64`: eight little-endian bytes.
    U64Codec, u64
);
int_codec!(
    /// Codec for `i64`: eight little-endian bytes.
    I64Codec, i64
);
float_codec!(
    /// Codec for `f32`: four little-endian bytes (IEEE 754).
    F32Codec, f32
);
float_codec!(
    /// Codec for `f64`: eight little-endian bytes (IEEE 754).
    F64Codec, f64
);

/// Codec for `bool`: one byte, zero or one.
///
/// Decode accepts any nonzero byte as `true`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BoolCodec;

impl ValueCodec<bool> for BoolCodec {
    fn encode(&self, writer: &mut BitWriter, value: &bool) -> CodecResult<()> {
        writer.write_byte(u8::from(*value))?;
        Ok(())
    }

    fn decode(&self, reader: &mut BitReader<'_>) -> CodecResult<bool> {
        Ok(reader.read_byte()? != 0)
    }

    fn value_eq(&self, a: &bool, b: &bool) -> bool {
        a == b
    }

    fn max_bits(&self) -> Option<usize> {
        Some(8)
    }
}

/// Wraps an inner codec to make its value optional.
///
/// Writes a single null-flag bit; the inner value follows only when the
/// flag is clear. Two `None`s are equal, `None` never equals `Some`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Nullable<C> {
    inner: C,
}

impl<C> Nullable<C> {
    /// Wraps an inner codec.
    #[must_use]
    pub const fn new(inner: C) -> Self {
        Self { inner }
    }
}

impl<V, C: ValueCodec<V>> ValueCodec<Option<V>> for Nullable<C> {
    fn encode(&self, writer: &mut BitWriter, value: &Option<V>) -> CodecResult<()> {
        match value {
            None => writer.write_bit(true)?,
            Some(inner) => {
                writer.write_bit(false)?;
                self.inner.encode(writer, inner)?;
            }
        }
        Ok(())
    }

    fn decode(&self, reader: &mut BitReader<'_>) -> CodecResult<Option<V>> {
        if reader.read_bit()? {
            Ok(None)
        } else {
            Ok(Some(self.inner.decode(reader)?))
        }
    }

    fn value_eq(&self, a: &Option<V>, b: &Option<V>) -> bool {
        match (a, b) {
            (None, None) => true,
            (Some(x), Some(y)) => self.inner.value_eq(x, y),
            _ => false,
        }
    }

    fn max_bits(&self) -> Option<usize> {
        self.inner.max_bits().map(|bits| bits + 1)
    }
}
