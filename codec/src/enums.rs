//! Enum field codecs.
//!
//! Enums travel as their integer discriminant: one byte for enums with at
//! most 256 members, four bytes otherwise. Conversion runs through a plain
//! `to_raw`/`from_raw` function pair supplied at registration; an unknown
//! discriminant fails decoding with [`CodecError::InvalidEnumValue`].

use bitbuf::{BitReader, BitWriter};

use crate::error::{CodecError, CodecResult};
use crate::value::ValueCodec;

/// Codec for enums with at most 256 members, wrapping the byte codec.
#[derive(Debug, Clone, Copy)]
pub struct ByteEnumCodec<E> {
    to_raw: fn(&E) -> u8,
    from_raw: fn(u8) -> Option<E>,
}

impl<E> ByteEnumCodec<E> {
    /// Creates a codec from a discriminant conversion pair.
    #[must_use]
    pub const fn new(to_raw: fn(&E) -> u8, from_raw: fn(u8) -> Option<E>) -> Self {
        Self { to_raw, from_raw }
    }
}

impl<E> ValueCodec<E> for ByteEnumCodec<E> {
    fn encode(&self, writer: &mut BitWriter, value: &E) -> CodecResult<()> {
        writer.write_byte((self.to_raw)(value))?;
        Ok(())
    }

    fn decode(&self, reader: &mut BitReader<'_>) -> CodecResult<E> {
        let raw = reader.read_byte()?;
        (self.from_raw)(raw).ok_or(CodecError::InvalidEnumValue {
            raw: i64::from(raw),
        })
    }

    fn value_eq(&self, a: &E, b: &E) -> bool {
        (self.to_raw)(a) == (self.to_raw)(b)
    }

    fn max_bits(&self) -> Option<usize> {
        Some(8)
    }
}

/// Codec for larger enums, wrapping the 32-bit integer codec.
#[derive(Debug, Clone, Copy)]
pub struct IntEnumCodec<E> {
    to_raw: fn(&E) -> i32,
    from_raw: fn(i32) -> Option<E>,
}

impl<E> IntEnumCodec<E> {
    /// Creates a codec from a discriminant conversion pair.
    #[must_use]
    pub const fn new(to_raw: fn(&E) -> i32, from_raw: fn(i32) -> Option<E>) -> Self {
        Self { to_raw, from_raw }
    }
}

impl<E> ValueCodec<E> for IntEnumCodec<E> {
    fn encode(&self, writer: &mut BitWriter, value: &E) -> CodecResult<()> {
        writer.write_bytes(&(self.to_raw)(value).to_le_bytes())?;
        Ok(())
    }

    fn decode(&self, reader: &mut BitReader<'_>) -> CodecResult<E> {
        let raw = i32::from_le_bytes(reader.read_array()?);
        (self.from_raw)(raw).ok_or(CodecError::InvalidEnumValue {
            raw: i64::from(raw),
        })
    }

    fn value_eq(&self, a: &E, b: &E) -> bool {
        (self.to_raw)(a) == (self.to_raw)(b)
    }

    fn max_bits(&self) -> Option<usize> {
        Some(32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Side {
        Bid,
        Ask,
    }

    impl Side {
        fn to_raw(&self) -> u8 {
            match self {
                Self::Bid => 0,
                Self::Ask => 1,
            }
        }

        fn from_raw(raw: u8) -> Option<Self> {
            match raw {
                0 => Some(Self::Bid),
                1 => Some(Self::Ask),
                _ => None,
            }
        }
    }

    fn side_codec() -> ByteEnumCodec<Side> {
        ByteEnumCodec::new(Side::to_raw, Side::from_raw)
    }

    #[test]
    fn byte_enum_roundtrip() {
        let codec = side_codec();
        for side in [Side::Bid, Side::Ask] {
            let mut writer = BitWriter::new(1);
            codec.encode(&mut writer, &side).unwrap();
            let bytes = writer.finish();
            let mut reader = BitReader::new(&bytes);
            assert_eq!(codec.decode(&mut reader).unwrap(), side);
        }
    }

    #[test]
    fn byte_enum_unknown_discriminant_rejected() {
        let codec = side_codec();
        let mut reader = BitReader::new(&[7]);
        let err = codec.decode(&mut reader).unwrap_err();
        assert!(matches!(err, CodecError::InvalidEnumValue { raw: 7 }));
    }

    #[test]
    fn byte_enum_equality_compares_discriminants() {
        let codec = side_codec();
        assert!(codec.value_eq(&Side::Bid, &Side::Bid));
        assert!(!codec.value_eq(&Side::Bid, &Side::Ask));
    }

    #[test]
    fn int_enum_roundtrip() {
        let codec = IntEnumCodec::<i32>::new(|v| *v, Some);
        let mut writer = BitWriter::new(4);
        codec.encode(&mut writer, &-40_000).unwrap();
        let bytes = writer.finish();
        assert_eq!(bytes.len(), 4);
        let mut reader = BitReader::new(&bytes);
        assert_eq!(codec.decode(&mut reader).unwrap(), -40_000);
    }
}
