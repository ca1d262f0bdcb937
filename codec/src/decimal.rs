//! Decimal field codec.

use bitbuf::{BitReader, BitWriter};
use rust_decimal::Decimal;

use crate::error::{CodecError, CodecResult};
use crate::value::ValueCodec;

const SIGN_BIT: u32 = 1 << 31;
const SCALE_SHIFT: u32 = 16;
const SCALE_MASK: u32 = 0xFF;
const MAX_SCALE: u32 = 28;

/// Codec for 128-bit decimals.
///
/// Wire shape: four chained 32-bit little-endian words — `lo`, `mid`, `hi`
/// of the 96-bit magnitude, then a flags word carrying the scale in bits
/// 16-23 and the sign in bit 31. Scales above 28 are rejected on decode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DecimalCodec;

impl ValueCodec<Decimal> for DecimalCodec {
    fn encode(&self, writer: &mut BitWriter, value: &Decimal) -> CodecResult<()> {
        let mantissa = value.mantissa();
        let magnitude = mantissa.unsigned_abs();
        let lo = magnitude as u32;
        let mid = (magnitude >> 32) as u32;
        let hi = (magnitude >> 64) as u32;
        let mut flags = value.scale() << SCALE_SHIFT;
        if mantissa.is_negative() {
            flags |= SIGN_BIT;
        }
        for word in [lo, mid, hi, flags] {
            writer.write_bytes(&word.to_le_bytes())?;
        }
        Ok(())
    }

    fn decode(&self, reader: &mut BitReader<'_>) -> CodecResult<Decimal> {
        let lo = u32::from_le_bytes(reader.read_array()?);
        let mid = u32::from_le_bytes(reader.read_array()?);
        let hi = u32::from_le_bytes(reader.read_array()?);
        let flags = u32::from_le_bytes(reader.read_array()?);

        let scale = (flags >> SCALE_SHIFT) & SCALE_MASK;
        if scale > MAX_SCALE {
            return Err(CodecError::InvalidDecimal { scale });
        }
        let mut mantissa =
            i128::from(lo) | (i128::from(mid) << 32) | (i128::from(hi) << 64);
        if flags & SIGN_BIT != 0 {
            mantissa = -mantissa;
        }
        Decimal::try_from_i128_with_scale(mantissa, scale)
            .map_err(|_| CodecError::InvalidDecimal { scale })
    }

    fn value_eq(&self, a: &Decimal, b: &Decimal) -> bool {
        a == b
    }

    fn max_bits(&self) -> Option<usize> {
        Some(128)
    }
}
