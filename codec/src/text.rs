//! String field codec.

use bitbuf::{BitReader, BitWriter};

use crate::error::{CodecError, CodecResult};
use crate::limits::MAX_STRING_BYTES;
use crate::value::ValueCodec;

/// Codec for optional UTF-8 strings.
///
/// Wire shape: null flag bit, then a 16-bit little-endian byte length, then
/// the raw UTF-8 bytes. Strings are reference-like values and carry their
/// own null flag, so the value type is `Option<String>`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StringCodec;

impl ValueCodec<Option<String>> for StringCodec {
    fn encode(&self, writer: &mut BitWriter, value: &Option<String>) -> CodecResult<()> {
        let Some(text) = value else {
            writer.write_bit(true)?;
            return Ok(());
        };
        writer.write_bit(false)?;
        let bytes = text.as_bytes();
        if bytes.len() > MAX_STRING_BYTES {
            return Err(CodecError::InvalidStringLength {
                len: bytes.len(),
                max: MAX_STRING_BYTES,
            });
        }
        writer.write_bytes(&(bytes.len() as u16).to_le_bytes())?;
        writer.write_bytes(bytes)?;
        Ok(())
    }

    fn decode(&self, reader: &mut BitReader<'_>) -> CodecResult<Option<String>> {
        if reader.read_bit()? {
            return Ok(None);
        }
        let len = usize::from(u16::from_le_bytes(reader.read_array()?));
        let bytes = reader.read_bytes(len)?;
        let text = String::from_utf8(bytes).map_err(|e| CodecError::InvalidUtf8 {
            valid_up_to: e.utf8_error().valid_up_to(),
        })?;
        Ok(Some(text))
    }

    fn value_eq(&self, a: &Option<String>, b: &Option<String>) -> bool {
        a == b
    }

    fn max_bits(&self) -> Option<usize> {
        Some(1 + 16 + MAX_STRING_BYTES * 8)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roundtrip(value: &Option<String>) -> Option<String> {
        let mut writer = BitWriter::new(MAX_STRING_BYTES + 8);
        StringCodec.encode(&mut writer, value).unwrap();
        let bytes = writer.finish();
        let mut reader = BitReader::new(&bytes);
        StringCodec.decode(&mut reader).unwrap()
    }

    #[test]
    fn string_roundtrip() {
        assert_eq!(
            roundtrip(&Some("KeyTwo".to_owned())),
            Some("KeyTwo".to_owned())
        );
        assert_eq!(roundtrip(&Some(String::new())), Some(String::new()));
        assert_eq!(roundtrip(&None), None);
    }

    #[test]
    fn string_roundtrip_multibyte_utf8() {
        let text = Some("świeca ↑0.25".to_owned());
        assert_eq!(roundtrip(&text), text);
    }

    #[test]
    fn encoded_shape_is_flag_length_bytes() {
        let mut writer = BitWriter::new(16);
        StringCodec
            .encode(&mut writer, &Some("ab".to_owned()))
            .unwrap();
        let bytes = writer.finish();
        // flag 0, then 0x0002 LE, then "ab", all shifted one bit left
        let mut reader = BitReader::new(&bytes);
        assert!(!reader.read_bit().unwrap());
        assert_eq!(u16::from_le_bytes(reader.read_array().unwrap()), 2);
        assert_eq!(reader.read_bytes(2).unwrap(), b"ab");
    }

    #[test]
    fn null_string_is_one_bit() {
        let mut writer = BitWriter::new(4);
        StringCodec.encode(&mut writer, &None).unwrap();
        assert_eq!(writer.finish().len(), 1);
    }

    #[test]
    fn oversized_string_is_rejected() {
        let text = Some("x".repeat(MAX_STRING_BYTES + 1));
        let mut writer = BitWriter::new(MAX_STRING_BYTES + 16);
        let err = StringCodec.encode(&mut writer, &text).unwrap_err();
        assert!(matches!(
            err,
            CodecError::InvalidStringLength {
                len: 65_536,
                max: 65_535
            }
        ));
    }

    #[test]
    fn max_length_string_is_accepted() {
        let text = Some("y".repeat(MAX_STRING_BYTES));
        assert_eq!(roundtrip(&text), text);
    }

    #[test]
    fn invalid_utf8_is_rejected() {
        let mut writer = BitWriter::new(16);
        writer.write_bit(false).unwrap();
        writer.write_bytes(&2u16.to_le_bytes()).unwrap();
        writer.write_bytes(&[0xC3, 0x28]).unwrap();
        let bytes = writer.finish();
        let mut reader = BitReader::new(&bytes);
        let err = StringCodec.decode(&mut reader).unwrap_err();
        assert!(matches!(err, CodecError::InvalidUtf8 { .. }));
    }

    #[test]
    fn equality_is_by_content() {
        assert!(StringCodec.value_eq(&Some("a".to_owned()), &Some("a".to_owned())));
        assert!(!StringCodec.value_eq(&Some("a".to_owned()), &Some("b".to_owned())));
        assert!(StringCodec.value_eq(&None, &None));
        assert!(!StringCodec.value_eq(&None, &Some(String::new())));
    }
}
