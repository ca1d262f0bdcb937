//! Schema items: the recursive unit of (de)serialization.

use std::any::Any;
use std::sync::Arc;

use bitbuf::{BitReader, BitWriter};

use crate::error::{CodecError, CodecResult};
use crate::value::ValueCodec;

/// One field of a schema, in wire order.
///
/// Exactly three shapes implement this trait: scalar fields bound to a
/// [`ValueCodec`], nested members bound to a sub-schema, and collections
/// (object or primitive elements). Key items are written without a missing
/// flag and must be equal across the current/previous pair of a delta.
pub(crate) trait SchemaItem<T>: Send + Sync {
    fn name(&self) -> &str;

    fn is_key(&self) -> bool;

    /// Encodes the field in snapshot form: a cleared missing flag for value
    /// items, then the full value.
    fn encode(&self, writer: &mut BitWriter, source: &T) -> CodecResult<()>;

    /// Encodes the field differentially against a previous entity version.
    fn encode_delta(&self, writer: &mut BitWriter, current: &T, previous: &T) -> CodecResult<()>;

    /// Decodes the field into `target`. With `merge` set, key items are
    /// verified against the target instead of assigned.
    fn decode(&self, reader: &mut BitReader<'_>, target: &mut T, merge: bool) -> CodecResult<()>;

    /// Field-level deep equality between two entities.
    fn eq_in(&self, a: &T, b: &T) -> bool;

    /// Decodes this item's value without a target entity. Key extraction
    /// only; keys are always scalar.
    fn decode_key(&self, reader: &mut BitReader<'_>) -> CodecResult<Box<dyn Any>> {
        let _ = reader;
        Err(CodecError::UnsupportedType {
            type_name: "non-scalar key field",
        })
    }

    /// Worst-case encoded size in bits, `None` when unbounded.
    fn max_bits(&self) -> Option<usize>;
}

/// A flat field bound to a value codec and a getter/setter pair.
pub(crate) struct ScalarItem<T, V> {
    name: String,
    is_key: bool,
    codec: Arc<dyn ValueCodec<V>>,
    get: fn(&T) -> V,
    set: fn(&mut T, V),
}

impl<T, V> ScalarItem<T, V> {
    pub(crate) fn new(
        name: impl Into<String>,
        is_key: bool,
        codec: Arc<dyn ValueCodec<V>>,
        get: fn(&T) -> V,
        set: fn(&mut T, V),
    ) -> Self {
        Self {
            name: name.into(),
            is_key,
            codec,
            get,
            set,
        }
    }
}

impl<T, V: 'static> SchemaItem<T> for ScalarItem<T, V> {
    fn name(&self) -> &str {
        &self.name
    }

    fn is_key(&self) -> bool {
        self.is_key
    }

    fn encode(&self, writer: &mut BitWriter, source: &T) -> CodecResult<()> {
        if !self.is_key {
            writer.write_bit(false)?;
        }
        self.codec.encode(writer, &(self.get)(source))
    }

    fn encode_delta(&self, writer: &mut BitWriter, current: &T, previous: &T) -> CodecResult<()> {
        let current_value = (self.get)(current);
        let unchanged = self.codec.value_eq(&current_value, &(self.get)(previous));
        if self.is_key {
            if !unchanged {
                return Err(CodecError::KeyMismatch {
                    field: self.name.clone(),
                });
            }
            // Keys are always present and carry no missing flag.
            return self.codec.encode(writer, &current_value);
        }
        if unchanged {
            writer.write_bit(true)?;
            return Ok(());
        }
        writer.write_bit(false)?;
        self.codec.encode(writer, &current_value)
    }

    fn decode(&self, reader: &mut BitReader<'_>, target: &mut T, merge: bool) -> CodecResult<()> {
        if !self.is_key && reader.read_bit()? {
            // Unchanged: leave the target's value alone.
            return Ok(());
        }
        let value = self.codec.decode(reader)?;
        if self.is_key && merge {
            if !self.codec.value_eq(&value, &(self.get)(target)) {
                return Err(CodecError::KeyMismatch {
                    field: self.name.clone(),
                });
            }
            return Ok(());
        }
        (self.set)(target, value);
        Ok(())
    }

    fn eq_in(&self, a: &T, b: &T) -> bool {
        self.codec.value_eq(&(self.get)(a), &(self.get)(b))
    }

    fn decode_key(&self, reader: &mut BitReader<'_>) -> CodecResult<Box<dyn Any>> {
        Ok(Box::new(self.codec.decode(reader)?))
    }

    fn max_bits(&self) -> Option<usize> {
        self.codec
            .max_bits()
            .map(|bits| bits + usize::from(!self.is_key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::U8Codec;

    #[derive(Debug, Default, Clone, PartialEq)]
    struct Pair {
        key: u8,
        value: u8,
    }

    fn key_item() -> ScalarItem<Pair, u8> {
        ScalarItem::new("key", true, Arc::new(U8Codec), |p: &Pair| p.key, |p, v| {
            p.key = v;
        })
    }

    fn value_item() -> ScalarItem<Pair, u8> {
        ScalarItem::new(
            "value",
            false,
            Arc::new(U8Codec),
            |p: &Pair| p.value,
            |p, v| {
                p.value = v;
            },
        )
    }

    #[test]
    fn key_snapshot_has_no_missing_flag() {
        let item = key_item();
        let mut writer = BitWriter::new(4);
        item.encode(&mut writer, &Pair { key: 0xF0, value: 0 }).unwrap();
        assert_eq!(writer.finish(), vec![0xF0]);
    }

    #[test]
    fn value_snapshot_is_flag_prefixed() {
        let item = value_item();
        let mut writer = BitWriter::new(4);
        item.encode(&mut writer, &Pair { key: 0, value: 0x0F }).unwrap();
        // missing bit 0, then 0x0F shifted one bit
        assert_eq!(writer.finish(), vec![0b0000_0111, 0b1000_0000]);
    }

    #[test]
    fn delta_of_unchanged_value_is_one_bit() {
        let item = value_item();
        let entity = Pair { key: 1, value: 9 };
        let mut writer = BitWriter::new(4);
        item.encode_delta(&mut writer, &entity, &entity.clone()).unwrap();
        let bytes = writer.finish();
        assert_eq!(bytes, vec![0b1000_0000]);
    }

    #[test]
    fn delta_of_changed_key_fails() {
        let item = key_item();
        let current = Pair { key: 2, value: 0 };
        let previous = Pair { key: 3, value: 0 };
        let mut writer = BitWriter::new(4);
        let err = item.encode_delta(&mut writer, &current, &previous).unwrap_err();
        assert!(matches!(err, CodecError::KeyMismatch { .. }));
    }

    #[test]
    fn merge_decode_verifies_key_without_assigning() {
        let item = key_item();
        let mut writer = BitWriter::new(4);
        item.encode(&mut writer, &Pair { key: 5, value: 0 }).unwrap();
        let bytes = writer.finish();

        let mut matching = Pair { key: 5, value: 7 };
        let mut reader = BitReader::new(&bytes);
        item.decode(&mut reader, &mut matching, true).unwrap();
        assert_eq!(matching, Pair { key: 5, value: 7 });

        let mut mismatched = Pair { key: 6, value: 7 };
        let mut reader = BitReader::new(&bytes);
        let err = item.decode(&mut reader, &mut mismatched, true).unwrap_err();
        assert!(matches!(err, CodecError::KeyMismatch { .. }));
    }

    #[test]
    fn missing_value_leaves_target_untouched() {
        let item = value_item();
        let entity = Pair { key: 1, value: 9 };
        let mut writer = BitWriter::new(4);
        item.encode_delta(&mut writer, &entity, &entity.clone()).unwrap();
        let bytes = writer.finish();

        let mut target = Pair { key: 1, value: 42 };
        let mut reader = BitReader::new(&bytes);
        item.decode(&mut reader, &mut target, true).unwrap();
        assert_eq!(target.value, 42);
    }

    #[test]
    fn decode_key_returns_typed_value() {
        let item = key_item();
        let mut writer = BitWriter::new(4);
        item.encode(&mut writer, &Pair { key: 0xAA, value: 0 }).unwrap();
        let bytes = writer.finish();
        let mut reader = BitReader::new(&bytes);
        let value = item.decode_key(&mut reader).unwrap();
        assert_eq!(*value.downcast::<u8>().unwrap(), 0xAA);
    }

    #[test]
    fn max_bits_counts_missing_flag_for_values_only() {
        assert_eq!(SchemaItem::max_bits(&key_item()), Some(8));
        assert_eq!(SchemaItem::max_bits(&value_item()), Some(9));
    }
}
