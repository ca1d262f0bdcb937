//! Entity schemas: ordered key and value items bound to one entity type.

use std::any::Any;
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use bitbuf::{BitReader, BitWriter};
use wire::Header;

use crate::error::{CodecError, CodecResult};
use crate::item::{ScalarItem, SchemaItem};
use crate::limits::DEFAULT_BUFFER_BYTES;
use crate::list::{ObjectListItem, ValueListItem};
use crate::nested::NestedItem;
use crate::registry::CodecRegistry;
use crate::value::ValueCodec;

/// An immutable serialization plan for one entity type.
///
/// A schema is built once, reused across every serialize/deserialize call,
/// and holds no per-entity state; it is safe to share across threads as long
/// as each call supplies its own buffer and entities. Key items always
/// precede value items in wire order.
///
/// Used as a root schema it writes and reads the one-byte header; embedded
/// as a nested member or collection element schema it runs in nested mode
/// with the header suppressed.
pub struct Schema<T> {
    entity_id: u8,
    key_items: Vec<Box<dyn SchemaItem<T>>>,
    value_items: Vec<Box<dyn SchemaItem<T>>>,
    buffer_capacity: usize,
}

impl<T: 'static> Schema<T> {
    /// Starts building a schema for the given entity id.
    #[must_use]
    pub fn builder(entity_id: u8) -> SchemaBuilder<T> {
        SchemaBuilder {
            entity_id,
            key_items: Vec::new(),
            value_items: Vec::new(),
            buffer_capacity: None,
        }
    }

    /// Returns the entity id written into the header.
    #[must_use]
    pub const fn entity_id(&self) -> u8 {
        self.entity_id
    }

    /// Returns the worst-case encoded size in bytes, header included, or
    /// `None` when a string or collection field makes it unbounded.
    #[must_use]
    pub fn worst_case_bytes(&self) -> Option<usize> {
        self.items_max_bits().map(|bits| (8 + bits).div_ceil(8))
    }

    /// Encodes a full snapshot of `entity` into a fresh buffer.
    pub fn encode_snapshot(&self, entity: &T) -> CodecResult<Vec<u8>> {
        let mut writer = BitWriter::new(self.buffer_capacity);
        self.encode_snapshot_into(&mut writer, entity)?;
        Ok(writer.finish())
    }

    /// Encodes a full snapshot of `entity` into a caller-provided writer.
    pub fn encode_snapshot_into(&self, writer: &mut BitWriter, entity: &T) -> CodecResult<()> {
        Header::snapshot(self.entity_id).encode(writer)?;
        self.encode_items(writer, entity)
    }

    /// Encodes only the fields of `current` that changed relative to
    /// `previous`, into a fresh buffer.
    ///
    /// # Errors
    ///
    /// Fails with [`CodecError::KeyMismatch`] when any key field differs
    /// between the two versions; a delta is only meaningful against the
    /// same keyed identity.
    pub fn encode_delta(&self, current: &T, previous: &T) -> CodecResult<Vec<u8>> {
        let mut writer = BitWriter::new(self.buffer_capacity);
        self.encode_delta_into(&mut writer, current, previous)?;
        Ok(writer.finish())
    }

    /// Encodes a delta into a caller-provided writer.
    pub fn encode_delta_into(
        &self,
        writer: &mut BitWriter,
        current: &T,
        previous: &T,
    ) -> CodecResult<()> {
        Header::delta(self.entity_id).encode(writer)?;
        self.encode_items_delta(writer, current, previous)
    }

    /// Decodes a snapshot into a freshly constructed entity.
    pub fn decode_snapshot(&self, bytes: &[u8]) -> CodecResult<T>
    where
        T: Default,
    {
        let mut reader = BitReader::new(bytes);
        self.expect_header(&mut reader)?;
        let mut entity = T::default();
        self.decode_items(&mut reader, &mut entity, false)?;
        Ok(entity)
    }

    /// Applies an encoded delta to an existing entity in place.
    ///
    /// Key fields are verified, not assigned: a stream carrying another
    /// entity's delta fails with [`CodecError::KeyMismatch`]. Fields flagged
    /// missing keep the target's current values.
    pub fn apply_delta(&self, bytes: &[u8], target: &mut T) -> CodecResult<()> {
        let mut reader = BitReader::new(bytes);
        self.expect_header(&mut reader)?;
        self.decode_items(&mut reader, target, true)
    }

    /// Deep equality between two entities under this schema's codecs.
    #[must_use]
    pub fn deep_eq(&self, a: &T, b: &T) -> bool {
        self.items().all(|item| item.eq_in(a, b))
    }

    /// Extracts a single key field from an encoded stream without decoding
    /// the rest of the entity.
    pub fn read_key<K: 'static>(&self, bytes: &[u8], name: &str) -> CodecResult<K> {
        let mut reader = BitReader::new(bytes);
        self.read_key_from(&mut reader, name)
    }

    /// Extracts a single key field, restoring the reader's position
    /// afterwards so the stream can still be decoded in full.
    pub fn read_key_from<K: 'static>(
        &self,
        reader: &mut BitReader<'_>,
        name: &str,
    ) -> CodecResult<K> {
        if !self.key_items.iter().any(|item| item.name() == name) {
            return Err(CodecError::KeyUndefined {
                name: name.to_owned(),
            });
        }
        let mark = reader.bookmark();
        let result = self.read_key_inner(reader, name);
        reader.restore(mark);
        result
    }

    fn read_key_inner<K: 'static>(
        &self,
        reader: &mut BitReader<'_>,
        name: &str,
    ) -> CodecResult<K> {
        self.expect_header(reader)?;
        for item in &self.key_items {
            let value: Box<dyn Any> = item.decode_key(reader)?;
            if item.name() == name {
                return value
                    .downcast::<K>()
                    .map(|boxed| *boxed)
                    .map_err(|_| CodecError::KeyTypeMismatch {
                        name: name.to_owned(),
                    });
            }
        }
        Err(CodecError::KeyUndefined {
            name: name.to_owned(),
        })
    }

    fn expect_header(&self, reader: &mut BitReader<'_>) -> CodecResult<Header> {
        let header = Header::decode(reader)?;
        if header.entity_id != self.entity_id {
            return Err(CodecError::EntityIdMismatch {
                expected: self.entity_id,
                found: header.entity_id,
            });
        }
        Ok(header)
    }

    /// Encodes all items in wire order, without a header (nested mode).
    pub(crate) fn encode_items(&self, writer: &mut BitWriter, source: &T) -> CodecResult<()> {
        for item in self.items() {
            item.encode(writer, source)?;
        }
        Ok(())
    }

    /// Encodes all items differentially, without a header (nested mode).
    pub(crate) fn encode_items_delta(
        &self,
        writer: &mut BitWriter,
        current: &T,
        previous: &T,
    ) -> CodecResult<()> {
        for item in self.items() {
            item.encode_delta(writer, current, previous)?;
        }
        Ok(())
    }

    /// Decodes all items in wire order, without a header (nested mode).
    pub(crate) fn decode_items(
        &self,
        reader: &mut BitReader<'_>,
        target: &mut T,
        merge: bool,
    ) -> CodecResult<()> {
        for item in self.items() {
            item.decode(reader, target, merge)?;
        }
        Ok(())
    }

    /// Worst-case item bits in nested mode, `None` when unbounded.
    pub(crate) fn items_max_bits(&self) -> Option<usize> {
        self.items()
            .map(SchemaItem::max_bits)
            .try_fold(0usize, |total, bits| bits.map(|b| total + b))
    }

    fn items(&self) -> impl Iterator<Item = &dyn SchemaItem<T>> {
        self.key_items
            .iter()
            .chain(self.value_items.iter())
            .map(|item| &**item)
    }
}

impl<T> fmt::Debug for Schema<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Schema")
            .field("entity_id", &self.entity_id)
            .field("key_items", &self.key_items.len())
            .field("value_items", &self.value_items.len())
            .field("buffer_capacity", &self.buffer_capacity)
            .finish()
    }
}

/// Declarative registration builder for [`Schema`].
///
/// Fields are serialized in registration order, keys first. Accessors are
/// plain function pointers; the entity type stays free of codec concerns.
pub struct SchemaBuilder<T> {
    entity_id: u8,
    key_items: Vec<Box<dyn SchemaItem<T>>>,
    value_items: Vec<Box<dyn SchemaItem<T>>>,
    buffer_capacity: Option<usize>,
}

impl<T: 'static> SchemaBuilder<T> {
    /// Registers a key field with an explicit codec.
    #[must_use]
    pub fn key<V: 'static>(
        mut self,
        name: &str,
        codec: impl ValueCodec<V> + 'static,
        get: fn(&T) -> V,
        set: fn(&mut T, V),
    ) -> Self {
        self.key_items
            .push(Box::new(ScalarItem::new(name, true, Arc::new(codec), get, set)));
        self
    }

    /// Registers a value field with an explicit codec.
    #[must_use]
    pub fn field<V: 'static>(
        mut self,
        name: &str,
        codec: impl ValueCodec<V> + 'static,
        get: fn(&T) -> V,
        set: fn(&mut T, V),
    ) -> Self {
        self.value_items
            .push(Box::new(ScalarItem::new(name, false, Arc::new(codec), get, set)));
        self
    }

    /// Registers a key field, resolving the codec from a registry.
    pub fn auto_key<V: 'static>(
        mut self,
        registry: &CodecRegistry,
        name: &str,
        get: fn(&T) -> V,
        set: fn(&mut T, V),
    ) -> CodecResult<Self> {
        let codec = registry.resolve::<V>()?;
        self.key_items
            .push(Box::new(ScalarItem::new(name, true, codec, get, set)));
        Ok(self)
    }

    /// Registers a value field, resolving the codec from a registry.
    pub fn auto_field<V: 'static>(
        mut self,
        registry: &CodecRegistry,
        name: &str,
        get: fn(&T) -> V,
        set: fn(&mut T, V),
    ) -> CodecResult<Self> {
        let codec = registry.resolve::<V>()?;
        self.value_items
            .push(Box::new(ScalarItem::new(name, false, codec, get, set)));
        Ok(self)
    }

    /// Registers a nested complex member serialized through `schema`.
    #[must_use]
    pub fn nested<M: Default + 'static>(
        mut self,
        name: &str,
        schema: impl Into<Arc<Schema<M>>>,
        get: fn(&T) -> &Option<M>,
        get_mut: fn(&mut T) -> &mut Option<M>,
    ) -> Self {
        self.value_items
            .push(Box::new(NestedItem::new(name, schema.into(), get, get_mut)));
        self
    }

    /// Registers a collection of complex members.
    #[must_use]
    pub fn object_list<M: Default + 'static>(
        mut self,
        name: &str,
        schema: impl Into<Arc<Schema<M>>>,
        get: fn(&T) -> &Option<Vec<Option<M>>>,
        get_mut: fn(&mut T) -> &mut Option<Vec<Option<M>>>,
    ) -> Self {
        self.value_items
            .push(Box::new(ObjectListItem::new(name, schema.into(), get, get_mut)));
        self
    }

    /// Registers a collection of primitive values.
    #[must_use]
    pub fn value_list<V: Default + Clone + 'static>(
        mut self,
        name: &str,
        codec: impl ValueCodec<V> + 'static,
        get: fn(&T) -> &Option<Vec<V>>,
        get_mut: fn(&mut T) -> &mut Option<Vec<V>>,
    ) -> Self {
        self.value_items.push(Box::new(ValueListItem::new(
            name,
            Arc::new(codec),
            get,
            get_mut,
        )));
        self
    }

    /// Overrides the writer capacity used by the allocating encode calls.
    ///
    /// Defaults to the schema's worst case, or [`DEFAULT_BUFFER_BYTES`] when
    /// unbounded. Undersizing surfaces as a capacity error, never corrupt
    /// output.
    #[must_use]
    pub const fn buffer_capacity(mut self, bytes: usize) -> Self {
        self.buffer_capacity = Some(bytes);
        self
    }

    /// Builds the schema after validation.
    ///
    /// # Errors
    ///
    /// Fails when the entity id does not fit the header
    /// ([`wire::WireError::EntityIdOutOfRange`]) or two items share a name
    /// ([`CodecError::DuplicateField`]).
    pub fn build(self) -> CodecResult<Schema<T>> {
        if self.entity_id > wire::MAX_ENTITY_ID {
            return Err(CodecError::Wire(wire::WireError::EntityIdOutOfRange {
                entity_id: self.entity_id,
            }));
        }
        let mut names = HashSet::new();
        for item in self.key_items.iter().chain(self.value_items.iter()) {
            if !names.insert(item.name().to_owned()) {
                return Err(CodecError::DuplicateField {
                    name: item.name().to_owned(),
                });
            }
        }

        let mut schema = Schema {
            entity_id: self.entity_id,
            key_items: self.key_items,
            value_items: self.value_items,
            buffer_capacity: DEFAULT_BUFFER_BYTES,
        };
        schema.buffer_capacity = self
            .buffer_capacity
            .or_else(|| schema.worst_case_bytes())
            .unwrap_or(DEFAULT_BUFFER_BYTES);
        Ok(schema)
    }
}

impl<T> fmt::Debug for SchemaBuilder<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SchemaBuilder")
            .field("entity_id", &self.entity_id)
            .field("key_items", &self.key_items.len())
            .field("value_items", &self.value_items.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::{U8Codec, U16Codec};

    #[derive(Debug, Default, Clone, PartialEq)]
    struct Sample {
        id: u8,
        level: u16,
    }

    fn sample_schema() -> Schema<Sample> {
        Schema::<Sample>::builder(3)
            .key("id", U8Codec, |s: &Sample| s.id, |s, v| s.id = v)
            .field("level", U16Codec, |s: &Sample| s.level, |s, v| s.level = v)
            .build()
            .unwrap()
    }

    #[test]
    fn builder_orders_keys_before_values() {
        let schema = sample_schema();
        assert_eq!(schema.entity_id(), 3);
        let mut names: Vec<&str> = schema.items().map(SchemaItem::name).collect();
        assert_eq!(names.remove(0), "id");
        assert_eq!(names.remove(0), "level");
    }

    #[test]
    fn builder_rejects_entity_id_out_of_range() {
        let err = Schema::<Sample>::builder(16).build().unwrap_err();
        assert!(matches!(
            err,
            CodecError::Wire(wire::WireError::EntityIdOutOfRange { entity_id: 16 })
        ));
    }

    #[test]
    fn builder_rejects_duplicate_names() {
        let err = Schema::<Sample>::builder(1)
            .field("x", U8Codec, |s: &Sample| s.id, |s, v| s.id = v)
            .field("x", U16Codec, |s: &Sample| s.level, |s, v| s.level = v)
            .build()
            .unwrap_err();
        assert!(matches!(err, CodecError::DuplicateField { .. }));
    }

    #[test]
    fn worst_case_covers_header_and_flags() {
        let schema = sample_schema();
        // header 8 + key 8 + (flag 1 + value 16) = 33 bits -> 5 bytes
        assert_eq!(schema.worst_case_bytes(), Some(5));
    }

    #[test]
    fn snapshot_roundtrip() {
        let schema = sample_schema();
        let entity = Sample { id: 7, level: 513 };
        let bytes = schema.encode_snapshot(&entity).unwrap();
        let decoded = schema.decode_snapshot(&bytes).unwrap();
        assert_eq!(decoded, entity);
        assert!(schema.deep_eq(&decoded, &entity));
    }

    #[test]
    fn snapshot_rejects_wrong_entity_id() {
        let schema = sample_schema();
        let other = Schema::<Sample>::builder(4)
            .key("id", U8Codec, |s: &Sample| s.id, |s, v| s.id = v)
            .build()
            .unwrap();
        let bytes = other.encode_snapshot(&Sample::default()).unwrap();
        let err = schema.decode_snapshot(&bytes).unwrap_err();
        assert!(matches!(
            err,
            CodecError::EntityIdMismatch {
                expected: 3,
                found: 4
            }
        ));
    }

    #[test]
    fn delta_rejects_key_change() {
        let schema = sample_schema();
        let previous = Sample { id: 1, level: 10 };
        let current = Sample { id: 2, level: 10 };
        let err = schema.encode_delta(&current, &previous).unwrap_err();
        assert!(matches!(err, CodecError::KeyMismatch { .. }));
    }

    #[test]
    fn delta_roundtrip_updates_changed_field_only() {
        let schema = sample_schema();
        let previous = Sample { id: 1, level: 10 };
        let current = Sample { id: 1, level: 20 };
        let bytes = schema.encode_delta(&current, &previous).unwrap();

        let mut target = previous.clone();
        schema.apply_delta(&bytes, &mut target).unwrap();
        assert_eq!(target, current);
    }

    #[test]
    fn apply_delta_rejects_other_entitys_stream() {
        let schema = sample_schema();
        let previous = Sample { id: 1, level: 10 };
        let current = Sample { id: 1, level: 20 };
        let bytes = schema.encode_delta(&current, &previous).unwrap();

        let mut unrelated = Sample { id: 9, level: 10 };
        let err = schema.apply_delta(&bytes, &mut unrelated).unwrap_err();
        assert!(matches!(err, CodecError::KeyMismatch { .. }));
    }

    #[test]
    fn read_key_extracts_without_consuming() {
        let schema = sample_schema();
        let entity = Sample { id: 42, level: 7 };
        let bytes = schema.encode_snapshot(&entity).unwrap();

        let id: u8 = schema.read_key(&bytes, "id").unwrap();
        assert_eq!(id, 42);

        let mut reader = BitReader::new(&bytes);
        let id: u8 = schema.read_key_from(&mut reader, "id").unwrap();
        assert_eq!(id, 42);
        assert_eq!(reader.bytes_read(), 0, "lookahead must restore position");
    }

    #[test]
    fn read_key_unknown_name_fails() {
        let schema = sample_schema();
        let bytes = schema.encode_snapshot(&Sample::default()).unwrap();
        let err = schema.read_key::<u8>(&bytes, "level").unwrap_err();
        assert!(matches!(err, CodecError::KeyUndefined { .. }));
    }

    #[test]
    fn read_key_wrong_type_fails() {
        let schema = sample_schema();
        let bytes = schema.encode_snapshot(&Sample::default()).unwrap();
        let err = schema.read_key::<u32>(&bytes, "id").unwrap_err();
        assert!(matches!(err, CodecError::KeyTypeMismatch { .. }));
    }

    #[test]
    fn auto_registration_resolves_codecs() {
        let registry = CodecRegistry::standard();
        let schema = Schema::<Sample>::builder(2)
            .auto_key(&registry, "id", |s: &Sample| s.id, |s, v| s.id = v)
            .unwrap()
            .auto_field(&registry, "level", |s: &Sample| s.level, |s, v| s.level = v)
            .unwrap()
            .build()
            .unwrap();
        let entity = Sample { id: 1, level: 2 };
        let bytes = schema.encode_snapshot(&entity).unwrap();
        assert_eq!(schema.decode_snapshot(&bytes).unwrap(), entity);
    }

    #[test]
    fn auto_registration_fails_for_unsupported_type() {
        let registry = CodecRegistry::new();
        let err = Schema::<Sample>::builder(2)
            .auto_key(&registry, "id", |s: &Sample| s.id, |s, v| s.id = v)
            .unwrap_err();
        assert!(matches!(err, CodecError::UnsupportedType { .. }));
    }

    #[test]
    fn explicit_buffer_capacity_is_honored() {
        let schema = Schema::<Sample>::builder(1)
            .key("id", U8Codec, |s: &Sample| s.id, |s, v| s.id = v)
            .buffer_capacity(1)
            .build()
            .unwrap();
        let err = schema.encode_snapshot(&Sample::default()).unwrap_err();
        assert!(matches!(err, CodecError::Bit(_)));
    }
}
