//! Collection schema items.

use std::sync::Arc;

use bitbuf::{BitReader, BitWriter};

use crate::error::{CodecError, CodecResult};
use crate::item::SchemaItem;
use crate::limits::MAX_LIST_ELEMENTS;
use crate::schema::Schema;
use crate::value::ValueCodec;

/// Writes a collection element count as a raw 4-byte little-endian integer.
///
/// Counts are plain bytes, never bit-flagged like the surrounding fields.
fn write_count(writer: &mut BitWriter, len: usize) -> CodecResult<()> {
    if len > MAX_LIST_ELEMENTS {
        return Err(CodecError::ListTooLong {
            len,
            max: MAX_LIST_ELEMENTS,
        });
    }
    writer.write_bytes(&(len as u32).to_le_bytes())?;
    Ok(())
}

fn read_count(reader: &mut BitReader<'_>) -> CodecResult<usize> {
    let len = u32::from_le_bytes(reader.read_array()?) as usize;
    if len > MAX_LIST_ELEMENTS {
        return Err(CodecError::ListTooLong {
            len,
            max: MAX_LIST_ELEMENTS,
        });
    }
    // Every element carries at least one flag bit; a count past the end of
    // the buffer is malformed and must fail before any allocation.
    if reader.bits_remaining() < len {
        return Err(CodecError::Bit(bitbuf::BitError::CapacityExceeded {
            requested_bits: len,
            available_bits: reader.bits_remaining(),
        }));
    }
    Ok(len)
}

/// A collection of complex members, each serialized through a sub-schema.
///
/// Wire shape: missing flag, null flag, raw 4-byte element count, then per
/// element a null flag plus (when non-null) the element in nested mode.
pub(crate) struct ObjectListItem<T, M> {
    name: String,
    schema: Arc<Schema<M>>,
    get: fn(&T) -> &Option<Vec<Option<M>>>,
    get_mut: fn(&mut T) -> &mut Option<Vec<Option<M>>>,
}

impl<T, M> ObjectListItem<T, M> {
    pub(crate) fn new(
        name: impl Into<String>,
        schema: Arc<Schema<M>>,
        get: fn(&T) -> &Option<Vec<Option<M>>>,
        get_mut: fn(&mut T) -> &mut Option<Vec<Option<M>>>,
    ) -> Self {
        Self {
            name: name.into(),
            schema,
            get,
            get_mut,
        }
    }
}

impl<T, M: Default + 'static> SchemaItem<T> for ObjectListItem<T, M> {
    fn name(&self) -> &str {
        &self.name
    }

    fn is_key(&self) -> bool {
        false
    }

    fn encode(&self, writer: &mut BitWriter, source: &T) -> CodecResult<()> {
        writer.write_bit(false)?;
        let Some(elements) = (self.get)(source) else {
            writer.write_bit(true)?;
            return Ok(());
        };
        writer.write_bit(false)?;
        write_count(writer, elements.len())?;
        for element in elements {
            match element {
                None => writer.write_bit(true)?,
                Some(member) => {
                    writer.write_bit(false)?;
                    self.schema.encode_items(writer, member)?;
                }
            }
        }
        Ok(())
    }

    fn encode_delta(&self, writer: &mut BitWriter, current: &T, previous: &T) -> CodecResult<()> {
        if self.eq_in(current, previous) {
            writer.write_bit(true)?;
            return Ok(());
        }
        writer.write_bit(false)?;
        let Some(elements) = (self.get)(current) else {
            writer.write_bit(true)?;
            return Ok(());
        };
        writer.write_bit(false)?;
        write_count(writer, elements.len())?;
        let baseline = (self.get)(previous).as_ref();
        for (index, element) in elements.iter().enumerate() {
            let Some(member) = element else {
                writer.write_bit(true)?;
                continue;
            };
            writer.write_bit(false)?;
            let prior = baseline
                .and_then(|list| list.get(index))
                .and_then(Option::as_ref);
            match prior {
                Some(previous_member) => {
                    self.schema
                        .encode_items_delta(writer, member, previous_member)?;
                }
                None => self.schema.encode_items(writer, member)?,
            }
        }
        Ok(())
    }

    fn decode(&self, reader: &mut BitReader<'_>, target: &mut T, merge: bool) -> CodecResult<()> {
        if reader.read_bit()? {
            return Ok(());
        }
        let slot = (self.get_mut)(target);
        if reader.read_bit()? {
            *slot = None;
            return Ok(());
        }
        let count = read_count(reader)?;
        // Existing elements are moved out and merged into in place; the
        // decoded list replaces the target's collection.
        let mut existing = slot.take().unwrap_or_default();
        let mut decoded = Vec::with_capacity(count);
        for index in 0..count {
            if reader.read_bit()? {
                decoded.push(None);
                continue;
            }
            let prior = existing.get_mut(index).and_then(Option::take);
            let member = match prior {
                Some(mut member) => {
                    self.schema.decode_items(reader, &mut member, merge)?;
                    member
                }
                None => {
                    let mut member = M::default();
                    self.schema.decode_items(reader, &mut member, false)?;
                    member
                }
            };
            decoded.push(Some(member));
        }
        *slot = Some(decoded);
        Ok(())
    }

    fn eq_in(&self, a: &T, b: &T) -> bool {
        match ((self.get)(a), (self.get)(b)) {
            (None, None) => true,
            (Some(x), Some(y)) => {
                x.len() == y.len()
                    && x.iter().zip(y.iter()).all(|(left, right)| match (left, right) {
                        (None, None) => true,
                        (Some(p), Some(q)) => self.schema.deep_eq(p, q),
                        _ => false,
                    })
            }
            _ => false,
        }
    }

    fn max_bits(&self) -> Option<usize> {
        None
    }
}

/// A collection of primitive values bound to an element codec.
///
/// Same envelope as object lists, but each element carries a missing flag
/// plus the codec value; primitive elements have no presence concept of
/// their own. Differential encoding pads the shorter list with defaults so
/// index correspondence holds.
pub(crate) struct ValueListItem<T, V> {
    name: String,
    codec: Arc<dyn ValueCodec<V>>,
    get: fn(&T) -> &Option<Vec<V>>,
    get_mut: fn(&mut T) -> &mut Option<Vec<V>>,
}

impl<T, V> ValueListItem<T, V> {
    pub(crate) fn new(
        name: impl Into<String>,
        codec: Arc<dyn ValueCodec<V>>,
        get: fn(&T) -> &Option<Vec<V>>,
        get_mut: fn(&mut T) -> &mut Option<Vec<V>>,
    ) -> Self {
        Self {
            name: name.into(),
            codec,
            get,
            get_mut,
        }
    }
}

impl<T, V: Default + Clone + 'static> SchemaItem<T> for ValueListItem<T, V> {
    fn name(&self) -> &str {
        &self.name
    }

    fn is_key(&self) -> bool {
        false
    }

    fn encode(&self, writer: &mut BitWriter, source: &T) -> CodecResult<()> {
        writer.write_bit(false)?;
        let Some(elements) = (self.get)(source) else {
            writer.write_bit(true)?;
            return Ok(());
        };
        writer.write_bit(false)?;
        write_count(writer, elements.len())?;
        for value in elements {
            writer.write_bit(false)?;
            self.codec.encode(writer, value)?;
        }
        Ok(())
    }

    fn encode_delta(&self, writer: &mut BitWriter, current: &T, previous: &T) -> CodecResult<()> {
        if self.eq_in(current, previous) {
            writer.write_bit(true)?;
            return Ok(());
        }
        writer.write_bit(false)?;
        let Some(elements) = (self.get)(current) else {
            writer.write_bit(true)?;
            return Ok(());
        };
        writer.write_bit(false)?;
        write_count(writer, elements.len())?;
        let empty = Vec::new();
        let baseline = (self.get)(previous).as_ref().unwrap_or(&empty);
        let padding = V::default();
        for (index, value) in elements.iter().enumerate() {
            let prior = baseline.get(index).unwrap_or(&padding);
            if self.codec.value_eq(value, prior) {
                writer.write_bit(true)?;
            } else {
                writer.write_bit(false)?;
                self.codec.encode(writer, value)?;
            }
        }
        Ok(())
    }

    fn decode(&self, reader: &mut BitReader<'_>, target: &mut T, _merge: bool) -> CodecResult<()> {
        if reader.read_bit()? {
            return Ok(());
        }
        let slot = (self.get_mut)(target);
        if reader.read_bit()? {
            *slot = None;
            return Ok(());
        }
        let count = read_count(reader)?;
        let existing = slot.take().unwrap_or_default();
        let mut decoded = Vec::with_capacity(count);
        for index in 0..count {
            if reader.read_bit()? {
                // Unchanged: carried over from the target's element at this
                // index, defaulted when the target list is shorter.
                decoded.push(existing.get(index).cloned().unwrap_or_default());
            } else {
                decoded.push(self.codec.decode(reader)?);
            }
        }
        *slot = Some(decoded);
        Ok(())
    }

    fn eq_in(&self, a: &T, b: &T) -> bool {
        match ((self.get)(a), (self.get)(b)) {
            (None, None) => true,
            (Some(x), Some(y)) => {
                x.len() == y.len()
                    && x.iter()
                        .zip(y.iter())
                        .all(|(left, right)| self.codec.value_eq(left, right))
            }
            _ => false,
        }
    }

    fn max_bits(&self) -> Option<usize> {
        None
    }
}
