//! Nested-object schema item.

use std::sync::Arc;

use bitbuf::{BitReader, BitWriter};

use crate::error::CodecResult;
use crate::item::SchemaItem;
use crate::schema::Schema;

/// A complex member serialized through its own sub-schema.
///
/// Wire shape: missing flag, null flag, then (when non-null) the member's
/// fields in nested mode — no header byte. On merge decode an existing
/// member is deserialized into in place, preserving its identity.
pub(crate) struct NestedItem<T, M> {
    name: String,
    schema: Arc<Schema<M>>,
    get: fn(&T) -> &Option<M>,
    get_mut: fn(&mut T) -> &mut Option<M>,
}

impl<T, M> NestedItem<T, M> {
    pub(crate) fn new(
        name: impl Into<String>,
        schema: Arc<Schema<M>>,
        get: fn(&T) -> &Option<M>,
        get_mut: fn(&mut T) -> &mut Option<M>,
    ) -> Self {
        Self {
            name: name.into(),
            schema,
            get,
            get_mut,
        }
    }
}

impl<T, M: Default + 'static> SchemaItem<T> for NestedItem<T, M> {
    fn name(&self) -> &str {
        &self.name
    }

    fn is_key(&self) -> bool {
        false
    }

    fn encode(&self, writer: &mut BitWriter, source: &T) -> CodecResult<()> {
        writer.write_bit(false)?;
        match (self.get)(source) {
            None => writer.write_bit(true)?,
            Some(member) => {
                writer.write_bit(false)?;
                self.schema.encode_items(writer, member)?;
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
        match ((self.get)(current), (self.get)(previous)) {
            (None, _) => writer.write_bit(true)?,
            (Some(member), None) => {
                // No baseline to diff against; send the member whole.
                writer.write_bit(false)?;
                self.schema.encode_items(writer, member)?;
            }
            (Some(member), Some(baseline)) => {
                writer.write_bit(false)?;
                self.schema.encode_items_delta(writer, member, baseline)?;
            }
        }
        Ok(())
    }

    fn decode(&self, reader: &mut BitReader<'_>, target: &mut T, merge: bool) -> CodecResult<()> {
        if reader.read_bit()? {
            return Ok(());
        }
        let null = reader.read_bit()?;
        let slot = (self.get_mut)(target);
        if null {
            *slot = None;
            return Ok(());
        }
        match slot {
            Some(member) => self.schema.decode_items(reader, member, merge),
            None => {
                let mut member = M::default();
                self.schema.decode_items(reader, &mut member, false)?;
                *slot = Some(member);
                Ok(())
            }
        }
    }

    fn eq_in(&self, a: &T, b: &T) -> bool {
        match ((self.get)(a), (self.get)(b)) {
            (None, None) => true,
            (Some(x), Some(y)) => self.schema.deep_eq(x, y),
            _ => false,
        }
    }

    fn max_bits(&self) -> Option<usize> {
        self.schema.items_max_bits().map(|bits| bits + 2)
    }
}
