//! Type-to-codec registry.

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::decimal::DecimalCodec;
use crate::error::{CodecError, CodecResult};
use crate::text::StringCodec;
use crate::time::{DateCodec, DateTimeCodec};
use crate::value::{
    BoolCodec, F32Codec, F64Codec, I16Codec, I32Codec, I64Codec, I8Codec, Nullable, U16Codec,
    U32Codec, U64Codec, U8Codec, ValueCodec,
};

/// An explicitly constructed, immutable map from member type to codec.
///
/// The registry is built once, before any schema, and passed by reference to
/// the schema builder's `auto_*` registration methods. Resolving a type with
/// no registered codec fails with [`CodecError::UnsupportedType`]. There is
/// no process-wide instance; every registry is owned by its creator.
pub struct CodecRegistry {
    entries: HashMap<TypeId, Box<dyn Any + Send + Sync>>,
}

impl CodecRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    /// Creates a registry with every built-in codec registered, each in both
    /// plain and nullable form.
    #[must_use]
    pub fn standard() -> Self {
        let mut registry = Self::new();
        registry.register(U8Codec);
        registry.register(I8Codec);
        registry.register(U16Codec);
        registry.register(I16Codec);
        registry.register(U32Codec);
        registry.register(I32Codec);
        registry.register(U64Codec);
        registry.register(I64Codec);
        registry.register(F32Codec);
        registry.register(F64Codec);
        registry.register(BoolCodec);
        registry.register(DateTimeCodec);
        registry.register(DateCodec);
        registry.register(DecimalCodec);
        registry.register(StringCodec);

        registry.register(Nullable::new(U8Codec));
        registry.register(Nullable::new(I8Codec));
        registry.register(Nullable::new(U16Codec));
        registry.register(Nullable::new(I16Codec));
        registry.register(Nullable::new(U32Codec));
        registry.register(Nullable::new(I32Codec));
        registry.register(Nullable::new(U64Codec));
        registry.register(Nullable::new(I64Codec));
        registry.register(Nullable::new(F32Codec));
        registry.register(Nullable::new(F64Codec));
        registry.register(Nullable::new(BoolCodec));
        registry.register(Nullable::new(DateTimeCodec));
        registry.register(Nullable::new(DateCodec));
        registry.register(Nullable::new(DecimalCodec));
        registry
    }

    /// Registers a codec for `V`, replacing any previous registration.
    pub fn register<V: 'static>(&mut self, codec: impl ValueCodec<V> + 'static) {
        let shared: Arc<dyn ValueCodec<V>> = Arc::new(codec);
        self.entries.insert(TypeId::of::<V>(), Box::new(shared));
    }

    /// Resolves the codec registered for `V`.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::UnsupportedType`] if no codec is registered.
    pub fn resolve<V: 'static>(&self) -> CodecResult<Arc<dyn ValueCodec<V>>> {
        self.entries
            .get(&TypeId::of::<V>())
            .and_then(|entry| entry.downcast_ref::<Arc<dyn ValueCodec<V>>>())
            .cloned()
            .ok_or(CodecError::UnsupportedType {
                type_name: std::any::type_name::<V>(),
            })
    }
}

impl Default for CodecRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for CodecRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CodecRegistry")
            .field("entries", &self.entries.len())
            .finish()
    }
}
