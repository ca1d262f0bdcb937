//! Decode and sizing limits.

/// Maximum number of elements accepted in a collection field.
///
/// Collection counts come off the wire as raw 32-bit integers; this bound
/// keeps a corrupt or hostile count from driving a huge allocation. Enforced
/// on both encode and decode so a stream that encodes also decodes.
pub const MAX_LIST_ELEMENTS: usize = 1 << 20;

/// Maximum encoded byte length of a string field, fixed by the 16-bit
/// length prefix.
pub const MAX_STRING_BYTES: usize = 65_535;

/// Default writer capacity when a schema's worst case is unbounded
/// (a string or collection field makes it so).
pub const DEFAULT_BUFFER_BYTES: usize = 64 * 1024;
