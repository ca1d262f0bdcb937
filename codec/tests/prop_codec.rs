use codec::{CodecError, F64Codec, Nullable, Schema, U16Codec, U32Codec, U8Codec};
use proptest::prelude::*;

#[derive(Debug, Default, Clone)]
struct Tick {
    id: u8,
    bid: f64,
    ask: f64,
    size: Option<u32>,
    flags: Option<Vec<u16>>,
}

fn tick_schema() -> Schema<Tick> {
    Schema::<Tick>::builder(1)
        .key("id", U8Codec, |t: &Tick| t.id, |t, v| t.id = v)
        .field("bid", F64Codec, |t| t.bid, |t, v| t.bid = v)
        .field("ask", F64Codec, |t| t.ask, |t, v| t.ask = v)
        .field(
            "size",
            Nullable::new(U32Codec),
            |t| t.size,
            |t, v| t.size = v,
        )
        .value_list("flags", U16Codec, |t| &t.flags, |t| &mut t.flags)
        .build()
        .unwrap()
}

fn tick_strategy() -> impl Strategy<Value = Tick> {
    (
        any::<u8>(),
        any::<f64>(),
        any::<f64>(),
        prop::option::of(any::<u32>()),
        prop::option::of(prop::collection::vec(any::<u16>(), 0..8)),
    )
        .prop_map(|(id, bid, ask, size, flags)| Tick {
            id,
            bid,
            ask,
            size,
            flags,
        })
}

proptest! {
    // deep_eq is the schema's own equality, so NaN-valued floats roundtrip
    // cleanly under bitwise comparison.
    #[test]
    fn prop_snapshot_roundtrip(tick in tick_strategy()) {
        let schema = tick_schema();
        let bytes = schema.encode_snapshot(&tick).unwrap();
        let decoded = schema.decode_snapshot(&bytes).unwrap();
        prop_assert!(schema.deep_eq(&decoded, &tick));
    }

    #[test]
    fn prop_delta_idempotence(a in tick_strategy(), b in tick_strategy()) {
        let schema = tick_schema();
        let mut b = b;
        b.id = a.id;

        let delta = schema.encode_delta(&b, &a).unwrap();
        let mut rebuilt = a.clone();
        schema.apply_delta(&delta, &mut rebuilt).unwrap();
        prop_assert!(schema.deep_eq(&rebuilt, &b));
    }

    #[test]
    fn prop_delta_never_longer_than_snapshot(a in tick_strategy(), b in tick_strategy()) {
        let schema = tick_schema();
        let mut b = b;
        b.id = a.id;

        let delta = schema.encode_delta(&b, &a).unwrap();
        let snapshot = schema.encode_snapshot(&b).unwrap();
        prop_assert!(delta.len() <= snapshot.len());
    }

    #[test]
    fn prop_key_change_rejected(a in tick_strategy(), b in tick_strategy()) {
        prop_assume!(a.id != b.id);
        let schema = tick_schema();
        let err = schema.encode_delta(&b, &a).unwrap_err();
        let is_key_mismatch = matches!(err, CodecError::KeyMismatch { .. });
        prop_assert!(is_key_mismatch);
    }

    #[test]
    fn prop_deep_eq_is_reflexive(tick in tick_strategy()) {
        let schema = tick_schema();
        prop_assert!(schema.deep_eq(&tick, &tick.clone()));
    }
}
