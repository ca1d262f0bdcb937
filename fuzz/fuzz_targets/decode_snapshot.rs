#![no_main]

use codec::{F64Codec, Nullable, Schema, StringCodec, U32Codec, U8Codec};
use libfuzzer_sys::fuzz_target;

#[derive(Debug, Default, Clone)]
struct Quote {
    id: u8,
    name: Option<String>,
    bid: f64,
    size: Option<u32>,
    depths: Option<Vec<u32>>,
}

fn quote_schema() -> Schema<Quote> {
    Schema::<Quote>::builder(1)
        .key("id", U8Codec, |q: &Quote| q.id, |q, v| q.id = v)
        .field("name", StringCodec, |q: &Quote| q.name.clone(), |q, v| q.name = v)
        .field("bid", F64Codec, |q| q.bid, |q, v| q.bid = v)
        .field(
            "size",
            Nullable::new(U32Codec),
            |q| q.size,
            |q, v| q.size = v,
        )
        .value_list("depths", U32Codec, |q| &q.depths, |q| &mut q.depths)
        .build()
        .unwrap()
}

fuzz_target!(|data: &[u8]| {
    let schema = quote_schema();

    // Arbitrary bytes must never panic, only decode or fail cleanly.
    let _ = schema.decode_snapshot(data);

    let mut target = Quote::default();
    let _ = schema.apply_delta(data, &mut target);

    let _ = schema.read_key::<u8>(data, "id");
    let _ = codec::read_header(data);
});
