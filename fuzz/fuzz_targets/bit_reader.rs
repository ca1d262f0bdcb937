#![no_main]

use bitbuf::BitReader;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let mut reader = BitReader::new(data);
    let mut idx = 0usize;

    // Use input bytes to drive a bounded sequence of operations.
    while idx < data.len() && idx < 1024 {
        let op = data[idx] % 5;
        idx += 1;

        match op {
            0 => {
                let _ = reader.read_bit();
            }
            1 => {
                let _ = reader.read_byte();
            }
            2 => {
                let count = usize::from(data[idx.saturating_sub(1)] % 32);
                let _ = reader.read_bytes(count);
            }
            3 => {
                let mark = reader.bookmark();
                let _ = reader.read_byte();
                reader.restore(mark);
            }
            _ => {
                let _ = reader.bits_remaining();
            }
        }
    }
});
