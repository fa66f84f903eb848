#![no_main]

use libfuzzer_sys::fuzz_target;
use mpt_witness_core::decoder::{NodeDecoder, RlpNodeDecoder};

fuzz_target!(|data: &[u8]| {
    // Arbitrary bytes may fail to decode, but must never panic.
    let _ = RlpNodeDecoder::decode_node(data);
});
