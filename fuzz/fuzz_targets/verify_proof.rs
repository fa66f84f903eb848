#![no_main]

use libfuzzer_sys::fuzz_target;
use mpt_witness_core::decoder::RlpNodeDecoder;
use mpt_witness_core::hasher::KeccakHasher;
use mpt_witness_core::verify_proof;

fuzz_target!(|input: (Vec<Vec<u8>>, Vec<u8>, [u8; 32])| {
    let (proof, key, root) = input;
    // A hostile witness may produce any error, but must never panic and
    // never run unbounded.
    let _ = verify_proof::<KeccakHasher, RlpNodeDecoder, _>(&root, &proof, &key);
});
