#![no_main]

use libfuzzer_sys::fuzz_target;
use ztml_core::options::MtfPolicy;

fuzz_target!(|data: &[u8]| {
    if data.is_empty() {
        return;
    }
    let mtf = MtfPolicy::from_id(data[0] % 91);
    // keep the alphabet small so the recency list stays cheap
    let symbols: Vec<u32> = data[1..].iter().map(|&b| u32::from(b)).collect();

    let (trans, index) = ztml_bwt::encode(&symbols, mtf);
    assert_eq!(trans.len(), symbols.len());
    let decoded = ztml_bwt::decode(&trans, index, mtf);
    assert!(
        symbols == decoded,
        "the inverse transform doesn't match the original data!"
    );
});
