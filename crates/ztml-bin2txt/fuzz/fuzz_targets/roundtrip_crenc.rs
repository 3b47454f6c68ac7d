#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if !data.is_empty() {
        let offset = data[0];
        let data = &data[1..];
        let encoded = ztml_bin2txt::crenc::encode(data, offset);
        assert!(!encoded.contains(&b'\r'));
        let decoded = ztml_bin2txt::crenc::decode(&encoded, offset);
        assert!(
            data == decoded,
            "the decoded data doesn't match the original data!"
        );
    }
});
