#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if !data.is_empty() {
        let offset = data[0];
        let data = &data[1..];
        let encoded = ztml_bin2txt::base125::encode(data, offset);
        // every byte must be literal-safe: no CR, no backtick, backslash
        // only as the ${ escape
        for (at, &byte) in encoded.iter().enumerate() {
            assert!(byte != b'\r' && byte != b'`', "illegal byte at {at}");
            if byte == b'\\' {
                assert_eq!(encoded.get(at + 1), Some(&b'$'));
            }
        }
        let decoded = ztml_bin2txt::base125::decode(&encoded, offset);
        assert!(
            data == decoded,
            "the decoded data doesn't match the original data!"
        );
    }
});
