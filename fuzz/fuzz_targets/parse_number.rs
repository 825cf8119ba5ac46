#![no_main]

use libfuzzer_sys::fuzz_target;

// Differential check against std: on plain `-?digits(.digits)?(e±digits)?`
// inputs (no underscores, comma separators or special tokens, which std
// does not accept) both parsers are correctly rounded and must agree
// bit-for-bit.
fuzz_target!(|data: &[u8]| {
    let Ok(got) = floatconv::parse_number_f64(data) else {
        return;
    };
    let Ok(s) = std::str::from_utf8(data) else {
        return;
    };
    if !s.bytes().all(|c| c.is_ascii_digit() || matches!(c, b'.' | b'e' | b'E' | b'+' | b'-')) {
        return;
    }
    if let Ok(expect) = s.parse::<f64>() {
        assert_eq!(got.to_bits(), expect.to_bits(), "mismatch parsing {s:?}");
    }
});
