#![no_main]

use floatconv::{parse_number_f64, render_number_f64, RenderOptions};
use libfuzzer_sys::fuzz_target;

// Just-enough rendering must re-parse to the same bits for every finite
// value, in every format mode, with every cosmetic flag combination.
fuzz_target!(|input: (u64, u8)| {
    let (bits, flag_bits) = input;
    let x = f64::from_bits(bits);
    if !x.is_finite() {
        return;
    }

    let options = RenderOptions::from_bits_truncate(flag_bits as u32)
        | RenderOptions::JUST_ENOUGH_PRECISION;
    let mut buf = [0u8; 2048];
    let n = render_number_f64(&mut buf, x, 0, options);
    assert!(n > 0, "2 KiB must fit any just-enough rendering of {x:?}");

    let start = if options.contains(RenderOptions::ALIGN_RIGHT) { buf.len() - n } else { 0 };
    let back = parse_number_f64(&buf[start..start + n]).unwrap();
    assert_eq!(back.to_bits(), x.to_bits(), "round-trip through {:?}",
        std::str::from_utf8(&buf[start..start + n]).unwrap());
});
