#![cfg_attr(not(doctest), doc = include_str!("../README.md"))]

mod binary;
mod decimal;
pub mod error;
mod parse;
mod render;
mod table;

#[doc(inline)]
pub use crate::error::{Error, Result};
pub use crate::parse::parse_number_f64;
pub use crate::render::{render_number_f64, RenderOptions};

#[cfg(test)]
mod test {
    use super::*;

    // The cross-module scenarios; each half also has its own test module.
    #[test]
    fn test_readme_example() {
        let x = parse_number_f64(b"299_792_458e-8").unwrap();
        assert_eq!(x, 2.99792458);

        let mut buf = [0u8; 32];
        let opts = RenderOptions::JUST_ENOUGH_PRECISION;
        let n = render_number_f64(&mut buf, 1.0 / 3.0, 0, opts);
        assert_eq!(&buf[..n], b"0.3333333333333333");
    }

    #[test]
    fn test_render_parse_agree_on_precision_17() {
        // 17 significant digits suffice for any f64, so rendering at
        // precision 17 in general and scientific notation must parse back
        // bit-for-bit.
        for x in [
            0.3,
            -123.456e78,
            6.62607015e-34,
            18446744073709551615.0,
            5.357e-300,
        ] {
            for options in [RenderOptions::empty(), RenderOptions::EXPONENT_PRESENT] {
                let mut buf = [0u8; 512];
                let n = render_number_f64(&mut buf, x, 17, options);
                assert!(n > 0);
                let back = parse_number_f64(&buf[..n]).unwrap();
                assert_eq!(back.to_bits(), x.to_bits(), "{x:?} with {options:?}");
            }
        }

        // Fixed-point precision counts fractional digits, so the same
        // holds there only while 17 of them still cover the value.
        for x in [0.3, -123.456e78, 18446744073709551615.0] {
            let mut buf = [0u8; 512];
            let n = render_number_f64(&mut buf, x, 17, RenderOptions::EXPONENT_ABSENT);
            assert!(n > 0);
            let back = parse_number_f64(&buf[..n]).unwrap();
            assert_eq!(back.to_bits(), x.to_bits(), "{x:?} fixed-point");
        }
    }
}
