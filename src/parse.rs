//! Parsing decimal text into f64 values.

use crate::binary;
use crate::decimal::{Decimal, DECIMAL_POINT_RANGE, MAX_SHIFT};
use crate::error::{Error, Result};

/// `POWERS[n]` is a binary shift that brings an `n`-digit integer part
/// down without overshooting: `10 ** n >> POWERS[n]` is at least 1. The
/// table stops before its entries would exceed [`MAX_SHIFT`].
static POWERS: [u32; 19] = [
    0, 3, 6, 9, 13, 16, 19, 23, 26, 29, //
    33, 36, 39, 43, 46, 49, 53, 56, 59, //
];

const F64_BIAS: i32 = binary::F64_BIAS;

/// Parses an f64 from `s`.
///
/// The input must be a decimal number (`"1.25"`, `"-2,5"`, `"6.02e23"`) or
/// one of the special tokens `Inf`, `Infinity` or `NaN`, case-insensitive,
/// with an optional sign; `_` is accepted between tokens and ignored. Both
/// `.` and `,` serve as the decimal separator, regardless of locale.
/// Unnecessary leading zeroes (`"007"`) are rejected.
///
/// The result is correctly rounded: the closest f64 to the mathematical
/// value of `s`, ties to even. Values beyond the finite range overflow to
/// ±infinity or underflow to ±0.0.
pub fn parse_number_f64(s: &[u8]) -> Result<f64> {
    parse_number_f64_impl(s, false)
}

pub(crate) fn parse_number_f64_impl(s: &[u8], skip_fast_path: bool) -> Result<f64> {
    let mut h = match Decimal::parse(s) {
        Ok(h) => h,
        Err(e) => return parse_number_f64_special(s, e),
    };

    // Zero and the obvious extremes: the largest and smallest positive
    // finite f64 values are approximately 1.8e+308 and 4.9e-324.
    if h.num_digits == 0 || h.decimal_point < -326 {
        return Ok(signed_zero(h.negative));
    } else if h.decimal_point > 310 {
        return Ok(signed_infinity(h.negative));
    }

    if let Some(x) = binary::parse_from_decimal(&h, skip_fast_path) {
        return Ok(x);
    }

    // The exact path: scale by powers of 2 until the number lies in
    // [1/2 .. 1), accumulating the base-2 exponent. First shift right,
    // possibly a little too far...
    let mut exp2 = 0i32;
    while h.decimal_point > 0 {
        let n = h.decimal_point as usize;
        let shift = if n < POWERS.len() { POWERS[n] } else { MAX_SHIFT as u32 };
        h.small_rshift(shift);
        if h.decimal_point < -DECIMAL_POINT_RANGE {
            return Ok(signed_zero(h.negative));
        }
        exp2 += shift as i32;
    }
    // ...then shift left into [1/2 .. 1).
    while h.decimal_point <= 0 {
        let shift = if h.decimal_point == 0 {
            if h.digits[0] >= 5 {
                break;
            }
            // Doubling twice is only safe below a quarter; from [1/4, 1/2)
            // it would overshoot past 1 and the mantissa extraction below
            // would truncate where it must round.
            if h.digits[0] < 2 || (h.digits[0] == 2 && (h.num_digits < 2 || h.digits[1] < 5)) {
                2
            } else {
                1
            }
        } else {
            let n = (-h.decimal_point) as usize;
            if n < POWERS.len() {
                POWERS[n]
            } else {
                MAX_SHIFT as u32
            }
        };
        h.small_lshift(shift);
        if h.decimal_point > DECIMAL_POINT_RANGE {
            return Ok(signed_infinity(h.negative));
        }
        exp2 -= shift as i32;
    }

    // We are in [1/2 .. 1) but f64 mantissas live in [1 .. 2).
    exp2 -= 1;

    // Shift subnormals down to the minimum normal exponent.
    while F64_BIAS + 1 > exp2 {
        let n = (((F64_BIAS + 1) - exp2) as u32).min(MAX_SHIFT as u32);
        h.small_rshift(n);
        exp2 += n as i32;
    }

    if exp2 - F64_BIAS >= 0x7FF {
        return Ok(signed_infinity(h.negative));
    }

    // Extract the 53 mantissa bits.
    h.small_lshift(53);
    let mut man2 = h.rounded_integer();

    // Rounding may have added a bit; if so shift back and re-check for
    // overflow.
    if (man2 >> 53) != 0 {
        man2 >>= 1;
        exp2 += 1;
        if exp2 - F64_BIAS >= 0x7FF {
            return Ok(signed_infinity(h.negative));
        }
    }

    // A mantissa without its top bit is subnormal: biased exponent 0.
    if (man2 >> 52) == 0 {
        exp2 = F64_BIAS;
    }

    let bits = (man2 & 0x000F_FFFF_FFFF_FFFF)
        | ((((exp2 - F64_BIAS) as u64) & 0x7FF) << 52)
        | if h.negative { 0x8000_0000_0000_0000 } else { 0 };
    Ok(f64::from_bits(bits))
}

fn signed_zero(negative: bool) -> f64 {
    if negative {
        -0.0
    } else {
        0.0
    }
}

fn signed_infinity(negative: bool) -> f64 {
    if negative {
        f64::NEG_INFINITY
    } else {
        f64::INFINITY
    }
}

/// True if `s` starts with `pattern`, ASCII case-insensitively. `pattern`
/// is lower-case.
fn starts_with_ignore_case(s: &[u8], pattern: &[u8]) -> bool {
    s.len() >= pattern.len()
        && s.iter().zip(pattern).all(|(c, p)| c.to_ascii_lowercase() == *p)
}

/// Recognizes the special tokens `inf`, `infinity` and `nan`,
/// case-insensitively, with an optional sign and `_` padding. Anything
/// else reports `fallback`, the error from the failed decimal parse.
fn parse_number_f64_special(s: &[u8], fallback: Error) -> Result<f64> {
    let mut i = 0;
    while i < s.len() && s[i] == b'_' {
        i += 1;
    }
    if i >= s.len() {
        return Err(fallback);
    }

    let mut negative = false;
    match s[i] {
        b'+' => i += 1,
        b'-' => {
            negative = true;
            i += 1;
        }
        _ => {}
    }
    while i < s.len() && s[i] == b'_' {
        i += 1;
    }
    if i >= s.len() {
        return Err(fallback);
    }

    let rest = &s[i..];
    let (token_len, nan) = if starts_with_ignore_case(rest, b"infinity") {
        (8, false)
    } else if starts_with_ignore_case(rest, b"inf") {
        (3, false)
    } else if starts_with_ignore_case(rest, b"nan") {
        (3, true)
    } else {
        return Err(fallback);
    };
    i += token_len;

    while i < s.len() && s[i] == b'_' {
        i += 1;
    }
    if i != s.len() {
        return Err(fallback);
    }

    let mut bits: u64 = if nan { 0x7FFF_FFFF_FFFF_FFFF } else { 0x7FF0_0000_0000_0000 };
    if negative {
        bits |= 0x8000_0000_0000_0000;
    }
    Ok(f64::from_bits(bits))
}

#[cfg(test)]
mod test {
    use super::*;

    fn test_parse_ok(input: &str, expect: f64) {
        let got = parse_number_f64(input.as_bytes()).unwrap();
        assert_eq!(got.to_bits(), expect.to_bits(), "parsing {input:?}");
        // The exact path must agree wherever the fast path answered.
        let slow = parse_number_f64_impl(input.as_bytes(), true).unwrap();
        assert_eq!(slow.to_bits(), expect.to_bits(), "slow-parsing {input:?}");
    }

    #[test]
    fn test_parse_simple() {
        test_parse_ok("0", 0.0);
        test_parse_ok("-0", -0.0);
        test_parse_ok("1", 1.0);
        test_parse_ok("12.5", 12.5);
        test_parse_ok("-0.25", -0.25);
        test_parse_ok("1e3", 1000.0);
        test_parse_ok("1E-2", 0.01);
        test_parse_ok("+4.5", 4.5);
        test_parse_ok("0.1", 0.1);
        test_parse_ok("0.3", 0.3);
        test_parse_ok("299_792_458e-8", 2.99792458);
    }

    #[test]
    fn test_parse_separators() {
        test_parse_ok("7,5", 7.5);
        test_parse_ok("-1,25e2", -125.0);
        test_parse_ok("0.5", 0.5);
    }

    #[test]
    fn test_parse_bit_patterns() {
        // Pi, correctly rounded.
        assert_eq!(
            parse_number_f64(b"3.14159265358979323846").unwrap().to_bits(),
            0x400921FB54442D18
        );
        // The largest finite f64.
        assert_eq!(
            parse_number_f64(b"1.7976931348623157e+308").unwrap().to_bits(),
            0x7FEFFFFFFFFFFFFF
        );
        // The smallest positive subnormal is about 4.94e-324; anything
        // from just over half of it parses to its bit pattern.
        assert_eq!(parse_number_f64(b"3e-324").unwrap().to_bits(), 1);
        assert_eq!(parse_number_f64(b"4.9e-324").unwrap().to_bits(), 1);
        // Below half of the smallest subnormal rounds to zero.
        assert_eq!(parse_number_f64(b"1e-324").unwrap().to_bits(), 0);
        assert_eq!(parse_number_f64(b"2e-324").unwrap().to_bits(), 0);
    }

    #[test]
    fn test_parse_extremes() {
        assert_eq!(parse_number_f64(b"1e309").unwrap().to_bits(), 0x7FF0000000000000);
        assert_eq!(parse_number_f64(b"-1e309").unwrap(), f64::NEG_INFINITY);
        assert_eq!(parse_number_f64(b"1e99999999").unwrap(), f64::INFINITY);
        assert_eq!(parse_number_f64(b"-1e-400").unwrap().to_bits(), 0x8000000000000000);
        assert_eq!(parse_number_f64(b"1e-99999999").unwrap().to_bits(), 0);
        // Just inside the early-out thresholds, both directions.
        test_parse_ok("9.9e307", 9.9e307);
        test_parse_ok("2.2e-308", 2.2e-308);
        test_parse_ok("1e-323", 1e-323);
    }

    #[test]
    fn test_parse_specials() {
        assert_eq!(parse_number_f64(b"inf").unwrap(), f64::INFINITY);
        assert_eq!(parse_number_f64(b"INF").unwrap(), f64::INFINITY);
        assert_eq!(parse_number_f64(b"Infinity").unwrap(), f64::INFINITY);
        assert_eq!(parse_number_f64(b"-infinity").unwrap(), f64::NEG_INFINITY);
        assert_eq!(parse_number_f64(b"+inf").unwrap(), f64::INFINITY);
        assert_eq!(parse_number_f64(b"_-_Inf_").unwrap(), f64::NEG_INFINITY);
        assert!(parse_number_f64(b"NaN").unwrap().is_nan());
        assert!(parse_number_f64(b"-nan").unwrap().is_nan());
        assert_eq!(parse_number_f64(b"nan").unwrap().to_bits(), 0x7FFFFFFFFFFFFFFF);

        for bad in [
            &b""[..],
            b"  ",
            b"infin",
            b"infinityy",
            b"inf inity",
            b"na",
            b"nann",
            b"in_f",
            b"+-inf",
        ] {
            assert!(parse_number_f64(bad).is_err(), "{:?}", bad);
        }
    }

    #[test]
    fn test_parse_bad_argument() {
        for bad in [&b"007"[..], b"00.5", b"1.2.3", b"1e", b"x", b"0x10", b"1 "] {
            assert_eq!(parse_number_f64(bad), Err(Error::InvalidNumber), "{:?}", bad);
        }
    }

    #[test]
    fn test_parse_against_std() {
        // std's parser is correctly rounded too, so it acts as the oracle.
        for s in [
            "0.000001",
            "123456789012345678901234567890",
            "3.141592653589793",
            "2.718281828459045",
            "1.618033988749894",
            "17.24",
            "9007199254740993",
            "9007199254740995",
            "0.000000000000000000000000001",
            "43332000001000000003888e-4",
            "12448139190673828122020e-47",
            "3469446951536141862700000000000000000e-62",
            "5e-324",
            "2.2250738585072011e-308",
            "2.2250738585072014e-308",
            "1.00000000000000011102230246251565404236316680908203125",
            "0.1000000000000000055511151231257827021181583404541015625",
            // Declines the fast path and lands just over a quarter when
            // scaled, which once truncated a rounding bit.
            "8690588879858416699e-263",
            "15899552960789887662e7",
        ] {
            let expect: f64 = s.parse().unwrap();
            test_parse_ok(s, expect);
        }
    }

    #[test]
    fn test_parse_long_tail_rounding() {
        // 800+ digits where only the truncated tail decides the rounding.
        let mut s = String::from("0.5");
        s.push_str(&"0".repeat(900));
        test_parse_ok(&s, 0.5);
        s.push('1');
        let expect: f64 = s.parse().unwrap();
        test_parse_ok(&s, expect);
    }

    #[test]
    fn test_parse_random_against_std() {
        use rand::{rngs::StdRng, Rng, SeedableRng};

        let mut rng = StdRng::seed_from_u64(0x5EED);
        for _ in 0..20_000 {
            let man: u64 = rng.gen();
            let exp: i32 = rng.gen_range(-340..=320);
            let s = format!("{man}e{exp}");
            let expect: f64 = s.parse().unwrap();
            let got = parse_number_f64(s.as_bytes()).unwrap();
            assert_eq!(got.to_bits(), expect.to_bits(), "parsing {s:?}");
        }
    }
}
