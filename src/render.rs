//! Rendering f64 values as decimal text.

use crate::decimal::Decimal;

bitflags::bitflags! {
    /// Flags controlling [`render_number_f64`] output.
    ///
    /// With neither [`EXPONENT_ABSENT`] nor [`EXPONENT_PRESENT`] set,
    /// rendering picks between fixed-point and scientific notation the way
    /// printf's `%g` does. Setting both selects fixed-point.
    ///
    /// [`EXPONENT_ABSENT`]: RenderOptions::EXPONENT_ABSENT
    /// [`EXPONENT_PRESENT`]: RenderOptions::EXPONENT_PRESENT
    #[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
    pub struct RenderOptions: u32 {
        /// Emit a `+` in front of non-negative values.
        const LEADING_PLUS_SIGN = 0x01;
        /// Anchor the output at the end of the destination buffer instead
        /// of its start.
        const ALIGN_RIGHT = 0x02;
        /// Use `,` as the decimal separator instead of `.`.
        const DECIMAL_SEPARATOR_IS_A_COMMA = 0x04;
        /// Fixed-point notation, like printf's `%f`.
        const EXPONENT_ABSENT = 0x08;
        /// Scientific notation, like printf's `%e`.
        const EXPONENT_PRESENT = 0x10;
        /// Ignore the `precision` argument and use the fewest digits that
        /// still parse back to the same value.
        const JUST_ENOUGH_PRECISION = 0x20;
    }
}

/// Renders `x` into `dst`, returning the number of bytes written.
///
/// `precision` is the number of fractional digits (fixed-point and
/// scientific notation) or significant digits (general notation), clamped
/// to 4095; `JUST_ENOUGH_PRECISION` overrides it with the minimal digit
/// count that round-trips. Returns 0 without touching `dst` when the
/// formatted number does not fit, so the caller can retry with a larger
/// buffer.
///
/// Infinities render as `Inf` / `-Inf` (`+Inf` under `LEADING_PLUS_SIGN`)
/// and every NaN as `NaN`, always left-aligned.
pub fn render_number_f64(dst: &mut [u8], x: f64, precision: u32, options: RenderOptions) -> usize {
    // Decompose x into negativity, base-2 exponent and mantissa, applying
    // the exponent bias and the implicit mantissa bit unless x is
    // subnormal.
    let bits = x.to_bits();
    let neg = (bits >> 63) != 0;
    let mut exp2 = ((bits >> 52) & 0x7FF) as i32;
    let mut man = bits & 0x000F_FFFF_FFFF_FFFF;
    if exp2 == 0x7FF {
        if man != 0 {
            return render_nan(dst);
        }
        return render_inf(dst, neg, options);
    } else if exp2 == 0 {
        exp2 = -1022;
    } else {
        exp2 -= 1023;
        man |= 0x0010_0000_0000_0000;
    }

    let mut precision = precision.min(4095);

    // The exact decimal value of x: the 53-bit integer mantissa shifted by
    // the unbiased exponent.
    let mut h = Decimal::from_u64(man, neg);
    if h.num_digits > 0 {
        h.shift(exp2 - 52);
    }

    // The "%f" and "%e" formats. Both flags together mean "%f".
    if options.contains(RenderOptions::EXPONENT_ABSENT) {
        if options.contains(RenderOptions::JUST_ENOUGH_PRECISION) {
            h.round_just_enough(exp2, man);
            precision = (h.num_digits as i32 - h.decimal_point).max(0) as u32;
        } else {
            h.round_nearest(precision as i32 + h.decimal_point);
        }
        return render_exponent_absent(dst, &h, precision, options);
    }
    if options.contains(RenderOptions::EXPONENT_PRESENT) {
        if options.contains(RenderOptions::JUST_ENOUGH_PRECISION) {
            h.round_just_enough(exp2, man);
            precision = (h.num_digits.max(1) - 1) as u32;
        } else {
            h.round_nearest(precision as i32 + 1);
        }
        return render_exponent_present(dst, &h, precision, options);
    }

    // The "%g" format: precision counts significant digits rather than
    // digits after the separator. Round, then pick "%e" for large or tiny
    // exponents and "%f" otherwise.
    let mut e_threshold;
    if options.contains(RenderOptions::JUST_ENOUGH_PRECISION) {
        h.round_just_enough(exp2, man);
        precision = h.num_digits as u32;
        e_threshold = 6;
    } else {
        if precision == 0 {
            precision = 1;
        }
        h.round_nearest(precision as i32);
        e_threshold = precision as i32;
        let nd = h.num_digits as i32;
        if e_threshold > nd && nd >= h.decimal_point {
            e_threshold = nd;
        }
    }

    let e = h.decimal_point - 1;
    if e < -4 || e >= e_threshold {
        let p = precision.min(h.num_digits as u32);
        return render_exponent_present(dst, &h, p.saturating_sub(1), options);
    }

    let mut p = precision as i32;
    if p > h.decimal_point {
        p = h.num_digits as i32;
    }
    let precision = (p - h.decimal_point).max(0) as u32;
    render_exponent_absent(dst, &h, precision, options)
}

/// Fixed-point: digits, an optional separator, `precision` fractional
/// digits.
fn render_exponent_absent(
    dst: &mut [u8],
    h: &Decimal,
    precision: u32,
    options: RenderOptions,
) -> usize {
    let precision = precision as usize;
    let mut n = usize::from(h.negative || options.contains(RenderOptions::LEADING_PLUS_SIGN));
    n += if h.decimal_point <= 0 { 1 } else { h.decimal_point as usize };
    if precision > 0 {
        n += precision + 1; // +1 for the separator.
    }

    // Nothing is modified if the formatted number won't fit.
    if n > dst.len() {
        return 0;
    }

    let mut w = if options.contains(RenderOptions::ALIGN_RIGHT) { dst.len() - n } else { 0 };

    if h.negative {
        dst[w] = b'-';
        w += 1;
    } else if options.contains(RenderOptions::LEADING_PLUS_SIGN) {
        dst[w] = b'+';
        w += 1;
    }

    // Integral digits, zero-padded out to the decimal point.
    if h.decimal_point <= 0 {
        dst[w] = b'0';
        w += 1;
    } else {
        let dp = h.decimal_point as usize;
        let m = h.num_digits.min(dp);
        for &d in &h.digits[..m] {
            dst[w] = b'0' | d;
            w += 1;
        }
        for _ in m..dp {
            dst[w] = b'0';
            w += 1;
        }
    }

    // Separator and fractional digits, implicit zeroes included.
    if precision > 0 {
        dst[w] = separator(options);
        w += 1;
        for i in 0..precision {
            let j = h.decimal_point as i64 + i as i64;
            dst[w] = b'0'
                | if (0..h.num_digits as i64).contains(&j) { h.digits[j as usize] } else { 0 };
            w += 1;
        }
    }

    n
}

/// Scientific: one integral digit, an optional separator and fraction,
/// then `e`, a sign and a 2- or 3-digit exponent.
fn render_exponent_present(
    dst: &mut [u8],
    h: &Decimal,
    precision: u32,
    options: RenderOptions,
) -> usize {
    let precision = precision as usize;
    let exp = if h.num_digits > 0 { h.decimal_point - 1 } else { 0 };
    let negative_exp = exp < 0;
    let exp = exp.unsigned_abs();

    // Minimum 3 bytes: the first digit and then "e±".
    let mut n = if h.negative || options.contains(RenderOptions::LEADING_PLUS_SIGN) { 4 } else { 3 };
    if precision > 0 {
        n += precision + 1; // +1 for the separator.
    }
    n += if exp < 100 { 2 } else { 3 };

    // Nothing is modified if the formatted number won't fit.
    if n > dst.len() {
        return 0;
    }

    let mut w = if options.contains(RenderOptions::ALIGN_RIGHT) { dst.len() - n } else { 0 };

    if h.negative {
        dst[w] = b'-';
        w += 1;
    } else if options.contains(RenderOptions::LEADING_PLUS_SIGN) {
        dst[w] = b'+';
        w += 1;
    }

    dst[w] = if h.num_digits > 0 { b'0' | h.digits[0] } else { b'0' };
    w += 1;

    if precision > 0 {
        dst[w] = separator(options);
        w += 1;
        let m = h.num_digits.min(precision + 1);
        for &d in &h.digits[1..m.max(1)] {
            dst[w] = b'0' | d;
            w += 1;
        }
        for _ in m.max(1)..=precision {
            dst[w] = b'0';
            w += 1;
        }
    }

    dst[w] = b'e';
    dst[w + 1] = if negative_exp { b'-' } else { b'+' };
    w += 2;
    if exp < 10 {
        dst[w] = b'0';
        dst[w + 1] = b'0' + exp as u8;
    } else if exp < 100 {
        dst[w] = b'0' + (exp / 10) as u8;
        dst[w + 1] = b'0' + (exp % 10) as u8;
    } else {
        dst[w] = b'0' + (exp / 100) as u8;
        dst[w + 1] = b'0' + (exp / 10 % 10) as u8;
        dst[w + 2] = b'0' + (exp % 10) as u8;
    }

    n
}

fn separator(options: RenderOptions) -> u8 {
    if options.contains(RenderOptions::DECIMAL_SEPARATOR_IS_A_COMMA) {
        b','
    } else {
        b'.'
    }
}

fn render_inf(dst: &mut [u8], neg: bool, options: RenderOptions) -> usize {
    let s: &[u8] = if neg {
        b"-Inf"
    } else if options.contains(RenderOptions::LEADING_PLUS_SIGN) {
        b"+Inf"
    } else {
        b"Inf"
    };
    if dst.len() < s.len() {
        return 0;
    }
    dst[..s.len()].copy_from_slice(s);
    s.len()
}

fn render_nan(dst: &mut [u8]) -> usize {
    if dst.len() < 3 {
        return 0;
    }
    dst[..3].copy_from_slice(b"NaN");
    3
}

#[cfg(test)]
mod test {
    use super::*;

    fn render(x: f64, precision: u32, options: RenderOptions) -> String {
        let mut buf = [0u8; 1024];
        let n = render_number_f64(&mut buf, x, precision, options);
        assert!(n > 0, "rendering {x:?} unexpectedly failed");
        String::from_utf8(buf[..n].to_vec()).unwrap()
    }

    const ABSENT: RenderOptions = RenderOptions::EXPONENT_ABSENT;
    const PRESENT: RenderOptions = RenderOptions::EXPONENT_PRESENT;
    const JUST_ENOUGH: RenderOptions = RenderOptions::JUST_ENOUGH_PRECISION;

    #[test]
    fn test_fixed_point() {
        assert_eq!(render(0.0, 0, ABSENT), "0");
        assert_eq!(render(0.0, 2, ABSENT), "0.00");
        assert_eq!(render(-0.0, 1, ABSENT), "-0.0");
        assert_eq!(render(1.5, 2, ABSENT), "1.50");
        assert_eq!(render(-12.34, 1, ABSENT), "-12.3");
        assert_eq!(render(-12.35, 1, ABSENT), "-12.3"); // 12.35 is 12.3499...
        assert_eq!(render(0.125, 2, ABSENT), "0.12"); // ties to even
        assert_eq!(render(0.375, 2, ABSENT), "0.38");
        assert_eq!(render(1e21, 0, ABSENT), "1000000000000000000000");
        assert_eq!(render(0.0001, 2, ABSENT), "0.00");
        // Both format flags still mean fixed-point.
        assert_eq!(render(1.5, 2, ABSENT | PRESENT), "1.50");
    }

    #[test]
    fn test_fixed_point_just_enough() {
        assert_eq!(render(1.0 / 3.0, 17, ABSENT | JUST_ENOUGH), "0.3333333333333333");
        assert_eq!(render(0.1, 99, ABSENT | JUST_ENOUGH), "0.1");
        assert_eq!(render(100.0, 0, ABSENT | JUST_ENOUGH), "100");
        assert_eq!(render(-0.0, 0, ABSENT | JUST_ENOUGH), "-0");
    }

    #[test]
    fn test_scientific() {
        assert_eq!(render(0.0, 0, PRESENT), "0e+00");
        assert_eq!(render(1.5, 2, PRESENT), "1.50e+00");
        assert_eq!(render(-12.34, 3, PRESENT), "-1.234e+01");
        assert_eq!(render(0.00125, 2, PRESENT), "1.25e-03");
        assert_eq!(render(1e100, 0, PRESENT), "1e+100");
        assert_eq!(render(9.99e-310, 2, PRESENT | JUST_ENOUGH), "9.99e-310");
        assert_eq!(render(299792458.0, 0, PRESENT | JUST_ENOUGH), "2.99792458e+08");
    }

    #[test]
    fn test_general() {
        let none = RenderOptions::empty();
        assert_eq!(render(1e20, 0, JUST_ENOUGH), "1e+20");
        assert_eq!(render(0.1, 0, JUST_ENOUGH), "0.1");
        assert_eq!(render(0.0001, 0, JUST_ENOUGH), "0.0001");
        assert_eq!(render(0.00001, 0, JUST_ENOUGH), "1e-05");
        assert_eq!(render(123456.0, 0, JUST_ENOUGH), "123456");
        assert_eq!(render(1234567.0, 0, JUST_ENOUGH), "1.234567e+06");
        // Without just-enough, precision is significant digits; zero is
        // promoted to one.
        assert_eq!(render(123.456, 4, none), "123.5");
        assert_eq!(render(123.456, 0, none), "1e+02");
        assert_eq!(render(0.000123456, 3, none), "0.000123");
        assert_eq!(render(123456.0, 3, none), "1.23e+05");
    }

    #[test]
    fn test_inf_nan() {
        assert_eq!(render(f64::NAN, 0, RenderOptions::empty()), "NaN");
        assert_eq!(render(-f64::NAN, 9, ABSENT), "NaN");
        assert_eq!(render(f64::INFINITY, 0, RenderOptions::empty()), "Inf");
        assert_eq!(render(f64::NEG_INFINITY, 0, RenderOptions::empty()), "-Inf");
        assert_eq!(render(f64::INFINITY, 0, RenderOptions::LEADING_PLUS_SIGN), "+Inf");

        let mut tiny = [0u8; 2];
        assert_eq!(render_number_f64(&mut tiny, f64::NAN, 0, RenderOptions::empty()), 0);
        assert_eq!(tiny, [0, 0]);
    }

    #[test]
    fn test_leading_plus_and_comma() {
        let plus = RenderOptions::LEADING_PLUS_SIGN;
        assert_eq!(render(0.0, 1, ABSENT | plus), "+0.0");
        assert_eq!(render(2.5, 1, ABSENT | plus), "+2.5");
        assert_eq!(render(-2.5, 1, ABSENT | plus), "-2.5");

        let comma = RenderOptions::DECIMAL_SEPARATOR_IS_A_COMMA;
        assert_eq!(render(2.5, 1, ABSENT | comma), "2,5");
        assert_eq!(render(2.5, 1, PRESENT | comma), "2,5e+00");
    }

    #[test]
    fn test_align_right() {
        let mut buf = [b'x'; 8];
        let n = render_number_f64(&mut buf, 1.25, 2, ABSENT | RenderOptions::ALIGN_RIGHT);
        assert_eq!(n, 4);
        assert_eq!(&buf, b"xxxx1.25");

        let mut buf = [b'x'; 8];
        let n = render_number_f64(&mut buf, 1.25, 2, ABSENT);
        assert_eq!(n, 4);
        assert_eq!(&buf, b"1.25xxxx");
    }

    #[test]
    fn test_no_partial_writes() {
        let mut buf = [b'x'; 4];
        assert_eq!(render_number_f64(&mut buf, 123.456, 3, ABSENT), 0);
        assert_eq!(&buf, b"xxxx");
        assert_eq!(render_number_f64(&mut buf, 1e100, 0, PRESENT), 0);
        assert_eq!(&buf, b"xxxx");
    }

    #[test]
    fn test_subnormal_render() {
        assert_eq!(render(5e-324, 0, JUST_ENOUGH), "5e-324");
        assert_eq!(render(f64::MIN_POSITIVE, 0, JUST_ENOUGH), "2.2250738585072014e-308");
    }

    #[test]
    fn test_roundtrip_just_enough() {
        use crate::parse::parse_number_f64;

        for x in [
            0.0,
            -0.0,
            1.0,
            0.1,
            1.0 / 3.0,
            f64::MAX,
            f64::MIN_POSITIVE,
            5e-324,
            6.02214076e23,
            -1.7976931348623157e308,
            9007199254740993.0,
        ] {
            for options in [JUST_ENOUGH, JUST_ENOUGH | ABSENT, JUST_ENOUGH | PRESENT] {
                let s = render(x, 0, options);
                let back = parse_number_f64(s.as_bytes()).unwrap();
                assert_eq!(back.to_bits(), x.to_bits(), "{x:?} via {s:?}");
            }
        }
    }

    #[test]
    fn test_roundtrip_fixed_precision() {
        use crate::parse::parse_number_f64;

        // 17 significant digits always round-trip.
        for x in [3.141592653589793, 2.2250738585072011e-308, 123456789.0123456] {
            let s = render(x, 17, RenderOptions::empty());
            let back = parse_number_f64(s.as_bytes()).unwrap();
            assert_eq!(back.to_bits(), x.to_bits(), "{x:?} via {s:?}");
        }
    }

    #[test]
    fn test_roundtrip_random() {
        use crate::parse::parse_number_f64;
        use rand::{rngs::StdRng, Rng, SeedableRng};

        let mut rng = StdRng::seed_from_u64(0xF10A7);
        let mut buf = [0u8; 1600];
        let mut checked = 0;
        while checked < 20_000 {
            let x = f64::from_bits(rng.gen::<u64>());
            if !x.is_finite() {
                continue;
            }
            checked += 1;
            let flag = match checked % 3 {
                0 => RenderOptions::empty(),
                1 => RenderOptions::EXPONENT_ABSENT,
                _ => RenderOptions::EXPONENT_PRESENT,
            };
            let n = render_number_f64(
                &mut buf,
                x,
                0,
                flag | RenderOptions::JUST_ENOUGH_PRECISION,
            );
            assert!(n > 0);
            let back = parse_number_f64(&buf[..n]).unwrap();
            assert_eq!(back.to_bits(), x.to_bits(), "{x:?} via {:?}",
                std::str::from_utf8(&buf[..n]).unwrap());
        }
    }
}
