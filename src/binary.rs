//! A medium-precision binary float: more mantissa bits than an f64, few
//! enough to stay in plain integer registers.
//!
//! This is the "Do It Yourself Floating Point" shape from Loitsch,
//! "Printing Floating-Point Numbers Quickly and Accurately with Integers".
//! It powers the fast parsing path: one 128-bit multiply against a
//! tabulated power of ten, with an explicit worst-case error bound that
//! tells us when the result is too close to a rounding boundary to trust.

use crate::decimal::Decimal;
use crate::table::{F64_POWERS_OF_10, POWERS_OF_10, POW10_EXP2_BIAS};

pub(crate) const F64_BIAS: i32 = -1023;

/// A floating point number as `man * 2 ** exp2`.
///
/// There is no implicit mantissa bit: `man` is zero if and only if the
/// value is +0, and the value is normalized if and only if `man` is zero
/// or has its high bit set. There is no sign bit either; the sign rides
/// along outside (on the [`Decimal`] being converted).
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub(crate) struct ExtendedFloat {
    pub man: u64,
    pub exp2: i32,
}

impl ExtendedFloat {
    /// Shifts the mantissa until its high bit is set, returning the shift
    /// amount so callers can scale their error estimate by the same
    /// factor.
    fn normalize(&mut self) -> u32 {
        if self.man == 0 {
            return 0;
        }
        let shift = self.man.leading_zeros();
        self.man <<= shift;
        self.exp2 -= shift as i32;
        shift
    }

    /// Multiplies by a [`POWERS_OF_10`] row. The result is rounded but not
    /// necessarily normalized. `self` must be normalized and non-zero; the
    /// table rows always are.
    fn mul_pow_10(&mut self, row: &(u64, u64, u16)) {
        let (_, p_man, p_exp2) = *row;
        let o = (self.man as u128) * (p_man as u128);
        let hi = (o >> 64) as u64;
        let lo = o as u64;
        // Round the mantissa up from the top bit of the low half. The
        // increment cannot overflow: hi is at most 0xFFFFFFFFFFFFFFFE.
        self.man = hi + (lo >> 63);
        self.exp2 += p_exp2 as i32 + 128 - POW10_EXP2_BIAS;
    }

    /// Converts to an f64, handling subnormals and overflow to infinity.
    /// `self` must be normalized and non-zero.
    fn as_f64(&self, negative: bool) -> f64 {
        let mut man64 = self.man;
        // Our binary point sits at the right hand end of the mantissa; an
        // f64 keeps it near the left hand end, behind an implicit leading
        // bit. Adding 63 bridges the two conventions.
        let mut exp2 = self.exp2 + 63;

        // Pre-shift subnormals so the exponent lands on the minimum normal
        // exponent.
        if exp2 < -1022 {
            let n = (-1022 - exp2) as u32;
            man64 >>= n;
            exp2 += n as i32;
        }

        // Take the top 1+52 of the 64 mantissa bits, rounding up from the
        // highest dropped bit (old bit 10) and fixing any carry out.
        let mut man53 = man64 >> 11;
        if man64 & 1024 != 0 {
            man53 += 1;
            if (man53 >> 53) != 0 {
                man53 >>= 1;
                exp2 += 1;
            }
        }

        // A nominal exponent of 1024 is infinity; a 53-bit mantissa whose
        // top bit cleared is subnormal and carries the -1023 sentinel.
        if exp2 >= 1024 {
            man53 = 0;
            exp2 = 1024;
        } else if (man53 >> 52) == 0 {
            exp2 = F64_BIAS;
        }

        let exp2_bits = ((exp2 - F64_BIAS) as u64) & 0x7FF;
        let bits = (man53 & 0x000F_FFFF_FFFF_FFFF)
            | (exp2_bits << 52)
            | if negative { 0x8000_0000_0000_0000 } else { 0 };
        f64::from_bits(bits)
    }
}

/// Attempts to convert `h` to an f64 in a handful of integer operations.
///
/// Returns `None` when there is ambiguity in the truncation or rounding:
/// the tracked worst-case error overlaps a rounding boundary, or the
/// exponent escapes the table. The caller then falls back to the exact
/// decimal path.
///
/// `skip_fast_path` suppresses both the exact-f64 shortcut and the final
/// success return, forcing the caller onto the slow path; tests use it to
/// exercise that path on inputs the fast one would otherwise absorb.
pub(crate) fn parse_from_decimal(h: &Decimal, skip_fast_path: bool) -> Option<f64> {
    // The mantissa below is an integer approximation to h's digit string.
    // `error` is an upper bound, in units of the last place, on how far
    // the approximation can drift from the true value. double-conversion's
    // DiyFpStrtod tracks the same thing at a 1/8th-ULP grain; whole ULPs
    // are coarser but simpler.
    let mut error = 0u64;

    // Convert up to 19 decimal digits to 64 binary digits: 1e19 < 2**64 <
    // 1e20. Any further digits are truncation, with error.
    let mut i_end = h.num_digits;
    if i_end > 19 {
        i_end = 19;
        error = 1;
    }
    let mut mantissa = 0u64;
    for &d in &h.digits[..i_end] {
        mantissa = (10 * mantissa) + d as u64;
    }

    // The power-of-ten table spans 1e-326..=1e+310.
    let exp10 = h.decimal_point - i_end as i32;
    if !(-326..=310).contains(&exp10) {
        return None;
    }

    // When the mantissa fits in 53 bits and the power of ten is exactly
    // representable, plain f64 arithmetic is already correctly rounded.
    //
    // 15 is such that 1e15 still fits losslessly in an f64 mantissa; 22 is
    // the largest exact entry in F64_POWERS_OF_10.
    'exact: {
        if skip_fast_path || (mantissa >> 52) != 0 {
            break 'exact;
        }
        let mut d = mantissa as f64;

        if exp10 == 0 {
            return Some(if h.negative { -d } else { d });
        } else if exp10 > 0 {
            if exp10 > 22 {
                if exp10 > 15 + 22 {
                    break 'exact;
                }
                // For exponents 23..=37, move a few of the zeroes from the
                // exponent into the mantissa. Still under 1e15 means no
                // mantissa bits were truncated.
                d *= F64_POWERS_OF_10[(exp10 - 22) as usize];
                if d >= 1e15 {
                    break 'exact;
                }
                d *= F64_POWERS_OF_10[22];
                return Some(if h.negative { -d } else { d });
            }
            d *= F64_POWERS_OF_10[exp10 as usize];
            return Some(if h.negative { -d } else { d });
        } else {
            if exp10 < -22 {
                break 'exact;
            }
            d /= F64_POWERS_OF_10[(-exp10) as usize];
            return Some(if h.negative { -d } else { d });
        }
    }

    let mut m = ExtendedFloat { man: mantissa, exp2: 0 };
    error <<= m.normalize();

    // The multiply compounds three error sources: our own mantissa's
    // accumulated error (scaled through), the truncation of the table
    // mantissa (under 1 ULP of the product), and the rounding of the
    // product (at most 1). Hence +2, then re-scaled by the
    // re-normalization shift.
    m.mul_pow_10(&POWERS_OF_10[(exp10 + 326) as usize]);
    error += 2;
    error <<= m.normalize();

    // Would the bits dropped when narrowing 64 mantissa bits to 1+52
    // round the same way even when perturbed by ±error? Normally 11
    // surplus bits; more when the result is subnormal.
    let subnormal_exp2 = F64_BIAS - 63;
    let mut surplus_bits = 11u32;
    if subnormal_exp2 >= m.exp2 {
        surplus_bits += 1 + (subnormal_exp2 - m.exp2) as u32;
        if surplus_bits >= 64 {
            // The entire mantissa is below the rounding boundary; no
            // error bound can decide this. (Values this small only occur
            // hard against the underflow-to-zero edge.)
            return None;
        }
    }
    let surplus = (m.man & ((1u64 << surplus_bits) - 1)) as i64;
    let halfway = 1i64 << (surplus_bits - 1);
    let error = error as i64;

    // Signed arithmetic on purpose: halfway - error can go below zero.
    if surplus > halfway - error && surplus < halfway + error {
        return None;
    }

    if skip_fast_path {
        return None;
    }
    Some(m.as_f64(h.negative))
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_normalize() {
        let mut m = ExtendedFloat { man: 1, exp2: 0 };
        assert_eq!(m.normalize(), 63);
        assert_eq!(m, ExtendedFloat { man: 1 << 63, exp2: -63 });

        let mut m = ExtendedFloat { man: u64::MAX, exp2: 5 };
        assert_eq!(m.normalize(), 0);
        assert_eq!(m.exp2, 5);

        let mut m = ExtendedFloat { man: 0, exp2: 7 };
        assert_eq!(m.normalize(), 0);
        assert_eq!(m.man, 0);
    }

    #[test]
    fn test_mul_pow_10_exact_powers() {
        // 4 * 10 = 40: the 1e1 row is exact, so the product is too.
        let mut m = ExtendedFloat { man: 4 << 61, exp2: -61 };
        m.mul_pow_10(&POWERS_OF_10[327]);
        m.normalize();
        assert_eq!(m.as_f64(false), 40.0);
    }

    #[test]
    fn test_as_f64() {
        // 1.0 is mantissa 2**63 at exp2 -63.
        let m = ExtendedFloat { man: 1 << 63, exp2: -63 };
        assert_eq!(m.as_f64(false), 1.0);
        assert_eq!(m.as_f64(true), -1.0);

        // Saturates to infinity past the exponent range.
        let m = ExtendedFloat { man: 1 << 63, exp2: 1000 };
        assert_eq!(m.as_f64(false), f64::INFINITY);
        assert_eq!(m.as_f64(true), f64::NEG_INFINITY);

        // The smallest positive subnormal.
        let m = ExtendedFloat { man: 1 << 63, exp2: -1074 - 63 };
        assert_eq!(m.as_f64(false).to_bits(), 1);
    }

    #[test]
    fn test_parse_from_decimal() {
        // Exact shortcut: small mantissa, small exponent.
        let h = Decimal::parse(b"250").unwrap();
        assert_eq!(parse_from_decimal(&h, false), Some(250.0));
        let h = Decimal::parse(b"-0.125").unwrap();
        assert_eq!(parse_from_decimal(&h, false), Some(-0.125));
        let h = Decimal::parse(b"5e22").unwrap();
        assert_eq!(parse_from_decimal(&h, false), Some(5e22));
        // 23..=37 shuffles zeroes into the mantissa first.
        let h = Decimal::parse(b"5e30").unwrap();
        assert_eq!(parse_from_decimal(&h, false), Some(5e30));

        // The multiply path agrees with std on a value needing it.
        let h = Decimal::parse(b"1.7976931348623157e+308").unwrap();
        assert_eq!(parse_from_decimal(&h, false), Some(f64::MAX));

        // Out of table range: decline.
        let h = Decimal::parse(b"1e400").unwrap();
        assert_eq!(parse_from_decimal(&h, false), None);

        // The test hook always declines.
        let h = Decimal::parse(b"250").unwrap();
        assert_eq!(parse_from_decimal(&h, true), None);
    }
}
