//! A high-precision decimal number with a separately tracked decimal point.
//!
//! [`Decimal`] is not a general purpose arithmetic type, only the exact
//! middle ground for conversions between decimal text and IEEE 754
//! double-precision floats: it backs the always-correct slow parsing path
//! and the whole rendering path.

use crate::error::{Error, Result};
use crate::table::{LSHIFT_NEW_DIGITS, POWERS_OF_5};

/// Number of decimal digits a [`Decimal`] can hold.
///
/// 800 comfortably covers every digit that can influence the rounding of a
/// finite f64, whose largest and smallest positive values are approximately
/// 1.8e+308 and 4.9e-324.
pub(crate) const MAX_DIGITS: usize = 800;

/// A `decimal_point` above `+DECIMAL_POINT_RANGE` means the value is
/// effectively infinite, below `-DECIMAL_POINT_RANGE` effectively zero.
/// The bounds sit further from zero than ±(324 + 800).
pub(crate) const DECIMAL_POINT_RANGE: i32 = 2047;

/// The largest shift such that `(10 << shift) < (1 << 64)`: the per-digit
/// carry of [`Decimal::small_lshift`] must fit in a u64.
pub(crate) const MAX_SHIFT: i32 = 60;

/// A fixed precision decimal floating point number, augmented with
/// ±infinity saturation. It cannot represent NaN.
///
/// `digits[..num_digits]` are the number's digits in big-endian order, as
/// numeric values in `0..=9` (not ASCII). `decimal_point` is the position
/// of the decimal point relative to `digits[0]`; it may be negative or
/// exceed `num_digits`, in which case the explicit digits are padded with
/// implicit zeroes. With digits `[7, 8, 9]`, a `decimal_point` of -1 means
/// `.0789`, of +1 means `7.89` and of +4 means `7890.`.
///
/// The all-zero value is valid and represents +0; `negative`
/// distinguishes -0 from it.
pub(crate) struct Decimal {
    pub num_digits: usize,
    pub decimal_point: i32,
    pub negative: bool,
    /// More than [`MAX_DIGITS`] digits were seen and at least one of the
    /// dropped digits was non-zero. The long tail can affect rounding.
    pub truncated: bool,
    pub digits: [u8; MAX_DIGITS],
}

impl Decimal {
    pub(crate) fn zero() -> Self {
        Decimal {
            num_digits: 0,
            decimal_point: 0,
            negative: false,
            truncated: false,
            digits: [0; MAX_DIGITS],
        }
    }

    /// Sets the number to the signed value of `x`.
    pub(crate) fn from_u64(x: u64, negative: bool) -> Self {
        let mut d = Decimal::zero();
        // u64::MAX is 20 digits long. Work right-to-left, then copy.
        let mut buf = [0u8; 20];
        let mut n = 0;
        let mut x = x;
        while x > 0 {
            buf[n] = (x % 10) as u8;
            x /= 10;
            n += 1;
        }
        for i in 0..n {
            d.digits[i] = buf[n - 1 - i];
        }
        d.num_digits = n;
        d.decimal_point = n as i32;
        d.negative = negative;
        d.trim();
        d
    }

    /// Parses a decimal number from `s`: an optional sign, digits with at
    /// most one `.` or `,` separator, an optional case-insensitive `e`
    /// exponent, and `_` padding anywhere between tokens. Both separators
    /// are accepted regardless of locale. Unnecessary leading zeroes
    /// ("007", "00.5") are rejected.
    pub(crate) fn parse(s: &[u8]) -> Result<Self> {
        let mut d = Decimal::zero();
        let mut i = 0;

        while i < s.len() && s[i] == b'_' {
            i += 1;
        }
        if i >= s.len() {
            return Err(Error::InvalidNumber);
        }

        // Sign.
        match s[i] {
            b'+' => i += 1,
            b'-' => {
                d.negative = true;
                i += 1;
            }
            _ => {}
        }

        // Digits.
        let mut nd = 0usize;
        let mut dp = 0i32;
        let mut saw_digits = false;
        let mut saw_non_zero_digits = false;
        let mut saw_dot = false;
        while i < s.len() {
            let c = s[i];
            if c == b'_' {
                // No-op.
            } else if c == b'.' || c == b',' {
                if saw_dot {
                    return Err(Error::InvalidNumber);
                }
                saw_dot = true;
                dp = nd as i32;
            } else if c == b'0' {
                if !saw_dot && !saw_non_zero_digits && saw_digits {
                    return Err(Error::InvalidNumber);
                }
                saw_digits = true;
                if nd == 0 {
                    // Track leading zeroes implicitly.
                    dp -= 1;
                } else if nd < MAX_DIGITS {
                    d.digits[nd] = 0;
                    nd += 1;
                }
                // Long-tail zeroes are dropped without effect.
            } else if c.is_ascii_digit() {
                if !saw_dot && !saw_non_zero_digits && saw_digits {
                    return Err(Error::InvalidNumber);
                }
                saw_digits = true;
                saw_non_zero_digits = true;
                if nd < MAX_DIGITS {
                    d.digits[nd] = c - b'0';
                    nd += 1;
                } else {
                    // Long-tail non-zeroes still matter for rounding.
                    d.truncated = true;
                }
            } else {
                break;
            }
            i += 1;
        }
        if !saw_digits {
            return Err(Error::InvalidNumber);
        }
        if !saw_dot {
            dp = nd as i32;
        }

        // Exponent.
        if i < s.len() && (s[i] == b'e' || s[i] == b'E') {
            i += 1;
            while i < s.len() && s[i] == b'_' {
                i += 1;
            }
            if i >= s.len() {
                return Err(Error::InvalidNumber);
            }
            let mut exp_sign = 1i32;
            match s[i] {
                b'+' => i += 1,
                b'-' => {
                    exp_sign = -1;
                    i += 1;
                }
                _ => {}
            }
            // Clamping the accumulator here keeps the arithmetic below in
            // i32 range while still saturating decimal_point correctly.
            const EXP_LARGE: i32 = DECIMAL_POINT_RANGE + MAX_DIGITS as i32;
            let mut exp = 0i32;
            let mut saw_exp_digits = false;
            while i < s.len() {
                let c = s[i];
                if c == b'_' {
                    // No-op.
                } else if c.is_ascii_digit() {
                    saw_exp_digits = true;
                    if exp < EXP_LARGE {
                        exp = (10 * exp) + (c - b'0') as i32;
                    }
                } else {
                    break;
                }
                i += 1;
            }
            if !saw_exp_digits {
                return Err(Error::InvalidNumber);
            }
            dp += exp_sign * exp;
        }

        if i != s.len() {
            return Err(Error::InvalidNumber);
        }

        d.num_digits = nd;
        if nd == 0 {
            d.decimal_point = 0;
        } else if dp < -DECIMAL_POINT_RANGE {
            d.decimal_point = -DECIMAL_POINT_RANGE - 1;
        } else if dp > DECIMAL_POINT_RANGE {
            d.decimal_point = DECIMAL_POINT_RANGE + 1;
        } else {
            d.decimal_point = dp;
        }
        d.trim();
        Ok(d)
    }

    /// Drops trailing zero digits. They carry no information since the
    /// decimal point is tracked separately.
    fn trim(&mut self) {
        while self.num_digits > 0 && self.digits[self.num_digits - 1] == 0 {
            self.num_digits -= 1;
        }
    }

    /// Returns the number of additional decimal digits a left shift by
    /// `shift` produces. The count is either N or N-1 (both encoded in
    /// [`LSHIFT_NEW_DIGITS`]), decided by a lexicographic comparison of the
    /// digits against `5 ** shift`; missing digits compare as zero, so a
    /// shorter prefix is strictly less.
    fn lshift_num_new_digits(&self, shift: u32) -> usize {
        // The mask is redundant given the callers' bounds but keeps the
        // table index in range no matter what.
        let shift = (shift & 63) as usize;
        let x_a = LSHIFT_NEW_DIGITS[shift];
        let x_b = LSHIFT_NEW_DIGITS[shift + 1];
        let num_new_digits = (x_a >> 11) as usize;
        let pow5 = &POWERS_OF_5[(x_a & 0x7FF) as usize..(x_b & 0x7FF) as usize];
        for (i, &p) in pow5.iter().enumerate() {
            if i >= self.num_digits {
                return num_new_digits - 1;
            }
            if self.digits[i] != p {
                return if self.digits[i] < p {
                    num_new_digits - 1
                } else {
                    num_new_digits
                };
            }
        }
        num_new_digits
    }

    /// Multiplies the number by `2 ** shift` for `1 <= shift <= `
    /// [`MAX_SHIFT`]. The decimal point must not be saturated.
    pub(crate) fn small_lshift(&mut self, shift: u32) {
        if self.num_digits == 0 {
            return;
        }
        let num_new_digits = self.lshift_num_new_digits(shift);
        let mut rx = self.num_digits as isize - 1; // Read index.
        let mut wx = rx + num_new_digits as isize; // Write index.
        let mut n = 0u64;

        // Pick up a digit, put down a digit, right to left.
        while rx >= 0 {
            n += (self.digits[rx as usize] as u64) << shift;
            let quo = n / 10;
            let rem = n - (10 * quo);
            if (0..MAX_DIGITS as isize).contains(&wx) {
                self.digits[wx as usize] = rem as u8;
            } else if rem > 0 {
                self.truncated = true;
            }
            n = quo;
            wx -= 1;
            rx -= 1;
        }

        // Put down the leading digits, right to left.
        while n > 0 {
            let quo = n / 10;
            let rem = n - (10 * quo);
            if (0..MAX_DIGITS as isize).contains(&wx) {
                self.digits[wx as usize] = rem as u8;
            } else if rem > 0 {
                self.truncated = true;
            }
            n = quo;
            wx -= 1;
        }

        self.num_digits = (self.num_digits + num_new_digits).min(MAX_DIGITS);
        self.decimal_point += num_new_digits as i32;
        self.trim();
    }

    /// Divides the number by `2 ** shift` for `1 <= shift <= `
    /// [`MAX_SHIFT`]. The decimal point must not be saturated.
    pub(crate) fn small_rshift(&mut self, shift: u32) {
        let mut rx = 0usize; // Read index.
        let mut wx = 0usize; // Write index.
        let mut n = 0u64;

        // Pick up enough leading digits to cover the first output digit.
        while (n >> shift) == 0 {
            if rx < self.num_digits {
                n = (10 * n) + self.digits[rx] as u64;
                rx += 1;
            } else if n == 0 {
                // The number was zero and remains zero.
                return;
            } else {
                // Read sufficient implicit trailing zeroes.
                while (n >> shift) == 0 {
                    n *= 10;
                    rx += 1;
                }
                break;
            }
        }
        self.decimal_point -= rx as i32 - 1;
        if self.decimal_point < -DECIMAL_POINT_RANGE {
            // The number is now effectively zero.
            *self = Decimal::zero();
            return;
        }

        // Pick up a digit, put down a digit, left to right.
        let mask = (1u64 << shift) - 1;
        while rx < self.num_digits {
            let new_digit = (n >> shift) as u8;
            n = (10 * (n & mask)) + self.digits[rx] as u64;
            rx += 1;
            self.digits[wx] = new_digit;
            wx += 1;
        }

        // Put down the trailing digits, left to right.
        while n > 0 {
            let new_digit = (n >> shift) as u8;
            n = 10 * (n & mask);
            if wx < MAX_DIGITS {
                self.digits[wx] = new_digit;
                wx += 1;
            } else if new_digit > 0 {
                self.truncated = true;
            }
        }

        self.num_digits = wx;
        self.trim();
    }

    /// Multiplies the number by `2 ** shift` for any signed `shift`, by
    /// splitting it into [`MAX_SHIFT`]-sized chunks. Zero is a no-op,
    /// negative shifts divide.
    pub(crate) fn shift(&mut self, mut shift: i32) {
        if shift > 0 {
            while shift > MAX_SHIFT {
                self.small_lshift(MAX_SHIFT as u32);
                shift -= MAX_SHIFT;
            }
            self.small_lshift(shift as u32);
        } else if shift < 0 {
            while shift < -MAX_SHIFT {
                self.small_rshift(MAX_SHIFT as u32);
                shift += MAX_SHIFT;
            }
            self.small_rshift((-shift) as u32);
        }
    }

    /// Truncates to at most `n` digits (not necessarily `n` decimal
    /// places). Negative `n` and `n >= num_digits` are no-ops, as for the
    /// other rounding modes.
    pub(crate) fn round_down(&mut self, n: i32) {
        if n < 0 || self.num_digits as i32 <= n {
            return;
        }
        self.num_digits = n as usize;
        self.trim();
    }

    /// Rounds away from zero to at most `n` digits.
    pub(crate) fn round_up(&mut self, n: i32) {
        if n < 0 || self.num_digits as i32 <= n {
            return;
        }
        for i in (0..n as usize).rev() {
            if self.digits[i] < 9 {
                self.digits[i] += 1;
                self.num_digits = i + 1;
                return;
            }
        }
        // The number was all 9s. It becomes a single 1 with the decimal
        // point moved over.
        self.digits[0] = 1;
        self.num_digits = 1;
        self.decimal_point += 1;
    }

    /// Rounds to at most `n` digits, to nearest. An exact halfway digit
    /// (a final 5 with nothing truncated after it) resolves to even.
    pub(crate) fn round_nearest(&mut self, n: i32) {
        if n < 0 || self.num_digits as i32 <= n {
            return;
        }
        let i = n as usize;
        let mut up = self.digits[i] >= 5;
        if self.digits[i] == 5 && i + 1 == self.num_digits {
            up = self.truncated || (i > 0 && (self.digits[i - 1] & 1) != 0);
        }
        if up {
            self.round_up(n);
        } else {
            self.round_down(n);
        }
    }

    /// Rounds to the fewest digits that still convert back to the same
    /// f64, given as the `(exp2, mantissa)` pair this number was produced
    /// from (the value `mantissa * 2 ** (exp2 - 52)`).
    pub(crate) fn round_just_enough(&mut self, exp2: i32, mantissa: u64) {
        // The magic numbers 52 and 53 are the explicit and full mantissa
        // bit widths of an f64.
        //
        // Zero and small integers are already exact.
        if mantissa == 0 || (exp2 < 53 && self.decimal_point >= self.num_digits as i32) {
            return;
        }

        const MIN_INCL_NORMAL_EXP2: i32 = -1022;
        const MIN_INCL_NORMAL_MANTISSA: u64 = 0x0010_0000_0000_0000;

        // Compute lower and upper bounds such that anything between them
        // (possibly inclusive) rounds to our value. Each bound is halfway
        // to the neighboring float, hence the 53 in place of 52. Stepping
        // down to the next lower float normally decrements the mantissa,
        // but drops to a halved mantissa step when that would leave the
        // normal range.
        let (l_exp2, l_mantissa) =
            if exp2 > MIN_INCL_NORMAL_EXP2 && mantissa <= MIN_INCL_NORMAL_MANTISSA {
                (exp2 - 1, (2 * mantissa) - 1)
            } else {
                (exp2, mantissa - 1)
            };
        let mut lower = Decimal::from_u64((2 * l_mantissa) + 1, false);
        lower.shift(l_exp2 - 53);
        let mut upper = Decimal::from_u64((2 * mantissa) + 1, false);
        upper.shift(exp2 - 53);

        // The bounds themselves are possible outputs only if the original
        // mantissa is even, when IEEE round-to-even resolves the tie back
        // to it.
        let inclusive = (mantissa & 1) == 0;

        // Tracks whether rounding up stays within the upper bound:
        //  -1: the digits of our number and upper agree so far.
        //   0: a difference of exactly 1 on an earlier digit, followed
        //      only by 9s for us and 0s for upper, so rounding up may
        //      land on the bound itself and needs `inclusive`.
        //  +1: upper is clearly ahead.
        // Only the ordering of the three states matters.
        let mut upper_delta = -1i32;

        // Walk the digit positions until our number has distinguished
        // itself from both bounds. The three numbers may have their
        // decimal points at different places; upper is the longest, so its
        // index `ui` anchors the loop and the others are derived from it,
        // possibly negative (reading an implicit leading zero).
        let mut ui = 0i32;
        loop {
            let hi = ui - upper.decimal_point + self.decimal_point;
            if hi >= self.num_digits as i32 {
                break;
            }
            let hd = if hi >= 0 { self.digits[hi as usize] } else { 0 };

            let li = ui - upper.decimal_point + lower.decimal_point;
            let ld = if li >= 0 && (li as usize) < lower.num_digits {
                lower.digits[li as usize]
            } else {
                0
            };

            // Rounding down is safe if lower has a different digit, or if
            // lower is inclusive and is exactly the result of rounding
            // down (we have reached its final digit).
            let can_round_down = ld != hd || (inclusive && li + 1 == lower.num_digits as i32);

            let ud = if (ui as usize) < upper.num_digits {
                upper.digits[ui as usize]
            } else {
                0
            };
            if upper_delta < 0 {
                if hd + 1 < ud {
                    // h     = 12345???
                    // upper = 12347???
                    upper_delta = 1;
                } else if hd != ud {
                    // h     = 12345???
                    // upper = 12346???
                    upper_delta = 0;
                }
            } else if upper_delta == 0 && (hd != 9 || ud != 0) {
                // h     = 1234598?
                // upper = 1234600?
                upper_delta = 1;
            }

            let can_round_up = upper_delta > 0
                || (upper_delta == 0 && (inclusive || ui + 1 < upper.num_digits as i32));

            // Round to nearest if both directions work, else whichever one
            // does, else keep walking.
            if can_round_down {
                if can_round_up {
                    self.round_nearest(hi + 1);
                } else {
                    self.round_down(hi + 1);
                }
                return;
            } else if can_round_up {
                self.round_up(hi + 1);
                return;
            }
            ui += 1;
        }
    }

    /// Returns the integral part, rounded to nearest with ties to even,
    /// provided it has 18 or fewer decimal digits; 19 or more yields
    /// `u64::MAX` as an overflow signal. The sign is ignored.
    ///
    /// (1 << 59) is 576460752303423488, 18 digits, so any 53-bit mantissa
    /// extraction fits comfortably below the overflow signal.
    pub(crate) fn rounded_integer(&self) -> u64 {
        if self.num_digits == 0 || self.decimal_point < 0 {
            return 0;
        } else if self.decimal_point > 18 {
            return u64::MAX;
        }

        let dp = self.decimal_point as usize;
        let mut n = 0u64;
        for i in 0..dp {
            n = (10 * n) + if i < self.num_digits { self.digits[i] as u64 } else { 0 };
        }

        let mut round_up = false;
        if dp < self.num_digits {
            round_up = self.digits[dp] >= 5;
            if self.digits[dp] == 5 && dp + 1 == self.num_digits {
                // Exactly halfway: round up if truncated, else to even.
                round_up = self.truncated || (dp > 0 && (self.digits[dp - 1] & 1) != 0);
            }
        }
        if round_up {
            n += 1;
        }
        n
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn digits(d: &Decimal) -> String {
        d.digits[..d.num_digits].iter().map(|&x| (b'0' + x) as char).collect()
    }

    #[test]
    fn test_from_u64() {
        let d = Decimal::from_u64(1234, false);
        assert_eq!(digits(&d), "1234");
        assert_eq!(d.decimal_point, 4);
        assert!(!d.negative);

        // Trailing zeroes trim away; the decimal point keeps the value.
        let d = Decimal::from_u64(8000, true);
        assert_eq!(digits(&d), "8");
        assert_eq!(d.decimal_point, 4);
        assert!(d.negative);

        let d = Decimal::from_u64(u64::MAX, false);
        assert_eq!(digits(&d), "18446744073709551615");
        assert_eq!(d.decimal_point, 20);

        let d = Decimal::from_u64(0, false);
        assert_eq!(d.num_digits, 0);
        assert_eq!(d.decimal_point, 0);
    }

    #[test]
    fn test_parse_ok() {
        let d = Decimal::parse(b"12.34").unwrap();
        assert_eq!(digits(&d), "1234");
        assert_eq!(d.decimal_point, 2);

        // Comma separator and underscore padding.
        let d = Decimal::parse(b"_-7,5_").unwrap();
        assert_eq!(digits(&d), "75");
        assert_eq!(d.decimal_point, 1);
        assert!(d.negative);

        // Leading zeroes of a fraction are tracked implicitly.
        let d = Decimal::parse(b"0.00025").unwrap();
        assert_eq!(digits(&d), "25");
        assert_eq!(d.decimal_point, -3);

        let d = Decimal::parse(b"1.5e+3").unwrap();
        assert_eq!(digits(&d), "15");
        assert_eq!(d.decimal_point, 4);

        let d = Decimal::parse(b"1.5E_-_3").unwrap();
        assert_eq!(d.decimal_point, -2);

        let d = Decimal::parse(b".5").unwrap();
        assert_eq!(digits(&d), "5");
        assert_eq!(d.decimal_point, 0);

        let d = Decimal::parse(b"0").unwrap();
        assert_eq!(d.num_digits, 0);
        assert_eq!(d.decimal_point, 0);
    }

    #[test]
    fn test_parse_bad() {
        for bad in [
            &b""[..],
            b"  ",
            b"_",
            b"+",
            b"007",
            b"00.5",
            b"1..2",
            b"1.2,3",
            b"1e",
            b"1e+",
            b"1e_",
            b"e9",
            b"1x",
            b"1.2e3x",
            b"--1",
        ] {
            assert!(Decimal::parse(bad).is_err(), "{:?}", bad);
        }
        // A single leading zero before the separator is fine.
        assert!(Decimal::parse(b"0.5").is_ok());
        assert!(Decimal::parse(b"0e9").is_ok());
    }

    #[test]
    fn test_parse_saturation() {
        let d = Decimal::parse(b"1e99999999").unwrap();
        assert_eq!(d.decimal_point, DECIMAL_POINT_RANGE + 1);
        let d = Decimal::parse(b"1e-99999999").unwrap();
        assert_eq!(d.decimal_point, -DECIMAL_POINT_RANGE - 1);

        // More than 800 significant digits sets the truncated flag only if
        // a dropped digit is non-zero.
        let mut long = vec![b'1'; MAX_DIGITS + 10];
        let d = Decimal::parse(&long).unwrap();
        assert_eq!(d.num_digits, MAX_DIGITS);
        assert!(d.truncated);

        for x in &mut long[MAX_DIGITS..] {
            *x = b'0';
        }
        let d = Decimal::parse(&long).unwrap();
        assert!(!d.truncated);
    }

    #[test]
    fn test_small_shifts() {
        // "234" << 3 is "1872".
        let mut d = Decimal::parse(b"234").unwrap();
        d.small_lshift(3);
        assert_eq!(digits(&d), "1872");
        assert_eq!(d.decimal_point, 4);

        // "625" << 4 is "10000": the lexicographic boundary case where the
        // larger new-digit count applies.
        let mut d = Decimal::parse(b"625").unwrap();
        d.small_lshift(4);
        assert_eq!(digits(&d), "1");
        assert_eq!(d.decimal_point, 5);

        // "624" << 4 is "9984": one digit fewer.
        let mut d = Decimal::parse(b"624").unwrap();
        d.small_lshift(4);
        assert_eq!(digits(&d), "9984");
        assert_eq!(d.decimal_point, 4);

        // "1872" >> 3 back to "234".
        let mut d = Decimal::parse(b"1872").unwrap();
        d.small_rshift(3);
        assert_eq!(digits(&d), "234");
        assert_eq!(d.decimal_point, 3);

        // "1" >> 2 is "0.25".
        let mut d = Decimal::parse(b"1").unwrap();
        d.small_rshift(2);
        assert_eq!(digits(&d), "25");
        assert_eq!(d.decimal_point, 0);
    }

    #[test]
    fn test_generic_shift_roundtrip() {
        for shift in [1i32, 7, 60, 61, 120, 155] {
            let mut d = Decimal::parse(b"3.14159").unwrap();
            d.shift(shift);
            d.shift(-shift);
            assert_eq!(digits(&d), "314159", "shift {shift}");
            assert_eq!(d.decimal_point, 1, "shift {shift}");
        }
    }

    #[test]
    fn test_round() {
        let mut d = Decimal::parse(b"1299").unwrap();
        d.round_down(2);
        assert_eq!(digits(&d), "12");

        let mut d = Decimal::parse(b"1299").unwrap();
        d.round_up(2);
        assert_eq!(digits(&d), "13");

        // Rounding up all-nines gains a digit.
        let mut d = Decimal::parse(b"999").unwrap();
        d.round_up(2);
        assert_eq!(digits(&d), "1");
        assert_eq!(d.decimal_point, 4);

        // Nearest: over and under halfway.
        let mut d = Decimal::parse(b"1251").unwrap();
        d.round_nearest(2);
        assert_eq!(digits(&d), "13");
        let mut d = Decimal::parse(b"1249").unwrap();
        d.round_nearest(2);
        assert_eq!(digits(&d), "12");

        // Exactly halfway resolves to even...
        let mut d = Decimal::parse(b"125").unwrap();
        d.round_nearest(2);
        assert_eq!(digits(&d), "12");
        let mut d = Decimal::parse(b"135").unwrap();
        d.round_nearest(2);
        assert_eq!(digits(&d), "14");

        // ...unless truncated digits lurk beyond the 5.
        let mut d = Decimal::parse(b"125").unwrap();
        d.truncated = true;
        d.round_nearest(2);
        assert_eq!(digits(&d), "13");

        // Negative and oversized n are no-ops.
        let mut d = Decimal::parse(b"125").unwrap();
        d.round_nearest(-1);
        d.round_nearest(3);
        d.round_nearest(99);
        assert_eq!(digits(&d), "125");
    }

    #[test]
    fn test_rounded_integer() {
        assert_eq!(Decimal::parse(b"1234.4").unwrap().rounded_integer(), 1234);
        assert_eq!(Decimal::parse(b"1234.5").unwrap().rounded_integer(), 1234);
        assert_eq!(Decimal::parse(b"1235.5").unwrap().rounded_integer(), 1236);
        assert_eq!(Decimal::parse(b"1234.51").unwrap().rounded_integer(), 1235);
        assert_eq!(Decimal::parse(b"0.6").unwrap().rounded_integer(), 1);
        assert_eq!(Decimal::parse(b"0.4").unwrap().rounded_integer(), 0);
        assert_eq!(Decimal::parse(b"0.001").unwrap().rounded_integer(), 0);
        // The sign is the caller's problem.
        assert_eq!(Decimal::parse(b"-8.6").unwrap().rounded_integer(), 9);
        // 19+ integral digits signal overflow.
        assert_eq!(
            Decimal::parse(b"9999999999999999999").unwrap().rounded_integer(),
            u64::MAX
        );
    }

    #[test]
    fn test_trim_invariant_after_mutation() {
        let mut d = Decimal::parse(b"102400").unwrap();
        for shift in [10u32, 3, 60, 1] {
            d.small_rshift(shift);
            assert!(d.num_digits == 0 || d.digits[d.num_digits - 1] != 0);
            d.small_lshift(shift);
            assert!(d.num_digits == 0 || d.digits[d.num_digits - 1] != 0);
            assert!(d.digits[..d.num_digits].iter().all(|&x| x <= 9));
        }
        assert_eq!(digits(&d), "1024");
        assert_eq!(d.decimal_point, 6);
    }
}
