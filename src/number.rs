//! Numeric decoding.
//!
//! Integers are parsed as an unsigned magnitude in the widest
//! representation, with overflow detection during accumulation when the
//! member enables range checking; the sign is applied only once the
//! magnitude is complete, with a representability check. Floats hand the
//! validated token to `lexical-parse-float` when the `lexical-parse`
//! feature is on, or to `core`'s parser otherwise.

use crate::error::{Error, ErrorKind, Result};
use crate::options::ParsePolicy;
use crate::parse_state::{at_end_of_item, ParseState};
use crate::serialize::JsonWrite;

mod sealed {
    pub trait Sealed {}
}

/// Floating-point targets of `Real` members.
pub trait JsonFloat: sealed::Sealed + Copy {
    #[doc(hidden)]
    const NAN: Self;
    #[doc(hidden)]
    const INFINITY: Self;
    #[doc(hidden)]
    fn negate(self) -> Self;
    #[doc(hidden)]
    fn parse_bytes(bytes: &[u8]) -> Option<Self>;
    #[doc(hidden)]
    fn write_json<W: JsonWrite>(self, out: &mut W);
}

macro_rules! impl_json_float {
    ($($t:ty),*) => {$(
        impl sealed::Sealed for $t {}

        impl JsonFloat for $t {
            const NAN: Self = <$t>::NAN;
            const INFINITY: Self = <$t>::INFINITY;

            fn negate(self) -> Self {
                -self
            }

            #[cfg(feature = "lexical-parse")]
            fn parse_bytes(bytes: &[u8]) -> Option<Self> {
                use lexical_parse_float::FromLexical as _;
                <$t>::from_lexical(bytes).ok()
            }

            #[cfg(not(feature = "lexical-parse"))]
            fn parse_bytes(bytes: &[u8]) -> Option<Self> {
                core::str::from_utf8(bytes).ok()?.parse::<$t>().ok()
            }

            fn write_json<W: JsonWrite>(self, out: &mut W) {
                if self.is_nan() {
                    out.write(b"NaN");
                } else if self.is_infinite() {
                    let literal: &[u8] = if self > 0.0 { b"Infinity" } else { b"-Infinity" };
                    out.write(literal);
                } else {
                    out.write(ryu::Buffer::new().format_finite(self).as_bytes());
                }
            }
        }
    )*};
}

impl_json_float!(f32, f64);

/// Integer targets of `Signed`/`Unsigned` members.
pub trait JsonInteger: sealed::Sealed + Copy {
    #[doc(hidden)]
    const SIGNED: bool;
    #[doc(hidden)]
    fn from_magnitude(magnitude: u128, negative: bool) -> Option<Self>;
    #[doc(hidden)]
    fn from_magnitude_wrapping(magnitude: u128, negative: bool) -> Self;
    #[doc(hidden)]
    fn write_json<W: JsonWrite>(self, out: &mut W);
}

macro_rules! impl_json_unsigned {
    ($($t:ty),*) => {$(
        impl sealed::Sealed for $t {}

        impl JsonInteger for $t {
            const SIGNED: bool = false;

            fn from_magnitude(magnitude: u128, negative: bool) -> Option<Self> {
                if negative {
                    return None;
                }
                <$t>::try_from(magnitude).ok()
            }

            fn from_magnitude_wrapping(magnitude: u128, _negative: bool) -> Self {
                magnitude as $t
            }

            fn write_json<W: JsonWrite>(self, out: &mut W) {
                out.write(itoa::Buffer::new().format(self).as_bytes());
            }
        }
    )*};
}

impl_json_unsigned!(u8, u16, u32, u64, u128, usize);

macro_rules! impl_json_signed {
    ($($t:ty),*) => {$(
        impl sealed::Sealed for $t {}

        impl JsonInteger for $t {
            const SIGNED: bool = true;

            fn from_magnitude(magnitude: u128, negative: bool) -> Option<Self> {
                const POSITIVE_LIMIT: u128 = <$t>::MAX.unsigned_abs() as u128;
                const NEGATIVE_LIMIT: u128 = <$t>::MIN.unsigned_abs() as u128;
                if negative {
                    if magnitude > NEGATIVE_LIMIT {
                        None
                    } else if magnitude == NEGATIVE_LIMIT {
                        Some(<$t>::MIN)
                    } else {
                        Some(-(magnitude as $t))
                    }
                } else if magnitude <= POSITIVE_LIMIT {
                    Some(magnitude as $t)
                } else {
                    None
                }
            }

            fn from_magnitude_wrapping(magnitude: u128, negative: bool) -> Self {
                let value = magnitude as $t;
                if negative { value.wrapping_neg() } else { value }
            }

            fn write_json<W: JsonWrite>(self, out: &mut W) {
                out.write(itoa::Buffer::new().format(self).as_bytes());
            }
        }
    )*};
}

impl_json_signed!(i8, i16, i32, i64, i128, isize);

/// Quote handling for literal members (`literal_as_string`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Quoting {
    Never,
    Maybe,
    Always,
}

/// Handle the leading quote of a quoted-literal member. Returns whether a
/// quote was consumed; a matching trailing quote is then required.
pub(crate) fn skip_quote_for_literal<P: ParsePolicy>(
    ps: &mut ParseState<'_, P>,
    quoting: Quoting,
) -> Result<bool> {
    match quoting {
        Quoting::Never => Ok(false),
        Quoting::Always => {
            if P::CHECKED && !ps.is_quotes_checked() {
                return Err(ps.error(ErrorKind::InvalidNumberUnexpectedQuoting));
            }
            ps.remove_prefix(1);
            Ok(true)
        }
        Quoting::Maybe => {
            if P::CHECKED && !ps.has_more() {
                return Err(ps.error(ErrorKind::UnexpectedEndOfData));
            }
            if ps.front() == b'"' {
                ps.remove_prefix(1);
                Ok(true)
            } else {
                Ok(false)
            }
        }
    }
}

pub(crate) fn close_quote<P: ParsePolicy>(ps: &mut ParseState<'_, P>, opened: bool) -> Result<()> {
    if !opened {
        return Ok(());
    }
    if P::CHECKED && !ps.is_quotes_checked() {
        return Err(ps.error(ErrorKind::InvalidNumberUnexpectedQuoting));
    }
    ps.remove_prefix(1);
    Ok(())
}

pub(crate) fn check_end_of_value<P: ParsePolicy>(ps: &ParseState<'_, P>) -> Result<()> {
    if P::CHECKED && ps.has_more() && !at_end_of_item(ps.front()) {
        return Err(ps.error(ErrorKind::InvalidEndOfValue));
    }
    Ok(())
}

/// Parse a floating-point member.
pub(crate) fn parse_real_value<T: JsonFloat, P: ParsePolicy>(
    ps: &mut ParseState<'_, P>,
    quoting: Quoting,
    allow_nan: bool,
    allow_inf: bool,
    known_bounds: bool,
) -> Result<T> {
    let opened = if known_bounds {
        false
    } else {
        skip_quote_for_literal(ps, quoting)?
    };
    if P::CHECKED && !ps.has_more() {
        return Err(ps.error(ErrorKind::UnexpectedEndOfData));
    }

    if allow_nan || allow_inf {
        if let Some(value) = parse_nonfinite::<T, P>(ps, allow_nan, allow_inf) {
            close_quote(ps, opened)?;
            check_end_of_value(ps)?;
            return Ok(value);
        }
    }

    let c = ps.front();
    if !(c == b'-' || c.is_ascii_digit()) {
        return Err(ps.error(ErrorKind::InvalidNumberStart));
    }
    let start = ps.offset();
    scan_number_token(ps)?;
    let token = &ps.input[start..ps.offset()];
    let value =
        T::parse_bytes(token).ok_or_else(|| Error::new(ErrorKind::InvalidNumber, start))?;
    close_quote(ps, opened)?;
    check_end_of_value(ps)?;
    Ok(value)
}

/// Match a relaxed `NaN`/`Inf`/`Infinity` literal with an optional sign.
fn parse_nonfinite<T: JsonFloat, P: ParsePolicy>(
    ps: &mut ParseState<'_, P>,
    allow_nan: bool,
    allow_inf: bool,
) -> Option<T> {
    let mut probe = *ps;
    let negative = probe.has_more() && probe.front() == b'-';
    if negative {
        probe.remove_prefix(1);
    }
    if allow_inf && probe.starts_with(b"Inf") {
        probe.remove_prefix(3);
        if probe.starts_with(b"inity") {
            probe.remove_prefix(5);
        }
        *ps = probe;
        let infinity = T::INFINITY;
        return Some(if negative { infinity.negate() } else { infinity });
    }
    if allow_nan && probe.starts_with(b"NaN") {
        probe.remove_prefix(3);
        *ps = probe;
        return Some(T::NAN);
    }
    None
}

/// Advance past one number token, validating its grammar in checked mode.
fn scan_number_token<P: ParsePolicy>(ps: &mut ParseState<'_, P>) -> Result<()> {
    if ps.front() == b'-' {
        ps.remove_prefix(1);
    }
    let int_digits = eat_digits(ps);
    if P::CHECKED && int_digits == 0 {
        return Err(ps.error(ErrorKind::InvalidNumberStart));
    }
    if ps.has_more() && ps.front() == b'.' {
        ps.remove_prefix(1);
        let fraction_digits = eat_digits(ps);
        if P::CHECKED && fraction_digits == 0 {
            return Err(ps.error(ErrorKind::InvalidNumber));
        }
    }
    if ps.has_more() && matches!(ps.front(), b'e' | b'E') {
        ps.remove_prefix(1);
        if ps.has_more() && matches!(ps.front(), b'+' | b'-') {
            ps.remove_prefix(1);
        }
        let exponent_digits = eat_digits(ps);
        if P::CHECKED && exponent_digits == 0 {
            return Err(ps.error(ErrorKind::InvalidNumber));
        }
    }
    Ok(())
}

fn eat_digits<P: ParsePolicy>(ps: &mut ParseState<'_, P>) -> usize {
    let start = ps.offset();
    while ps.has_more() && ps.front().is_ascii_digit() {
        ps.remove_prefix(1);
    }
    ps.offset() - start
}

/// Parse an integer member.
pub(crate) fn parse_int_value<T: JsonInteger, P: ParsePolicy>(
    ps: &mut ParseState<'_, P>,
    quoting: Quoting,
    range_check: bool,
    known_bounds: bool,
) -> Result<T> {
    let opened = if known_bounds {
        false
    } else {
        skip_quote_for_literal(ps, quoting)?
    };
    if P::CHECKED && !ps.has_more() {
        return Err(ps.error(ErrorKind::UnexpectedEndOfData));
    }
    let negative = match ps.front() {
        b'-' if T::SIGNED => {
            ps.remove_prefix(1);
            true
        }
        b'+' if T::SIGNED => {
            ps.remove_prefix(1);
            false
        }
        b'0'..=b'9' => false,
        _ => return Err(ps.error(ErrorKind::InvalidNumberStart)),
    };
    if P::CHECKED && !(ps.has_more() && ps.front().is_ascii_digit()) {
        return Err(ps.error(ErrorKind::InvalidNumberStart));
    }
    let magnitude = parse_unsigned_magnitude(ps, range_check)?;
    let value = if range_check {
        T::from_magnitude(magnitude, negative)
            .ok_or_else(|| ps.error(ErrorKind::NumberOutOfRange))?
    } else {
        T::from_magnitude_wrapping(magnitude, negative)
    };
    close_quote(ps, opened)?;
    check_end_of_value(ps)?;
    Ok(value)
}

/// Accumulate a digit run into a `u128` magnitude.
pub(crate) fn parse_unsigned_magnitude<P: ParsePolicy>(
    ps: &mut ParseState<'_, P>,
    range_check: bool,
) -> Result<u128> {
    let start = ps.offset();
    let mut end = start;
    while end < ps.last && ps.input[end].is_ascii_digit() {
        end += 1;
    }
    let digits = &ps.input[start..end];
    ps.first = end;

    #[cfg(feature = "lexical-parse")]
    if range_check && !digits.is_empty() {
        use lexical_parse_integer::FromLexical as _;
        return u128::from_lexical(digits)
            .map_err(|_| Error::new(ErrorKind::NumberOutOfRange, start));
    }

    let mut magnitude: u128 = 0;
    for &b in digits {
        let digit = u128::from(b - b'0');
        if range_check {
            magnitude = magnitude
                .checked_mul(10)
                .and_then(|m| m.checked_add(digit))
                .ok_or_else(|| Error::new(ErrorKind::NumberOutOfRange, start))?;
        } else {
            magnitude = magnitude.wrapping_mul(10).wrapping_add(digit);
        }
    }
    Ok(magnitude)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::DefaultPolicy;

    fn state(input: &[u8]) -> ParseState<'_, DefaultPolicy> {
        ParseState::new(input)
    }

    #[test]
    fn plain_integers() {
        let mut ps = state(b"42,");
        assert_eq!(
            parse_int_value::<u64, _>(&mut ps, Quoting::Never, true, false).unwrap(),
            42
        );

        let mut ps = state(b"-42]");
        assert_eq!(
            parse_int_value::<i64, _>(&mut ps, Quoting::Never, true, false).unwrap(),
            -42
        );
    }

    #[test]
    fn signed_boundaries() {
        let mut ps = state(b"-128}");
        assert_eq!(
            parse_int_value::<i8, _>(&mut ps, Quoting::Never, true, false).unwrap(),
            i8::MIN
        );

        let mut ps = state(b"-129}");
        let err = parse_int_value::<i8, _>(&mut ps, Quoting::Never, true, false).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NumberOutOfRange);
    }

    #[test]
    fn unsigned_rejects_sign() {
        let mut ps = state(b"-1,");
        let err = parse_int_value::<u32, _>(&mut ps, Quoting::Never, true, false).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidNumberStart);
    }

    #[test]
    fn overflow_is_detected_when_range_checked() {
        let mut ps = state(b"256,");
        let err = parse_int_value::<u8, _>(&mut ps, Quoting::Never, true, false).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NumberOutOfRange);
    }

    #[test]
    fn quoted_integer() {
        let mut ps = state(b"\"17\",");
        assert_eq!(
            parse_int_value::<u32, _>(&mut ps, Quoting::Always, true, false).unwrap(),
            17
        );

        // An unquoted value under Maybe quoting still parses.
        let mut ps = state(b"17,");
        assert_eq!(
            parse_int_value::<u32, _>(&mut ps, Quoting::Maybe, true, false).unwrap(),
            17
        );
    }

    #[test]
    fn quoted_literal_with_inner_whitespace_is_rejected() {
        let mut ps = state(b"\" 17\",");
        let err = parse_int_value::<u32, _>(&mut ps, Quoting::Maybe, true, false).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidNumberStart);
    }

    #[test]
    fn reals() {
        let mut ps = state(b"0.5,");
        let v: f64 = parse_real_value(&mut ps, Quoting::Never, false, false, false).unwrap();
        assert_eq!(v, 0.5);

        let mut ps = state(b"-1e2]");
        let v: f64 = parse_real_value(&mut ps, Quoting::Never, false, false, false).unwrap();
        assert_eq!(v, -100.0);
    }

    #[test]
    fn real_grammar_is_validated() {
        let mut ps = state(b"1.,");
        let err = parse_real_value::<f64, _>(&mut ps, Quoting::Never, false, false, false)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidNumber);

        let mut ps = state(b"1e,");
        let err = parse_real_value::<f64, _>(&mut ps, Quoting::Never, false, false, false)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidNumber);
    }

    #[test]
    fn nonfinite_literals_follow_member_policy() {
        let mut ps = state(b"\"NaN\",");
        let v: f64 =
            parse_real_value(&mut ps, Quoting::Maybe, true, false, false).unwrap();
        assert!(v.is_nan());

        let mut ps = state(b"\"NaN\",");
        let err = parse_real_value::<f64, _>(&mut ps, Quoting::Maybe, false, false, false)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidNumberStart);

        let mut ps = state(b"-Infinity,");
        let v: f64 =
            parse_real_value(&mut ps, Quoting::Maybe, false, true, false).unwrap();
        assert_eq!(v, f64::NEG_INFINITY);

        let mut ps = state(b"-Inf,");
        let v: f64 =
            parse_real_value(&mut ps, Quoting::Maybe, false, true, false).unwrap();
        assert_eq!(v, f64::NEG_INFINITY);
    }
}
