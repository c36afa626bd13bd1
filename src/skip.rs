//! Skip primitives: advance past a JSON value without materializing it,
//! returning the bounded sub-range it occupied.
//!
//! Skipped composite ranges include their closing bracket so downstream
//! parsers always see a terminator. Skipped string ranges are the content
//! between the quotes, with the cursor left past the closing quote. While
//! skipping a container, the number of top-level commas is recorded in the
//! result's `counter`; a skipped boolean records 0/1 there instead.

use crate::error::{ErrorKind, Result};
use crate::parse_state::{at_end_of_item, ParseState};
use crate::options::ParsePolicy;

/// Skip any JSON value at the cursor. A `null` literal is consumed but
/// yields an empty range, which is how downstream nullable parsers detect
/// the absent form.
pub(crate) fn skip_value<'de, P: ParsePolicy>(
    ps: &mut ParseState<'de, P>,
) -> Result<ParseState<'de, P>> {
    ps.trim_left();
    if P::CHECKED && !ps.has_more() {
        return Err(ps.error(ErrorKind::UnexpectedEndOfData));
    }
    match ps.front() {
        b'"' => skip_string(ps),
        b'{' => ps.skip_class(),
        b'[' => ps.skip_array(),
        b'n' => {
            let start = ps.offset();
            skip_literal(ps)?;
            Ok(ps.subrange(start, start))
        }
        b't' | b'f' => {
            let truthy = ps.front() == b't';
            let mut sub = skip_literal(ps)?;
            sub.counter = usize::from(truthy);
            Ok(sub)
        }
        _ => skip_literal(ps),
    }
}

/// Skip a quoted string. The cursor must be on the opening quote; the
/// returned range spans the content between the quotes.
pub(crate) fn skip_string<'de, P: ParsePolicy>(
    ps: &mut ParseState<'de, P>,
) -> Result<ParseState<'de, P>> {
    if P::CHECKED && !ps.is_quotes_checked() {
        return Err(ps.error(ErrorKind::InvalidString));
    }
    ps.remove_prefix(1);
    let start = ps.offset();
    if P::ALLOW_ESCAPES {
        ps.skip_until_end_of_string()?;
    } else {
        ps.move_to_next_of([b'"'])?;
    }
    let sub = ps.subrange(start, ps.offset());
    ps.remove_prefix(1);
    Ok(sub)
}

/// Skip an unquoted scalar token (number, boolean, `null`, or a relaxed
/// non-finite literal): everything up to the next end-of-item byte.
pub(crate) fn skip_literal<'de, P: ParsePolicy>(
    ps: &mut ParseState<'de, P>,
) -> Result<ParseState<'de, P>> {
    let start = ps.offset();
    while ps.has_more() && !at_end_of_item(ps.front()) {
        ps.remove_prefix(1);
    }
    Ok(ps.subrange(start, ps.offset()))
}

/// Skip a bracketed item whose opening bracket is at (or already behind)
/// the cursor, until the matching `PR` is consumed.
///
/// `SL`/`SR` track a secondary bracket pair that must balance to zero by
/// the time the primary closes; a mismatch is `InvalidBracketing`. A `,`
/// at primary depth 1 and secondary depth 0 bumps the element-count
/// prehint.
pub(crate) fn skip_bracketed_item<
    'de,
    P: ParsePolicy,
    const PL: u8,
    const PR: u8,
    const SL: u8,
    const SR: u8,
>(
    ps: &mut ParseState<'de, P>,
) -> Result<ParseState<'de, P>> {
    if P::CHECKED {
        skip_bracketed_item_checked::<P, PL, PR, SL, SR>(ps)
    } else {
        skip_bracketed_item_unchecked::<P, PL, PR, SL, SR>(ps)
    }
}

fn skip_bracketed_item_checked<
    'de,
    P: ParsePolicy,
    const PL: u8,
    const PR: u8,
    const SL: u8,
    const SR: u8,
>(
    ps: &mut ParseState<'de, P>,
) -> Result<ParseState<'de, P>> {
    let start = ps.offset();
    let mut count = 0usize;
    let mut primary = 1u32;
    let mut secondary = 0u32;

    if ps.has_more() && ps.front() == PL {
        ps.remove_prefix(1);
    }
    while ps.has_more() {
        let c = ps.front();
        if c == b'\\' {
            ps.remove_prefix(1);
            if !ps.has_more() {
                break;
            }
        } else if c == b'"' {
            ps.remove_prefix(1);
            ps.skip_until_end_of_string()?;
        } else if c == PL {
            primary += 1;
        } else if c == PR {
            primary -= 1;
            if primary == 0 {
                ps.remove_prefix(1);
                if secondary != 0 {
                    return Err(ps.error(ErrorKind::InvalidBracketing));
                }
                let mut sub = ps.subrange(start, ps.offset());
                sub.counter = count;
                return Ok(sub);
            }
        } else if c == SL {
            secondary += 1;
        } else if c == SR {
            if secondary == 0 {
                return Err(ps.error(ErrorKind::InvalidBracketing));
            }
            secondary -= 1;
        } else if c == b',' {
            if primary == 1 && secondary == 0 {
                count += 1;
            }
        }
        ps.remove_prefix(1);
    }
    Err(ps.error(ErrorKind::UnexpectedEndOfData))
}

fn skip_bracketed_item_unchecked<
    'de,
    P: ParsePolicy,
    const PL: u8,
    const PR: u8,
    const SL: u8,
    const SR: u8,
>(
    ps: &mut ParseState<'de, P>,
) -> Result<ParseState<'de, P>> {
    let start = ps.offset();
    let mut count = 0usize;
    let mut primary = 1u32;
    let mut secondary = 0u32;

    if ps.front() == PL {
        ps.remove_prefix(1);
    }
    loop {
        let c = ps.front();
        if c == b'\\' {
            ps.remove_prefix(1);
        } else if c == b'"' {
            ps.remove_prefix(1);
            ps.skip_until_end_of_string()?;
        } else if c == PL {
            primary += 1;
        } else if c == PR {
            primary -= 1;
            if primary == 0 {
                ps.remove_prefix(1);
                let mut sub = ps.subrange(start, ps.offset());
                sub.counter = count;
                return Ok(sub);
            }
        } else if c == SL {
            secondary += 1;
        } else if c == SR {
            secondary = secondary.wrapping_sub(1);
        } else if c == b',' {
            if primary == 1 && secondary == 0 {
                count += 1;
            }
        }
        ps.remove_prefix(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::DefaultPolicy;

    fn state(input: &[u8]) -> ParseState<'_, DefaultPolicy> {
        ParseState::new(input)
    }

    #[test]
    fn skipped_array_counts_top_level_commas() {
        let mut ps = state(b"[1,2,3,[4,5],6] tail");
        let sub = skip_value(&mut ps).unwrap();
        assert_eq!(sub.counter, 4);
        assert_eq!(sub.data(), b"[1,2,3,[4,5],6]");
        ps.trim_left();
        assert_eq!(ps.front(), b't');
    }

    #[test]
    fn empty_and_single_element_arrays() {
        let sub = skip_value(&mut state(b"[]")).unwrap();
        assert_eq!(sub.counter, 0);
        let sub = skip_value(&mut state(b"[42]")).unwrap();
        assert_eq!(sub.counter, 0);
    }

    #[test]
    fn commas_inside_strings_do_not_count() {
        let sub = skip_value(&mut state(br#"["a,b","c"]"#)).unwrap();
        assert_eq!(sub.counter, 1);
    }

    #[test]
    fn skipped_class_includes_closing_brace() {
        let mut ps = state(br#"{"a":1,"b":{"c":2}},"#);
        let sub = skip_value(&mut ps).unwrap();
        assert_eq!(sub.data(), br#"{"a":1,"b":{"c":2}}"#);
        assert_eq!(ps.front(), b',');
    }

    #[test]
    fn skipped_string_trims_quotes() {
        let mut ps = state(br#""hel\"lo" rest"#);
        let sub = skip_value(&mut ps).unwrap();
        assert_eq!(sub.data(), br#"hel\"lo"#);
        assert_eq!(ps.front(), b' ');
    }

    #[test]
    fn skipped_bool_memoizes_its_value() {
        let sub = skip_value(&mut state(b"true,")).unwrap();
        assert_eq!(sub.counter, 1);
        let sub = skip_value(&mut state(b"false,")).unwrap();
        assert_eq!(sub.counter, 0);
    }

    #[test]
    fn skipped_null_is_an_empty_range() {
        let mut ps = state(b"null}");
        let sub = skip_value(&mut ps).unwrap();
        assert!(sub.is_empty());
        assert_eq!(ps.front(), b'}');
    }

    #[test]
    fn mismatched_brackets_are_rejected() {
        let mut ps = state(b"[1,2}");
        // The secondary pair for an array skip is {}, so a stray `}` at
        // secondary depth 0 is a bracketing error.
        let err = skip_value(&mut ps).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidBracketing);
    }

    #[test]
    fn unterminated_value_is_reported() {
        let err = skip_value(&mut state(b"[1,2")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnexpectedEndOfData);
    }
}
