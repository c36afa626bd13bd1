//! String decoding.
//!
//! The skipper locates string boundaries; this module turns the content
//! bytes into text. The fast path (no backslash, and no byte above 0x7F
//! when the policy disallows them) borrows the bytes verbatim; the slow
//! path walks byte-by-byte, translating escapes and surrogate pairs into
//! UTF-8 with the output pre-sized.

use alloc::borrow::Cow;
use alloc::string::String;

use crate::error::{Error, ErrorKind, Result};
use crate::options::EightBitMode;
use crate::parse_state::find_byte;

/// True when the content cannot be borrowed verbatim.
pub(crate) fn needs_slow_path(bytes: &[u8], eight_bit: EightBitMode) -> bool {
    match eight_bit {
        EightBitMode::AllowHigh => find_byte(bytes, b'\\').is_some(),
        EightBitMode::DisallowHigh => bytes.iter().any(|&b| b == b'\\' || b >= 0x80),
    }
}

/// Decode string content located at `offset` within the input.
///
/// `checked` controls whether bare control bytes and unknown escapes are
/// rejected or passed through.
pub(crate) fn decode_string<'de>(
    bytes: &'de [u8],
    offset: usize,
    eight_bit: EightBitMode,
    checked: bool,
) -> Result<Cow<'de, str>> {
    if !needs_slow_path(bytes, eight_bit) {
        return match core::str::from_utf8(bytes) {
            Ok(s) => Ok(Cow::Borrowed(s)),
            Err(e) => Err(Error::new(ErrorKind::InvalidUtf8, offset + e.valid_up_to())),
        };
    }
    decode_string_slow(bytes, offset, eight_bit, checked).map(Cow::Owned)
}

fn decode_string_slow(
    bytes: &[u8],
    offset: usize,
    eight_bit: EightBitMode,
    checked: bool,
) -> Result<String> {
    let mut result = String::with_capacity(bytes.len());
    let mut i = 0;

    while i < bytes.len() {
        let byte = bytes[i];
        if byte == b'\\' {
            i += 1;
            let Some(&escape) = bytes.get(i) else {
                return Err(Error::new(ErrorKind::InvalidString, offset + i - 1));
            };
            match escape {
                b'"' => result.push('"'),
                b'\\' => result.push('\\'),
                b'/' => result.push('/'),
                b'b' => result.push('\x08'),
                b'f' => result.push('\x0c'),
                b'n' => result.push('\n'),
                b'r' => result.push('\r'),
                b't' => result.push('\t'),
                b'u' => {
                    i += 1;
                    let c = decode_unicode_escape(bytes, &mut i, offset)?;
                    result.push(c);
                    continue;
                }
                other => {
                    if checked {
                        return Err(Error::new(ErrorKind::InvalidString, offset + i));
                    }
                    result.push(other as char);
                }
            }
            i += 1;
        } else if byte < 0x20 {
            if checked {
                return Err(Error::new(ErrorKind::InvalidString, offset + i));
            }
            result.push(byte as char);
            i += 1;
        } else if byte < 0x80 {
            result.push(byte as char);
            i += 1;
        } else {
            if matches!(eight_bit, EightBitMode::DisallowHigh) {
                return Err(Error::new(ErrorKind::InvalidStringHighAscii, offset + i));
            }
            let remaining = &bytes[i..];
            let valid_len = match core::str::from_utf8(remaining) {
                Ok(_) => remaining.len(),
                Err(e) => e.valid_up_to(),
            };
            if valid_len == 0 {
                return Err(Error::new(ErrorKind::InvalidUtf8, offset + i));
            }
            // Consume exactly one UTF-8 character, then keep scanning for
            // escapes.
            let valid = core::str::from_utf8(&remaining[..valid_len])
                .map_err(|_| Error::new(ErrorKind::InvalidUtf8, offset + i))?;
            let Some(ch) = valid.chars().next() else {
                return Err(Error::new(ErrorKind::InvalidUtf8, offset + i));
            };
            result.push(ch);
            i += ch.len_utf8();
        }
    }

    Ok(result)
}

/// Decode `XXXX` (and a following low surrogate when required) starting at
/// `bytes[*i]`; leaves `*i` just past the consumed hex digits.
fn decode_unicode_escape(bytes: &[u8], i: &mut usize, offset: usize) -> Result<char> {
    let high = read_hex4(bytes, i, offset)?;

    let code_point = if (0xD800..=0xDBFF).contains(&high) {
        // High surrogate: a `\uXXXX` low surrogate must follow.
        if bytes.get(*i) != Some(&b'\\') || bytes.get(*i + 1) != Some(&b'u') {
            return Err(Error::new(ErrorKind::InvalidString, offset + *i));
        }
        *i += 2;
        let low = read_hex4(bytes, i, offset)?;
        if !(0xDC00..=0xDFFF).contains(&low) {
            return Err(Error::new(ErrorKind::InvalidString, offset + *i - 4));
        }
        0x10000 + ((u32::from(high) & 0x3FF) << 10) + (u32::from(low) & 0x3FF)
    } else if (0xDC00..=0xDFFF).contains(&high) {
        // Lone low surrogate.
        return Err(Error::new(ErrorKind::InvalidString, offset + *i - 4));
    } else {
        u32::from(high)
    };

    char::from_u32(code_point).ok_or_else(|| Error::new(ErrorKind::InvalidString, offset + *i))
}

fn read_hex4(bytes: &[u8], i: &mut usize, offset: usize) -> Result<u16> {
    let Some(hex) = bytes.get(*i..*i + 4) else {
        return Err(Error::new(ErrorKind::InvalidString, offset + *i));
    };
    let mut value: u16 = 0;
    for &b in hex {
        let digit = match b {
            b'0'..=b'9' => b - b'0',
            b'a'..=b'f' => b - b'a' + 10,
            b'A'..=b'F' => b - b'A' + 10,
            _ => return Err(Error::new(ErrorKind::InvalidString, offset + *i)),
        };
        value = (value << 4) | u16::from(digit);
    }
    *i += 4;
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode(bytes: &[u8]) -> Result<Cow<'_, str>> {
        decode_string(bytes, 0, EightBitMode::AllowHigh, true)
    }

    #[test]
    fn no_escapes_borrows() {
        let result = decode(b"hello world").unwrap();
        assert!(matches!(result, Cow::Borrowed(_)));
        assert_eq!(&*result, "hello world");
    }

    #[test]
    fn simple_escapes() {
        let result = decode(br#"a\tb\nc\"d\\e\/f"#).unwrap();
        assert!(matches!(result, Cow::Owned(_)));
        assert_eq!(&*result, "a\tb\nc\"d\\e/f");
    }

    #[test]
    fn unicode_escapes() {
        let result = decode(b"\\u0048\\u0065\\u006C\\u006C\\u006F").unwrap();
        assert_eq!(&*result, "Hello");
    }

    #[test]
    fn surrogate_pair() {
        let result = decode(b"\\uD83D\\uDE00").unwrap();
        assert_eq!(&*result, "\u{1F600}");
    }

    #[test]
    fn lone_surrogate_is_rejected() {
        assert_eq!(
            decode(br#"\uDC00"#).unwrap_err().kind(),
            ErrorKind::InvalidString
        );
        assert_eq!(
            decode(br#"\uD83Dxx"#).unwrap_err().kind(),
            ErrorKind::InvalidString
        );
    }

    #[test]
    fn bare_control_bytes_are_rejected_when_checked() {
        assert_eq!(
            decode(b"a\x01b\\n").unwrap_err().kind(),
            ErrorKind::InvalidString
        );
    }

    #[test]
    fn multibyte_utf8_passes_through() {
        let result = decode("héllo\\t".as_bytes()).unwrap();
        assert_eq!(&*result, "héllo\t");
    }

    #[test]
    fn high_bytes_rejected_when_disallowed() {
        let err =
            decode_string("héllo\\t".as_bytes(), 0, EightBitMode::DisallowHigh, true)
                .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidStringHighAscii);
    }
}
