//! Serialization: the output sink abstraction and the formatting policy
//! that mirrors the parser.

use alloc::vec::Vec;

/// Byte sink for serialization.
///
/// Writes are infallible; sinks that can fail (such as the
/// [`StdWriteAdapter`]) buffer their first error and surface it when the
/// caller finishes.
pub trait JsonWrite {
    /// Append bytes to the output.
    fn write(&mut self, buf: &[u8]);

    /// Hint that `additional` bytes are about to be written.
    fn reserve(&mut self, additional: usize);
}

impl JsonWrite for Vec<u8> {
    fn write(&mut self, buf: &[u8]) {
        self.extend_from_slice(buf);
    }

    fn reserve(&mut self, additional: usize) {
        Vec::reserve(self, additional);
    }
}

impl<W: JsonWrite + ?Sized> JsonWrite for &mut W {
    fn write(&mut self, buf: &[u8]) {
        (**self).write(buf);
    }

    fn reserve(&mut self, additional: usize) {
        (**self).reserve(additional);
    }
}

/// Adapter that lets a `std::io::Write` act as a [`JsonWrite`] sink. The
/// first I/O error is buffered; retrieve it with
/// [`into_result`](Self::into_result).
#[cfg(feature = "std")]
pub struct StdWriteAdapter<W> {
    writer: W,
    error: Option<std::io::Error>,
}

#[cfg(feature = "std")]
impl<W: std::io::Write> StdWriteAdapter<W> {
    /// Wrap a writer.
    pub fn new(writer: W) -> Self {
        StdWriteAdapter {
            writer,
            error: None,
        }
    }

    /// The buffered error, if any write failed.
    pub fn into_result(self) -> std::io::Result<()> {
        match self.error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

#[cfg(feature = "std")]
impl<W: std::io::Write> JsonWrite for StdWriteAdapter<W> {
    fn write(&mut self, buf: &[u8]) {
        if self.error.is_none() {
            if let Err(e) = self.writer.write_all(buf) {
                self.error = Some(e);
            }
        }
    }

    fn reserve(&mut self, _additional: usize) {}
}

/// Serialization error. Writing through a [`JsonWrite`] sink cannot fail,
/// so this is uninhabited.
#[derive(Debug)]
pub enum SerializeError {}

impl core::fmt::Display for SerializeError {
    fn fmt(&self, _f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match *self {}
    }
}

#[cfg(feature = "std")]
impl std::error::Error for SerializeError {}

/// Overall output shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SerializationFormat {
    /// No insignificant whitespace.
    Minified,
    /// Newlines and indentation between members.
    Pretty,
}

/// Indentation emitted per nesting level in pretty output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndentationType {
    /// Two spaces.
    Space2,
    /// Four spaces.
    Space4,
    /// One tab.
    Tab,
}

impl IndentationType {
    fn as_bytes(self) -> &'static [u8] {
        match self {
            IndentationType::Space2 => b"  ",
            IndentationType::Space4 => b"    ",
            IndentationType::Tab => b"\t",
        }
    }
}

/// Newline delimiter in pretty output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NewLineDelimiter {
    /// `\n`
    Lf,
    /// `\r\n`
    CrLf,
}

impl NewLineDelimiter {
    fn as_bytes(self) -> &'static [u8] {
        match self {
            NewLineDelimiter::Lf => b"\n",
            NewLineDelimiter::CrLf => b"\r\n",
        }
    }
}

/// How aggressively string output is escaped. Control bytes below 0x20
/// are always escaped; this optionally extends escaping to all non-ASCII.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RestrictedStringOutput {
    /// Emit multi-byte UTF-8 verbatim.
    None,
    /// Escape everything above 0x7F as `\uXXXX` (surrogate pairs for
    /// astral characters), yielding pure-ASCII output.
    EscapeNonAscii,
}

/// Options for serialization.
#[derive(Debug, Clone)]
pub struct SerializeOptions {
    /// Minified or pretty output (default: minified).
    pub format: SerializationFormat,
    /// Indentation per level in pretty output (default: two spaces).
    pub indentation: IndentationType,
    /// Newline delimiter in pretty output (default: `\n`).
    pub newline: NewLineDelimiter,
    /// Emit a trailing comma after the last member (default: off).
    pub trailing_comma: bool,
    /// String escaping restriction (default: none).
    pub restricted: RestrictedStringOutput,
}

impl Default for SerializeOptions {
    fn default() -> Self {
        SerializeOptions {
            format: SerializationFormat::Minified,
            indentation: IndentationType::Space2,
            newline: NewLineDelimiter::Lf,
            trailing_comma: false,
            restricted: RestrictedStringOutput::None,
        }
    }
}

impl SerializeOptions {
    /// Create new default options (minified output).
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable pretty-printing.
    pub const fn pretty(mut self) -> Self {
        self.format = SerializationFormat::Pretty;
        self
    }

    /// Set the indentation (implies pretty-printing).
    pub const fn indentation(mut self, indentation: IndentationType) -> Self {
        self.indentation = indentation;
        self.format = SerializationFormat::Pretty;
        self
    }

    /// Set the newline delimiter.
    pub const fn newline(mut self, newline: NewLineDelimiter) -> Self {
        self.newline = newline;
        self
    }

    /// Emit a trailing comma after the last member of every container.
    pub const fn trailing_comma(mut self) -> Self {
        self.trailing_comma = true;
        self
    }

    /// Restrict string output.
    pub const fn restricted(mut self, restricted: RestrictedStringOutput) -> Self {
        self.restricted = restricted;
        self
    }
}

/// The serializer's counterpart to the parse state: a sink reference plus
/// formatting options and the current indentation level.
pub struct SerializationPolicy<'w, W: JsonWrite> {
    writer: &'w mut W,
    options: SerializeOptions,
    indentation_level: usize,
}

impl<'w, W: JsonWrite> SerializationPolicy<'w, W> {
    /// Create a policy writing to `writer`.
    pub fn new(writer: &'w mut W, options: SerializeOptions) -> Self {
        SerializationPolicy {
            writer,
            options,
            indentation_level: 0,
        }
    }

    /// Direct access to the sink.
    pub fn writer(&mut self) -> &mut W {
        self.writer
    }

    /// Append bytes verbatim.
    pub fn write(&mut self, bytes: &[u8]) {
        self.writer.write(bytes);
    }

    /// Append one byte.
    pub fn put(&mut self, byte: u8) {
        self.writer.write(core::slice::from_ref(&byte));
    }

    fn pretty(&self) -> bool {
        matches!(self.options.format, SerializationFormat::Pretty)
    }

    /// Whether containers emit a comma after their last member.
    pub fn output_trailing_comma(&self) -> bool {
        self.options.trailing_comma
    }

    /// Enter one nesting level.
    pub fn add_indent(&mut self) {
        if self.pretty() {
            self.indentation_level += 1;
        }
    }

    /// Leave one nesting level.
    pub fn del_indent(&mut self) {
        if self.pretty() {
            self.indentation_level -= 1;
        }
    }

    /// Break the line before the next member in pretty output.
    pub fn next_member(&mut self) {
        if self.pretty() {
            self.writer.write(self.options.newline.as_bytes());
            for _ in 0..self.indentation_level {
                self.writer.write(self.options.indentation.as_bytes());
            }
        }
    }

    /// Write `:`, with a following space in pretty output.
    pub fn put_colon(&mut self) {
        if self.pretty() {
            self.write(b": ");
        } else {
            self.put(b':');
        }
    }

    /// Write `"name":` for a class member.
    pub fn write_member_name(&mut self, name: &str) {
        self.write_quoted_str(name);
        self.put_colon();
    }

    /// Write a string value with quotes and escaping.
    pub fn write_quoted_str(&mut self, s: &str) {
        self.writer.reserve(s.len() + 2);
        self.put(b'"');
        self.write_escaped(s);
        self.put(b'"');
    }

    fn write_escaped(&mut self, s: &str) {
        let escape_non_ascii = matches!(
            self.options.restricted,
            RestrictedStringOutput::EscapeNonAscii
        );
        let bytes = s.as_bytes();
        let mut flushed = 0;
        for (i, ch) in s.char_indices() {
            let simple: Option<&[u8]> = match ch {
                '"' => Some(b"\\\""),
                '\\' => Some(b"\\\\"),
                '\u{08}' => Some(b"\\b"),
                '\u{0c}' => Some(b"\\f"),
                '\n' => Some(b"\\n"),
                '\r' => Some(b"\\r"),
                '\t' => Some(b"\\t"),
                _ => None,
            };
            let needs_unicode_escape =
                simple.is_none() && ((ch as u32) < 0x20 || (escape_non_ascii && !ch.is_ascii()));
            if simple.is_none() && !needs_unicode_escape {
                continue;
            }
            self.write(&bytes[flushed..i]);
            match simple {
                Some(escape) => self.write(escape),
                None => self.write_unicode_escape(ch),
            }
            flushed = i + ch.len_utf8();
        }
        self.write(&bytes[flushed..]);
    }

    fn write_unicode_escape(&mut self, ch: char) {
        let mut units = [0u16; 2];
        for &unit in ch.encode_utf16(&mut units).iter() {
            const HEX: &[u8; 16] = b"0123456789abcdef";
            let escape = [
                b'\\',
                b'u',
                HEX[usize::from(unit >> 12 & 0xF)],
                HEX[usize::from(unit >> 8 & 0xF)],
                HEX[usize::from(unit >> 4 & 0xF)],
                HEX[usize::from(unit & 0xF)],
            ];
            self.write(&escape);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy_output(options: SerializeOptions, f: impl FnOnce(&mut SerializationPolicy<Vec<u8>>)) -> alloc::string::String {
        let mut buf = Vec::new();
        let mut policy = SerializationPolicy::new(&mut buf, options);
        f(&mut policy);
        alloc::string::String::from_utf8(buf).unwrap()
    }

    #[test]
    fn escapes_specials_and_controls() {
        let out = policy_output(SerializeOptions::default(), |p| {
            p.write_quoted_str("a\"b\\c\nd\u{01}e");
        });
        assert_eq!(out, r#""a\"b\\c\nd\u0001e""#);
    }

    #[test]
    fn non_ascii_passes_through_by_default() {
        let out = policy_output(SerializeOptions::default(), |p| {
            p.write_quoted_str("héllo");
        });
        assert_eq!(out, "\"héllo\"");
    }

    #[test]
    fn restricted_output_escapes_non_ascii() {
        let options =
            SerializeOptions::default().restricted(RestrictedStringOutput::EscapeNonAscii);
        let out = policy_output(options, |p| {
            p.write_quoted_str("é😀");
        });
        assert_eq!(out, r#""\u00e9\ud83d\ude00""#);
    }
}
