//! The parse cursor.
//!
//! [`ParseState`] is a non-owning view over the input: `first` advances as
//! bytes are consumed, `last` bounds the current value, and
//! `class_first`/`class_last` record the enclosing class body so that
//! out-of-order member lookup can rewind within that window without
//! escaping it. `counter` is an auxiliary slot written by the skipper: the
//! top-level comma count of a skipped container, or 0/1 after a skipped
//! boolean.
//!
//! Every multi-byte motion dispatches on the policy's [`ExecMode`]: plain
//! loops, accelerated single-needle scans, or wide scans.

use core::marker::PhantomData;

use crate::error::{Error, ErrorKind, Result};
use crate::options::{CommentPolicy, DefaultPolicy, ExecMode, ParsePolicy};

/// True for the bytes that may legally follow a completed scalar value.
#[inline]
pub(crate) const fn at_end_of_item(c: u8) -> bool {
    c == b',' || c == b']' || c == b'}' || c <= 0x20
}

/// Cursor into a JSON document, parameterized by a [`ParsePolicy`].
pub struct ParseState<'de, P: ParsePolicy = DefaultPolicy> {
    pub(crate) input: &'de [u8],
    pub(crate) first: usize,
    pub(crate) last: usize,
    pub(crate) class_first: usize,
    pub(crate) class_last: usize,
    pub(crate) counter: usize,
    _policy: PhantomData<P>,
}

impl<'de, P: ParsePolicy> core::fmt::Debug for ParseState<'de, P> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ParseState")
            .field("input", &self.input)
            .field("first", &self.first)
            .field("last", &self.last)
            .field("class_first", &self.class_first)
            .field("class_last", &self.class_last)
            .field("counter", &self.counter)
            .finish()
    }
}

impl<'de, P: ParsePolicy> Clone for ParseState<'de, P> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<'de, P: ParsePolicy> Copy for ParseState<'de, P> {}

impl<'de, P: ParsePolicy> ParseState<'de, P> {
    /// Create a cursor spanning the whole input.
    pub fn new(input: &'de [u8]) -> Self {
        ParseState {
            input,
            first: 0,
            last: input.len(),
            class_first: 0,
            class_last: input.len(),
            counter: 0,
            _policy: PhantomData,
        }
    }

    /// Byte offset of the cursor within the original input.
    pub fn offset(&self) -> usize {
        self.first
    }

    /// Build an error anchored at the current cursor position.
    pub fn error(&self, kind: ErrorKind) -> Error {
        Error::new(kind, self.first)
    }

    /// The unconsumed bytes of the current range.
    #[inline]
    pub(crate) fn data(&self) -> &'de [u8] {
        &self.input[self.first..self.last]
    }

    #[inline]
    pub(crate) fn has_more(&self) -> bool {
        self.first < self.last
    }

    #[inline]
    pub(crate) fn is_empty(&self) -> bool {
        self.first >= self.last
    }

    /// The byte under the cursor. Callers ensure `has_more()`.
    #[inline]
    pub(crate) fn front(&self) -> u8 {
        debug_assert!(self.has_more());
        self.input[self.first]
    }

    /// The byte just before the cursor, if any. Used by parsers re-entering
    /// a skipped range: the skipper trims the quotes off strings, so the
    /// byte before the range start reveals whether the value was a string.
    #[inline]
    pub(crate) fn prev_byte(&self) -> Option<u8> {
        self.first.checked_sub(1).map(|i| self.input[i])
    }

    #[inline]
    pub(crate) fn starts_with(&self, prefix: &[u8]) -> bool {
        self.data().starts_with(prefix)
    }

    #[inline]
    pub(crate) fn remove_prefix(&mut self, n: usize) {
        self.first += n;
        debug_assert!(self.first <= self.last);
    }

    /// A copy of this cursor narrowed to `[first, last)`.
    pub(crate) fn subrange(&self, first: usize, last: usize) -> Self {
        let mut sub = *self;
        sub.first = first;
        sub.last = last;
        sub.counter = 0;
        sub
    }

    // --- whitespace and comments -------------------------------------------

    /// Advance over whitespace (bytes <= 0x20) and, per policy, comments.
    pub(crate) fn trim_left(&mut self) {
        if P::MINIFIED {
            return;
        }
        loop {
            while self.first < self.last {
                let b = self.input[self.first];
                if b > 0x20 {
                    break;
                }
                if P::ZERO_TERMINATED && b == 0 {
                    return;
                }
                self.first += 1;
            }
            if matches!(P::COMMENTS, CommentPolicy::None) || !self.skip_comment() {
                return;
            }
        }
    }

    /// Same as [`trim_left`](Self::trim_left); kept separate so unchecked
    /// call sites read like their checked counterparts.
    #[inline]
    pub(crate) fn trim_left_unchecked(&mut self) {
        self.trim_left();
    }

    /// Consume one comment at the cursor. Returns false when the cursor is
    /// not at a comment opener.
    fn skip_comment(&mut self) -> bool {
        if !self.has_more() {
            return false;
        }
        match P::COMMENTS {
            CommentPolicy::Cpp => {
                if self.input[self.first] != b'/' || self.first + 1 >= self.last {
                    return false;
                }
                match self.input[self.first + 1] {
                    b'/' => {
                        self.first += 2;
                        self.skip_to_line_end();
                        true
                    }
                    b'*' => {
                        self.first += 2;
                        self.skip_block_comment_end();
                        true
                    }
                    _ => false,
                }
            }
            CommentPolicy::Hash => {
                if self.input[self.first] != b'#' {
                    return false;
                }
                self.first += 1;
                self.skip_to_line_end();
                true
            }
            CommentPolicy::None => false,
        }
    }

    fn skip_to_line_end(&mut self) {
        match find_byte(self.data(), b'\n') {
            Some(i) => self.first += i + 1,
            None => self.first = self.last,
        }
    }

    fn skip_block_comment_end(&mut self) {
        let mut pos = self.first;
        loop {
            match find_byte(&self.input[pos..self.last], b'*') {
                Some(i) => {
                    let star = pos + i;
                    if star + 1 < self.last && self.input[star + 1] == b'/' {
                        self.first = star + 2;
                        return;
                    }
                    pos = star + 1;
                }
                None => {
                    self.first = self.last;
                    return;
                }
            }
        }
    }

    // --- multi-byte motions -------------------------------------------------

    /// Advance until the byte under the cursor is one of `needles`.
    /// `N` must be at most 16.
    pub(crate) fn move_to_next_of<const N: usize>(&mut self, needles: [u8; N]) -> Result<()> {
        debug_assert!(N >= 1 && N <= 16);
        if !matches!(P::EXEC, ExecMode::CompileTime) {
            let haystack = self.data();
            let found = match N {
                1 => find_byte(haystack, needles[0]),
                2 => find_byte2(haystack, needles[0], needles[1]),
                3 => find_byte3(haystack, needles[0], needles[1], needles[2]),
                _ => haystack.iter().position(|b| needles.contains(b)),
            };
            return match found {
                Some(i) => {
                    self.first += i;
                    Ok(())
                }
                None => {
                    self.first = self.last;
                    Err(self.error(ErrorKind::UnexpectedEndOfData))
                }
            };
        }
        while self.first < self.last {
            if needles.contains(&self.input[self.first]) {
                return Ok(());
            }
            self.first += 1;
        }
        Err(self.error(ErrorKind::UnexpectedEndOfData))
    }

    /// Starting just after an opening quote, advance onto the closing
    /// unescaped quote.
    pub(crate) fn skip_until_end_of_string(&mut self) -> Result<()> {
        loop {
            self.move_to_next_of([b'"', b'\\'])?;
            if self.input[self.first] == b'"' {
                return Ok(());
            }
            // Escape: consume the backslash and the byte it escapes.
            self.first += 2;
            if self.first > self.last {
                return Err(Error::new(ErrorKind::UnexpectedEndOfData, self.last));
            }
        }
    }

    /// Skip whitespace and at most one `,`; settles at the next member or
    /// at the closing `}`/`]`.
    pub(crate) fn move_next_member_or_end(&mut self) {
        self.trim_left();
        if self.has_more() && self.front() == b',' {
            self.first += 1;
            self.trim_left();
        }
    }

    /// Advance to the next `"` beginning a member name, or to the class's
    /// closing `}`.
    pub(crate) fn move_to_next_class_member(&mut self) -> Result<()> {
        self.move_to_next_of([b'"', b'}'])
    }

    #[inline]
    pub(crate) fn is_at_next_class_member(&self) -> bool {
        self.has_more() && matches!(self.front(), b'"' | b'}')
    }

    #[inline]
    pub(crate) fn is_at_token_after_value(&self) -> bool {
        self.has_more() && matches!(self.front(), b',' | b'}' | b']')
    }

    // --- checked predicates -------------------------------------------------

    #[inline]
    pub(crate) fn is_opening_brace_checked(&self) -> bool {
        if P::CHECKED && !self.has_more() {
            return false;
        }
        self.input[self.first] == b'{'
    }

    #[inline]
    pub(crate) fn is_opening_bracket_checked(&self) -> bool {
        if P::CHECKED && !self.has_more() {
            return false;
        }
        self.input[self.first] == b'['
    }

    #[inline]
    pub(crate) fn is_quotes_checked(&self) -> bool {
        if P::CHECKED && !self.has_more() {
            return false;
        }
        self.input[self.first] == b'"'
    }

    // --- bracketed skips ----------------------------------------------------

    /// Skip a class body from anywhere inside it, past the matching `}`.
    pub(crate) fn skip_class(&mut self) -> Result<Self> {
        crate::skip::skip_bracketed_item::<P, { b'{' }, { b'}' }, { b'[' }, { b']' }>(self)
    }

    /// Skip an array body from anywhere inside it, past the matching `]`.
    pub(crate) fn skip_array(&mut self) -> Result<Self> {
        crate::skip::skip_bracketed_item::<P, { b'[' }, { b']' }, { b'{' }, { b'}' }>(self)
    }

    // --- class positions ----------------------------------------------------

    #[inline]
    pub(crate) fn get_class_position(&self) -> (usize, usize) {
        (self.class_first, self.class_last)
    }

    #[inline]
    pub(crate) fn set_class_position(&mut self, (first, last): (usize, usize)) {
        self.class_first = first;
        self.class_last = last;
    }

    /// Record the current range as the enclosing class body. Called just
    /// after the opening `{` has been consumed.
    #[inline]
    pub(crate) fn set_class_position_here(&mut self) {
        self.class_first = self.first;
        self.class_last = self.last;
    }

    /// A cursor over the enclosing class body. Used to resolve dependent
    /// members (variant tags, sized-array counts) that may appear before
    /// or after the member currently being parsed.
    pub(crate) fn class_region(&self) -> Self {
        self.subrange(self.class_first, self.class_last)
    }
}

// --- byte search primitives -------------------------------------------------

#[cfg(feature = "memchr")]
pub(crate) fn find_byte(haystack: &[u8], n1: u8) -> Option<usize> {
    memchr::memchr(n1, haystack)
}

#[cfg(feature = "memchr")]
pub(crate) fn find_byte2(haystack: &[u8], n1: u8, n2: u8) -> Option<usize> {
    memchr::memchr2(n1, n2, haystack)
}

#[cfg(feature = "memchr")]
pub(crate) fn find_byte3(haystack: &[u8], n1: u8, n2: u8, n3: u8) -> Option<usize> {
    memchr::memchr3(n1, n2, n3, haystack)
}

#[cfg(not(feature = "memchr"))]
pub(crate) fn find_byte(haystack: &[u8], n1: u8) -> Option<usize> {
    swar_find(haystack, |w| window_has_byte(w, n1), |b| b == n1)
}

#[cfg(not(feature = "memchr"))]
pub(crate) fn find_byte2(haystack: &[u8], n1: u8, n2: u8) -> Option<usize> {
    swar_find(
        haystack,
        |w| window_has_byte(w, n1) || window_has_byte(w, n2),
        |b| b == n1 || b == n2,
    )
}

#[cfg(not(feature = "memchr"))]
pub(crate) fn find_byte3(haystack: &[u8], n1: u8, n2: u8, n3: u8) -> Option<usize> {
    swar_find(
        haystack,
        |w| window_has_byte(w, n1) || window_has_byte(w, n2) || window_has_byte(w, n3),
        |b| b == n1 || b == n2 || b == n3,
    )
}

/// Scan 16 bytes at a time; fall back to a byte loop for the tail and for
/// any window that may contain a hit.
#[cfg(not(feature = "memchr"))]
fn swar_find(
    haystack: &[u8],
    window_hits: impl Fn(u128) -> bool,
    byte_hits: impl Fn(u8) -> bool,
) -> Option<usize> {
    const STEP: usize = 16;
    let mut pos = 0;
    while pos + STEP <= haystack.len() {
        let mut chunk = [0u8; STEP];
        chunk.copy_from_slice(&haystack[pos..pos + STEP]);
        if window_hits(u128::from_ne_bytes(chunk)) {
            break;
        }
        pos += STEP;
    }
    haystack[pos..]
        .iter()
        .position(|&b| byte_hits(b))
        .map(|i| pos + i)
}

/// True when any byte of the 16-byte window equals `needle`.
///
/// XORing the window against the needle spread to every lane turns each
/// match into a zero byte; adding 0x7F to the low seven bits of a lane
/// carries into its top bit unless the lane was zero, so folding that
/// with the lane's own top bit leaves only the matching lanes below
/// 0xFF.
#[cfg(not(feature = "memchr"))]
#[inline]
const fn window_has_byte(window: u128, needle: u8) -> bool {
    const LANES: u128 = 0x01010101010101010101010101010101;
    const LOW_SEVEN: u128 = 0x7f7f7f7f7f7f7f7f7f7f7f7f7f7f7f7f;
    let diff = window ^ (needle as u128).wrapping_mul(LANES);
    let carried = (diff & LOW_SEVEN) + LOW_SEVEN;
    !(carried | diff | LOW_SEVEN) != 0
}
