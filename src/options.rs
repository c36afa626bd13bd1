//! Parse policies.
//!
//! The parser is monomorphized over a [`ParsePolicy`]: a bundle of
//! associated constants that selects validation, scan primitives, and
//! whitespace handling. Hot paths branch on these constants, so every
//! policy compiles to its own specialized parser.

/// Which scan primitives the parser uses for multi-byte motions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecMode {
    /// Plain byte-at-a-time loops only.
    CompileTime,
    /// Scalar loops with accelerated single-needle searches.
    Runtime,
    /// Wide scans: `memchr` when the feature is enabled, a 16-byte
    /// window fallback otherwise.
    Simd,
}

/// Comment syntaxes treated as whitespace.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommentPolicy {
    /// Strict JSON: no comments.
    None,
    /// `//…` line comments and `/*…*/` block comments.
    Cpp,
    /// `#…` line comments.
    Hash,
}

/// Whether bytes above 0x7F are accepted inside strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EightBitMode {
    /// Accept any byte; multi-byte UTF-8 passes through.
    AllowHigh,
    /// Reject bytes above 0x7F with `InvalidStringHighAscii`.
    DisallowHigh,
}

/// Compile-time parser configuration.
///
/// Implement this on a marker type to build a custom bundle; the provided
/// defaults match [`DefaultPolicy`].
pub trait ParsePolicy {
    /// Validate bounds and literals on hot paths. When `false`, the caller
    /// promises well-formed input; malformed input may then produce wrong
    /// values or panic on a slice bound, but is never unsafe.
    const CHECKED: bool = true;
    /// Scan primitive selection.
    const EXEC: ExecMode = ExecMode::Runtime;
    /// Comment syntaxes accepted as whitespace.
    const COMMENTS: CommentPolicy = CommentPolicy::None;
    /// The document contains no insignificant whitespace; trimming is a
    /// no-op.
    const MINIFIED: bool = false;
    /// Scans may rely on a NUL terminator ending the buffer.
    const ZERO_TERMINATED: bool = false;
    /// Honour `\"` when scanning raw strings.
    const ALLOW_ESCAPES: bool = true;
    /// High eight-bit handling inside strings.
    const EIGHT_BIT: EightBitMode = EightBitMode::AllowHigh;
}

/// Checked parsing, runtime scans, strict JSON.
pub struct DefaultPolicy;

impl ParsePolicy for DefaultPolicy {}

/// No validation: the caller promises well-formed input.
pub struct UncheckedPolicy;

impl ParsePolicy for UncheckedPolicy {
    const CHECKED: bool = false;
}

/// Checked parsing over a document known to contain no insignificant
/// whitespace.
pub struct MinifiedPolicy;

impl ParsePolicy for MinifiedPolicy {
    const MINIFIED: bool = true;
}

/// Checked parsing with wide scans.
pub struct SimdPolicy;

impl ParsePolicy for SimdPolicy {
    const EXEC: ExecMode = ExecMode::Simd;
}

/// Unchecked parsing with wide scans.
pub struct UncheckedSimdPolicy;

impl ParsePolicy for UncheckedSimdPolicy {
    const CHECKED: bool = false;
    const EXEC: ExecMode = ExecMode::Simd;
}

/// Byte-at-a-time loops only; no accelerated primitives.
pub struct ScalarPolicy;

impl ParsePolicy for ScalarPolicy {
    const EXEC: ExecMode = ExecMode::CompileTime;
}

/// Checked parsing accepting `//…` and `/*…*/` comments as whitespace.
pub struct CppCommentsPolicy;

impl ParsePolicy for CppCommentsPolicy {
    const COMMENTS: CommentPolicy = CommentPolicy::Cpp;
}

/// Checked parsing accepting `#…` line comments as whitespace.
pub struct HashCommentsPolicy;

impl ParsePolicy for HashCommentsPolicy {
    const COMMENTS: CommentPolicy = CommentPolicy::Hash;
}

/// Checked parsing over a NUL-terminated buffer.
pub struct ZeroTerminatedPolicy;

impl ParsePolicy for ZeroTerminatedPolicy {
    const ZERO_TERMINATED: bool = true;
}

/// Strings are scanned without honouring `\"` escapes, and bytes above
/// 0x7F are rejected.
pub struct SevenBitRawPolicy;

impl ParsePolicy for SevenBitRawPolicy {
    const ALLOW_ESCAPES: bool = false;
    const EIGHT_BIT: EightBitMode = EightBitMode::DisallowHigh;
}
