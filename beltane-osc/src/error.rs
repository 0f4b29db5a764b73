//! Codec failures.

use thiserror::Error;

use beltane_atom::ForgeError;

/// Why a codec call failed.
///
/// Errors are never recovered locally; they short-circuit up to the caller,
/// who discards whatever partial output was produced. Builder frame pairing
/// holds on every failure path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum OscError {
    /// The output region cannot accept more bytes.
    #[error("output capacity exhausted")]
    Overflow,
    /// Path violates the leading-`/` / printable / no-space / no-`#` rules.
    #[error("invalid OSC path")]
    BadPath,
    /// Format string without its leading `,`, or with an unknown tag.
    #[error("invalid OSC format string")]
    BadFormat,
    /// String argument with an interior NUL or non-UTF-8 wire bytes.
    #[error("malformed string argument")]
    BadString,
    /// A read would extend past the end of the wire region.
    #[error("truncated packet")]
    Truncated,
    /// Negative or non-multiple-of-four blob or bundle item size.
    #[error("bad blob or bundle item size")]
    BadItemSize,
    /// Structured argument whose type maps to no OSC tag, or an object that
    /// is neither a bundle nor a message.
    #[error("atom not representable in OSC")]
    Unrepresentable,
    /// Bundle bytes that do not begin with the `#bundle` literal.
    #[error("bad bundle header")]
    BadHeader,
    /// Packets nested deeper than the codec's bound.
    #[error("bundle nesting too deep")]
    TooDeep,
    /// The host mapper refused a URI, or a URID has no URI.
    #[error("URI not mapped by host")]
    UnknownUri,
}

impl From<ForgeError> for OscError {
    fn from(e: ForgeError) -> Self {
        match e {
            ForgeError::Overflow => OscError::Overflow,
            ForgeError::TooDeep => OscError::TooDeep,
        }
    }
}
