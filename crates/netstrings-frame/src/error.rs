use std::fmt;

/// Number of leading bytes captured for malformed-input diagnostics.
pub const FRAGMENT_LEN: usize = 8;

/// The leading bytes of a buffer that failed to decode.
///
/// Holds at most [`FRAGMENT_LEN`] bytes and renders them both as an
/// escaped literal and as an uppercase hex dump, so malformed traffic
/// can be diagnosed without dumping unbounded payloads into logs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fragment(Vec<u8>);

impl Fragment {
    /// Capture the first bytes of `buf`.
    pub fn of(buf: &[u8]) -> Self {
        Self(buf[..buf.len().min(FRAGMENT_LEN)].to_vec())
    }

    /// The captured bytes.
    pub fn bytes(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Display for Fragment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "bytes:b\"{}\" HEX:", self.0.escape_ascii())?;
        for (i, b) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{b:02X}")?;
        }
        Ok(())
    }
}

/// Errors that can occur during netstring encoding/decoding.
///
/// Every variant is terminal for the current stream: the framing layer
/// never resynchronizes after a protocol violation.
#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    /// Declared or assembled frame length exceeds the configured bound.
    #[error("netstring too large (len {len}, max {max})")]
    FrameTooLarge { len: usize, max: usize },

    /// The length prefix is not an unsigned decimal integer.
    #[error("length prefix is not ascii digits. {fragment}")]
    InvalidLengthDigits { fragment: Fragment },

    /// No `:` delimiter where one was required.
    #[error("missing ':' delimiter. {fragment}")]
    MissingDelimiter { fragment: Fragment },

    /// The byte after the payload is not the `,` terminator.
    #[error("missing ',' terminator. {fragment}")]
    MissingTerminator { fragment: Fragment },

    /// A text payload is not valid UTF-8 under the strict policy.
    #[error("payload is not valid UTF-8: {0}")]
    Utf8(#[from] std::str::Utf8Error),
}

pub type Result<T> = std::result::Result<T, FrameError>;
