use bytes::BytesMut;

use crate::codec::{pack, unpack};
use crate::error::Result;

/// How invalid UTF-8 in a text payload is handled on decode.
///
/// The framing layer itself is byte-oriented; this policy only applies
/// when a payload is interpreted as text.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum Utf8Policy {
    /// Fail with [`crate::FrameError::Utf8`] on invalid sequences.
    #[default]
    Strict,
    /// Substitute invalid sequences with U+FFFD.
    Replace,
    /// Drop invalid bytes.
    Discard,
}

/// Encode `text` as a UTF-8 netstring, appended to `dst`.
pub fn pack_text(text: &str, max_frame: usize, dst: &mut BytesMut) -> Result<()> {
    pack(text.as_bytes(), max_frame, dst)
}

/// Decode one netstring from `src` and interpret the payload as UTF-8.
///
/// Same three-outcome contract as [`unpack`]; the payload is converted
/// according to `policy`.
pub fn unpack_text(
    src: &mut BytesMut,
    max_frame: usize,
    policy: Utf8Policy,
) -> Result<Option<String>> {
    let Some(payload) = unpack(src, max_frame)? else {
        return Ok(None);
    };
    decode_utf8(&payload, policy).map(Some)
}

/// Convert raw payload bytes to a `String` under `policy`.
pub fn decode_utf8(bytes: &[u8], policy: Utf8Policy) -> Result<String> {
    match policy {
        Utf8Policy::Strict => Ok(std::str::from_utf8(bytes)?.to_owned()),
        Utf8Policy::Replace => Ok(String::from_utf8_lossy(bytes).into_owned()),
        Utf8Policy::Discard => {
            let mut out = String::with_capacity(bytes.len());
            for chunk in bytes.utf8_chunks() {
                out.push_str(chunk.valid());
            }
            Ok(out)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::DEFAULT_MAX_FRAME;
    use crate::error::FrameError;

    fn unpack_all(wire: &[u8], policy: Utf8Policy) -> Result<Option<String>> {
        let mut buf = BytesMut::from(wire);
        unpack_text(&mut buf, DEFAULT_MAX_FRAME, policy)
    }

    #[test]
    fn text_roundtrip() {
        let mut buf = BytesMut::new();
        pack_text("Hello world!", DEFAULT_MAX_FRAME, &mut buf).unwrap();
        assert_eq!(buf.as_ref(), b"12:Hello world!,");

        let text = unpack_text(&mut buf, DEFAULT_MAX_FRAME, Utf8Policy::Strict)
            .unwrap()
            .unwrap();
        assert_eq!(text, "Hello world!");
    }

    #[test]
    fn multibyte_text_roundtrip() {
        let mut buf = BytesMut::new();
        pack_text("Ж", DEFAULT_MAX_FRAME, &mut buf).unwrap();
        assert_eq!(buf.as_ref(), b"2:\xd0\x96,");

        let text = unpack_text(&mut buf, DEFAULT_MAX_FRAME, Utf8Policy::Strict)
            .unwrap()
            .unwrap();
        assert_eq!(text, "Ж");
    }

    #[test]
    fn incomplete_frame_is_not_an_error() {
        assert!(unpack_all(b"5:Hel", Utf8Policy::Strict).unwrap().is_none());
    }

    #[test]
    fn strict_policy_rejects_invalid_utf8() {
        // trailing byte of a two-byte sequence on its own
        let err = unpack_all(b"1:\x96,", Utf8Policy::Strict).unwrap_err();
        assert!(matches!(err, FrameError::Utf8(_)));
    }

    #[test]
    fn replace_policy_substitutes_invalid_bytes() {
        let text = unpack_all(b"1:\x96,", Utf8Policy::Replace).unwrap().unwrap();
        assert_eq!(text, "\u{FFFD}");
    }

    #[test]
    fn discard_policy_drops_invalid_bytes() {
        let text = unpack_all(b"3:a\x96b,", Utf8Policy::Discard)
            .unwrap()
            .unwrap();
        assert_eq!(text, "ab");
    }
}
