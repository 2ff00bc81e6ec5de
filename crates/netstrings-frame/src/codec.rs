use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::error::{Fragment, FrameError, Result};

/// Default maximum netstring length.
///
/// For [`pack`] this bounds the full encoded frame
/// (length digits + `:` + payload + `,`); for [`unpack`] it bounds the
/// declared payload length. Codecs may override it per instance.
pub const DEFAULT_MAX_FRAME: usize = 4096;

/// Encode `payload` as a netstring, appended to `dst`.
///
/// Fails with [`FrameError::FrameTooLarge`] before any byte is emitted
/// if the total encoded length would exceed `max_frame`.
pub fn pack(payload: &[u8], max_frame: usize, dst: &mut BytesMut) -> Result<()> {
    let digits = payload.len().to_string();
    let total = digits.len() + payload.len() + 2;
    if total > max_frame {
        return Err(FrameError::FrameTooLarge {
            len: total,
            max: max_frame,
        });
    }
    dst.reserve(total);
    dst.put_slice(digits.as_bytes());
    dst.put_u8(b':');
    dst.put_slice(payload);
    dst.put_u8(b',');
    Ok(())
}

/// Decode one netstring from the front of `src`.
///
/// Three outcomes:
/// - `Ok(Some(payload))` — one complete frame was consumed from `src`;
///   any trailing bytes (the next frame, or part of it) remain in `src`.
/// - `Ok(None)` — `src` holds a prefix of a valid frame; more bytes are
///   needed. `src` is left untouched.
/// - `Err(_)` — protocol violation; the stream is unusable past this
///   point and no resynchronization is attempted.
///
/// Leading zero digits in the length prefix are accepted. A buffer that
/// is nothing but decimal digits stays incomplete up to and including
/// `max_frame` bytes; one byte past that it is malformed.
pub fn unpack(src: &mut BytesMut, max_frame: usize) -> Result<Option<Bytes>> {
    let Some(colon) = src.iter().position(|&b| b == b':') else {
        if src.is_empty() || (src.len() <= max_frame && src.iter().all(u8::is_ascii_digit)) {
            // length prefix still arriving
            return Ok(None);
        }
        return Err(FrameError::MissingDelimiter {
            fragment: Fragment::of(src),
        });
    };

    let digits = &src[..colon];
    if digits.is_empty() || !digits.iter().all(u8::is_ascii_digit) {
        return Err(FrameError::InvalidLengthDigits {
            fragment: Fragment::of(src),
        });
    }
    let mut declared: u128 = 0;
    for &d in digits {
        declared = declared
            .saturating_mul(10)
            .saturating_add(u128::from(d - b'0'));
    }
    if declared > max_frame as u128 {
        return Err(FrameError::FrameTooLarge {
            len: usize::try_from(declared).unwrap_or(usize::MAX),
            max: max_frame,
        });
    }
    let declared = declared as usize;

    let payload_start = colon + 1;
    let terminator = payload_start + declared;
    if src.len() < terminator + 1 {
        return Ok(None); // payload or terminator still arriving
    }
    if src[terminator] != b',' {
        return Err(FrameError::MissingTerminator {
            fragment: Fragment::of(src),
        });
    }

    src.advance(payload_start);
    let payload = src.split_to(declared).freeze();
    src.advance(1);

    Ok(Some(payload))
}
