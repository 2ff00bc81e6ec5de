//! Netstring frame encoding and incremental decoding.
//!
//! A netstring is a length-prefixed byte string:
//! decimal length, `:`, the raw payload, `,`. For example `b"hello"`
//! encodes as `5:hello,` and the empty payload as `0:,`.
//!
//! [`unpack`] is incremental: fed a buffer that holds only part of a
//! frame it reports "need more bytes" rather than an error, and resumes
//! correctly once more bytes are appended. Protocol violations are a
//! separate, terminal outcome.

pub mod codec;
pub mod error;
pub mod text;

pub use codec::{pack, unpack, DEFAULT_MAX_FRAME};
pub use error::{Fragment, FrameError, Result};
pub use text::{decode_utf8, pack_text, unpack_text, Utf8Policy};
