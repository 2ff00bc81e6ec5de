//! Incremental netstring message streams over blocking byte channels.
//!
//! [`MessageStream`] binds a duplex byte channel (anything `Read` +
//! `Write`: a TCP socket, a Unix socket, an in-memory cursor) to a
//! [`Codec`] and turns it into a sequence of discrete, typed messages.
//! Partial arrivals are buffered internally; callers only ever see
//! complete messages, clean end-of-stream, or a protocol error.
//!
//! Payload encoding is pluggable while framing stays uniform:
//! [`TextCodec`] for UTF-8 text (the default), [`BytesCodec`] for raw
//! bytes, [`JsonCodec`] for arbitrary serde-serializable values.

pub mod codec;
pub mod error;
pub mod stream;

pub use codec::{BytesCodec, Codec, JsonCodec, TextCodec, DEFAULT_MAX_OBJECT};
pub use error::{Result, StreamError};
pub use stream::{MessageStream, Messages, DEFAULT_MAX_READ};
