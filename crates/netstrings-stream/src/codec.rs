use std::marker::PhantomData;

use bytes::{Bytes, BytesMut};
use serde::de::DeserializeOwned;
use serde::Serialize;

use netstrings_frame::{self as frame, Utf8Policy, DEFAULT_MAX_FRAME};

use crate::error::Result;

/// Default maximum frame length for [`JsonCodec`].
///
/// Structured payloads get a larger ceiling than plain text frames.
pub const DEFAULT_MAX_OBJECT: usize = 16 * 1024;

/// Maps application values to and from complete netstring frames.
///
/// `pack` emits a fully framed message (length prefix, payload,
/// terminator); `unpack` follows the framing layer's three-outcome
/// contract, with the payload further deserialized into
/// [`Codec::Item`]. Each codec carries its own length ceiling,
/// independent of any other codec bound to the same channel.
pub trait Codec {
    type Item;

    /// Encode `value` into a complete frame, appended to `dst`.
    fn pack(&self, value: &Self::Item, dst: &mut BytesMut) -> Result<()>;

    /// Decode one value from the front of `src`.
    ///
    /// `Ok(None)` means more bytes are needed; `src` must be left
    /// untouched in that case.
    fn unpack(&self, src: &mut BytesMut) -> Result<Option<Self::Item>>;
}

/// Raw byte payloads; a thin wrapper over the framing codec.
#[derive(Debug, Clone)]
pub struct BytesCodec {
    max_frame: usize,
}

impl BytesCodec {
    pub fn new() -> Self {
        Self::with_max_frame(DEFAULT_MAX_FRAME)
    }

    pub fn with_max_frame(max_frame: usize) -> Self {
        Self { max_frame }
    }
}

impl Default for BytesCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl Codec for BytesCodec {
    type Item = Bytes;

    fn pack(&self, value: &Bytes, dst: &mut BytesMut) -> Result<()> {
        frame::pack(value, self.max_frame, dst)?;
        Ok(())
    }

    fn unpack(&self, src: &mut BytesMut) -> Result<Option<Bytes>> {
        Ok(frame::unpack(src, self.max_frame)?)
    }
}

/// UTF-8 text payloads with a configurable invalid-byte policy.
#[derive(Debug, Clone)]
pub struct TextCodec {
    max_frame: usize,
    policy: Utf8Policy,
}

impl TextCodec {
    /// Strict UTF-8 handling and the default frame ceiling.
    pub fn new() -> Self {
        Self {
            max_frame: DEFAULT_MAX_FRAME,
            policy: Utf8Policy::Strict,
        }
    }

    pub fn with_policy(mut self, policy: Utf8Policy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_max_frame(mut self, max_frame: usize) -> Self {
        self.max_frame = max_frame;
        self
    }
}

impl Default for TextCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl Codec for TextCodec {
    type Item = String;

    fn pack(&self, value: &String, dst: &mut BytesMut) -> Result<()> {
        frame::pack_text(value, self.max_frame, dst)?;
        Ok(())
    }

    fn unpack(&self, src: &mut BytesMut) -> Result<Option<String>> {
        Ok(frame::unpack_text(src, self.max_frame, self.policy)?)
    }
}

/// Arbitrary serde-serializable payloads carried as JSON.
///
/// This is the generic-object codec: any `Serialize + DeserializeOwned`
/// type travels over the same stream engine as plain text, with its own
/// length ceiling. Defaults to dynamically-typed [`serde_json::Value`].
#[derive(Debug, Clone)]
pub struct JsonCodec<T = serde_json::Value> {
    max_frame: usize,
    _marker: PhantomData<fn() -> T>,
}

impl<T> JsonCodec<T> {
    pub fn new() -> Self {
        Self::with_max_frame(DEFAULT_MAX_OBJECT)
    }

    pub fn with_max_frame(max_frame: usize) -> Self {
        Self {
            max_frame,
            _marker: PhantomData,
        }
    }
}

impl<T> Default for JsonCodec<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Serialize + DeserializeOwned> Codec for JsonCodec<T> {
    type Item = T;

    fn pack(&self, value: &T, dst: &mut BytesMut) -> Result<()> {
        let payload = serde_json::to_vec(value)?;
        frame::pack(&payload, self.max_frame, dst)?;
        Ok(())
    }

    fn unpack(&self, src: &mut BytesMut) -> Result<Option<T>> {
        let Some(payload) = frame::unpack(src, self.max_frame)? else {
            return Ok(None);
        };
        Ok(Some(serde_json::from_slice(&payload)?))
    }
}
