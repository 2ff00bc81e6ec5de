use std::io::{ErrorKind, Read, Write};

use bytes::BytesMut;
use netstrings_frame::Fragment;
use tracing::trace;

use crate::codec::{Codec, TextCodec};
use crate::error::{Result, StreamError};

/// Default upper bound on a single channel read, in bytes.
pub const DEFAULT_MAX_READ: usize = 8192;

const INITIAL_BUFFER_CAPACITY: usize = 8 * 1024;

/// Receive-side lifecycle of a stream.
///
/// `Active` until a zero-length read is observed, then `ReadClosed`
/// while buffered bytes may still decode, then `Drained` once the
/// buffer is confirmed empty.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Phase {
    Active,
    ReadClosed,
    Drained,
}

/// A stream of framed messages over one blocking duplex channel.
///
/// Owns an internal receive buffer; callers only ever see complete
/// decoded messages. One instance per connection, one consumer per
/// instance — the buffer is never shared.
pub struct MessageStream<T, C = TextCodec> {
    channel: T,
    codec: C,
    buf: BytesMut,
    out: BytesMut,
    chunk: Box<[u8]>,
    phase: Phase,
}

impl<T> MessageStream<T, TextCodec> {
    /// Bind `channel` with the default codec (strict UTF-8 text).
    pub fn new(channel: T) -> Self {
        Self::with_codec(channel, TextCodec::new())
    }
}

impl<T, C> MessageStream<T, C> {
    /// Bind `channel` with an explicit codec.
    pub fn with_codec(channel: T, codec: C) -> Self {
        Self {
            channel,
            codec,
            buf: BytesMut::with_capacity(INITIAL_BUFFER_CAPACITY),
            out: BytesMut::with_capacity(INITIAL_BUFFER_CAPACITY),
            chunk: vec![0u8; DEFAULT_MAX_READ].into_boxed_slice(),
            phase: Phase::Active,
        }
    }

    /// Override the single-read chunk size.
    pub fn with_max_read(mut self, max_read: usize) -> Self {
        self.chunk = vec![0u8; max_read].into_boxed_slice();
        self
    }

    /// Current single-read chunk size.
    pub fn max_read(&self) -> usize {
        self.chunk.len()
    }

    /// Whether the channel closed cleanly and the buffer is exhausted.
    pub fn is_drained(&self) -> bool {
        self.phase == Phase::Drained
    }

    /// Borrow the underlying channel.
    pub fn get_ref(&self) -> &T {
        &self.channel
    }

    /// Mutably borrow the underlying channel.
    pub fn get_mut(&mut self) -> &mut T {
        &mut self.channel
    }

    /// Consume the stream and return the channel.
    pub fn into_inner(self) -> T {
        self.channel
    }
}

impl<T: Write, C: Codec> MessageStream<T, C> {
    /// Encode `value` and write the full frame to the channel (blocking).
    ///
    /// Returns the number of bytes written. The frame is either written
    /// in full or the call fails; there is no partial-send state to
    /// resume.
    pub fn send(&mut self, value: &C::Item) -> Result<usize> {
        self.out.clear();
        self.codec.pack(value, &mut self.out)?;

        let mut offset = 0usize;
        while offset < self.out.len() {
            match self.channel.write(&self.out[offset..]) {
                Ok(0) => return Err(StreamError::ConnectionClosed),
                Ok(n) => offset += n,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) if err.kind() == ErrorKind::WouldBlock => continue,
                Err(err) => return Err(StreamError::Io(err)),
            }
        }
        self.flush()?;

        trace!(bytes = offset, "sent frame");
        Ok(offset)
    }

    /// Flush the underlying channel.
    pub fn flush(&mut self) -> Result<()> {
        loop {
            match self.channel.flush() {
                Ok(()) => return Ok(()),
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) if err.kind() == ErrorKind::WouldBlock => continue,
                Err(err) => return Err(StreamError::Io(err)),
            }
        }
    }
}

impl<T: Read, C: Codec> MessageStream<T, C> {
    /// Receive the next message (blocking).
    ///
    /// `Ok(None)` signals clean end-of-stream: the peer closed at a
    /// frame boundary and the buffer is empty. Once drained, further
    /// calls keep returning `Ok(None)`. A close in the middle of a
    /// frame is [`StreamError::UnexpectedEof`]; a protocol violation
    /// propagates immediately and no resynchronization is attempted.
    pub fn recv(&mut self) -> Result<Option<C::Item>> {
        if self.phase == Phase::Drained {
            return Ok(None);
        }

        loop {
            if let Some(value) = self.codec.unpack(&mut self.buf)? {
                trace!(buffered = self.buf.len(), "received message");
                return Ok(Some(value));
            }
            if self.phase == Phase::ReadClosed {
                break;
            }

            let read = match self.channel.read(&mut self.chunk) {
                Ok(n) => n,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(StreamError::Io(err)),
            };
            if read == 0 {
                self.phase = Phase::ReadClosed;
            } else {
                self.buf.extend_from_slice(&self.chunk[..read]);
            }
        }

        if self.buf.is_empty() {
            self.phase = Phase::Drained;
            return Ok(None);
        }
        // a truncated frame is always an error, never silently dropped
        Err(StreamError::UnexpectedEof {
            fragment: Fragment::of(&self.buf),
        })
    }

    /// Iterate over incoming messages until clean end-of-stream.
    ///
    /// Single-pass and non-restartable: the iterator ends exactly when
    /// [`MessageStream::recv`] reports end-of-stream, and yields an
    /// `Err` item for any protocol error or truncated closure.
    pub fn messages(&mut self) -> Messages<'_, T, C> {
        Messages { stream: self }
    }
}

/// Borrowing iterator over a stream's incoming messages.
pub struct Messages<'a, T, C = TextCodec> {
    stream: &'a mut MessageStream<T, C>,
}

impl<T: Read, C: Codec> Iterator for Messages<'_, T, C> {
    type Item = Result<C::Item>;

    fn next(&mut self) -> Option<Self::Item> {
        self.stream.recv().transpose()
    }
}
