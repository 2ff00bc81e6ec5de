use netstrings_frame::{Fragment, FrameError};

/// Errors that can occur on a message stream.
#[derive(Debug, thiserror::Error)]
pub enum StreamError {
    /// The framing layer rejected the wire data.
    #[error("frame error: {0}")]
    Frame(#[from] FrameError),

    /// The channel closed with a partially-assembled frame buffered.
    #[error("unexpected end of stream. {fragment}")]
    UnexpectedEof { fragment: Fragment },

    /// A JSON payload failed to serialize or deserialize.
    #[error("payload JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// An I/O error occurred on the underlying channel.
    #[error("stream I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The channel closed before a frame was fully written.
    #[error("connection closed before frame was written")]
    ConnectionClosed,
}

pub type Result<T> = std::result::Result<T, StreamError>;
