//! Netstring framed-message streams over TCP.
//!
//! Facade crate: re-exports the three layers under one roof.
//!
//! - [`frame`] — netstring encoding and incremental decoding
//! - [`stream`] — stateful message streams with pluggable codecs
//! - [`transport`] — blocking TCP channel provider

/// Re-export framing types.
pub mod frame {
    pub use netstrings_frame::*;
}

/// Re-export stream types.
pub mod stream {
    pub use netstrings_stream::*;
}

/// Re-export transport types.
pub mod transport {
    pub use netstrings_transport::*;
}
