//! Blocking TCP channel provider.
//!
//! The stream layer only requires a duplex byte channel (`Read` +
//! `Write`); this crate provides the TCP flavor with contextual errors
//! and connection logging. Timeouts and non-blocking modes remain the
//! caller's concern via [`std::net::TcpStream`]'s own setters.

pub mod error;
pub mod tcp;

pub use error::{Result, TransportError};
pub use tcp::{connect, TcpTransport};
