use std::net::{SocketAddr, TcpListener, TcpStream};

use tracing::{debug, info};

use crate::error::{Result, TransportError};

/// Listening side of a TCP transport.
///
/// Thin wrapper over [`TcpListener`] that attaches the bind address to
/// errors and logs connection lifecycle events.
#[derive(Debug)]
pub struct TcpTransport {
    listener: TcpListener,
    local_addr: SocketAddr,
}

impl TcpTransport {
    /// Bind and listen on `addr` (blocking accept loop semantics).
    ///
    /// Binding port 0 picks an ephemeral port; the effective address is
    /// available via [`TcpTransport::local_addr`].
    pub fn bind(addr: SocketAddr) -> Result<Self> {
        let listener = TcpListener::bind(addr).map_err(|source| TransportError::Bind {
            addr,
            source,
        })?;
        let local_addr = listener.local_addr().map_err(|source| TransportError::Bind {
            addr,
            source,
        })?;
        info!(%local_addr, "listening");
        Ok(Self {
            listener,
            local_addr,
        })
    }

    /// Accept the next incoming connection (blocking).
    pub fn accept(&self) -> Result<(TcpStream, SocketAddr)> {
        let (stream, peer_addr) = self.listener.accept().map_err(TransportError::Accept)?;
        debug!(%peer_addr, "accepted connection");
        Ok((stream, peer_addr))
    }

    /// The address this transport is bound to.
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }
}

/// Connect to a listening peer (blocking).
pub fn connect(addr: SocketAddr) -> Result<TcpStream> {
    let stream = TcpStream::connect(addr).map_err(|source| TransportError::Connect {
        addr,
        source,
    })?;
    debug!(%addr, "connected");
    Ok(stream)
}

#[cfg(test)]
mod tests {
    use std::io::{Read, Write};

    use super::*;

    fn loopback() -> SocketAddr {
        "127.0.0.1:0".parse().expect("loopback addr should parse")
    }

    #[test]
    fn bind_accept_connect_roundtrip() {
        let transport = TcpTransport::bind(loopback()).expect("bind should succeed");
        let addr = transport.local_addr();

        let client = std::thread::spawn(move || {
            let mut stream = connect(addr).expect("connect should succeed");
            stream.write_all(b"hello").expect("write should succeed");
        });

        let (mut stream, peer_addr) = transport.accept().expect("accept should succeed");
        assert!(peer_addr.ip().is_loopback());

        let mut buf = [0u8; 5];
        stream.read_exact(&mut buf).expect("read should succeed");
        assert_eq!(&buf, b"hello");

        client.join().expect("client thread should finish");
    }

    #[test]
    fn bind_reports_address_in_error() {
        let transport = TcpTransport::bind(loopback()).expect("bind should succeed");
        let taken = transport.local_addr();

        let err = TcpTransport::bind(taken).expect_err("second bind should fail");
        assert!(matches!(err, TransportError::Bind { addr, .. } if addr == taken));
    }

    #[test]
    fn connect_reports_address_in_error() {
        // bind then drop to get a port with no listener
        let transport = TcpTransport::bind(loopback()).expect("bind should succeed");
        let addr = transport.local_addr();
        drop(transport);

        let err = connect(addr).expect_err("connect should fail");
        assert!(matches!(err, TransportError::Connect { addr: a, .. } if a == addr));
    }
}
