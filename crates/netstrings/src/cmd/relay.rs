use std::net::{SocketAddr, TcpStream};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;

use netstrings_stream::{JsonCodec, MessageStream};
use netstrings_transport::TcpTransport;

use crate::cmd::RelayArgs;
use crate::exit::{transport_error, CliError, CliResult, SUCCESS};
use crate::output::{print_message, OutputFormat};

pub fn run(args: RelayArgs, format: OutputFormat) -> CliResult<i32> {
    let transport =
        TcpTransport::bind(args.addr).map_err(|err| transport_error("bind failed", err))?;

    let running = Arc::new(AtomicBool::new(true));
    install_ctrlc_handler(running.clone())?;

    while running.load(Ordering::SeqCst) {
        let (stream, peer_addr) = match transport.accept() {
            Ok(accepted) => accepted,
            Err(err) => return Err(transport_error("accept failed", err)),
        };
        tracing::info!(%peer_addr, "accepted connection");

        let codec = match args.max_object {
            Some(max) => JsonCodec::with_max_frame(max),
            None => JsonCodec::new(),
        };
        thread::spawn(move || relay_connection(stream, peer_addr, codec, format));
    }

    Ok(SUCCESS)
}

/// Drain one peer's object stream into the output sink.
///
/// A malformed or truncated stream ends this connection only; the
/// listener keeps serving others.
fn relay_connection(
    stream: TcpStream,
    peer_addr: SocketAddr,
    codec: JsonCodec,
    format: OutputFormat,
) {
    let mut stream = MessageStream::with_codec(stream, codec);
    for message in stream.messages() {
        match message {
            Ok(value) => print_message(peer_addr, &value.to_string(), format),
            Err(err) => {
                tracing::warn!(%peer_addr, error = %err, "relay connection failed");
                return;
            }
        }
    }
    tracing::info!(%peer_addr, "peer closed cleanly");
}

fn install_ctrlc_handler(running: Arc<AtomicBool>) -> CliResult<()> {
    ctrlc::set_handler(move || {
        running.store(false, Ordering::SeqCst);
    })
    .map_err(|err| {
        CliError::new(
            crate::exit::INTERNAL,
            format!("signal handler setup failed: {err}"),
        )
    })
}
