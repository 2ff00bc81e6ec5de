use std::io::{Read, Write};
use std::net::{SocketAddr, TcpStream};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use rand::Rng;

use netstrings_transport::TcpTransport;

use crate::cmd::{parse_duration, EchoArgs};
use crate::exit::{transport_error, CliError, CliResult, SUCCESS};
use crate::output::OutputFormat;

const BUFFER_SIZE: usize = 8192;

pub fn run(args: EchoArgs, _format: OutputFormat) -> CliResult<i32> {
    let max_delay = args.max_delay.as_deref().map(parse_duration).transpose()?;

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

        thread::spawn(move || {
            if let Err(err) = serve_connection(stream, peer_addr, max_delay) {
                tracing::warn!(%peer_addr, error = %err, "echo connection ended with error");
            }
        });
    }

    Ok(SUCCESS)
}

/// Echo every received chunk back verbatim, or in two fragments with a
/// random pause between them when delay injection is enabled.
fn serve_connection(
    mut stream: TcpStream,
    peer_addr: SocketAddr,
    max_delay: Option<Duration>,
) -> std::io::Result<()> {
    let mut chunk = [0u8; BUFFER_SIZE];
    loop {
        let read = stream.read(&mut chunk)?;
        if read == 0 {
            tracing::info!(%peer_addr, "peer closed");
            return Ok(());
        }
        let request = &chunk[..read];
        tracing::info!(
            %peer_addr,
            len = read,
            payload = %String::from_utf8_lossy(request),
            "echoing"
        );

        match max_delay {
            None => stream.write_all(request)?,
            Some(max) => {
                // first fragment is zero or one byte depending on chunk
                // parity, never a whole frame
                let split = read % 2;
                stream.write_all(&request[..split])?;
                stream.flush()?;
                thread::sleep(rand::thread_rng().gen_range(Duration::ZERO..=max));
                stream.write_all(&request[split..])?;
            }
        }
        stream.flush()?;
    }
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
