use std::io;
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::process::{Child, Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use netstrings::stream::MessageStream;

fn free_loopback_addr() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").expect("ephemeral bind should succeed");
    listener
        .local_addr()
        .expect("bound listener should have an address")
}

fn spawn_server(subcommand: &str, addr: SocketAddr, extra: &[&str]) -> Child {
    Command::new(env!("CARGO_BIN_EXE_netstrings"))
        .arg(subcommand)
        .arg(addr.to_string())
        .args(extra)
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .expect("server binary should spawn")
}

fn wait_for_connect(addr: SocketAddr, timeout: Duration) -> io::Result<TcpStream> {
    let start = Instant::now();
    loop {
        match TcpStream::connect(addr) {
            Ok(stream) => return Ok(stream),
            Err(err) => {
                if start.elapsed() >= timeout {
                    return Err(io::Error::other(format!("connect timeout: {err}")));
                }
                thread::sleep(Duration::from_millis(25));
            }
        }
    }
}

#[test]
fn version_prints_package_version() {
    let output = Command::new(env!("CARGO_BIN_EXE_netstrings"))
        .arg("version")
        .output()
        .expect("version command should run");

    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).expect("version output should be UTF-8");
    assert!(stdout.contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn echo_server_roundtrips_framed_messages() {
    let addr = free_loopback_addr();
    let mut server = spawn_server("echo", addr, &[]);

    let channel = wait_for_connect(addr, Duration::from_secs(5)).expect("server should come up");
    let mut stream = MessageStream::new(channel);

    for msg in ["Hello world!", "", "second message"] {
        stream.send(&msg.to_string()).expect("send should succeed");
        let reply = stream
            .recv()
            .expect("receive should succeed")
            .expect("echo server should reply");
        assert_eq!(reply, msg);
    }

    server.kill().expect("server should be killable");
    let _ = server.wait();
}

#[test]
fn delayed_echo_still_reassembles_whole_frames() {
    let addr = free_loopback_addr();
    let mut server = spawn_server("echo", addr, &["--max-delay", "1s"]);

    let channel = wait_for_connect(addr, Duration::from_secs(5)).expect("server should come up");
    let mut stream = MessageStream::new(channel);

    stream
        .send(&"split me across delayed writes".to_string())
        .expect("send should succeed");
    let reply = stream
        .recv()
        .expect("receive should succeed")
        .expect("echo server should reply");
    assert_eq!(reply, "split me across delayed writes");

    server.kill().expect("server should be killable");
    let _ = server.wait();
}
