//! Runs the compiled probe against a hand-rolled server on the fixed port.

use std::io::{ErrorKind, Read, Write};
use std::net::{TcpListener, TcpStream};
use std::process::{Command, Output, Stdio};
use std::sync::{Mutex, MutexGuard};
use std::thread;
use std::time::{Duration, Instant};

const PROBE_ADDR: &str = "127.0.0.1:13133";

// Every test here needs port 13133 to itself.
static PORT: Mutex<()> = Mutex::new(());

fn lock_port() -> MutexGuard<'static, ()> {
    PORT.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn probe() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_adot-healthcheck"));
    cmd.env_remove("RUST_LOG")
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());
    cmd
}

fn stdout_of(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

/// Reads until the end of the request head and returns it.
fn read_request(stream: &mut TcpStream) -> String {
    let mut head = Vec::new();
    let mut buf = [0u8; 1024];
    while !head.windows(4).any(|w| w == b"\r\n\r\n") {
        let n = stream.read(&mut buf).unwrap();
        if n == 0 {
            break;
        }
        head.extend_from_slice(&buf[..n]);
    }
    String::from_utf8_lossy(&head).into_owned()
}

/// True once the peer has closed its end of the connection.
fn peer_closed(stream: &mut TcpStream) -> bool {
    stream
        .set_read_timeout(Some(Duration::from_secs(5)))
        .unwrap();
    let mut buf = [0u8; 64];
    loop {
        match stream.read(&mut buf) {
            Ok(0) => return true,
            Ok(_) => continue,
            Err(e) if e.kind() == ErrorKind::ConnectionReset => return true,
            Err(_) => return false,
        }
    }
}

/// Serves one canned response, then reports the request head and whether
/// the probe closed the connection.
fn serve_once(response: String) -> thread::JoinHandle<(String, bool)> {
    let listener = TcpListener::bind(PROBE_ADDR).unwrap();
    thread::spawn(move || {
        let (mut stream, _) = listener.accept().unwrap();
        let request = read_request(&mut stream);
        stream.write_all(response.as_bytes()).unwrap();
        stream.flush().unwrap();
        let closed = peer_closed(&mut stream);
        (request, closed)
    })
}

fn http_response(status_line: &str, body: &str) -> String {
    format!(
        "HTTP/1.1 {}\r\nContent-Type: text/plain\r\nContent-Length: {}\r\n\r\n{}",
        status_line,
        body.len(),
        body
    )
}

#[test]
fn test_healthy_server_prints_healthy() -> anyhow::Result<()> {
    let _port = lock_port();
    let server = serve_once(http_response("200 OK", "{\"status\":\"Server available\"}"));

    let output = probe().output()?;
    let (request, closed) = server.join().unwrap();

    assert_eq!(output.status.code(), Some(0));
    assert_eq!(stdout_of(&output), "HEALTHY\n");
    assert!(output.stderr.is_empty());
    assert!(request.starts_with("GET / HTTP/1.1\r\n"), "request was: {}", request);
    assert!(request.to_ascii_lowercase().contains("host: localhost:13133"));
    assert!(closed, "probe left the connection open");
    Ok(())
}

#[test]
fn test_unhealthy_server_prints_status_and_body() -> anyhow::Result<()> {
    let _port = lock_port();
    let server = serve_once(http_response("503 Service Unavailable", "down"));

    let output = probe().output()?;
    let (_, closed) = server.join().unwrap();

    assert_eq!(output.status.code(), Some(1));
    assert_eq!(stdout_of(&output), "unexpected server status [503]: down\n");
    assert!(closed, "probe left the connection open");
    Ok(())
}

#[test]
fn test_no_server_is_a_transport_failure() -> anyhow::Result<()> {
    let _port = lock_port();
    // Make sure the port really is free before probing it.
    drop(TcpListener::bind(PROBE_ADDR)?);

    let output = probe().output()?;

    assert_eq!(output.status.code(), Some(1));
    let stdout = stdout_of(&output);
    assert!(stdout.starts_with("failed to do request: "), "stdout was: {}", stdout);
    assert_eq!(stdout.lines().count(), 1);
    Ok(())
}

#[test]
fn test_slow_server_times_out_after_one_second() -> anyhow::Result<()> {
    let _port = lock_port();
    let listener = TcpListener::bind(PROBE_ADDR)?;
    let server = thread::spawn(move || {
        let (mut stream, _) = listener.accept().unwrap();
        read_request(&mut stream);
        // Never answer; the probe has to give up on its own.
        peer_closed(&mut stream)
    });

    let started = Instant::now();
    let output = probe().output()?;
    let elapsed = started.elapsed();
    let closed = server.join().unwrap();

    assert_eq!(output.status.code(), Some(1));
    let stdout = stdout_of(&output);
    assert!(stdout.starts_with("failed to do request: "), "stdout was: {}", stdout);
    assert!(stdout.contains("timed out"), "stdout was: {}", stdout);
    assert!(elapsed < Duration::from_millis(1900), "took {:?}", elapsed);
    assert!(closed, "probe left the connection open");
    Ok(())
}

#[cfg(unix)]
#[test]
fn test_termination_signals_abort_in_flight_request() -> anyhow::Result<()> {
    let _port = lock_port();

    for (signal, name) in [("-INT", "SIGINT"), ("-TERM", "SIGTERM")] {
        let listener = TcpListener::bind(PROBE_ADDR)?;
        let child = probe().spawn()?;

        // Once the connection is accepted the request is in flight and the
        // signal handlers are already installed.
        let (mut stream, _) = listener.accept()?;
        read_request(&mut stream);

        let started = Instant::now();
        let status = Command::new("kill")
            .arg(signal)
            .arg(child.id().to_string())
            .status()?;
        assert!(status.success());

        let output = child.wait_with_output()?;
        assert!(started.elapsed() < Duration::from_millis(900));
        assert_eq!(output.status.code(), Some(1));
        assert_eq!(
            stdout_of(&output),
            format!("failed to do request: context canceled ({})\n", name)
        );
        assert!(peer_closed(&mut stream), "probe left the connection open");
    }
    Ok(())
}
