//! Minimal HTTP/1.1 server for prober integration tests.
//!
//! Routes by path:
//! - `/found`   200 with an 11-byte body and Content-Length
//! - `/chunked` 200 with a chunked body and no Content-Length
//! - `/slow`    waits 3s before answering
//! - `/echo`    200 echoing the raw request head as the body
//! - anything else 404

use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::thread;
use std::time::Duration;

/// Starts the server in a background thread and returns its base URL
/// (e.g. "http://127.0.0.1:12345/"). It runs until the process exits.
pub fn start() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().unwrap().port();
    thread::spawn(move || {
        for stream in listener.incoming().flatten() {
            thread::spawn(move || handle(stream));
        }
    });
    format!("http://127.0.0.1:{}/", port)
}

/// A base URL nothing listens on.
pub fn closed_endpoint() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    format!("http://127.0.0.1:{}/", port)
}

fn handle(mut stream: TcpStream) {
    let _ = stream.set_read_timeout(Some(Duration::from_secs(5)));
    let mut buf = [0u8; 8192];
    let mut head = Vec::new();
    while !head.windows(4).any(|w| w == b"\r\n\r\n") {
        match stream.read(&mut buf) {
            Ok(0) | Err(_) => return,
            Ok(n) => head.extend_from_slice(&buf[..n]),
        }
    }
    let request = String::from_utf8_lossy(&head).to_string();
    let mut first = request.lines().next().unwrap_or("").split_whitespace();
    let method = first.next().unwrap_or("");
    let path = first.next().unwrap_or("/");
    let is_head = method.eq_ignore_ascii_case("HEAD");

    let response: Vec<u8> = match path {
        "/found" => fixed("200 OK", "hello world", is_head),
        "/chunked" => {
            let mut r = b"HTTP/1.1 200 OK\r\nTransfer-Encoding: chunked\r\nConnection: close\r\n\r\n".to_vec();
            if !is_head {
                r.extend_from_slice(b"5\r\nabcde\r\n3\r\nfgh\r\n0\r\n\r\n");
            }
            r
        }
        "/slow" => {
            thread::sleep(Duration::from_secs(3));
            fixed("200 OK", "late", is_head)
        }
        "/echo" => fixed("200 OK", &request, is_head),
        _ => fixed("404 Not Found", "nope", is_head),
    };
    let _ = stream.write_all(&response);
    let _ = stream.flush();
}

fn fixed(status: &str, body: &str, is_head: bool) -> Vec<u8> {
    let mut r = format!(
        "HTTP/1.1 {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
        status,
        body.len()
    )
    .into_bytes();
    if !is_head {
        r.extend_from_slice(body.as_bytes());
    }
    r
}
