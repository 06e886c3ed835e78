//! Minimal HTTP/1.1 server for integration tests.
//!
//! Answers every request with the same canned response and remembers the
//! request heads it saw, so tests can assert on paths, headers and hit counts.

use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Canned {
    pub status: u16,
    pub content_type: Option<&'static str>,
    pub body: Vec<u8>,
    chunks: usize,
    chunk_delay: Duration,
    cut_after: Option<usize>,
}

impl Canned {
    pub fn new(status: u16, content_type: &'static str, body: &[u8]) -> Self {
        Canned {
            status,
            content_type: Some(content_type),
            body: body.to_vec(),
            chunks: 1,
            chunk_delay: Duration::ZERO,
            cut_after: None,
        }
    }

    pub fn json(body: &str) -> Self {
        Canned::new(200, "application/json; charset=utf-8", body.as_bytes())
    }

    pub fn text(status: u16, body: &str) -> Self {
        Canned::new(status, "text/plain", body.as_bytes())
    }

    pub fn bytes(body: Vec<u8>) -> Self {
        Canned::new(200, "application/octet-stream", &body)
    }

    /// Sends the body in `chunks` pieces with `delay` before each piece after the first.
    pub fn trickle(mut self, chunks: usize, delay: Duration) -> Self {
        self.chunks = chunks.max(1);
        self.chunk_delay = delay;
        self
    }

    /// Closes the connection after `n` body bytes, while still announcing the full length.
    pub fn cut_after(mut self, n: usize) -> Self {
        self.cut_after = Some(n);
        self
    }
}

pub struct TestServer {
    /// e.g. "http://127.0.0.1:12345/"
    pub base: String,
    requests: Arc<Mutex<Vec<String>>>,
}

impl TestServer {
    /// Starts serving `canned` on a background thread until the process exits.
    pub fn start(canned: Canned) -> TestServer {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
        let port = listener.local_addr().unwrap().port();
        let requests = Arc::new(Mutex::new(vec![]));
        let seen = Arc::clone(&requests);
        let canned = Arc::new(canned);
        thread::spawn(move || {
            for stream in listener.incoming().flatten() {
                let canned = Arc::clone(&canned);
                let seen = Arc::clone(&seen);
                thread::spawn(move || handle(stream, &canned, &seen));
            }
        });
        TestServer {
            base: format!("http://127.0.0.1:{}/", port),
            requests,
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base, path.trim_start_matches('/'))
    }

    pub fn hits(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    /// Request heads (request line plus headers), in arrival order.
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

fn handle(mut stream: TcpStream, canned: &Canned, seen: &Mutex<Vec<String>>) {
    let _ = stream.set_read_timeout(Some(Duration::from_secs(2)));
    let _ = stream.set_write_timeout(Some(Duration::from_secs(5)));

    let mut head = Vec::new();
    let mut buf = [0u8; 4096];
    while !head.windows(4).any(|w| w == b"\r\n\r\n") {
        match stream.read(&mut buf) {
            Ok(0) | Err(_) => break,
            Ok(n) => head.extend_from_slice(&buf[..n]),
        }
    }
    if head.is_empty() {
        return;
    }
    seen.lock()
        .unwrap()
        .push(String::from_utf8_lossy(&head).trim_end().to_string());

    let content_type = canned
        .content_type
        .map(|ct| format!("Content-Type: {}\r\n", ct))
        .unwrap_or_default();
    let response = format!(
        "HTTP/1.1 {} {}\r\n{}Content-Length: {}\r\nConnection: close\r\n\r\n",
        canned.status,
        reason(canned.status),
        content_type,
        canned.body.len()
    );
    let _ = stream.write_all(response.as_bytes());

    let body = match canned.cut_after {
        Some(n) => &canned.body[..n.min(canned.body.len())],
        None => &canned.body[..],
    };
    let piece = (canned.body.len() / canned.chunks).max(1);
    for (i, chunk) in body.chunks(piece).enumerate() {
        if i > 0 {
            thread::sleep(canned.chunk_delay);
        }
        if stream.write_all(chunk).and_then(|_| stream.flush()).is_err() {
            return;
        }
    }
    let _ = stream.flush();
}

fn reason(status: u16) -> &'static str {
    match status {
        200 => "OK",
        403 => "Forbidden",
        404 => "Not Found",
        500 => "Internal Server Error",
        502 => "Bad Gateway",
        _ => "Status",
    }
}
