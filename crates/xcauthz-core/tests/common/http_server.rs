//! Minimal HTTP/1.1 server for integration tests.
//!
//! Serves a small path -> body map. HEAD returns Content-Length, GET honours
//! `Range: bytes=X-Y` with 206, DELETE/MKCOL/MOVE edit the map. Unknown paths
//! get 404. Every request target (path and query) is recorded.

use std::collections::{BTreeMap, BTreeSet};
use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

#[derive(Default)]
struct State {
    files: BTreeMap<String, Vec<u8>>,
    dirs: BTreeSet<String>,
    requests: Vec<String>,
}

/// Handle to a running server. The server lives until the process exits.
#[derive(Clone)]
pub struct TestServer {
    port: u16,
    state: Arc<Mutex<State>>,
}

impl TestServer {
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Base URL, e.g. `http://127.0.0.1:12345`.
    pub fn base(&self) -> String {
        format!("http://127.0.0.1:{}", self.port)
    }

    pub fn insert(&self, path: &str, body: &[u8]) {
        self.state
            .lock()
            .unwrap()
            .files
            .insert(path.to_string(), body.to_vec());
    }

    pub fn contains(&self, path: &str) -> bool {
        let state = self.state.lock().unwrap();
        state.files.contains_key(path) || state.dirs.contains(path)
    }

    /// Request lines seen so far as `METHOD target`.
    pub fn requests(&self) -> Vec<String> {
        self.state.lock().unwrap().requests.clone()
    }
}

pub fn start() -> TestServer {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().unwrap().port();
    let state = Arc::new(Mutex::new(State::default()));
    let shared = Arc::clone(&state);
    thread::spawn(move || {
        for stream in listener.incoming().flatten() {
            let state = Arc::clone(&shared);
            thread::spawn(move || handle(stream, &state));
        }
    });
    TestServer { port, state }
}

struct Parsed {
    method: String,
    target: String,
    range: Option<(u64, Option<u64>)>,
    destination: Option<String>,
}

fn handle(mut stream: TcpStream, state: &Mutex<State>) {
    let _ = stream.set_read_timeout(Some(Duration::from_secs(2)));
    let _ = stream.set_write_timeout(Some(Duration::from_secs(2)));
    let mut buf = [0u8; 8192];
    let n = match stream.read(&mut buf) {
        Ok(0) | Err(_) => return,
        Ok(n) => n,
    };
    let Ok(request) = std::str::from_utf8(&buf[..n]) else {
        return;
    };
    let Some(req) = parse_request(request) else {
        return;
    };

    let path = req
        .target
        .split_once('?')
        .map(|(p, _)| p)
        .unwrap_or(&req.target)
        .to_string();

    let mut state = state.lock().unwrap();
    state.requests.push(format!("{} {}", req.method, req.target));

    match req.method.as_str() {
        "HEAD" => match state.files.get(&path) {
            Some(body) => respond(&mut stream, "200 OK", &[("Content-Length", body.len().to_string()), ("Accept-Ranges", "bytes".into())], None),
            None if state.dirs.contains(&path) => respond(&mut stream, "200 OK", &[("Content-Length", "0".into())], None),
            None => not_found(&mut stream),
        },
        "GET" => {
            let Some(body) = state.files.get(&path) else {
                return not_found(&mut stream);
            };
            let total = body.len() as u64;
            match req.range {
                Some((start, _)) if start >= total => respond(
                    &mut stream,
                    "416 Range Not Satisfiable",
                    &[("Content-Range", format!("bytes */{}", total)), ("Content-Length", "0".into())],
                    None,
                ),
                Some((start, end)) => {
                    let end = end.unwrap_or(u64::MAX).min(total - 1);
                    let slice = &body[start as usize..=end as usize];
                    respond(
                        &mut stream,
                        "206 Partial Content",
                        &[
                            ("Content-Length", slice.len().to_string()),
                            ("Content-Range", format!("bytes {}-{}/{}", start, end, total)),
                        ],
                        Some(slice),
                    )
                }
                None => respond(
                    &mut stream,
                    "200 OK",
                    &[("Content-Length", body.len().to_string())],
                    Some(body),
                ),
            }
        }
        "DELETE" => {
            if state.files.remove(&path).is_some() || state.dirs.remove(&path) {
                respond(&mut stream, "204 No Content", &[], None)
            } else {
                not_found(&mut stream)
            }
        }
        "MKCOL" => {
            if state.dirs.contains(&path) || state.files.contains_key(&path) {
                respond(&mut stream, "405 Method Not Allowed", &[("Content-Length", "0".into())], None)
            } else {
                state.dirs.insert(path);
                respond(&mut stream, "201 Created", &[("Content-Length", "0".into())], None)
            }
        }
        "MOVE" => {
            let dest = req
                .destination
                .as_deref()
                .and_then(|d| d.find("//").map(|i| &d[i + 2..]))
                .and_then(|d| d.find('/').map(|i| d[i..].to_string()));
            match (state.files.remove(&path), dest) {
                (Some(body), Some(dest)) => {
                    state.files.insert(dest, body);
                    respond(&mut stream, "201 Created", &[("Content-Length", "0".into())], None)
                }
                _ => not_found(&mut stream),
            }
        }
        _ => respond(&mut stream, "405 Method Not Allowed", &[("Content-Length", "0".into())], None),
    }
}

fn not_found(stream: &mut TcpStream) {
    respond(stream, "404 Not Found", &[("Content-Length", "0".into())], None)
}

fn respond(stream: &mut TcpStream, status: &str, headers: &[(&str, String)], body: Option<&[u8]>) {
    let mut head = format!("HTTP/1.1 {}\r\nConnection: close\r\n", status);
    for (name, value) in headers {
        head.push_str(&format!("{}: {}\r\n", name, value));
    }
    head.push_str("\r\n");
    let _ = stream.write_all(head.as_bytes());
    if let Some(body) = body {
        let _ = stream.write_all(body);
    }
}

fn parse_request(request: &str) -> Option<Parsed> {
    let mut lines = request.lines();
    let mut first = lines.next()?.split_whitespace();
    let method = first.next()?.to_string();
    let target = first.next()?.to_string();
    let mut range = None;
    let mut destination = None;
    for line in lines {
        let line = line.trim();
        if line.is_empty() {
            break;
        }
        let Some((name, value)) = line.split_once(':') else {
            continue;
        };
        let value = value.trim();
        if name.trim().eq_ignore_ascii_case("range") {
            if let Some((a, b)) = value.strip_prefix("bytes=").and_then(|v| v.split_once('-')) {
                let start = a.trim().parse::<u64>().unwrap_or(0);
                let end = b.trim().parse::<u64>().ok();
                range = Some((start, end));
            }
        }
        if name.trim().eq_ignore_ascii_case("destination") {
            destination = Some(value.to_string());
        }
    }
    Some(Parsed {
        method,
        target,
        range,
        destination,
    })
}
