//! Minimal HTTP/1.1 server with scripted per-path behavior for integration tests.
//!
//! Each path maps to a [`Route`]: a fixed body, a queue of failure statuses
//! served before the body, a body gated on the User-Agent, or a stall.

use std::collections::{HashMap, VecDeque};
use std::io::{Read, Write};
use std::net::TcpListener;
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

#[derive(Debug, Clone)]
pub enum Route {
    /// Always 200 with this body.
    Body(Vec<u8>),
    /// Serve these statuses first (one per request), then 200 with the body.
    FailThen(Vec<u16>, Vec<u8>),
    /// 200 with the body only if the User-Agent contains the needle; else 403.
    RequireAgent(String, Vec<u8>),
    /// Accept the request and say nothing for this long.
    Stall(Duration),
}

#[derive(Debug)]
struct State {
    routes: HashMap<String, Route>,
    pending: HashMap<String, VecDeque<u16>>,
    hits: HashMap<String, usize>,
}

/// Handle to a running server.
#[derive(Clone)]
pub struct StatusServer {
    base: String,
    state: Arc<Mutex<State>>,
}

impl StatusServer {
    /// Starts a server in a background thread. It runs until the process exits.
    pub fn start(routes: Vec<(&str, Route)>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
        let port = listener.local_addr().unwrap().port();
        let mut pending = HashMap::new();
        let routes: HashMap<String, Route> = routes
            .into_iter()
            .map(|(p, r)| {
                if let Route::FailThen(codes, _) = &r {
                    pending.insert(p.to_string(), codes.iter().copied().collect());
                }
                (p.to_string(), r)
            })
            .collect();
        let state = Arc::new(Mutex::new(State {
            routes,
            pending,
            hits: HashMap::new(),
        }));
        let st = Arc::clone(&state);
        thread::spawn(move || {
            for stream in listener.incoming().flatten() {
                let st = Arc::clone(&st);
                thread::spawn(move || handle(stream, &st));
            }
        });
        Self {
            base: format!("http://127.0.0.1:{}", port),
            state,
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base, path)
    }

    pub fn hits(&self, path: &str) -> usize {
        self.state.lock().unwrap().hits.get(path).copied().unwrap_or(0)
    }
}

fn reason(code: u16) -> &'static str {
    match code {
        200 => "OK",
        403 => "Forbidden",
        404 => "Not Found",
        429 => "Too Many Requests",
        500 => "Internal Server Error",
        503 => "Service Unavailable",
        _ => "Status",
    }
}

fn respond(stream: &mut std::net::TcpStream, code: u16, body: &[u8]) {
    let head = format!(
        "HTTP/1.1 {} {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
        code,
        reason(code),
        body.len()
    );
    let _ = stream.write_all(head.as_bytes());
    let _ = stream.write_all(body);
}

fn handle(mut stream: std::net::TcpStream, state: &Mutex<State>) {
    let _ = stream.set_read_timeout(Some(Duration::from_secs(2)));
    let _ = stream.set_write_timeout(Some(Duration::from_secs(2)));
    let mut buf = [0u8; 8192];
    let n = match stream.read(&mut buf) {
        Ok(0) | Err(_) => return,
        Ok(n) => n,
    };
    let request = match std::str::from_utf8(&buf[..n]) {
        Ok(s) => s,
        Err(_) => return,
    };
    let (path, agent) = parse_request(request);

    let (route, next_failure) = {
        let mut st = state.lock().unwrap();
        *st.hits.entry(path.to_string()).or_default() += 1;
        let route = st.routes.get(path).cloned();
        let next_failure = st.pending.get_mut(path).and_then(|q| q.pop_front());
        (route, next_failure)
    };

    match route {
        None => respond(&mut stream, 404, b"not found"),
        Some(Route::Body(body)) => respond(&mut stream, 200, &body),
        Some(Route::FailThen(_, body)) => match next_failure {
            Some(code) => respond(&mut stream, code, b"nope"),
            None => respond(&mut stream, 200, &body),
        },
        Some(Route::RequireAgent(needle, body)) => {
            if agent.contains(&needle) {
                respond(&mut stream, 200, &body)
            } else {
                respond(&mut stream, 403, b"forbidden")
            }
        }
        Some(Route::Stall(d)) => thread::sleep(d),
    }
}

/// Returns (path, user-agent).
fn parse_request(request: &str) -> (&str, &str) {
    let mut path = "";
    let mut agent = "";
    for (i, line) in request.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            break;
        }
        if i == 0 {
            path = line.split_whitespace().nth(1).unwrap_or("");
            continue;
        }
        if let Some((name, value)) = line.split_once(':') {
            if name.trim().eq_ignore_ascii_case("user-agent") {
                agent = value.trim();
            }
        }
    }
    (path, agent)
}
