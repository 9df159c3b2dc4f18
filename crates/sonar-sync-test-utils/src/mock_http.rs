//! Minimal HTTP/1.1 server returning canned responses.
//!
//! Good enough for exercising the blocking reqwest client: one request per
//! connection, `Connection: close` on every response, bodies read by
//! `Content-Length`.

use std::collections::BTreeMap;
use std::io::{BufRead, BufReader, Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::{Arc, Mutex};
use std::thread;

/// A request as seen by the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedRequest {
    pub method: String,
    /// Path including the query string, e.g. `/api/v3/tools?cursor=abc`
    pub target: String,
    /// Header names lowercased
    pub headers: BTreeMap<String, String>,
    pub body: String,
}

impl RecordedRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(&name.to_lowercase()).map(String::as_str)
    }

    pub fn json(&self) -> serde_json::Value {
        serde_json::from_str(&self.body)
            .unwrap_or_else(|e| panic!("Request body is not JSON ({}): {}", e, self.body))
    }
}

#[derive(Debug, Clone)]
struct Route {
    method: String,
    target: String,
    status: u16,
    body: String,
}

#[derive(Debug, Default)]
struct Shared {
    routes: Vec<Route>,
    requests: Vec<RecordedRequest>,
}

/// Canned-response server bound to an ephemeral localhost port.
///
/// Unmatched requests get a 404 with a JSON error body.
///
/// # Example
///
/// ```rust,no_run
/// use sonar_sync_test_utils::MockServer;
///
/// let server = MockServer::start();
/// server.respond("GET", "/api/v3/tools", 200, r#"{"data":[]}"#);
/// let base_url = server.base_url();
/// ```
pub struct MockServer {
    port: u16,
    shared: Arc<Mutex<Shared>>,
}

impl MockServer {
    pub fn start() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        let shared = Arc::new(Mutex::new(Shared::default()));

        let worker = Arc::clone(&shared);
        thread::spawn(move || {
            for stream in listener.incoming() {
                let Ok(stream) = stream else { break };
                handle(stream, &worker);
            }
        });

        Self { port, shared }
    }

    /// `http://127.0.0.1:<port>/api/v3`
    pub fn base_url(&self) -> String {
        format!("http://127.0.0.1:{}/api/v3", self.port)
    }

    /// Register a response for `method` + `target` (path and query).
    ///
    /// Later registrations for the same request take precedence.
    pub fn respond(&self, method: &str, target: &str, status: u16, body: &str) {
        self.shared.lock().unwrap().routes.push(Route {
            method: method.to_string(),
            target: target.to_string(),
            status,
            body: body.to_string(),
        });
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.shared.lock().unwrap().requests.clone()
    }
}

fn handle(mut stream: TcpStream, shared: &Mutex<Shared>) {
    let Some(request) = read_request(&stream) else {
        return;
    };

    let (status, body) = {
        let mut shared = shared.lock().unwrap();
        let response = shared
            .routes
            .iter()
            .rev()
            .find(|r| r.method == request.method && r.target == request.target)
            .map(|r| (r.status, r.body.clone()))
            .unwrap_or((404, r#"{"error":"Not found"}"#.to_string()));
        shared.requests.push(request);
        response
    };

    let response = format!(
        "HTTP/1.1 {} {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        status,
        reason(status),
        body.len(),
        body
    );
    let _ = stream.write_all(response.as_bytes());
    let _ = stream.flush();
}

fn read_request(stream: &TcpStream) -> Option<RecordedRequest> {
    let mut reader = BufReader::new(stream);

    let mut request_line = String::new();
    reader.read_line(&mut request_line).ok()?;
    let mut parts = request_line.split_whitespace();
    let method = parts.next()?.to_string();
    let target = parts.next()?.to_string();

    let mut headers = BTreeMap::new();
    loop {
        let mut line = String::new();
        if reader.read_line(&mut line).ok()? == 0 {
            break;
        }
        let line = line.trim_end();
        if line.is_empty() {
            break;
        }
        if let Some((name, value)) = line.split_once(':') {
            headers.insert(name.trim().to_lowercase(), value.trim().to_string());
        }
    }

    let length: usize = headers
        .get("content-length")
        .and_then(|v| v.parse().ok())
        .unwrap_or(0);
    let mut body = vec![0; length];
    reader.read_exact(&mut body).ok()?;

    Some(RecordedRequest {
        method,
        target,
        headers,
        body: String::from_utf8_lossy(&body).into_owned(),
    })
}

fn reason(status: u16) -> &'static str {
    match status {
        200 => "OK",
        201 => "Created",
        204 => "No Content",
        400 => "Bad Request",
        401 => "Unauthorized",
        403 => "Forbidden",
        404 => "Not Found",
        500 => "Internal Server Error",
        _ => "Unknown",
    }
}
