//! Mock record store HTTP server for testing
//!
//! Serves a fixed JSON body (configurable status and delay) for every GET,
//! so the HTTP adapter can be exercised without a real store. The body can
//! be swapped while the server runs to simulate server-side changes.

use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;

use parking_lot::Mutex;

/// Mock record store server for testing
pub struct MockStoreServer {
    port: u16,
    running: Arc<AtomicBool>,
    requests: Arc<AtomicUsize>,
    config: Arc<Mutex<MockConfig>>,
    thread_handle: Option<thread::JoinHandle<()>>,
}

/// What the mock server answers with
#[derive(Debug, Clone)]
pub struct MockConfig {
    /// Response body
    pub body: String,
    /// HTTP status code
    pub status: u16,
    /// Delay in milliseconds before responding
    pub delay_ms: u64,
}

impl Default for MockConfig {
    fn default() -> Self {
        Self {
            body: r#"{"users":[]}"#.to_string(),
            status: 200,
            delay_ms: 0,
        }
    }
}

impl MockConfig {
    pub fn with_body(body: impl Into<String>) -> Self {
        Self {
            body: body.into(),
            ..Self::default()
        }
    }
}

impl MockStoreServer {
    /// Start a new mock server on a random available port
    pub fn start(config: MockConfig) -> std::io::Result<Self> {
        let listener = TcpListener::bind("127.0.0.1:0")?;
        let port = listener.local_addr()?.port();
        let running = Arc::new(AtomicBool::new(true));
        let requests = Arc::new(AtomicUsize::new(0));
        let config = Arc::new(Mutex::new(config));

        // Non-blocking so the accept loop notices shutdown
        listener.set_nonblocking(true)?;

        let thread_handle = {
            let running = running.clone();
            let requests = requests.clone();
            let config = config.clone();
            thread::spawn(move || {
                while running.load(Ordering::SeqCst) {
                    match listener.accept() {
                        Ok((stream, _)) => {
                            requests.fetch_add(1, Ordering::SeqCst);
                            let cfg = config.lock().clone();
                            thread::spawn(move || handle_connection(stream, &cfg));
                        }
                        Err(ref e) if e.kind() == std::io::ErrorKind::WouldBlock => {
                            thread::sleep(std::time::Duration::from_millis(5));
                        }
                        Err(_) => break,
                    }
                }
            })
        };

        Ok(Self {
            port,
            running,
            requests,
            config,
            thread_handle: Some(thread_handle),
        })
    }

    /// Full URL for a path on this server
    pub fn url(&self, path: &str) -> String {
        format!("http://127.0.0.1:{}{}", self.port, path)
    }

    /// Replace the body served to subsequent requests
    pub fn set_body(&self, body: impl Into<String>) {
        self.config.lock().body = body.into();
    }

    /// Number of connections accepted so far
    pub fn request_count(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }

    /// Stop the mock server
    pub fn stop(&mut self) {
        self.running.store(false, Ordering::SeqCst);
        if let Some(handle) = self.thread_handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for MockStoreServer {
    fn drop(&mut self) {
        self.stop();
    }
}

fn handle_connection(mut stream: TcpStream, config: &MockConfig) {
    // Accepted sockets inherit non-blocking mode on some platforms
    let _ = stream.set_nonblocking(false);
    let mut buffer = [0; 4096];

    if let Ok(n) = stream.read(&mut buffer) {
        let request = String::from_utf8_lossy(&buffer[..n]);

        if config.delay_ms > 0 {
            thread::sleep(std::time::Duration::from_millis(config.delay_ms));
        }

        let method = request.split_whitespace().next().unwrap_or("");
        if method != "GET" {
            send_response(&mut stream, 405, r#"{"error": "Method not allowed"}"#);
            return;
        }

        send_response(&mut stream, config.status, &config.body);
    }
}

fn send_response(stream: &mut TcpStream, status: u16, body: &str) {
    let status_text = match status {
        200 => "OK",
        404 => "Not Found",
        405 => "Method Not Allowed",
        500 => "Internal Server Error",
        503 => "Service Unavailable",
        _ => "Status",
    };
    let response = format!(
        "HTTP/1.1 {} {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        status,
        status_text,
        body.len(),
        body
    );
    let _ = stream.write_all(response.as_bytes());
    let _ = stream.flush();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_answers_with_configured_body() {
        let server = MockStoreServer::start(MockConfig::with_body(r#"{"users":[1]}"#)).unwrap();

        let mut stream = TcpStream::connect(("127.0.0.1", server.port)).unwrap();
        stream
            .write_all(b"GET /users HTTP/1.1\r\nHost: localhost\r\n\r\n")
            .unwrap();
        let mut response = String::new();
        stream.read_to_string(&mut response).unwrap();

        assert!(response.starts_with("HTTP/1.1 200 OK"));
        assert!(response.ends_with(r#"{"users":[1]}"#));
        assert_eq!(server.request_count(), 1);
    }
}
