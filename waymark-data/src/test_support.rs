//! Local HTTP stub for exercising the adapters without a real service.
//!
//! [`StubHttpServer`] listens on an ephemeral loopback port and answers each
//! connection with the next queued [`StubResponse`], then closes it. Request
//! lines are recorded so tests can assert on paths and query strings.

use std::collections::VecDeque;
use std::io::{BufRead, BufReader, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// One canned HTTP response.
#[derive(Debug, Clone)]
pub struct StubResponse {
    /// Status code.
    pub status: u16,
    /// JSON body.
    pub body: String,
    /// Pause before answering.
    pub delay: Duration,
}

impl StubResponse {
    /// A `200 OK` JSON response.
    #[must_use]
    pub fn json(body: impl Into<String>) -> Self {
        Self::status(200, body)
    }

    /// A JSON response with an explicit status.
    #[must_use]
    pub fn status(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
            delay: Duration::ZERO,
        }
    }

    /// Delay the answer, for timeout tests.
    #[must_use]
    pub const fn delayed(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

/// Single-threaded HTTP/1.1 stub bound to `127.0.0.1`.
///
/// Serves exactly as many connections as responses were queued; the
/// listener thread then exits.
#[derive(Debug)]
pub struct StubHttpServer {
    base_url: String,
    requests: Arc<Mutex<Vec<String>>>,
    handle: Option<JoinHandle<()>>,
}

impl StubHttpServer {
    /// Start serving `responses` in order.
    ///
    /// # Errors
    /// Returns an I/O error when the loopback listener cannot be bound.
    pub fn start(responses: Vec<StubResponse>) -> std::io::Result<Self> {
        let listener = TcpListener::bind("127.0.0.1:0")?;
        let base_url = format!("http://{}", listener.local_addr()?);
        let requests = Arc::new(Mutex::new(Vec::new()));
        let recorded = Arc::clone(&requests);
        let mut queue: VecDeque<StubResponse> = responses.into();
        let handle = thread::spawn(move || {
            while let Some(response) = queue.pop_front() {
                let Ok((stream, _)) = listener.accept() else {
                    break;
                };
                if let Err(err) = serve(stream, &response, &recorded) {
                    log::debug!("stub server connection failed: {err}");
                }
            }
        });
        Ok(Self {
            base_url,
            requests,
            handle: Some(handle),
        })
    }

    /// `http://127.0.0.1:{port}` without a trailing slash.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Request lines received so far, such as `GET /route?point=... HTTP/1.1`.
    #[must_use]
    pub fn requests(&self) -> Vec<String> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Wait for the listener thread to serve every queued response.
    pub fn join(mut self) {
        if let Some(handle) = self.handle.take()
            && handle.join().is_err()
        {
            log::warn!("stub server thread panicked");
        }
    }
}

fn serve(
    stream: TcpStream,
    response: &StubResponse,
    recorded: &Mutex<Vec<String>>,
) -> std::io::Result<()> {
    let mut reader = BufReader::new(stream.try_clone()?);
    let mut request_line = String::new();
    reader.read_line(&mut request_line)?;
    recorded
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .push(request_line.trim_end().to_owned());
    // Drain headers up to the blank line; GET requests carry no body.
    let mut header = String::new();
    while reader.read_line(&mut header)? > 0 && !header.trim_end().is_empty() {
        header.clear();
    }
    if !response.delay.is_zero() {
        thread::sleep(response.delay);
    }
    let mut writer = stream;
    write!(
        writer,
        "HTTP/1.1 {} {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        response.status,
        reason(response.status),
        response.body.len(),
        response.body
    )?;
    writer.flush()
}

const fn reason(status: u16) -> &'static str {
    match status {
        200 => "OK",
        400 => "Bad Request",
        401 => "Unauthorized",
        404 => "Not Found",
        429 => "Too Many Requests",
        500 => "Internal Server Error",
        503 => "Service Unavailable",
        _ => "Status",
    }
}
