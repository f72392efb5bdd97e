use crate::stream::is_peer_closed;
use log::debug;
use std::io::{self, Write};
use std::net::TcpStream;

pub const SERVER_IDENT: &str = concat!("vid_sv/", env!("CARGO_PKG_VERSION"));

/// Status line and headers of an HTTP/1.1 response.
///
/// Every response carries the server identity, `Connection: close` (each
/// connection serves one request), and a permissive CORS header so streaming
/// clients on other origins can fetch directly.
pub struct ResponseHead {
    status: u16,
    reason: &'static str,
    headers: Vec<(&'static str, String)>,
}

impl ResponseHead {
    pub fn new(status: u16, reason: &'static str) -> Self {
        Self {
            status,
            reason,
            headers: vec![
                ("Server", SERVER_IDENT.to_string()),
                ("Connection", "close".to_string()),
                ("Access-Control-Allow-Origin", "*".to_string()),
            ],
        }
    }

    pub fn header(mut self, name: &'static str, value: impl Into<String>) -> Self {
        self.headers.push((name, value.into()));
        self
    }

    /// Writes the status line, headers, and terminating blank line.
    ///
    /// Once this returns `Ok`, the status is committed and can no longer
    /// change; later failures can only truncate the body.
    pub fn write_to(&self, stream: &mut TcpStream) -> io::Result<()> {
        let mut head = format!("HTTP/1.1 {} {}\r\n", self.status, self.reason);
        for (name, value) in &self.headers {
            head.push_str(&format!("{name}: {value}\r\n"));
        }
        head.push_str("\r\n");
        stream.write_all(head.as_bytes())?;
        stream.flush()
    }
}

/// Sends a short self-describing HTML error page.
///
/// Write failures are tolerated: the peer may already be gone by the time an
/// error response is attempted, and there is nobody left to inform.
pub fn send_error(stream: &mut TcpStream, status: u16, reason: &'static str, log_prefix: &str) {
    let body = format!(
        "<!DOCTYPE html>\n<html>\n<head><title>{status} {reason}</title></head>\n\
         <body><h1>{status} {reason}</h1></body>\n</html>\n"
    );
    let head = ResponseHead::new(status, reason)
        .header("Content-Type", "text/html; charset=utf-8")
        .header("Content-Length", body.len().to_string());

    let result = head
        .write_to(stream)
        .and_then(|()| stream.write_all(body.as_bytes()))
        .and_then(|()| stream.flush());
    if let Err(err) = result {
        if is_peer_closed(&err) {
            debug!("{log_prefix} peer closed before error response could be sent");
        } else {
            debug!("{log_prefix} failed to send error response: {err}");
        }
    }
}
