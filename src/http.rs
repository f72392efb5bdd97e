use crate::error::AppError;
use crate::fs::generate_directory_listing;
use crate::mime::classify;
use crate::range;
use crate::resolve::resolve;
use crate::response::{send_error, ResponseHead};
use crate::stream::{is_peer_closed, stream_full, stream_range, StreamOutcome};
use crate::utils::parse_request_line;
use log::{debug, error, info, warn};
use std::io::{prelude::*, BufReader};
use std::net::TcpStream;
use std::path::{Path, PathBuf};

/// Everything the dispatcher needs from one inbound request.
pub struct RequestContext {
    pub raw_target: String,
    pub range_header: Option<String>,
}

/// Per-request orchestration: path resolution, containment, and the branch
/// between directory listing, full streaming, and range streaming.
///
/// Constructed once with its dependencies and shared across worker threads;
/// it holds no mutable state.
pub struct Dispatcher {
    root: PathBuf,
}

impl Dispatcher {
    /// `root` must already be canonical; `run_server` canonicalizes it once
    /// at startup.
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    pub fn dispatch(
        &self,
        stream: &mut TcpStream,
        ctx: &RequestContext,
        log_prefix: &str,
    ) -> Result<(), AppError> {
        let resolved = resolve(&ctx.raw_target, &self.root);

        if !resolved.absolute.exists() {
            info!("{log_prefix} not found: '{}'", ctx.raw_target);
            return Err(AppError::NotFound);
        }
        if !resolved.is_within_root {
            warn!(
                "{log_prefix} potential path traversal attempt: '{}'",
                ctx.raw_target
            );
            return Err(AppError::PathEscape);
        }

        if resolved.absolute.is_dir() {
            self.serve_directory(stream, &resolved.absolute, log_prefix)
        } else {
            self.serve_file(stream, &resolved.absolute, ctx, log_prefix)
        }
    }

    fn serve_directory(
        &self,
        stream: &mut TcpStream,
        path: &Path,
        log_prefix: &str,
    ) -> Result<(), AppError> {
        info!("{log_prefix} serving directory listing");
        let html = generate_directory_listing(path, &self.root)?;

        // No Content-Length: the listing body is delimited by connection close.
        let head = ResponseHead::new(200, "OK").header("Content-Type", "text/html; charset=utf-8");
        if let Err(err) = head.write_to(stream) {
            return if is_peer_closed(&err) {
                debug!("{log_prefix} peer closed before listing was sent");
                Ok(())
            } else {
                Err(AppError::Io(err))
            };
        }
        if let Err(err) = stream
            .write_all(html.as_bytes())
            .and_then(|()| stream.flush())
        {
            if is_peer_closed(&err) {
                debug!("{log_prefix} peer closed while listing was being sent");
            } else {
                warn!("{log_prefix} write failed while sending listing: {err}");
            }
        }
        Ok(())
    }

    fn serve_file(
        &self,
        stream: &mut TcpStream,
        path: &Path,
        ctx: &RequestContext,
        log_prefix: &str,
    ) -> Result<(), AppError> {
        let mime_type = classify(path);

        let outcome = match &ctx.range_header {
            Some(header) => {
                let file_size = std::fs::metadata(path)?.len();
                let byte_range = range::parse(header, file_size)?;
                info!(
                    "{log_prefix} streaming range {}-{}/{} of '{}'",
                    byte_range.start,
                    byte_range.end,
                    byte_range.total,
                    ctx.raw_target
                );
                stream_range(stream, path, mime_type, byte_range, log_prefix)?
            }
            None => {
                info!("{log_prefix} streaming full file '{}'", ctx.raw_target);
                stream_full(stream, path, mime_type, log_prefix)?
            }
        };

        match outcome {
            StreamOutcome::Completed => debug!("{log_prefix} transfer complete"),
            StreamOutcome::PeerClosed | StreamOutcome::Truncated => {}
        }
        Ok(())
    }
}

/// Handles a single client connection: reads the request, dispatches it, and
/// converts any taxonomy error into an HTTP error response.
pub fn handle_client(mut stream: TcpStream, dispatcher: &Dispatcher, log_prefix: &str) {
    let ctx = match read_request(&stream, log_prefix) {
        Ok(ctx) => ctx,
        Err(err) => {
            report_error(&mut stream, &err, log_prefix);
            return;
        }
    };

    if let Err(err) = dispatcher.dispatch(&mut stream, &ctx, log_prefix) {
        report_error(&mut stream, &err, log_prefix);
    }
}

/// Reads the request line and headers off the socket.
///
/// Only `GET` is served; the sole header of interest is `Range`.
fn read_request(stream: &TcpStream, log_prefix: &str) -> Result<RequestContext, AppError> {
    let reader = BufReader::new(stream);
    let mut lines_iter = reader.lines();

    let request_line = match lines_iter.next() {
        Some(Ok(line)) => line,
        Some(Err(err)) => return Err(AppError::Io(err)),
        None => return Err(AppError::BadRequest),
    };
    debug!("{log_prefix} request line: {request_line}");

    let (method, target) = parse_request_line(&request_line)?;
    if method != "GET" {
        return Err(AppError::MethodNotAllowed);
    }
    let raw_target = target.to_string();

    let mut range_header = None;
    for line in lines_iter {
        let line = line?;
        if line.is_empty() {
            break;
        }
        if let Some((name, value)) = line.split_once(':') {
            if name.eq_ignore_ascii_case("Range") {
                range_header = Some(value.trim().to_string());
            }
        }
    }

    Ok(RequestContext {
        raw_target,
        range_header,
    })
}

fn report_error(stream: &mut TcpStream, err: &AppError, log_prefix: &str) {
    let (status, reason) = err.status_reason();
    if status == 500 {
        error!("{log_prefix} internal error: {err}");
    } else {
        debug!("{log_prefix} rejecting request with {status}: {err}");
    }
    send_error(stream, status, reason, log_prefix);
}
