use crate::error::AppError;
use crate::range::ByteRange;
use crate::response::ResponseHead;
use log::{debug, warn};
use std::fs::File;
use std::io::{self, ErrorKind, Read, Seek, SeekFrom, Write};
use std::net::TcpStream;
use std::path::Path;

/// Fixed transfer chunk size; also the upper bound on how long a write can
/// block before a peer disconnect is noticed.
pub const CHUNK_SIZE: usize = 8192;

/// Terminal condition of a streaming call that got past the headers.
#[derive(Debug, PartialEq, Eq)]
pub enum StreamOutcome {
    Completed,
    /// The remote peer closed the connection mid-transfer. Normal for
    /// streaming playback (seeks, teardown), never an error.
    PeerClosed,
    /// A local I/O failure after the headers were committed; the body was
    /// cut short and the connection closed.
    Truncated,
}

/// True for error kinds raised by the remote peer closing the connection.
pub fn is_peer_closed(err: &io::Error) -> bool {
    matches!(
        err.kind(),
        ErrorKind::BrokenPipe | ErrorKind::ConnectionReset | ErrorKind::ConnectionAborted
    )
}

/// Streams an entire file as a 200 response.
pub fn stream_full(
    stream: &mut TcpStream,
    path: &Path,
    mime_type: &str,
    log_prefix: &str,
) -> Result<StreamOutcome, AppError> {
    let mut file = File::open(path)?;
    let file_size = file.metadata()?.len();

    let head = ResponseHead::new(200, "OK")
        .header("Content-Type", mime_type)
        .header("Content-Length", file_size.to_string())
        .header("Accept-Ranges", "bytes");
    if let Err(err) = head.write_to(stream) {
        return header_write_failure(err, log_prefix);
    }

    copy_chunks(stream, &mut file, file_size, log_prefix)
}

/// Streams a validated byte range of a file as a 206 response.
pub fn stream_range(
    stream: &mut TcpStream,
    path: &Path,
    mime_type: &str,
    range: ByteRange,
    log_prefix: &str,
) -> Result<StreamOutcome, AppError> {
    let mut file = File::open(path)?;
    file.seek(SeekFrom::Start(range.start))?;

    let head = ResponseHead::new(206, "Partial Content")
        .header("Content-Type", mime_type)
        .header("Content-Length", range.byte_count().to_string())
        .header(
            "Content-Range",
            format!("bytes {}-{}/{}", range.start, range.end, range.total),
        )
        .header("Accept-Ranges", "bytes");
    if let Err(err) = head.write_to(stream) {
        return header_write_failure(err, log_prefix);
    }

    copy_chunks(stream, &mut file, range.byte_count(), log_prefix)
}

fn header_write_failure(err: io::Error, log_prefix: &str) -> Result<StreamOutcome, AppError> {
    if is_peer_closed(&err) {
        debug!("{log_prefix} peer closed before headers were sent");
        Ok(StreamOutcome::PeerClosed)
    } else {
        Err(AppError::Io(err))
    }
}

/// Copies exactly `remaining` bytes from `file` to `stream` in fixed-size
/// chunks, flushing after each so playback data is never held back.
fn copy_chunks(
    stream: &mut TcpStream,
    file: &mut File,
    mut remaining: u64,
    log_prefix: &str,
) -> Result<StreamOutcome, AppError> {
    let mut buffer = [0u8; CHUNK_SIZE];
    while remaining > 0 {
        let want = remaining.min(CHUNK_SIZE as u64) as usize;
        let read = match file.read(&mut buffer[..want]) {
            Ok(0) => break,
            Ok(n) => n,
            Err(ref err) if err.kind() == ErrorKind::Interrupted => continue,
            Err(err) => {
                // Headers are committed; all that is left is to cut the body short.
                warn!("{log_prefix} read failed mid-stream, truncating response: {err}");
                return Ok(StreamOutcome::Truncated);
            }
        };
        if let Err(err) = stream
            .write_all(&buffer[..read])
            .and_then(|()| stream.flush())
        {
            if is_peer_closed(&err) {
                debug!("{log_prefix} peer closed connection mid-stream");
                return Ok(StreamOutcome::PeerClosed);
            }
            warn!("{log_prefix} write failed mid-stream, truncating response: {err}");
            return Ok(StreamOutcome::Truncated);
        }
        remaining -= read as u64;
    }
    Ok(StreamOutcome::Completed)
}
