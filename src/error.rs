use std::fmt;

/// Error taxonomy for the server.
///
/// Component-level failures are translated into one of these variants at the
/// component boundary; the dispatcher maps each variant to an HTTP status via
/// `status_reason` and never lets a raw I/O error reach the transport layer.
#[derive(Debug)]
pub enum AppError {
    Io(std::io::Error),
    /// Resolved path exists but escapes the serving root.
    PathEscape,
    /// Missing file, failed canonicalization, or listing permission denial.
    NotFound,
    /// Range header present but not parseable.
    MalformedRange,
    /// Range header parseable but outside the file's bounds.
    UnsatisfiableRange,
    /// Request line could not be read or understood.
    BadRequest,
    MethodNotAllowed,
    DirectoryUnavailable(String),
    PortsExhausted { start: u16, attempts: u16 },
    Internal(String),
}

impl AppError {
    /// HTTP status code and reason phrase for this error.
    pub fn status_reason(&self) -> (u16, &'static str) {
        match self {
            AppError::PathEscape => (403, "Forbidden"),
            AppError::NotFound => (404, "Not Found"),
            AppError::MalformedRange | AppError::BadRequest => (400, "Bad Request"),
            AppError::UnsatisfiableRange => (416, "Range Not Satisfiable"),
            AppError::MethodNotAllowed => (405, "Method Not Allowed"),
            _ => (500, "Internal Server Error"),
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Io(err) => write!(f, "IO error: {err}"),
            AppError::PathEscape => write!(f, "Path escapes serving root"),
            AppError::NotFound => write!(f, "Not Found"),
            AppError::MalformedRange => write!(f, "Malformed Range header"),
            AppError::UnsatisfiableRange => write!(f, "Range not satisfiable"),
            AppError::BadRequest => write!(f, "Bad request"),
            AppError::MethodNotAllowed => write!(f, "Method not allowed"),
            AppError::DirectoryUnavailable(path) => {
                write!(f, "Serving directory unavailable: {path}")
            }
            AppError::PortsExhausted { start, attempts } => {
                write!(
                    f,
                    "No free ports found in {start}..{}",
                    start.saturating_add(*attempts)
                )
            }
            AppError::Internal(msg) => write!(f, "Internal server error: {msg}"),
        }
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Io(err)
    }
}

impl std::error::Error for AppError {}
