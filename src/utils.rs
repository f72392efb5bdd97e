use crate::error::AppError;
use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};

/// Characters that must not appear raw inside an href attribute.
const HREF_ENCODE_SET: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'<')
    .add(b'>')
    .add(b'?');

/// Splits an HTTP request line into method and raw target.
pub fn parse_request_line(line: &str) -> Result<(&str, &str), AppError> {
    let mut parts = line.split_whitespace();
    let method = parts.next().ok_or(AppError::BadRequest)?;
    let target = parts.next().ok_or(AppError::BadRequest)?;
    Ok((method, target))
}

/// Percent-encodes a file name for use in a listing link.
pub fn percent_encode_href(name: &str) -> String {
    utf8_percent_encode(name, HREF_ENCODE_SET).to_string()
}

/// Escapes HTML metacharacters in display text.
pub fn html_escape(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}
