use std::ffi::OsStr;
use std::path::Path;

/// Video extensions the directory lister highlights.
pub const VIDEO_EXTENSIONS: [&str; 5] = ["mp4", "webm", "avi", "mov", "wmv"];

/// Maps a file path to a MIME type.
///
/// Consults the general `mime_guess` table first, then a fixed fallback for
/// common video formats, and finally defaults to `application/octet-stream`.
pub fn classify(path: &Path) -> &'static str {
    if let Some(mime) = mime_guess::from_path(path).first_raw() {
        return mime;
    }
    match lowercase_extension(path).as_deref() {
        Some("mp4") => "video/mp4",
        Some("webm") => "video/webm",
        Some("avi") => "video/avi",
        Some("mov") => "video/quicktime",
        Some("wmv") => "video/x-ms-wmv",
        _ => "application/octet-stream",
    }
}

/// True if the path carries a recognized video extension.
pub fn is_video(path: &Path) -> bool {
    matches!(lowercase_extension(path), Some(ext) if VIDEO_EXTENSIONS.contains(&ext.as_str()))
}

fn lowercase_extension(path: &Path) -> Option<String> {
    path.extension()
        .and_then(OsStr::to_str)
        .map(str::to_ascii_lowercase)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_common_video_types() {
        assert_eq!(classify(Path::new("clip.mp4")), "video/mp4");
        assert_eq!(classify(Path::new("clip.webm")), "video/webm");
        assert_eq!(classify(Path::new("clip.mov")), "video/quicktime");
    }

    #[test]
    fn classification_ignores_case() {
        assert_eq!(classify(Path::new("CLIP.MP4")), "video/mp4");
    }

    #[test]
    fn unknown_extension_falls_back_to_octet_stream() {
        assert_eq!(classify(Path::new("data.zq9")), "application/octet-stream");
        assert_eq!(classify(Path::new("no_extension")), "application/octet-stream");
    }

    #[test]
    fn recognizes_video_extensions() {
        assert!(is_video(Path::new("a.mp4")));
        assert!(is_video(Path::new("b.WMV")));
        assert!(!is_video(Path::new("c.txt")));
        assert!(!is_video(Path::new("plain")));
    }
}
