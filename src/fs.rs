use crate::error::AppError;
use crate::mime::is_video;
use crate::utils::{html_escape, percent_encode_href};
use log::debug;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

#[derive(Debug, PartialEq, Eq)]
pub enum EntryKind {
    File,
    Directory,
}

/// One child of a listed directory, alive only while the page is rendered.
pub struct DirectoryEntry {
    pub name: String,
    pub kind: EntryKind,
    pub is_video: bool,
}

/// Enumerates the immediate children of `path` in ordinal name order.
///
/// Permission denial maps to `NotFound` so restricted directories are
/// indistinguishable from absent ones.
pub fn read_entries(path: &Path) -> Result<Vec<DirectoryEntry>, AppError> {
    let reader = match fs::read_dir(path) {
        Ok(reader) => reader,
        Err(err) if err.kind() == ErrorKind::PermissionDenied => return Err(AppError::NotFound),
        Err(err) => return Err(AppError::Io(err)),
    };

    let mut entries = Vec::new();
    for entry in reader {
        let entry = entry?;
        let name = entry.file_name().to_string_lossy().into_owned();
        let kind = if entry.file_type()?.is_dir() {
            EntryKind::Directory
        } else {
            EntryKind::File
        };
        let is_video = kind == EntryKind::File && is_video(Path::new(&name));
        entries.push(DirectoryEntry {
            name,
            kind,
            is_video,
        });
    }
    entries.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(entries)
}

/// Renders an HTML listing of `path`, highlighting video files.
///
/// The heading shows the location relative to `root`; the filesystem path
/// itself never appears in the page.
pub fn generate_directory_listing(path: &Path, root: &Path) -> Result<String, AppError> {
    debug!("Generating directory listing for: '{}'", path.display());
    let entries = read_entries(path)?;

    let display_path = match path.strip_prefix(root) {
        Ok(rel) if rel.as_os_str().is_empty() => "/".to_string(),
        Ok(rel) => format!("/{}", rel.display()),
        Err(_) => "/".to_string(),
    };

    let mut html = format!(
        r#"<!DOCTYPE html>
<html>
<head>
    <title>360&deg; Video Server - Directory Listing</title>
    <style>
        body {{ font-family: Arial, sans-serif; margin: 20px; }}
        .video {{ color: #0066cc; font-weight: bold; }}
        .directory {{ color: #666; }}
        a {{ text-decoration: none; margin: 5px 0; display: block; }}
        a:hover {{ text-decoration: underline; }}
    </style>
</head>
<body>
    <h1>360&deg; Video Server</h1>
    <h2>Directory: {}</h2>
    <hr>
"#,
        html_escape(&display_path)
    );

    if path != root {
        html.push_str("<a href=\"../\" class=\"directory\">\u{1F4C1} .. (Parent Directory)</a>\n");
    }

    for entry in &entries {
        let href = percent_encode_href(&entry.name);
        let name = html_escape(&entry.name);
        match entry.kind {
            EntryKind::Directory => {
                html.push_str(&format!(
                    "<a href=\"{href}/\" class=\"directory\">\u{1F4C1} {name}/</a>\n"
                ));
            }
            EntryKind::File if entry.is_video => {
                html.push_str(&format!(
                    "<a href=\"{href}\" class=\"video\">\u{1F3A5} {name}</a>\n"
                ));
            }
            EntryKind::File => {
                html.push_str(&format!("<a href=\"{href}\">\u{1F4C4} {name}</a>\n"));
            }
        }
    }

    html.push_str(
        "<hr>\n    <p><em>360&deg; Video HTTP Server - Ready for streaming</em></p>\n</body>\n</html>\n",
    );
    Ok(html)
}
