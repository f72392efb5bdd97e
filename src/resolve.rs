use percent_encoding::percent_decode_str;
use std::path::{Path, PathBuf};

/// Outcome of mapping a request target onto the local filesystem.
///
/// `is_within_root` must be checked before any read of `absolute`. It is
/// false both when the canonical path lands outside the serving root and when
/// canonicalization fails outright (typically a missing file); the caller
/// distinguishes the two by checking existence, so that resolution failures
/// surface as "not found" rather than leaking filesystem layout.
pub struct ResolvedPath {
    pub absolute: PathBuf,
    pub is_within_root: bool,
}

/// Maps a raw request target to a filesystem path under `root`.
///
/// Strips any query string and fragment, percent-decodes the remainder,
/// drops leading slashes, and joins onto `root`. Containment is decided on
/// the canonical (symlink- and `..`-resolved) forms of both paths, compared
/// component-wise.
pub fn resolve(raw_target: &str, root: &Path) -> ResolvedPath {
    let target = raw_target.split(['?', '#']).next().unwrap_or("");
    let decoded = percent_decode_str(target).decode_utf8_lossy();
    let joined = root.join(decoded.trim_start_matches('/'));

    let canonical_root = match root.canonicalize() {
        Ok(p) => p,
        Err(_) => {
            return ResolvedPath {
                absolute: joined,
                is_within_root: false,
            }
        }
    };

    match joined.canonicalize() {
        Ok(canonical) => {
            let within = canonical.starts_with(&canonical_root);
            ResolvedPath {
                absolute: canonical,
                is_within_root: within,
            }
        }
        Err(_) => ResolvedPath {
            absolute: joined,
            is_within_root: false,
        },
    }
}
