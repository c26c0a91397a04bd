//! Upload and chart storage helpers.
//!
//! Files accumulate without any retention policy; both directories are
//! append-only for the life of the process.

use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Strip path components and anything outside `[A-Za-z0-9._-]` from a
/// client-supplied filename.
pub fn sanitize_filename(name: &str) -> String {
    let base = name
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(name);

    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect();

    // Refuse names that sanitize down to dots only.
    if cleaned.trim_matches(['.', '_']).is_empty() {
        "upload".to_string()
    } else {
        cleaned
    }
}

/// Save an uploaded file under `dir` with a sanitized name, returning
/// the path written.
pub fn save_upload(dir: &Path, filename: &str, bytes: &[u8]) -> Result<PathBuf> {
    if bytes.is_empty() {
        return Err(Error::Io(std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            "refusing to save an empty upload",
        )));
    }
    let path = dir.join(sanitize_filename(filename));
    std::fs::write(&path, bytes)?;
    Ok(path)
}

/// Create a directory (and parents) if it does not exist yet.
pub fn ensure_dir(path: &Path) -> Result<()> {
    std::fs::create_dir_all(path)?;
    Ok(())
}
