use std::fs;
use std::io;
use std::path::Path;

use intake_core::mime_for_path;

use crate::FilePayload;

/// Reads a file from disk into a payload named after its final path component.
pub fn load_payload(path: &Path) -> io::Result<FilePayload> {
    let name = path
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("{} has no usable file name", path.display()),
            )
        })?
        .to_string();
    let bytes = fs::read(path)?;
    Ok(FilePayload::new(name, mime_for_path(path), bytes))
}
