//! Capability-based file helpers built on `cap-std` and `camino`.
//!
//! Every helper opens the parent directory with ambient authority and then
//! works relative to it, so the rest of the crate never touches `std::fs`.

use std::io;

use camino::Utf8Path;
use cap_std::{ambient_authority, fs_utf8};

/// Read a whole file as UTF-8 text.
///
/// # Errors
/// Returns the underlying I/O error, including invalid UTF-8.
pub fn read_utf8(path: &Utf8Path) -> io::Result<String> {
    let (dir, name) = open_parent(path)?;
    dir.read_to_string(name)
}

/// Whether `path` exists and is a regular file.
///
/// # Errors
/// Returns the I/O error from inspecting the path; a missing file surfaces
/// as [`io::ErrorKind::NotFound`].
pub fn file_is_file(path: &Utf8Path) -> io::Result<bool> {
    let (dir, name) = open_parent(path)?;
    dir.metadata(name).map(|meta| meta.is_file())
}

/// Replace `path` with `contents` without exposing a partial file.
///
/// Writes a hidden sibling first and renames it over the target. Missing
/// parent directories are created.
///
/// # Errors
/// Returns the first I/O error; the temporary file is removed on failure
/// where possible.
pub fn write_atomic(path: &Utf8Path, contents: &[u8]) -> io::Result<()> {
    if let Some(parent) = path.parent().filter(|parent| !parent.as_str().is_empty()) {
        fs_utf8::Dir::create_ambient_dir_all(parent, ambient_authority())?;
    }
    let (dir, name) = open_parent(path)?;
    let staging = format!(".{name}.tmp");
    let written = dir
        .write(&staging, contents)
        .and_then(|()| dir.rename(&staging, &dir, name));
    if written.is_err()
        && let Err(cleanup) = dir.remove_file(&staging)
    {
        log::debug!("could not remove staging file {staging}: {cleanup}");
    }
    written
}

fn open_parent(path: &Utf8Path) -> io::Result<(fs_utf8::Dir, &str)> {
    let name = path
        .file_name()
        .ok_or_else(|| io::Error::other(format!("{path} does not name a file")))?;
    let parent = path
        .parent()
        .filter(|parent| !parent.as_str().is_empty())
        .unwrap_or_else(|| Utf8Path::new("."));
    let dir = fs_utf8::Dir::open_ambient_dir(parent, ambient_authority())?;
    Ok((dir, name))
}
