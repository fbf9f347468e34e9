//! NTFS Alternate Data Streams support.
//!
//! On NTFS, every file and directory has a default unnamed stream holding its
//! data and may carry any number of additional named streams, addressed as
//! `path:name`. This module provides stream discovery, Windows attribute
//! handling, and the path conventions used throughout the crate:
//!
//! - A file's stream is `dir/file.txt:name`.
//! - A directory's own stream is enumerated as `dir/:name` (the directory
//!   path, a separator, then the marker) so that its last component is
//!   `:name`. To open it the separator in front of the marker is dropped,
//!   giving `dir:name`; see [`stream_open_path`].
//!
//! # Platform Support
//!
//! Stream enumeration and attribute setting use the Windows API. On other
//! platforms no streams are ever discovered, and a `name:stream` path is an
//! ordinary file whose name contains a colon.

mod attributes;
mod streams;

use std::ffi::OsString;
use std::path::{Path, PathBuf, is_separator};

pub use attributes::{
    FILE_ATTRIBUTE_ARCHIVE, FILE_ATTRIBUTE_DIRECTORY, FILE_ATTRIBUTE_HIDDEN,
    FILE_ATTRIBUTE_NORMAL, FILE_ATTRIBUTE_READONLY, FILE_ATTRIBUTE_SYSTEM, clear_readonly,
    file_attributes, restore_metadata,
};
pub use streams::{AltStream, discover_alt_streams};

/// Separates an owner's name from a stream name.
pub const STREAM_MARKER: char = ':';

/// Checks whether the last component of `path` names a stream.
///
/// # Example
///
/// ```
/// use ntfs_streams::ntfs::is_stream_path;
/// use std::path::Path;
///
/// assert!(is_stream_path(Path::new("dir/file.txt:Zone.Identifier")));
/// assert!(is_stream_path(Path::new("dir/:meta")));
/// assert!(!is_stream_path(Path::new("dir/file.txt")));
/// ```
pub fn is_stream_path(path: &Path) -> bool {
    path.file_name()
        .is_some_and(|name| name.to_string_lossy().contains(STREAM_MARKER))
}

/// Builds the enumeration path of a stream owned by `owner`.
///
/// # Example
///
/// ```
/// use ntfs_streams::ntfs::stream_path;
/// use std::path::Path;
///
/// let file = stream_path(Path::new("proj/a.txt"), false, "meta");
/// assert_eq!(file.file_name().unwrap(), "a.txt:meta");
///
/// let dir = stream_path(Path::new("proj"), true, "meta");
/// assert_eq!(dir.file_name().unwrap(), ":meta");
/// ```
pub fn stream_path(owner: &Path, owner_is_dir: bool, stream_name: &str) -> PathBuf {
    if owner_is_dir {
        join_name(owner, &format!("{STREAM_MARKER}{stream_name}"))
    } else {
        let mut path = owner.as_os_str().to_owned();
        path.push(format!("{STREAM_MARKER}{stream_name}"));
        PathBuf::from(path)
    }
}

/// Appends one name to `dir` without interpreting it.
///
/// Unlike [`Path::join`], a name that looks like a drive prefix (`C:x`) or an
/// absolute path never replaces `dir`.
pub fn join_name(dir: &Path, name: &str) -> PathBuf {
    let base = dir.as_os_str();
    if base.is_empty() {
        return PathBuf::from(name);
    }
    let mut joined = OsString::with_capacity(base.len() + name.len() + 1);
    joined.push(base);
    let ends_with_separator = base
        .as_encoded_bytes()
        .last()
        .is_some_and(|&b| is_separator(b as char));
    if !ends_with_separator {
        joined.push(std::path::MAIN_SEPARATOR_STR);
    }
    joined.push(name);
    PathBuf::from(joined)
}

/// Turns the enumeration path of a directory stream into an openable one.
///
/// `dir/:name` becomes `dir:name`. Paths whose parent has no final name
/// (`./:name`, `/:name`) and paths of file streams are returned unchanged.
///
/// # Example
///
/// ```
/// use ntfs_streams::ntfs::stream_open_path;
/// use std::path::Path;
///
/// assert_eq!(stream_open_path(Path::new("out/proj/:meta")), Path::new("out/proj:meta"));
/// assert_eq!(stream_open_path(Path::new("./:meta")), Path::new("./:meta"));
/// assert_eq!(stream_open_path(Path::new("a.txt:meta")), Path::new("a.txt:meta"));
/// ```
pub fn stream_open_path(path: &Path) -> PathBuf {
    let Some(name) = path.file_name() else {
        return path.to_path_buf();
    };
    if !name.as_encoded_bytes().starts_with(&[STREAM_MARKER as u8]) {
        return path.to_path_buf();
    }
    match path.parent() {
        Some(parent) if parent.file_name().is_some() => {
            let mut collapsed = parent.as_os_str().to_owned();
            collapsed.push(name);
            PathBuf::from(collapsed)
        }
        _ => path.to_path_buf(),
    }
}

/// Computes where a stream record named `name` is extracted inside `dir`.
///
/// With a `separator`, the first stream marker in the name is replaced so the
/// stream lands in an ordinary file (`a.txt:meta` becomes `a.txt_meta`).
pub fn stream_destination(dir: &Path, name: &str, separator: Option<&str>) -> PathBuf {
    let name = match separator {
        Some(sep) => name.replacen(STREAM_MARKER, sep, 1),
        None => name.to_string(),
    };
    stream_open_path(&join_name(dir, &name))
}
