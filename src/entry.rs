//! Tree entries produced by a [`TreeSource`](crate::TreeSource).

use std::path::PathBuf;

use crate::Timestamp;

/// Kind of a [`TreeEntry`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntryKind {
    /// A directory; its own streams and children are enumerated separately.
    Directory,
    /// A regular file with primary content.
    File,
    /// An alternate data stream of a file or directory.
    Stream,
    /// A path named on the command line that does not exist.
    NotFound,
}

/// One item to archive.
///
/// For a [`EntryKind::Stream`] the last component of `path` is
/// `owner:stream` for a file-owned stream and `:stream` for a
/// directory-owned one (see [`crate::ntfs::stream_path`]).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeEntry {
    /// What the entry is.
    pub kind: EntryKind,
    /// Path used to open the entry.
    pub path: PathBuf,
    /// Exact content length in bytes (0 for directories).
    pub size: u64,
    /// Windows attribute bitmask, meaningful for files.
    pub attributes: u32,
    /// Last write time, meaningful for files.
    pub last_write_time: Timestamp,
}

impl TreeEntry {
    /// Creates a directory entry.
    pub fn directory(path: impl Into<PathBuf>) -> Self {
        Self::with_kind(EntryKind::Directory, path, 0)
    }

    /// Creates a file entry with default attributes and time.
    pub fn file(path: impl Into<PathBuf>, size: u64) -> Self {
        Self::with_kind(EntryKind::File, path, size)
    }

    /// Creates a stream entry.
    pub fn stream(path: impl Into<PathBuf>, size: u64) -> Self {
        Self::with_kind(EntryKind::Stream, path, size)
    }

    /// Creates a not-found entry.
    pub fn not_found(path: impl Into<PathBuf>) -> Self {
        Self::with_kind(EntryKind::NotFound, path, 0)
    }

    fn with_kind(kind: EntryKind, path: impl Into<PathBuf>, size: u64) -> Self {
        Self {
            kind,
            path: path.into(),
            size,
            attributes: 0,
            last_write_time: Timestamp::default(),
        }
    }

    /// Sets attributes and last write time.
    pub fn with_metadata(mut self, attributes: u32, last_write_time: Timestamp) -> Self {
        self.attributes = attributes;
        self.last_write_time = last_write_time;
        self
    }

    /// The last path component, which is what gets recorded in the archive.
    ///
    /// Returns `None` for paths without a final component (such as `..` or a
    /// root) and for names that are not valid UTF-8.
    pub fn name(&self) -> Option<&str> {
        self.path.file_name().and_then(|n| n.to_str())
    }

    /// Returns `true` for streams.
    pub fn is_stream(&self) -> bool {
        self.kind == EntryKind::Stream
    }
}
