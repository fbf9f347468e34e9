//! Directory listings with alternate streams.
//!
//! [`list_directory`] reads one directory level: the directory's own
//! streams, then each child with its size, last write time and streams.
//! Children are sorted by name.

use std::io;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::ntfs::{AltStream, discover_alt_streams};
use crate::{Error, IoAction, Result, Timestamp};

/// One child of a listed directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListedItem {
    /// Full path of the child.
    pub path: PathBuf,
    /// File name of the child.
    pub name: String,
    /// Whether the child is a directory.
    pub is_dir: bool,
    /// Size of the default stream; zero for directories.
    pub size: u64,
    /// Last write time, when the platform reports one.
    pub modified: Option<Timestamp>,
    /// Named streams of the child.
    pub streams: Vec<AltStream>,
}

/// The result of [`list_directory`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryListing {
    /// The directory that was listed.
    pub dir: PathBuf,
    /// Streams attached to the directory itself.
    pub streams: Vec<AltStream>,
    /// Children in name order.
    pub items: Vec<ListedItem>,
}

impl DirectoryListing {
    /// Children that carry at least one stream.
    pub fn items_with_streams(&self) -> impl Iterator<Item = &ListedItem> {
        self.items.iter().filter(|item| !item.streams.is_empty())
    }

    /// Total number of streams in the listing.
    pub fn stream_count(&self) -> usize {
        self.streams.len() + self.items.iter().map(|i| i.streams.len()).sum::<usize>()
    }
}

/// Lists `dir` and the streams of its children.
///
/// A child whose streams cannot be enumerated is listed without streams.
///
/// # Example
///
/// ```rust,no_run
/// use ntfs_streams::list_directory;
///
/// let listing = list_directory(".")?;
/// for item in listing.items_with_streams() {
///     for stream in &item.streams {
///         println!("{}:{} ({} bytes)", item.name, stream.name, stream.size);
///     }
/// }
/// # Ok::<(), ntfs_streams::Error>(())
/// ```
pub fn list_directory(dir: impl AsRef<Path>) -> Result<DirectoryListing> {
    let dir = dir.as_ref();
    let streams = discover_alt_streams(dir).map_err(|e| Error::io(IoAction::List, dir, e))?;

    let mut items = Vec::new();
    for item in WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
    {
        let item = item.map_err(|e| {
            let path = e.path().unwrap_or(dir).to_path_buf();
            Error::io(IoAction::List, path, io::Error::from(e))
        })?;
        let metadata = item
            .metadata()
            .map_err(|e| Error::io(IoAction::List, item.path(), io::Error::from(e)))?;
        let is_dir = metadata.is_dir();
        let streams = discover_alt_streams(item.path()).unwrap_or_else(|e| {
            log::debug!("no streams listed for {}: {}", item.path().display(), e);
            Vec::new()
        });
        items.push(ListedItem {
            name: item.file_name().to_string_lossy().into_owned(),
            path: item.into_path(),
            is_dir,
            size: if is_dir { 0 } else { metadata.len() },
            modified: metadata.modified().ok().and_then(Timestamp::from_system_time),
            streams,
        });
    }

    Ok(DirectoryListing {
        dir: dir.to_path_buf(),
        streams,
        items,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_list_directory_sorted() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("b.txt"), b"bbb").unwrap();
        fs::write(dir.path().join("a.txt"), b"a").unwrap();
        fs::create_dir(dir.path().join("sub")).unwrap();

        let listing = list_directory(dir.path()).unwrap();
        let names: Vec<_> = listing.items.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, ["a.txt", "b.txt", "sub"]);
        assert_eq!(listing.items[1].size, 3);
        assert!(listing.items[2].is_dir);
        assert_eq!(listing.items[2].size, 0);
        assert!(listing.items[0].modified.is_some());
    }

    #[test]
    fn test_list_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let err = list_directory(dir.path().join("missing")).unwrap_err();
        assert!(matches!(err, Error::Io { action: IoAction::List, .. }));
    }

    #[test]
    fn test_stream_count() {
        let listing = DirectoryListing {
            dir: PathBuf::from("d"),
            streams: vec![AltStream {
                name: "meta".into(),
                size: 1,
            }],
            items: vec![ListedItem {
                path: PathBuf::from("d/a"),
                name: "a".into(),
                is_dir: false,
                size: 0,
                modified: None,
                streams: vec![AltStream {
                    name: "x".into(),
                    size: 2,
                }],
            }],
        };
        assert_eq!(listing.stream_count(), 2);
        assert_eq!(listing.items_with_streams().count(), 1);
    }
}
