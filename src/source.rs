//! Directory and stream enumeration.
//!
//! The encoder never touches the filesystem directly; it pulls
//! [`TreeEntry`] values from a [`TreeSource`] one at a time and opens
//! content through it. [`NtfsSource`] walks the live filesystem and
//! [`MemoryTree`] serves an in-memory tree.

use std::collections::HashMap;
use std::fs::{self, File};
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::entry::{EntryKind, TreeEntry};
use crate::ntfs::{self, discover_alt_streams, file_attributes, stream_open_path, stream_path};
use crate::{Error, IoAction, Result, Timestamp};

/// A lazily produced sequence of entries.
pub type EntryIter<'a> = Box<dyn Iterator<Item = Result<TreeEntry>> + 'a>;

/// Produces the entries the encoder archives.
pub trait TreeSource {
    /// The directory's own streams, followed by its immediate children in
    /// native order. File streams are not included; see [`Self::streams`].
    fn dir_items<'a>(&'a self, dir: &Path) -> EntryIter<'a>;

    /// The streams of a file or directory entry.
    fn streams<'a>(&'a self, owner: &TreeEntry) -> EntryIter<'a>;

    /// Classifies a path named explicitly: directory, stream, file, or
    /// not found.
    fn classify(&self, path: &Path) -> TreeEntry;

    /// Opens an entry's content for reading.
    fn open<'a>(&'a self, entry: &TreeEntry) -> io::Result<Box<dyn Read + 'a>>;
}

/// Enumerates the live filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct NtfsSource;

impl NtfsSource {
    /// Creates a filesystem source.
    pub fn new() -> Self {
        Self
    }

    fn stream_entries(owner: &Path, owner_is_dir: bool) -> Vec<Result<TreeEntry>> {
        match discover_alt_streams(owner) {
            Ok(streams) => streams
                .into_iter()
                .map(|s| Ok(TreeEntry::stream(s.path_on(owner, owner_is_dir), s.size)))
                .collect(),
            Err(e) => {
                log::debug!("no streams listed for {}: {}", owner.display(), e);
                Vec::new()
            }
        }
    }
}

fn file_entry(path: PathBuf, metadata: &fs::Metadata) -> TreeEntry {
    let attributes = file_attributes(&path, metadata);
    let last_write_time = metadata
        .modified()
        .ok()
        .and_then(Timestamp::from_system_time)
        .unwrap_or_default();
    TreeEntry::file(path, metadata.len()).with_metadata(attributes, last_write_time)
}

impl TreeSource for NtfsSource {
    fn dir_items<'a>(&'a self, dir: &Path) -> EntryIter<'a> {
        let own_streams = Self::stream_entries(dir, true);
        let listed = dir.to_path_buf();
        let children = WalkDir::new(dir)
            .min_depth(1)
            .max_depth(1)
            .into_iter()
            .filter_map(move |item| {
                let item = match item {
                    Ok(item) => item,
                    Err(e) => {
                        let path = e.path().unwrap_or(listed.as_path()).to_path_buf();
                        return Some(Err(Error::io(IoAction::List, path, io::Error::from(e))));
                    }
                };
                let file_type = item.file_type();
                if file_type.is_dir() {
                    Some(Ok(TreeEntry::directory(item.into_path())))
                } else if file_type.is_file() {
                    match item.metadata() {
                        Ok(metadata) => Some(Ok(file_entry(item.into_path(), &metadata))),
                        Err(e) => Some(Err(Error::io(
                            IoAction::List,
                            item.path(),
                            io::Error::from(e),
                        ))),
                    }
                } else {
                    log::debug!("skipping {}", item.path().display());
                    None
                }
            });
        Box::new(own_streams.into_iter().chain(children))
    }

    fn streams<'a>(&'a self, owner: &TreeEntry) -> EntryIter<'a> {
        let owner_is_dir = owner.kind == EntryKind::Directory;
        Box::new(Self::stream_entries(&owner.path, owner_is_dir).into_iter())
    }

    fn classify(&self, path: &Path) -> TreeEntry {
        let metadata = match fs::metadata(path) {
            Ok(metadata) => metadata,
            Err(e) => {
                log::debug!("{}: {}", path.display(), e);
                return TreeEntry::not_found(path);
            }
        };
        if metadata.is_dir() {
            TreeEntry::directory(path)
        } else if cfg!(windows) && ntfs::is_stream_path(path) {
            TreeEntry::stream(path, metadata.len())
        } else {
            file_entry(path.to_path_buf(), &metadata)
        }
    }

    fn open<'a>(&'a self, entry: &TreeEntry) -> io::Result<Box<dyn Read + 'a>> {
        let path = match entry.kind {
            EntryKind::Stream => stream_open_path(&entry.path),
            _ => entry.path.clone(),
        };
        Ok(Box::new(File::open(path)?))
    }
}

#[derive(Debug, Clone)]
struct MemoryNode {
    entry: TreeEntry,
    content: Vec<u8>,
    children: Vec<usize>,
    streams: Vec<usize>,
    unreadable: bool,
}

/// An in-memory tree of directories, files and streams.
///
/// The root directory has the empty path; everything else is addressed by
/// `/`-joined relative paths. Children are listed in insertion order.
///
/// # Example
///
/// ```
/// use ntfs_streams::MemoryTree;
///
/// let tree = MemoryTree::new()
///     .dir("proj")
///     .file("proj/a.txt", b"hi")
///     .stream("proj/a.txt", "meta", b"x");
/// ```
#[derive(Debug, Clone)]
pub struct MemoryTree {
    nodes: Vec<MemoryNode>,
    index: HashMap<PathBuf, usize>,
}

impl Default for MemoryTree {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryTree {
    /// Creates a tree holding only the empty root directory.
    pub fn new() -> Self {
        let root = MemoryNode {
            entry: TreeEntry::directory(""),
            content: Vec::new(),
            children: Vec::new(),
            streams: Vec::new(),
            unreadable: false,
        };
        let mut index = HashMap::new();
        index.insert(PathBuf::new(), 0);
        Self {
            nodes: vec![root],
            index,
        }
    }

    /// Adds a directory, creating missing parents.
    pub fn dir(mut self, path: impl AsRef<Path>) -> Self {
        self.ensure_dir(path.as_ref());
        self
    }

    /// Adds a file with default metadata, creating missing parents.
    pub fn file(self, path: impl AsRef<Path>, content: &[u8]) -> Self {
        self.file_with_metadata(path, content, ntfs::FILE_ATTRIBUTE_ARCHIVE, Timestamp::default())
    }

    /// Adds a file with the given attributes and last write time.
    pub fn file_with_metadata(
        mut self,
        path: impl AsRef<Path>,
        content: &[u8],
        attributes: u32,
        last_write_time: Timestamp,
    ) -> Self {
        let path = path.as_ref();
        let parent = self.ensure_dir(path.parent().unwrap_or(Path::new("")));
        let entry = TreeEntry::file(path, content.len() as u64)
            .with_metadata(attributes, last_write_time);
        let id = self.push(entry, content);
        self.nodes[parent].children.push(id);
        self
    }

    /// Adds a stream to an existing file or directory (`""` is the root).
    ///
    /// # Panics
    ///
    /// Panics if `owner` has not been added.
    pub fn stream(mut self, owner: impl AsRef<Path>, name: &str, content: &[u8]) -> Self {
        let owner = owner.as_ref();
        let Some(&owner_id) = self.index.get(owner) else {
            panic!("stream owner {} is not in the tree", owner.display());
        };
        let owner_is_dir = self.nodes[owner_id].entry.kind == EntryKind::Directory;
        let path = stream_path(owner, owner_is_dir, name);
        let id = self.push(TreeEntry::stream(path, content.len() as u64), content);
        self.nodes[owner_id].streams.push(id);
        self
    }

    /// Makes an entry fail to open, as a locked file would.
    ///
    /// # Panics
    ///
    /// Panics if `path` has not been added.
    pub fn unreadable(mut self, path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        let Some(&id) = self.index.get(path) else {
            panic!("{} is not in the tree", path.display());
        };
        self.nodes[id].unreadable = true;
        self
    }

    /// Looks up an entry by path.
    pub fn get(&self, path: impl AsRef<Path>) -> Option<&TreeEntry> {
        self.index.get(path.as_ref()).map(|&id| &self.nodes[id].entry)
    }

    /// Content of a file or stream.
    pub fn content(&self, path: impl AsRef<Path>) -> Option<&[u8]> {
        self.index
            .get(path.as_ref())
            .map(|&id| self.nodes[id].content.as_slice())
    }

    fn push(&mut self, entry: TreeEntry, content: &[u8]) -> usize {
        let id = self.nodes.len();
        self.index.insert(entry.path.clone(), id);
        self.nodes.push(MemoryNode {
            entry,
            content: content.to_vec(),
            children: Vec::new(),
            streams: Vec::new(),
            unreadable: false,
        });
        id
    }

    fn ensure_dir(&mut self, path: &Path) -> usize {
        if let Some(&id) = self.index.get(path) {
            return id;
        }
        let parent = self.ensure_dir(path.parent().unwrap_or(Path::new("")));
        let id = self.push(TreeEntry::directory(path), &[]);
        self.nodes[parent].children.push(id);
        id
    }

    fn entries<'a>(&'a self, ids: impl Iterator<Item = usize> + 'a) -> EntryIter<'a> {
        Box::new(ids.map(move |id| Ok(self.nodes[id].entry.clone())))
    }
}

impl TreeSource for MemoryTree {
    fn dir_items<'a>(&'a self, dir: &Path) -> EntryIter<'a> {
        match self.index.get(dir) {
            Some(&id) => {
                let node = &self.nodes[id];
                let ids = node.streams.iter().chain(node.children.iter()).copied();
                self.entries(ids)
            }
            None => Box::new(std::iter::once(Err(Error::io(
                IoAction::List,
                dir,
                io::Error::from(io::ErrorKind::NotFound),
            )))),
        }
    }

    fn streams<'a>(&'a self, owner: &TreeEntry) -> EntryIter<'a> {
        match self.index.get(&owner.path) {
            Some(&id) => self.entries(self.nodes[id].streams.iter().copied()),
            None => Box::new(std::iter::empty()),
        }
    }

    fn classify(&self, path: &Path) -> TreeEntry {
        self.get(path)
            .cloned()
            .unwrap_or_else(|| TreeEntry::not_found(path))
    }

    fn open<'a>(&'a self, entry: &TreeEntry) -> io::Result<Box<dyn Read + 'a>> {
        let node = self
            .index
            .get(&entry.path)
            .map(|&id| &self.nodes[id])
            .ok_or_else(|| io::Error::from(io::ErrorKind::NotFound))?;
        if node.unreadable {
            return Err(io::Error::new(
                io::ErrorKind::PermissionDenied,
                "entry is locked",
            ));
        }
        Ok(Box::new(node.content.as_slice()))
    }
}
