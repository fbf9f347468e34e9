//! Archive encoding.
//!
//! The encoder pulls entries from a [`TreeSource`] and writes records to an
//! [`ArchiveWriter`]. Nesting is tracked with an explicit stack of frames,
//! one per open directory or file, so tree depth never grows the call stack.
//!
//! # Example
//!
//! ```rust
//! use ntfs_streams::{ArchiveEncoder, ArchiveWriter, MemoryTree, NoProgress, Selection};
//!
//! let tree = MemoryTree::new()
//!     .dir("proj")
//!     .file("proj/a.txt", b"hi")
//!     .stream("proj/a.txt", "meta", b"x");
//!
//! let mut writer = ArchiveWriter::memory();
//! let summary = ArchiveEncoder::new(&tree)
//!     .encode(&Selection::children(""), &mut writer, NoProgress)?;
//! assert_eq!(summary.files, 1);
//! assert_eq!(summary.streams, 1);
//! # Ok::<(), ntfs_streams::Error>(())
//! ```

mod options;
mod sink;

pub use options::{EncodeOptions, parse_part_size, resolve_archive_name};
pub use sink::{ArchiveWriter, WireValue};

use std::io::Read;
use std::path::{Path, PathBuf};

use crate::entry::{EntryKind, TreeEntry};
use crate::format::Record;
use crate::progress::{ArchiveObserver, Warning};
use crate::source::{EntryIter, TreeSource};
use crate::{CHUNK_SIZE, Error, IoAction, Result};

/// What to archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    /// The children of a directory; its own streams become loose top-level
    /// stream records.
    Children(PathBuf),
    /// Explicit paths, each classified on its own. A bare `.` stands for the
    /// children of `base`.
    Items {
        /// Directory that `.` refers to.
        base: PathBuf,
        /// Paths as given.
        items: Vec<PathBuf>,
    },
}

impl Selection {
    /// Archive the children of `base`.
    pub fn children(base: impl Into<PathBuf>) -> Self {
        Selection::Children(base.into())
    }

    /// Archive `items`; with no items this is [`Selection::children`].
    pub fn items<I, P>(base: impl Into<PathBuf>, items: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        let items: Vec<PathBuf> = items.into_iter().map(Into::into).collect();
        if items.is_empty() {
            Selection::Children(base.into())
        } else {
            Selection::Items {
                base: base.into(),
                items,
            }
        }
    }
}

/// Counts from one encoding run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EncodeSummary {
    /// Directory records written.
    pub directories: u64,
    /// File records written.
    pub files: u64,
    /// Stream records written.
    pub streams: u64,
    /// Content bytes written.
    pub content_bytes: u64,
    /// Warnings reported.
    pub warnings: u64,
    /// Total archive size, signature included.
    pub archive_size: u64,
}

/// Encodes trees into the stream archive format.
pub struct ArchiveEncoder<'s, S: TreeSource + ?Sized> {
    source: &'s S,
    options: EncodeOptions,
}

impl<'s, S: TreeSource + ?Sized> ArchiveEncoder<'s, S> {
    /// Creates an encoder reading from `source`.
    pub fn new(source: &'s S) -> Self {
        Self {
            source,
            options: EncodeOptions::default(),
        }
    }

    /// Sets encoding options.
    pub fn options(mut self, options: EncodeOptions) -> Self {
        self.options = options;
        self
    }

    /// Writes `selection` to `writer`, ending with the end-of-archive record.
    ///
    /// The writer is left open; call [`ArchiveWriter::finish`] afterwards.
    pub fn encode<O: ArchiveObserver>(
        &self,
        selection: &Selection,
        writer: &mut ArchiveWriter,
        observer: O,
    ) -> Result<EncodeSummary> {
        let mut run = EncodeRun {
            source: self.source,
            options: &self.options,
            writer,
            observer,
            buf: vec![0u8; CHUNK_SIZE],
            summary: EncodeSummary::default(),
        };
        let root = self.root_entries(selection);
        run.run(root)?;
        Record::EndArchive.write_to(run.writer)?;
        run.summary.archive_size = run.writer.written_total();
        Ok(run.summary)
    }

    fn root_entries<'a>(&'a self, selection: &Selection) -> EntryIter<'a> {
        match selection {
            Selection::Children(base) => self.source.dir_items(base),
            Selection::Items { base, items } => {
                let source = self.source;
                let base = base.clone();
                let items = items.clone();
                Box::new(items.into_iter().flat_map(move |item| -> EntryIter<'a> {
                    if item.as_os_str() == "." {
                        return source.dir_items(&base);
                    }
                    let entry = source.classify(&item);
                    // `..` or a root has no name to record; archive its contents.
                    if entry.kind == EntryKind::Directory && entry.path.file_name().is_none() {
                        source.dir_items(&item)
                    } else {
                        Box::new(std::iter::once(Ok(entry)))
                    }
                }))
            }
        }
    }
}

/// One open level of the output.
struct Frame<'a> {
    entries: EntryIter<'a>,
    depth: usize,
    close: Option<Record>,
}

struct EncodeRun<'a, 'w, S: TreeSource + ?Sized, O> {
    source: &'a S,
    options: &'a EncodeOptions,
    writer: &'w mut ArchiveWriter,
    observer: O,
    buf: Vec<u8>,
    summary: EncodeSummary,
}

impl<'a, S: TreeSource + ?Sized, O: ArchiveObserver> EncodeRun<'a, '_, S, O> {
    fn run(&mut self, root: EntryIter<'a>) -> Result<()> {
        let mut stack = vec![Frame {
            entries: root,
            depth: 0,
            close: None,
        }];

        while let Some(frame) = stack.last_mut() {
            let depth = frame.depth;
            let Some(next) = frame.entries.next() else {
                if let Some(Frame {
                    close: Some(close), ..
                }) = stack.pop()
                {
                    close.write_to(self.writer)?;
                }
                continue;
            };
            if let Some(child) = self.visit(next?, depth)? {
                stack.push(child);
            }
        }
        Ok(())
    }

    /// Writes one entry. Returns the frame to descend into, if any.
    fn visit(&mut self, entry: TreeEntry, depth: usize) -> Result<Option<Frame<'a>>> {
        let Some(name) = entry.name().map(str::to_owned) else {
            let warning = if entry.kind == EntryKind::NotFound {
                Warning::NotFound { path: entry.path }
            } else {
                Warning::InvalidName { path: entry.path }
            };
            self.warn(warning, depth);
            return Ok(None);
        };
        if self.options.exclude.matches(&name) {
            log::debug!("excluded {}", entry.path.display());
            return Ok(None);
        }

        match entry.kind {
            EntryKind::NotFound => {
                self.warn(Warning::NotFound { path: entry.path }, depth);
                Ok(None)
            }
            EntryKind::Directory => {
                self.observer.on_directory(&entry.path, depth);
                Record::BeginDir { name }.write_to(self.writer)?;
                self.summary.directories += 1;
                Ok(Some(Frame {
                    entries: self.source.dir_items(&entry.path),
                    depth: depth + 1,
                    close: Some(Record::EndDir),
                }))
            }
            EntryKind::File => {
                if self.writer.is_self(&entry.path, false) {
                    log::debug!("skipping the archive itself: {}", entry.path.display());
                    return Ok(None);
                }
                let Some(mut content) = self.open(&entry, depth) else {
                    return Ok(None);
                };
                self.observer.on_file(&entry.path, entry.size, depth);
                Record::BeginFile {
                    size: entry.size,
                    attributes: entry.attributes,
                    last_write_time: entry.last_write_time,
                    name,
                }
                .write_to(self.writer)?;
                self.copy_content(&mut content, entry.size, &entry.path)?;
                self.summary.files += 1;
                // A file's streams are listed at the file's own level.
                Ok(Some(Frame {
                    entries: self.source.streams(&entry),
                    depth,
                    close: Some(Record::EndFile),
                }))
            }
            EntryKind::Stream => {
                if self.writer.is_self(&entry.path, true) {
                    log::debug!("skipping the archive itself: {}", entry.path.display());
                    return Ok(None);
                }
                let Some(mut content) = self.open(&entry, depth) else {
                    return Ok(None);
                };
                self.observer.on_stream(&entry.path, entry.size, depth);
                Record::BeginStream {
                    size: entry.size,
                    name,
                }
                .write_to(self.writer)?;
                self.copy_content(&mut content, entry.size, &entry.path)?;
                self.summary.streams += 1;
                Ok(None)
            }
        }
    }

    fn open(&mut self, entry: &TreeEntry, depth: usize) -> Option<Box<dyn Read + 'a>> {
        match self.source.open(entry) {
            Ok(content) => Some(content),
            Err(source) => {
                self.warn(
                    Warning::OpenFailed {
                        path: entry.path.clone(),
                        source,
                    },
                    depth,
                );
                None
            }
        }
    }

    /// Copies exactly `size` bytes; running short is fatal.
    fn copy_content(&mut self, content: &mut dyn Read, size: u64, path: &Path) -> Result<()> {
        let mut remaining = size;
        while remaining > 0 {
            let n = remaining.min(self.buf.len() as u64) as usize;
            content
                .read_exact(&mut self.buf[..n])
                .map_err(|e| Error::io(IoAction::Read, path, e))?;
            self.writer.write(&self.buf[..n])?;
            remaining -= n as u64;
        }
        self.summary.content_bytes += size;
        Ok(())
    }

    fn warn(&mut self, warning: Warning, depth: usize) {
        log::debug!("{}: {}", warning.path().display(), warning);
        self.summary.warnings += 1;
        self.observer.on_warning(&warning, depth);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MemoryTree;
    use crate::format::MAGIC;
    use crate::progress::NoProgress;

    fn encode(tree: &MemoryTree, selection: &Selection, options: EncodeOptions) -> Vec<u8> {
        let mut writer = ArchiveWriter::memory();
        ArchiveEncoder::new(tree)
            .options(options)
            .encode(selection, &mut writer, NoProgress)
            .unwrap();
        writer.into_bytes().unwrap()
    }

    fn name(bytes: &mut Vec<u8>, name: &str) {
        bytes.extend_from_slice(&(name.len() as u16).to_le_bytes());
        bytes.extend_from_slice(name.as_bytes());
    }

    #[test]
    fn test_empty_tree() {
        let bytes = encode(&MemoryTree::new(), &Selection::children(""), EncodeOptions::new());
        assert_eq!(bytes, b"stara");
    }

    #[test]
    fn test_directory_with_file_and_stream() {
        let tree = MemoryTree::new()
            .dir("proj")
            .file("proj/a.txt", b"hi")
            .stream("proj/a.txt", "meta", b"x");
        let bytes = encode(&tree, &Selection::items("", ["proj"]), EncodeOptions::new());

        let mut expected = MAGIC.to_vec();
        expected.push(b'D');
        name(&mut expected, "proj");
        expected.push(b'F');
        expected.extend_from_slice(&2u64.to_le_bytes());
        expected.extend_from_slice(&crate::ntfs::FILE_ATTRIBUTE_ARCHIVE.to_le_bytes());
        expected.extend_from_slice(&0u64.to_le_bytes());
        name(&mut expected, "a.txt");
        expected.extend_from_slice(b"hi");
        expected.push(b'S');
        expected.extend_from_slice(&1u64.to_le_bytes());
        name(&mut expected, "a.txt:meta");
        expected.extend_from_slice(b"x");
        expected.extend_from_slice(b"fda");
        assert_eq!(bytes, expected);
    }

    #[test]
    fn test_root_streams_are_loose() {
        let tree = MemoryTree::new().stream("", "tag", b"t");
        let bytes = encode(&tree, &Selection::children(""), EncodeOptions::new());

        let mut expected = MAGIC.to_vec();
        expected.push(b'S');
        expected.extend_from_slice(&1u64.to_le_bytes());
        name(&mut expected, ":tag");
        expected.extend_from_slice(b"ta");
        assert_eq!(bytes, expected);
    }

    #[test]
    fn test_dot_expands_to_base_children() {
        let tree = MemoryTree::new().file("a", b"1").file("b", b"2");
        let dot = encode(&tree, &Selection::items("", ["."]), EncodeOptions::new());
        let all = encode(&tree, &Selection::children(""), EncodeOptions::new());
        assert_eq!(dot, all);
    }

    #[test]
    fn test_exclude_prunes_directory() {
        let tree = MemoryTree::new()
            .file("build/out.bin", b"zzz")
            .file("keep.txt", b"k");
        let options = EncodeOptions::new().exclude(crate::ExcludeSet::parse("BUILD").unwrap());

        let mut writer = ArchiveWriter::memory();
        let summary = ArchiveEncoder::new(&tree)
            .options(options)
            .encode(&Selection::children(""), &mut writer, NoProgress)
            .unwrap();
        assert_eq!(summary.directories, 0);
        assert_eq!(summary.files, 1);
    }

    #[test]
    fn test_not_found_is_a_warning() {
        let tree = MemoryTree::new().file("a", b"1");
        let mut writer = ArchiveWriter::memory();
        let summary = ArchiveEncoder::new(&tree)
            .encode(&Selection::items("", ["missing", "a"]), &mut writer, NoProgress)
            .unwrap();
        assert_eq!(summary.warnings, 1);
        assert_eq!(summary.files, 1);
    }

    #[test]
    fn test_unreadable_file_is_skipped() {
        let tree = MemoryTree::new()
            .file("locked", b"secret")
            .stream("locked", "s", b"x")
            .unreadable("locked");
        let mut writer = ArchiveWriter::memory();
        let summary = ArchiveEncoder::new(&tree)
            .encode(&Selection::children(""), &mut writer, NoProgress)
            .unwrap();
        assert_eq!(summary.warnings, 1);
        assert_eq!(summary.streams, 0);
        assert_eq!(writer.into_bytes().unwrap(), b"stara");
    }

    #[test]
    fn test_dry_run_total_matches_memory() {
        let tree = MemoryTree::new()
            .dir("d")
            .file("d/x", &[7u8; 100_000])
            .stream("d", "s", b"abc");
        let mut dry = ArchiveWriter::dry_run();
        let summary = ArchiveEncoder::new(&tree)
            .encode(&Selection::children(""), &mut dry, NoProgress)
            .unwrap();
        let bytes = encode(&tree, &Selection::children(""), EncodeOptions::new());
        assert_eq!(summary.archive_size, bytes.len() as u64);
        assert_eq!(summary.content_bytes, 100_003);
    }

    #[test]
    fn test_short_source_is_fatal() {
        struct Shrunk(MemoryTree);

        impl TreeSource for Shrunk {
            fn dir_items<'a>(&'a self, dir: &Path) -> EntryIter<'a> {
                Box::new(self.0.dir_items(dir).map(|e| {
                    e.map(|mut e| {
                        e.size += 10;
                        e
                    })
                }))
            }
            fn streams<'a>(&'a self, owner: &TreeEntry) -> EntryIter<'a> {
                self.0.streams(owner)
            }
            fn classify(&self, path: &Path) -> TreeEntry {
                self.0.classify(path)
            }
            fn open<'a>(&'a self, entry: &TreeEntry) -> std::io::Result<Box<dyn Read + 'a>> {
                self.0.open(entry)
            }
        }

        let source = Shrunk(MemoryTree::new().file("a", b"abc"));
        let mut writer = ArchiveWriter::memory();
        let err = ArchiveEncoder::new(&source)
            .encode(&Selection::children(""), &mut writer, NoProgress)
            .unwrap_err();
        assert!(matches!(err, Error::Io { action: IoAction::Read, .. }));
    }
}
