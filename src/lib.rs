//! # ntfs-streams
//!
//! Tools for NTFS alternate data streams: listing, copying, deleting, and
//! archiving whole directory trees together with every stream attached to
//! their files and directories.
//!
//! The archive engine writes a small self-describing format (see
//! [`format`]): a `star` signature followed by nested begin/end records for
//! directories, files and streams. Everything is streamed; nothing is
//! buffered beyond a 64 KiB copy chunk.
//!
//! ## Quick Start
//!
//! ### Creating an Archive
//!
//! ```rust,no_run
//! use ntfs_streams::{ArchiveEncoder, ArchiveWriter, NoProgress, NtfsSource, Result, Selection};
//!
//! fn main() -> Result<()> {
//!     let source = NtfsSource::new();
//!     let mut writer = ArchiveWriter::create("backup.star");
//!
//!     let summary = ArchiveEncoder::new(&source)
//!         .encode(&Selection::items(".", ["docs", "notes.txt"]), &mut writer, NoProgress)?;
//!     let size = writer.finish()?;
//!
//!     println!("{} files, {} streams, {} bytes", summary.files, summary.streams, size);
//!     Ok(())
//! }
//! ```
//!
//! ### Extracting an Archive
//!
//! ```rust,no_run
//! use ntfs_streams::{ArchiveReader, ExtractOptions, NoProgress, OverwritePolicy, Result};
//!
//! fn main() -> Result<()> {
//!     let options = ExtractOptions::new().overwrite(OverwritePolicy::Overwrite);
//!     let summary = ArchiveReader::open("backup.star")?.extract("restored", &options, NoProgress)?;
//!     println!("{} warnings", summary.warnings);
//!     Ok(())
//! }
//! ```
//!
//! ### Encoding an In-Memory Tree
//!
//! ```rust
//! use ntfs_streams::{
//!     ArchiveEncoder, ArchiveReader, ArchiveWriter, ExtractOptions, MemoryTree, NoProgress,
//!     Selection,
//! };
//!
//! let tree = MemoryTree::new()
//!     .dir("proj")
//!     .file("proj/a.txt", b"hi")
//!     .stream("proj/a.txt", "meta", b"x");
//!
//! let mut writer = ArchiveWriter::memory();
//! ArchiveEncoder::new(&tree).encode(&Selection::children(""), &mut writer, NoProgress)?;
//! let bytes = writer.into_bytes().unwrap_or_default();
//!
//! let summary = ArchiveReader::new(bytes.as_slice(), "memory")?
//!     .extract("", &ExtractOptions::new().test(true), NoProgress)?;
//! assert_eq!(summary.files, 1);
//! assert_eq!(summary.streams, 1);
//! # Ok::<(), ntfs_streams::Error>(())
//! ```
//!
//! ## Error Handling
//!
//! Conditions that only affect one entry (a missing item, a locked file, an
//! existing destination) are reported as [`Warning`]s through an
//! [`ArchiveObserver`] and the operation goes on. Anything else is an
//! [`Error`] and stops it.
//!
//! ## Platform Support
//!
//! | Platform | Status |
//! |----------|--------|
//! | Windows (NTFS) | Full support |
//! | Other | Archives files and directories; no streams are discovered |
//!
//! ## Minimum Supported Rust Version (MSRV)
//!
//! This crate requires **Rust 1.85** or later.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(missing_docs)]
#![warn(rust_2018_idioms)]
#![deny(unsafe_op_in_unsafe_fn)]

/// Size of one content copy chunk (64 KiB).
pub const CHUNK_SIZE: usize = 64 * 1024;

pub mod entry;
pub mod error;
pub mod exclude;
pub mod format;
pub mod listing;
pub mod ntfs;
pub mod ops;
pub mod progress;
pub mod read;
pub mod source;
pub mod text;
pub mod timestamp;
pub mod write;

pub use entry::{EntryKind, TreeEntry};
pub use error::{Error, IoAction, Result};
pub use exclude::ExcludeSet;
pub use timestamp::Timestamp;

// Re-export the archive engines at crate root for convenience
pub use read::{ArchiveReader, ExtractOptions, ExtractSummary, OverwritePolicy};
pub use write::{ArchiveEncoder, ArchiveWriter, EncodeOptions, EncodeSummary, Selection};

// Re-export enumeration sources
pub use source::{EntryIter, MemoryTree, NtfsSource, TreeSource};

// Re-export progress API
pub use progress::{ArchiveObserver, NoProgress, Warning};

// Re-export NTFS alternate data streams API
pub use ntfs::{AltStream, STREAM_MARKER, discover_alt_streams, is_stream_path};

pub use listing::{DirectoryListing, ListedItem, list_directory};
