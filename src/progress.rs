//! Progress callbacks for archive operations.
//!
//! Both the encoder and the extractor report every record they handle to an
//! [`ArchiveObserver`], so a front end can render a listing without being
//! coupled to the traversal. `depth` is the nesting level of the event:
//! top-level entries are at depth 0, a directory's children at depth 1, and
//! so on. A stream belonging to a file is reported at the file's own depth.
//!
//! # Example
//!
//! ```rust
//! use std::path::Path;
//! use ntfs_streams::progress::{ArchiveObserver, Warning};
//!
//! #[derive(Default)]
//! struct Counter {
//!     files: usize,
//!     warnings: usize,
//! }
//!
//! impl ArchiveObserver for Counter {
//!     fn on_file(&mut self, _path: &Path, _size: u64, _depth: usize) {
//!         self.files += 1;
//!     }
//!
//!     fn on_warning(&mut self, _warning: &Warning, _depth: usize) {
//!         self.warnings += 1;
//!     }
//! }
//! ```

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

/// IEC byte unit: 1 KiB = 1024 bytes.
pub const BYTES_KIB: u64 = 1024;
/// IEC byte unit: 1 MiB = 1024 KiB.
pub const BYTES_MIB: u64 = 1024 * BYTES_KIB;
/// IEC byte unit: 1 GiB = 1024 MiB.
pub const BYTES_GIB: u64 = 1024 * BYTES_MIB;

/// A recoverable condition. The operation skips the affected entry and goes on.
#[derive(Debug)]
#[non_exhaustive]
pub enum Warning {
    /// An item named explicitly does not exist.
    NotFound {
        /// The missing path.
        path: PathBuf,
    },
    /// A source file or stream could not be opened for archiving.
    OpenFailed {
        /// The source path.
        path: PathBuf,
        /// The OS error.
        source: io::Error,
    },
    /// The destination exists and overwriting was not requested.
    AlreadyExists {
        /// The destination path.
        path: PathBuf,
    },
    /// The destination could not be created; its content was skipped.
    CreateFailed {
        /// The destination path.
        path: PathBuf,
        /// The OS error.
        source: io::Error,
    },
    /// The item's name is not valid UTF-8 and cannot be recorded.
    InvalidName {
        /// The source path.
        path: PathBuf,
    },
    /// Attributes or last write time could not be applied after extraction.
    AttributesNotRestored {
        /// The extracted file.
        path: PathBuf,
        /// The OS error.
        source: io::Error,
    },
}

impl Warning {
    /// The path the warning is about.
    pub fn path(&self) -> &Path {
        match self {
            Warning::NotFound { path }
            | Warning::OpenFailed { path, .. }
            | Warning::AlreadyExists { path }
            | Warning::CreateFailed { path, .. }
            | Warning::InvalidName { path }
            | Warning::AttributesNotRestored { path, .. } => path,
        }
    }
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Warning::NotFound { .. } => write!(f, "*** not found ***"),
            Warning::OpenFailed { source, .. } => write!(f, "*** cannot open: {} ***", source),
            Warning::AlreadyExists { .. } => write!(f, "*** already exists ***"),
            Warning::CreateFailed { source, .. } => {
                write!(f, "*** cannot create: {} ***", source)
            }
            Warning::InvalidName { .. } => write!(f, "*** name is not valid UTF-8 ***"),
            Warning::AttributesNotRestored { source, .. } => {
                write!(f, "*** attributes not restored: {} ***", source)
            }
        }
    }
}

/// Receives events from the encoder and the extractor.
///
/// All methods have empty default implementations.
pub trait ArchiveObserver {
    /// Called when a directory record is written or read.
    fn on_directory(&mut self, path: &Path, depth: usize) {
        let _ = (path, depth);
    }

    /// Called when a file record is written or read, before its content.
    fn on_file(&mut self, path: &Path, size: u64, depth: usize) {
        let _ = (path, size, depth);
    }

    /// Called when a stream record is written or read, before its content.
    fn on_stream(&mut self, path: &Path, size: u64, depth: usize) {
        let _ = (path, size, depth);
    }

    /// Called for every recoverable condition.
    fn on_warning(&mut self, warning: &Warning, depth: usize) {
        let _ = (warning, depth);
    }
}

/// An observer that ignores everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl ArchiveObserver for NoProgress {}

impl ArchiveObserver for () {}

impl<T: ArchiveObserver + ?Sized> ArchiveObserver for &mut T {
    fn on_directory(&mut self, path: &Path, depth: usize) {
        (**self).on_directory(path, depth);
    }

    fn on_file(&mut self, path: &Path, size: u64, depth: usize) {
        (**self).on_file(path, size, depth);
    }

    fn on_stream(&mut self, path: &Path, size: u64, depth: usize) {
        (**self).on_stream(path, size, depth);
    }

    fn on_warning(&mut self, warning: &Warning, depth: usize) {
        (**self).on_warning(warning, depth);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_warning_display() {
        let w = Warning::NotFound {
            path: PathBuf::from("gone.txt"),
        };
        assert_eq!(w.to_string(), "*** not found ***");
        assert_eq!(w.path(), Path::new("gone.txt"));

        let w = Warning::AlreadyExists {
            path: PathBuf::from("out.txt"),
        };
        assert!(w.to_string().contains("already exists"));
    }

    #[test]
    fn test_warning_carries_os_error() {
        let w = Warning::CreateFailed {
            path: PathBuf::from("x"),
            source: io::Error::new(io::ErrorKind::PermissionDenied, "access denied"),
        };
        assert!(w.to_string().contains("access denied"));
    }

    #[test]
    fn test_forwarding_through_mut_ref() {
        #[derive(Default)]
        struct Count(usize);
        impl ArchiveObserver for Count {
            fn on_file(&mut self, _: &Path, _: u64, _: usize) {
                self.0 += 1;
            }
        }

        fn report<O: ArchiveObserver>(mut observer: O) {
            observer.on_file(Path::new("a"), 1, 0);
            observer.on_directory(Path::new("d"), 0);
        }

        let mut count = Count::default();
        report(&mut count);
        assert_eq!(count.0, 1);
    }
}
