//! Error types for stream and archive operations.
//!
//! This module provides the [`Error`] enum which represents every fatal
//! failure of the crate, along with a convenient [`Result<T>`] type alias.
//!
//! Recoverable conditions (a missing item, a destination that already exists,
//! attributes that could not be restored) are not errors: they are reported
//! through [`ArchiveObserver::on_warning`](crate::ArchiveObserver::on_warning)
//! and the operation continues.
//!
//! # Example
//!
//! ```rust
//! use ntfs_streams::Error;
//!
//! fn print_user_message(error: &Error) {
//!     match error {
//!         Error::Io { .. } => println!("{}", error),
//!         e if e.is_format_error() => println!("The file is not a valid stream archive."),
//!         _ => println!("Error: {}", error),
//!     }
//! }
//! ```

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

/// The filesystem action that failed, used to word [`Error::Io`] messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum IoAction {
    /// Creating a file or directory.
    Create,
    /// Opening an existing file or stream.
    Open,
    /// Reading content.
    Read,
    /// Writing content.
    Write,
    /// Deleting a file or stream.
    Delete,
    /// Listing a directory or the streams of an entry.
    List,
}

impl fmt::Display for IoAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let verb = match self {
            Self::Create => "create",
            Self::Open => "open",
            Self::Read => "read",
            Self::Write => "write",
            Self::Delete => "delete",
            Self::List => "list",
        };
        f.write_str(verb)
    }
}

/// The main error type.
///
/// | Category | Variants | Typical Cause |
/// |----------|----------|---------------|
/// | I/O | [`Io`][Self::Io] | File system operations |
/// | Format | [`InvalidFormat`][Self::InvalidFormat], [`UnknownOpcode`][Self::UnknownOpcode], [`CorruptRecord`][Self::CorruptRecord] | Foreign or damaged archive |
/// | Encoding | [`NameTooLong`][Self::NameTooLong] | Entry name does not fit a record |
/// | Arguments | [`InvalidPattern`][Self::InvalidPattern], [`InvalidArgument`][Self::InvalidArgument] | Bad options |
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// A filesystem operation failed on `path`.
    #[error("Failed to {action} '{}': {source}", path.display())]
    Io {
        /// What was being attempted.
        action: IoAction,
        /// The file, directory, stream or archive involved.
        path: PathBuf,
        /// The underlying OS error.
        #[source]
        source: io::Error,
    },

    /// The input does not start with the archive signature.
    #[error("Invalid archive format: {0}")]
    InvalidFormat(String),

    /// A record starts with a byte that is not a known opcode.
    #[error("Unknown opcode {opcode:#04x} at offset {offset:#x}")]
    UnknownOpcode {
        /// The offending byte.
        opcode: u8,
        /// Archive offset of the byte.
        offset: u64,
    },

    /// A record is structurally valid but its contents are not acceptable.
    #[error("Corrupt record at offset {offset:#x}: {reason}")]
    CorruptRecord {
        /// Archive offset of the record's name field.
        offset: u64,
        /// Description of the problem.
        reason: String,
    },

    /// An entry name does not fit the 16-bit length prefix.
    #[error("Name too long ({len} bytes): {name}")]
    NameTooLong {
        /// The name, possibly lossy.
        name: String,
        /// Its UTF-8 length.
        len: usize,
    },

    /// An exclusion mask could not be compiled.
    #[error("Invalid pattern '{pattern}': {reason}")]
    InvalidPattern {
        /// The mask as given.
        pattern: String,
        /// Why it was rejected.
        reason: String,
    },

    /// An option value was rejected.
    #[error("{0}")]
    InvalidArgument(String),
}

impl Error {
    /// Creates an [`Error::Io`] for `path`.
    pub fn io(action: IoAction, path: impl AsRef<Path>, source: io::Error) -> Self {
        Error::Io {
            action,
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    /// Returns `true` if the error means the input is not a well-formed archive.
    pub fn is_format_error(&self) -> bool {
        matches!(
            self,
            Error::InvalidFormat(_) | Error::UnknownOpcode { .. } | Error::CorruptRecord { .. }
        )
    }

    /// Returns the path involved in an I/O error.
    pub fn path(&self) -> Option<&Path> {
        match self {
            Error::Io { path, .. } => Some(path),
            _ => None,
        }
    }

    /// Returns the raw OS error code of an I/O error, when there is one.
    pub fn raw_os_error(&self) -> Option<i32> {
        match self {
            Error::Io { source, .. } => source.raw_os_error(),
            _ => None,
        }
    }
}

/// A specialized Result type for this crate.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_error_message() {
        let err = Error::io(
            IoAction::Open,
            "dir/a.txt:meta",
            io::Error::new(io::ErrorKind::NotFound, "file not found"),
        );
        assert_eq!(
            err.to_string(),
            "Failed to open 'dir/a.txt:meta': file not found"
        );
        assert_eq!(err.path(), Some(Path::new("dir/a.txt:meta")));
        assert!(!err.is_format_error());
    }

    #[test]
    fn test_io_error_source_is_kept() {
        use std::error::Error as _;
        let err = Error::io(
            IoAction::Write,
            "out.star",
            io::Error::new(io::ErrorKind::WriteZero, "short write"),
        );
        assert!(err.source().is_some());
    }

    #[test]
    fn test_raw_os_error() {
        let err = Error::io(IoAction::Create, "x", io::Error::from_raw_os_error(2));
        assert_eq!(err.raw_os_error(), Some(2));
        assert_eq!(Error::InvalidArgument("x".into()).raw_os_error(), None);
    }

    #[test]
    fn test_unknown_opcode() {
        let err = Error::UnknownOpcode {
            opcode: 0x7a,
            offset: 0x10,
        };
        assert!(err.to_string().contains("0x7a"));
        assert!(err.to_string().contains("0x10"));
        assert!(err.is_format_error());
    }

    #[test]
    fn test_invalid_format() {
        let err = Error::InvalidFormat("missing signature".into());
        assert_eq!(err.to_string(), "Invalid archive format: missing signature");
        assert!(err.is_format_error());
    }

    #[test]
    fn test_corrupt_record() {
        let err = Error::CorruptRecord {
            offset: 0x1234,
            reason: "name is not valid UTF-8".into(),
        };
        assert!(err.to_string().contains("0x1234"));
        assert!(err.to_string().contains("UTF-8"));
        assert!(err.path().is_none());
    }

    #[test]
    fn test_io_action_display() {
        assert_eq!(IoAction::Create.to_string(), "create");
        assert_eq!(IoAction::Delete.to_string(), "delete");
        assert_eq!(IoAction::List.to_string(), "list");
    }
}
