//! Stream archive format constants and record definitions.
//!
//! An archive is the 4-byte signature [`MAGIC`] followed by a sequence of
//! records. Each record starts with a one-byte [`Opcode`]; multi-byte fields
//! are little-endian and names are a `u16` byte length followed by UTF-8
//! bytes with no terminator.
//!
//! | Opcode | Fields |
//! |--------|--------|
//! | `D` begin directory | name |
//! | `F` begin file | size `u64`, attributes `u32`, last write time `u64`, name, then `size` content bytes |
//! | `S` begin stream | size `u64`, name, then `size` content bytes |
//! | `f` end file | |
//! | `d` end directory | |
//! | `a` end archive | |
//!
//! Records nest: a directory holds its own streams followed by its children
//! until the matching end marker, and a file's streams follow its content
//! until its end marker. Only the last path component is ever recorded.

pub mod reader;

use crate::write::ArchiveWriter;
use crate::{Error, Result, Timestamp};

/// The archive signature.
pub const MAGIC: &[u8; 4] = b"star";

/// Largest name a record can carry.
pub const MAX_NAME_LEN: usize = u16::MAX as usize;

/// Record tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Opcode {
    /// Opens a directory level.
    BeginDir = b'D',
    /// Opens a file level; content follows the header.
    BeginFile = b'F',
    /// A stream; content follows the header.
    BeginStream = b'S',
    /// Closes a file level.
    EndFile = b'f',
    /// Closes a directory level.
    EndDir = b'd',
    /// Closes the top level.
    EndArchive = b'a',
}

impl Opcode {
    /// Decodes a tag byte.
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            b'D' => Some(Self::BeginDir),
            b'F' => Some(Self::BeginFile),
            b'S' => Some(Self::BeginStream),
            b'f' => Some(Self::EndFile),
            b'd' => Some(Self::EndDir),
            b'a' => Some(Self::EndArchive),
            _ => None,
        }
    }

    /// The tag byte.
    #[inline]
    pub const fn as_byte(self) -> u8 {
        self as u8
    }

    /// Returns `true` for the three end markers.
    pub fn is_terminator(self) -> bool {
        matches!(self, Self::EndFile | Self::EndDir | Self::EndArchive)
    }
}

/// One archive record header, without content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Record {
    /// A directory.
    BeginDir {
        /// Directory name.
        name: String,
    },
    /// A file; `size` content bytes follow.
    BeginFile {
        /// Content length.
        size: u64,
        /// Windows attribute bitmask.
        attributes: u32,
        /// Last write time.
        last_write_time: Timestamp,
        /// File name.
        name: String,
    },
    /// A stream; `size` content bytes follow.
    BeginStream {
        /// Content length.
        size: u64,
        /// `owner:stream` or `:stream`.
        name: String,
    },
    /// End of a file's streams.
    EndFile,
    /// End of a directory.
    EndDir,
    /// End of the archive.
    EndArchive,
}

impl Record {
    /// The record's tag.
    pub fn opcode(&self) -> Opcode {
        match self {
            Record::BeginDir { .. } => Opcode::BeginDir,
            Record::BeginFile { .. } => Opcode::BeginFile,
            Record::BeginStream { .. } => Opcode::BeginStream,
            Record::EndFile => Opcode::EndFile,
            Record::EndDir => Opcode::EndDir,
            Record::EndArchive => Opcode::EndArchive,
        }
    }

    /// Content bytes that follow the header.
    pub fn content_size(&self) -> u64 {
        match self {
            Record::BeginFile { size, .. } | Record::BeginStream { size, .. } => *size,
            _ => 0,
        }
    }

    /// Writes the header to `out`.
    pub fn write_to(&self, out: &mut ArchiveWriter) -> Result<()> {
        out.write_value(self.opcode())?;
        match self {
            Record::BeginDir { name } => write_name(out, name),
            Record::BeginFile {
                size,
                attributes,
                last_write_time,
                name,
            } => {
                out.write_value(*size)?;
                out.write_value(*attributes)?;
                out.write_value(last_write_time.as_filetime())?;
                write_name(out, name)
            }
            Record::BeginStream { size, name } => {
                out.write_value(*size)?;
                write_name(out, name)
            }
            Record::EndFile | Record::EndDir | Record::EndArchive => Ok(()),
        }
    }
}

fn write_name(out: &mut ArchiveWriter, name: &str) -> Result<()> {
    let len = u16::try_from(name.len()).map_err(|_| Error::NameTooLong {
        name: name.to_string(),
        len: name.len(),
    })?;
    out.write_value(len)?;
    out.write(name.as_bytes())
}
