//! Low-level record reading.

use std::io::{self, Read};
use std::path::{Path, PathBuf};

use super::{MAGIC, Opcode, Record};
use crate::{Error, IoAction, Result, Timestamp};

/// Reads records and content from an archive.
///
/// Every read is exact; hitting the end of input inside a record is reported
/// as an [`Error::Io`] naming the archive. The reader tracks its byte offset
/// so format errors can point at the offending byte.
pub struct RecordReader<R> {
    inner: R,
    offset: u64,
    label: PathBuf,
}

impl<R: Read> RecordReader<R> {
    /// Wraps `inner`; `label` names the archive in error messages.
    pub fn new(inner: R, label: impl Into<PathBuf>) -> Self {
        Self {
            inner,
            offset: 0,
            label: label.into(),
        }
    }

    /// Bytes consumed so far.
    pub fn offset(&self) -> u64 {
        self.offset
    }

    /// The archive name used in error messages.
    pub fn label(&self) -> &Path {
        &self.label
    }

    /// Reads and checks the signature.
    pub fn read_magic(&mut self) -> Result<()> {
        let mut magic = [0u8; 4];
        match self.inner.read_exact(&mut magic) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => {
                return Err(Error::InvalidFormat(
                    "file is too short to be an archive".into(),
                ));
            }
            Err(e) => return Err(Error::io(IoAction::Read, &self.label, e)),
        }
        self.offset += 4;
        if &magic != MAGIC {
            return Err(Error::InvalidFormat(format!(
                "bad signature {:02x?}",
                magic
            )));
        }
        Ok(())
    }

    /// Reads the next record header.
    pub fn read_record(&mut self) -> Result<Record> {
        let at = self.offset;
        let byte = self.read_u8()?;
        let opcode = Opcode::from_byte(byte).ok_or(Error::UnknownOpcode {
            opcode: byte,
            offset: at,
        })?;
        let record = match opcode {
            Opcode::BeginDir => Record::BeginDir {
                name: self.read_name()?,
            },
            Opcode::BeginFile => {
                let size = self.read_u64_le()?;
                let attributes = self.read_u32_le()?;
                let last_write_time = Timestamp::from_filetime(self.read_u64_le()?);
                let name = self.read_name()?;
                Record::BeginFile {
                    size,
                    attributes,
                    last_write_time,
                    name,
                }
            }
            Opcode::BeginStream => {
                let size = self.read_u64_le()?;
                let name = self.read_name()?;
                Record::BeginStream { size, name }
            }
            Opcode::EndFile => Record::EndFile,
            Opcode::EndDir => Record::EndDir,
            Opcode::EndArchive => Record::EndArchive,
        };
        Ok(record)
    }

    /// Fills `buf` with content bytes.
    pub fn read_chunk(&mut self, buf: &mut [u8]) -> Result<()> {
        self.inner
            .read_exact(buf)
            .map_err(|e| Error::io(IoAction::Read, &self.label, e))?;
        self.offset += buf.len() as u64;
        Ok(())
    }

    fn read_u8(&mut self) -> Result<u8> {
        let mut buf = [0u8; 1];
        self.read_chunk(&mut buf)?;
        Ok(buf[0])
    }

    fn read_u16_le(&mut self) -> Result<u16> {
        let mut buf = [0u8; 2];
        self.read_chunk(&mut buf)?;
        Ok(u16::from_le_bytes(buf))
    }

    fn read_u32_le(&mut self) -> Result<u32> {
        let mut buf = [0u8; 4];
        self.read_chunk(&mut buf)?;
        Ok(u32::from_le_bytes(buf))
    }

    fn read_u64_le(&mut self) -> Result<u64> {
        let mut buf = [0u8; 8];
        self.read_chunk(&mut buf)?;
        Ok(u64::from_le_bytes(buf))
    }

    fn read_name(&mut self) -> Result<String> {
        let at = self.offset;
        let len = self.read_u16_le()? as usize;
        let mut bytes = vec![0u8; len];
        self.read_chunk(&mut bytes)?;
        let name = String::from_utf8(bytes).map_err(|_| Error::CorruptRecord {
            offset: at,
            reason: "name is not valid UTF-8".into(),
        })?;
        validate_name(&name).map_err(|reason| Error::CorruptRecord {
            offset: at,
            reason: format!("{reason}: {name:?}"),
        })?;
        Ok(name)
    }
}

#[cfg(windows)]
const SEPARATORS: &[char] = &['/', '\\'];
#[cfg(not(windows))]
const SEPARATORS: &[char] = &['/'];

/// Rejects names that would not stay inside the extraction directory.
///
/// The stream marker `:` is allowed; everything that could climb out of or
/// re-root the destination is not. A backslash is only a separator on
/// Windows; elsewhere it is an ordinary file-name character.
pub fn validate_name(name: &str) -> std::result::Result<(), &'static str> {
    if name.is_empty() {
        return Err("empty name");
    }
    if name == "." || name == ".." {
        return Err("relative directory name");
    }
    if name.contains(SEPARATORS) {
        return Err("name contains a path separator");
    }
    if name.contains('\0') {
        return Err("name contains NUL");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reader(bytes: &[u8]) -> RecordReader<&[u8]> {
        RecordReader::new(bytes, "test.star")
    }

    #[test]
    fn test_read_magic() {
        let mut r = reader(b"stara");
        r.read_magic().unwrap();
        assert_eq!(r.offset(), 4);
        assert_eq!(r.read_record().unwrap(), Record::EndArchive);
    }

    #[test]
    fn test_bad_magic() {
        let err = reader(b"7z\xbc\xaf").read_magic().unwrap_err();
        assert!(matches!(err, Error::InvalidFormat(_)));
    }

    #[test]
    fn test_short_magic() {
        let err = reader(b"st").read_magic().unwrap_err();
        assert!(matches!(err, Error::InvalidFormat(_)));
    }

    #[test]
    fn test_stream_record() {
        let mut bytes = vec![b'S'];
        bytes.extend_from_slice(&1u64.to_le_bytes());
        bytes.extend_from_slice(&10u16.to_le_bytes());
        bytes.extend_from_slice(b"a.txt:meta");
        let mut r = reader(&bytes);
        assert_eq!(
            r.read_record().unwrap(),
            Record::BeginStream {
                size: 1,
                name: "a.txt:meta".into()
            }
        );
        assert_eq!(r.offset(), bytes.len() as u64);
    }

    #[test]
    fn test_unknown_opcode_offset() {
        let mut r = reader(b"fz");
        assert_eq!(r.read_record().unwrap(), Record::EndFile);
        let err = r.read_record().unwrap_err();
        assert!(matches!(
            err,
            Error::UnknownOpcode {
                opcode: b'z',
                offset: 1
            }
        ));
    }

    #[test]
    fn test_truncated_record_is_io_error() {
        let mut bytes = vec![b'F'];
        bytes.extend_from_slice(&[0u8; 5]);
        let err = reader(&bytes).read_record().unwrap_err();
        match err {
            Error::Io { source, path, .. } => {
                assert_eq!(source.kind(), io::ErrorKind::UnexpectedEof);
                assert_eq!(path, Path::new("test.star"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_rejects_parent_dir_name() {
        let mut bytes = vec![b'D'];
        bytes.extend_from_slice(&2u16.to_le_bytes());
        bytes.extend_from_slice(b"..");
        let err = reader(&bytes).read_record().unwrap_err();
        assert!(matches!(err, Error::CorruptRecord { offset: 1, .. }));
    }

    #[test]
    fn test_rejects_invalid_utf8() {
        let mut bytes = vec![b'D'];
        bytes.extend_from_slice(&2u16.to_le_bytes());
        bytes.extend_from_slice(&[0xff, 0xfe]);
        let err = reader(&bytes).read_record().unwrap_err();
        assert!(err.to_string().contains("UTF-8"));
    }

    #[test]
    fn test_validate_name() {
        assert!(validate_name("a.txt").is_ok());
        assert!(validate_name(":meta").is_ok());
        assert!(validate_name("a.txt:meta").is_ok());
        assert!(validate_name("").is_err());
        assert!(validate_name(".").is_err());
        assert!(validate_name("a/b").is_err());
        assert!(validate_name("a\0").is_err());
    }

    #[cfg(windows)]
    #[test]
    fn test_backslash_is_a_separator_on_windows() {
        assert!(validate_name("a\\b").is_err());
        assert!(validate_name("..\\up").is_err());
    }

    #[cfg(not(windows))]
    #[test]
    fn test_backslash_is_a_plain_character_elsewhere() {
        assert!(validate_name("a\\b.txt").is_ok());
        assert!(validate_name("..\\up").is_ok());
    }
}
