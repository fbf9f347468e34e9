//! Output sinks for the archive encoder.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Component, Path, PathBuf};

use crate::format::{MAGIC, Opcode};
use crate::ntfs::is_stream_path;
use crate::{Error, IoAction, Result};

/// A fixed-width value written little-endian.
pub trait WireValue: Copy {
    /// Writes the value to `out`.
    fn write_le(self, out: &mut ArchiveWriter) -> Result<()>;
}

macro_rules! impl_wire_value {
    ($($ty:ty),*) => {
        $(
            impl WireValue for $ty {
                #[inline]
                fn write_le(self, out: &mut ArchiveWriter) -> Result<()> {
                    out.write(&self.to_le_bytes())
                }
            }
        )*
    };
}

impl_wire_value!(u8, u16, u32, u64);

impl WireValue for Opcode {
    #[inline]
    fn write_le(self, out: &mut ArchiveWriter) -> Result<()> {
        out.write(&[self.as_byte()])
    }
}

enum Target {
    /// Created on first write.
    File {
        path: PathBuf,
        is_stream: bool,
        file: Option<BufWriter<File>>,
    },
    /// Counts bytes only.
    DryRun,
    /// Collects the archive in memory.
    Memory(Option<Vec<u8>>),
}

/// Destination of an encoded archive.
///
/// The file variant creates its output lazily: nothing touches the disk
/// until the first byte is written, at which point the file is created and
/// the [`MAGIC`] signature goes out ahead of the caller's bytes. The dry-run
/// variant never touches the disk and starts its count at the signature
/// length, so both report the same total for the same input.
pub struct ArchiveWriter {
    target: Target,
    total: u64,
    part_size: Option<u64>,
}

impl ArchiveWriter {
    /// Creates a writer that will write the archive to `path`.
    ///
    /// `path` may name an alternate stream (`archive.txt:data`).
    pub fn create(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let is_stream = is_stream_path(&path);
        Self {
            target: Target::File {
                path,
                is_stream,
                file: None,
            },
            total: 0,
            part_size: None,
        }
    }

    /// Creates a writer that only counts what would be written.
    pub fn dry_run() -> Self {
        Self {
            target: Target::DryRun,
            total: MAGIC.len() as u64,
            part_size: None,
        }
    }

    /// Creates a writer that keeps the archive in memory.
    pub fn memory() -> Self {
        Self {
            target: Target::Memory(None),
            total: 0,
            part_size: None,
        }
    }

    /// Records a part size for splitting the output.
    ///
    /// Splitting is not performed; the value is kept so callers can report it.
    pub fn with_part_size(mut self, part_size: Option<u64>) -> Self {
        if part_size.is_some() {
            log::debug!("part size {:?} accepted but output is not split", part_size);
        }
        self.part_size = part_size;
        self
    }

    /// The configured part size.
    pub fn part_size(&self) -> Option<u64> {
        self.part_size
    }

    /// Returns `true` for the dry-run variant.
    pub fn is_dry_run(&self) -> bool {
        matches!(self.target, Target::DryRun)
    }

    /// The output path, for the file variant.
    pub fn destination(&self) -> Option<&Path> {
        match &self.target {
            Target::File { path, .. } => Some(path),
            _ => None,
        }
    }

    /// Bytes emitted so far, signature included.
    pub fn written_total(&self) -> u64 {
        self.total
    }

    /// Appends raw bytes.
    pub fn write(&mut self, bytes: &[u8]) -> Result<()> {
        match &mut self.target {
            Target::File { path, file, .. } => {
                if file.is_none() {
                    let created =
                        File::create(&*path).map_err(|e| Error::io(IoAction::Create, &*path, e))?;
                    log::debug!("created archive {}", path.display());
                    let mut out = BufWriter::new(created);
                    out.write_all(MAGIC)
                        .map_err(|e| Error::io(IoAction::Write, &*path, e))?;
                    self.total += MAGIC.len() as u64;
                    *file = Some(out);
                }
                if let Some(out) = file {
                    out.write_all(bytes)
                        .map_err(|e| Error::io(IoAction::Write, &*path, e))?;
                }
            }
            Target::DryRun => {}
            Target::Memory(buf) => {
                let buf = buf.get_or_insert_with(|| {
                    self.total += MAGIC.len() as u64;
                    MAGIC.to_vec()
                });
                buf.extend_from_slice(bytes);
            }
        }
        self.total += bytes.len() as u64;
        Ok(())
    }

    /// Writes a fixed-width value.
    #[inline]
    pub fn write_value<T: WireValue>(&mut self, value: T) -> Result<()> {
        value.write_le(self)
    }

    /// Returns `true` if `path` names the archive being written.
    ///
    /// A stream never matches a plain file and vice versa. Otherwise the
    /// paths are compared as spelled, then by their canonical forms so the
    /// same file reached through a different spelling is still caught.
    pub fn is_self(&self, path: &Path, is_stream: bool) -> bool {
        let Target::File {
            path: dest,
            is_stream: dest_is_stream,
            ..
        } = &self.target
        else {
            return false;
        };
        if *dest_is_stream != is_stream {
            return false;
        }
        if normalized(dest) == normalized(path) {
            return true;
        }
        match (fs::canonicalize(dest), fs::canonicalize(path)) {
            (Ok(a), Ok(b)) => a == b,
            _ => false,
        }
    }

    /// Flushes the output and returns the total byte count.
    pub fn finish(self) -> Result<u64> {
        if let Target::File {
            path,
            file: Some(mut out),
            ..
        } = self.target
        {
            out.flush()
                .map_err(|e| Error::io(IoAction::Write, &path, e))?;
        }
        Ok(self.total)
    }

    /// Returns the collected bytes of the memory variant.
    pub fn into_bytes(self) -> Option<Vec<u8>> {
        match self.target {
            Target::Memory(buf) => Some(buf.unwrap_or_default()),
            _ => None,
        }
    }
}

fn normalized(path: &Path) -> PathBuf {
    path.components()
        .filter(|c| !matches!(c, Component::CurDir))
        .collect()
}
