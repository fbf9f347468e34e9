//! Archive extraction.
//!
//! [`ArchiveReader`] reads records back and rebuilds directories, files and
//! streams under a destination directory, or only reports them in test mode.
//! Nesting is tracked with an explicit stack: a directory record opens a
//! level whose path becomes the extraction context, a file record opens a
//! level that keeps the current context (its streams sit beside it), and any
//! end marker closes the innermost level.
//!
//! A file's attributes and last write time are applied when its level
//! closes, after all of its streams have been written.
//!
//! # Example
//!
//! ```rust,no_run
//! use ntfs_streams::{ArchiveReader, ExtractOptions, NoProgress};
//!
//! let summary = ArchiveReader::open("backup.star")?
//!     .extract("restored", &ExtractOptions::new(), NoProgress)?;
//! println!("{} files", summary.files);
//! # Ok::<(), ntfs_streams::Error>(())
//! ```

mod options;

pub use options::{ExtractOptions, OverwritePolicy};

use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

use crate::format::Record;
use crate::format::reader::RecordReader;
use crate::ntfs::{clear_readonly, join_name, restore_metadata, stream_destination};
use crate::progress::{ArchiveObserver, Warning};
use crate::{CHUNK_SIZE, Error, IoAction, Result, Timestamp};

/// Counts from one extraction run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExtractSummary {
    /// Directory records read.
    pub directories: u64,
    /// File records read.
    pub files: u64,
    /// Stream records read.
    pub streams: u64,
    /// Content bytes consumed from the archive.
    pub content_bytes: u64,
    /// Warnings reported.
    pub warnings: u64,
}

/// Reads a stream archive.
pub struct ArchiveReader<R> {
    records: RecordReader<R>,
}

impl ArchiveReader<BufReader<File>> {
    /// Opens an archive file and checks its signature.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| Error::io(IoAction::Open, path, e))?;
        Self::new(BufReader::new(file), path)
    }
}

impl<R: Read> ArchiveReader<R> {
    /// Wraps a reader positioned at the signature and checks it.
    ///
    /// `label` names the archive in error messages.
    pub fn new(inner: R, label: impl Into<PathBuf>) -> Result<Self> {
        let mut records = RecordReader::new(inner, label);
        records.read_magic()?;
        Ok(Self { records })
    }

    /// Extracts everything into `dest`, or only reports entries when
    /// `options.test` is set.
    ///
    /// Missing, existing or uncreatable destinations are warnings; the
    /// content is consumed either way so the following records stay in step.
    /// Format errors and failures writing to an opened destination are fatal.
    pub fn extract<O: ArchiveObserver>(
        self,
        dest: impl AsRef<Path>,
        options: &ExtractOptions,
        observer: O,
    ) -> Result<ExtractSummary> {
        options.validate()?;
        let dest = dest.as_ref();
        if !options.test && !dest.as_os_str().is_empty() {
            fs::create_dir_all(dest).map_err(|e| Error::io(IoAction::Create, dest, e))?;
        }

        let mut run = ExtractRun {
            records: self.records,
            options,
            observer,
            buf: vec![0u8; CHUNK_SIZE],
            summary: ExtractSummary::default(),
        };
        run.run(dest)?;
        Ok(run.summary)
    }
}

/// One open level of the input.
enum Frame {
    Root {
        context: PathBuf,
    },
    Dir {
        context: PathBuf,
        depth: usize,
    },
    File {
        context: PathBuf,
        depth: usize,
        path: PathBuf,
        attributes: u32,
        last_write_time: Timestamp,
        written: bool,
    },
}

impl Frame {
    fn context(&self) -> &Path {
        match self {
            Frame::Root { context } | Frame::Dir { context, .. } | Frame::File { context, .. } => {
                context
            }
        }
    }

    fn depth(&self) -> usize {
        match self {
            Frame::Root { .. } => 0,
            Frame::Dir { depth, .. } | Frame::File { depth, .. } => *depth,
        }
    }
}

struct ExtractRun<'o, R, O> {
    records: RecordReader<R>,
    options: &'o ExtractOptions,
    observer: O,
    buf: Vec<u8>,
    summary: ExtractSummary,
}

impl<R: Read, O: ArchiveObserver> ExtractRun<'_, R, O> {
    fn run(&mut self, dest: &Path) -> Result<()> {
        let mut stack = vec![Frame::Root {
            context: dest.to_path_buf(),
        }];

        while let Some(top) = stack.last() {
            let context = top.context().to_path_buf();
            let depth = top.depth();

            match self.records.read_record()? {
                Record::BeginDir { name } => {
                    let path = join_name(&context, &name);
                    self.observer.on_directory(&path, depth);
                    self.summary.directories += 1;
                    if !self.options.test {
                        create_dir(&path)?;
                    }
                    stack.push(Frame::Dir {
                        context: path,
                        depth: depth + 1,
                    });
                }
                Record::BeginFile {
                    size,
                    attributes,
                    last_write_time,
                    name,
                } => {
                    let path = join_name(&context, &name);
                    self.observer.on_file(&path, size, depth);
                    self.summary.files += 1;
                    let written = self.write_to(&path, size, depth)?;
                    stack.push(Frame::File {
                        context,
                        depth,
                        path,
                        attributes,
                        last_write_time,
                        written,
                    });
                }
                Record::BeginStream { size, name } => {
                    let separator = self.options.stream_separator.as_deref();
                    let path = stream_destination(&context, &name, separator);
                    self.observer.on_stream(&path, size, depth);
                    self.summary.streams += 1;
                    self.write_to(&path, size, depth)?;
                }
                Record::EndFile | Record::EndDir | Record::EndArchive => {
                    if let Some(Frame::File {
                        path,
                        attributes,
                        last_write_time,
                        written: true,
                        depth,
                        ..
                    }) = stack.pop()
                    {
                        if let Err(source) = restore_metadata(&path, attributes, last_write_time) {
                            log::warn!("Failed to restore metadata of {}: {}", path.display(), source);
                            self.warn(Warning::AttributesNotRestored { path, source }, depth);
                        }
                    }
                }
            }
        }
        Ok(())
    }

    /// Consumes exactly `size` content bytes, writing them to `path` when it
    /// can be created. Returns whether the content was written.
    fn write_to(&mut self, path: &Path, size: u64, depth: usize) -> Result<bool> {
        let mut dest = if self.options.test {
            None
        } else if self.options.overwrite == OverwritePolicy::Skip
            && fs::symlink_metadata(path).is_ok()
        {
            self.warn(
                Warning::AlreadyExists {
                    path: path.to_path_buf(),
                },
                depth,
            );
            None
        } else {
            if self.options.overwrite == OverwritePolicy::Overwrite {
                // A previous extraction may have left the file read-only.
                match clear_readonly(path) {
                    Err(e) if e.kind() != io::ErrorKind::NotFound => {
                        log::debug!("cannot make {} writable: {}", path.display(), e);
                    }
                    _ => {}
                }
            }
            match File::create(path) {
                Ok(file) => Some(BufWriter::new(file)),
                Err(source) => {
                    self.warn(
                        Warning::CreateFailed {
                            path: path.to_path_buf(),
                            source,
                        },
                        depth,
                    );
                    None
                }
            }
        };

        let mut remaining = size;
        while remaining > 0 {
            let n = remaining.min(self.buf.len() as u64) as usize;
            self.records.read_chunk(&mut self.buf[..n])?;
            if let Some(out) = dest.as_mut() {
                out.write_all(&self.buf[..n])
                    .map_err(|e| Error::io(IoAction::Write, path, e))?;
            }
            remaining -= n as u64;
        }
        self.summary.content_bytes += size;

        match dest {
            Some(mut out) => {
                out.flush()
                    .map_err(|e| Error::io(IoAction::Write, path, e))?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn warn(&mut self, warning: Warning, depth: usize) {
        log::debug!("{}: {}", warning.path().display(), warning);
        self.summary.warnings += 1;
        self.observer.on_warning(&warning, depth);
    }
}

/// Creates a directory; an existing directory is fine.
fn create_dir(path: &Path) -> Result<()> {
    match fs::create_dir(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists && path.is_dir() => Ok(()),
        Err(e) => Err(Error::io(IoAction::Create, path, e)),
    }
}
