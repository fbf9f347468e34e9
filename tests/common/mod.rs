//! Shared test utilities for integration tests.
//!
//! Record builders produce raw archive bytes without going through the
//! encoder, and [`Recorder`] captures observer events.
//!
//! Note: `#![allow(dead_code)]` is required because each integration test file
//! compiles as a separate crate and may only use a subset of these helpers.

#![allow(dead_code)]

use std::path::{Path, PathBuf};

use ntfs_streams::{
    ArchiveEncoder, ArchiveObserver, ArchiveWriter, EncodeOptions, EncodeSummary, NoProgress,
    Selection, TreeSource, Warning,
};

/// Builds archive bytes record by record.
#[derive(Default)]
pub struct ArchiveBuilder {
    bytes: Vec<u8>,
}

impl ArchiveBuilder {
    /// Starts with the signature.
    pub fn new() -> Self {
        Self {
            bytes: b"star".to_vec(),
        }
    }

    /// Starts without a signature.
    pub fn raw() -> Self {
        Self::default()
    }

    fn name(mut self, name: &str) -> Self {
        self.bytes
            .extend_from_slice(&(name.len() as u16).to_le_bytes());
        self.bytes.extend_from_slice(name.as_bytes());
        self
    }

    pub fn begin_dir(mut self, name: &str) -> Self {
        self.bytes.push(b'D');
        self.name(name)
    }

    pub fn file(mut self, name: &str, content: &[u8], attributes: u32, filetime: u64) -> Self {
        self.bytes.push(b'F');
        self.bytes
            .extend_from_slice(&(content.len() as u64).to_le_bytes());
        self.bytes.extend_from_slice(&attributes.to_le_bytes());
        self.bytes.extend_from_slice(&filetime.to_le_bytes());
        let mut this = self.name(name);
        this.bytes.extend_from_slice(content);
        this
    }

    pub fn stream(mut self, name: &str, content: &[u8]) -> Self {
        self.bytes.push(b'S');
        self.bytes
            .extend_from_slice(&(content.len() as u64).to_le_bytes());
        let mut this = self.name(name);
        this.bytes.extend_from_slice(content);
        this
    }

    pub fn end_file(mut self) -> Self {
        self.bytes.push(b'f');
        self
    }

    pub fn end_dir(mut self) -> Self {
        self.bytes.push(b'd');
        self
    }

    pub fn end_archive(mut self) -> Self {
        self.bytes.push(b'a');
        self
    }

    pub fn bytes(mut self, bytes: &[u8]) -> Self {
        self.bytes.extend_from_slice(bytes);
        self
    }

    pub fn build(self) -> Vec<u8> {
        self.bytes
    }
}

/// One observed event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Directory(PathBuf, usize),
    File(PathBuf, u64, usize),
    Stream(PathBuf, u64, usize),
    Warning(PathBuf, usize),
}

/// Records every observer event in order.
#[derive(Debug, Default)]
pub struct Recorder {
    pub events: Vec<Event>,
}

impl Recorder {
    pub fn warnings(&self) -> usize {
        self.events
            .iter()
            .filter(|e| matches!(e, Event::Warning(..)))
            .count()
    }
}

impl ArchiveObserver for Recorder {
    fn on_directory(&mut self, path: &Path, depth: usize) {
        self.events.push(Event::Directory(path.to_path_buf(), depth));
    }

    fn on_file(&mut self, path: &Path, size: u64, depth: usize) {
        self.events.push(Event::File(path.to_path_buf(), size, depth));
    }

    fn on_stream(&mut self, path: &Path, size: u64, depth: usize) {
        self.events.push(Event::Stream(path.to_path_buf(), size, depth));
    }

    fn on_warning(&mut self, warning: &Warning, depth: usize) {
        self.events
            .push(Event::Warning(warning.path().to_path_buf(), depth));
    }
}

/// Encodes `selection` from `source` into memory.
pub fn encode_to_vec<S: TreeSource + ?Sized>(
    source: &S,
    selection: &Selection,
    options: EncodeOptions,
) -> ntfs_streams::Result<(Vec<u8>, EncodeSummary)> {
    let mut writer = ArchiveWriter::memory();
    let summary = ArchiveEncoder::new(source)
        .options(options)
        .encode(selection, &mut writer, NoProgress)?;
    let bytes = writer.into_bytes().unwrap_or_default();
    Ok((bytes, summary))
}
