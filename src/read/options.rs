//! Extraction options.

use crate::{Error, Result};

/// Policy for destinations that already exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OverwritePolicy {
    /// Leave the existing file alone and report a warning.
    #[default]
    Skip,
    /// Replace the existing file.
    Overwrite,
}

/// Options for [`ArchiveReader::extract`](super::ArchiveReader::extract).
///
/// # Example
///
/// ```rust
/// use ntfs_streams::{ExtractOptions, OverwritePolicy};
///
/// let options = ExtractOptions::new()
///     .overwrite(OverwritePolicy::Overwrite)
///     .stream_separator("_");
/// assert!(!options.test);
/// ```
#[derive(Debug, Clone, Default)]
pub struct ExtractOptions {
    /// Replacement for the stream marker, so streams land in ordinary files.
    pub stream_separator: Option<String>,
    /// Only list the contents; nothing is created.
    pub test: bool,
    /// What to do with existing destinations.
    pub overwrite: OverwritePolicy,
}

impl ExtractOptions {
    /// Default options: extract, keep existing files, keep streams as streams.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the stream marker replacement.
    pub fn stream_separator(mut self, separator: impl Into<String>) -> Self {
        self.stream_separator = Some(separator.into());
        self
    }

    /// Enables list-only mode.
    pub fn test(mut self, test: bool) -> Self {
        self.test = test;
        self
    }

    /// Sets the overwrite policy.
    pub fn overwrite(mut self, policy: OverwritePolicy) -> Self {
        self.overwrite = policy;
        self
    }

    /// Checks that the separator cannot move a stream out of its directory.
    pub fn validate(&self) -> Result<()> {
        if let Some(sep) = &self.stream_separator {
            if sep.contains(['/', '\\', '\0']) {
                return Err(Error::InvalidArgument(format!(
                    "Invalid stream separator {sep:?}: path separators are not allowed"
                )));
            }
        }
        Ok(())
    }
}
