//! Options for archive encoding.

use std::path::{Path, PathBuf};

use crate::ntfs::is_stream_path;
use crate::progress::{BYTES_GIB, BYTES_KIB, BYTES_MIB};
use crate::{Error, ExcludeSet, Result};

/// Extension given to archive names that have none.
pub const DEFAULT_EXTENSION: &str = "star";

/// Options for [`ArchiveEncoder`](super::ArchiveEncoder).
#[derive(Debug, Clone, Default)]
pub struct EncodeOptions {
    /// Names to leave out, along with the subtree of any matching directory.
    pub exclude: ExcludeSet,
}

impl EncodeOptions {
    /// Default options: nothing excluded.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the exclusion masks.
    pub fn exclude(mut self, exclude: ExcludeSet) -> Self {
        self.exclude = exclude;
        self
    }
}

/// Parses a part size: a decimal number with an optional `K`, `M` or `G`
/// suffix (either case, powers of 1024).
///
/// # Example
///
/// ```
/// use ntfs_streams::write::parse_part_size;
///
/// assert_eq!(parse_part_size("100").unwrap(), 100);
/// assert_eq!(parse_part_size("2k").unwrap(), 2048);
/// assert_eq!(parse_part_size("1G").unwrap(), 1 << 30);
/// assert!(parse_part_size("10X").is_err());
/// ```
pub fn parse_part_size(text: &str) -> Result<u64> {
    let digits_end = text
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(text.len());
    let (digits, suffix) = text.split_at(digits_end);
    let multiplier = match suffix {
        "" => 1,
        "K" | "k" => BYTES_KIB,
        "M" | "m" => BYTES_MIB,
        "G" | "g" => BYTES_GIB,
        _ => return Err(invalid_block_size(text)),
    };
    if digits.is_empty() {
        return Err(invalid_block_size(text));
    }
    digits
        .parse::<u64>()
        .ok()
        .and_then(|n| n.checked_mul(multiplier))
        .ok_or_else(|| invalid_block_size(text))
}

fn invalid_block_size(text: &str) -> Error {
    Error::InvalidArgument(format!("Invalid block size: {text}"))
}

/// Works out the archive path from the name given on the command line.
///
/// Without a name the current directory's name is used. A name with no
/// extension that does not address a stream gets [`DEFAULT_EXTENSION`].
///
/// # Example
///
/// ```
/// use ntfs_streams::write::resolve_archive_name;
/// use std::path::Path;
///
/// let cwd = Path::new("/home/me/proj");
/// assert_eq!(resolve_archive_name(None, cwd), Path::new("proj.star"));
/// assert_eq!(resolve_archive_name(Some(Path::new("backup")), cwd), Path::new("backup.star"));
/// assert_eq!(resolve_archive_name(Some(Path::new("b.bin")), cwd), Path::new("b.bin"));
/// ```
pub fn resolve_archive_name(name: Option<&Path>, current_dir: &Path) -> PathBuf {
    let mut resolved = match name.filter(|n| !n.as_os_str().is_empty()) {
        Some(name) if name.extension().is_some() || is_stream_path(name) => {
            return name.to_path_buf();
        }
        Some(name) => name.to_path_buf(),
        None => current_dir
            .file_name()
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("archive")),
    };
    resolved.set_extension(DEFAULT_EXTENSION);
    resolved
}
