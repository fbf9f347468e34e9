//! Windows file attributes and last-write time.

use std::fs::Metadata;
use std::io;
use std::path::Path;

use crate::Timestamp;

/// Read-only file.
pub const FILE_ATTRIBUTE_READONLY: u32 = 0x01;
/// Hidden file.
pub const FILE_ATTRIBUTE_HIDDEN: u32 = 0x02;
/// System file.
pub const FILE_ATTRIBUTE_SYSTEM: u32 = 0x04;
/// Directory.
pub const FILE_ATTRIBUTE_DIRECTORY: u32 = 0x10;
/// File changed since the last backup.
pub const FILE_ATTRIBUTE_ARCHIVE: u32 = 0x20;
/// No other attributes set.
pub const FILE_ATTRIBUTE_NORMAL: u32 = 0x80;

/// Returns the attribute bitmask of an entry.
#[cfg(windows)]
pub fn file_attributes(_path: &Path, metadata: &Metadata) -> u32 {
    use std::os::windows::fs::MetadataExt;
    metadata.file_attributes()
}

/// Returns the attribute bitmask of an entry.
///
/// Synthesized from the permission bits and a leading dot in the name.
#[cfg(not(windows))]
pub fn file_attributes(path: &Path, metadata: &Metadata) -> u32 {
    let mut attrs = 0;
    if metadata.permissions().readonly() {
        attrs |= FILE_ATTRIBUTE_READONLY;
    }
    if metadata.is_dir() {
        attrs |= FILE_ATTRIBUTE_DIRECTORY;
    }
    if path
        .file_name()
        .is_some_and(|n| n.to_string_lossy().starts_with('.'))
    {
        attrs |= FILE_ATTRIBUTE_HIDDEN;
    }
    if attrs == 0 {
        attrs = FILE_ATTRIBUTE_NORMAL;
    }
    attrs
}

/// Applies a stored last-write time and attributes to an extracted file.
///
/// The time is set first: once the read-only attribute is on, the file can
/// no longer be opened for writing.
pub fn restore_metadata(path: &Path, attributes: u32, last_write_time: Timestamp) -> io::Result<()> {
    filetime::set_file_mtime(path, last_write_time.to_file_time())?;
    apply_file_attributes(path, attributes)
}

/// Makes an existing file writable again so it can be replaced.
///
/// Does nothing when the file is already writable.
pub fn clear_readonly(path: &Path) -> io::Result<()> {
    let mut perms = std::fs::metadata(path)?.permissions();
    if perms.readonly() {
        #[allow(clippy::permissions_set_readonly_false)]
        perms.set_readonly(false);
        std::fs::set_permissions(path, perms)?;
    }
    Ok(())
}

#[cfg(windows)]
fn apply_file_attributes(path: &Path, attributes: u32) -> io::Result<()> {
    use std::os::windows::ffi::OsStrExt;

    #[link(name = "kernel32")]
    unsafe extern "system" {
        fn SetFileAttributesW(lpFileName: *const u16, dwFileAttributes: u32) -> i32;
    }

    // Only these bits are accepted by SetFileAttributesW.
    const SETTABLE: u32 = 0x0001 | 0x0002 | 0x0004 | 0x0020 | 0x0080 | 0x0100 | 0x1000 | 0x2000;

    let wide_path: Vec<u16> = path
        .as_os_str()
        .encode_wide()
        .chain(std::iter::once(0))
        .collect();
    let mut attrs = attributes & SETTABLE;
    if attrs == 0 {
        attrs = FILE_ATTRIBUTE_NORMAL;
    }

    // SAFETY: `wide_path` is NUL-terminated and outlives the call.
    let ok = unsafe { SetFileAttributesW(wide_path.as_ptr(), attrs) };
    if ok == 0 {
        return Err(io::Error::last_os_error());
    }
    Ok(())
}

#[cfg(not(windows))]
fn apply_file_attributes(path: &Path, attributes: u32) -> io::Result<()> {
    if attributes & FILE_ATTRIBUTE_READONLY != 0 {
        let mut perms = std::fs::metadata(path)?.permissions();
        perms.set_readonly(true);
        std::fs::set_permissions(path, perms)?;
    }
    Ok(())
}
