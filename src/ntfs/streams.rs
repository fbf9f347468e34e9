//! Alternate data stream discovery.

use std::io;
use std::path::{Path, PathBuf};

/// A named stream found on a file or directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AltStream {
    /// Stream name, without the leading marker or the `:$DATA` suffix.
    pub name: String,
    /// Size of the stream in bytes.
    pub size: u64,
}

impl AltStream {
    /// Returns the enumeration path of this stream on `owner`.
    ///
    /// See [`super::stream_path`].
    pub fn path_on(&self, owner: &Path, owner_is_dir: bool) -> PathBuf {
        super::stream_path(owner, owner_is_dir, &self.name)
    }
}

/// Discovers the named streams of a file or directory.
///
/// The default unnamed stream (`::$DATA`) is not included. An entry without
/// named streams yields an empty vector.
///
/// # Platform Support
///
/// - Windows: Uses `FindFirstStreamW`/`FindNextStreamW` to enumerate streams
/// - Other platforms: Returns an empty vector
#[cfg(windows)]
pub fn discover_alt_streams(path: impl AsRef<Path>) -> io::Result<Vec<AltStream>> {
    use std::os::windows::ffi::OsStrExt;

    #[repr(C)]
    #[allow(non_snake_case)]
    struct WIN32_FIND_STREAM_DATA {
        StreamSize: i64,
        cStreamName: [u16; 296], // MAX_PATH + 36
    }

    type HANDLE = *mut std::ffi::c_void;
    const INVALID_HANDLE_VALUE: HANDLE = -1isize as HANDLE;
    const FIND_STREAM_INFO_STANDARD: u32 = 0;
    const ERROR_HANDLE_EOF: i32 = 38;

    #[link(name = "kernel32")]
    unsafe extern "system" {
        fn FindFirstStreamW(
            lpFileName: *const u16,
            InfoLevel: u32,
            lpFindStreamData: *mut WIN32_FIND_STREAM_DATA,
            dwFlags: u32,
        ) -> HANDLE;
        fn FindNextStreamW(hFindStream: HANDLE, lpFindStreamData: *mut WIN32_FIND_STREAM_DATA)
        -> i32;
        fn FindClose(hFindFile: HANDLE) -> i32;
    }

    struct FindHandle(HANDLE);

    impl Drop for FindHandle {
        fn drop(&mut self) {
            // SAFETY: the handle came from a successful FindFirstStreamW.
            unsafe {
                FindClose(self.0);
            }
        }
    }

    let wide_path: Vec<u16> = path
        .as_ref()
        .as_os_str()
        .encode_wide()
        .chain(std::iter::once(0))
        .collect();

    let mut streams = Vec::new();
    // SAFETY: WIN32_FIND_STREAM_DATA is plain data; all-zero is a valid value.
    let mut data: WIN32_FIND_STREAM_DATA = unsafe { std::mem::zeroed() };

    // SAFETY: `wide_path` is NUL-terminated and `data` is a valid out pointer.
    let handle = unsafe {
        FindFirstStreamW(
            wide_path.as_ptr(),
            FIND_STREAM_INFO_STANDARD,
            &mut data,
            0,
        )
    };
    if handle == INVALID_HANDLE_VALUE {
        let err = io::Error::last_os_error();
        if err.raw_os_error() == Some(ERROR_HANDLE_EOF) {
            return Ok(streams);
        }
        return Err(err);
    }
    let handle = FindHandle(handle);

    loop {
        let len = data
            .cStreamName
            .iter()
            .position(|&c| c == 0)
            .unwrap_or(data.cStreamName.len());
        let raw = String::from_utf16_lossy(&data.cStreamName[..len]);

        // Names come back as `:name:$DATA`; `::$DATA` is the main stream.
        if let Some(name) = raw
            .strip_prefix(':')
            .and_then(|s| s.strip_suffix(":$DATA"))
            .filter(|s| !s.is_empty())
        {
            streams.push(AltStream {
                name: name.to_string(),
                size: data.StreamSize as u64,
            });
        }

        // SAFETY: `handle` is open and `data` is a valid out pointer.
        if unsafe { FindNextStreamW(handle.0, &mut data) } == 0 {
            let err = io::Error::last_os_error();
            if err.raw_os_error() == Some(ERROR_HANDLE_EOF) {
                break;
            }
            return Err(err);
        }
    }

    Ok(streams)
}

/// Discovers the named streams of a file or directory.
///
/// On non-Windows platforms, this always returns an empty vector.
#[cfg(not(windows))]
pub fn discover_alt_streams(_path: impl AsRef<Path>) -> io::Result<Vec<AltStream>> {
    Ok(Vec::new())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path_on_file() {
        let stream = AltStream {
            name: "Zone.Identifier".to_string(),
            size: 100,
        };
        let path = stream.path_on(Path::new("dl/setup.exe"), false);
        assert!(path.to_string_lossy().ends_with("setup.exe:Zone.Identifier"));
    }

    #[test]
    fn test_path_on_directory() {
        let stream = AltStream {
            name: "meta".to_string(),
            size: 1,
        };
        let path = stream.path_on(Path::new("proj"), true);
        assert_eq!(path.file_name().unwrap(), ":meta");
    }

    #[cfg(not(windows))]
    #[test]
    fn test_discover_alt_streams_non_windows() {
        let result = discover_alt_streams("/some/path").unwrap();
        assert!(result.is_empty());
    }
}
