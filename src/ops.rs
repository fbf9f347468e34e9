//! Single-stream operations.
//!
//! A stream is addressed like any file (`notes.txt:meta`, `dir:meta`), so
//! these work equally on plain files and on alternate streams.

use std::fs::{self, File};
use std::io::{BufRead, BufWriter, Read, Write};
use std::path::Path;

use crate::{CHUNK_SIZE, Error, IoAction, Result};

/// Line terminator written by [`echo_lines`].
pub const LINE_ENDING: &str = "\r\n";

/// Copies the content of `src` into `dest`, replacing it.
///
/// Returns the number of bytes copied.
///
/// # Example
///
/// ```rust,no_run
/// use ntfs_streams::ops::copy_stream;
///
/// let n = copy_stream("report.docx:Zone.Identifier", "zone.txt")?;
/// println!("{n} bytes copied");
/// # Ok::<(), ntfs_streams::Error>(())
/// ```
pub fn copy_stream(src: impl AsRef<Path>, dest: impl AsRef<Path>) -> Result<u64> {
    let (src, dest) = (src.as_ref(), dest.as_ref());
    let mut input = File::open(src).map_err(|e| Error::io(IoAction::Open, src, e))?;
    let output = File::create(dest).map_err(|e| Error::io(IoAction::Create, dest, e))?;
    let mut output = BufWriter::new(output);

    let mut buf = vec![0u8; CHUNK_SIZE];
    let mut total = 0u64;
    loop {
        let n = match input.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(Error::io(IoAction::Read, src, e)),
        };
        output
            .write_all(&buf[..n])
            .map_err(|e| Error::io(IoAction::Write, dest, e))?;
        total += n as u64;
    }
    output
        .flush()
        .map_err(|e| Error::io(IoAction::Write, dest, e))?;
    Ok(total)
}

/// Reads the whole content of a file or stream.
pub fn read_stream(src: impl AsRef<Path>) -> Result<Vec<u8>> {
    let src = src.as_ref();
    let mut input = File::open(src).map_err(|e| Error::io(IoAction::Open, src, e))?;
    let mut content = Vec::new();
    input
        .read_to_end(&mut content)
        .map_err(|e| Error::io(IoAction::Read, src, e))?;
    Ok(content)
}

/// Writes every line of `input` to `dest`, each ended with [`LINE_ENDING`].
///
/// The input's own line terminators are dropped. Returns the number of bytes
/// written.
pub fn echo_lines<R: BufRead>(input: R, dest: impl AsRef<Path>) -> Result<u64> {
    let dest = dest.as_ref();
    let output = File::create(dest).map_err(|e| Error::io(IoAction::Create, dest, e))?;
    let mut output = BufWriter::new(output);

    let mut total = 0u64;
    for line in input.lines() {
        let line = line.map_err(|e| Error::io(IoAction::Read, "<stdin>", e))?;
        let line = line.trim_end_matches('\r');
        for part in [line, LINE_ENDING] {
            output
                .write_all(part.as_bytes())
                .map_err(|e| Error::io(IoAction::Write, dest, e))?;
            total += part.len() as u64;
        }
    }
    output
        .flush()
        .map_err(|e| Error::io(IoAction::Write, dest, e))?;
    Ok(total)
}

/// Deletes a file or a single stream.
///
/// Deleting a file deletes all of its streams with it.
pub fn delete_stream(path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    fs::remove_file(path).map_err(|e| Error::io(IoAction::Delete, path, e))
}
