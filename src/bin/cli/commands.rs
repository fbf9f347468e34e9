//! Command implementations for the CLI tool.

use std::env;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use ntfs_streams::ops::{copy_stream, delete_stream, echo_lines, read_stream};
use ntfs_streams::text::decode_text;
use ntfs_streams::write::{parse_part_size, resolve_archive_name};
use ntfs_streams::{
    ArchiveEncoder, ArchiveReader, ArchiveWriter, EncodeOptions, Error, ExcludeSet,
    ExtractOptions, IoAction, NtfsSource, OverwritePolicy, Result, Selection, list_directory,
};

use crate::exit_codes::{ExitCode, error_to_exit_code};
use crate::output::{format_listing, group_thousands};
use crate::progress::ConsoleReporter;

/// Configuration for the tar command.
pub struct TarConfig<'a> {
    pub archive: Option<&'a Path>,
    pub items: &'a [PathBuf],
    pub test: bool,
    pub block_size: Option<&'a str>,
    pub password: Option<&'a str>,
    pub exclude: &'a [String],
}

/// Configuration for the untar command.
pub struct UntarConfig<'a> {
    pub archive: &'a Path,
    pub dest: Option<&'a Path>,
    pub test: bool,
    pub overwrite: bool,
    pub password: Option<&'a str>,
    pub stream_separator: Option<&'a str>,
}

/// Prints a fatal error and maps it to an exit code.
fn finish(result: Result<()>) -> ExitCode {
    match result {
        Ok(()) => ExitCode::Success,
        Err(e) => {
            eprintln!("Error: {}", e);
            error_to_exit_code(&e)
        }
    }
}

fn current_dir() -> Result<PathBuf> {
    env::current_dir().map_err(|e| Error::io(IoAction::Open, ".", e))
}

/// Short help shown when the tool is run without arguments
pub fn short_help() {
    println!(
        "{} {} - NTFS alternate data streams tool",
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION")
    );
    println!("\ntype '{} --help' to get help\n", env!("CARGO_PKG_NAME"));
}

/// Lists the streams in a directory; with `all`, every file too
pub fn list(dir: Option<&Path>, all: bool) -> ExitCode {
    finish(list_inner(dir, all))
}

fn list_inner(dir: Option<&Path>, all: bool) -> Result<()> {
    let dir = match dir {
        Some(dir) => std::path::absolute(dir).map_err(|e| Error::io(IoAction::List, dir, e))?,
        None => current_dir()?,
    };
    let listing = list_directory(&dir)?;
    println!("Directory: {}\n", dir.display());
    print!("{}", format_listing(&listing, all));
    Ok(())
}

/// Copy command implementation
pub fn copy(src: &Path, dest: &Path) -> ExitCode {
    finish(copy_stream(src, dest).map(|total| {
        println!(
            "{} bytes copied from {} to {}",
            group_thousands(total),
            src.display(),
            dest.display()
        );
    }))
}

/// Type command implementation
pub fn type_stream(src: &Path) -> ExitCode {
    finish(read_stream(src).and_then(|content| {
        let text = decode_text(&content);
        let mut stdout = io::stdout().lock();
        stdout
            .write_all(text.as_bytes())
            .and_then(|()| stdout.flush())
            .map_err(|e| Error::io(IoAction::Write, "<stdout>", e))
    }))
}

/// Echo command implementation
pub fn echo(dest: &Path) -> ExitCode {
    let eof_key = if cfg!(windows) { "Ctrl-Z" } else { "Ctrl-D" };
    println!("Type {eof_key} at the end of your text");
    finish(echo_lines(io::stdin().lock(), dest).map(|total| {
        println!("{} bytes written to {}", group_thousands(total), dest.display());
    }))
}

/// Del command implementation
pub fn delete(src: &Path) -> ExitCode {
    finish(delete_stream(src).map(|()| println!("{} deleted", src.display())))
}

/// Tar command implementation
pub fn tar(config: &TarConfig<'_>) -> ExitCode {
    finish(tar_inner(config))
}

fn tar_inner(config: &TarConfig<'_>) -> Result<()> {
    let cwd = current_dir()?;
    let archive = resolve_archive_name(config.archive, &cwd);
    let archive = std::path::absolute(&archive).unwrap_or(archive);
    let exclude = ExcludeSet::from_masks(config.exclude)?;
    let part_size = config.block_size.map(parse_part_size).transpose()?;
    if config.password.is_some() {
        log::warn!("encryption is not supported; the archive is written unencrypted");
    }

    let mut header = format!("Writing {}", archive.display());
    if config.test {
        header.push_str(", test");
    }
    if let Some(size) = part_size {
        header.push_str(&format!(", block size={size}"));
    }
    if !exclude.is_empty() {
        header.push_str(&format!(", exclude={}", brace_list(exclude.masks())));
    }
    if config.items.is_empty() {
        header.push_str(", current dir");
    } else {
        let items = config.items.iter().map(|p| p.display().to_string());
        header.push_str(&format!(", items={}", brace_list(items)));
    }
    println!("{header}\n");

    let mut writer = if config.test {
        ArchiveWriter::dry_run()
    } else {
        ArchiveWriter::create(&archive)
    }
    .with_part_size(part_size);

    let source = NtfsSource::new();
    let selection = Selection::items(&cwd, config.items.iter().cloned());
    let summary = ArchiveEncoder::new(&source)
        .options(EncodeOptions::new().exclude(exclude))
        .encode(&selection, &mut writer, ConsoleReporter::new())?;
    let written = writer.finish()?;
    log::debug!("{:?}", summary);

    let name = archive
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| archive.display().to_string());
    println!("\n{} bytes written in {}", group_thousands(written), name);
    Ok(())
}

/// Untar command implementation
pub fn untar(config: &UntarConfig<'_>) -> ExitCode {
    finish(untar_inner(config))
}

fn untar_inner(config: &UntarConfig<'_>) -> Result<()> {
    let archive = if config.archive.exists() {
        config.archive.to_path_buf()
    } else {
        resolve_archive_name(Some(config.archive), &current_dir()?)
    };
    let dest = config.dest.unwrap_or(Path::new("."));
    if config.password.is_some() {
        log::warn!("encryption is not supported; the password is ignored");
    }

    let mut options = ExtractOptions::new().test(config.test).overwrite(if config.overwrite {
        OverwritePolicy::Overwrite
    } else {
        OverwritePolicy::Skip
    });
    if let Some(separator) = config.stream_separator {
        options = options.stream_separator(separator);
    }

    let mut header = format!("Reading {}", archive.display());
    if config.test {
        header.push_str(", test");
    } else {
        header.push_str(&format!(", into {}", dest.display()));
    }
    if let Some(separator) = config.stream_separator {
        header.push_str(&format!(", stream separator={separator}"));
    }
    println!("{header}\n");

    let summary = ArchiveReader::open(&archive)?.extract(dest, &options, ConsoleReporter::new())?;
    println!(
        "\n{} directories, {} files, {} streams, {} bytes",
        summary.directories,
        summary.files,
        summary.streams,
        group_thousands(summary.content_bytes)
    );
    Ok(())
}

fn brace_list<I, S>(items: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut out = String::from("{ ");
    for item in items {
        out.push_str(item.as_ref());
        out.push(' ');
    }
    out.push('}');
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_brace_list() {
        assert_eq!(brace_list(["*.tmp", "*.bak"]), "{ *.tmp *.bak }");
        assert_eq!(brace_list(Vec::<String>::new()), "{ }");
    }
}
