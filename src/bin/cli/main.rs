//! CLI tool for NTFS alternate data streams.

mod args;
mod commands;
mod exit_codes;
mod output;
mod progress;

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{Shell, generate};
use std::path::PathBuf;

use exit_codes::ExitCode;

/// List, copy, delete and archive NTFS alternate data streams
#[derive(Parser)]
#[command(name = "ntfs-streams")]
#[command(author, version, about = "List, copy, delete and archive NTFS alternate data streams", long_about = None)]
#[command(args_conflicts_with_subcommands = true)]
#[command(after_help = "<src> and <dest> are file or stream names, e.g. file.txt:stream1\n\
                        Windows-style switches are accepted too: /t /l /o /b:size /p:pass /e:masks /f:sym /?")]
pub struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Directory whose streams to list
    dir: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// List all files and their streams (alias: ls)
    #[command(alias = "ls")]
    Dir {
        /// Directory to list, default is current
        dir: Option<PathBuf>,
    },

    /// Copy contents from src to dest
    Copy {
        /// Source file or stream
        src: PathBuf,

        /// Destination file or stream
        dest: PathBuf,
    },

    /// Write a stream to stdout as text
    Type {
        /// File or stream to show
        src: PathBuf,
    },

    /// Copy stdin lines to a stream
    Echo {
        /// Destination file or stream
        dest: PathBuf,
    },

    /// Delete a stream or file
    Del {
        /// File or stream to delete
        src: PathBuf,
    },

    /// Archive files, directories and their streams
    #[command(after_help = "If no items are given, all items of the current directory are added.\n\
                            Default file extension of the archive is .star")]
    Tar {
        /// Test: list what would be archived, but do not create the archive
        #[arg(short = 't', long)]
        test: bool,

        /// Divide output in blocks of this size (suffixes K, M, G)
        #[arg(short = 'b', long)]
        block_size: Option<String>,

        /// Password to encrypt the archive
        #[arg(short = 'p', long)]
        password: Option<String>,

        /// Masks of files or directories to exclude, separated by ';'
        #[arg(short = 'e', long, value_delimiter = ';')]
        exclude: Vec<String>,

        /// Archive to create, default is named after the current directory
        archive: Option<PathBuf>,

        /// Files and directories to add
        items: Vec<PathBuf>,
    },

    /// Extract an archive
    Untar {
        /// Do not extract, only list names (alias: -l)
        #[arg(short = 't', long, short_alias = 'l')]
        test: bool,

        /// Overwrite existing files
        #[arg(short = 'o', long)]
        overwrite: bool,

        /// Password to decrypt the archive
        #[arg(short = 'p', long)]
        password: Option<String>,

        /// Write streams as files, replacing ':' with this text
        #[arg(short = 'f', long)]
        stream_separator: Option<String>,

        /// Archive to extract
        archive: PathBuf,

        /// Directory to extract to, default is current
        dest: Option<PathBuf>,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

fn main() {
    // Set up Ctrl+C handler
    ctrlc::set_handler(move || {
        eprintln!("\nInterrupted");
        std::process::exit(exit_codes::USER_INTERRUPT);
    })
    .ok();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = match Cli::try_parse_from(args::translate_args(std::env::args_os())) {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            let code = if e.use_stderr() {
                ExitCode::BadArgs
            } else {
                ExitCode::Success
            };
            std::process::exit(code.code());
        }
    };

    let exit_code = match cli.command {
        None => match cli.dir {
            Some(dir) => commands::list(Some(&dir), false),
            None => {
                commands::short_help();
                commands::list(None, false)
            }
        },

        Some(Commands::Dir { dir }) => commands::list(dir.as_deref(), true),

        Some(Commands::Copy { src, dest }) => commands::copy(&src, &dest),

        Some(Commands::Type { src }) => commands::type_stream(&src),

        Some(Commands::Echo { dest }) => commands::echo(&dest),

        Some(Commands::Del { src }) => commands::delete(&src),

        Some(Commands::Tar {
            test,
            block_size,
            password,
            exclude,
            archive,
            items,
        }) => commands::tar(&commands::TarConfig {
            archive: archive.as_deref(),
            items: &items,
            test,
            block_size: block_size.as_deref(),
            password: password.as_deref(),
            exclude: &exclude,
        }),

        Some(Commands::Untar {
            test,
            overwrite,
            password,
            stream_separator,
            archive,
            dest,
        }) => commands::untar(&commands::UntarConfig {
            archive: &archive,
            dest: dest.as_deref(),
            test,
            overwrite,
            password: password.as_deref(),
            stream_separator: stream_separator.as_deref(),
        }),

        Some(Commands::Completions { shell }) => {
            let mut cmd = Cli::command();
            let name = cmd.get_name().to_string();
            generate(shell, &mut cmd, name, &mut std::io::stdout());
            ExitCode::Success
        }
    };

    std::process::exit(exit_code.code());
}
