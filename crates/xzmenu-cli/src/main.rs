//! xzmenu - interactive menu for `.tar.xz` archives
//!
//! Offers four operations in a loop: compress a file, compress a directory,
//! and decompress an archive (listed twice, for files and directories). The
//! actual work lives in `xzmenu-core`; this binary only sets up logging and
//! configuration and talks to the user.

use anyhow::Result;
use clap::Parser;
use std::io::{self, IsTerminal};
use std::path::PathBuf;
use std::process;
use tracing::info;
use tracing_subscriber::EnvFilter;
use xzmenu_core::{create_compressor, Backend, Config, Pipeline};

mod menu;
mod prompt;

use menu::Menu;
use prompt::{LinePrompter, TermPrompter};

/// xzmenu - pack files and directories into .tar.xz archives and back
///
/// Operations are chosen from the interactive menu; the flags below only
/// control how compression is done and how much gets logged.
#[derive(Parser)]
#[command(name = "xzmenu")]
#[command(author, version, about = "Interactive menu for packing files and directories into .tar.xz archives", long_about = None)]
struct Cli {
    /// Path to the xz binary to run
    #[arg(long, env = "XZMENU_XZ", value_name = "PATH")]
    xz: Option<PathBuf>,

    /// Compress with the built-in liblzma instead of running xz
    #[arg(long)]
    builtin: bool,

    /// Read configuration from this file instead of the default location
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Enable verbose output for debugging
    #[arg(short, long)]
    verbose: bool,

    /// Suppress log output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

fn setup_logging(verbose: bool, quiet: bool) {
    if quiet {
        return;
    }

    // Logs would interleave with the menu, so only warnings by default.
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_log_level(verbose)));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_writer(std::io::stderr)
        .init();
}

fn default_log_level(verbose: bool) -> &'static str {
    if verbose {
        "debug"
    } else {
        "warn"
    }
}

/// dialoguer reads keys from stdin but draws on stderr, so it needs both.
fn use_term_prompter(stdin_is_terminal: bool, stderr_is_terminal: bool) -> bool {
    stdin_is_terminal && stderr_is_terminal
}

fn main() {
    match run() {
        Ok(()) => process::exit(0),
        Err(e) => {
            eprintln!("Error: {:#}", e);
            process::exit(map_error_to_exit_code(&e));
        }
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    let mut config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    if let Some(xz) = cli.xz {
        config.compressor.binary = Some(xz);
    }
    if cli.builtin {
        config.compressor.backend = Backend::Builtin;
    }

    let compressor = create_compressor(&config.compressor);
    info!("Using compressor: {}", compressor.name());
    let pipeline = Pipeline::new(compressor.as_ref());

    let show_progress = !cli.quiet && io::stderr().is_terminal();

    if use_term_prompter(io::stdin().is_terminal(), io::stderr().is_terminal()) {
        Menu::new(TermPrompter::new(), pipeline)
            .show_progress(show_progress)
            .run()?;
    } else {
        let prompter = LinePrompter::new(io::stdin().lock(), io::stdout());
        Menu::new(prompter, pipeline)
            .show_progress(show_progress)
            .run()?;
    }

    Ok(())
}

/// Map errors that escape the menu to exit codes:
/// - 0: Success
/// - 1: Configuration or other startup error
/// - 2: Terminal I/O error
fn map_error_to_exit_code(err: &anyhow::Error) -> i32 {
    if let Some(core_err) = err.downcast_ref::<xzmenu_core::Error>() {
        match core_err {
            xzmenu_core::Error::Io(_) => 2,
            _ => 1,
        }
    } else if err.is::<io::Error>() {
        2
    } else {
        1
    }
}
