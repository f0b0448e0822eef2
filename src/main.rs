//! renamer - copy the files of a folder into another folder under new names.
//!
//! Usage:
//!   renamer                          Start with the folders used last time
//!   renamer -i IN -o OUT             Select folders and start
//!   renamer -i IN -o OUT -n FILE     Also assign new names from FILE, one per line
//!   renamer --help                   Show help

mod display;
mod shell;

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use color_eyre::eyre::{Context, Result};
use tracing_subscriber::EnvFilter;

use renamer_core::{Session, Settings};
use renamer_ops::{EngineConfig, RenameEngine};

use crate::shell::Shell;

#[derive(Parser)]
#[command(
    name = "renamer",
    version,
    about = "Batch-copy files under new names",
    long_about = "renamer lists the files of an input folder, lets you assign each one \
                  a new name and copies them into an output folder under those names.\n\n\
                  The originals are never modified. The folders are remembered for the \
                  next start."
)]
struct Cli {
    /// Input folder
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Output folder (created if missing)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Text file with one new name per line, assigned in listing order
    #[arg(short, long)]
    names: Option<PathBuf>,

    /// Don't ask for confirmation when some files have no new name
    #[arg(short, long)]
    yes: bool,

    /// Pause between files, in milliseconds
    #[arg(long, default_value = "0")]
    delay: u64,
}

fn main() -> Result<()> {
    color_eyre::install()?;
    init_tracing();

    let cli = Cli::parse();

    let mut session = Session::from_settings(&Settings::load());
    if let Some(input) = cli.input {
        let input = input.canonicalize().context("Invalid input folder")?;
        session.set_input_dir(input);
    }
    if let Some(output) = cli.output {
        session.set_output_dir(output);
    }
    if let Err(e) = session.settings().save() {
        tracing::warn!("Failed to save settings: {}", e);
    }

    if session.input_dir().is_some() {
        session.load_files().context("Failed to list input folder")?;
    }

    if let Some(names) = cli.names {
        let text = std::fs::read_to_string(&names)
            .with_context(|| format!("Failed to read {}", names.display()))?;
        let count = session
            .paste_names(0, &text)
            .context("Failed to assign names")?;
        eprintln!("Assigned {} names from {}", count, names.display());
    }

    let config = EngineConfig::builder()
        .item_delay(Duration::from_millis(cli.delay))
        .build()?;
    let engine = RenameEngine::new(config);

    let rt = tokio::runtime::Runtime::new()?;
    let result = rt.block_on(Shell::new(session, engine, cli.yes).run());
    // Stdin is read on a blocking thread that can't be interrupted.
    rt.shutdown_timeout(Duration::from_millis(100));
    result
}

/// Log to stderr; `RUST_LOG` overrides the default `warn` level.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
