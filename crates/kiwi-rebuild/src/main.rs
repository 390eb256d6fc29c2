//! kiwi-rebuild binary.
//!
//! Rebuilds `kiwi.db` from `files/*.csv` and copies it to `public/kiwi.db`
//! for the web app. Paths can be changed in `kiwi.toml` (or the file given
//! with `--config`) and with `KIWI_*` environment variables:
//!
//! ```toml
//! input_dir      = "files"
//! db_path        = "kiwi.db"
//! public_db_path = "public/kiwi.db"
//! ```

use std::{io, path::PathBuf};

use clap::{Parser, Subcommand};
use kiwi_rebuild::Settings;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Rebuild the kiwi database from CSV exports")]
struct Cli {
  /// Path to a TOML configuration file (default: `<root>/kiwi.toml`).
  #[arg(short, long)]
  config: Option<PathBuf>,

  /// Directory that relative paths are resolved against.
  #[arg(short, long, default_value = ".")]
  root: PathBuf,

  #[command(subcommand)]
  command: Option<Command>,
}

#[derive(Subcommand, Default, Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
  /// Recreate the database from the CSV files and publish it (default).
  #[default]
  Rebuild,
  /// Print row counts, schools per type and workshops per organisation of
  /// the current database.
  Stats,
}

impl Cli {
  /// The chosen subcommand; `rebuild` when none is given.
  fn subcommand(&self) -> Command { self.command.unwrap_or_default() }
}

fn main() -> anyhow::Result<()> {
  // Logs go to stderr; stdout carries the report.
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .with_writer(io::stderr)
    .init();

  let cli = Cli::parse();
  let settings = Settings::load(&cli.root, cli.config.as_deref())?;
  let paths = settings.resolve(&cli.root);

  let mut stdout = io::stdout().lock();
  match cli.subcommand() {
    Command::Rebuild => {
      kiwi_rebuild::run(&paths, &mut stdout)?;
    }
    Command::Stats => {
      kiwi_rebuild::stats(&paths.db, &mut stdout)?;
    }
  }
  Ok(())
}
