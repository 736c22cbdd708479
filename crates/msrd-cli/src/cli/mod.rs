//! CLI for msrd.

mod commands;
mod progress;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use msrd_core::config;
use msrd_core::plan::BatchArgs;
use msrd_core::resolver::Operation;
use std::process::ExitCode;

use commands::{run_batch, run_cache_delete, run_cache_list};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "msrd")]
#[command(about = "Download and convert the Monster Siren Records discography", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: CliCommand,
}

/// Flags shared by `download` and `convert`.
#[derive(Debug, Clone, Args)]
pub struct BatchFlags {
    /// Song IDs to process (format: ID1 ID2 ID3...).
    pub ids: Vec<String>,

    /// Process the entire discography.
    #[arg(short, long)]
    pub all: bool,

    /// Overwrite songs that are already in the library.
    #[arg(short, long)]
    pub force: bool,

    /// Maximum number of songs processed in parallel.
    #[arg(short, long, value_name = "N")]
    pub threads: Option<usize>,

    /// Produce MP3 instead of FLAC; cannot be used with --m4a.
    #[arg(long)]
    pub mp3: bool,

    /// Produce M4A instead of FLAC; cannot be used with --mp3.
    #[arg(long)]
    pub m4a: bool,
}

impl BatchFlags {
    fn into_args(self, allow_download_fallback: bool) -> (BatchArgs, Option<usize>) {
        let args = BatchArgs {
            ids: self.ids,
            all: self.all,
            force: self.force,
            mp3: self.mp3,
            m4a: self.m4a,
            allow_download_fallback,
        };
        (args, self.threads)
    }
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Download songs.
    #[command(arg_required_else_help = true)]
    Download {
        #[command(flatten)]
        batch: BatchFlags,
    },

    /// Convert already downloaded songs.
    #[command(arg_required_else_help = true)]
    Convert {
        #[command(flatten)]
        batch: BatchFlags,

        /// Download the song if its source is not cached.
        #[arg(short, long)]
        download: bool,
    },

    /// Inspect or clean the source cache.
    #[command(subcommand)]
    Cache(CacheCommand),
}

#[derive(Debug, Subcommand)]
pub enum CacheCommand {
    /// List cached source files.
    List,

    /// Delete cached source files matching a filter.
    Delete {
        /// Only these song IDs.
        ids: Vec<String>,

        /// Only files not modified for at least this many days.
        #[arg(long, value_name = "DAYS")]
        older_than: Option<u64>,

        /// Every cached file.
        #[arg(short, long)]
        all: bool,
    },
}

impl CliCommand {
    pub async fn run_from_args() -> Result<ExitCode> {
        let cli = Cli::parse();
        let cfg = config::load_or_init()?;
        tracing::debug!("loaded config: {:?}", cfg);

        match cli.command {
            CliCommand::Download { batch } => {
                let (args, threads) = batch.into_args(false);
                run_batch(&cfg, Operation::Download, args, threads).await
            }
            CliCommand::Convert { batch, download } => {
                let (args, threads) = batch.into_args(download);
                run_batch(&cfg, Operation::Convert, args, threads).await
            }
            CliCommand::Cache(CacheCommand::List) => {
                run_cache_list(&cfg)?;
                Ok(ExitCode::SUCCESS)
            }
            CliCommand::Cache(CacheCommand::Delete {
                ids,
                older_than,
                all,
            }) => {
                run_cache_delete(&cfg, ids, older_than, all)?;
                Ok(ExitCode::SUCCESS)
            }
        }
    }
}

#[cfg(test)]
mod tests;
