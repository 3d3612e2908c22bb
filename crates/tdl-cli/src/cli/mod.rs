//! CLI for the TDL trailer downloader.

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use clap_complete::Shell;
use std::path::PathBuf;
use tdl_core::config::{self, FetchBackend};

use commands::{run_collect, run_completions, run_download, run_man, DownloadArgs};

/// Top-level CLI for TDL.
#[derive(Debug, Parser)]
#[command(name = "tdl")]
#[command(about = "TDL: resilient batch downloader for movie trailers", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: CliCommand,
}

/// Backend choice on the command line (mirrors the config value).
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum BackendArg {
    Ytdlp,
    Curl,
}

impl From<BackendArg> for FetchBackend {
    fn from(b: BackendArg) -> Self {
        match b {
            BackendArg::Ytdlp => FetchBackend::Ytdlp,
            BackendArg::Curl => FetchBackend::Curl,
        }
    }
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Download every trailer listed in a CSV work list.
    Download {
        /// CSV with a header row (label and URL columns).
        #[arg(default_value = "movie_trailers.csv")]
        csv: PathBuf,
        /// Folder to write downloads into (overrides config).
        #[arg(long, short = 'o', value_name = "DIR")]
        output: Option<PathBuf>,
        /// Fetch backend (overrides config).
        #[arg(long, value_enum)]
        backend: Option<BackendArg>,
        /// Retries per item after the first attempt (overrides config).
        #[arg(long, value_name = "N")]
        max_retries: Option<u32>,
        /// Per-attempt timeout in seconds (overrides config).
        #[arg(long, value_name = "SECS")]
        timeout: Option<u64>,
        /// Write a JSON report of every item to this path.
        #[arg(long, value_name = "PATH")]
        report: Option<PathBuf>,
    },

    /// Scan channel listings for official trailers and write a CSV work list.
    Collect {
        /// Channel URLs (e.g. https://www.youtube.com/@paramountpictures).
        #[arg(required = true)]
        channels: Vec<String>,
        /// Maximum new trailers taken from each channel.
        #[arg(long, default_value = "10000", value_name = "N")]
        limit: usize,
        /// Output CSV path.
        #[arg(long, default_value = "movie_trailers.csv", value_name = "PATH")]
        out: PathBuf,
    },

    /// Print shell completions to stdout.
    Completions {
        /// Target shell.
        #[arg(value_enum)]
        shell: Shell,
    },

    /// Print the roff man page to stdout.
    Man,
}

impl CliCommand {
    pub fn run_from_args() -> Result<()> {
        let cli = Cli::parse();

        match cli.command {
            CliCommand::Download {
                csv,
                output,
                backend,
                max_retries,
                timeout,
                report,
            } => {
                let cfg = config::load_or_init()?;
                tracing::debug!("loaded config: {:?}", cfg);
                let args = DownloadArgs {
                    csv,
                    output,
                    backend: backend.map(Into::into),
                    max_retries,
                    timeout,
                    report,
                };
                run_download(cfg, &args)?;
            }
            CliCommand::Collect {
                channels,
                limit,
                out,
            } => {
                let cfg = config::load_or_init()?;
                run_collect(&cfg, &channels, limit, &out)?;
            }
            CliCommand::Completions { shell } => run_completions(shell),
            CliCommand::Man => run_man()?,
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests;
