//! yt-dlp backend: one child process per attempt.

use std::ffi::OsString;
use std::process::Command;

use super::timed::{run_with_deadline, TimedOutcome};
use super::{FetchOptions, FetchProfile, Fetcher};
use crate::config::{FallbackConfig, TdlConfig};
use crate::retry::FetchError;

const PRIMARY_FORMAT: &str = "bestvideo+bestaudio/best";
const MERGE_FORMAT: &str = "mp4";

/// Drives the external `yt-dlp` executable.
#[derive(Debug, Clone)]
pub struct YtDlpFetcher {
    program: String,
    fallback: FallbackConfig,
}

impl YtDlpFetcher {
    pub fn new(program: impl Into<String>, fallback: FallbackConfig) -> Self {
        Self {
            program: program.into(),
            fallback,
        }
    }

    pub fn from_config(cfg: &TdlConfig) -> Self {
        Self::new(cfg.ytdlp_path.clone(), cfg.fallback())
    }

    /// Argument list for one attempt (without the program name).
    pub fn build_args(&self, url: &str, opts: &FetchOptions) -> Vec<OsString> {
        let mut template = opts.output_stem.clone().into_os_string();
        template.push(".%(ext)s");

        let mut args: Vec<OsString> = vec![
            "--no-progress".into(),
            "--quiet".into(),
            "--no-warnings".into(),
            "--no-playlist".into(),
            "-o".into(),
            template,
            "--merge-output-format".into(),
            MERGE_FORMAT.into(),
        ];
        match opts.profile {
            FetchProfile::Primary => {
                args.push("-f".into());
                args.push(PRIMARY_FORMAT.into());
            }
            FetchProfile::Degraded => {
                args.push("-f".into());
                args.push(self.fallback.format.clone().into());
                args.push("--extractor-args".into());
                args.push(format!("youtube:player_client={}", self.fallback.player_client).into());
            }
        }
        args.push("--".into());
        args.push(url.into());
        args
    }
}

impl Fetcher for YtDlpFetcher {
    fn fetch(&mut self, url: &str, opts: &FetchOptions) -> Result<(), FetchError> {
        let mut cmd = Command::new(&self.program);
        cmd.args(self.build_args(url, opts));
        tracing::debug!(url, profile = ?opts.profile, "spawning {}", self.program);

        match run_with_deadline(&mut cmd, opts.deadline, false).map_err(FetchError::Spawn)? {
            TimedOutcome::Exited { status, stderr, .. } if status.success() => {
                if !stderr.is_empty() {
                    tracing::debug!(url, "yt-dlp stderr: {}", stderr);
                }
                Ok(())
            }
            TimedOutcome::Exited { status, stderr, .. } => Err(FetchError::Process {
                code: status.code(),
                stderr,
            }),
            TimedOutcome::TimedOut { elapsed } => Err(FetchError::Timeout(elapsed)),
        }
    }
}
