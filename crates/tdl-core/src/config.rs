use anyhow::{ensure, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::input::Columns;
use crate::retry::{duration_from_secs_f64, PoliteDelay, RetryPolicy};

/// Retry policy parameters (optional section in config.toml).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Retries allowed after the first attempt.
    pub max_retries: u32,
    /// Base delay in seconds for exponential backoff.
    pub base_delay_secs: f64,
    /// Optional cap on a single backoff delay in seconds.
    #[serde(default)]
    pub max_delay_secs: Option<f64>,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay_secs: 1.0,
            max_delay_secs: None,
        }
    }
}

impl RetryConfig {
    pub fn to_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_retries: self.max_retries,
            base_delay: duration_from_secs_f64(self.base_delay_secs),
            max_delay: self.max_delay_secs.map(duration_from_secs_f64),
        }
    }
}

/// Degraded settings used for the single attempt after access is denied.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FallbackConfig {
    /// yt-dlp format selector for the degraded attempt.
    pub format: String,
    /// Alternate YouTube player client passed via `--extractor-args`.
    pub player_client: String,
    /// User-Agent sent by the curl backend on the degraded attempt.
    pub user_agent: String,
}

impl Default for FallbackConfig {
    fn default() -> Self {
        Self {
            format: "best[height<=480]/worst".to_string(),
            player_client: "android".to_string(),
            user_agent: "Mozilla/5.0 (Linux; Android 14) AppleWebKit/537.36 (KHTML, like Gecko) Mobile Safari/537.36".to_string(),
        }
    }
}

/// Download backend: yt-dlp child process (video pages) or libcurl (direct file URLs).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FetchBackend {
    #[default]
    Ytdlp,
    Curl,
}

/// Global configuration loaded from `~/.config/tdl/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TdlConfig {
    /// Folder downloads are written into.
    pub output_dir: PathBuf,
    /// Which fetch backend to use.
    #[serde(default)]
    pub fetch_backend: FetchBackend,
    /// yt-dlp executable (name on PATH or absolute path).
    pub ytdlp_path: String,
    /// Per-attempt wall-clock timeout in seconds.
    pub timeout_secs: u64,
    /// Lower bound of the pause after a successful item, in seconds.
    pub pause_min_secs: f64,
    /// Upper bound of the pause after a successful item, in seconds.
    pub pause_max_secs: f64,
    /// CSV header holding the item label.
    pub label_column: String,
    /// CSV header holding the source URL.
    pub url_column: String,
    /// Optional retry policy; if missing, built-in defaults are used.
    #[serde(default)]
    pub retry: Option<RetryConfig>,
    /// Optional fallback settings; if missing, built-in defaults are used.
    #[serde(default)]
    pub fallback: Option<FallbackConfig>,
}

impl Default for TdlConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("trailers"),
            fetch_backend: FetchBackend::Ytdlp,
            ytdlp_path: "yt-dlp".to_string(),
            timeout_secs: 300,
            pause_min_secs: 1.0,
            pause_max_secs: 3.0,
            label_column: "Movie Title".to_string(),
            url_column: "YouTube Link".to_string(),
            retry: None,
            fallback: None,
        }
    }
}

impl TdlConfig {
    pub fn retry_policy(&self) -> RetryPolicy {
        self.retry.clone().unwrap_or_default().to_policy()
    }

    pub fn fallback(&self) -> FallbackConfig {
        self.fallback.clone().unwrap_or_default()
    }

    pub fn attempt_timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.max(1))
    }

    pub fn polite_delay(&self) -> PoliteDelay {
        PoliteDelay::from_secs_f64(self.pause_min_secs, self.pause_max_secs)
    }

    pub fn columns(&self) -> Columns {
        Columns {
            label: self.label_column.clone(),
            url: self.url_column.clone(),
        }
    }

    /// Rejects second values that are negative, NaN, infinite or too large
    /// to be a `Duration`.
    pub fn validate(&self) -> Result<()> {
        let retry = self.retry.clone().unwrap_or_default();
        check_secs("retry.base_delay_secs", retry.base_delay_secs)?;
        if let Some(max) = retry.max_delay_secs {
            check_secs("retry.max_delay_secs", max)?;
        }
        check_secs("pause_min_secs", self.pause_min_secs)?;
        check_secs("pause_max_secs", self.pause_max_secs)?;
        Ok(())
    }
}

fn check_secs(field: &str, value: f64) -> Result<()> {
    ensure!(
        value.is_finite() && value >= 0.0 && Duration::try_from_secs_f64(value).is_ok(),
        "{} must be a non-negative number of seconds, got {}",
        field,
        value
    );
    Ok(())
}

/// Parses and validates config file contents; `path` is only used in errors.
pub fn parse_config(data: &str, path: &Path) -> Result<TdlConfig> {
    let cfg: TdlConfig =
        toml::from_str(data).with_context(|| format!("parse {}", path.display()))?;
    cfg.validate()
        .with_context(|| format!("invalid config {}", path.display()))?;
    Ok(cfg)
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("tdl")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<TdlConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = TdlConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    let data = fs::read_to_string(&path).with_context(|| format!("read {}", path.display()))?;
    parse_config(&data, &path)
}
