//! Direct-file backend over libcurl.
//!
//! Streams the body to `<stem>.<ext>.part` and renames on success, so an
//! interrupted attempt never leaves a file that looks complete.

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use super::{FetchOptions, FetchProfile, Fetcher};
use crate::config::{FallbackConfig, TdlConfig};
use crate::retry::FetchError;
use crate::url_model::{extension_from_url_path, DEFAULT_EXTENSION};

const PRIMARY_USER_AGENT: &str = concat!("tdl/", env!("CARGO_PKG_VERSION"));

/// Fetches direct HTTP(S) URLs with one blocking curl transfer per attempt.
#[derive(Debug, Clone)]
pub struct CurlFetcher {
    fallback_user_agent: String,
    connect_timeout: Duration,
}

impl CurlFetcher {
    pub fn new(fallback: &FallbackConfig) -> Self {
        Self {
            fallback_user_agent: fallback.user_agent.clone(),
            connect_timeout: Duration::from_secs(30),
        }
    }

    pub fn from_config(cfg: &TdlConfig) -> Self {
        Self::new(&cfg.fallback())
    }

    fn user_agent(&self, profile: FetchProfile) -> &str {
        match profile {
            FetchProfile::Primary => PRIMARY_USER_AGENT,
            FetchProfile::Degraded => &self.fallback_user_agent,
        }
    }
}

/// Final path for a direct download: stem plus the URL's extension.
pub(crate) fn target_path(stem: &Path, url: &str) -> PathBuf {
    let ext = extension_from_url_path(url).unwrap_or_else(|| DEFAULT_EXTENSION.to_string());
    let mut name = stem.as_os_str().to_owned();
    name.push(".");
    name.push(ext);
    PathBuf::from(name)
}

fn part_path(target: &Path) -> PathBuf {
    let mut name = target.as_os_str().to_owned();
    name.push(".part");
    PathBuf::from(name)
}

impl Fetcher for CurlFetcher {
    fn fetch(&mut self, url: &str, opts: &FetchOptions) -> Result<(), FetchError> {
        let target = target_path(&opts.output_stem, url);
        let part = part_path(&target);
        let result = transfer(self, url, opts, &part);
        match result {
            Ok(()) => fs::rename(&part, &target).map_err(FetchError::Storage),
            Err(e) => {
                let _ = fs::remove_file(&part);
                Err(e)
            }
        }
    }
}

fn transfer(
    fetcher: &CurlFetcher,
    url: &str,
    opts: &FetchOptions,
    part: &Path,
) -> Result<(), FetchError> {
    let mut file = File::create(part).map_err(FetchError::Storage)?;
    let storage_error: Arc<Mutex<Option<std::io::Error>>> = Arc::new(Mutex::new(None));
    let storage_error_cb = Arc::clone(&storage_error);

    let mut easy = curl::easy::Easy::new();
    easy.url(url)?;
    easy.follow_location(true)?;
    easy.max_redirections(10)?;
    easy.useragent(fetcher.user_agent(opts.profile))?;
    easy.connect_timeout(fetcher.connect_timeout.min(opts.deadline))?;
    easy.timeout(opts.deadline)?;
    // Keep error bodies out of the output; 4xx/5xx surface as curl errors.
    easy.fail_on_error(true)?;

    let perform_result = {
        let mut transfer = easy.transfer();
        transfer.write_function(move |data| match file.write_all(data) {
            Ok(()) => Ok(data.len()),
            Err(e) => {
                if let Ok(mut slot) = storage_error_cb.lock() {
                    slot.replace(e);
                }
                Ok(0) // abort transfer
            }
        })?;
        transfer.perform()
    };

    if let Err(e) = perform_result {
        if e.is_write_error() {
            if let Some(io_err) = storage_error.lock().ok().and_then(|mut s| s.take()) {
                return Err(FetchError::Storage(io_err));
            }
        }
        if e.is_http_returned_error() {
            return Err(FetchError::Http(easy.response_code()?));
        }
        return Err(FetchError::Curl(e));
    }

    let code = easy.response_code()?;
    if !(200..300).contains(&code) {
        return Err(FetchError::Http(code));
    }
    Ok(())
}
