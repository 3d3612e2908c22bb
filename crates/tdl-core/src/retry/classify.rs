//! Classify HTTP status, curl errors and downloader output into retry error kinds.

use super::error::FetchError;
use super::policy::ErrorKind;

/// Classify an HTTP status code for retry decisions.
pub fn classify_http_status(code: u32) -> ErrorKind {
    match code {
        401 | 403 => ErrorKind::AccessRestricted,
        404 | 410 => ErrorKind::Unavailable,
        429 => ErrorKind::Throttled,
        500..=599 => ErrorKind::Server(code as u16),
        _ => ErrorKind::Other,
    }
}

/// Classify a curl error for retry decisions.
pub fn classify_curl_error(e: &curl::Error) -> ErrorKind {
    if e.is_operation_timedout() {
        return ErrorKind::Timeout;
    }
    if e.is_couldnt_connect()
        || e.is_couldnt_resolve_host()
        || e.is_couldnt_resolve_proxy()
        || e.is_read_error()
        || e.is_recv_error()
        || e.is_send_error()
        || e.is_got_nothing()
        || e.is_partial_file()
    {
        return ErrorKind::Connection;
    }
    ErrorKind::Other
}

const RESTRICTED_MARKERS: &[&str] = &[
    "http error 401",
    "http error 403",
    "forbidden",
    "sign in to confirm",
    "age-restricted",
    "inappropriate for some users",
    "members-only",
];

const UNAVAILABLE_MARKERS: &[&str] = &[
    "video unavailable",
    "private video",
    "has been removed",
    "this video is not available",
    "http error 404",
    "http error 410",
    "unsupported url",
];

const CONNECTION_MARKERS: &[&str] = &[
    "connection reset",
    "connection refused",
    "connection aborted",
    "name or service not known",
    "temporary failure in name resolution",
    "network is unreachable",
    "incompleteread",
];

/// Classify free-form downloader output (stderr) for retry decisions.
///
/// Restricted markers win over unavailable ones because a 403 is often
/// followed by a generic "not available" line.
pub fn classify_downloader_message(message: &str) -> ErrorKind {
    let m = message.to_ascii_lowercase();
    if RESTRICTED_MARKERS.iter().any(|p| m.contains(p)) {
        return ErrorKind::AccessRestricted;
    }
    if m.contains("http error 429") || m.contains("too many requests") {
        return ErrorKind::Throttled;
    }
    if let Some(code) = http_error_code(&m) {
        if (500..=599).contains(&code) {
            return ErrorKind::Server(code as u16);
        }
    }
    if UNAVAILABLE_MARKERS.iter().any(|p| m.contains(p)) {
        return ErrorKind::Unavailable;
    }
    if m.contains("timed out") {
        return ErrorKind::Timeout;
    }
    if CONNECTION_MARKERS.iter().any(|p| m.contains(p)) {
        return ErrorKind::Connection;
    }
    ErrorKind::Other
}

/// Extracts `NNN` from the first "http error NNN" in already-lowercased text.
fn http_error_code(lower: &str) -> Option<u32> {
    let idx = lower.find("http error ")?;
    let digits: String = lower[idx + "http error ".len()..]
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect();
    digits.parse().ok()
}

/// Classify a fetch error into an ErrorKind.
pub fn classify(e: &FetchError) -> ErrorKind {
    match e {
        FetchError::Curl(ce) => classify_curl_error(ce),
        FetchError::Http(code) => classify_http_status(*code),
        FetchError::Timeout(_) => ErrorKind::Timeout,
        FetchError::Process { stderr, .. } => classify_downloader_message(stderr),
        FetchError::Spawn(_) | FetchError::Storage(_) => ErrorKind::Other,
    }
}
