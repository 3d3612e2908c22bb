//! File extension extraction from URL path.

/// Extracts the extension of the last path segment of a URL, lowercased.
///
/// Returns `None` if the URL cannot be parsed, the path is empty/root, or the
/// segment has no usable extension.
pub fn extension_from_url_path(url: &str) -> Option<String> {
    let parsed = url::Url::parse(url).ok()?;
    let segment = parsed.path().split('/').filter(|s| !s.is_empty()).last()?;
    let (stem, ext) = segment.rsplit_once('.')?;
    if stem.is_empty() || ext.is_empty() || ext.len() > 5 {
        return None;
    }
    if !ext.chars().all(|c| c.is_ascii_alphanumeric()) {
        return None;
    }
    Some(ext.to_ascii_lowercase())
}
