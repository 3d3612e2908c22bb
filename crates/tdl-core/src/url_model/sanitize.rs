//! Linux-safe file stem sanitization for item labels.

/// Bytes reserved for the extension and yt-dlp's intermediate suffixes
/// (e.g. `.f137.mp4.part`).
const SUFFIX_RESERVE: usize = 32;

/// Linux NAME_MAX.
const NAME_MAX: usize = 255;

/// Sanitizes a label for use as a file stem on Linux.
///
/// - NUL, `/`, `\`, control characters and whitespace become `_`
/// - `%` becomes `_` (it would be read as a yt-dlp output template field)
/// - runs of `_` collapse to one
/// - leading/trailing dots, spaces and underscores are trimmed
/// - length is capped so stem plus suffixes fits in NAME_MAX
pub fn sanitize_filename_for_linux(name: &str) -> String {
    let limit = NAME_MAX - SUFFIX_RESERVE;

    let mut out = String::with_capacity(name.len());
    for c in name.chars() {
        let mapped = match c {
            '\0' | '/' | '\\' | '%' => '_',
            c if c.is_control() || c.is_whitespace() => '_',
            c => c,
        };
        if mapped == '_' && out.ends_with('_') {
            continue;
        }
        out.push(mapped);
    }

    let trimmed = out.trim_matches(|c| c == '.' || c == '_');
    let mut take = trimmed.len().min(limit);
    while !trimmed.is_char_boundary(take) {
        take -= 1;
    }
    trimmed[..take].trim_end_matches(['.', '_']).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn removes_slash_and_backslash() {
        assert_eq!(sanitize_filename_for_linux("a/b\\c"), "a_b_c");
    }

    #[test]
    fn trims_dots_and_spaces() {
        assert_eq!(sanitize_filename_for_linux("  ..  Dune  ..  "), "Dune");
    }

    #[test]
    fn collapses_whitespace_runs() {
        assert_eq!(sanitize_filename_for_linux("Inside   Out\t2"), "Inside_Out_2");
    }

    #[test]
    fn escapes_template_percent() {
        assert_eq!(sanitize_filename_for_linux("100% Wolf"), "100_Wolf");
    }

    #[test]
    fn control_chars() {
        assert_eq!(sanitize_filename_for_linux("Nope\x00Movie"), "Nope_Movie");
    }

    #[test]
    fn long_multibyte_label_is_cut_on_char_boundary() {
        let label = "é".repeat(300);
        let out = sanitize_filename_for_linux(&label);
        assert!(out.len() <= NAME_MAX - SUFFIX_RESERVE);
        assert!(out.chars().all(|c| c == 'é'));
    }
}
