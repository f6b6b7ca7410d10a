use std::path::Path;

/// Extract filename from a file path
///
/// Returns the filename component of a path, or "Unknown" if it can't be extracted.
pub fn extract_filename(path: &Path) -> String {
    path.file_name()
        .and_then(|n| n.to_str())
        .filter(|s| !s.is_empty() && *s != ".")
        .map(|s| s.to_string())
        .unwrap_or_else(|| "Unknown".to_string())
}

/// Convert a character offset into a byte offset.
///
/// `char_pos == char count` maps to `text.len()`. Returns None past the end.
pub fn char_to_byte(text: &str, char_pos: usize) -> Option<usize> {
    if char_pos == 0 {
        return Some(0);
    }
    match text.char_indices().nth(char_pos) {
        Some((byte, _)) => Some(byte),
        None if text.chars().count() == char_pos => Some(text.len()),
        None => None,
    }
}

/// 1-based line and 0-based column of a character offset, as shown in the status bar.
pub fn line_and_column(text: &str, char_pos: usize) -> (usize, usize) {
    let mut line = 1;
    let mut column = 0;
    for ch in text.chars().take(char_pos) {
        if ch == '\n' {
            line += 1;
            column = 0;
        } else {
            column += 1;
        }
    }
    (line, column)
}
