//! Literal, case-sensitive search over a document's text.
//!
//! Positions are character offsets. Every call is independent: "find next"
//! works by passing the end of the previous match back in as `from`.

use crate::app::domain::Document;
use crate::app::infrastructure::error::{AppError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    #[default]
    Forward,
    Backward,
}

/// A match as a half-open character range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Match {
    pub start: usize,
    pub end: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FindResult {
    /// Every match, starting with the next one in the search direction.
    pub matches: Vec<Match>,
    /// The first match was only reached by wrapping around the text.
    pub wrapped: bool,
}

impl FindResult {
    pub fn first(&self) -> Option<Match> {
        self.matches.first().copied()
    }
}

pub fn find(document: &Document, query: &str, from: usize, direction: Direction) -> Result<FindResult> {
    find_in_text(document.text(), query, from, direction)
}

pub fn find_in_text(text: &str, query: &str, from: usize, direction: Direction) -> Result<FindResult> {
    if query.is_empty() {
        return Err(AppError::EmptyQuery);
    }
    let len = text.chars().count();
    if from > len {
        return Err(AppError::InvalidPosition { position: from, len });
    }

    let all = find_all(text, query);
    if all.is_empty() {
        return Err(AppError::NotFound(query.to_string()));
    }

    let (matches, wrapped) = match direction {
        Direction::Forward => {
            let split = all.iter().position(|m| m.start >= from).unwrap_or(all.len());
            let wrapped = split == all.len();
            let mut ordered = all[split..].to_vec();
            ordered.extend_from_slice(&all[..split]);
            (ordered, wrapped)
        }
        Direction::Backward => match all.iter().rposition(|m| m.end <= from) {
            Some(last) => {
                let mut ordered: Vec<Match> = all[..=last].iter().rev().copied().collect();
                ordered.extend(all[last + 1..].iter().rev());
                (ordered, false)
            }
            None => (all.iter().rev().copied().collect(), true),
        },
    };

    Ok(FindResult { matches, wrapped })
}

/// All occurrences in document order, overlapping ones included.
pub fn find_all(text: &str, query: &str) -> Vec<Match> {
    if query.is_empty() {
        return Vec::new();
    }
    let query_len = query.chars().count();
    text.char_indices()
        .enumerate()
        .filter(|(_, (byte, _))| text[*byte..].starts_with(query))
        .map(|(start, _)| Match {
            start,
            end: start + query_len,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn starts(result: &FindResult) -> Vec<usize> {
        result.matches.iter().map(|m| m.start).collect()
    }

    #[test]
    fn test_find_next_sequence_wraps() {
        let text = "hello world hello";

        let first = find_in_text(text, "hello", 0, Direction::Forward).unwrap();
        assert_eq!(first.first(), Some(Match { start: 0, end: 5 }));
        assert!(!first.wrapped);

        let second = find_in_text(text, "hello", 1, Direction::Forward).unwrap();
        assert_eq!(second.first().unwrap().start, 12);
        assert_eq!(starts(&second), vec![12, 0]);

        let third = find_in_text(text, "hello", 13, Direction::Forward).unwrap();
        assert_eq!(third.first().unwrap().start, 0);
        assert!(third.wrapped);
    }

    #[test]
    fn test_find_from_end_of_text() {
        let text = "cat dog cat";
        let result = find_in_text(text, "cat", text.len(), Direction::Forward).unwrap();
        assert_eq!(result.first().unwrap().start, 0);
        assert!(result.wrapped);
    }

    #[test]
    fn test_find_backward() {
        let text = "cat dog cat mouse cat";
        let result = find_in_text(text, "cat", text.len(), Direction::Backward).unwrap();
        assert_eq!(starts(&result), vec![18, 8, 0]);
        assert!(!result.wrapped);

        let result = find_in_text(text, "cat", 18, Direction::Backward).unwrap();
        assert_eq!(starts(&result), vec![8, 0, 18]);
    }

    #[test]
    fn test_find_backward_wraps() {
        let text = "cat dog cat";
        let result = find_in_text(text, "cat", 2, Direction::Backward).unwrap();
        assert_eq!(starts(&result), vec![8, 0]);
        assert!(result.wrapped);
    }

    #[test]
    fn test_find_is_case_sensitive() {
        let text = "Hello hello";
        let result = find_in_text(text, "Hello", 1, Direction::Forward).unwrap();
        assert_eq!(starts(&result), vec![0]);
        assert!(result.wrapped);
    }

    #[test]
    fn test_find_not_found() {
        let err = find_in_text("hello world", "rust", 0, Direction::Forward).unwrap_err();
        assert!(matches!(err, AppError::NotFound(ref q) if q == "rust"));
    }

    #[test]
    fn test_find_empty_query() {
        assert!(matches!(
            find_in_text("hello", "", 0, Direction::Forward),
            Err(AppError::EmptyQuery)
        ));
        assert!(find_all("hello", "").is_empty());
    }

    #[test]
    fn test_find_position_out_of_bounds() {
        let err = find_in_text("hello", "l", 6, Direction::Forward).unwrap_err();
        assert!(matches!(err, AppError::InvalidPosition { position: 6, len: 5 }));
    }

    #[test]
    fn test_find_all_overlapping() {
        let all = find_all("aaaa", "aa");
        assert_eq!(
            all,
            vec![
                Match { start: 0, end: 2 },
                Match { start: 1, end: 3 },
                Match { start: 2, end: 4 }
            ]
        );
    }

    #[test]
    fn test_find_unicode_positions_are_chars() {
        let text = "Hello 世界 world 世界";
        let result = find_in_text(text, "世界", 7, Direction::Forward).unwrap();
        assert_eq!(result.first(), Some(Match { start: 15, end: 17 }));
    }

    #[test]
    fn test_find_in_document() {
        let doc = Document::new_from_file("notes.txt", "one two one");
        let result = find(&doc, "one", 1, Direction::Forward).unwrap();
        assert_eq!(result.first().unwrap().start, 8);
    }
}
