use std::path::{Path, PathBuf};

use crate::app::infrastructure::error::{AppError, Result};
use crate::app::services::text_ops::{char_to_byte, extract_filename};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditKind {
    Insert,
    Delete,
    Replace,
}

/// One reversible change: `old` was replaced by `new` at character `position`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditRecord {
    pub kind: EditKind,
    pub position: usize,
    pub old: String,
    pub new: String,
}

impl EditRecord {
    pub fn new(kind: EditKind, position: usize, old: impl Into<String>, new: impl Into<String>) -> Self {
        Self {
            kind,
            position,
            old: old.into(),
            new: new.into(),
        }
    }

    pub fn insert(position: usize, text: impl Into<String>) -> Self {
        Self::new(EditKind::Insert, position, String::new(), text)
    }

    pub fn delete(position: usize, old: impl Into<String>) -> Self {
        Self::new(EditKind::Delete, position, old, String::new())
    }

    pub fn replace(position: usize, old: impl Into<String>, new: impl Into<String>) -> Self {
        Self::new(EditKind::Replace, position, old, new)
    }

    /// Character offset just past the inserted text
    pub fn end_after(&self) -> usize {
        self.position + self.new.chars().count()
    }

    /// Character offset just past the removed text, once the edit is undone
    pub fn end_before(&self) -> usize {
        self.position + self.old.chars().count()
    }

    fn validate(&self) -> Result<()> {
        let problem = match self.kind {
            EditKind::Insert if !self.old.is_empty() => "insert must not remove text",
            EditKind::Insert if self.new.is_empty() => "insert needs text to insert",
            EditKind::Delete if !self.new.is_empty() => "delete must not insert text",
            EditKind::Delete if self.old.is_empty() => "delete needs text to remove",
            EditKind::Replace if self.old.is_empty() => "replace needs text to remove",
            _ => return Ok(()),
        };
        Err(AppError::MalformedEdit(problem.to_string()))
    }
}

/// A single window's text plus its undo history.
///
/// Dirty state is derived from the undo depth recorded at the last save
/// (the checkpoint), so undoing back to the saved point reads as clean again.
#[derive(Debug, Default)]
pub struct Document {
    text: String,
    file_path: Option<PathBuf>,
    undo_stack: Vec<EditRecord>,
    redo_stack: Vec<EditRecord>,
    /// Undo depth of the saved text. `None` once that state can no longer be reached.
    checkpoint: Option<usize>,
}

impl Document {
    pub fn new_untitled() -> Self {
        Self {
            checkpoint: Some(0),
            ..Self::default()
        }
    }

    pub fn new_from_file(path: impl Into<PathBuf>, content: impl Into<String>) -> Self {
        Self {
            text: content.into(),
            file_path: Some(path.into()),
            checkpoint: Some(0),
            ..Self::default()
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }

    pub fn file_path(&self) -> Option<&Path> {
        self.file_path.as_deref()
    }

    pub fn set_file_path(&mut self, path: impl Into<PathBuf>) {
        self.file_path = Some(path.into());
    }

    pub fn display_name(&self) -> String {
        match &self.file_path {
            Some(path) => extract_filename(path),
            None => "Untitled".to_string(),
        }
    }

    pub fn is_dirty(&self) -> bool {
        self.checkpoint != Some(self.undo_stack.len())
    }

    pub fn mark_saved(&mut self) {
        self.checkpoint = Some(self.undo_stack.len());
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn undo_depth(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn redo_depth(&self) -> usize {
        self.redo_stack.len()
    }

    /// Back to an empty, clean, untitled document (File > New).
    pub fn reset(&mut self) {
        *self = Self::new_untitled();
    }

    /// Apply an edit described by its kind and contents.
    ///
    /// `old` must be the text currently at `position`. A rejected edit leaves
    /// the document untouched.
    pub fn apply_edit(&mut self, kind: EditKind, position: usize, old: &str, new: &str) -> Result<()> {
        self.apply(EditRecord::new(kind, position, old, new))
    }

    pub fn apply(&mut self, record: EditRecord) -> Result<()> {
        record.validate()?;
        self.splice(record.position, &record.old, &record.new)?;

        // The saved state lived on the redo branch that is about to be dropped.
        if self.checkpoint.is_some_and(|depth| depth > self.undo_stack.len()) {
            self.checkpoint = None;
        }
        self.redo_stack.clear();
        self.undo_stack.push(record);
        Ok(())
    }

    /// Revert the most recent edit. Returns the reverted record.
    pub fn undo(&mut self) -> Result<EditRecord> {
        let record = self.undo_stack.pop().ok_or(AppError::NothingToUndo)?;
        if let Err(e) = self.splice(record.position, &record.new, &record.old) {
            self.undo_stack.push(record);
            return Err(e);
        }
        self.redo_stack.push(record.clone());
        Ok(record)
    }

    /// Re-apply the most recently undone edit. Returns the re-applied record.
    pub fn redo(&mut self) -> Result<EditRecord> {
        let record = self.redo_stack.pop().ok_or(AppError::NothingToRedo)?;
        if let Err(e) = self.splice(record.position, &record.old, &record.new) {
            self.redo_stack.push(record);
            return Err(e);
        }
        self.undo_stack.push(record.clone());
        Ok(record)
    }

    /// Replace `old` (which must sit at `position`) with `new`.
    fn splice(&mut self, position: usize, old: &str, new: &str) -> Result<()> {
        let len = self.char_len();
        let start = char_to_byte(&self.text, position).ok_or(AppError::InvalidPosition { position, len })?;
        let old_end = position + old.chars().count();
        let end = char_to_byte(&self.text, old_end).ok_or(AppError::InvalidPosition {
            position: old_end,
            len,
        })?;

        if &self.text[start..end] != old {
            return Err(AppError::ContentMismatch { position });
        }

        self.text.replace_range(start..end, new);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc_with(text: &str) -> Document {
        let mut doc = Document::new_untitled();
        doc.apply_edit(EditKind::Insert, 0, "", text).unwrap();
        doc.mark_saved();
        doc
    }

    /// Deterministic generator so failing sequences can be replayed.
    struct Lcg(u64);

    impl Lcg {
        fn below(&mut self, bound: usize) -> usize {
            self.0 = self
                .0
                .wrapping_mul(6364136223846793005)
                .wrapping_add(1442695040888963407);
            ((self.0 >> 33) as usize) % bound.max(1)
        }
    }

    /// A valid insert, delete or replace against `text`.
    fn random_edit(rng: &mut Lcg, text: &str) -> EditRecord {
        const PIECES: [&str; 6] = ["a", "é", "世", "xy", "\n", "zz z"];
        let chars: Vec<char> = text.chars().collect();
        let len = chars.len();
        let piece = PIECES[rng.below(PIECES.len())];
        let kind = if len == 0 { 0 } else { rng.below(3) };
        if kind == 0 {
            return EditRecord::insert(rng.below(len + 1), piece);
        }
        let start = rng.below(len);
        let end = start + 1 + rng.below(len - start);
        let old: String = chars[start..end].iter().collect();
        if kind == 1 {
            EditRecord::delete(start, old)
        } else {
            EditRecord::replace(start, old, piece)
        }
    }

    #[test]
    fn test_new_untitled_is_clean() {
        let doc = Document::new_untitled();
        assert!(!doc.is_dirty());
        assert_eq!(doc.text(), "");
        assert_eq!(doc.display_name(), "Untitled");
        assert!(!doc.can_undo());
        assert!(!doc.can_redo());
    }

    #[test]
    fn test_new_from_file() {
        let doc = Document::new_from_file("/tmp/notes.txt", "hello");
        assert!(!doc.is_dirty());
        assert_eq!(doc.text(), "hello");
        assert_eq!(doc.display_name(), "notes.txt");
        assert!(!doc.can_undo());
    }

    #[test]
    fn test_insert_delete_replace() {
        let mut doc = doc_with("hello world");

        doc.apply_edit(EditKind::Replace, 6, "world", "rust").unwrap();
        assert_eq!(doc.text(), "hello rust");

        doc.apply_edit(EditKind::Delete, 0, "hello ", "").unwrap();
        assert_eq!(doc.text(), "rust");

        doc.apply_edit(EditKind::Insert, 4, "", "!").unwrap();
        assert_eq!(doc.text(), "rust!");
        assert!(doc.is_dirty());
    }

    #[test]
    fn test_undo_all_edits_restores_original() {
        let mut doc = Document::new_from_file("a.txt", "The quick fox");
        let edits = [
            EditRecord::insert(13, " jumps"),
            EditRecord::replace(4, "quick", "slow"),
            EditRecord::delete(0, "The "),
            EditRecord::insert(0, "A "),
            EditRecord::replace(2, "slow fox jumps", "世界"),
        ];
        for edit in edits.iter().cloned() {
            doc.apply(edit).unwrap();
        }
        assert_eq!(doc.text(), "A 世界");

        for _ in 0..edits.len() {
            doc.undo().unwrap();
        }
        assert_eq!(doc.text(), "The quick fox");
        assert!(matches!(doc.undo(), Err(AppError::NothingToUndo)));
    }

    #[test]
    fn test_generated_sequences_undo_to_start() {
        let original = "The quick 狐 fox\njumps";
        let mut rng = Lcg(0x5eed);

        for round in 0..200 {
            let mut doc = Document::new_from_file("gen.txt", original);
            let count = 1 + rng.below(24);
            let save_at = rng.below(count + 1);
            let mut saved_text = String::new();

            for depth in 0..=count {
                if depth == save_at {
                    doc.mark_saved();
                    saved_text = doc.text().to_string();
                }
                if depth < count {
                    let edit = random_edit(&mut rng, doc.text());
                    doc.apply(edit).unwrap();
                }
            }
            assert_eq!(doc.is_dirty(), save_at != count, "round {}", round);
            assert_eq!(doc.redo_depth(), 0);

            for depth in (0..count).rev() {
                doc.undo().unwrap();
                assert_eq!(doc.is_dirty(), depth != save_at, "round {}, depth {}", round, depth);
                if depth == save_at {
                    assert_eq!(doc.text(), saved_text, "round {}", round);
                }
            }
            assert_eq!(doc.text(), original, "round {}", round);
            assert_eq!(doc.redo_depth(), count);
            assert!(matches!(doc.undo(), Err(AppError::NothingToUndo)));
        }
    }

    #[test]
    fn test_redo_replays_forward() {
        let mut doc = doc_with("abc");
        doc.apply_edit(EditKind::Insert, 3, "", "def").unwrap();
        doc.undo().unwrap();
        assert_eq!(doc.text(), "abc");

        let record = doc.redo().unwrap();
        assert_eq!(record.end_after(), 6);
        assert_eq!(doc.text(), "abcdef");
        assert!(matches!(doc.redo(), Err(AppError::NothingToRedo)));
    }

    #[test]
    fn test_fresh_edit_clears_redo() {
        let mut doc = doc_with("abc");
        doc.apply_edit(EditKind::Insert, 3, "", "d").unwrap();
        assert!(matches!(doc.redo(), Err(AppError::NothingToRedo)));

        doc.undo().unwrap();
        assert!(doc.can_redo());
        assert_eq!(doc.redo_depth(), 1);
        doc.apply_edit(EditKind::Insert, 0, "", "x").unwrap();
        assert!(!doc.can_redo());
        assert_eq!(doc.redo_depth(), 0);
        assert!(matches!(doc.redo(), Err(AppError::NothingToRedo)));
    }

    #[test]
    fn test_dirty_tracks_checkpoint_depth() {
        let mut doc = doc_with("hello");
        assert!(!doc.is_dirty());

        doc.apply_edit(EditKind::Insert, 5, "", "!").unwrap();
        assert!(doc.is_dirty());

        doc.undo().unwrap();
        assert!(!doc.is_dirty());

        doc.redo().unwrap();
        assert!(doc.is_dirty());
    }

    #[test]
    fn test_undo_past_checkpoint_is_dirty() {
        let mut doc = Document::new_untitled();
        doc.apply_edit(EditKind::Insert, 0, "", "a").unwrap();
        doc.apply_edit(EditKind::Insert, 1, "", "b").unwrap();
        doc.mark_saved();

        doc.undo().unwrap();
        assert!(doc.is_dirty());
        doc.redo().unwrap();
        assert!(!doc.is_dirty());
    }

    #[test]
    fn test_diverging_after_undo_past_checkpoint_stays_dirty() {
        let mut doc = Document::new_untitled();
        doc.apply_edit(EditKind::Insert, 0, "", "a").unwrap();
        doc.apply_edit(EditKind::Insert, 1, "", "b").unwrap();
        doc.mark_saved();

        doc.undo().unwrap();
        doc.apply_edit(EditKind::Insert, 1, "", "c").unwrap();
        // Same depth as the save point, different text.
        assert_eq!(doc.undo_depth(), 2);
        assert_eq!(doc.text(), "ac");
        assert!(doc.is_dirty());

        doc.undo().unwrap();
        assert!(doc.is_dirty());

        doc.mark_saved();
        assert!(!doc.is_dirty());
    }

    #[test]
    fn test_invalid_position_rejected_without_change() {
        let mut doc = doc_with("abc");
        let err = doc.apply_edit(EditKind::Insert, 4, "", "x").unwrap_err();
        assert!(matches!(err, AppError::InvalidPosition { position: 4, len: 3 }));

        let err = doc.apply_edit(EditKind::Delete, 2, "cd", "").unwrap_err();
        assert!(matches!(err, AppError::InvalidPosition { .. }));

        assert_eq!(doc.text(), "abc");
        assert_eq!(doc.undo_depth(), 1);
        assert!(!doc.is_dirty());
    }

    #[test]
    fn test_mismatched_old_content_rejected() {
        let mut doc = doc_with("abc");
        let err = doc.apply_edit(EditKind::Replace, 0, "xy", "z").unwrap_err();
        assert!(matches!(err, AppError::ContentMismatch { position: 0 }));
        assert_eq!(doc.text(), "abc");
    }

    #[test]
    fn test_malformed_edits_rejected() {
        let mut doc = doc_with("abc");
        assert!(matches!(
            doc.apply_edit(EditKind::Insert, 0, "a", "b"),
            Err(AppError::MalformedEdit(_))
        ));
        assert!(matches!(
            doc.apply_edit(EditKind::Delete, 0, "", ""),
            Err(AppError::MalformedEdit(_))
        ));
        assert!(matches!(
            doc.apply_edit(EditKind::Replace, 0, "", "x"),
            Err(AppError::MalformedEdit(_))
        ));
        assert_eq!(doc.undo_depth(), 1);
    }

    #[test]
    fn test_positions_are_characters() {
        let mut doc = doc_with("日本語");
        doc.apply_edit(EditKind::Insert, 1, "", "-").unwrap();
        assert_eq!(doc.text(), "日-本語");
        doc.apply_edit(EditKind::Delete, 3, "語", "").unwrap();
        assert_eq!(doc.text(), "日-本");
        assert_eq!(doc.char_len(), 3);
    }

    #[test]
    fn test_reset() {
        let mut doc = Document::new_from_file("notes.txt", "content");
        doc.apply_edit(EditKind::Insert, 0, "", "x").unwrap();
        doc.reset();
        assert_eq!(doc.text(), "");
        assert!(doc.file_path().is_none());
        assert!(!doc.is_dirty());
        assert!(!doc.can_undo());
    }

    #[test]
    fn test_documents_are_independent() {
        let mut a = doc_with("shared start");
        let b = doc_with("shared start");

        a.apply_edit(EditKind::Insert, 0, "", ">> ").unwrap();

        assert_eq!(b.text(), "shared start");
        assert!(!b.is_dirty());
        assert_eq!(b.undo_depth(), 1);
        assert!(a.is_dirty());
    }
}
