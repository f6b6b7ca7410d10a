use std::cell::RefCell;
use std::ops::Range;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use tracing::{debug, info};

use crate::app::controllers::windows::SettingsListener;
use crate::app::domain::{ColorSet, Document, EditKind, EditorEvent, SettingsSnapshot, Theme, WindowId};
use crate::app::infrastructure::error::{AppError, Result};
use crate::app::infrastructure::file_io::FileIo;
use crate::app::infrastructure::host::{CloseDecision, RenderFrame, WindowHost};
use crate::app::services::find::{self, Direction, Match};
use crate::app::services::settings_store::SettingsStore;
use crate::app::services::text_ops::{extract_filename, line_and_column};

pub const APP_NAME: &str = "LandText";

/// What the workspace has to do after an editor handled an event.
#[derive(Debug, Clone, PartialEq)]
pub enum EventOutcome {
    Handled,
    /// A committed settings change that every window must receive
    Broadcast(SettingsSnapshot),
    OpenNewWindow,
    CloseRequested,
}

/// One window's editor: its document, cursor and presentation.
pub struct EditorController {
    id: WindowId,
    document: Document,
    cursor: usize,
    selection: Option<Range<usize>>,
    highlights: Vec<Match>,
    settings: Rc<RefCell<SettingsStore>>,
    /// Last committed settings this window received
    snapshot: SettingsSnapshot,
    host: Box<dyn WindowHost>,
    file_io: Rc<dyn FileIo>,
}

impl EditorController {
    pub fn new(
        id: WindowId,
        document: Document,
        settings: Rc<RefCell<SettingsStore>>,
        host: Box<dyn WindowHost>,
        file_io: Rc<dyn FileIo>,
    ) -> Self {
        let snapshot = settings.borrow().snapshot();
        let mut editor = Self {
            id,
            document,
            cursor: 0,
            selection: None,
            highlights: Vec::new(),
            settings,
            snapshot,
            host,
            file_io,
        };
        editor.refresh();
        editor
    }

    pub fn id(&self) -> WindowId {
        self.id
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn selection(&self) -> Option<Range<usize>> {
        self.selection.clone()
    }

    pub fn highlights(&self) -> &[Match] {
        &self.highlights
    }

    /// Committed settings as last delivered to this window
    pub fn snapshot(&self) -> SettingsSnapshot {
        self.snapshot
    }

    pub fn handle(&mut self, event: EditorEvent) -> Result<EventOutcome> {
        match event {
            EditorEvent::Insert(text) => self.insert_text(&text)?,
            EditorEvent::DeleteBackward => self.delete_backward()?,
            EditorEvent::DeleteForward => self.delete_forward()?,
            EditorEvent::MoveCursor(position) => self.move_cursor(position)?,
            EditorEvent::Select { start, end } => self.select(start, end)?,
            EditorEvent::Edit { kind, position, old, new } => self.apply_edit(kind, position, &old, &new)?,
            EditorEvent::Undo => self.undo()?,
            EditorEvent::Redo => self.redo()?,
            EditorEvent::Find { query, direction } => {
                self.find(&query, direction)?;
            }
            EditorEvent::FindAll(query) => {
                self.find_all(&query);
            }
            EditorEvent::ClearHighlights => {
                self.highlights.clear();
                self.refresh();
            }
            EditorEvent::FileNew => {
                self.new_file()?;
            }
            EditorEvent::FileOpen(path) => {
                self.open_file(&path)?;
            }
            EditorEvent::FileSave => {
                self.save()?;
            }
            EditorEvent::FileSaveAs(path) => self.save_as(path)?,
            EditorEvent::PreviewTheme(theme) => self.preview_theme(theme),
            EditorEvent::PreviewFontSize(points) => self.preview_font_size(points)?,
            EditorEvent::CancelPreview => self.cancel_preview(),
            EditorEvent::ApplyTheme(theme) => return Ok(EventOutcome::Broadcast(self.apply_theme(theme))),
            EditorEvent::ApplyFontSize(points) => {
                return self.apply_font_size(points).map(EventOutcome::Broadcast);
            }
            EditorEvent::SaveCustomColors(colors) => self.save_custom_colors(colors),
            EditorEvent::OpenNewWindow => return Ok(EventOutcome::OpenNewWindow),
            EditorEvent::WindowClose => return Ok(EventOutcome::CloseRequested),
        }
        Ok(EventOutcome::Handled)
    }

    // ---- Editing ----

    /// Type `text` at the cursor, replacing the selection if there is one.
    pub fn insert_text(&mut self, text: &str) -> Result<()> {
        if text.is_empty() {
            return Ok(());
        }
        match self.selection.clone() {
            Some(range) => {
                let old = self.slice(range.clone());
                self.apply_edit(EditKind::Replace, range.start, &old, text)
            }
            None => self.apply_edit(EditKind::Insert, self.cursor, "", text),
        }
    }

    pub fn delete_backward(&mut self) -> Result<()> {
        if let Some(range) = self.selection.clone() {
            return self.delete_range(range);
        }
        if self.cursor == 0 {
            return Ok(());
        }
        self.delete_range(self.cursor - 1..self.cursor)
    }

    pub fn delete_forward(&mut self) -> Result<()> {
        if let Some(range) = self.selection.clone() {
            return self.delete_range(range);
        }
        if self.cursor >= self.document.char_len() {
            return Ok(());
        }
        self.delete_range(self.cursor..self.cursor + 1)
    }

    pub fn apply_edit(&mut self, kind: EditKind, position: usize, old: &str, new: &str) -> Result<()> {
        self.document.apply_edit(kind, position, old, new)?;
        self.cursor = position + new.chars().count();
        self.after_text_change();
        Ok(())
    }

    pub fn undo(&mut self) -> Result<()> {
        let record = self.document.undo().inspect_err(|e| {
            debug!(window = %self.id, "{}", e);
        })?;
        self.cursor = record.end_before();
        self.after_text_change();
        Ok(())
    }

    pub fn redo(&mut self) -> Result<()> {
        let record = self.document.redo().inspect_err(|e| {
            debug!(window = %self.id, "{}", e);
        })?;
        self.cursor = record.end_after();
        self.after_text_change();
        Ok(())
    }

    pub fn move_cursor(&mut self, position: usize) -> Result<()> {
        self.check_position(position)?;
        self.cursor = position;
        self.selection = None;
        self.refresh();
        Ok(())
    }

    /// Select `start..end`; the cursor lands on `end`.
    pub fn select(&mut self, start: usize, end: usize) -> Result<()> {
        self.check_position(start)?;
        self.check_position(end)?;
        self.selection = (start != end).then(|| start.min(end)..start.max(end));
        self.cursor = end;
        self.refresh();
        Ok(())
    }

    fn delete_range(&mut self, range: Range<usize>) -> Result<()> {
        let old = self.slice(range.clone());
        self.apply_edit(EditKind::Delete, range.start, &old, "")
    }

    fn slice(&self, range: Range<usize>) -> String {
        self.document
            .text()
            .chars()
            .skip(range.start)
            .take(range.end - range.start)
            .collect()
    }

    fn check_position(&self, position: usize) -> Result<()> {
        let len = self.document.char_len();
        if position > len {
            return Err(AppError::InvalidPosition { position, len });
        }
        Ok(())
    }

    fn after_text_change(&mut self) {
        self.selection = None;
        self.highlights.clear();
        self.cursor = self.cursor.min(self.document.char_len());
        self.refresh();
    }

    // ---- Find ----

    /// Select the next match from the cursor. A miss is reported on the
    /// status bar and returns `Ok(None)`.
    pub fn find(&mut self, query: &str, direction: Direction) -> Result<Option<Match>> {
        let from = match (direction, &self.selection) {
            (Direction::Backward, Some(range)) => range.start,
            _ => self.cursor,
        };

        let result = match find::find(&self.document, query, from, direction) {
            Ok(result) => result,
            Err(e @ (AppError::NotFound(_) | AppError::EmptyQuery)) => {
                self.host.show_message(&e.to_string());
                return Ok(None);
            }
            Err(e) => return Err(e),
        };

        let Some(found) = result.first() else {
            return Ok(None);
        };
        if result.wrapped {
            let message = match direction {
                Direction::Forward => "No more matches. Wrapped to beginning.",
                Direction::Backward => "No more matches. Wrapped to end.",
            };
            self.host.show_message(message);
        }

        self.selection = Some(found.start..found.end);
        self.cursor = match direction {
            Direction::Forward => found.end,
            Direction::Backward => found.start,
        };
        self.refresh();
        Ok(Some(found))
    }

    /// Highlight every match and jump to the first. Returns the match count.
    pub fn find_all(&mut self, query: &str) -> usize {
        self.highlights = find::find_all(self.document.text(), query);
        match self.highlights.first() {
            Some(first) => {
                self.cursor = first.start;
                self.selection = None;
                let count = self.highlights.len();
                self.host.show_message(&format!("{} match(es) for '{}'", count, query));
            }
            None if query.is_empty() => self.host.show_message(&AppError::EmptyQuery.to_string()),
            None => self
                .host
                .show_message(&AppError::NotFound(query.to_string()).to_string()),
        }
        self.refresh();
        self.highlights.len()
    }

    // ---- Files ----

    /// Ask before throwing away unsaved changes. Returns true when it is
    /// fine to continue (clean, saved, or discarded).
    pub fn confirm_discard(&mut self) -> Result<bool> {
        if !self.document.is_dirty() {
            return Ok(true);
        }
        match self.host.confirm_unsaved(&self.document.display_name()) {
            CloseDecision::Save => self.save(),
            CloseDecision::Discard => Ok(true),
            CloseDecision::Cancel => Ok(false),
        }
    }

    /// Returns false if the user cancelled.
    pub fn new_file(&mut self) -> Result<bool> {
        if !self.confirm_discard()? {
            return Ok(false);
        }
        self.document.reset();
        self.reset_view();
        info!(window = %self.id, "new document");
        Ok(true)
    }

    /// Returns false if the user cancelled.
    pub fn open_file(&mut self, path: &Path) -> Result<bool> {
        if !self.confirm_discard()? {
            return Ok(false);
        }
        let content = self.file_io.load(path)?;
        self.document = Document::new_from_file(path, content);
        self.reset_view();
        info!(window = %self.id, path = %path.display(), "document opened");
        Ok(true)
    }

    /// Save to the document's path, asking the host for one if it has none.
    /// Returns false if no path was chosen.
    pub fn save(&mut self) -> Result<bool> {
        let path = match self.document.file_path() {
            Some(path) => path.to_path_buf(),
            None => match self.host.choose_save_path() {
                Some(path) => path,
                None => return Ok(false),
            },
        };
        self.save_as(path)?;
        Ok(true)
    }

    pub fn save_as(&mut self, path: PathBuf) -> Result<()> {
        self.file_io.save(&path, self.document.text())?;
        self.document.set_file_path(path);
        self.document.mark_saved();
        self.refresh();
        Ok(())
    }

    fn reset_view(&mut self) {
        self.cursor = 0;
        self.selection = None;
        self.highlights.clear();
        self.refresh();
    }

    // ---- Settings ----

    pub fn preview_theme(&mut self, theme: Theme) {
        self.settings.borrow_mut().preview_theme(self.id, theme);
        self.refresh();
    }

    pub fn preview_font_size(&mut self, points: u32) -> Result<()> {
        self.settings.borrow_mut().preview_font_size(self.id, points)?;
        self.refresh();
        Ok(())
    }

    pub fn cancel_preview(&mut self) {
        let cancelled = self.settings.borrow_mut().cancel_preview(self.id);
        if cancelled {
            self.refresh();
        }
    }

    /// Commit a theme. The caller broadcasts the returned snapshot.
    pub fn apply_theme(&mut self, theme: Theme) -> SettingsSnapshot {
        let applied = self.settings.borrow_mut().apply_theme(self.id, theme);
        self.report_warning(applied.warning);
        applied.snapshot
    }

    /// Commit a font size. The caller broadcasts the returned snapshot.
    pub fn apply_font_size(&mut self, points: u32) -> Result<SettingsSnapshot> {
        let applied = self.settings.borrow_mut().apply_font_size(self.id, points)?;
        self.report_warning(applied.warning);
        Ok(applied.snapshot)
    }

    pub fn save_custom_colors(&mut self, colors: ColorSet) {
        let warning = self.settings.borrow_mut().save_custom_colors(colors);
        if warning.is_none() {
            self.host.show_message("Custom theme colors saved!");
        }
        self.report_warning(warning);
    }

    fn report_warning(&mut self, warning: Option<AppError>) {
        if let Some(warning) = warning {
            self.host
                .show_message(&format!("{}. The change will not survive a restart.", warning));
        }
    }

    // ---- Presentation ----

    /// `LandText - name` for a document with a path, plain `LandText`
    /// otherwise, with ` *` appended while there are unsaved changes.
    pub fn title(&self) -> String {
        let mut title = match self.document.file_path() {
            Some(path) => format!("{} - {}", APP_NAME, extract_filename(path)),
            None => APP_NAME.to_string(),
        };
        if self.document.is_dirty() {
            title.push_str(" *");
        }
        title
    }

    pub fn status_line(&self) -> String {
        let (line, column) = line_and_column(self.document.text(), self.cursor);
        format!("Line: {}, Column: {}", line, column)
    }

    /// Settings this window paints with: its own preview if it has one,
    /// otherwise the last broadcast.
    fn view(&self) -> SettingsSnapshot {
        let store = self.settings.borrow();
        if store.has_preview(self.id) {
            store.view_for(self.id)
        } else {
            self.snapshot
        }
    }

    fn refresh(&mut self) {
        let view = self.view();
        let frame = RenderFrame {
            colors: view.theme.colors(),
            font_size: view.font_size,
            text: self.document.text().to_string(),
            cursor: self.cursor,
            selection: self.selection.clone(),
            highlights: self.highlights.clone(),
            can_undo: self.document.can_undo(),
            can_redo: self.document.can_redo(),
        };
        self.host.render(&frame);
        let title = self.title();
        self.host.set_title(&title);
        let status = self.status_line();
        self.host.set_status(&status);
    }
}

impl SettingsListener for EditorController {
    fn on_settings_changed(&mut self, snapshot: &SettingsSnapshot) {
        self.snapshot = *snapshot;
        self.refresh();
    }
}
