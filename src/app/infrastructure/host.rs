//! The seam between an editor and the native window that shows it.
//!
//! A host draws frames, shows the title and status bar, and answers the
//! dialogs the core needs (unsaved-changes prompt, save-as path). The core
//! never creates windows or runs a message loop itself.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::ops::Range;
use std::path::PathBuf;
use std::rc::Rc;

use crate::app::domain::{ColorSet, FontSize};
use crate::app::services::find::Match;

/// Answer to "You have unsaved progress."
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseDecision {
    Save,
    Discard,
    Cancel,
}

/// Everything needed to paint one window.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderFrame {
    pub colors: ColorSet,
    pub font_size: FontSize,
    pub text: String,
    pub cursor: usize,
    pub selection: Option<Range<usize>>,
    pub highlights: Vec<Match>,
    pub can_undo: bool,
    pub can_redo: bool,
}

pub trait WindowHost {
    fn render(&mut self, frame: &RenderFrame);

    fn set_title(&mut self, title: &str);

    /// Permanent status bar text (cursor line and column)
    fn set_status(&mut self, status: &str);

    /// Transient notice, e.g. a search that found nothing
    fn show_message(&mut self, message: &str);

    fn confirm_unsaved(&mut self, document_name: &str) -> CloseDecision;

    /// Ask for a destination when saving a document that has no path yet.
    fn choose_save_path(&mut self) -> Option<PathBuf>;
}

#[derive(Debug, Default)]
struct HeadlessState {
    last_frame: Option<RenderFrame>,
    render_count: usize,
    title: String,
    status: String,
    messages: Vec<String>,
    decisions: VecDeque<CloseDecision>,
    save_paths: VecDeque<PathBuf>,
    confirm_requests: Vec<String>,
}

/// A host with no screen. It records what it was asked to show and answers
/// dialogs from queued replies; with nothing queued it cancels.
///
/// Clones share state, so the caller can keep a handle after giving one to
/// an editor.
#[derive(Debug, Clone, Default)]
pub struct HeadlessHost {
    state: Rc<RefCell<HeadlessState>>,
}

impl HeadlessHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn queue_decision(&self, decision: CloseDecision) {
        self.state.borrow_mut().decisions.push_back(decision);
    }

    pub fn queue_save_path(&self, path: impl Into<PathBuf>) {
        self.state.borrow_mut().save_paths.push_back(path.into());
    }

    pub fn last_frame(&self) -> Option<RenderFrame> {
        self.state.borrow().last_frame.clone()
    }

    pub fn render_count(&self) -> usize {
        self.state.borrow().render_count
    }

    pub fn title(&self) -> String {
        self.state.borrow().title.clone()
    }

    pub fn status(&self) -> String {
        self.state.borrow().status.clone()
    }

    pub fn messages(&self) -> Vec<String> {
        self.state.borrow().messages.clone()
    }

    /// Names of documents the unsaved-changes prompt was shown for
    pub fn confirm_requests(&self) -> Vec<String> {
        self.state.borrow().confirm_requests.clone()
    }
}

impl WindowHost for HeadlessHost {
    fn render(&mut self, frame: &RenderFrame) {
        let mut state = self.state.borrow_mut();
        state.last_frame = Some(frame.clone());
        state.render_count += 1;
    }

    fn set_title(&mut self, title: &str) {
        self.state.borrow_mut().title = title.to_string();
    }

    fn set_status(&mut self, status: &str) {
        self.state.borrow_mut().status = status.to_string();
    }

    fn show_message(&mut self, message: &str) {
        self.state.borrow_mut().messages.push(message.to_string());
    }

    fn confirm_unsaved(&mut self, document_name: &str) -> CloseDecision {
        let mut state = self.state.borrow_mut();
        state.confirm_requests.push(document_name.to_string());
        state.decisions.pop_front().unwrap_or(CloseDecision::Cancel)
    }

    fn choose_save_path(&mut self) -> Option<PathBuf> {
        self.state.borrow_mut().save_paths.pop_front()
    }
}
