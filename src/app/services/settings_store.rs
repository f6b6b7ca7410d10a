//! The process-wide presentation settings.
//!
//! Values move through two phases: a window may *preview* a theme or font
//! size (only that window renders it, and other windows never disturb it),
//! and an explicit *apply* commits the value for everyone and writes it to
//! the backend. The store never notifies
//! windows itself; callers broadcast the snapshot returned by `apply_*`.

use std::collections::BTreeMap;

use tracing::{debug, info, warn};

use crate::app::domain::{Color, ColorSet, FontSize, SettingsSnapshot, Theme, ThemeKind, WindowId};
use crate::app::infrastructure::error::{AppError, Result};
use crate::app::infrastructure::persistence::{SettingsBackend, SettingsEntries};

/// Backend keys
pub mod keys {
    pub const THEME: &str = "theme";
    pub const FONT_SIZE: &str = "font_size";
    pub const CUSTOM_BACKGROUND: &str = "custom.background";
    pub const CUSTOM_TEXT: &str = "custom.text";
    pub const CUSTOM_SELECTION_BACKGROUND: &str = "custom.selection_background";
    pub const CUSTOM_SELECTION_TEXT: &str = "custom.selection_text";
    pub const CUSTOM_STATUS_BAR_BACKGROUND: &str = "custom.status_bar_background";
    pub const CUSTOM_STATUS_BAR_TEXT: &str = "custom.status_bar_text";
}

/// One window's pending, uncommitted values
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
struct Preview {
    theme: Option<Theme>,
    font_size: Option<FontSize>,
}

impl Preview {
    fn is_empty(&self) -> bool {
        self.theme.is_none() && self.font_size.is_none()
    }
}

/// Result of a committed change.
#[derive(Debug)]
pub struct Applied {
    /// What every window should now render with
    pub snapshot: SettingsSnapshot,
    /// Set when the change could not be persisted and will not survive a restart
    pub warning: Option<AppError>,
}

pub struct SettingsStore {
    committed: SettingsSnapshot,
    custom_palette: ColorSet,
    previews: BTreeMap<WindowId, Preview>,
    backend: Box<dyn SettingsBackend>,
    startup_warning: Option<AppError>,
}

impl SettingsStore {
    /// Load settings from the backend, falling back to defaults for anything
    /// missing or unreadable.
    pub fn load(backend: Box<dyn SettingsBackend>) -> Self {
        let (entries, startup_warning) = match backend.read_all() {
            Ok(entries) => (entries, None),
            Err(e) => {
                warn!(error = %e, "settings backend unreadable, using defaults");
                (
                    SettingsEntries::new(),
                    Some(AppError::PersistenceUnavailable(e.to_string())),
                )
            }
        };

        let custom_palette = parse_palette(&entries);
        let kind = parse_value(&entries, keys::THEME, |s| ThemeKind::from_name(s).ok_or(()))
            .unwrap_or_default();
        let font_size = parse_value(&entries, keys::FONT_SIZE, |s| {
            s.trim()
                .parse::<u32>()
                .map_err(|_| ())
                .and_then(|n| FontSize::new(n).map_err(|_| ()))
        })
        .unwrap_or_default();

        let committed = SettingsSnapshot {
            theme: theme_from_kind(kind, custom_palette),
            font_size,
        };
        info!(theme = kind.as_str(), font_size = %font_size, "settings loaded");

        Self {
            committed,
            custom_palette,
            previews: BTreeMap::new(),
            backend,
            startup_warning,
        }
    }

    /// Warning raised while loading, if the backend could not be read.
    pub fn take_startup_warning(&mut self) -> Option<AppError> {
        self.startup_warning.take()
    }

    /// The committed settings shared by all windows
    pub fn snapshot(&self) -> SettingsSnapshot {
        self.committed
    }

    /// The committed settings overlaid with `window`'s pending preview, if any.
    pub fn view_for(&self, window: WindowId) -> SettingsSnapshot {
        let mut view = self.committed;
        if let Some(preview) = self.previews.get(&window) {
            if let Some(theme) = preview.theme {
                view.theme = theme;
            }
            if let Some(size) = preview.font_size {
                view.font_size = size;
            }
        }
        view
    }

    pub fn custom_palette(&self) -> ColorSet {
        self.custom_palette
    }

    /// The theme a kind stands for, using the stored custom palette.
    pub fn theme_for(&self, kind: ThemeKind) -> Theme {
        theme_from_kind(kind, self.custom_palette)
    }

    pub fn has_preview(&self, window: WindowId) -> bool {
        self.previews.contains_key(&window)
    }

    pub fn preview_theme(&mut self, window: WindowId, theme: Theme) {
        self.previews.entry(window).or_default().theme = Some(theme);
        debug!(%window, theme = theme.kind().as_str(), "theme preview");
    }

    pub fn preview_font_size(&mut self, window: WindowId, points: u32) -> Result<()> {
        let size = FontSize::new(points)?;
        self.previews.entry(window).or_default().font_size = Some(size);
        debug!(%window, font_size = points, "font size preview");
        Ok(())
    }

    /// Drop `window`'s pending preview. Returns whether there was one.
    pub fn cancel_preview(&mut self, window: WindowId) -> bool {
        let cancelled = self.previews.remove(&window).is_some();
        if cancelled {
            debug!(%window, "preview cancelled");
        }
        cancelled
    }

    /// Commit a theme on behalf of `window`. Only that window's pending theme
    /// preview is consumed; other windows keep theirs.
    pub fn apply_theme(&mut self, window: WindowId, theme: Theme) -> Applied {
        if let Theme::Custom(colors) = theme {
            self.custom_palette = colors;
        }
        self.committed.theme = theme;
        self.consume_preview(window, |p| p.theme = None);

        info!(theme = theme.kind().as_str(), "theme applied");
        let warning = self.persist();
        Applied {
            snapshot: self.committed,
            warning,
        }
    }

    /// Commit a new font size on behalf of `window`. Out-of-range sizes are
    /// rejected and change nothing.
    pub fn apply_font_size(&mut self, window: WindowId, points: u32) -> Result<Applied> {
        let size = FontSize::new(points).inspect_err(|_| {
            warn!(font_size = points, "rejected out-of-range font size");
        })?;
        self.committed.font_size = size;
        self.consume_preview(window, |p| p.font_size = None);

        info!(font_size = points, "font size applied");
        let warning = self.persist();
        Ok(Applied {
            snapshot: self.committed,
            warning,
        })
    }

    /// Store the custom palette without touching the active theme.
    ///
    /// Returns a warning if the palette could not be persisted.
    pub fn save_custom_colors(&mut self, colors: ColorSet) -> Option<AppError> {
        self.custom_palette = colors;
        info!("custom colors saved");
        self.persist()
    }

    fn consume_preview(&mut self, window: WindowId, clear: impl FnOnce(&mut Preview)) {
        if let Some(preview) = self.previews.get_mut(&window) {
            clear(preview);
            if preview.is_empty() {
                self.previews.remove(&window);
            }
        }
    }

    fn entries(&self) -> SettingsEntries {
        let palette = &self.custom_palette;
        [
            (keys::THEME, self.committed.theme.kind().as_str().to_string()),
            (keys::FONT_SIZE, self.committed.font_size.to_string()),
            (keys::CUSTOM_BACKGROUND, palette.background.to_string()),
            (keys::CUSTOM_TEXT, palette.text.to_string()),
            (keys::CUSTOM_SELECTION_BACKGROUND, palette.selection_background.to_string()),
            (keys::CUSTOM_SELECTION_TEXT, palette.selection_text.to_string()),
            (keys::CUSTOM_STATUS_BAR_BACKGROUND, palette.status_bar_background.to_string()),
            (keys::CUSTOM_STATUS_BAR_TEXT, palette.status_bar_text.to_string()),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect()
    }

    fn persist(&mut self) -> Option<AppError> {
        let entries = self.entries();
        match self.backend.write_all(&entries) {
            Ok(()) => None,
            Err(e) => {
                warn!(error = %e, "failed to persist settings, change kept for this session only");
                Some(AppError::PersistenceUnavailable(e.to_string()))
            }
        }
    }
}

fn theme_from_kind(kind: ThemeKind, palette: ColorSet) -> Theme {
    match kind {
        ThemeKind::Light => Theme::Light,
        ThemeKind::Dark => Theme::Dark,
        ThemeKind::Custom => Theme::Custom(palette),
    }
}

/// Parse one key; a missing key is silently `None`, a bad value is logged.
fn parse_value<T>(entries: &SettingsEntries, key: &str, parse: impl Fn(&str) -> std::result::Result<T, ()>) -> Option<T> {
    let raw = entries.get(key)?;
    match parse(raw) {
        Ok(value) => Some(value),
        Err(()) => {
            warn!(key, value = %raw, "ignoring invalid setting");
            None
        }
    }
}

fn parse_palette(entries: &SettingsEntries) -> ColorSet {
    let defaults = ColorSet::default();
    let color = |key: &str, fallback: Color| {
        parse_value(entries, key, |s| s.parse::<Color>().map_err(|_| ())).unwrap_or(fallback)
    };
    ColorSet {
        background: color(keys::CUSTOM_BACKGROUND, defaults.background),
        text: color(keys::CUSTOM_TEXT, defaults.text),
        selection_background: color(keys::CUSTOM_SELECTION_BACKGROUND, defaults.selection_background),
        selection_text: color(keys::CUSTOM_SELECTION_TEXT, defaults.selection_text),
        status_bar_background: color(keys::CUSTOM_STATUS_BAR_BACKGROUND, defaults.status_bar_background),
        status_bar_text: color(keys::CUSTOM_STATUS_BAR_TEXT, defaults.status_bar_text),
    }
}
