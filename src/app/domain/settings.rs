use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::app::infrastructure::error::AppError;

/// An sRGB colour, written as `#rrggbb` when persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const WHITE: Color = Color::from_rgb(255, 255, 255);
    pub const BLACK: Color = Color::from_rgb(0, 0, 0);

    pub const fn from_rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parse the handful of named colours the stock palettes were written with.
    fn from_name(name: &str) -> Option<Self> {
        let rgb = match name.to_ascii_lowercase().as_str() {
            "white" => (255, 255, 255),
            "black" => (0, 0, 0),
            "lightblue" => (173, 216, 230),
            "lightgray" | "lightgrey" => (211, 211, 211),
            "gray" | "grey" => (190, 190, 190),
            "yellow" => (255, 255, 0),
            "red" => (255, 0, 0),
            "green" => (0, 255, 0),
            "blue" => (0, 0, 255),
            _ => return None,
        };
        Some(Self::from_rgb(rgb.0, rgb.1, rgb.2))
    }
}

impl FromStr for Color {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Some(hex) = s.strip_prefix('#') {
            if hex.len() != 6 || !hex.is_ascii() {
                return Err(format!("invalid colour '{}'", s));
            }
            let channel = |i: usize| {
                u8::from_str_radix(&hex[i..i + 2], 16).map_err(|_| format!("invalid colour '{}'", s))
            };
            return Ok(Self::from_rgb(channel(0)?, channel(2)?, channel(4)?));
        }
        Self::from_name(s).ok_or_else(|| format!("unknown colour name '{}'", s))
    }
}

impl TryFrom<String> for Color {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Color> for String {
    fn from(color: Color) -> Self {
        color.to_string()
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

/// The six colour roles a theme assigns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColorSet {
    pub background: Color,
    pub text: Color,
    pub selection_background: Color,
    pub selection_text: Color,
    pub status_bar_background: Color,
    pub status_bar_text: Color,
}

impl ColorSet {
    pub const LIGHT: ColorSet = ColorSet {
        background: Color::WHITE,
        text: Color::BLACK,
        selection_background: Color::from_rgb(173, 216, 230),
        selection_text: Color::BLACK,
        status_bar_background: Color::from_rgb(211, 211, 211),
        status_bar_text: Color::BLACK,
    };

    pub const DARK: ColorSet = ColorSet {
        background: Color::from_rgb(0x1e, 0x1e, 0x1e),
        text: Color::from_rgb(0xd4, 0xd4, 0xd4),
        selection_background: Color::from_rgb(0x26, 0x4f, 0x78),
        selection_text: Color::WHITE,
        status_bar_background: Color::from_rgb(0x2d, 0x2d, 0x2d),
        status_bar_text: Color::WHITE,
    };
}

impl Default for ColorSet {
    /// A fresh custom palette starts out as a copy of the light one.
    fn default() -> Self {
        Self::LIGHT
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum ThemeKind {
    #[default]
    Light,
    Dark,
    Custom,
}

impl ThemeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Light => "Light",
            Self::Dark => "Dark",
            Self::Custom => "Custom",
        }
    }

    pub fn from_name(name: &str) -> Option<ThemeKind> {
        match name {
            "Light" => Some(Self::Light),
            "Dark" => Some(Self::Dark),
            "Custom" => Some(Self::Custom),
            _ => None,
        }
    }

    pub fn all() -> &'static [ThemeKind] {
        &[Self::Light, Self::Dark, Self::Custom]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Theme {
    #[default]
    Light,
    Dark,
    Custom(ColorSet),
}

impl Theme {
    pub fn kind(&self) -> ThemeKind {
        match self {
            Self::Light => ThemeKind::Light,
            Self::Dark => ThemeKind::Dark,
            Self::Custom(_) => ThemeKind::Custom,
        }
    }

    /// Colours to paint with for this theme
    pub fn colors(&self) -> ColorSet {
        match self {
            Self::Light => ColorSet::LIGHT,
            Self::Dark => ColorSet::DARK,
            Self::Custom(colors) => *colors,
        }
    }
}

/// Editor font size in points, always within `MIN..=MAX`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct FontSize(u32);

impl FontSize {
    pub const MIN: u32 = 8;
    pub const MAX: u32 = 32;
    pub const DEFAULT: FontSize = FontSize(10);

    pub fn new(points: u32) -> Result<Self, AppError> {
        if (Self::MIN..=Self::MAX).contains(&points) {
            Ok(Self(points))
        } else {
            Err(AppError::OutOfRange(points))
        }
    }

    pub fn get(self) -> u32 {
        self.0
    }
}

impl Default for FontSize {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl TryFrom<u32> for FontSize {
    type Error = AppError;

    fn try_from(points: u32) -> Result<Self, Self::Error> {
        Self::new(points)
    }
}

impl From<FontSize> for u32 {
    fn from(size: FontSize) -> Self {
        size.0
    }
}

impl fmt::Display for FontSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The presentation settings every window renders with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SettingsSnapshot {
    pub theme: Theme,
    pub font_size: FontSize,
}
