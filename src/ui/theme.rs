//! Theme configuration for the meter panel.
//!
//! Supports light and dark themes with automatic terminal detection.

use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::block::BorderType;

use super::meters::Level;

/// Color and style theme for the meter panel.
///
/// Use [`Theme::auto_detect()`] for automatic theme selection based on
/// terminal background, or [`Theme::dark()`]/[`Theme::light()`] explicitly.
#[derive(Debug, Clone)]
pub struct Theme {
    /// Bar color below the peak level.
    pub normal: Color,
    /// Bar color at or above the peak level.
    pub peak: Color,
    /// Bar color above full scale.
    pub overload: Color,
    /// Color of the unfilled part of a bar.
    pub track: Color,
    /// Color of the panel border.
    pub border: Color,
    /// Style of the panel title.
    pub title: Style,
    /// Style of meter labels.
    pub label: Style,
    /// Style of the skipped-frame diagnostic.
    pub diagnostic: Style,
    /// Border style (rounded, plain, etc.).
    pub border_type: BorderType,
}

impl Theme {
    /// Create a dark theme suitable for dark terminal backgrounds.
    pub fn dark() -> Self {
        Self {
            normal: Color::Magenta,
            peak: Color::Yellow,
            overload: Color::Red,
            track: Color::DarkGray,
            border: Color::Red,
            title: Style::default().add_modifier(Modifier::BOLD),
            label: Style::default().fg(Color::White),
            diagnostic: Style::default().fg(Color::Yellow),
            border_type: BorderType::Rounded,
        }
    }

    /// Create a light theme suitable for light terminal backgrounds.
    pub fn light() -> Self {
        Self {
            normal: Color::Blue,
            peak: Color::Yellow,
            overload: Color::Red,
            track: Color::Gray,
            border: Color::Red,
            title: Style::default().add_modifier(Modifier::BOLD),
            label: Style::default().fg(Color::Black),
            diagnostic: Style::default().fg(Color::Red),
            border_type: BorderType::Rounded,
        }
    }

    /// Auto-detect based on terminal background
    pub fn auto_detect() -> Self {
        match terminal_light::luma() {
            Ok(luma) if luma > 0.5 => Self::light(),
            _ => Self::dark(),
        }
    }

    /// Replace the border color.
    pub fn with_border(mut self, color: Color) -> Self {
        self.border = color;
        self
    }

    /// Get the bar style for a meter level
    pub fn level_style(&self, level: Level) -> Style {
        match level {
            Level::Normal => Style::default().fg(self.normal),
            Level::Peak => Style::default().fg(self.peak),
            Level::Overload => Style::default().fg(self.overload).add_modifier(Modifier::BOLD),
        }
    }
}
