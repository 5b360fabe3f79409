//! Theme and styling for the TUI.

use ratatui::style::{Color, Modifier, Style};

use crate::drill::FieldStatus;
use crate::progress::Tone;

/// Color palette for a theme.
#[derive(Debug, Clone)]
pub struct ThemeColors {
    // Brand Colors
    pub primary: Color,
    pub secondary: Color,
    pub accent: Color,

    // Semantic Colors
    pub success: Color,
    pub warning: Color,
    pub error: Color,
    pub info: Color,

    // Background Colors
    pub bg_dark: Color,
    pub bg_highlight: Color,

    // Text Colors
    pub text: Color,
    pub text_muted: Color,
    pub text_dim: Color,

    // Progress Colors
    pub mastered: Color,
    pub accuracy: Color,
    pub remaining: Color,
}

/// Available theme names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThemeName {
    Default,
    KanagawaWave,
}

impl ThemeName {
    pub fn as_str(&self) -> &'static str {
        match self {
            ThemeName::Default => "default",
            ThemeName::KanagawaWave => "kanagawa-wave",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            ThemeName::Default => "Default",
            ThemeName::KanagawaWave => "Kanagawa Wave",
        }
    }

    pub fn parse(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "kanagawa-wave" | "kanagawa_wave" | "kanagawa" => ThemeName::KanagawaWave,
            _ => ThemeName::Default,
        }
    }

    pub fn next(&self) -> Self {
        match self {
            ThemeName::Default => ThemeName::KanagawaWave,
            ThemeName::KanagawaWave => ThemeName::Default,
        }
    }
}

/// Theme struct that holds colors and provides style methods.
#[derive(Debug, Clone)]
pub struct Theme {
    pub name: ThemeName,
    pub colors: ThemeColors,
}

impl Theme {
    pub fn new(name: ThemeName) -> Self {
        let colors = match name {
            ThemeName::Default => Self::default_colors(),
            ThemeName::KanagawaWave => Self::kanagawa_wave_colors(),
        };
        Self { name, colors }
    }

    pub fn from_name(name: &str) -> Self {
        Self::new(ThemeName::parse(name))
    }

    fn default_colors() -> ThemeColors {
        ThemeColors {
            primary: Color::Rgb(59, 130, 246),      // Blue
            secondary: Color::Rgb(139, 92, 246),    // Violet
            accent: Color::Rgb(234, 88, 12),        // Orange

            success: Color::Rgb(34, 197, 94),       // Green
            warning: Color::Rgb(250, 204, 21),      // Yellow
            error: Color::Rgb(239, 68, 68),         // Red
            info: Color::Rgb(56, 189, 248),         // Sky

            bg_dark: Color::Rgb(15, 23, 42),        // Slate 900
            bg_highlight: Color::Rgb(51, 65, 85),   // Slate 700

            text: Color::Rgb(248, 250, 252),        // Slate 50
            text_muted: Color::Rgb(148, 163, 184),  // Slate 400
            text_dim: Color::Rgb(100, 116, 139),    // Slate 500

            mastered: Color::Rgb(34, 197, 94),
            accuracy: Color::Rgb(168, 85, 247),
            remaining: Color::Rgb(251, 146, 60),
        }
    }

    /// Kanagawa Wave, after kanagawa.nvim.
    fn kanagawa_wave_colors() -> ThemeColors {
        ThemeColors {
            primary: Color::Rgb(0x7E, 0x9C, 0xD8),      // crystalBlue
            secondary: Color::Rgb(0x95, 0x7F, 0xB8),    // oniViolet
            accent: Color::Rgb(0xFF, 0xA0, 0x66),       // surimiOrange

            success: Color::Rgb(0x98, 0xBB, 0x6C),      // springGreen
            warning: Color::Rgb(0xFF, 0x9E, 0x3B),      // roninYellow
            error: Color::Rgb(0xE8, 0x24, 0x24),        // samuraiRed
            info: Color::Rgb(0x7F, 0xB4, 0xCA),         // springBlue

            bg_dark: Color::Rgb(0x16, 0x16, 0x1D),      // sumiInk0
            bg_highlight: Color::Rgb(0x36, 0x36, 0x46), // sumiInk3

            text: Color::Rgb(0xDC, 0xD7, 0xBA),         // fujiWhite
            text_muted: Color::Rgb(0xC8, 0xC0, 0x93),   // oldWhite
            text_dim: Color::Rgb(0x54, 0x54, 0x6D),     // sumiInk4

            mastered: Color::Rgb(0x98, 0xBB, 0x6C),
            accuracy: Color::Rgb(0x95, 0x7F, 0xB8),
            remaining: Color::Rgb(0xFF, 0xA0, 0x66),
        }
    }

    // ══════════════════════════════════════════════════════════════════════
    // Styles
    // ══════════════════════════════════════════════════════════════════════

    pub fn title(&self) -> Style {
        Style::default()
            .fg(self.colors.text)
            .add_modifier(Modifier::BOLD)
    }

    pub fn highlight(&self) -> Style {
        Style::default()
            .fg(self.colors.primary)
            .add_modifier(Modifier::BOLD)
    }

    pub fn selected(&self) -> Style {
        Style::default()
            .bg(self.colors.bg_highlight)
            .fg(self.colors.text)
    }

    pub fn prompt_side(&self) -> Style {
        Style::default()
            .fg(self.colors.primary)
            .add_modifier(Modifier::BOLD)
    }

    pub fn answer_side(&self) -> Style {
        Style::default()
            .fg(self.colors.success)
            .add_modifier(Modifier::BOLD)
    }

    pub fn muted(&self) -> Style {
        Style::default().fg(self.colors.text_muted)
    }

    pub fn dim(&self) -> Style {
        Style::default().fg(self.colors.text_dim)
    }

    pub fn feedback(&self, tone: Tone) -> Style {
        let color = match tone {
            Tone::Encouraging => self.colors.success,
            Tone::Critical => self.colors.warning,
            Tone::Progress => self.colors.accuracy,
        };
        Style::default().fg(color).add_modifier(Modifier::BOLD)
    }

    pub fn field_status(&self, status: Option<FieldStatus>) -> Style {
        match status {
            None => Style::default().fg(self.colors.text_muted),
            Some(FieldStatus::Correct) => Style::default().fg(self.colors.success),
            Some(FieldStatus::Incorrect) => Style::default().fg(self.colors.error),
            Some(FieldStatus::Empty) => Style::default().fg(self.colors.warning),
        }
    }

    pub fn key_hint(&self) -> Style {
        Style::default().fg(self.colors.text_dim)
    }

    pub fn key_highlight(&self) -> Style {
        Style::default()
            .fg(self.colors.accent)
            .add_modifier(Modifier::BOLD)
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::new(ThemeName::Default)
    }
}

// ══════════════════════════════════════════════════════════════════════════
// Icons
// ══════════════════════════════════════════════════════════════════════════

pub mod icons {
    pub const CHECK: &str = "✓";
    pub const CROSS: &str = "✗";
    pub const STAR: &str = "★";
    pub const DOT: &str = "●";
    pub const EMPTY: &str = "○";
}
