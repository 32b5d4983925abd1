//! Color palette - Monochrome grayscale theme

use ratatui::style::Color;

/// Monochrome grayscale palette
#[derive(Debug, Clone, Copy)]
pub struct Palette {
    pub bg_highlight: Color,
    pub fg_primary: Color,
    pub fg_secondary: Color,
    /// Lyric lines away from the current one
    pub fg_dim: Color,
    pub accent: Color,
    pub border: Color,
    pub border_focused: Color,
    pub playing: Color,
    pub error: Color,
}

impl Palette {
    /// Monochrome palette - pure black, white, and grays
    pub const MONO: Self = Self {
        bg_highlight: Color::Rgb(48, 48, 48),     // #303030 dark gray
        fg_primary: Color::Rgb(255, 255, 255),    // #ffffff white
        fg_secondary: Color::Rgb(136, 136, 136),  // #888888 medium gray
        fg_dim: Color::Rgb(88, 88, 88),           // #585858
        accent: Color::Rgb(255, 255, 255),        // #ffffff white (accent = white)
        border: Color::Rgb(64, 64, 64),           // #404040 dark gray
        border_focused: Color::Rgb(160, 160, 160), // #a0a0a0
        playing: Color::Rgb(255, 255, 255),       // #ffffff white
        error: Color::Rgb(255, 255, 255),         // #ffffff white (errors still visible via icon)
    };
}

impl Default for Palette {
    fn default() -> Self {
        Self::MONO
    }
}
