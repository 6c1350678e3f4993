//! Color constants and small text helpers for the TUI.

use ratatui::style::Color;

/// Header bar foreground.
pub const HEADER_FG: Color = Color::White;
/// Header bar background.
pub const HEADER_BG: Color = Color::DarkGray;
/// Slide value color when the entity is available.
pub const VALUE_OK: Color = Color::Yellow;
/// Slide value color when the entity is unavailable.
pub const VALUE_UNAVAILABLE: Color = Color::Red;
/// Active page dot.
pub const DOT_ACTIVE: Color = Color::Yellow;
/// Inactive page dots.
pub const DOT_INACTIVE: Color = Color::DarkGray;
/// Footer help text color.
pub const FOOTER_FG: Color = Color::DarkGray;

/// Page indicator: one dot per slide, the active one filled.
pub fn dots(index: usize, count: usize) -> Vec<(&'static str, bool)> {
    (0..count).map(|i| if i == index { ("●", true) } else { ("○", false) }).collect()
}

/// Strips the `mdi:` prefix so icons read as plain words in a terminal.
pub fn icon_label(icon: &str) -> &str {
    icon.strip_prefix("mdi:").unwrap_or(icon)
}
