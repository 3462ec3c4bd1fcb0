//! Color palette and preset styles for the terminal UI.
//!
//! Dark background, teal accents, and semantic colors that line up with the
//! risk bands shown on the prediction screens.

use ratatui::style::{Color, Modifier, Style};

use crate::domain::RiskLevel;

/// Palette and style presets shared by every screen.
pub struct MedicalTheme;

impl MedicalTheme {
    // === Accent ===

    /// Teal accent for selections and focused widgets
    pub const PRIMARY: Color = Color::Rgb(13, 148, 136); // #0D9488

    /// Lighter teal for subtitles and key hints
    pub const PRIMARY_LIGHT: Color = Color::Rgb(45, 212, 191); // #2DD4BF

    /// Darker teal behind table headers
    pub const PRIMARY_DARK: Color = Color::Rgb(15, 118, 110); // #0F766E

    /// Slate for unfocused panel borders
    pub const BORDER: Color = Color::Rgb(148, 163, 184); // #94A3B8

    // === Semantic ===

    /// Service up, low risk, valid record
    pub const SUCCESS: Color = Color::Rgb(16, 185, 129); // #10B981

    /// Moderate band, degraded service
    pub const WARNING: Color = Color::Rgb(251, 191, 36); // #FBBF24

    /// Request failures and high risk
    pub const DANGER: Color = Color::Rgb(244, 63, 94); // #F43F5E

    /// Neutral notices
    pub const INFO: Color = Color::Rgb(59, 130, 246); // #3B82F6

    /// Text drawn on colored banners
    pub const BG_DARK: Color = Color::Rgb(15, 23, 42); // #0F172A

    // === Text ===

    /// Values and body text
    pub const TEXT_PRIMARY: Color = Color::Rgb(248, 250, 252); // #F8FAFC

    /// Labels
    pub const TEXT_SECONDARY: Color = Color::Rgb(148, 163, 184); // #94A3B8

    /// Placeholders and hints
    pub const TEXT_MUTED: Color = Color::Rgb(100, 116, 139); // #64748B

    // === Preset Styles ===

    /// Screen titles in the header
    #[must_use]
    pub fn title() -> Style {
        Style::default()
            .fg(Self::TEXT_PRIMARY)
            .add_modifier(Modifier::BOLD)
    }

    /// Panel titles
    #[must_use]
    pub fn subtitle() -> Style {
        Style::default()
            .fg(Self::PRIMARY_LIGHT)
            .add_modifier(Modifier::BOLD)
    }

    /// Body text
    #[must_use]
    pub fn text() -> Style {
        Style::default().fg(Self::TEXT_PRIMARY)
    }

    /// Field labels
    #[must_use]
    pub fn text_secondary() -> Style {
        Style::default().fg(Self::TEXT_SECONDARY)
    }

    /// Placeholders and empty states
    #[must_use]
    pub fn text_muted() -> Style {
        Style::default().fg(Self::TEXT_MUTED)
    }

    #[must_use]
    pub fn success() -> Style {
        Style::default().fg(Self::SUCCESS)
    }

    #[must_use]
    pub fn warning() -> Style {
        Style::default().fg(Self::WARNING)
    }

    /// Error messages and failed checks
    #[must_use]
    pub fn danger() -> Style {
        Style::default().fg(Self::DANGER)
    }

    #[must_use]
    pub fn info() -> Style {
        Style::default().fg(Self::INFO)
    }

    /// Highlighted table row or selected choice.
    #[must_use]
    pub fn selected() -> Style {
        Style::default()
            .fg(Self::BG_DARK)
            .bg(Self::PRIMARY)
            .add_modifier(Modifier::BOLD)
    }

    /// Focused form field and in-flight status text
    #[must_use]
    pub fn focused() -> Style {
        Style::default()
            .fg(Self::PRIMARY_LIGHT)
            .add_modifier(Modifier::BOLD)
    }

    /// Text cursor in input fields
    #[must_use]
    pub fn cursor() -> Style {
        Style::default().fg(Self::PRIMARY_LIGHT)
    }

    /// Panel border
    #[must_use]
    pub fn border() -> Style {
        Style::default().fg(Self::BORDER)
    }

    /// Border of the panel that has focus
    #[must_use]
    pub fn border_focused() -> Style {
        Style::default().fg(Self::PRIMARY)
    }

    /// Table header row
    #[must_use]
    pub fn header() -> Style {
        Style::default()
            .fg(Self::TEXT_PRIMARY)
            .bg(Self::PRIMARY_DARK)
            .add_modifier(Modifier::BOLD)
    }

    /// Key in a footer hint, e.g. `[Enter]`
    #[must_use]
    pub fn key_hint() -> Style {
        Style::default()
            .fg(Self::PRIMARY_LIGHT)
            .add_modifier(Modifier::BOLD)
    }

    /// Description next to a key hint
    #[must_use]
    pub fn key_desc() -> Style {
        Style::default().fg(Self::TEXT_SECONDARY)
    }

    /// Probability band color.
    #[must_use]
    pub fn risk_level(level: RiskLevel) -> Style {
        let (r, g, b) = level.color();
        Style::default().fg(Color::Rgb(r, g, b))
    }

    /// Banner style keyed on the server's risk flag.
    #[must_use]
    pub fn risk_banner(high_risk: bool) -> Style {
        let color = if high_risk { Self::DANGER } else { Self::SUCCESS };
        Style::default()
            .fg(Self::BG_DARK)
            .bg(color)
            .add_modifier(Modifier::BOLD)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_banner_follows_flag() {
        assert_eq!(MedicalTheme::risk_banner(true).bg, Some(MedicalTheme::DANGER));
        assert_eq!(MedicalTheme::risk_banner(false).bg, Some(MedicalTheme::SUCCESS));
    }
}
