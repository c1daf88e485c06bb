use ratatui::style::Color;

/// Terminal colour theme.
pub struct Theme;

impl Theme {
    /// Title badge
    pub fn primary() -> Color {
        Color::Magenta
    }

    /// Borders and section titles
    pub fn secondary() -> Color {
        Color::Cyan
    }

    /// Success notices, approved requests
    pub fn success() -> Color {
        Color::Green
    }

    /// Pending requests, drafts, saving marks
    pub fn warn() -> Color {
        Color::Yellow
    }

    /// Error notices, rejected requests, conflicts
    pub fn error() -> Color {
        Color::Red
    }

    /// Locked worklogs and days
    pub fn locked() -> Color {
        Color::Blue
    }

    pub fn highlight() -> Color {
        Color::Cyan
    }

    pub fn selection_marker() -> Color {
        Color::Green
    }

    pub fn dim() -> Color {
        Color::DarkGray
    }

    pub fn text() -> Color {
        Color::White
    }

    /// Totals and counts
    pub fn accent() -> Color {
        Color::LightBlue
    }
}
