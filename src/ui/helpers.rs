use ratatui::style::{Modifier, Style};
use ratatui::text::Span;

use super::theme::Theme;

/// Pads or truncates `value` to exactly `width` characters.
pub fn clamp_name(value: &str, width: usize) -> String {
    let value_len = value.chars().count();
    if value_len <= width {
        return format!("{value:<width$}", width = width);
    }
    let trimmed = value
        .chars()
        .take(width.saturating_sub(2))
        .collect::<String>();
    format!("{trimmed}..")
}

/// A fixed-width table cell followed by a one-space gap.
pub fn cell(value: &str, width: usize, style: Style) -> Span<'static> {
    Span::styled(format!("{} ", clamp_name(value, width)), style)
}

/// Blank text in the spot of a missing value.
pub fn or_dash(value: &str) -> &str {
    if value.trim().is_empty() { "-" } else { value }
}

pub fn marker(selected: bool) -> Span<'static> {
    if selected {
        Span::styled(
            "> ",
            Style::default()
                .fg(Theme::selection_marker())
                .add_modifier(Modifier::BOLD),
        )
    } else {
        Span::styled("  ", Style::default().fg(Theme::dim()))
    }
}

pub fn checkbox(checked: bool) -> &'static str {
    if checked { "[x]" } else { "[ ]" }
}
