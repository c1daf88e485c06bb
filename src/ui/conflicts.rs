use ratatui::{
    style::{Modifier, Style},
    text::{Line, Span, Text},
};

use super::helpers::{cell, marker};
use super::theme::Theme;
use crate::app::App;
use crate::editor::time_format::clock_text;

pub fn build_conflicts_text(app: &App) -> Text<'static> {
    let conflicts = &app.stats.conflicts;
    let mut lines = vec![Line::from(vec![
        Span::styled("Conflicts ", Style::default().fg(Theme::dim())),
        Span::styled(
            app.stats.total_conflicts.to_string(),
            Style::default()
                .fg(Theme::error())
                .add_modifier(Modifier::BOLD),
        ),
    ])];
    lines.push(Line::from(""));

    if conflicts.is_empty() {
        lines.push(Line::from("No conflicts in this range."));
        return Text::from(lines);
    }

    for (index, conflict) in conflicts.iter().enumerate() {
        let selected = index == app.selected_conflict_index;
        let style = if selected {
            Style::default()
                .fg(Theme::highlight())
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Theme::text())
        };
        let change = if conflict.old_start_time.is_some() || conflict.new_start_time.is_some() {
            format!(
                "{}-{} -> {}-{}",
                clock_text(conflict.old_start_time.as_deref()),
                clock_text(conflict.old_end_time.as_deref()),
                clock_text(conflict.new_start_time.as_deref()),
                clock_text(conflict.new_end_time.as_deref()),
            )
        } else {
            String::new()
        };
        lines.push(Line::from(vec![
            marker(selected),
            cell(&conflict.date, 10, style),
            cell(&conflict.message, 40, style),
            Span::styled(change, Style::default().fg(Theme::dim())),
        ]));
    }
    Text::from(lines)
}
