use ratatui::{
    style::{Modifier, Style},
    text::{Line, Span, Text},
};

use super::helpers::{cell, checkbox, marker, or_dash};
use super::theme::Theme;
use crate::app::App;
use crate::editor::time_format::clock_text;
use crate::types::{RequestItem, RequestStatus};

pub fn build_requests_text(app: &App) -> Text<'static> {
    let panel = &app.requests;
    let mut lines = vec![Line::from(vec![
        Span::styled("Pending ", Style::default().fg(Theme::dim())),
        Span::styled(
            panel.pending_count().to_string(),
            Style::default()
                .fg(Theme::warn())
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(format!("  of {}", panel.items.len()), Style::default().fg(Theme::dim())),
    ])];
    lines.push(Line::from(""));

    if panel.items.is_empty() {
        let message = if app.loading_requests {
            "Loading requests..."
        } else {
            "No edit requests in this range."
        };
        lines.push(Line::from(message));
        return Text::from(lines);
    }

    let title = Style::default()
        .fg(Theme::secondary())
        .add_modifier(Modifier::BOLD);
    lines.push(Line::from(vec![
        Span::raw("      "),
        cell("Date", 10, title),
        cell("Shift", 12, title),
        cell("Project", 14, title),
        cell("Current", 13, title),
        cell("Requested", 13, title),
        cell("Status", 9, title),
        Span::styled("Note", title),
    ]));
    for (index, item) in panel.items.iter().enumerate() {
        lines.push(request_line(
            item,
            index == panel.cursor,
            panel.is_selected(item.id),
        ));
    }
    Text::from(lines)
}

fn window(start: Option<&str>, end: Option<&str>) -> String {
    format!("{}-{}", clock_text(start), clock_text(end))
}

fn request_line(item: &RequestItem, focused: bool, checked: bool) -> Line<'static> {
    let style = if focused {
        Style::default()
            .fg(Theme::highlight())
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Theme::text())
    };
    let (status, status_style) = match item.status {
        RequestStatus::Pending => ("pending", Style::default().fg(Theme::warn())),
        RequestStatus::Approved => ("approved", Style::default().fg(Theme::success())),
        RequestStatus::Rejected => ("rejected", Style::default().fg(Theme::error())),
    };
    Line::from(vec![
        marker(focused),
        Span::styled(format!("{} ", checkbox(checked)), style),
        cell(&item.date, 10, style),
        cell(or_dash(item.shift_name.as_deref().unwrap_or("")), 12, style),
        cell(or_dash(item.project_name.as_deref().unwrap_or("")), 14, style),
        cell(
            &window(item.old_start_time.as_deref(), item.old_end_time.as_deref()),
            13,
            Style::default().fg(Theme::dim()),
        ),
        cell(
            &window(item.new_start_time.as_deref(), item.new_end_time.as_deref()),
            13,
            style,
        ),
        cell(status, 9, status_style),
        Span::styled(
            item.note.clone().unwrap_or_default(),
            Style::default().fg(Theme::dim()),
        ),
    ])
}
