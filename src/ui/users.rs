use ratatui::{
    style::{Modifier, Style},
    text::{Line, Span, Text},
};

use super::helpers::{cell, clamp_name, marker, or_dash};
use super::theme::Theme;
use crate::app::App;
use crate::types::TimeClock;

pub fn build_users_text(app: &App) -> Text<'static> {
    let mut lines = vec![Line::from(vec![
        Span::styled("Range ", Style::default().fg(Theme::dim())),
        Span::styled(
            app.range.to_string(),
            Style::default()
                .fg(Theme::accent())
                .add_modifier(Modifier::BOLD),
        ),
    ])];
    lines.push(Line::from(""));

    if app.users.is_empty() {
        let message = if app.loading_users {
            "Loading users..."
        } else {
            "No users found. Press 'r' to refresh."
        };
        lines.push(Line::from(message));
        return Text::from(lines);
    }

    let title = Style::default()
        .fg(Theme::secondary())
        .add_modifier(Modifier::BOLD);
    lines.push(Line::from(vec![
        Span::raw("  "),
        cell("Name", 24, title),
        cell("Hours", 8, title),
        cell("Payable", 8, title),
        cell("Pricework", 10, title),
        cell("Expenses", 10, title),
        cell("Amount", 10, title),
        Span::styled("Open", title),
    ]));

    for (index, user) in app.users.iter().enumerate() {
        lines.push(user_line(user, index == app.selected_user_index));
    }
    Text::from(lines)
}

fn user_line(user: &TimeClock, selected: bool) -> Line<'static> {
    let style = if selected {
        Style::default()
            .fg(Theme::highlight())
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Theme::text())
    };
    let mut flags = Vec::new();
    if !user.has_open_items() {
        flags.push("-");
    }
    if user.has_worklog_request {
        flags.push("worklog");
    }
    if user.has_leave_request {
        flags.push("leave");
    }
    if user.has_expense_request {
        flags.push("expense");
    }
    Line::from(vec![
        marker(selected),
        Span::styled(format!("{} ", clamp_name(&user.user_name, 24)), style),
        cell(or_dash(&user.total_hours), 8, style),
        cell(or_dash(&user.payable_total_hours), 8, style),
        cell(or_dash(&user.pricework_total_amount), 10, style),
        cell(or_dash(&user.total_expense_amount), 10, style),
        cell(or_dash(&user.total_payable_amount), 10, style),
        Span::styled(flags.join(", "), Style::default().fg(Theme::warn())),
    ])
}
