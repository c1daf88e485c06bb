mod conflicts;
mod help;
mod helpers;
mod requests;
mod table;
mod theme;
mod users;

use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    prelude::Alignment,
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, BorderType, Borders, Clear, Paragraph},
};

use crate::app::{App, AppView, ConfirmPopup, NoticeLevel};
use crate::editor::RejectDialog;
use theme::Theme;

/// Renders the entire UI for a single frame.
pub fn draw(frame: &mut Frame, app: &App) {
    let area = frame.area();
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(5),
            Constraint::Length(3),
        ])
        .split(area);

    frame.render_widget(header(app), layout[0]);

    let (title, body_text, cursor_line) = match app.view {
        AppView::Users => (" Users ", users::build_users_text(app), 0),
        AppView::Details => {
            let (text, cursor) = table::build_details_text(app);
            (" Timesheet ", text, cursor)
        }
        AppView::Requests => (" Edit requests ", requests::build_requests_text(app), 0),
        AppView::Conflicts => (" Conflicts ", conflicts::build_conflicts_text(app), 0),
        AppView::Help => (" Help ", help::build_help_text(), 0),
    };

    let mut body_lines = vec![
        tabs_line(app),
        Line::from(""),
        Line::from(Span::styled(
            format!("  {title}"),
            Style::default()
                .fg(Theme::accent())
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
    ];
    let offset = body_lines.len();
    body_lines.extend(body_text.lines);
    body_lines.push(Line::from(""));
    body_lines.push(Line::from(Span::styled(
        "----------------------------------------",
        Style::default().fg(Theme::dim()),
    )));
    body_lines.extend(keybinds_lines(app));

    let visible = layout[1].height.saturating_sub(2) as usize;
    let scroll = (offset + cursor_line + 6).saturating_sub(visible);
    let body = Paragraph::new(Text::from(body_lines))
        .style(Style::default().fg(Theme::text()))
        .alignment(Alignment::Left)
        .scroll((scroll.min(u16::MAX as usize) as u16, 0))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .style(Style::default().fg(Theme::secondary())),
        );
    frame.render_widget(body, layout[1]);

    let footer = Paragraph::new(Text::from(footer_line(app)))
        .alignment(Alignment::Left)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .style(Style::default().fg(Theme::secondary())),
        );
    frame.render_widget(footer, layout[2]);

    if let Some(dialog) = &app.requests.reject_dialog {
        render_reject_dialog(frame, dialog);
    }
    if let Some(popup) = &app.confirm_popup {
        render_confirm_popup(frame, popup);
    }
}

fn header(app: &App) -> Paragraph<'static> {
    let mut spans = vec![
        Span::styled(
            "  Timeclock  ",
            Style::default().fg(Color::Black).bg(Theme::primary()),
        ),
        Span::raw(" "),
        Span::styled(
            app.range.to_string(),
            Style::default()
                .fg(Theme::secondary())
                .add_modifier(Modifier::BOLD),
        ),
    ];
    if let Some(user) = &app.user {
        spans.push(Span::styled("  ", Style::default()));
        spans.push(Span::styled(
            if user.user_name.is_empty() {
                format!("User #{}", user.user_id)
            } else {
                user.user_name.clone()
            },
            Style::default()
                .fg(Theme::text())
                .add_modifier(Modifier::BOLD),
        ));
    }
    Paragraph::new(Text::from(Line::from(spans)))
        .alignment(Alignment::Left)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .style(Style::default().fg(Theme::secondary())),
        )
}

fn tabs_line(app: &App) -> Line<'static> {
    let pending = app.stats.pending_request_count.max(app.requests.pending_count() as i64);
    let tabs = [
        ("Users".to_string(), AppView::Users),
        ("Timesheet".to_string(), AppView::Details),
        (format!("Requests ({pending})"), AppView::Requests),
        (
            format!("Conflicts ({})", app.stats.total_conflicts),
            AppView::Conflicts,
        ),
    ];

    let mut spans = Vec::new();
    for (index, (name, view)) in tabs.into_iter().enumerate() {
        if index > 0 {
            spans.push(Span::raw("  "));
        }
        let style = if view == app.view {
            Style::default()
                .fg(Color::Black)
                .bg(Theme::highlight())
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Theme::dim())
        };
        spans.push(Span::styled(format!(" {name} "), style));
    }
    Line::from(spans)
}

fn footer_line(app: &App) -> Line<'static> {
    if let Some(notice) = &app.notice {
        let (icon, color) = match notice.level {
            NoticeLevel::Success => ("✓", Theme::success()),
            NoticeLevel::Info => ("●", Theme::accent()),
            NoticeLevel::Error => ("✗", Theme::error()),
        };
        return Line::from(vec![
            Span::styled(
                format!("{icon} {}", notice.text),
                Style::default().fg(color).add_modifier(Modifier::BOLD),
            ),
            Span::styled("  (x to dismiss)", Style::default().fg(Theme::dim())),
        ]);
    }

    let saving = app.editing.saving_count();
    if saving > 0 {
        return Line::from(Span::styled(
            format!("Saving {saving} change(s)..."),
            Style::default().fg(Theme::warn()),
        ));
    }
    if app.is_busy() {
        return Line::from(Span::styled(
            "Loading...",
            Style::default().fg(Theme::warn()),
        ));
    }
    Line::from(Span::styled("● Up to date", Style::default().fg(Theme::dim())))
}

fn keybinds_lines(app: &App) -> Vec<Line<'static>> {
    let (primary, secondary) = match app.view {
        AppView::Users => (
            "Up/Down: Select  Enter: Open timesheet  [/]: Week",
            "r: Refresh  ?: Help  q: Quit",
        ),
        AppView::Details => (
            "Arrows: Move  Enter: Edit  space: Select  a: All  L/U: Lock/Unlock  D: Delete  n: New",
            "[/]: Week  R: Requests  C: Conflicts  r: Refresh  esc: Back  ?: Help  q: Quit",
        ),
        AppView::Requests => (
            "Up/Down: Move  space: Select  a: All pending  y: Approve  n: Reject",
            "esc: Back  r: Refresh  ?: Help  q: Quit",
        ),
        AppView::Conflicts => (
            "Up/Down: Move  Enter: Go to worklog",
            "esc: Back  r: Refresh  ?: Help  q: Quit",
        ),
        AppView::Help => ("Press ? or esc to close this help screen", ""),
    };
    vec![
        Line::from(Span::styled(primary, Style::default().fg(Theme::dim()))),
        Line::from(Span::styled(secondary, Style::default().fg(Theme::dim()))),
    ]
}

fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

fn render_reject_dialog(frame: &mut Frame, dialog: &RejectDialog) {
    let area = centered_rect(60, 35, frame.area());
    frame.render_widget(Clear, area);

    let lines = vec![
        Line::from(Span::styled(
            format!("Reject {} request(s)", dialog.ids.len()),
            Style::default()
                .fg(Theme::accent())
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(vec![
            Span::styled("Reason: ", Style::default().fg(Theme::dim())),
            Span::styled(
                dialog.reason.clone(),
                Style::default()
                    .fg(Theme::text())
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled("_", Style::default().fg(Theme::highlight())),
        ]),
        Line::from(""),
        Line::from(Span::styled(
            "Type a reason. Enter: reject. Esc: cancel.",
            Style::default().fg(Theme::dim()),
        )),
    ];

    let popup = Paragraph::new(Text::from(lines))
        .alignment(Alignment::Left)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .style(Style::default().fg(Theme::secondary()))
                .title(" Reject "),
        );
    frame.render_widget(popup, area);
}

fn render_confirm_popup(frame: &mut Frame, popup: &ConfirmPopup) {
    let area = centered_rect(60, 30, frame.area());
    frame.render_widget(Clear, area);

    let lines = vec![
        Line::from(Span::styled(
            "Confirm Action",
            Style::default()
                .fg(Theme::accent())
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(Span::styled(
            popup.message.clone(),
            Style::default().fg(Theme::text()),
        )),
        Line::from(""),
        Line::from(vec![
            Span::styled("Press ", Style::default().fg(Theme::dim())),
            Span::styled(
                "Y",
                Style::default()
                    .fg(Theme::highlight())
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(" to confirm or ", Style::default().fg(Theme::dim())),
            Span::styled(
                "N",
                Style::default()
                    .fg(Theme::highlight())
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled("/", Style::default().fg(Theme::dim())),
            Span::styled(
                "ESC",
                Style::default()
                    .fg(Theme::highlight())
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(" to cancel", Style::default().fg(Theme::dim())),
        ]),
    ];

    let popup_widget = Paragraph::new(Text::from(lines))
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .style(Style::default().fg(Theme::secondary()))
                .title(" Confirm "),
        );
    frame.render_widget(popup_widget, area);
}
