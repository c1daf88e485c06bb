use ratatui::{
    style::{Modifier, Style},
    text::{Line, Span, Text},
};

use super::helpers::{cell, checkbox, marker, or_dash};
use super::theme::Theme;
use crate::app::{App, Column};
use crate::editor::time_format::{EMPTY_TIME, clock_text};
use crate::editor::{DailyRow, DayRow, DraftState, EditSession, GridLine, LineKind, NewRecord};
use crate::types::{LOCKED_STATUS, TimeField, Worklog};

const DATE_W: usize = 10;
const SHIFT_W: usize = 14;
const PROJECT_W: usize = 16;
const TIME_W: usize = 7;
const HOURS_W: usize = 7;
const STATE_W: usize = 10;

/// Header block with the user's totals and the bulk action bar.
fn header_lines(app: &App) -> Vec<Line<'static>> {
    let name = app
        .user
        .as_ref()
        .map(|user| {
            if user.user_name.is_empty() {
                format!("User #{}", user.user_id)
            } else {
                user.user_name.clone()
            }
        })
        .unwrap_or_default();
    let label = Style::default().fg(Theme::dim());
    let value = Style::default()
        .fg(Theme::accent())
        .add_modifier(Modifier::BOLD);

    let mut lines = vec![
        Line::from(vec![
            Span::styled(
                name,
                Style::default()
                    .fg(Theme::text())
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(format!("  {}", app.range), label),
        ]),
        Line::from(vec![
            Span::styled("Total ", label),
            Span::styled(or_dash(&app.stats.total_hours).to_string(), value),
            Span::styled("  Payable ", label),
            Span::styled(or_dash(&app.stats.payable_total_hours).to_string(), value),
            Span::styled("  Amount ", label),
            Span::styled(or_dash(&app.stats.total_payable_amount).to_string(), value),
            Span::styled("  Requests ", label),
            Span::styled(
                app.stats.pending_request_count.to_string(),
                if app.stats.pending_request_count > 0 {
                    Style::default().fg(Theme::warn()).add_modifier(Modifier::BOLD)
                } else {
                    value
                },
            ),
            Span::styled("  Conflicts ", label),
            Span::styled(
                app.stats.total_conflicts.to_string(),
                if app.stats.total_conflicts > 0 {
                    Style::default().fg(Theme::error()).add_modifier(Modifier::BOLD)
                } else {
                    value
                },
            ),
        ]),
    ];

    if !app.selection.is_empty() {
        let status = app.selection.lock_status(&app.rows);
        let mut actions = Vec::new();
        if status.has_unlocked_rows {
            actions.push("L: Lock");
        }
        if status.has_locked_rows {
            actions.push("U: Unlock");
        }
        actions.push("D: Delete");
        lines.push(Line::from(vec![
            Span::styled(
                format!("{} day(s) selected  ", app.selection.len()),
                Style::default()
                    .fg(Theme::highlight())
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(actions.join("  "), Style::default().fg(Theme::text())),
        ]));
    }
    lines
}

fn column_titles() -> Line<'static> {
    let style = Style::default()
        .fg(Theme::secondary())
        .add_modifier(Modifier::BOLD);
    Line::from(vec![
        Span::raw("      "),
        cell("Date", DATE_W, style),
        cell("Day", HOURS_W, style),
        cell("Shift", SHIFT_W, style),
        cell("Project", PROJECT_W, style),
        cell("Start", TIME_W, style),
        cell("End", TIME_W, style),
        cell("Hours", HOURS_W, style),
        cell("State", STATE_W, style),
        Span::styled("Notes", style),
    ])
}

/// Builds the details grid; also returns the text line the cursor is on.
pub fn build_details_text(app: &App) -> (Text<'static>, usize) {
    let mut lines = header_lines(app);
    lines.push(Line::from(""));

    if app.rows.is_empty() {
        let message = if app.loading_details {
            "Loading timesheet..."
        } else {
            "No timesheet data for this range. Press [ or ] to change week."
        };
        lines.push(Line::from(Span::styled(
            message,
            Style::default().fg(Theme::dim()),
        )));
        return (Text::from(lines), 0);
    }

    lines.push(column_titles());
    let grid_start = lines.len();
    for (index, line) in app.lines().iter().enumerate() {
        lines.push(render_line(app, line, index == app.cursor));
    }
    (Text::from(lines), grid_start + app.cursor)
}

fn render_line(app: &App, line: &GridLine, focused: bool) -> Line<'static> {
    let day = match app.rows.get(line.row) {
        Some(DailyRow::Week(week)) => {
            return Line::from(Span::styled(
                format!(
                    "  Week {}  total {}  payable {}",
                    week.week_range,
                    or_dash(&week.weekly_total_hours),
                    or_dash(&week.weekly_payable_amount)
                ),
                Style::default()
                    .fg(Theme::accent())
                    .add_modifier(Modifier::BOLD),
            ));
        }
        Some(DailyRow::Day(day)) => day,
        None => return Line::from(""),
    };

    let mut spans = vec![marker(focused)];
    spans.extend(day_prefix(app, day, line.first_of_span));
    match &line.kind {
        LineKind::Worklog(id) => {
            if let Some(log) = day.worklog(*id) {
                spans.extend(worklog_cells(app, log, focused));
            }
        }
        LineKind::Draft(key) => {
            if let Some(draft) = app.drafts.get(key) {
                spans.extend(draft_cells(app, draft, focused));
            }
        }
        LineKind::Placeholder => {
            spans.push(Span::styled(
                format!(
                    "{:<width$}",
                    "no worklogs (Enter or n to add)",
                    width = SHIFT_W + PROJECT_W + 2 * TIME_W + HOURS_W + 5
                ),
                Style::default().fg(Theme::dim()),
            ));
            spans.push(cell("", STATE_W, Style::default()));
            spans.push(day_state(day.status));
        }
        LineKind::WeekHeader => {}
    }
    if line.first_of_span {
        if let Some(notes) = day.employee_notes.as_deref() {
            spans.push(Span::styled(
                notes.to_string(),
                Style::default().fg(Theme::dim()),
            ));
        }
    }
    Line::from(spans)
}

fn day_prefix(app: &App, day: &DayRow, first: bool) -> Vec<Span<'static>> {
    if !first {
        return vec![
            Span::raw("    "),
            cell("", DATE_W, Style::default()),
            cell("", HOURS_W, Style::default()),
        ];
    }
    let selected = app.selection.contains(&day.key);
    let style = if selected {
        Style::default()
            .fg(Theme::highlight())
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Theme::text())
    };
    vec![
        Span::styled(format!("{} ", checkbox(selected)), style),
        cell(&day.date, DATE_W, style),
        cell(
            or_dash(&day.daily_total),
            HOURS_W,
            Style::default().fg(Theme::accent()),
        ),
    ]
}

fn day_state(status: i64) -> Span<'static> {
    if status == LOCKED_STATUS {
        Span::styled("locked ", Style::default().fg(Theme::locked()))
    } else {
        Span::raw("")
    }
}

fn focus(style: Style, focused: bool, column: Column, current: Column) -> Style {
    if focused && column == current {
        style.add_modifier(Modifier::REVERSED)
    } else {
        style
    }
}

fn worklog_cells(app: &App, log: &Worklog, focused: bool) -> Vec<Span<'static>> {
    let id = log.worklog_id;
    let base = if log.is_locked() {
        Style::default().fg(Theme::locked())
    } else {
        Style::default().fg(Theme::text())
    };
    let editing = Style::default()
        .fg(Theme::warn())
        .add_modifier(Modifier::BOLD);

    let mut shift = log.shift_name.clone().unwrap_or_default();
    let mut project = log.project_name.clone().unwrap_or_default();
    let mut start = clock_text(log.start.as_deref());
    let mut end = clock_text(log.end.as_deref());
    let (mut shift_style, mut project_style, mut start_style, mut end_style) =
        (base, base, base, base);

    match app.editing.session(id) {
        Some(EditSession::Shift { shift_id }) => {
            shift = format!("<{}>", shift_name(app, *shift_id));
            shift_style = editing;
        }
        Some(EditSession::Project { project_id }) => {
            project = format!("<{}>", project_name(app, *project_id));
            project_style = editing;
        }
        Some(EditSession::Time {
            field,
            start: pending_start,
            end: pending_end,
        }) => {
            start = pending_start.clone();
            end = pending_end.clone();
            match field {
                TimeField::Start => {
                    start.push('_');
                    start_style = editing;
                }
                TimeField::End => {
                    end.push('_');
                    end_style = editing;
                }
            }
        }
        None => {}
    }

    let state = if app.editing.is_saving(id) {
        Span::styled(
            format!("{:<width$} ", "saving...", width = STATE_W),
            Style::default().fg(Theme::warn()),
        )
    } else if let Some(err) = app.editing.error(id) {
        Span::styled(
            format!("{err} "),
            Style::default().fg(Theme::error()),
        )
    } else if log.is_locked() {
        cell("locked", STATE_W, Style::default().fg(Theme::locked()))
    } else if log.was_edited() {
        cell("edited", STATE_W, Style::default().fg(Theme::dim()))
    } else {
        cell("", STATE_W, Style::default())
    };

    vec![
        cell(&shift, SHIFT_W, focus(shift_style, focused, Column::Shift, app.column)),
        cell(&project, PROJECT_W, focus(project_style, focused, Column::Project, app.column)),
        cell(&start, TIME_W, focus(start_style, focused, Column::Start, app.column)),
        cell(&end, TIME_W, focus(end_style, focused, Column::End, app.column)),
        cell(or_dash(&log.total_hours), HOURS_W, base),
        state,
    ]
}

fn draft_cells(app: &App, draft: &NewRecord, focused: bool) -> Vec<Span<'static>> {
    let base = Style::default().fg(Theme::warn());
    let time = |value: &str| {
        if value.is_empty() {
            EMPTY_TIME.to_string()
        } else {
            value.to_string()
        }
    };
    let (label, label_style) = match draft.state() {
        DraftState::Empty => ("new".to_string(), base),
        DraftState::Partial => ("draft".to_string(), base),
        DraftState::Ready => ("ready".to_string(), base),
        DraftState::Saving => ("saving...".to_string(), base),
        DraftState::Committed => ("saved".to_string(), Style::default().fg(Theme::success())),
        DraftState::Failed(message) => (
            format!("failed: {message}"),
            Style::default().fg(Theme::error()),
        ),
    };
    vec![
        cell(
            &shift_name(app, draft.shift_id),
            SHIFT_W,
            focus(base, focused, Column::Shift, app.column),
        ),
        cell(
            &project_name(app, draft.project_id),
            PROJECT_W,
            focus(base, focused, Column::Project, app.column),
        ),
        cell(
            &time(draft.time(TimeField::Start)),
            TIME_W,
            focus(base, focused, Column::Start, app.column),
        ),
        cell(
            &time(draft.time(TimeField::End)),
            TIME_W,
            focus(base, focused, Column::End, app.column),
        ),
        cell("", HOURS_W, base),
        Span::styled(format!("{label} "), label_style),
    ]
}

fn shift_name(app: &App, id: Option<u32>) -> String {
    id.and_then(|id| app.shifts.iter().find(|shift| shift.id == id))
        .map(|shift| shift.name.clone())
        .unwrap_or_else(|| "-".to_string())
}

fn project_name(app: &App, id: Option<u32>) -> String {
    id.and_then(|id| app.projects.iter().find(|project| project.id == id))
        .map(|project| project.name.clone())
        .unwrap_or_else(|| "-".to_string())
}
