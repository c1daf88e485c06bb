use ratatui::{
    style::{Modifier, Style},
    text::{Line, Span, Text},
};

use super::theme::Theme;

pub fn build_help_text() -> Text<'static> {
    let mut lines = Vec::new();

    lines.push(Line::from(Span::styled(
        "Key bindings",
        Style::default()
            .fg(Theme::accent())
            .add_modifier(Modifier::BOLD),
    )));
    lines.push(Line::from(""));

    lines.push(section_title("Global"));
    lines.extend(section_lines(&[
        "q: Quit",
        "?: Toggle help",
        "x: Dismiss message",
        "[ / ]: Previous / next week",
        "esc: Back",
    ]));

    lines.push(Line::from(""));
    lines.push(section_title("Users"));
    lines.extend(section_lines(&[
        "Up/Down: Move selection",
        "Enter: Open timesheet",
        "r: Refresh",
    ]));

    lines.push(Line::from(""));
    lines.push(section_title("Timesheet"));
    lines.extend(section_lines(&[
        "Up/Down: Move between worklogs",
        "Left/Right or Tab: Move between Shift, Project, Start, End",
        "Enter: Edit cell (Enter saves, Esc cancels)",
        "Time edit: type digits, e.g. 900 -> 09:00, 1730 -> 17:30; Tab switches start/end",
        "Shift/Project edit: Up/Down to choose",
        "space: Select day  a: Select all",
        "L: Lock selected  U: Unlock selected  D: Delete selected",
        "n or +: New worklog on this day",
        "R: Edit requests  C: Conflicts  r: Refresh",
    ]));

    lines.push(Line::from(""));
    lines.push(section_title("New worklog row"));
    lines.extend(section_lines(&[
        "Type the start and end times; leaving a time cell formats it",
        "Enter on Shift/Project: next option",
        "The row saves itself once shift, start and end are filled in",
        "Delete or esc: Discard the row",
    ]));

    lines.push(Line::from(""));
    lines.push(section_title("Requests"));
    lines.extend(section_lines(&[
        "space: Select request  a: Select all pending",
        "y: Approve  n: Reject (asks for a reason)",
    ]));

    lines.push(Line::from(""));
    lines.push(section_title("Conflicts"));
    lines.extend(section_lines(&["Enter: Jump to the worklog in the timesheet"]));

    Text::from(lines)
}

fn section_title(title: &str) -> Line<'static> {
    Line::from(Span::styled(
        format!("  {title}"),
        Style::default()
            .fg(Theme::secondary())
            .add_modifier(Modifier::BOLD),
    ))
}

fn section_lines(items: &[&str]) -> Vec<Line<'static>> {
    items
        .iter()
        .map(|item| {
            Line::from(Span::styled(
                format!("  - {item}"),
                Style::default().fg(Theme::text()),
            ))
        })
        .collect()
}
