/// Flattens the server's week → day → worklog tree into table rows.
use crate::types::{Day, Week, Worklog, WorklogId};

use super::drafts::{DraftKey, DraftStore};

/// Stable identity of a day row: its date label.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DayKey(pub String);

#[derive(Clone, Debug, PartialEq)]
pub struct WeekRow {
    pub week_range: String,
    pub weekly_total_hours: String,
    pub weekly_payable_amount: String,
}

/// Worklogs of a day. `Worklogs` is never empty; an empty day is a `Placeholder`.
#[derive(Clone, Debug, PartialEq)]
pub enum DayEntries {
    Placeholder,
    Worklogs(Vec<Worklog>),
}

#[derive(Clone, Debug, PartialEq)]
pub struct DayRow {
    pub key: DayKey,
    pub date: String,
    pub daily_total: String,
    pub daily_payable_amount: String,
    pub status: i64,
    pub employee_notes: Option<String>,
    pub timesheet_light_id: Option<u32>,
    pub entries: DayEntries,
}

impl DayRow {
    fn from_day(day: &Day) -> Self {
        let entries = if day.worklogs.is_empty() {
            DayEntries::Placeholder
        } else {
            DayEntries::Worklogs(day.worklogs.clone())
        };
        Self {
            key: DayKey(day.date.clone()),
            date: day.date.clone(),
            daily_total: day.daily_total.clone(),
            daily_payable_amount: day.daily_payable_amount.clone(),
            status: day.status,
            employee_notes: day.employee_notes.clone(),
            timesheet_light_id: day.timesheet_light_id,
            entries,
        }
    }

    pub fn worklogs(&self) -> &[Worklog] {
        match &self.entries {
            DayEntries::Placeholder => &[],
            DayEntries::Worklogs(worklogs) => worklogs,
        }
    }

    pub fn worklog(&self, id: WorklogId) -> Option<&Worklog> {
        self.worklogs().iter().find(|log| log.worklog_id == id)
    }

    pub fn is_placeholder(&self) -> bool {
        matches!(self.entries, DayEntries::Placeholder)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum DailyRow {
    Week(WeekRow),
    Day(DayRow),
}

impl DailyRow {
    pub fn as_day(&self) -> Option<&DayRow> {
        match self {
            DailyRow::Day(day) => Some(day),
            DailyRow::Week(_) => None,
        }
    }
}

/// One week separator per week, then one row per day.
pub fn project_rows(weeks: &[Week]) -> Vec<DailyRow> {
    weeks
        .iter()
        .flat_map(|week| {
            std::iter::once(DailyRow::Week(WeekRow {
                week_range: week.week_range.clone(),
                weekly_total_hours: week.weekly_total_hours.clone(),
                weekly_payable_amount: week.weekly_payable_amount.clone(),
            }))
            .chain(week.days.iter().map(|day| DailyRow::Day(DayRow::from_day(day))))
        })
        .collect()
}

pub fn days(rows: &[DailyRow]) -> impl Iterator<Item = &DayRow> {
    rows.iter().filter_map(DailyRow::as_day)
}

/// Number of table lines a day occupies: its worklogs plus its drafts, at least one.
pub fn row_span(day: &DayRow, drafts_for_day: usize) -> usize {
    (day.worklogs().len() + drafts_for_day).max(1)
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LineKind {
    WeekHeader,
    Placeholder,
    Worklog(WorklogId),
    Draft(DraftKey),
}

/// A rendered table line. Day-level columns (date, selection, totals, notes)
/// are drawn only on the line with `first_of_span`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GridLine {
    pub row: usize,
    pub kind: LineKind,
    pub first_of_span: bool,
}

pub fn grid_lines(rows: &[DailyRow], drafts: &DraftStore) -> Vec<GridLine> {
    let mut lines = Vec::new();
    for (row, daily) in rows.iter().enumerate() {
        let day = match daily {
            DailyRow::Week(_) => {
                lines.push(GridLine {
                    row,
                    kind: LineKind::WeekHeader,
                    first_of_span: true,
                });
                continue;
            }
            DailyRow::Day(day) => day,
        };
        let draft_keys = drafts.keys_for(&day.date);
        let span = row_span(day, draft_keys.len());
        let mut kinds = day
            .worklogs()
            .iter()
            .map(|log| LineKind::Worklog(log.worklog_id))
            .collect::<Vec<_>>();
        kinds.extend(draft_keys.into_iter().map(LineKind::Draft));
        if kinds.is_empty() {
            kinds.push(LineKind::Placeholder);
        }
        debug_assert_eq!(kinds.len(), span);
        for (index, kind) in kinds.into_iter().enumerate() {
            lines.push(GridLine {
                row,
                kind,
                first_of_span: index == 0,
            });
        }
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Project, Shift};

    fn worklog(id: WorklogId, status: i64) -> Worklog {
        Worklog {
            worklog_id: id,
            start: Some("09:00".to_string()),
            end: Some("17:00".to_string()),
            status,
            ..Worklog::default()
        }
    }

    fn sample_weeks() -> Vec<Week> {
        vec![Week {
            week_range: "03/06 - 09/06".to_string(),
            weekly_total_hours: "16:00".to_string(),
            weekly_payable_amount: "240.00".to_string(),
            days: vec![
                Day {
                    date: "Mon 3/6".to_string(),
                    timesheet_light_id: Some(10),
                    worklogs: vec![worklog(1, 1), worklog(2, 1)],
                    ..Day::default()
                },
                Day {
                    date: "Tue 4/6".to_string(),
                    ..Day::default()
                },
            ],
        }]
    }

    #[test]
    fn weeks_become_separator_then_days() {
        let rows = project_rows(&sample_weeks());
        assert_eq!(rows.len(), 3);
        assert!(matches!(rows[0], DailyRow::Week(_)));
        let monday = rows[1].as_day().unwrap();
        assert_eq!(monday.worklogs().len(), 2);
        let tuesday = rows[2].as_day().unwrap();
        assert!(tuesday.is_placeholder());
        assert!(tuesday.worklogs().is_empty());
    }

    #[test]
    fn row_span_counts_worklogs_and_drafts() {
        let rows = project_rows(&sample_weeks());
        let monday = rows[1].as_day().unwrap();
        let tuesday = rows[2].as_day().unwrap();
        assert_eq!(row_span(monday, 0), 2);
        assert_eq!(row_span(monday, 1), 3);
        assert_eq!(row_span(tuesday, 0), 1);
        assert_eq!(row_span(tuesday, 2), 2);
    }

    #[test]
    fn grid_lines_mark_the_first_line_of_each_span() {
        let rows = project_rows(&sample_weeks());
        let mut drafts = DraftStore::default();
        let shifts = vec![Shift {
            id: 1,
            name: "Day".to_string(),
        }];
        let projects: Vec<Project> = Vec::new();
        let key = drafts.start_adding_new_record("Tue 4/6", &projects, &shifts, 1_000);

        let lines = grid_lines(&rows, &drafts);
        let kinds = lines.iter().map(|line| line.kind.clone()).collect::<Vec<_>>();
        assert_eq!(
            kinds,
            vec![
                LineKind::WeekHeader,
                LineKind::Worklog(1),
                LineKind::Worklog(2),
                LineKind::Draft(key),
            ]
        );
        let firsts = lines.iter().map(|line| line.first_of_span).collect::<Vec<_>>();
        assert_eq!(firsts, vec![true, true, false, true]);
    }
}
