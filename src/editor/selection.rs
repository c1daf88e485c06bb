/// Day selection for bulk lock, unlock and delete.
use std::collections::BTreeSet;

use crate::api::{IdsBody, Mutation};
use crate::error::EditError;
use crate::types::{LOCKED_STATUS, TimesheetId, WorklogId};

use super::projection::{DailyRow, DayKey, DayRow, days};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LockStatus {
    pub has_locked_rows: bool,
    pub has_unlocked_rows: bool,
}

/// Selected days, keyed by date label so a reload cannot shift the selection
/// onto different rows.
#[derive(Clone, Debug, Default)]
pub struct Selection {
    keys: BTreeSet<DayKey>,
}

impl Selection {
    pub fn contains(&self, key: &DayKey) -> bool {
        self.keys.contains(key)
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn toggle(&mut self, key: &DayKey) {
        if !self.keys.remove(key) {
            self.keys.insert(key.clone());
        }
    }

    /// Selects every day, or clears when everything is already selected.
    pub fn toggle_all(&mut self, rows: &[DailyRow]) {
        let all = days(rows).map(|day| day.key.clone()).collect::<BTreeSet<_>>();
        if !all.is_empty() && all.is_subset(&self.keys) {
            self.keys.clear();
        } else {
            self.keys = all;
        }
    }

    pub fn clear(&mut self) {
        self.keys.clear();
    }

    /// Drops keys whose day is no longer present.
    pub fn prune(&mut self, rows: &[DailyRow]) {
        let present = days(rows).map(|day| &day.key).collect::<BTreeSet<_>>();
        self.keys.retain(|key| present.contains(key));
    }

    fn selected<'a>(&'a self, rows: &'a [DailyRow]) -> impl Iterator<Item = &'a DayRow> {
        days(rows).filter(|day| self.keys.contains(&day.key))
    }

    pub fn lock_status(&self, rows: &[DailyRow]) -> LockStatus {
        let mut status = LockStatus::default();
        for day in self.selected(rows) {
            let statuses = if day.is_placeholder() {
                vec![day.status]
            } else {
                day.worklogs().iter().map(|log| log.status).collect()
            };
            for value in statuses {
                if value == LOCKED_STATUS {
                    status.has_locked_rows = true;
                } else {
                    status.has_unlocked_rows = true;
                }
            }
        }
        status
    }

    /// Timesheet ids reachable from the selection, including those carried by
    /// individual worklogs. Each id appears once.
    pub fn timesheet_ids(&self, rows: &[DailyRow]) -> Vec<TimesheetId> {
        let mut ids = Vec::new();
        for day in self.selected(rows) {
            let nested = day.worklogs().iter().map(|log| log.timesheet_light_id);
            for id in std::iter::once(day.timesheet_light_id).chain(nested).flatten() {
                if !ids.contains(&id) {
                    ids.push(id);
                }
            }
        }
        ids
    }

    pub fn worklog_ids(&self, rows: &[DailyRow]) -> Vec<WorklogId> {
        let mut ids = Vec::new();
        for day in self.selected(rows) {
            for log in day.worklogs() {
                if !ids.contains(&log.worklog_id) {
                    ids.push(log.worklog_id);
                }
            }
        }
        ids
    }

    pub fn lock_mutation(&self, rows: &[DailyRow]) -> Result<Mutation, EditError> {
        let ids = self.timesheet_ids(rows);
        if ids.is_empty() {
            return Err(EditError::NothingSelected);
        }
        Ok(Mutation::ApproveTimesheets(IdsBody::new(&ids)))
    }

    pub fn unlock_mutation(&self, rows: &[DailyRow]) -> Result<Mutation, EditError> {
        let ids = self.timesheet_ids(rows);
        if ids.is_empty() {
            return Err(EditError::NothingSelected);
        }
        Ok(Mutation::UnapproveTimesheets(IdsBody::new(&ids)))
    }

    pub fn delete_mutation(&self, rows: &[DailyRow]) -> Result<Mutation, EditError> {
        let ids = self.worklog_ids(rows);
        if ids.is_empty() {
            return Err(EditError::NothingSelected);
        }
        Ok(Mutation::DeleteWorklogs(IdsBody::new(&ids)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::editor::projection::project_rows;
    use crate::types::{Day, Week, Worklog};

    fn log(id: WorklogId, status: i64, timesheet: Option<TimesheetId>) -> Worklog {
        Worklog {
            worklog_id: id,
            status,
            timesheet_light_id: timesheet,
            ..Worklog::default()
        }
    }

    fn rows() -> Vec<DailyRow> {
        project_rows(&[Week {
            week_range: "03/06 - 09/06".to_string(),
            days: vec![
                Day {
                    date: "Mon 3/6".to_string(),
                    timesheet_light_id: Some(100),
                    worklogs: vec![log(1, 6, Some(100)), log(2, 6, Some(101))],
                    ..Day::default()
                },
                Day {
                    date: "Tue 4/6".to_string(),
                    timesheet_light_id: Some(200),
                    worklogs: vec![log(3, 1, None)],
                    ..Day::default()
                },
                Day {
                    date: "Wed 5/6".to_string(),
                    timesheet_light_id: Some(300),
                    ..Day::default()
                },
            ],
            ..Week::default()
        }])
    }

    fn key(label: &str) -> DayKey {
        DayKey(label.to_string())
    }

    #[test]
    fn mixed_selection_reports_both_states() {
        let rows = rows();
        let mut selection = Selection::default();
        selection.toggle(&key("Mon 3/6"));
        selection.toggle(&key("Tue 4/6"));
        assert_eq!(
            selection.lock_status(&rows),
            LockStatus {
                has_locked_rows: true,
                has_unlocked_rows: true,
            }
        );

        selection.toggle(&key("Tue 4/6"));
        assert_eq!(
            selection.lock_status(&rows),
            LockStatus {
                has_locked_rows: true,
                has_unlocked_rows: false,
            }
        );
    }

    #[test]
    fn select_all_collects_nested_timesheets_once() {
        let rows = rows();
        let mut selection = Selection::default();
        selection.toggle_all(&rows);
        assert_eq!(selection.len(), 3);
        assert_eq!(selection.timesheet_ids(&rows), vec![100, 101, 200, 300]);
        assert_eq!(
            selection.lock_mutation(&rows),
            Ok(Mutation::ApproveTimesheets(IdsBody {
                ids: "100,101,200,300".to_string(),
            }))
        );
        assert_eq!(selection.worklog_ids(&rows), vec![1, 2, 3]);

        selection.toggle_all(&rows);
        assert!(selection.is_empty());
    }

    #[test]
    fn prune_drops_days_that_vanished() {
        let mut rows = rows();
        let mut selection = Selection::default();
        selection.toggle(&key("Wed 5/6"));
        selection.toggle(&key("Mon 3/6"));
        rows.truncate(2);
        selection.prune(&rows);
        assert!(selection.contains(&key("Mon 3/6")));
        assert!(!selection.contains(&key("Wed 5/6")));
    }

    #[test]
    fn selection_follows_days_across_reorders() {
        let rows = rows();
        let mut selection = Selection::default();
        selection.toggle(&key("Tue 4/6"));
        let mut reordered = rows.clone();
        reordered.swap(1, 3);
        selection.prune(&reordered);
        assert_eq!(selection.worklog_ids(&reordered), vec![3]);
    }

    #[test]
    fn empty_selection_builds_no_request() {
        let rows = rows();
        let selection = Selection::default();
        assert_eq!(selection.delete_mutation(&rows), Err(EditError::NothingSelected));
    }
}
