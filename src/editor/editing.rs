/// In-flight edits of existing worklogs.
use std::collections::{HashMap, HashSet};

use tracing::{debug, warn};

use crate::api::{EditProjectBody, EditShiftBody, EditWorklogBody, Mutation};
use crate::error::EditError;
use crate::types::{ProjectId, ShiftId, TimeField, Worklog, WorklogId};

use super::time_format::{EMPTY_TIME, clock_text, is_valid_hhmm, normalize_time};

/// What is being edited on one worklog. No entry in the store means not editing.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EditSession {
    Time {
        field: TimeField,
        start: String,
        end: String,
    },
    Shift {
        shift_id: Option<ShiftId>,
    },
    Project {
        project_id: Option<ProjectId>,
    },
}

/// Result of a save attempt that passed validation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SaveOutcome {
    /// There was no matching session.
    NoSession,
    /// The worklog is locked; the session was dropped.
    Discarded,
    /// Nothing changed; the session was dropped without a request.
    Unchanged,
    /// The worklog is now saving; send this and call `finish_save` afterwards.
    Send(Mutation),
}

#[derive(Debug, Default)]
pub struct EditingStore {
    sessions: HashMap<WorklogId, EditSession>,
    saving: HashSet<WorklogId>,
    errors: HashMap<WorklogId, EditError>,
}

fn editable_text(value: Option<&str>) -> String {
    let text = clock_text(value);
    if text == EMPTY_TIME { String::new() } else { text }
}

impl EditingStore {
    pub fn session(&self, id: WorklogId) -> Option<&EditSession> {
        self.sessions.get(&id)
    }

    pub fn is_editing(&self, id: WorklogId) -> bool {
        self.sessions.contains_key(&id)
    }

    pub fn is_saving(&self, id: WorklogId) -> bool {
        self.saving.contains(&id)
    }

    pub fn saving_count(&self) -> usize {
        self.saving.len()
    }

    pub fn error(&self, id: WorklogId) -> Option<&EditError> {
        self.errors.get(&id)
    }

    fn can_open(&self, id: WorklogId, log: &Worklog) -> bool {
        !log.is_locked() && !self.saving.contains(&id)
    }

    /// Opens a time edit on `field`. Locked or saving worklogs are left alone.
    pub fn start_editing_field(&mut self, id: WorklogId, field: TimeField, log: &Worklog) -> bool {
        if !self.can_open(id, log) {
            return false;
        }
        self.errors.remove(&id);
        match self.sessions.get_mut(&id) {
            Some(EditSession::Time { field: current, .. }) => *current = field,
            _ => {
                self.sessions.insert(
                    id,
                    EditSession::Time {
                        field,
                        start: editable_text(log.start.as_deref()),
                        end: editable_text(log.end.as_deref()),
                    },
                );
            }
        }
        true
    }

    pub fn update_editing_field(&mut self, id: WorklogId, value: String) {
        if let Some(EditSession::Time { field, start, end }) = self.sessions.get_mut(&id) {
            match field {
                TimeField::Start => *start = value,
                TimeField::End => *end = value,
            }
            self.errors.remove(&id);
        }
    }

    pub fn cancel_editing_field(&mut self, id: WorklogId) {
        if matches!(self.sessions.get(&id), Some(EditSession::Time { .. })) {
            self.sessions.remove(&id);
            self.errors.remove(&id);
        }
    }

    pub fn start_editing_shift(&mut self, id: WorklogId, log: &Worklog) -> bool {
        if !self.can_open(id, log) {
            return false;
        }
        self.sessions.insert(
            id,
            EditSession::Shift {
                shift_id: log.shift_id,
            },
        );
        true
    }

    pub fn update_editing_shift(&mut self, id: WorklogId, value: ShiftId) {
        if let Some(EditSession::Shift { shift_id }) = self.sessions.get_mut(&id) {
            *shift_id = Some(value);
        }
    }

    pub fn cancel_editing_shift(&mut self, id: WorklogId) {
        if matches!(self.sessions.get(&id), Some(EditSession::Shift { .. })) {
            self.sessions.remove(&id);
        }
    }

    pub fn start_editing_project(&mut self, id: WorklogId, log: &Worklog) -> bool {
        if !self.can_open(id, log) {
            return false;
        }
        self.sessions.insert(
            id,
            EditSession::Project {
                project_id: log.project_id,
            },
        );
        true
    }

    pub fn update_editing_project(&mut self, id: WorklogId, value: ProjectId) {
        if let Some(EditSession::Project { project_id }) = self.sessions.get_mut(&id) {
            *project_id = Some(value);
        }
    }

    pub fn cancel_editing_project(&mut self, id: WorklogId) {
        if matches!(self.sessions.get(&id), Some(EditSession::Project { .. })) {
            self.sessions.remove(&id);
        }
    }

    /// Drops every session, e.g. after a reload replaced the rows.
    pub fn clear_sessions(&mut self) {
        self.sessions.clear();
        self.errors.clear();
    }

    /// Keeps sessions only for worklogs that still exist after a reload.
    pub fn retain_present(&mut self, present: &HashSet<WorklogId>) {
        self.sessions.retain(|id, _| present.contains(id));
        self.errors.retain(|id, _| present.contains(id));
    }

    pub fn save_field_changes(
        &mut self,
        id: WorklogId,
        original: &Worklog,
    ) -> Result<SaveOutcome, EditError> {
        let Some(EditSession::Time { field, start, end }) = self.sessions.get(&id) else {
            return Ok(SaveOutcome::NoSession);
        };
        if original.is_locked() {
            self.sessions.remove(&id);
            return Ok(SaveOutcome::Discarded);
        }

        let new_start = normalize_time(Some(start.as_str()));
        let new_end = normalize_time(Some(end.as_str()));
        let old_start = normalize_time(original.start.as_deref());
        let old_end = normalize_time(original.end.as_deref());
        if new_start == old_start && new_end == old_end {
            debug!(worklog_id = id, "time_edit_unchanged");
            self.sessions.remove(&id);
            return Ok(SaveOutcome::Unchanged);
        }

        for (check, value) in [(TimeField::Start, &new_start), (TimeField::End, &new_end)] {
            if value != EMPTY_TIME && !is_valid_hhmm(value) {
                let raw = match check {
                    TimeField::Start => start.clone(),
                    TimeField::End => end.clone(),
                };
                let err = EditError::InvalidTime {
                    field: check,
                    value: raw,
                };
                warn!(worklog_id = id, field = %field, error = %err, "time_edit_invalid");
                self.errors.insert(id, err.clone());
                return Err(err);
            }
        }

        let wire = |value: String| if value == EMPTY_TIME { String::new() } else { value };
        let body = EditWorklogBody {
            user_worklog_id: original.worklog_id,
            date: original.date_added.clone().unwrap_or_default(),
            start_time: wire(new_start),
            end_time: wire(new_end),
        };
        self.sessions.remove(&id);
        self.errors.remove(&id);
        self.saving.insert(id);
        Ok(SaveOutcome::Send(Mutation::EditWorklog(body)))
    }

    pub fn save_shift_changes(&mut self, id: WorklogId, original: &Worklog) -> SaveOutcome {
        let Some(EditSession::Shift { shift_id }) = self.sessions.get(&id) else {
            return SaveOutcome::NoSession;
        };
        let shift_id = *shift_id;
        self.sessions.remove(&id);
        if original.is_locked() {
            return SaveOutcome::Discarded;
        }
        match shift_id {
            Some(shift_id) if Some(shift_id) != original.shift_id => {
                self.saving.insert(id);
                SaveOutcome::Send(Mutation::EditWorklogShift(EditShiftBody {
                    user_worklog_id: original.worklog_id,
                    shift_id,
                }))
            }
            _ => SaveOutcome::Unchanged,
        }
    }

    pub fn save_project_changes(&mut self, id: WorklogId, original: &Worklog) -> SaveOutcome {
        let Some(EditSession::Project { project_id }) = self.sessions.get(&id) else {
            return SaveOutcome::NoSession;
        };
        let project_id = *project_id;
        self.sessions.remove(&id);
        if original.is_locked() {
            return SaveOutcome::Discarded;
        }
        match project_id {
            Some(project_id) if Some(project_id) != original.project_id => {
                self.saving.insert(id);
                SaveOutcome::Send(Mutation::EditWorklogProject(EditProjectBody {
                    user_worklog_id: original.worklog_id,
                    project_id,
                }))
            }
            _ => SaveOutcome::Unchanged,
        }
    }

    /// Clears the saving mark once the request has completed, whatever the result.
    pub fn finish_save(&mut self, id: WorklogId) {
        self.saving.remove(&id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unlocked() -> Worklog {
        Worklog {
            worklog_id: 11,
            shift_id: Some(1),
            project_id: Some(3),
            start: Some("2024-06-03 08:00:00".to_string()),
            end: Some("2024-06-03 16:00:00".to_string()),
            date_added: Some("2024-06-03".to_string()),
            status: 1,
            ..Worklog::default()
        }
    }

    fn locked() -> Worklog {
        Worklog {
            status: 6,
            ..unlocked()
        }
    }

    #[test]
    fn locked_worklogs_never_open_a_session() {
        let mut store = EditingStore::default();
        let log = locked();
        assert!(!store.start_editing_field(11, TimeField::Start, &log));
        assert!(!store.start_editing_shift(11, &log));
        assert!(!store.start_editing_project(11, &log));
        assert!(store.session(11).is_none());
    }

    #[test]
    fn session_starts_from_the_displayed_times() {
        let mut store = EditingStore::default();
        store.start_editing_field(11, TimeField::End, &unlocked());
        assert_eq!(
            store.session(11),
            Some(&EditSession::Time {
                field: TimeField::End,
                start: "08:00".to_string(),
                end: "16:00".to_string(),
            })
        );
    }

    #[test]
    fn unchanged_values_make_no_request() {
        let mut store = EditingStore::default();
        let log = unlocked();
        store.start_editing_field(11, TimeField::Start, &log);
        store.update_editing_field(11, "8".to_string());
        assert_eq!(store.save_field_changes(11, &log), Ok(SaveOutcome::Unchanged));
        assert!(store.session(11).is_none());
        assert!(!store.is_saving(11));
    }

    #[test]
    fn typed_digits_are_formatted_into_the_request() {
        let mut store = EditingStore::default();
        let log = unlocked();
        store.start_editing_field(11, TimeField::Start, &log);
        store.update_editing_field(11, "900".to_string());
        store.start_editing_field(11, TimeField::End, &log);
        store.update_editing_field(11, "1730".to_string());

        let outcome = store.save_field_changes(11, &log).unwrap();
        assert_eq!(
            outcome,
            SaveOutcome::Send(Mutation::EditWorklog(EditWorklogBody {
                user_worklog_id: 11,
                date: "2024-06-03".to_string(),
                start_time: "09:00".to_string(),
                end_time: "17:30".to_string(),
            }))
        );
        assert!(store.session(11).is_none());
        assert!(store.is_saving(11));
        assert!(!store.start_editing_field(11, TimeField::Start, &log));

        store.finish_save(11);
        assert!(!store.is_saving(11));
    }

    #[test]
    fn invalid_text_keeps_the_session_open() {
        let mut store = EditingStore::default();
        let log = unlocked();
        store.start_editing_field(11, TimeField::Start, &log);
        store.update_editing_field(11, "soon".to_string());
        let err = store.save_field_changes(11, &log).unwrap_err();
        assert!(matches!(err, EditError::InvalidTime { field: TimeField::Start, .. }));
        assert!(store.is_editing(11));
        assert_eq!(store.error(11), Some(&err));
        assert!(!store.is_saving(11));
    }

    #[test]
    fn saving_after_the_log_got_locked_discards() {
        let mut store = EditingStore::default();
        store.start_editing_field(11, TimeField::Start, &unlocked());
        store.update_editing_field(11, "10".to_string());
        assert_eq!(
            store.save_field_changes(11, &locked()),
            Ok(SaveOutcome::Discarded)
        );
        assert!(store.session(11).is_none());
    }

    #[test]
    fn locked_shift_and_project_saves_are_discarded() {
        let mut store = EditingStore::default();
        store.start_editing_shift(11, &unlocked());
        store.update_editing_shift(11, 2);
        assert_eq!(store.save_shift_changes(11, &locked()), SaveOutcome::Discarded);
        assert!(store.session(11).is_none());
        assert!(!store.is_saving(11));

        store.start_editing_project(11, &unlocked());
        store.update_editing_project(11, 4);
        assert_eq!(store.save_project_changes(11, &locked()), SaveOutcome::Discarded);
        assert!(store.session(11).is_none());
        assert!(!store.is_saving(11));
    }

    #[test]
    fn shift_and_project_compare_raw_ids() {
        let mut store = EditingStore::default();
        let log = unlocked();

        store.start_editing_shift(11, &log);
        assert_eq!(store.save_shift_changes(11, &log), SaveOutcome::Unchanged);

        store.start_editing_shift(11, &log);
        store.update_editing_shift(11, 2);
        assert_eq!(
            store.save_shift_changes(11, &log),
            SaveOutcome::Send(Mutation::EditWorklogShift(EditShiftBody {
                user_worklog_id: 11,
                shift_id: 2,
            }))
        );
        store.finish_save(11);

        store.start_editing_project(11, &log);
        store.update_editing_project(11, 9);
        store.cancel_editing_shift(11);
        assert!(store.is_editing(11));
        store.cancel_editing_project(11);
        assert!(!store.is_editing(11));
    }
}
