/// Client-only worklog drafts and their autosave state machine.
use std::collections::BTreeMap;
use std::fmt;

use tracing::warn;

use crate::api::{AddWorklogBody, Mutation, WEB_DEVICE_MODEL, WEB_DEVICE_TYPE};
use crate::error::EditError;
use crate::types::{DateRange, Project, ProjectId, Shift, ShiftId, TimeField, UserId};

use super::time_format::{is_valid_hhmm, parse_day_label, to_wire_day, validate_and_format_time};

/// Identity of a draft: the day label plus creation time in milliseconds.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DraftKey {
    pub date: String,
    pub created_ms: i64,
}

impl fmt::Display for DraftKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "new-{}-{}", self.date, self.created_ms)
    }
}

/// Lifecycle of a draft.
///
/// | from                         | event                | to                    |
/// |------------------------------|----------------------|-----------------------|
/// | Empty/Partial/Ready/Failed   | field edit or blur   | Empty, Partial, Ready |
/// | Ready                        | `SaveStarted`        | Saving                |
/// | Saving                       | `SaveSucceeded`      | Committed             |
/// | Saving                       | `SaveFailed`         | Failed                |
///
/// Anything else leaves the state alone. Entering `Ready` from another state
/// is the autosave trigger.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DraftState {
    Empty,
    Partial,
    Ready,
    Saving,
    Committed,
    Failed(String),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DraftEvent {
    SetShift(ShiftId),
    SetProject(Option<ProjectId>),
    EditTime(TimeField, String),
    Blur(TimeField),
    SaveStarted,
    SaveSucceeded,
    SaveFailed(String),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewRecord {
    pub key: DraftKey,
    pub date: String,
    pub shift_id: Option<ShiftId>,
    pub project_id: Option<ProjectId>,
    pub start: String,
    pub end: String,
    start_blurred: bool,
    end_blurred: bool,
    state: DraftState,
}

impl NewRecord {
    fn new(key: DraftKey, shift_id: Option<ShiftId>, project_id: Option<ProjectId>) -> Self {
        Self {
            date: key.date.clone(),
            key,
            shift_id,
            project_id,
            start: String::new(),
            end: String::new(),
            start_blurred: false,
            end_blurred: false,
            state: DraftState::Empty,
        }
    }

    pub fn state(&self) -> &DraftState {
        &self.state
    }

    pub fn time(&self, field: TimeField) -> &str {
        match field {
            TimeField::Start => &self.start,
            TimeField::End => &self.end,
        }
    }

    pub fn is_saving(&self) -> bool {
        self.state == DraftState::Saving
    }

    fn is_complete(&self) -> bool {
        self.shift_id.is_some()
            && self.start_blurred
            && self.end_blurred
            && is_valid_hhmm(&self.start)
            && is_valid_hhmm(&self.end)
    }

    fn settle(&self) -> DraftState {
        if self.is_complete() {
            DraftState::Ready
        } else if self.start.is_empty() && self.end.is_empty() {
            DraftState::Empty
        } else {
            DraftState::Partial
        }
    }

    /// Applies an event; returns `true` when the draft just became ready to save.
    pub fn apply(&mut self, event: DraftEvent) -> bool {
        let before = self.state.clone();
        match (&self.state, event) {
            (DraftState::Saving, DraftEvent::SaveSucceeded) => {
                self.state = DraftState::Committed;
            }
            (DraftState::Saving, DraftEvent::SaveFailed(message)) => {
                self.state = DraftState::Failed(message);
            }
            (DraftState::Ready, DraftEvent::SaveStarted) => {
                self.state = DraftState::Saving;
            }
            (DraftState::Saving | DraftState::Committed, _) => {}
            (
                _,
                DraftEvent::SaveStarted | DraftEvent::SaveSucceeded | DraftEvent::SaveFailed(_),
            ) => {}
            (_, DraftEvent::SetShift(shift_id)) => {
                self.shift_id = Some(shift_id);
                self.state = self.settle();
            }
            (_, DraftEvent::SetProject(project_id)) => {
                self.project_id = project_id;
                self.state = self.settle();
            }
            (_, DraftEvent::EditTime(field, value)) => {
                match field {
                    TimeField::Start => {
                        self.start = value;
                        self.start_blurred = false;
                    }
                    TimeField::End => {
                        self.end = value;
                        self.end_blurred = false;
                    }
                }
                self.state = self.settle();
            }
            (_, DraftEvent::Blur(field)) => {
                let (value, blurred) = match field {
                    TimeField::Start => (&mut self.start, &mut self.start_blurred),
                    TimeField::End => (&mut self.end, &mut self.end_blurred),
                };
                if !value.is_empty() {
                    *value = validate_and_format_time(value);
                }
                *blurred = true;
                self.state = self.settle();
            }
        }
        self.state == DraftState::Ready && before != DraftState::Ready
    }
}

#[derive(Debug, Default)]
pub struct DraftStore {
    records: BTreeMap<DraftKey, NewRecord>,
}

impl DraftStore {
    /// Opens a draft on `date`, defaulted to the first shift and project.
    pub fn start_adding_new_record(
        &mut self,
        date: &str,
        projects: &[Project],
        shifts: &[Shift],
        now_ms: i64,
    ) -> DraftKey {
        let mut key = DraftKey {
            date: date.to_string(),
            created_ms: now_ms,
        };
        while self.records.contains_key(&key) {
            key.created_ms += 1;
        }
        let record = NewRecord::new(
            key.clone(),
            shifts.first().map(|shift| shift.id),
            projects.first().map(|project| project.id),
        );
        self.records.insert(key.clone(), record);
        key
    }

    pub fn get(&self, key: &DraftKey) -> Option<&NewRecord> {
        self.records.get(key)
    }

    pub fn keys_for(&self, date: &str) -> Vec<DraftKey> {
        self.records
            .values()
            .filter(|record| record.date == date)
            .map(|record| record.key.clone())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Drops a draft unless it is mid-save.
    pub fn cancel(&mut self, key: &DraftKey) -> bool {
        match self.records.get(key) {
            Some(record) if !record.is_saving() => self.records.remove(key).is_some(),
            _ => false,
        }
    }

    pub fn apply(&mut self, key: &DraftKey, event: DraftEvent) -> bool {
        self.records
            .get_mut(key)
            .map(|record| record.apply(event))
            .unwrap_or(false)
    }

    /// Validates a draft and turns it into an `add-worklog` call, marking it saving.
    pub fn save_new_record(
        &mut self,
        key: &DraftKey,
        user_id: UserId,
        range: &DateRange,
    ) -> Result<Mutation, EditError> {
        let Some(record) = self.records.get_mut(key) else {
            return Err(EditError::NothingSelected);
        };
        match build_add_worklog(record, user_id, range) {
            Ok(body) => {
                if record.state != DraftState::Ready {
                    record.state = DraftState::Ready;
                }
                record.apply(DraftEvent::SaveStarted);
                Ok(Mutation::AddWorklog(body))
            }
            Err(err) => {
                warn!(draft = %key, error = %err, "draft_validation_failed");
                record.state = DraftState::Failed(err.to_string());
                Err(err)
            }
        }
    }

    /// Settles a finished save: committed drafts are removed, failed ones stay editable.
    pub fn finish_save(&mut self, key: &DraftKey, result: Result<(), String>) {
        let Some(record) = self.records.get_mut(key) else {
            return;
        };
        match result {
            Ok(()) => {
                record.apply(DraftEvent::SaveSucceeded);
                self.records.remove(key);
            }
            Err(message) => {
                record.apply(DraftEvent::SaveFailed(message));
            }
        }
    }
}

fn build_add_worklog(
    record: &mut NewRecord,
    user_id: UserId,
    range: &DateRange,
) -> Result<AddWorklogBody, EditError> {
    let Some(shift_id) = record.shift_id else {
        return Err(EditError::MissingField("Shift"));
    };
    if record.start.trim().is_empty() {
        return Err(EditError::MissingField("Start time"));
    }
    if record.end.trim().is_empty() {
        return Err(EditError::MissingField("End time"));
    }
    let start_time = validate_and_format_time(&record.start);
    let end_time = validate_and_format_time(&record.end);
    if !is_valid_hhmm(&start_time) {
        return Err(EditError::InvalidTime {
            field: TimeField::Start,
            value: record.start.clone(),
        });
    }
    if !is_valid_hhmm(&end_time) {
        return Err(EditError::InvalidTime {
            field: TimeField::End,
            value: record.end.clone(),
        });
    }
    let Some(date) = parse_day_label(&record.date, range) else {
        return Err(EditError::InvalidDate(record.date.clone()));
    };
    record.start = start_time.clone();
    record.end = end_time.clone();
    Ok(AddWorklogBody {
        user_id,
        device_type: WEB_DEVICE_TYPE,
        device_model_type: WEB_DEVICE_MODEL.to_string(),
        date: to_wire_day(date),
        shift_id,
        project_id: record.project_id,
        start_time,
        end_time,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn range() -> DateRange {
        DateRange::new(
            NaiveDate::from_ymd_opt(2024, 6, 3).unwrap(),
            NaiveDate::from_ymd_opt(2024, 6, 9).unwrap(),
        )
    }

    fn resources() -> (Vec<Project>, Vec<Shift>) {
        (
            vec![
                Project {
                    id: 4,
                    name: "Site A".to_string(),
                },
                Project {
                    id: 5,
                    name: "Site B".to_string(),
                },
            ],
            vec![Shift {
                id: 2,
                name: "Day".to_string(),
            }],
        )
    }

    #[test]
    fn new_draft_defaults_to_first_shift_and_project() {
        let (projects, shifts) = resources();
        let mut store = DraftStore::default();
        let key = store.start_adding_new_record("Mon 3/6", &projects, &shifts, 1_717_000_000_000);
        assert_eq!(key.to_string(), "new-Mon 3/6-1717000000000");
        let record = store.get(&key).unwrap();
        assert_eq!(record.shift_id, Some(2));
        assert_eq!(record.project_id, Some(4));
        assert_eq!(record.state(), &DraftState::Empty);
    }

    #[test]
    fn same_millisecond_drafts_get_distinct_keys() {
        let (projects, shifts) = resources();
        let mut store = DraftStore::default();
        let first = store.start_adding_new_record("Mon 3/6", &projects, &shifts, 5);
        let second = store.start_adding_new_record("Mon 3/6", &projects, &shifts, 5);
        assert_ne!(first, second);
        assert_eq!(store.keys_for("Mon 3/6").len(), 2);
    }

    #[test]
    fn autosave_fires_once_both_times_are_blurred() {
        let (projects, shifts) = resources();
        let mut store = DraftStore::default();
        let key = store.start_adding_new_record("Mon 3/6", &projects, &shifts, 1);

        assert!(!store.apply(&key, DraftEvent::EditTime(TimeField::Start, "8".to_string())));
        assert!(!store.apply(&key, DraftEvent::Blur(TimeField::Start)));
        assert_eq!(store.get(&key).unwrap().start, "08:00");
        assert_eq!(store.get(&key).unwrap().state(), &DraftState::Partial);

        assert!(!store.apply(&key, DraftEvent::EditTime(TimeField::End, "4".to_string())));
        assert!(store.apply(&key, DraftEvent::Blur(TimeField::End)));
        assert_eq!(store.get(&key).unwrap().state(), &DraftState::Ready);

        // Blurring again while already ready does not fire a second time.
        assert!(!store.apply(&key, DraftEvent::Blur(TimeField::End)));
    }

    #[test]
    fn missing_shift_never_becomes_ready() {
        let mut store = DraftStore::default();
        let key = store.start_adding_new_record("Mon 3/6", &[], &[], 1);
        store.apply(&key, DraftEvent::EditTime(TimeField::Start, "9".to_string()));
        store.apply(&key, DraftEvent::Blur(TimeField::Start));
        store.apply(&key, DraftEvent::EditTime(TimeField::End, "17".to_string()));
        assert!(!store.apply(&key, DraftEvent::Blur(TimeField::End)));
        assert_eq!(
            store.save_new_record(&key, 7, &range()),
            Err(EditError::MissingField("Shift"))
        );
        assert!(matches!(store.get(&key).unwrap().state(), DraftState::Failed(_)));
    }

    #[test]
    fn save_builds_add_worklog_with_iso_date() {
        let (projects, shifts) = resources();
        let mut store = DraftStore::default();
        let key = store.start_adding_new_record("Mon 3/6", &projects, &shifts, 1);
        store.apply(&key, DraftEvent::EditTime(TimeField::Start, "8".to_string()));
        store.apply(&key, DraftEvent::Blur(TimeField::Start));
        store.apply(&key, DraftEvent::EditTime(TimeField::End, "4".to_string()));
        store.apply(&key, DraftEvent::Blur(TimeField::End));

        let mutation = store.save_new_record(&key, 7, &range()).unwrap();
        let Mutation::AddWorklog(body) = mutation else {
            panic!("expected add-worklog");
        };
        assert_eq!(body.date, "2024-06-03");
        assert_eq!(body.start_time, "08:00");
        assert_eq!(body.end_time, "04:00");
        assert_eq!(body.shift_id, 2);
        assert_eq!(body.project_id, Some(4));
        assert!(store.get(&key).unwrap().is_saving());
        assert!(!store.cancel(&key));

        store.finish_save(&key, Ok(()));
        assert!(store.get(&key).is_none());
    }

    #[test]
    fn failed_save_keeps_the_draft_editable() {
        let (projects, shifts) = resources();
        let mut store = DraftStore::default();
        let key = store.start_adding_new_record("Mon 3/6", &projects, &shifts, 1);
        store.apply(&key, DraftEvent::EditTime(TimeField::Start, "9".to_string()));
        store.apply(&key, DraftEvent::Blur(TimeField::Start));
        store.apply(&key, DraftEvent::EditTime(TimeField::End, "17".to_string()));
        store.apply(&key, DraftEvent::Blur(TimeField::End));
        store.save_new_record(&key, 7, &range()).unwrap();

        store.finish_save(&key, Err("Overlapping worklog".to_string()));
        let record = store.get(&key).unwrap();
        assert_eq!(
            record.state(),
            &DraftState::Failed("Overlapping worklog".to_string())
        );
        // Leaving a field again re-arms the autosave.
        assert!(store.apply(&key, DraftEvent::Blur(TimeField::End)));
    }

    #[test]
    fn unparseable_day_label_is_rejected() {
        let (projects, shifts) = resources();
        let mut store = DraftStore::default();
        let key = store.start_adding_new_record("Someday", &projects, &shifts, 1);
        store.apply(&key, DraftEvent::EditTime(TimeField::Start, "9".to_string()));
        store.apply(&key, DraftEvent::Blur(TimeField::Start));
        store.apply(&key, DraftEvent::EditTime(TimeField::End, "17".to_string()));
        store.apply(&key, DraftEvent::Blur(TimeField::End));
        assert_eq!(
            store.save_new_record(&key, 7, &range()),
            Err(EditError::InvalidDate("Someday".to_string()))
        );
    }
}
