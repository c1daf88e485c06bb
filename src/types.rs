use std::fmt;

use chrono::{Datelike, Duration, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

pub type UserId = u32;
pub type WorklogId = u32;
pub type ShiftId = u32;
pub type ProjectId = u32;
pub type TimesheetId = u32;
pub type RequestId = u32;

/// Worklog/timesheet status the backend uses for approved (locked) records.
pub const LOCKED_STATUS: i64 = 6;

/// Date format the API expects in query strings.
pub const WIRE_DATE_FORMAT: &str = "%d/%m/%Y";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TimeField {
    Start,
    End,
}

impl fmt::Display for TimeField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimeField::Start => write!(f, "Start"),
            TimeField::End => write!(f, "End"),
        }
    }
}

/// Inclusive date range the details view is loaded for.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        if end < start {
            Self { start: end, end: start }
        } else {
            Self { start, end }
        }
    }

    /// Monday to Sunday around `day`.
    pub fn week_of(day: NaiveDate) -> Self {
        let start = day.week(Weekday::Mon).first_day();
        Self {
            start,
            end: start + Duration::days(6),
        }
    }

    pub fn shifted_weeks(&self, weeks: i64) -> Self {
        Self {
            start: self.start + Duration::weeks(weeks),
            end: self.end + Duration::weeks(weeks),
        }
    }

    pub fn contains(&self, day: NaiveDate) -> bool {
        day >= self.start && day <= self.end
    }

    pub fn wire_start(&self) -> String {
        self.start.format(WIRE_DATE_FORMAT).to_string()
    }

    pub fn wire_end(&self) -> String {
        self.end.format(WIRE_DATE_FORMAT).to_string()
    }

    pub fn parse_wire(value: &str) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(value.trim(), WIRE_DATE_FORMAT).ok()
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} - {}",
            self.start.format("%a %d %b %Y"),
            self.end.format("%a %d %b %Y")
        )
    }
}

/// One row of the user list: totals for the active range plus open items.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
pub struct TimeClock {
    #[serde(deserialize_with = "de::id")]
    pub user_id: UserId,
    #[serde(default, deserialize_with = "de::string")]
    pub user_name: String,
    #[serde(default, deserialize_with = "de::string")]
    pub total_hours: String,
    #[serde(default, deserialize_with = "de::string")]
    pub payable_total_hours: String,
    #[serde(default, deserialize_with = "de::string")]
    pub pricework_total_amount: String,
    #[serde(default, deserialize_with = "de::string")]
    pub total_expense_amount: String,
    #[serde(default, deserialize_with = "de::string")]
    pub total_payable_amount: String,
    #[serde(default, deserialize_with = "de::flag")]
    pub has_leave_request: bool,
    #[serde(default, deserialize_with = "de::flag")]
    pub has_expense_request: bool,
    #[serde(default, deserialize_with = "de::flag")]
    pub has_worklog_request: bool,
}

impl TimeClock {
    pub fn has_open_items(&self) -> bool {
        self.has_leave_request || self.has_expense_request || self.has_worklog_request
    }
}

#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
pub struct Week {
    #[serde(default, deserialize_with = "de::string")]
    pub week_range: String,
    #[serde(default, deserialize_with = "de::string")]
    pub weekly_total_hours: String,
    #[serde(default, deserialize_with = "de::string")]
    pub weekly_payable_amount: String,
    #[serde(default)]
    pub days: Vec<Day>,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
pub struct Day {
    /// Display label such as `Mon 3/6` (day/month, no year).
    pub date: String,
    #[serde(default, deserialize_with = "de::string")]
    pub daily_total: String,
    #[serde(default, deserialize_with = "de::string")]
    pub daily_payable_amount: String,
    #[serde(default, deserialize_with = "de::int")]
    pub status: i64,
    #[serde(default, deserialize_with = "de::opt_string")]
    pub employee_notes: Option<String>,
    #[serde(default, deserialize_with = "de::opt_id")]
    pub timesheet_light_id: Option<TimesheetId>,
    #[serde(default)]
    pub worklogs: Vec<Worklog>,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
pub struct Worklog {
    #[serde(deserialize_with = "de::id")]
    pub worklog_id: WorklogId,
    #[serde(default, deserialize_with = "de::opt_id")]
    pub shift_id: Option<ShiftId>,
    #[serde(default, deserialize_with = "de::opt_string")]
    pub shift_name: Option<String>,
    #[serde(default, deserialize_with = "de::opt_id")]
    pub project_id: Option<ProjectId>,
    #[serde(default, deserialize_with = "de::opt_string")]
    pub project_name: Option<String>,
    #[serde(default, deserialize_with = "de::opt_string")]
    pub start: Option<String>,
    #[serde(default, deserialize_with = "de::opt_string")]
    pub end: Option<String>,
    #[serde(default, deserialize_with = "de::string")]
    pub total_hours: String,
    #[serde(default, deserialize_with = "de::flag")]
    pub is_pricework: bool,
    #[serde(default, deserialize_with = "de::flag")]
    pub is_leave: bool,
    #[serde(default, deserialize_with = "de::int")]
    pub status: i64,
    #[serde(default, deserialize_with = "de::opt_string")]
    pub date_added: Option<String>,
    #[serde(default, deserialize_with = "de::opt_id")]
    pub timesheet_light_id: Option<TimesheetId>,
    #[serde(default, deserialize_with = "de::opt_string")]
    pub start_time_edited_by: Option<String>,
    #[serde(default, deserialize_with = "de::opt_string")]
    pub start_time_edited_at: Option<String>,
    #[serde(default, deserialize_with = "de::opt_string")]
    pub end_time_edited_by: Option<String>,
    #[serde(default, deserialize_with = "de::opt_string")]
    pub end_time_edited_at: Option<String>,
}

impl Worklog {
    pub fn is_locked(&self) -> bool {
        self.status == LOCKED_STATUS
    }

    pub fn time(&self, field: TimeField) -> Option<&str> {
        match field {
            TimeField::Start => self.start.as_deref(),
            TimeField::End => self.end.as_deref(),
        }
    }

    pub fn was_edited(&self) -> bool {
        self.start_time_edited_by.is_some() || self.end_time_edited_by.is_some()
    }
}

#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct Shift {
    #[serde(deserialize_with = "de::id")]
    pub id: ShiftId,
    #[serde(default, deserialize_with = "de::string")]
    pub name: String,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct Project {
    #[serde(deserialize_with = "de::id")]
    pub id: ProjectId,
    #[serde(default, deserialize_with = "de::string")]
    pub name: String,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub enum RequestStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
}

impl RequestStatus {
    fn from_loose(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "1" | "approved" => RequestStatus::Approved,
            "2" | "rejected" => RequestStatus::Rejected,
            _ => RequestStatus::Pending,
        }
    }
}

impl<'de> Deserialize<'de> for RequestStatus {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = de::string(deserializer)?;
        Ok(RequestStatus::from_loose(&raw))
    }
}

/// A user-submitted change to a worklog's time window awaiting a decision.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
pub struct RequestItem {
    #[serde(deserialize_with = "de::id")]
    pub id: RequestId,
    #[serde(default, deserialize_with = "de::opt_id")]
    pub worklog_id: Option<WorklogId>,
    #[serde(default, deserialize_with = "de::string")]
    pub date: String,
    #[serde(default, deserialize_with = "de::opt_string")]
    pub shift_name: Option<String>,
    #[serde(default, deserialize_with = "de::opt_string")]
    pub project_name: Option<String>,
    #[serde(default, deserialize_with = "de::opt_string")]
    pub old_start_time: Option<String>,
    #[serde(default, deserialize_with = "de::opt_string")]
    pub old_end_time: Option<String>,
    #[serde(default, deserialize_with = "de::opt_string")]
    pub new_start_time: Option<String>,
    #[serde(default, deserialize_with = "de::opt_string")]
    pub new_end_time: Option<String>,
    #[serde(default, deserialize_with = "de::opt_string")]
    pub note: Option<String>,
    #[serde(default)]
    pub status: RequestStatus,
}

/// A server-detected overlap or inconsistency between worklogs.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
pub struct ConflictDetail {
    #[serde(default, deserialize_with = "de::opt_id")]
    pub id: Option<u32>,
    #[serde(default, deserialize_with = "de::string")]
    pub date: String,
    #[serde(default, deserialize_with = "de::opt_id")]
    pub worklog_id: Option<WorklogId>,
    #[serde(default, deserialize_with = "de::string")]
    pub message: String,
    #[serde(default, deserialize_with = "de::opt_string")]
    pub old_start_time: Option<String>,
    #[serde(default, deserialize_with = "de::opt_string")]
    pub old_end_time: Option<String>,
    #[serde(default, deserialize_with = "de::opt_string")]
    pub new_start_time: Option<String>,
    #[serde(default, deserialize_with = "de::opt_string")]
    pub new_end_time: Option<String>,
}

/// Lenient field decoders: the backend sends numbers as strings and flags as 0/1.
pub(crate) mod de {
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Loose {
        Bool(bool),
        Int(i64),
        Float(f64),
        Str(String),
    }

    impl Loose {
        fn into_string(self) -> String {
            match self {
                Loose::Bool(value) => value.to_string(),
                Loose::Int(value) => value.to_string(),
                Loose::Float(value) => value.to_string(),
                Loose::Str(value) => value,
            }
        }
    }

    pub fn string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
        Ok(Option::<Loose>::deserialize(deserializer)?
            .map(Loose::into_string)
            .unwrap_or_default())
    }

    pub fn opt_string<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<String>, D::Error> {
        Ok(Option::<Loose>::deserialize(deserializer)?
            .map(Loose::into_string)
            .filter(|value| !value.trim().is_empty()))
    }

    pub fn int<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i64, D::Error> {
        let value = match Option::<Loose>::deserialize(deserializer)? {
            Some(Loose::Int(value)) => value,
            Some(Loose::Float(value)) => value as i64,
            Some(Loose::Bool(value)) => i64::from(value),
            Some(Loose::Str(value)) => value.trim().parse().unwrap_or_default(),
            None => 0,
        };
        Ok(value)
    }

    /// A required id, given as a number or a numeric string.
    pub fn id<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u32, D::Error> {
        match Loose::deserialize(deserializer)? {
            Loose::Int(value) => u32::try_from(value)
                .map_err(|_| D::Error::custom(format!("id {value} is out of range"))),
            Loose::Str(value) => value
                .trim()
                .parse()
                .map_err(|_| D::Error::custom(format!("invalid id '{value}'"))),
            _ => Err(D::Error::custom("expected a numeric id")),
        }
    }

    pub fn opt_id<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<u32>, D::Error> {
        let value = match Option::<Loose>::deserialize(deserializer)? {
            Some(Loose::Int(value)) => u32::try_from(value).ok(),
            Some(Loose::Str(value)) => value.trim().parse().ok(),
            _ => None,
        };
        Ok(value.filter(|id| *id != 0))
    }

    pub fn flag<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
        let value = match Option::<Loose>::deserialize(deserializer)? {
            Some(Loose::Bool(value)) => value,
            Some(Loose::Int(value)) => value != 0,
            Some(Loose::Float(value)) => value != 0.0,
            Some(Loose::Str(value)) => matches!(value.trim(), "1" | "true" | "yes"),
            None => false,
        };
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn worklog_accepts_loose_wire_values() {
        let json = r#"{
            "worklog_id": "41",
            "shift_id": "3",
            "shift_name": "Day",
            "project_id": null,
            "start": "2024-06-03 09:00:00",
            "end": "",
            "total_hours": 7.5,
            "is_pricework": 0,
            "is_leave": "1",
            "status": "6"
        }"#;
        let log: Worklog = serde_json::from_str(json).unwrap();
        assert_eq!(log.worklog_id, 41);
        assert_eq!(log.shift_id, Some(3));
        assert_eq!(log.project_id, None);
        assert_eq!(log.end, None);
        assert_eq!(log.total_hours, "7.5");
        assert!(!log.is_pricework);
        assert!(log.is_leave);
        assert!(log.is_locked());
    }

    #[test]
    fn primary_ids_accept_numeric_strings() {
        let shift: Shift = serde_json::from_str(r#"{"id": "2", "name": "Night"}"#).unwrap();
        assert_eq!(shift.id, 2);
        let project: Project = serde_json::from_str(r#"{"id": " 9 "}"#).unwrap();
        assert_eq!(project.id, 9);
        let user: TimeClock = serde_json::from_str(r#"{"user_id": "42"}"#).unwrap();
        assert_eq!(user.user_id, 42);
        let item: RequestItem = serde_json::from_str(r#"{"id": "7"}"#).unwrap();
        assert_eq!(item.id, 7);
        let log: Worklog = serde_json::from_str(r#"{"worklog_id": 41}"#).unwrap();
        assert_eq!(log.worklog_id, 41);
    }

    #[test]
    fn malformed_or_missing_ids_are_rejected() {
        assert!(serde_json::from_str::<Worklog>(r#"{"worklog_id": "abc"}"#).is_err());
        assert!(serde_json::from_str::<Worklog>(r#"{"worklog_id": -1}"#).is_err());
        assert!(serde_json::from_str::<Shift>(r#"{"name": "Day"}"#).is_err());
    }

    #[test]
    fn numeric_status_six_is_locked() {
        let log: Worklog = serde_json::from_str(r#"{"worklog_id": 1, "status": 6}"#).unwrap();
        assert!(log.is_locked());
        let log: Worklog = serde_json::from_str(r#"{"worklog_id": 1, "status": 1}"#).unwrap();
        assert!(!log.is_locked());
    }

    #[test]
    fn request_status_maps_words_and_codes() {
        let item: RequestItem =
            serde_json::from_str(r#"{"id": 9, "status": "Approved"}"#).unwrap();
        assert_eq!(item.status, RequestStatus::Approved);
        let item: RequestItem = serde_json::from_str(r#"{"id": 9, "status": 2}"#).unwrap();
        assert_eq!(item.status, RequestStatus::Rejected);
        let item: RequestItem = serde_json::from_str(r#"{"id": 9}"#).unwrap();
        assert_eq!(item.status, RequestStatus::Pending);
    }

    #[test]
    fn week_of_starts_on_monday() {
        let wednesday = NaiveDate::from_ymd_opt(2024, 6, 5).unwrap();
        let range = DateRange::week_of(wednesday);
        assert_eq!(range.start, NaiveDate::from_ymd_opt(2024, 6, 3).unwrap());
        assert_eq!(range.end, NaiveDate::from_ymd_opt(2024, 6, 9).unwrap());
        assert_eq!(range.wire_start(), "03/06/2024");
        assert_eq!(range.shifted_weeks(-1).wire_end(), "02/06/2024");
    }
}
