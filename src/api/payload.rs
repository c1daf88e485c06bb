/// Request bodies and response envelopes of the time-clock endpoints.
use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::types::{
    de, ConflictDetail, Project, ProjectId, RequestId, RequestItem, Shift, ShiftId, TimeClock,
    UserId, Week, WorklogId,
};

/// `device_type` the backend expects for worklogs created from the web dashboard.
pub const WEB_DEVICE_TYPE: u8 = 3;
pub const WEB_DEVICE_MODEL: &str = "web";

/// Every response is wrapped as `{ "IsSuccess": bool, "message": ..., ...payload }`.
#[derive(Debug, Deserialize)]
pub struct Envelope<T> {
    #[serde(rename = "IsSuccess", default, deserialize_with = "de::flag")]
    pub is_success: bool,
    #[serde(default, deserialize_with = "de::opt_string")]
    pub message: Option<String>,
    #[serde(flatten)]
    pub body: T,
}

/// Payload of a mutation response; only the envelope flags matter.
pub type Ack = HashMap<String, serde_json::Value>;

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
pub struct DetailsPayload {
    #[serde(default)]
    pub info: Vec<Week>,
    #[serde(default, deserialize_with = "de::string")]
    pub total_hours: String,
    #[serde(default, deserialize_with = "de::string")]
    pub payable_total_hours: String,
    #[serde(default, deserialize_with = "de::string")]
    pub total_payable_amount: String,
    #[serde(default, deserialize_with = "de::int")]
    pub pending_request_count: i64,
    #[serde(default, deserialize_with = "de::int")]
    pub total_conflicts: i64,
    #[serde(default)]
    pub conflicts: Vec<ConflictDetail>,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
pub struct ResourcesPayload {
    #[serde(default)]
    pub shifts: Vec<Shift>,
    #[serde(default)]
    pub projects: Vec<Project>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct UsersPayload {
    #[serde(default)]
    pub info: Vec<TimeClock>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct RequestsPayload {
    #[serde(default)]
    pub info: Vec<RequestItem>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct EditWorklogBody {
    pub user_worklog_id: WorklogId,
    pub date: String,
    pub start_time: String,
    pub end_time: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct EditShiftBody {
    pub user_worklog_id: WorklogId,
    pub shift_id: ShiftId,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct EditProjectBody {
    pub user_worklog_id: WorklogId,
    pub project_id: ProjectId,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct AddWorklogBody {
    pub user_id: UserId,
    pub device_type: u8,
    pub device_model_type: String,
    pub date: String,
    pub shift_id: ShiftId,
    pub project_id: Option<ProjectId>,
    pub start_time: String,
    pub end_time: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct IdsBody {
    pub ids: String,
}

impl IdsBody {
    pub fn new(ids: &[u32]) -> Self {
        Self { ids: join_ids(ids) }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct RequestDecisionBody {
    pub ids: String,
    #[serde(rename = "userId")]
    pub user_id: UserId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl RequestDecisionBody {
    pub fn new(ids: &[RequestId], user_id: UserId, reason: Option<String>) -> Self {
        Self {
            ids: join_ids(ids),
            user_id,
            reason,
        }
    }
}

/// A state-changing call. Every variant is a `POST` of its body to [`Mutation::endpoint`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Mutation {
    EditWorklog(EditWorklogBody),
    EditWorklogShift(EditShiftBody),
    EditWorklogProject(EditProjectBody),
    AddWorklog(AddWorklogBody),
    DeleteWorklogs(IdsBody),
    ApproveTimesheets(IdsBody),
    UnapproveTimesheets(IdsBody),
    ApproveRequests(RequestDecisionBody),
    RejectRequests(RequestDecisionBody),
}

impl Mutation {
    pub fn endpoint(&self) -> &'static str {
        match self {
            Mutation::EditWorklog(_) => "/time-clock/edit-worklog",
            Mutation::EditWorklogShift(_) => "/time-clock/edit-worklog-shift",
            Mutation::EditWorklogProject(_) => "/time-clock/edit-worklog-project",
            Mutation::AddWorklog(_) => "/time-clock/add-worklog",
            Mutation::DeleteWorklogs(_) => "/time-clock/worklogs-bulk-delete",
            Mutation::ApproveTimesheets(_) => "/timesheet/approve",
            Mutation::UnapproveTimesheets(_) => "/timesheet/unapprove",
            Mutation::ApproveRequests(_) => "/timesheet/web-request-approve",
            Mutation::RejectRequests(_) => "/timesheet/web-request-reject",
        }
    }

    pub fn body(&self) -> serde_json::Result<serde_json::Value> {
        match self {
            Mutation::EditWorklog(body) => serde_json::to_value(body),
            Mutation::EditWorklogShift(body) => serde_json::to_value(body),
            Mutation::EditWorklogProject(body) => serde_json::to_value(body),
            Mutation::AddWorklog(body) => serde_json::to_value(body),
            Mutation::DeleteWorklogs(body)
            | Mutation::ApproveTimesheets(body)
            | Mutation::UnapproveTimesheets(body) => serde_json::to_value(body),
            Mutation::ApproveRequests(body) | Mutation::RejectRequests(body) => {
                serde_json::to_value(body)
            }
        }
    }

    /// Text for the success notice.
    pub fn success_text(&self) -> &'static str {
        match self {
            Mutation::EditWorklog(_) => "Worklog times updated.",
            Mutation::EditWorklogShift(_) => "Worklog shift updated.",
            Mutation::EditWorklogProject(_) => "Worklog project updated.",
            Mutation::AddWorklog(_) => "Worklog added.",
            Mutation::DeleteWorklogs(_) => "Worklogs deleted.",
            Mutation::ApproveTimesheets(_) => "Timesheets locked.",
            Mutation::UnapproveTimesheets(_) => "Timesheets unlocked.",
            Mutation::ApproveRequests(_) => "Requests approved.",
            Mutation::RejectRequests(_) => "Requests rejected.",
        }
    }
}

pub fn join_ids(ids: &[u32]) -> String {
    ids.iter()
        .map(|id| id.to_string())
        .collect::<Vec<_>>()
        .join(",")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn details_envelope_decodes() {
        let json = r#"{
            "IsSuccess": true,
            "info": [{
                "week_range": "03/06 - 09/06",
                "weekly_total_hours": "8:30",
                "days": [{
                    "date": "Mon 3/6",
                    "daily_total": "8:30",
                    "status": 1,
                    "timesheet_light_id": 77,
                    "worklogs": [{"worklog_id": 5, "start": "09:00", "end": "17:30", "status": 1}]
                }]
            }],
            "pending_request_count": "2",
            "total_conflicts": 1,
            "conflicts": [{"date": "Mon 3/6", "worklog_id": 5, "message": "Overlap"}]
        }"#;
        let envelope: Envelope<DetailsPayload> = serde_json::from_str(json).unwrap();
        assert!(envelope.is_success);
        let details = envelope.body;
        assert_eq!(details.info.len(), 1);
        assert_eq!(details.info[0].days[0].timesheet_light_id, Some(77));
        assert_eq!(details.pending_request_count, 2);
        assert_eq!(details.conflicts[0].message, "Overlap");
    }

    #[test]
    fn rejected_envelope_keeps_message() {
        let envelope: Envelope<Ack> =
            serde_json::from_str(r#"{"IsSuccess": false, "message": "Timesheet locked"}"#).unwrap();
        assert!(!envelope.is_success);
        assert_eq!(envelope.message.as_deref(), Some("Timesheet locked"));
    }

    #[test]
    fn add_worklog_body_shape() {
        let mutation = Mutation::AddWorklog(AddWorklogBody {
            user_id: 12,
            device_type: WEB_DEVICE_TYPE,
            device_model_type: WEB_DEVICE_MODEL.to_string(),
            date: "2024-06-03".to_string(),
            shift_id: 2,
            project_id: Some(4),
            start_time: "08:00".to_string(),
            end_time: "04:00".to_string(),
        });
        assert_eq!(mutation.endpoint(), "/time-clock/add-worklog");
        let body = mutation.body().unwrap();
        assert_eq!(body["device_type"], 3);
        assert_eq!(body["device_model_type"], "web");
        assert_eq!(body["date"], "2024-06-03");
    }

    #[test]
    fn decision_body_uses_camel_case_user_and_skips_empty_reason() {
        let approve = serde_json::to_value(RequestDecisionBody::new(&[1, 2], 9, None)).unwrap();
        assert_eq!(approve, serde_json::json!({"ids": "1,2", "userId": 9}));
        let reject = serde_json::to_value(RequestDecisionBody::new(
            &[3],
            9,
            Some("Wrong day".to_string()),
        ))
        .unwrap();
        assert_eq!(reject["reason"], "Wrong day");
    }
}
