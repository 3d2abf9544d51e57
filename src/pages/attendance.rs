//! Attendance records and marking.

use lazy_static::lazy_static;
use regex::Regex;
use std::collections::BTreeMap;
use std::fmt;

use super::PageError;
use crate::api::ApiClient;
use crate::forms::{self, fields, FormSpec, Rule, SubmitError, Submission};
use crate::models::{AttendanceRecord, AttendanceStatus};

#[derive(Debug, Clone)]
pub struct AttendanceSheet {
    pub records: Vec<AttendanceRecord>,
}

pub async fn load_attendance(client: &ApiClient) -> Result<AttendanceSheet, PageError> {
    let records = client.get("/api/attendance").await?;
    Ok(AttendanceSheet { records })
}

impl AttendanceSheet {
    /// Present/absent/late tallies per event.
    pub fn by_event(&self) -> BTreeMap<&str, [usize; 3]> {
        let mut tally: BTreeMap<&str, [usize; 3]> = BTreeMap::new();
        for record in &self.records {
            let counts = tally.entry(record.event.as_str()).or_default();
            match record.status {
                AttendanceStatus::Present => counts[0] += 1,
                AttendanceStatus::Absent => counts[1] += 1,
                AttendanceStatus::Late => counts[2] += 1,
            }
        }
        tally
    }
}

impl fmt::Display for AttendanceSheet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.records.is_empty() {
            return writeln!(f, "No attendance recorded.");
        }
        writeln!(f, "{:<28}  {:>7}  {:>6}  {:>4}", "EVENT", "PRESENT", "ABSENT", "LATE")?;
        for (event, [present, absent, late]) in self.by_event() {
            writeln!(f, "{:<28}  {:>7}  {:>6}  {:>4}", event, present, absent, late)?;
        }
        Ok(())
    }
}

lazy_static! {
    static ref STATUS_REGEX: Regex = Regex::new(r"^(present|absent|late)$").unwrap();
}

pub fn attendance_spec() -> FormSpec {
    FormSpec::new()
        .field("eventId", "Event", [Rule::Required])
        .field("userId", "Member", [Rule::Required])
        .field(
            "status",
            "Status",
            [
                Rule::Required,
                Rule::Pattern(&STATUS_REGEX, "Status must be present, absent or late"),
            ],
        )
}

pub async fn mark_attendance(
    client: &ApiClient,
    event_id: &str,
    user_id: &str,
    status: AttendanceStatus,
) -> Result<AttendanceRecord, SubmitError> {
    let spec = attendance_spec();
    let values = fields([
        ("eventId", event_id.to_string()),
        ("userId", user_id.to_string()),
        ("status", status.to_string()),
    ]);
    forms::submit(client, Submission::post("/api/attendance", &values, &spec)).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::MemorySession;
    use crate::test_support::{client_for, FakeBackend};
    use axum::routing::post;
    use axum::{Json, Router};
    use serde_json::{json, Value};
    use std::sync::Arc;

    #[test]
    fn test_by_event_tallies() {
        let record = |event: &str, status| AttendanceRecord {
            event: event.to_string(),
            status,
            ..Default::default()
        };
        let sheet = AttendanceSheet {
            records: vec![
                record("Expo", AttendanceStatus::Present),
                record("Expo", AttendanceStatus::Late),
                record("Expo", AttendanceStatus::Present),
                record("Quiz", AttendanceStatus::Absent),
            ],
        };
        let tally = sheet.by_event();
        assert_eq!(tally["Expo"], [2, 0, 1]);
        assert_eq!(tally["Quiz"], [0, 1, 0]);
    }

    #[test]
    fn test_attendance_spec_rejects_unknown_status() {
        let spec = attendance_spec();
        let values = fields([("eventId", "e1"), ("userId", "u1"), ("status", "excused")]);
        let errors = crate::forms::validate(&values, &spec).unwrap_err();
        assert_eq!(
            errors.get("status").unwrap(),
            ["Status must be present, absent or late"]
        );
    }

    #[tokio::test]
    async fn test_mark_attendance_posts_status() {
        let backend = FakeBackend::start(Router::new().route(
            "/api/attendance",
            post(|Json(body): Json<Value>| async move {
                Json(json!({ "eventTitle": body["eventId"], "userName": body["userId"], "status": body["status"] }))
            }),
        ))
        .await;
        let client = client_for(&backend, Arc::new(MemorySession::with_token("t")));

        let record = mark_attendance(&client, "e1", "u1", AttendanceStatus::Late)
            .await
            .unwrap();
        assert_eq!(record.event, "e1");
        assert_eq!(record.status, AttendanceStatus::Late);


        let err = mark_attendance(&client, "  ", "u1", AttendanceStatus::Present)
            .await
            .unwrap_err();
        match err {
            SubmitError::Fields(errors) => {
                assert_eq!(errors.get("eventId").unwrap(), ["Event is required"]);
                assert_eq!(errors.len(), 1);
            }
            other => panic!("unexpected error: {:?}", other),
        }
        assert_eq!(backend.hits(), 1);
    }
}
