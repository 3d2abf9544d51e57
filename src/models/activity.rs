//! Notifications, achievements, points and attendance.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Notification {
    #[serde(alias = "_id")]
    pub id: String,
    pub message: String,
    pub read: bool,
    pub created_at: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Achievement {
    #[serde(alias = "_id")]
    pub id: String,
    pub title: String,
    pub description: String,
    pub club: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PointsEntry {
    pub points: i64,
    pub reason: String,
    pub date: String,
}

/// `GET /api/points/user`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PointsSummary {
    #[serde(alias = "points")]
    pub total_points: i64,
    pub history: Vec<PointsEntry>,
}

/// Row of `GET /api/points-table`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LeaderboardEntry {
    #[serde(alias = "userId")]
    pub id: String,
    pub name: String,
    pub points: i64,
    pub club: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttendanceStatus {
    #[default]
    Present,
    Absent,
    Late,
}

impl std::str::FromStr for AttendanceStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "present" => Ok(AttendanceStatus::Present),
            "absent" => Ok(AttendanceStatus::Absent),
            "late" => Ok(AttendanceStatus::Late),
            _ => Err(format!("Unknown attendance status: {}", s)),
        }
    }
}

impl std::fmt::Display for AttendanceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AttendanceStatus::Present => write!(f, "present"),
            AttendanceStatus::Absent => write!(f, "absent"),
            AttendanceStatus::Late => write!(f, "late"),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AttendanceRecord {
    #[serde(alias = "_id")]
    pub id: String,
    #[serde(alias = "eventTitle")]
    pub event: String,
    #[serde(alias = "userName")]
    pub user: String,
    pub status: AttendanceStatus,
    pub date: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_points_summary_accepts_points_alias() {
        let summary: PointsSummary = serde_json::from_str(r#"{"points": 42}"#).unwrap();
        assert_eq!(summary.total_points, 42);
        assert!(summary.history.is_empty());
    }

    #[test]
    fn test_attendance_status_parse() {
        assert_eq!("Late".parse::<AttendanceStatus>().unwrap(), AttendanceStatus::Late);
        assert!("excused".parse::<AttendanceStatus>().is_err());

        let record: AttendanceRecord =
            serde_json::from_str(r#"{"eventTitle":"Hackathon","status":"absent"}"#).unwrap();
        assert_eq!(record.event, "Hackathon");
        assert_eq!(record.status, AttendanceStatus::Absent);
    }
}
