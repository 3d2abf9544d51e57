use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Event {
    #[serde(alias = "_id")]
    pub id: String,
    pub title: String,
    pub description: String,
    /// Calendar date, `YYYY-MM-DD` or a full RFC 3339 timestamp
    pub date: String,
    pub time: Option<String>,
    pub location: Option<String>,
    /// Name of the organizing club
    #[serde(alias = "clubName")]
    pub club: String,
    pub registration_fee: Option<f64>,
    pub image: Option<String>,
}

impl Event {
    /// Parsed calendar day, when `date` holds one.
    pub fn day(&self) -> Option<NaiveDate> {
        let head = self.date.get(..10)?;
        NaiveDate::parse_from_str(head, "%Y-%m-%d").ok()
    }

    pub fn is_upcoming(&self, today: NaiveDate) -> bool {
        self.day().map(|d| d >= today).unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(date: &str) -> Event {
        Event {
            date: date.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_event_day_parses_date_and_timestamp() {
        let expected = NaiveDate::from_ymd_opt(2025, 3, 14).unwrap();
        assert_eq!(event("2025-03-14").day(), Some(expected));
        assert_eq!(event("2025-03-14T18:30:00.000Z").day(), Some(expected));
        assert_eq!(event("soon").day(), None);
        assert_eq!(event("").day(), None);
    }

    #[test]
    fn test_event_is_upcoming() {
        let today = NaiveDate::from_ymd_opt(2025, 3, 14).unwrap();
        assert!(event("2025-03-14").is_upcoming(today));
        assert!(event("2025-04-01").is_upcoming(today));
        assert!(!event("2025-03-13").is_upcoming(today));
        assert!(!event("tbd").is_upcoming(today));
    }
}
