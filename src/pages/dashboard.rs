//! Member, coordinator and super-admin dashboards.
//!
//! Each dashboard issues its fetches concurrently and fails as a whole
//! when any one of them fails.

use chrono::NaiveDate;
use std::fmt;

use super::{today, PageError};
use crate::api::ApiClient;
use crate::models::{
    Achievement, AttendanceRecord, AttendanceStatus, Club, ContactMessage, Event,
    LeaderboardEntry, Notification, PointsSummary, User, UserEnvelope,
};

#[derive(Debug, Clone)]
pub struct UserDashboard {
    pub user: User,
    pub clubs: Vec<Club>,
    pub events: Vec<Event>,
    pub notifications: Vec<Notification>,
    pub achievements: Vec<Achievement>,
    pub points: PointsSummary,
    pub leaderboard: Vec<LeaderboardEntry>,
    pub attendance: Vec<AttendanceRecord>,
}

pub async fn load_user_dashboard(client: &ApiClient) -> Result<UserDashboard, PageError> {
    let (user, clubs, events, notifications, achievements, points, leaderboard, attendance) = tokio::try_join!(
        client.get::<UserEnvelope>("/api/auth/user"),
        client.get::<Vec<Club>>("/api/clubs"),
        client.get::<Vec<Event>>("/api/events"),
        client.get::<Vec<Notification>>("/api/notifications"),
        client.get::<Vec<Achievement>>("/api/achievements"),
        client.get::<PointsSummary>("/api/points/user"),
        client.get::<Vec<LeaderboardEntry>>("/api/points-table"),
        client.get::<Vec<AttendanceRecord>>("/api/attendance"),
    )?;

    Ok(UserDashboard {
        user: user.into(),
        clubs,
        events,
        notifications,
        achievements,
        points,
        leaderboard,
        attendance,
    })
}

impl UserDashboard {
    pub fn my_clubs(&self) -> Vec<&Club> {
        self.clubs
            .iter()
            .filter(|c| self.user.is_member(&c.name))
            .collect()
    }

    /// Upcoming events of the user's clubs, soonest first.
    pub fn upcoming(&self, today: NaiveDate) -> Vec<&Event> {
        let mut events: Vec<&Event> = self
            .events
            .iter()
            .filter(|e| e.is_upcoming(today) && self.user.is_member(&e.club))
            .collect();
        events.sort_by_key(|e| e.day());
        events
    }

    pub fn unread_notifications(&self) -> usize {
        self.notifications.iter().filter(|n| !n.read).count()
    }

    /// Share of attendance records marked present or late, in percent.
    pub fn attendance_rate(&self) -> Option<f64> {
        if self.attendance.is_empty() {
            return None;
        }
        let attended = self
            .attendance
            .iter()
            .filter(|r| r.status != AttendanceStatus::Absent)
            .count();
        Some(attended as f64 * 100.0 / self.attendance.len() as f64)
    }

    /// 1-based leaderboard position of the user.
    pub fn rank(&self) -> Option<usize> {
        self.leaderboard
            .iter()
            .position(|e| e.id == self.user.id)
            .map(|i| i + 1)
    }
}

impl fmt::Display for UserDashboard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== Welcome, {} ===", self.user.name)?;
        writeln!(f)?;
        write!(f, "Points:        {}", self.points.total_points)?;
        match self.rank() {
            Some(rank) => writeln!(f, " (rank #{})", rank)?,
            None => writeln!(f)?,
        }
        match self.attendance_rate() {
            Some(rate) => writeln!(f, "Attendance:    {:.0}%", rate)?,
            None => writeln!(f, "Attendance:    -")?,
        }
        writeln!(f, "Notifications: {} unread", self.unread_notifications())?;
        writeln!(f)?;

        let clubs = self.my_clubs();
        writeln!(f, "My clubs ({}):", clubs.len())?;
        for club in clubs {
            writeln!(f, "  {}", club.name)?;
        }
        if !self.user.pending_clubs.is_empty() {
            writeln!(f, "  ({} pending request(s))", self.user.pending_clubs.len())?;
        }
        writeln!(f)?;

        writeln!(f, "Upcoming events:")?;
        let upcoming = self.upcoming(today());
        if upcoming.is_empty() {
            writeln!(f, "  none")?;
        }
        for event in upcoming {
            writeln!(f, "  {:<10}  {:<30}  {}", event.date.get(..10).unwrap_or(event.date.as_str()), event.title, event.club)?;
        }

        if !self.achievements.is_empty() {
            writeln!(f)?;
            writeln!(f, "Achievements:")?;
            for achievement in &self.achievements {
                writeln!(f, "  * {}", achievement.title)?;
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct AdminDashboard {
    pub user: User,
    pub clubs: Vec<Club>,
    pub events: Vec<Event>,
}

pub async fn load_admin_dashboard(client: &ApiClient) -> Result<AdminDashboard, PageError> {
    let (user, clubs, events) = tokio::try_join!(
        client.get::<UserEnvelope>("/api/auth/user"),
        client.get::<Vec<Club>>("/api/clubs"),
        client.get::<Vec<Event>>("/api/events"),
    )?;
    let user: User = user.into();

    let clubs = clubs
        .into_iter()
        .filter(|c| user.is_admin || user.coordinates(&c.name))
        .collect();
    let events = events
        .into_iter()
        .filter(|e| user.is_admin || user.coordinates(&e.club))
        .collect();

    Ok(AdminDashboard {
        user,
        clubs,
        events,
    })
}

impl AdminDashboard {
    pub fn pending_requests(&self) -> usize {
        self.clubs.iter().map(|c| c.pending_members.len()).sum()
    }
}

impl fmt::Display for AdminDashboard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== Coordinator dashboard: {} ===", self.user.name)?;
        writeln!(f)?;
        writeln!(f, "Pending join requests: {}", self.pending_requests())?;
        writeln!(f)?;
        writeln!(f, "{:<24}  {:>8}  {:>8}", "CLUB", "MEMBERS", "PENDING")?;
        for club in &self.clubs {
            writeln!(
                f,
                "{:<24}  {:>8}  {:>8}",
                club.name,
                club.member_count(),
                club.pending_members.len()
            )?;
        }
        writeln!(f)?;
        writeln!(f, "Events ({}):", self.events.len())?;
        for event in &self.events {
            writeln!(f, "  {}  {}", event.date, event.title)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct SuperAdminDashboard {
    pub users: Vec<User>,
    pub clubs: Vec<Club>,
    pub events: Vec<Event>,
    pub messages: Vec<ContactMessage>,
}

pub async fn load_super_admin_dashboard(
    client: &ApiClient,
) -> Result<SuperAdminDashboard, PageError> {
    let (users, clubs, events, messages) = tokio::try_join!(
        client.get::<Vec<User>>("/api/users"),
        client.get::<Vec<Club>>("/api/clubs"),
        client.get::<Vec<Event>>("/api/events"),
        client.get::<Vec<ContactMessage>>("/api/contact"),
    )?;
    Ok(SuperAdminDashboard {
        users,
        clubs,
        events,
        messages,
    })
}

impl fmt::Display for SuperAdminDashboard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let coordinators = self.users.iter().filter(|u| u.is_head_coordinator).count();
        let open = self.messages.iter().filter(|m| !m.is_resolved()).count();

        writeln!(f, "=== Super-admin dashboard ===")?;
        writeln!(f)?;
        writeln!(f, "Users:         {} ({} coordinators)", self.users.len(), coordinators)?;
        writeln!(f, "Clubs:         {}", self.clubs.len())?;
        writeln!(f, "Events:        {}", self.events.len())?;
        writeln!(f, "Open messages: {}", open)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::MemorySession;
    use crate::test_support::{client_for, FakeBackend};
    use axum::http::StatusCode;
    use axum::routing::get;
    use axum::{Json, Router};
    use serde_json::{json, Value};
    use std::sync::Arc;

    fn member() -> Value {
        json!({ "id": "u1", "name": "Asha", "clubName": ["Robotics"] })
    }

    fn backend(user: Value, points_status: StatusCode) -> Router {
        Router::new()
            .route(
                "/api/auth/user",
                get(move || {
                    let user = user.clone();
                    async move { Json(user) }
                }),
            )
            .route(
                "/api/clubs",
                get(|| async {
                    Json(json!([
                        { "id": "c1", "name": "Robotics", "pendingMembers": ["u7"] },
                        { "id": "c2", "name": "Drama" }
                    ]))
                }),
            )
            .route(
                "/api/events",
                get(|| async {
                    Json(json!([
                        { "id": "e1", "title": "Bot Wars", "date": "2099-05-01", "club": "Robotics" },
                        { "id": "e2", "title": "Old Expo", "date": "2000-01-01", "club": "Robotics" },
                        { "id": "e3", "title": "Hamlet", "date": "2099-01-01", "club": "Drama" }
                    ]))
                }),
            )
            .route(
                "/api/notifications",
                get(|| async { Json(json!([{ "id": "n1", "read": false }, { "id": "n2", "read": true }])) }),
            )
            .route("/api/achievements", get(|| async { Json(json!([])) }))
            .route(
                "/api/points/user",
                get(move || async move { (points_status, Json(json!({ "totalPoints": 40 }))) }),
            )
            .route(
                "/api/points-table",
                get(|| async {
                    Json(json!([{ "id": "u9", "points": 90 }, { "id": "u1", "points": 40 }]))
                }),
            )
            .route(
                "/api/attendance",
                get(|| async {
                    Json(json!([{ "status": "present" }, { "status": "absent" }, { "status": "late" }, { "status": "present" }]))
                }),
            )
    }

    #[tokio::test]
    async fn test_user_dashboard_loads_everything() {
        let backend = FakeBackend::start(backend(member(), StatusCode::OK)).await;
        let client = client_for(&backend, Arc::new(MemorySession::with_token("t")));

        let dashboard = load_user_dashboard(&client).await.unwrap();
        assert_eq!(dashboard.my_clubs().len(), 1);
        assert_eq!(dashboard.unread_notifications(), 1);
        assert_eq!(dashboard.rank(), Some(2));
        assert_eq!(dashboard.attendance_rate(), Some(75.0));

        let today = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
        let upcoming: Vec<&str> = dashboard.upcoming(today).iter().map(|e| e.title.as_str()).collect();
        assert_eq!(upcoming, vec!["Bot Wars"]);

        let rendered = dashboard.to_string();
        assert!(rendered.contains("Welcome, Asha"));
        assert!(rendered.contains("Points:        40 (rank #2)"));
        assert_eq!(backend.hits(), 8);
    }

    #[tokio::test]
    async fn test_user_dashboard_partial_failure_fails_page() {
        let backend = FakeBackend::start(backend(member(), StatusCode::INTERNAL_SERVER_ERROR)).await;
        let client = client_for(&backend, Arc::new(MemorySession::with_token("t")));

        let result = load_user_dashboard(&client).await;
        assert!(matches!(result, Err(PageError::Failed(_))));
    }

    #[tokio::test]
    async fn test_admin_dashboard_scopes_to_coordinated_clubs() {
        let coordinator = json!({
            "id": "u2",
            "name": "Ravi",
            "isHeadCoordinator": true,
            "headCoordinatorClubs": ["Robotics"]
        });
        let backend = FakeBackend::start(backend(coordinator, StatusCode::OK)).await;
        let client = client_for(&backend, Arc::new(MemorySession::with_token("t")));

        let dashboard = load_admin_dashboard(&client).await.unwrap();
        assert_eq!(dashboard.clubs.len(), 1);
        assert_eq!(dashboard.events.len(), 2);
        assert_eq!(dashboard.pending_requests(), 1);
    }
}
