//! The signed-in user's profile.

use std::fmt;

use super::PageError;
use crate::api::ApiClient;
use crate::models::{PointsSummary, User, UserEnvelope};

#[derive(Debug, Clone)]
pub struct Profile {
    pub user: User,
    pub points: PointsSummary,
}

pub async fn load_profile(client: &ApiClient) -> Result<Profile, PageError> {
    let (user, points) = tokio::try_join!(
        client.get::<UserEnvelope>("/api/auth/user"),
        client.get::<PointsSummary>("/api/points/user"),
    )?;
    Ok(Profile {
        user: user.into(),
        points,
    })
}

fn list(items: &std::collections::BTreeSet<String>) -> String {
    if items.is_empty() {
        "-".to_string()
    } else {
        items.iter().cloned().collect::<Vec<_>>().join(", ")
    }
}

impl fmt::Display for Profile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let user = &self.user;
        writeln!(f, "Name:    {}", user.name)?;
        writeln!(f, "Email:   {}", user.email)?;
        writeln!(f, "Role:    {}", user.role())?;
        writeln!(f, "Clubs:   {}", list(&user.club_name))?;
        if user.is_head_coordinator {
            writeln!(f, "Leads:   {}", list(&user.head_coordinator_clubs))?;
        }
        writeln!(f, "Points:  {}", self.points.total_points)?;
        for entry in self.points.history.iter().take(10) {
            writeln!(f, "  {:>+5}  {}  {}", entry.points, entry.date, entry.reason)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::MemorySession;
    use crate::test_support::{client_for, FakeBackend};
    use axum::routing::get;
    use axum::{Json, Router};
    use serde_json::json;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_profile_shows_role_and_points() {
        let backend = FakeBackend::start(
            Router::new()
                .route(
                    "/api/auth/user",
                    get(|| async {
                        Json(json!({
                            "user": {
                                "name": "Ravi",
                                "email": "ravi@college.edu",
                                "isHeadCoordinator": true,
                                "headCoordinatorClubs": ["Drama"],
                                "clubName": ["Drama", "Chess"]
                            }
                        }))
                    }),
                )
                .route(
                    "/api/points/user",
                    get(|| async {
                        Json(json!({ "totalPoints": 25, "history": [{ "points": 25, "reason": "Hosted quiz", "date": "2025-02-01" }] }))
                    }),
                ),
        )
        .await;
        let client = client_for(&backend, Arc::new(MemorySession::with_token("t")));

        let profile = load_profile(&client).await.unwrap();
        let rendered = profile.to_string();
        assert!(rendered.contains("Role:    admin"));
        assert!(rendered.contains("Clubs:   Chess, Drama"));
        assert!(rendered.contains("Leads:   Drama"));
        assert!(rendered.contains("Hosted quiz"));
    }
}
