use std::fmt;

use super::PageError;
use crate::api::ApiClient;
use crate::auth::Role;
use crate::models::User;

#[derive(Debug, Clone)]
pub struct UserDirectory {
    pub users: Vec<User>,
}

pub async fn load_users(client: &ApiClient) -> Result<UserDirectory, PageError> {
    let mut users: Vec<User> = client.get("/api/users").await?;
    users.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));
    Ok(UserDirectory { users })
}

impl UserDirectory {
    pub fn with_role(&self, role: Role) -> impl Iterator<Item = &User> {
        self.users.iter().filter(move |u| u.role() == role)
    }
}

impl fmt::Display for UserDirectory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{:<24}  {:<32}  {:<12}  {}", "NAME", "EMAIL", "ROLE", "CLUBS")?;
        writeln!(f, "{}", "-".repeat(84))?;
        for user in &self.users {
            writeln!(
                f,
                "{:<24}  {:<32}  {:<12}  {}",
                user.name,
                user.email,
                user.role().to_string(),
                user.club_name.len()
            )?;
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
    async fn test_directory_sorted_and_grouped_by_role() {
        let backend = FakeBackend::start(Router::new().route(
            "/api/users",
            get(|| async {
                Json(json!([
                    { "_id": "1", "name": "ravi", "isHeadCoordinator": true },
                    { "_id": "2", "name": "Asha" },
                    { "_id": "3", "name": "Dean", "isAdmin": true }
                ]))
            }),
        ))
        .await;
        let client = client_for(&backend, Arc::new(MemorySession::with_token("t")));

        let directory = load_users(&client).await.unwrap();
        let names: Vec<&str> = directory.users.iter().map(|u| u.name.as_str()).collect();
        assert_eq!(names, vec!["Asha", "Dean", "ravi"]);
        assert_eq!(directory.with_role(Role::Admin).count(), 1);
        assert_eq!(directory.with_role(Role::SuperAdmin).next().unwrap().name, "Dean");
    }
}
