use serde_json::Value;
use std::fmt;

use super::PageError;
use crate::api::{endpoint, ApiClient, ApiRequest};
use crate::forms::SubmitError;
use crate::models::Notification;

#[derive(Debug, Clone)]
pub struct Inbox {
    pub notifications: Vec<Notification>,
}

pub async fn load_notifications(client: &ApiClient) -> Result<Inbox, PageError> {
    let notifications = client.get("/api/notifications").await?;
    Ok(Inbox { notifications })
}

impl Inbox {
    pub fn unread(&self) -> usize {
        self.notifications.iter().filter(|n| !n.read).count()
    }
}

impl fmt::Display for Inbox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Notifications ({} unread)", self.unread())?;
        for n in &self.notifications {
            let flag = if n.read { " " } else { "*" };
            writeln!(f, "{} {:<24}  {}", flag, n.id, n.message)?;
        }
        Ok(())
    }
}

pub async fn mark_read(client: &ApiClient, id: &str) -> Result<(), SubmitError> {
    let request = ApiRequest::patch(endpoint(&["api", "notifications", id, "read"])?);
    client.execute::<Value>(request).await?;
    Ok(())
}
