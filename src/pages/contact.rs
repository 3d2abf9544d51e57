//! Public contact form and the super-admin message inbox.

use serde_json::json;
use std::fmt;

use super::PageError;
use crate::api::{endpoint, ApiClient};
use crate::forms::{self, Fields, FormSpec, Rule, SubmitError, Submission};
use crate::models::ContactMessage;

pub const MIN_MESSAGE_LENGTH: usize = 10;

pub fn contact_spec() -> FormSpec {
    FormSpec::new()
        .field("name", "Name", [Rule::Required])
        .field("email", "Email", [Rule::Required, Rule::Email])
        .field("subject", "Subject", [Rule::Required, Rule::MaxLength(120)])
        .field(
            "message",
            "Message",
            [Rule::Required, Rule::MinLength(MIN_MESSAGE_LENGTH)],
        )
}

/// Send the contact form. No session is needed.
pub async fn send_message(client: &ApiClient, values: &Fields) -> Result<String, SubmitError> {
    let spec = contact_spec();
    let response: serde_json::Value = forms::submit(
        client,
        Submission::post("/api/contact", values, &spec).anonymous(),
    )
    .await?;
    Ok(response
        .get("message")
        .and_then(|m| m.as_str())
        .unwrap_or("Thanks! We'll get back to you soon.")
        .to_string())
}

#[derive(Debug, Clone)]
pub struct ContactInbox {
    pub messages: Vec<ContactMessage>,
}

pub async fn load_inbox(client: &ApiClient) -> Result<ContactInbox, PageError> {
    let messages = client.get("/api/contact").await?;
    Ok(ContactInbox { messages })
}

impl fmt::Display for ContactInbox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.messages.is_empty() {
            return writeln!(f, "Inbox is empty.");
        }
        for m in &self.messages {
            let status = if m.is_resolved() { "resolved" } else { "open" };
            writeln!(f, "[{}] {} <{}>  {}", status, m.name, m.email, m.subject)?;
            writeln!(f, "    id: {}", m.id)?;
            writeln!(f, "    {}", m.message)?;
        }
        Ok(())
    }
}

pub async fn resolve_message(client: &ApiClient, id: &str) -> Result<ContactMessage, SubmitError> {
    Ok(client
        .patch(&endpoint(&["api", "contact", id])?, &json!({ "status": "resolved" }))
        .await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::MemorySession;
    use crate::forms::fields;
    use crate::test_support::{client_for, FakeBackend};
    use axum::routing::{patch, post};
    use axum::{Json, Router};
    use serde_json::Value;
    use std::sync::Arc;
    use tokio_test::{assert_err, assert_ok};

    fn backend_router() -> Router {
        Router::new()
            .route(
                "/api/contact",
                post(|| async { Json(json!({ "message": "Message received" })) }),
            )
            .route(
                "/api/contact/:id",
                patch(|Json(body): Json<Value>| async move {
                    Json(json!({ "_id": "m1", "status": body["status"] }))
                }),
            )
    }

    fn form(message: &str) -> Fields {
        fields([
            ("name", "Asha"),
            ("email", "asha@college.edu"),
            ("subject", "Club fair"),
            ("message", message),
        ])
    }

    #[tokio::test]
    async fn test_short_message_is_rejected_without_request() {
        let backend = FakeBackend::start(backend_router()).await;
        let client = client_for(&backend, Arc::new(MemorySession::new()));

        let err = assert_err!(send_message(&client, &form("123456789")).await);
        match err {
            SubmitError::Fields(errors) => {
                assert_eq!(
                    errors.get("message").unwrap(),
                    ["Message must be at least 10 characters"]
                );
            }
            other => panic!("unexpected error: {:?}", other),
        }
        assert_eq!(backend.hits(), 0);
    }

    #[tokio::test]
    async fn test_ten_character_message_sends_once_without_token() {
        let backend = FakeBackend::start(backend_router()).await;
        let client = client_for(&backend, Arc::new(MemorySession::new()));

        let reply = assert_ok!(send_message(&client, &form("1234567890")).await);
        assert_eq!(reply, "Message received");
        assert_eq!(backend.hits_to("POST", "/api/contact"), 1);
        assert_eq!(backend.requests()[0].authorization, None);
    }

    #[tokio::test]
    async fn test_resolve_message() {
        let backend = FakeBackend::start(backend_router()).await;
        let client = client_for(&backend, Arc::new(MemorySession::with_token("t")));

        let message = resolve_message(&client, "m1").await.unwrap();
        assert!(message.is_resolved());
    }
}
