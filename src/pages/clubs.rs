//! Club listing, detail, management and membership.

use serde_json::Value;
use std::fmt;

use super::{today, PageError};
use crate::api::{endpoint, ApiClient, ClientError, FilePart};
use crate::forms::{self, Fields, FormSpec, Rule, SubmitError, Submission};
use crate::models::{Club, Event, User};

pub fn club_spec() -> FormSpec {
    FormSpec::new()
        .field("name", "Club name", [Rule::Required, Rule::MaxLength(60)])
        .field("description", "Description", [Rule::Required, Rule::MinLength(20)])
        .field("category", "Category", [Rule::Required])
}

/// Edits are partial: only the fields being changed are sent.
pub fn club_edit_spec() -> FormSpec {
    FormSpec::new()
        .field("name", "Club name", [Rule::MaxLength(60)])
        .field("description", "Description", [Rule::MinLength(20)])
}

/// `/api/clubs/<key>`, with `key` escaped as one path segment.
pub(crate) fn club_path(key: &str) -> Result<String, ClientError> {
    endpoint(&["api", "clubs", key])
}

pub async fn list_clubs(client: &ApiClient) -> Result<Vec<Club>, PageError> {
    Ok(client.get("/api/clubs").await?)
}

/// Clubs with the viewer's relationship to each.
#[derive(Debug, Clone)]
pub struct ClubList {
    pub clubs: Vec<Club>,
    pub viewer: Option<User>,
    /// Show member and pending counts (management view)
    pub manage: bool,
}

impl ClubList {
    fn marker(&self, club: &Club) -> &'static str {
        match &self.viewer {
            Some(user) if user.coordinates(&club.name) => "coordinator",
            Some(user) if user.is_member(&club.name) => "member",
            Some(user) if user.has_pending(&club.id) => "pending",
            _ => "",
        }
    }
}

impl fmt::Display for ClubList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.clubs.is_empty() {
            return writeln!(f, "No clubs found.");
        }
        if self.manage {
            writeln!(f, "{:<24}  {:<24}  {:<14}  {:>7}  {:>7}", "ID", "NAME", "CATEGORY", "MEMBERS", "PENDING")?;
            writeln!(f, "{}", "-".repeat(84))?;
            for club in &self.clubs {
                writeln!(
                    f,
                    "{:<24}  {:<24}  {:<14}  {:>7}  {:>7}",
                    club.id,
                    truncate(&club.name, 24),
                    truncate(&club.category, 14),
                    club.member_count(),
                    club.pending_members.len()
                )?;
            }
        } else {
            writeln!(f, "{:<24}  {:<24}  {:<14}  {}", "ID", "NAME", "CATEGORY", "STATUS")?;
            writeln!(f, "{}", "-".repeat(80))?;
            for club in &self.clubs {
                writeln!(
                    f,
                    "{:<24}  {:<24}  {:<14}  {}",
                    club.id,
                    truncate(&club.name, 24),
                    truncate(&club.category, 14),
                    self.marker(club)
                )?;
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct ClubDetail {
    pub club: Club,
    pub events: Vec<Event>,
    pub viewer: Option<User>,
}

pub async fn club_detail(
    client: &ApiClient,
    club_id: &str,
    viewer: Option<User>,
) -> Result<ClubDetail, PageError> {
    let path = club_path(club_id)?;
    let (club, events) = tokio::try_join!(
        client.get::<Club>(&path),
        client.get::<Vec<Event>>("/api/events"),
    )?;
    let events = events.into_iter().filter(|e| e.club == club.name).collect();
    Ok(ClubDetail {
        club,
        events,
        viewer,
    })
}

impl fmt::Display for ClubDetail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let club = &self.club;
        writeln!(f, "=== {} ===", club.name)?;
        writeln!(f)?;
        writeln!(f, "ID:           {}", club.id)?;
        writeln!(f, "Category:     {}", or_dash(&club.category))?;
        writeln!(f, "Members:      {}", club.member_count())?;
        if !club.head_coordinators.is_empty() {
            writeln!(f, "Coordinators: {}", club.head_coordinators.join(", "))?;
        }
        if let Some(image) = &club.image {
            writeln!(f, "Image:        {}", image)?;
        }
        if let Some(user) = &self.viewer {
            let status = if user.is_member(&club.name) {
                "member"
            } else if user.has_pending(&club.id) {
                "request pending"
            } else {
                "not a member"
            };
            writeln!(f, "You:          {}", status)?;
        }
        writeln!(f)?;
        writeln!(f, "{}", club.description)?;
        writeln!(f)?;
        writeln!(f, "Events ({}):", self.events.len())?;
        for event in &self.events {
            writeln!(f, "  {}  {}", event.date, event.title)?;
        }
        Ok(())
    }
}

/// All clubs with their upcoming events.
#[derive(Debug, Clone)]
pub struct ClubsOverview {
    pub clubs: Vec<Club>,
    pub events: Vec<Event>,
}

pub async fn clubs_overview(client: &ApiClient) -> Result<ClubsOverview, PageError> {
    let (clubs, events) = tokio::try_join!(
        client.get::<Vec<Club>>("/api/clubs"),
        client.get::<Vec<Event>>("/api/events"),
    )?;
    Ok(ClubsOverview { clubs, events })
}

impl fmt::Display for ClubsOverview {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let today = today();
        for club in &self.clubs {
            writeln!(f, "{} [{}]", club.name, or_dash(&club.category))?;
            let upcoming: Vec<&Event> = self
                .events
                .iter()
                .filter(|e| e.club == club.name && e.is_upcoming(today))
                .collect();
            for event in &upcoming {
                writeln!(f, "    {}  {}", event.date, event.title)?;
            }
            if upcoming.is_empty() {
                writeln!(f, "    no upcoming events")?;
            }
        }
        Ok(())
    }
}

pub async fn create_club(
    client: &ApiClient,
    values: &Fields,
    image: Option<FilePart>,
) -> Result<Club, SubmitError> {
    let spec = club_spec();
    let files = image.into_iter().collect();
    forms::submit(
        client,
        Submission::post("/api/clubs", values, &spec).with_files(files),
    )
    .await
}

pub async fn edit_club(
    client: &ApiClient,
    club_name: &str,
    values: &Fields,
) -> Result<Club, SubmitError> {
    let spec = club_edit_spec();
    forms::submit(client, Submission::patch(club_path(club_name)?, values, &spec)).await
}

pub async fn delete_club(client: &ApiClient, club_name: &str) -> Result<(), SubmitError> {
    client.delete::<Value>(&club_path(club_name)?).await?;
    Ok(())
}

/// Request membership; the club's coordinators approve it later.
pub async fn join_club(client: &ApiClient, club_id: &str) -> Result<String, SubmitError> {
    membership(client, club_id, "join", "Join request sent").await
}

pub async fn leave_club(client: &ApiClient, club_id: &str) -> Result<String, SubmitError> {
    membership(client, club_id, "leave", "You left the club").await
}

async fn membership(
    client: &ApiClient,
    club_id: &str,
    action: &str,
    fallback: &str,
) -> Result<String, SubmitError> {
    let path = endpoint(&["api", "clubs", club_id, action])?;
    let response: Value = client.post(&path, &serde_json::json!({})).await?;
    Ok(response
        .get("message")
        .and_then(Value::as_str)
        .unwrap_or(fallback)
        .to_string())
}

fn or_dash(s: &str) -> &str {
    if s.is_empty() {
        "-"
    } else {
        s
    }
}

/// Truncate a string to max length with ellipsis
fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
