//! Event listing and coordinator event management.

use std::fmt;

use super::{today, PageError};
use crate::api::{endpoint, ApiClient, FilePart};
use crate::forms::{self, Fields, FormSpec, Rule, SubmitError, Submission};
use crate::models::{Event, User, UserEnvelope};

pub const MAX_REGISTRATION_FEE: f64 = 10_000.0;

pub fn event_spec() -> FormSpec {
    FormSpec::new()
        .field("title", "Title", [Rule::Required, Rule::MaxLength(100)])
        .field("description", "Description", [Rule::Required, Rule::MinLength(10)])
        .field("date", "Date", [Rule::Required, Rule::Date])
        .field("time", "Time", Vec::<Rule>::new())
        .field("location", "Location", Vec::<Rule>::new())
        .field("club", "Club", [Rule::Required])
        .field(
            "registrationFee",
            "Registration fee",
            [Rule::Range {
                min: 0.0,
                max: MAX_REGISTRATION_FEE,
            }],
        )
}

/// Same fields as creation, none of them mandatory.
pub fn event_edit_spec() -> FormSpec {
    FormSpec::new()
        .field("title", "Title", [Rule::MaxLength(100)])
        .field("description", "Description", [Rule::MinLength(10)])
        .field("date", "Date", [Rule::Date])
        .field(
            "registrationFee",
            "Registration fee",
            [Rule::Range {
                min: 0.0,
                max: MAX_REGISTRATION_FEE,
            }],
        )
}

pub async fn list_events(client: &ApiClient) -> Result<Vec<Event>, PageError> {
    let mut events: Vec<Event> = client.get("/api/events").await?;
    events.sort_by(|a, b| a.day().cmp(&b.day()).then_with(|| a.title.cmp(&b.title)));
    Ok(events)
}

pub async fn get_event(client: &ApiClient, id: &str) -> Result<Event, PageError> {
    Ok(client.get(&endpoint(&["api", "events", id])?).await?)
}

/// Events split around today's date.
#[derive(Debug, Clone)]
pub struct EventList {
    pub events: Vec<Event>,
    pub today: chrono::NaiveDate,
}

impl EventList {
    pub fn new(events: Vec<Event>) -> Self {
        Self {
            events,
            today: today(),
        }
    }

    pub fn upcoming(&self) -> impl Iterator<Item = &Event> {
        self.events.iter().filter(|e| e.is_upcoming(self.today))
    }

    pub fn past(&self) -> impl Iterator<Item = &Event> {
        self.events.iter().filter(|e| !e.is_upcoming(self.today))
    }
}

fn write_rows<'a>(
    f: &mut fmt::Formatter<'_>,
    events: impl Iterator<Item = &'a Event>,
) -> fmt::Result {
    let mut any = false;
    for event in events {
        any = true;
        let fee = match event.registration_fee {
            Some(fee) if fee > 0.0 => format!("{:.2}", fee),
            _ => "free".to_string(),
        };
        writeln!(
            f,
            "  {:<24}  {:<10}  {:<28}  {:<16}  {}",
            event.id,
            event.date.get(..10).unwrap_or(event.date.as_str()),
            event.title,
            event.club,
            fee
        )?;
    }
    if !any {
        writeln!(f, "  none")?;
    }
    Ok(())
}

impl fmt::Display for EventList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Upcoming:")?;
        write_rows(f, self.upcoming())?;
        writeln!(f)?;
        writeln!(f, "Past:")?;
        write_rows(f, self.past())
    }
}

/// Events of the clubs the signed-in coordinator runs.
pub async fn admin_events(client: &ApiClient) -> Result<EventList, PageError> {
    let (user, events) = tokio::try_join!(
        client.get::<UserEnvelope>("/api/auth/user"),
        client.get::<Vec<Event>>("/api/events"),
    )?;
    let user: User = user.into();
    let events = events
        .into_iter()
        .filter(|e| user.is_admin || user.coordinates(&e.club))
        .collect();
    Ok(EventList::new(events))
}

/// Current values of an event, for prefilling the edit form.
pub fn event_fields(event: &Event) -> Fields {
    let mut values = forms::fields([
        ("title", event.title.as_str()),
        ("description", event.description.as_str()),
        ("date", event.date.get(..10).unwrap_or(event.date.as_str())),
        ("club", event.club.as_str()),
    ]);
    if let Some(time) = &event.time {
        values.insert("time".to_string(), time.clone());
    }
    if let Some(location) = &event.location {
        values.insert("location".to_string(), location.clone());
    }
    if let Some(fee) = event.registration_fee {
        values.insert("registrationFee".to_string(), fee.to_string());
    }
    values
}

pub async fn create_event(
    client: &ApiClient,
    values: &Fields,
    poster: Option<FilePart>,
) -> Result<Event, SubmitError> {
    let spec = event_spec();
    let submission = Submission::post("/api/events", values, &spec)
        .with_files(poster.into_iter().collect());
    forms::submit(client, submission).await
}

pub async fn edit_event(client: &ApiClient, id: &str, values: &Fields) -> Result<Event, SubmitError> {
    let spec = event_edit_spec();
    forms::submit(
        client,
        Submission::patch(endpoint(&["api", "events", id])?, values, &spec),
    )
    .await
}
