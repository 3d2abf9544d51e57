//! Page loaders.
//!
//! Each page fetches what it shows through the [`ApiClient`] and renders
//! to plain text. [`open`] takes a client path through the gate and the
//! crash boundary and returns what the user ends up seeing.

pub mod attendance;
pub mod auth;
pub mod boundary;
pub mod clubs;
pub mod contact;
pub mod dashboard;
pub mod events;
pub mod notifications;
pub mod profile;
pub mod ranking;
pub mod users;

pub use boundary::{guard, PageOutcome};

use chrono::NaiveDate;
use std::fmt;

use crate::api::{ApiClient, ClientError};
use crate::auth::{Gate, GateOutcome, Navigation};
use crate::forms::{Fields, FormSpec, Rule};
use crate::models::Club;
use crate::router::Route;

#[derive(Debug, thiserror::Error)]
pub enum PageError {
    /// Session missing or rejected mid-load; go to the login page
    #[error("authentication required")]
    Unauthenticated,
    #[error("{0}")]
    Failed(String),
}

impl From<ClientError> for PageError {
    fn from(err: ClientError) -> Self {
        match err {
            ClientError::Unauthenticated => PageError::Unauthenticated,
            other => PageError::Failed(other.banner()),
        }
    }
}

pub fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

/// An empty or prefilled form, listing its inputs.
struct FormView<'a> {
    title: &'a str,
    spec: FormSpec,
    values: Fields,
}

impl fmt::Display for FormView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== {} ===", self.title)?;
        for field in self.spec.fields() {
            let required = field.rules.iter().any(|r| matches!(r, Rule::Required));
            let value = self.values.get(&field.name).map(String::as_str).unwrap_or("");
            writeln!(
                f,
                "{}{} [{}]: {}",
                field.label,
                if required { " *" } else { "" },
                field.name,
                value
            )?;
        }
        Ok(())
    }
}

fn form(title: &str, spec: FormSpec, values: Fields) -> String {
    FormView { title, spec, values }.to_string()
}

/// Render an allowed route.
pub async fn render(client: &ApiClient, navigation: &Navigation) -> Result<String, PageError> {
    let viewer = navigation.user.clone();
    let body = match &navigation.route {
        Route::Home => {
            "Welcome to ClubHub.\n\nBrowse clubs, join events and climb the leaderboard.\nSign in at /login or create an account at /signup.\n".to_string()
        }
        Route::Login => form("Sign in", auth::login_spec(), Fields::new()),
        Route::Signup => form("Create account", auth::signup_spec(), Fields::new()),
        Route::Contact => form("Contact us", contact::contact_spec(), Fields::new()),

        Route::Dashboard => dashboard::load_user_dashboard(client).await?.to_string(),
        Route::AdminDashboard => dashboard::load_admin_dashboard(client).await?.to_string(),
        Route::SuperAdminDashboard => dashboard::load_super_admin_dashboard(client)
            .await?
            .to_string(),

        Route::Clubs | Route::ManageClubs => clubs::ClubList {
            clubs: clubs::list_clubs(client).await?,
            viewer,
            manage: navigation.route == Route::ManageClubs,
        }
        .to_string(),
        Route::Club { club_id } => clubs::club_detail(client, club_id, viewer).await?.to_string(),
        Route::ClubPage => clubs::clubs_overview(client).await?.to_string(),
        Route::CreateClub => form("Create club", clubs::club_spec(), Fields::new()),
        Route::EditClub { club_name } => {
            let club: Club = client.get(&clubs::club_path(club_name)?).await?;
            let values = crate::forms::fields([
                ("name", club.name.as_str()),
                ("description", club.description.as_str()),
            ]);
            form("Edit club", clubs::club_edit_spec(), values)
        }

        Route::Events => events::EventList::new(events::list_events(client).await?).to_string(),
        Route::AdminEvents => events::admin_events(client).await?.to_string(),
        Route::CreateEvent => form("Create event", events::event_spec(), Fields::new()),
        Route::EditEvent { id } => {
            let event = events::get_event(client, id).await?;
            form("Edit event", events::event_edit_spec(), events::event_fields(&event))
        }

        Route::Attendance => attendance::load_attendance(client).await?.to_string(),
        Route::RankingSystem => {
            let viewer_id = viewer.map(|u| u.id);
            ranking::load_leaderboard(client, viewer_id).await?.to_string()
        }
        Route::Notifications => notifications::load_notifications(client).await?.to_string(),
        Route::Profile => profile::load_profile(client).await?.to_string(),
        Route::AdminUsers => users::load_users(client).await?.to_string(),
        Route::ContactManage => contact::load_inbox(client).await?.to_string(),
    };
    Ok(body)
}

/// Navigate to `path` and render whatever page the gate settles on.
pub async fn open(gate: &Gate, client: &ApiClient, path: &str) -> PageOutcome {
    let navigation = gate.follow(Route::parse(path)).await;
    match &navigation.outcome {
        GateOutcome::Allow => {
            let route = navigation.route.clone();
            guard(route, render(client, &navigation)).await
        }
        GateOutcome::Redirect(next) => PageOutcome::Redirect(next.clone()),
        GateOutcome::Loading => PageOutcome::Failed("Still loading".to_string()),
    }
}
