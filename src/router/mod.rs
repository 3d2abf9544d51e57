//! Client route table.
//!
//! Every navigable path maps to a [`Route`], and every route carries the
//! [`Access`] policy the gate enforces. Unknown paths fall back to the
//! login page.

use crate::auth::{RequiredRoles, Role};

/// Who may open a route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Access {
    /// No session needed
    Public,
    /// Any signed-in user
    Authenticated,
    /// Signed-in user whose role passes the gate rules
    Roles(RequiredRoles),
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Route {
    Home,
    Login,
    Signup,
    Dashboard,
    AdminDashboard,
    SuperAdminDashboard,
    Clubs,
    Club { club_id: String },
    Events,
    CreateEvent,
    EditEvent { id: String },
    AdminEvents,
    AdminUsers,
    CreateClub,
    EditClub { club_name: String },
    Notifications,
    Contact,
    Profile,
    ManageClubs,
    Attendance,
    ContactManage,
    RankingSystem,
    ClubPage,
}

impl Route {
    /// Parse a client path such as `/clubs/42` or `/events/7/edit`.
    ///
    /// Query strings, fragments and trailing slashes are ignored. Anything
    /// unrecognized resolves to [`Route::Login`].
    pub fn parse(path: &str) -> Route {
        let path = path
            .split(['?', '#'])
            .next()
            .unwrap_or_default();
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

        match segments.as_slice() {
            [] => Route::Home,
            ["login"] => Route::Login,
            ["signup"] => Route::Signup,
            ["dashboard"] => Route::Dashboard,
            ["admin-dashboard"] => Route::AdminDashboard,
            ["super-admin-dashboard"] => Route::SuperAdminDashboard,
            ["clubs"] => Route::Clubs,
            ["clubs", club_name, "edit"] => Route::EditClub {
                club_name: club_name.to_string(),
            },
            ["clubs", club_id] => Route::Club {
                club_id: club_id.to_string(),
            },
            ["events"] => Route::Events,
            ["events", "create"] => Route::CreateEvent,
            ["events", id, "edit"] => Route::EditEvent { id: id.to_string() },
            ["admin", "events"] => Route::AdminEvents,
            ["admin", "users"] => Route::AdminUsers,
            ["create-club"] => Route::CreateClub,
            ["notifications"] => Route::Notifications,
            ["contact"] => Route::Contact,
            ["profile"] => Route::Profile,
            ["manage-clubs"] => Route::ManageClubs,
            ["attendance"] => Route::Attendance,
            ["contact-manage"] => Route::ContactManage,
            ["ranking-system"] => Route::RankingSystem,
            ["clubpage"] => Route::ClubPage,
            _ => {
                tracing::debug!(path, "Unknown route, falling back to login");
                Route::Login
            }
        }
    }

    pub fn path(&self) -> String {
        match self {
            Route::Home => "/".to_string(),
            Route::Login => "/login".to_string(),
            Route::Signup => "/signup".to_string(),
            Route::Dashboard => "/dashboard".to_string(),
            Route::AdminDashboard => "/admin-dashboard".to_string(),
            Route::SuperAdminDashboard => "/super-admin-dashboard".to_string(),
            Route::Clubs => "/clubs".to_string(),
            Route::Club { club_id } => format!("/clubs/{}", club_id),
            Route::Events => "/events".to_string(),
            Route::CreateEvent => "/events/create".to_string(),
            Route::EditEvent { id } => format!("/events/{}/edit", id),
            Route::AdminEvents => "/admin/events".to_string(),
            Route::AdminUsers => "/admin/users".to_string(),
            Route::CreateClub => "/create-club".to_string(),
            Route::EditClub { club_name } => format!("/clubs/{}/edit", club_name),
            Route::Notifications => "/notifications".to_string(),
            Route::Contact => "/contact".to_string(),
            Route::Profile => "/profile".to_string(),
            Route::ManageClubs => "/manage-clubs".to_string(),
            Route::Attendance => "/attendance".to_string(),
            Route::ContactManage => "/contact-manage".to_string(),
            Route::RankingSystem => "/ranking-system".to_string(),
            Route::ClubPage => "/clubpage".to_string(),
        }
    }

    /// Access policy for this route.
    pub fn access(&self) -> Access {
        use Role::*;
        match self {
            Route::Home | Route::Login | Route::Signup | Route::Contact => Access::Public,

            Route::Clubs
            | Route::Club { .. }
            | Route::Events
            | Route::Notifications
            | Route::Profile
            | Route::RankingSystem
            | Route::ClubPage => Access::Authenticated,

            Route::Dashboard => Access::Roles(RequiredRoles::of(&[User])),

            Route::AdminDashboard
            | Route::AdminEvents
            | Route::CreateEvent
            | Route::EditEvent { .. }
            | Route::EditClub { .. }
            | Route::Attendance => Access::Roles(RequiredRoles::of(&[Admin])),

            Route::AdminUsers => Access::Roles(RequiredRoles::of(&[Admin, SuperAdmin])),

            Route::SuperAdminDashboard
            | Route::CreateClub
            | Route::ManageClubs
            | Route::ContactManage => Access::Roles(RequiredRoles::of(&[SuperAdmin])),
        }
    }
}

impl std::fmt::Display for Route {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.path())
    }
}
