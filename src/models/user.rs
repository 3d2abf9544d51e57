//! User profile and auth payloads.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::auth::Role;

/// Profile returned by `GET /api/auth/user`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct User {
    #[serde(alias = "_id")]
    pub id: String,
    pub name: String,
    pub email: String,
    pub is_admin: bool,
    pub is_head_coordinator: bool,
    pub head_coordinator_clubs: BTreeSet<String>,
    /// Clubs the user is a member of
    pub club_name: BTreeSet<String>,
    /// Club ids with a pending join request
    pub pending_clubs: BTreeSet<String>,
}

impl User {
    pub fn role(&self) -> Role {
        Role::from_flags(self.is_admin, self.is_head_coordinator)
    }

    pub fn is_member(&self, club_name: &str) -> bool {
        self.club_name.contains(club_name)
    }

    pub fn coordinates(&self, club_name: &str) -> bool {
        self.head_coordinator_clubs.contains(club_name)
    }

    pub fn has_pending(&self, club_id: &str) -> bool {
        self.pending_clubs.contains(club_id)
    }
}

/// `/api/auth/user` answers either with the bare profile or wrapped in `user`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum UserEnvelope {
    Wrapped { user: User },
    Bare(User),
}

impl From<UserEnvelope> for User {
    fn from(envelope: UserEnvelope) -> Self {
        match envelope {
            UserEnvelope::Wrapped { user } => user,
            UserEnvelope::Bare(user) => user,
        }
    }
}

/// Response of the login, OTP verification and signup endpoints.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthResponse {
    pub token: String,
    #[serde(default)]
    pub user: Option<User>,
    #[serde(default)]
    pub message: Option<String>,
}
