//! Route authorization.
//!
//! [`authorize`] holds every role rule in one pure function. [`GateState`]
//! models one navigation from "no session" to "user resolved", and
//! [`Gate`] drives it against the session and a [`UserSource`].

use std::sync::Arc;
use tracing::{debug, info};

use super::resolver::{ResolveError, UserSource};
use super::role::{RequiredRoles, Role};
use super::session::SessionStore;
use crate::models::User;
use crate::router::{Access, Route};

/// Redirect hops [`Gate::follow`] takes before giving up on the login page.
const MAX_REDIRECTS: usize = 4;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Redirect(Route),
}

/// Decide whether `role` may open a page requiring `required`.
///
/// First matching rule wins:
/// 1. a page for `user` bounces admins and super-admins to their own home
/// 2. a page for `super-admin` sends everyone else to `/dashboard`
/// 3. a page for `admin` sends plain users to `/dashboard`
/// 4. a page for `admin` admits super-admins
/// 5. otherwise the role must be listed
pub fn authorize(required: &RequiredRoles, role: Role) -> Decision {
    if required.contains(Role::User) && role.is_elevated() {
        return Decision::Redirect(role.home());
    }
    if required.contains(Role::SuperAdmin) && role != Role::SuperAdmin {
        return Decision::Redirect(Route::Dashboard);
    }
    if required.contains(Role::Admin) && !role.is_elevated() {
        return Decision::Redirect(Route::Dashboard);
    }
    if required.contains(Role::Admin) && role == Role::SuperAdmin {
        return Decision::Allow;
    }
    if required.contains(role) {
        Decision::Allow
    } else {
        Decision::Redirect(Route::Dashboard)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateState {
    /// No session token
    Unauthenticated,
    /// Waiting on the user resolver
    Resolving,
    /// Resolver finished; `None` when it failed
    Resolved(Option<User>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateOutcome {
    /// Show a loading indicator, no decision yet
    Loading,
    Allow,
    Redirect(Route),
}

impl From<Decision> for GateOutcome {
    fn from(decision: Decision) -> Self {
        match decision {
            Decision::Allow => GateOutcome::Allow,
            Decision::Redirect(route) => GateOutcome::Redirect(route),
        }
    }
}

impl GateState {
    pub fn evaluate(&self, access: &Access) -> GateOutcome {
        if *access == Access::Public {
            return GateOutcome::Allow;
        }
        match self {
            GateState::Unauthenticated => GateOutcome::Redirect(Route::Login),
            GateState::Resolving => GateOutcome::Loading,
            GateState::Resolved(None) => GateOutcome::Redirect(Route::Login),
            GateState::Resolved(Some(user)) => match access {
                Access::Roles(required) => authorize(required, user.role()).into(),
                Access::Public | Access::Authenticated => GateOutcome::Allow,
            },
        }
    }
}

/// Result of one navigation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Navigation {
    pub route: Route,
    pub outcome: GateOutcome,
    /// The resolved user, when one was fetched
    pub user: Option<User>,
}

pub struct Gate {
    session: Arc<dyn SessionStore>,
    users: Arc<dyn UserSource>,
}

impl Gate {
    pub fn new(session: Arc<dyn SessionStore>, users: Arc<dyn UserSource>) -> Self {
        Self { session, users }
    }

    pub async fn navigate(&self, route: Route) -> Navigation {
        self.navigate_observed(route, |_, _| {}).await
    }

    /// Like [`navigate`](Self::navigate), reporting each state the gate
    /// passes through together with its outcome.
    pub async fn navigate_observed<F>(&self, route: Route, mut observe: F) -> Navigation
    where
        F: FnMut(&GateState, &GateOutcome) + Send,
    {
        let access = route.access();
        if access == Access::Public {
            return Navigation {
                route,
                outcome: GateOutcome::Allow,
                user: None,
            };
        }

        let state = if self.session.get().is_none() {
            GateState::Unauthenticated
        } else {
            let resolving = GateState::Resolving;
            observe(&resolving, &resolving.evaluate(&access));

            match self.users.resolve().await {
                Ok(user) => GateState::Resolved(Some(user)),
                Err(ResolveError::Unauthenticated) => GateState::Unauthenticated,
                Err(ResolveError::Unavailable(reason)) => {
                    debug!(%reason, "User unavailable, treating as signed out");
                    GateState::Resolved(None)
                }
            }
        };

        let outcome = state.evaluate(&access);
        observe(&state, &outcome);
        info!(route = %route, outcome = ?outcome, "Navigation decided");

        let user = match state {
            GateState::Resolved(user) => user,
            _ => None,
        };
        Navigation {
            route,
            outcome,
            user,
        }
    }

    /// Navigate, following redirects until a page is allowed.
    pub async fn follow(&self, route: Route) -> Navigation {
        let mut navigation = self.navigate(route).await;
        for _ in 0..MAX_REDIRECTS {
            match &navigation.outcome {
                GateOutcome::Redirect(next) => {
                    let next = next.clone();
                    navigation = self.navigate(next).await;
                }
                _ => return navigation,
            }
        }
        navigation
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::MemorySession;
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    const ALL_ROLES: [Role; 3] = [Role::User, Role::Admin, Role::SuperAdmin];

    fn all_required_sets() -> Vec<RequiredRoles> {
        (0u8..8)
            .map(|mask| {
                ALL_ROLES
                    .iter()
                    .enumerate()
                    .filter(|(i, _)| mask & (1 << i) != 0)
                    .map(|(_, r)| *r)
                    .collect()
            })
            .collect()
    }

    fn user_with(is_admin: bool, is_head_coordinator: bool) -> User {
        User {
            id: "u".to_string(),
            is_admin,
            is_head_coordinator,
            ..Default::default()
        }
    }

    struct FakeUsers {
        result: Mutex<Option<Result<User, ResolveError>>>,
        calls: AtomicUsize,
        user: Option<User>,
    }

    impl FakeUsers {
        fn returning(user: User) -> Self {
            Self {
                result: Mutex::new(None),
                calls: AtomicUsize::new(0),
                user: Some(user),
            }
        }

        fn failing(error: ResolveError) -> Self {
            Self {
                result: Mutex::new(Some(Err(error))),
                calls: AtomicUsize::new(0),
                user: None,
            }
        }
    }

    #[async_trait]
    impl UserSource for FakeUsers {
        async fn resolve(&self) -> Result<User, ResolveError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if let Some(user) = &self.user {
                return Ok(user.clone());
            }
            match self.result.lock().take() {
                Some(result) => result,
                None => Err(ResolveError::Unavailable("exhausted".to_string())),
            }
        }
    }

    fn make_gate(session: MemorySession, users: FakeUsers) -> (Gate, Arc<FakeUsers>) {
        let users = Arc::new(users);
        (Gate::new(Arc::new(session), users.clone()), users)
    }

    #[test]
    fn test_authorize_full_decision_table() {
        use Role::{Admin, SuperAdmin, User as Member};
        let allow = Decision::Allow;
        let dash = Decision::Redirect(Route::Dashboard);
        let admin_home = Decision::Redirect(Route::AdminDashboard);
        let super_home = Decision::Redirect(Route::SuperAdminDashboard);

        // required roles, then the decision for user, admin, super-admin
        let table: [(&[Role], [Decision; 3]); 8] = [
            (&[], [dash.clone(), dash.clone(), dash.clone()]),
            (&[Member], [allow.clone(), admin_home.clone(), super_home.clone()]),
            (&[Admin], [dash.clone(), allow.clone(), allow.clone()]),
            (&[Member, Admin], [dash.clone(), admin_home.clone(), super_home.clone()]),
            (&[SuperAdmin], [dash.clone(), dash.clone(), allow.clone()]),
            (&[Member, SuperAdmin], [dash.clone(), admin_home.clone(), super_home.clone()]),
            (&[Admin, SuperAdmin], [dash.clone(), dash.clone(), allow.clone()]),
            (&[Member, Admin, SuperAdmin], [dash.clone(), admin_home, super_home]),
        ];

        let mut checked = 0;
        for (required, expected) in table {
            let required: RequiredRoles = required.iter().copied().collect();
            for (role, want) in ALL_ROLES.into_iter().zip(expected) {
                assert_eq!(
                    authorize(&required, role),
                    want,
                    "required {:?}, role {:?}",
                    required,
                    role
                );
                checked += 1;
            }
        }
        assert_eq!(checked, 24);
    }

    #[test]
    fn test_authorize_is_deterministic() {
        for required in all_required_sets() {
            for role in ALL_ROLES {
                assert_eq!(authorize(&required, role), authorize(&required, role));
            }
        }
    }

    #[test]
    fn test_super_admin_allowed_on_any_admin_page() {
        let role = user_with(true, false).role();
        for required in all_required_sets() {
            if required.contains(Role::Admin) && !required.contains(Role::User) {
                assert_eq!(authorize(&required, role), Decision::Allow, "{}", required);
            }
        }
    }

    #[test]
    fn test_plain_user_never_sees_elevated_pages() {
        for required in all_required_sets() {
            if required.contains(Role::Admin) || required.contains(Role::SuperAdmin) {
                assert_eq!(
                    authorize(&required, Role::User),
                    Decision::Redirect(Route::Dashboard),
                    "{}",
                    required
                );
            }
        }
    }

    #[test]
    fn test_elevated_roles_bounced_from_member_pages() {
        let member_only = RequiredRoles::of(&[Role::User]);
        assert_eq!(
            authorize(&member_only, Role::SuperAdmin),
            Decision::Redirect(Route::SuperAdminDashboard)
        );
        assert_eq!(
            authorize(&member_only, Role::Admin),
            Decision::Redirect(Route::AdminDashboard)
        );
        assert_eq!(authorize(&member_only, Role::User), Decision::Allow);
    }

    #[test]
    fn test_documented_scenarios() {
        let plain = user_with(false, false).role();
        let super_admin = user_with(true, false).role();

        assert_eq!(
            authorize(&RequiredRoles::of(&[Role::Admin, Role::SuperAdmin]), plain),
            Decision::Redirect(Route::Dashboard)
        );
        assert_eq!(
            authorize(&RequiredRoles::of(&[Role::SuperAdmin]), super_admin),
            Decision::Allow
        );
        assert_eq!(
            authorize(&RequiredRoles::of(&[Role::User]), super_admin),
            Decision::Redirect(Route::SuperAdminDashboard)
        );
    }

    #[test]
    fn test_admin_on_admin_or_super_admin_page_is_redirected() {
        // The super-admin rule runs before the admin rules
        let required = RequiredRoles::of(&[Role::Admin, Role::SuperAdmin]);
        assert_eq!(
            authorize(&required, Role::Admin),
            Decision::Redirect(Route::Dashboard)
        );
        assert_eq!(authorize(&RequiredRoles::of(&[Role::Admin]), Role::Admin), Decision::Allow);
    }

    #[test]
    fn test_empty_requirement_redirects() {
        for role in ALL_ROLES {
            assert_eq!(
                authorize(&RequiredRoles::default(), role),
                Decision::Redirect(Route::Dashboard)
            );
        }
    }

    #[test]
    fn test_gate_state_machine() {
        let access = Route::Dashboard.access();
        assert_eq!(
            GateState::Unauthenticated.evaluate(&access),
            GateOutcome::Redirect(Route::Login)
        );
        assert_eq!(GateState::Resolving.evaluate(&access), GateOutcome::Loading);
        assert_eq!(
            GateState::Resolved(None).evaluate(&access),
            GateOutcome::Redirect(Route::Login)
        );
        assert_eq!(
            GateState::Resolved(Some(user_with(false, false))).evaluate(&access),
            GateOutcome::Allow
        );
        assert_eq!(
            GateState::Unauthenticated.evaluate(&Access::Public),
            GateOutcome::Allow
        );
        assert_eq!(
            GateState::Resolved(Some(user_with(false, true))).evaluate(&Access::Authenticated),
            GateOutcome::Allow
        );
    }

    #[tokio::test]
    async fn test_navigate_without_token_redirects_to_login() {
        let (gate, users) = make_gate(MemorySession::new(), FakeUsers::returning(user_with(false, false)));

        let nav = gate.navigate(Route::Dashboard).await;
        assert_eq!(nav.outcome, GateOutcome::Redirect(Route::Login));
        assert_eq!(nav.user, None);
        assert_eq!(users.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_navigate_resolves_fresh_each_time() {
        let (gate, users) = make_gate(
            MemorySession::with_token("t"),
            FakeUsers::returning(user_with(false, true)),
        );

        let nav = gate.navigate(Route::AdminDashboard).await;
        assert_eq!(nav.outcome, GateOutcome::Allow);
        assert!(nav.user.is_some());

        let nav = gate.navigate(Route::Dashboard).await;
        assert_eq!(nav.outcome, GateOutcome::Redirect(Route::AdminDashboard));
        assert_eq!(users.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_navigate_public_route_skips_resolver() {
        let (gate, users) = make_gate(MemorySession::new(), FakeUsers::returning(user_with(true, false)));

        let nav = gate.navigate(Route::Contact).await;
        assert_eq!(nav.outcome, GateOutcome::Allow);
        assert_eq!(users.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_navigate_resolver_failure_redirects_to_login() {
        let (gate, _) = make_gate(
            MemorySession::with_token("t"),
            FakeUsers::failing(ResolveError::Unavailable("down".to_string())),
        );
        let nav = gate.navigate(Route::Profile).await;
        assert_eq!(nav.outcome, GateOutcome::Redirect(Route::Login));
    }

    #[tokio::test]
    async fn test_navigate_reports_loading_before_decision() {
        let (gate, _) = make_gate(
            MemorySession::with_token("t"),
            FakeUsers::returning(user_with(false, false)),
        );
        let mut seen = Vec::new();
        gate.navigate_observed(Route::Events, |_, outcome| seen.push(outcome.clone()))
            .await;
        assert_eq!(seen, vec![GateOutcome::Loading, GateOutcome::Allow]);
    }

    #[tokio::test]
    async fn test_follow_lands_on_own_dashboard() {
        let (gate, _) = make_gate(
            MemorySession::with_token("t"),
            FakeUsers::returning(user_with(true, false)),
        );
        let nav = gate.follow(Route::Dashboard).await;
        assert_eq!(nav.route, Route::SuperAdminDashboard);
        assert_eq!(nav.outcome, GateOutcome::Allow);

        let (gate, _) = gate_signed_out();
        let nav = gate.follow(Route::ManageClubs).await;
        assert_eq!(nav.route, Route::Login);
        assert_eq!(nav.outcome, GateOutcome::Allow);
    }

    fn gate_signed_out() -> (Gate, Arc<FakeUsers>) {
        make_gate(MemorySession::new(), FakeUsers::returning(user_with(false, false)))
    }
}
