//! Crash boundary around page rendering.

use futures::FutureExt;
use std::any::Any;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use tracing::error;

use super::PageError;
use crate::router::Route;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageOutcome {
    Rendered { route: Route, body: String },
    /// Leave the page, e.g. to the login page after the session was dropped
    Redirect(Route),
    /// The page loaded nothing; shown as a banner
    Failed(String),
    /// The page panicked. Reloading is the only recovery.
    Crashed(String),
}

impl PageOutcome {
    pub fn is_crash(&self) -> bool {
        matches!(self, PageOutcome::Crashed(_))
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

/// Run one page render, turning errors and panics into an outcome.
pub async fn guard<F>(route: Route, page: F) -> PageOutcome
where
    F: Future<Output = Result<String, PageError>>,
{
    match AssertUnwindSafe(page).catch_unwind().await {
        Ok(Ok(body)) => PageOutcome::Rendered { route, body },
        Ok(Err(PageError::Unauthenticated)) => PageOutcome::Redirect(Route::Login),
        Ok(Err(PageError::Failed(message))) => PageOutcome::Failed(message),
        Err(payload) => {
            let message = panic_message(payload.as_ref());
            error!(route = %route, %message, "Page crashed");
            PageOutcome::Crashed(message)
        }
    }
}
