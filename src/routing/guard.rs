//! Navigation guard run before every route transition.
//!
//! ARCHITECTURE
//! ============
//! The guard is a fixed, ordered list of [`Stage`]s. Each stage either lets
//! the navigation continue to the next stage or ends it with a [`Decision`]:
//!
//! 1. `EscapeHatch`: backend-owned prefixes leave the SPA via a full page load.
//! 2. `QueryParams`: a query key outside the route's allow-list sends the
//!    user to `/`. Runs before any network work.
//! 3. `Reconcile`: protected target and no cached session means one identity
//!    fetch. Its failure is not fatal; later stages just see "signed out".
//!    If a newer request overtakes the fetch, the stage waits for that request
//!    and the later stages judge the session it settled on.
//! 4. `AdminCheck`: admin routes resolve here, never falling through to the
//!    weaker sign-in check.
//! 5. `AuthCheck`: signed-in routes.
//!
//! Anything that survives every stage proceeds.

#[cfg(test)]
#[path = "guard_test.rs"]
mod guard_test;

use std::ops::ControlFlow;

use super::query::{QueryError, QueryParams, validate_params};
use super::routes::{LOGIN_PATH, NEXT_PARAM, ROOT_PATH, RouteDescriptor, RouteTable, is_external};
use crate::net::api::IdentityClient;
use crate::state::session::{FetchOutcome, Session, SessionStore};

/// One route transition, consumed once by the guard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigationIntent {
    pub target_path: String,
    pub query: QueryParams,
    pub current_path: String,
}

impl NavigationIntent {
    #[must_use]
    pub fn new(target_path: impl Into<String>, query: QueryParams, current_path: impl Into<String>) -> Self {
        Self { target_path: target_path.into(), query, current_path: current_path.into() }
    }

    /// Split an in-app href into path and query. Any `#fragment` is dropped.
    ///
    /// # Errors
    ///
    /// Returns [`QueryError`] when the query string is malformed.
    pub fn parse(href: &str, current_path: &str) -> Result<Self, QueryError> {
        let href = href.split_once('#').map_or(href, |(before, _)| before);
        let (path, raw_query) = href.split_once('?').unwrap_or((href, ""));
        let path = if path.is_empty() { ROOT_PATH } else { path };
        Ok(Self::new(path, QueryParams::parse(raw_query)?, current_path))
    }

    /// Target path plus query, as it would appear in the address bar.
    #[must_use]
    pub fn target_href(&self) -> String {
        join_href(&self.target_path, &self.query)
    }
}

fn join_href(path: &str, query: &QueryParams) -> String {
    if query.is_empty() {
        path.to_owned()
    } else {
        format!("{path}?{}", query.to_query_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    Proceed,
    /// Replace the navigation with an in-app route.
    Redirect { target: String, query: QueryParams },
    /// Leave the SPA and let the browser load `href`.
    FullPageLoad { href: String },
}

impl Decision {
    fn redirect(target: &str) -> Self {
        Self::Redirect { target: target.to_owned(), query: QueryParams::new() }
    }

    fn to_login(intent: &NavigationIntent) -> Self {
        Self::Redirect {
            target: LOGIN_PATH.to_owned(),
            query: QueryParams::new().with(NEXT_PARAM, intent.target_href()),
        }
    }

    /// Address for redirects and full page loads; `None` when proceeding.
    #[must_use]
    pub fn href(&self) -> Option<String> {
        match self {
            Self::Proceed => None,
            Self::Redirect { target, query } => Some(join_href(target, query)),
            Self::FullPageLoad { href } => Some(href.clone()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    EscapeHatch,
    QueryParams,
    Reconcile,
    AdminCheck,
    AuthCheck,
}

/// Evaluation order. Query validation precedes reconciliation so rejected
/// navigations cost no network round-trip; admin precedes plain auth.
pub const PIPELINE: [Stage; 5] =
    [Stage::EscapeHatch, Stage::QueryParams, Stage::Reconcile, Stage::AdminCheck, Stage::AuthCheck];

type Step = ControlFlow<Decision>;

fn escape_hatch(intent: &NavigationIntent) -> Step {
    if is_external(&intent.target_path) {
        return ControlFlow::Break(Decision::FullPageLoad { href: intent.target_href() });
    }
    ControlFlow::Continue(())
}

fn check_query(routes: &RouteTable, intent: &NavigationIntent) -> Step {
    if validate_params(routes, &intent.target_path, &intent.query).is_ok() {
        ControlFlow::Continue(())
    } else {
        ControlFlow::Break(Decision::redirect(ROOT_PATH))
    }
}

fn admin_check(route: Option<&RouteDescriptor>, session: &Session, intent: &NavigationIntent) -> Step {
    if !route.is_some_and(|r| r.requires_admin) {
        return ControlFlow::Continue(());
    }
    let decision = if !session.is_authenticated() {
        Decision::to_login(intent)
    } else if !session.is_admin() {
        Decision::redirect(ROOT_PATH)
    } else {
        Decision::Proceed
    };
    ControlFlow::Break(decision)
}

fn auth_check(route: Option<&RouteDescriptor>, session: &Session, intent: &NavigationIntent) -> Step {
    if route.is_some_and(|r| r.requires_auth) && !session.is_authenticated() {
        return ControlFlow::Break(Decision::to_login(intent));
    }
    ControlFlow::Continue(())
}

pub struct NavigationGuard<C> {
    routes: RouteTable,
    store: SessionStore<C>,
}

impl<C> Clone for NavigationGuard<C> {
    fn clone(&self) -> Self {
        Self { routes: self.routes.clone(), store: self.store.clone() }
    }
}

impl<C: IdentityClient> NavigationGuard<C> {
    #[must_use]
    pub fn new(routes: RouteTable, store: SessionStore<C>) -> Self {
        Self { routes, store }
    }

    #[must_use]
    pub fn routes(&self) -> &RouteTable {
        &self.routes
    }

    #[must_use]
    pub fn store(&self) -> &SessionStore<C> {
        &self.store
    }

    async fn reconcile(&self, route: Option<&RouteDescriptor>) -> Step {
        if route.is_some_and(RouteDescriptor::needs_session) && !self.store.is_authenticated() {
            if let FetchOutcome::Superseded(identity) = self.store.fetch_identity_outcome().await {
                leptos::logging::log!("guard reconcile overtaken; newer request left signed_in={}", identity.is_some());
            }
        }
        ControlFlow::Continue(())
    }

    /// Run the pipeline for one navigation.
    pub async fn before_navigate(&self, intent: &NavigationIntent) -> Decision {
        let route = self.routes.lookup(&intent.target_path);
        for stage in PIPELINE {
            let step = match stage {
                Stage::EscapeHatch => escape_hatch(intent),
                Stage::QueryParams => check_query(&self.routes, intent),
                Stage::Reconcile => self.reconcile(route).await,
                Stage::AdminCheck => admin_check(route, &self.store.snapshot(), intent),
                Stage::AuthCheck => auth_check(route, &self.store.snapshot(), intent),
            };
            if let ControlFlow::Break(decision) = step {
                if decision != Decision::Proceed {
                    leptos::logging::log!(
                        "guard {stage:?}: {} -> {}",
                        intent.target_href(),
                        decision.href().unwrap_or_default()
                    );
                }
                return decision;
            }
        }
        Decision::Proceed
    }

    /// Guard a raw href. Backend paths leave before their query is even
    /// parsed; otherwise a malformed query counts as a validation failure.
    pub async fn before_navigate_href(&self, href: &str, current_path: &str) -> Decision {
        let path = href.split(['?', '#']).next().unwrap_or_default();
        if is_external(path) {
            return Decision::FullPageLoad { href: href.to_owned() };
        }
        match NavigationIntent::parse(href, current_path) {
            Ok(intent) => self.before_navigate(&intent).await,
            Err(e) => {
                leptos::logging::log!("guard rejected malformed query in {href}: {e}");
                Decision::redirect(ROOT_PATH)
            }
        }
    }
}
