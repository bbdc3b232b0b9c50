//! Root application component with routing and context providers.
//!
//! ARCHITECTURE
//! ============
//! `App` owns the single [`SessionStore`] and mirrors every change into a
//! `RwSignal<Session>` so components render from reactive state while only
//! the store writes to it. `NavigationGate` runs the guard whenever the
//! location changes and applies its decision before protected pages show.

#[cfg(test)]
#[path = "app_test.rs"]
mod app_test;

use leptos::prelude::*;
use leptos_meta::{Title, provide_meta_context};
use leptos_router::{
    NavigateOptions, ParamSegment, StaticSegment,
    components::{Redirect, Route, Router, Routes},
    hooks::{use_location, use_navigate},
};

use crate::components::navbar::Navbar;
use crate::config::ClientConfig;
use crate::net::api::HttpIdentityClient;
use crate::pages::{login::LoginPage, recommend::RecommendPage, register::RegisterPage, section::SectionPage};
use crate::routing::guard::{Decision, NavigationGuard};
use crate::routing::routes::{HOME_PATH, ROOT_PATH, RouteTable};
use crate::state::session::{Session, SessionStore};
use crate::util::browser::{Browser, WebBrowser};

pub type AppSessionStore = SessionStore<HttpIdentityClient>;
pub type AppGuard = NavigationGuard<HttpIdentityClient>;

/// Whether the gate is showing routed content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateStatus {
    /// Waiting on bootstrap or on a guard decision for a protected route.
    Pending,
    Open,
}

/// Rebuild `path?query` from router location parts. The router may or may
/// not keep the leading `?` on `search`.
pub(crate) fn compose_href(pathname: &str, search: &str) -> String {
    let search = search.trim_start_matches('?');
    if search.is_empty() {
        pathname.to_owned()
    } else {
        format!("{pathname}?{search}")
    }
}

/// A guard decision may touch the page only while no newer navigation has
/// started. `latest` is `None` once the gate is gone.
pub(crate) fn decision_applies(issued: u64, latest: Option<u64>) -> bool {
    latest == Some(issued)
}

/// Protected routes hide behind the pending view while the guard may still
/// redirect; public ones stay visible.
pub(crate) fn status_while_deciding(routes: &RouteTable, pathname: &str) -> Option<GateStatus> {
    routes
        .lookup(pathname)
        .is_some_and(|r| r.needs_session())
        .then_some(GateStatus::Pending)
}

/// Root application component.
///
/// Provides the session store, guard and session signal, then sets up
/// client-side routing.
#[component]
pub fn App() -> impl IntoView {
    provide_meta_context();

    let session = RwSignal::new(Session::default());
    let store: AppSessionStore = SessionStore::new(HttpIdentityClient::new(ClientConfig::from_env()))
        .with_observer(move |snapshot| session.set(snapshot.clone()));
    let guard = NavigationGuard::new(RouteTable::standard(), store.clone());
    let booted = RwSignal::new(false);

    provide_context(session);
    provide_context(store.clone());
    provide_context(guard);

    #[cfg(feature = "csr")]
    leptos::task::spawn_local(async move {
        store.bootstrap().await;
        booted.set(true);
    });
    #[cfg(not(feature = "csr"))]
    {
        drop(store);
        booted.set(true);
    }

    view! {
        <Title text="YiXuanBao"/>

        <Router>
            <Navbar/>
            <NavigationGate booted=booted>
                <Routes fallback=|| "Page not found.">
                    <Route path=StaticSegment("") view=|| view! { <Redirect path=HOME_PATH/> }/>
                    <Route path=StaticSegment("login") view=LoginPage/>
                    <Route path=StaticSegment("register") view=RegisterPage/>
                    <Route path=StaticSegment("recommend") view=RecommendPage/>
                    <Route path=StaticSegment("home") view=|| view! { <SectionPage title="Home"/> }/>
                    <Route path=StaticSegment("result") view=|| view! { <SectionPage title="Recommendations"/> }/>
                    <Route path=StaticSegment("profile") view=|| view! { <SectionPage title="Profile"/> }/>
                    <Route path=StaticSegment("history") view=|| view! { <SectionPage title="History"/> }/>
                    <Route path=StaticSegment("manage") view=|| view! { <SectionPage title="User management"/> }/>
                    <Route
                        path=(StaticSegment("manage"), StaticSegment("users"), ParamSegment("id"))
                        view=|| view! { <SectionPage title="User detail"/> }
                    />
                </Routes>
            </NavigationGate>
        </Router>
    }
}

/// Runs the navigation guard on every location change.
#[component]
fn NavigationGate(booted: RwSignal<bool>, children: ChildrenFn) -> impl IntoView {
    let guard = expect_context::<AppGuard>();
    let location = use_location();
    let navigate = use_navigate();
    let status = RwSignal::new(GateStatus::Pending);
    let previous = StoredValue::new(ROOT_PATH.to_owned());
    let generation = StoredValue::new(0_u64);

    Effect::new(move || {
        if !booted.get() {
            return;
        }
        let issued = generation.get_value() + 1;
        generation.set_value(issued);
        let pathname = location.pathname.get();
        let href = compose_href(&pathname, &location.search.get());
        let current = previous.get_value();
        if let Some(pending) = status_while_deciding(guard.routes(), &pathname) {
            status.set(pending);
        }

        let guard = guard.clone();
        let navigate = navigate.clone();
        let decide = async move {
            let decision = guard.before_navigate_href(&href, &current).await;
            if !decision_applies(issued, generation.try_get_value()) {
                leptos::logging::log!("guard decision for {href} dropped; a newer navigation started");
                return;
            }
            match decision {
                Decision::Proceed => {
                    previous.set_value(pathname);
                    status.set(GateStatus::Open);
                }
                redirect @ Decision::Redirect { .. } => {
                    if let Some(target) = redirect.href() {
                        navigate(&target, NavigateOptions { replace: true, ..NavigateOptions::default() });
                    }
                }
                Decision::FullPageLoad { href } => {
                    if let Err(e) = WebBrowser.redirect(&href) {
                        leptos::logging::warn!("full page load to {href} failed: {e}");
                    }
                }
            }
        };
        #[cfg(feature = "csr")]
        leptos::task::spawn_local(decide);
        #[cfg(not(feature = "csr"))]
        drop(decide);
    });

    view! {
        <Show
            when=move || status.get() == GateStatus::Open
            fallback=|| view! { <p class="gate-pending">"Loading..."</p> }
        >
            {children()}
        </Show>
    }
}
