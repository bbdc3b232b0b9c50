//! Username + password sign-in page.
//!
//! On success the user lands on the `next` query value when it names a page
//! of this site, otherwise on the root.

#[cfg(test)]
#[path = "login_test.rs"]
mod login_test;

use leptos::prelude::*;
use leptos_router::hooks::{use_navigate, use_query_map};

use crate::app::AppSessionStore;
use crate::net::types::Credentials;
use crate::routing::routes::{NEXT_PARAM, ROOT_PATH};

pub(crate) const MISSING_FIELDS: &str = "Enter both username and password.";
pub(crate) const REJECTED: &str = "Sign-in failed. Check your username and password.";

/// Trim the username and require both fields. Passwords are taken as typed.
pub(crate) fn validate_login_input(username: &str, password: &str) -> Result<Credentials, &'static str> {
    let username = username.trim();
    if username.is_empty() || password.is_empty() {
        return Err(MISSING_FIELDS);
    }
    Ok(Credentials { username: username.to_owned(), password: password.to_owned() })
}

/// Post-login destination. Only same-origin absolute paths are followed;
/// protocol-relative (`//host`) and absolute URLs fall back to the root.
pub(crate) fn post_login_target(next: Option<&str>) -> String {
    match next.map(str::trim) {
        Some(path) if path.starts_with('/') && !path.starts_with("//") && !path.contains('\\') => path.to_owned(),
        _ => ROOT_PATH.to_owned(),
    }
}

#[component]
pub fn LoginPage() -> impl IntoView {
    let store = expect_context::<AppSessionStore>();
    let query = use_query_map();
    let navigate = use_navigate();

    let username = RwSignal::new(String::new());
    let password = RwSignal::new(String::new());
    let info = RwSignal::new(String::new());
    let busy = RwSignal::new(false);

    let on_submit = move |ev: leptos::ev::SubmitEvent| {
        ev.prevent_default();
        if busy.get() {
            return;
        }
        let credentials = match validate_login_input(&username.get(), &password.get()) {
            Ok(credentials) => credentials,
            Err(message) => {
                info.set(message.to_owned());
                return;
            }
        };
        let target = post_login_target(query.get().get(NEXT_PARAM).as_deref());
        busy.set(true);
        info.set("Signing in...".to_owned());

        let store = store.clone();
        let navigate = navigate.clone();
        let attempt = async move {
            if store.login(&credentials).await {
                info.set(String::new());
                navigate(&target, leptos_router::NavigateOptions::default());
            } else {
                info.set(REJECTED.to_owned());
            }
            busy.set(false);
        };
        #[cfg(feature = "csr")]
        leptos::task::spawn_local(attempt);
        #[cfg(not(feature = "csr"))]
        drop(attempt);
    };

    view! {
        <div class="login-page">
            <div class="login-card">
                <h1>"YiXuanBao"</h1>
                <p class="login-card__subtitle">"Sign in"</p>
                <form class="login-form" on:submit=on_submit>
                    <input
                        class="login-input"
                        type="text"
                        autocomplete="username"
                        placeholder="Username"
                        prop:value=move || username.get()
                        on:input=move |ev| username.set(event_target_value(&ev))
                    />
                    <input
                        class="login-input"
                        type="password"
                        autocomplete="current-password"
                        placeholder="Password"
                        prop:value=move || password.get()
                        on:input=move |ev| password.set(event_target_value(&ev))
                    />
                    <button class="login-button" type="submit" disabled=move || busy.get()>
                        "Sign In"
                    </button>
                </form>
                <Show when=move || !info.get().is_empty()>
                    <p class="login-message">{move || info.get()}</p>
                </Show>
                <p class="login-card__subtitle">
                    "No account? " <a href="/register">"Register"</a>
                </p>
            </div>
        </div>
    }
}
