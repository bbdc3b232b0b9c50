//! Account registration page.
//!
//! A non-2xx response shows the server's `detail` message exactly as sent;
//! success sends the user to the sign-in page.

#[cfg(test)]
#[path = "register_test.rs"]
mod register_test;

use leptos::prelude::*;
use leptos_router::hooks::use_navigate;

use crate::app::AppSessionStore;
use crate::net::types::{ApiError, ApiResponse, Registration};
use crate::routing::routes::LOGIN_PATH;

pub(crate) const MISSING_FIELDS: &str = "Choose a username and a password.";
pub(crate) const PASSWORD_MISMATCH: &str = "Passwords do not match.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum RegisterOutcome {
    Created,
    Failed(String),
}

pub(crate) fn validate_register_input(
    username: &str,
    password: &str,
    confirm: &str,
) -> Result<Registration, &'static str> {
    let username = username.trim();
    if username.is_empty() || password.is_empty() {
        return Err(MISSING_FIELDS);
    }
    if password != confirm {
        return Err(PASSWORD_MISMATCH);
    }
    Ok(Registration { username: username.to_owned(), password: password.to_owned() })
}

pub(crate) fn register_outcome(result: &Result<ApiResponse, ApiError>) -> RegisterOutcome {
    match result {
        Ok(resp) if resp.is_success() => RegisterOutcome::Created,
        Ok(resp) => RegisterOutcome::Failed(
            resp.detail()
                .map_or_else(|| format!("Registration failed (status {}).", resp.status), str::to_owned),
        ),
        Err(e) => RegisterOutcome::Failed(format!("Registration failed: {e}")),
    }
}

#[component]
pub fn RegisterPage() -> impl IntoView {
    let store = expect_context::<AppSessionStore>();
    let navigate = use_navigate();

    let username = RwSignal::new(String::new());
    let password = RwSignal::new(String::new());
    let confirm = RwSignal::new(String::new());
    let info = RwSignal::new(String::new());
    let busy = RwSignal::new(false);

    let on_submit = move |ev: leptos::ev::SubmitEvent| {
        ev.prevent_default();
        if busy.get() {
            return;
        }
        let registration = match validate_register_input(&username.get(), &password.get(), &confirm.get()) {
            Ok(registration) => registration,
            Err(message) => {
                info.set(message.to_owned());
                return;
            }
        };
        busy.set(true);
        info.set("Creating account...".to_owned());

        let store = store.clone();
        let navigate = navigate.clone();
        let attempt = async move {
            match register_outcome(&store.register(&registration).await) {
                RegisterOutcome::Created => {
                    info.set(String::new());
                    navigate(LOGIN_PATH, leptos_router::NavigateOptions::default());
                }
                RegisterOutcome::Failed(message) => info.set(message),
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
                <p class="login-card__subtitle">"Create an account"</p>
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
                        autocomplete="new-password"
                        placeholder="Password"
                        prop:value=move || password.get()
                        on:input=move |ev| password.set(event_target_value(&ev))
                    />
                    <input
                        class="login-input"
                        type="password"
                        autocomplete="new-password"
                        placeholder="Confirm password"
                        prop:value=move || confirm.get()
                        on:input=move |ev| confirm.set(event_target_value(&ev))
                    />
                    <button class="login-button" type="submit" disabled=move || busy.get()>
                        "Register"
                    </button>
                </form>
                <Show when=move || !info.get().is_empty()>
                    <p class="login-message">{move || info.get()}</p>
                </Show>
                <p class="login-card__subtitle">
                    "Already registered? " <a href=LOGIN_PATH>"Sign in"</a>
                </p>
            </div>
        </div>
    }
}
