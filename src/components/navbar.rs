//! Top navigation bar with the user menu.
//!
//! SYSTEM CONTEXT
//! ==============
//! Renders from the reactive session mirror. The user menu is hidden on
//! routes that ask for it (sign-in and registration) and the management
//! link only shows for admins.

#[cfg(test)]
#[path = "navbar_test.rs"]
mod navbar_test;

use leptos::prelude::*;
use leptos_router::hooks::use_location;

use crate::app::{AppGuard, AppSessionStore};
use crate::routing::routes::{HOME_PATH, LOGIN_PATH, RouteTable};
use crate::state::session::Session;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct NavLink {
    pub href: &'static str,
    pub label: &'static str,
}

const PUBLIC_LINKS: &[NavLink] = &[
    NavLink { href: "/home", label: "Home" },
    NavLink { href: HOME_PATH, label: "Recommend" },
];

const MEMBER_LINKS: &[NavLink] = &[
    NavLink { href: "/history", label: "History" },
    NavLink { href: "/profile", label: "Profile" },
];

const ADMIN_LINKS: &[NavLink] = &[NavLink { href: "/manage", label: "Manage" }];

/// Links visible for this session. Admin implies member.
pub(crate) fn visible_links(session: &Session) -> Vec<NavLink> {
    let mut links = PUBLIC_LINKS.to_vec();
    if session.is_authenticated() {
        links.extend_from_slice(MEMBER_LINKS);
    }
    if session.is_admin() {
        links.extend_from_slice(ADMIN_LINKS);
    }
    links
}

pub(crate) fn show_user_menu(routes: &RouteTable, pathname: &str) -> bool {
    !routes.hides_user_menu(pathname)
}

/// Navigation bar shown on every page.
#[component]
pub fn Navbar() -> impl IntoView {
    let session = expect_context::<RwSignal<Session>>();
    let store = expect_context::<AppSessionStore>();
    let guard = expect_context::<AppGuard>();
    let location = use_location();

    let links = move || visible_links(&session.get());
    let user_menu = move || show_user_menu(guard.routes(), &location.pathname.get());
    let signed_in = move || session.get().is_authenticated();
    let name = move || session.get().display_name().to_owned();
    let avatar = move || session.get().avatar_src();

    let on_logout = move |_: leptos::ev::MouseEvent| {
        let store = store.clone();
        #[cfg(feature = "csr")]
        leptos::task::spawn_local(async move { store.logout().await });
        #[cfg(not(feature = "csr"))]
        store.clear_auth();
    };

    view! {
        <nav class="navbar">
            <a href=HOME_PATH class="navbar__brand">"YiXuanBao"</a>
            <ul class="navbar__links">
                {move || {
                    links()
                        .into_iter()
                        .map(|link| view! { <li><a href=link.href>{link.label}</a></li> })
                        .collect_view()
                }}
            </ul>
            <Show when=user_menu clone:on_logout>
                <div class="navbar__user">
                    <Show
                        when=signed_in
                        clone:on_logout
                        fallback=|| view! { <a href=LOGIN_PATH class="navbar__login">"Sign in"</a> }
                    >
                        <Show when=move || avatar().is_some()>
                            <img class="navbar__avatar" src=move || avatar().unwrap_or_default() alt=""/>
                        </Show>
                        <span class="navbar__name">{name}</span>
                        <button class="navbar__logout" on:click=on_logout.clone()>
                            "Sign out"
                        </button>
                    </Show>
                </div>
            </Show>
        </nav>
    }
}
