//! Shell for sections whose content is served by other views of the app.

use leptos::prelude::*;

use crate::state::session::Session;

#[component]
pub fn SectionPage(title: &'static str) -> impl IntoView {
    let session = expect_context::<RwSignal<Session>>();

    view! {
        <section class="section-page">
            <h1>{title}</h1>
            <p class="section-page__who">{move || session.get().display_name().to_owned()}</p>
        </section>
    }
}
