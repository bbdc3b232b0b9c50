//! Patient-intake page with the diagnosis code lookup.
//!
//! SYSTEM CONTEXT
//! ==============
//! The ICD tree is a static asset fetched once per page load into a
//! process-wide [`IcdCatalog`]. Picking a diagnosis links to `/result` with
//! the code and name as query parameters, both on that route's allow-list.

#[cfg(test)]
#[path = "recommend_test.rs"]
mod recommend_test;

use codetree::icd::{IcdCatalog, IcdIndex, PathStep};
use leptos::prelude::*;
use leptos::tachys::view::any_view::IntoAny;
use leptos_router::hooks::use_query_map;

use crate::routing::query::QueryParams;

static ICD_CATALOG: IcdCatalog = IcdCatalog::new();

/// Suggestions shown under the search box.
pub(crate) const SUGGESTION_LIMIT: usize = 20;

const RESULT_PATH: &str = "/result";

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum CatalogState {
    Loading,
    Ready,
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Suggestion {
    pub code: String,
    pub label: String,
    pub breadcrumb: String,
    pub href: String,
}

/// `"Chapter / Block / Code name"` from a root-to-node path.
pub(crate) fn breadcrumb(path: &[PathStep]) -> String {
    path.iter()
        .map(|step| step.name.as_str())
        .filter(|name| !name.is_empty())
        .collect::<Vec<_>>()
        .join(" / ")
}

pub(crate) fn result_href(code: &str, name: &str) -> String {
    let query = QueryParams::new().with("disease_code", code).with("disease_name", name);
    format!("{RESULT_PATH}?{}", query.to_query_string())
}

pub(crate) fn suggestions(index: &IcdIndex, query: &str) -> Vec<Suggestion> {
    index
        .search_with_limit(query, SUGGESTION_LIMIT)
        .into_iter()
        .map(|entry| Suggestion {
            code: entry.code.clone(),
            label: entry.label.clone(),
            breadcrumb: breadcrumb(&entry.path),
            href: result_href(&entry.code, &entry.name),
        })
        .collect()
}

#[component]
pub fn RecommendPage() -> impl IntoView {
    let query_map = use_query_map();
    let search = RwSignal::new(String::new());
    let catalog = RwSignal::new(if ICD_CATALOG.get().is_some() { CatalogState::Ready } else { CatalogState::Loading });

    if ICD_CATALOG.get().is_none() {
        load_catalog(catalog);
    }

    let preselected = move || {
        catalog.track();
        let code = query_map.get().get("disease_code")?;
        let entry = ICD_CATALOG.get_by_code(&code)?;
        Some(format!("{} ({})", entry.label, breadcrumb(&entry.path)))
    };

    let results = move || match (catalog.get(), ICD_CATALOG.get()) {
        (CatalogState::Ready, Some(index)) => suggestions(index, &search.get()),
        _ => Vec::new(),
    };

    view! {
        <div class="recommend-page">
            <h1>"Find a diagnosis"</h1>
            <Show when=move || preselected().is_some()>
                <p class="recommend-selected">"Selected: " {move || preselected().unwrap_or_default()}</p>
            </Show>
            <input
                class="recommend-search"
                type="search"
                placeholder="ICD code or disease name"
                prop:value=move || search.get()
                on:input=move |ev| search.set(event_target_value(&ev))
            />
            {move || match catalog.get() {
                CatalogState::Loading => view! { <p class="recommend-status">"Loading codes..."</p> }.into_any(),
                CatalogState::Failed(message) => {
                    view! { <p class="recommend-status recommend-status--error">{message}</p> }.into_any()
                }
                CatalogState::Ready => view! {
                    <ul class="recommend-results">
                        {results()
                            .into_iter()
                            .map(|s| view! {
                                <li>
                                    <a href=s.href title=s.breadcrumb>{s.label}</a>
                                </li>
                            })
                            .collect_view()}
                    </ul>
                }
                .into_any(),
            }}
        </div>
    }
}

fn load_catalog(state: RwSignal<CatalogState>) {
    #[cfg(feature = "csr")]
    leptos::task::spawn_local(async move {
        let config = crate::config::ClientConfig::from_env();
        let next = match crate::net::api::fetch_static_text(&config, &config.icd_source).await {
            Ok(text) => match ICD_CATALOG.load_with(|| Ok(text)) {
                Ok(_) => CatalogState::Ready,
                Err(e) => CatalogState::Failed(format!("Diagnosis codes unreadable: {e}")),
            },
            Err(e) => CatalogState::Failed(format!("Diagnosis codes unavailable: {e}")),
        };
        if let CatalogState::Failed(message) = &next {
            leptos::logging::warn!("{message}");
        }
        state.set(next);
    });
    #[cfg(not(feature = "csr"))]
    state.set(CatalogState::Failed("Diagnosis codes are only available in the browser.".to_owned()));
}
