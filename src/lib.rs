//! # yixuan-client
//!
//! Leptos + WASM frontend for the YiXuanBao treatment recommendation site.
//!
//! This crate holds the session layer (cached identity synchronized with the
//! server-held session cookie), the navigation guard that runs before every
//! route change, and the pages and components built on them. The diagnosis
//! code tree lives in the sibling `codetree` crate.

pub mod app;
pub mod components;
pub mod config;
pub mod net;
pub mod pages;
pub mod routing;
pub mod state;
pub mod util;

#[cfg(test)]
mod test_helpers;

/// Browser entry point: install panic and log hooks, then mount the app.
#[cfg(feature = "csr")]
#[wasm_bindgen::prelude::wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
    if let Err(e) = console_log::init_with_level(log::Level::Info) {
        leptos::logging::warn!("console logger unavailable: {e}");
    }
    leptos::mount::mount_to_body(app::App);
}
