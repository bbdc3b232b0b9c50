//! Networking modules for the identity provider's HTTP API.
//!
//! SYSTEM CONTEXT
//! ==============
//! `api` defines the identity client seam and its browser implementation,
//! `csrf` owns anti-forgery cookie/header handling, and `types` defines the
//! request/response shapes shared with the session store.

pub mod api;
pub mod csrf;
pub mod types;
