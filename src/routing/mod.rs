//! Client-side routing policy.
//!
//! SYSTEM CONTEXT
//! ==============
//! `routes` is the static route table, `query` validates query strings against
//! it, and `guard` sequences validation, session reconciliation and permission
//! checks into one decision per navigation.

pub mod guard;
pub mod query;
pub mod routes;
