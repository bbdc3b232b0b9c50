//! Page modules for route-level screens.
//!
//! ARCHITECTURE
//! ============
//! Each page owns route-scoped orchestration (form state, store calls,
//! post-submit navigation) and keeps its decision logic in plain functions
//! that tests exercise without a browser.

pub mod login;
pub mod recommend;
pub mod register;
pub mod section;
