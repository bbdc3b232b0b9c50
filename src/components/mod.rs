//! Reusable UI component modules.
//!
//! SYSTEM CONTEXT
//! ==============
//! Components read the session snapshot from Leptos context; only the
//! session store writes it.

pub mod navbar;
