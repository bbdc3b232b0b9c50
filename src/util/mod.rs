//! Utility helpers shared across client modules.
//!
//! SYSTEM CONTEXT
//! ==============
//! Utility modules isolate browser/environment concerns from session and
//! routing logic so those stay testable off the browser.

pub mod browser;
