//! Shared client-side state modules.
//!
//! DESIGN
//! ======
//! Only the session lives here: it is the one piece of state every route
//! transition depends on. Page-local form state stays in page signals.

pub mod session;
