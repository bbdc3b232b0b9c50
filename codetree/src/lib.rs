//! Hierarchical code lookups used by the intake forms.
//!
//! Both trees arrive as nested `{ code, name, children }` JSON and are only
//! ever read, so everything here is a pure transform over parsed nodes.
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`icd`] | ICD-10 classification: flatten, ranked search, display tree, lazy catalog |
//! | [`area`] | Administrative areas: province list, lookups, name paths, row export |

pub mod area;
pub mod icd;

/// Errors raised while loading a code tree.
#[derive(Debug, thiserror::Error)]
pub enum CodeTreeError {
    /// The source was not valid JSON for the expected node shape.
    #[error("code tree parse failed: {0}")]
    Parse(String),

    /// The JSON parsed but is neither a node, a node array, nor `{ categories }`.
    #[error("unexpected code tree shape: {0}")]
    Shape(&'static str),

    /// The source text could not be fetched.
    #[error("code tree source unavailable: {0}")]
    Source(String),
}

impl From<serde_json::Error> for CodeTreeError {
    fn from(e: serde_json::Error) -> Self {
        Self::Parse(e.to_string())
    }
}
