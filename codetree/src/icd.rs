//! ICD-10 classification lookup.
//!
//! DESIGN
//! ======
//! The source tree is large and only needed by the diagnosis picker, so it is
//! parsed once on first use and kept in an [`IcdCatalog`]. Every coded node is
//! flattened into an [`IcdEntry`] carrying its root-to-node breadcrumb, which
//! makes search and path lookups plain scans/map hits.
//!
//! Duplicate codes resolve last-wins, but the entry keeps the position of the
//! first occurrence so result ordering stays stable across source revisions.

#[cfg(test)]
#[path = "icd_test.rs"]
mod icd_test;

use std::collections::HashMap;
use std::sync::OnceLock;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::CodeTreeError;

/// Result cap applied by [`IcdIndex::search`].
pub const DEFAULT_SEARCH_LIMIT: usize = 200;

/// Prefix for display keys of nodes that carry no code of their own.
const UNCODED_KEY_PREFIX: &str = "__icd_node_";

/// A node as it appears in the source JSON. Numeric codes are read as
/// their decimal text; `children` that is null or not an array means none.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct IcdNode {
    #[serde(default, deserialize_with = "code_text")]
    pub code: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub id: Option<Value>,
    #[serde(default, deserialize_with = "children_or_none")]
    pub children: Vec<IcdNode>,
}

fn code_text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    match Value::deserialize(deserializer)? {
        Value::Null => Ok(None),
        Value::String(code) => Ok(Some(code)),
        Value::Number(code) => Ok(Some(code.to_string())),
        _ => Err(D::Error::custom("code must be a string or a number")),
    }
}

fn children_or_none<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<IcdNode>, D::Error> {
    match Value::deserialize(deserializer)? {
        Value::Array(children) => serde_json::from_value(Value::Array(children)).map_err(D::Error::custom),
        _ => Ok(Vec::new()),
    }
}

impl IcdNode {
    fn code(&self) -> Option<&str> {
        self.code.as_deref().filter(|c| !c.is_empty())
    }

    fn name(&self) -> &str {
        self.name.as_deref().unwrap_or_default()
    }
}

/// One breadcrumb step from the root toward an entry.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PathStep {
    pub code: Option<String>,
    pub name: String,
}

/// A flattened, searchable classification entry.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct IcdEntry {
    pub code: String,
    pub name: String,
    pub id: Option<Value>,
    /// `"CODE name"`, or just the code when the node is unnamed.
    pub label: String,
    /// Root-to-node breadcrumb, including the entry itself.
    pub path: Vec<PathStep>,
}

/// Tree node shaped for a collapsible picker widget.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct DisplayNode {
    pub key: String,
    pub code: Option<String>,
    pub label: String,
    pub name: String,
    pub id: Option<Value>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<DisplayNode>,
}

fn label_for(code: Option<&str>, name: &str) -> String {
    match (code, name.is_empty()) {
        (Some(code), false) => format!("{code} {name}"),
        (Some(code), true) => code.to_owned(),
        (None, _) => name.to_owned(),
    }
}

/// Extract the top-level nodes from any of the accepted source shapes:
/// `{ "categories": [...] }`, a bare array, or a single root node.
fn top_level_nodes(value: Value) -> Result<Vec<IcdNode>, CodeTreeError> {
    match value {
        Value::Object(mut map) if map.get("categories").is_some_and(Value::is_array) => {
            let categories = map.remove("categories").unwrap_or_default();
            Ok(serde_json::from_value(categories)?)
        }
        Value::Array(_) => Ok(serde_json::from_value(value)?),
        Value::Object(_) => Ok(vec![serde_json::from_value(value)?]),
        _ => Err(CodeTreeError::Shape("expected an object or an array of nodes")),
    }
}

fn collect(node: &IcdNode, parents: &[PathStep], out: &mut Vec<IcdEntry>) {
    let mut path = parents.to_vec();
    if node.code().is_some() || !node.name().is_empty() {
        path.push(PathStep { code: node.code().map(str::to_owned), name: node.name().to_owned() });
    }
    if let Some(code) = node.code() {
        out.push(IcdEntry {
            code: code.to_owned(),
            name: node.name().to_owned(),
            id: node.id.clone(),
            label: label_for(Some(code), node.name()),
            path: path.clone(),
        });
    }
    for child in &node.children {
        collect(child, &path, out);
    }
}

/// Parsed and flattened classification, ready for lookups.
#[derive(Clone, Debug, Default)]
pub struct IcdIndex {
    roots: Vec<IcdNode>,
    entries: Vec<IcdEntry>,
    by_code: HashMap<String, usize>,
}

impl IcdIndex {
    /// Parse source JSON and flatten it.
    ///
    /// # Errors
    ///
    /// Returns [`CodeTreeError::Parse`] for invalid JSON or node fields, and
    /// [`CodeTreeError::Shape`] when the top level is a scalar.
    pub fn from_json(source: &str) -> Result<Self, CodeTreeError> {
        let value: Value = serde_json::from_str(source)?;
        Ok(Self::from_roots(top_level_nodes(value)?))
    }

    /// Flatten already-parsed top-level nodes.
    #[must_use]
    pub fn from_roots(roots: Vec<IcdNode>) -> Self {
        let mut flat = Vec::new();
        for root in &roots {
            collect(root, &[], &mut flat);
        }

        let mut entries: Vec<IcdEntry> = Vec::with_capacity(flat.len());
        let mut by_code = HashMap::with_capacity(flat.len());
        for entry in flat {
            if let Some(&slot) = by_code.get(&entry.code) {
                entries[slot] = entry;
            } else {
                by_code.insert(entry.code.clone(), entries.len());
                entries.push(entry);
            }
        }

        Self { roots, entries, by_code }
    }

    /// All unique entries in first-seen order.
    #[must_use]
    pub fn entries(&self) -> &[IcdEntry] {
        &self.entries
    }

    #[must_use]
    pub fn get_by_code(&self, code: &str) -> Option<&IcdEntry> {
        self.by_code.get(code).map(|&i| &self.entries[i])
    }

    /// Breadcrumb for `code`, or `None` when the code is unknown or blank.
    #[must_use]
    pub fn path_for_code(&self, code: &str) -> Option<&[PathStep]> {
        if code.is_empty() {
            return None;
        }
        self.get_by_code(code)
            .map(|e| e.path.as_slice())
            .filter(|p| !p.is_empty())
    }

    /// Ranked search with the default result cap.
    #[must_use]
    pub fn search(&self, query: &str) -> Vec<&IcdEntry> {
        self.search_with_limit(query, DEFAULT_SEARCH_LIMIT)
    }

    /// Case-insensitive search ranked as: exact code, code prefix, name
    /// substring, label substring. Each entry lands in its best bucket only.
    /// A blank query returns nothing.
    #[must_use]
    pub fn search_with_limit(&self, query: &str, limit: usize) -> Vec<&IcdEntry> {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return Vec::new();
        }

        let mut equals = Vec::new();
        let mut starts = Vec::new();
        let mut name_contains = Vec::new();
        let mut label_contains = Vec::new();

        for entry in &self.entries {
            let code = entry.code.to_lowercase();
            if code == needle {
                equals.push(entry);
            } else if code.starts_with(&needle) {
                starts.push(entry);
            } else if entry.name.to_lowercase().contains(&needle) {
                name_contains.push(entry);
            } else if entry.label.to_lowercase().contains(&needle) {
                label_contains.push(entry);
            }
        }

        equals
            .into_iter()
            .chain(starts)
            .chain(name_contains)
            .chain(label_contains)
            .take(limit)
            .collect()
    }

    /// Convert the source tree for a picker widget. Uncoded nodes get
    /// sequential `__icd_node_N` keys, numbered from 1 per call.
    #[must_use]
    pub fn display_tree(&self) -> Vec<DisplayNode> {
        let mut uid = 0_usize;
        self.roots.iter().map(|n| to_display(n, &mut uid)).collect()
    }
}

fn to_display(node: &IcdNode, uid: &mut usize) -> DisplayNode {
    let key = if let Some(code) = node.code() {
        code.to_owned()
    } else {
        *uid += 1;
        format!("{UNCODED_KEY_PREFIX}{uid}")
    };
    DisplayNode {
        key,
        code: node.code().map(str::to_owned),
        label: label_for(node.code(), node.name()),
        name: node.name().to_owned(),
        id: node.id.clone(),
        children: node.children.iter().map(|c| to_display(c, uid)).collect(),
    }
}

/// Lazily-loaded, process-wide classification cache.
///
/// The first successful load wins; later loads return the cached index
/// without touching their source.
#[derive(Debug, Default)]
pub struct IcdCatalog {
    index: OnceLock<IcdIndex>,
}

impl IcdCatalog {
    #[must_use]
    pub const fn new() -> Self {
        Self { index: OnceLock::new() }
    }

    /// The index, if it has been loaded.
    #[must_use]
    pub fn get(&self) -> Option<&IcdIndex> {
        self.index.get()
    }

    /// Return the cached index, loading it from `source` on first use.
    ///
    /// # Errors
    ///
    /// Propagates errors from `source` and from parsing. A failed load leaves
    /// the catalog empty so a later call can retry.
    pub fn load_with<F>(&self, source: F) -> Result<&IcdIndex, CodeTreeError>
    where
        F: FnOnce() -> Result<String, CodeTreeError>,
    {
        if let Some(index) = self.index.get() {
            return Ok(index);
        }
        let index = IcdIndex::from_json(&source()?)?;
        Ok(self.index.get_or_init(|| index))
    }

    /// Lookup that never loads; `None` until the catalog has been populated.
    #[must_use]
    pub fn get_by_code(&self, code: &str) -> Option<&IcdEntry> {
        self.get()?.get_by_code(code)
    }

    /// Breadcrumb lookup that loads the catalog first when needed.
    ///
    /// # Errors
    ///
    /// Propagates load failures.
    pub fn path_for_code<F>(&self, code: &str, source: F) -> Result<Option<&[PathStep]>, CodeTreeError>
    where
        F: FnOnce() -> Result<String, CodeTreeError>,
    {
        if code.is_empty() {
            return Ok(None);
        }
        Ok(self.load_with(source)?.path_for_code(code))
    }

    /// Picker tree, or `None` until loaded.
    #[must_use]
    pub fn display_tree(&self) -> Option<Vec<DisplayNode>> {
        self.get().map(IcdIndex::display_tree)
    }
}
