//! Administrative-area tree (province / city / district).
//!
//! Lookups are breadth-first so a code near the top of the tree is found
//! without walking every district; path reconstruction is depth-first since it
//! needs the ancestor chain.

#[cfg(test)]
#[path = "area_test.rs"]
mod area_test;

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::CodeTreeError;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AreaNode {
    pub code: String,
    pub name: String,
    #[serde(default)]
    pub children: Vec<AreaNode>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct AreaStep {
    pub code: String,
    pub name: String,
}

impl From<&AreaNode> for AreaStep {
    fn from(node: &AreaNode) -> Self {
        Self { code: node.code.clone(), name: node.name.clone() }
    }
}

/// One province/city/district row for tabular export.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct AreaRow {
    pub province_code: String,
    pub province_name: String,
    pub city_code: String,
    pub city_name: String,
    pub area_code: String,
    pub area_name: String,
}

/// Parse a top-level array of provinces.
///
/// # Errors
///
/// Returns [`CodeTreeError::Parse`] on invalid JSON or missing `code`/`name`.
pub fn parse_areas(source: &str) -> Result<Vec<AreaNode>, CodeTreeError> {
    Ok(serde_json::from_str(source)?)
}

#[must_use]
pub fn provinces(areas: &[AreaNode]) -> Vec<AreaStep> {
    areas.iter().map(AreaStep::from).collect()
}

#[must_use]
pub fn find_node<'a>(areas: &'a [AreaNode], code: &str) -> Option<&'a AreaNode> {
    let mut queue: VecDeque<&AreaNode> = areas.iter().collect();
    while let Some(node) = queue.pop_front() {
        if node.code == code {
            return Some(node);
        }
        queue.extend(node.children.iter());
    }
    None
}

/// Direct children of `code`; empty when the code is unknown or a leaf.
#[must_use]
pub fn children_by_code<'a>(areas: &'a [AreaNode], code: &str) -> &'a [AreaNode] {
    match find_node(areas, code) {
        Some(node) => &node.children,
        None => &[],
    }
}

/// Ancestor chain ending at `code`, or empty when not found.
#[must_use]
pub fn name_path(areas: &[AreaNode], code: &str) -> Vec<AreaStep> {
    fn walk(nodes: &[AreaNode], target: &str, path: &mut Vec<AreaStep>) -> bool {
        for node in nodes {
            path.push(AreaStep::from(node));
            if node.code == target || walk(&node.children, target, path) {
                return true;
            }
            path.pop();
        }
        false
    }

    let mut path = Vec::new();
    walk(areas, code, &mut path);
    path
}

/// Flatten to one row per district. A city without districts still yields a
/// row, with empty area fields.
#[must_use]
pub fn flatten(areas: &[AreaNode]) -> Vec<AreaRow> {
    let mut rows = Vec::new();
    for province in areas {
        for city in &province.children {
            let base = AreaRow {
                province_code: province.code.clone(),
                province_name: province.name.clone(),
                city_code: city.code.clone(),
                city_name: city.name.clone(),
                ..AreaRow::default()
            };
            if city.children.is_empty() {
                rows.push(base);
                continue;
            }
            for area in &city.children {
                rows.push(AreaRow {
                    area_code: area.code.clone(),
                    area_name: area.name.clone(),
                    ..base.clone()
                });
            }
        }
    }
    rows
}
