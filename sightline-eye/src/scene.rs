//! Answers produced by the knowledge unit for narration

use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

/// Horizontal direction of an item relative to the viewer
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Ahead,
    Left,
    Right,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Ahead => "ahead",
            Direction::Left => "left",
            Direction::Right => "right",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Labels in the current frame grouped by direction and custom category.
///
/// A wide item may appear under several directions. Every bucket is sorted
/// alphabetically and keeps duplicates.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SceneDescription {
    pub left: Vec<String>,
    pub ahead: Vec<String>,
    pub right: Vec<String>,
    /// One bucket per configured custom category
    pub categories: BTreeMap<String, Vec<String>>,
}

impl SceneDescription {
    /// Look up a bucket by name: `"left"`, `"ahead"`, `"right"` or a custom
    /// category. Direction names take precedence over categories.
    pub fn get(&self, bucket: &str) -> Option<&[String]> {
        match bucket {
            "left" => Some(&self.left),
            "ahead" => Some(&self.ahead),
            "right" => Some(&self.right),
            other => self.categories.get(other).map(Vec::as_slice),
        }
    }

    pub fn direction(&self, direction: Direction) -> &[String] {
        match direction {
            Direction::Ahead => &self.ahead,
            Direction::Left => &self.left,
            Direction::Right => &self.right,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.left.is_empty()
            && self.ahead.is_empty()
            && self.right.is_empty()
            && self.categories.values().all(Vec::is_empty)
    }
}

/// Where a single item is in the current frame
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ItemLocation {
    /// Sorted, possibly several directions for a wide item
    pub direction: Vec<Direction>,
    /// Wall or ceiling items above it, sorted and deduplicated
    pub beneath: Vec<String>,
    /// The item it appears to rest on
    pub on_top_of: Option<String>,
}
