//! Ordered collections of bounding boxes for a single frame

use crate::geometry::BoundingBox;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Index;

/// An ordered list of [`BoundingBox`]es.
///
/// Order is meaningful for iteration and index-based removal, but consumers
/// freely re-sort it. Equality is structural: two lists are equal when their
/// [`Display`](fmt::Display) renderings match, box by box and in order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BoxList {
    boxes: Vec<BoundingBox>,
}

impl BoxList {
    pub fn new() -> Self {
        Self { boxes: Vec::new() }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            boxes: Vec::with_capacity(capacity),
        }
    }

    pub fn add(&mut self, bbox: BoundingBox) {
        self.boxes.push(bbox);
    }

    /// The box at `index`, or `None` when the index is out of range.
    pub fn get(&self, index: usize) -> Option<&BoundingBox> {
        self.boxes.get(index)
    }

    /// Remove and return the box at `index`, or `None` when out of range.
    pub fn remove(&mut self, index: usize) -> Option<BoundingBox> {
        if index < self.boxes.len() {
            Some(self.boxes.remove(index))
        } else {
            None
        }
    }

    /// Remove the first box equal to `bbox`.
    pub fn remove_box(&mut self, bbox: &BoundingBox) -> Option<BoundingBox> {
        let index = self.boxes.iter().position(|b| b == bbox)?;
        Some(self.boxes.remove(index))
    }

    pub fn contains(&self, bbox: &BoundingBox) -> bool {
        self.boxes.contains(bbox)
    }

    /// Sort by confidence, highest first. Ties keep their relative order.
    pub fn sort_by_confidence(&mut self) {
        self.boxes
            .sort_by(|a, b| b.confidence.total_cmp(&a.confidence));
    }

    /// Sort by area, smallest first. Ties keep their relative order.
    pub fn sort_by_area(&mut self) {
        self.boxes.sort_by(|a, b| a.area().total_cmp(&b.area()));
    }

    /// Drop every box whose confidence is strictly below `min_confidence`.
    pub fn trim_by_confidence(&mut self, min_confidence: f64) {
        self.boxes.retain(|b| b.confidence >= min_confidence);
    }

    pub fn len(&self) -> usize {
        self.boxes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.boxes.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, BoundingBox> {
        self.boxes.iter()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, BoundingBox> {
        self.boxes.iter_mut()
    }

    /// Labels of every box, in list order.
    pub fn labels(&self) -> Vec<String> {
        self.boxes.iter().map(|b| b.label.clone()).collect()
    }

    pub fn as_slice(&self) -> &[BoundingBox] {
        &self.boxes
    }

    pub fn into_vec(self) -> Vec<BoundingBox> {
        self.boxes
    }
}

impl fmt::Display for BoxList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, bbox) in self.boxes.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "Box {}: [{}]", i, bbox)?;
        }
        Ok(())
    }
}

impl PartialEq for BoxList {
    fn eq(&self, other: &Self) -> bool {
        self.to_string() == other.to_string()
    }
}

impl Index<usize> for BoxList {
    type Output = BoundingBox;

    fn index(&self, index: usize) -> &Self::Output {
        &self.boxes[index]
    }
}

impl From<Vec<BoundingBox>> for BoxList {
    fn from(boxes: Vec<BoundingBox>) -> Self {
        Self { boxes }
    }
}

impl FromIterator<BoundingBox> for BoxList {
    fn from_iter<I: IntoIterator<Item = BoundingBox>>(iter: I) -> Self {
        Self {
            boxes: iter.into_iter().collect(),
        }
    }
}

impl Extend<BoundingBox> for BoxList {
    fn extend<I: IntoIterator<Item = BoundingBox>>(&mut self, iter: I) {
        self.boxes.extend(iter);
    }
}

impl IntoIterator for BoxList {
    type Item = BoundingBox;
    type IntoIter = std::vec::IntoIter<BoundingBox>;

    fn into_iter(self) -> Self::IntoIter {
        self.boxes.into_iter()
    }
}

impl<'a> IntoIterator for &'a BoxList {
    type Item = &'a BoundingBox;
    type IntoIter = std::slice::Iter<'a, BoundingBox>;

    fn into_iter(self) -> Self::IntoIter {
        self.boxes.iter()
    }
}
