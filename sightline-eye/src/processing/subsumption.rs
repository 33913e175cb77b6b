//! Label-aware absorption of nested and duplicate detections
//!
//! Unlike non-maximum suppression, the overlap ratio is measured against the
//! smaller box's own area, so a small box lying mostly inside a large one is
//! absorbed even though their IoU is tiny.

use sightline_core::{BoxList, SubsumptionConfig};
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, trace};

/// Removes boxes that are mostly covered by a compatible box.
#[derive(Debug, Clone)]
pub struct SubsumptionUnit {
    overlap_threshold: f64,
    /// Subsumable label -> labels it may be absorbed into
    rules: BTreeMap<String, BTreeSet<String>>,
}

impl Default for SubsumptionUnit {
    fn default() -> Self {
        Self::new()
    }
}

impl SubsumptionUnit {
    pub fn new() -> Self {
        Self {
            overlap_threshold: 0.9,
            rules: BTreeMap::new(),
        }
    }

    /// Build a unit with the configured threshold and absorption groups.
    pub fn from_config(config: &SubsumptionConfig) -> Self {
        let mut unit = Self::new();
        unit.set_overlap_threshold(config.overlap_threshold);
        for group in &config.groups {
            unit.add_list(group);
        }
        unit
    }

    /// Add an absorption group. The first label absorbs every other label in
    /// the group. Groups accumulate across calls; an empty group is ignored.
    pub fn add_list<S: AsRef<str>>(&mut self, labels: &[S]) {
        let Some((target, subsumable)) = labels.split_first() else {
            return;
        };

        for label in subsumable {
            self.rules
                .entry(label.as_ref().to_string())
                .or_default()
                .insert(target.as_ref().to_string());
        }
    }

    /// Minimum fraction of a box's own area that must be covered before it
    /// is absorbed.
    pub fn set_overlap_threshold(&mut self, ratio: f64) {
        self.overlap_threshold = ratio;
    }

    pub fn overlap_threshold(&self) -> f64 {
        self.overlap_threshold
    }

    /// Drop every box that is sufficiently covered by a box it may be
    /// absorbed into. The result is ordered by ascending area.
    pub fn subsume_bboxes(&self, mut boxes: BoxList) -> BoxList {
        boxes.sort_by_area();

        let mut absorbed_into_own_label = vec![false; boxes.len()];
        let mut kept = BoxList::with_capacity(boxes.len());

        for (index, bbox) in boxes.iter().enumerate() {
            match self.find_absorber(index, &boxes, &absorbed_into_own_label) {
                Some(same_label) => {
                    if same_label {
                        absorbed_into_own_label[index] = true;
                    }
                }
                None => kept.add(bbox.clone()),
            }
        }

        debug!(
            "Subsumption kept {} of {} boxes",
            kept.len(),
            boxes.len()
        );
        kept
    }

    /// Look for a box that absorbs `boxes[index]`. Returns whether the
    /// absorbing box carries the same label, or `None` if nothing absorbs it.
    fn find_absorber(
        &self,
        index: usize,
        boxes: &BoxList,
        absorbed_into_own_label: &[bool],
    ) -> Option<bool> {
        let target = &boxes[index];
        let area = target.area();
        if !(area > 0.0) {
            return None;
        }

        let extra_labels = self.rules.get(&target.label);
        let can_absorb = |label: &str| {
            label == target.label
                || extra_labels.map_or(false, |targets| targets.contains(label))
        };

        for (candidate_index, candidate) in boxes.iter().enumerate() {
            if candidate_index == index
                || absorbed_into_own_label[candidate_index]
                || !can_absorb(&candidate.label)
            {
                continue;
            }

            let ratio = candidate.overlap_area(target) / area;
            if ratio > self.overlap_threshold {
                trace!(
                    "'{}' absorbed into '{}' (coverage {:.3})",
                    target.label,
                    candidate.label,
                    ratio
                );
                return Some(candidate.label == target.label);
            }
        }

        None
    }
}
