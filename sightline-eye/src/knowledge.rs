//! Memory of tracked items and spatial queries over the current frame
//!
//! The knowledge unit records, per label, the most instances ever seen at
//! once and the times the label was in view. It also keeps the most recent
//! frame so that questions about where things are can be answered.

use crate::scene::{Direction, ItemLocation, SceneDescription};
use sightline_core::{BoundingBox, BoxList, SceneConfig};
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, warn};

/// Label recorded in place of an item that cannot plausibly be present
pub const UNKNOWN_ITEM: &str = "unknown item";

/// Answer to "where did you see" for items that belong somewhere other than the floor
pub const ON_THE_FLOOR: &str = "on the floor";

/// Facts about the environment, set up front and read by every query
#[derive(Debug, Clone)]
struct Facts {
    left_boundary: f64,
    right_boundary: f64,
    max_on_top_gap: f64,
    furniture: BTreeSet<String>,
    wall_and_ceiling: BTreeSet<String>,
    not_normally_on_floor: BTreeSet<String>,
    impossible_items: BTreeSet<String>,
    custom_categories: BTreeMap<String, BTreeSet<String>>,
}

impl Default for Facts {
    fn default() -> Self {
        let defaults = SceneConfig::default();
        Self {
            left_boundary: defaults.left_boundary,
            right_boundary: defaults.right_boundary,
            max_on_top_gap: defaults.max_on_top_gap,
            furniture: BTreeSet::new(),
            wall_and_ceiling: BTreeSet::new(),
            not_normally_on_floor: BTreeSet::new(),
            impossible_items: BTreeSet::new(),
            custom_categories: BTreeMap::new(),
        }
    }
}

/// What is known about one label
#[derive(Debug, Clone)]
struct SightingRecord {
    /// Most instances seen in a single frame
    max_count: usize,
    /// End time of each run of consecutive frames the label was seen in
    run_end_times: Vec<u64>,
}

/// The most recent frame, with impossible items already renamed
#[derive(Debug, Clone, Default)]
struct FrameSnapshot {
    /// Ordered by ascending area
    boxes: BoxList,
    time: Option<u64>,
}

impl FrameSnapshot {
    fn find(&self, label: &str) -> Option<(usize, &BoundingBox)> {
        self.boxes.iter().enumerate().find(|(_, b)| b.label == label)
    }

    /// Every box except the one at `index`
    fn others(&self, index: usize) -> impl Iterator<Item = &BoundingBox> {
        self.boxes
            .iter()
            .enumerate()
            .filter(move |(i, _)| *i != index)
            .map(|(_, b)| b)
    }
}

/// Accumulates sightings and answers questions about them
#[derive(Debug, Clone, Default)]
pub struct KnowledgeUnit {
    facts: Facts,
    records: BTreeMap<String, SightingRecord>,
    current: FrameSnapshot,
}

impl KnowledgeUnit {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a knowledge unit with every scene fact from configuration
    pub fn from_config(config: &SceneConfig) -> Self {
        let mut unit = Self::new();
        unit.set_left_and_right(config.left_boundary, config.right_boundary);
        unit.set_max_gap_for_item_on_top_of_another_item(config.max_on_top_gap);
        unit.set_furniture_items(&config.furniture);
        unit.add_wall_and_ceiling_objects(&config.wall_and_ceiling);
        unit.set_items_not_normally_on_floor(&config.not_normally_on_floor);
        unit.set_impossible_items(&config.impossible_items);
        for (name, labels) in &config.custom_categories {
            unit.set_custom_category(name, labels);
        }
        unit
    }

    /// Items reported as "on the floor" when asked where they were seen
    pub fn set_items_not_normally_on_floor<S: AsRef<str>>(&mut self, labels: &[S]) {
        self.facts.not_normally_on_floor = to_set(labels);
    }

    /// Items recorded as [`UNKNOWN_ITEM`] from the next frame on
    pub fn set_impossible_items<S: AsRef<str>>(&mut self, labels: &[S]) {
        self.facts.impossible_items = to_set(labels);
    }

    /// Define or replace a named category of labels
    pub fn set_custom_category<S: AsRef<str>>(&mut self, name: &str, labels: &[S]) {
        self.facts
            .custom_categories
            .insert(name.to_string(), to_set(labels));
    }

    /// Normalized x positions dividing left, ahead and right
    pub fn set_left_and_right(&mut self, left: f64, right: f64) {
        if left > right {
            warn!(
                "Left boundary {} is right of right boundary {}; nothing will be ahead",
                left, right
            );
        }
        self.facts.left_boundary = left;
        self.facts.right_boundary = right;
    }

    /// Add labels that hang on walls or ceilings
    pub fn add_wall_and_ceiling_objects<S: AsRef<str>>(&mut self, labels: &[S]) {
        self.facts
            .wall_and_ceiling
            .extend(labels.iter().map(|l| l.as_ref().to_string()));
    }

    /// Items never described as resting on top of something else
    pub fn set_furniture_items<S: AsRef<str>>(&mut self, labels: &[S]) {
        self.facts.furniture = to_set(labels);
    }

    pub fn set_max_gap_for_item_on_top_of_another_item(&mut self, gap: f64) {
        self.facts.max_on_top_gap = gap;
    }

    /// Record the tracked boxes of a frame seen at `time`.
    pub fn add_frame(&mut self, mut boxes: BoxList, time: u64) {
        let previous_time = self.current.time;
        if let Some(previous) = previous_time {
            if time < previous {
                warn!("Frame time {} is earlier than previous frame time {}", time, previous);
            }
        }

        boxes.sort_by_area();
        for bbox in boxes.iter_mut() {
            if self.facts.impossible_items.contains(&bbox.label) {
                bbox.label = UNKNOWN_ITEM.to_string();
            }
        }

        let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
        for bbox in &boxes {
            *counts.entry(bbox.label.as_str()).or_default() += 1;
        }

        for (label, count) in counts {
            match self.records.get_mut(label) {
                None => {
                    self.records.insert(
                        label.to_string(),
                        SightingRecord {
                            max_count: count,
                            run_end_times: vec![time],
                        },
                    );
                }
                Some(_) if label == UNKNOWN_ITEM => {}
                Some(record) => {
                    record.max_count = record.max_count.max(count);
                    // an earlier time never extends a run
                    let continues_run = previous_time.is_some_and(|previous| {
                        time >= previous && record.run_end_times.last() == Some(&previous)
                    });
                    if continues_run {
                        record.run_end_times.pop();
                    }
                    record.run_end_times.push(time);
                }
            }
        }

        debug!("Knowledge snapshot holds {} boxes at time {}", boxes.len(), time);
        self.current = FrameSnapshot {
            boxes,
            time: Some(time),
        };
    }

    /// Boxes of the most recent frame, smallest first
    pub fn current_frame(&self) -> &BoxList {
        &self.current.boxes
    }

    /// Time of the most recent frame, if any
    pub fn current_time(&self) -> Option<u64> {
        self.current.time
    }

    /// Every label ever recorded, alphabetically
    pub fn get_list_of_all_seen_items(&self) -> Vec<String> {
        self.records.keys().cloned().collect()
    }

    /// Most instances of `label` seen at once, 0 if never seen
    pub fn how_many_have_you_seen(&self, label: &str) -> usize {
        self.records.get(label).map_or(0, |r| r.max_count)
    }

    /// End time of each run of frames `label` was seen in, oldest first
    pub fn when_did_you_see(&self, label: &str) -> Vec<u64> {
        self.records
            .get(label)
            .map(|r| r.run_end_times.clone())
            .unwrap_or_default()
    }

    /// A one-element description of where `label` was seen, or nothing if
    /// it never was.
    pub fn where_did_you_see(&self, label: &str) -> Vec<String> {
        if !self.records.contains_key(label) {
            return Vec::new();
        }

        if self.facts.not_normally_on_floor.contains(label) {
            vec![ON_THE_FLOOR.to_string()]
        } else {
            vec![String::new()]
        }
    }

    /// Directions of a box. The checks are independent, so a wide box may
    /// be left, ahead and right at once.
    fn directions_of(&self, bbox: &BoundingBox) -> Vec<Direction> {
        let left = self.facts.left_boundary;
        let right = self.facts.right_boundary;

        let mut directions = Vec::with_capacity(3);
        if bbox.right > left && bbox.left < right {
            directions.push(Direction::Ahead);
        }
        if bbox.left < left {
            directions.push(Direction::Left);
        }
        if bbox.right > right {
            directions.push(Direction::Right);
        }
        directions
    }

    /// Labels of the current frame grouped by direction and custom category
    pub fn describe_scene(&self) -> SceneDescription {
        let mut scene = SceneDescription::default();

        for bbox in &self.current.boxes {
            for direction in self.directions_of(bbox) {
                let bucket = match direction {
                    Direction::Ahead => &mut scene.ahead,
                    Direction::Left => &mut scene.left,
                    Direction::Right => &mut scene.right,
                };
                bucket.push(bbox.label.clone());
            }
        }

        for (name, members) in &self.facts.custom_categories {
            let labels: Vec<String> = self
                .current
                .boxes
                .iter()
                .filter(|b| members.contains(&b.label))
                .map(|b| b.label.clone())
                .collect();
            scene.categories.insert(name.clone(), labels);
        }

        scene.left.sort();
        scene.ahead.sort();
        scene.right.sort();
        for labels in scene.categories.values_mut() {
            labels.sort();
        }

        scene
    }

    /// Location of the first box labelled `label` in the current frame, or
    /// `None` if the label is not in view.
    pub fn where_is(&self, label: &str) -> Option<ItemLocation> {
        let (index, target) = self.current.find(label)?;

        Some(ItemLocation {
            direction: self.directions_of(target),
            beneath: self.wall_items_above(index, target),
            on_top_of: self.supporting_item(index, target),
        })
    }

    /// Wall and ceiling items whose lower edge is above the target's lower
    /// edge and which share some horizontal span with it.
    fn wall_items_above(&self, index: usize, target: &BoundingBox) -> Vec<String> {
        let above: BTreeSet<String> = self
            .current
            .others(index)
            .filter(|b| self.facts.wall_and_ceiling.contains(&b.label))
            .filter(|b| b.lower > target.lower && b.horizontal_overlap(target) > 0.0)
            .map(|b| b.label.clone())
            .collect();
        above.into_iter().collect()
    }

    /// The item the target appears to rest on: among boxes that start below
    /// the target's lower edge and reach up to it (within the configured
    /// gap), the one with the largest area below that edge and under the
    /// target's horizontal span.
    fn supporting_item(&self, index: usize, target: &BoundingBox) -> Option<String> {
        if self.facts.furniture.contains(&target.label) {
            return None;
        }

        let reach = target.lower - self.facts.max_on_top_gap;
        let mut best: Option<(&BoundingBox, f64)> = None;

        for candidate in self.current.others(index) {
            let width = candidate.horizontal_overlap(target);
            if width <= 0.0 || candidate.lower >= target.lower || candidate.upper < reach {
                continue;
            }

            let area_below = width * (candidate.upper.min(target.lower) - candidate.lower);
            if best.map_or(true, |(_, top)| area_below > top) {
                best = Some((candidate, area_below));
            }
        }

        best.map(|(b, _)| b.label.clone())
    }

    /// Labels of current-frame boxes nearer the viewer than `label`, judged
    /// by lower edge. Empty if `label` is not in view.
    pub fn items_between_user_and(&self, label: &str) -> Vec<String> {
        let Some((index, target)) = self.current.find(label) else {
            return Vec::new();
        };

        self.current
            .others(index)
            .filter(|b| b.lower < target.lower)
            .map(|b| b.label.clone())
            .collect()
    }

    /// Seen labels that belong to `category`, alphabetically. Empty for an
    /// unknown category.
    pub fn get_list_of_seen_items_in_category(&self, category: &str) -> Vec<String> {
        let Some(members) = self.facts.custom_categories.get(category) else {
            return Vec::new();
        };

        self.records
            .keys()
            .filter(|label| members.contains(*label))
            .cloned()
            .collect()
    }
}

fn to_set<S: AsRef<str>>(labels: &[S]) -> BTreeSet<String> {
    labels.iter().map(|l| l.as_ref().to_string()).collect()
}
