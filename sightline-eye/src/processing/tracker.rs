//! Multi-object tracking

use crate::processing::matching::{GreedyIouMatcher, TrackMatcher};
use sightline_core::{BoundingBox, BoxList, TrackerConfig};
use tracing::{debug, trace};

/// A detection followed across frames
#[derive(Debug, Clone)]
struct Track {
    id: u64,
    bbox: BoundingBox,
    /// Frame number of the most recent match
    last_seen: u64,
    /// Number of frames this track has been matched in
    frames_detected: u64,
}

impl Track {
    /// Fold a matching detection into the track. A less confident detection
    /// only moves the box; the established label and confidence are kept.
    fn sight(&mut self, detection: BoundingBox, frame: u64) {
        if detection.confidence < self.bbox.confidence {
            self.bbox.left = detection.left;
            self.bbox.right = detection.right;
            self.bbox.lower = detection.lower;
            self.bbox.upper = detection.upper;
        } else {
            self.bbox = detection;
        }
        self.last_seen = frame;
        self.frames_detected += 1;
    }
}

/// Multi-object tracker
#[derive(Debug)]
pub struct Tracker {
    tracks: Vec<Track>,
    next_id: u64,
    frame_count: u64,
    config: TrackerConfig,
    matcher: Box<dyn TrackMatcher>,
}

impl Default for Tracker {
    fn default() -> Self {
        Self::new(TrackerConfig::default())
    }
}

impl Tracker {
    /// Create a tracker using first-match IoU assignment
    pub fn new(config: TrackerConfig) -> Self {
        Self::with_matcher(config, Box::new(GreedyIouMatcher))
    }

    /// Create a tracker with a custom assignment strategy
    pub fn with_matcher(config: TrackerConfig, matcher: Box<dyn TrackMatcher>) -> Self {
        Self {
            tracks: Vec::new(),
            next_id: 0,
            frame_count: 0,
            config,
            matcher,
        }
    }

    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    /// Number of frames processed so far
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Number of live tracks, including those not yet reported
    pub fn track_count(&self) -> usize {
        self.tracks.len()
    }

    /// Update tracker with the detections of the next frame
    pub fn add_new_frame(&mut self, frame_boxes: BoxList) {
        self.frame_count += 1;
        let frame = self.frame_count;
        let detections = frame_boxes.into_vec();

        let assignments = {
            let current: Vec<&BoundingBox> = self.tracks.iter().map(|t| &t.bbox).collect();
            self.matcher.assign(&current, &detections, self.config.iou_threshold)
        };

        let mut slots: Vec<Option<BoundingBox>> = detections.into_iter().map(Some).collect();

        for (track, assignment) in self.tracks.iter_mut().zip(assignments) {
            let detection = assignment
                .and_then(|i| slots.get_mut(i))
                .and_then(Option::take);
            if let Some(detection) = detection {
                track.sight(detection, frame);
            }
        }

        // Unclaimed detections start new tracks
        for detection in slots.into_iter().flatten() {
            trace!("New track {} for '{}'", self.next_id, detection.label);
            self.tracks.push(Track {
                id: self.next_id,
                bbox: detection,
                last_seen: frame,
                frames_detected: 1,
            });
            self.next_id += 1;
        }

        let allowed_absence = self.config.allowed_absence;
        self.tracks
            .retain(|t| t.last_seen.saturating_add(allowed_absence) >= frame);

        debug!("Tracking {} objects at frame {}", self.tracks.len(), frame);
    }

    /// Boxes and IDs of every track matched in at least
    /// `min_frames_for_track` frames, in track creation order.
    pub fn get_current_tracks(&self) -> (BoxList, Vec<u64>) {
        let reported = self
            .tracks
            .iter()
            .filter(|t| t.frames_detected >= self.config.min_frames_for_track);

        let mut boxes = BoxList::with_capacity(self.tracks.len());
        let mut ids = Vec::with_capacity(self.tracks.len());
        for track in reported {
            boxes.add(track.bbox.clone());
            ids.push(track.id);
        }
        (boxes, ids)
    }
}
