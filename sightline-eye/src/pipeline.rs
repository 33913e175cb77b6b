//! Per-frame narration pipeline
//!
//! Raw detections flow through confidence trimming, optional subsumption and
//! the tracker; the stable tracks are then recorded by the knowledge unit.

use crate::knowledge::KnowledgeUnit;
use crate::processing::{SubsumptionUnit, Tracker};
use sightline_core::{BoxList, NarrationConfig};
use serde::Serialize;
use tracing::debug;

/// Outcome of processing one frame
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FrameReport {
    pub time: u64,
    /// Boxes of every reported track, in track creation order
    pub tracks: BoxList,
    /// Track IDs parallel to `tracks`
    pub track_ids: Vec<u64>,
    /// Detections dropped for low confidence
    pub trimmed: usize,
    /// Detections absorbed into another box
    pub subsumed: usize,
}

/// Narration pipeline
#[derive(Debug)]
pub struct NarrationPipeline {
    confidence_threshold: f64,
    subsumption: Option<SubsumptionUnit>,
    tracker: Tracker,
    knowledge: KnowledgeUnit,
}

impl Default for NarrationPipeline {
    fn default() -> Self {
        Self::new(&NarrationConfig::default())
    }
}

impl NarrationPipeline {
    /// Create a pipeline from configuration
    pub fn new(config: &NarrationConfig) -> Self {
        let subsumption = config
            .subsumption
            .enabled
            .then(|| SubsumptionUnit::from_config(&config.subsumption));

        Self {
            confidence_threshold: config.detection.confidence_threshold,
            subsumption,
            tracker: Tracker::new(config.tracker.clone()),
            knowledge: KnowledgeUnit::from_config(&config.scene),
        }
    }

    /// Process the detections of one frame seen at `time`
    pub fn process_frame(&mut self, mut detections: BoxList, time: u64) -> FrameReport {
        let received = detections.len();
        detections.trim_by_confidence(self.confidence_threshold);
        let trimmed = received - detections.len();

        let before_subsumption = detections.len();
        if let Some(unit) = &self.subsumption {
            detections = unit.subsume_bboxes(detections);
        }
        let subsumed = before_subsumption - detections.len();

        self.tracker.add_new_frame(detections);
        let (tracks, track_ids) = self.tracker.get_current_tracks();
        self.knowledge.add_frame(tracks.clone(), time);

        debug!(
            "Frame {}: {} detections, {} trimmed, {} subsumed, {} tracks reported",
            time,
            received,
            trimmed,
            subsumed,
            tracks.len()
        );

        FrameReport {
            time,
            tracks,
            track_ids,
            trimmed,
            subsumed,
        }
    }

    pub fn knowledge(&self) -> &KnowledgeUnit {
        &self.knowledge
    }

    /// Mutable access for adjusting scene facts between frames
    pub fn knowledge_mut(&mut self) -> &mut KnowledgeUnit {
        &mut self.knowledge
    }

    pub fn tracker(&self) -> &Tracker {
        &self.tracker
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sightline_core::BoundingBox;

    #[test]
    fn test_pipeline_trims_low_confidence() {
        let mut pipeline = NarrationPipeline::default();
        let frame = BoxList::from(vec![
            BoundingBox::new(0.45, 0.55, 0.45, 0.55, 0.9, "cup"),
            BoundingBox::new(0.0, 0.1, 0.0, 0.1, 0.2, "ghost"),
        ]);

        let report = pipeline.process_frame(frame, 1);
        assert_eq!(report.trimmed, 1);
        assert_eq!(report.subsumed, 0);
        assert_eq!(report.tracks.labels(), vec!["cup"]);
        assert_eq!(report.track_ids, vec![0]);
        assert_eq!(pipeline.knowledge().describe_scene().ahead, vec!["cup"]);
    }

    #[test]
    fn test_pipeline_subsumes_before_tracking() {
        let mut config = NarrationConfig::default();
        config.subsumption.groups = vec![vec!["table".to_string(), "desk".to_string()]];
        let mut pipeline = NarrationPipeline::new(&config);

        let frame = BoxList::from(vec![
            BoundingBox::new(0.2, 0.8, 0.0, 0.4, 0.8, "table"),
            BoundingBox::new(0.21, 0.79, 0.01, 0.39, 0.6, "desk"),
        ]);

        let report = pipeline.process_frame(frame, 1);
        assert_eq!(report.subsumed, 1);
        assert_eq!(report.tracks.labels(), vec!["table"]);
        assert_eq!(pipeline.tracker().track_count(), 1);
    }

    #[test]
    fn test_pipeline_subsumption_disabled() {
        let mut config = NarrationConfig::default();
        config.subsumption.enabled = false;
        let mut pipeline = NarrationPipeline::new(&config);

        let frame = BoxList::from(vec![
            BoundingBox::new(0.0, 0.1, 0.0, 0.1, 0.8, "cup"),
            BoundingBox::new(0.0, 0.1, 0.0, 0.1, 0.8, "cup"),
        ]);

        let report = pipeline.process_frame(frame, 1);
        assert_eq!(report.subsumed, 0);
        assert_eq!(report.track_ids, vec![0, 1]);
    }

    #[test]
    fn test_pipeline_records_history() {
        let mut pipeline = NarrationPipeline::default();
        let cup = BoxList::from(vec![BoundingBox::new(0.45, 0.55, 0.45, 0.55, 0.9, "cup")]);

        pipeline.process_frame(cup.clone(), 1);
        pipeline.process_frame(cup.clone(), 2);
        pipeline.process_frame(BoxList::new(), 3);

        let knowledge = pipeline.knowledge();
        assert_eq!(knowledge.when_did_you_see("cup"), vec![3]);
        assert_eq!(knowledge.how_many_have_you_seen("cup"), 1);
    }

    #[test]
    fn test_scene_facts_adjusted_between_frames() {
        let mut pipeline = NarrationPipeline::default();
        let cup = BoxList::from(vec![BoundingBox::new(0.45, 0.55, 0.45, 0.55, 0.9, "cup")]);

        pipeline.process_frame(cup.clone(), 1);
        assert!(pipeline.knowledge().describe_scene().categories.is_empty());

        pipeline
            .knowledge_mut()
            .set_custom_category("kitchenware", &["cup", "plate"]);
        pipeline.process_frame(cup, 2);

        let scene = pipeline.knowledge().describe_scene();
        assert_eq!(scene.categories["kitchenware"], vec!["cup"]);
        assert_eq!(
            pipeline.knowledge().get_list_of_seen_items_in_category("kitchenware"),
            vec!["cup"]
        );
    }

    #[test]
    fn test_frame_report_serializes() {
        let mut pipeline = NarrationPipeline::default();
        let report = pipeline.process_frame(
            BoxList::from(vec![BoundingBox::new(0.45, 0.55, 0.45, 0.55, 0.9, "cup")]),
            7,
        );

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["time"], 7);
        assert_eq!(json["tracks"][0]["label"], "cup");
        assert_eq!(json["track_ids"], serde_json::json!([0]));
    }
}
