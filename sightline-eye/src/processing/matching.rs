//! Assignment of incoming detections to existing tracks

use sightline_core::BoundingBox;
use std::fmt;
use tracing::trace;

/// Decides which detection, if any, continues each existing track.
///
/// `tracks` holds each live track's current box in track creation order.
/// The result has one entry per track: the index into `detections` of the
/// box that continues it. No detection index may appear twice.
pub trait TrackMatcher: fmt::Debug + Send + Sync {
    fn assign(
        &self,
        tracks: &[&BoundingBox],
        detections: &[BoundingBox],
        iou_threshold: f64,
    ) -> Vec<Option<usize>>;
}

/// First-match assignment.
///
/// Tracks are visited in creation order and each claims the first unclaimed
/// detection whose IoU exceeds the threshold. An earlier track therefore wins
/// an ambiguous detection even when a later track overlaps it better.
#[derive(Debug, Clone, Copy, Default)]
pub struct GreedyIouMatcher;

impl TrackMatcher for GreedyIouMatcher {
    fn assign(
        &self,
        tracks: &[&BoundingBox],
        detections: &[BoundingBox],
        iou_threshold: f64,
    ) -> Vec<Option<usize>> {
        let mut claimed = vec![false; detections.len()];

        tracks
            .iter()
            .map(|track| {
                let found = detections.iter().enumerate().position(|(i, detection)| {
                    !claimed[i] && track.iou(detection) > iou_threshold
                });
                if let Some(index) = found {
                    claimed[index] = true;
                    trace!("'{}' continued by detection {}", track.label, index);
                }
                found
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::collections::BTreeSet;

    #[test]
    fn test_greedy_matches_first_candidate() {
        let track = BoundingBox::new(0.0, 0.1, 0.0, 0.1, 0.5, "a");
        let detections = vec![
            BoundingBox::new(0.5, 0.6, 0.5, 0.6, 0.5, "far"),
            BoundingBox::new(0.0, 0.1, 0.0, 0.1, 0.5, "same"),
            BoundingBox::new(0.0, 0.1, 0.0, 0.1, 0.5, "also same"),
        ];

        let result = GreedyIouMatcher.assign(&[&track], &detections, 0.9);
        assert_eq!(result, vec![Some(1)]);
    }

    #[test]
    fn test_greedy_detection_claimed_once() {
        let first = BoundingBox::new(0.0, 0.1, 0.0, 0.1, 0.5, "a");
        let second = BoundingBox::new(0.0, 0.1, 0.0, 0.1, 0.5, "b");
        let detections = vec![BoundingBox::new(0.0, 0.1, 0.0, 0.1, 0.5, "c")];

        let result = GreedyIouMatcher.assign(&[&first, &second], &detections, 0.5);
        assert_eq!(result, vec![Some(0), None]);
    }

    #[test]
    fn test_greedy_earlier_track_wins_ambiguous_detection() {
        // the second track overlaps the detection perfectly, but the first
        // track is visited first and its overlap already clears the threshold
        let loose = BoundingBox::new(0.0, 0.12, 0.0, 0.1, 0.5, "loose");
        let exact = BoundingBox::new(0.0, 0.1, 0.0, 0.1, 0.5, "exact");
        let detections = vec![BoundingBox::new(0.0, 0.1, 0.0, 0.1, 0.5, "d")];

        let result = GreedyIouMatcher.assign(&[&loose, &exact], &detections, 0.8);
        assert_eq!(result, vec![Some(0), None]);
    }

    #[test]
    fn test_greedy_threshold_is_strict() {
        let track = BoundingBox::new(0.0, 0.1, 0.0, 0.1, 0.5, "a");
        let detections = vec![BoundingBox::new(0.0, 0.1, 0.0, 0.1, 0.5, "a")];
        assert_eq!(
            GreedyIouMatcher.assign(&[&track], &detections, 1.0),
            vec![None]
        );
    }

    #[test]
    fn test_greedy_no_tracks() {
        let detections = vec![BoundingBox::new(0.0, 0.1, 0.0, 0.1, 0.5, "a")];
        assert!(GreedyIouMatcher.assign(&[], &detections, 0.5).is_empty());
    }

    proptest! {
        #[test]
        fn test_greedy_never_assigns_detection_twice(
            spans in prop::collection::vec((0.0f64..0.9, 0.0f64..0.9), 0..8),
            threshold in 0.0f64..1.0,
        ) {
            let boxes: Vec<BoundingBox> = spans
                .iter()
                .map(|&(x, y)| BoundingBox::new(x, x + 0.1, y, y + 0.1, 0.5, "item"))
                .collect();
            let tracks: Vec<&BoundingBox> = boxes.iter().collect();

            let result = GreedyIouMatcher.assign(&tracks, &boxes, threshold);
            prop_assert_eq!(result.len(), tracks.len());

            let mut used = BTreeSet::new();
            for index in result.into_iter().flatten() {
                prop_assert!(index < boxes.len());
                prop_assert!(used.insert(index));
            }
        }
    }
}
