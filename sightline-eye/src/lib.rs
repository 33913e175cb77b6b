//! sightline-eye: turning noisy detections into a narratable scene
//!
//! Per-frame detections are de-duplicated by label-aware subsumption,
//! stabilized into persistent tracks, and accumulated into a knowledge unit
//! that answers what was seen, when, and where it is now.

pub mod knowledge;
pub mod pipeline;
pub mod processing;
pub mod scene;

pub use knowledge::{KnowledgeUnit, ON_THE_FLOOR, UNKNOWN_ITEM};
pub use pipeline::{FrameReport, NarrationPipeline};
pub use processing::{GreedyIouMatcher, SubsumptionUnit, TrackMatcher, Tracker};
pub use scene::{Direction, ItemLocation, SceneDescription};
