//! Core types for the sightline narration pipeline
//!
//! Bounding boxes in normalized frame coordinates, ordered box lists,
//! the shared error type and the pipeline configuration.

pub mod box_list;
pub mod config;
pub mod error;
pub mod geometry;

pub use box_list::BoxList;
pub use config::{
    DetectionConfig, NarrationConfig, SceneConfig, SubsumptionConfig, TrackerConfig,
};
pub use error::{Error, Result};
pub use geometry::{BoundingBox, IOU_TOLERANCE};
