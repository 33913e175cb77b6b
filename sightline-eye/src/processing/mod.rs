//! Frame processing stages

pub mod matching;
pub mod subsumption;
pub mod tracker;

pub use matching::{GreedyIouMatcher, TrackMatcher};
pub use subsumption::SubsumptionUnit;
pub use tracker::Tracker;
