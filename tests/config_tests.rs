//! Configuration files driving the whole pipeline

use sightline_core::{BoundingBox, BoxList, Error, NarrationConfig};
use sightline_eye::NarrationPipeline;
use std::io::Write;
use tempfile::NamedTempFile;

const LIVING_ROOM: &str = r#"
[detection]
confidence_threshold = 0.3

[tracker]
allowed_absence = 1
min_frames_for_track = 2

[subsumption]
groups = [["sofa", "couch"]]

[scene]
left_boundary = 0.4
right_boundary = 0.6
furniture = ["sofa"]
impossible_items = ["surfboard"]

[scene.custom_categories]
seating = ["sofa", "chair"]
"#;

fn write_config(content: &str, suffix: &str) -> NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
}

#[test]
fn test_pipeline_from_toml_file() {
    let file = write_config(LIVING_ROOM, ".toml");
    let config = NarrationConfig::load(file.path()).unwrap();
    let mut pipeline = NarrationPipeline::new(&config);

    let frame = BoxList::from(vec![
        BoundingBox::new(0.1, 0.5, 0.0, 0.4, 0.9, "sofa"),
        BoundingBox::new(0.11, 0.49, 0.01, 0.39, 0.7, "couch"),
        BoundingBox::new(0.7, 0.8, 0.0, 0.2, 0.35, "chair"),
        BoundingBox::new(0.9, 1.0, 0.0, 0.1, 0.2, "lamp"),
    ]);

    // Tracks need two sightings before they are reported
    let first = pipeline.process_frame(frame.clone(), 1);
    assert_eq!(first.trimmed, 1);
    assert_eq!(first.subsumed, 1);
    assert!(first.tracks.is_empty());

    let second = pipeline.process_frame(frame, 2);
    assert_eq!(second.tracks.labels(), vec!["chair", "sofa"]);

    let scene = pipeline.knowledge().describe_scene();
    assert_eq!(scene.left, vec!["sofa"]);
    assert_eq!(scene.ahead, vec!["sofa"]);
    assert_eq!(scene.right, vec!["chair"]);
    assert_eq!(scene.categories["seating"], vec!["chair", "sofa"]);
}

#[test]
fn test_yaml_and_toml_agree() {
    let yaml = r#"
detection:
  confidence_threshold: 0.3
tracker:
  allowed_absence: 1
  min_frames_for_track: 2
subsumption:
  groups:
    - [sofa, couch]
scene:
  left_boundary: 0.4
  right_boundary: 0.6
  furniture: [sofa]
  impossible_items: [surfboard]
  custom_categories:
    seating: [sofa, chair]
"#;
    let from_yaml = NarrationConfig::load(write_config(yaml, ".yaml").path()).unwrap();
    let from_toml = NarrationConfig::from_toml_str(LIVING_ROOM).unwrap();
    assert_eq!(from_yaml, from_toml);
}

#[test]
fn test_invalid_file_is_rejected() {
    let file = write_config("[scene]\nleft_boundary = 0.8\nright_boundary = 0.2\n", ".toml");
    let err = NarrationConfig::load(file.path()).unwrap_err();
    assert!(matches!(err, Error::Configuration(_)));
}

#[test]
fn test_missing_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = NarrationConfig::load(dir.path().join("absent.toml")).unwrap_err();
    assert!(matches!(err, Error::Io(_)));
}
