//! Basic example of using sightline-eye

use sightline_core::{BoundingBox, BoxList, NarrationConfig};
use sightline_eye::NarrationPipeline;

fn main() {
    let mut config = NarrationConfig::default();
    config.scene.furniture = vec!["table".to_string()];
    config.scene.wall_and_ceiling = vec!["picture".to_string()];
    let mut pipeline = NarrationPipeline::new(&config);

    // A detector working on 640x480 frames
    let (width, height) = (640, 480);
    let table =
        BoundingBox::from_pixels((200.0, 300.0, 440.0, 470.0), width, height, 0.9, "table");
    let cup = BoundingBox::from_pixels((300.0, 260.0, 340.0, 301.0), width, height, 0.8, "cup");
    let picture =
        BoundingBox::from_pixels((280.0, 40.0, 380.0, 120.0), width, height, 0.7, "picture");

    for time in 1..=3 {
        let frame = BoxList::from(vec![table.clone(), cup.clone(), picture.clone()]);
        let report = pipeline.process_frame(frame, time);
        println!("t={} tracks={:?}", time, report.track_ids);
    }

    let knowledge = pipeline.knowledge();
    println!("Seen: {:?}", knowledge.get_list_of_all_seen_items());
    println!("Scene: {:?}", knowledge.describe_scene());
    if let Some(location) = knowledge.where_is("cup") {
        println!(
            "The cup is {:?}, beneath {:?}, on top of {:?}",
            location.direction, location.beneath, location.on_top_of
        );
    }
}
