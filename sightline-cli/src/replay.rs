// Replay of recorded detector output through the narration pipeline

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use sightline_core::{BoundingBox, BoxList};
use sightline_eye::{FrameReport, ItemLocation, NarrationPipeline, SceneDescription};
use std::io::BufRead;

/// One line of a detections file
#[derive(Debug, Clone, Deserialize)]
pub struct DetectionFrame {
    pub time: u64,
    #[serde(default)]
    pub detections: Vec<BoundingBox>,
}

/// Questions to answer once every frame has been replayed
#[derive(Debug, Clone, Default)]
pub struct Queries {
    pub where_is: Vec<String>,
    pub when: Vec<String>,
    pub between: Vec<String>,
}

/// Parse a JSON-lines stream of frames. Blank lines are skipped.
pub fn read_frames<R: BufRead>(reader: R) -> Result<Vec<DetectionFrame>> {
    let mut frames = Vec::new();
    for (index, line) in reader.lines().enumerate() {
        let line = line.with_context(|| format!("failed to read line {}", index + 1))?;
        if line.trim().is_empty() {
            continue;
        }
        let frame: DetectionFrame = serde_json::from_str(&line)
            .with_context(|| format!("invalid frame on line {}", index + 1))?;
        frames.push(frame);
    }
    Ok(frames)
}

#[derive(Debug, Serialize)]
pub struct FrameOutput {
    #[serde(flatten)]
    pub report: FrameReport,
    pub scene: SceneDescription,
}

#[derive(Debug, Serialize)]
pub struct WhereIsAnswer {
    pub label: String,
    pub location: Option<ItemLocation>,
}

#[derive(Debug, Serialize)]
pub struct WhenAnswer {
    pub label: String,
    pub times: Vec<u64>,
}

#[derive(Debug, Serialize)]
pub struct BetweenAnswer {
    pub label: String,
    pub items: Vec<String>,
}

#[derive(Debug, Default, Serialize)]
pub struct Answers {
    pub seen: Vec<String>,
    pub where_is: Vec<WhereIsAnswer>,
    pub when: Vec<WhenAnswer>,
    pub between: Vec<BetweenAnswer>,
}

/// Feed every frame through the pipeline, returning per-frame output
pub fn replay(pipeline: &mut NarrationPipeline, frames: Vec<DetectionFrame>) -> Vec<FrameOutput> {
    frames
        .into_iter()
        .map(|frame| {
            let report = pipeline.process_frame(BoxList::from(frame.detections), frame.time);
            FrameOutput {
                report,
                scene: pipeline.knowledge().describe_scene(),
            }
        })
        .collect()
}

pub fn answer(pipeline: &NarrationPipeline, queries: &Queries) -> Answers {
    let knowledge = pipeline.knowledge();
    Answers {
        seen: knowledge.get_list_of_all_seen_items(),
        where_is: queries
            .where_is
            .iter()
            .map(|label| WhereIsAnswer {
                label: label.clone(),
                location: knowledge.where_is(label),
            })
            .collect(),
        when: queries
            .when
            .iter()
            .map(|label| WhenAnswer {
                label: label.clone(),
                times: knowledge.when_did_you_see(label),
            })
            .collect(),
        between: queries
            .between
            .iter()
            .map(|label| BetweenAnswer {
                label: label.clone(),
                items: knowledge.items_between_user_and(label),
            })
            .collect(),
    }
}

fn list(labels: &[String]) -> String {
    if labels.is_empty() {
        "-".to_string()
    } else {
        labels.join(", ")
    }
}

pub fn render_frame(output: &FrameOutput) -> String {
    let scene = &output.scene;
    let mut line = format!(
        "t={} tracks={} | left: {} | ahead: {} | right: {}",
        output.report.time,
        output.report.tracks.len(),
        list(&scene.left),
        list(&scene.ahead),
        list(&scene.right)
    );
    for (name, labels) in &scene.categories {
        line.push_str(&format!(" | {}: {}", name, list(labels)));
    }
    line
}

pub fn render_answers(answers: &Answers) -> String {
    let mut lines = vec![format!("Seen: {}", list(&answers.seen))];

    for answer in &answers.where_is {
        match &answer.location {
            Some(location) => {
                let directions: Vec<String> =
                    location.direction.iter().map(|d| d.to_string()).collect();
                lines.push(format!(
                    "Where is {}: {}; beneath: {}; on top of: {}",
                    answer.label,
                    list(&directions),
                    list(&location.beneath),
                    location.on_top_of.as_deref().unwrap_or("-")
                ));
            }
            None => lines.push(format!("Where is {}: not in view", answer.label)),
        }
    }

    for answer in &answers.when {
        let times: Vec<String> = answer.times.iter().map(u64::to_string).collect();
        lines.push(format!("When did you see {}: {}", answer.label, list(&times)));
    }

    for answer in &answers.between {
        lines.push(format!(
            "Between you and {}: {}",
            answer.label,
            list(&answer.items)
        ));
    }

    lines.join("\n")
}
