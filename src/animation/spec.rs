//! JSON step lists.
//!
//! ```json
//! [
//!   { "type": "alpha", "fromAlpha": 0, "toAlpha": 1, "durationMs": 300 },
//!   { "type": "delay", "durationMs": 500 },
//!   { "type": "moveTo", "toX": 40, "toY": 10, "durationMs": 200 },
//!   { "type": "repeat", "count": -1 }
//! ]
//! ```
//!
//! Entries with an unknown or missing `type` are skipped. Callback steps
//! have no JSON form.

use serde::{Deserialize, Serialize};

use super::Timeline;
use crate::element::SpecError;

fn one() -> f32 {
    1.0
}

fn once() -> i32 {
    1
}

fn yes() -> bool {
    true
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum StepSpec {
    #[serde(rename_all = "camelCase")]
    Scale {
        #[serde(default = "one")]
        from_scale: f32,
        #[serde(default = "one")]
        to_scale: f32,
        #[serde(default)]
        duration_ms: f32,
    },
    #[serde(rename_all = "camelCase")]
    Rotate {
        #[serde(default)]
        from_degree: f32,
        #[serde(default)]
        to_degree: f32,
        #[serde(default)]
        duration_ms: f32,
    },
    #[serde(rename_all = "camelCase")]
    Move {
        #[serde(default)]
        move_x: f32,
        #[serde(default)]
        move_y: f32,
        #[serde(default)]
        duration_ms: f32,
    },
    /// Starts from the live position unless both `fromX` and `fromY` are set.
    #[serde(rename_all = "camelCase")]
    MoveTo {
        #[serde(default)]
        from_x: Option<f32>,
        #[serde(default)]
        from_y: Option<f32>,
        #[serde(default)]
        to_x: f32,
        #[serde(default)]
        to_y: f32,
        #[serde(default)]
        duration_ms: f32,
    },
    #[serde(rename_all = "camelCase")]
    Resize {
        #[serde(default)]
        from_w: f32,
        #[serde(default)]
        from_h: f32,
        #[serde(default)]
        to_w: f32,
        #[serde(default)]
        to_h: f32,
        #[serde(default)]
        duration_ms: f32,
    },
    #[serde(rename_all = "camelCase")]
    Alpha {
        #[serde(default = "one")]
        from_alpha: f32,
        #[serde(default = "one")]
        to_alpha: f32,
        #[serde(default)]
        duration_ms: f32,
    },
    ChangeTexture {
        #[serde(default)]
        image: String,
    },
    #[serde(rename_all = "camelCase")]
    Delay {
        #[serde(default)]
        duration_ms: f32,
    },
    #[serde(alias = "visible")]
    SetVisible {
        #[serde(default = "yes")]
        visible: bool,
    },
    Repeat {
        #[serde(default = "once")]
        count: i32,
    },
    #[serde(other)]
    Unknown,
}

impl StepSpec {
    /// Append this step to `timeline`.
    pub fn append_to(self, timeline: Timeline) -> Timeline {
        match self {
            Self::Scale {
                from_scale,
                to_scale,
                duration_ms,
            } => timeline.scale(from_scale, to_scale, duration_ms),
            Self::Rotate {
                from_degree,
                to_degree,
                duration_ms,
            } => timeline.rotate(from_degree, to_degree, duration_ms),
            Self::Move {
                move_x,
                move_y,
                duration_ms,
            } => timeline.move_by(move_x, move_y, duration_ms),
            Self::MoveTo {
                from_x: Some(x),
                from_y: Some(y),
                to_x,
                to_y,
                duration_ms,
            } => timeline.move_between((x, y), (to_x, to_y), duration_ms),
            Self::MoveTo {
                to_x,
                to_y,
                duration_ms,
                ..
            } => timeline.move_to(to_x, to_y, duration_ms),
            Self::Resize {
                from_w,
                from_h,
                to_w,
                to_h,
                duration_ms,
            } => timeline.resize((from_w, from_h), (to_w, to_h), duration_ms),
            Self::Alpha {
                from_alpha,
                to_alpha,
                duration_ms,
            } => timeline.alpha(from_alpha, to_alpha, duration_ms),
            Self::ChangeTexture { image } if image.is_empty() => timeline,
            Self::ChangeTexture { image } => timeline.change_texture(image),
            Self::Delay { duration_ms } => timeline.delay(duration_ms),
            Self::SetVisible { visible } => timeline.set_visible(visible),
            Self::Repeat { count } => timeline.repeat(count),
            Self::Unknown => timeline,
        }
    }
}

impl Timeline {
    /// Build a timeline from a JSON array of steps.
    ///
    /// Only a malformed document is an error; individual entries that fail
    /// to parse are logged and skipped.
    pub fn from_json(json: &str) -> Result<Self, SpecError> {
        let entries: Vec<serde_json::Value> = serde_json::from_str(json)?;
        let mut timeline = Timeline::new();
        for entry in entries {
            match serde_json::from_value::<StepSpec>(entry) {
                Ok(StepSpec::Unknown) => log::debug!("Skipping unknown animation step"),
                Ok(step) => timeline = step.append_to(timeline),
                Err(e) => log::warn!("Skipping animation step: {}", e),
            }
        }
        Ok(timeline)
    }
}
