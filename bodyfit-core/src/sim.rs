/// Skeletal pose frames driving the suit
use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Frame duration used when a frame's `dt_sec` is absent or not positive
pub const DEFAULT_FRAME_SEC: f64 = 0.1;

/// World transform of one named skeletal segment in one frame
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SegmentTransform {
    #[serde(default)]
    pub position_x: f32,
    #[serde(default)]
    pub position_y: f32,
    #[serde(default)]
    pub position_z: f32,
    /// Radians about Z
    #[serde(default)]
    pub rotation_z: f32,
    #[serde(default = "unit")]
    pub scale_x: f32,
    #[serde(default = "unit")]
    pub scale_y: f32,
    #[serde(default = "unit")]
    pub scale_z: f32,
}

fn unit() -> f32 {
    1.0
}

impl Default for SegmentTransform {
    fn default() -> Self {
        Self {
            position_x: 0.0,
            position_y: 0.0,
            position_z: 0.0,
            rotation_z: 0.0,
            scale_x: 1.0,
            scale_y: 1.0,
            scale_z: 1.0,
        }
    }
}

pub type SegmentMap = HashMap<String, SegmentTransform>;

/// One pose snapshot
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SimFrame {
    #[serde(default)]
    pub segments: SegmentMap,
    #[serde(default)]
    pub dt_sec: Option<f64>,
    #[serde(default)]
    pub equipped: bool,
}

impl SimFrame {
    /// How long this frame stays on screen at speed 1
    pub fn duration(&self) -> f64 {
        match self.dt_sec {
            Some(dt) if dt.is_finite() && dt > 0.0 => dt,
            _ => DEFAULT_FRAME_SEC,
        }
    }
}

/// A recorded body sequence
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sim {
    #[serde(default)]
    pub frames: Vec<SimFrame>,
    /// Segment names the recorder tracked; only the count is used
    #[serde(default)]
    pub segments: Vec<serde_json::Value>,
    #[serde(default = "no_equip_frame")]
    pub equip_frame: i64,
    #[serde(default)]
    pub equipped: bool,
}

fn no_equip_frame() -> i64 {
    -1
}

impl Default for Sim {
    fn default() -> Self {
        Self {
            frames: Vec::new(),
            segments: Vec::new(),
            equip_frame: -1,
            equipped: false,
        }
    }
}

/// Headline numbers shown next to a loaded sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SimSummary {
    pub frames: usize,
    pub segments: usize,
    pub equip_frame: i64,
    pub equipped: bool,
}

impl Sim {
    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn summary(&self) -> SimSummary {
        SimSummary {
            frames: self.frames.len(),
            segments: self.segments.len(),
            equip_frame: self.equip_frame,
            equipped: self.equipped,
        }
    }

    /// Equipped flag of a frame, falling back to the sequence-level flag
    pub fn equipped_at(&self, index: usize) -> bool {
        self.frames.get(index).map_or(self.equipped, |f| f.equipped)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SIM: &str = r#"{
        "equipped": true,
        "equip_frame": 3,
        "segments": ["chest_core", "left_upperarm"],
        "frames": [
            {
                "index": 0,
                "equipped": false,
                "hold_sec": 0.0,
                "segments": {
                    "chest_core": {"position_x": 0.1, "position_y": 0.2, "position_z": 0.22,
                                   "rotation_z": 0.5, "scale_x": 0.3, "scale_y": 0.9, "scale_z": 0.3}
                }
            },
            { "dt_sec": 0.2, "equipped": true, "segments": {} },
            { "dt_sec": -1.0 }
        ]
    }"#;

    #[test]
    fn test_parse_sim() {
        let sim = Sim::from_json(SIM).unwrap();
        assert_eq!(sim.frames.len(), 3);
        let chest = sim.frames[0].segments["chest_core"];
        assert_eq!(chest.rotation_z, 0.5);
        assert_eq!(chest.scale_y, 0.9);
        assert_eq!(
            sim.summary(),
            SimSummary {
                frames: 3,
                segments: 2,
                equip_frame: 3,
                equipped: true
            }
        );
        assert!(!sim.equipped_at(0));
        assert!(sim.equipped_at(1));
        assert!(sim.equipped_at(99));
    }

    #[test]
    fn test_frame_duration_defaults() {
        let sim = Sim::from_json(SIM).unwrap();
        assert_eq!(sim.frames[0].duration(), DEFAULT_FRAME_SEC);
        assert_eq!(sim.frames[1].duration(), 0.2);
        assert_eq!(sim.frames[2].duration(), DEFAULT_FRAME_SEC);
    }

    #[test]
    fn test_missing_segment_fields_default() {
        let seg: SegmentTransform = serde_json::from_str(r#"{"position_x": 2.0}"#).unwrap();
        assert_eq!(seg.position_x, 2.0);
        assert_eq!(seg.rotation_z, 0.0);
        assert_eq!(seg.scale_y, 1.0);
    }

    #[test]
    fn test_empty_sim() {
        let sim = Sim::from_json("{}").unwrap();
        assert!(sim.is_empty());
        assert_eq!(sim.equip_frame, -1);
    }
}
