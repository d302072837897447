/// Part catalog: the fixed visual configuration of every suit part.
///
/// The table is built once into an immutable [`PartCatalog`] and looked up by
/// part name. Names outside the table resolve to [`PartCatalog::fallback`].
use std::collections::BTreeMap;
use std::sync::OnceLock;

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

use crate::transform::PartTransform;

/// Procedural shape used when a part has no mesh asset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Shape {
    Box,
    Sphere,
    Cylinder,
}

/// Static placement of a part relative to its source segment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartVisualConfig {
    pub shape: Shape,
    pub source_segment: String,
    /// Offset along the segment's local Y, in units of the segment's Y scale
    pub offset_y: f32,
    pub scale: [f32; 3],
    /// Fixed depth bias, not rotated with the segment
    #[serde(default)]
    pub z_offset: f32,
}

impl PartVisualConfig {
    pub fn new(shape: Shape, source_segment: &str, offset_y: f32, scale: [f32; 3]) -> Self {
        Self {
            shape,
            source_segment: source_segment.to_string(),
            offset_y,
            scale,
            z_offset: 0.0,
        }
    }

    pub fn with_z_offset(mut self, z_offset: f32) -> Self {
        self.z_offset = z_offset;
        self
    }
}

/// Placement used by the static front-view preview, when no Sim drives the parts
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrontLayout {
    pub position: [f32; 3],
    pub scale: [f32; 3],
}

/// One row of the catalog
#[derive(Debug, Clone, PartialEq)]
pub struct PartEntry {
    pub visual: PartVisualConfig,
    /// Flat color shown while the part is untextured, 0xRRGGBB
    pub color: u32,
    pub front: FrontLayout,
}

/// Color for parts the catalog does not know
pub const FALLBACK_COLOR: u32 = 0x7eb6ff;

/// Immutable registry of part configurations keyed by part name
#[derive(Debug, Clone)]
pub struct PartCatalog {
    entries: BTreeMap<String, PartEntry>,
    fallback: PartEntry,
}

impl PartCatalog {
    /// The built-in 18-part suit table.
    pub fn builtin() -> &'static PartCatalog {
        static CATALOG: OnceLock<PartCatalog> = OnceLock::new();
        CATALOG.get_or_init(build_builtin)
    }

    pub fn new(entries: BTreeMap<String, PartEntry>, fallback: PartEntry) -> Self {
        Self { entries, fallback }
    }

    pub fn get(&self, part: &str) -> Option<&PartEntry> {
        self.entries.get(part)
    }

    /// Entry for `part`, or the fallback entry when the name is unknown
    pub fn entry(&self, part: &str) -> &PartEntry {
        self.entries.get(part).unwrap_or(&self.fallback)
    }

    pub fn visual(&self, part: &str) -> &PartVisualConfig {
        &self.entry(part).visual
    }

    pub fn color(&self, part: &str) -> u32 {
        self.get(part).map_or(FALLBACK_COLOR, |e| e.color)
    }

    pub fn fallback(&self) -> &PartEntry {
        &self.fallback
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Static front-view transform of a part; unknown parts sit at the origin.
    pub fn front_transform(&self, part: &str) -> PartTransform {
        let layout = self.get(part).map_or(
            FrontLayout {
                position: [0.0; 3],
                scale: [1.0; 3],
            },
            |e| e.front,
        );
        PartTransform {
            position: Vector3::from(layout.position),
            rotation_z: 0.0,
            scale: Vector3::from(layout.scale),
        }
    }
}

fn build_builtin() -> PartCatalog {
    let rows: [(&str, PartVisualConfig, u32, FrontLayout); 18] = [
        row("helmet", PartVisualConfig::new(Shape::Sphere, "chest_core", 0.86, [0.26, 0.26, 0.26]), 0xffcd4f, [0.0, 1.30, 0.08], [0.66, 0.66, 0.66]),
        row("chest", PartVisualConfig::new(Shape::Box, "chest_core", 0.0, [0.62, 0.68, 0.56]), 0x4fa8ff, [0.0, 0.72, 0.14], [1.18, 1.22, 1.08]),
        row("back", PartVisualConfig::new(Shape::Box, "chest_core", -0.03, [0.58, 0.66, 0.52]).with_z_offset(-0.08), 0x4f88e8, [0.0, 0.72, -0.14], [1.08, 1.18, 1.05]),
        row("waist", PartVisualConfig::new(Shape::Box, "chest_core", -0.48, [0.44, 0.3, 0.34]), 0x62c9ff, [0.0, 0.22, 0.06], [1.0, 1.02, 1.02]),
        row("left_shoulder", PartVisualConfig::new(Shape::Sphere, "left_upperarm", 0.42, [0.18, 0.18, 0.18]), 0xff8f6a, [-0.55, 0.98, 0.02], [0.68, 0.68, 0.68]),
        row("right_shoulder", PartVisualConfig::new(Shape::Sphere, "right_upperarm", 0.42, [0.18, 0.18, 0.18]), 0xff6a8f, [0.55, 0.98, 0.02], [0.68, 0.68, 0.68]),
        row("left_upperarm", PartVisualConfig::new(Shape::Cylinder, "left_upperarm", 0.0, [0.9, 1.0, 0.9]), 0x9a8cff, [-0.72, 0.66, 0.01], [0.78, 0.96, 0.78]),
        row("right_upperarm", PartVisualConfig::new(Shape::Cylinder, "right_upperarm", 0.0, [0.9, 1.0, 0.9]), 0x7f99ff, [0.72, 0.66, 0.01], [0.78, 0.96, 0.78]),
        row("left_forearm", PartVisualConfig::new(Shape::Cylinder, "left_forearm", 0.0, [0.86, 1.0, 0.86]), 0x63d5ff, [-0.76, 0.22, 0.03], [0.80, 1.02, 0.80]),
        row("right_forearm", PartVisualConfig::new(Shape::Cylinder, "right_forearm", 0.0, [0.86, 1.0, 0.86]), 0x5deec3, [0.76, 0.22, 0.03], [0.80, 1.02, 0.80]),
        row("left_hand", PartVisualConfig::new(Shape::Sphere, "left_forearm", -0.55, [0.14, 0.14, 0.14]), 0xd4ff73, [-0.78, -0.24, 0.08], [0.74, 0.74, 0.74]),
        row("right_hand", PartVisualConfig::new(Shape::Sphere, "right_forearm", -0.55, [0.14, 0.14, 0.14]), 0xb2ff73, [0.78, -0.24, 0.08], [0.74, 0.74, 0.74]),
        row("left_thigh", PartVisualConfig::new(Shape::Cylinder, "left_thigh", 0.0, [1.0, 1.0, 1.0]), 0xff8ec8, [-0.28, -0.42, 0.03], [0.90, 1.18, 0.90]),
        row("right_thigh", PartVisualConfig::new(Shape::Cylinder, "right_thigh", 0.0, [1.0, 1.0, 1.0]), 0xff82ab, [0.28, -0.42, 0.03], [0.90, 1.18, 0.90]),
        row("left_shin", PartVisualConfig::new(Shape::Cylinder, "left_shin", 0.0, [0.92, 1.0, 0.92]), 0x7cd7ff, [-0.28, -1.02, 0.05], [0.88, 1.20, 0.88]),
        row("right_shin", PartVisualConfig::new(Shape::Cylinder, "right_shin", 0.0, [0.92, 1.0, 0.92]), 0x63c6ff, [0.28, -1.02, 0.05], [0.88, 1.20, 0.88]),
        row("left_boot", PartVisualConfig::new(Shape::Box, "left_shin", -0.62, [0.2, 0.14, 0.32]), 0xffe48a, [-0.28, -1.62, 0.20], [0.92, 0.95, 1.18]),
        row("right_boot", PartVisualConfig::new(Shape::Box, "right_shin", -0.62, [0.2, 0.14, 0.32]), 0xffd36f, [0.28, -1.62, 0.20], [0.92, 0.95, 1.18]),
    ];

    let entries = rows
        .into_iter()
        .map(|(name, visual, color, front)| (name.to_string(), PartEntry { visual, color, front }))
        .collect();

    let fallback = PartEntry {
        visual: PartVisualConfig::new(Shape::Box, "chest_core", 0.0, [0.2, 0.2, 0.2]),
        color: FALLBACK_COLOR,
        front: FrontLayout {
            position: [0.0; 3],
            scale: [1.0; 3],
        },
    };

    PartCatalog::new(entries, fallback)
}

fn row(
    name: &'static str,
    visual: PartVisualConfig,
    color: u32,
    position: [f32; 3],
    scale: [f32; 3],
) -> (&'static str, PartVisualConfig, u32, FrontLayout) {
    (name, visual, color, FrontLayout { position, scale })
}
