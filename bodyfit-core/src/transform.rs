/// Per-frame part transforms and the matrices built from them
use nalgebra::{Matrix4, Vector3};

use crate::catalog::PartVisualConfig;
use crate::sim::SegmentMap;

/// Smallest per-axis segment scale a part inherits
pub const MIN_SEGMENT_SCALE: f32 = 0.45;

/// World transform of one part: translate, rotate about Z, scale
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PartTransform {
    pub position: Vector3<f32>,
    /// Radians about Z
    pub rotation_z: f32,
    pub scale: Vector3<f32>,
}

impl PartTransform {
    #[cfg(test)]
    pub(crate) fn identity() -> Self {
        Self {
            position: Vector3::zeros(),
            rotation_z: 0.0,
            scale: Vector3::new(1.0, 1.0, 1.0),
        }
    }

    /// Model matrix T * Rz * S
    pub fn model_matrix(&self) -> Matrix4<f32> {
        Transform::translation_matrix(self.position.x, self.position.y, self.position.z)
            * Transform::rotation_z_matrix(self.rotation_z)
            * Transform::scale_matrix(self.scale.x, self.scale.y, self.scale.z)
    }

    /// Flat `[px, py, pz, rz, sx, sy, sz]` layout handed to host renderers
    pub fn to_array(&self) -> [f32; 7] {
        [
            self.position.x,
            self.position.y,
            self.position.z,
            self.rotation_z,
            self.scale.x,
            self.scale.y,
            self.scale.z,
        ]
    }
}

/// Local "up" of a segment rotated by `rotation_z`, in the XY plane
pub fn local_y_axis(rotation_z: f32) -> (f32, f32) {
    (-rotation_z.sin(), rotation_z.cos())
}

/// Resolve a part's world transform from the current frame's segments.
///
/// Returns `None` when the part's source segment is missing from the frame;
/// the part is hidden for that frame rather than drawn at the origin.
pub fn resolve(config: &PartVisualConfig, segments: &SegmentMap) -> Option<PartTransform> {
    let base = segments.get(&config.source_segment)?;

    let (ux, uy) = local_y_axis(base.rotation_z);
    let along = config.offset_y * base.scale_y;
    let position = Vector3::new(
        base.position_x + ux * along,
        base.position_y + uy * along,
        base.position_z + config.z_offset,
    );

    let scale = Vector3::new(
        base.scale_x.max(MIN_SEGMENT_SCALE) * config.scale[0],
        base.scale_y.max(MIN_SEGMENT_SCALE) * config.scale[1],
        base.scale_z.max(MIN_SEGMENT_SCALE) * config.scale[2],
    );

    Some(PartTransform {
        position,
        rotation_z: base.rotation_z,
        scale,
    })
}

/// Transform builder for 3D transformations
pub struct Transform;

impl Transform {
    /// Rotation about Z only
    pub fn rotation_z_matrix(angle: f32) -> Matrix4<f32> {
        Matrix4::new_rotation(Vector3::new(0.0, 0.0, angle))
    }

    /// Create a translation matrix
    pub fn translation_matrix(x: f32, y: f32, z: f32) -> Matrix4<f32> {
        Matrix4::new_translation(&Vector3::new(x, y, z))
    }

    /// Create a scale matrix
    pub fn scale_matrix(sx: f32, sy: f32, sz: f32) -> Matrix4<f32> {
        Matrix4::new_nonuniform_scaling(&Vector3::new(sx, sy, sz))
    }
}
