/// Texture-driven relief.
///
/// Each corner of a textured part is pushed along its base normal by an
/// amount read from the texel under its UV: light texels raise the surface,
/// dark ones sink it, and washed-out background barely moves. Displacement
/// always starts from the base geometry, so applying twice with the same
/// amplitude gives the same result and [`restore`] undoes it exactly.
use nalgebra::Vector3;

use crate::part::RenderablePart;

/// How strongly a texel takes part in the relief, in [0, 1].
///
/// Near-white, unsaturated pixels (paper background) score 0.
pub fn relief_mask([r, g, b]: [u8; 3]) -> f32 {
    let min = r.min(g).min(b) as f32 / 255.0;
    let max = r.max(g).max(b) as f32 / 255.0;
    ((0.95 - min) * 8.0 + (max - min) * 2.0).clamp(0.0, 1.0)
}

/// Signed displacement for a texel at the given amplitude
pub fn displacement(rgb: [u8; 3], amplitude: f32) -> f32 {
    let [r, g, b] = rgb;
    let luminance = (r as f32 + g as f32 + b as f32) / (3.0 * 255.0);
    (luminance - 0.5) * amplitude * relief_mask(rgb)
}

/// Displace `part` by its texture.
///
/// A non-positive (or non-finite) amplitude, or a part without texture,
/// restores the base geometry instead. Parts whose base has no matching
/// UV or normal buffer are left untouched.
pub fn apply(part: &mut RenderablePart, amplitude: f32) {
    if !amplitude.is_finite() || amplitude <= 0.0 {
        restore(part);
        return;
    }
    let Some(texture) = part.texture() else {
        restore(part);
        return;
    };

    let base = part.base();
    let corners = base.corner_count();
    let Some(uvs) = base.uvs.as_deref() else {
        return;
    };
    if uvs.len() != corners * 2 || base.normals.len() != base.positions.len() {
        return;
    }

    let mut positions = Vec::with_capacity(base.positions.len());
    for i in 0..corners {
        let d = displacement(texture.sample_uv(uvs[i * 2], uvs[i * 2 + 1]), amplitude);

        let n = Vector3::new(base.normals[i * 3], base.normals[i * 3 + 1], base.normals[i * 3 + 2]);
        let len = n.norm();
        let n = n / if len > 0.0 { len } else { 1.0 };

        positions.push(base.positions[i * 3] + n.x * d);
        positions.push(base.positions[i * 3 + 1] + n.y * d);
        positions.push(base.positions[i * 3 + 2] + n.z * d);
    }

    part.set_live_positions(positions);
}

/// Put the base positions back into the live buffer
pub fn restore(part: &mut RenderablePart) {
    let positions = part.base().positions.clone();
    part.set_live_positions(positions);
}
