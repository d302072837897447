/// Procedural fallback shapes.
///
/// Every part renders as one of these until (or instead of) its mesh asset.
/// All shapes are unit sized, carry UVs and are returned non-indexed.
use std::f32::consts::PI;

use crate::catalog::Shape;
use crate::geometry::TriangleBuffer;

/// Box segments along x, y and z.
pub const BOX_SEGMENTS: [usize; 3] = [16, 20, 16];
/// Sphere width and height segments.
pub const SPHERE_SEGMENTS: [usize; 2] = [34, 24];
/// Cylinder radial and height segments.
pub const CYLINDER_SEGMENTS: [usize; 2] = [48, 40];

/// Build the default geometry for a shape.
pub fn primitive(shape: Shape) -> TriangleBuffer {
    match shape {
        Shape::Box => unit_box(BOX_SEGMENTS),
        Shape::Sphere => sphere(0.5, SPHERE_SEGMENTS[0], SPHERE_SEGMENTS[1]),
        Shape::Cylinder => open_cylinder(0.5, 1.0, CYLINDER_SEGMENTS[0], CYLINDER_SEGMENTS[1]),
    }
}

#[derive(Default)]
struct IndexedMesh {
    positions: Vec<f32>,
    uvs: Vec<f32>,
    indices: Vec<u32>,
}

impl IndexedMesh {
    fn vertex_count(&self) -> u32 {
        (self.positions.len() / 3) as u32
    }

    fn push_vertex(&mut self, p: [f32; 3], uv: [f32; 2]) {
        self.positions.extend_from_slice(&p);
        self.uvs.extend_from_slice(&uv);
    }

    /// Two triangles over a grid cell: (a, b, d) and (b, c, d)
    fn push_quad(&mut self, a: u32, b: u32, c: u32, d: u32) {
        self.indices.extend_from_slice(&[a, b, d, b, c, d]);
    }

    fn into_buffer(self) -> TriangleBuffer {
        TriangleBuffer::from_indexed(&self.positions, Some(&self.uvs), &self.indices)
    }
}

/// Axis-aligned unit cube centred at the origin.
pub fn unit_box(segments: [usize; 3]) -> TriangleBuffer {
    let [sx, sy, sz] = segments.map(|s| s.max(1));
    let mut mesh = IndexedMesh::default();

    // (u axis, v axis, w axis, u dir, v dir, width, height, depth, grid u, grid v)
    let faces = [
        (2, 1, 0, -1.0, -1.0, 1.0, 1.0, 1.0, sz, sy),
        (2, 1, 0, 1.0, -1.0, 1.0, 1.0, -1.0, sz, sy),
        (0, 2, 1, 1.0, 1.0, 1.0, 1.0, 1.0, sx, sz),
        (0, 2, 1, 1.0, -1.0, 1.0, 1.0, -1.0, sx, sz),
        (0, 1, 2, 1.0, -1.0, 1.0, 1.0, 1.0, sx, sy),
        (0, 1, 2, -1.0, -1.0, 1.0, 1.0, -1.0, sx, sy),
    ];

    for (u, v, w, udir, vdir, width, height, depth, grid_u, grid_v) in faces {
        let start = mesh.vertex_count();
        let seg_w = width / grid_u as f32;
        let seg_h = height / grid_v as f32;

        for iy in 0..=grid_v {
            let y = iy as f32 * seg_h - height / 2.0;
            for ix in 0..=grid_u {
                let x = ix as f32 * seg_w - width / 2.0;
                let mut p = [0.0; 3];
                p[u] = x * udir;
                p[v] = y * vdir;
                p[w] = depth / 2.0;
                mesh.push_vertex(p, [ix as f32 / grid_u as f32, 1.0 - iy as f32 / grid_v as f32]);
            }
        }

        let row = grid_u as u32 + 1;
        for iy in 0..grid_v as u32 {
            for ix in 0..grid_u as u32 {
                let a = start + ix + row * iy;
                let b = start + ix + row * (iy + 1);
                let c = start + ix + 1 + row * (iy + 1);
                let d = start + ix + 1 + row * iy;
                mesh.push_quad(a, b, c, d);
            }
        }
    }

    mesh.into_buffer()
}

/// UV sphere; the pole rows emit a single triangle per cell.
pub fn sphere(radius: f32, width_segments: usize, height_segments: usize) -> TriangleBuffer {
    let ws = width_segments.max(3);
    let hs = height_segments.max(2);
    let mut mesh = IndexedMesh::default();

    for iy in 0..=hs {
        let v = iy as f32 / hs as f32;
        let theta = v * PI;
        for ix in 0..=ws {
            let u = ix as f32 / ws as f32;
            let phi = u * 2.0 * PI;
            let p = [
                -radius * phi.cos() * theta.sin(),
                radius * theta.cos(),
                radius * phi.sin() * theta.sin(),
            ];
            mesh.push_vertex(p, [u, 1.0 - v]);
        }
    }

    let row = ws as u32 + 1;
    for iy in 0..hs as u32 {
        for ix in 0..ws as u32 {
            let a = iy * row + ix + 1;
            let b = iy * row + ix;
            let c = (iy + 1) * row + ix;
            let d = (iy + 1) * row + ix + 1;
            if iy != 0 {
                mesh.indices.extend_from_slice(&[a, b, d]);
            }
            if iy != hs as u32 - 1 {
                mesh.indices.extend_from_slice(&[b, c, d]);
            }
        }
    }

    mesh.into_buffer()
}

/// Cylinder along Y without end caps.
pub fn open_cylinder(radius: f32, height: f32, radial_segments: usize, height_segments: usize) -> TriangleBuffer {
    let rs = radial_segments.max(3);
    let hs = height_segments.max(1);
    let mut mesh = IndexedMesh::default();

    for iy in 0..=hs {
        let v = iy as f32 / hs as f32;
        for ix in 0..=rs {
            let u = ix as f32 / rs as f32;
            let theta = u * 2.0 * PI;
            let p = [radius * theta.sin(), -v * height + height / 2.0, radius * theta.cos()];
            mesh.push_vertex(p, [u, 1.0 - v]);
        }
    }

    let row = rs as u32 + 1;
    for iy in 0..hs as u32 {
        for ix in 0..rs as u32 {
            let a = iy * row + ix;
            let b = (iy + 1) * row + ix;
            let c = (iy + 1) * row + ix + 1;
            let d = iy * row + ix + 1;
            mesh.push_quad(a, b, c, d);
        }
    }

    mesh.into_buffer()
}
