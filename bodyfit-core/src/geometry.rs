/// Non-indexed triangle buffers shared by the codec, relief and coverage passes
use nalgebra::{Point3, Vector3};

/// A triangle face defined by three corner positions
#[derive(Debug, Clone, Copy)]
pub struct Triangle {
    pub corners: [Point3<f32>; 3],
}

impl Triangle {
    pub fn new(a: Point3<f32>, b: Point3<f32>, c: Point3<f32>) -> Self {
        Self { corners: [a, b, c] }
    }

    /// Calculate the face normal from the triangle's corners.
    ///
    /// Degenerate triangles yield the zero vector.
    pub fn calculate_normal(&self) -> Vector3<f32> {
        let [a, b, c] = self.corners;
        let edge1 = b - a;
        let edge2 = c - a;
        let n = edge1.cross(&edge2);
        let len = n.norm();
        if len > 0.0 {
            n / len
        } else {
            Vector3::zeros()
        }
    }
}

/// A renderable triangle soup: one unshared vertex per triangle corner.
///
/// `positions` and `normals` hold three floats per corner, `uvs` two. The
/// buffer is never indexed, so per-corner attributes never alias across
/// triangles.
#[derive(Debug, Clone, PartialEq)]
pub struct TriangleBuffer {
    pub positions: Vec<f32>,
    pub normals: Vec<f32>,
    pub uvs: Option<Vec<f32>>,
}

impl TriangleBuffer {
    /// Build from per-corner attributes; normals are computed when absent
    /// or when their length does not match the positions.
    pub fn from_corners(positions: Vec<f32>, normals: Option<Vec<f32>>, uvs: Option<Vec<f32>>) -> Self {
        let normals = match normals {
            Some(n) if n.len() == positions.len() => n,
            _ => flat_normals(&positions),
        };
        Self {
            positions,
            normals,
            uvs,
        }
    }

    /// Expand indexed geometry into one vertex per triangle corner.
    ///
    /// Indices must already be validated against the vertex count. Normals
    /// are always recomputed after expansion.
    pub fn from_indexed(positions: &[f32], uvs: Option<&[f32]>, indices: &[u32]) -> Self {
        let mut expanded = Vec::with_capacity(indices.len() * 3);
        let mut expanded_uv = uvs.map(|_| Vec::with_capacity(indices.len() * 2));

        for &index in indices {
            let i = index as usize;
            expanded.extend_from_slice(&positions[i * 3..i * 3 + 3]);
            if let (Some(src), Some(dst)) = (uvs, expanded_uv.as_mut()) {
                dst.extend_from_slice(&src[i * 2..i * 2 + 2]);
            }
        }

        Self::from_corners(expanded, None, expanded_uv)
    }

    pub fn corner_count(&self) -> usize {
        self.positions.len() / 3
    }

    pub fn triangle_count(&self) -> usize {
        self.corner_count() / 3
    }

    pub fn triangle(&self, index: usize) -> Triangle {
        triangle_at(&self.positions, index)
    }

    pub fn triangles(&self) -> impl Iterator<Item = Triangle> + '_ {
        (0..self.triangle_count()).map(move |i| self.triangle(i))
    }

    /// Replace normals with flat per-triangle normals of the current positions
    pub fn recompute_normals(&mut self) {
        self.normals = flat_normals(&self.positions);
    }

    /// Axis-aligned bounds of the positions, `None` when empty
    #[cfg(test)]
    pub(crate) fn bounds(&self) -> Option<(Point3<f32>, Point3<f32>)> {
        bounds_of(self.positions.chunks_exact(3).map(|p| Point3::new(p[0], p[1], p[2])))
    }
}

pub(crate) fn triangle_at(positions: &[f32], index: usize) -> Triangle {
    let corner = |c: usize| {
        let o = (index * 3 + c) * 3;
        Point3::new(positions[o], positions[o + 1], positions[o + 2])
    };
    Triangle::new(corner(0), corner(1), corner(2))
}

/// Flat per-triangle normals for a non-indexed position buffer.
///
/// Corners left over after the last whole triangle get a zero normal.
pub fn flat_normals(positions: &[f32]) -> Vec<f32> {
    let mut normals = vec![0.0; positions.len()];
    let triangles = positions.len() / 9;
    for t in 0..triangles {
        let n = triangle_at(positions, t).calculate_normal();
        for c in 0..3 {
            let o = (t * 3 + c) * 3;
            normals[o] = n.x;
            normals[o + 1] = n.y;
            normals[o + 2] = n.z;
        }
    }
    normals
}

pub(crate) fn bounds_of(points: impl Iterator<Item = Point3<f32>>) -> Option<(Point3<f32>, Point3<f32>)> {
    points.fold(None, |acc, p| match acc {
        None => Some((p, p)),
        Some((lo, hi)) => Some((lo.inf(&p), hi.sup(&p))),
    })
}
