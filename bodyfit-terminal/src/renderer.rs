/// ASCII rasterizer for terminal rendering
use bodyfit_core::{Camera, Triangle, TriangleBuffer};
use crossterm::{
    style::{Color, Print, ResetColor, SetForegroundColor},
    QueueableCommand,
};
use nalgebra::{Matrix4, Vector3};
use std::io::Write;

/// Character luminosity ramp for depth/shading (darkest to lightest)
const LUMINOSITY_RAMP: &[char] = &[' ', '.', ':', '-', '=', '+', '*', '#', '%', '@'];

/// Shading never drops below this so back-lit parts stay visible
const AMBIENT: f32 = 0.15;

#[derive(Debug, Clone, Copy, PartialEq)]
struct Cell {
    character: char,
    color: Option<Color>,
}

const EMPTY: Cell = Cell {
    character: ' ',
    color: None,
};

/// ASCII renderer that converts suit parts to colored terminal characters
pub struct AsciiRenderer {
    width: usize,
    height: usize,
    depth_buffer: Vec<f32>,
    cells: Vec<Cell>,
}

impl AsciiRenderer {
    pub fn new(width: usize, height: usize) -> Self {
        let size = width * height;
        Self {
            width,
            height,
            depth_buffer: vec![f32::INFINITY; size],
            cells: vec![EMPTY; size],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn resize(&mut self, width: usize, height: usize) {
        *self = Self::new(width, height);
    }

    pub fn clear(&mut self) {
        self.depth_buffer.fill(f32::INFINITY);
        self.cells.fill(EMPTY);
    }

    /// Rasterize one part; `color` is its flat 0xRRGGBB color
    pub fn render_part(&mut self, geometry: &TriangleBuffer, model_matrix: &Matrix4<f32>, camera: &Camera, color: u32) {
        let mvp = camera.view_projection() * model_matrix;
        let light_dir = (camera.position - camera.target).normalize();
        for triangle in geometry.triangles() {
            self.render_triangle(&triangle, model_matrix, &mvp, &light_dir, color);
        }
    }

    fn render_triangle(
        &mut self,
        triangle: &Triangle,
        model_matrix: &Matrix4<f32>,
        mvp: &Matrix4<f32>,
        light_dir: &Vector3<f32>,
        color: u32,
    ) {
        // Project vertices to screen space
        let mut screen_coords = [(0.0, 0.0, 0.0); 3];
        for (slot, corner) in screen_coords.iter_mut().zip(&triangle.corners) {
            match Camera::project_with(mvp, corner, self.width as u32, self.height as u32) {
                Some(coords) => *slot = coords,
                None => return, // Triangle is clipped
            }
        }

        // Shade by the world-space face normal; non-uniform scale needs the
        // corners transformed before the normal is taken
        let world = Triangle::new(
            model_matrix.transform_point(&triangle.corners[0]),
            model_matrix.transform_point(&triangle.corners[1]),
            model_matrix.transform_point(&triangle.corners[2]),
        );
        let normal = world.calculate_normal();
        let brightness = normal.dot(light_dir).abs().max(AMBIENT);

        // Map brightness to character
        let char_index = (brightness * (LUMINOSITY_RAMP.len() - 1) as f32) as usize;
        let char_index = char_index.clamp(1, LUMINOSITY_RAMP.len() - 1);
        let cell = Cell {
            character: LUMINOSITY_RAMP[char_index],
            color: Some(shade(color, brightness)),
        };

        self.rasterize_triangle(&screen_coords, cell);
    }

    fn rasterize_triangle(&mut self, coords: &[(f32, f32, f32); 3], cell: Cell) {
        let (v0, v1, v2) = (coords[0], coords[1], coords[2]);

        // Bounding box
        let min_x = v0.0.min(v1.0).min(v2.0).floor() as i32;
        let max_x = v0.0.max(v1.0).max(v2.0).ceil() as i32;
        let min_y = v0.1.min(v1.1).min(v2.1).floor() as i32;
        let max_y = v0.1.max(v1.1).max(v2.1).ceil() as i32;

        // Clip to screen bounds
        let min_x = min_x.max(0);
        let max_x = max_x.min(self.width as i32 - 1);
        let min_y = min_y.max(0);
        let max_y = max_y.min(self.height as i32 - 1);

        for y in min_y..=max_y {
            for x in min_x..=max_x {
                let px = x as f32 + 0.5;
                let py = y as f32 + 0.5;

                let Some((w0, w1, w2)) = barycentric((v0.0, v0.1), (v1.0, v1.1), (v2.0, v2.1), (px, py)) else {
                    continue;
                };
                if w0 < 0.0 || w1 < 0.0 || w2 < 0.0 {
                    continue;
                }

                let depth = w0 * v0.2 + w1 * v1.2 + w2 * v2.2;
                let idx = y as usize * self.width + x as usize;
                if depth < self.depth_buffer[idx] {
                    self.depth_buffer[idx] = depth;
                    self.cells[idx] = cell;
                }
            }
        }
    }

    /// Number of cells something was drawn into
    pub fn covered_cells(&self) -> usize {
        self.cells.iter().filter(|c| c.color.is_some()).count()
    }

    pub fn draw<W: Write>(&self, writer: &mut W) -> std::io::Result<()> {
        for y in 0..self.height {
            for x in 0..self.width {
                let cell = self.cells[y * self.width + x];
                if let Some(color) = cell.color {
                    writer.queue(SetForegroundColor(color))?;
                }
                writer.queue(Print(cell.character))?;
            }
            if y + 1 < self.height {
                writer.queue(Print("\r\n"))?;
            }
        }
        writer.queue(ResetColor)?;
        Ok(())
    }
}

/// Part color dimmed by `brightness`
fn shade(rgb: u32, brightness: f32) -> Color {
    let scale = |channel: u32| ((channel & 0xff) as f32 * brightness.clamp(0.0, 1.0)).round() as u8;
    Color::Rgb {
        r: scale(rgb >> 16),
        g: scale(rgb >> 8),
        b: scale(rgb),
    }
}

/// Calculate barycentric coordinates for a point in a triangle
fn barycentric(
    v0: (f32, f32),
    v1: (f32, f32),
    v2: (f32, f32),
    p: (f32, f32),
) -> Option<(f32, f32, f32)> {
    let denom = (v1.1 - v2.1) * (v0.0 - v2.0) + (v2.0 - v1.0) * (v0.1 - v2.1);

    if denom.abs() < 1e-6 {
        return None;
    }

    let w0 = ((v1.1 - v2.1) * (p.0 - v2.0) + (v2.0 - v1.0) * (p.1 - v2.1)) / denom;
    let w1 = ((v2.1 - v0.1) * (p.0 - v2.0) + (v0.0 - v2.0) * (p.1 - v2.1)) / denom;
    let w2 = 1.0 - w0 - w1;

    Some((w0, w1, w2))
}

#[cfg(test)]
mod tests {
    use super::*;
    use bodyfit_core::primitives::primitive;
    use bodyfit_core::Shape;

    #[test]
    fn test_barycentric_inside_and_degenerate() {
        let w = barycentric((0.0, 0.0), (4.0, 0.0), (0.0, 4.0), (1.0, 1.0)).unwrap();
        assert!(w.0 > 0.0 && w.1 > 0.0 && w.2 > 0.0);
        assert!(barycentric((0.0, 0.0), (1.0, 1.0), (2.0, 2.0), (1.0, 1.0)).is_none());
    }

    #[test]
    fn test_shade_scales_channels() {
        assert_eq!(shade(0xff8000, 1.0), Color::Rgb { r: 255, g: 128, b: 0 });
        assert_eq!(shade(0xff8000, 0.5), Color::Rgb { r: 128, g: 64, b: 0 });
    }

    #[test]
    fn test_render_box_covers_center() {
        let mut renderer = AsciiRenderer::new(40, 20);
        let camera = Camera::new(40, 20);
        renderer.render_part(&primitive(Shape::Box), &Matrix4::identity(), &camera, 0x4fa8ff);
        assert!(renderer.covered_cells() > 0);
        assert!(renderer.cells[10 * 40 + 20].color.is_some());

        renderer.clear();
        assert_eq!(renderer.covered_cells(), 0);
    }

    #[test]
    fn test_draw_emits_rows() {
        let renderer = AsciiRenderer::new(3, 2);
        let mut out = Vec::new();
        renderer.draw(&mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("   \r\n   "));
    }
}
