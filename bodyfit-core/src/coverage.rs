/// UV and texture coverage diagnostics.
///
/// The fit score compares how much of the UV unit square a mesh claims with
/// how much of its texture is painted. It is a rough heuristic for spotting
/// textures that were authored for a different unwrap, not a correctness
/// check: a perfectly valid mesh/texture pair can score low.
use serde::Serialize;

use crate::raster::{Raster, SAMPLE_SIZE};

/// Pixels brighter than this (mean of RGB) count as background...
pub const INK_LUMINANCE: f32 = 245.0;
/// ...unless their channel spread exceeds this.
pub const INK_SATURATION: u8 = 22;
/// Fit scores below this are flagged
pub const POOR_FIT: f32 = 0.7;

/// Coverage numbers for one part
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct CoverageReport {
    pub uv_area_ratio: f32,
    pub fill_ratio: f32,
    pub border_fill_ratio: f32,
    pub fit_score: f32,
}

impl CoverageReport {
    pub fn is_poor_fit(&self) -> bool {
        self.fit_score < POOR_FIT
    }
}

impl std::fmt::Display for CoverageReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "UV {:.1}% | fill {:.1}% | border {:.1}% | fit {:.1}%",
            self.uv_area_ratio * 100.0,
            self.fill_ratio * 100.0,
            self.border_fill_ratio * 100.0,
            self.fit_score * 100.0
        )
    }
}

/// Run the full analysis for a uv buffer and an optional texture
pub fn analyze(uvs: Option<&[f32]>, indices: Option<&[u32]>, texture: Option<&Raster>) -> CoverageReport {
    let uv_area_ratio = uv_area_ratio(uvs, indices);
    let (fill_ratio, border_fill_ratio) = texture.map_or((0.0, 0.0), texture_fill);
    CoverageReport {
        uv_area_ratio,
        fill_ratio,
        border_fill_ratio,
        fit_score: fit_score(fill_ratio, uv_area_ratio),
    }
}

/// Summed UV triangle area, clamped to [0, 1].
///
/// Without `indices` consecutive corner triples form the triangles.
/// Fewer than three uv corners yield 0.
pub fn uv_area_ratio(uvs: Option<&[f32]>, indices: Option<&[u32]>) -> f32 {
    let Some(uvs) = uvs else { return 0.0 };
    let corners = uvs.len() / 2;
    if corners < 3 {
        return 0.0;
    }

    let corner = |i: usize| (uvs[i * 2] as f64, uvs[i * 2 + 1] as f64);
    let area = |a: usize, b: usize, c: usize| {
        let (ax, ay) = corner(a);
        let (bx, by) = corner(b);
        let (cx, cy) = corner(c);
        ((ax * (by - cy) + bx * (cy - ay) + cx * (ay - by)) * 0.5).abs()
    };

    let total: f64 = match indices {
        Some(indices) => indices
            .chunks_exact(3)
            .filter(|tri| tri.iter().all(|&i| (i as usize) < corners))
            .map(|tri| area(tri[0] as usize, tri[1] as usize, tri[2] as usize))
            .sum(),
        None => (0..corners / 3).map(|t| area(t * 3, t * 3 + 1, t * 3 + 2)).sum(),
    };

    (total as f32).clamp(0.0, 1.0)
}

/// Whether a pixel carries painted content
pub fn is_ink([r, g, b]: [u8; 3]) -> bool {
    let lum = (r as f32 + g as f32 + b as f32) / 3.0;
    let sat = r.max(g).max(b) - r.min(g).min(b);
    lum < INK_LUMINANCE || sat > INK_SATURATION
}

/// Width in pixels of the border band for a square raster of `size`
pub fn border_width(size: u32) -> u32 {
    ((size as f32 * 0.04).floor() as u32).max(2)
}

/// (fill ratio, border fill ratio) over the 256x256 resample of `texture`
pub fn texture_fill(texture: &Raster) -> (f32, f32) {
    if texture.is_empty() {
        return (0.0, 0.0);
    }
    let sampled = texture.resampled(SAMPLE_SIZE);
    let size = SAMPLE_SIZE;
    let edge = border_width(size);

    let mut ink = 0u32;
    let mut border_ink = 0u32;
    let mut border_total = 0u32;

    for y in 0..size {
        for x in 0..size {
            let painted = is_ink(sampled.rgb(x, y));
            if painted {
                ink += 1;
            }
            let on_border = x < edge || x >= size - edge || y < edge || y >= size - edge;
            if on_border {
                border_total += 1;
                if painted {
                    border_ink += 1;
                }
            }
        }
    }

    let fill = ink as f32 / (size * size) as f32;
    let border = if border_total > 0 {
        border_ink as f32 / border_total as f32
    } else {
        0.0
    };
    (fill, border)
}

pub fn fit_score(fill_ratio: f32, uv_area_ratio: f32) -> f32 {
    (1.0 - (fill_ratio - uv_area_ratio).abs()).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use image::{Rgba, RgbaImage};

    const FULL_SQUARE: [f32; 12] = [0.0, 0.0, 1.0, 0.0, 1.0, 1.0, 0.0, 0.0, 1.0, 1.0, 0.0, 1.0];

    #[test]
    fn test_full_square_claims_all_uv_space() {
        assert_relative_eq!(uv_area_ratio(Some(&FULL_SQUARE), None), 1.0);
    }

    #[test]
    fn test_overlapping_charts_clamp_to_one() {
        let doubled: Vec<f32> = FULL_SQUARE.iter().chain(FULL_SQUARE.iter()).copied().collect();
        assert_eq!(uv_area_ratio(Some(&doubled), None), 1.0);
    }

    #[test]
    fn test_degenerate_and_missing_uvs() {
        let line = [0.0, 0.0, 0.5, 0.5, 1.0, 1.0];
        assert_eq!(uv_area_ratio(Some(&line), None), 0.0);
        assert_eq!(uv_area_ratio(Some(&[0.0, 0.0, 1.0, 1.0]), None), 0.0);
        assert_eq!(uv_area_ratio(None, None), 0.0);
    }

    #[test]
    fn test_indexed_area() {
        let uvs = [0.0, 0.0, 0.5, 0.0, 0.5, 0.5, 0.0, 0.5];
        let ratio = uv_area_ratio(Some(&uvs), Some(&[0, 1, 2, 0, 2, 3]));
        assert_relative_eq!(ratio, 0.25);
        // Out-of-range triangles are skipped
        let ratio = uv_area_ratio(Some(&uvs), Some(&[0, 1, 2, 0, 2, 9]));
        assert_relative_eq!(ratio, 0.125);
    }

    #[test]
    fn test_uv_ratio_stays_in_unit_range() {
        let wild = [-5.0, -5.0, 9.0, -5.0, 9.0, 9.0, 0.2, 0.2, 0.2, 0.2, 0.2, 0.2];
        let ratio = uv_area_ratio(Some(&wild), None);
        assert!((0.0..=1.0).contains(&ratio));
    }

    #[test]
    fn test_ink_rule() {
        assert!(!is_ink([255, 255, 255]));
        assert!(!is_ink([250, 246, 248]));
        assert!(is_ink([244, 244, 244]));
        // Bright but saturated
        assert!(is_ink([255, 255, 200]));
        assert!(is_ink([0, 0, 0]));
    }

    #[test]
    fn test_border_width() {
        assert_eq!(border_width(256), 10);
        assert_eq!(border_width(16), 2);
    }

    #[test]
    fn test_no_texture() {
        let report = analyze(Some(&FULL_SQUARE), None, None);
        assert_eq!(report.fill_ratio, 0.0);
        assert_eq!(report.border_fill_ratio, 0.0);
        assert_relative_eq!(report.fit_score, 0.0);
        assert!(report.is_poor_fit());
    }

    #[test]
    fn test_painted_texture_matches_full_uv() {
        let texture = Raster::solid(64, 64, [30, 60, 200]);
        let report = analyze(Some(&FULL_SQUARE), None, Some(&texture));
        assert_relative_eq!(report.fill_ratio, 1.0);
        assert_relative_eq!(report.border_fill_ratio, 1.0);
        assert_relative_eq!(report.fit_score, 1.0);
        assert!(!report.is_poor_fit());
    }

    #[test]
    fn test_centered_content_leaves_border_clean() {
        let mut img = RgbaImage::from_pixel(SAMPLE_SIZE, SAMPLE_SIZE, Rgba([255, 255, 255, 255]));
        for y in 64..192 {
            for x in 64..192 {
                img.put_pixel(x, y, Rgba([20, 20, 20, 255]));
            }
        }
        let (fill, border) = texture_fill(&Raster::new(img));
        assert_relative_eq!(fill, 0.25);
        assert_eq!(border, 0.0);
    }

    #[test]
    fn test_edge_stripe_counts_toward_border() {
        let mut img = RgbaImage::from_pixel(SAMPLE_SIZE, SAMPLE_SIZE, Rgba([255, 255, 255, 255]));
        for y in 0..SAMPLE_SIZE {
            for x in 0..10 {
                img.put_pixel(x, y, Rgba([200, 0, 0, 255]));
            }
        }
        let (fill, border) = texture_fill(&Raster::new(img));
        assert_relative_eq!(fill, 10.0 / 256.0);
        // Border band: 256^2 - 236^2 pixels, of which the left strip is 10 * 256
        assert_relative_eq!(border, 2560.0 / (65536.0 - 55696.0));
    }

    #[test]
    fn test_report_display() {
        let report = CoverageReport {
            uv_area_ratio: 0.5,
            fill_ratio: 0.25,
            border_fill_ratio: 0.0,
            fit_score: 0.75,
        };
        assert_eq!(report.to_string(), "UV 50.0% | fill 25.0% | border 0.0% | fit 75.0%");
    }
}
