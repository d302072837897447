/// One drawable suit part and the geometry it owns
use crate::catalog::{PartVisualConfig, Shape};
use crate::error::{Result, SuitError};
use crate::geometry::TriangleBuffer;
use crate::raster::{Raster, SAMPLE_SIZE};
use crate::transform::PartTransform;

/// Where a part's current geometry came from
#[derive(Debug, Clone, PartialEq)]
pub enum GeometrySource {
    /// Decoded from a `mesh.v1` asset at this (normalized) path
    Asset(String),
    /// Procedural stand-in; used while loading and after a failed load
    Primitive(Shape),
}

/// A part instance: catalog config, geometry, optional texture and the
/// transform of the frame last applied.
///
/// The base geometry is fixed when the geometry is set and never mutated;
/// relief writes only to the live buffer and can always be undone from it.
#[derive(Debug, Clone)]
pub struct RenderablePart {
    pub name: String,
    pub config: PartVisualConfig,
    /// Flat color, 0xRRGGBB
    pub color: u32,
    /// `None` while the part is hidden
    pub transform: Option<PartTransform>,
    source: GeometrySource,
    base: TriangleBuffer,
    live: TriangleBuffer,
    texture_path: Option<String>,
    texture: Option<Raster>,
}

impl RenderablePart {
    pub fn new(
        name: impl Into<String>,
        config: PartVisualConfig,
        color: u32,
        geometry: TriangleBuffer,
        source: GeometrySource,
    ) -> Self {
        Self {
            name: name.into(),
            config,
            color,
            transform: None,
            source,
            live: geometry.clone(),
            base: geometry,
            texture_path: None,
            texture: None,
        }
    }

    pub fn with_texture_path(mut self, path: Option<String>) -> Self {
        self.texture_path = path;
        self
    }

    /// Replace the geometry; base and live both become `geometry`.
    pub fn set_geometry(&mut self, geometry: TriangleBuffer, source: GeometrySource) {
        self.live = geometry.clone();
        self.base = geometry;
        self.source = source;
    }

    pub fn source(&self) -> &GeometrySource {
        &self.source
    }

    /// Undisplaced geometry
    pub fn base(&self) -> &TriangleBuffer {
        &self.base
    }

    /// Geometry to draw
    pub fn geometry(&self) -> &TriangleBuffer {
        &self.live
    }

    /// Overwrite live positions and recompute live normals
    pub(crate) fn set_live_positions(&mut self, positions: Vec<f32>) {
        self.live.positions = positions;
        self.live.recompute_normals();
    }

    pub fn texture_path(&self) -> Option<&str> {
        self.texture_path.as_deref()
    }

    /// Texture resampled to the relief/coverage grid
    pub fn texture(&self) -> Option<&Raster> {
        self.texture.as_ref()
    }

    /// Attach a texture. Empty rasters are rejected and leave the part untextured.
    pub fn set_texture(&mut self, texture: &Raster) -> Result<()> {
        if texture.is_empty() {
            self.texture = None;
            return Err(SuitError::TextureDecode {
                reason: format!("texture is {}x{}", texture.width(), texture.height()),
            });
        }
        self.texture = Some(texture.resampled(SAMPLE_SIZE));
        Ok(())
    }

    pub fn clear_texture(&mut self) {
        self.texture = None;
    }

    pub fn is_visible(&self) -> bool {
        self.transform.is_some()
    }
}
