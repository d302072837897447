/// The assembled suit: one [`RenderablePart`] per enabled SuitSpec module.
///
/// A [`SuitRig`] is driven from a single thread. `load` swaps in a new part
/// set (primitives first) and hands back the asset requests to fetch;
/// `accept` folds each reply in as it arrives. Mesh and texture failures are
/// absorbed here: the part keeps its primitive or stays untextured and the
/// reason is recorded in [`LoadStatus`].
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::cache::GeometryCache;
use crate::catalog::PartCatalog;
use crate::codec;
use crate::coverage::{self, CoverageReport};
use crate::error::{Result, SuitError};
use crate::geometry::TriangleBuffer;
use crate::loader::{AssetKind, AssetPayload, AssetReply, AssetRequest, Generation};
use crate::part::{GeometrySource, RenderablePart};
use crate::primitives::primitive;
use crate::projection::BoundingSphere;
use crate::raster::Raster;
use crate::relief;
use crate::sim::SimFrame;
use crate::status::{render_legend, AssetFailure, LoadStatus};
use crate::suitspec::{normalize_path, SuitSpec, DEFAULT_MESH_DIR};

/// Relief amplitude the viewer starts with
pub const DEFAULT_RELIEF: f32 = 0.05;

/// Tunables for a rig
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RigConfig {
    pub relief_amplitude: f32,
    pub textures_enabled: bool,
    /// Where `<part>.mesh.json` lives when a module names no mesh asset
    pub mesh_dir: String,
}

impl Default for RigConfig {
    fn default() -> Self {
        Self {
            relief_amplitude: DEFAULT_RELIEF,
            textures_enabled: true,
            mesh_dir: DEFAULT_MESH_DIR.to_string(),
        }
    }
}

pub struct SuitRig {
    config: RigConfig,
    catalog: &'static PartCatalog,
    cache: GeometryCache,
    generation: Generation,
    parts: BTreeMap<String, RenderablePart>,
    status: LoadStatus,
}

impl SuitRig {
    pub fn new(config: RigConfig) -> Self {
        Self::with_catalog(config, PartCatalog::builtin())
    }

    pub fn with_catalog(config: RigConfig, catalog: &'static PartCatalog) -> Self {
        let mut config = config;
        config.relief_amplitude = sanitize_amplitude(config.relief_amplitude);
        Self {
            config,
            catalog,
            cache: GeometryCache::new(),
            generation: Generation::default(),
            parts: BTreeMap::new(),
            status: LoadStatus::default(),
        }
    }

    /// Replace the current parts with those enabled in `spec`.
    ///
    /// Every part starts on its primitive (or a cached mesh) and hidden.
    /// The returned requests are stamped with a fresh generation; replies
    /// to any earlier load are ignored from now on.
    pub fn load(&mut self, spec: &SuitSpec) -> Vec<AssetRequest> {
        self.generation = self.generation.next();
        self.parts.clear();
        self.status = LoadStatus::default();

        let mut requests = Vec::new();
        for (name, module) in spec.enabled_modules() {
            let entry = self.catalog.entry(name);
            let shape = entry.visual.shape;
            let mesh_path = normalize_path(&module.mesh_asset_path(name, &self.config.mesh_dir));

            let (geometry, source) = match self.cache.get(&mesh_path) {
                Some(cached) => {
                    debug!(part = name, path = %mesh_path, "mesh cache hit");
                    (cached, GeometrySource::Asset(mesh_path.clone()))
                }
                None => {
                    requests.push(self.request(name, AssetKind::Mesh, mesh_path));
                    (primitive(shape), GeometrySource::Primitive(shape))
                }
            };

            let texture_path = module.texture().map(normalize_path);
            if let Some(path) = &texture_path {
                requests.push(self.request(name, AssetKind::Texture, path.clone()));
            }

            let part = RenderablePart::new(name, entry.visual.clone(), entry.color, geometry, source)
                .with_texture_path(texture_path);
            self.parts.insert(name.to_string(), part);
        }

        self.status.parts = self.parts.len();
        self.status.pending = requests.len();
        info!(
            generation = self.generation.0,
            parts = self.parts.len(),
            requests = requests.len(),
            "suit load started"
        );
        requests
    }

    fn request(&self, part: &str, kind: AssetKind, path: String) -> AssetRequest {
        AssetRequest {
            generation: self.generation,
            part: part.to_string(),
            kind,
            path,
        }
    }

    /// Fold one asset reply into the rig.
    ///
    /// Returns `false` for replies belonging to an earlier load or to a part
    /// that no longer exists. Failures never escape: they downgrade the part
    /// and land in [`SuitRig::status`].
    pub fn accept(&mut self, reply: AssetReply) -> bool {
        let AssetReply { request, result } = reply;
        if request.generation != self.generation {
            debug!(
                part = %request.part,
                stale = request.generation.0,
                current = self.generation.0,
                "dropping stale asset reply"
            );
            return false;
        }
        if !self.parts.contains_key(&request.part) {
            debug!(part = %request.part, "reply for unknown part");
            return false;
        }
        self.status.pending = self.status.pending.saturating_sub(1);

        match request.kind {
            AssetKind::Mesh => {
                let decoded = result.and_then(|payload| match payload {
                    AssetPayload::Mesh(text) => codec::decode_json(&text),
                    AssetPayload::Texture(_) => Err(SuitError::invalid_geometry("expected mesh JSON, got an image")),
                });
                match decoded {
                    Ok(geometry) => self.install_mesh(&request, geometry),
                    Err(err) => self.mesh_fallback(&request, err),
                }
            }
            AssetKind::Texture => {
                let outcome = result.and_then(|payload| match payload {
                    AssetPayload::Texture(raster) => self.install_texture(&request.part, &raster),
                    AssetPayload::Mesh(_) => Err(SuitError::TextureDecode {
                        reason: "expected an image, got mesh JSON".to_string(),
                    }),
                });
                if let Err(err) = outcome {
                    self.texture_failure(&request, err);
                }
            }
        }
        true
    }

    fn install_mesh(&mut self, request: &AssetRequest, geometry: TriangleBuffer) {
        self.cache.insert(&request.path, geometry.clone());
        let textures_enabled = self.config.textures_enabled;
        let amplitude = self.config.relief_amplitude;
        if let Some(part) = self.parts.get_mut(&request.part) {
            part.set_geometry(geometry, GeometrySource::Asset(request.path.clone()));
            if textures_enabled {
                relief::apply(part, amplitude);
            }
            debug!(part = %request.part, corners = part.geometry().corner_count(), "mesh installed");
        }
    }

    fn install_texture(&mut self, part_name: &str, raster: &Raster) -> Result<()> {
        let textures_enabled = self.config.textures_enabled;
        let amplitude = self.config.relief_amplitude;
        let Some(part) = self.parts.get_mut(part_name) else {
            return Ok(());
        };
        part.set_texture(raster)?;
        if textures_enabled {
            relief::apply(part, amplitude);
        }
        Ok(())
    }

    fn mesh_fallback(&mut self, request: &AssetRequest, err: SuitError) {
        let Some(part) = self.parts.get_mut(&request.part) else {
            return;
        };
        let shape = part.config.shape;
        warn!(part = %request.part, path = %request.path, error = %err, "mesh load failed, using {:?} primitive", shape);
        part.set_geometry(primitive(shape), GeometrySource::Primitive(shape));
        if self.config.textures_enabled {
            relief::apply(part, self.config.relief_amplitude);
        }
        self.status.mesh_fallbacks.push(failure(request, &err));
    }

    fn texture_failure(&mut self, request: &AssetRequest, err: SuitError) {
        warn!(part = %request.part, path = %request.path, error = %err, "texture load failed");
        if let Some(part) = self.parts.get_mut(&request.part) {
            part.clear_texture();
            relief::restore(part);
        }
        self.status.texture_failures.push(failure(request, &err));
    }

    /// Position every part for `frame`; parts whose segment is missing hide
    pub fn apply_frame(&mut self, frame: &SimFrame) {
        for part in self.parts.values_mut() {
            part.transform = crate::transform::resolve(&part.config, &frame.segments);
        }
    }

    /// Place every part on the static front-view layout
    pub fn apply_front_layout(&mut self) {
        for part in self.parts.values_mut() {
            part.transform = Some(self.catalog.front_transform(&part.name));
        }
    }

    /// Change the relief amplitude and re-run relief on textured parts
    pub fn set_relief(&mut self, amplitude: f32) {
        self.config.relief_amplitude = sanitize_amplitude(amplitude);
        if self.config.textures_enabled {
            self.reapply_relief();
        }
    }

    /// Turning textures off restores every part to its base geometry
    pub fn set_textures_enabled(&mut self, enabled: bool) {
        self.config.textures_enabled = enabled;
        if enabled {
            self.reapply_relief();
        } else {
            for part in self.parts.values_mut() {
                relief::restore(part);
            }
        }
    }

    fn reapply_relief(&mut self) {
        let amplitude = self.config.relief_amplitude;
        for part in self.parts.values_mut().filter(|p| p.texture().is_some()) {
            relief::apply(part, amplitude);
        }
    }

    /// UV/texture fit of one part, `None` for unknown parts
    pub fn coverage(&self, part: &str) -> Option<CoverageReport> {
        let part = self.parts.get(part)?;
        let uvs = part.base().uvs.as_deref();
        Some(coverage::analyze(uvs, None, part.texture()))
    }

    /// Bounding sphere of every visible part in world space
    pub fn visible_bounds(&self) -> Option<BoundingSphere> {
        let points = self.parts.values().filter_map(|part| {
            let model = part.transform?.model_matrix();
            Some(
                part.geometry()
                    .positions
                    .chunks_exact(3)
                    .map(move |c| model.transform_point(&nalgebra::Point3::new(c[0], c[1], c[2]))),
            )
        });
        BoundingSphere::enclosing(points.flatten())
    }

    pub fn legend(&self) -> String {
        render_legend(self.config.textures_enabled, self.config.relief_amplitude)
    }

    pub fn config(&self) -> &RigConfig {
        &self.config
    }

    pub fn generation(&self) -> Generation {
        self.generation
    }

    pub fn status(&self) -> &LoadStatus {
        &self.status
    }

    pub fn cache(&self) -> &GeometryCache {
        &self.cache
    }

    pub fn part(&self, name: &str) -> Option<&RenderablePart> {
        self.parts.get(name)
    }

    /// Parts in name order
    pub fn parts(&self) -> impl Iterator<Item = &RenderablePart> {
        self.parts.values()
    }

    pub fn part_names(&self) -> impl Iterator<Item = &str> {
        self.parts.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.parts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }
}

impl Default for SuitRig {
    fn default() -> Self {
        Self::new(RigConfig::default())
    }
}

fn sanitize_amplitude(amplitude: f32) -> f32 {
    if amplitude.is_finite() {
        amplitude.max(0.0)
    } else {
        0.0
    }
}

fn failure(request: &AssetRequest, err: &SuitError) -> AssetFailure {
    AssetFailure {
        part: request.part.clone(),
        path: request.path.clone(),
        reason: err.to_string(),
        hint: err.hint(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Shape;
    use crate::raster::Raster;
    use crate::sim::{SegmentMap, SegmentTransform};
    use image::{Rgba, RgbaImage};

    const TRIANGLE_MESH: &str = r#"{
        "format": "mesh.v1",
        "positions": [0,0,0, 1,0,0, 0,1,0],
        "uv": [0,0, 1,0, 0,1]
    }"#;

    fn spec() -> SuitSpec {
        SuitSpec::from_json(
            r#"{"modules": {
                "helmet": {"enabled": true, "texture_path": "./tex/helmet.png"},
                "chest": {"enabled": true, "asset_ref": "meshes/chest_v2.mesh.json"},
                "cape": {"enabled": true},
                "waist": {"enabled": false}
            }}"#,
        )
        .unwrap()
    }

    fn find<'a>(requests: &'a [AssetRequest], part: &str, kind: AssetKind) -> &'a AssetRequest {
        requests
            .iter()
            .find(|r| r.part == part && r.kind == kind)
            .unwrap()
    }

    fn stripes() -> Raster {
        let mut img = RgbaImage::from_pixel(32, 32, Rgba([240, 240, 240, 255]));
        for y in (0..32).step_by(4) {
            for x in 0..32 {
                img.put_pixel(x, y, Rgba([10, 10, 10, 255]));
            }
        }
        Raster::new(img)
    }

    #[test]
    fn test_load_emits_requests_and_placeholders() {
        let mut rig = SuitRig::default();
        let requests = rig.load(&spec());

        assert_eq!(rig.part_names().collect::<Vec<_>>(), ["cape", "chest", "helmet"]);
        assert_eq!(requests.len(), 4);
        assert_eq!(find(&requests, "chest", AssetKind::Mesh).path, "/meshes/chest_v2.mesh.json");
        assert_eq!(
            find(&requests, "helmet", AssetKind::Mesh).path,
            "/viewer/assets/meshes/helmet.mesh.json"
        );
        assert_eq!(find(&requests, "helmet", AssetKind::Texture).path, "/tex/helmet.png");
        assert!(requests.iter().all(|r| r.generation == rig.generation()));

        let helmet = rig.part("helmet").unwrap();
        assert_eq!(helmet.source(), &GeometrySource::Primitive(Shape::Sphere));
        assert!(!helmet.is_visible());
        // Unknown part gets the fallback look
        assert_eq!(rig.part("cape").unwrap().color, crate::catalog::FALLBACK_COLOR);
        assert_eq!(rig.status().pending, 4);
    }

    #[test]
    fn test_mesh_reply_installs_and_caches() {
        let mut rig = SuitRig::default();
        let requests = rig.load(&spec());
        let req = find(&requests, "chest", AssetKind::Mesh).clone();

        assert!(rig.accept(AssetReply::mesh(req, TRIANGLE_MESH)));
        let chest = rig.part("chest").unwrap();
        assert_eq!(chest.geometry().corner_count(), 3);
        assert_eq!(chest.source(), &GeometrySource::Asset("/meshes/chest_v2.mesh.json".into()));
        assert!(rig.cache().contains("/meshes/chest_v2.mesh.json"));

        // A second load finds the mesh in the cache and does not ask again
        let again = rig.load(&spec());
        assert!(!again.iter().any(|r| r.part == "chest" && r.kind == AssetKind::Mesh));
        assert_eq!(rig.part("chest").unwrap().geometry().corner_count(), 3);
    }

    #[test]
    fn test_stale_reply_dropped() {
        let mut rig = SuitRig::default();
        let old = rig.load(&spec());
        let _new = rig.load(&spec());
        let req = find(&old, "chest", AssetKind::Mesh).clone();

        assert!(!rig.accept(AssetReply::mesh(req, TRIANGLE_MESH)));
        assert!(rig.cache().is_empty());
        assert_eq!(
            rig.part("chest").unwrap().source(),
            &GeometrySource::Primitive(Shape::Box)
        );
    }

    #[test]
    fn test_bad_mesh_falls_back_to_primitive() {
        let mut rig = SuitRig::default();
        let requests = rig.load(&spec());
        let req = find(&requests, "helmet", AssetKind::Mesh).clone();

        assert!(rig.accept(AssetReply::mesh(req, r#"{"format": "mesh.v1"}"#)));
        let helmet = rig.part("helmet").unwrap();
        assert_eq!(helmet.source(), &GeometrySource::Primitive(Shape::Sphere));
        assert_eq!(rig.status().mesh_fallbacks.len(), 1);
        assert_eq!(rig.status().mesh_fallbacks[0].part, "helmet");
    }

    #[test]
    fn test_fetch_failure_recorded_with_hint() {
        let mut rig = SuitRig::default();
        let requests = rig.load(&spec());
        let req = find(&requests, "cape", AssetKind::Mesh).clone();

        assert!(rig.accept(AssetReply::fetch_failed(req, "HTTP 404")));
        let failure = &rig.status().mesh_fallbacks[0];
        assert!(failure.hint.is_some());
        assert_eq!(rig.status().pending, 3);
    }

    #[test]
    fn test_texture_applies_relief_and_toggle_restores() {
        let mut rig = SuitRig::default();
        let requests = rig.load(&spec());
        let req = find(&requests, "helmet", AssetKind::Texture).clone();

        assert!(rig.accept(AssetReply::texture(req, stripes())));
        let helmet = rig.part("helmet").unwrap();
        assert!(helmet.texture().is_some());
        assert_ne!(helmet.geometry().positions, helmet.base().positions);

        rig.set_textures_enabled(false);
        let helmet = rig.part("helmet").unwrap();
        assert_eq!(helmet.geometry().positions, helmet.base().positions);

        rig.set_textures_enabled(true);
        let displaced = rig.part("helmet").unwrap().geometry().clone();
        rig.set_relief(0.0);
        let helmet = rig.part("helmet").unwrap();
        assert_eq!(helmet.geometry().positions, helmet.base().positions);
        rig.set_relief(DEFAULT_RELIEF);
        assert_eq!(rig.part("helmet").unwrap().geometry(), &displaced);
    }

    #[test]
    fn test_texture_failure_leaves_part_untextured() {
        let mut rig = SuitRig::default();
        let requests = rig.load(&spec());
        let req = find(&requests, "helmet", AssetKind::Texture).clone();

        assert!(rig.accept(AssetReply::texture(req, Raster::solid(0, 0, [0, 0, 0]))));
        assert!(rig.part("helmet").unwrap().texture().is_none());
        assert_eq!(rig.status().texture_failures.len(), 1);
        assert!(rig.status().mesh_fallbacks.is_empty());
    }

    #[test]
    fn test_apply_frame_hides_parts_without_segment() {
        let mut rig = SuitRig::default();
        rig.load(&spec());

        let frame_with = |name: &str| {
            let mut segments = SegmentMap::new();
            segments.insert(name.to_string(), SegmentTransform::default());
            SimFrame {
                segments,
                ..Default::default()
            }
        };

        rig.apply_frame(&frame_with("chest_core"));
        assert!(rig.parts().all(RenderablePart::is_visible));
        assert!(rig.visible_bounds().is_some());

        rig.apply_frame(&frame_with("left_shin"));
        assert!(rig.parts().all(|p| !p.is_visible()));
        assert!(rig.visible_bounds().is_none());
    }

    #[test]
    fn test_front_layout_shows_everything() {
        let mut rig = SuitRig::default();
        rig.load(&spec());
        rig.apply_front_layout();
        assert!(rig.parts().all(RenderablePart::is_visible));
        let bounds = rig.visible_bounds().unwrap();
        assert!(bounds.radius > 0.0);
    }

    #[test]
    fn test_coverage_and_legend() {
        let mut rig = SuitRig::default();
        let requests = rig.load(&spec());
        assert!(rig.coverage("nope").is_none());

        let untextured = rig.coverage("chest").unwrap();
        assert_eq!(untextured.fill_ratio, 0.0);

        let req = find(&requests, "helmet", AssetKind::Texture).clone();
        rig.accept(AssetReply::texture(req, Raster::solid(8, 8, [90, 20, 20])));
        let report = rig.coverage("helmet").unwrap();
        assert_eq!(report.fill_ratio, 1.0);

        assert_eq!(rig.legend(), "Textures: ON | Relief: 0.05");
        rig.set_relief(f32::NAN);
        assert_eq!(rig.config().relief_amplitude, 0.0);
    }
}
