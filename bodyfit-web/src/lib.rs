/// Bodyfit Web - WASM binding for browser hosts
///
/// The page owns fetching, decoding and drawing. It hands SuitSpec/Sim JSON
/// and fetched assets in, calls `tick` from `requestAnimationFrame`, and
/// reads per-part buffers and transforms back out for its renderer.
use bodyfit_core::playback::{MAX_SPEED, MIN_SPEED};
use bodyfit_core::status::frame_legend;
use bodyfit_core::{
    AssetKind, AssetReply, AssetRequest, Generation, PlaybackClock, Raster, RigConfig, Sim, SuitRig,
    SuitSpec,
};
use serde::Serialize;
use wasm_bindgen::prelude::*;

/// Per-tick elapsed clamp, matching the terminal viewer's default
const MAX_TICK_SEC: f64 = 0.05;

/// Browser-independent viewer state behind [`WebViewer`]
pub struct Viewer {
    rig: SuitRig,
    sim: Sim,
    clock: PlaybackClock,
    playing: bool,
    speed: f64,
}

#[derive(Serialize)]
struct CameraFrame {
    center: [f32; 3],
    radius: f32,
    distance: f32,
}

impl Viewer {
    pub fn new(config: RigConfig) -> Self {
        Self {
            rig: SuitRig::new(config),
            sim: Sim::default(),
            clock: PlaybackClock::new(),
            playing: true,
            speed: 1.0,
        }
    }

    /// Load a SuitSpec; returns the asset requests as a JSON array
    pub fn load_suitspec(&mut self, json: &str) -> Result<String, String> {
        let spec = SuitSpec::from_json(json).map_err(|e| format!("SuitSpec: {}", e))?;
        let requests = self.rig.load(&spec);
        self.show_current_frame();
        log(&format!("SuitSpec loaded: {} parts, {} assets requested", self.rig.len(), requests.len()));
        serde_json::to_string(&requests).map_err(|e| e.to_string())
    }

    pub fn load_sim(&mut self, json: &str) -> Result<(), String> {
        self.sim = Sim::from_json(json).map_err(|e| format!("Sim: {}", e))?;
        self.clock.reset();
        self.show_current_frame();
        Ok(())
    }

    fn show_current_frame(&mut self) {
        match self.sim.frames.get(self.clock.index()) {
            Some(frame) => self.rig.apply_frame(frame),
            None => self.rig.apply_front_layout(),
        }
    }

    fn request(generation: u32, part: &str, kind: AssetKind, path: &str) -> AssetRequest {
        AssetRequest {
            generation: Generation(generation),
            part: part.to_string(),
            kind,
            path: path.to_string(),
        }
    }

    fn accept(&mut self, reply: AssetReply) -> bool {
        let accepted = self.rig.accept(reply);
        if accepted && self.rig.status().is_complete() {
            log(&self.status());
        }
        accepted
    }

    pub fn provide_mesh(&mut self, generation: u32, part: &str, path: &str, text: &str) -> bool {
        let request = Self::request(generation, part, AssetKind::Mesh, path);
        self.accept(AssetReply::mesh(request, text))
    }

    pub fn provide_texture(
        &mut self,
        generation: u32,
        part: &str,
        path: &str,
        width: u32,
        height: u32,
        rgba: Vec<u8>,
    ) -> bool {
        let request = Self::request(generation, part, AssetKind::Texture, path);
        let reply = match Raster::from_rgba(width, height, rgba) {
            Ok(raster) => AssetReply::texture(request, raster),
            Err(err) => AssetReply::failed(request, err),
        };
        self.accept(reply)
    }

    /// Report a failed fetch; `kind` is `"mesh"` or `"texture"`
    pub fn provide_error(&mut self, generation: u32, part: &str, kind: &str, path: &str, message: &str) -> bool {
        let kind = match kind {
            "texture" => AssetKind::Texture,
            _ => AssetKind::Mesh,
        };
        let request = Self::request(generation, part, kind, path);
        self.accept(AssetReply::fetch_failed(request, message))
    }

    /// Advance playback; true when the pose changed
    pub fn tick(&mut self, elapsed_sec: f64) -> bool {
        if !self.playing {
            return false;
        }
        let steps = self.clock.advance(&self.sim.frames, elapsed_sec.min(MAX_TICK_SEC), self.speed);
        if steps > 0 {
            self.show_current_frame();
        }
        steps > 0
    }

    pub fn set_frame(&mut self, index: usize) {
        self.clock.seek(index, self.sim.frames.len());
        self.show_current_frame();
    }

    pub fn set_playing(&mut self, playing: bool) {
        self.playing = playing;
    }

    pub fn set_speed(&mut self, speed: f64) {
        if speed.is_finite() && speed > 0.0 {
            self.speed = speed.clamp(MIN_SPEED, MAX_SPEED);
        }
    }

    pub fn set_relief(&mut self, amplitude: f32) {
        self.rig.set_relief(amplitude);
    }

    pub fn set_textures(&mut self, enabled: bool) {
        self.rig.set_textures_enabled(enabled);
    }

    pub fn frame_index(&self) -> usize {
        self.clock.index()
    }

    pub fn part_names(&self) -> Vec<String> {
        self.rig.part_names().map(str::to_string).collect()
    }

    pub fn part_transform(&self, part: &str) -> Option<Vec<f32>> {
        let transform = self.rig.part(part)?.transform?;
        Some(transform.to_array().to_vec())
    }

    pub fn part_positions(&self, part: &str) -> Vec<f32> {
        self.rig.part(part).map(|p| p.geometry().positions.clone()).unwrap_or_default()
    }

    pub fn part_normals(&self, part: &str) -> Vec<f32> {
        self.rig.part(part).map(|p| p.geometry().normals.clone()).unwrap_or_default()
    }

    pub fn part_uvs(&self, part: &str) -> Vec<f32> {
        self.rig
            .part(part)
            .and_then(|p| p.geometry().uvs.clone())
            .unwrap_or_default()
    }

    pub fn part_color(&self, part: &str) -> u32 {
        self.rig.part(part).map_or(bodyfit_core::catalog::FALLBACK_COLOR, |p| p.color)
    }

    pub fn coverage(&self, part: &str) -> Option<String> {
        let report = self.rig.coverage(part)?;
        serde_json::to_string(&report).ok()
    }

    /// Camera placement that frames every visible part, as JSON
    pub fn camera_frame(&self) -> Option<String> {
        let sphere = self.rig.visible_bounds()?;
        let mut camera = bodyfit_core::Camera::default();
        let distance = camera.frame(&sphere);
        serde_json::to_string(&CameraFrame {
            center: [sphere.center.x, sphere.center.y, sphere.center.z],
            radius: sphere.radius,
            distance,
        })
        .ok()
    }

    pub fn status(&self) -> String {
        self.rig.status().summary(self.sim.frames.len(), "the loaded sim")
    }

    pub fn legend(&self) -> String {
        let index = self.clock.index();
        format!(
            "{}\n{}",
            frame_legend(index, self.sim.frames.len(), self.sim.equipped_at(index), self.speed),
            self.rig.legend()
        )
    }

    pub fn sim_summary(&self) -> String {
        serde_json::to_string(&self.sim.summary()).unwrap_or_default()
    }
}

impl Default for Viewer {
    fn default() -> Self {
        Self::new(RigConfig::default())
    }
}

#[cfg(target_arch = "wasm32")]
fn log(message: &str) {
    web_sys::console::log_1(&message.into());
}

#[cfg(not(target_arch = "wasm32"))]
fn log(_message: &str) {}

fn js_error(message: String) -> JsValue {
    JsValue::from_str(&message)
}

/// JavaScript-facing wrapper around [`Viewer`]
#[wasm_bindgen]
pub struct WebViewer {
    inner: Viewer,
}

#[wasm_bindgen]
impl WebViewer {
    #[wasm_bindgen(constructor)]
    pub fn new() -> WebViewer {
        WebViewer {
            inner: Viewer::default(),
        }
    }

    /// Returns the JSON array of `{generation, part, kind, path}` to fetch
    pub fn load_suitspec(&mut self, json: &str) -> Result<String, JsValue> {
        self.inner.load_suitspec(json).map_err(js_error)
    }

    pub fn load_sim(&mut self, json: &str) -> Result<(), JsValue> {
        self.inner.load_sim(json).map_err(js_error)
    }

    pub fn provide_mesh(&mut self, generation: u32, part: &str, path: &str, text: &str) -> bool {
        self.inner.provide_mesh(generation, part, path, text)
    }

    /// `rgba` is `ImageData.data` of the decoded texture
    pub fn provide_texture(
        &mut self,
        generation: u32,
        part: &str,
        path: &str,
        width: u32,
        height: u32,
        rgba: Vec<u8>,
    ) -> bool {
        self.inner.provide_texture(generation, part, path, width, height, rgba)
    }

    pub fn provide_error(&mut self, generation: u32, part: &str, kind: &str, path: &str, message: &str) -> bool {
        self.inner.provide_error(generation, part, kind, path, message)
    }

    pub fn tick(&mut self, elapsed_sec: f64) -> bool {
        self.inner.tick(elapsed_sec)
    }

    pub fn set_frame(&mut self, index: usize) {
        self.inner.set_frame(index);
    }

    pub fn set_playing(&mut self, playing: bool) {
        self.inner.set_playing(playing);
    }

    pub fn set_speed(&mut self, speed: f64) {
        self.inner.set_speed(speed);
    }

    pub fn set_relief(&mut self, amplitude: f32) {
        self.inner.set_relief(amplitude);
    }

    pub fn set_textures(&mut self, enabled: bool) {
        self.inner.set_textures(enabled);
    }

    pub fn frame_index(&self) -> usize {
        self.inner.frame_index()
    }

    /// JSON array of part names
    pub fn part_names(&self) -> String {
        serde_json::to_string(&self.inner.part_names()).unwrap_or_default()
    }

    /// `[px, py, pz, rz, sx, sy, sz]`, or undefined while hidden
    pub fn part_transform(&self, part: &str) -> Option<Vec<f32>> {
        self.inner.part_transform(part)
    }

    pub fn part_positions(&self, part: &str) -> Vec<f32> {
        self.inner.part_positions(part)
    }

    pub fn part_normals(&self, part: &str) -> Vec<f32> {
        self.inner.part_normals(part)
    }

    pub fn part_uvs(&self, part: &str) -> Vec<f32> {
        self.inner.part_uvs(part)
    }

    pub fn part_color(&self, part: &str) -> u32 {
        self.inner.part_color(part)
    }

    pub fn coverage(&self, part: &str) -> Option<String> {
        self.inner.coverage(part)
    }

    pub fn camera_frame(&self) -> Option<String> {
        self.inner.camera_frame()
    }

    pub fn status(&self) -> String {
        self.inner.status()
    }

    pub fn legend(&self) -> String {
        self.inner.legend()
    }

    pub fn sim_summary(&self) -> String {
        self.inner.sim_summary()
    }
}

impl Default for WebViewer {
    fn default() -> Self {
        Self::new()
    }
}
