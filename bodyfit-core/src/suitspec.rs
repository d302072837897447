/// SuitSpec documents and asset path handling
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Directory holding per-part `*.mesh.json` files when a module has no explicit asset
pub const DEFAULT_MESH_DIR: &str = "viewer/assets/meshes";

const MESH_SUFFIX: &str = ".mesh.json";

/// One module entry of a SuitSpec
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModuleSpec {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub asset_ref: Option<String>,
    #[serde(default)]
    pub texture_path: Option<String>,
}

/// Which suit parts are enabled, and where their assets live
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SuitSpec {
    #[serde(default)]
    pub modules: BTreeMap<String, ModuleSpec>,
}

impl SuitSpec {
    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Enabled modules in part-name order
    pub fn enabled_modules(&self) -> impl Iterator<Item = (&str, &ModuleSpec)> {
        self.modules
            .iter()
            .filter(|(_, module)| module.enabled)
            .map(|(name, module)| (name.as_str(), module))
    }
}

impl ModuleSpec {
    /// Mesh asset path for this module.
    ///
    /// An `asset_ref` ending in `.mesh.json` wins; anything else falls back to
    /// `<mesh_dir>/<part>.mesh.json`.
    pub fn mesh_asset_path(&self, part: &str, mesh_dir: &str) -> String {
        let reference = self
            .asset_ref
            .as_deref()
            .unwrap_or("")
            .replace('\\', "/");
        let reference = reference.trim();
        if reference.to_lowercase().ends_with(MESH_SUFFIX) {
            return reference.to_string();
        }
        format!("{}/{}{}", mesh_dir.trim_end_matches('/'), part, MESH_SUFFIX)
    }

    pub fn texture(&self) -> Option<&str> {
        self.texture_path
            .as_deref()
            .map(str::trim)
            .filter(|p| !p.is_empty())
    }
}

/// Normalize an asset path into the key used for fetching and caching.
///
/// URLs and rooted paths pass through; relative paths lose a leading `./`
/// and gain a leading `/`.
pub fn normalize_path(path: &str) -> String {
    let p = path.replace('\\', "/");
    let p = p.trim();
    if p.is_empty() {
        return String::new();
    }
    let lower = p.to_ascii_lowercase();
    if lower.starts_with("http://") || lower.starts_with("https://") || p.starts_with('/') {
        return p.to_string();
    }
    let p = p.strip_prefix("./").unwrap_or(p);
    format!("/{}", p)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enabled_modules_in_name_order() {
        let spec = SuitSpec::from_json(
            r#"{"modules": {
                "waist": {"enabled": true},
                "chest": {"enabled": true, "texture_path": "tex/chest.png"},
                "helmet": {"enabled": false}
            }}"#,
        )
        .unwrap();
        let names: Vec<_> = spec.enabled_modules().map(|(n, _)| n).collect();
        assert_eq!(names, ["chest", "waist"]);
        assert_eq!(spec.modules["chest"].texture(), Some("tex/chest.png"));
        assert_eq!(spec.modules["waist"].texture(), None);
    }

    #[test]
    fn test_mesh_asset_path() {
        let explicit = ModuleSpec {
            enabled: true,
            asset_ref: Some(" assets\\Chest.MESH.JSON ".into()),
            texture_path: None,
        };
        assert_eq!(explicit.mesh_asset_path("chest", DEFAULT_MESH_DIR), "assets/Chest.MESH.JSON");

        let other = ModuleSpec {
            enabled: true,
            asset_ref: Some("models/chest.glb".into()),
            texture_path: None,
        };
        assert_eq!(
            other.mesh_asset_path("chest", DEFAULT_MESH_DIR),
            "viewer/assets/meshes/chest.mesh.json"
        );
        assert_eq!(ModuleSpec::default().mesh_asset_path("waist", "meshes/"), "meshes/waist.mesh.json");
    }

    #[test]
    fn test_normalize_path() {
        assert_eq!(normalize_path("./sessions/body-sim.json"), "/sessions/body-sim.json");
        assert_eq!(normalize_path("examples\\suitspec.json"), "/examples/suitspec.json");
        assert_eq!(normalize_path("/abs/x.json"), "/abs/x.json");
        assert_eq!(normalize_path("HTTPS://host/x.json"), "HTTPS://host/x.json");
        assert_eq!(normalize_path("   "), "");
    }
}
