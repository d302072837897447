/// Status and legend lines shown next to the viewport
use serde::Serialize;

/// Why a part is drawn without its asset
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AssetFailure {
    pub part: String,
    pub path: String,
    pub reason: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<&'static str>,
}

impl std::fmt::Display for AssetFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {} ({})", self.part, self.reason, self.path)?;
        if let Some(hint) = self.hint {
            write!(f, " - {}", hint)?;
        }
        Ok(())
    }
}

/// Progress and failures of the current suit load
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LoadStatus {
    pub parts: usize,
    /// Requests not yet answered
    pub pending: usize,
    /// Parts left on their primitive because the mesh failed
    pub mesh_fallbacks: Vec<AssetFailure>,
    /// Parts left untextured because the texture failed
    pub texture_failures: Vec<AssetFailure>,
}

impl LoadStatus {
    pub fn is_complete(&self) -> bool {
        self.pending == 0
    }

    pub fn has_failures(&self) -> bool {
        !self.mesh_fallbacks.is_empty() || !self.texture_failures.is_empty()
    }

    /// Headline plus one line per failed asset.
    ///
    /// `sim_source` names the sequence in the "no frames" warning.
    pub fn summary(&self, frames: usize, sim_source: &str) -> String {
        let mut out = if frames > 0 {
            format!("Loaded. frames={}, parts={}", frames, self.parts)
        } else {
            format!("Loaded, but no frames found in {}", sim_source)
        };
        if self.pending > 0 {
            out.push_str(&format!(" (waiting for {} assets)", self.pending));
        }
        for failure in &self.mesh_fallbacks {
            out.push_str(&format!("\nmesh fallback: {}", failure));
        }
        for failure in &self.texture_failures {
            out.push_str(&format!("\ntexture missing: {}", failure));
        }
        out
    }
}

/// `Frame i/n | Equipped: YES/NO | Speed xS`; `index` is zero-based
pub fn frame_legend(index: usize, total: usize, equipped: bool, speed: f64) -> String {
    let frame = if total > 0 {
        format!("{}/{}", index + 1, total)
    } else {
        "0/0".to_string()
    };
    format!(
        "Frame {} | Equipped: {} | Speed x{:.2}",
        frame,
        if equipped { "YES" } else { "NO" },
        speed
    )
}

pub fn render_legend(textures_enabled: bool, relief_amplitude: f32) -> String {
    format!(
        "Textures: {} | Relief: {:.2}",
        if textures_enabled { "ON" } else { "OFF" },
        relief_amplitude
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_legends() {
        assert_eq!(frame_legend(0, 12, true, 1.0), "Frame 1/12 | Equipped: YES | Speed x1.00");
        assert_eq!(frame_legend(0, 0, false, 0.5), "Frame 0/0 | Equipped: NO | Speed x0.50");
        assert_eq!(render_legend(false, 0.05), "Textures: OFF | Relief: 0.05");
    }

    #[test]
    fn test_summary() {
        let mut status = LoadStatus {
            parts: 3,
            ..Default::default()
        };
        assert_eq!(status.summary(40, "sim.json"), "Loaded. frames=40, parts=3");
        assert_eq!(status.summary(0, "/s/sim.json"), "Loaded, but no frames found in /s/sim.json");

        status.mesh_fallbacks.push(AssetFailure {
            part: "helmet".into(),
            path: "/m/helmet.mesh.json".into(),
            reason: "asset not found".into(),
            hint: Some("check the path"),
        });
        let text = status.summary(40, "sim.json");
        assert_eq!(
            text.lines().nth(1),
            Some("mesh fallback: helmet: asset not found (/m/helmet.mesh.json) - check the path")
        );
        assert!(status.has_failures());
    }
}
