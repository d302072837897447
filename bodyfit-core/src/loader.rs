/// Asset requests and replies exchanged with the host.
///
/// The core never fetches anything. [`crate::rig::SuitRig::load`] returns the
/// requests a host must fulfil; the host answers each with an [`AssetReply`]
/// whenever the fetch finishes. Every load bumps the [`Generation`], so a
/// reply that arrives after the user has loaded another suit is recognised
/// and dropped.
use serde::Serialize;

use crate::error::SuitError;
use crate::raster::Raster;

/// Identifies one `load` call
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct Generation(pub u32);

impl Generation {
    pub fn next(self) -> Self {
        Generation(self.0.wrapping_add(1))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetKind {
    Mesh,
    Texture,
}

/// One fetch the host should perform
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AssetRequest {
    pub generation: Generation,
    pub part: String,
    pub kind: AssetKind,
    /// Normalized path
    pub path: String,
}

/// Fetched asset contents
#[derive(Debug, Clone)]
pub enum AssetPayload {
    /// `mesh.v1` JSON text
    Mesh(String),
    Texture(Raster),
}

/// The outcome of one [`AssetRequest`]
#[derive(Debug)]
pub struct AssetReply {
    pub request: AssetRequest,
    pub result: Result<AssetPayload, SuitError>,
}

impl AssetReply {
    pub fn mesh(request: AssetRequest, text: impl Into<String>) -> Self {
        Self {
            request,
            result: Ok(AssetPayload::Mesh(text.into())),
        }
    }

    pub fn texture(request: AssetRequest, texture: Raster) -> Self {
        Self {
            request,
            result: Ok(AssetPayload::Texture(texture)),
        }
    }

    /// A fetch that failed before any payload was read
    pub fn fetch_failed(request: AssetRequest, message: impl Into<String>) -> Self {
        let path = request.path.clone();
        Self {
            request,
            result: Err(SuitError::AssetFetchFailed {
                path,
                message: message.into(),
            }),
        }
    }

    pub fn failed(request: AssetRequest, error: SuitError) -> Self {
        Self {
            request,
            result: Err(error),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_serializes_flat() {
        let req = AssetRequest {
            generation: Generation(4),
            part: "helmet".into(),
            kind: AssetKind::Texture,
            path: "/tex/helmet.png".into(),
        };
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "generation": 4,
                "part": "helmet",
                "kind": "texture",
                "path": "/tex/helmet.png"
            })
        );
    }

    #[test]
    fn test_fetch_failed_carries_path() {
        let req = AssetRequest {
            generation: Generation(1),
            part: "waist".into(),
            kind: AssetKind::Mesh,
            path: "/m/waist.mesh.json".into(),
        };
        let reply = AssetReply::fetch_failed(req, "HTTP 404");
        match reply.result {
            Err(SuitError::AssetFetchFailed { path, message }) => {
                assert_eq!(path, "/m/waist.mesh.json");
                assert_eq!(message, "HTTP 404");
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_generation_wraps() {
        assert_eq!(Generation(u32::MAX).next(), Generation(0));
    }
}
