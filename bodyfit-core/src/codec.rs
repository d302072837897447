/// `mesh.v1` asset decoding.
///
/// The payload is the JSON document produced by the mesh asset generator:
///
/// ```json
/// { "format": "mesh.v1", "positions": [...], "normals": [...], "uv": [...], "indices": [...] }
/// ```
///
/// Decoding always yields a non-indexed [`TriangleBuffer`]. Optional
/// attributes with the wrong length are dropped rather than rejected.
use serde::{Deserialize, Serialize};

use crate::error::{Result, SuitError};
use crate::geometry::TriangleBuffer;

/// The only format tag this codec accepts.
pub const MESH_FORMAT: &str = "mesh.v1";

/// Raw `mesh.v1` payload as parsed from JSON.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MeshPayload {
    #[serde(default)]
    pub format: Option<String>,
    #[serde(default)]
    pub positions: Option<Vec<f32>>,
    #[serde(default)]
    pub normals: Option<Vec<f32>>,
    #[serde(default)]
    pub uv: Option<Vec<f32>>,
    #[serde(default)]
    pub indices: Option<Vec<u32>>,
}

/// Parse and decode a `mesh.v1` JSON document.
pub fn decode_json(text: &str) -> Result<TriangleBuffer> {
    let payload: MeshPayload = serde_json::from_str(text)?;
    decode(&payload)
}

/// Decode an already-parsed payload into a non-indexed triangle buffer.
pub fn decode(payload: &MeshPayload) -> Result<TriangleBuffer> {
    if payload.format.as_deref() != Some(MESH_FORMAT) {
        return Err(SuitError::UnsupportedFormat {
            found: payload.format.clone(),
        });
    }

    let positions = payload
        .positions
        .as_deref()
        .ok_or_else(|| SuitError::invalid_geometry("positions are missing"))?;
    if positions.len() < 9 {
        return Err(SuitError::invalid_geometry(format!(
            "need at least 9 position floats, got {}",
            positions.len()
        )));
    }
    if positions.len() % 3 != 0 {
        return Err(SuitError::invalid_geometry(format!(
            "position count {} is not a multiple of 3",
            positions.len()
        )));
    }

    let vertex_count = positions.len() / 3;
    let uv = payload
        .uv
        .as_deref()
        .filter(|uv| uv.len() == vertex_count * 2);
    let normals = payload
        .normals
        .as_deref()
        .filter(|n| n.len() == positions.len());

    match payload.indices.as_deref() {
        Some(indices) if !indices.is_empty() => {
            if indices.len() % 3 != 0 {
                return Err(SuitError::invalid_geometry(format!(
                    "index count {} is not a multiple of 3",
                    indices.len()
                )));
            }
            if let Some(bad) = indices.iter().find(|&&i| i as usize >= vertex_count) {
                return Err(SuitError::invalid_geometry(format!(
                    "index {} out of range for {} vertices",
                    bad, vertex_count
                )));
            }
            Ok(TriangleBuffer::from_indexed(positions, uv, indices))
        }
        _ => Ok(TriangleBuffer::from_corners(
            positions.to_vec(),
            normals.map(<[f32]>::to_vec),
            uv.map(<[f32]>::to_vec),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coverage;

    fn triangle_payload() -> MeshPayload {
        MeshPayload {
            format: Some(MESH_FORMAT.to_string()),
            positions: Some(vec![0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0]),
            indices: Some(vec![0, 1, 2]),
            ..Default::default()
        }
    }

    #[test]
    fn test_single_triangle() {
        let buffer = decode(&triangle_payload()).unwrap();
        assert_eq!(buffer.corner_count(), 3);
        for n in buffer.normals.chunks_exact(3) {
            assert_eq!(n, &[0.0, 0.0, 1.0]);
        }
        assert!(buffer.uvs.is_none());
        assert_eq!(coverage::uv_area_ratio(buffer.uvs.as_deref(), None), 0.0);
    }

    #[test]
    fn test_indexed_expands_to_corner_per_index() {
        let text = r#"{
            "format": "mesh.v1",
            "positions": [0,0,0, 1,0,0, 1,1,0, 0,1,0],
            "uv": [0,0, 1,0, 1,1, 0,1],
            "normals": [0,0,1, 0,0,1, 0,0,1, 0,0,1],
            "indices": [0,1,2, 0,2,3]
        }"#;
        let buffer = decode_json(text).unwrap();
        assert_eq!(buffer.corner_count(), 6);
        assert_eq!(buffer.uvs.as_ref().unwrap().len(), 12);
        assert_eq!(buffer.normals.len(), 18);
    }

    #[test]
    fn test_wrong_format_is_unsupported() {
        let mut payload = triangle_payload();
        payload.format = Some("mesh.v2".into());
        assert!(matches!(
            decode(&payload),
            Err(SuitError::UnsupportedFormat { found: Some(ref f) }) if f == "mesh.v2"
        ));

        payload.format = None;
        assert!(matches!(decode(&payload), Err(SuitError::UnsupportedFormat { found: None })));
    }

    #[test]
    fn test_missing_positions_is_invalid() {
        let payload = MeshPayload {
            format: Some(MESH_FORMAT.into()),
            ..Default::default()
        };
        assert!(matches!(decode(&payload), Err(SuitError::InvalidGeometry { .. })));
    }

    #[test]
    fn test_short_or_ragged_positions_are_invalid() {
        let mut payload = triangle_payload();
        payload.positions = Some(vec![0.0; 6]);
        assert!(matches!(decode(&payload), Err(SuitError::InvalidGeometry { .. })));

        payload.positions = Some(vec![0.0; 10]);
        assert!(matches!(decode(&payload), Err(SuitError::InvalidGeometry { .. })));
    }

    #[test]
    fn test_out_of_range_index_is_invalid() {
        let mut payload = triangle_payload();
        payload.indices = Some(vec![0, 1, 3]);
        assert!(matches!(decode(&payload), Err(SuitError::InvalidGeometry { .. })));

        payload.indices = Some(vec![0, 1]);
        assert!(matches!(decode(&payload), Err(SuitError::InvalidGeometry { .. })));
    }

    #[test]
    fn test_mismatched_attributes_are_dropped() {
        let payload = MeshPayload {
            format: Some(MESH_FORMAT.into()),
            positions: Some(vec![0.0, 0.0, 0.0, 0.0, 1.0, 0.0, 1.0, 0.0, 0.0]),
            normals: Some(vec![0.0, 0.0, 1.0]),
            uv: Some(vec![0.0, 0.0, 1.0]),
            indices: None,
        };
        let buffer = decode(&payload).unwrap();
        assert!(buffer.uvs.is_none());
        // Recomputed from the clockwise winding
        assert_eq!(&buffer.normals[0..3], &[0.0, 0.0, -1.0]);
    }

    #[test]
    fn test_supplied_normals_kept_without_indices() {
        let payload = MeshPayload {
            format: Some(MESH_FORMAT.into()),
            positions: Some(vec![0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0]),
            normals: Some(vec![1.0, 0.0, 0.0, 1.0, 0.0, 0.0, 1.0, 0.0, 0.0]),
            ..Default::default()
        };
        let buffer = decode(&payload).unwrap();
        assert_eq!(&buffer.normals[0..3], &[1.0, 0.0, 0.0]);
    }

    #[test]
    fn test_malformed_json() {
        assert!(matches!(decode_json("{ not json"), Err(SuitError::Parse(_))));
    }
}
