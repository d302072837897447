/// Error types for bodyfit.
///
/// Every failure here is recoverable: the rig falls back to a procedural
/// primitive or a flat color and keeps rendering the other parts.
use thiserror::Error;

/// Result type alias using [`SuitError`].
pub type Result<T> = std::result::Result<T, SuitError>;

/// Errors raised while decoding or loading suit assets.
#[derive(Error, Debug)]
pub enum SuitError {
    /// The mesh payload is malformed.
    #[error("invalid mesh geometry: {reason}")]
    InvalidGeometry {
        /// What was wrong with the payload.
        reason: String,
    },

    /// The mesh payload carries a missing or unknown format tag.
    #[error("unsupported mesh asset format: {}", found.as_deref().unwrap_or("(none)"))]
    UnsupportedFormat {
        /// The tag that was found, if any.
        found: Option<String>,
    },

    /// The host could not fetch an asset.
    #[error("failed to load asset {path}: {message}")]
    AssetFetchFailed {
        /// Normalized asset path.
        path: String,
        /// Host-provided description, e.g. an HTTP status line.
        message: String,
    },

    /// A texture could not be decoded into a raster.
    #[error("failed to decode texture: {reason}")]
    TextureDecode {
        /// Decoder message.
        reason: String,
    },

    /// JSON text could not be parsed.
    #[error("malformed JSON: {0}")]
    Parse(#[from] serde_json::Error),
}

impl SuitError {
    /// Create an invalid geometry error.
    pub fn invalid_geometry(reason: impl Into<String>) -> Self {
        SuitError::InvalidGeometry {
            reason: reason.into(),
        }
    }

    /// Guidance shown next to a failed fetch in the status line.
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            SuitError::AssetFetchFailed { message, .. } if message.contains("404") => {
                Some("the path may be wrong; check it against the asset root")
            }
            SuitError::AssetFetchFailed { .. } => Some("check that the asset server is running"),
            _ => None,
        }
    }
}

impl From<image::ImageError> for SuitError {
    fn from(err: image::ImageError) -> Self {
        SuitError::TextureDecode {
            reason: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetch_hint_distinguishes_not_found() {
        let missing = SuitError::AssetFetchFailed {
            path: "/sessions/body-sim.json".into(),
            message: "HTTP 404".into(),
        };
        assert!(missing.hint().unwrap().contains("path"));

        let down = SuitError::AssetFetchFailed {
            path: "/sessions/body-sim.json".into(),
            message: "connection refused".into(),
        };
        assert!(down.hint().unwrap().contains("server"));
        assert!(SuitError::invalid_geometry("x").hint().is_none());
    }

    #[test]
    fn test_unsupported_format_message() {
        let err = SuitError::UnsupportedFormat { found: None };
        assert_eq!(err.to_string(), "unsupported mesh asset format: (none)");
    }
}
