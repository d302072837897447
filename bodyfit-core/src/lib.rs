/// Bodyfit Core Library - suit rig, relief and coverage logic
///
/// This library holds everything the hosts share: the part catalog, mesh and
/// pose decoding, per-frame transform resolution, texture relief, UV coverage
/// diagnostics and playback timing. It performs no I/O; hosts fetch assets
/// and feed the results back through [`rig::SuitRig::accept`].

pub mod cache;
pub mod catalog;
pub mod codec;
pub mod coverage;
pub mod error;
pub mod geometry;
pub mod loader;
pub mod part;
pub mod playback;
pub mod primitives;
pub mod projection;
pub mod raster;
pub mod relief;
pub mod rig;
pub mod sim;
pub mod status;
pub mod suitspec;
pub mod transform;

// Re-export commonly used types
pub use catalog::{PartCatalog, PartVisualConfig, Shape};
pub use coverage::CoverageReport;
pub use error::{Result, SuitError};
pub use geometry::{Triangle, TriangleBuffer};
pub use loader::{AssetKind, AssetPayload, AssetReply, AssetRequest, Generation};
pub use part::{GeometrySource, RenderablePart};
pub use playback::PlaybackClock;
pub use projection::{BoundingSphere, Camera};
pub use raster::Raster;
pub use rig::{RigConfig, SuitRig};
pub use sim::{SegmentTransform, Sim, SimFrame};
pub use status::LoadStatus;
pub use suitspec::SuitSpec;
pub use transform::{PartTransform, Transform};
