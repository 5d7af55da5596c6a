pub mod builder;
pub mod error;
pub mod processor;
pub mod runner;

pub use builder::{PipelineBuilder, ProjectionPlane, XRayAssetsPipelineBuilder};
pub use error::{AssetsError, ProcessorError};
pub use processor::{
    null::NullPointsProcessor, ply::PlyWritingPointsProcessor, xray::Accumulation,
    xray::XRayPointsProcessor, PointsProcessor,
};
pub use runner::{write_assets, AssetsSummary, AssetsWriter};
