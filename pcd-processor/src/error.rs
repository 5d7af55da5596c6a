use pcd_core::{BatchError, DecodeError};
use pcd_exporter::ExportError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProcessorError {
    #[error(transparent)]
    Export(#[from] ExportError),

    #[error(transparent)]
    Invariant(#[from] BatchError),

    #[error("voxel size must be positive and finite, got {0}")]
    InvalidVoxelSize(f32),

    #[error("raster of {width}x{height} pixels for '{path}' is too large")]
    RasterTooLarge { path: String, width: u64, height: u64 },
}

#[derive(Error, Debug)]
pub enum AssetsError {
    #[error("failed to decode scan of trajectory node {node}: {source}")]
    Decode {
        node: usize,
        #[source]
        source: DecodeError,
    },

    #[error(transparent)]
    Processor(#[from] ProcessorError),
}
