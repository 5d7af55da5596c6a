pub mod error;
pub mod pointcloud;
pub mod transform;

pub use error::{BatchError, DecodeError};
pub use pointcloud::compression::CompressedPointCloud;
pub use pointcloud::point::{Color, Point, PointsBatch};
pub use transform::Rigid3;
