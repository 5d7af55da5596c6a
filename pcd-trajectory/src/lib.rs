pub mod adapter;
pub mod node;
pub mod reader;

pub use adapter::{LaserScanAdapter, TrajectoryAdapter};
pub use node::{CompressedScan, TrajectoryNode};
pub use reader::{read_trajectory, write_trajectory, TrajectoryReadError};
