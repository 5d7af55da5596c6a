use nalgebra::Isometry3;
use pcd_core::{CompressedPointCloud, Point};
use serde::{Deserialize, Serialize};

/// Raw range data of one scan, still in the sensor frame.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompressedScan {
    pub origin: [f32; 3],
    pub point_cloud: CompressedPointCloud,
    pub reflectivities: Vec<u8>,
}

impl CompressedScan {
    pub fn new(origin: Point, points: &[Point], reflectivities: Vec<u8>) -> Self {
        Self {
            origin: [origin.x, origin.y, origin.z],
            point_cloud: CompressedPointCloud::compress(points),
            reflectivities,
        }
    }

    pub fn origin(&self) -> Point {
        Point::new(self.origin[0], self.origin[1], self.origin[2])
    }
}

/// An optimized pose together with the scan taken there.
#[derive(Debug, Clone, PartialEq)]
pub struct TrajectoryNode {
    pub pose: Isometry3<f64>,
    pub scan: CompressedScan,
}

impl TrajectoryNode {
    pub fn new(pose: Isometry3<f64>, scan: CompressedScan) -> Self {
        Self { pose, scan }
    }
}
