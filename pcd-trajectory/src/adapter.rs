use pcd_core::{Color, DecodeError, Point, PointsBatch, Rigid3};
use rayon::iter::{IntoParallelRefIterator as _, ParallelIterator as _};

use crate::node::TrajectoryNode;

pub trait TrajectoryAdapter {
    /// Decodes the node's scan into a world-frame batch.
    fn points_batch(&self, node: &TrajectoryNode) -> Result<PointsBatch, DecodeError>;
}

/// Decompresses laser scans and colors every return by its reflectivity.
#[derive(Debug, Clone, Copy, Default)]
pub struct LaserScanAdapter;

impl TrajectoryAdapter for LaserScanAdapter {
    fn points_batch(&self, node: &TrajectoryNode) -> Result<PointsBatch, DecodeError> {
        let scan = &node.scan;
        let returns = scan.point_cloud.decompress()?;
        if returns.len() != scan.reflectivities.len() {
            return Err(DecodeError::ReflectivityMismatch {
                points: returns.len(),
                reflectivities: scan.reflectivities.len(),
            });
        }

        let pose: Rigid3 = node.pose.cast::<f32>();
        let points: Vec<Point> = returns.par_iter().map(|p| pose * p).collect();
        let colors: Vec<Color> = scan.reflectivities.iter().copied().map(Color::gray).collect();

        Ok(PointsBatch {
            origin: pose * scan.origin(),
            points,
            colors,
        })
    }
}
