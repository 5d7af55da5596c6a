use std::path::PathBuf;

use pcd_trajectory::{LaserScanAdapter, TrajectoryAdapter, TrajectoryNode};

use crate::{
    builder::{PipelineBuilder, XRayAssetsPipelineBuilder},
    error::AssetsError,
};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssetsSummary {
    pub nodes: usize,
    pub points: usize,
    pub outputs: Vec<PathBuf>,
}

/// Feeds a whole trajectory through one freshly built chain and flushes it.
pub struct AssetsWriter {
    builder: Box<dyn PipelineBuilder>,
}

impl AssetsWriter {
    pub fn new(builder: Box<dyn PipelineBuilder>) -> Self {
        Self { builder }
    }

    pub fn write(
        &self,
        nodes: &[TrajectoryNode],
        adapter: &dyn TrajectoryAdapter,
    ) -> Result<AssetsSummary, AssetsError> {
        let start = std::time::Instant::now();
        let mut head = self.builder.build()?;

        let mut points = 0;
        for (index, node) in nodes.iter().enumerate() {
            let batch = adapter
                .points_batch(node)
                .map_err(|source| AssetsError::Decode {
                    node: index,
                    source,
                })?;
            points += batch.len();
            head.process(batch)?;
        }
        log::info!(
            "processed {} points from {} nodes in {:?}",
            points,
            nodes.len(),
            start.elapsed()
        );

        head.flush()?;
        log::info!("flushed all assets in {:?}", start.elapsed());

        Ok(AssetsSummary {
            nodes: nodes.len(),
            points,
            outputs: self.builder.outputs(),
        })
    }
}

/// Writes `<stem>.ply` and the three `<stem>_xray_*.png` views.
pub fn write_assets(
    nodes: &[TrajectoryNode],
    voxel_size: f32,
    stem: impl Into<PathBuf>,
) -> Result<AssetsSummary, AssetsError> {
    let builder = XRayAssetsPipelineBuilder::new(voxel_size, stem);
    AssetsWriter::new(Box::new(builder)).write(nodes, &LaserScanAdapter)
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use nalgebra::{Isometry3, Translation3, UnitQuaternion};
    use pcd_core::{CompressedPointCloud, DecodeError, Point};
    use pcd_exporter::read_ply;
    use pcd_trajectory::CompressedScan;

    use super::*;
    use crate::{error::ProcessorError, processor::xray::Accumulation};

    fn make_node(pose: Isometry3<f64>) -> TrajectoryNode {
        let points: Vec<Point> = (0..10)
            .map(|i| {
                let t = i as f32;
                Point::new(0.1 * t, 0.2 * (t % 3.0), 0.05 * t)
            })
            .collect();
        let reflectivities = (0..10).map(|i| 20 * i as u8).collect();
        TrajectoryNode::new(
            pose,
            CompressedScan::new(Point::origin(), &points, reflectivities),
        )
    }

    fn opaque_pixels(path: &Path) -> usize {
        image::open(path)
            .unwrap()
            .into_rgba8()
            .pixels()
            .filter(|p| p.0[3] != 0)
            .count()
    }

    #[test]
    fn two_nodes_produce_four_assets() {
        let dir = tempfile::tempdir().unwrap();
        let stem = dir.path().join("map");
        let nodes = vec![
            make_node(Isometry3::identity()),
            make_node(Isometry3::from_parts(
                Translation3::new(1.0, 0.0, 0.0),
                UnitQuaternion::identity(),
            )),
        ];

        let summary = write_assets(&nodes, 0.05, &stem).unwrap();

        assert_eq!(summary.nodes, 2);
        assert_eq!(summary.points, 20);
        assert_eq!(summary.outputs.len(), 4);
        for output in &summary.outputs {
            assert!(output.exists(), "{output:?} is missing");
        }
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 4);

        let (points, colors) = read_ply(&dir.path().join("map.ply")).unwrap();
        assert_eq!(points.len(), 20);
        assert_eq!(colors.len(), 20);
        assert!((points[10].x - (points[0].x + 1.0)).abs() < 1e-3);

        for plane in ["xy", "yz", "xz"] {
            let path = dir.path().join(format!("map_xray_{plane}.png"));
            assert!(opaque_pixels(&path) >= 1, "{plane} projection is empty");
        }
    }

    #[test]
    fn no_nodes_still_produce_empty_assets() {
        let dir = tempfile::tempdir().unwrap();
        let stem = dir.path().join("map");

        let summary = write_assets(&[], 0.05, &stem).unwrap();

        assert_eq!(summary.points, 0);
        let (points, _) = read_ply(&dir.path().join("map.ply")).unwrap();
        assert!(points.is_empty());
        for plane in ["xy", "yz", "xz"] {
            let path = dir.path().join(format!("map_xray_{plane}.png"));
            assert_eq!(opaque_pixels(&path), 0);
        }
    }

    #[test]
    fn x_ray_accumulation_end_to_end() {
        let dir = tempfile::tempdir().unwrap();
        let builder = XRayAssetsPipelineBuilder::new(0.05, dir.path().join("dense"))
            .with_accumulation(Accumulation::XRay);
        let writer = AssetsWriter::new(Box::new(builder));

        let summary = writer
            .write(&[make_node(Isometry3::identity())], &LaserScanAdapter)
            .unwrap();

        assert_eq!(summary.points, 10);
        assert!(opaque_pixels(&dir.path().join("dense_xray_xy.png")) >= 1);
    }

    #[test]
    fn corrupt_scan_aborts_the_run() {
        let dir = tempfile::tempdir().unwrap();
        let mut broken = make_node(Isometry3::identity());
        broken.scan.point_cloud = CompressedPointCloud {
            num_points: 10,
            point_data: vec![0, 0, 0, -3],
        };
        let nodes = vec![make_node(Isometry3::identity()), broken];

        let result = write_assets(&nodes, 0.05, dir.path().join("map"));

        assert!(matches!(
            result,
            Err(AssetsError::Decode {
                node: 1,
                source: DecodeError::NegativeRunLength { .. }
            })
        ));
        // flush never ran, so no asset was written and nothing was left behind
        assert!(!dir.path().join("map_xray_xy.png").exists());
        assert!(!dir.path().join("map.ply").exists());
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn invalid_voxel_size_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let result = write_assets(&[], -1.0, dir.path().join("map"));
        assert!(matches!(
            result,
            Err(AssetsError::Processor(ProcessorError::InvalidVoxelSize(_)))
        ));
    }
}
