use std::{
    fs::File,
    io::{BufReader, BufWriter, Write as _},
    path::Path,
};

use nalgebra::{Isometry3, Quaternion, Translation3, UnitQuaternion};
use serde::{Deserialize, Serialize};

use super::TrajectoryReadError;
use crate::node::{CompressedScan, TrajectoryNode};

#[derive(Debug, Serialize, Deserialize)]
struct PoseRecord {
    translation: [f64; 3],
    // w, x, y, z
    rotation: [f64; 4],
}

#[derive(Debug, Serialize, Deserialize)]
struct NodeRecord {
    pose: PoseRecord,
    scan: CompressedScan,
}

impl From<&TrajectoryNode> for NodeRecord {
    fn from(node: &TrajectoryNode) -> Self {
        let t = node.pose.translation.vector;
        let q = node.pose.rotation.quaternion();
        NodeRecord {
            pose: PoseRecord {
                translation: [t.x, t.y, t.z],
                rotation: [q.w, q.i, q.j, q.k],
            },
            scan: node.scan.clone(),
        }
    }
}

fn to_node(index: usize, record: NodeRecord) -> Result<TrajectoryNode, TrajectoryReadError> {
    let [w, x, y, z] = record.pose.rotation;
    let quaternion = Quaternion::new(w, x, y, z);
    let norm = quaternion.norm();
    if !norm.is_finite() || norm <= f64::EPSILON {
        return Err(TrajectoryReadError::InvalidPose {
            node: index,
            rotation: record.pose.rotation,
        });
    }

    let [tx, ty, tz] = record.pose.translation;
    let pose = Isometry3::from_parts(
        Translation3::new(tx, ty, tz),
        UnitQuaternion::from_quaternion(quaternion),
    );
    Ok(TrajectoryNode::new(pose, record.scan))
}

/// Loads a JSON array of `{ "pose": {..}, "scan": {..} }` records.
pub fn read_trajectory(path: &Path) -> Result<Vec<TrajectoryNode>, TrajectoryReadError> {
    let file = File::open(path).map_err(|e| TrajectoryReadError::Io {
        path: path.display().to_string(),
        source: e,
    })?;
    let records: Vec<NodeRecord> =
        serde_json::from_reader(BufReader::new(file)).map_err(|e| TrajectoryReadError::Json {
            path: path.display().to_string(),
            source: e,
        })?;

    log::debug!("read {} trajectory nodes from {:?}", records.len(), path);

    records
        .into_iter()
        .enumerate()
        .map(|(index, record)| to_node(index, record))
        .collect()
}

pub fn write_trajectory(path: &Path, nodes: &[TrajectoryNode]) -> Result<(), TrajectoryReadError> {
    let io_error = |e| TrajectoryReadError::Io {
        path: path.display().to_string(),
        source: e,
    };
    let records: Vec<NodeRecord> = nodes.iter().map(NodeRecord::from).collect();

    let mut writer = BufWriter::new(File::create(path).map_err(io_error)?);
    serde_json::to_writer(&mut writer, &records).map_err(|e| TrajectoryReadError::Json {
        path: path.display().to_string(),
        source: e,
    })?;
    writer.flush().map_err(io_error)
}

#[cfg(test)]
mod tests {
    use std::fs;

    use nalgebra::Vector3;
    use pcd_core::Point;

    use super::*;

    #[test]
    fn written_trajectory_reads_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("trajectory.json");

        let scan = CompressedScan::new(
            Point::origin(),
            &[Point::new(1.0, 2.0, 3.0)],
            vec![128],
        );
        let pose = Isometry3::from_parts(
            Translation3::new(1.0, 2.0, 3.0),
            UnitQuaternion::from_axis_angle(&Vector3::y_axis(), 0.5),
        );
        let nodes = vec![TrajectoryNode::new(pose, scan)];

        write_trajectory(&path, &nodes).unwrap();
        let read = read_trajectory(&path).unwrap();

        assert_eq!(read.len(), 1);
        assert_eq!(read[0].scan, nodes[0].scan);
        assert!((read[0].pose.translation.vector - pose.translation.vector).norm() < 1e-12);
        assert!(read[0].pose.rotation.angle_to(&pose.rotation) < 1e-9);
    }

    #[test]
    fn zero_quaternion_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        fs::write(
            &path,
            r#"[{"pose":{"translation":[0,0,0],"rotation":[0,0,0,0]},
                 "scan":{"origin":[0,0,0],
                         "point_cloud":{"num_points":0,"point_data":[]},
                         "reflectivities":[]}}]"#,
        )
        .unwrap();

        assert!(matches!(
            read_trajectory(&path),
            Err(TrajectoryReadError::InvalidPose { node: 0, .. })
        ));
    }

    #[test]
    fn missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            read_trajectory(&dir.path().join("missing.json")),
            Err(TrajectoryReadError::Io { .. })
        ));
    }
}
