use std::{
    f32::consts::{FRAC_PI_2, PI},
    ffi::OsString,
    path::{Path, PathBuf},
};

use nalgebra::{UnitQuaternion, Vector3};
use pcd_core::transform::rotation;

use crate::{
    error::ProcessorError,
    processor::{
        null::NullPointsProcessor, ply::PlyWritingPointsProcessor, xray::Accumulation,
        xray::XRayPointsProcessor, PointsProcessor,
    },
};

pub const MESH_EXTENSION: &str = "ply";
pub const IMAGE_EXTENSION: &str = "png";

pub trait PipelineBuilder {
    /// Assembles a fresh chain and returns its head.
    fn build(&self) -> Result<Box<dyn PointsProcessor>, ProcessorError>;

    /// Files the chain writes on flush.
    fn outputs(&self) -> Vec<PathBuf>;
}

/// A named viewing direction for an x-ray projection.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectionPlane {
    pub name: String,
    pub rotation: UnitQuaternion<f32>,
}

impl ProjectionPlane {
    pub fn new(name: impl Into<String>, rotation: UnitQuaternion<f32>) -> Self {
        Self {
            name: name.into(),
            rotation,
        }
    }

    /// Front, side and top-down views, innermost first.
    pub fn standard_planes() -> Vec<Self> {
        vec![
            Self::new("xz", rotation(Vector3::z(), -FRAC_PI_2)),
            Self::new("yz", rotation(Vector3::z(), PI)),
            Self::new("xy", rotation(Vector3::y(), -FRAC_PI_2)),
        ]
    }
}

/// Builds `null <- ply <- projections...`, the last plane being the head.
#[derive(Debug, Clone)]
pub struct XRayAssetsPipelineBuilder {
    pub voxel_size: f32,
    pub stem: PathBuf,
    pub accumulation: Accumulation,
    pub planes: Vec<ProjectionPlane>,
}

impl XRayAssetsPipelineBuilder {
    pub fn new(voxel_size: f32, stem: impl Into<PathBuf>) -> Self {
        Self {
            voxel_size,
            stem: stem.into(),
            accumulation: Accumulation::default(),
            planes: ProjectionPlane::standard_planes(),
        }
    }

    pub fn with_accumulation(mut self, accumulation: Accumulation) -> Self {
        self.accumulation = accumulation;
        self
    }

    pub fn with_planes(mut self, planes: Vec<ProjectionPlane>) -> Self {
        self.planes = planes;
        self
    }

    pub fn mesh_path(&self) -> PathBuf {
        with_suffix(&self.stem, &format!(".{MESH_EXTENSION}"))
    }

    pub fn projection_path(&self, plane: &ProjectionPlane) -> PathBuf {
        with_suffix(
            &self.stem,
            &format!("_xray_{}.{IMAGE_EXTENSION}", plane.name),
        )
    }
}

fn with_suffix(stem: &Path, suffix: &str) -> PathBuf {
    let mut name = OsString::from(stem.as_os_str());
    name.push(suffix);
    PathBuf::from(name)
}

impl PipelineBuilder for XRayAssetsPipelineBuilder {
    fn build(&self) -> Result<Box<dyn PointsProcessor>, ProcessorError> {
        if !self.voxel_size.is_finite() || self.voxel_size <= 0.0 {
            return Err(ProcessorError::InvalidVoxelSize(self.voxel_size));
        }

        let mut head: Box<dyn PointsProcessor> = Box::new(NullPointsProcessor::new());
        head = Box::new(PlyWritingPointsProcessor::new(self.mesh_path(), head)?);
        for plane in &self.planes {
            head = Box::new(XRayPointsProcessor::new(
                self.voxel_size,
                plane.rotation,
                self.projection_path(plane),
                self.accumulation,
                head,
            )?);
        }
        Ok(head)
    }

    fn outputs(&self) -> Vec<PathBuf> {
        let mut outputs = vec![self.mesh_path()];
        outputs.extend(self.planes.iter().rev().map(|p| self.projection_path(p)));
        outputs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn output_names_follow_stem() {
        let builder = XRayAssetsPipelineBuilder::new(0.05, "out/map");
        let outputs = builder.outputs();
        assert_eq!(
            outputs,
            vec![
                PathBuf::from("out/map.ply"),
                PathBuf::from("out/map_xray_xy.png"),
                PathBuf::from("out/map_xray_yz.png"),
                PathBuf::from("out/map_xray_xz.png"),
            ]
        );
    }

    #[test]
    fn custom_planes_replace_the_standard_views() {
        let dir = tempfile::tempdir().unwrap();
        let builder = XRayAssetsPipelineBuilder::new(0.1, dir.path().join("scan"))
            .with_planes(vec![ProjectionPlane::new("top", UnitQuaternion::identity())]);

        let head = builder.build().unwrap();
        head.flush().unwrap();

        assert_eq!(builder.outputs().len(), 2);
        assert!(dir.path().join("scan.ply").exists());
        assert!(dir.path().join("scan_xray_top.png").exists());
    }

    #[test]
    fn stem_with_dots_keeps_them() {
        let builder = XRayAssetsPipelineBuilder::new(0.05, "run.2024");
        assert_eq!(builder.mesh_path(), PathBuf::from("run.2024.ply"));
    }

    #[test]
    fn invalid_voxel_size_creates_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let builder = XRayAssetsPipelineBuilder::new(0.0, dir.path().join("map"));

        assert!(matches!(
            builder.build(),
            Err(ProcessorError::InvalidVoxelSize(v)) if v == 0.0
        ));
        assert!(builder.outputs().iter().all(|p| !p.exists()));
    }

    #[test]
    fn top_down_plane_looks_along_z() {
        let xy = ProjectionPlane::standard_planes()
            .into_iter()
            .find(|p| p.name == "xy")
            .unwrap();
        let looking = xy.rotation * Vector3::z();
        assert!((looking - Vector3::new(-1.0, 0.0, 0.0)).norm() < 1e-6);
    }
}
