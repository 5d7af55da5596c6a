use std::{
    collections::{HashMap, HashSet},
    path::PathBuf,
};

use nalgebra::UnitQuaternion;
use pcd_core::{Color, Point, PointsBatch};
use pcd_exporter::Raster;

use super::PointsProcessor;
use crate::error::ProcessorError;

// About 1 GiB of RGBA
const MAX_RASTER_PIXELS: u64 = 1 << 28;

/// How points that land in the same pixel are combined.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Accumulation {
    /// Brightest color wins. Equal intensities go to the later point.
    #[default]
    MaxIntensity,
    /// Darker where more distinct voxels lie along the viewing ray.
    XRay,
}

#[derive(Debug, Clone, Copy)]
enum Cell {
    Brightest(Color),
    /// Distinct voxels seen along the ray.
    Density(u32),
}

/// Orthographic projection of everything it sees onto one image.
///
/// Points are rotated, snapped to a voxel grid and viewed along the rotated
/// x axis: the pixel column is the voxel's y index and the row its z index,
/// with +z at the top. Batches are forwarded untouched.
pub struct XRayPointsProcessor {
    voxel_size: f32,
    rotation: UnitQuaternion<f32>,
    output: PathBuf,
    accumulation: Accumulation,
    cells: HashMap<[i64; 2], Cell>,
    voxels: HashSet<[i64; 3]>,
    next: Box<dyn PointsProcessor>,
}

impl XRayPointsProcessor {
    pub fn new(
        voxel_size: f32,
        rotation: UnitQuaternion<f32>,
        output: impl Into<PathBuf>,
        accumulation: Accumulation,
        next: Box<dyn PointsProcessor>,
    ) -> Result<Self, ProcessorError> {
        if !voxel_size.is_finite() || voxel_size <= 0.0 {
            return Err(ProcessorError::InvalidVoxelSize(voxel_size));
        }
        Ok(Self {
            voxel_size,
            rotation,
            output: output.into(),
            accumulation,
            cells: HashMap::new(),
            voxels: HashSet::new(),
            next,
        })
    }

    fn voxel_index(&self, point: &Point) -> [i64; 3] {
        let p = self.rotation * point;
        [
            (p.x / self.voxel_size).round() as i64,
            (p.y / self.voxel_size).round() as i64,
            (p.z / self.voxel_size).round() as i64,
        ]
    }

    fn rasterize(&self) -> Result<Raster, ProcessorError> {
        if self.cells.is_empty() {
            return Ok(Raster::new(1, 1));
        }

        let mut min = [i64::MAX; 2];
        let mut max = [i64::MIN; 2];
        for [u, v] in self.cells.keys() {
            min = [min[0].min(*u), min[1].min(*v)];
            max = [max[0].max(*u), max[1].max(*v)];
        }

        let width = max[0].abs_diff(min[0]).saturating_add(1);
        let height = max[1].abs_diff(min[1]).saturating_add(1);
        if width.saturating_mul(height) > MAX_RASTER_PIXELS {
            return Err(ProcessorError::RasterTooLarge {
                path: self.output.display().to_string(),
                width,
                height,
            });
        }

        let position = |[u, v]: &[i64; 2]| {
            (u.abs_diff(min[0]) as u32, max[1].abs_diff(*v) as u32)
        };
        let mut raster = Raster::new(width as u32, height as u32);
        match self.accumulation {
            Accumulation::MaxIntensity => {
                for (key, cell) in &self.cells {
                    if let Cell::Brightest(color) = cell {
                        let (x, y) = position(key);
                        raster.put(x, y, color.to_rgb8());
                    }
                }
            }
            Accumulation::XRay => {
                let densities = || {
                    self.cells.iter().filter_map(|(key, cell)| match cell {
                        Cell::Density(voxels) => Some((key, *voxels)),
                        Cell::Brightest(_) => None,
                    })
                };
                let max_voxels = densities().map(|(_, voxels)| voxels).max().unwrap_or(1);
                for (key, voxels) in densities() {
                    let (x, y) = position(key);
                    raster.put(x, y, xray_shade(voxels, max_voxels));
                }
            }
        }
        Ok(raster)
    }
}

fn xray_shade(voxels: u32, max_voxels: u32) -> [u8; 3] {
    let density = (1.0 + voxels as f64).ln() / (1.0 + max_voxels.max(1) as f64).ln();
    let value = (255.0 * (1.0 - density)).round().clamp(0.0, 255.0) as u8;
    [value; 3]
}

impl PointsProcessor for XRayPointsProcessor {
    fn process(&mut self, batch: PointsBatch) -> Result<(), ProcessorError> {
        batch.check()?;
        if batch.is_empty() {
            return self.next.process(batch);
        }

        for (point, color) in batch.iter() {
            let index = self.voxel_index(point);
            let key = [index[1], index[2]];
            match self.accumulation {
                Accumulation::MaxIntensity => {
                    let cell = self.cells.entry(key).or_insert(Cell::Brightest(*color));
                    if let Cell::Brightest(brightest) = cell {
                        if color.intensity() >= brightest.intensity() {
                            *brightest = *color;
                        }
                    }
                }
                Accumulation::XRay => {
                    let cell = self.cells.entry(key).or_insert(Cell::Density(0));
                    if let Cell::Density(voxels) = cell {
                        if self.voxels.insert(index) {
                            *voxels += 1;
                        }
                    }
                }
            }
        }
        log::debug!(
            "{:?}: {} points accumulated, {} cells occupied",
            self.output,
            batch.len(),
            self.cells.len()
        );

        self.next.process(batch)
    }

    fn flush(self: Box<Self>) -> Result<(), ProcessorError> {
        let raster = self.rasterize()?;
        raster.write_png(&self.output)?;
        log::info!(
            "wrote {}x{} projection with {} occupied pixels to {:?}",
            raster.width(),
            raster.height(),
            self.cells.len(),
            self.output
        );
        self.next.flush()
    }
}
