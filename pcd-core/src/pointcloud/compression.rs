use serde::{Deserialize, Serialize};

use crate::{error::DecodeError, pointcloud::point::Point};

// Metres per raster step
pub const PRECISION: f64 = 0.001;

const BITS_PER_COORDINATE: u32 = 10;
const COORDINATE_MASK: i32 = (1 << BITS_PER_COORDINATE) - 1;
const RUN_HEADER_LEN: usize = 4;

/// Points quantized to `PRECISION` and grouped into runs that share a block.
///
/// `point_data` is a sequence of runs, each laid out as
/// `[block_x, block_y, block_z, n, packed_1, ..., packed_n]` where a packed
/// value holds the low `BITS_PER_COORDINATE` bits of every axis. Runs follow
/// the input order, so the i-th decoded point is the i-th compressed point.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompressedPointCloud {
    pub num_points: usize,
    pub point_data: Vec<i32>,
}

impl CompressedPointCloud {
    pub fn compress(points: &[Point]) -> Self {
        let mut point_data = Vec::new();
        let mut run_header: Option<(usize, [i32; 3])> = None;

        for point in points {
            let raster = [to_raster(point.x), to_raster(point.y), to_raster(point.z)];
            let block = raster.map(|v| v >> BITS_PER_COORDINATE);

            match run_header {
                Some((header, current)) if current == block => {
                    point_data[header + 3] += 1;
                }
                _ => {
                    run_header = Some((point_data.len(), block));
                    point_data.extend_from_slice(&[block[0], block[1], block[2], 1]);
                }
            }

            let packed = (raster[0] & COORDINATE_MASK)
                | (raster[1] & COORDINATE_MASK) << BITS_PER_COORDINATE
                | (raster[2] & COORDINATE_MASK) << (2 * BITS_PER_COORDINATE);
            point_data.push(packed);
        }

        Self {
            num_points: points.len(),
            point_data,
        }
    }

    pub fn len(&self) -> usize {
        self.num_points
    }

    pub fn is_empty(&self) -> bool {
        self.num_points == 0
    }

    pub fn decompress(&self) -> Result<Vec<Point>, DecodeError> {
        let data = &self.point_data;
        let mut points = Vec::with_capacity(self.num_points);
        let mut offset = 0;

        while offset < data.len() {
            let available = data.len() - offset;
            if available < RUN_HEADER_LEN {
                return Err(DecodeError::TruncatedRun {
                    offset,
                    needed: RUN_HEADER_LEN,
                    available,
                });
            }

            let block = [data[offset], data[offset + 1], data[offset + 2]];
            let length = data[offset + 3];
            if length < 0 {
                return Err(DecodeError::NegativeRunLength { offset, length });
            }
            let length = length as usize;

            let body = offset + RUN_HEADER_LEN;
            let available = data.len() - body;
            if available < length {
                return Err(DecodeError::TruncatedRun {
                    offset: body,
                    needed: length,
                    available,
                });
            }

            for &packed in &data[body..body + length] {
                points.push(Point::new(
                    from_raster(block[0], packed),
                    from_raster(block[1], packed >> BITS_PER_COORDINATE),
                    from_raster(block[2], packed >> (2 * BITS_PER_COORDINATE)),
                ));
            }
            offset = body + length;
        }

        if points.len() != self.num_points {
            return Err(DecodeError::PointCountMismatch {
                declared: self.num_points,
                decoded: points.len(),
            });
        }

        log::trace!(
            "decompressed {} points from {} values",
            points.len(),
            data.len()
        );
        Ok(points)
    }
}

fn to_raster(value: f32) -> i32 {
    (value as f64 / PRECISION).round() as i32
}

fn from_raster(block: i32, packed: i32) -> f32 {
    let raster = ((block as i64) << BITS_PER_COORDINATE) | (packed & COORDINATE_MASK) as i64;
    (raster as f64 * PRECISION) as f32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decompress_preserves_order_across_blocks() {
        let points = vec![
            Point::new(0.1, 0.2, 0.3),
            Point::new(5.0, -3.25, 0.0),
            Point::new(0.15, 0.2, 0.3),
            Point::new(-12.345, 7.5, -0.001),
        ];
        let compressed = CompressedPointCloud::compress(&points);
        assert_eq!(compressed.len(), 4);

        let decoded = compressed.decompress().unwrap();
        assert_eq!(decoded.len(), points.len());
        for (a, b) in points.iter().zip(decoded.iter()) {
            assert!((a - b).amax() <= PRECISION as f32, "{a:?} != {b:?}");
        }
    }

    #[test]
    fn neighbouring_points_share_a_run() {
        let points = vec![Point::new(0.0, 0.0, 0.0), Point::new(0.5, 0.5, 0.5)];
        let compressed = CompressedPointCloud::compress(&points);
        assert_eq!(compressed.point_data.len(), RUN_HEADER_LEN + 2);
        assert_eq!(compressed.point_data[3], 2);
    }

    #[test]
    fn empty_cloud() {
        let compressed = CompressedPointCloud::compress(&[]);
        assert!(compressed.is_empty());
        assert!(compressed.decompress().unwrap().is_empty());
    }

    #[test]
    fn truncated_header_is_rejected() {
        let compressed = CompressedPointCloud {
            num_points: 1,
            point_data: vec![0, 0],
        };
        assert_eq!(
            compressed.decompress(),
            Err(DecodeError::TruncatedRun {
                offset: 0,
                needed: RUN_HEADER_LEN,
                available: 2
            })
        );
    }

    #[test]
    fn truncated_body_is_rejected() {
        let compressed = CompressedPointCloud {
            num_points: 3,
            point_data: vec![0, 0, 0, 3, 1],
        };
        assert!(matches!(
            compressed.decompress(),
            Err(DecodeError::TruncatedRun { offset: 4, .. })
        ));
    }

    #[test]
    fn negative_run_is_rejected() {
        let compressed = CompressedPointCloud {
            num_points: 0,
            point_data: vec![0, 0, 0, -1],
        };
        assert_eq!(
            compressed.decompress(),
            Err(DecodeError::NegativeRunLength {
                offset: 0,
                length: -1
            })
        );
    }

    #[test]
    fn declared_count_must_match() {
        let mut compressed = CompressedPointCloud::compress(&[Point::new(1.0, 1.0, 1.0)]);
        compressed.num_points = 2;
        assert_eq!(
            compressed.decompress(),
            Err(DecodeError::PointCountMismatch {
                declared: 2,
                decoded: 1
            })
        );
    }
}
