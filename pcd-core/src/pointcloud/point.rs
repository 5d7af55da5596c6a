use nalgebra::Point3;

use crate::error::BatchError;

pub type Point = Point3<f32>;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const WHITE: Color = Color {
        r: 255,
        g: 255,
        b: 255,
    };

    pub fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    // Monochrome sensors only report reflectivity, which is spread over all channels
    pub fn gray(value: u8) -> Self {
        Self {
            r: value,
            g: value,
            b: value,
        }
    }

    pub fn intensity(&self) -> u16 {
        self.r as u16 + self.g as u16 + self.b as u16
    }

    pub fn to_rgb8(&self) -> [u8; 3] {
        [self.r, self.g, self.b]
    }
}

/// One unit of work flowing through a processor chain.
///
/// `points` and `colors` are parallel: `colors[i]` belongs to `points[i]`.
/// `origin` is the sensor position the points were observed from.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PointsBatch {
    pub origin: Point,
    pub points: Vec<Point>,
    pub colors: Vec<Color>,
}

impl PointsBatch {
    pub fn new(origin: Point) -> Self {
        Self {
            origin,
            points: Vec::new(),
            colors: Vec::new(),
        }
    }

    pub fn push(&mut self, point: Point, color: Color) {
        self.points.push(point);
        self.colors.push(color);
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn check(&self) -> Result<(), BatchError> {
        if self.points.len() != self.colors.len() {
            return Err(BatchError::LengthMismatch {
                points: self.points.len(),
                colors: self.colors.len(),
            });
        }
        Ok(())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Point, &Color)> {
        self.points.iter().zip(self.colors.iter())
    }
}
