use std::path::Path;

use image::{ImageFormat, Rgba, RgbaImage};

use crate::{ensure_parent_dirs, ExportError};

const BACKGROUND: [u8; 4] = [0, 0, 0, 0];

/// RGBA pixel buffer. Untouched pixels stay fully transparent.
#[derive(Debug, Clone)]
pub struct Raster {
    width: u32,
    height: u32,
    pixels: Vec<[u8; 4]>,
}

impl Raster {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![BACKGROUND; width as usize * height as usize],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Paints an opaque pixel. Out-of-bounds coordinates are ignored.
    pub fn put(&mut self, x: u32, y: u32, rgb: [u8; 3]) {
        if x >= self.width || y >= self.height {
            return;
        }
        let index = y as usize * self.width as usize + x as usize;
        self.pixels[index] = [rgb[0], rgb[1], rgb[2], u8::MAX];
    }

    #[cfg(test)]
    fn get(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(self.pixels[y as usize * self.width as usize + x as usize])
    }

    #[cfg(test)]
    fn opaque_pixel_count(&self) -> usize {
        self.pixels.iter().filter(|p| p[3] != 0).count()
    }

    pub fn write_png(&self, path: &Path) -> Result<(), ExportError> {
        ensure_parent_dirs(path)?;
        let width = self.width as usize;
        let image = RgbaImage::from_fn(self.width, self.height, |x, y| {
            Rgba(self.pixels[y as usize * width + x as usize])
        });
        image
            .save_with_format(path, ImageFormat::Png)
            .map_err(|e| ExportError::Image {
                path: path.display().to_string(),
                source: e,
            })?;
        log::debug!(
            "wrote {}x{} raster to {:?}",
            self.width,
            self.height,
            path
        );
        Ok(())
    }
}
