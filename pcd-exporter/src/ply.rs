use std::{
    fs,
    io::{BufWriter, Seek as _, SeekFrom, Write},
    path::{Path, PathBuf},
};

use byteorder::{ByteOrder as _, LittleEndian};
use pcd_core::{Color, Point};
use tempfile::NamedTempFile;

use crate::{ensure_parent_dirs, ExportError};

const BYTE_STRIDE: usize = (4 * 3) + 3;

// Wide enough for any u64, so rewriting the header never shifts the body
const VERTEX_COUNT_WIDTH: usize = 20;

const END_HEADER: &[u8] = b"end_header\n";

fn binary_ply_header(num_points: u64) -> String {
    format!(
        "ply\n\
         format binary_little_endian 1.0\n\
         comment generated by pcd-exporter\n\
         element vertex {:0width$}\n\
         property float x\n\
         property float y\n\
         property float z\n\
         property uchar red\n\
         property uchar green\n\
         property uchar blue\n\
         end_header\n",
        num_points,
        width = VERTEX_COUNT_WIDTH
    )
}

/// Streams colored vertices into a binary little-endian PLY file.
///
/// The header is written up front with a zero-padded vertex count and
/// rewritten in place by [`PlyWriter::finish`], so points never have to be
/// buffered in memory. Data goes to a temporary file next to `path`, which
/// only replaces `path` on `finish`; a writer dropped early leaves nothing.
pub struct PlyWriter {
    path: PathBuf,
    writer: BufWriter<NamedTempFile>,
    num_points: u64,
}

impl PlyWriter {
    pub fn create(path: impl Into<PathBuf>) -> Result<Self, ExportError> {
        let path = path.into();
        ensure_parent_dirs(&path)?;
        let dir = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or(Path::new("."));
        let file = NamedTempFile::new_in(dir).map_err(|e| ExportError::CreateFile {
            path: path.display().to_string(),
            source: e,
        })?;

        let mut ply = Self {
            path,
            writer: BufWriter::new(file),
            num_points: 0,
        };
        ply.write_header()?;
        Ok(ply)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn write_points<'a>(
        &mut self,
        points: impl IntoIterator<Item = (&'a Point, &'a Color)>,
    ) -> Result<(), ExportError> {
        let mut buffer = [0u8; BYTE_STRIDE];
        for (point, color) in points {
            LittleEndian::write_f32_into(&[point.x, point.y, point.z], &mut buffer[0..12]);
            buffer[12..15].copy_from_slice(&color.to_rgb8());
            self.writer
                .write_all(&buffer)
                .map_err(|e| self.write_error(e))?;
            self.num_points += 1;
        }
        Ok(())
    }

    /// Patches the vertex count and moves the file into place. Returns the
    /// number of points written.
    pub fn finish(mut self) -> Result<u64, ExportError> {
        self.writer
            .seek(SeekFrom::Start(0))
            .map_err(|e| self.write_error(e))?;
        self.write_header()?;

        let Self {
            path,
            writer,
            num_points,
        } = self;
        let file = writer.into_inner().map_err(|e| ExportError::Write {
            path: path.display().to_string(),
            source: e.into_error(),
        })?;
        file.persist(&path).map_err(|e| ExportError::Write {
            path: path.display().to_string(),
            source: e.error,
        })?;
        Ok(num_points)
    }

    fn write_header(&mut self) -> Result<(), ExportError> {
        let header = binary_ply_header(self.num_points);
        self.writer
            .write_all(header.as_bytes())
            .map_err(|e| self.write_error(e))
    }

    fn write_error(&self, source: std::io::Error) -> ExportError {
        ExportError::Write {
            path: self.path.display().to_string(),
            source,
        }
    }
}

/// Reads back a file produced by [`PlyWriter`].
pub fn read_ply(path: &Path) -> Result<(Vec<Point>, Vec<Color>), ExportError> {
    let path_str = path.display().to_string();
    let malformed = |reason: &str| ExportError::Malformed {
        path: path_str.clone(),
        reason: reason.to_string(),
    };

    let bytes = fs::read(path).map_err(|e| ExportError::Read {
        path: path_str.clone(),
        source: e,
    })?;

    let header_end = bytes
        .windows(END_HEADER.len())
        .position(|w| w == END_HEADER)
        .map(|i| i + END_HEADER.len())
        .ok_or_else(|| malformed("missing end_header"))?;
    let header = std::str::from_utf8(&bytes[..header_end])
        .map_err(|_| malformed("header is not valid UTF-8"))?;

    if !header.lines().any(|l| l == "format binary_little_endian 1.0") {
        return Err(malformed("only binary_little_endian 1.0 is supported"));
    }
    let num_points: usize = header
        .lines()
        .find_map(|l| l.strip_prefix("element vertex "))
        .ok_or_else(|| malformed("missing vertex element"))?
        .trim()
        .parse()
        .map_err(|_| malformed("invalid vertex count"))?;

    let body = &bytes[header_end..];
    if body.len() != num_points * BYTE_STRIDE {
        return Err(malformed(&format!(
            "expected {} bytes of vertex data, found {}",
            num_points * BYTE_STRIDE,
            body.len()
        )));
    }

    let mut points = Vec::with_capacity(num_points);
    let mut colors = Vec::with_capacity(num_points);
    for vertex in body.chunks_exact(BYTE_STRIDE) {
        let mut xyz = [0f32; 3];
        LittleEndian::read_f32_into(&vertex[0..12], &mut xyz);
        points.push(Point::new(xyz[0], xyz[1], xyz[2]));
        colors.push(Color::new(vertex[12], vertex[13], vertex[14]));
    }

    Ok((points, colors))
}
