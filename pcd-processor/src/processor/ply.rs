use std::path::PathBuf;

use pcd_core::PointsBatch;
use pcd_exporter::PlyWriter;

use super::PointsProcessor;
use crate::error::ProcessorError;

/// Streams every point it sees into one PLY file, then forwards the batch.
pub struct PlyWritingPointsProcessor {
    writer: PlyWriter,
    next: Box<dyn PointsProcessor>,
}

impl PlyWritingPointsProcessor {
    pub fn new(
        path: impl Into<PathBuf>,
        next: Box<dyn PointsProcessor>,
    ) -> Result<Self, ProcessorError> {
        Ok(Self {
            writer: PlyWriter::create(path)?,
            next,
        })
    }
}

impl PointsProcessor for PlyWritingPointsProcessor {
    fn process(&mut self, batch: PointsBatch) -> Result<(), ProcessorError> {
        batch.check()?;
        self.writer.write_points(batch.iter())?;
        self.next.process(batch)
    }

    fn flush(self: Box<Self>) -> Result<(), ProcessorError> {
        let Self { writer, next } = *self;
        let path = writer.path().to_path_buf();
        let num_points = writer.finish()?;
        log::info!("wrote {} points to {:?}", num_points, path);
        next.flush()
    }
}
