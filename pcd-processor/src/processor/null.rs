use pcd_core::PointsBatch;

use super::PointsProcessor;
use crate::error::ProcessorError;

/// Ends a chain. Batches are dropped and flush is a no-op.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullPointsProcessor;

impl NullPointsProcessor {
    pub fn new() -> Self {
        Self
    }
}

impl PointsProcessor for NullPointsProcessor {
    fn process(&mut self, _batch: PointsBatch) -> Result<(), ProcessorError> {
        Ok(())
    }

    fn flush(self: Box<Self>) -> Result<(), ProcessorError> {
        Ok(())
    }
}
