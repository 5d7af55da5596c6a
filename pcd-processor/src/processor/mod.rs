use pcd_core::PointsBatch;

use crate::error::ProcessorError;

pub mod null;
pub mod ply;
pub mod xray;

/// One link of a processing chain.
///
/// Every stage owns the stage after it. `process` may be called any number
/// of times; `flush` consumes the stage, finishes its own output and then
/// flushes the rest of the chain.
pub trait PointsProcessor {
    fn process(&mut self, batch: PointsBatch) -> Result<(), ProcessorError>;

    fn flush(self: Box<Self>) -> Result<(), ProcessorError>;
}
