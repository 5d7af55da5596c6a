use thiserror::Error;

/// Broken `PointsBatch` contract. Raised by stages on entry.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BatchError {
    #[error("points/colors length mismatch: {points} points, {colors} colors")]
    LengthMismatch { points: usize, colors: usize },
}

/// Malformed compressed scan data.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("truncated run at offset {offset}: need {needed} values, {available} left")]
    TruncatedRun {
        offset: usize,
        needed: usize,
        available: usize,
    },

    #[error("negative run length {length} at offset {offset}")]
    NegativeRunLength { offset: usize, length: i32 },

    #[error("decoded {decoded} points, header declares {declared}")]
    PointCountMismatch { declared: usize, decoded: usize },

    #[error("scan has {points} points but {reflectivities} reflectivities")]
    ReflectivityMismatch {
        points: usize,
        reflectivities: usize,
    },
}
