pub mod json;

pub use json::{read_trajectory, write_trajectory};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum TrajectoryReadError {
    #[error("failed to access trajectory file '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid trajectory JSON in '{path}': {source}")]
    Json {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("node {node} has a degenerate rotation quaternion {rotation:?}")]
    InvalidPose { node: usize, rotation: [f64; 4] },
}
