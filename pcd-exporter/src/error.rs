use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("failed to create parent directories for '{path}': {source}")]
    CreateDirectory {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to create file '{path}': {source}")]
    CreateFile {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write to file '{path}': {source}")]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to read file '{path}': {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed PLY file '{path}': {reason}")]
    Malformed { path: String, reason: String },

    #[error("failed to encode image '{path}': {source}")]
    Image {
        path: String,
        #[source]
        source: image::ImageError,
    },
}
