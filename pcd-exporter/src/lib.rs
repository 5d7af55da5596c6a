pub mod error;
pub mod ply;
pub mod raster;

pub use error::ExportError;
pub use ply::{read_ply, PlyWriter};
pub use raster::Raster;

use std::{fs, path::Path};

pub(crate) fn ensure_parent_dirs(path: &Path) -> Result<(), ExportError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent).map_err(|e| ExportError::CreateDirectory {
                path: parent.display().to_string(),
                source: e,
            })?;
        }
    }
    Ok(())
}
