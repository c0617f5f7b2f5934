//! Output naming for split images

use pil_core::{Config, Error, Result};
use std::path::{Path, PathBuf};

/// Reject metadata paths without the configured extension
pub fn require_mdt_path(path: &Path, config: &Config) -> Result<()> {
    if config.is_mdt_path(path) {
        Ok(())
    } else {
        Err(Error::Naming(path.to_path_buf()))
    }
}

/// Sibling `.bNN` path for the program header at `index`
pub fn segment_file(mdt_path: &Path, index: usize, config: &Config) -> PathBuf {
    config.segment_path(mdt_path, index)
}
