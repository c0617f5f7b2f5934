//! Naming and output configuration for split images

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Configuration of the split representation
///
/// Only built in code; no configuration file or environment variable is
/// consulted by the tools.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Extension required on the metadata file
    pub mdt_extension: String,
    /// Prefix of the per-segment extension (`b` in `.b03`)
    pub segment_prefix: String,
    /// Minimum number of digits in the segment index
    pub segment_index_width: usize,
    /// Write hash segments to their own `.bNN` file as well as to the
    /// `.mdt` when splitting
    pub emit_hash_segment_files: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            mdt_extension: "mdt".to_string(),
            segment_prefix: "b".to_string(),
            segment_index_width: 2,
            emit_hash_segment_files: true,
        }
    }
}

impl Config {
    /// Enable or disable the `.bNN` copy of hash segments
    pub fn with_hash_segment_files(mut self, enabled: bool) -> Self {
        self.emit_hash_segment_files = enabled;
        self
    }

    /// Whether `path` carries the metadata extension
    pub fn is_mdt_path(&self, path: &Path) -> bool {
        path.extension()
            .map_or(false, |ext| ext == self.mdt_extension.as_str())
    }

    /// Extension (without the dot) of the file holding segment `index`
    pub fn segment_extension(&self, index: usize) -> String {
        format!(
            "{}{:0width$}",
            self.segment_prefix,
            index,
            width = self.segment_index_width
        )
    }

    /// Sibling path of the file holding segment `index`
    pub fn segment_path(&self, mdt_path: &Path, index: usize) -> PathBuf {
        mdt_path.with_extension(self.segment_extension(index))
    }
}
