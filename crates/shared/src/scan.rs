//! Scanner inputs and outputs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub const DEFAULT_MAX_DEPTH: usize = 12;
pub const DEFAULT_INCLUDE_GLOB: &str = "**/*";
pub const DEFAULT_EXCLUDE_GLOB: &str = "**/bin/**;**/obj/**";

/// Options for a single scan invocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanOptions {
    pub roots: Vec<PathBuf>,
    /// Depth 0 means only files directly inside each root.
    pub max_depth: usize,
    pub include_hidden: bool,
    /// `;` or newline separated glob list
    pub include_glob: String,
    pub exclude_glob: String,
    pub min_size_bytes: Option<u64>,
    pub max_size_bytes: Option<u64>,
}

impl ScanOptions {
    pub fn new(roots: Vec<PathBuf>) -> Self {
        Self {
            roots,
            ..Self::default()
        }
    }
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            roots: vec![],
            max_depth: DEFAULT_MAX_DEPTH,
            include_hidden: false,
            include_glob: DEFAULT_INCLUDE_GLOB.into(),
            exclude_glob: DEFAULT_EXCLUDE_GLOB.into(),
            min_size_bytes: None,
            max_size_bytes: None,
        }
    }
}

/// Attribute flags captured at scan time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileAttributes {
    pub hidden: bool,
    pub system: bool,
    pub read_only: bool,
}

impl FileAttributes {
    pub fn is_hidden_or_system(&self) -> bool {
        self.hidden || self.system
    }
}

/// A file discovered by the scanner. Never mutated after it is produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileCandidate {
    pub root_path: PathBuf,
    pub full_path: PathBuf,
    /// Path relative to `root_path`; for a single-file root this is the file name.
    pub relative_path: PathBuf,
    pub name: String,
    /// Lowercase, without the leading dot. Empty when the file has none.
    pub extension: String,
    pub size_bytes: u64,
    pub last_write_time: DateTime<Utc>,
    pub attributes: FileAttributes,
}

/// Cumulative counters reported while scanning.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanProgress {
    pub current_root: PathBuf,
    pub directories_visited: usize,
    pub files_visited: usize,
    pub files_matched: usize,
}
