//! Run configuration

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::backend::DeviceClass;

/// Source of the unknown-hash candidate list
pub const LISTFILE_URL: &str = "https://bnet.marlam.in/listfile.php?unk=1";

/// Local cache of the candidate list
pub const DEFAULT_LISTFILE_CACHE: &str = "unk_listfile.txt";

/// Results are appended here
pub const DEFAULT_OUTPUT: &str = "Output.txt";

/// Re-download the candidate list once it is this old
pub const LISTFILE_MAX_AGE: Duration = Duration::from_secs(6 * 60 * 60);

/// Target used by benchmark runs instead of the candidate list
pub const BENCHMARK_HASH: u64 = 4_097_458_660_625_243_137;

/// Settings applied uniformly to every mask in a run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Device class the backend is bound to
    pub device: DeviceClass,
    /// Treat every mask as two identical halves
    pub mirrored: bool,
    /// Worker threads for the CPU backend (all cores if unset)
    pub threads: Option<usize>,
    /// Benchmark run: fixed target, no export
    pub benchmark: bool,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            device: DeviceClass::Any,
            mirrored: false,
            threads: None,
            benchmark: false,
        }
    }
}

/// Where the candidate list comes from and how long it stays fresh
#[derive(Debug, Clone)]
pub struct ListfileConfig {
    pub url: String,
    pub cache_path: PathBuf,
    pub max_age: Duration,
}

impl Default for ListfileConfig {
    fn default() -> Self {
        Self {
            url: LISTFILE_URL.to_string(),
            cache_path: PathBuf::from(DEFAULT_LISTFILE_CACHE),
            max_age: LISTFILE_MAX_AGE,
        }
    }
}
