use std::path::{Path, PathBuf};

use crate::data::aggregate::DEFAULT_HISTOGRAM_BINS;
use crate::data::loader::NumericPolicy;

/// File name of the orders table.
pub const DATA_FILE_NAME: &str = "main_data.csv";

/// Rows shown in the preview table.
pub const DEFAULT_PREVIEW_ROWS: usize = 20;

// ---------------------------------------------------------------------------
// Dashboard configuration
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct DashboardConfig {
    pub data_path: PathBuf,
    pub numeric_policy: NumericPolicy,
    pub histogram_bins: usize,
    pub preview_rows: usize,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from(DATA_FILE_NAME),
            numeric_policy: NumericPolicy::default(),
            histogram_bins: DEFAULT_HISTOGRAM_BINS,
            preview_rows: DEFAULT_PREVIEW_ROWS,
        }
    }
}

impl DashboardConfig {
    /// Defaults with the data file resolved to its fixed location next to
    /// the program.
    pub fn locate() -> Self {
        let candidates = data_file_candidates(
            std::env::current_exe().ok().as_deref(),
            std::env::current_dir().ok().as_deref(),
        );
        Self {
            data_path: pick_data_file(&candidates, Path::exists),
            ..Self::default()
        }
    }
}

/// Where the data file may live, in priority order: next to the executable,
/// under `data/` in the working directory, under `data/` in the crate root.
fn data_file_candidates(exe: Option<&Path>, cwd: Option<&Path>) -> Vec<PathBuf> {
    let mut candidates = Vec::new();
    if let Some(dir) = exe.and_then(Path::parent) {
        candidates.push(dir.join(DATA_FILE_NAME));
    }
    if let Some(dir) = cwd {
        candidates.push(dir.join("data").join(DATA_FILE_NAME));
    }
    candidates.push(
        Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("data")
            .join(DATA_FILE_NAME),
    );
    candidates
}

/// First candidate that exists; otherwise the first candidate, so the load
/// error names the primary location.
fn pick_data_file(candidates: &[PathBuf], exists: impl Fn(&Path) -> bool) -> PathBuf {
    candidates
        .iter()
        .find(|p| exists(p))
        .or_else(|| candidates.first())
        .cloned()
        .unwrap_or_else(|| PathBuf::from(DATA_FILE_NAME))
}
