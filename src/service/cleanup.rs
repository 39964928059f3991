//! Age-based sweep of generated artifacts.

use chrono::{DateTime, Duration, Utc};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::warn;

use super::output::{ARTIFACT_EXTENSIONS, ARTIFACT_PREFIX};
use crate::error::{Error, Result};

/// Statistics from a cleanup pass
#[derive(Debug, Clone, Default)]
pub struct CleanupStats {
    /// Number of artifacts looked at
    pub items_scanned: usize,
    /// Number of artifacts removed
    pub items_removed: usize,
    /// Per-file failures; these never abort the sweep
    pub errors: Vec<String>,
}

impl CleanupStats {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Remove generated artifacts in `dir` last modified more than `max_age` ago.
pub async fn clean_artifacts_by_age(dir: &Path, max_age: Duration) -> Result<CleanupStats> {
    let mut stats = CleanupStats::new();

    if !dir.exists() {
        return Ok(stats);
    }

    let cutoff = Utc::now() - max_age;

    for path in artifact_paths(dir)? {
        stats.items_scanned += 1;

        let metadata = match fs::metadata(&path).await {
            Ok(m) => m,
            Err(e) => {
                stats
                    .errors
                    .push(format!("Failed to stat {}: {}", path.display(), e));
                continue;
            }
        };

        let modified: DateTime<Utc> = match metadata.modified() {
            Ok(time) => time.into(),
            Err(e) => {
                stats.errors.push(format!(
                    "No modification time for {}: {}",
                    path.display(),
                    e
                ));
                continue;
            }
        };

        if modified >= cutoff {
            continue;
        }

        if let Err(e) = fs::remove_file(&path).await {
            stats
                .errors
                .push(format!("Failed to remove {}: {}", path.display(), e));
            continue;
        }

        stats.items_removed += 1;
    }

    Ok(stats)
}

fn artifact_paths(dir: &Path) -> Result<Vec<PathBuf>> {
    let base = glob::Pattern::escape(&dir.to_string_lossy());
    let mut paths = Vec::new();

    for ext in ARTIFACT_EXTENSIONS {
        let pattern = format!("{base}/{ARTIFACT_PREFIX}*.{ext}");
        let entries = glob::glob(&pattern)
            .map_err(|e| Error::Internal(format!("Invalid cleanup pattern {pattern}: {e}")))?;

        for entry in entries {
            match entry {
                Ok(path) => paths.push(path),
                Err(e) => warn!("Skipping unreadable entry during cleanup: {}", e),
            }
        }
    }

    Ok(paths)
}
