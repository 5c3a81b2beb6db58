//! Snapshot recording and replay of the resolution phase.
//!
//! Recording captures the resolved candidates of a run to a JSON-lines
//! file. A later run in replay mode loads that file instead of calling the
//! helpdesk, which makes reruns after a downstream failure cheap and lets
//! a dry run be inspected offline.

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use thiserror::Error;

use crate::models::ResolvedCandidate;

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("Snapshot IO error for {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Snapshot serialization error: {0}")]
    Serialize(serde_json::Error),

    #[error("Snapshot parse error in {path} at line {line}: {source}")]
    Parse {
        path: String,
        line: usize,
        #[source]
        source: serde_json::Error,
    },
}

pub type SnapshotResult<T> = Result<T, SnapshotError>;

fn io_error(path: &Path, source: std::io::Error) -> SnapshotError {
    SnapshotError::Io {
        path: path.display().to_string(),
        source,
    }
}

/// Write resolved candidates to a JSON-lines snapshot, one per line.
pub fn write_snapshot(path: &Path, candidates: &[ResolvedCandidate]) -> SnapshotResult<()> {
    let file = File::create(path).map_err(|e| io_error(path, e))?;
    let mut writer = BufWriter::new(file);

    for candidate in candidates {
        let line = serde_json::to_string(candidate).map_err(SnapshotError::Serialize)?;
        writer
            .write_all(line.as_bytes())
            .and_then(|()| writer.write_all(b"\n"))
            .map_err(|e| io_error(path, e))?;
    }

    writer.flush().map_err(|e| io_error(path, e))
}

/// Load resolved candidates from a JSON-lines snapshot.
///
/// Blank lines are skipped; anything else that fails to parse aborts the
/// load, since replaying half a snapshot would silently drop candidates.
pub fn load_snapshot(path: &Path) -> SnapshotResult<Vec<ResolvedCandidate>> {
    let file = File::open(path).map_err(|e| io_error(path, e))?;
    let reader = BufReader::new(file);

    let mut candidates = Vec::new();
    for (idx, line) in reader.lines().enumerate() {
        let line = line.map_err(|e| io_error(path, e))?;
        if line.trim().is_empty() {
            continue;
        }

        let candidate =
            serde_json::from_str(&line).map_err(|e| SnapshotError::Parse {
                path: path.display().to_string(),
                line: idx + 1,
                source: e,
            })?;
        candidates.push(candidate);
    }

    Ok(candidates)
}
