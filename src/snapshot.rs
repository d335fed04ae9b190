use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use serde::Serialize;

use crate::world::{World, WorldSnapshot};

#[derive(Serialize)]
struct SnapshotFile<'a> {
    written_at: String,
    world: &'a WorldSnapshot,
}

/// Writes periodic world snapshots as pretty JSON under
/// `<dir>/<scenario>/t_<clock>.json`. An interval of zero disables writing.
pub struct SnapshotWriter {
    dir: PathBuf,
    interval_ms: u64,
    next_due_ms: u64,
}

impl SnapshotWriter {
    pub fn new(dir: impl AsRef<Path>, interval_ms: u64) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
            interval_ms,
            next_due_ms: interval_ms,
        }
    }

    pub fn maybe_write(
        &mut self,
        world: &World,
        scenario: &str,
        clock_ms: u64,
    ) -> Result<Option<PathBuf>> {
        if self.interval_ms == 0 || clock_ms < self.next_due_ms {
            return Ok(None);
        }
        while self.next_due_ms <= clock_ms {
            self.next_due_ms += self.interval_ms;
        }
        let dir = self.dir.join(scenario);
        fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create snapshot directory {}", dir.display()))?;
        let path = dir.join(format!("t_{clock_ms:08}.json"));
        let snapshot = world.snapshot(scenario, clock_ms);
        let file = SnapshotFile {
            written_at: chrono::Utc::now().to_rfc3339(),
            world: &snapshot,
        };
        let json = serde_json::to_string_pretty(&file)?;
        fs::write(&path, json)
            .with_context(|| format!("Failed to write snapshot {}", path.display()))?;
        Ok(Some(path))
    }
}
