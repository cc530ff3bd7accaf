use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::battle::MatchState;
use crate::error::PersistError;

/// Key of the single record holding the match in progress.
pub const SAVE_KEY: &str = "match_state";

/// Bumped whenever the layout of `MatchState` changes incompatibly.
pub const SAVE_VERSION: u32 = 1;

#[derive(Debug, Serialize, Deserialize)]
struct SaveRecord {
    version: u32,
    state: MatchState,
}

/// File-backed store for the match in progress.
#[derive(Clone, Debug)]
pub struct SaveStore {
    dir: PathBuf,
}

impl SaveStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn record_path(&self) -> PathBuf {
        self.dir.join(format!("{SAVE_KEY}.json"))
    }

    pub async fn exists(&self) -> bool {
        tokio::fs::try_exists(self.record_path())
            .await
            .unwrap_or(false)
    }

    /// Overwrites the record with `state`. The record is written to a sibling
    /// temp file first and renamed, so a reader never sees a partial write.
    pub async fn save(&self, state: &MatchState) -> Result<(), PersistError> {
        tokio::fs::create_dir_all(&self.dir).await?;
        let record = SaveRecord {
            version: SAVE_VERSION,
            state: state.clone(),
        };
        let json = serde_json::to_string_pretty(&record)?;
        let path = self.record_path();
        let tmp = self.temp_path();
        tokio::fs::write(&tmp, json).await?;
        tokio::fs::rename(&tmp, &path).await?;
        debug!(path = %path.display(), "match saved");
        Ok(())
    }

    /// Reads the saved match. Anything short of a well-formed record of the
    /// current version counts as no save.
    pub async fn load(&self) -> Option<MatchState> {
        let path = self.record_path();
        let json = match tokio::fs::read_to_string(&path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => return None,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "failed to read save file");
                return None;
            }
        };
        let record: SaveRecord = match serde_json::from_str(&json) {
            Ok(record) => record,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "save file corrupted");
                return None;
            }
        };
        if record.version != SAVE_VERSION {
            warn!(
                found = record.version,
                expected = SAVE_VERSION,
                "ignoring save from another version"
            );
            return None;
        }
        if let Err(e) = record.state.validate() {
            warn!(error = %e, "ignoring inconsistent save");
            return None;
        }
        Some(record.state)
    }

    /// Removes the record. The temp sibling goes first, so a save whose
    /// rename is still pending either fails or lands before the record is
    /// removed.
    pub async fn clear(&self) -> Result<(), PersistError> {
        remove_if_present(&self.temp_path()).await?;
        remove_if_present(&self.record_path()).await
    }

    fn temp_path(&self) -> PathBuf {
        self.record_path().with_extension("json.tmp")
    }
}

async fn remove_if_present(path: &Path) -> Result<(), PersistError> {
    match tokio::fs::remove_file(path).await {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e.into()),
    }
}

pub fn default_save_dir() -> PathBuf {
    dirs_next::data_local_dir()
        .map(|dir| dir.join("pokeduel"))
        .unwrap_or_else(|| PathBuf::from("."))
}
