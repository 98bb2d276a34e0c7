//! Level definitions, progress and the in-progress save.
//!
//! Loading prefers the save file, so a player who quits mid-level resumes the
//! exact board. Without a save the current level's definition is read from
//! `level{n}.json`; a missing or unusable definition falls back to level 1.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Mutex, MutexGuard};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use match3_core::{Board, BoardError, BoardSnapshot};
use match3_types::CellRecord;

use crate::config::StoreConfig;
use crate::file::JsonFile;

pub const FIRST_LEVEL: u32 = 1;

const SAVE_NAME: &str = "LevelSave";
const PROGRESS_NAME: &str = "progress";

/// A level definition or a saved board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelData {
    pub level_number: u32,
    pub blocks: Vec<CellRecord>,
}

impl LevelData {
    pub fn from_snapshot(level_number: u32, snapshot: &BoardSnapshot) -> Self {
        Self {
            level_number,
            blocks: snapshot.cells.clone(),
        }
    }

    pub fn build_board(&self) -> Result<Board, BoardError> {
        Board::from_records(&self.blocks)
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct Progress {
    current_level: u32,
}

#[derive(Debug)]
pub struct LevelStore {
    config: StoreConfig,
    save: JsonFile,
    progress: JsonFile,
    current: AtomicU32,
    /// Bumped by every delete; held across snapshot writes.
    save_epoch: Mutex<u64>,
}

impl LevelStore {
    /// Open the store, restoring the current level from the progress file.
    pub fn open(config: StoreConfig) -> Self {
        let save = JsonFile::new(&config.save_dir, SAVE_NAME);
        let progress = JsonFile::new(&config.save_dir, PROGRESS_NAME);

        let current = match progress.read::<Progress>() {
            Ok(Some(p)) if p.current_level >= FIRST_LEVEL => p.current_level,
            Ok(_) => FIRST_LEVEL,
            Err(err) => {
                tracing::warn!(error = %format!("{err:#}"), "ignoring unreadable progress file");
                FIRST_LEVEL
            }
        };

        Self {
            config,
            save,
            progress,
            current: AtomicU32::new(current),
            save_epoch: Mutex::new(0),
        }
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    pub fn current_level(&self) -> u32 {
        self.current.load(Ordering::SeqCst)
    }

    pub fn set_current_level(&self, level: u32) {
        let level = level.max(FIRST_LEVEL);
        self.current.store(level, Ordering::SeqCst);
        if let Err(err) = self.progress.write(&Progress { current_level: level }) {
            tracing::error!(error = %format!("{err:#}"), level, "failed to persist progress");
        }
    }

    /// Advance the level counter; returns the new level.
    pub fn switch_to_next_level(&self) -> u32 {
        let next = self.current_level().saturating_add(1);
        self.set_current_level(next);
        next
    }

    /// Board to play now: the save if there is one, else the current level.
    pub async fn level_data(&self) -> Result<LevelData> {
        match self.save.read::<LevelData>() {
            Ok(Some(data)) => match data.build_board() {
                Ok(_) => {
                    tracing::info!(level = data.level_number, "resuming saved board");
                    return Ok(data);
                }
                Err(err) => {
                    tracing::warn!(error = %err, "discarding unusable save");
                    self.delete_save();
                }
            },
            Ok(None) => {}
            Err(err) => {
                tracing::error!(error = %format!("{err:#}"), "discarding unreadable save");
                self.delete_save();
            }
        }

        let level = self.current_level();
        match self.load_level_file(level).await {
            Ok(data) => Ok(data),
            Err(err) => {
                tracing::error!(level, error = %format!("{err:#}"), "failed to load level data");
                self.load_first_level().await
            }
        }
    }

    async fn load_first_level(&self) -> Result<LevelData> {
        self.set_current_level(FIRST_LEVEL);
        self.load_level_file(FIRST_LEVEL)
            .await
            .context("loading first level")
    }

    /// Read and validate `level{level}.json`.
    pub async fn load_level_file(&self, level: u32) -> Result<LevelData> {
        let path = self.config.level_path(level);
        let text = tokio::fs::read_to_string(&path)
            .await
            .with_context(|| format!("reading {}", path.display()))?;
        let data: LevelData =
            serde_json::from_str(&text).with_context(|| format!("parsing {}", path.display()))?;
        data.build_board()
            .with_context(|| format!("building board from {}", path.display()))?;

        tracing::info!(level, blocks = data.blocks.len(), "level loaded");
        Ok(data)
    }

    /// Best-effort save; failures are logged.
    pub fn save(&self, data: &LevelData) {
        match self.save.write(data) {
            Ok(()) => tracing::debug!(level = data.level_number, "board saved"),
            Err(err) => tracing::error!(error = %format!("{err:#}"), "failed to save board"),
        }
    }

    /// Save `snapshot` as the current level's board.
    pub fn save_snapshot(&self, snapshot: &BoardSnapshot) {
        self.save(&LevelData::from_snapshot(self.current_level(), snapshot));
    }

    /// Changes whenever the save is deleted.
    pub fn save_epoch(&self) -> u64 {
        *self.epoch()
    }

    /// Save `snapshot` unless the save was deleted after `epoch` was read.
    ///
    /// Returns whether the snapshot was written.
    pub fn save_snapshot_at(&self, epoch: u64, snapshot: &BoardSnapshot) -> bool {
        let current = self.epoch();
        if *current != epoch {
            tracing::debug!(epoch, current = *current, "dropping stale snapshot");
            return false;
        }
        self.save_snapshot(snapshot);
        true
    }

    pub fn has_save(&self) -> bool {
        self.save.exists()
    }

    pub fn delete_save(&self) {
        let mut epoch = self.epoch();
        *epoch += 1;
        if let Err(err) = self.save.delete() {
            tracing::error!(error = %format!("{err:#}"), "failed to delete save");
        }
    }

    fn epoch(&self) -> MutexGuard<'_, u64> {
        self.save_epoch
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use match3_types::Element::{Fire, Water};

    #[test]
    fn test_level_data_json_shape() {
        let data = LevelData {
            level_number: 2,
            blocks: vec![CellRecord::new(0, 1, Fire)],
        };
        let json = serde_json::to_value(&data).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "level_number": 2,
                "blocks": [{"row": 0, "column": 1, "element": "fire"}]
            })
        );
    }

    #[test]
    fn test_build_board_pads_missing_slots() {
        let data = LevelData {
            level_number: 1,
            blocks: vec![CellRecord::new(1, 1, Water)],
        };
        let board = data.build_board().unwrap();
        assert_eq!((board.rows(), board.columns()), (2, 2));
        assert!(board.get(0, 0).unwrap().is_empty());
    }
}
