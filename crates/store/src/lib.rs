//! Level storage - definitions, progress counter and the resumable save
//!
//! - [`LevelStore`]: picks the board to play and persists progress
//! - [`LevelData`]: on-disk shape of both level files and the save
//! - [`StoreConfig`]: directories, overridable from the environment

pub mod config;
pub mod file;
pub mod levels;

pub use config::StoreConfig;
pub use file::JsonFile;
pub use levels::{LevelData, LevelStore, FIRST_LEVEL};
