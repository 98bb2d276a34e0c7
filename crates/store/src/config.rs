use std::path::PathBuf;

/// Where level definitions are read from and progress is written to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    pub levels_dir: PathBuf,
    pub save_dir: PathBuf,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            levels_dir: PathBuf::from("levels"),
            save_dir: PathBuf::from("saves"),
        }
    }
}

impl StoreConfig {
    /// Create from environment variables
    ///
    /// - `MATCH3_LEVELS_DIR`: directory holding `level{n}.json`
    /// - `MATCH3_SAVE_DIR`: directory for the save and progress files
    pub fn from_env() -> Self {
        use std::env;

        fn dir(key: &str, default: &str) -> PathBuf {
            env::var(key)
                .ok()
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .map_or_else(|| PathBuf::from(default), PathBuf::from)
        }

        Self {
            levels_dir: dir("MATCH3_LEVELS_DIR", "levels"),
            save_dir: dir("MATCH3_SAVE_DIR", "saves"),
        }
    }

    pub fn new(levels_dir: impl Into<PathBuf>, save_dir: impl Into<PathBuf>) -> Self {
        Self {
            levels_dir: levels_dir.into(),
            save_dir: save_dir.into(),
        }
    }

    pub fn level_path(&self, level: u32) -> PathBuf {
        self.levels_dir.join(format!("level{level}.json"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_env_blank_falls_back() {
        std::env::set_var("MATCH3_LEVELS_DIR", "  ");
        std::env::set_var("MATCH3_SAVE_DIR", "/tmp/match3-saves");
        let config = StoreConfig::from_env();
        std::env::remove_var("MATCH3_LEVELS_DIR");
        std::env::remove_var("MATCH3_SAVE_DIR");

        assert_eq!(config.levels_dir, PathBuf::from("levels"));
        assert_eq!(config.save_dir, PathBuf::from("/tmp/match3-saves"));
    }

    #[test]
    fn test_level_path() {
        let config = StoreConfig::new("data", "saves");
        assert_eq!(config.level_path(3), PathBuf::from("data/level3.json"));
    }
}
