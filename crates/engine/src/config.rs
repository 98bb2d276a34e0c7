//! Engine timing configuration.

use std::time::Duration;

use match3_types::{DESTROY_MS, FALL_MS, SWAP_MS};

/// Animation windows the resolver waits out between mutation bursts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineConfig {
    pub swap_duration: Duration,
    pub fall_duration: Duration,
    pub destroy_duration: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            swap_duration: Duration::from_millis(SWAP_MS),
            fall_duration: Duration::from_millis(FALL_MS),
            destroy_duration: Duration::from_millis(DESTROY_MS),
        }
    }
}

impl EngineConfig {
    /// Create from environment variables
    ///
    /// - `MATCH3_SWAP_MS`: swap animation window
    /// - `MATCH3_FALL_MS`: fall animation window
    /// - `MATCH3_DESTROY_MS`: clear animation window
    ///
    /// Missing or unparsable values fall back to the defaults.
    pub fn from_env() -> Self {
        fn millis(key: &str, default: u64) -> Duration {
            let ms = std::env::var(key)
                .ok()
                .and_then(|s| s.trim().parse().ok())
                .unwrap_or(default);
            Duration::from_millis(ms)
        }

        Self {
            swap_duration: millis("MATCH3_SWAP_MS", SWAP_MS),
            fall_duration: millis("MATCH3_FALL_MS", FALL_MS),
            destroy_duration: millis("MATCH3_DESTROY_MS", DESTROY_MS),
        }
    }

    /// Same window for every step; handy in tests.
    pub fn uniform(duration: Duration) -> Self {
        Self {
            swap_duration: duration,
            fall_duration: duration,
            destroy_duration: duration,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_env_overrides_and_fallbacks() {
        std::env::set_var("MATCH3_SWAP_MS", "250");
        std::env::set_var("MATCH3_DESTROY_MS", "not-a-number");
        let config = EngineConfig::from_env();
        std::env::remove_var("MATCH3_SWAP_MS");
        std::env::remove_var("MATCH3_DESTROY_MS");

        assert_eq!(config.swap_duration, Duration::from_millis(250));
        assert_eq!(config.fall_duration, Duration::from_millis(FALL_MS));
        assert_eq!(config.destroy_duration, Duration::from_millis(DESTROY_MS));
    }
}
