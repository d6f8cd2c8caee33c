use std::path::PathBuf;

use stemshift::config::{AppConfig, RawConfigFile};
use stemshift::types::Acceleration;

/// Builder for `AppConfig` to simplify test setup.
///
/// Uses a base directory of `/work`, no extra search dirs and acceleration
/// off, so command lines are identical on every platform.
pub struct ConfigBuilder {
    config: RawConfigFile,
}

impl ConfigBuilder {
    pub fn new() -> Self {
        let mut config = RawConfigFile::default();
        config.paths.base_dir = PathBuf::from("/work");
        config.tools.extra_search_dir = None;
        config.tools.append_exe_dir = false;
        config.separation.acceleration = Acceleration::Never;
        Self { config }
    }

    pub fn build(self) -> AppConfig {
        AppConfig::try_from(self.config).expect("Failed to build valid config from builder")
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
