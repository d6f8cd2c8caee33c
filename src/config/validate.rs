// src/config/validate.rs

use crate::config::model::{AppConfig, RawConfigFile};
use crate::errors::{AppError, Result};

/// Highest `--crispness` level the pitch shifter accepts.
const MAX_CRISPNESS: u8 = 6;

/// Smallest log panel we allow; anything below makes the panel useless.
const MIN_LOG_CAPACITY: usize = 1024;

impl TryFrom<RawConfigFile> for AppConfig {
    type Error = AppError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        validate_raw_config(&raw)?;
        Ok(AppConfig::new_unchecked(raw))
    }
}

pub fn validate_raw_config(cfg: &RawConfigFile) -> Result<()> {
    validate_tools(cfg)?;
    validate_paths(cfg)?;
    validate_download(cfg)?;
    validate_pitch(cfg)?;
    validate_ui(cfg)?;
    Ok(())
}

fn validate_tools(cfg: &RawConfigFile) -> Result<()> {
    let tools = [
        ("downloader", &cfg.tools.downloader),
        ("python", &cfg.tools.python),
        ("separation_module", &cfg.tools.separation_module),
        ("pitch_shifter", &cfg.tools.pitch_shifter),
    ];
    for (key, value) in tools {
        if value.trim().is_empty() {
            return Err(AppError::ConfigError(format!(
                "[tools].{key} must not be empty"
            )));
        }
    }
    Ok(())
}

fn validate_paths(cfg: &RawConfigFile) -> Result<()> {
    let p = &cfg.paths;
    let dirs = [
        ("downloads", p.downloads_dir()),
        ("separated", p.separated_dir()),
        ("pitch_shifted", p.pitch_shifted_dir()),
    ];

    for (i, (name_a, dir_a)) in dirs.iter().enumerate() {
        for (name_b, dir_b) in dirs.iter().skip(i + 1) {
            if dir_a == dir_b {
                return Err(AppError::ConfigError(format!(
                    "[paths].{name_a} and [paths].{name_b} point at the same directory {}",
                    dir_a.display()
                )));
            }
        }
    }
    Ok(())
}

fn validate_download(cfg: &RawConfigFile) -> Result<()> {
    let fmt = cfg.download.audio_format.trim();
    if fmt.is_empty() || fmt.contains(['.', '/', '\\']) {
        return Err(AppError::ConfigError(format!(
            "[download].audio_format must be a bare extension like \"wav\" (got {:?})",
            cfg.download.audio_format
        )));
    }
    if cfg.separation.two_stems.trim().is_empty() {
        return Err(AppError::ConfigError(
            "[separation].two_stems must not be empty".to_string(),
        ));
    }
    Ok(())
}

fn validate_pitch(cfg: &RawConfigFile) -> Result<()> {
    if cfg.pitch.crispness > MAX_CRISPNESS {
        return Err(AppError::ConfigError(format!(
            "[pitch].crispness must be between 0 and {MAX_CRISPNESS} (got {})",
            cfg.pitch.crispness
        )));
    }
    Ok(())
}

fn validate_ui(cfg: &RawConfigFile) -> Result<()> {
    if cfg.ui.log_capacity < MIN_LOG_CAPACITY {
        return Err(AppError::ConfigError(format!(
            "[ui].log_capacity must be >= {MIN_LOG_CAPACITY} (got {})",
            cfg.ui.log_capacity
        )));
    }
    Ok(())
}
