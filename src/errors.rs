// src/errors.rs

//! Crate-wide error types.
//!
//! - [`AppError`] covers startup concerns (config files, logging, CLI wiring).
//! - [`JobError`] covers everything that can go wrong inside a single job and
//!   is what ends up in the failure dialog.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Failure of one job step.
#[derive(Error, Debug)]
pub enum JobError {
    #[error("enter a URL or a file path")]
    EmptyInput,

    #[error("download failed (exit code {code})")]
    DownloadFailed { code: i32 },

    #[error("no downloaded file found in {}", dir.display())]
    NoDownloadedFile { dir: PathBuf },

    #[error("file does not exist: {}", path.display())]
    FileNotFound { path: PathBuf },

    #[error("separation failed (exit code {code})")]
    SeparationFailed { code: i32 },

    #[error("pitch shift failed (exit code {code})")]
    PitchShiftFailed { code: i32 },

    #[error("failed to start {tool}: {source}")]
    Spawn {
        tool: String,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, AppError>;
