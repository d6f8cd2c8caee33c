// src/job/mod.rs

//! One run of the pipeline: optional download, then separation or pitch
//! shift.
//!
//! - [`events`]: what a running job reports (`JobEvent`, `JobReporter`).
//! - [`artifact`]: locating the file a step produced.
//! - [`runner`]: the step sequence itself, independent of any UI.
//! - [`handle`]: running a job on its own background thread.

pub mod artifact;
pub mod events;
pub mod handle;
pub mod runner;

use std::path::PathBuf;

use crate::errors::JobError;
use crate::types::JobMode;

pub use events::{JobEvent, JobOutcome, JobReporter, Stage};
pub use handle::spawn_job;
pub use runner::JobRunner;

/// A submitted job. Lives for one run; never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Job {
    pub input: String,
    pub mode: JobMode,
}

impl Job {
    /// Build a job from the two form fields.
    ///
    /// Fails only on an empty input; the pitch field never fails (see
    /// [`JobMode::from_pitch_field`]).
    pub fn from_form(input: &str, pitch_field: &str) -> Result<Self, JobError> {
        let input = input.trim();
        if input.is_empty() {
            return Err(JobError::EmptyInput);
        }
        Ok(Self {
            input: input.to_string(),
            mode: JobMode::from_pitch_field(pitch_field),
        })
    }

    pub fn source(&self) -> JobInput {
        JobInput::classify(&self.input)
    }
}

/// Where the audio comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobInput {
    Url(String),
    LocalFile(PathBuf),
}

impl JobInput {
    /// `http://` and `https://` inputs are downloaded; anything else is a path.
    pub fn classify(input: &str) -> Self {
        let input = input.trim();
        if input.starts_with("http://") || input.starts_with("https://") {
            JobInput::Url(input.to_string())
        } else {
            JobInput::LocalFile(PathBuf::from(input))
        }
    }
}
