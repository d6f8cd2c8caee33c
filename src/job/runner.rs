// src/job/runner.rs

//! The job pipeline.
//!
//! 1. make sure the three sink directories exist
//! 2. resolve the input: download a URL, or check a local path
//! 3. reset progress and run exactly one processing step
//! 4. report the outcome
//!
//! The runner knows nothing about windows or threads. It talks to the outside
//! through a [`ProcessBackend`], a [`FileSystem`] and a [`JobReporter`].

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{error, info, warn};

use crate::config::AppConfig;
use crate::errors::JobError;
use crate::exec::{tools, ProcessBackend, ProcessOutcome};
use crate::fs::{FileSystem, RealFileSystem};
use crate::types::JobMode;

use super::artifact::latest_artifact;
use super::{Job, JobInput, JobOutcome, JobReporter, Stage};

/// What a successful processing step produced.
#[derive(Debug)]
struct Completed {
    output: PathBuf,
    message: String,
}

pub struct JobRunner<B: ProcessBackend> {
    config: AppConfig,
    backend: B,
    fs: Arc<dyn FileSystem>,
}

impl<B: ProcessBackend> std::fmt::Debug for JobRunner<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JobRunner")
            .field("config", &self.config)
            .field("fs", &self.fs)
            .finish_non_exhaustive()
    }
}

impl<B: ProcessBackend> JobRunner<B> {
    /// Runner on the real filesystem.
    pub fn new(config: AppConfig, backend: B) -> Self {
        Self::with_fs(config, backend, Arc::new(RealFileSystem))
    }

    pub fn with_fs(config: AppConfig, backend: B, fs: Arc<dyn FileSystem>) -> Self {
        Self {
            config,
            backend,
            fs,
        }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Run `job` to completion.
    ///
    /// Never fails: errors become a [`JobOutcome::Failed`]. A
    /// [`JobEvent::Finished`](super::JobEvent::Finished) is always the last
    /// event sent, even if this future is dropped halfway.
    pub async fn run(&self, job: &Job, reporter: &JobReporter) -> JobOutcome {
        let guard = FinishGuard::new(reporter);

        info!(input = %job.input, mode = %job.mode, "job started");
        reporter.progress(0.0);

        let outcome = match self.run_steps(job, reporter).await {
            Ok(done) => {
                reporter.progress(100.0);
                reporter.log(format!("\n{}", done.message));
                info!(output = %done.output.display(), "job finished");
                JobOutcome::Succeeded {
                    output: done.output,
                    message: done.message,
                }
            }
            Err(err) => {
                error!(error = %err, "job failed");
                reporter.log(format!("\nError: {err}"));
                JobOutcome::failed(err.to_string())
            }
        };

        guard.finish(outcome.clone());
        outcome
    }

    async fn run_steps(&self, job: &Job, reporter: &JobReporter) -> Result<Completed, JobError> {
        self.prepare_dirs()?;

        let input = self.resolve_input(job, reporter).await?;

        reporter.progress(0.0);

        match job.mode {
            JobMode::Separate => self.separate(&input, reporter).await,
            JobMode::PitchShift { semitones } => {
                self.pitch_shift(&input, semitones, reporter).await
            }
        }
    }

    fn prepare_dirs(&self) -> Result<(), JobError> {
        let paths = &self.config.paths;
        for dir in [
            paths.downloads_dir(),
            paths.separated_dir(),
            paths.pitch_shifted_dir(),
        ] {
            self.fs.create_dir_all(&dir)?;
        }
        Ok(())
    }

    async fn resolve_input(&self, job: &Job, reporter: &JobReporter) -> Result<PathBuf, JobError> {
        match job.source() {
            JobInput::Url(url) => self.download(&url, reporter).await,
            JobInput::LocalFile(path) => {
                reporter.log(format!("[1/2] Using local file {}", path.display()));
                if !self.fs.exists(&path) {
                    return Err(JobError::FileNotFound { path });
                }
                Ok(path)
            }
        }
    }

    async fn download(&self, url: &str, reporter: &JobReporter) -> Result<PathBuf, JobError> {
        reporter.stage(Stage::Download);
        reporter.log(format!("[1/2] Downloading {url}"));

        let invocation = tools::download(&self.config, url);
        if let ProcessOutcome::Failed(code) =
            self.backend.run_streaming(&invocation, reporter).await?
        {
            return Err(JobError::DownloadFailed { code });
        }

        let dir = self.config.paths.downloads_dir();
        let found = latest_artifact(self.fs.as_ref(), &dir, &self.config.download.audio_format)?;
        let Some(path) = found else {
            warn!(dir = %dir.display(), "downloader exited cleanly but left no audio file");
            return Err(JobError::NoDownloadedFile { dir });
        };

        reporter.log(format!("\nDownloaded: {}", display_name(&path)));
        Ok(path)
    }

    async fn separate(&self, input: &Path, reporter: &JobReporter) -> Result<Completed, JobError> {
        reporter.stage(Stage::Separate);
        reporter.log(format!(
            "\n[2/2] Separating {} ({} / rest)...",
            display_name(input),
            self.config.separation.two_stems
        ));
        if self.config.separation.acceleration.enabled() {
            reporter.log(format!(
                "Using accelerated model {} on {}",
                self.config.separation.accelerated_model, self.config.separation.accelerated_device
            ));
        }

        let invocation = tools::separate(&self.config, input);
        if let ProcessOutcome::Failed(code) =
            self.backend.run_streaming(&invocation, reporter).await?
        {
            return Err(JobError::SeparationFailed { code });
        }

        let output = tools::separation_output_dir(&self.config, input);
        Ok(Completed {
            message: format!("Separation finished. Stems saved to {}", output.display()),
            output,
        })
    }

    async fn pitch_shift(
        &self,
        input: &Path,
        semitones: i32,
        reporter: &JobReporter,
    ) -> Result<Completed, JobError> {
        reporter.stage(Stage::PitchShift);
        reporter.log(format!(
            "\n[2/2] Shifting {} by {semitones:+} semitones...",
            display_name(input)
        ));

        let output = tools::pitch_output_path(&self.config, input, semitones);
        let invocation = tools::pitch_shift(&self.config, input, &output, semitones);
        if let ProcessOutcome::Failed(code) = self.backend.run_captured(&invocation).await? {
            return Err(JobError::PitchShiftFailed { code });
        }

        Ok(Completed {
            message: format!("Pitch shift finished: {}", output.display()),
            output,
        })
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Sends `Finished` exactly once: explicitly through [`FinishGuard::finish`],
/// or from `Drop` if the job future is torn down before reaching it.
struct FinishGuard<'a> {
    reporter: &'a JobReporter,
    done: bool,
}

impl<'a> FinishGuard<'a> {
    fn new(reporter: &'a JobReporter) -> Self {
        Self {
            reporter,
            done: false,
        }
    }

    fn finish(mut self, outcome: JobOutcome) {
        self.done = true;
        self.reporter.finished(outcome);
    }
}

impl Drop for FinishGuard<'_> {
    fn drop(&mut self) {
        if !self.done {
            warn!("job stopped before reporting an outcome");
            self.reporter
                .finished(JobOutcome::failed("the job was interrupted"));
        }
    }
}
