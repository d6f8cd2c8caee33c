// src/job/events.rs

//! Events a running job posts to whoever displays it.
//!
//! The background context never touches UI state directly; it sends
//! [`JobEvent`]s through a [`JobReporter`] and the UI loop applies them.

use std::fmt;
use std::path::PathBuf;

use tokio::sync::mpsc;
use tracing::trace;

/// Pipeline step currently running.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Download,
    Separate,
    PitchShift,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Stage::Download => "download",
            Stage::Separate => "separation",
            Stage::PitchShift => "pitch shift",
        };
        f.write_str(s)
    }
}

/// Terminal result of a job.
#[derive(Debug, Clone, PartialEq)]
pub enum JobOutcome {
    Succeeded { output: PathBuf, message: String },
    Failed { message: String },
}

impl JobOutcome {
    pub fn failed(message: impl Into<String>) -> Self {
        JobOutcome::Failed {
            message: message.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, JobOutcome::Succeeded { .. })
    }

    pub fn message(&self) -> &str {
        match self {
            JobOutcome::Succeeded { message, .. } | JobOutcome::Failed { message } => message,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum JobEvent {
    /// A pipeline step started.
    Stage(Stage),
    /// Raw text relayed from a child process (may be a partial line).
    Output(String),
    /// A complete line written by the runner itself.
    Log(String),
    /// New progress value, in percent.
    Progress(f32),
    /// The job is over. Sent exactly once, always last.
    Finished(JobOutcome),
}

/// Sending half handed to the runner and the output relay.
///
/// Sends never block and never fail loudly: if the receiver is gone (window
/// closed mid-job) the events are dropped.
#[derive(Debug, Clone)]
pub struct JobReporter {
    tx: mpsc::UnboundedSender<JobEvent>,
}

impl JobReporter {
    pub fn new(tx: mpsc::UnboundedSender<JobEvent>) -> Self {
        Self { tx }
    }

    /// Reporter plus the receiver the display side drains.
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<JobEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self::new(tx), rx)
    }

    pub fn stage(&self, stage: Stage) {
        self.send(JobEvent::Stage(stage));
    }

    pub fn output(&self, text: impl Into<String>) {
        self.send(JobEvent::Output(text.into()));
    }

    pub fn log(&self, line: impl Into<String>) {
        self.send(JobEvent::Log(line.into()));
    }

    pub fn progress(&self, percent: f32) {
        self.send(JobEvent::Progress(percent));
    }

    pub fn finished(&self, outcome: JobOutcome) {
        self.send(JobEvent::Finished(outcome));
    }

    fn send(&self, event: JobEvent) {
        if self.tx.send(event).is_err() {
            trace!("job event receiver dropped; discarding event");
        }
    }
}
