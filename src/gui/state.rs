// src/gui/state.rs

//! Window state and how job events change it. No iced types in here, so the
//! behaviour of the form is testable on its own.

use crate::job::{Job, JobEvent, JobOutcome, Stage};

use super::log_buffer::LogBuffer;

/// A blocking dialog the window should raise.
#[derive(Debug, Clone, PartialEq)]
pub enum Notice {
    Success(String),
    Failure(String),
}

#[derive(Debug, Clone)]
pub struct FormState {
    pub input: String,
    pub pitch: String,
    pub running: bool,
    pub progress: f32,
    pub stage: Option<Stage>,
    /// Inline message under the form (input validation).
    pub status: Option<String>,
    pub log: LogBuffer,
}

impl FormState {
    pub fn new(log_capacity: usize) -> Self {
        Self {
            input: String::new(),
            pitch: "0".to_string(),
            running: false,
            progress: 0.0,
            stage: None,
            status: None,
            log: LogBuffer::new(log_capacity),
        }
    }

    /// The run button is enabled only while idle.
    pub fn can_run(&self) -> bool {
        !self.running
    }

    /// Validate the form and, if it holds a job, switch to running.
    ///
    /// Returns `None` while a job is already running or when the input is
    /// empty (the reason is left in `status`).
    pub fn submit(&mut self) -> Option<Job> {
        if self.running {
            return None;
        }

        match Job::from_form(&self.input, &self.pitch) {
            Ok(job) => {
                self.running = true;
                self.progress = 0.0;
                self.stage = None;
                self.status = None;
                self.log.push_line(&format!("=== {} : {} ===", job.mode, job.input));
                Some(job)
            }
            Err(err) => {
                self.status = Some(err.to_string());
                None
            }
        }
    }

    /// Apply one event from the running job.
    pub fn apply(&mut self, event: JobEvent) -> Option<Notice> {
        match event {
            JobEvent::Stage(stage) => {
                self.stage = Some(stage);
                None
            }
            JobEvent::Output(text) => {
                self.log.push_str(&text);
                None
            }
            JobEvent::Log(line) => {
                self.log.push_line(&line);
                None
            }
            JobEvent::Progress(percent) => {
                self.progress = percent;
                None
            }
            JobEvent::Finished(outcome) => Some(self.finish(outcome)),
        }
    }

    /// The event stream ended. Only matters if no `Finished` arrived.
    pub fn channel_closed(&mut self) -> Option<Notice> {
        if !self.running {
            return None;
        }
        Some(self.finish(JobOutcome::failed("the job stopped without reporting a result")))
    }

    /// The background job could not even be started.
    pub fn start_failed(&mut self, message: String) -> Notice {
        self.log.push_line(&format!("Error: {message}"));
        self.finish(JobOutcome::failed(message))
    }

    fn finish(&mut self, outcome: JobOutcome) -> Notice {
        self.running = false;
        self.stage = None;
        match outcome {
            JobOutcome::Succeeded { message, .. } => Notice::Success(message),
            JobOutcome::Failed { message } => Notice::Failure(message),
        }
    }

    /// One-line description of what is going on, for the status label.
    pub fn status_line(&self) -> String {
        if let Some(status) = &self.status {
            return status.clone();
        }
        match (self.running, self.stage) {
            (true, Some(stage)) => format!("Running {stage}... {:.1}%", self.progress),
            (true, None) => "Starting...".to_string(),
            (false, _) => "Idle".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::JobMode;
    use std::path::PathBuf;

    fn running_state() -> FormState {
        let mut state = FormState::new(4096);
        state.input = "/tmp/song.wav".to_string();
        state.pitch = "+2".to_string();
        let job = state.submit().expect("job starts");
        assert_eq!(job.mode, JobMode::PitchShift { semitones: 2 });
        state
    }

    #[test]
    fn empty_input_is_reported_inline() {
        let mut state = FormState::new(4096);
        state.input = "   ".to_string();

        assert_eq!(state.submit(), None);
        assert!(state.can_run());
        assert!(state.status.is_some());
    }

    #[test]
    fn second_submit_while_running_is_ignored() {
        let mut state = running_state();
        assert!(!state.can_run());
        assert_eq!(state.submit(), None);
    }

    #[test]
    fn success_reenables_and_raises_success_notice() {
        let mut state = running_state();
        state.apply(JobEvent::Progress(40.0));
        let notice = state.apply(JobEvent::Finished(JobOutcome::Succeeded {
            output: PathBuf::from("/out/song_pitch_+2.wav"),
            message: "done".to_string(),
        }));

        assert_eq!(notice, Some(Notice::Success("done".to_string())));
        assert!(state.can_run());
    }

    #[test]
    fn failure_reenables_and_raises_failure_notice() {
        let mut state = running_state();
        let notice = state.apply(JobEvent::Finished(JobOutcome::failed("boom")));

        assert_eq!(notice, Some(Notice::Failure("boom".to_string())));
        assert!(state.can_run());
    }

    #[test]
    fn closed_channel_without_finish_still_reenables() {
        let mut state = running_state();
        assert!(matches!(state.channel_closed(), Some(Notice::Failure(_))));
        assert!(state.can_run());
        assert_eq!(state.channel_closed(), None);
    }

    #[test]
    fn output_and_progress_reach_the_panel() {
        let mut state = running_state();
        state.apply(JobEvent::Stage(Stage::PitchShift));
        state.apply(JobEvent::Output(" 50%\r".to_string()));
        state.apply(JobEvent::Progress(50.0));

        assert_eq!(state.progress, 50.0);
        assert!(state.log.as_str().contains(" 50%"));
        assert_eq!(state.status_line(), "Running pitch shift... 50.0%");
    }
}
