// src/gui/app.rs

//! The iced application: form, progress bar and log panel.
//!
//! Jobs run on their own thread (see [`spawn_job`]); their events come back
//! through `Task::run` as `Message::Job` and are applied here, on the UI loop.

use std::path::PathBuf;
use std::sync::Arc;

use iced::futures::stream;
use iced::widget::{
    button, column, container, progress_bar, row, scrollable, text, text_input,
};
use iced::{Alignment, Element, Font, Length, Task};
use tokio::sync::mpsc;
use tracing::{debug, error, info};

use crate::config::AppConfig;
use crate::exec::RealProcessBackend;
use crate::job::{spawn_job, JobEvent, JobRunner};

use super::state::{FormState, Notice};

const AUDIO_EXTENSIONS: &[&str] = &["wav", "mp3", "flac"];

#[derive(Debug, Clone)]
pub enum Message {
    InputChanged(String),
    PitchChanged(String),
    Browse,
    FileSelected(Option<PathBuf>),
    Run,
    Job(JobEvent),
    JobChannelClosed,
    DialogClosed,
}

pub struct App {
    state: FormState,
    runner: Arc<JobRunner<RealProcessBackend>>,
}

impl App {
    pub fn new(config: AppConfig) -> (Self, Task<Message>) {
        let state = FormState::new(config.ui.log_capacity);
        let runner = Arc::new(JobRunner::new(config, RealProcessBackend::new()));
        (Self { state, runner }, Task::none())
    }

    pub fn title(&self) -> String {
        "Stem Separator & Key Changer".to_string()
    }

    pub fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::InputChanged(value) => {
                self.state.input = value;
                self.state.status = None;
                Task::none()
            }
            Message::PitchChanged(value) => {
                self.state.pitch = value;
                Task::none()
            }
            Message::Browse => browse_audio_file(),
            Message::FileSelected(Some(path)) => {
                self.state.input = path.display().to_string();
                self.state.status = None;
                Task::none()
            }
            Message::FileSelected(None) => Task::none(),
            Message::Run => self.start_job(),
            Message::Job(event) => {
                let scroll = matches!(event, JobEvent::Output(_) | JobEvent::Log(_));
                let notice = self.state.apply(event);

                let mut tasks = Vec::new();
                if scroll {
                    tasks.push(scroll_log_to_end());
                }
                if let Some(notice) = notice {
                    tasks.push(scroll_log_to_end());
                    tasks.push(show_notice(notice));
                }
                Task::batch(tasks)
            }
            Message::JobChannelClosed => match self.state.channel_closed() {
                Some(notice) => show_notice(notice),
                None => Task::none(),
            },
            Message::DialogClosed => Task::none(),
        }
    }

    fn start_job(&mut self) -> Task<Message> {
        let Some(job) = self.state.submit() else {
            debug!(status = ?self.state.status, "run ignored");
            return Task::none();
        };

        info!(input = %job.input, mode = %job.mode, "starting job");
        match spawn_job(Arc::clone(&self.runner), job) {
            Ok(rx) => Task::run(job_events(rx), Message::Job)
                .chain(Task::done(Message::JobChannelClosed)),
            Err(err) => {
                error!(error = %err, "could not spawn job thread");
                show_notice(self.state.start_failed(format!("could not start the job: {err}")))
            }
        }
    }

    pub fn view(&self) -> Element<'_, Message> {
        let state = &self.state;

        let input_row = row![
            text_input("YouTube URL or audio file path", &state.input)
                .on_input(Message::InputChanged)
                .on_submit(Message::Run)
                .width(Length::Fill),
            button("Browse...").on_press(Message::Browse),
        ]
        .spacing(8)
        .align_y(Alignment::Center);

        let options_row = row![
            text("Pitch (semitones, 0 = separate vocals):"),
            text_input("0", &state.pitch)
                .on_input(Message::PitchChanged)
                .width(Length::Fixed(60.0)),
            text("e.g. +2, -1"),
        ]
        .spacing(8)
        .align_y(Alignment::Center);

        let run_label = if state.running { "Working..." } else { "Start" };
        let run_button = button(text(run_label).size(16).width(Length::Fill).center())
            .padding(10)
            .width(Length::Fill)
            .on_press_maybe(state.can_run().then_some(Message::Run));

        let log_panel = scrollable(
            text(state.log.as_str())
                .font(Font::MONOSPACE)
                .size(12)
                .width(Length::Fill),
        )
        .id(log_id())
        .height(Length::Fill)
        .width(Length::Fill);

        let content = column![
            text("Input").size(14),
            input_row,
            text("Options").size(14),
            options_row,
            run_button,
            text(state.status_line()),
            progress_bar(0.0..=100.0, state.progress),
            text("Log").size(14),
            container(log_panel)
                .padding(4)
                .height(Length::Fill)
                .width(Length::Fill),
        ]
        .spacing(8)
        .padding(10);

        content.into()
    }
}

fn log_id() -> scrollable::Id {
    scrollable::Id::new("log-panel")
}

fn scroll_log_to_end() -> Task<Message> {
    scrollable::snap_to(log_id(), scrollable::RelativeOffset::END)
}

/// Turn the job's receiver into a stream for `Task::run`.
fn job_events(
    rx: mpsc::UnboundedReceiver<JobEvent>,
) -> impl iced::futures::Stream<Item = JobEvent> + Send + 'static {
    stream::unfold(rx, |mut rx| async move {
        let event = rx.recv().await?;
        Some((event, rx))
    })
}

fn browse_audio_file() -> Task<Message> {
    Task::perform(
        async {
            rfd::AsyncFileDialog::new()
                .set_title("Select an audio file")
                .add_filter("Audio Files", AUDIO_EXTENSIONS)
                .pick_file()
                .await
                .map(|f| f.path().to_path_buf())
        },
        Message::FileSelected,
    )
}

fn show_notice(notice: Notice) -> Task<Message> {
    let (level, title, description) = match notice {
        Notice::Success(message) => (rfd::MessageLevel::Info, "Done", message),
        Notice::Failure(message) => (
            rfd::MessageLevel::Error,
            "Error",
            format!("Something went wrong: {message}"),
        ),
    };

    Task::perform(
        async move {
            rfd::AsyncMessageDialog::new()
                .set_level(level)
                .set_title(title)
                .set_description(description)
                .set_buttons(rfd::MessageButtons::Ok)
                .show()
                .await
        },
        |_| Message::DialogClosed,
    )
}
