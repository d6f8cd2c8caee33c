// src/gui/mod.rs

//! Desktop window.
//!
//! - [`app`]: the iced application (messages, update, view).
//! - [`state`]: the toolkit-free form state that job events are applied to.
//! - [`log_buffer`]: the bounded text buffer behind the log panel.

pub mod app;
pub mod log_buffer;
pub mod state;

pub use app::{App, Message};
pub use log_buffer::LogBuffer;
pub use state::{FormState, Notice};

use crate::config::AppConfig;

/// Open the window and block until it is closed.
pub fn run(config: AppConfig) -> iced::Result {
    iced::application(App::title, App::update, App::view)
        .window_size((600.0, 600.0))
        .run_with(move || App::new(config))
}
