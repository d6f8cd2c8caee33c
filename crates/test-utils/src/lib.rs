pub mod builders;
pub mod fake_backend;

use std::sync::Once;

use stemshift::job::JobEvent;
use tokio::sync::mpsc;
use tracing_subscriber::{fmt, EnvFilter};

static INIT: Once = Once::new();

/// Initialise tracing for tests.
///
/// - Uses `with_test_writer()`, so logs are captured per-test.
/// - The Rust test harness only prints captured output for **failing** tests
///   (unless you run with `-- --nocapture`).
///
/// Enable levels with e.g.:
/// `RUST_LOG=debug cargo test`
pub fn init_tracing() {
    INIT.call_once(|| {
        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

        fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .with_target(true)
            .init();
    });
}

/// Run a future with a 5-second timeout.
#[allow(dead_code)]
pub async fn with_timeout<F, T>(f: F) -> T
where
    F: std::future::Future<Output = T>,
{
    tokio::time::timeout(std::time::Duration::from_secs(5), f)
        .await
        .expect("Test timed out after 5 seconds")
}

/// Collect every event currently queued on `rx` without waiting.
pub fn drain_events(rx: &mut mpsc::UnboundedReceiver<JobEvent>) -> Vec<JobEvent> {
    let mut events = Vec::new();
    while let Ok(ev) = rx.try_recv() {
        events.push(ev);
    }
    events
}

/// Receive events until the channel closes (the job thread is done).
pub async fn collect_until_closed(mut rx: mpsc::UnboundedReceiver<JobEvent>) -> Vec<JobEvent> {
    let mut events = Vec::new();
    while let Some(ev) = rx.recv().await {
        events.push(ev);
    }
    events
}

/// Just the `Progress` values, in order.
pub fn progress_values(events: &[JobEvent]) -> Vec<f32> {
    events
        .iter()
        .filter_map(|ev| match ev {
            JobEvent::Progress(p) => Some(*p),
            _ => None,
        })
        .collect()
}

/// Concatenated `Log` lines, for substring assertions.
pub fn log_text(events: &[JobEvent]) -> String {
    events
        .iter()
        .filter_map(|ev| match ev {
            JobEvent::Log(line) => Some(line.as_str()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("\n")
}
