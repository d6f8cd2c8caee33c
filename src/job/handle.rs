// src/job/handle.rs

use std::sync::Arc;
use std::thread;

use tokio::sync::mpsc;
use tracing::error;

use crate::exec::ProcessBackend;

use super::{Job, JobEvent, JobOutcome, JobReporter, JobRunner};

/// Run `job` on a dedicated background thread with its own current-thread
/// Tokio runtime, and return the receiving end of its event stream.
///
/// The stream always ends with a single `JobEvent::Finished`. Only failing to
/// create the thread itself is reported as an error.
pub fn spawn_job<B>(
    runner: Arc<JobRunner<B>>,
    job: Job,
) -> std::io::Result<mpsc::UnboundedReceiver<JobEvent>>
where
    B: ProcessBackend + 'static,
{
    let (reporter, rx) = JobReporter::channel();

    thread::Builder::new()
        .name("stemshift-job".to_string())
        .spawn(move || {
            let rt = match tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
            {
                Ok(rt) => rt,
                Err(err) => {
                    error!(error = %err, "failed to build job runtime");
                    reporter.finished(JobOutcome::failed(format!(
                        "could not start the job runtime: {err}"
                    )));
                    return;
                }
            };

            rt.block_on(runner.run(&job, &reporter));
        })?;

    Ok(rx)
}
