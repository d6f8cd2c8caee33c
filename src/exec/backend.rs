// src/exec/backend.rs

//! Pluggable process backend.
//!
//! The job runner talks to a `ProcessBackend` instead of spawning processes
//! itself, so tests can script tool behaviour without touching the OS.
//!
//! - `RealProcessBackend` spawns real processes with `tokio::process`.
//! - Tests provide their own implementation (see the `test-utils` crate).

use std::ffi::OsString;
use std::future::Future;
use std::path::PathBuf;
use std::pin::Pin;
use std::process::{ExitStatus, Stdio};

use anyhow::Context;
use tokio::process::Command;
use tracing::{debug, info};

use crate::errors::JobError;
use crate::job::JobReporter;

use super::relay::relay_child;
use super::tools::ToolInvocation;

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Outcome of an external process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessOutcome {
    Success,
    /// Nonzero exit; `-1` when the process was killed by a signal.
    Failed(i32),
}

impl From<ExitStatus> for ProcessOutcome {
    fn from(status: ExitStatus) -> Self {
        if status.success() {
            ProcessOutcome::Success
        } else {
            ProcessOutcome::Failed(status.code().unwrap_or(-1))
        }
    }
}

/// How the runner executes tool invocations.
pub trait ProcessBackend: Send + Sync {
    /// Run the tool, relaying its combined output through `reporter` as it is
    /// produced (text plus progress updates). Resolves once the process has
    /// exited and its output is drained.
    fn run_streaming<'a>(
        &'a self,
        invocation: &'a ToolInvocation,
        reporter: &'a JobReporter,
    ) -> BoxFuture<'a, Result<ProcessOutcome, JobError>>;

    /// Run the tool to completion with its output captured, not relayed.
    fn run_captured<'a>(
        &'a self,
        invocation: &'a ToolInvocation,
    ) -> BoxFuture<'a, Result<ProcessOutcome, JobError>>;
}

/// Backend that spawns real OS processes.
#[derive(Debug, Clone, Default)]
pub struct RealProcessBackend;

impl RealProcessBackend {
    pub fn new() -> Self {
        Self
    }
}

impl ProcessBackend for RealProcessBackend {
    fn run_streaming<'a>(
        &'a self,
        invocation: &'a ToolInvocation,
        reporter: &'a JobReporter,
    ) -> BoxFuture<'a, Result<ProcessOutcome, JobError>> {
        Box::pin(async move {
            let mut cmd = build_command(invocation);
            cmd.stdout(Stdio::piped())
                .stderr(Stdio::piped())
                .stdin(Stdio::null());

            let mut child = cmd.spawn().map_err(|source| spawn_error(invocation, source))?;
            info!(
                tool = %invocation.kind,
                pid = ?child.id(),
                cmd = %invocation.command_line(),
                "started tool process"
            );

            let status = relay_child(&mut child, reporter).await?;
            let outcome = ProcessOutcome::from(status);
            info!(tool = %invocation.kind, ?outcome, "tool process exited");
            Ok(outcome)
        })
    }

    fn run_captured<'a>(
        &'a self,
        invocation: &'a ToolInvocation,
    ) -> BoxFuture<'a, Result<ProcessOutcome, JobError>> {
        Box::pin(async move {
            let mut cmd = build_command(invocation);
            cmd.stdin(Stdio::null());

            info!(
                tool = %invocation.kind,
                cmd = %invocation.command_line(),
                "running tool process"
            );
            let output = cmd.output().await.map_err(|source| spawn_error(invocation, source))?;

            for line in String::from_utf8_lossy(&output.stdout).lines() {
                debug!(tool = %invocation.kind, "stdout: {}", line);
            }
            for line in String::from_utf8_lossy(&output.stderr).lines() {
                debug!(tool = %invocation.kind, "stderr: {}", line);
            }

            let outcome = ProcessOutcome::from(output.status);
            info!(tool = %invocation.kind, ?outcome, "tool process exited");
            Ok(outcome)
        })
    }
}

fn spawn_error(invocation: &ToolInvocation, source: std::io::Error) -> JobError {
    JobError::Spawn {
        tool: invocation.program_name(),
        source,
    }
}

/// Turn an invocation into a `tokio::process::Command`.
///
/// The search path is set on the child only; our own environment is left
/// untouched.
fn build_command(invocation: &ToolInvocation) -> Command {
    let mut cmd = Command::new(&invocation.program);
    cmd.args(&invocation.args).kill_on_drop(true);

    if let Some(path) = child_search_path(invocation) {
        cmd.env("PATH", path);
    }

    // yt-dlp and demucs are Python; without this they write piped output in
    // the console code page (e.g. cp949) instead of UTF-8.
    cmd.env("PYTHONIOENCODING", "utf-8").env("PYTHONUTF8", "1");

    #[cfg(windows)]
    {
        // CREATE_NO_WINDOW: no console window flashing up per tool run.
        cmd.creation_flags(0x0800_0000);
    }

    cmd
}

/// `PATH` for the child, or `None` when nothing needs to change.
fn child_search_path(invocation: &ToolInvocation) -> Option<OsString> {
    let front: Vec<PathBuf> = invocation
        .prepend_path
        .iter()
        .filter(|d| d.is_dir())
        .cloned()
        .collect();
    let back: Vec<PathBuf> = invocation
        .append_path
        .iter()
        .filter(|d| d.is_dir())
        .cloned()
        .collect();

    if front.is_empty() && back.is_empty() {
        return None;
    }

    let inherited = std::env::var_os("PATH").unwrap_or_default();
    let dirs = front
        .into_iter()
        .chain(std::env::split_paths(&inherited))
        .chain(back);

    match std::env::join_paths(dirs).context("building tool search path") {
        Ok(path) => Some(path),
        Err(err) => {
            debug!(error = %err, "keeping inherited PATH");
            None
        }
    }
}
