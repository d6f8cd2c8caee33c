// src/lib.rs

pub mod cli;
pub mod config;
pub mod errors;
pub mod exec;
pub mod fs;
pub mod gui;
pub mod job;
pub mod logging;
pub mod types;

use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Result, anyhow};
use tracing::{debug, info};

use crate::cli::CliArgs;
use crate::config::{AppConfig, load_or_default};
use crate::exec::{RealProcessBackend, ToolInvocation, tools};
use crate::job::{Job, JobEvent, JobInput, JobOutcome, JobRunner, spawn_job};
use crate::types::JobMode;

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config loading
/// - `--dry-run` (print settings and command lines)
/// - `--input` (one headless job, tool output on stdout)
/// - otherwise the desktop window
pub fn run(args: CliArgs) -> Result<()> {
    let cfg = load_or_default(&args.config)?;
    debug!(config = %args.config.display(), "configuration loaded");

    if args.dry_run {
        print_dry_run(&cfg, args.input.as_deref(), &args.pitch);
        return Ok(());
    }

    match args.input {
        Some(input) => run_headless(cfg, &input, &args.pitch),
        None => {
            info!("opening window");
            gui::run(cfg).map_err(|e| anyhow!("window error: {e}"))
        }
    }
}

/// Run one job on the background thread and mirror its events on the
/// terminal. Returns an error when the job fails.
fn run_headless(cfg: AppConfig, input: &str, pitch: &str) -> Result<()> {
    let job = Job::from_form(input, pitch)?;
    info!(input = %job.input, mode = %job.mode, "starting headless job");

    let runner = Arc::new(JobRunner::new(cfg, RealProcessBackend::new()));
    let mut rx = spawn_job(runner, job)?;

    let mut stdout = std::io::stdout().lock();
    let mut outcome = None;
    while let Some(event) = rx.blocking_recv() {
        match event {
            JobEvent::Output(text) => {
                stdout.write_all(text.as_bytes())?;
                stdout.flush()?;
            }
            JobEvent::Log(line) => writeln!(stdout, "{line}")?,
            JobEvent::Stage(stage) => debug!(%stage, "stage started"),
            JobEvent::Progress(percent) => debug!(percent, "progress"),
            JobEvent::Finished(done) => outcome = Some(done),
        }
    }

    match outcome {
        Some(JobOutcome::Succeeded { .. }) => Ok(()),
        Some(JobOutcome::Failed { message }) => Err(anyhow!(message)),
        None => Err(anyhow!("job ended without reporting a result")),
    }
}

/// Print the resolved settings and the commands a job would run.
fn print_dry_run(cfg: &AppConfig, input: Option<&str>, pitch: &str) {
    println!("stemshift dry-run");
    println!("  downloads     = {}", cfg.paths.downloads_dir().display());
    println!("  separated     = {}", cfg.paths.separated_dir().display());
    println!("  pitch_shifted = {}", cfg.paths.pitch_shifted_dir().display());
    println!(
        "  acceleration  = {:?} (enabled: {})",
        cfg.separation.acceleration,
        cfg.separation.acceleration.enabled()
    );
    println!("  log_capacity  = {} bytes", cfg.ui.log_capacity);
    println!();

    let mode = JobMode::from_pitch_field(pitch);
    let (url, file) = match input.map(JobInput::classify) {
        Some(JobInput::Url(url)) => {
            let placeholder = cfg
                .paths
                .downloads_dir()
                .join(format!("<title>.{}", cfg.download.audio_format));
            (Some(url), placeholder)
        }
        Some(JobInput::LocalFile(path)) => (None, path),
        None => (
            Some("<url>".to_string()),
            PathBuf::from(format!("<input>.{}", cfg.download.audio_format)),
        ),
    };

    println!("mode: {mode}");
    println!("commands:");
    if let Some(url) = url {
        print_invocation("download", &tools::download(cfg, &url));
    }
    match mode {
        JobMode::Separate => {
            print_invocation("separate", &tools::separate(cfg, &file));
            println!(
                "  output: {}",
                tools::separation_output_dir(cfg, &file).display()
            );
        }
        JobMode::PitchShift { semitones } => {
            let output = tools::pitch_output_path(cfg, &file, semitones);
            print_invocation("pitch", &tools::pitch_shift(cfg, &file, &output, semitones));
            println!("  output: {}", output.display());
        }
    }

    debug!("dry-run complete (no execution)");
}

fn print_invocation(label: &str, inv: &ToolInvocation) {
    println!("  {label}: {}", inv.command_line());
    for dir in &inv.prepend_path {
        println!("      PATH += (front) {}", dir.display());
    }
    for dir in &inv.append_path {
        println!("      PATH += (back)  {}", dir.display());
    }
}
