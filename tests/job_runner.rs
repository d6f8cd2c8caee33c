// tests/job_runner.rs
//
// End-to-end runs of the job pipeline against a scripted backend and an
// in-memory filesystem.

use std::path::PathBuf;
use std::sync::Arc;

use stemshift::exec::ToolKind;
use stemshift::fs::mock::MockFileSystem;
use stemshift::job::{Job, JobEvent, JobOutcome, JobReporter, JobRunner, Stage, spawn_job};
use stemshift_test_utils::builders::ConfigBuilder;
use stemshift_test_utils::fake_backend::{FakeBackend, ToolScript};
use stemshift_test_utils::{
    collect_until_closed, drain_events, init_tracing, log_text, progress_values, with_timeout,
};

fn setup() -> (MockFileSystem, FakeBackend, JobRunner<FakeBackend>) {
    init_tracing();
    let fs = MockFileSystem::new();
    let backend = FakeBackend::new(fs.clone());
    let runner = JobRunner::with_fs(
        ConfigBuilder::new().build(),
        backend.clone(),
        Arc::new(fs.clone()),
    );
    (fs, backend, runner)
}

async fn run(runner: &JobRunner<FakeBackend>, input: &str, pitch: &str) -> (JobOutcome, Vec<JobEvent>) {
    let job = Job::from_form(input, pitch).expect("valid job");
    let (reporter, mut rx) = JobReporter::channel();
    let outcome = with_timeout(runner.run(&job, &reporter)).await;
    (outcome, drain_events(&mut rx))
}

fn finished_count(events: &[JobEvent]) -> usize {
    events
        .iter()
        .filter(|ev| matches!(ev, JobEvent::Finished(_)))
        .count()
}

#[tokio::test]
async fn url_downloads_then_separates_the_newest_wav() {
    let (fs, backend, runner) = setup();
    fs.add_file("/work/downloads/older.wav");
    backend.script(
        ToolKind::Downloader,
        ToolScript::succeed()
            .output("[download]  50.0% of 3.2MiB\r")
            .output("[download] 100.0% of 3.2MiB\n")
            .creates("/work/downloads/My Song.wav"),
    );
    backend.script(
        ToolKind::Separator,
        ToolScript::succeed().output(" 35%|###     |\r").output(" 90%|########|\r"),
    );

    let (outcome, events) = run(&runner, "https://example.com/watch?id=1", "0").await;

    assert!(outcome.is_success(), "{outcome:?}");
    assert_eq!(backend.kinds_run(), vec![ToolKind::Downloader, ToolKind::Separator]);

    let invocations = backend.invocations();
    let separate_args = invocations[1].args_lossy();
    assert_eq!(
        separate_args.last().map(String::as_str),
        Some("/work/downloads/My Song.wav")
    );

    match &outcome {
        JobOutcome::Succeeded { output, .. } => {
            assert_eq!(output, &PathBuf::from("/work/separated/htdemucs/My Song"));
        }
        other => panic!("unexpected outcome {other:?}"),
    }

    assert!(events.contains(&JobEvent::Stage(Stage::Download)));
    assert!(events.contains(&JobEvent::Stage(Stage::Separate)));
    assert!(log_text(&events).contains("[1/2] Downloading https://example.com/watch?id=1"));
}

#[tokio::test]
async fn download_without_a_wav_never_separates() {
    let (fs, backend, runner) = setup();
    fs.add_file("/work/downloads/cover.jpg");
    backend.script(
        ToolKind::Downloader,
        ToolScript::succeed().creates("/work/downloads/song.webm"),
    );

    let (outcome, events) = run(&runner, "https://example.com/watch?id=1", "0").await;

    assert!(!outcome.is_success());
    assert!(
        outcome.message().contains("no downloaded file found"),
        "{}",
        outcome.message()
    );
    assert_eq!(backend.kinds_run(), vec![ToolKind::Downloader]);
    assert!(!events.contains(&JobEvent::Stage(Stage::Separate)));
}

#[tokio::test]
async fn failed_download_reports_the_exit_code() {
    let (_fs, backend, runner) = setup();
    backend.script(ToolKind::Downloader, ToolScript::exit(1));

    let (outcome, _) = run(&runner, "http://example.com/a", "+3").await;

    assert_eq!(outcome.message(), "download failed (exit code 1)");
    assert_eq!(backend.kinds_run(), vec![ToolKind::Downloader]);
}

#[tokio::test]
async fn missing_local_file_fails_before_any_tool_runs() {
    let (_fs, backend, runner) = setup();

    let (outcome, events) = run(&runner, "/nowhere/track.wav", "0").await;

    assert_eq!(outcome.message(), "file does not exist: /nowhere/track.wav");
    assert!(backend.invocations().is_empty());
    assert!(log_text(&events).contains("Error: file does not exist"));
}

#[tokio::test]
async fn local_file_with_pitch_writes_a_signed_output_name() {
    let (fs, backend, runner) = setup();
    fs.add_file("/tmp/song.wav");
    backend.script(
        ToolKind::PitchShifter,
        ToolScript::succeed().creates("/work/pitch_shifted/song_pitch_+2.wav"),
    );

    let (outcome, events) = run(&runner, "/tmp/song.wav", "+2").await;

    let expected = PathBuf::from("/work/pitch_shifted/song_pitch_+2.wav");
    assert_eq!(
        outcome,
        JobOutcome::Succeeded {
            output: expected.clone(),
            message: format!("Pitch shift finished: {}", expected.display()),
        }
    );

    let invocations = backend.invocations();
    assert_eq!(invocations.len(), 1);
    assert_eq!(
        invocations[0].args_lossy(),
        vec![
            "--pitch",
            "2",
            "--formant",
            "--crispness",
            "4",
            "/tmp/song.wav",
            "/work/pitch_shifted/song_pitch_+2.wav",
        ]
    );
    assert!(events.contains(&JobEvent::Stage(Stage::PitchShift)));
}

#[tokio::test]
async fn pitch_output_is_not_relayed() {
    let (fs, backend, runner) = setup();
    fs.add_file("/tmp/song.wav");
    backend.script(
        ToolKind::PitchShifter,
        ToolScript::succeed().output("Pass 1: 50%\n"),
    );

    let (_, events) = run(&runner, "/tmp/song.wav", "-1").await;

    assert!(!events.iter().any(|ev| matches!(ev, JobEvent::Output(_))));
    assert_eq!(progress_values(&events), vec![0.0, 0.0, 100.0]);
}

#[tokio::test]
async fn progress_resets_per_step_and_ends_at_exactly_100_on_success() {
    let (_fs, backend, runner) = setup();
    backend.script(
        ToolKind::Downloader,
        ToolScript::succeed()
            .output("[download]  12.5%\r")
            .output("[download]  88%\n")
            .creates("/work/downloads/a.wav"),
    );
    backend.script(ToolKind::Separator, ToolScript::succeed().output(" 40%|\r"));

    let (outcome, events) = run(&runner, "https://example.com/a", "0").await;

    assert!(outcome.is_success());
    assert_eq!(
        progress_values(&events),
        vec![0.0, 12.5, 88.0, 0.0, 40.0, 100.0]
    );
}

#[tokio::test]
async fn failed_step_keeps_its_last_progress() {
    let (fs, backend, runner) = setup();
    fs.add_file("/music/live.WAV");
    backend.script(
        ToolKind::Separator,
        ToolScript::exit(2).output(" 63%|#####   |\r"),
    );

    let (outcome, events) = run(&runner, "/music/live.WAV", "0").await;

    assert_eq!(outcome.message(), "separation failed (exit code 2)");
    let progress = progress_values(&events);
    assert_eq!(progress.last(), Some(&63.0));
    assert!(!progress.contains(&100.0));
}

#[tokio::test]
async fn missing_tool_is_reported_as_a_spawn_failure() {
    let (fs, backend, runner) = setup();
    fs.add_file("/tmp/song.wav");
    backend.script(ToolKind::Separator, ToolScript::not_installed());

    let (outcome, _) = run(&runner, "/tmp/song.wav", "0").await;

    assert!(
        outcome.message().starts_with("failed to start python"),
        "{}",
        outcome.message()
    );
}

#[tokio::test]
async fn finished_is_sent_once_and_last() {
    let (fs, backend, runner) = setup();
    fs.add_file("/tmp/song.wav");
    backend.script(ToolKind::Separator, ToolScript::exit(1));

    for (input, pitch) in [("/tmp/song.wav", "0"), ("/tmp/song.wav", "4"), ("/missing.wav", "0")] {
        let (outcome, events) = run(&runner, input, pitch).await;
        assert_eq!(finished_count(&events), 1, "{input} {pitch}");
        assert_eq!(events.last(), Some(&JobEvent::Finished(outcome)));
    }
}

#[tokio::test]
async fn dropping_the_job_midway_still_finishes() {
    let (fs, backend, runner) = setup();
    fs.add_file("/tmp/song.wav");
    // Relayed output yields to the scheduler, so the first poll stops there.
    backend.script(ToolKind::Separator, ToolScript::succeed().output(" 10%|\r"));
    let job = Job::from_form("/tmp/song.wav", "0").expect("valid job");
    let (reporter, mut rx) = JobReporter::channel();

    drop(runner.run(&job, &reporter));
    assert!(drain_events(&mut rx).is_empty(), "an unpolled job reports nothing");

    let mut fut = Box::pin(runner.run(&job, &reporter));
    let mut cx = std::task::Context::from_waker(std::task::Waker::noop());
    assert!(fut.as_mut().poll(&mut cx).is_pending());
    drop(fut);

    let events = drain_events(&mut rx);
    assert_eq!(finished_count(&events), 1);
    assert_eq!(
        events.last(),
        Some(&JobEvent::Finished(JobOutcome::failed("the job was interrupted")))
    );
}

#[tokio::test]
async fn spawned_job_streams_events_until_the_channel_closes() {
    let (fs, backend, runner) = setup();
    fs.add_file("/tmp/song.wav");
    backend.script(
        ToolKind::Separator,
        ToolScript::succeed().output("Separating track\n").output(" 100%|##########|\n"),
    );

    let rx = spawn_job(Arc::new(runner), Job::from_form("/tmp/song.wav", "0").expect("valid job"))
        .expect("job thread starts");
    let events = with_timeout(collect_until_closed(rx)).await;

    assert!(events.contains(&JobEvent::Output("Separating track\n".to_string())));
    assert_eq!(finished_count(&events), 1);
    match events.last() {
        Some(JobEvent::Finished(outcome)) => assert!(outcome.is_success(), "{outcome:?}"),
        other => panic!("expected Finished last, got {other:?}"),
    }
}
