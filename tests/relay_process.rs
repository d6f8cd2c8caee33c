// tests/relay_process.rs
//
// The relay against real child processes (`sh`), unix only.

#![cfg(unix)]

use stemshift::errors::JobError;
use stemshift::exec::{ProcessBackend, ProcessOutcome, RealProcessBackend, ToolInvocation, ToolKind};
use stemshift::job::{JobEvent, JobReporter};
use stemshift_test_utils::{drain_events, init_tracing, progress_values, with_timeout};

fn sh(script: &str) -> ToolInvocation {
    ToolInvocation {
        kind: ToolKind::Separator,
        program: "sh".into(),
        args: vec!["-c".into(), script.into()],
        prepend_path: Vec::new(),
        append_path: Vec::new(),
    }
}

fn output_text(events: &[JobEvent]) -> String {
    events
        .iter()
        .filter_map(|ev| match ev {
            JobEvent::Output(text) => Some(text.as_str()),
            _ => None,
        })
        .collect()
}

#[tokio::test]
async fn carriage_return_progress_is_relayed_from_stdout_and_stderr() {
    init_tracing();
    let backend = RealProcessBackend::new();
    let (reporter, mut rx) = JobReporter::channel();

    let inv = sh(r#"printf ' 10%%|#  |\r'; sleep 0.05; printf ' 55.5%%|## |\r' >&2; sleep 0.05; printf 'done\n'"#);
    let outcome = with_timeout(backend.run_streaming(&inv, &reporter))
        .await
        .expect("sh runs");

    assert_eq!(outcome, ProcessOutcome::Success);
    let events = drain_events(&mut rx);
    let text = output_text(&events);
    assert!(text.contains(" 10%|#  |\r"), "{text:?}");
    assert!(text.contains(" 55.5%|## |\r"), "{text:?}");
    assert!(text.ends_with("done\n"), "{text:?}");
    assert_eq!(progress_values(&events), vec![10.0, 55.5]);
}

#[tokio::test]
async fn partial_line_is_visible_before_the_process_exits() {
    init_tracing();
    let backend = RealProcessBackend::new();
    let (reporter, mut rx) = JobReporter::channel();

    let inv = sh("printf 'working 42%%'; sleep 0.3");
    let run = backend.run_streaming(&inv, &reporter);
    tokio::pin!(run);

    let first = with_timeout(async {
        tokio::select! {
            ev = rx.recv() => ev,
            _ = &mut run => None,
        }
    })
    .await;
    assert_eq!(first, Some(JobEvent::Output("working 42%".to_string())));

    let outcome = with_timeout(run).await.expect("sh runs");
    assert_eq!(outcome, ProcessOutcome::Success);
    assert_eq!(progress_values(&drain_events(&mut rx)), vec![42.0]);
}

#[tokio::test]
async fn nonzero_exit_code_is_reported() {
    init_tracing();
    let backend = RealProcessBackend::new();
    let (reporter, _rx) = JobReporter::channel();

    let outcome = with_timeout(backend.run_streaming(&sh("echo oops >&2; exit 3"), &reporter))
        .await
        .expect("sh runs");
    assert_eq!(outcome, ProcessOutcome::Failed(3));

    let captured = with_timeout(backend.run_captured(&sh("exit 4")))
        .await
        .expect("sh runs");
    assert_eq!(captured, ProcessOutcome::Failed(4));
}

#[tokio::test]
async fn missing_program_is_a_spawn_error() {
    init_tracing();
    let backend = RealProcessBackend::new();
    let (reporter, _rx) = JobReporter::channel();

    let mut inv = sh("true");
    inv.program = "stemshift-no-such-tool".into();

    let err = with_timeout(backend.run_streaming(&inv, &reporter))
        .await
        .expect_err("spawn fails");
    match err {
        JobError::Spawn { tool, .. } => assert_eq!(tool, "stemshift-no-such-tool"),
        other => panic!("unexpected error {other:?}"),
    }
}

#[tokio::test]
async fn children_see_the_utf8_environment_and_korean_text_survives() {
    init_tracing();
    let backend = RealProcessBackend::new();
    let (reporter, mut rx) = JobReporter::channel();

    let inv = sh(r#"printf '%s %s\n' "$PYTHONIOENCODING" "$PYTHONUTF8"; printf '진행 50%%\n'"#);
    let outcome = with_timeout(backend.run_streaming(&inv, &reporter))
        .await
        .expect("sh runs");

    assert_eq!(outcome, ProcessOutcome::Success);
    let events = drain_events(&mut rx);
    assert_eq!(output_text(&events), "utf-8 1\n진행 50%\n");
    assert_eq!(progress_values(&events), vec![50.0]);
}
