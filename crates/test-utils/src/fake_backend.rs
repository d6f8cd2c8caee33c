use std::collections::HashMap;
use std::io;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use stemshift::errors::JobError;
use stemshift::exec::{BoxFuture, OutputRelay, ProcessBackend, ProcessOutcome, ToolInvocation, ToolKind};
use stemshift::fs::mock::MockFileSystem;
use stemshift::job::JobReporter;

/// What a fake tool does when it is "run".
#[derive(Debug, Clone)]
pub struct ToolScript {
    /// Output chunks, relayed in order (streaming runs only).
    pub output: Vec<String>,
    /// Files that appear in the mock filesystem once the tool has run.
    pub creates: Vec<PathBuf>,
    pub exit_code: i32,
    /// Fail to start instead of running.
    pub spawn_error: bool,
}

impl ToolScript {
    pub fn succeed() -> Self {
        Self {
            output: Vec::new(),
            creates: Vec::new(),
            exit_code: 0,
            spawn_error: false,
        }
    }

    pub fn exit(code: i32) -> Self {
        Self {
            exit_code: code,
            ..Self::succeed()
        }
    }

    pub fn not_installed() -> Self {
        Self {
            spawn_error: true,
            ..Self::succeed()
        }
    }

    pub fn output(mut self, chunk: &str) -> Self {
        self.output.push(chunk.to_string());
        self
    }

    pub fn creates(mut self, path: impl Into<PathBuf>) -> Self {
        self.creates.push(path.into());
        self
    }
}

/// A fake process backend that:
/// - records every invocation it receives
/// - relays scripted output through the real `OutputRelay`
/// - adds scripted files to a `MockFileSystem`
/// - exits with the scripted code (default: success, no output)
#[derive(Debug, Clone)]
pub struct FakeBackend {
    fs: MockFileSystem,
    scripts: Arc<Mutex<HashMap<ToolKind, ToolScript>>>,
    invocations: Arc<Mutex<Vec<ToolInvocation>>>,
}

impl FakeBackend {
    pub fn new(fs: MockFileSystem) -> Self {
        Self {
            fs,
            scripts: Arc::new(Mutex::new(HashMap::new())),
            invocations: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn script(&self, kind: ToolKind, script: ToolScript) -> &Self {
        self.scripts.lock().unwrap().insert(kind, script);
        self
    }

    /// All invocations so far, in order.
    pub fn invocations(&self) -> Vec<ToolInvocation> {
        self.invocations.lock().unwrap().clone()
    }

    pub fn kinds_run(&self) -> Vec<ToolKind> {
        self.invocations().iter().map(|inv| inv.kind).collect()
    }

    fn start(&self, invocation: &ToolInvocation) -> Result<ToolScript, JobError> {
        self.invocations.lock().unwrap().push(invocation.clone());

        let script = self
            .scripts
            .lock()
            .unwrap()
            .get(&invocation.kind)
            .cloned()
            .unwrap_or_else(ToolScript::succeed);

        if script.spawn_error {
            return Err(JobError::Spawn {
                tool: invocation.program_name(),
                source: io::Error::new(io::ErrorKind::NotFound, "program not found"),
            });
        }
        Ok(script)
    }

    fn finish(&self, script: &ToolScript) -> ProcessOutcome {
        for path in &script.creates {
            self.fs.add_file(path);
        }
        if script.exit_code == 0 {
            ProcessOutcome::Success
        } else {
            ProcessOutcome::Failed(script.exit_code)
        }
    }
}

impl ProcessBackend for FakeBackend {
    fn run_streaming<'a>(
        &'a self,
        invocation: &'a ToolInvocation,
        reporter: &'a JobReporter,
    ) -> BoxFuture<'a, Result<ProcessOutcome, JobError>> {
        Box::pin(async move {
            let script = self.start(invocation)?;
            let mut relay = OutputRelay::new(reporter);
            for chunk in &script.output {
                relay.push_text(chunk);
                tokio::task::yield_now().await;
            }
            Ok(self.finish(&script))
        })
    }

    fn run_captured<'a>(
        &'a self,
        invocation: &'a ToolInvocation,
    ) -> BoxFuture<'a, Result<ProcessOutcome, JobError>> {
        Box::pin(async move {
            let script = self.start(invocation)?;
            Ok(self.finish(&script))
        })
    }
}
