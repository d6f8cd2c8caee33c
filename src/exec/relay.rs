// src/exec/relay.rs

//! Output relay: forwards a child's stdout/stderr to a [`JobReporter`] as it
//! is produced and extracts progress percentages on the way.
//!
//! Reads are chunked, not line-buffered, so carriage-return progress bars
//! (`  45.2%|####   |\r`) show up while they are being drawn.

use std::process::ExitStatus;

use anyhow::{Context, Result};
use regex::Regex;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::Child;
use tracing::{debug, trace};

use crate::job::JobReporter;

/// Longest tail of the current line we keep for matching. A percentage is
/// always inspected right after its `%` arrives, so only the tail matters.
const MAX_LINE_TAIL: usize = 4096;

const READ_CHUNK: usize = 1024;

/// Tracks the line currently being written and finds percentages in it.
#[derive(Debug)]
pub struct ProgressScanner {
    pattern: Regex,
    line: String,
}

impl Default for ProgressScanner {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressScanner {
    pub fn new() -> Self {
        Self {
            pattern: Regex::new(r"(\d+(?:\.\d+)?)%").expect("percentage pattern is valid"),
            line: String::new(),
        }
    }

    /// Feed one character. Returns a new progress value when `c` is `\r`,
    /// `\n` or `%` and the current line holds a parsable percentage.
    pub fn push(&mut self, c: char) -> Option<f32> {
        match c {
            '\n' | '\r' => {
                let found = self.scan();
                self.line.clear();
                found
            }
            '%' => {
                self.line.push(c);
                self.trim();
                self.scan()
            }
            _ => {
                self.line.push(c);
                self.trim();
                None
            }
        }
    }

    /// Feed a chunk; returns the last progress value found in it, if any.
    pub fn feed(&mut self, chunk: &str) -> Option<f32> {
        chunk.chars().fold(None, |last, c| self.push(c).or(last))
    }

    /// Text of the line being written (since the last `\r` or `\n`).
    pub fn current_line(&self) -> &str {
        &self.line
    }

    fn scan(&self) -> Option<f32> {
        let m = self.pattern.captures_iter(&self.line).last()?;
        m.get(1)?.as_str().parse::<f32>().ok()
    }

    fn trim(&mut self) {
        if self.line.len() > MAX_LINE_TAIL {
            let mut cut = self.line.len() - MAX_LINE_TAIL;
            while !self.line.is_char_boundary(cut) {
                cut += 1;
            }
            self.line.drain(..cut);
        }
    }
}

/// Incremental UTF-8 decoder that carries incomplete sequences across reads.
#[derive(Debug, Default)]
pub struct Utf8Carry {
    pending: Vec<u8>,
}

impl Utf8Carry {
    /// Decode as much of `pending + bytes` as possible. Invalid bytes become
    /// U+FFFD; an incomplete trailing sequence is kept for the next call.
    pub fn decode(&mut self, bytes: &[u8]) -> String {
        self.pending.extend_from_slice(bytes);

        match std::str::from_utf8(&self.pending) {
            Ok(s) => {
                let out = s.to_owned();
                self.pending.clear();
                out
            }
            Err(e) if e.error_len().is_none() => {
                let valid = e.valid_up_to();
                let out = String::from_utf8_lossy(&self.pending[..valid]).into_owned();
                self.pending.drain(..valid);
                out
            }
            Err(_) => {
                let out = String::from_utf8_lossy(&self.pending).into_owned();
                self.pending.clear();
                out
            }
        }
    }

    /// Flush whatever is left at end of stream.
    pub fn finish(&mut self) -> String {
        let out = String::from_utf8_lossy(&self.pending).into_owned();
        self.pending.clear();
        out
    }
}

/// Text side of the relay: forwards decoded text to the reporter and emits
/// progress updates. Shared by the real process relay and test backends.
#[derive(Debug)]
pub struct OutputRelay<'a> {
    reporter: &'a JobReporter,
    scanner: ProgressScanner,
}

impl<'a> OutputRelay<'a> {
    pub fn new(reporter: &'a JobReporter) -> Self {
        Self {
            reporter,
            scanner: ProgressScanner::new(),
        }
    }

    /// Forward `text` and update progress. Returns the progress value set, if
    /// any.
    pub fn push_text(&mut self, text: &str) -> Option<f32> {
        if text.is_empty() {
            return None;
        }
        self.reporter.output(text);
        let found = self.scanner.feed(text);
        if let Some(percent) = found {
            trace!(percent, "progress update from tool output");
            self.reporter.progress(percent);
        }
        found
    }
}

/// Drain the child's stdout and stderr into the reporter until both close,
/// then reap the child.
///
/// An empty read from a still-running child just means no output yet; the
/// loop only ends at EOF on both pipes.
pub async fn relay_child(child: &mut Child, reporter: &JobReporter) -> Result<ExitStatus> {
    let mut stdout = child.stdout.take();
    let mut stderr = child.stderr.take();

    let mut relay = OutputRelay::new(reporter);
    let mut out_dec = Utf8Carry::default();
    let mut err_dec = Utf8Carry::default();
    let mut out_buf = [0u8; READ_CHUNK];
    let mut err_buf = [0u8; READ_CHUNK];

    while stdout.is_some() || stderr.is_some() {
        let (pipe, res) = tokio::select! {
            res = read_some(&mut stdout, &mut out_buf), if stdout.is_some() => (Pipe::Stdout, res),
            res = read_some(&mut stderr, &mut err_buf), if stderr.is_some() => (Pipe::Stderr, res),
        };

        let n = res.with_context(|| format!("reading child {pipe}"))?;
        let text = match (pipe, n) {
            (Pipe::Stdout, 0) => {
                stdout = None;
                out_dec.finish()
            }
            (Pipe::Stdout, n) => out_dec.decode(&out_buf[..n]),
            (Pipe::Stderr, 0) => {
                stderr = None;
                err_dec.finish()
            }
            (Pipe::Stderr, n) => err_dec.decode(&err_buf[..n]),
        };
        relay.push_text(&text);
    }

    debug!("child output closed; waiting for exit");
    let status = child.wait().await.context("waiting for child process")?;
    Ok(status)
}

#[derive(Debug, Clone, Copy)]
enum Pipe {
    Stdout,
    Stderr,
}

impl std::fmt::Display for Pipe {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Pipe::Stdout => f.write_str("stdout"),
            Pipe::Stderr => f.write_str("stderr"),
        }
    }
}

async fn read_some<R: AsyncRead + Unpin>(
    reader: &mut Option<R>,
    buf: &mut [u8],
) -> std::io::Result<usize> {
    match reader {
        Some(r) => r.read(buf).await,
        None => std::future::pending().await,
    }
}
