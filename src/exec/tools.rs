// src/exec/tools.rs

//! Command lines for the three external tools.
//!
//! Everything here is pure: a [`ToolInvocation`] describes what to run and a
//! [`ProcessBackend`](super::ProcessBackend) decides how.

use std::ffi::OsString;
use std::fmt;
use std::path::{Path, PathBuf};

use crate::config::AppConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ToolKind {
    Downloader,
    Separator,
    PitchShifter,
}

impl fmt::Display for ToolKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ToolKind::Downloader => "downloader",
            ToolKind::Separator => "separator",
            ToolKind::PitchShifter => "pitch shifter",
        };
        f.write_str(s)
    }
}

/// One external process to run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolInvocation {
    pub kind: ToolKind,
    pub program: OsString,
    pub args: Vec<OsString>,
    /// Directories put in front of the inherited `PATH` (if they exist).
    pub prepend_path: Vec<PathBuf>,
    /// Directories put after the inherited `PATH` (if they exist).
    pub append_path: Vec<PathBuf>,
}

impl ToolInvocation {
    fn new(kind: ToolKind, program: impl Into<OsString>, cfg: &AppConfig) -> Self {
        let prepend_path = cfg.tools.extra_search_dir.iter().cloned().collect();
        let append_path = if cfg.tools.append_exe_dir {
            std::env::current_exe()
                .ok()
                .and_then(|exe| exe.parent().map(Path::to_path_buf))
                .into_iter()
                .collect()
        } else {
            Vec::new()
        };

        Self {
            kind,
            program: program.into(),
            args: Vec::new(),
            prepend_path,
            append_path,
        }
    }

    fn arg(mut self, arg: impl Into<OsString>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Program name for messages.
    pub fn program_name(&self) -> String {
        self.program.to_string_lossy().into_owned()
    }

    /// Arguments as UTF-8 (lossy), mainly for display and tests.
    pub fn args_lossy(&self) -> Vec<String> {
        self.args
            .iter()
            .map(|a| a.to_string_lossy().into_owned())
            .collect()
    }

    /// Shell-like rendering for logs and `--dry-run`. Not meant to be re-parsed.
    pub fn command_line(&self) -> String {
        let mut parts = vec![quote(&self.program_name())];
        parts.extend(self.args_lossy().iter().map(|a| quote(a)));
        parts.join(" ")
    }
}

fn quote(s: &str) -> String {
    if !s.is_empty() && !s.contains([' ', '"', '\'']) {
        s.to_string()
    } else {
        format!("\"{}\"", s.replace('"', "\\\""))
    }
}

/// `yt-dlp -f bestaudio -o "<downloads>/%(title)s.%(ext)s" --extract-audio --audio-format wav <url>`
pub fn download(cfg: &AppConfig, url: &str) -> ToolInvocation {
    let template = cfg.paths.downloads_dir().join("%(title)s.%(ext)s");

    ToolInvocation::new(ToolKind::Downloader, &cfg.tools.downloader, cfg)
        .arg("-f")
        .arg(&cfg.download.format)
        .arg("-o")
        .arg(template)
        .arg("--extract-audio")
        .arg("--audio-format")
        .arg(&cfg.download.audio_format)
        .arg(url)
}

/// `<python> -m demucs -o <separated> --two-stems=vocals [-n <model> -d <device>] <input>`
pub fn separate(cfg: &AppConfig, input: &Path) -> ToolInvocation {
    let sep = &cfg.separation;

    let mut inv = ToolInvocation::new(ToolKind::Separator, &cfg.tools.python, cfg)
        .arg("-m")
        .arg(&cfg.tools.separation_module)
        .arg("-o")
        .arg(cfg.paths.separated_dir())
        .arg(format!("--two-stems={}", sep.two_stems));

    if sep.acceleration.enabled() {
        inv = inv
            .arg("-n")
            .arg(&sep.accelerated_model)
            .arg("-d")
            .arg(&sep.accelerated_device);
    }

    inv.arg(input)
}

/// `rubberband --pitch <n> --formant --crispness 4 <input> <output>`
pub fn pitch_shift(cfg: &AppConfig, input: &Path, output: &Path, semitones: i32) -> ToolInvocation {
    let mut inv = ToolInvocation::new(ToolKind::PitchShifter, &cfg.tools.pitch_shifter, cfg)
        .arg("--pitch")
        .arg(semitones.to_string());

    if cfg.pitch.formant {
        inv = inv.arg("--formant");
    }

    inv.arg("--crispness")
        .arg(cfg.pitch.crispness.to_string())
        .arg(input)
        .arg(output)
}

/// `<pitch sink>/<stem>_pitch_<+n><.ext>`, e.g. `song_pitch_+2.wav`.
pub fn pitch_output_path(cfg: &AppConfig, input: &Path, semitones: i32) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let ext = input
        .extension()
        .map(|e| format!(".{}", e.to_string_lossy()))
        .unwrap_or_default();

    cfg.paths
        .pitch_shifted_dir()
        .join(format!("{stem}_pitch_{semitones:+}{ext}"))
}

/// Folder the separator writes the stems of `input` into.
pub fn separation_output_dir(cfg: &AppConfig, input: &Path) -> PathBuf {
    let stem = input.file_stem().unwrap_or_default();
    cfg.paths
        .separated_dir()
        .join(cfg.separation.effective_model())
        .join(stem)
}
