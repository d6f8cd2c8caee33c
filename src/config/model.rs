// src/config/model.rs

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::types::Acceleration;

/// Top-level configuration as read from a TOML file.
///
/// ```toml
/// [paths]
/// base_dir = "."
/// downloads = "downloads"
///
/// [tools]
/// downloader = "yt-dlp"
/// python = "python3"
///
/// [pitch]
/// crispness = 4
/// ```
///
/// Every section is optional; a missing file is equivalent to an empty one.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawConfigFile {
    #[serde(default)]
    pub paths: PathsSection,

    #[serde(default)]
    pub tools: ToolsSection,

    #[serde(default)]
    pub download: DownloadSection,

    #[serde(default)]
    pub separation: SeparationSection,

    #[serde(default)]
    pub pitch: PitchSection,

    #[serde(default)]
    pub ui: UiSection,
}

/// `[paths]` section: where the three sinks live.
///
/// Sink directories are resolved relative to `base_dir` unless absolute.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PathsSection {
    pub base_dir: PathBuf,
    pub downloads: PathBuf,
    pub separated: PathBuf,
    pub pitch_shifted: PathBuf,
}

impl Default for PathsSection {
    fn default() -> Self {
        Self {
            base_dir: PathBuf::from("."),
            downloads: PathBuf::from("downloads"),
            separated: PathBuf::from("separated"),
            pitch_shifted: PathBuf::from("pitch_shifted"),
        }
    }
}

impl PathsSection {
    pub fn downloads_dir(&self) -> PathBuf {
        self.base_dir.join(&self.downloads)
    }

    pub fn separated_dir(&self) -> PathBuf {
        self.base_dir.join(&self.separated)
    }

    pub fn pitch_shifted_dir(&self) -> PathBuf {
        self.base_dir.join(&self.pitch_shifted)
    }

    /// Rebase a relative `base_dir` onto `root` (typically the config file's
    /// directory).
    pub fn rebased(mut self, root: &Path) -> Self {
        if self.base_dir.is_relative() {
            self.base_dir = root.join(&self.base_dir);
        }
        self
    }
}

/// `[tools]` section: executable names and search path tweaks.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ToolsSection {
    pub downloader: String,
    pub python: String,
    pub separation_module: String,
    pub pitch_shifter: String,

    /// Prepended to the children's `PATH` when it exists.
    pub extra_search_dir: Option<PathBuf>,

    /// Append the directory holding our own executable to the children's
    /// `PATH`, so tools shipped next to the binary are found.
    pub append_exe_dir: bool,
}

impl Default for ToolsSection {
    fn default() -> Self {
        Self {
            downloader: "yt-dlp".to_string(),
            python: default_python().to_string(),
            separation_module: "demucs".to_string(),
            pitch_shifter: "rubberband".to_string(),
            extra_search_dir: default_extra_search_dir(),
            append_exe_dir: true,
        }
    }
}

fn default_python() -> &'static str {
    if cfg!(windows) { "python" } else { "python3" }
}

fn default_extra_search_dir() -> Option<PathBuf> {
    if cfg!(windows) {
        Some(PathBuf::from("C:/ffmpeg/rubberband-4.0.0-gpl-executable-windows"))
    } else {
        None
    }
}

/// `[download]` section.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DownloadSection {
    /// Passed to `-f`.
    pub format: String,
    /// Passed to `--audio-format`; also the extension searched for afterwards.
    pub audio_format: String,
}

impl Default for DownloadSection {
    fn default() -> Self {
        Self {
            format: "bestaudio".to_string(),
            audio_format: "wav".to_string(),
        }
    }
}

/// `[separation]` section.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SeparationSection {
    pub two_stems: String,
    pub acceleration: Acceleration,
    pub accelerated_model: String,
    pub accelerated_device: String,
    /// Model the separator uses when no `-n` flag is passed; only used to
    /// report where the stems ended up.
    pub default_model: String,
}

impl Default for SeparationSection {
    fn default() -> Self {
        Self {
            two_stems: "vocals".to_string(),
            acceleration: Acceleration::default(),
            accelerated_model: "mdx_extra_q".to_string(),
            accelerated_device: "mps".to_string(),
            default_model: "htdemucs".to_string(),
        }
    }
}

impl SeparationSection {
    /// Model whose output folder the stems land in.
    pub fn effective_model(&self) -> &str {
        if self.acceleration.enabled() {
            &self.accelerated_model
        } else {
            &self.default_model
        }
    }
}

/// `[pitch]` section.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PitchSection {
    pub formant: bool,
    pub crispness: u8,
}

impl Default for PitchSection {
    fn default() -> Self {
        Self {
            formant: true,
            crispness: 4,
        }
    }
}

/// `[ui]` section.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UiSection {
    /// Maximum size of the log panel in bytes; oldest lines are evicted.
    pub log_capacity: usize,
}

impl Default for UiSection {
    fn default() -> Self {
        Self {
            log_capacity: 256 * 1024,
        }
    }
}

/// Validated configuration. Only constructible through `TryFrom<RawConfigFile>`
/// (see `validate.rs`) or [`AppConfig::default`].
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub paths: PathsSection,
    pub tools: ToolsSection,
    pub download: DownloadSection,
    pub separation: SeparationSection,
    pub pitch: PitchSection,
    pub ui: UiSection,
}

impl AppConfig {
    pub(crate) fn new_unchecked(raw: RawConfigFile) -> Self {
        Self {
            paths: raw.paths,
            tools: raw.tools,
            download: raw.download,
            separation: raw.separation,
            pitch: raw.pitch,
            ui: raw.ui,
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::new_unchecked(RawConfigFile::default())
    }
}
