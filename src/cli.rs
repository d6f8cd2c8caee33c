// src/cli.rs

//! CLI argument parsing using `clap`.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

/// Command-line arguments for `stemshift`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "stemshift",
    version,
    about = "Download audio, split vocals or shift pitch using yt-dlp, demucs and rubberband.",
    long_about = None
)]
pub struct CliArgs {
    /// Path to the config file (TOML).
    ///
    /// Default: `stemshift.toml` in the current working directory. When the
    /// default file does not exist, built-in defaults are used.
    #[arg(long, value_name = "PATH", default_value = "stemshift.toml")]
    pub config: PathBuf,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `STEMSHIFT_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Run a single job without opening a window (URL or audio file path).
    #[arg(long, value_name = "URL|PATH")]
    pub input: Option<String>,

    /// Semitone offset for the headless job; 0 separates vocals instead.
    #[arg(long, value_name = "N", default_value = "0", allow_hyphen_values = true)]
    pub pitch: String,

    /// Print the resolved settings and the commands a job would run, then exit.
    #[arg(long)]
    pub dry_run: bool,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn negative_pitch_is_accepted_as_a_value() {
        let args = CliArgs::try_parse_from(["stemshift", "--input", "a.wav", "--pitch", "-3"])
            .expect("args parse");
        assert_eq!(args.pitch, "-3");
        assert_eq!(args.input.as_deref(), Some("a.wav"));
        assert_eq!(args.config, PathBuf::from("stemshift.toml"));
    }

    #[test]
    fn defaults_open_the_window() {
        let args = CliArgs::try_parse_from(["stemshift"]).expect("args parse");
        assert!(args.input.is_none());
        assert_eq!(args.pitch, "0");
        assert!(!args.dry_run);
    }
}
