// src/types.rs

use std::fmt;

use serde::Deserialize;

/// What a job does with its resolved input file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobMode {
    /// Split the track into the target stem and the rest.
    Separate,
    /// Shift pitch by a signed number of semitones, keeping tempo.
    PitchShift { semitones: i32 },
}

impl JobMode {
    /// Resolve the mode from the raw pitch field of the form.
    ///
    /// A nonzero integer (`"+2"`, `"-1"`, `" 3 "`) selects pitch-shift; zero or
    /// anything that does not parse falls back to separation.
    pub fn from_pitch_field(raw: &str) -> Self {
        match raw.trim().parse::<i32>() {
            Ok(0) | Err(_) => JobMode::Separate,
            Ok(semitones) => JobMode::PitchShift { semitones },
        }
    }
}

impl fmt::Display for JobMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JobMode::Separate => write!(f, "separate"),
            JobMode::PitchShift { semitones } => write!(f, "pitch-shift ({semitones:+})"),
        }
    }
}

/// When to pass the accelerated model/device flags to the separator.
///
/// - `Auto`: only on macOS (Metal backend).
/// - `Always` / `Never`: force the choice regardless of platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Acceleration {
    #[default]
    Auto,
    Always,
    Never,
}

impl Acceleration {
    pub fn enabled(self) -> bool {
        match self {
            Acceleration::Auto => cfg!(target_os = "macos"),
            Acceleration::Always => true,
            Acceleration::Never => false,
        }
    }
}
