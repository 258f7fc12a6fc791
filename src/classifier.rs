//! Maps raw engine failure messages to remediation hints.
//!
//! This is a coarse substring heuristic. It only picks a hint to show next to
//! the original message and never rewrites that message.

use std::fmt;

/// Category of a failed generation attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// Audio missing or text empty. The generate action stays disabled.
    InputIncomplete,
    /// The engine could not decode the reference audio container.
    FormatUnsupported,
    /// The reference audio was too short or unclear to extract a voice from.
    ReferenceAudioInsufficient,
    /// Anything else during model load or synthesis.
    SynthesisUnspecified,
}

/// User-facing remediation tip.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hint {
    ConvertToWav,
    ClearSpeech,
    Generic,
}

impl Hint {
    pub fn text(self) -> &'static str {
        match self {
            Hint::ConvertToWav => "Convert your audio to WAV format first",
            Hint::ClearSpeech => "Make sure your audio file has clear speech (5+ seconds)",
            Hint::Generic => "Try a different audio file or shorter text",
        }
    }

    pub fn kind(self) -> FailureKind {
        match self {
            Hint::ConvertToWav => FailureKind::FormatUnsupported,
            Hint::ClearSpeech => FailureKind::ReferenceAudioInsufficient,
            Hint::Generic => FailureKind::SynthesisUnspecified,
        }
    }
}

impl fmt::Display for Hint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.text())
    }
}

// Checked in order; first match wins.
const RULES: &[(&str, Hint)] = &[
    ("format not recognised", Hint::ConvertToWav),
    ("speaker_wav", Hint::ClearSpeech),
];

/// Pick the hint for a failure message (case-insensitive).
pub fn classify(message: &str) -> Hint {
    let message = message.to_lowercase();
    RULES
        .iter()
        .find(|(needle, _)| message.contains(needle))
        .map(|&(_, hint)| hint)
        .unwrap_or(Hint::Generic)
}
