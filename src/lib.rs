//! # voice-clone-rs
//!
//! Cross-lingual voice cloning: take a short voice sample in any spoken
//! language, type text in a target language, and get back speech that sounds
//! like the sample speaking that text.
//!
//! The acoustic work is delegated to an external multilingual voice-cloning
//! engine (Coqui XTTS v2). This crate owns everything around that one call:
//!
//! - **Staging**: gate the generate action and write the upload to a scoped
//!   temporary file ([`staging`])
//! - **Invocation**: pick a compute device and drive the engine through the
//!   [`VoiceCloneEngine`] trait ([`device`], [`engines`])
//! - **Presentation**: read the synthesized WAV back as a named, downloadable
//!   artifact ([`presenter`])
//! - **Failure hints**: map opaque engine errors to remediation tips
//!   ([`classifier`])
//! - **Reaping**: remove both temporary files once an attempt ends
//!   ([`reaper`])
//! - **Playback**: play the upload and the result on the default output
//!   device (`playback`, behind the `playback` feature)
//!
//! [`studio::Studio`] ties these together into a single generation attempt.
//!
//! ## Quick Start
//!
//! ```ignore
//! use voice_clone_rs::{
//!     engines::xtts::XttsEngine, staging::VoiceSample, studio::Studio, Language, StudioConfig,
//! };
//!
//! let config = StudioConfig::default();
//! let studio = Studio::new(XttsEngine::from_config(&config), config);
//!
//! let sample = VoiceSample::from_path("kannada-sample.wav".as_ref())?;
//! match studio.generate(Some(&sample), "Happy Birthday Natesh!", Language::En, &()) {
//!     Ok(result) => println!("saved {}", result.save_to(".".as_ref())?.display()),
//!     Err(failure) => eprintln!("{failure}"),
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod classifier;
pub mod config;
pub mod device;
pub mod engines;
#[cfg(feature = "playback")]
pub mod playback;
pub mod presenter;
pub mod reaper;
pub mod staging;
pub mod studio;

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

pub use classifier::{classify, FailureKind, Hint};
pub use config::{ConfigError, StudioConfig, StudioConfigBuilder};
pub use device::{select_device, Device, DevicePreference};
pub use presenter::SynthesisResult;
pub use studio::{Attempt, GenerationFailure, ProgressObserver, Status, Studio};

/// Error type returned by engines. Only its `Display` text is relied upon.
pub type EngineError = Box<dyn std::error::Error + Send + Sync>;

/// Output language of the synthesized speech.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    /// English, the primary output language.
    #[default]
    En,
    /// Hindi.
    Hi,
}

impl Language {
    pub const ALL: [Language; 2] = [Language::En, Language::Hi];

    /// Language code understood by the engine.
    pub fn code(self) -> &'static str {
        match self {
            Language::En => "en",
            Language::Hi => "hi",
        }
    }

    /// Human-readable label.
    pub fn label(self) -> &'static str {
        match self {
            Language::En => "English",
            Language::Hi => "Hindi",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
#[error("Unsupported output language '{0}'. Expected one of: en, hi")]
pub struct UnknownLanguage(pub String);

impl FromStr for Language {
    type Err = UnknownLanguage;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "en" | "english" => Ok(Language::En),
            "hi" | "hindi" => Ok(Language::Hi),
            other => Err(UnknownLanguage(other.to_string())),
        }
    }
}

/// A single synthesis request handed to the engine.
///
/// Built once per generation attempt and never mutated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SynthesisRequest {
    text: String,
    reference_audio_path: PathBuf,
    language: Language,
}

impl SynthesisRequest {
    pub fn new(
        text: impl Into<String>,
        reference_audio_path: impl Into<PathBuf>,
        language: Language,
    ) -> Self {
        Self {
            text: text.into(),
            reference_audio_path: reference_audio_path.into(),
            language,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn reference_audio_path(&self) -> &Path {
        &self.reference_audio_path
    }

    pub fn language(&self) -> Language {
        self.language
    }
}

/// Common interface for voice-cloning engines.
///
/// An engine is loaded once onto a [`Device`] and then serves any number of
/// synthesis calls. Loading and synthesis are blocking and may be slow.
pub trait VoiceCloneEngine {
    /// Load the model and bind it to `device`.
    fn load_model(&mut self, device: Device) -> Result<(), EngineError>;

    /// Unload the currently loaded model and free associated resources.
    fn unload_model(&mut self);

    /// The device the model is bound to, or `None` when nothing is loaded.
    fn device(&self) -> Option<Device>;

    fn is_loaded(&self) -> bool {
        self.device().is_some()
    }

    /// Clone the reference voice speaking `request.text()` and write the
    /// resulting WAV to `output_path`.
    ///
    /// Errors carry the engine's original message; callers must not rely on
    /// anything but its `Display` text.
    fn synthesize_to_file(
        &mut self,
        request: &SynthesisRequest,
        output_path: &Path,
    ) -> Result<(), EngineError>;
}
