use std::path::{Path, PathBuf};

use derive_builder::Builder;
use serde::{Deserialize, Serialize};

use crate::device::DevicePreference;
use crate::Language;

/// Multilingual XTTS v2 checkpoint, as named in the Coqui model zoo.
pub const DEFAULT_MODEL_NAME: &str = "tts_models/multilingual/multi-dataset/xtts_v2";

/// Interpreter with the `TTS` package (`pip install coqui-tts`) installed.
pub const DEFAULT_PYTHON_PROGRAM: &str = "python3";

pub const DEFAULT_TEXT: &str = "Happy Birthday Natesh!";

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid config file: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Settings for a [`Studio`](crate::Studio) session.
///
/// Every field has a default, so a config file is optional:
///
/// ```rust
/// use voice_clone_rs::{DevicePreference, StudioConfigBuilder};
///
/// let config = StudioConfigBuilder::default()
///     .device(DevicePreference::Cpu)
///     .temp_dir("/var/tmp/voice-clone")
///     .build()
///     .unwrap();
/// assert_eq!(config.default_text, "Happy Birthday Natesh!");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Builder)]
#[builder(default, setter(into))]
#[serde(default)]
pub struct StudioConfig {
    /// Engine model identifier.
    pub model_name: String,
    /// Python interpreter that runs the engine worker.
    pub python_program: PathBuf,
    /// Where staged input and engine output live. `None` uses the system
    /// temporary directory.
    #[builder(setter(into, strip_option))]
    pub temp_dir: Option<PathBuf>,
    /// Text pre-filled in the prompt.
    pub default_text: String,
    pub default_language: Language,
    pub device: DevicePreference,
}

impl Default for StudioConfig {
    fn default() -> Self {
        Self {
            model_name: DEFAULT_MODEL_NAME.to_string(),
            python_program: PathBuf::from(DEFAULT_PYTHON_PROGRAM),
            temp_dir: None,
            default_text: DEFAULT_TEXT.to_string(),
            default_language: Language::default(),
            device: DevicePreference::default(),
        }
    }
}

impl StudioConfig {
    /// Load settings from a JSON file. Missing fields take their defaults.
    pub fn from_json_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config = serde_json::from_str(&content)?;
        log::info!("Loaded config from {}", path.display());
        Ok(config)
    }

    pub fn temp_dir(&self) -> PathBuf {
        self.temp_dir.clone().unwrap_or_else(std::env::temp_dir)
    }
}
