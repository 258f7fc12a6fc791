use std::fs;
use std::io;
use std::path::Path;

use crate::reaper::TempArtifact;

const STAGED_PREFIX: &str = "voice-ref-";

#[derive(thiserror::Error, Debug)]
pub enum StagingError {
    #[error("Voice sample '{0}' is empty")]
    EmptySample(String),
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Declared media subtype of an uploaded voice sample.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MediaType {
    /// Uncompressed RIFF/WAVE audio.
    Wav,
    /// Anything else, keyed by its MIME type (e.g. `audio/mpeg`).
    Compressed(String),
}

impl MediaType {
    /// Classify a MIME type as reported by the upload.
    pub fn from_mime(mime: &str) -> Self {
        let mime = mime.trim().to_ascii_lowercase();
        match mime.as_str() {
            "audio/wav" | "audio/x-wav" | "audio/wave" | "audio/vnd.wave" => MediaType::Wav,
            _ => MediaType::Compressed(mime),
        }
    }

    /// Infer the media type from a file extension (without the dot).
    pub fn from_extension(ext: &str) -> Self {
        match ext.to_ascii_lowercase().as_str() {
            "wav" | "wave" => MediaType::Wav,
            "mp3" => MediaType::Compressed("audio/mpeg".to_string()),
            other => MediaType::Compressed(format!("audio/{other}")),
        }
    }

    pub fn mime(&self) -> &str {
        match self {
            MediaType::Wav => "audio/wav",
            MediaType::Compressed(mime) => mime,
        }
    }

    /// Suffix of the staged copy. The engine picks its decoder from it.
    pub fn staging_suffix(&self) -> &'static str {
        match self {
            MediaType::Wav => ".wav",
            MediaType::Compressed(_) => ".mp3",
        }
    }
}

/// An uploaded reference voice recording, held in memory.
#[derive(Debug, Clone)]
pub struct VoiceSample {
    name: String,
    bytes: Vec<u8>,
    media_type: MediaType,
}

impl VoiceSample {
    pub fn new(
        name: impl Into<String>,
        bytes: Vec<u8>,
        media_type: MediaType,
    ) -> Result<Self, StagingError> {
        let name = name.into();
        if bytes.is_empty() {
            return Err(StagingError::EmptySample(name));
        }
        Ok(Self {
            name,
            bytes,
            media_type,
        })
    }

    /// Read a sample from disk, inferring its media type from the extension.
    pub fn from_path(path: &Path) -> Result<Self, StagingError> {
        let bytes = fs::read(path)?;
        let media_type = MediaType::from_extension(
            path.extension().and_then(|e| e.to_str()).unwrap_or_default(),
        );
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Self::new(name, bytes, media_type)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn media_type(&self) -> &MediaType {
        &self.media_type
    }

    pub fn size_mb(&self) -> f64 {
        self.bytes.len() as f64 / 1_048_576.0
    }
}

/// Whether the generate action is enabled.
///
/// Requires a sample and text that is non-empty after trimming.
pub fn can_generate(sample: Option<&VoiceSample>, text: &str) -> bool {
    sample.is_some() && !text.trim().is_empty()
}

/// Write the sample's raw bytes to a fresh temporary file in `dir`.
pub fn stage(sample: &VoiceSample, dir: &Path) -> io::Result<TempArtifact> {
    let suffix = sample.media_type.staging_suffix();
    let artifact = TempArtifact::with_contents(dir, STAGED_PREFIX, suffix, &sample.bytes)?;
    log::debug!(
        "Staged '{}' ({} bytes, {}) at {}",
        sample.name,
        sample.bytes.len(),
        sample.media_type.mime(),
        artifact.path().display()
    );
    Ok(artifact)
}
