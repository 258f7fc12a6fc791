use std::fs;
use std::io::{self, Cursor};
use std::path::{Path, PathBuf};

/// Content type of every synthesized artifact.
pub const CONTENT_TYPE: &str = "audio/wav";

const ID_LEN: usize = 8;

/// Synthesized audio ready for playback and download.
///
/// The bytes are exactly what the engine wrote.
#[derive(Debug, Clone)]
pub struct SynthesisResult {
    audio: Vec<u8>,
    id: String,
}

impl SynthesisResult {
    /// Wrap `audio` under a freshly generated identifier.
    pub fn new(audio: Vec<u8>) -> Self {
        Self {
            audio,
            id: short_id(),
        }
    }

    pub fn audio(&self) -> &[u8] {
        &self.audio
    }

    pub fn into_audio(self) -> Vec<u8> {
        self.audio
    }

    /// Short identifier distinguishing repeated generations in a session.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Download name: `audio{id}.wav`.
    pub fn file_name(&self) -> String {
        format!("audio{}.wav", self.id)
    }

    pub fn content_type(&self) -> &'static str {
        CONTENT_TYPE
    }

    pub fn size_mb(&self) -> f64 {
        self.audio.len() as f64 / 1_048_576.0
    }

    /// Duration read from the WAV header, or `None` if it cannot be parsed.
    pub fn duration_secs(&self) -> Option<f64> {
        let reader = hound::WavReader::new(Cursor::new(&self.audio)).ok()?;
        let spec = reader.spec();
        if spec.sample_rate == 0 {
            return None;
        }
        Some(reader.duration() as f64 / spec.sample_rate as f64)
    }

    /// Write the artifact into `dir` under [`file_name`](Self::file_name).
    pub fn save_to(&self, dir: &Path) -> io::Result<PathBuf> {
        let path = dir.join(self.file_name());
        fs::write(&path, &self.audio)?;
        Ok(path)
    }
}

/// Read the engine's output file into a [`SynthesisResult`].
pub fn present(output_path: &Path) -> io::Result<SynthesisResult> {
    let audio = fs::read(output_path)?;
    let result = SynthesisResult::new(audio);
    log::debug!(
        "Read {} bytes of synthesized audio as {}",
        result.audio.len(),
        result.file_name()
    );
    Ok(result)
}

fn short_id() -> String {
    let mut id = uuid::Uuid::new_v4().simple().to_string();
    id.truncate(ID_LEN);
    id
}
