use std::path::{Path, PathBuf};

use crate::config::{StudioConfig, DEFAULT_MODEL_NAME, DEFAULT_PYTHON_PROGRAM};
use crate::device::Device;
use crate::{EngineError, SynthesisRequest, VoiceCloneEngine};

use super::worker::{Worker, XttsError};

/// XTTS v2 voice-cloning engine backed by a Coqui TTS worker process.
///
/// `load_model` starts the worker and waits until the weights are on the
/// device; every synthesis afterwards reuses them.
///
/// # Quick Start
///
/// ```rust,no_run
/// use voice_clone_rs::{engines::xtts::XttsEngine, select_device, DevicePreference, VoiceCloneEngine};
///
/// let mut engine = XttsEngine::new();
/// engine.load_model(select_device(DevicePreference::Auto))?;
/// # Ok::<(), Box<dyn std::error::Error + Send + Sync>>(())
/// ```
#[derive(Debug)]
pub struct XttsEngine {
    python: PathBuf,
    model_name: String,
    worker: Option<Worker>,
}

impl Default for XttsEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl XttsEngine {
    /// Create an engine that runs `python3` from PATH with the XTTS v2 model.
    pub fn new() -> Self {
        Self::with_python(DEFAULT_PYTHON_PROGRAM, DEFAULT_MODEL_NAME)
    }

    /// Create an engine with an explicit interpreter and model name.
    ///
    /// The interpreter must be able to `import TTS`.
    pub fn with_python(python: impl Into<PathBuf>, model_name: impl Into<String>) -> Self {
        Self {
            python: python.into(),
            model_name: model_name.into(),
            worker: None,
        }
    }

    pub fn from_config(config: &StudioConfig) -> Self {
        Self::with_python(config.python_program.clone(), config.model_name.clone())
    }

    pub fn python(&self) -> &Path {
        &self.python
    }

    pub fn model_name(&self) -> &str {
        &self.model_name
    }
}

impl Drop for XttsEngine {
    fn drop(&mut self) {
        self.unload_model();
    }
}

impl VoiceCloneEngine for XttsEngine {
    fn load_model(&mut self, device: Device) -> Result<(), EngineError> {
        self.unload_model();
        log::info!(
            "Loading {} via {} on {device}",
            self.model_name,
            self.python.display()
        );
        self.worker = Some(Worker::spawn(&self.python, &self.model_name, device)?);
        Ok(())
    }

    fn unload_model(&mut self) {
        self.worker = None;
    }

    fn device(&self) -> Option<Device> {
        self.worker.as_ref().map(Worker::device)
    }

    fn synthesize_to_file(
        &mut self,
        request: &SynthesisRequest,
        output_path: &Path,
    ) -> Result<(), EngineError> {
        let worker = self.worker.as_mut().ok_or(XttsError::ModelNotLoaded)?;
        match worker.synthesize(request, output_path) {
            Ok(()) => Ok(()),
            Err(e @ (XttsError::WorkerExited(_) | XttsError::Io(_))) => {
                // The next attempt starts a fresh worker.
                self.worker = None;
                Err(e.into())
            }
            Err(e) => Err(e.into()),
        }
    }
}
