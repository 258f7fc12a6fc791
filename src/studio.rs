//! One generation attempt, end to end.
//!
//! Staging → engine → presenter, with the classifier turning any failure into
//! a hint and the reaper deleting both temporary files last.

use std::any::Any;
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};

use crate::classifier::{classify, FailureKind, Hint};
use crate::config::StudioConfig;
use crate::device::{select_device, Device};
use crate::presenter::{self, SynthesisResult};
use crate::reaper::{Reaper, TempArtifact};
use crate::staging::{self, VoiceSample};
use crate::{Language, SynthesisRequest, VoiceCloneEngine};

const OUTPUT_PREFIX: &str = "voice-out-";

/// Progress of an attempt, reported while it runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    UsingDevice(Device),
    LoadingModel,
    Synthesizing,
    Finished,
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Status::UsingDevice(device) => write!(f, "Using device: {device}"),
            Status::LoadingModel => f.write_str("Loading voice cloning model..."),
            Status::Synthesizing => f.write_str("Cloning your voice..."),
            Status::Finished => f.write_str("Finished"),
        }
    }
}

/// Receives [`Status`] updates from a running attempt.
pub trait ProgressObserver {
    fn on_status(&self, status: Status);
}

impl ProgressObserver for () {
    fn on_status(&self, _status: Status) {}
}

impl ProgressObserver for Sender<Status> {
    fn on_status(&self, status: Status) {
        // The receiver may have been dropped; the attempt still runs to the end.
        let _ = self.send(status);
    }
}

/// A failed generation attempt.
///
/// `message` is the original error text; `hint` only supplements it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationFailure {
    kind: FailureKind,
    message: String,
    hint: Option<Hint>,
}

impl GenerationFailure {
    /// Classify a raw failure message.
    pub fn from_message(message: impl Into<String>) -> Self {
        let message = message.into();
        let hint = classify(&message);
        Self {
            kind: hint.kind(),
            message,
            hint: Some(hint),
        }
    }

    fn input_incomplete() -> Self {
        Self {
            kind: FailureKind::InputIncomplete,
            message: "Upload a voice sample and enter some text first".to_string(),
            hint: None,
        }
    }

    pub fn kind(&self) -> FailureKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn hint(&self) -> Option<Hint> {
        self.hint
    }
}

impl fmt::Display for GenerationFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Generation failed: {}", self.message)?;
        if let Some(hint) = self.hint {
            write!(f, "\nTip: {hint}")?;
        }
        Ok(())
    }
}

impl std::error::Error for GenerationFailure {}

impl From<io::Error> for GenerationFailure {
    fn from(e: io::Error) -> Self {
        Self::from_message(e.to_string())
    }
}

/// Owns the engine for a session and runs generation attempts against it.
///
/// The model is loaded on the first attempt (or by [`warm_up`](Self::warm_up))
/// and reused afterwards. Attempts from several threads take turns on the
/// engine; each one gets its own pair of temporary files.
pub struct Studio<E> {
    engine: Mutex<E>,
    config: StudioConfig,
}

impl<E: VoiceCloneEngine> Studio<E> {
    pub fn new(engine: E, config: StudioConfig) -> Self {
        Self {
            engine: Mutex::new(engine),
            config,
        }
    }

    pub fn config(&self) -> &StudioConfig {
        &self.config
    }

    /// Whether the generate action is enabled for these inputs.
    pub fn can_generate(&self, sample: Option<&VoiceSample>, text: &str) -> bool {
        staging::can_generate(sample, text)
    }

    /// Load the model now instead of on the first attempt.
    pub fn warm_up(&self, observer: &dyn ProgressObserver) -> Result<Device, GenerationFailure> {
        let mut engine = self.lock_engine();
        self.ensure_loaded(&mut engine, observer)
    }

    /// Run one generation attempt.
    ///
    /// Both temporary files are gone when this returns, whatever the outcome.
    pub fn generate(
        &self,
        sample: Option<&VoiceSample>,
        text: &str,
        language: Language,
        observer: &dyn ProgressObserver,
    ) -> Result<SynthesisResult, GenerationFailure> {
        let sample = match sample {
            Some(sample) if staging::can_generate(Some(sample), text) => sample,
            _ => return Err(GenerationFailure::input_incomplete()),
        };

        let mut reaper = Reaper::new();
        let outcome = self.attempt(sample, text, language, observer, &mut reaper);
        reaper.reap();

        match &outcome {
            Ok(result) => log::info!(
                "Generated {} ({} bytes, {})",
                result.file_name(),
                result.audio().len(),
                language.code()
            ),
            Err(failure) => log::warn!("Generation failed: {}", failure.message()),
        }
        observer.on_status(Status::Finished);
        outcome
    }

    fn attempt(
        &self,
        sample: &VoiceSample,
        text: &str,
        language: Language,
        observer: &dyn ProgressObserver,
        reaper: &mut Reaper,
    ) -> Result<SynthesisResult, GenerationFailure> {
        let dir = self.config.temp_dir();
        let (reference, output) = stage_artifacts(sample, &dir, &dir, reaper)?;
        let request = SynthesisRequest::new(text, reference, language);

        {
            let mut engine = self.lock_engine();
            self.ensure_loaded(&mut engine, observer)?;
            observer.on_status(Status::Synthesizing);
            engine
                .synthesize_to_file(&request, &output)
                .map_err(|e| GenerationFailure::from_message(e.to_string()))?;
        }

        let result = presenter::present(&output)?;
        if result.audio().is_empty() {
            return Err(GenerationFailure::from_message(
                "Engine finished without writing any audio",
            ));
        }
        Ok(result)
    }

    fn ensure_loaded(
        &self,
        engine: &mut E,
        observer: &dyn ProgressObserver,
    ) -> Result<Device, GenerationFailure> {
        if let Some(device) = engine.device() {
            observer.on_status(Status::UsingDevice(device));
            return Ok(device);
        }

        let device = select_device(self.config.device);
        observer.on_status(Status::UsingDevice(device));
        observer.on_status(Status::LoadingModel);
        engine
            .load_model(device)
            .map_err(|e| GenerationFailure::from_message(e.to_string()))?;
        log::info!("Model {} ready on {device}", self.config.model_name);
        Ok(device)
    }

    fn lock_engine(&self) -> MutexGuard<'_, E> {
        // A panicked attempt leaves the engine usable; its files were reaped on unwind.
        self.engine.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<E: VoiceCloneEngine + Send + 'static> Studio<E> {
    /// Run an attempt on a worker thread.
    ///
    /// The returned [`Attempt`] streams [`Status`] updates and yields the
    /// outcome on [`join`](Attempt::join). There is no cancellation.
    pub fn spawn_generate(
        self: &Arc<Self>,
        sample: VoiceSample,
        text: String,
        language: Language,
    ) -> Attempt {
        let (tx, rx) = mpsc::channel();
        let studio = Arc::clone(self);
        let handle = thread::spawn(move || studio.generate(Some(&sample), &text, language, &tx));
        Attempt { status: rx, handle }
    }
}

/// Stage the reference and allocate the output, handing both to `reaper`
/// as soon as each exists.
fn stage_artifacts(
    sample: &VoiceSample,
    input_dir: &Path,
    output_dir: &Path,
    reaper: &mut Reaper,
) -> Result<(PathBuf, PathBuf), GenerationFailure> {
    let reference = reaper.track(staging::stage(sample, input_dir)?);
    let output = reaper.track(TempArtifact::create(output_dir, OUTPUT_PREFIX, ".wav")?);
    Ok((reference, output))
}

/// A generation attempt running on a worker thread.
pub struct Attempt {
    status: Receiver<Status>,
    handle: JoinHandle<Result<SynthesisResult, GenerationFailure>>,
}

impl Attempt {
    pub fn status(&self) -> &Receiver<Status> {
        &self.status
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Wait for the outcome. A panicking worker becomes a failure.
    pub fn join(self) -> Result<SynthesisResult, GenerationFailure> {
        self.handle
            .join()
            .unwrap_or_else(|panic| Err(GenerationFailure::from_message(panic_message(&*panic))))
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(msg) = panic.downcast_ref::<&str>() {
        msg.to_string()
    } else if let Some(msg) = panic.downcast_ref::<String>() {
        msg.clone()
    } else {
        "Generation worker panicked".to_string()
    }
}
