use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use voice_clone_rs::staging::{MediaType, VoiceSample};
use voice_clone_rs::{
    Device, DevicePreference, EngineError, FailureKind, GenerationFailure, Hint, Language, Status,
    Studio, StudioConfig, StudioConfigBuilder, SynthesisRequest, VoiceCloneEngine,
};

const SAMPLE_BYTES: &[u8] = b"RIFF\x24\x00\x00\x00WAVEfmt ";
const SYNTHESIZED: &[u8] = b"RIFF-synthesized-audio";

#[derive(Clone)]
enum Outcome {
    Write(Vec<u8>),
    FailSynthesis(String),
    FailLoad(String),
}

#[derive(Debug, Clone)]
struct Call {
    request: SynthesisRequest,
    output: PathBuf,
    staged_bytes: Vec<u8>,
}

/// Engine double that records every call and follows a scripted outcome.
struct ScriptedEngine {
    outcome: Outcome,
    device: Option<Device>,
    loads: Arc<AtomicUsize>,
    calls: Arc<Mutex<Vec<Call>>>,
}

impl ScriptedEngine {
    fn new(outcome: Outcome) -> Self {
        Self {
            outcome,
            device: None,
            loads: Arc::new(AtomicUsize::new(0)),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

impl VoiceCloneEngine for ScriptedEngine {
    fn load_model(&mut self, device: Device) -> Result<(), EngineError> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        if let Outcome::FailLoad(message) = &self.outcome {
            return Err(message.clone().into());
        }
        self.device = Some(device);
        Ok(())
    }

    fn unload_model(&mut self) {
        self.device = None;
    }

    fn device(&self) -> Option<Device> {
        self.device
    }

    fn synthesize_to_file(
        &mut self,
        request: &SynthesisRequest,
        output_path: &Path,
    ) -> Result<(), EngineError> {
        let staged_bytes = std::fs::read(request.reference_audio_path())?;
        self.calls.lock().unwrap().push(Call {
            request: request.clone(),
            output: output_path.to_path_buf(),
            staged_bytes,
        });
        match &self.outcome {
            Outcome::Write(bytes) => {
                std::fs::write(output_path, bytes)?;
                Ok(())
            }
            Outcome::FailSynthesis(message) => Err(message.clone().into()),
            Outcome::FailLoad(_) => unreachable!("load already failed"),
        }
    }
}

struct Fixture {
    studio: Arc<Studio<ScriptedEngine>>,
    loads: Arc<AtomicUsize>,
    calls: Arc<Mutex<Vec<Call>>>,
    temp: tempfile::TempDir,
}

impl Fixture {
    fn new(outcome: Outcome) -> Self {
        let temp = tempfile::tempdir().unwrap();
        let config = StudioConfigBuilder::default()
            .temp_dir(temp.path())
            .device(DevicePreference::Cpu)
            .build()
            .unwrap();
        let engine = ScriptedEngine::new(outcome);
        let loads = Arc::clone(&engine.loads);
        let calls = Arc::clone(&engine.calls);
        Self {
            studio: Arc::new(Studio::new(engine, config)),
            loads,
            calls,
            temp,
        }
    }

    fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    fn assert_temp_dir_empty(&self) {
        let leftovers: Vec<_> = std::fs::read_dir(self.temp.path())
            .unwrap()
            .map(|e| e.unwrap().path())
            .collect();
        assert!(leftovers.is_empty(), "leftover temp files: {leftovers:?}");
    }
}

fn wav_sample() -> VoiceSample {
    VoiceSample::new("kannada.wav", SAMPLE_BYTES.to_vec(), MediaType::from_mime("audio/wav"))
        .unwrap()
}

fn mp3_sample() -> VoiceSample {
    VoiceSample::new("kannada.mp3", vec![0xFF, 0xFB, 0x90, 0x64], MediaType::from_mime("audio/mpeg"))
        .unwrap()
}

#[test]
fn wav_sample_is_cloned_and_presented() {
    let fx = Fixture::new(Outcome::Write(SYNTHESIZED.to_vec()));

    let result = fx
        .studio
        .generate(Some(&wav_sample()), "Happy Birthday Natesh!", Language::En, &())
        .unwrap();

    let calls = fx.calls();
    assert_eq!(calls.len(), 1);
    let call = &calls[0];
    assert!(call
        .request
        .reference_audio_path()
        .to_string_lossy()
        .ends_with(".wav"));
    assert_eq!(call.request.text(), "Happy Birthday Natesh!");
    assert_eq!(call.request.language(), Language::En);
    assert_eq!(call.staged_bytes, SAMPLE_BYTES);

    assert_eq!(result.audio(), SYNTHESIZED);
    let name = result.file_name();
    assert!(name.starts_with("audio") && name.ends_with(".wav"), "{name}");
    assert_eq!(name.len(), "audio".len() + 8 + ".wav".len());

    assert!(!call.request.reference_audio_path().exists());
    assert!(!call.output.exists());
    fx.assert_temp_dir_empty();
}

#[test]
fn compressed_sample_is_staged_with_compressed_suffix() {
    let fx = Fixture::new(Outcome::Write(SYNTHESIZED.to_vec()));

    fx.studio
        .generate(Some(&mp3_sample()), "Namaskara", Language::Hi, &())
        .unwrap();

    let call = &fx.calls()[0];
    let staged = call.request.reference_audio_path();
    assert_eq!(staged.extension().and_then(|e| e.to_str()), Some("mp3"));
    assert_eq!(call.request.language(), Language::Hi);
    fx.assert_temp_dir_empty();
}

#[test]
fn unrecognised_format_keeps_message_and_adds_conversion_tip() {
    let raw = "Error opening 'ref.mp3': Format not recognised.";
    let fx = Fixture::new(Outcome::FailSynthesis(raw.to_string()));

    let failure = fx
        .studio
        .generate(Some(&mp3_sample()), "Happy Birthday Natesh!", Language::En, &())
        .unwrap_err();

    assert_eq!(failure.kind(), FailureKind::FormatUnsupported);
    assert_eq!(failure.message(), raw);
    let shown = failure.to_string();
    assert!(shown.contains(raw));
    assert!(shown.contains(Hint::ConvertToWav.text()));
    assert!(!shown.contains(Hint::ClearSpeech.text()));

    let call = &fx.calls()[0];
    assert!(!call.request.reference_audio_path().exists());
    assert!(!call.output.exists());
    fx.assert_temp_dir_empty();
}

#[test]
fn speaker_wav_failure_suggests_clearer_audio() {
    let fx = Fixture::new(Outcome::FailSynthesis(
        "AssertionError: speaker_wav produced no usable embedding".to_string(),
    ));

    let failure = fx
        .studio
        .generate(Some(&wav_sample()), "Hello", Language::En, &())
        .unwrap_err();

    assert_eq!(failure.kind(), FailureKind::ReferenceAudioInsufficient);
    assert_eq!(failure.hint(), Some(Hint::ClearSpeech));
    fx.assert_temp_dir_empty();
}

#[test]
fn model_load_failure_is_generic_and_still_reaped() {
    let fx = Fixture::new(Outcome::FailLoad("CUDA driver version is insufficient".to_string()));

    let failure = fx
        .studio
        .generate(Some(&wav_sample()), "Hello", Language::En, &())
        .unwrap_err();

    assert_eq!(failure.kind(), FailureKind::SynthesisUnspecified);
    assert_eq!(failure.hint(), Some(Hint::Generic));
    assert_eq!(failure.message(), "CUDA driver version is insufficient");
    assert!(fx.calls().is_empty());
    fx.assert_temp_dir_empty();
}

#[test]
fn incomplete_input_never_reaches_the_engine() {
    let fx = Fixture::new(Outcome::Write(SYNTHESIZED.to_vec()));

    assert!(!fx.studio.can_generate(None, "Hello"));
    assert!(!fx.studio.can_generate(Some(&wav_sample()), "   "));
    assert!(fx.studio.can_generate(Some(&wav_sample()), " Hello "));

    for (sample, text) in [(None, "Hello"), (Some(wav_sample()), "  \n ")] {
        let failure = fx
            .studio
            .generate(sample.as_ref(), text, Language::En, &())
            .unwrap_err();
        assert_eq!(failure.kind(), FailureKind::InputIncomplete);
    }

    assert_eq!(fx.loads.load(Ordering::SeqCst), 0);
    assert!(fx.calls().is_empty());
    fx.assert_temp_dir_empty();
}

#[test]
fn empty_engine_output_is_a_failure() {
    let fx = Fixture::new(Outcome::Write(Vec::new()));

    let failure = fx
        .studio
        .generate(Some(&wav_sample()), "Hello", Language::En, &())
        .unwrap_err();

    assert_eq!(failure.kind(), FailureKind::SynthesisUnspecified);
    fx.assert_temp_dir_empty();
}

#[test]
fn consecutive_attempts_are_independent_and_share_the_model() {
    let fx = Fixture::new(Outcome::Write(SYNTHESIZED.to_vec()));
    let sample = wav_sample();

    let first = fx
        .studio
        .generate(Some(&sample), "Happy Birthday Natesh!", Language::En, &())
        .unwrap();
    let second = fx
        .studio
        .generate(Some(&sample), "Happy Birthday Natesh!", Language::En, &())
        .unwrap();

    assert_ne!(first.file_name(), second.file_name());
    assert_eq!(first.audio(), second.audio());
    assert_ne!(first.audio().as_ptr(), second.audio().as_ptr());

    let calls = fx.calls();
    assert_eq!(calls.len(), 2);
    assert_ne!(
        calls[0].request.reference_audio_path(),
        calls[1].request.reference_audio_path()
    );
    assert_ne!(calls[0].output, calls[1].output);
    assert_eq!(fx.loads.load(Ordering::SeqCst), 1);
    fx.assert_temp_dir_empty();
}

#[test]
fn worker_attempt_reports_status_in_order() {
    let fx = Fixture::new(Outcome::Write(SYNTHESIZED.to_vec()));

    let attempt = fx.studio.spawn_generate(
        wav_sample(),
        "Happy Birthday Natesh!".to_string(),
        Language::En,
    );
    let statuses: Vec<Status> = attempt.status().iter().collect();
    let result = attempt.join().unwrap();

    assert_eq!(
        statuses,
        vec![
            Status::UsingDevice(Device::Cpu),
            Status::LoadingModel,
            Status::Synthesizing,
            Status::Finished,
        ]
    );
    assert_eq!(result.audio(), SYNTHESIZED);
    fx.assert_temp_dir_empty();
}

#[test]
fn concurrent_attempts_use_distinct_files() {
    let fx = Fixture::new(Outcome::Write(SYNTHESIZED.to_vec()));

    let attempts: Vec<_> = (0..4)
        .map(|i| {
            fx.studio
                .spawn_generate(wav_sample(), format!("Message {i}"), Language::En)
        })
        .collect();
    let results: Vec<Result<_, GenerationFailure>> =
        attempts.into_iter().map(|a| a.join()).collect();

    assert!(results.iter().all(Result::is_ok));
    let calls = fx.calls();
    let mut outputs: Vec<_> = calls.iter().map(|c| c.output.clone()).collect();
    outputs.sort();
    outputs.dedup();
    assert_eq!(outputs.len(), 4);
    assert_eq!(fx.loads.load(Ordering::SeqCst), 1);
    fx.assert_temp_dir_empty();
}

#[test]
fn warm_up_loads_once_before_attempts() {
    let fx = Fixture::new(Outcome::Write(SYNTHESIZED.to_vec()));

    assert_eq!(fx.studio.warm_up(&()).unwrap(), Device::Cpu);
    fx.studio
        .generate(Some(&wav_sample()), "Hello", Language::En, &())
        .unwrap();

    assert_eq!(fx.loads.load(Ordering::SeqCst), 1);
}

#[test]
fn default_config_is_usable_without_a_file() {
    let config = StudioConfig::default();
    assert_eq!(config.default_text, "Happy Birthday Natesh!");
    assert_eq!(config.default_language, Language::En);
}
