//! Coqui XTTS v2 voice-cloning engine.
//!
//! XTTS v2 clones a voice from a few seconds of reference audio and speaks
//! any of its supported languages with it, regardless of the language spoken
//! in the reference. This engine keeps one Python worker process running
//! Coqui's `TTS.api`: the weights are loaded once when the model is loaded,
//! and each synthesis is a JSON-line request to that worker.
//!
//! # System Requirements
//!
//! A Python 3 interpreter that can `import TTS` must be on `PATH` as
//! `python3` (or configured through
//! [`StudioConfig::python_program`](crate::StudioConfig::python_program)):
//!
//! ```text
//! pip install coqui-tts
//! ```
//!
//! The first load downloads the model weights (about 1.8 GB) into the Coqui
//! cache and asks to accept the model license. The worker cannot answer that
//! prompt; run `tts --model_name tts_models/multilingual/multi-dataset/xtts_v2
//! --list_language_idxs` once by hand to get past it.
//!
//! # Example
//!
//! ```rust,no_run
//! use std::path::Path;
//! use voice_clone_rs::{engines::xtts::XttsEngine, Device, Language, SynthesisRequest, VoiceCloneEngine};
//!
//! let mut engine = XttsEngine::new();
//! engine.load_model(Device::Cpu)?;
//!
//! let request = SynthesisRequest::new("Happy Birthday Natesh!", "reference.wav", Language::En);
//! engine.synthesize_to_file(&request, Path::new("out.wav"))?;
//! # Ok::<(), Box<dyn std::error::Error + Send + Sync>>(())
//! ```

pub mod engine;
pub mod worker;

pub use worker::XttsError;
pub use engine::XttsEngine;
