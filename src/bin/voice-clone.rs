//! Terminal front end: clone a voice sample into speech in another language.
//!
//! ```bash
//! # Interactive session (prompts for sample, text and language)
//! voice-clone
//!
//! # One shot
//! voice-clone --audio kannada.wav --text "Happy Birthday Natesh!" --language en
//!
//! # Settings from a JSON file, verbose logs
//! RUST_LOG=debug voice-clone --config studio.json
//!
//! # Listen to the sample and the result (build with `--features playback`)
//! voice-clone --audio kannada.wav --play
//! ```

use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};

use voice_clone_rs::{
    engines::xtts::XttsEngine,
    staging::{self, StagingError, VoiceSample},
    Language, Status, Studio, StudioConfig,
};

const GENERATE_DISABLED: &str = "Generate is disabled: provide a voice sample and some text.";

#[derive(Debug, Parser)]
#[command(name = "voice-clone")]
#[command(about = "Say any text in your own voice, in English or Hindi")]
struct Cli {
    /// JSON settings file
    #[arg(long)]
    config: Option<PathBuf>,
    /// Voice sample to clone (WAV recommended). Skips the interactive prompts.
    #[arg(long)]
    audio: Option<PathBuf>,
    /// Text to speak
    #[arg(long)]
    text: Option<String>,
    /// Output language: en or hi
    #[arg(long)]
    language: Option<Language>,
    /// Where generated audio is saved
    #[arg(long, default_value = ".")]
    out_dir: PathBuf,
    /// Load the model before the first prompt
    #[arg(long)]
    warm_up: bool,
    /// Play the voice sample and the generated audio
    #[arg(long)]
    play: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => StudioConfig::from_json_file(path)?,
        None => StudioConfig::default(),
    };
    let studio = Arc::new(Studio::new(XttsEngine::from_config(&config), config));

    if cli.warm_up {
        let spinner = spinner("Loading voice cloning model...");
        let warmed = studio.warm_up(&());
        spinner.finish_and_clear();
        match warmed {
            Ok(device) => println!("Model ready on {device}"),
            Err(failure) => eprintln!("{failure}"),
        }
    }

    match &cli.audio {
        Some(audio) => {
            let sample = load_sample(audio)?;
            let text = cli
                .text
                .clone()
                .unwrap_or_else(|| studio.config().default_text.clone());
            let language = cli.language.unwrap_or(studio.config().default_language);
            let Some(sample) = ready_sample(sample, &text) else {
                eprintln!("{GENERATE_DISABLED}");
                std::process::exit(2);
            };
            if cli.play {
                play(sample.name(), sample.bytes());
            }
            if !run_attempt(&studio, sample, text, language, &cli) {
                std::process::exit(1);
            }
            Ok(())
        }
        None => interactive(&studio, &cli),
    }
}

fn interactive(studio: &Arc<Studio<XttsEngine>>, cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    println!("Voice sample → speech in another language");
    println!("Upload a sample in any language, enter text, get it spoken in your voice.");

    loop {
        println!();
        let Some(path) = prompt("Voice sample path (WAV recommended, empty to quit): ")? else {
            break;
        };
        if path.is_empty() {
            break;
        }
        let sample = match load_sample(Path::new(&path)) {
            Ok(Some(sample)) => {
                println!("Uploaded: {} ({:.2} MB)", sample.name(), sample.size_mb());
                if cli.play {
                    play(sample.name(), sample.bytes());
                }
                Some(sample)
            }
            Ok(None) => None,
            Err(e) => {
                eprintln!("Could not read sample: {e}");
                None
            }
        };

        let default_text = cli
            .text
            .clone()
            .unwrap_or_else(|| studio.config().default_text.clone());
        let text = prompt(&format!("Text to synthesize [{default_text}]: "))?
            .filter(|t| !t.is_empty())
            .unwrap_or(default_text);

        let default_language = cli.language.unwrap_or(studio.config().default_language);
        let language = loop {
            let options: Vec<String> = Language::ALL
                .iter()
                .map(|l| format!("{} = {}", l.code(), l.label()))
                .collect();
            let answer = prompt(&format!(
                "Output language ({}) [{}]: ",
                options.join(", "),
                default_language.code()
            ))?
            .unwrap_or_default();
            if answer.is_empty() {
                break default_language;
            }
            match answer.parse::<Language>() {
                Ok(language) => break language,
                Err(e) => eprintln!("{e}"),
            }
        };

        match ready_sample(sample, &text) {
            Some(sample) => {
                run_attempt(studio, sample, text, language, cli);
            }
            None => println!("{GENERATE_DISABLED}"),
        }
    }

    Ok(())
}

/// Run one attempt on a worker thread while showing its progress.
fn run_attempt(
    studio: &Arc<Studio<XttsEngine>>,
    sample: VoiceSample,
    text: String,
    language: Language,
    cli: &Cli,
) -> bool {
    let spinner = spinner("Starting...");
    let attempt = studio.spawn_generate(sample, text, language);

    for status in attempt.status().iter() {
        match status {
            Status::UsingDevice(_) => spinner.println(status.to_string()),
            Status::Finished => {}
            _ => spinner.set_message(status.to_string()),
        }
    }
    spinner.finish_and_clear();

    match attempt.join() {
        Ok(result) => {
            println!("Message generated successfully!");
            match result.duration_secs() {
                Some(secs) => println!("Generated: {:.2} MB, {secs:.1} s", result.size_mb()),
                None => println!("Generated: {:.2} MB", result.size_mb()),
            }
            match result.save_to(&cli.out_dir) {
                Ok(path) => println!("Saved {} ({})", path.display(), result.content_type()),
                Err(e) => eprintln!("Could not save {}: {e}", result.file_name()),
            }
            if cli.play {
                play(&result.file_name(), result.audio());
            }
            true
        }
        Err(failure) => {
            eprintln!("{failure}");
            false
        }
    }
}

/// Read a sample from disk. An empty file counts as no sample at all.
fn load_sample(path: &Path) -> Result<Option<VoiceSample>, StagingError> {
    match VoiceSample::from_path(path) {
        Ok(sample) => Ok(Some(sample)),
        Err(StagingError::EmptySample(name)) => {
            log::warn!("Voice sample {name} is empty");
            Ok(None)
        }
        Err(e) => Err(e),
    }
}

/// The sample, if generate is enabled for it and `text`.
fn ready_sample(sample: Option<VoiceSample>, text: &str) -> Option<VoiceSample> {
    sample.filter(|sample| staging::can_generate(Some(sample), text))
}

#[cfg(feature = "playback")]
fn play(label: &str, audio: &[u8]) {
    println!("Playing {label}...");
    if let Err(e) = voice_clone_rs::playback::play(audio) {
        eprintln!("Could not play {label}: {e}");
    }
}

#[cfg(not(feature = "playback"))]
fn play(label: &str, _audio: &[u8]) {
    eprintln!("Cannot play {label}: rebuild with `--features playback`");
}

fn spinner(message: &str) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::with_template("{spinner:.green} {msg} [{elapsed}]")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.set_message(message.to_string());
    spinner.enable_steady_tick(Duration::from_millis(100));
    spinner
}

/// Read one trimmed line. `None` on end of input.
fn prompt(label: &str) -> io::Result<Option<String>> {
    print!("{label}");
    io::stdout().flush()?;

    let mut line = String::new();
    if io::stdin().lock().read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim().to_string()))
}
