//! Long-lived Python process holding the loaded XTTS model.
//!
//! The worker loads the weights once at spawn, then serves synthesis
//! requests as JSON lines on stdin, answering each with one JSON event line
//! on stdout. Anything else the engine prints is discarded.

use std::io::{self, BufRead, BufReader, Write};
use std::path::Path;
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};

use serde::{Deserialize, Serialize};

use crate::device::Device;
use crate::SynthesisRequest;

/// Relaxes torch's weights-only checkpoint loading, which rejects XTTS v2.
const WEIGHTS_ONLY_ENV: &str = "TORCH_FORCE_NO_WEIGHTS_ONLY_LOAD";

/// Runs under `python -u -c`, with argv = [model_name, device].
const WORKER_SCRIPT: &str = r#"
import io, json, sys

protocol = sys.stdout
sys.stdout = sys.stderr


def emit(event, **fields):
    fields["event"] = event
    protocol.write(json.dumps(fields) + "\n")
    protocol.flush()


model_name, device = sys.argv[1], sys.argv[2]
requests, sys.stdin = sys.stdin, io.StringIO("")
try:
    from TTS.api import TTS
    tts = TTS(model_name).to(device)
except EOFError:
    emit("error", message="Model license not accepted yet. Run `tts --model_name %s --list_language_idxs` once and agree to the terms." % model_name)
    sys.exit(1)
except Exception as e:
    emit("error", message=str(e))
    sys.exit(1)
sys.stdin = requests
emit("ready")

for line in requests:
    if not line.strip():
        continue
    try:
        req = json.loads(line)
        tts.tts_to_file(
            text=req["text"],
            speaker_wav=req["speaker_wav"],
            language=req["language"],
            file_path=req["out_path"],
        )
    except Exception as e:
        emit("error", message=str(e))
    else:
        emit("done")
"#;

#[derive(thiserror::Error, Debug)]
pub enum XttsError {
    #[error("`{0}` not found. Install Python 3 and Coqui TTS: `pip install coqui-tts`")]
    ProgramNotFound(String),
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("Failed to encode request: {0}")]
    Encode(#[from] serde_json::Error),
    /// The engine's own error text, unmodified.
    #[error("{0}")]
    Engine(String),
    #[error("Engine worker exited ({0})")]
    WorkerExited(String),
    #[error("Model not loaded. Call load_model() first.")]
    ModelNotLoaded,
}

#[derive(Debug, Serialize)]
struct WorkerRequest<'a> {
    text: &'a str,
    speaker_wav: &'a Path,
    language: &'a str,
    out_path: &'a Path,
}

#[derive(Debug, PartialEq, Eq, Deserialize)]
#[serde(tag = "event", rename_all = "lowercase")]
enum WorkerEvent {
    Ready,
    Done,
    Error { message: String },
}

/// Command-line arguments for the interpreter.
pub fn worker_args(model_name: &str, device: Device) -> [&str; 5] {
    ["-u", "-c", WORKER_SCRIPT, model_name, device.as_str()]
}

/// A running worker with the model loaded on one device.
#[derive(Debug)]
pub struct Worker {
    child: Child,
    stdin: ChildStdin,
    stdout: BufReader<ChildStdout>,
    device: Device,
}

impl Worker {
    /// Start the worker and block until the model is loaded.
    pub fn spawn(python: &Path, model_name: &str, device: Device) -> Result<Self, XttsError> {
        let mut child = Command::new(python)
            .args(worker_args(model_name, device))
            .env(WEIGHTS_ONLY_ENV, "1")
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| spawn_error(python, e))?;

        let (Some(stdin), Some(stdout)) = (child.stdin.take(), child.stdout.take()) else {
            let _ = child.kill();
            let _ = child.wait();
            return Err(XttsError::WorkerExited("stdio not captured".to_string()));
        };
        let mut worker = Self {
            child,
            stdin,
            stdout: BufReader::new(stdout),
            device,
        };

        match worker.next_event()? {
            WorkerEvent::Ready => {
                log::info!("XTTS worker {} ready on {device}", worker.child.id());
                Ok(worker)
            }
            WorkerEvent::Error { message } => Err(XttsError::Engine(message)),
            WorkerEvent::Done => Err(XttsError::Engine(
                "Worker answered before loading the model".to_string(),
            )),
        }
    }

    pub fn device(&self) -> Device {
        self.device
    }

    /// Run one synthesis request and wait for its answer.
    pub fn synthesize(
        &mut self,
        request: &SynthesisRequest,
        output_path: &Path,
    ) -> Result<(), XttsError> {
        let line = serde_json::to_string(&WorkerRequest {
            text: request.text(),
            speaker_wav: request.reference_audio_path(),
            language: request.language().code(),
            out_path: output_path,
        })?;

        if let Err(e) = self.send(&line) {
            log::debug!("Writing to XTTS worker failed: {e}");
            return Err(self.exited());
        }

        match self.next_event()? {
            WorkerEvent::Done => Ok(()),
            WorkerEvent::Error { message } => Err(XttsError::Engine(message)),
            WorkerEvent::Ready => Err(XttsError::Engine(
                "Worker restarted during synthesis".to_string(),
            )),
        }
    }

    fn send(&mut self, line: &str) -> io::Result<()> {
        self.stdin.write_all(line.as_bytes())?;
        self.stdin.write_all(b"\n")?;
        self.stdin.flush()
    }

    fn next_event(&mut self) -> Result<WorkerEvent, XttsError> {
        let mut line = String::new();
        loop {
            line.clear();
            if self.stdout.read_line(&mut line)? == 0 {
                return Err(self.exited());
            }
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }
            match serde_json::from_str(trimmed) {
                Ok(event) => return Ok(event),
                Err(_) => log::debug!("xtts worker: {trimmed}"),
            }
        }
    }

    fn exited(&mut self) -> XttsError {
        let _ = self.child.kill();
        match self.child.wait() {
            Ok(status) => XttsError::WorkerExited(status.to_string()),
            Err(e) => XttsError::WorkerExited(e.to_string()),
        }
    }
}

impl Drop for Worker {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

fn spawn_error(program: &Path, e: io::Error) -> XttsError {
    if e.kind() == io::ErrorKind::NotFound {
        XttsError::ProgramNotFound(program.display().to_string())
    } else {
        XttsError::Io(e)
    }
}
