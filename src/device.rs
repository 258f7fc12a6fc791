use std::fmt;
use std::process::{Command, Stdio};

use serde::{Deserialize, Serialize};

/// Compute device the engine runs on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Device {
    Cuda,
    Cpu,
}

impl Device {
    pub fn as_str(self) -> &'static str {
        match self {
            Device::Cuda => "cuda",
            Device::Cpu => "cpu",
        }
    }

    pub fn is_accelerated(self) -> bool {
        self == Device::Cuda
    }
}

impl fmt::Display for Device {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How the device is chosen for an attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DevicePreference {
    /// Use CUDA when a GPU is detected, otherwise CPU.
    #[default]
    Auto,
    /// Prefer CUDA. Still falls back to CPU, with a warning, when no GPU
    /// is detected.
    Cuda,
    Cpu,
}

/// Pick the device for a generation attempt.
///
/// A failed GPU check always falls back to [`Device::Cpu`]; acceleration is a
/// performance choice and never blocks synthesis.
pub fn select_device(preference: DevicePreference) -> Device {
    select_with(preference, cuda_available)
}

fn select_with(preference: DevicePreference, has_gpu: impl FnOnce() -> bool) -> Device {
    if preference == DevicePreference::Cpu {
        return Device::Cpu;
    }
    if has_gpu() {
        return Device::Cuda;
    }
    if preference == DevicePreference::Cuda {
        log::warn!("CUDA requested but no GPU found, using CPU");
    }
    Device::Cpu
}

/// Check for an NVIDIA GPU by asking the driver to list devices.
pub fn cuda_available() -> bool {
    let status = Command::new("nvidia-smi")
        .arg("-L")
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status();

    match status {
        Ok(status) => status.success(),
        Err(e) => {
            log::debug!("CUDA detection failed ({e}), using CPU");
            false
        }
    }
}
