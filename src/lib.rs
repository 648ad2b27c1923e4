//! Novelty lie-detector core.
//!
//! Simulated biometric sensors feed a session state machine
//! (idle, recording, analyzing, result) whose analysis engine turns a
//! statement and a frozen sensor snapshot into a truth score, confidence and
//! verdict. Rendering and real device access live outside the crate, behind
//! [`media::MediaDevices`] and the [`session::SessionView`] stream.

pub mod analysis;
pub mod media;
pub mod models;
pub mod probe;
pub mod sensing;
pub mod session;
pub mod settings;
pub mod voice;
mod utils;

pub use analysis::{analyze, AnalysisConfig, AnalysisInput, SentinelPolicy};
pub use media::{AudioScript, CaptureError, DeviceOutcome, MediaDevices, SimulatedDevices};
pub use models::{
    AnalysisResult, Capabilities, DeviceInfo, InputMethod, SensorSnapshot, SessionStatus, Verdict,
};
pub use probe::{CapabilityProbe, DeviceProbe, PlatformHints, StaticProbe};
pub use session::{SessionController, SessionView};
pub use settings::{EngineSettings, SettingsStore, TimingSettings};

/// Initializes `env_logger` (reads `RUST_LOG`), defaulting to info or debug.
pub fn init_logging(debug: bool) {
    let level = if debug {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };
    let _ = env_logger::Builder::from_default_env()
        .filter_level(level)
        .try_init();
}
