mod estimator;

pub use estimator::{FrameOutcome, VoiceActivityEstimator};

/// How a voice capture ended; each ending feeds analysis a canned statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoiceCompletion {
    /// Voice was detected and followed by the trailing silence.
    Spoken,
    /// Recording hit the ceiling without ever detecting a voice.
    NoInput,
    /// Microphone capture was refused or failed.
    MicUnavailable,
    /// No microphone at all; readings are simulated.
    Simulated,
}

impl VoiceCompletion {
    pub fn statement(&self) -> &'static str {
        match self {
            VoiceCompletion::Spoken => "Voice statement analyzed with audio input",
            VoiceCompletion::NoInput => "Voice statement analyzed (no input)",
            VoiceCompletion::MicUnavailable => "Voice statement analyzed (mic unavailable)",
            VoiceCompletion::Simulated => "Voice statement analyzed (simulated)",
        }
    }
}
