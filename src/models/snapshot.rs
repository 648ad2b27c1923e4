use serde::{Deserialize, Serialize};

/// Voice level reported when the device has no microphone at all.
pub const VOICE_NO_MICROPHONE: f64 = -1.0;
/// Voice level reported when the microphone permission was refused.
pub const VOICE_MIC_DENIED: f64 = -2.0;

const BASELINE_PULSE: f64 = 80.0;

/// Point-in-time copy of the simulated sensor readings.
///
/// The session keeps one live instance that simulators mutate; analysis only
/// ever receives a copy.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SensorSnapshot {
    /// 0..=100, or one of the negative sentinels.
    pub voice_level: f64,
    pub touch_pressure: f64,
    pub pulse_rate: f64,
    pub facial_stress: f64,
}

impl SensorSnapshot {
    pub fn baseline() -> Self {
        Self {
            voice_level: 0.0,
            touch_pressure: 0.0,
            pulse_rate: BASELINE_PULSE,
            facial_stress: 0.0,
        }
    }

    pub fn voice_is_sentinel(&self) -> bool {
        self.voice_level < 0.0
    }
}

impl Default for SensorSnapshot {
    fn default() -> Self {
        Self::baseline()
    }
}
