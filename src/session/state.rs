use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{AnalysisResult, Capabilities, InputMethod, SensorSnapshot, SessionStatus};
use crate::sensing::PulseWaveform;
use crate::utils::math::round_half_up;

/// The single owned aggregate behind a session. Only the session controller
/// and the tasks of the current state scope mutate it.
#[derive(Debug, Clone)]
pub struct SessionState {
    pub status: SessionStatus,
    pub session_id: Option<String>,
    pub started_at: Option<DateTime<Utc>>,
    pub input_method: InputMethod,
    pub statement_text: String,
    pub capabilities: Capabilities,
    pub sensors: SensorSnapshot,
    pub waveform: PulseWaveform,
    pub recording_status: String,
    pub progress: f64,
    pub voice_detected: bool,
    pub voice_input_complete: bool,
    pub use_facial_recognition: bool,
    pub facial_active: bool,
    pub result: Option<AnalysisResult>,
}

impl SessionState {
    pub fn new(capabilities: Capabilities) -> Self {
        Self {
            status: SessionStatus::Idle,
            session_id: None,
            started_at: None,
            input_method: InputMethod::Voice,
            statement_text: String::new(),
            capabilities,
            sensors: SensorSnapshot::baseline(),
            waveform: PulseWaveform::new(),
            recording_status: String::new(),
            progress: 0.0,
            voice_detected: false,
            voice_input_complete: false,
            use_facial_recognition: false,
            facial_active: false,
            result: None,
        }
    }

    pub fn begin_session(&mut self) {
        self.session_id = Some(Uuid::new_v4().to_string());
        self.started_at = Some(Utc::now());
        self.result = None;
        self.progress = 0.0;
        self.voice_detected = false;
        self.voice_input_complete = false;
    }

    /// Readings and voice flags go back to baseline; the result survives.
    pub fn reset_sensors(&mut self) {
        self.sensors = SensorSnapshot::baseline();
        self.voice_detected = false;
        self.voice_input_complete = false;
    }

    /// Everything a reset discards. Capabilities, input method and the facial
    /// recognition preference are kept.
    pub fn clear(&mut self) {
        self.reset_sensors();
        self.session_id = None;
        self.started_at = None;
        self.statement_text.clear();
        self.waveform.clear();
        self.recording_status.clear();
        self.progress = 0.0;
        self.facial_active = false;
        self.result = None;
    }

    pub fn view(&self) -> SessionView {
        SessionView {
            status: self.status,
            session_id: self.session_id.clone(),
            started_at: self.started_at,
            input_method: self.input_method,
            capabilities: self.capabilities,
            sensors: self.sensors,
            waveform: self.waveform.to_vec(),
            recording_status: self.recording_status.clone(),
            progress: round_half_up(self.progress).clamp(0.0, 100.0) as u8,
            voice_detected: self.voice_detected,
            voice_input_complete: self.voice_input_complete,
            use_facial_recognition: self.use_facial_recognition,
            facial_active: self.facial_active,
            result: self.result.clone(),
        }
    }
}

/// Render-ready copy of the session, published after every mutation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SessionView {
    pub status: SessionStatus,
    pub session_id: Option<String>,
    pub started_at: Option<DateTime<Utc>>,
    pub input_method: InputMethod,
    pub capabilities: Capabilities,
    pub sensors: SensorSnapshot,
    pub waveform: Vec<f64>,
    pub recording_status: String,
    pub progress: u8,
    pub voice_detected: bool,
    pub voice_input_complete: bool,
    pub use_facial_recognition: bool,
    pub facial_active: bool,
    pub result: Option<AnalysisResult>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clear_restores_baseline_but_keeps_preferences() {
        let mut state = SessionState::new(Capabilities {
            has_camera: true,
            ..Capabilities::default()
        });
        state.input_method = InputMethod::Text;
        state.use_facial_recognition = true;
        state.begin_session();
        state.statement_text = "I was at home".into();
        state.sensors.voice_level = 55.0;
        state.sensors.pulse_rate = 91.0;
        state.waveform.push(42.0);
        state.progress = 64.0;
        state.voice_detected = true;

        state.clear();

        assert_eq!(state.sensors, SensorSnapshot::baseline());
        assert!(state.session_id.is_none());
        assert!(state.statement_text.is_empty());
        assert!(state.waveform.is_empty());
        assert!(!state.voice_detected);
        assert_eq!(state.input_method, InputMethod::Text);
        assert!(state.use_facial_recognition);
    }

    #[test]
    fn view_rounds_progress_and_uses_camel_case() {
        let mut state = SessionState::new(Capabilities::default());
        state.progress = 37.6;
        let view = state.view();
        assert_eq!(view.progress, 38);

        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["sensors"]["pulseRate"], 80.0);
        assert_eq!(json["status"], "idle");
        assert_eq!(json["voiceInputComplete"], false);
    }
}
