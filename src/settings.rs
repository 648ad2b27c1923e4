use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{fs, path::Path, time::Duration};

use crate::analysis::AnalysisConfig;

const ENABLE_LOGS: bool = true;

use crate::log_warn;

/// Tick periods and delays of the session, in milliseconds. Tick periods
/// never go below 1 ms.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct TimingSettings {
    pub pulse_tick_ms: u64,
    pub waveform_tick_ms: u64,
    pub facial_tick_ms: u64,
    pub touch_reset_delay_ms: u64,
    /// Voice sampling cadence; one animation frame.
    pub frame_tick_ms: u64,
    pub silence_timeout_ms: u64,
    pub no_voice_timeout_ms: u64,
    pub mic_denied_delay_ms: u64,
    pub progress_tick_ms: u64,
    pub analysis_delay_ms: u64,
    pub publish_delay_ms: u64,
}

impl Default for TimingSettings {
    fn default() -> Self {
        Self {
            pulse_tick_ms: 1000,
            waveform_tick_ms: 200,
            facial_tick_ms: 500,
            touch_reset_delay_ms: 200,
            frame_tick_ms: 16,
            silence_timeout_ms: 2000,
            no_voice_timeout_ms: 10_000,
            mic_denied_delay_ms: 1000,
            progress_tick_ms: 400,
            analysis_delay_ms: 6000,
            publish_delay_ms: 1000,
        }
    }
}

impl TimingSettings {
    pub fn pulse_tick(&self) -> Duration {
        Duration::from_millis(self.pulse_tick_ms.max(1))
    }

    pub fn waveform_tick(&self) -> Duration {
        Duration::from_millis(self.waveform_tick_ms.max(1))
    }

    pub fn facial_tick(&self) -> Duration {
        Duration::from_millis(self.facial_tick_ms.max(1))
    }

    pub fn touch_reset_delay(&self) -> Duration {
        Duration::from_millis(self.touch_reset_delay_ms)
    }

    pub fn frame_tick(&self) -> Duration {
        Duration::from_millis(self.frame_tick_ms.max(1))
    }

    pub fn silence_timeout(&self) -> Duration {
        Duration::from_millis(self.silence_timeout_ms)
    }

    pub fn no_voice_timeout(&self) -> Duration {
        Duration::from_millis(self.no_voice_timeout_ms)
    }

    pub fn mic_denied_delay(&self) -> Duration {
        Duration::from_millis(self.mic_denied_delay_ms)
    }

    pub fn progress_tick(&self) -> Duration {
        Duration::from_millis(self.progress_tick_ms.max(1))
    }

    pub fn analysis_delay(&self) -> Duration {
        Duration::from_millis(self.analysis_delay_ms)
    }

    pub fn publish_delay(&self) -> Duration {
        Duration::from_millis(self.publish_delay_ms)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct EngineSettings {
    pub timing: TimingSettings,
    pub analysis: AnalysisConfig,
    /// Fixed seed for the simulators' random source; entropy when absent.
    pub rng_seed: Option<u64>,
}

pub struct SettingsStore;

impl SettingsStore {
    /// Reads settings from a JSON file. A missing file yields defaults; a
    /// malformed one is logged and also yields defaults.
    pub fn load(path: &Path) -> Result<EngineSettings> {
        if !path.exists() {
            return Ok(EngineSettings::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings from {}", path.display()))?;
        Ok(serde_json::from_str(&contents).unwrap_or_else(|err| {
            log_warn!("ignoring malformed settings in {}: {err}", path.display());
            EngineSettings::default()
        }))
    }
}
