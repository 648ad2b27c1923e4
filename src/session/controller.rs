use std::sync::Arc;

use anyhow::{bail, Result};
use rand::{rngs::StdRng, SeedableRng};
use tokio::sync::{watch, Mutex};
use tokio_util::sync::CancellationToken;

use crate::media::{AudioInput, MediaDevices, VideoCapture};
use crate::models::{
    AnalysisResult, Capabilities, InputMethod, SessionStatus, VOICE_NO_MICROPHONE,
};
use crate::sensing::simulators::{touch_release_pressure, touch_start_pressure};
use crate::settings::EngineSettings;
use crate::voice::VoiceCompletion;

use super::scope::StateScope;
use super::state::{SessionState, SessionView};
use super::tasks;

const ENABLE_LOGS: bool = true;

use crate::{log_info, log_warn};

/// Mutable session internals guarded by the controller's lock.
pub(super) struct SessionCore {
    pub state: SessionState,
    pub scope: StateScope,
    pub rng: StdRng,
    pub audio: Option<Box<dyn AudioInput>>,
    pub camera: Option<Box<dyn VideoCapture>>,
    pub touch_release: Option<CancellationToken>,
}

impl SessionCore {
    pub fn stop_audio(&mut self) {
        if let Some(mut input) = self.audio.take() {
            input.stop();
        }
    }

    pub fn stop_facial_analysis(&mut self) {
        if let Some(mut camera) = self.camera.take() {
            camera.stop();
        }
        self.state.facial_active = false;
        self.state.sensors.facial_stress = 0.0;
    }
}

pub(super) struct Shared<D> {
    pub core: Mutex<SessionCore>,
    pub devices: D,
    pub settings: EngineSettings,
    view_tx: watch::Sender<SessionView>,
}

impl<D> Shared<D> {
    pub fn publish(&self, core: &SessionCore) {
        self.view_tx.send_replace(core.state.view());
    }
}

/// Drives one lie-detector session at a time: idle, optional recording,
/// analyzing, result. Cloning yields another handle to the same session.
pub struct SessionController<D: MediaDevices> {
    shared: Arc<Shared<D>>,
}

impl<D: MediaDevices> Clone for SessionController<D> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<D: MediaDevices> SessionController<D> {
    /// Creates the controller in `Idle`. Must run inside a Tokio runtime since
    /// idle simulators may start immediately.
    pub async fn new(devices: D, capabilities: Capabilities, settings: EngineSettings) -> Self {
        let rng = match settings.rng_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let state = SessionState::new(capabilities);
        let (view_tx, _) = watch::channel(state.view());

        let shared = Arc::new(Shared {
            core: Mutex::new(SessionCore {
                state,
                scope: StateScope::new(SessionStatus::Idle),
                rng,
                audio: None,
                camera: None,
                touch_release: None,
            }),
            devices,
            settings,
            view_tx,
        });

        {
            let mut core = shared.core.lock().await;
            enter_state(&shared, &mut core, SessionStatus::Idle);
            shared.publish(&core);
        }

        log_info!("session controller ready with {:?}", capabilities);
        Self { shared }
    }

    pub fn devices(&self) -> &D {
        &self.shared.devices
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.shared.settings
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionView> {
        self.shared.view_tx.subscribe()
    }

    pub async fn view(&self) -> SessionView {
        self.shared.core.lock().await.state.view()
    }

    pub async fn status(&self) -> SessionStatus {
        self.shared.core.lock().await.state.status
    }

    pub async fn result(&self) -> Option<AnalysisResult> {
        self.shared.core.lock().await.state.result.clone()
    }

    /// Timers and streams still running in the current state's scope.
    pub async fn live_tasks(&self) -> usize {
        self.shared.core.lock().await.scope.live_tasks()
    }

    pub async fn set_input_method(&self, method: InputMethod) {
        let mut core = self.shared.core.lock().await;
        core.state.input_method = method;
        self.shared.publish(&core);
    }

    pub async fn set_statement_text(&self, text: impl Into<String>) {
        let mut core = self.shared.core.lock().await;
        core.state.statement_text = text.into();
        self.shared.publish(&core);
    }

    /// Flips the facial recognition preference; it stays off without a camera.
    /// Takes effect the next time analysis starts.
    pub async fn toggle_facial_recognition(&self) -> bool {
        let mut core = self.shared.core.lock().await;
        if !core.state.capabilities.has_camera {
            log_warn!("facial recognition requested without a camera");
            core.state.use_facial_recognition = false;
        } else {
            core.state.use_facial_recognition = !core.state.use_facial_recognition;
        }
        self.shared.publish(&core);
        core.state.use_facial_recognition
    }

    /// Starts a test from `Idle` and returns the state it moved to.
    pub async fn start_test(&self) -> Result<SessionStatus> {
        let mut core = self.shared.core.lock().await;
        if core.state.status != SessionStatus::Idle {
            bail!("session already active ({})", core.state.status.as_str());
        }

        match core.state.input_method {
            InputMethod::Text => {
                if core.state.statement_text.trim().is_empty() {
                    bail!("statement text is empty");
                }
                let statement = core.state.statement_text.clone();
                core.state.begin_session();
                begin_analysis(&self.shared, &mut core, statement);
            }
            InputMethod::Voice if !core.state.capabilities.has_microphone => {
                core.state.begin_session();
                core.state.sensors.voice_level = VOICE_NO_MICROPHONE;
                begin_analysis(
                    &self.shared,
                    &mut core,
                    VoiceCompletion::Simulated.statement().to_string(),
                );
            }
            InputMethod::Voice => {
                core.state.begin_session();
                enter_state(&self.shared, &mut core, SessionStatus::Recording);
                core.state.recording_status = "Requesting microphone...".into();
                let task = tasks::recording_driver(Arc::downgrade(&self.shared), core.scope.token());
                core.scope.spawn(task);
            }
        }

        self.shared.publish(&core);
        Ok(core.state.status)
    }

    /// Records a touch-start. `raw_force` is the platform force (0..=1) when available.
    pub async fn touch_start(&self, raw_force: Option<f64>) {
        let mut core = self.shared.core.lock().await;
        if !core.state.capabilities.touch_capable() {
            return;
        }
        if let Some(pending) = core.touch_release.take() {
            pending.cancel();
        }
        let core = &mut *core;
        core.state.sensors.touch_pressure = touch_start_pressure(&mut core.rng, raw_force);
        self.shared.publish(core);
    }

    /// Records a touch-end: pressure decays a little now and drops to zero
    /// after the reset delay unless another touch starts first.
    pub async fn touch_end(&self) {
        let mut core = self.shared.core.lock().await;
        if !core.state.capabilities.touch_capable() {
            return;
        }
        if let Some(pending) = core.touch_release.take() {
            pending.cancel();
        }
        let core = &mut *core;
        core.state.sensors.touch_pressure =
            touch_release_pressure(&mut core.rng, core.state.sensors.touch_pressure);

        let release = core.scope.child_token();
        core.touch_release = Some(release.clone());
        let task = tasks::touch_release(
            Arc::downgrade(&self.shared),
            release,
            self.shared.settings.timing.touch_reset_delay(),
        );
        core.scope.spawn(task);
        self.shared.publish(core);
    }

    /// Returns to `Idle` from any state, cancelling every timer and releasing
    /// capture devices.
    pub async fn reset(&self) {
        let mut core = self.shared.core.lock().await;
        enter_state(&self.shared, &mut core, SessionStatus::Idle);
        core.state.clear();
        self.shared.publish(&core);
        log_info!("session reset");
    }

    /// Stops every task and releases devices without changing the visible state.
    pub async fn shutdown(&self) {
        let mut core = self.shared.core.lock().await;
        core.scope.teardown();
        core.touch_release = None;
        core.stop_audio();
        core.stop_facial_analysis();
        self.shared.publish(&core);
    }
}

/// Tears down the current state's scope and starts the simulators the new
/// state runs. Callers spawn any state-specific tasks afterwards.
pub(super) fn enter_state<D: MediaDevices>(
    shared: &Arc<Shared<D>>,
    core: &mut SessionCore,
    status: SessionStatus,
) {
    let previous = core.scope.status();
    core.scope.teardown();
    if core.touch_release.take().is_some() {
        core.state.sensors.touch_pressure = 0.0;
    }
    core.stop_audio();
    if core.camera.is_some() || core.state.facial_active {
        core.stop_facial_analysis();
    }

    core.state.status = status;
    core.scope = StateScope::new(status);

    let caps = core.state.capabilities;
    let timing = &shared.settings.timing;
    if waveform_runs(status, &caps) {
        tasks::spawn_ticker(shared, &mut core.scope, timing.waveform_tick(), tasks::waveform_tick);
    } else {
        core.state.waveform.clear();
    }
    if pulse_runs(status, &caps) {
        tasks::spawn_ticker(shared, &mut core.scope, timing.pulse_tick(), tasks::pulse_tick);
    }

    log_info!("session {} -> {}", previous.as_str(), status.as_str());
}

/// Moves to `Analyzing` with the given statement.
pub(super) fn begin_analysis<D: MediaDevices>(
    shared: &Arc<Shared<D>>,
    core: &mut SessionCore,
    statement: String,
) {
    enter_state(shared, core, SessionStatus::Analyzing);
    core.state.recording_status.clear();
    core.state.progress = 0.0;
    let task = tasks::analyzing_driver(Arc::downgrade(shared), core.scope.token(), statement);
    core.scope.spawn(task);
}

fn pulse_runs(status: SessionStatus, caps: &Capabilities) -> bool {
    status.is_active() || caps.touch_capable()
}

fn waveform_runs(status: SessionStatus, caps: &Capabilities) -> bool {
    match status {
        SessionStatus::Analyzing => true,
        SessionStatus::Recording => caps.touch_capable(),
        SessionStatus::Idle | SessionStatus::Result => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn simulator_table() {
        let desktop = Capabilities::default();
        let phone = Capabilities {
            has_touch: true,
            is_mobile: true,
            ..Capabilities::default()
        };

        assert!(!pulse_runs(SessionStatus::Idle, &desktop));
        assert!(pulse_runs(SessionStatus::Recording, &desktop));
        assert!(pulse_runs(SessionStatus::Analyzing, &desktop));
        assert!(!pulse_runs(SessionStatus::Result, &desktop));
        assert!(pulse_runs(SessionStatus::Idle, &phone));

        assert!(!waveform_runs(SessionStatus::Recording, &desktop));
        assert!(waveform_runs(SessionStatus::Recording, &phone));
        assert!(waveform_runs(SessionStatus::Analyzing, &desktop));
        assert!(!waveform_runs(SessionStatus::Result, &phone));
    }
}
