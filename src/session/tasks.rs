//! Tasks owned by session state scopes. Every task holds only a weak handle
//! to the session and re-checks its scope token after taking the lock, so a
//! torn-down state can never write into its successor.

use std::sync::{Arc, Weak};

use chrono::Utc;
use rand::Rng;
use tokio::time::{self, Duration, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::analysis::{analyze, AnalysisInput};
use crate::media::{CaptureError, MediaDevices};
use crate::models::{SensorSnapshot, SessionStatus, VOICE_MIC_DENIED, VOICE_NO_MICROPHONE};
use crate::sensing::simulators::{
    next_facial_stress, next_progress, next_pulse_rate, next_waveform_point,
};
use crate::sensing::{ticker_loop, TickFlow};
use crate::voice::{FrameOutcome, VoiceActivityEstimator, VoiceCompletion};

use super::controller::{begin_analysis, enter_state, SessionCore, Shared};
use super::scope::StateScope;

const ENABLE_LOGS: bool = true;

use crate::{log_debug, log_info, log_warn};

const SYNTHETIC_PRESSURE_MAX: f64 = 30.0;

type TickFn = fn(&mut SessionCore) -> TickFlow;

fn now_ms() -> i64 {
    Utc::now().timestamp_millis()
}

/// Runs `on_tick` under the session lock every `period` for the life of `scope`.
pub(super) fn spawn_ticker<D: MediaDevices>(
    shared: &Arc<Shared<D>>,
    scope: &mut StateScope,
    period: Duration,
    on_tick: TickFn,
) {
    let weak = Arc::downgrade(shared);
    let token = scope.token();
    scope.spawn(ticker_loop(period, token.clone(), move || {
        let weak = weak.clone();
        let token = token.clone();
        async move {
            let Some(shared) = weak.upgrade() else {
                return TickFlow::Stop;
            };
            let mut core = shared.core.lock().await;
            if token.is_cancelled() {
                return TickFlow::Stop;
            }
            let flow = on_tick(&mut core);
            shared.publish(&core);
            flow
        }
    }));
}

pub(super) fn pulse_tick(core: &mut SessionCore) -> TickFlow {
    let analyzing = core.state.status == SessionStatus::Analyzing;
    core.state.sensors.pulse_rate = next_pulse_rate(&mut core.rng, analyzing);
    TickFlow::Continue
}

pub(super) fn waveform_tick(core: &mut SessionCore) -> TickFlow {
    let point = next_waveform_point(&mut core.rng, now_ms(), core.state.voice_detected);
    core.state.waveform.push(point);
    TickFlow::Continue
}

fn facial_tick(core: &mut SessionCore) -> TickFlow {
    if !core.state.facial_active {
        return TickFlow::Stop;
    }
    core.state.sensors.facial_stress = next_facial_stress(&mut core.rng, now_ms());
    TickFlow::Continue
}

fn progress_tick(core: &mut SessionCore) -> TickFlow {
    core.state.progress = next_progress(&mut core.rng, core.state.progress);
    if core.state.progress >= 100.0 {
        TickFlow::Stop
    } else {
        TickFlow::Continue
    }
}

/// Drops touch pressure to zero once the reset delay passes uninterrupted.
pub(super) async fn touch_release<D: MediaDevices>(
    weak: Weak<Shared<D>>,
    release: CancellationToken,
    delay: Duration,
) {
    tokio::select! {
        _ = release.cancelled() => return,
        _ = time::sleep(delay) => {}
    }
    let Some(shared) = weak.upgrade() else {
        return;
    };
    let mut core = shared.core.lock().await;
    if release.is_cancelled() {
        return;
    }
    core.state.sensors.touch_pressure = 0.0;
    core.touch_release = None;
    shared.publish(&core);
}

/// Acquires the microphone for the `Recording` state and routes every
/// acquisition outcome to its continuation.
pub(super) async fn recording_driver<D: MediaDevices>(weak: Weak<Shared<D>>, token: CancellationToken) {
    let Some(shared) = weak.upgrade() else {
        return;
    };
    let opened = shared.devices.open_microphone().await;

    let mut core = shared.core.lock().await;
    if token.is_cancelled() {
        if let Ok(mut input) = opened {
            log_info!("microphone granted after the recording was abandoned; releasing it");
            input.stop();
        }
        return;
    }

    match opened {
        Ok(input) => {
            let estimator = VoiceActivityEstimator::new(input.bin_count());
            core.audio = Some(input);
            core.state.recording_status = "Listening...".into();
            core.state.voice_detected = false;
            core.state.voice_input_complete = false;
            core.state.sensors.voice_level = 0.0;
            shared.publish(&core);
            drop(core);
            let timing = shared.settings.timing.clone();
            drop(shared);

            log_info!("recording started");
            listen(
                weak,
                token,
                estimator,
                timing.frame_tick(),
                timing.silence_timeout(),
                timing.no_voice_timeout(),
            )
            .await;
        }
        Err(CaptureError::DeviceNotFound) => {
            log_warn!("microphone vanished before recording; simulating voice input");
            core.state.sensors.voice_level = VOICE_NO_MICROPHONE;
            begin_analysis(&shared, &mut core, VoiceCompletion::Simulated.statement().to_string());
            shared.publish(&core);
        }
        Err(err) => {
            log_warn!("microphone unavailable: {err}");
            core.state.recording_status = "Mic access denied".into();
            core.state.sensors.voice_level = VOICE_MIC_DENIED;
            shared.publish(&core);
            drop(core);
            let delay = shared.settings.timing.mic_denied_delay();
            drop(shared);

            tokio::select! {
                _ = token.cancelled() => return,
                _ = time::sleep(delay) => {}
            }
            finish_recording(&weak, &token, VoiceCompletion::MicUnavailable).await;
        }
    }
}

/// Samples the microphone once per frame until a trailing silence follows
/// detected speech, or the no-voice ceiling passes without any speech.
async fn listen<D: MediaDevices>(
    weak: Weak<Shared<D>>,
    token: CancellationToken,
    mut estimator: VoiceActivityEstimator,
    frame_period: Duration,
    silence_timeout: Duration,
    no_voice_timeout: Duration,
) {
    let mut frames = time::interval(frame_period);
    frames.set_missed_tick_behavior(MissedTickBehavior::Skip);

    let ceiling = time::sleep(no_voice_timeout);
    tokio::pin!(ceiling);
    let mut ceiling_pending = true;

    let silence = time::sleep(silence_timeout);
    tokio::pin!(silence);
    let mut silence_armed = false;

    loop {
        tokio::select! {
            _ = token.cancelled() => return,
            _ = &mut silence, if silence_armed => {
                log_info!("speech followed by silence; recording complete");
                finish_recording(&weak, &token, VoiceCompletion::Spoken).await;
                return;
            }
            _ = &mut ceiling, if ceiling_pending => {
                ceiling_pending = false;
                if !estimator.detected() {
                    log_info!("no voice within {:?}; stopping recording", no_voice_timeout);
                    finish_recording(&weak, &token, VoiceCompletion::NoInput).await;
                    return;
                }
            }
            _ = frames.tick() => {
                let Some(shared) = weak.upgrade() else {
                    return;
                };
                let mut guard = shared.core.lock().await;
                if token.is_cancelled() {
                    return;
                }
                let core = &mut *guard;
                let Some(input) = core.audio.as_mut() else {
                    return;
                };
                let outcome = estimator.sample(&mut **input, core.state.sensors.voice_level);
                core.state.sensors.voice_level = outcome.level();
                if let FrameOutcome::Voice { level } = outcome {
                    log_debug!("voice frame at level {level}");
                    core.state.voice_detected = true;
                    silence.as_mut().reset(Instant::now() + silence_timeout);
                    silence_armed = true;
                }
                shared.publish(core);
            }
        }
    }
}

/// Ends the recording (releasing the microphone) and starts analysis with the
/// statement for how it ended.
async fn finish_recording<D: MediaDevices>(
    weak: &Weak<Shared<D>>,
    token: &CancellationToken,
    completion: VoiceCompletion,
) {
    let Some(shared) = weak.upgrade() else {
        return;
    };
    let mut core = shared.core.lock().await;
    if token.is_cancelled() {
        return;
    }
    core.stop_audio();
    if completion == VoiceCompletion::Spoken {
        core.state.voice_input_complete = true;
    }
    begin_analysis(&shared, &mut core, completion.statement().to_string());
    shared.publish(&core);
}

/// Runs the `Analyzing` state: optional facial analysis, the cosmetic
/// progress bar, the scoring after the analysis delay, and publication of the
/// result after the publish delay.
pub(super) async fn analyzing_driver<D: MediaDevices>(
    weak: Weak<Shared<D>>,
    token: CancellationToken,
    statement: String,
) {
    let Some(shared) = weak.upgrade() else {
        return;
    };

    let wants_camera = {
        let core = shared.core.lock().await;
        if token.is_cancelled() {
            return;
        }
        core.state.use_facial_recognition && core.state.capabilities.has_camera
    };

    if wants_camera {
        let opened = shared.devices.open_camera().await;
        let mut core = shared.core.lock().await;
        if token.is_cancelled() {
            if let Ok(mut camera) = opened {
                camera.stop();
            }
            return;
        }
        match opened {
            Ok(camera) => {
                core.camera = Some(camera);
                core.state.facial_active = true;
                let period = shared.settings.timing.facial_tick();
                spawn_ticker(&shared, &mut core.scope, period, facial_tick);
                log_info!("facial analysis started");
            }
            Err(err) => {
                log_warn!("facial analysis unavailable: {err}");
                core.state.facial_active = false;
            }
        }
        shared.publish(&core);
    }

    {
        let mut core = shared.core.lock().await;
        if token.is_cancelled() {
            return;
        }
        let period = shared.settings.timing.progress_tick();
        spawn_ticker(&shared, &mut core.scope, period, progress_tick);
    }

    let timing = shared.settings.timing.clone();
    drop(shared);

    tokio::select! {
        _ = token.cancelled() => return,
        _ = time::sleep(timing.analysis_delay()) => {}
    }

    let result = {
        let Some(shared) = weak.upgrade() else {
            return;
        };
        let mut guard = shared.core.lock().await;
        if token.is_cancelled() {
            return;
        }
        let core = &mut *guard;
        let snapshot = freeze_snapshot(core);
        let result = analyze(
            &AnalysisInput {
                statement: &statement,
                snapshot,
                capabilities: core.state.capabilities,
                voice_detected: core.state.voice_detected,
                facial_active: core.state.facial_active,
            },
            &shared.settings.analysis,
        );
        log_info!(
            "analysis computed: {}% ({})",
            result.truth_probability,
            result.analysis.label()
        );
        core.state.progress = 100.0;
        core.stop_facial_analysis();
        shared.publish(core);
        result
    };

    tokio::select! {
        _ = token.cancelled() => return,
        _ = time::sleep(timing.publish_delay()) => {}
    }

    let Some(shared) = weak.upgrade() else {
        return;
    };
    let mut core = shared.core.lock().await;
    if token.is_cancelled() {
        return;
    }
    enter_state(&shared, &mut core, SessionStatus::Result);
    core.state.result = Some(result);
    core.state.reset_sensors();
    shared.publish(&core);
}

/// Copies the live readings for scoring. Devices without touch get a
/// synthesized pressure; facial stress only counts while facial analysis runs.
fn freeze_snapshot(core: &mut SessionCore) -> SensorSnapshot {
    let mut snapshot = core.state.sensors;
    if !core.state.capabilities.touch_capable() {
        snapshot.touch_pressure = core.rng.gen_range(0.0..SYNTHETIC_PRESSURE_MAX);
    }
    if !core.state.facial_active {
        snapshot.facial_stress = 0.0;
    }
    snapshot
}
