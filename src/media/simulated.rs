use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};
use std::time::Duration;

use tokio::time::Instant;

use super::{AudioInput, CaptureError, DeviceInfo, DeviceKind, MediaDevices, VideoCapture};

const FFT_BINS: usize = 128;

/// What happens when a capture of one kind is requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceOutcome {
    Grant,
    Deny,
    NotFound,
}

impl DeviceOutcome {
    fn into_result(self) -> Result<(), CaptureError> {
        match self {
            DeviceOutcome::Grant => Ok(()),
            DeviceOutcome::Deny => Err(CaptureError::PermissionDenied),
            DeviceOutcome::NotFound => Err(CaptureError::DeviceNotFound),
        }
    }
}

/// Amplitude timeline for a simulated microphone. Each segment fills every
/// frequency bin with one magnitude for a duration; after the last segment the
/// microphone is silent.
#[derive(Debug, Clone, Default)]
pub struct AudioScript {
    segments: Vec<(Duration, u8)>,
}

impl AudioScript {
    pub fn silence() -> Self {
        Self::default()
    }

    pub fn speech(magnitude: u8, duration: Duration) -> Self {
        Self::silence().then(magnitude, duration)
    }

    pub fn then(mut self, magnitude: u8, duration: Duration) -> Self {
        self.segments.push((duration, magnitude));
        self
    }

    fn magnitude_at(&self, elapsed: Duration) -> u8 {
        let mut end = Duration::ZERO;
        for (duration, magnitude) in &self.segments {
            end += *duration;
            if elapsed < end {
                return *magnitude;
            }
        }
        0
    }
}

/// In-memory media backend with scripted outcomes. Tracks how many capture
/// handles are currently open so tests can assert devices get released.
#[derive(Debug, Clone)]
pub struct SimulatedDevices {
    devices: Vec<DeviceInfo>,
    enumeration_fails: bool,
    microphone: DeviceOutcome,
    camera: DeviceOutcome,
    audio: AudioScript,
    permission_delay: Duration,
    live_tracks: Arc<AtomicUsize>,
}

impl SimulatedDevices {
    /// A backend listing one microphone and one camera, both granted.
    pub fn new(audio: AudioScript) -> Self {
        Self {
            devices: vec![
                DeviceInfo::new(DeviceKind::AudioInput, "default"),
                DeviceInfo::new(DeviceKind::AudioInput, "mic-0"),
                DeviceInfo::new(DeviceKind::VideoInput, "cam-0"),
            ],
            enumeration_fails: false,
            microphone: DeviceOutcome::Grant,
            camera: DeviceOutcome::Grant,
            audio,
            permission_delay: Duration::ZERO,
            live_tracks: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// A backend with no devices at all.
    pub fn empty() -> Self {
        Self {
            devices: Vec::new(),
            microphone: DeviceOutcome::NotFound,
            camera: DeviceOutcome::NotFound,
            ..Self::new(AudioScript::silence())
        }
    }

    pub fn with_devices(mut self, devices: Vec<DeviceInfo>) -> Self {
        self.devices = devices;
        self
    }

    pub fn with_microphone(mut self, outcome: DeviceOutcome) -> Self {
        self.microphone = outcome;
        self
    }

    pub fn with_camera(mut self, outcome: DeviceOutcome) -> Self {
        self.camera = outcome;
        self
    }

    pub fn with_enumeration_failure(mut self) -> Self {
        self.enumeration_fails = true;
        self
    }

    /// Time the simulated permission prompt stays open before resolving.
    pub fn with_permission_delay(mut self, delay: Duration) -> Self {
        self.permission_delay = delay;
        self
    }

    /// Capture handles opened and not yet stopped or dropped.
    pub fn live_tracks(&self) -> usize {
        self.live_tracks.load(Ordering::SeqCst)
    }
}

impl MediaDevices for SimulatedDevices {
    fn enumerate(
        &self,
    ) -> impl std::future::Future<Output = Result<Vec<DeviceInfo>, CaptureError>> + Send {
        let result = if self.enumeration_fails {
            Err(CaptureError::EnumerationFailed(
                "media devices unavailable".into(),
            ))
        } else {
            Ok(self.devices.clone())
        };
        async move { result }
    }

    fn open_microphone(
        &self,
    ) -> impl std::future::Future<Output = Result<Box<dyn AudioInput>, CaptureError>> + Send {
        let outcome = self.microphone;
        let delay = self.permission_delay;
        let script = self.audio.clone();
        let live_tracks = Arc::clone(&self.live_tracks);
        async move {
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
            outcome.into_result()?;
            live_tracks.fetch_add(1, Ordering::SeqCst);
            Ok(Box::new(SimulatedMicrophone {
                script,
                opened_at: Instant::now(),
                track: Track::new(live_tracks),
            }) as Box<dyn AudioInput>)
        }
    }

    fn open_camera(
        &self,
    ) -> impl std::future::Future<Output = Result<Box<dyn VideoCapture>, CaptureError>> + Send {
        let outcome = self.camera;
        let delay = self.permission_delay;
        let live_tracks = Arc::clone(&self.live_tracks);
        async move {
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
            outcome.into_result()?;
            live_tracks.fetch_add(1, Ordering::SeqCst);
            Ok(Box::new(SimulatedCamera {
                track: Track::new(live_tracks),
            }) as Box<dyn VideoCapture>)
        }
    }
}

/// Decrements the live-track counter exactly once, on stop or drop.
#[derive(Debug)]
struct Track {
    live_tracks: Arc<AtomicUsize>,
    stopped: bool,
}

impl Track {
    fn new(live_tracks: Arc<AtomicUsize>) -> Self {
        Self {
            live_tracks,
            stopped: false,
        }
    }

    fn stop(&mut self) {
        if !self.stopped {
            self.stopped = true;
            self.live_tracks.fetch_sub(1, Ordering::SeqCst);
        }
    }
}

impl Drop for Track {
    fn drop(&mut self) {
        self.stop();
    }
}

struct SimulatedMicrophone {
    script: AudioScript,
    opened_at: Instant,
    track: Track,
}

impl AudioInput for SimulatedMicrophone {
    fn bin_count(&self) -> usize {
        FFT_BINS
    }

    fn read_frequency_data(&mut self, out: &mut [u8]) {
        let magnitude = if self.track.stopped {
            0
        } else {
            self.script.magnitude_at(self.opened_at.elapsed())
        };
        out.fill(magnitude);
    }

    fn stop(&mut self) {
        self.track.stop();
    }
}

struct SimulatedCamera {
    track: Track,
}

impl VideoCapture for SimulatedCamera {
    fn stop(&mut self) {
        self.track.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn script_plays_segments_in_order_then_goes_silent() {
        let script = AudioScript::speech(40, Duration::from_millis(100)).then(200, Duration::from_millis(50));
        assert_eq!(script.magnitude_at(Duration::from_millis(0)), 40);
        assert_eq!(script.magnitude_at(Duration::from_millis(99)), 40);
        assert_eq!(script.magnitude_at(Duration::from_millis(120)), 200);
        assert_eq!(script.magnitude_at(Duration::from_millis(150)), 0);
    }

    #[tokio::test]
    async fn stopping_or_dropping_releases_the_track() {
        let devices = SimulatedDevices::new(AudioScript::silence());
        let mut mic = devices.open_microphone().await.unwrap();
        let camera = devices.open_camera().await.unwrap();
        assert_eq!(devices.live_tracks(), 2);

        mic.stop();
        mic.stop();
        assert_eq!(devices.live_tracks(), 1);

        drop(camera);
        assert_eq!(devices.live_tracks(), 0);
    }

    #[tokio::test]
    async fn refused_and_missing_devices_map_to_distinct_errors() {
        let denied = SimulatedDevices::new(AudioScript::silence()).with_microphone(DeviceOutcome::Deny);
        assert_eq!(
            denied.open_microphone().await.err(),
            Some(CaptureError::PermissionDenied)
        );

        let empty = SimulatedDevices::empty();
        assert_eq!(empty.open_camera().await.err(), Some(CaptureError::DeviceNotFound));
        assert!(empty.enumerate().await.unwrap().is_empty());
    }
}
