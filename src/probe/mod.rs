//! Capability probing: decides once, at startup, which input modalities the
//! session may use.

use std::future::Future;

use crate::media::{CaptureError, DeviceInfo, DeviceKind, MediaDevices};
use crate::models::Capabilities;

const ENABLE_LOGS: bool = true;

use crate::{log_info, log_warn};

const MOBILE_AGENT_MARKERS: &[&str] = &[
    "android",
    "webos",
    "iphone",
    "ipad",
    "ipod",
    "blackberry",
    "iemobile",
    "opera mini",
];

const MOBILE_MAX_SCREEN_WIDTH: u32 = 768;

/// Produces the capability value object injected into the session.
pub trait CapabilityProbe {
    fn probe(&self) -> impl Future<Output = Capabilities> + Send;
}

/// Platform facts the host environment can report without touching devices.
#[derive(Debug, Clone, Default)]
pub struct PlatformHints {
    pub user_agent: String,
    pub touch_events: bool,
    pub max_touch_points: u32,
    pub screen_width: u32,
    pub has_orientation: bool,
}

impl PlatformHints {
    pub fn is_mobile(&self) -> bool {
        let agent = self.user_agent.to_lowercase();
        MOBILE_AGENT_MARKERS.iter().any(|marker| agent.contains(marker))
            || self.touch_events
            || self.max_touch_points > 0
            || self.screen_width <= MOBILE_MAX_SCREEN_WIDTH
            || self.has_orientation
    }

    pub fn has_touch(&self) -> bool {
        self.touch_events || self.max_touch_points > 0 || self.is_mobile()
    }
}

/// Always reports the same capabilities.
#[derive(Debug, Clone, Copy)]
pub struct StaticProbe(pub Capabilities);

impl CapabilityProbe for StaticProbe {
    fn probe(&self) -> impl Future<Output = Capabilities> + Send {
        let capabilities = self.0;
        async move { capabilities }
    }
}

/// Probes a media backend: enumerates devices, then opens and immediately
/// releases a trial capture of each kind found.
pub struct DeviceProbe<'a, D> {
    devices: &'a D,
    hints: PlatformHints,
}

impl<'a, D: MediaDevices> DeviceProbe<'a, D> {
    pub fn new(devices: &'a D, hints: PlatformHints) -> Self {
        Self { devices, hints }
    }

    async fn detect(&self) -> Capabilities {
        let is_mobile = self.hints.is_mobile();
        let has_touch = self.hints.has_touch();

        let (has_microphone, has_camera) = match self.devices.enumerate().await {
            Ok(listed) => {
                let mut has_microphone = lists_kind(&listed, DeviceKind::AudioInput);
                let mut has_camera = lists_kind(&listed, DeviceKind::VideoInput);

                if has_microphone {
                    let trial = self.devices.open_microphone().await.map(|mut input| input.stop());
                    has_microphone = survives_trial(trial, "microphone");
                }
                if has_camera {
                    let trial = self.devices.open_camera().await.map(|mut capture| capture.stop());
                    has_camera = survives_trial(trial, "camera");
                }
                (has_microphone, has_camera)
            }
            Err(err) => {
                log_warn!("device enumeration failed, assuming no capture devices: {err}");
                (false, false)
            }
        };

        let capabilities = Capabilities {
            has_microphone,
            has_camera,
            has_touch,
            is_mobile,
        };
        log_info!("probed capabilities: {:?}", capabilities);
        capabilities
    }
}

impl<'a, D: MediaDevices> CapabilityProbe for DeviceProbe<'a, D> {
    fn probe(&self) -> impl Future<Output = Capabilities> + Send {
        self.detect()
    }
}

fn lists_kind(devices: &[DeviceInfo], kind: DeviceKind) -> bool {
    devices
        .iter()
        .any(|device| device.kind == kind && device.device_id != "default")
}

/// A refused trial still means the device exists; only a missing device
/// clears the flag.
fn survives_trial(trial: Result<(), CaptureError>, what: &str) -> bool {
    match trial {
        Ok(()) => true,
        Err(CaptureError::DeviceNotFound) => {
            log_warn!("{what} listed but not found on trial capture");
            false
        }
        Err(err) => {
            log_warn!("{what} trial capture failed: {err}");
            true
        }
    }
}
