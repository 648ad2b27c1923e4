use serde::{Deserialize, Serialize};

/// Input modalities available on the device, probed once at startup.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Capabilities {
    pub has_microphone: bool,
    pub has_camera: bool,
    pub has_touch: bool,
    pub is_mobile: bool,
}

impl Capabilities {
    /// Touch pressure is only measured (rather than synthesized) on these devices.
    pub fn touch_capable(&self) -> bool {
        self.has_touch || self.is_mobile
    }
}
