//! Media capture seam: the core never talks to real audio/video hardware
//! directly, it asks a [`MediaDevices`] backend for capture handles.

mod simulated;

use std::future::Future;

use thiserror::Error;

pub use simulated::{AudioScript, DeviceOutcome, SimulatedDevices};

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CaptureError {
    #[error("capture permission denied")]
    PermissionDenied,
    #[error("requested capture device not found")]
    DeviceNotFound,
    #[error("device enumeration failed: {0}")]
    EnumerationFailed(String),
    #[error("capture failed: {0}")]
    Other(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceKind {
    AudioInput,
    VideoInput,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceInfo {
    pub kind: DeviceKind,
    pub device_id: String,
}

impl DeviceInfo {
    pub fn new(kind: DeviceKind, device_id: impl Into<String>) -> Self {
        Self {
            kind,
            device_id: device_id.into(),
        }
    }
}

/// Live microphone stream exposing per-frame frequency magnitudes.
pub trait AudioInput: Send {
    /// Number of frequency bins per frame.
    fn bin_count(&self) -> usize;

    /// Fills `out` with the current byte magnitudes (0..=255) per bin.
    fn read_frequency_data(&mut self, out: &mut [u8]);

    /// Stops the capture track and releases the device.
    fn stop(&mut self);
}

/// Live camera stream. Facial stress is synthetic, so only the handle matters.
pub trait VideoCapture: Send {
    fn stop(&mut self);
}

/// Backend for device enumeration and capture acquisition. Acquisition may
/// suspend while the user answers a permission prompt.
pub trait MediaDevices: Send + Sync + 'static {
    fn enumerate(&self) -> impl Future<Output = Result<Vec<DeviceInfo>, CaptureError>> + Send;

    fn open_microphone(
        &self,
    ) -> impl Future<Output = Result<Box<dyn AudioInput>, CaptureError>> + Send;

    fn open_camera(&self) -> impl Future<Output = Result<Box<dyn VideoCapture>, CaptureError>> + Send;
}
