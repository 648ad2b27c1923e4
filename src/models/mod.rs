mod capabilities;
mod result;
mod session;
mod snapshot;

pub use capabilities::Capabilities;
pub use result::{AnalysisResult, DeviceInfo, Verdict};
pub use session::{InputMethod, SessionStatus};
pub use snapshot::{SensorSnapshot, VOICE_MIC_DENIED, VOICE_NO_MICROPHONE};
