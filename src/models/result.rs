use serde::{Deserialize, Serialize};

use super::SensorSnapshot;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum Verdict {
    TruthDetected,
    Inconclusive,
    DeceptionDetected,
}

impl Verdict {
    /// Maps a truth probability onto the three verdict bands.
    pub fn from_probability(truth_probability: u32) -> Self {
        if truth_probability >= 78 {
            Verdict::TruthDetected
        } else if truth_probability >= 50 {
            Verdict::Inconclusive
        } else {
            Verdict::DeceptionDetected
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Verdict::TruthDetected => "TRUTH DETECTED",
            Verdict::Inconclusive => "INCONCLUSIVE",
            Verdict::DeceptionDetected => "DECEPTION DETECTED",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DeviceInfo {
    pub sensors_used: u32,
    pub voice_detected: bool,
    pub facial_analysis_used: bool,
}

/// Outcome of one completed analysis.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub statement: String,
    pub truth_probability: u32,
    /// Not clamped to 100 unless `AnalysisConfig::clamp_confidence` is set.
    pub confidence: u32,
    pub sensor_readings: SensorSnapshot,
    pub analysis: Verdict,
    pub device_info: DeviceInfo,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verdict_bands_partition_the_range() {
        assert_eq!(Verdict::from_probability(100), Verdict::TruthDetected);
        assert_eq!(Verdict::from_probability(78), Verdict::TruthDetected);
        assert_eq!(Verdict::from_probability(77), Verdict::Inconclusive);
        assert_eq!(Verdict::from_probability(50), Verdict::Inconclusive);
        assert_eq!(Verdict::from_probability(49), Verdict::DeceptionDetected);
        assert_eq!(Verdict::from_probability(0), Verdict::DeceptionDetected);
    }

    #[test]
    fn verdict_serializes_camel_case() {
        let json = serde_json::to_string(&Verdict::DeceptionDetected).unwrap();
        assert_eq!(json, "\"deceptionDetected\"");
        assert_eq!(Verdict::Inconclusive.label(), "INCONCLUSIVE");
    }
}
