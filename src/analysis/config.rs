use serde::{Deserialize, Serialize};

/// How negative voice sentinels (no microphone, permission denied) enter the score.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum SentinelPolicy {
    /// Sentinels are weighted like any reading, so they raise the score slightly.
    #[default]
    Blend,
    /// Sentinels contribute nothing to the voice penalty.
    Exclude,
}

/// Tunable knobs of the scoring pipeline.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct AnalysisConfig {
    pub sentinel_policy: SentinelPolicy,

    /// Confidence can reach 101 with every sensor active; this caps it at 100.
    pub clamp_confidence: bool,
}
