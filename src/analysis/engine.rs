use crate::models::{AnalysisResult, Capabilities, DeviceInfo, SensorSnapshot, Verdict};
use crate::utils::math::{clamp, round_half_up};

use super::config::{AnalysisConfig, SentinelPolicy};
use super::phrases::is_high_confidence;

const BASE_SCORE: f64 = 82.0;
const SEED_SPREAD: u64 = 15;
const SEED_CENTER: f64 = 7.0;

const VOICE_WEIGHT_DETECTED: f64 = 0.3;
const VOICE_WEIGHT_AMBIENT: f64 = 0.1;
const PRESSURE_WEIGHT_TOUCH: f64 = 0.15;
const PRESSURE_WEIGHT_SYNTHETIC: f64 = 0.05;
const RESTING_PULSE: f64 = 75.0;
const PULSE_WEIGHT: f64 = 0.5;
const FACIAL_WEIGHT: f64 = 0.2;

const MIN_TRUTH: f64 = 25.0;
const MAX_TRUTH: f64 = 94.0;

const BASE_CONFIDENCE: u64 = 87;
const MAX_CONFIDENCE_BONUS: u32 = 10;

const OVERRIDE_TRUTH: u32 = 100;
const OVERRIDE_CONFIDENCE: u32 = 99;

/// Everything one analysis looks at. The snapshot is a copy frozen by the
/// caller; nothing here observes live sensor state.
#[derive(Debug, Clone, Copy)]
pub struct AnalysisInput<'a> {
    pub statement: &'a str,
    pub snapshot: SensorSnapshot,
    pub capabilities: Capabilities,
    pub voice_detected: bool,
    pub facial_active: bool,
}

/// Scores a statement against a frozen sensor snapshot.
///
/// Flattering phrases about the detector short-circuit to a perfect reading.
/// Otherwise the score starts from a statement-derived base, loses points for
/// each stressed sensor, gains a statement-derived jitter and a bonus per
/// active modality, then is clamped to 25..=94.
pub fn analyze(input: &AnalysisInput<'_>, config: &AnalysisConfig) -> AnalysisResult {
    let device_info = DeviceInfo {
        sensors_used: sensors_used(&input.capabilities, input.facial_active),
        voice_detected: input.voice_detected,
        facial_analysis_used: input.facial_active,
    };

    if is_high_confidence(input.statement) {
        return AnalysisResult {
            statement: input.statement.to_string(),
            truth_probability: OVERRIDE_TRUTH,
            confidence: OVERRIDE_CONFIDENCE,
            sensor_readings: input.snapshot,
            analysis: Verdict::TruthDetected,
            device_info,
        };
    }

    let seed = statement_seed(input.statement);
    let truth_probability =
        clamp(round_half_up(raw_truth_score(input, config)), MIN_TRUTH, MAX_TRUTH) as u32;

    let bonus = sensor_bonus(&input.capabilities, input.facial_active).min(MAX_CONFIDENCE_BONUS);
    let mut confidence = (BASE_CONFIDENCE + seed % 8) as u32 + bonus;
    if config.clamp_confidence {
        confidence = confidence.min(100);
    }

    AnalysisResult {
        statement: input.statement.to_string(),
        truth_probability,
        confidence,
        sensor_readings: input.snapshot,
        analysis: Verdict::from_probability(truth_probability),
        device_info,
    }
}

/// Position-weighted sum of the statement's UTF-16 code units (1-indexed),
/// wrapping on overflow.
pub fn statement_seed(statement: &str) -> u64 {
    statement
        .encode_utf16()
        .enumerate()
        .fold(0u64, |seed, (index, unit)| {
            seed.wrapping_add(u64::from(unit).wrapping_mul(index as u64 + 1))
        })
}

/// Truth score before rounding and clamping. Not used on the flattering-phrase path.
pub fn raw_truth_score(input: &AnalysisInput<'_>, config: &AnalysisConfig) -> f64 {
    let caps = &input.capabilities;
    let readings = &input.snapshot;
    let seed = statement_seed(input.statement);

    let mut score = BASE_SCORE + (seed % SEED_SPREAD) as f64 - SEED_CENTER;

    let voice_level = match config.sentinel_policy {
        SentinelPolicy::Blend => readings.voice_level,
        SentinelPolicy::Exclude if readings.voice_is_sentinel() => 0.0,
        SentinelPolicy::Exclude => readings.voice_level,
    };
    score -= if caps.has_microphone && input.voice_detected {
        voice_level * VOICE_WEIGHT_DETECTED
    } else {
        voice_level * VOICE_WEIGHT_AMBIENT
    };

    score -= if caps.touch_capable() {
        readings.touch_pressure * PRESSURE_WEIGHT_TOUCH
    } else {
        readings.touch_pressure * PRESSURE_WEIGHT_SYNTHETIC
    };

    score -= (readings.pulse_rate - RESTING_PULSE).max(0.0) * PULSE_WEIGHT;

    if input.facial_active {
        score -= readings.facial_stress * FACIAL_WEIGHT;
    }

    score += jitter(seed) as f64;
    score += sensor_bonus(caps, input.facial_active) as f64;
    score
}

fn jitter(seed: u64) -> i64 {
    (((seed % 11) * 7) % 11) as i64 - 5
}

fn sensor_bonus(caps: &Capabilities, facial_active: bool) -> u32 {
    let mut bonus = 0;
    if caps.has_microphone {
        bonus += 2;
    }
    if caps.has_touch {
        bonus += 1;
    }
    if caps.is_mobile {
        bonus += 1;
    }
    if facial_active {
        bonus += 3;
    }
    bonus
}

fn sensors_used(caps: &Capabilities, facial_active: bool) -> u32 {
    [caps.has_microphone, caps.has_touch, caps.is_mobile, facial_active]
        .into_iter()
        .filter(|active| *active)
        .count() as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    fn desktop() -> Capabilities {
        Capabilities::default()
    }

    fn everything() -> Capabilities {
        Capabilities {
            has_microphone: true,
            has_camera: true,
            has_touch: true,
            is_mobile: true,
        }
    }

    fn input<'a>(statement: &'a str, snapshot: SensorSnapshot, capabilities: Capabilities) -> AnalysisInput<'a> {
        AnalysisInput {
            statement,
            snapshot,
            capabilities,
            voice_detected: false,
            facial_active: false,
        }
    }

    #[test]
    fn seed_weights_code_units_by_position() {
        assert_eq!(statement_seed(""), 0);
        assert_eq!(statement_seed("a"), 97);
        assert_eq!(statement_seed("ab"), 97 + 98 * 2);
        // One astral character is two UTF-16 units.
        assert_eq!(statement_seed("\u{1F600}"), 0xD83D + 0xDE00 * 2);
    }

    #[test]
    fn text_only_statement_on_bare_device() {
        let result = analyze(
            &input("a", SensorSnapshot::baseline(), desktop()),
            &AnalysisConfig::default(),
        );
        // 82 + 7 - 7 - 2.5 (pulse 80) + 3 (jitter) = 82.5
        assert_eq!(result.truth_probability, 83);
        assert_eq!(result.confidence, 88);
        assert_eq!(result.analysis, Verdict::TruthDetected);
        assert_eq!(result.device_info.sensors_used, 0);
        assert_eq!(result.sensor_readings, SensorSnapshot::baseline());
    }

    #[test]
    fn every_sensor_penalizes_and_rewards() {
        let snapshot = SensorSnapshot {
            voice_level: 60.0,
            touch_pressure: 40.0,
            pulse_rate: 90.0,
            facial_stress: 50.0,
        };
        let result = analyze(
            &AnalysisInput {
                statement: "a",
                snapshot,
                capabilities: everything(),
                voice_detected: true,
                facial_active: true,
            },
            &AnalysisConfig::default(),
        );
        // 82 - 18 - 6 - 7.5 - 10 + 3 + 7 = 50.5
        assert_eq!(result.truth_probability, 51);
        assert_eq!(result.analysis, Verdict::Inconclusive);
        assert_eq!(result.confidence, 95);
        assert_eq!(result.device_info.sensors_used, 4);
        assert!(result.device_info.voice_detected);
        assert!(result.device_info.facial_analysis_used);
    }

    #[test]
    fn score_is_clamped_low() {
        let snapshot = SensorSnapshot {
            voice_level: 100.0,
            touch_pressure: 85.0,
            pulse_rate: 120.0,
            facial_stress: 100.0,
        };
        let result = analyze(
            &AnalysisInput {
                statement: "a",
                snapshot,
                capabilities: everything(),
                voice_detected: true,
                facial_active: true,
            },
            &AnalysisConfig::default(),
        );
        assert_eq!(result.truth_probability, 25);
        assert_eq!(result.analysis, Verdict::DeceptionDetected);
    }

    #[test]
    fn score_is_clamped_high() {
        let snapshot = SensorSnapshot {
            pulse_rate: 70.0,
            ..SensorSnapshot::baseline()
        };
        // Seed 179: base 89, jitter +5, bonus 7.
        let result = analyze(
            &AnalysisInput {
                statement: "\u{b3}",
                snapshot,
                capabilities: everything(),
                voice_detected: false,
                facial_active: true,
            },
            &AnalysisConfig::default(),
        );
        assert_eq!(result.truth_probability, 94);
        assert_eq!(result.confidence, 97);
    }

    #[test]
    fn confidence_can_exceed_one_hundred_unless_clamped() {
        let analysis = AnalysisInput {
            statement: "g",
            snapshot: SensorSnapshot::baseline(),
            capabilities: everything(),
            voice_detected: false,
            facial_active: true,
        };
        assert_eq!(analyze(&analysis, &AnalysisConfig::default()).confidence, 101);

        let clamped = AnalysisConfig {
            clamp_confidence: true,
            ..AnalysisConfig::default()
        };
        assert_eq!(analyze(&analysis, &clamped).confidence, 100);
    }

    #[test]
    fn voice_sentinels_raise_the_score_when_blended() {
        let snapshot = SensorSnapshot {
            voice_level: -2.0,
            touch_pressure: 12.0,
            pulse_rate: 75.0,
            facial_stress: 0.0,
        };
        let caps = Capabilities {
            has_microphone: true,
            ..Capabilities::default()
        };
        let analysis = input("a", snapshot, caps);

        let blended = raw_truth_score(&analysis, &AnalysisConfig::default());
        let excluded = raw_truth_score(
            &analysis,
            &AnalysisConfig {
                sentinel_policy: SentinelPolicy::Exclude,
                ..AnalysisConfig::default()
            },
        );
        assert!((blended - excluded - 0.2).abs() < 1e-9);

        // 82 + 0.2 - 0.6 + 3 + 2 = 86.6 versus 86.4 without the sentinel.
        assert_eq!(analyze(&analysis, &AnalysisConfig::default()).truth_probability, 87);
        let excluded_result = analyze(
            &analysis,
            &AnalysisConfig {
                sentinel_policy: SentinelPolicy::Exclude,
                ..AnalysisConfig::default()
            },
        );
        assert_eq!(excluded_result.truth_probability, 86);
        assert_eq!(excluded_result.sensor_readings.voice_level, -2.0);
    }

    #[test]
    fn flattering_phrase_overrides_scoring() {
        let snapshot = SensorSnapshot {
            voice_level: 100.0,
            touch_pressure: 85.0,
            pulse_rate: 120.0,
            facial_stress: 100.0,
        };
        let result = analyze(
            &AnalysisInput {
                statement: "Wow, this is the best lie detector ever!",
                snapshot,
                capabilities: everything(),
                voice_detected: true,
                facial_active: true,
            },
            &AnalysisConfig::default(),
        );
        assert_eq!(result.truth_probability, 100);
        assert_eq!(result.confidence, 99);
        assert_eq!(result.analysis, Verdict::TruthDetected);
        assert_eq!(result.sensor_readings, snapshot);
        assert_eq!(result.device_info.sensors_used, 4);
    }

    #[test]
    fn identical_inputs_give_identical_results() {
        let snapshot = SensorSnapshot {
            voice_level: 37.0,
            touch_pressure: 22.5,
            pulse_rate: 83.0,
            facial_stress: 41.0,
        };
        let analysis = AnalysisInput {
            statement: "I was home all evening.",
            snapshot,
            capabilities: everything(),
            voice_detected: true,
            facial_active: false,
        };
        let config = AnalysisConfig::default();
        assert_eq!(analyze(&analysis, &config), analyze(&analysis, &config));
    }

    #[test]
    fn non_override_scores_stay_in_band() {
        let statements = ["", "x", "I never lied", "The dog ate my homework", "\u{1F600} fine"];
        for statement in statements {
            for voice_level in [-2.0, 0.0, 100.0] {
                for pulse_rate in [60.0, 140.0] {
                    let snapshot = SensorSnapshot {
                        voice_level,
                        touch_pressure: 85.0,
                        pulse_rate,
                        facial_stress: 100.0,
                    };
                    let result = analyze(
                        &input(statement, snapshot, everything()),
                        &AnalysisConfig::default(),
                    );
                    assert!((25..=94).contains(&result.truth_probability), "{statement}: {result:?}");
                    assert!(result.confidence >= 87);
                }
            }
        }
    }

    #[test]
    fn very_long_statements_score_without_overflow() {
        let statement = "\u{FFFD}".repeat(9_500_000);
        let result = analyze(
            &input(&statement, SensorSnapshot::baseline(), desktop()),
            &AnalysisConfig::default(),
        );
        assert!((25..=94).contains(&result.truth_probability));
        assert!((87..=94).contains(&result.confidence));

        assert_eq!(jitter(u64::MAX), ((u64::MAX % 11) * 7 % 11) as i64 - 5);
        assert_eq!(jitter(97), (97 * 7 % 11) as i64 - 5);
    }
}
