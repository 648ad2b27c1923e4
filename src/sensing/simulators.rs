//! Synthetic sensor signals. Every generator takes the random source
//! explicitly so a seeded session replays the same values.

use std::collections::VecDeque;

use rand::Rng;

use crate::utils::math::{clamp, round_half_up};

pub const WAVEFORM_CAPACITY: usize = 20;

const RESTING_PULSE: f64 = 75.0;
const PULSE_SPREAD: f64 = 10.0;
const ANALYZING_PULSE_BOOST: f64 = 8.0;

const WAVE_BASELINE: f64 = 40.0;
const WAVE_AMPLITUDE: f64 = 20.0;
const WAVE_PERIOD_MS: f64 = 1000.0;
const WAVE_MIN: f64 = 10.0;
const WAVE_MAX: f64 = 90.0;

const TOUCH_FALLBACK_MIN: f64 = 35.0;
const TOUCH_FALLBACK_MAX: f64 = 60.0;
const TOUCH_MIN: f64 = 15.0;
const TOUCH_MAX: f64 = 85.0;
const TOUCH_RELEASE_DECAY: f64 = 10.0;

const STRESS_BASELINE: f64 = 20.0;
const STRESS_SPREAD: f64 = 30.0;
const STRESS_AMPLITUDE: f64 = 15.0;
const STRESS_PERIOD_MS: f64 = 2000.0;

/// Next pulse reading in bpm; analysis adds up to 8 bpm of "nerves".
pub fn next_pulse_rate<R: Rng>(rng: &mut R, analyzing: bool) -> f64 {
    let boost = if analyzing {
        rng.gen_range(0.0..ANALYZING_PULSE_BOOST)
    } else {
        0.0
    };
    round_half_up(RESTING_PULSE + rng.gen_range(0.0..PULSE_SPREAD) + boost)
}

/// One waveform sample: a slow sine plus noise that doubles while someone is speaking.
pub fn next_waveform_point<R: Rng>(rng: &mut R, now_ms: i64, voice_detected: bool) -> f64 {
    let base = WAVE_BASELINE + (now_ms as f64 / WAVE_PERIOD_MS).sin() * WAVE_AMPLITUDE;
    let spread = if voice_detected { 40.0 } else { 20.0 };
    clamp(base + rng.gen_range(0.0..spread), WAVE_MIN, WAVE_MAX)
}

/// Pressure for a touch-start. `raw_force` is the platform force in 0..=1 when exposed.
pub fn touch_start_pressure<R: Rng>(rng: &mut R, raw_force: Option<f64>) -> f64 {
    let normalized = match raw_force {
        Some(force) if force > 0.0 => (force * 100.0).min(100.0),
        _ => rng.gen_range(TOUCH_FALLBACK_MIN..TOUCH_FALLBACK_MAX),
    };
    round_half_up(clamp(normalized, TOUCH_MIN, TOUCH_MAX))
}

/// Immediate decay applied on touch-end, before the delayed reset to zero.
pub fn touch_release_pressure<R: Rng>(rng: &mut R, current: f64) -> f64 {
    (current - rng.gen_range(0.0..TOUCH_RELEASE_DECAY)).max(0.0)
}

pub fn next_facial_stress<R: Rng>(rng: &mut R, now_ms: i64) -> f64 {
    let base = STRESS_BASELINE + rng.gen_range(0.0..STRESS_SPREAD);
    let variation = (now_ms as f64 / STRESS_PERIOD_MS).sin() * STRESS_AMPLITUDE;
    round_half_up(clamp(base + variation, 0.0, 100.0))
}

/// Cosmetic analysis progress: grows by 8..20 per tick, never past 100.
pub fn next_progress<R: Rng>(rng: &mut R, current: f64) -> f64 {
    if current >= 100.0 {
        return 100.0;
    }
    (current + rng.gen_range(8.0..20.0)).min(100.0)
}

/// Sliding window of the most recent pulse waveform samples.
#[derive(Debug, Clone, Default)]
pub struct PulseWaveform {
    points: VecDeque<f64>,
}

impl PulseWaveform {
    pub fn new() -> Self {
        Self {
            points: VecDeque::with_capacity(WAVEFORM_CAPACITY),
        }
    }

    pub fn push(&mut self, point: f64) {
        if self.points.len() >= WAVEFORM_CAPACITY {
            self.points.pop_front();
        }
        self.points.push_back(point);
    }

    pub fn clear(&mut self) {
        self.points.clear();
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn to_vec(&self) -> Vec<f64> {
        self.points.iter().copied().collect()
    }
}
