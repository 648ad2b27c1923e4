use crate::media::AudioInput;
use crate::utils::math::round_half_up;

const VOICE_THRESHOLD: f64 = 0.02;
const AVERAGE_WEIGHT: f64 = 0.7;
const PEAK_WEIGHT: f64 = 0.3;
const SMOOTHING_KEEP: f64 = 0.7;
const SMOOTHING_NEW: f64 = 0.3;
const QUIET_DECAY: f64 = 5.0;

/// Result of sampling one audio frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FrameOutcome {
    /// Voice above threshold; the silence timer should restart.
    Voice { level: f64 },
    /// Below threshold; the level decays and the silence timer is left alone.
    Quiet { level: f64 },
}

impl FrameOutcome {
    pub fn level(&self) -> f64 {
        match self {
            FrameOutcome::Voice { level } | FrameOutcome::Quiet { level } => *level,
        }
    }
}

/// Turns frequency-domain frames into a smoothed 0..=80 voice level.
#[derive(Debug, Clone)]
pub struct VoiceActivityEstimator {
    bins: Vec<u8>,
    detected: bool,
}

impl VoiceActivityEstimator {
    pub fn new(bin_count: usize) -> Self {
        Self {
            bins: vec![0; bin_count],
            detected: false,
        }
    }

    /// True once any frame since construction crossed the voice threshold.
    pub fn detected(&self) -> bool {
        self.detected
    }

    /// Reads one frame from `input` and folds it into `current_level`.
    pub fn sample(&mut self, input: &mut dyn AudioInput, current_level: f64) -> FrameOutcome {
        input.read_frequency_data(&mut self.bins);
        let combined = combined_amplitude(&self.bins);
        if combined > VOICE_THRESHOLD {
            self.detected = true;
            FrameOutcome::Voice {
                level: round_half_up(
                    current_level * SMOOTHING_KEEP + target_level(combined) * SMOOTHING_NEW,
                ),
            }
        } else {
            FrameOutcome::Quiet {
                level: (current_level - QUIET_DECAY).max(0.0),
            }
        }
    }
}

/// Weighted blend of the normalized mean and peak bin magnitudes.
pub fn combined_amplitude(bins: &[u8]) -> f64 {
    if bins.is_empty() {
        return 0.0;
    }
    let sum: u64 = bins.iter().map(|&b| u64::from(b)).sum();
    let peak = bins.iter().copied().max().unwrap_or(0);
    let average = sum as f64 / bins.len() as f64 / 255.0;
    average * AVERAGE_WEIGHT + f64::from(peak) / 255.0 * PEAK_WEIGHT
}

/// Piecewise-linear loudness curve: quiet speech lands in 40..55, normal in
/// 55..70, loud speech saturates at 80.
pub fn target_level(combined: f64) -> f64 {
    if combined < 0.1 {
        40.0 + (combined / 0.1) * 15.0
    } else if combined < 0.3 {
        55.0 + ((combined - 0.1) / 0.2) * 15.0
    } else {
        70.0 + (((combined - 0.3) / 0.4) * 10.0).min(10.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedFrames {
        frames: Vec<Vec<u8>>,
    }

    impl AudioInput for FixedFrames {
        fn bin_count(&self) -> usize {
            4
        }

        fn read_frequency_data(&mut self, out: &mut [u8]) {
            let frame = if self.frames.is_empty() {
                vec![0; out.len()]
            } else {
                self.frames.remove(0)
            };
            out.copy_from_slice(&frame);
        }

        fn stop(&mut self) {}
    }

    #[test]
    fn amplitude_blends_average_and_peak() {
        assert_eq!(combined_amplitude(&[]), 0.0);
        assert_eq!(combined_amplitude(&[0, 0, 0, 0]), 0.0);
        let combined = combined_amplitude(&[255, 0, 0, 0]);
        assert!((combined - (0.25 * 0.7 + 0.3)).abs() < 1e-12);
    }

    #[test]
    fn loudness_curve_segments() {
        assert!((target_level(0.05) - 47.5).abs() < 1e-9);
        assert!((target_level(0.1) - 55.0).abs() < 1e-9);
        assert!((target_level(0.2) - 62.5).abs() < 1e-9);
        assert!((target_level(0.3) - 70.0).abs() < 1e-9);
        assert!((target_level(0.5) - 75.0).abs() < 1e-9);
        assert_eq!(target_level(1.0), 80.0);
    }

    #[test]
    fn voice_frames_smooth_and_quiet_frames_decay() {
        let mut input = FixedFrames {
            frames: vec![vec![10; 4], vec![10; 4], vec![0; 4], vec![1; 4]],
        };
        let mut estimator = VoiceActivityEstimator::new(input.bin_count());
        assert!(!estimator.detected());

        // 10/255 ≈ 0.0392 → target ≈ 45.88 → round(0 * 0.7 + 13.76)
        let first = estimator.sample(&mut input, 0.0);
        assert_eq!(first, FrameOutcome::Voice { level: 14.0 });
        assert!(estimator.detected());

        // round(14 * 0.7 + 13.76) = round(23.56)
        let second = estimator.sample(&mut input, first.level());
        assert_eq!(second, FrameOutcome::Voice { level: 24.0 });

        let quiet = estimator.sample(&mut input, second.level());
        assert_eq!(quiet, FrameOutcome::Quiet { level: 19.0 });

        // 1/255 ≈ 0.0039 stays under the threshold.
        let faint = estimator.sample(&mut input, 3.0);
        assert_eq!(faint, FrameOutcome::Quiet { level: 0.0 });
        assert!(estimator.detected());
    }
}
