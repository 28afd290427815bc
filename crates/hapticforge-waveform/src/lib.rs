//! Timed vibration waveforms for Hapticforge.
//!
//! A waveform is a short sequence of `(intensity, hold)` steps: set the
//! motor to `intensity`, wait `hold`, move to the next step. Two shapes
//! are provided:
//!
//! - **Pulse**: a linear decay from `steps / 10` down to `0.1` in
//!   `0.1` decrements, followed by a zero step so the motor always
//!   comes to rest. The step count comes from the [`PowerLevel`]
//!   (LOW = 2, MEDIUM = 4, HIGH = 6) and the whole decay takes
//!   [`WaveformConfig::pulse_duration`].
//! - **Heartbeat**: a pulse raised by [`WaveformConfig::heartbeat_offset`],
//!   a short gap, then a plain pulse: "thump-thump".
//!
//! Planning is pure ([`Waveform::pulse`], [`Waveform::heartbeat`]) so
//! the shape can be checked without a clock. [`Waveform::play`] walks
//! the plan with `tokio::time::sleep` between steps.
//!
//! # Integration
//!
//! The session actor plays a waveform inline, holding the device state
//! for the whole effect:
//!
//! ```ignore
//! let wave = Waveform::pulse(PowerLevel::High, 0.0, &config);
//! wave.play(|intensity| self.vibrate(&device, intensity)).await?;
//! ```

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use tracing::{trace, warn};

// ---------------------------------------------------------------------------
// PowerLevel
// ---------------------------------------------------------------------------

/// Strength of a pulse. Typed on the command line as `LOW`, `MEDIUM`
/// or `HIGH`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PowerLevel {
    Low,
    Medium,
    High,
}

impl PowerLevel {
    /// Number of decay steps in a pulse at this level. The first step's
    /// intensity is `decay_steps / 10`.
    pub fn decay_steps(self) -> u32 {
        match self {
            Self::Low => 2,
            Self::Medium => 4,
            Self::High => 6,
        }
    }
}

/// The token wasn't `LOW`, `MEDIUM` or `HIGH`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown power level `{0}`, expected LOW, MEDIUM or HIGH")]
pub struct ParsePowerLevelError(pub String);

impl FromStr for PowerLevel {
    type Err = ParsePowerLevelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "LOW" => Ok(Self::Low),
            "MEDIUM" => Ok(Self::Medium),
            "HIGH" => Ok(Self::High),
            other => Err(ParsePowerLevelError(other.to_string())),
        }
    }
}

impl fmt::Display for PowerLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Low => write!(f, "LOW"),
            Self::Medium => write!(f, "MEDIUM"),
            Self::High => write!(f, "HIGH"),
        }
    }
}

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Timing and shape parameters for waveforms.
#[derive(Debug, Clone, PartialEq)]
pub struct WaveformConfig {
    /// Length of one pulse's decay, split evenly across its steps.
    /// Default: 480 ms.
    pub pulse_duration: Duration,
    /// Rest between the two beats of a heartbeat. Default: 50 ms.
    pub heartbeat_gap: Duration,
    /// Intensity added to every step of a heartbeat's first beat.
    /// Default: 0.05.
    pub heartbeat_offset: f64,
}

impl Default for WaveformConfig {
    fn default() -> Self {
        Self {
            pulse_duration: Duration::from_millis(480),
            heartbeat_gap: Duration::from_millis(50),
            heartbeat_offset: 0.05,
        }
    }
}

impl WaveformConfig {
    /// Largest allowed heartbeat offset. HIGH starts at 0.6, so this
    /// keeps the first beat within `0.0..=1.0`.
    pub const MAX_OFFSET: f64 = 0.4;

    /// Clamp and fix any out-of-range values so the config is safe to use.
    ///
    /// - A zero `pulse_duration` falls back to the default.
    /// - `heartbeat_offset` is clamped to `0.0..=MAX_OFFSET` (NaN becomes 0).
    pub fn validated(mut self) -> Self {
        if self.pulse_duration.is_zero() {
            warn!("pulse_duration is zero, using default");
            self.pulse_duration = Self::default().pulse_duration;
        }
        if self.heartbeat_offset.is_nan() {
            self.heartbeat_offset = 0.0;
        }
        let clamped = self.heartbeat_offset.clamp(0.0, Self::MAX_OFFSET);
        if clamped != self.heartbeat_offset {
            warn!(
                offset = self.heartbeat_offset,
                max = Self::MAX_OFFSET,
                "heartbeat_offset out of range, clamping"
            );
            self.heartbeat_offset = clamped;
        }
        self
    }
}

// ---------------------------------------------------------------------------
// Waveform
// ---------------------------------------------------------------------------

/// One step of a waveform: set `intensity`, then wait `hold`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WaveStep {
    pub intensity: f64,
    pub hold: Duration,
}

/// A planned sequence of vibration steps.
#[derive(Debug, Clone, PartialEq)]
pub struct Waveform {
    steps: Vec<WaveStep>,
}

impl Waveform {
    /// Plans a single decaying pulse.
    ///
    /// Step `i` of `n` has intensity `(n - i) / 10 + offset` and holds
    /// for `pulse_duration / n`. A final zero-intensity step follows
    /// with no hold.
    pub fn pulse(level: PowerLevel, offset: f64, config: &WaveformConfig) -> Self {
        let mut steps = Vec::new();
        push_pulse(&mut steps, level, offset, config);
        Self { steps }
    }

    /// Plans a heartbeat: a raised pulse, a gap, then a plain pulse.
    pub fn heartbeat(level: PowerLevel, config: &WaveformConfig) -> Self {
        let mut steps = Vec::new();
        push_pulse(&mut steps, level, config.heartbeat_offset, config);
        if let Some(rest) = steps.last_mut() {
            rest.hold = config.heartbeat_gap;
        }
        push_pulse(&mut steps, level, 0.0, config);
        Self { steps }
    }

    pub fn steps(&self) -> &[WaveStep] {
        &self.steps
    }

    /// Total time from the first step to the last.
    pub fn duration(&self) -> Duration {
        self.steps.iter().map(|step| step.hold).sum()
    }

    /// Plays the waveform, calling `emit` with each step's intensity and
    /// sleeping for the step's hold afterwards.
    ///
    /// Stops at the first error from `emit` and returns it; the motor
    /// may then be left running, so callers treat that as fatal.
    pub async fn play<F, E>(&self, mut emit: F) -> Result<(), E>
    where
        F: FnMut(f64) -> Result<(), E>,
    {
        for (i, step) in self.steps.iter().enumerate() {
            trace!(step = i, intensity = step.intensity, "waveform step");
            emit(step.intensity)?;
            if !step.hold.is_zero() {
                tokio::time::sleep(step.hold).await;
            }
        }
        Ok(())
    }
}

fn push_pulse(
    steps: &mut Vec<WaveStep>,
    level: PowerLevel,
    offset: f64,
    config: &WaveformConfig,
) {
    let decay_steps = level.decay_steps();
    let hold = config.pulse_duration / decay_steps;

    for i in 0..decay_steps {
        steps.push(WaveStep {
            intensity: f64::from(decay_steps - i) / 10.0 + offset,
            hold,
        });
    }
    steps.push(WaveStep {
        intensity: 0.0,
        hold: Duration::ZERO,
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn intensities(wave: &Waveform) -> Vec<f64> {
        wave.steps().iter().map(|s| s.intensity).collect()
    }

    fn assert_close(actual: &[f64], expected: &[f64]) {
        assert_eq!(actual.len(), expected.len(), "{actual:?} vs {expected:?}");
        for (a, e) in actual.iter().zip(expected) {
            assert!((a - e).abs() < 1e-9, "{actual:?} vs {expected:?}");
        }
    }

    // =====================================================================
    // PowerLevel
    // =====================================================================

    #[test]
    fn test_power_level_parses_uppercase_only() {
        assert_eq!("LOW".parse(), Ok(PowerLevel::Low));
        assert_eq!("MEDIUM".parse(), Ok(PowerLevel::Medium));
        assert_eq!("HIGH".parse(), Ok(PowerLevel::High));
        assert_eq!(
            "high".parse::<PowerLevel>(),
            Err(ParsePowerLevelError("high".into()))
        );
    }

    #[test]
    fn test_power_level_decay_steps() {
        assert_eq!(PowerLevel::Low.decay_steps(), 2);
        assert_eq!(PowerLevel::Medium.decay_steps(), 4);
        assert_eq!(PowerLevel::High.decay_steps(), 6);
    }

    // =====================================================================
    // Pulse planning
    // =====================================================================

    #[test]
    fn test_pulse_low_decays_then_rests() {
        let wave = Waveform::pulse(PowerLevel::Low, 0.0, &WaveformConfig::default());
        assert_close(&intensities(&wave), &[0.2, 0.1, 0.0]);
    }

    #[test]
    fn test_pulse_high_decays_in_tenths() {
        let wave = Waveform::pulse(PowerLevel::High, 0.0, &WaveformConfig::default());
        assert_close(
            &intensities(&wave),
            &[0.6, 0.5, 0.4, 0.3, 0.2, 0.1, 0.0],
        );
    }

    #[test]
    fn test_pulse_splits_duration_evenly() {
        let config = WaveformConfig::default();
        for (level, step_ms) in [
            (PowerLevel::Low, 240),
            (PowerLevel::Medium, 120),
            (PowerLevel::High, 80),
        ] {
            let wave = Waveform::pulse(level, 0.0, &config);
            let (decay, rest) = wave.steps().split_at(wave.steps().len() - 1);
            assert!(decay.iter().all(|s| s.hold == Duration::from_millis(step_ms)));
            assert_eq!(rest[0].hold, Duration::ZERO);
            assert_eq!(wave.duration(), Duration::from_millis(480));
        }
    }

    #[test]
    fn test_pulse_offset_raises_only_decay_steps() {
        let wave = Waveform::pulse(PowerLevel::Low, 0.05, &WaveformConfig::default());
        assert_close(&intensities(&wave), &[0.25, 0.15, 0.0]);
    }

    // =====================================================================
    // Heartbeat planning
    // =====================================================================

    #[test]
    fn test_heartbeat_is_raised_pulse_gap_plain_pulse() {
        let config = WaveformConfig::default();
        let wave = Waveform::heartbeat(PowerLevel::Low, &config);

        assert_close(&intensities(&wave), &[0.25, 0.15, 0.0, 0.2, 0.1, 0.0]);
        assert_eq!(wave.steps()[2].hold, Duration::from_millis(50));
        assert_eq!(wave.duration(), Duration::from_millis(480 + 50 + 480));
    }

    // =====================================================================
    // Config validation
    // =====================================================================

    #[test]
    fn test_validated_fixes_zero_duration_and_clamps_offset() {
        let config = WaveformConfig {
            pulse_duration: Duration::ZERO,
            heartbeat_gap: Duration::from_millis(10),
            heartbeat_offset: 2.0,
        }
        .validated();

        assert_eq!(config.pulse_duration, Duration::from_millis(480));
        assert_eq!(config.heartbeat_offset, WaveformConfig::MAX_OFFSET);
        assert_eq!(config.heartbeat_gap, Duration::from_millis(10));
    }

    #[test]
    fn test_validated_nan_offset_becomes_zero() {
        let config = WaveformConfig {
            heartbeat_offset: f64::NAN,
            ..WaveformConfig::default()
        }
        .validated();
        assert_eq!(config.heartbeat_offset, 0.0);
    }
}
