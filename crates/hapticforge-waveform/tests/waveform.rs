//! Timing tests for waveform playback.
//!
//! All tests run with a paused clock, so sleeps advance instantly and
//! emission times are exact.

use std::time::Duration;

use hapticforge_waveform::{PowerLevel, Waveform, WaveformConfig};
use tokio::time::Instant;

/// Plays `wave` and records `(elapsed_ms, intensity)` for each emission.
async fn record(wave: &Waveform) -> Vec<(u128, f64)> {
    let start = Instant::now();
    let mut log = Vec::new();
    wave.play(|intensity| {
        log.push((start.elapsed().as_millis(), intensity));
        Ok::<(), ()>(())
    })
    .await
    .expect("emit never fails");
    log
}

fn assert_timeline(actual: &[(u128, f64)], expected: &[(u128, f64)]) {
    assert_eq!(actual.len(), expected.len(), "{actual:?}");
    for ((at, a), (et, e)) in actual.iter().zip(expected) {
        assert_eq!(at, et, "{actual:?}");
        assert!((a - e).abs() < 1e-9, "{actual:?}");
    }
}

// =========================================================================
// Pulse
// =========================================================================

#[tokio::test(start_paused = true)]
async fn test_pulse_low_emits_on_schedule() {
    let wave = Waveform::pulse(PowerLevel::Low, 0.0, &WaveformConfig::default());
    let log = record(&wave).await;

    assert_timeline(&log, &[(0, 0.2), (240, 0.1), (480, 0.0)]);
}

#[tokio::test(start_paused = true)]
async fn test_pulse_high_emits_on_schedule() {
    let wave = Waveform::pulse(PowerLevel::High, 0.0, &WaveformConfig::default());
    let log = record(&wave).await;

    assert_timeline(
        &log,
        &[
            (0, 0.6),
            (80, 0.5),
            (160, 0.4),
            (240, 0.3),
            (320, 0.2),
            (400, 0.1),
            (480, 0.0),
        ],
    );
}

#[tokio::test(start_paused = true)]
async fn test_pulse_returns_right_after_final_zero() {
    let wave = Waveform::pulse(PowerLevel::Medium, 0.0, &WaveformConfig::default());
    let start = Instant::now();
    record(&wave).await;

    assert_eq!(start.elapsed(), Duration::from_millis(480));
}

// =========================================================================
// Heartbeat
// =========================================================================

#[tokio::test(start_paused = true)]
async fn test_heartbeat_low_emits_two_beats_with_gap() {
    let wave = Waveform::heartbeat(PowerLevel::Low, &WaveformConfig::default());
    let log = record(&wave).await;

    assert_timeline(
        &log,
        &[
            (0, 0.25),
            (240, 0.15),
            (480, 0.0),
            (530, 0.2),
            (770, 0.1),
            (1010, 0.0),
        ],
    );
}

#[tokio::test(start_paused = true)]
async fn test_heartbeat_uses_configured_gap() {
    let config = WaveformConfig {
        heartbeat_gap: Duration::from_millis(200),
        ..WaveformConfig::default()
    };
    let wave = Waveform::heartbeat(PowerLevel::Low, &config);
    let log = record(&wave).await;

    assert_eq!(log[3].0, 480 + 200);
}

// =========================================================================
// Errors
// =========================================================================

#[tokio::test(start_paused = true)]
async fn test_play_stops_at_first_emit_error() {
    let wave = Waveform::pulse(PowerLevel::High, 0.0, &WaveformConfig::default());
    let mut calls = 0;

    let result = wave
        .play(|_| {
            calls += 1;
            if calls == 3 { Err("closed") } else { Ok(()) }
        })
        .await;

    assert_eq!(result, Err("closed"));
    assert_eq!(calls, 3);
}
