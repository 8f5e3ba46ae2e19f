//! Audio pipeline integration tests
//!
//! Tests buffer normalization, payload encoding, and WAV framing without
//! requiring audio hardware.

use std::io::Cursor;
use std::time::Duration;

use voiceletter::audio::{encode, payload_to_wav, AudioBuffer, SAMPLE_RATE};

/// Generate sine wave samples at the capture rate
fn generate_sine_samples(frequency: f32, duration_secs: f32, amplitude: f32) -> Vec<i16> {
    let num_samples = (SAMPLE_RATE as f32 * duration_secs) as usize;
    (0..num_samples)
        .map(|i| {
            let t = i as f32 / SAMPLE_RATE as f32;
            let v = amplitude * (2.0 * std::f32::consts::PI * frequency * t).sin();
            (v * 32767.0) as i16
        })
        .collect()
}

#[test]
fn buffer_length_matches_duration_for_all_windows() {
    for ms in [250_u64, 1000, 2500, 10_000] {
        let d = Duration::from_millis(ms);
        let buf = AudioBuffer::from_samples(generate_sine_samples(440.0, 20.0, 0.5), d);
        let expected = (u128::from(SAMPLE_RATE) * u128::from(ms) / 1000) as usize;
        assert_eq!(buf.len(), expected, "window {ms}ms");
    }
}

#[test]
fn long_utterances_truncate_at_the_window() {
    // 12 seconds of signal into a 10 second window
    let d = Duration::from_secs(10);
    let samples = generate_sine_samples(440.0, 12.0, 0.5);
    let buf = AudioBuffer::from_samples(samples.clone(), d);

    assert_eq!(buf.len(), 10 * SAMPLE_RATE as usize);
    assert_eq!(buf.samples(), &samples[..buf.len()]);
}

#[test]
fn encode_same_buffer_twice_is_byte_identical() {
    let buf = AudioBuffer::from_samples(
        generate_sine_samples(440.0, 1.0, 0.5),
        Duration::from_secs(1),
    );
    let a = encode(&buf);
    let b = encode(&buf);
    assert_eq!(a.bytes, b.bytes);
}

#[test]
fn payload_carries_fixed_metadata() {
    let buf = AudioBuffer::from_samples(Vec::new(), Duration::from_secs(2));
    let payload = encode(&buf);

    assert_eq!(payload.sample_rate, 16000);
    assert_eq!(payload.channels, 1);
    assert_eq!(payload.sample_width_bytes, 2);
    assert_eq!(payload.bytes.len(), buf.len() * 2);
}

#[test]
fn wav_framing_roundtrips_through_hound() {
    let samples = generate_sine_samples(440.0, 0.1, 0.5);
    let buf = AudioBuffer::from_samples(samples, Duration::from_millis(100));
    let wav = payload_to_wav(&encode(&buf)).unwrap();

    assert_eq!(&wav[0..4], b"RIFF");
    assert_eq!(&wav[8..12], b"WAVE");

    let mut reader = hound::WavReader::new(Cursor::new(wav)).unwrap();
    let spec = reader.spec();
    assert_eq!(spec.sample_rate, SAMPLE_RATE);
    assert_eq!(spec.channels, 1);
    assert_eq!(spec.bits_per_sample, 16);

    let read_samples: Vec<i16> = reader.samples::<i16>().map(|s| s.unwrap()).collect();
    assert_eq!(read_samples, buf.samples());
}
