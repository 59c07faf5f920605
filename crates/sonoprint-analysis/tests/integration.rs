//! Integration tests for sonoprint-analysis crate.
//!
//! Exercises the capture/replay cycle end to end with synthetic signals whose
//! spectra are known: a faint noise bed standing in for "silence", and a
//! faded 440 Hz burst laid on top of it.

use std::f32::consts::PI;

use sonoprint_analysis::dynamics::{normalized_rms_difference, rms_f64};
use sonoprint_analysis::{
    MagnitudeAveraging, PhaseWeighting, StftFramer, TransformApplicator, TransformExtractor,
    apply, extract,
};
use sonoprint_core::{
    ApplicationParameters, AudioBuffer, DescriptorError, TransformDescriptor, TransformError,
    TransformMetadata,
};

const SAMPLE_RATE: u32 = 48000;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Uniform noise in `[-amplitude, amplitude]` from a seeded xorshift.
fn noise(len: usize, amplitude: f32, seed: u32) -> Vec<f32> {
    let mut state = seed.max(1);
    (0..len)
        .map(|_| {
            state ^= state << 13;
            state ^= state >> 17;
            state ^= state << 5;
            amplitude * (state as i32 as f32) / (i32::MAX as f32)
        })
        .collect()
}

/// A sine burst over `start..end` with raised-cosine fades of `fade` samples.
fn burst(len: usize, freq_hz: f32, amplitude: f32, start: usize, end: usize, fade: usize) -> Vec<f32> {
    (0..len)
        .map(|i| {
            if i < start || i >= end {
                return 0.0;
            }
            let from_start = (i - start) as f32;
            let to_end = (end - 1 - i) as f32;
            let edge = from_start.min(to_end);
            let envelope = if edge < fade as f32 {
                0.5 * (1.0 - (PI * edge / fade as f32).cos())
            } else {
                1.0
            };
            envelope * amplitude * (2.0 * PI * freq_hz * i as f32 / SAMPLE_RATE as f32).sin()
        })
        .collect()
}

fn mix(a: &[f32], b: &[f32]) -> Vec<f32> {
    a.iter().zip(b).map(|(x, y)| x + y).collect()
}

fn music_like(len: usize) -> Vec<f32> {
    (0..len)
        .map(|i| {
            let t = i as f32 / SAMPLE_RATE as f32;
            0.3 * (2.0 * PI * 220.0 * t).sin()
                + 0.2 * (2.0 * PI * 1337.0 * t).sin()
                + 0.1 * (2.0 * PI * 5100.0 * t).cos()
        })
        .collect()
}

fn buffer(samples: Vec<f32>) -> AudioBuffer {
    AudioBuffer::new(samples, SAMPLE_RATE)
}

/// Total spectral energy in bins `lo..=hi` across every frame.
fn band_energy(framer: &StftFramer, signal: &[f32], lo: usize, hi: usize) -> f64 {
    framer
        .analyze(signal)
        .iter()
        .flat_map(|frame| frame[lo..=hi].iter())
        .map(|c| f64::from(c.norm_sqr()))
        .sum()
}

// ===========================================================================
// 1. Identity and neutrality
// ===========================================================================

#[test]
fn identity_capture_replays_as_passthrough() {
    let x = buffer(music_like(24_000));
    let y = buffer(mix(&music_like(20_000), &noise(20_000, 0.05, 7)));

    let descriptor = extract(&x, &x, 1024, 256).unwrap();
    let output = apply(&descriptor, &y).unwrap();

    assert_eq!(output.len(), y.len());
    let diff = normalized_rms_difference(y.samples(), output.samples());
    assert!(diff < 1e-3, "normalized RMS difference {diff}");
}

#[test]
fn identity_holds_across_framings() {
    let x = buffer(noise(12_000, 0.5, 99));
    for (frame, hop) in [(64, 16), (256, 128), (2048, 512), (4096, 1024)] {
        let descriptor = extract(&x, &x, frame, hop).unwrap();
        let output = apply(&descriptor, &x).unwrap();
        let diff = normalized_rms_difference(x.samples(), output.samples());
        assert!(diff < 1e-3, "frame {frame} hop {hop}: difference {diff}");
    }
}

#[test]
fn zero_intensity_holds_without_overlap() {
    let input = buffer(mix(&music_like(20_000), &noise(20_000, 0.05, 13)));
    for (frame, hop) in [(1024, 1024), (1024, 768), (2048, 1025), (1, 1), (2, 2)] {
        let descriptor = TransformDescriptor::new(
            TransformMetadata::default(),
            frame,
            hop,
            vec![3.0; frame / 2 + 1],
            vec![1.0; frame / 2 + 1],
            ApplicationParameters::default(),
        )
        .with_intensity(0.0);
        let output = apply(&descriptor, &input).unwrap();
        let diff = normalized_rms_difference(input.samples(), output.samples());
        assert!(diff < 1e-3, "frame {frame} hop {hop}: difference {diff}");
    }
}

#[test]
fn identity_holds_at_sparse_hops() {
    let x = buffer(noise(12_000, 0.5, 77));
    for (frame, hop) in [(1024, 1024), (1024, 768), (256, 192)] {
        let descriptor = extract(&x, &x, frame, hop).unwrap();
        let output = apply(&descriptor, &x).unwrap();
        let diff = normalized_rms_difference(x.samples(), output.samples());
        assert!(diff < 1e-3, "frame {frame} hop {hop}: difference {diff}");
    }
}

#[test]
fn zero_intensity_is_noop() {
    let reference = buffer(music_like(16_000));
    let altered = buffer(reference.samples().iter().map(|x| x * x * 2.0).collect());
    let descriptor = extract(&reference, &altered, 1024, 256)
        .unwrap()
        .with_intensity(0.0);

    let input = buffer(noise(10_000, 0.3, 5));
    let output = apply(&descriptor, &input).unwrap();
    let diff = normalized_rms_difference(input.samples(), output.samples());
    assert!(diff < 1e-3, "difference {diff}");
}

// ===========================================================================
// 2. Validity gate
// ===========================================================================

#[test]
fn mismatched_descriptor_is_rejected() {
    let descriptor = TransformDescriptor::new(
        TransformMetadata::new("Broken"),
        1024,
        256,
        vec![1.0; 512],
        vec![0.0; 513],
        ApplicationParameters::default(),
    );
    assert!(!descriptor.is_valid());

    let err = apply(&descriptor, &buffer(noise(4096, 0.1, 3))).unwrap_err();
    assert!(matches!(
        err,
        TransformError::InvalidDescriptor(DescriptorError::MagnitudeLengthMismatch {
            expected: 513,
            found: 512
        })
    ));
}

#[test]
fn extraction_input_errors() {
    let x = buffer(noise(4096, 0.1, 3));
    assert!(matches!(
        extract(&x, &x, 1000, 250),
        Err(TransformError::InvalidInput(_))
    ));
    assert!(matches!(
        extract(&x, &AudioBuffer::new(x.samples().to_vec(), 44100), 1024, 256),
        Err(TransformError::InvalidInput(_))
    ));
}

// ===========================================================================
// 3. Extraction properties
// ===========================================================================

#[test]
fn extraction_is_deterministic() {
    let reference = buffer(music_like(30_000));
    let altered = buffer(mix(reference.samples(), &noise(30_000, 0.1, 11)));

    let a = extract(&reference, &altered, 2048, 512).unwrap();
    let b = extract(&reference, &altered, 2048, 512).unwrap();
    assert_eq!(a, b);

    let extractor = TransformExtractor::new(2048, 512)
        .unwrap()
        .with_magnitude_averaging(MagnitudeAveraging::Geometric)
        .with_phase_weighting(PhaseWeighting::Energy);
    assert_eq!(
        extractor.extract(&reference, &altered).unwrap(),
        extractor.extract(&reference, &altered).unwrap()
    );
}

#[test]
fn extracted_values_in_range() {
    let reference = buffer(noise(20_000, 0.4, 21));
    let altered = buffer(noise(20_000, 0.4, 22));
    let descriptor = extract(&reference, &altered, 512, 128).unwrap();

    assert!(descriptor.validate().is_ok());
    assert!(descriptor.magnitude_ratios().iter().all(|&r| r >= 0.0));
    assert!(
        descriptor
            .phase_deltas()
            .iter()
            .all(|&p| p > -PI && p <= PI)
    );
}

// ===========================================================================
// 4. Tone-burst scenario
// ===========================================================================

#[test]
fn burst_capture_boosts_its_band() {
    let len = SAMPLE_RATE as usize;
    let bed = noise(len, 1e-3, 0x1234_5678);
    let tone = burst(len, 440.0, 0.5, 8000, 40_000, 4096);

    let reference = buffer(bed.clone());
    let altered = buffer(mix(&bed, &tone));

    let descriptor = extract(&reference, &altered, 1024, 256).unwrap();
    assert!(descriptor.is_valid());
    assert_eq!(descriptor.sample_rate(), Some(SAMPLE_RATE));

    let ratios = descriptor.magnitude_ratios();
    let expected_bin = (440.0 * 1024.0 / SAMPLE_RATE as f32).round() as usize;
    assert!(
        ratios[expected_bin] > 2.0,
        "ratio at bin {expected_bin} is {}",
        ratios[expected_bin]
    );

    let peak_bin = ratios
        .iter()
        .enumerate()
        .max_by(|(_, a), (_, b)| a.partial_cmp(b).unwrap())
        .map(|(i, _)| i)
        .unwrap();
    assert!(
        peak_bin.abs_diff(expected_bin) <= 1,
        "peak ratio at bin {peak_bin}"
    );

    for (bin, &ratio) in ratios.iter().enumerate().skip(expected_bin + 50) {
        assert!(
            (ratio - 1.0).abs() < 0.05,
            "distant bin {bin} has ratio {ratio}"
        );
    }

    // Replay on a different noise bed: energy appears around 440 Hz
    let other = buffer(noise(len, 1e-3, 0x0bad_cafe));
    let output = apply(&descriptor, &other).unwrap();

    let framer = StftFramer::new(1024, 256);
    let lo = expected_bin - 2;
    let hi = expected_bin + 2;
    let before = band_energy(&framer, other.samples(), lo, hi);
    let after = band_energy(&framer, output.samples(), lo, hi);
    assert!(
        after > before * 100.0,
        "band energy before {before}, after {after}"
    );
}

#[test]
fn burst_over_digital_silence_stays_neutral() {
    let len = SAMPLE_RATE as usize;
    let silence = buffer(vec![0.0; len]);
    let altered = buffer(burst(len, 440.0, 0.5, 8000, 40_000, 4096));

    let descriptor = extract(&silence, &altered, 1024, 256).unwrap();
    let expected_bin = (440.0 * 1024.0 / SAMPLE_RATE as f32).round() as usize;
    // No reference energy anywhere: every bin is neutral, 440 Hz included
    assert_eq!(descriptor.magnitude_ratios()[expected_bin], 1.0);
    assert!(descriptor.magnitude_ratios().iter().all(|&r| r == 1.0));
    assert!(descriptor.phase_deltas().iter().all(|&p| p == 0.0));

    let output = apply(&descriptor, &silence).unwrap();
    assert_eq!(output.len(), len);
    assert!(output.samples().iter().all(|&s| s == 0.0));
}

// ===========================================================================
// 5. Application behavior
// ===========================================================================

#[test]
fn adaptive_rms_restores_level() {
    let reference = buffer(music_like(20_000));
    let altered = buffer(reference.samples().iter().map(|x| x * 0.05).collect());
    let descriptor = extract(&reference, &altered, 1024, 256)
        .unwrap()
        .with_adaptive_rms_matching(true);

    let input = buffer(music_like(15_000));
    let output = apply(&descriptor, &input).unwrap();
    let diff = (rms_f64(output.samples()) - rms_f64(input.samples())).abs();
    assert!(diff < 1e-6, "rms difference {diff}");
}

#[test]
fn captured_gain_transfers_to_new_material() {
    let reference = buffer(noise(30_000, 0.3, 41));
    let altered = buffer(reference.samples().iter().map(|x| x * 0.5).collect());
    let descriptor = extract(&reference, &altered, 1024, 256).unwrap();

    let input = buffer(music_like(12_000));
    let output = apply(&descriptor, &input).unwrap();
    let ratio = rms_f64(output.samples()) / rms_f64(input.samples());
    assert!((ratio - 0.5).abs() < 0.01, "level ratio {ratio}");
}

#[test]
fn applicator_processes_channels_independently() {
    let descriptor = TransformDescriptor::identity(512, 128).with_intensity(1.0);
    let applicator = TransformApplicator::new(&descriptor).unwrap();

    let left = buffer(music_like(5000));
    let right = buffer(noise(5000, 0.2, 8));
    let out_left = applicator.process(&left).unwrap();
    let out_right = applicator.process(&right).unwrap();

    assert!(normalized_rms_difference(left.samples(), out_left.samples()) < 1e-3);
    assert!(normalized_rms_difference(right.samples(), out_right.samples()) < 1e-3);
}
