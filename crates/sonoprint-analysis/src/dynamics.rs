//! Level measurement and loudness correction
//!
//! - RMS and peak level
//! - Global gain matching (adaptive RMS matching after resynthesis)
//! - Normalized RMS difference between two signals
//!
//! Sums are accumulated in `f64` so that matching one RMS to another holds to
//! well below single-precision sample resolution.

use sonoprint_core::linear_to_db;

/// RMS below which a signal is treated as silent when deriving gains.
pub const SILENCE_RMS: f64 = 1e-12;

/// Compute RMS (Root Mean Square) level of a signal
///
/// Returns RMS value in linear scale (not dB)
pub fn rms(signal: &[f32]) -> f32 {
    rms_f64(signal) as f32
}

/// RMS with double-precision accumulation and result.
pub fn rms_f64(signal: &[f32]) -> f64 {
    if signal.is_empty() {
        return 0.0;
    }

    let sum_sq: f64 = signal.iter().map(|&x| f64::from(x) * f64::from(x)).sum();
    (sum_sq / signal.len() as f64).sqrt()
}

/// Compute RMS level in dB
pub fn rms_db(signal: &[f32]) -> f32 {
    linear_to_db(rms(signal))
}

/// Compute peak level (maximum absolute value)
pub fn peak(signal: &[f32]) -> f32 {
    signal.iter().map(|x| x.abs()).fold(0.0, f32::max)
}

/// Compute peak level in dB
pub fn peak_db(signal: &[f32]) -> f32 {
    linear_to_db(peak(signal))
}

/// Scale `signal` in place so its RMS equals `target_rms`.
///
/// Returns the applied gain, or `None` (signal untouched) when the signal is
/// silent or the target is not a finite non-negative level.
pub fn match_rms(signal: &mut [f32], target_rms: f64) -> Option<f64> {
    let current = rms_f64(signal);
    if current <= SILENCE_RMS || !target_rms.is_finite() || target_rms < 0.0 {
        return None;
    }

    let gain = target_rms / current;
    for sample in signal.iter_mut() {
        *sample = (f64::from(*sample) * gain) as f32;
    }
    Some(gain)
}

/// RMS of the difference between two signals, normalized by the RMS of
/// `reference`.
///
/// Compares the overlapping length only. Returns 0.0 when both are silent and
/// the absolute difference RMS when only the reference is.
pub fn normalized_rms_difference(reference: &[f32], test: &[f32]) -> f32 {
    let len = reference.len().min(test.len());
    if len == 0 {
        return 0.0;
    }

    let diff_sq: f64 = reference[..len]
        .iter()
        .zip(test[..len].iter())
        .map(|(&r, &t)| {
            let d = f64::from(r) - f64::from(t);
            d * d
        })
        .sum();
    let diff_rms = (diff_sq / len as f64).sqrt();
    let reference_rms = rms_f64(&reference[..len]);

    if reference_rms > SILENCE_RMS {
        (diff_rms / reference_rms) as f32
    } else {
        diff_rms as f32
    }
}
