//! Level and phase math shared by the extractor, applicator, and front ends.
//!
//! # Level Conversions
//!
//! - [`db_to_linear`] / [`linear_to_db`] - Convert between dB and linear gain
//!
//! # Phase
//!
//! - [`wrap_phase`] - Fold any angle into the half-open interval (−π, π]

use std::f32::consts::{PI, TAU};

/// Convert decibels to linear gain.
///
/// # Example
/// ```rust
/// use sonoprint_core::db_to_linear;
///
/// assert!((db_to_linear(0.0) - 1.0).abs() < 0.001);
/// assert!((db_to_linear(-6.02) - 0.5).abs() < 0.01);
/// ```
#[inline]
pub fn db_to_linear(db: f32) -> f32 {
    10.0_f32.powf(db / 20.0)
}

/// Convert linear gain to decibels.
///
/// Values at or below 1e-10 are floored, so silence maps to -200 dB rather
/// than negative infinity.
///
/// # Example
/// ```rust
/// use sonoprint_core::linear_to_db;
///
/// assert!((linear_to_db(1.0) - 0.0).abs() < 0.001);
/// assert!((linear_to_db(0.5) - (-6.02)).abs() < 0.01);
/// ```
#[inline]
pub fn linear_to_db(linear: f32) -> f32 {
    20.0 * linear.max(1e-10).log10()
}

/// Wrap a phase angle into (−π, π].
///
/// Non-finite input yields 0.0 so a NaN from a degenerate spectrum never
/// leaks into a descriptor or a resynthesized frame.
///
/// # Example
/// ```rust
/// use sonoprint_core::wrap_phase;
/// use std::f32::consts::PI;
///
/// assert!((wrap_phase(3.0 * PI) - PI).abs() < 1e-5);
/// assert_eq!(wrap_phase(-PI), PI);
/// assert_eq!(wrap_phase(f32::NAN), 0.0);
/// ```
#[inline]
pub fn wrap_phase(phase: f32) -> f32 {
    if !phase.is_finite() {
        return 0.0;
    }
    let wrapped = phase - TAU * (phase / TAU).round();
    if wrapped <= -PI {
        (wrapped + TAU).min(PI)
    } else {
        wrapped.min(PI)
    }
}

/// Returns `true` if `n` is a positive power of two.
#[inline]
pub fn is_power_of_two(n: usize) -> bool {
    n != 0 && n.is_power_of_two()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_db_conversions() {
        assert!((db_to_linear(0.0) - 1.0).abs() < 1e-6);
        assert!((db_to_linear(20.0) - 10.0).abs() < 1e-4);
        assert!((linear_to_db(10.0) - 20.0).abs() < 1e-4);
        assert!((linear_to_db(0.0) - (-200.0)).abs() < 1e-3);
    }

    #[test]
    fn test_db_roundtrip() {
        for db in [-60.0, -12.0, -6.0, 0.0, 3.0, 12.0] {
            let back = linear_to_db(db_to_linear(db));
            assert!((back - db).abs() < 1e-3, "{db} -> {back}");
        }
    }

    #[test]
    fn test_wrap_phase_range() {
        for i in -100..=100 {
            let phase = i as f32 * 0.37;
            let w = wrap_phase(phase);
            assert!(w > -PI && w <= PI, "wrap({phase}) = {w}");
            // Same angle on the unit circle
            assert!((w.cos() - phase.cos()).abs() < 1e-3);
            assert!((w.sin() - phase.sin()).abs() < 1e-3);
        }
    }

    #[test]
    fn test_wrap_phase_boundaries() {
        assert_eq!(wrap_phase(0.0), 0.0);
        assert_eq!(wrap_phase(PI), PI);
        assert_eq!(wrap_phase(-PI), PI);
        assert!((wrap_phase(TAU)).abs() < 1e-6);
    }

    #[test]
    fn test_wrap_phase_non_finite() {
        assert_eq!(wrap_phase(f32::NAN), 0.0);
        assert_eq!(wrap_phase(f32::INFINITY), 0.0);
        assert_eq!(wrap_phase(f32::NEG_INFINITY), 0.0);
    }

    #[test]
    fn test_is_power_of_two() {
        assert!(is_power_of_two(1));
        assert!(is_power_of_two(64));
        assert!(is_power_of_two(2048));
        assert!(!is_power_of_two(0));
        assert!(!is_power_of_two(1000));
    }
}
