//! Property-based tests for sonoprint-core.
//!
//! Checks phase wrapping and descriptor validation over randomized input
//! using proptest.

use proptest::prelude::*;
use sonoprint_core::{
    ApplicationParameters, TransformDescriptor, TransformError, TransformMetadata, wrap_phase,
};
use std::f32::consts::PI;

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    /// Wrapped phase always lies in (−π, π] and names the same angle.
    #[test]
    fn wrap_phase_in_range(phase in -1000.0f32..1000.0f32) {
        let w = wrap_phase(phase);
        prop_assert!(w > -PI && w <= PI, "wrap({}) = {}", phase, w);
        // Angle equality on the unit circle; tolerance grows with |phase|
        // since f32 spacing near 1000 is ~6e-5.
        prop_assert!((w.cos() - phase.cos()).abs() < 1e-2);
        prop_assert!((w.sin() - phase.sin()).abs() < 1e-2);
    }

    /// Any descriptor whose sequences disagree in length is rejected,
    /// and `is_valid` never panics.
    #[test]
    fn mismatched_lengths_are_invalid(
        exp in 6u32..12,
        mag_delta in 1usize..8,
        phase_len_offset in 0usize..2,
    ) {
        let frame = 1usize << exp;
        let bands = frame / 2 + 1;
        let descriptor = TransformDescriptor::new(
            TransformMetadata::default(),
            frame,
            frame / 4,
            vec![1.0; bands + mag_delta],
            vec![0.0; bands + phase_len_offset],
            ApplicationParameters::default(),
        );
        prop_assert!(!descriptor.is_valid());
        prop_assert!(descriptor.validate().is_err());
    }

    /// Well-formed framing with matching lengths is always valid.
    #[test]
    fn matching_lengths_are_valid(exp in 6u32..13, hop_div in 1usize..8) {
        let frame = 1usize << exp;
        let hop = (frame / hop_div).max(1);
        let descriptor = TransformDescriptor::identity(frame, hop);
        prop_assert!(descriptor.is_valid());
    }

    /// Non power-of-two frame sizes are always rejected.
    #[test]
    fn non_power_of_two_frame_is_invalid(frame in 3usize..5000) {
        prop_assume!(!frame.is_power_of_two());
        let descriptor = TransformDescriptor::identity(frame, 1);
        prop_assert!(!descriptor.is_valid());
        let err = TransformError::from(descriptor.validate().unwrap_err());
        let is_invalid_descriptor = matches!(err, TransformError::InvalidDescriptor(_));
        prop_assert!(is_invalid_descriptor);
    }
}
