//! Error types for transform capture and application.

use thiserror::Error;

/// Reasons a [`TransformDescriptor`](crate::TransformDescriptor) fails validation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DescriptorError {
    /// Frame size is zero or not a power of two.
    #[error("frame size {0} is not a positive power of two")]
    FrameSizeNotPowerOfTwo(usize),

    /// Hop size is zero or larger than the frame size.
    #[error("hop size {hop_size} is outside (0, {frame_size}]")]
    HopSizeOutOfRange {
        /// Offending hop size.
        hop_size: usize,
        /// Frame size the hop was checked against.
        frame_size: usize,
    },

    /// `magnitude_ratios` does not hold one entry per bin.
    #[error("expected {expected} magnitude ratios, found {found}")]
    MagnitudeLengthMismatch {
        /// Band count implied by the frame size.
        expected: usize,
        /// Actual sequence length.
        found: usize,
    },

    /// `phase_deltas` does not hold one entry per bin.
    #[error("expected {expected} phase deltas, found {found}")]
    PhaseLengthMismatch {
        /// Band count implied by the frame size.
        expected: usize,
        /// Actual sequence length.
        found: usize,
    },

    /// A ratio or delta is NaN or infinite.
    #[error("non-finite value in {field} at bin {bin}")]
    NonFiniteValue {
        /// Field containing the value.
        field: &'static str,
        /// Bin index.
        bin: usize,
    },

    /// A magnitude ratio is negative.
    #[error("negative magnitude ratio {value} at bin {bin}")]
    NegativeMagnitude {
        /// Bin index.
        bin: usize,
        /// Offending value.
        value: f32,
    },

    /// The intensity parameter is NaN or infinite.
    #[error("intensity {0} is not finite")]
    NonFiniteIntensity(f32),
}

/// Errors reported by the extractor and the applicator.
///
/// All failures are local validation failures: nothing is retried and no
/// partial descriptor or buffer is ever returned alongside an error.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TransformError {
    /// Malformed capture input: empty buffers, sample rate mismatch, bad framing.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The descriptor handed to the applicator failed validation.
    #[error("invalid descriptor: {0}")]
    InvalidDescriptor(#[from] DescriptorError),

    /// The input buffer holds fewer samples than the applicator needs.
    #[error("input too short: {provided} samples provided, at least {minimum} required")]
    InputTooShort {
        /// Number of samples supplied.
        provided: usize,
        /// Minimum number of samples accepted.
        minimum: usize,
    },
}

impl TransformError {
    /// Create an invalid input error.
    pub fn invalid_input(reason: impl Into<String>) -> Self {
        TransformError::InvalidInput(reason.into())
    }
}

/// Convenience result type for engine operations.
pub type Result<T> = std::result::Result<T, TransformError>;
