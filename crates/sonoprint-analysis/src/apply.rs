//! Transform application: replay a captured descriptor on new audio.
//!
//! Each frame of the input is multiplied bin-by-bin by a complex factor built
//! from the descriptor, scaled by the intensity parameter:
//!
//! ```text
//! gain  = max(0, 1 + (ratio - 1) * intensity)
//! shift = wrap(delta * intensity)
//! bin'  = bin * gain * e^(i * shift)
//! ```
//!
//! At intensity 0 every factor is exactly `1 + 0i`, so the output is the
//! analysis/resynthesis round trip of the input.

use rustfft::num_complex::Complex;
use sonoprint_core::{AudioBuffer, Result, TransformDescriptor, TransformError, wrap_phase};

use crate::dynamics::{match_rms, rms_f64};
use crate::stft::StftFramer;

/// Validated, ready-to-run form of a descriptor.
///
/// Building one validates the descriptor and precomputes the per-bin factors,
/// so one applicator can process many buffers (e.g. the channels of a file).
#[derive(Debug, Clone)]
pub struct TransformApplicator {
    framer: StftFramer,
    factors: Vec<Complex<f32>>,
    adaptive_rms_matching: bool,
}

impl TransformApplicator {
    /// Validate `descriptor` and prepare it for application.
    ///
    /// The descriptor's intensity is used as-is; callers clamp it to
    /// [`INTENSITY_RANGE`](sonoprint_core::INTENSITY_RANGE) when it comes from
    /// user input.
    pub fn new(descriptor: &TransformDescriptor) -> Result<Self> {
        descriptor.validate()?;

        let intensity = descriptor.parameters().intensity;
        let factors = descriptor
            .magnitude_ratios()
            .iter()
            .zip(descriptor.phase_deltas())
            .map(|(&ratio, &delta)| bin_factor(ratio, delta, intensity))
            .collect();

        Ok(Self {
            framer: StftFramer::new(descriptor.frame_size(), descriptor.hop_size()),
            factors,
            adaptive_rms_matching: descriptor.parameters().adaptive_rms_matching,
        })
    }

    /// Apply the transform to `input`, producing a new buffer of the same
    /// length and sample rate.
    pub fn process(&self, input: &AudioBuffer) -> Result<AudioBuffer> {
        if input.is_empty() {
            return Err(TransformError::InputTooShort {
                provided: 0,
                minimum: 1,
            });
        }

        let signal = input.samples();
        let mut output = self.framer.process(signal, |_, bins| {
            for (bin, factor) in bins.iter_mut().zip(&self.factors) {
                *bin *= *factor;
            }
        });

        let mut replaced = 0usize;
        for sample in &mut output {
            if !sample.is_finite() {
                *sample = 0.0;
                replaced += 1;
            }
        }
        if replaced > 0 {
            tracing::debug!(replaced, "non-finite output samples zeroed");
        }

        if self.adaptive_rms_matching {
            let target = rms_f64(signal);
            match match_rms(&mut output, target) {
                Some(gain) => tracing::debug!(gain, target, "adaptive RMS gain applied"),
                None => tracing::debug!("output silent; adaptive RMS matching skipped"),
            }
        }

        tracing::debug!(
            samples = signal.len(),
            frames = self.framer.frame_count(signal.len()),
            "transform applied"
        );

        Ok(AudioBuffer::new(output, input.sample_rate()))
    }
}

/// Apply `descriptor` to `input` using the descriptor's own parameters.
///
/// Fails with [`TransformError::InvalidDescriptor`] when the descriptor does
/// not validate and [`TransformError::InputTooShort`] for an empty input.
/// Inputs shorter than one frame are zero-padded by the framing.
pub fn apply(descriptor: &TransformDescriptor, input: &AudioBuffer) -> Result<AudioBuffer> {
    TransformApplicator::new(descriptor)?.process(input)
}

/// Complex multiplier for one bin at the given intensity.
fn bin_factor(ratio: f32, delta: f32, intensity: f32) -> Complex<f32> {
    let gain = (1.0 + (ratio - 1.0) * intensity).max(0.0);
    let shift = wrap_phase(delta * intensity);
    Complex::from_polar(gain, shift)
}
