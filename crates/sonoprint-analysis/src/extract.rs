//! Transform extraction: derive a descriptor from a reference/altered pair.
//!
//! Both buffers are framed identically, and for every bin the extractor
//! averages the per-frame magnitude ratio `|alt| / max(|ref|, ε)` and the
//! circular mean of the phase difference `arg(alt) - arg(ref)`.
//!
//! Frames where the reference bin is below [`SILENCE_FLOOR`] carry no usable
//! ratio or phase and are left out of that bin's averages. A bin that never
//! rises above the floor comes out neutral (ratio 1.0, delta 0.0) rather than
//! an unbounded boost.
//!
//! # Example
//!
//! ```rust
//! use sonoprint_analysis::extract;
//! use sonoprint_core::AudioBuffer;
//!
//! let reference: Vec<f32> = (0..8192).map(|i| (i as f32 * 0.05).sin()).collect();
//! let altered: Vec<f32> = reference.iter().map(|x| x * 0.5).collect();
//!
//! let descriptor = extract(
//!     &AudioBuffer::new(reference, 48000),
//!     &AudioBuffer::new(altered, 48000),
//!     1024,
//!     256,
//! )
//! .unwrap();
//! assert!(descriptor.is_valid());
//! ```

use rustfft::num_complex::Complex;
use sonoprint_core::{
    ApplicationParameters, AudioBuffer, Result, TransformDescriptor, TransformError,
    TransformMetadata, is_power_of_two, wrap_phase,
};

use crate::stft::{StftFramer, map_frames_ordered};

/// Smallest frame size accepted for capture.
pub const MIN_FRAME_SIZE: usize = 64;

/// Denominator floor for magnitude ratios.
pub const MAGNITUDE_FLOOR: f32 = 1e-9;

/// Reference magnitude below which a bin is considered silent in a frame.
pub const SILENCE_FLOOR: f32 = 1e-6;

/// How per-frame magnitude ratios are combined into one ratio per bin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MagnitudeAveraging {
    /// Arithmetic mean of the ratios.
    #[default]
    Arithmetic,
    /// Geometric mean (mean in the log domain); less sensitive to outlier frames.
    Geometric,
}

/// How per-frame phase differences are weighted in the circular mean.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PhaseWeighting {
    /// Every contributing frame counts equally.
    #[default]
    Unweighted,
    /// Frames weighted by reference energy (`|ref|²`); quiet frames have
    /// little say.
    Energy,
}

/// Configured extractor for one frame/hop pair.
#[derive(Debug, Clone)]
pub struct TransformExtractor {
    framer: StftFramer,
    magnitude_averaging: MagnitudeAveraging,
    phase_weighting: PhaseWeighting,
}

impl TransformExtractor {
    /// Create an extractor.
    ///
    /// `frame_size` must be a power of two no smaller than [`MIN_FRAME_SIZE`]
    /// and `hop_size` must lie in `(0, frame_size]`.
    pub fn new(frame_size: usize, hop_size: usize) -> Result<Self> {
        if !is_power_of_two(frame_size) || frame_size < MIN_FRAME_SIZE {
            return Err(TransformError::invalid_input(format!(
                "frame size {frame_size} must be a power of two >= {MIN_FRAME_SIZE}"
            )));
        }
        if hop_size == 0 || hop_size > frame_size {
            return Err(TransformError::invalid_input(format!(
                "hop size {hop_size} must be in (0, {frame_size}]"
            )));
        }

        Ok(Self {
            framer: StftFramer::new(frame_size, hop_size),
            magnitude_averaging: MagnitudeAveraging::default(),
            phase_weighting: PhaseWeighting::default(),
        })
    }

    /// Select how magnitude ratios are averaged across frames.
    pub fn with_magnitude_averaging(mut self, averaging: MagnitudeAveraging) -> Self {
        self.magnitude_averaging = averaging;
        self
    }

    /// Select how phase differences are weighted across frames.
    pub fn with_phase_weighting(mut self, weighting: PhaseWeighting) -> Self {
        self.phase_weighting = weighting;
        self
    }

    /// Frame size in samples.
    pub fn frame_size(&self) -> usize {
        self.framer.frame_size()
    }

    /// Hop size in samples.
    pub fn hop_size(&self) -> usize {
        self.framer.hop_size()
    }

    /// Derive the descriptor that best explains `altered` as a per-bin
    /// modification of `reference`.
    ///
    /// Metadata is left blank; application parameters are the defaults.
    pub fn extract(
        &self,
        reference: &AudioBuffer,
        altered: &AudioBuffer,
    ) -> Result<TransformDescriptor> {
        check_buffer("reference", reference)?;
        check_buffer("altered", altered)?;
        if reference.sample_rate() != altered.sample_rate() {
            return Err(TransformError::invalid_input(format!(
                "sample rate mismatch: reference {} Hz, altered {} Hz",
                reference.sample_rate(),
                altered.sample_rate()
            )));
        }

        let ref_frames = self.framer.frame_count(reference.len());
        let alt_frames = self.framer.frame_count(altered.len());
        let frames = ref_frames.min(alt_frames);
        if ref_frames.max(alt_frames) > 2 * frames {
            tracing::warn!(
                ref_frames,
                alt_frames,
                "buffer lengths differ greatly; averaging the first {frames} frames only"
            );
        } else if ref_frames != alt_frames {
            tracing::debug!(
                ref_frames,
                alt_frames,
                "buffer lengths differ; averaging the first {frames} frames only"
            );
        }

        let mut stats = BinStatistics::new(self.framer.band_count());
        map_frames_ordered(
            frames,
            |index| {
                (
                    self.framer.analyze_frame(reference.samples(), index),
                    self.framer.analyze_frame(altered.samples(), index),
                )
            },
            |_, (ref_bins, alt_bins)| {
                stats.accumulate(
                    &ref_bins,
                    &alt_bins,
                    self.magnitude_averaging,
                    self.phase_weighting,
                );
            },
        );

        let (magnitude_ratios, phase_deltas) = stats.finish(self.magnitude_averaging);

        tracing::debug!(
            frame_size = self.frame_size(),
            hop_size = self.hop_size(),
            frames,
            silent_bins = stats.silent_bins(),
            "transform extracted"
        );

        Ok(TransformDescriptor::new(
            TransformMetadata::default(),
            self.frame_size(),
            self.hop_size(),
            magnitude_ratios,
            phase_deltas,
            ApplicationParameters::default(),
        )
        .with_sample_rate(Some(reference.sample_rate())))
    }
}

/// Extract a transform with default averaging.
///
/// Equivalent to `TransformExtractor::new(frame_size, hop_size)?.extract(reference, altered)`.
pub fn extract(
    reference: &AudioBuffer,
    altered: &AudioBuffer,
    frame_size: usize,
    hop_size: usize,
) -> Result<TransformDescriptor> {
    TransformExtractor::new(frame_size, hop_size)?.extract(reference, altered)
}

fn check_buffer(label: &str, buffer: &AudioBuffer) -> Result<()> {
    if buffer.is_empty() {
        return Err(TransformError::invalid_input(format!(
            "{label} buffer is empty"
        )));
    }
    if buffer.sample_rate() == 0 {
        return Err(TransformError::invalid_input(format!(
            "{label} buffer has a zero sample rate"
        )));
    }
    Ok(())
}

/// Running per-bin sums, accumulated in frame order.
struct BinStatistics {
    contributing: Vec<u32>,
    magnitude_sum: Vec<f64>,
    phase_sin: Vec<f64>,
    phase_cos: Vec<f64>,
}

impl BinStatistics {
    fn new(bands: usize) -> Self {
        Self {
            contributing: vec![0; bands],
            magnitude_sum: vec![0.0; bands],
            phase_sin: vec![0.0; bands],
            phase_cos: vec![0.0; bands],
        }
    }

    fn accumulate(
        &mut self,
        reference: &[Complex<f32>],
        altered: &[Complex<f32>],
        averaging: MagnitudeAveraging,
        weighting: PhaseWeighting,
    ) {
        for (bin, (r, a)) in reference.iter().zip(altered.iter()).enumerate() {
            let ref_mag = r.norm();
            if ref_mag.is_nan() || ref_mag < SILENCE_FLOOR {
                continue;
            }
            let alt_mag = a.norm();
            let ratio = f64::from(alt_mag / ref_mag.max(MAGNITUDE_FLOOR));
            if !ratio.is_finite() {
                continue;
            }

            self.contributing[bin] += 1;
            self.magnitude_sum[bin] += match averaging {
                MagnitudeAveraging::Arithmetic => ratio,
                MagnitudeAveraging::Geometric => ratio.max(f64::from(MAGNITUDE_FLOOR)).ln(),
            };

            // arg(a * conj(r)) == arg(a) - arg(r) modulo 2π
            let delta = f64::from((*a * r.conj()).arg());
            let weight = match weighting {
                PhaseWeighting::Unweighted => 1.0,
                PhaseWeighting::Energy => f64::from(r.norm_sqr()),
            };
            let (sin, cos) = delta.sin_cos();
            self.phase_sin[bin] += weight * sin;
            self.phase_cos[bin] += weight * cos;
        }
    }

    fn silent_bins(&self) -> usize {
        self.contributing.iter().filter(|&&n| n == 0).count()
    }

    fn finish(&self, averaging: MagnitudeAveraging) -> (Vec<f32>, Vec<f32>) {
        let bands = self.contributing.len();
        let mut ratios = Vec::with_capacity(bands);
        let mut deltas = Vec::with_capacity(bands);

        for bin in 0..bands {
            let n = self.contributing[bin];
            if n == 0 {
                ratios.push(1.0);
                deltas.push(0.0);
                continue;
            }

            let mean = self.magnitude_sum[bin] / f64::from(n);
            let ratio = match averaging {
                MagnitudeAveraging::Arithmetic => mean,
                MagnitudeAveraging::Geometric => mean.exp(),
            };
            ratios.push((ratio as f32).max(0.0));

            // atan2(0, 0) is 0: a fully cancelling set of deltas reads as no shift
            let delta = self.phase_sin[bin].atan2(self.phase_cos[bin]) as f32;
            deltas.push(wrap_phase(delta));
        }

        (ratios, deltas)
    }
}
