//! Transform descriptor: the captured per-bin alteration plus its metadata.
//!
//! A descriptor records, for each of the `frame_size / 2 + 1` bins of a real
//! spectrum, how much the magnitude changed (a ratio, 1.0 = untouched) and how
//! much the phase moved (radians in (−π, π]). It is produced by the extractor,
//! loaded from disk, or written by hand, and consumed by the applicator.
//!
//! The framing and the per-bin sequences are fixed once constructed. Only the
//! [`ApplicationParameters`] and [`TransformMetadata`] may be changed between
//! application passes.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::RangeInclusive;
use std::str::FromStr;

use crate::error::DescriptorError;
use crate::math::is_power_of_two;

/// Range callers clamp intensity to before applying.
pub const INTENSITY_RANGE: RangeInclusive<f32> = 0.0..=2.0;

/// Informational category of a transform.
///
/// Never affects application; used to organize a transform library.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransformCategory {
    /// Uncategorized
    #[default]
    Generic,
    /// Tonal balance changes
    Equalization,
    /// Band-limiting and resonant filtering
    Filter,
    /// Compression, expansion, gating
    Dynamics,
    /// Saturation and clipping
    Distortion,
    /// Reverb, room and width effects
    Spatial,
    /// Chorus, phaser, and similar time-varying effects
    Modulation,
    /// Denoising and repair
    Restoration,
    /// Anything else
    Experimental,
}

impl TransformCategory {
    /// All categories in display order.
    pub const ALL: [TransformCategory; 9] = [
        TransformCategory::Generic,
        TransformCategory::Equalization,
        TransformCategory::Filter,
        TransformCategory::Dynamics,
        TransformCategory::Distortion,
        TransformCategory::Spatial,
        TransformCategory::Modulation,
        TransformCategory::Restoration,
        TransformCategory::Experimental,
    ];

    /// Lowercase identifier used in files and on the command line.
    pub fn as_str(self) -> &'static str {
        match self {
            TransformCategory::Generic => "generic",
            TransformCategory::Equalization => "equalization",
            TransformCategory::Filter => "filter",
            TransformCategory::Dynamics => "dynamics",
            TransformCategory::Distortion => "distortion",
            TransformCategory::Spatial => "spatial",
            TransformCategory::Modulation => "modulation",
            TransformCategory::Restoration => "restoration",
            TransformCategory::Experimental => "experimental",
        }
    }
}

impl fmt::Display for TransformCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransformCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        TransformCategory::ALL
            .into_iter()
            .find(|c| c.as_str() == lower)
            .ok_or_else(|| {
                let names: Vec<&str> = TransformCategory::ALL.iter().map(|c| c.as_str()).collect();
                format!("unknown category '{s}' (expected one of: {})", names.join(", "))
            })
    }
}

/// Human-readable information about a transform.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TransformMetadata {
    /// Display name.
    pub name: String,
    /// Free-text description.
    pub description: String,
    /// Author.
    pub author: String,
    /// Category tag.
    pub category: TransformCategory,
}

impl TransformMetadata {
    /// Create metadata with a name and blank remaining fields.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Set the author.
    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.author = author.into();
        self
    }

    /// Set the category.
    pub fn with_category(mut self, category: TransformCategory) -> Self {
        self.category = category;
        self
    }
}

/// Parameters that shape how a descriptor is applied.
///
/// These are the only spectral-engine settings that may change after capture,
/// e.g. while a user drags an intensity control between renders.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ApplicationParameters {
    /// Scales each bin's deviation from neutral. 0 = bypass, 1 = as captured.
    pub intensity: f32,
    /// Match the output RMS to the input RMS after resynthesis.
    pub adaptive_rms_matching: bool,
}

impl ApplicationParameters {
    /// Intensity clamped to [`INTENSITY_RANGE`]; NaN maps to 0.
    pub fn clamped_intensity(&self) -> f32 {
        if self.intensity.is_nan() {
            return *INTENSITY_RANGE.start();
        }
        self.intensity
            .clamp(*INTENSITY_RANGE.start(), *INTENSITY_RANGE.end())
    }
}

impl Default for ApplicationParameters {
    fn default() -> Self {
        Self {
            intensity: 1.0,
            adaptive_rms_matching: false,
        }
    }
}

/// A captured spectral transform.
///
/// # Example
///
/// ```rust
/// use sonoprint_core::{TransformDescriptor, TransformMetadata};
///
/// let mut descriptor = TransformDescriptor::identity(1024, 256)
///     .with_metadata(TransformMetadata::new("Bypass"));
/// assert!(descriptor.is_valid());
/// assert_eq!(descriptor.band_count(), 513);
///
/// descriptor.parameters_mut().intensity = 0.5;
/// assert_eq!(descriptor.parameters().intensity, 0.5);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransformDescriptor {
    metadata: TransformMetadata,
    frame_size: usize,
    hop_size: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    sample_rate: Option<u32>,
    magnitude_ratios: Vec<f32>,
    phase_deltas: Vec<f32>,
    parameters: ApplicationParameters,
}

impl TransformDescriptor {
    /// Construct a descriptor from explicit field values.
    ///
    /// No validation happens here; call [`is_valid`](Self::is_valid) or
    /// [`validate`](Self::validate) before relying on the contents.
    pub fn new(
        metadata: TransformMetadata,
        frame_size: usize,
        hop_size: usize,
        magnitude_ratios: Vec<f32>,
        phase_deltas: Vec<f32>,
        parameters: ApplicationParameters,
    ) -> Self {
        Self {
            metadata,
            frame_size,
            hop_size,
            sample_rate: None,
            magnitude_ratios,
            phase_deltas,
            parameters,
        }
    }

    /// A neutral descriptor: every ratio 1.0, every delta 0.0.
    pub fn identity(frame_size: usize, hop_size: usize) -> Self {
        let bands = frame_size / 2 + 1;
        Self::new(
            TransformMetadata::default(),
            frame_size,
            hop_size,
            vec![1.0; bands],
            vec![0.0; bands],
            ApplicationParameters::default(),
        )
    }

    /// Replace the metadata.
    pub fn with_metadata(mut self, metadata: TransformMetadata) -> Self {
        self.metadata = metadata;
        self
    }

    /// Record the sample rate the transform was captured at.
    pub fn with_sample_rate(mut self, sample_rate: Option<u32>) -> Self {
        self.sample_rate = sample_rate;
        self
    }

    /// Set the intensity.
    pub fn with_intensity(mut self, intensity: f32) -> Self {
        self.parameters.intensity = intensity;
        self
    }

    /// Enable or disable adaptive RMS matching.
    pub fn with_adaptive_rms_matching(mut self, enabled: bool) -> Self {
        self.parameters.adaptive_rms_matching = enabled;
        self
    }

    /// Descriptive metadata.
    pub fn metadata(&self) -> &TransformMetadata {
        &self.metadata
    }

    /// Mutable access to the metadata.
    pub fn metadata_mut(&mut self) -> &mut TransformMetadata {
        &mut self.metadata
    }

    /// Application parameters.
    pub fn parameters(&self) -> &ApplicationParameters {
        &self.parameters
    }

    /// Mutable access to the application parameters.
    pub fn parameters_mut(&mut self) -> &mut ApplicationParameters {
        &mut self.parameters
    }

    /// Analysis window length in samples.
    pub fn frame_size(&self) -> usize {
        self.frame_size
    }

    /// Stride between analysis frames in samples.
    pub fn hop_size(&self) -> usize {
        self.hop_size
    }

    /// Sample rate of the capture buffers, if recorded.
    pub fn sample_rate(&self) -> Option<u32> {
        self.sample_rate
    }

    /// Number of spectral bins (`frame_size / 2 + 1`).
    pub fn band_count(&self) -> usize {
        self.frame_size / 2 + 1
    }

    /// Per-bin magnitude ratios.
    pub fn magnitude_ratios(&self) -> &[f32] {
        &self.magnitude_ratios
    }

    /// Per-bin phase deltas in radians.
    pub fn phase_deltas(&self) -> &[f32] {
        &self.phase_deltas
    }

    /// Center frequency of a bin in Hz, when the capture sample rate is known.
    pub fn bin_frequency(&self, bin: usize) -> Option<f32> {
        let sample_rate = self.sample_rate?;
        if bin >= self.band_count() || self.frame_size == 0 {
            return None;
        }
        Some(bin as f32 * sample_rate as f32 / self.frame_size as f32)
    }

    /// Structural validity check. Never panics.
    ///
    /// False when either sequence length differs from `band_count`, when
    /// `frame_size` is not a positive power of two, or when `hop_size` is
    /// outside `(0, frame_size]`.
    pub fn is_valid(&self) -> bool {
        self.check_framing().is_ok()
    }

    /// Full validation, reporting the first problem found.
    ///
    /// In addition to the structural checks of [`is_valid`](Self::is_valid),
    /// rejects non-finite values, negative magnitude ratios, and a non-finite
    /// intensity.
    pub fn validate(&self) -> Result<(), DescriptorError> {
        self.check_framing()?;

        if !self.parameters.intensity.is_finite() {
            return Err(DescriptorError::NonFiniteIntensity(self.parameters.intensity));
        }

        for (bin, &ratio) in self.magnitude_ratios.iter().enumerate() {
            if !ratio.is_finite() {
                return Err(DescriptorError::NonFiniteValue {
                    field: "magnitude_ratios",
                    bin,
                });
            }
            if ratio < 0.0 {
                return Err(DescriptorError::NegativeMagnitude { bin, value: ratio });
            }
        }

        if let Some(bin) = self.phase_deltas.iter().position(|d| !d.is_finite()) {
            return Err(DescriptorError::NonFiniteValue {
                field: "phase_deltas",
                bin,
            });
        }

        Ok(())
    }

    fn check_framing(&self) -> Result<(), DescriptorError> {
        if !is_power_of_two(self.frame_size) {
            return Err(DescriptorError::FrameSizeNotPowerOfTwo(self.frame_size));
        }
        if self.hop_size == 0 || self.hop_size > self.frame_size {
            return Err(DescriptorError::HopSizeOutOfRange {
                hop_size: self.hop_size,
                frame_size: self.frame_size,
            });
        }
        let expected = self.band_count();
        if self.magnitude_ratios.len() != expected {
            return Err(DescriptorError::MagnitudeLengthMismatch {
                expected,
                found: self.magnitude_ratios.len(),
            });
        }
        if self.phase_deltas.len() != expected {
            return Err(DescriptorError::PhaseLengthMismatch {
                expected,
                found: self.phase_deltas.len(),
            });
        }
        Ok(())
    }
}
