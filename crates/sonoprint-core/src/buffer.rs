//! Mono audio buffer used as engine input and output.

/// A single-channel block of `f32` samples with its sample rate.
///
/// This is the interchange type between file I/O and the engine. The sample
/// rate is not used by the spectral math but must agree between the two
/// buffers handed to the extractor.
///
/// # Example
///
/// ```rust
/// use sonoprint_core::AudioBuffer;
///
/// let buffer = AudioBuffer::new(vec![0.0; 48000], 48000);
/// assert_eq!(buffer.len(), 48000);
/// assert!((buffer.duration_secs() - 1.0).abs() < 1e-9);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct AudioBuffer {
    samples: Vec<f32>,
    sample_rate: u32,
}

impl AudioBuffer {
    /// Create a buffer from samples and a sample rate in Hz.
    pub fn new(samples: Vec<f32>, sample_rate: u32) -> Self {
        Self {
            samples,
            sample_rate,
        }
    }

    /// Create a buffer of `len` zero samples.
    pub fn silence(len: usize, sample_rate: u32) -> Self {
        Self::new(vec![0.0; len], sample_rate)
    }

    /// Sample data.
    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    /// Consume the buffer and return its sample data.
    pub fn into_samples(self) -> Vec<f32> {
        self.samples
    }

    /// Sample rate in Hz.
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Number of samples.
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Check if the buffer holds no samples.
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Duration in seconds, or 0.0 when the sample rate is zero.
    pub fn duration_secs(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.samples.len() as f64 / f64::from(self.sample_rate)
    }
}

impl AsRef<[f32]> for AudioBuffer {
    fn as_ref(&self) -> &[f32] {
        &self.samples
    }
}
