//! FFT wrapper with windowing functions

use rustfft::{FftPlanner, num_complex::Complex};
use std::f32::consts::{FRAC_PI_2, PI};
use std::sync::Arc;

/// Window function types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Window {
    /// Rectangular (no windowing)
    Rectangular,
    /// Periodic Hann window (raised cosine)
    #[default]
    Hann,
    /// Flat top with sine/cosine edges of `taper` samples.
    ///
    /// Squared, a falling edge and the next frame's rising edge sum to exactly
    /// one, so overlap-add at a hop of `size - taper` is perfectly covered.
    /// `taper` is capped at half the window.
    Tapered {
        /// Edge length in samples
        taper: usize,
    },
}

impl Window {
    /// Window with well-conditioned squared overlap-add for a framing.
    ///
    /// Hann while frames overlap by at least half; beyond that every sample
    /// sits under at most two Hann tails, so the edges are tapered to match
    /// the overlap instead. Covers every `hop_size` in `(0, frame_size]`.
    pub fn for_framing(frame_size: usize, hop_size: usize) -> Self {
        if 2 * hop_size <= frame_size {
            Window::Hann
        } else {
            Window::Tapered {
                taper: frame_size - hop_size,
            }
        }
    }

    /// Apply window to a buffer
    pub fn apply(&self, buffer: &mut [f32]) {
        let n = buffer.len();
        match self {
            Window::Rectangular => {}
            Window::Hann => {
                for (i, sample) in buffer.iter_mut().enumerate() {
                    let w = 0.5 * (1.0 - (2.0 * PI * i as f32 / n as f32).cos());
                    *sample *= w;
                }
            }
            Window::Tapered { taper } => {
                let taper = (*taper).min(n / 2);
                for (i, sample) in buffer.iter_mut().enumerate() {
                    let w = if i < taper {
                        (FRAC_PI_2 * (i as f32 + 0.5) / taper as f32).sin()
                    } else if i >= n - taper {
                        let m = i - (n - taper);
                        (FRAC_PI_2 * (m as f32 + 0.5) / taper as f32).cos()
                    } else {
                        1.0
                    };
                    *sample *= w;
                }
            }
        }
    }

    /// Get window coefficients
    pub fn coefficients(&self, size: usize) -> Vec<f32> {
        let mut coeffs = vec![1.0; size];
        self.apply(&mut coeffs);
        coeffs
    }
}

/// Planned forward/inverse FFT pair for one real frame size.
///
/// Plans are shared behind `Arc`, so a single `Fft` may be used from many
/// threads at once.
#[derive(Clone)]
pub struct Fft {
    forward: Arc<dyn rustfft::Fft<f32>>,
    inverse: Arc<dyn rustfft::Fft<f32>>,
    size: usize,
}

impl Fft {
    /// Create a new FFT processor for the given size
    pub fn new(size: usize) -> Self {
        let mut planner = FftPlanner::new();
        let forward = planner.plan_fft_forward(size);
        let inverse = planner.plan_fft_inverse(size);

        Self {
            forward,
            inverse,
            size,
        }
    }

    /// Get FFT size
    pub fn size(&self) -> usize {
        self.size
    }

    /// Number of non-redundant bins for a real signal (size/2 + 1)
    pub fn band_count(&self) -> usize {
        self.size / 2 + 1
    }

    /// Perform forward FFT on real input
    ///
    /// Input is zero-padded or truncated to the FFT size.
    /// Returns complex spectrum (size/2 + 1 bins for positive frequencies)
    pub fn forward(&self, input: &[f32]) -> Vec<Complex<f32>> {
        let mut buffer: Vec<Complex<f32>> = input
            .iter()
            .take(self.size)
            .map(|&x| Complex::new(x, 0.0))
            .collect();
        buffer.resize(self.size, Complex::new(0.0, 0.0));

        self.forward.process(&mut buffer);

        // DC to Nyquist
        buffer.truncate(self.band_count());
        buffer
    }

    /// Perform inverse FFT from a positive-frequency spectrum
    ///
    /// Takes `size/2 + 1` bins, mirrors them by conjugate symmetry, and
    /// returns the normalized real signal.
    pub fn inverse(&self, spectrum: &[Complex<f32>]) -> Vec<f32> {
        debug_assert_eq!(spectrum.len(), self.band_count());

        let mut buffer = vec![Complex::new(0.0, 0.0); self.size];
        let bands = spectrum.len().min(self.band_count());
        buffer[..bands].copy_from_slice(&spectrum[..bands]);

        // Negative frequencies
        for k in 1..bands {
            let mirror = self.size - k;
            if mirror >= bands {
                buffer[mirror] = spectrum[k].conj();
            }
        }

        self.inverse.process(&mut buffer);

        let scale = 1.0 / self.size as f32;
        buffer.iter().map(|c| c.re * scale).collect()
    }
}

impl std::fmt::Debug for Fft {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Fft").field("size", &self.size).finish()
    }
}
