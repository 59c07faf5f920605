//! Sonoprint Analysis - capture and replay of spectral transforms
//!
//! Given a reference recording and an altered version of it, the extractor
//! measures a per-bin magnitude ratio and phase delta; the applicator replays
//! that alteration on any other audio.
//!
//! - [`extract`] - [`TransformExtractor`] and the [`extract()`] shortcut
//! - [`apply`] - [`TransformApplicator`] and the [`apply()`] shortcut
//! - [`stft`] - shared framing, windowed analysis, overlap-add resynthesis
//! - [`fft`] - planned FFT pair and window functions
//! - [`dynamics`] - RMS/peak measurement and RMS matching
//!
//! ## Example Workflow
//!
//! ```rust
//! use sonoprint_analysis::{apply, extract};
//! use sonoprint_core::AudioBuffer;
//!
//! let dry: Vec<f32> = (0..16_384).map(|i| (i as f32 * 0.03).sin() * 0.5).collect();
//! let wet: Vec<f32> = dry.iter().map(|x| x * 0.5).collect();
//!
//! // 1. Capture what changed
//! let descriptor = extract(
//!     &AudioBuffer::new(dry, 48000),
//!     &AudioBuffer::new(wet, 48000),
//!     1024,
//!     256,
//! )
//! .unwrap();
//!
//! // 2. Replay it on other material at half strength
//! let other = AudioBuffer::new(vec![0.1; 4800], 48000);
//! let processed = apply(&descriptor.with_intensity(0.5), &other).unwrap();
//! assert_eq!(processed.len(), other.len());
//! ```

pub mod apply;
pub mod dynamics;
pub mod extract;
pub mod fft;
pub mod stft;

pub use apply::{TransformApplicator, apply};
pub use extract::{
    MAGNITUDE_FLOOR, MIN_FRAME_SIZE, MagnitudeAveraging, PhaseWeighting, SILENCE_FLOOR,
    TransformExtractor, extract,
};
pub use fft::{Fft, Window};
pub use stft::StftFramer;
