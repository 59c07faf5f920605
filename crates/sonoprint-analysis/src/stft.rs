//! Short-time Fourier framing shared by the extractor and the applicator.
//!
//! Both sides of a capture/replay cycle must slice audio identically so that
//! bin `b` of frame `f` means the same thing everywhere. [`StftFramer`] owns
//! that convention:
//!
//! - the signal is treated as if padded with `frame_size - hop_size` zeros in
//!   front and enough zeros behind that every real sample sits under the same
//!   number of overlapping windows;
//! - frame `f` starts at padded offset `f * hop_size` and is shaped by
//!   [`Window::for_framing`]: periodic Hann when frames overlap by half or
//!   more, a tapered flat-top window otherwise;
//! - resynthesis applies the same window again, overlap-adds, and divides by
//!   the per-sample sum of squared window values.
//!
//! Every real sample is covered with a squared window sum of at least 1/4, so
//! an unmodified spectrum reconstructs the input for any hop in
//! `(0, frame_size]`.
//!
//! Per-frame work is spread over the rayon pool in fixed-size batches, and
//! results are handed back strictly in frame order so accumulation is
//! deterministic.

use rayon::prelude::*;
use rustfft::num_complex::Complex;

use crate::fft::{Fft, Window};

/// Frames transformed in parallel before their results are consumed in order.
const FRAME_BATCH: usize = 64;

/// Floor for window-sum normalization. Only reached in the padding.
const WINDOW_SUM_EPSILON: f32 = 1e-6;

/// Framing, analysis, and overlap-add synthesis for one frame/hop pair.
#[derive(Debug, Clone)]
pub struct StftFramer {
    frame_size: usize,
    hop_size: usize,
    window: Vec<f32>,
    fft: Fft,
}

impl StftFramer {
    /// Create a framer with the window [`Window::for_framing`] picks.
    ///
    /// `frame_size` must be non-zero and `hop_size` in `(0, frame_size]`;
    /// callers validate this before constructing.
    pub fn new(frame_size: usize, hop_size: usize) -> Self {
        Self::with_window(frame_size, hop_size, Window::for_framing(frame_size, hop_size))
    }

    /// Create a framer with an explicit window shape.
    pub fn with_window(frame_size: usize, hop_size: usize, window: Window) -> Self {
        debug_assert!(frame_size > 0, "frame size must be non-zero");
        debug_assert!(
            hop_size > 0 && hop_size <= frame_size,
            "hop size must be in (0, frame_size]"
        );

        Self {
            frame_size,
            hop_size,
            window: window.coefficients(frame_size),
            fft: Fft::new(frame_size),
        }
    }

    /// Frame length in samples.
    pub fn frame_size(&self) -> usize {
        self.frame_size
    }

    /// Hop between frames in samples.
    pub fn hop_size(&self) -> usize {
        self.hop_size
    }

    /// Number of bins per frame (`frame_size / 2 + 1`).
    pub fn band_count(&self) -> usize {
        self.fft.band_count()
    }

    /// Zeros conceptually placed before the first real sample.
    pub fn lead_padding(&self) -> usize {
        self.frame_size - self.hop_size
    }

    /// Number of frames needed to cover a signal of `len` samples.
    pub fn frame_count(&self, len: usize) -> usize {
        if len == 0 {
            return 0;
        }
        let padded = len + 2 * self.lead_padding();
        if padded <= self.frame_size {
            1
        } else {
            (padded - self.frame_size).div_ceil(self.hop_size) + 1
        }
    }

    /// Window and transform frame `index` of `signal`.
    pub fn analyze_frame(&self, signal: &[f32], index: usize) -> Vec<Complex<f32>> {
        let start = (index * self.hop_size) as isize - self.lead_padding() as isize;

        let frame: Vec<f32> = self
            .window
            .iter()
            .enumerate()
            .map(|(j, &w)| {
                let pos = start + j as isize;
                if pos >= 0 && (pos as usize) < signal.len() {
                    signal[pos as usize] * w
                } else {
                    0.0
                }
            })
            .collect();

        self.fft.forward(&frame)
    }

    /// Spectra of every frame of `signal`, in frame order.
    pub fn analyze(&self, signal: &[f32]) -> Vec<Vec<Complex<f32>>> {
        let count = self.frame_count(signal.len());
        let mut frames = Vec::with_capacity(count);
        map_frames_ordered(
            count,
            |index| self.analyze_frame(signal, index),
            |_, spectrum| frames.push(spectrum),
        );
        frames
    }

    /// Overlap-add a sequence of frame spectra back into `len` samples.
    pub fn synthesize(&self, frames: &[Vec<Complex<f32>>], len: usize) -> Vec<f32> {
        let mut accumulator = OverlapAdd::new(self, frames.len());
        map_frames_ordered(
            frames.len(),
            |index| self.synthesize_frame(&frames[index]),
            |index, time| accumulator.add(index, &time),
        );
        accumulator.finish(self, len)
    }

    /// Analyze, modify each frame's spectrum in place, and resynthesize.
    ///
    /// `modify` receives the frame index and its `band_count` bins. Output has
    /// exactly `signal.len()` samples.
    pub fn process<F>(&self, signal: &[f32], modify: F) -> Vec<f32>
    where
        F: Fn(usize, &mut [Complex<f32>]) + Sync,
    {
        let count = self.frame_count(signal.len());
        let mut accumulator = OverlapAdd::new(self, count);
        map_frames_ordered(
            count,
            |index| {
                let mut spectrum = self.analyze_frame(signal, index);
                modify(index, &mut spectrum);
                self.synthesize_frame(&spectrum)
            },
            |index, time| accumulator.add(index, &time),
        );
        accumulator.finish(self, signal.len())
    }

    /// Inverse transform one spectrum and apply the synthesis window.
    fn synthesize_frame(&self, spectrum: &[Complex<f32>]) -> Vec<f32> {
        let mut time = self.fft.inverse(spectrum);
        for (sample, &w) in time.iter_mut().zip(self.window.iter()) {
            *sample *= w;
        }
        time
    }
}

/// Run `produce` for frames `0..count` in parallel batches and feed the
/// results to `sink` one by one in ascending frame order.
pub fn map_frames_ordered<T, P, S>(count: usize, produce: P, mut sink: S)
where
    T: Send,
    P: Fn(usize) -> T + Sync + Send,
    S: FnMut(usize, T),
{
    let mut start = 0;
    while start < count {
        let end = (start + FRAME_BATCH).min(count);
        let batch: Vec<T> = (start..end).into_par_iter().map(&produce).collect();
        for (offset, item) in batch.into_iter().enumerate() {
            sink(start + offset, item);
        }
        start = end;
    }
}

/// Overlap-add accumulator over the padded timeline.
struct OverlapAdd {
    output: Vec<f32>,
    window_sum: Vec<f32>,
    hop_size: usize,
}

impl OverlapAdd {
    fn new(framer: &StftFramer, frame_count: usize) -> Self {
        let padded_len = if frame_count == 0 {
            0
        } else {
            (frame_count - 1) * framer.hop_size + framer.frame_size
        };
        let mut window_sum = vec![0.0f32; padded_len];
        for index in 0..frame_count {
            let start = index * framer.hop_size;
            for (sum, &w) in window_sum[start..start + framer.frame_size]
                .iter_mut()
                .zip(framer.window.iter())
            {
                *sum += w * w;
            }
        }
        Self {
            output: vec![0.0; padded_len],
            window_sum,
            hop_size: framer.hop_size,
        }
    }

    fn add(&mut self, index: usize, time: &[f32]) {
        let start = index * self.hop_size;
        for (out, &sample) in self.output[start..start + time.len()].iter_mut().zip(time) {
            *out += sample;
        }
    }

    fn finish(self, framer: &StftFramer, len: usize) -> Vec<f32> {
        let Self {
            mut output,
            window_sum,
            ..
        } = self;

        for (sample, &sum) in output.iter_mut().zip(window_sum.iter()) {
            *sample /= sum.max(WINDOW_SUM_EPSILON);
        }

        let lead = framer.lead_padding();
        let mut trimmed: Vec<f32> = output.into_iter().skip(lead).take(len).collect();
        trimmed.resize(len, 0.0);
        trimmed
    }
}
