//! Shared CLI helpers used across multiple commands.

use anyhow::Context;
use indicatif::{ProgressBar, ProgressStyle};
use sonoprint_core::{TransformDescriptor, linear_to_db};
use std::time::Duration;

/// Load a transform by library name or path.
pub fn load_transform(name: &str) -> anyhow::Result<TransformDescriptor> {
    sonoprint_config::load_transform(name).with_context(|| {
        format!(
            "could not load transform '{name}'. Use 'sonoprint library list' to see saved transforms."
        )
    })
}

/// Start a spinner on stderr for a long-running step.
pub fn spinner(message: impl Into<String>) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner} {msg} [{elapsed}]") {
        pb.set_style(style);
    }
    pb.set_message(message.into());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

/// Turn a display name into a library file stem.
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    for c in name.trim().chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
        } else if !slug.ends_with('_') {
            slug.push('_');
        }
    }
    slug.trim_matches('_').to_string()
}

/// One bin's change, for summaries.
#[derive(Debug, Clone, Copy)]
pub struct BinChange {
    /// Bin index.
    pub bin: usize,
    /// Center frequency, if the capture rate is known.
    pub frequency_hz: Option<f32>,
    /// Magnitude change in dB.
    pub gain_db: f32,
    /// Phase delta in radians.
    pub phase: f32,
}

impl BinChange {
    /// Human-readable location of the bin.
    pub fn location(&self) -> String {
        match self.frequency_hz {
            Some(hz) if hz >= 1000.0 => format!("{:>8.2} kHz", hz / 1000.0),
            Some(hz) => format!("{hz:>8.1} Hz "),
            None => format!("bin {:>7}", self.bin),
        }
    }
}

/// The `top` strongest boosts and cuts, strongest first.
pub fn strongest_changes(
    descriptor: &TransformDescriptor,
    top: usize,
) -> (Vec<BinChange>, Vec<BinChange>) {
    let mut changes: Vec<BinChange> = descriptor
        .magnitude_ratios()
        .iter()
        .zip(descriptor.phase_deltas())
        .enumerate()
        .map(|(bin, (&ratio, &phase))| BinChange {
            bin,
            frequency_hz: descriptor.bin_frequency(bin),
            gain_db: linear_to_db(ratio),
            phase,
        })
        .collect();

    changes.sort_by(|a, b| b.gain_db.total_cmp(&a.gain_db));
    let boosts = changes
        .iter()
        .take(top)
        .filter(|c| c.gain_db > 0.0)
        .copied()
        .collect();
    let cuts = changes
        .iter()
        .rev()
        .take(top)
        .filter(|c| c.gain_db < 0.0)
        .copied()
        .collect();
    (boosts, cuts)
}

/// Mean magnitude change across all bins, in dB.
pub fn mean_gain_db(descriptor: &TransformDescriptor) -> f32 {
    let ratios = descriptor.magnitude_ratios();
    if ratios.is_empty() {
        return 0.0;
    }
    ratios.iter().map(|&r| linear_to_db(r)).sum::<f32>() / ratios.len() as f32
}
