//! Transform file format and operations.

use serde::{Deserialize, Serialize};
use sonoprint_core::{
    ApplicationParameters, TransformCategory, TransformDescriptor, TransformMetadata,
};
use std::path::Path;

use crate::error::ConfigError;

/// On-disk form of a [`TransformDescriptor`].
///
/// Transform files are flat TOML documents: metadata, framing, application
/// parameters, and the two per-bin arrays. Loading always validates, so a
/// `TransformFile` obtained from [`load`](Self::load) or
/// [`from_toml`](Self::from_toml) converts to a descriptor without error.
///
/// # TOML Format
///
/// ```toml
/// name = "Telephone"
/// description = "Band-limited midrange"
/// author = "someone"
/// category = "filter"
/// frame_size = 1024
/// hop_size = 256
/// sample_rate = 48000
/// intensity = 1.0
/// adaptive_rms_matching = false
/// magnitude_ratios = [1.0, 0.98, 0.95]
/// phase_deltas = [0.0, 0.01, -0.02]
/// ```
///
/// (Real files carry `frame_size / 2 + 1` entries in each array.)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TransformFile {
    /// Display name of the transform.
    #[serde(default)]
    pub name: String,

    /// Free-text description.
    #[serde(default)]
    pub description: String,

    /// Author.
    #[serde(default)]
    pub author: String,

    /// Category tag.
    #[serde(default)]
    pub category: TransformCategory,

    /// Analysis frame size in samples (power of two).
    pub frame_size: usize,

    /// Hop between frames in samples.
    pub hop_size: usize,

    /// Sample rate of the capture, if known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sample_rate: Option<u32>,

    /// Intensity the transform is applied at.
    #[serde(default = "default_intensity")]
    pub intensity: f32,

    /// Match output loudness to input loudness after resynthesis.
    #[serde(default)]
    pub adaptive_rms_matching: bool,

    /// Per-bin magnitude ratios.
    pub magnitude_ratios: Vec<f32>,

    /// Per-bin phase deltas in radians.
    pub phase_deltas: Vec<f32>,
}

fn default_intensity() -> f32 {
    ApplicationParameters::default().intensity
}

impl TransformFile {
    /// Load and validate a transform from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content =
            std::fs::read_to_string(path).map_err(|e| ConfigError::read_file(path, e))?;
        Self::from_toml(&content)
    }

    /// Parse and validate a transform from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        let file: TransformFile = toml::from_str(toml_str)?;
        file.to_descriptor().validate()?;
        Ok(file)
    }

    /// Save the transform to a TOML file, creating parent directories.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::create_dir(parent, e))?;
        }

        let content = self.to_toml()?;
        std::fs::write(path, content).map_err(|e| ConfigError::write_file(path, e))?;
        Ok(())
    }

    /// Convert the transform to a TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Number of bins recorded.
    pub fn band_count(&self) -> usize {
        self.magnitude_ratios.len()
    }

    /// Build the in-memory descriptor without validating it.
    pub fn to_descriptor(&self) -> TransformDescriptor {
        TransformDescriptor::new(
            TransformMetadata {
                name: self.name.clone(),
                description: self.description.clone(),
                author: self.author.clone(),
                category: self.category,
            },
            self.frame_size,
            self.hop_size,
            self.magnitude_ratios.clone(),
            self.phase_deltas.clone(),
            ApplicationParameters {
                intensity: self.intensity,
                adaptive_rms_matching: self.adaptive_rms_matching,
            },
        )
        .with_sample_rate(self.sample_rate)
    }

    /// Validate and convert into a descriptor.
    pub fn into_descriptor(self) -> Result<TransformDescriptor, ConfigError> {
        TransformDescriptor::try_from(self)
    }
}

impl From<&TransformDescriptor> for TransformFile {
    fn from(descriptor: &TransformDescriptor) -> Self {
        let metadata = descriptor.metadata();
        let parameters = descriptor.parameters();
        Self {
            name: metadata.name.clone(),
            description: metadata.description.clone(),
            author: metadata.author.clone(),
            category: metadata.category,
            frame_size: descriptor.frame_size(),
            hop_size: descriptor.hop_size(),
            sample_rate: descriptor.sample_rate(),
            intensity: parameters.intensity,
            adaptive_rms_matching: parameters.adaptive_rms_matching,
            magnitude_ratios: descriptor.magnitude_ratios().to_vec(),
            phase_deltas: descriptor.phase_deltas().to_vec(),
        }
    }
}

impl TryFrom<TransformFile> for TransformDescriptor {
    type Error = ConfigError;

    fn try_from(file: TransformFile) -> Result<Self, Self::Error> {
        let descriptor = file.to_descriptor();
        descriptor.validate()?;
        Ok(descriptor)
    }
}
