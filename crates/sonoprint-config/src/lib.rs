//! Transform persistence for sonoprint.
//!
//! Captured transforms are stored as human-readable TOML documents
//! ([`TransformFile`]) and collected in a per-user library directory
//! ([`paths`]).
//!
//! # Example
//!
//! ```rust,no_run
//! use sonoprint_config::{TransformFile, user_transforms_dir};
//! use sonoprint_core::{TransformDescriptor, TransformMetadata};
//!
//! // Save a transform into the user library
//! let descriptor = TransformDescriptor::identity(2048, 512)
//!     .with_metadata(TransformMetadata::new("Neutral"));
//! let path = user_transforms_dir().join("neutral.toml");
//! TransformFile::from(&descriptor).save(&path).unwrap();
//!
//! // Load it back; loading validates
//! let loaded = TransformFile::load(&path).unwrap().into_descriptor().unwrap();
//! assert_eq!(loaded, descriptor);
//! ```

mod error;
mod transform_file;

/// Platform-specific paths for the transform library.
pub mod paths;

pub use error::ConfigError;
pub use paths::{
    ensure_user_transforms_dir, find_transform, list_transforms_in_dir, list_user_transforms,
    transform_name_from_path, user_transforms_dir,
};
pub use transform_file::TransformFile;

/// Load a transform by path or library name and convert it to a descriptor.
///
/// # Errors
///
/// [`ConfigError::TransformNotFound`] when nothing matches `name`; otherwise
/// any error from [`TransformFile::load`].
pub fn load_transform(name: &str) -> Result<sonoprint_core::TransformDescriptor, ConfigError> {
    let path =
        find_transform(name).ok_or_else(|| ConfigError::TransformNotFound(name.to_string()))?;
    TransformFile::load(path)?.into_descriptor()
}
