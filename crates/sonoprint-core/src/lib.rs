//! Sonoprint Core - data model for spectral transform capture and replay
//!
//! This crate holds the types shared by every other sonoprint crate:
//!
//! - [`TransformDescriptor`] - per-bin magnitude ratios and phase deltas plus
//!   framing, metadata, and [`ApplicationParameters`]
//! - [`TransformMetadata`] / [`TransformCategory`] - informational tags
//! - [`AudioBuffer`] - mono samples with a sample rate
//! - [`TransformError`] / [`DescriptorError`] - the engine error taxonomy
//! - Math helpers: [`wrap_phase`], [`db_to_linear`], [`linear_to_db`]
//!
//! The extractor and applicator live in `sonoprint-analysis`; persistence in
//! `sonoprint-config`.
//!
//! # Example
//!
//! ```rust
//! use sonoprint_core::{TransformCategory, TransformDescriptor, TransformMetadata};
//!
//! let descriptor = TransformDescriptor::identity(2048, 512).with_metadata(
//!     TransformMetadata::new("Neutral").with_category(TransformCategory::Generic),
//! );
//!
//! assert!(descriptor.is_valid());
//! assert_eq!(descriptor.band_count(), 1025);
//! ```

pub mod buffer;
pub mod descriptor;
pub mod error;
pub mod math;

pub use buffer::AudioBuffer;
pub use descriptor::{
    ApplicationParameters, INTENSITY_RANGE, TransformCategory, TransformDescriptor,
    TransformMetadata,
};
pub use error::{DescriptorError, Result, TransformError};
pub use math::{db_to_linear, is_power_of_two, linear_to_db, wrap_phase};
