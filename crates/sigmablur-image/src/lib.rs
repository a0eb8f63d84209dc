#![deny(missing_docs)]
//! Image types for holding decoded pixel data in memory

/// image representation for the blur filters.
pub mod image;

/// Error types for the image module.
pub mod error;

pub use crate::error::ImageError;
pub use crate::image::{Image, ImageSize};
