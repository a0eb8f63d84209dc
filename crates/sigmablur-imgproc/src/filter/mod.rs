//! Filter operations
//!
//! This module provides the gaussian blur of 8-bit RGB(A) images.

/// Filter kernels
pub mod kernels;

/// Dense 2d convolution over rows or columns
mod convolution;
pub use convolution::*;

mod error;
pub use error::FilterError;

/// Filter operations
mod ops;
pub use ops::*;
