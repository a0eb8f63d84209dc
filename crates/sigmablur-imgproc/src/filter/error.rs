use sigmablur_image::{ImageError, ImageSize};

use crate::parallel::ParallelError;

/// Errors related to the filter operations.
#[derive(thiserror::Error, Debug, PartialEq)]
pub enum FilterError {
    /// The standard deviation of the gaussian is not usable.
    #[error("sigma must be a finite number > 0, got {0}")]
    InvalidSigma(f64),

    /// The kernel has no cells.
    #[error("kernel size must be > 0, got {0}")]
    InvalidKernelSize(usize),

    /// The source image does not carry the red, green and blue channels.
    #[error("expected an image with at least 3 channels, got {0}")]
    UnsupportedChannels(usize),

    /// The source image has zero width or height.
    #[error("cannot filter an empty image ({0})")]
    EmptyImage(ImageSize),

    /// Allocating or building an image failed.
    #[error(transparent)]
    Image(#[from] ImageError),

    /// Dispatching the per-line work failed.
    #[error(transparent)]
    Parallel(#[from] ParallelError),
}
