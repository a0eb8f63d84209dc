use serde::{Deserialize, Serialize};
use sigmablur_image::Image;

use super::{convolve2d, kernels, BorderMode, FilterError, Orientation};
use crate::parallel::ExecutionStrategy;

/// Default number of rows and columns of the blur kernel.
pub const DEFAULT_KERNEL_SIZE: usize = 10;

/// Parameters of the gaussian blur other than sigma.
///
/// # Example
///
/// ```
/// use sigmablur_imgproc::filter::{BorderMode, GaussianBlurConfig};
/// use sigmablur_imgproc::parallel::ExecutionStrategy;
///
/// let config = GaussianBlurConfig::default()
///     .with_border(BorderMode::Renormalize)
///     .with_strategy(ExecutionStrategy::Fixed(2));
///
/// assert_eq!(config.kernel_size, 10);
/// assert_eq!(config.border, BorderMode::Renormalize);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GaussianBlurConfig {
    /// Number of rows and columns of the kernel.
    pub kernel_size: usize,
    /// How samples outside the image are handled.
    pub border: BorderMode,
    /// How the per-line work is scheduled.
    pub strategy: ExecutionStrategy,
    /// Force the unit of work; `None` picks it from the image shape.
    pub orientation: Option<Orientation>,
}

impl Default for GaussianBlurConfig {
    fn default() -> Self {
        Self {
            kernel_size: DEFAULT_KERNEL_SIZE,
            border: BorderMode::Skip,
            strategy: ExecutionStrategy::Parallel,
            orientation: None,
        }
    }
}

impl GaussianBlurConfig {
    /// Set the kernel size.
    pub fn with_kernel_size(mut self, kernel_size: usize) -> Self {
        self.kernel_size = kernel_size;
        self
    }

    /// Set the border mode.
    pub fn with_border(mut self, border: BorderMode) -> Self {
        self.border = border;
        self
    }

    /// Set the execution strategy.
    pub fn with_strategy(mut self, strategy: ExecutionStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Force the orientation of the work split.
    pub fn with_orientation(mut self, orientation: Orientation) -> Self {
        self.orientation = Some(orientation);
        self
    }
}

/// Blur an image using a gaussian blur filter
///
/// Uses a 10x10 kernel, skips the samples that fall outside the image and
/// splits the work across the global thread pool. See [`gaussian_blur_with`].
///
/// # Arguments
///
/// * `src` - The source image with shape (H, W, C), `C >= 3`.
/// * `sigma` - The standard deviation of the gaussian kernel.
///
/// # Returns
///
/// A new opaque RGBA image with shape (H, W, 4).
///
/// # Example
///
/// ```
/// use sigmablur_image::Image;
/// use sigmablur_imgproc::filter::gaussian_blur;
///
/// let image = Image::<u8, 3>::from_size_val([32, 24].into(), 128).unwrap();
/// let blurred = gaussian_blur(&image, 2.0).unwrap();
///
/// assert_eq!(blurred.size(), image.size());
/// assert_eq!(blurred.pixel(16, 12), Some(&[128u8, 128, 128, 255][..]));
/// ```
pub fn gaussian_blur<const C: usize>(
    src: &Image<u8, C>,
    sigma: f64,
) -> Result<Image<u8, 4>, FilterError> {
    gaussian_blur_with(src, sigma, &GaussianBlurConfig::default())
}

/// Blur an image using a gaussian blur filter and explicit parameters.
///
/// A fresh kernel is built from `sigma` on every call. The call blocks until
/// every line of the output has been computed.
///
/// # Arguments
///
/// * `src` - The source image with shape (H, W, C), `C >= 3`.
/// * `sigma` - The standard deviation of the gaussian kernel.
/// * `config` - Kernel size, border handling and scheduling.
///
/// # Errors
///
/// Fails on an invalid sigma or kernel size, an unsupported or empty image, or
/// when the work cannot be dispatched. No partial result is returned.
pub fn gaussian_blur_with<const C: usize>(
    src: &Image<u8, C>,
    sigma: f64,
    config: &GaussianBlurConfig,
) -> Result<Image<u8, 4>, FilterError> {
    let kernel = kernels::gaussian_kernel_2d(config.kernel_size, sigma)?;
    let orientation = config
        .orientation
        .unwrap_or_else(|| Orientation::for_size(src.size()));

    log::debug!(
        "gaussian blur: {}, sigma: {}, kernel: {}x{}, {:?}, {:?}, {:?}",
        src.size(),
        sigma,
        kernel.size(),
        kernel.size(),
        orientation,
        config.border,
        config.strategy,
    );

    let now = std::time::Instant::now();
    let dst = convolve2d(src, &kernel, orientation, config.border, config.strategy)?;
    log::debug!("gaussian blur took {:?}", now.elapsed());

    Ok(dst)
}

#[cfg(test)]
mod tests {
    use super::*;
    use sigmablur_image::ImageSize;

    #[test]
    fn test_config_default() {
        let config = GaussianBlurConfig::default();
        assert_eq!(config.kernel_size, DEFAULT_KERNEL_SIZE);
        assert_eq!(config.border, BorderMode::Skip);
        assert_eq!(config.strategy, ExecutionStrategy::Parallel);
        assert_eq!(config.orientation, None);
    }

    #[test]
    fn test_config_from_json() -> Result<(), serde_json::Error> {
        let config: GaussianBlurConfig =
            serde_json::from_str(r#"{"kernel_size": 7, "border": "reflect101"}"#)?;
        assert_eq!(
            config,
            GaussianBlurConfig::default()
                .with_kernel_size(7)
                .with_border(BorderMode::Reflect101)
        );

        let config: GaussianBlurConfig =
            serde_json::from_str(r#"{"strategy": {"fixed": 3}, "orientation": "columns"}"#)?;
        assert_eq!(config.strategy, ExecutionStrategy::Fixed(3));
        assert_eq!(config.orientation, Some(Orientation::Columns));
        Ok(())
    }

    #[test]
    fn test_gaussian_blur_shape() -> Result<(), FilterError> {
        for (width, height) in [(1, 1), (1, 9), (9, 1), (13, 5), (5, 13)] {
            let size = ImageSize { width, height };
            let src = Image::<u8, 3>::from_size_val(size, 90)?;
            let dst = gaussian_blur(&src, 1.2)?;
            assert_eq!(dst.size(), size);
            assert_eq!(dst.as_slice().len(), width * height * 4);
        }
        Ok(())
    }

    #[test]
    fn test_gaussian_blur_invalid_params() -> Result<(), FilterError> {
        let src = Image::<u8, 4>::from_size_val([4, 4].into(), 0)?;
        assert_eq!(gaussian_blur(&src, 0.0), Err(FilterError::InvalidSigma(0.0)));

        let config = GaussianBlurConfig::default().with_kernel_size(0);
        assert_eq!(
            gaussian_blur_with(&src, 1.0, &config),
            Err(FilterError::InvalidKernelSize(0))
        );

        let config = GaussianBlurConfig::default().with_strategy(ExecutionStrategy::Fixed(0));
        assert!(matches!(
            gaussian_blur_with(&src, 1.0, &config),
            Err(FilterError::Parallel(_))
        ));
        Ok(())
    }
}
