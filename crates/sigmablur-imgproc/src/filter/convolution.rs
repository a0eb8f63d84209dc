use serde::{Deserialize, Serialize};
use sigmablur_image::{Image, ImageSize};

use super::{kernels::Kernel2d, FilterError};
use crate::parallel::{par_for_each_line, ExecutionStrategy};

/// The unit of parallel work used by the convolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Orientation {
    /// One unit of work per row `y`.
    Rows,
    /// One unit of work per column `x`.
    Columns,
}

impl Orientation {
    /// Pick the orientation for an image of the given size.
    ///
    /// Wide (or square) images are split by rows, tall images by columns.
    ///
    /// # Example
    ///
    /// ```
    /// use sigmablur_imgproc::filter::Orientation;
    ///
    /// assert_eq!(Orientation::for_size([4, 4].into()), Orientation::Rows);
    /// assert_eq!(Orientation::for_size([3, 8].into()), Orientation::Columns);
    /// ```
    pub fn for_size(size: ImageSize) -> Self {
        if size.width >= size.height {
            Orientation::Rows
        } else {
            Orientation::Columns
        }
    }
}

/// How kernel cells that fall outside the image are handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BorderMode {
    /// Drop the cell and keep the remaining weights as they are.
    ///
    /// Pixels near the border receive less than the full unit weight, which
    /// darkens them.
    #[default]
    Skip,

    /// Drop the cell and divide the sums by the weight actually used.
    Renormalize,

    /// Sample the outermost row or column instead.
    ///
    /// Example: ...d c b a | a a a a...
    Replicate,

    /// Mirror the sample coordinate, starting with the pixel 'next' to the edge.
    ///
    /// Example: ...d c b a | b c d e...
    Reflect101,
}

impl BorderMode {
    /// Maps index `i` to a valid index within `[0, len)`, or `None` when the
    /// sample must be dropped.
    ///
    /// PRECONDITION: `len > 0`.
    #[inline]
    pub fn map_index(self, i: isize, len: usize) -> Option<usize> {
        if i >= 0 && (i as usize) < len {
            return Some(i as usize);
        }
        match self {
            BorderMode::Skip | BorderMode::Renormalize => None,
            BorderMode::Replicate => Some(if i < 0 { 0 } else { len - 1 }),
            BorderMode::Reflect101 => Some(reflect101(i, len)),
        }
    }
}

#[inline]
fn reflect101(i: isize, len: usize) -> usize {
    if len == 1 {
        return 0;
    }
    let len = len as isize;
    let mut i = i;
    while i < 0 || i >= len {
        if i < 0 {
            i = -i;
        } else {
            i = 2 * len - i - 2;
        }
    }
    i as usize
}

/// Slack added before truncation so a sum of normalized weights that lands a
/// few ulps under an integer still narrows to that integer.
const NARROWING_TOLERANCE: f64 = 1e-9;

/// Clamp an accumulated channel sum to the 8-bit range and truncate it.
///
/// The fractional part is dropped (`200.7` becomes `200`), except within
/// [`NARROWING_TOLERANCE`] of the next integer.
#[inline]
fn saturate_u8(x: f64) -> u8 {
    (x + NARROWING_TOLERANCE).clamp(0.0, 255.0) as u8
}

/// Compute the output pixel at `(x, y)`.
///
/// Only the first three channels of the source are sampled and alpha is
/// opaque in the output. The source channels are used as stored: RGBA input
/// is taken either as opaque or as already premultiplied by its alpha, no
/// premultiplication happens here.
#[inline]
fn convolve_pixel<const C: usize>(
    src_data: &[u8],
    size: ImageSize,
    kernel: &Kernel2d,
    border: BorderMode,
    x: usize,
    y: usize,
) -> [u8; 4] {
    let k_size = kernel.size();
    let k_mid = kernel.center() as isize;

    let mut sum = [0.0f64; 3];
    let mut used = 0.0f64;

    for ky in 0..k_size {
        let Some(sy) = border.map_index(y as isize + ky as isize - k_mid, size.height) else {
            continue;
        };
        for kx in 0..k_size {
            let Some(sx) = border.map_index(x as isize + kx as isize - k_mid, size.width) else {
                continue;
            };

            let weight = kernel.get(ky, kx);
            let offset = (sy * size.width + sx) * C;
            let px = &src_data[offset..offset + 3];

            sum[0] += weight * px[0] as f64;
            sum[1] += weight * px[1] as f64;
            sum[2] += weight * px[2] as f64;
            used += weight;
        }
    }

    if border == BorderMode::Renormalize && used > 0.0 {
        sum.iter_mut().for_each(|s| *s /= used);
    }

    [
        saturate_u8(sum[0]),
        saturate_u8(sum[1]),
        saturate_u8(sum[2]),
        u8::MAX,
    ]
}

/// Convolve an 8-bit image with a 2d kernel, one line per unit of work.
///
/// The kernel cell `(ky, kx)` applied to the output pixel `(x, y)` samples the
/// source at `(x + kx - c, y + ky - c)` with `c` the kernel centre. Samples that
/// fall outside the image are resolved by `border`.
///
/// Every line is written by exactly one task. With [`Orientation::Columns`] the
/// columns are computed into a transposed scratch image, where each column is
/// contiguous, and transposed back at the end.
///
/// # Arguments
///
/// * `src` - The source image with shape (H, W, C), `C >= 3`.
/// * `kernel` - The convolution kernel.
/// * `orientation` - Whether rows or columns are the unit of work.
/// * `border` - How out-of-bounds samples are handled.
/// * `strategy` - How the lines are scheduled.
///
/// # Returns
///
/// A new opaque RGBA image with shape (H, W, 4).
///
/// # Errors
///
/// Fails for images with fewer than three channels, empty images, or when the
/// lines cannot be dispatched.
pub fn convolve2d<const C: usize>(
    src: &Image<u8, C>,
    kernel: &Kernel2d,
    orientation: Orientation,
    border: BorderMode,
    strategy: ExecutionStrategy,
) -> Result<Image<u8, 4>, FilterError> {
    if C < 3 {
        return Err(FilterError::UnsupportedChannels(C));
    }

    let size = src.size();
    if size.is_empty() {
        return Err(FilterError::EmptyImage(size));
    }

    let src_data = src.as_slice();

    match orientation {
        Orientation::Rows => {
            let mut dst = Image::<u8, 4>::from_size_val(size, 0)?;
            par_for_each_line(dst.as_slice_mut(), size.width * 4, strategy, |y, row| {
                row.chunks_exact_mut(4).enumerate().for_each(|(x, px)| {
                    px.copy_from_slice(&convolve_pixel::<C>(src_data, size, kernel, border, x, y));
                });
            })?;
            Ok(dst)
        }
        Orientation::Columns => {
            let mut scratch = Image::<u8, 4>::from_size_val(size.transposed(), 0)?;
            par_for_each_line(scratch.as_slice_mut(), size.height * 4, strategy, |x, col| {
                col.chunks_exact_mut(4).enumerate().for_each(|(y, px)| {
                    px.copy_from_slice(&convolve_pixel::<C>(src_data, size, kernel, border, x, y));
                });
            })?;
            Ok(scratch.transpose())
        }
    }
}
