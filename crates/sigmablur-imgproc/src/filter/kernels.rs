use super::FilterError;

/// A square matrix of convolution weights stored row-major.
///
/// Index `(i, j)` is row `i`, column `j`. The centre cell sits at
/// `size / 2` on both axes, so an even size has one more cell before the
/// centre than after it.
#[derive(Debug, Clone, PartialEq)]
pub struct Kernel2d {
    size: usize,
    data: Vec<f64>,
}

impl Kernel2d {
    /// Number of rows (and columns) of the kernel.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Index of the centre row and column.
    pub fn center(&self) -> usize {
        self.size / 2
    }

    /// Weight at row `i`, column `j`.
    ///
    /// PRECONDITION: `i` and `j` are smaller than [`Kernel2d::size`].
    #[inline]
    pub fn get(&self, i: usize, j: usize) -> f64 {
        self.data[i * self.size + j]
    }

    /// The weights, row by row.
    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }

    /// Sum of all the weights.
    pub fn sum(&self) -> f64 {
        self.data.iter().sum()
    }
}

/// Create a normalized 2d gaussian blur kernel.
///
/// Each cell holds the isotropic gaussian density evaluated at the integer
/// offset of the cell from the centre `kernel_size / 2`. The weights are then
/// divided by their sum so the kernel adds up to one.
///
/// # Arguments
///
/// * `kernel_size` - The number of rows and columns of the kernel.
/// * `sigma` - The standard deviation of the gaussian.
///
/// # Returns
///
/// The normalized kernel.
///
/// # Errors
///
/// Fails when `kernel_size` is zero or when `sigma` is not a finite, strictly
/// positive number.
///
/// # Example
///
/// ```
/// use sigmablur_imgproc::filter::kernels::gaussian_kernel_2d;
///
/// let kernel = gaussian_kernel_2d(10, 1.5).unwrap();
///
/// assert_eq!(kernel.size(), 10);
/// assert_eq!(kernel.center(), 5);
/// assert!((kernel.sum() - 1.0).abs() < 1e-9);
/// ```
pub fn gaussian_kernel_2d(kernel_size: usize, sigma: f64) -> Result<Kernel2d, FilterError> {
    if kernel_size == 0 {
        return Err(FilterError::InvalidKernelSize(kernel_size));
    }

    if !sigma.is_finite() || sigma <= 0.0 {
        return Err(FilterError::InvalidSigma(sigma));
    }

    let center = (kernel_size / 2) as f64;
    let two_sigma_sq = 2.0 * sigma * sigma;
    let scale = 1.0 / (std::f64::consts::PI * two_sigma_sq);

    let mut data = Vec::with_capacity(kernel_size * kernel_size);
    for i in 0..kernel_size {
        let di = i as f64 - center;
        for j in 0..kernel_size {
            let dj = j as f64 - center;
            data.push(scale * (-(di * di + dj * dj) / two_sigma_sq).exp());
        }
    }

    // normalize the kernel
    let norm = data.iter().sum::<f64>();
    data.iter_mut().for_each(|k| *k /= norm);

    Ok(Kernel2d {
        size: kernel_size,
        data,
    })
}
