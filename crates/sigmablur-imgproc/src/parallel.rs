use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur during parallel execution.
#[derive(Error, Debug, PartialEq)]
pub enum ParallelError {
    /// The thread pool failed to build.
    #[error("failed to build thread pool: {0}")]
    BuildError(String),

    /// The requested thread count is invalid.
    #[error("thread count must be > 0, got {0}")]
    InvalidThreadCount(usize),

    /// The line length must be valid.
    #[error("line length must be > 0")]
    InvalidLineLength,

    /// The buffer does not split into whole lines.
    #[error("buffer of length {0} is not a multiple of the line length {1}")]
    SizeMismatch(usize, usize),
}

/// Controls how parallel operations are executed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionStrategy {
    /// Use the global Rayon thread pool to process lines in parallel.
    ///
    /// The global pool is sized to the available hardware parallelism, so the
    /// number of lines in flight never exceeds the number of worker threads.
    #[default]
    Parallel,

    /// Run sequentially on the current thread.
    ///
    /// Useful for small images, debugging, or when the overhead of parallelization
    /// outweighs the benefits.
    Serial,

    /// Run on a local thread pool with `n` threads.
    ///
    /// # Warning
    /// Creates a new thread pool on every call, which has significant overhead.
    /// Use this primarily for benchmarking or specific isolation needs.
    Fixed(usize),
}

/// Run `f` once per line of `dst` with the given strategy.
///
/// The buffer is split into consecutive, non-overlapping lines of `line_len`
/// elements. `f` receives the line index and exclusive access to that line, so
/// no two invocations ever touch the same element. The call returns once every
/// line has been processed.
///
/// # Arguments
///
/// * `dst` - The destination buffer.
/// * `line_len` - Number of elements per line.
/// * `strategy` - The execution strategy.
/// * `f` - The operation to perform on each `(line_index, line)` pair.
///
/// # Errors
///
/// Fails when `line_len` is zero, when `dst` is not a whole number of lines, or
/// when a [`ExecutionStrategy::Fixed`] pool cannot be built.
pub fn par_for_each_line<T, F>(
    dst: &mut [T],
    line_len: usize,
    strategy: ExecutionStrategy,
    f: F,
) -> Result<(), ParallelError>
where
    T: Send,
    F: Fn(usize, &mut [T]) + Send + Sync,
{
    if line_len == 0 {
        return Err(ParallelError::InvalidLineLength);
    }

    if dst.len() % line_len != 0 {
        return Err(ParallelError::SizeMismatch(dst.len(), line_len));
    }

    match strategy {
        ExecutionStrategy::Serial => {
            dst.chunks_exact_mut(line_len)
                .enumerate()
                .for_each(|(i, line)| f(i, line));
        }
        ExecutionStrategy::Parallel => {
            dst.par_chunks_exact_mut(line_len)
                .enumerate()
                .for_each(|(i, line)| f(i, line));
        }
        ExecutionStrategy::Fixed(n) => {
            if n == 0 {
                return Err(ParallelError::InvalidThreadCount(n));
            }
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(n)
                .build()
                .map_err(|e| ParallelError::BuildError(e.to_string()))?;

            pool.install(|| {
                dst.par_chunks_exact_mut(line_len)
                    .enumerate()
                    .for_each(|(i, line)| f(i, line));
            });
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fill_with_line_index(strategy: ExecutionStrategy) -> Vec<usize> {
        let mut dst = vec![0; 12];
        par_for_each_line(&mut dst, 3, strategy, |i, line| {
            line.iter_mut().enumerate().for_each(|(j, v)| *v = i * 10 + j);
        })
        .unwrap();
        dst
    }

    #[test]
    fn test_execute_serial() {
        assert_eq!(
            fill_with_line_index(ExecutionStrategy::Serial),
            vec![0, 1, 2, 10, 11, 12, 20, 21, 22, 30, 31, 32]
        );
    }

    #[test]
    fn test_execute_parallel() {
        assert_eq!(
            fill_with_line_index(ExecutionStrategy::Parallel),
            fill_with_line_index(ExecutionStrategy::Serial)
        );
    }

    #[test]
    fn test_execute_fixed_success() {
        assert_eq!(
            fill_with_line_index(ExecutionStrategy::Fixed(2)),
            fill_with_line_index(ExecutionStrategy::Serial)
        );
    }

    #[test]
    fn test_execute_fixed_error() {
        let mut dst = vec![0u8; 4];
        let res = par_for_each_line(&mut dst, 2, ExecutionStrategy::Fixed(0), |_, _| {});
        assert_eq!(res, Err(ParallelError::InvalidThreadCount(0)));
    }

    #[test]
    fn test_invalid_line_length() {
        let mut dst = vec![0u8; 4];
        let res = par_for_each_line(&mut dst, 0, ExecutionStrategy::Serial, |_, _| {});
        assert_eq!(res, Err(ParallelError::InvalidLineLength));

        let res = par_for_each_line(&mut dst, 3, ExecutionStrategy::Serial, |_, _| {});
        assert_eq!(res, Err(ParallelError::SizeMismatch(4, 3)));
    }

    #[test]
    fn test_strategy_serde() {
        let json = serde_json::to_string(&ExecutionStrategy::Fixed(4)).unwrap();
        assert_eq!(json, r#"{"fixed":4}"#);
        let strategy: ExecutionStrategy = serde_json::from_str(r#""serial""#).unwrap();
        assert_eq!(strategy, ExecutionStrategy::Serial);
    }
}
