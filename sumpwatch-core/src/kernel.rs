//! Gaussian smoothing kernel.
//!
//! A [`Kernel`] is a fixed, symmetric set of weights summing to one. Applying
//! it to the most recent samples of a [`TimeSeries`] gives a low-noise
//! estimate of the series value at the centre of the window.

use crate::config::{KernelParams, KernelShape};
use crate::error::{CoreError, Result};
use crate::series::TimeSeries;

/// Tolerance used when checking a literal table for symmetry.
const SYMMETRY_TOLERANCE: f64 = 1e-9;

/// Normalized convolution weights.
#[derive(Debug, Clone, PartialEq)]
pub struct Kernel {
    weights: Vec<f64>,
}

impl Kernel {
    /// Build a discretized Gaussian of odd length `window`.
    ///
    /// `weight[i] = exp(-(i - mid)^2 / (2 sigma^2))` with `mid = (window - 1) / 2`,
    /// then normalized.
    pub fn gaussian(window: usize, sigma: f64) -> Result<Self> {
        if window == 0 || window % 2 == 0 {
            return Err(CoreError::Kernel(format!(
                "window length must be odd, got {window}"
            )));
        }
        if !(sigma.is_finite() && sigma > 0.0) {
            return Err(CoreError::Kernel(format!("sigma must be positive, got {sigma}")));
        }

        let mid = (window - 1) / 2;
        let isq = 1.0 / (2.0 * sigma * sigma);
        let weights = (0..window)
            .map(|i| {
                let dx = i.abs_diff(mid) as f64;
                (-dx * dx * isq).exp()
            })
            .collect();

        Self::normalized(weights)
    }

    /// Build a kernel from literal weights.
    ///
    /// The table must have odd length, hold finite non-negative values with a
    /// positive sum, and read the same in both directions. It is normalized
    /// to sum to one.
    pub fn from_table(table: &[f64]) -> Result<Self> {
        if table.is_empty() || table.len() % 2 == 0 {
            return Err(CoreError::Kernel(format!(
                "table length must be odd, got {}",
                table.len()
            )));
        }
        if table.iter().any(|w| !w.is_finite() || *w < 0.0) {
            return Err(CoreError::Kernel(
                "table weights must be finite and non-negative".to_string(),
            ));
        }
        let asymmetric = table
            .iter()
            .zip(table.iter().rev())
            .any(|(a, b)| (a - b).abs() > SYMMETRY_TOLERANCE);
        if asymmetric {
            return Err(CoreError::Kernel("table weights must be symmetric".to_string()));
        }

        Self::normalized(table.to_vec())
    }

    /// Build a kernel from resolved configuration.
    pub fn from_params(params: &KernelParams) -> Result<Self> {
        match &params.shape {
            KernelShape::Gaussian { sigma } => Self::gaussian(params.window, *sigma),
            KernelShape::Table(table) => Self::from_table(table),
        }
    }

    fn normalized(mut weights: Vec<f64>) -> Result<Self> {
        let sum: f64 = weights.iter().sum();
        if !(sum.is_finite() && sum > 0.0) {
            return Err(CoreError::Kernel("weights must have a positive sum".to_string()));
        }
        for w in &mut weights {
            *w /= sum;
        }
        Ok(Self { weights })
    }

    /// Number of taps.
    pub fn len(&self) -> usize {
        self.weights.len()
    }

    /// Always false; a kernel has at least one tap.
    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }

    /// Index of the centre tap.
    pub fn mid(&self) -> usize {
        (self.weights.len() - 1) / 2
    }

    pub fn weights(&self) -> &[f64] {
        &self.weights
    }
}

/// Applies a [`Kernel`] at a chosen distance back from the newest sample.
#[derive(Debug, Clone)]
pub struct GaussianSmoother {
    kernel: Kernel,
}

impl GaussianSmoother {
    pub fn new(kernel: Kernel) -> Self {
        Self { kernel }
    }

    pub fn kernel(&self) -> &Kernel {
        &self.kernel
    }

    /// Number of samples one evaluation covers.
    pub fn window(&self) -> usize {
        self.kernel.len()
    }

    /// Weighted sum over the window that ends `recency_offset` samples before
    /// the newest sample (inclusive).
    ///
    /// Returns `None` when the series is too short to fill the window.
    pub fn smooth(&self, series: &TimeSeries, recency_offset: usize) -> Option<f64> {
        if series.len() < self.window() + recency_offset {
            return None;
        }
        // Weights are symmetric, so walking newest-first needs no reversal.
        let value = series
            .tail(recency_offset + self.window())
            .skip(recency_offset)
            .zip(self.kernel.weights())
            .map(|(sample, w)| sample.value * w)
            .sum();
        Some(value)
    }

    /// Timestamp of the centre sample of the window at `recency_offset`.
    pub fn center_time(&self, series: &TimeSeries, recency_offset: usize) -> Option<f64> {
        if series.len() < self.window() + recency_offset {
            return None;
        }
        series
            .from_newest(recency_offset + self.kernel.mid())
            .map(|s| s.time)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::series::Sample;

    fn assert_normalized_and_symmetric(kernel: &Kernel) {
        let sum: f64 = kernel.weights().iter().sum();
        assert!((sum - 1.0).abs() < 1e-9, "sum was {sum}");

        let w = kernel.weights();
        let n = w.len();
        for i in 0..n {
            assert!((w[i] - w[n - 1 - i]).abs() < 1e-15);
        }
    }

    #[test]
    fn gaussian_weights_sum_to_one_and_are_symmetric() {
        for (window, sigma) in [(1, 1.0), (3, 0.5), (29, 7.0), (127, 30.0), (509, 120.0)] {
            let kernel = Kernel::gaussian(window, sigma).unwrap();
            assert_eq!(kernel.len(), window);
            assert_normalized_and_symmetric(&kernel);
        }
    }

    #[test]
    fn gaussian_peaks_at_centre() {
        let kernel = Kernel::gaussian(127, 30.0).unwrap();
        let w = kernel.weights();
        let mid = kernel.mid();
        assert_eq!(mid, 63);
        assert!(w.iter().all(|x| *x <= w[mid]));
        assert!(w[0] < w[mid]);
    }

    #[test]
    fn gaussian_rejects_even_window_and_bad_sigma() {
        assert!(Kernel::gaussian(0, 1.0).is_err());
        assert!(Kernel::gaussian(128, 30.0).is_err());
        assert!(Kernel::gaussian(127, 0.0).is_err());
        assert!(Kernel::gaussian(127, f64::NAN).is_err());
    }

    #[test]
    fn table_is_normalized() {
        let kernel = Kernel::from_table(&[1.0, 2.0, 1.0]).unwrap();
        assert_eq!(kernel.weights(), &[0.25, 0.5, 0.25]);
        assert_normalized_and_symmetric(&kernel);
    }

    #[test]
    fn table_validation() {
        assert!(Kernel::from_table(&[]).is_err());
        assert!(Kernel::from_table(&[1.0, 1.0]).is_err());
        assert!(Kernel::from_table(&[1.0, 2.0, 3.0]).is_err());
        assert!(Kernel::from_table(&[-1.0, 2.0, -1.0]).is_err());
        assert!(Kernel::from_table(&[0.0, 0.0, 0.0]).is_err());
    }

    #[test]
    fn smoothing_a_constant_returns_the_constant() {
        let smoother = GaussianSmoother::new(Kernel::gaussian(5, 1.0).unwrap());
        let mut series = TimeSeries::new("v", 100);
        for i in 0..10 {
            series.append(Sample::new(i as f64, 4.2)).unwrap();
        }
        let value = smoother.smooth(&series, 3).unwrap();
        assert!((value - 4.2).abs() < 1e-12);
    }

    #[test]
    fn smoothing_picks_the_right_window() {
        // Box kernel makes the expected value easy to state
        let smoother = GaussianSmoother::new(Kernel::from_table(&[1.0, 1.0, 1.0]).unwrap());
        let mut series = TimeSeries::new("v", 100);
        for i in 0..6 {
            series.append(Sample::new(i as f64, i as f64)).unwrap();
        }
        // Newest three: 5, 4, 3
        assert!((smoother.smooth(&series, 0).unwrap() - 4.0).abs() < 1e-12);
        // Two back: 3, 2, 1
        assert!((smoother.smooth(&series, 2).unwrap() - 2.0).abs() < 1e-12);
        assert_eq!(smoother.center_time(&series, 0), Some(4.0));
        assert_eq!(smoother.center_time(&series, 2), Some(2.0));
    }

    #[test]
    fn short_series_is_not_yet_available() {
        let smoother = GaussianSmoother::new(Kernel::gaussian(5, 1.0).unwrap());
        let mut series = TimeSeries::new("v", 100);
        for i in 0..6 {
            series.append(Sample::new(i as f64, 1.0)).unwrap();
        }
        assert!(smoother.smooth(&series, 1).is_some());
        assert!(smoother.smooth(&series, 2).is_none());
        assert!(smoother.center_time(&series, 2).is_none());
    }
}
