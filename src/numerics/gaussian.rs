//! Gaussian distribution in precision form
//!
//! Stores both the moment parameters (mean, standard deviation) and the
//! canonical ones (precision = 1/σ², precision mean = μ/σ²). Products and
//! ratios of Gaussians are closed in the canonical space, which is what the
//! message-passing factors rely on.

use std::f64::consts::PI;
use std::fmt;
use std::ops::{Div, Mul};

use serde::{Deserialize, Serialize};
use statrs::distribution::{Continuous, ContinuousCDF, Normal};

/// Smallest denominator the truncated-Gaussian corrections accept before
/// falling back to their asymptotic forms.
pub(crate) const MIN_DENOMINATOR: f64 = 2.222_758_749e-162;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GaussianDistribution {
    mean: f64,
    standard_deviation: f64,
    variance: f64,
    precision: f64,
    precision_mean: f64,
}

impl GaussianDistribution {
    pub fn new(mean: f64, standard_deviation: f64) -> Self {
        let variance = standard_deviation * standard_deviation;
        let precision = 1.0 / variance;
        Self {
            mean,
            standard_deviation,
            variance,
            precision,
            precision_mean: precision * mean,
        }
    }

    /// Build from canonical parameters. A zero precision is the uniform
    /// (uninformative) distribution; its mean is undefined.
    pub fn from_precision_mean(precision_mean: f64, precision: f64) -> Self {
        let variance = 1.0 / precision;
        Self {
            mean: precision_mean / precision,
            standard_deviation: variance.sqrt(),
            variance,
            precision,
            precision_mean,
        }
    }

    /// The uninformative distribution used to seed messages and marginals.
    pub fn uniform() -> Self {
        Self::from_precision_mean(0.0, 0.0)
    }

    pub fn mean(&self) -> f64 {
        self.mean
    }

    pub fn standard_deviation(&self) -> f64 {
        self.standard_deviation
    }

    pub fn variance(&self) -> f64 {
        self.variance
    }

    pub fn precision(&self) -> f64 {
        self.precision
    }

    pub fn precision_mean(&self) -> f64 {
        self.precision_mean
    }

    /// Convergence distance between two distributions in canonical space.
    pub fn absolute_difference(&self, other: &GaussianDistribution) -> f64 {
        (self.precision_mean - other.precision_mean)
            .abs()
            .max((self.precision - other.precision).abs().sqrt())
    }

    /// Linear interpolation between `self` and `target` in canonical space;
    /// `fraction` 0 yields `self`, 1 yields `target`.
    pub fn interpolate(&self, target: &GaussianDistribution, fraction: f64) -> Self {
        let precision_difference = target.precision - self.precision;
        let precision_mean_difference = target.precision_mean - self.precision_mean;

        Self::from_precision_mean(
            self.precision_mean + fraction * precision_mean_difference,
            self.precision + fraction * precision_difference,
        )
    }

    pub fn log_product_normalization(left: &GaussianDistribution, right: &GaussianDistribution) -> f64 {
        if left.precision == 0.0 || right.precision == 0.0 {
            return 0.0;
        }

        let variance_sum = left.variance + right.variance;
        let mean_difference = left.mean - right.mean;
        let log_sqrt_2pi = (2.0 * PI).sqrt().ln();

        -log_sqrt_2pi - variance_sum.ln() / 2.0 - mean_difference * mean_difference / (2.0 * variance_sum)
    }

    pub fn log_ratio_normalization(
        numerator: &GaussianDistribution,
        denominator: &GaussianDistribution,
    ) -> f64 {
        if numerator.precision == 0.0 || denominator.precision == 0.0 {
            return 0.0;
        }

        let variance_difference = denominator.variance - numerator.variance;
        let mean_difference = numerator.mean - denominator.mean;
        let log_sqrt_2pi = (2.0 * PI).sqrt().ln();

        denominator.variance.ln() + log_sqrt_2pi - variance_difference.ln() / 2.0
            + mean_difference * mean_difference / (2.0 * variance_difference)
    }

    /// Standard normal CDF.
    pub fn cumulative_to(x: f64) -> f64 {
        with_normal(0.0, 1.0, |normal| normal.cdf(x))
    }

    /// Standard normal density.
    pub fn at(x: f64) -> f64 {
        Self::at_with(x, 0.0, 1.0)
    }

    /// Density of the normal distribution with the given parameters.
    pub fn at_with(x: f64, mean: f64, standard_deviation: f64) -> f64 {
        with_normal(mean, standard_deviation, |normal| normal.pdf(x))
    }

    /// Quantile of the normal distribution with the given parameters.
    /// `x` outside `[0, 1]` yields NaN.
    pub fn inverse_cumulative_to(x: f64, mean: f64, standard_deviation: f64) -> f64 {
        if !(0.0..=1.0).contains(&x) {
            return f64::NAN;
        }
        with_normal(mean, standard_deviation, |normal| normal.inverse_cdf(x))
    }
}

/// Evaluate `f` on `N(mean, standard_deviation²)`; NaN when the parameters
/// do not describe a distribution (σ ≤ 0 or NaN).
fn with_normal(mean: f64, standard_deviation: f64, f: impl FnOnce(&Normal) -> f64) -> f64 {
    Normal::new(mean, standard_deviation).map_or(f64::NAN, |normal| f(&normal))
}

impl Default for GaussianDistribution {
    fn default() -> Self {
        Self::new(0.0, 1.0)
    }
}

impl Mul for GaussianDistribution {
    type Output = GaussianDistribution;

    fn mul(self, rhs: GaussianDistribution) -> GaussianDistribution {
        GaussianDistribution::from_precision_mean(
            self.precision_mean + rhs.precision_mean,
            self.precision + rhs.precision,
        )
    }
}

impl Div for GaussianDistribution {
    type Output = GaussianDistribution;

    fn div(self, rhs: GaussianDistribution) -> GaussianDistribution {
        GaussianDistribution::from_precision_mean(
            self.precision_mean - rhs.precision_mean,
            self.precision - rhs.precision,
        )
    }
}

impl fmt::Display for GaussianDistribution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "μ={:.4}, σ={:.4}", self.mean, self.standard_deviation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOLERANCE: f64 = 1e-6;

    #[test]
    fn test_precision_form_round_trip() {
        let gaussian = GaussianDistribution::new(10.0, 2.0);
        assert!((gaussian.precision() - 0.25).abs() < TOLERANCE);
        assert!((gaussian.precision_mean() - 2.5).abs() < TOLERANCE);

        let rebuilt = GaussianDistribution::from_precision_mean(2.5, 0.25);
        assert!((rebuilt.mean() - 10.0).abs() < TOLERANCE);
        assert!((rebuilt.standard_deviation() - 2.0).abs() < TOLERANCE);
    }

    #[test]
    fn test_multiplication() {
        let standard_normal = GaussianDistribution::new(0.0, 1.0);
        let shifted = GaussianDistribution::new(2.0, 3.0);
        let product = standard_normal * shifted;

        assert!((product.mean() - 0.2).abs() < TOLERANCE);
        assert!((product.standard_deviation() - 3.0 / 10.0_f64.sqrt()).abs() < TOLERANCE);

        let m4s5 = GaussianDistribution::new(4.0, 5.0);
        let m6s7 = GaussianDistribution::new(6.0, 7.0);
        let product = m4s5 * m6s7;
        let expected_sigma = (1.0_f64 / (1.0 / 25.0 + 1.0 / 49.0)).sqrt();
        let expected_mean = (4.0 / 25.0 + 6.0 / 49.0) * expected_sigma * expected_sigma;

        assert!((product.mean() - expected_mean).abs() < TOLERANCE);
        assert!((product.standard_deviation() - expected_sigma).abs() < TOLERANCE);
    }

    #[test]
    fn test_division_undoes_multiplication() {
        let a = GaussianDistribution::new(4.0, 5.0);
        let b = GaussianDistribution::new(6.0, 7.0);
        let back = (a * b) / b;

        assert!((back.mean() - 4.0).abs() < TOLERANCE);
        assert!((back.standard_deviation() - 5.0).abs() < TOLERANCE);
    }

    #[test]
    fn test_log_product_normalization() {
        let standard_normal = GaussianDistribution::new(0.0, 1.0);
        let lpn = GaussianDistribution::log_product_normalization(&standard_normal, &standard_normal);
        assert!((lpn - -1.265_512_123_484_645_4).abs() < TOLERANCE);

        let m1s2 = GaussianDistribution::new(1.0, 2.0);
        let m3s4 = GaussianDistribution::new(3.0, 4.0);
        let lpn2 = GaussianDistribution::log_product_normalization(&m1s2, &m3s4);
        assert!((lpn2 - -2.516_804_669_981_668_4).abs() < TOLERANCE);

        assert_eq!(
            GaussianDistribution::log_product_normalization(
                &GaussianDistribution::uniform(),
                &m1s2
            ),
            0.0
        );
    }

    #[test]
    fn test_log_ratio_normalization() {
        let m1s2 = GaussianDistribution::new(1.0, 2.0);
        let m3s4 = GaussianDistribution::new(3.0, 4.0);
        let lrn = GaussianDistribution::log_ratio_normalization(&m1s2, &m3s4);
        assert!((lrn - 2.615_740_597_217_120_4).abs() < TOLERANCE);
    }

    #[test]
    fn test_absolute_difference() {
        let standard_normal = GaussianDistribution::new(0.0, 1.0);
        assert_eq!(standard_normal.absolute_difference(&standard_normal), 0.0);

        let m1s2 = GaussianDistribution::new(1.0, 2.0);
        let m3s4 = GaussianDistribution::new(3.0, 4.0);
        let diff = m1s2.absolute_difference(&m3s4);
        assert!((diff - 0.433_012_701_892_219_3).abs() < TOLERANCE);
    }

    #[test]
    fn test_cumulative_and_density() {
        assert!((GaussianDistribution::cumulative_to(0.0) - 0.5).abs() < TOLERANCE);
        assert!((GaussianDistribution::cumulative_to(0.5) - 0.691_462_461_274_013).abs() < TOLERANCE);
        assert!((GaussianDistribution::cumulative_to(-1.0) - 0.158_655_253_931_457).abs() < TOLERANCE);
        assert!((GaussianDistribution::at(0.5) - 0.352_065_326_764_299_5).abs() < TOLERANCE);
    }

    #[test]
    fn test_inverse_cumulative() {
        let quantile = GaussianDistribution::inverse_cumulative_to(0.691_462_461_274_013, 0.0, 1.0);
        assert!((quantile - 0.5).abs() < 1e-5);
        assert!(GaussianDistribution::inverse_cumulative_to(0.5, 0.0, 1.0).abs() < 1e-5);

        let shifted = GaussianDistribution::inverse_cumulative_to(0.975, 10.0, 2.0);
        assert!((shifted - (10.0 + 2.0 * 1.959_963_984_540_054)).abs() < 1e-6);
    }

    #[test]
    fn test_tail_cumulative_stays_positive() {
        let far = GaussianDistribution::cumulative_to(-30.0);
        assert!(far > 0.0 && far < 1e-190);
        assert!((GaussianDistribution::cumulative_to(8.0) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_invalid_parameters_yield_nan() {
        assert!(GaussianDistribution::at_with(0.0, 0.0, 0.0).is_nan());
        assert!(GaussianDistribution::inverse_cumulative_to(0.5, 0.0, -1.0).is_nan());
        assert!(GaussianDistribution::inverse_cumulative_to(1.5, 0.0, 1.0).is_nan());
        assert!((GaussianDistribution::at_with(12.0, 10.0, 2.0) - 0.120_985_362_259_571_7).abs() < TOLERANCE);
    }

    #[test]
    fn test_interpolate_endpoints() {
        let prior = GaussianDistribution::new(25.0, 8.0);
        let posterior = GaussianDistribution::new(30.0, 6.0);

        let start = prior.interpolate(&posterior, 0.0);
        assert!((start.mean() - 25.0).abs() < TOLERANCE);

        let end = prior.interpolate(&posterior, 1.0);
        assert!((end.mean() - 30.0).abs() < TOLERANCE);
        assert!((end.standard_deviation() - 6.0).abs() < TOLERANCE);

        let halfway = prior.interpolate(&posterior, 0.5);
        assert!(halfway.mean() > 25.0 && halfway.mean() < 30.0);
    }
}
