//! Conversion between draw probability and draw margin

use std::f64::consts::SQRT_2;

use crate::numerics::GaussianDistribution;

/// Performance-difference margin `ε` under which two equally skilled
/// players draw with the given probability.
pub fn draw_margin_from_draw_probability(draw_probability: f64, beta: f64) -> f64 {
    GaussianDistribution::inverse_cumulative_to(0.5 * (draw_probability + 1.0), 0.0, 1.0) * SQRT_2 * beta
}
