//! Moment corrections for a Gaussian truncated by a win or draw margin
//!
//! `v` is the additive correction to the mean and `w` the multiplicative
//! correction to the variance after conditioning a performance difference
//! on "exceeds the margin" (decisive result) or "within the margin" (draw).

use super::gaussian::{GaussianDistribution, MIN_DENOMINATOR};

pub fn v_exceeds_margin(team_performance_difference: f64, draw_margin: f64) -> f64 {
    let denominator = GaussianDistribution::cumulative_to(team_performance_difference - draw_margin);

    if denominator < MIN_DENOMINATOR {
        return -team_performance_difference + draw_margin;
    }

    GaussianDistribution::at(team_performance_difference - draw_margin) / denominator
}

pub fn w_exceeds_margin(team_performance_difference: f64, draw_margin: f64) -> f64 {
    let denominator = GaussianDistribution::cumulative_to(team_performance_difference - draw_margin);

    if denominator < MIN_DENOMINATOR {
        return if team_performance_difference < 0.0 { 1.0 } else { 0.0 };
    }

    let v_win = v_exceeds_margin(team_performance_difference, draw_margin);
    v_win * (v_win + team_performance_difference - draw_margin)
}

pub fn v_within_margin(team_performance_difference: f64, draw_margin: f64) -> f64 {
    let abs_difference = team_performance_difference.abs();
    let denominator = GaussianDistribution::cumulative_to(draw_margin - abs_difference)
        - GaussianDistribution::cumulative_to(-draw_margin - abs_difference);

    if denominator < MIN_DENOMINATOR {
        return if team_performance_difference < 0.0 {
            -team_performance_difference - draw_margin
        } else {
            -team_performance_difference + draw_margin
        };
    }

    let numerator = GaussianDistribution::at(-draw_margin - abs_difference)
        - GaussianDistribution::at(draw_margin - abs_difference);

    if team_performance_difference < 0.0 {
        -numerator / denominator
    } else {
        numerator / denominator
    }
}

pub fn w_within_margin(team_performance_difference: f64, draw_margin: f64) -> f64 {
    let abs_difference = team_performance_difference.abs();
    let denominator = GaussianDistribution::cumulative_to(draw_margin - abs_difference)
        - GaussianDistribution::cumulative_to(-draw_margin - abs_difference);

    if denominator < MIN_DENOMINATOR {
        return 1.0;
    }

    let vt = v_within_margin(abs_difference, draw_margin);

    vt * vt
        + ((draw_margin - abs_difference) * GaussianDistribution::at(draw_margin - abs_difference)
            - (-draw_margin - abs_difference)
                * GaussianDistribution::at(-draw_margin - abs_difference))
            / denominator
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exceeds_margin_at_zero() {
        // φ(0) / Φ(0)
        let v = v_exceeds_margin(0.0, 0.0);
        assert!((v - 0.797_884_560_802_865_4).abs() < 1e-6);

        let w = w_exceeds_margin(0.0, 0.0);
        assert!((w - v * v).abs() < 1e-9);
    }

    #[test]
    fn test_exceeds_margin_bounds() {
        for t in [-4.0, -1.0, 0.0, 1.0, 4.0] {
            let w = w_exceeds_margin(t, 0.5);
            assert!(w > 0.0 && w < 1.0, "w({}) = {}", t, w);
            assert!(v_exceeds_margin(t, 0.5) > 0.0);
        }
    }

    #[test]
    fn test_exceeds_margin_decreases_with_lead() {
        assert!(v_exceeds_margin(2.0, 0.1) < v_exceeds_margin(0.0, 0.1));
        assert!(v_exceeds_margin(0.0, 0.1) < v_exceeds_margin(-2.0, 0.1));
    }

    #[test]
    fn test_within_margin_symmetry() {
        assert!(v_within_margin(0.0, 0.74).abs() < 1e-12);
        let left = v_within_margin(-0.3, 0.74);
        let right = v_within_margin(0.3, 0.74);
        assert!((left + right).abs() < 1e-12);
        assert!((w_within_margin(-0.3, 0.74) - w_within_margin(0.3, 0.74)).abs() < 1e-12);
    }

    #[test]
    fn test_within_margin_bounds() {
        for t in [-1.0, 0.0, 0.5, 2.0] {
            let w = w_within_margin(t, 0.74);
            assert!(w > 0.0 && w < 1.0, "w({}) = {}", t, w);
        }
    }
}
