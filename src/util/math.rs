//! Mathematical helpers for correlation and search stepping.

/// Largest drift outside `[-1, 1]` that is clamped instead of rejected.
pub(crate) const CORR_DRIFT_TOLERANCE: f64 = 1e-3;

/// Computes the adaptive raster step for a probe correlation.
///
/// `step = max(1, round((1 - max_step) * corr + max_step))`, with `corr`
/// clamped to `[0, 1]` so anti-correlated probes use the coarsest step.
pub(crate) fn adaptive_step(corr: f64, max_step: usize) -> usize {
    let max_step = max_step.max(1) as f64;
    let corr = if corr.is_finite() {
        corr.clamp(0.0, 1.0)
    } else {
        0.0
    };
    let step = ((1.0 - max_step) * corr + max_step).round();
    (step as usize).max(1)
}

/// Clamps a correlation into `[-1, 1]` if it drifted by at most the tolerance.
///
/// Returns `None` for larger excursions and non-finite values.
pub(crate) fn clamp_correlation(score: f64) -> Option<f64> {
    if !score.is_finite() {
        return None;
    }
    if score.abs() > 1.0 + CORR_DRIFT_TOLERANCE {
        return None;
    }
    Some(score.clamp(-1.0, 1.0))
}

/// Returns the smallest power of two that is `>= scale` (at least 1).
///
/// Saturates at the largest representable power of two.
pub(crate) fn pow2_at_least(scale: usize) -> usize {
    scale
        .max(1)
        .checked_next_power_of_two()
        .unwrap_or(1 << (usize::BITS - 1))
}

/// Number of 2x halvings needed to reach a power-of-two `scale`.
pub(crate) fn halvings_for_scale(scale: usize) -> u32 {
    debug_assert!(scale.is_power_of_two());
    scale.trailing_zeros()
}

#[cfg(test)]
mod tests {
    use super::{adaptive_step, clamp_correlation, halvings_for_scale, pow2_at_least};

    #[test]
    fn adaptive_step_spans_coarse_to_fine() {
        assert_eq!(adaptive_step(0.0, 5), 5);
        assert_eq!(adaptive_step(1.0, 5), 1);
        assert_eq!(adaptive_step(0.5, 5), 3);
        assert_eq!(adaptive_step(-0.8, 5), 5);
        assert_eq!(adaptive_step(f64::NAN, 4), 4);
        assert_eq!(adaptive_step(0.3, 1), 1);
    }

    #[test]
    fn clamp_correlation_tolerates_small_drift_only() {
        assert_eq!(clamp_correlation(1.0000004), Some(1.0));
        assert_eq!(clamp_correlation(-1.0005), Some(-1.0));
        assert_eq!(clamp_correlation(0.25), Some(0.25));
        assert_eq!(clamp_correlation(1.5), None);
        assert_eq!(clamp_correlation(f64::INFINITY), None);
    }

    #[test]
    fn pow2_rounds_up() {
        assert_eq!(pow2_at_least(0), 1);
        assert_eq!(pow2_at_least(1), 1);
        assert_eq!(pow2_at_least(3), 4);
        assert_eq!(pow2_at_least(8), 8);
        assert_eq!(pow2_at_least(usize::MAX), 1 << (usize::BITS - 1));
        assert_eq!(halvings_for_scale(8), 3);
        assert_eq!(halvings_for_scale(1), 0);
    }
}
