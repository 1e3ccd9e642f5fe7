//! Template search: scan strategies, hill climbing, and the matching run.
//!
//! A run scans every (template, orientation) pair over the search area at
//! reduced resolution, climbs promising positions at full resolution, and
//! commits the accepted matches into the logic model.

mod climb;
mod matcher;
mod strategy;

pub use climb::{hill_climb, Climb};
pub use matcher::{MatchFound, Matcher, RunSummary};
pub use strategy::{SearchState, SearchStrategy};

use crate::util::{GateMatchError, GateMatchResult};

/// Largest accepted `scale_down`.
pub const MAX_SCALE_DOWN: usize = 1 << 16;
/// Largest accepted `max_step_size`.
pub const MAX_STEP_SIZE: usize = 1 << 16;

/// Thresholds and step parameters for a matching run.
#[derive(Clone, Debug, PartialEq)]
pub struct MatchConfig {
    /// Minimum reduced-resolution correlation that starts a hill climb.
    pub threshold_hc: f64,
    /// Minimum full-resolution correlation for a match to be reported.
    pub threshold_detection: f64,
    /// Largest scan step, in reduced-resolution pixels; also the hill
    /// climber's neighbourhood radius.
    pub max_step_size: usize,
    /// Requested downscale factor for the coarse scan; rounded up to a power
    /// of two.
    pub scale_down: usize,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            threshold_hc: 0.40,
            threshold_detection: 0.70,
            max_step_size: 3,
            scale_down: 1,
        }
    }
}

impl MatchConfig {
    /// Validates threshold ranges and step parameters.
    pub fn validate(&self) -> GateMatchResult<()> {
        let in_range = |t: f64| t.is_finite() && t > -1.0 && t <= 1.0;
        if !in_range(self.threshold_hc) {
            return Err(GateMatchError::InvalidConfig(
                "threshold_hc must lie in (-1, 1]",
            ));
        }
        if !in_range(self.threshold_detection) {
            return Err(GateMatchError::InvalidConfig(
                "threshold_detection must lie in (-1, 1]",
            ));
        }
        if self.max_step_size == 0 {
            return Err(GateMatchError::InvalidConfig("max_step_size must be >= 1"));
        }
        if self.max_step_size > MAX_STEP_SIZE {
            return Err(GateMatchError::InvalidConfig(
                "max_step_size must be <= 65536",
            ));
        }
        if self.scale_down == 0 {
            return Err(GateMatchError::InvalidConfig("scale_down must be >= 1"));
        }
        if self.scale_down > MAX_SCALE_DOWN {
            return Err(GateMatchError::InvalidConfig("scale_down must be <= 65536"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{MatchConfig, MAX_SCALE_DOWN, MAX_STEP_SIZE};
    use crate::util::GateMatchError;

    #[test]
    fn defaults_are_valid() {
        let cfg = MatchConfig::default();
        assert_eq!(cfg.max_step_size, 3);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn rejects_out_of_range_values() {
        let cfg = MatchConfig {
            threshold_detection: 1.5,
            ..MatchConfig::default()
        };
        assert_eq!(
            cfg.validate(),
            Err(GateMatchError::InvalidConfig(
                "threshold_detection must lie in (-1, 1]"
            ))
        );
        let cfg = MatchConfig {
            threshold_hc: f64::NAN,
            ..MatchConfig::default()
        };
        assert!(cfg.validate().is_err());
        let cfg = MatchConfig {
            max_step_size: 0,
            ..MatchConfig::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn rejects_oversized_scale_and_step() {
        let cfg = MatchConfig {
            scale_down: usize::MAX,
            ..MatchConfig::default()
        };
        assert_eq!(
            cfg.validate(),
            Err(GateMatchError::InvalidConfig("scale_down must be <= 65536"))
        );
        let cfg = MatchConfig {
            max_step_size: usize::MAX,
            threshold_hc: -0.99,
            ..MatchConfig::default()
        };
        assert_eq!(
            cfg.validate(),
            Err(GateMatchError::InvalidConfig(
                "max_step_size must be <= 65536"
            ))
        );

        let cfg = MatchConfig {
            scale_down: MAX_SCALE_DOWN,
            max_step_size: MAX_STEP_SIZE,
            ..MatchConfig::default()
        };
        assert!(cfg.validate().is_ok());
    }
}
