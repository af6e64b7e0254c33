use crate::libs::error::ChainError;
use serde::Serialize;

/// Weights of the chain scoring function.
///
/// The same value is handed to the greedy builder and to the exhaustive chainer,
/// so their results are directly comparable.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct ScoringPolicy {
    /// Cost per unit of the larger gap between two consecutive fragments
    pub distance_penalty: f64,
    /// Weight of the (negative) smaller gap when two fragments overlap
    pub overlap_reward: f64,
    /// Flat bonus per link
    pub connect_reward: f64,
}

impl Default for ScoringPolicy {
    fn default() -> Self {
        ScoringPolicy {
            distance_penalty: 0.5,
            overlap_reward: 2.0,
            connect_reward: 20.0,
        }
    }
}

impl ScoringPolicy {
    /// Creates a policy, rejecting weights that are NaN or infinite.
    ///
    /// # Arguments
    ///
    /// * `distance_penalty` - Multiplier of positive gaps.
    /// * `overlap_reward` - Multiplier of negative gaps (overlaps).
    /// * `connect_reward` - Bonus per link.
    pub fn new(
        distance_penalty: f64,
        overlap_reward: f64,
        connect_reward: f64,
    ) -> Result<Self, ChainError> {
        let policy = ScoringPolicy {
            distance_penalty,
            overlap_reward,
            connect_reward,
        };
        policy.validate()?;
        Ok(policy)
    }

    pub fn validate(&self) -> Result<(), ChainError> {
        for (name, value) in [
            ("distance penalty", self.distance_penalty),
            ("overlap reward", self.overlap_reward),
            ("connect reward", self.connect_reward),
        ] {
            if !value.is_finite() {
                return Err(ChainError::Scoring(format!(
                    "{} must be finite, got {}",
                    name, value
                )));
            }
        }
        Ok(())
    }

    /// True when gap and overlap terms can only lower a chain's score.
    ///
    /// Branch-and-bound in the exhaustive search relies on this.
    pub fn geometry_never_rewards(&self) -> bool {
        self.distance_penalty >= 0.0 && self.overlap_reward >= 0.0
    }
}
