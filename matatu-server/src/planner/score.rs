//! Composite itinerary scoring. Lower is better.

use serde::{Deserialize, Serialize};

/// Scoring constants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringWeights {
    /// Penalty per transfer.
    pub transfer_penalty: f64,

    /// Walking metres per penalty point.
    pub walk_divisor: f64,

    /// Multiplier on transit cost.
    pub transit_cost_coefficient: f64,

    /// Bonus for 0, 1, 2 and 3 transfers; four or more get nothing.
    pub directness_bonus: [f64; 4],

    pub cbd_base_bonus: f64,
    pub cbd_per_stop_bonus: f64,

    /// Floor of the CBD bonus.
    pub cbd_bonus_floor: f64,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            transfer_penalty: 600.0,
            walk_divisor: 80.0,
            transit_cost_coefficient: 1.0,
            directness_bonus: [-400.0, -250.0, -100.0, -25.0],
            cbd_base_bonus: -200.0,
            cbd_per_stop_bonus: -50.0,
            cbd_bonus_floor: -500.0,
        }
    }
}

impl ScoringWeights {
    pub fn directness_bonus(&self, transfers: usize) -> f64 {
        self.directness_bonus.get(transfers).copied().unwrap_or(0.0)
    }

    pub fn cbd_bonus(&self, cbd_stops: usize) -> f64 {
        if cbd_stops == 0 {
            return 0.0;
        }
        let bonus = self.cbd_base_bonus + self.cbd_per_stop_bonus * cbd_stops as f64;
        bonus.clamp(self.cbd_bonus_floor, 0.0)
    }

    /// Score an itinerary from its components.
    pub fn score(
        &self,
        transfers: usize,
        walking_distance_m: f64,
        transit_cost: f64,
        cbd_stops: usize,
    ) -> f64 {
        let transfer_penalty = transfers as f64 * self.transfer_penalty;
        let walk_penalty = if self.walk_divisor > 0.0 {
            walking_distance_m / self.walk_divisor
        } else {
            0.0
        };
        let time_penalty = transit_cost * self.transit_cost_coefficient;

        transfer_penalty
            + walk_penalty
            + time_penalty
            + self.directness_bonus(transfers)
            + self.cbd_bonus(cbd_stops)
    }
}
