//! Synthetic evidence per risk tier
//!
//! The similar-team count is drawn at random for variety only; the other
//! fields are fixed per tier.

use rand::Rng;
use std::ops::RangeInclusive;

use super::verdict::{Evidence, RiskLevel};

/// Evidence policy for one tier
#[derive(Debug, Clone)]
pub struct TierPolicy {
    pub similar_teams: RangeInclusive<u32>,
    pub failure_rate: &'static str,
    pub common_pitfall: &'static str,
    pub success_projection: &'static str,
}

pub fn policy(level: RiskLevel) -> TierPolicy {
    match level {
        RiskLevel::High => TierPolicy {
            similar_teams: 70..=90,
            failure_rate: "78%",
            common_pitfall: "Missing Critical Role",
            success_projection: "12% chance of submission",
        },
        RiskLevel::Medium => TierPolicy {
            similar_teams: 40..=60,
            failure_rate: "42%",
            common_pitfall: "Low Availability (<20hrs/week)",
            success_projection: "58% chance of submission",
        },
        RiskLevel::Low => TierPolicy {
            similar_teams: 100..=130,
            failure_rate: "11%",
            common_pitfall: "None identified",
            success_projection: "89% chance of submission",
        },
    }
}

/// Evidence bundle consistent with `level`
pub fn derive<R: Rng + ?Sized>(level: RiskLevel, rng: &mut R) -> Evidence {
    let policy = policy(level);
    Evidence {
        similar_teams: rng.gen_range(policy.similar_teams),
        failure_rate: policy.failure_rate.to_string(),
        common_pitfall: policy.common_pitfall.to_string(),
        success_projection: policy.success_projection.to_string(),
    }
}
