//! What-if scenario projection
//!
//! A projection is an optimistic verdict shown in place of a non-Low stored
//! verdict after the viewer picks a remediation. It is never stored and the
//! oracle is never consulted.

use bson::oid::ObjectId;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::debug;

use super::verdict::{Evidence, RiskLevel, RiskVerdict};

const PROJECTION_REASON: &str = "Great job! Adding this role balances the team skill set.";

/// Remediations a viewer can try
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Remediation {
    #[serde(rename = "backend")]
    AddBackendDeveloper,
    #[serde(rename = "designer")]
    AddDesigner,
    #[serde(rename = "avail")]
    IncreaseAvailability,
}

impl Remediation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AddBackendDeveloper => "backend",
            Self::AddDesigner => "designer",
            Self::IncreaseAvailability => "avail",
        }
    }
}

impl fmt::Display for Remediation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Remediation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "backend" => Ok(Self::AddBackendDeveloper),
            "designer" => Ok(Self::AddDesigner),
            "avail" => Ok(Self::IncreaseAvailability),
            other => Err(format!("unknown remediation '{}'", other)),
        }
    }
}

pub struct ScenarioProjector;

impl ScenarioProjector {
    /// Projected verdict for `verdict` under `remediation`. `None` when the
    /// verdict is already Low.
    pub fn project(verdict: &RiskVerdict, remediation: Remediation) -> Option<RiskVerdict> {
        if verdict.is_low() {
            return None;
        }
        debug!(remediation = %remediation, from = %verdict.risk_level, "Projecting scenario");

        let mut projected = RiskVerdict::from_parts(
            RiskLevel::Low,
            PROJECTION_REASON,
            Evidence {
                similar_teams: 142,
                failure_rate: "11%".to_string(),
                common_pitfall: "None identified".to_string(),
                success_projection: "88% chance of submission".to_string(),
            },
        );
        projected.is_simulated = true;
        Some(projected)
    }
}

/// View-local projection state for one displayed verdict
#[derive(Debug, Default)]
pub struct ScenarioSession {
    idea_id: Option<ObjectId>,
    verdict: Option<RiskVerdict>,
    remediation: Option<Remediation>,
    projection: Option<RiskVerdict>,
}

impl ScenarioSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Show `verdict` for `idea_id`. Any projection is dropped when either
    /// the idea or the verdict changes.
    pub fn select(&mut self, idea_id: ObjectId, verdict: Option<RiskVerdict>) {
        if self.idea_id != Some(idea_id) || self.verdict != verdict {
            self.remediation = None;
            self.projection = None;
        }
        self.idea_id = Some(idea_id);
        self.verdict = verdict;
    }

    pub fn choose(&mut self, remediation: Remediation) {
        self.remediation = Some(remediation);
    }

    /// Project the chosen remediation. Returns the projection, or `None` if
    /// no remediation was chosen or the verdict is already Low.
    pub fn simulate(&mut self) -> Option<&RiskVerdict> {
        let verdict = self.verdict.as_ref()?;
        let remediation = self.remediation?;
        self.projection = ScenarioProjector::project(verdict, remediation);
        self.projection.as_ref()
    }

    /// Go back to the real verdict
    pub fn reset(&mut self) {
        self.projection = None;
        self.remediation = None;
    }

    /// Close the view
    pub fn close(&mut self) {
        *self = Self::default();
    }

    /// The projection if one is active, else the real verdict
    pub fn displayed(&self) -> Option<&RiskVerdict> {
        self.projection.as_ref().or(self.verdict.as_ref())
    }

    pub fn is_projected(&self) -> bool {
        self.projection.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn verdict(level: RiskLevel) -> RiskVerdict {
        RiskVerdict::from_parts(
            level,
            "stored",
            Evidence {
                similar_teams: 80,
                failure_rate: "78%".into(),
                common_pitfall: "Missing Critical Role".into(),
                success_projection: "12% chance of submission".into(),
            },
        )
    }

    #[test]
    fn test_projection_shape() {
        let p = ScenarioProjector::project(&verdict(RiskLevel::High), Remediation::AddDesigner).unwrap();
        assert_eq!(p.risk_level, RiskLevel::Low);
        assert_eq!(p.similar_teams, 142);
        assert_eq!(p.success_projection, "88% chance of submission");
        assert_eq!(p.common_pitfall, "None identified");
        assert!(p.is_simulated);

        let json = serde_json::to_value(&p).unwrap();
        assert_eq!(json["isSimulated"], true);
    }

    #[test]
    fn test_low_verdict_is_not_projected() {
        assert!(ScenarioProjector::project(&verdict(RiskLevel::Low), Remediation::AddBackendDeveloper).is_none());
    }

    #[test]
    fn test_remediation_wire_names() {
        let r: Remediation = serde_json::from_str("\"avail\"").unwrap();
        assert_eq!(r, Remediation::IncreaseAvailability);
        assert_eq!("backend".parse::<Remediation>(), Ok(Remediation::AddBackendDeveloper));
        assert!("frontend".parse::<Remediation>().is_err());
    }

    #[test]
    fn test_session_discards_projection_on_new_selection() {
        let first = ObjectId::new();
        let mut session = ScenarioSession::new();
        session.select(first, Some(verdict(RiskLevel::High)));

        assert!(session.simulate().is_none());
        session.choose(Remediation::AddBackendDeveloper);
        assert!(session.simulate().is_some());
        assert!(session.displayed().unwrap().is_simulated);

        // Re-selecting the same verdict keeps the projection
        session.select(first, Some(verdict(RiskLevel::High)));
        assert!(session.is_projected());

        session.select(ObjectId::new(), Some(verdict(RiskLevel::High)));
        assert!(!session.is_projected());
        assert_eq!(session.displayed().unwrap().reason, "stored");
    }

    #[test]
    fn test_session_reset_and_close() {
        let mut session = ScenarioSession::new();
        session.select(ObjectId::new(), Some(verdict(RiskLevel::Medium)));
        session.choose(Remediation::IncreaseAvailability);
        session.simulate();

        session.reset();
        assert!(!session.displayed().unwrap().is_simulated);

        session.close();
        assert!(session.displayed().is_none());
    }
}
